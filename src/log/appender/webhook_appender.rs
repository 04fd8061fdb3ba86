use crate::cfg::HumanDur;
use crate::log::appender::LogAppender;
use crate::webhook::{DeliveryOutcome, ReqwestTransport, WebhookSink};
use anyhow::{anyhow, Result};
use serde::Deserialize;
use serde_with::serde_as;
use smart_default::SmartDefault;
use std::sync::Arc;
use std::time::Duration;

/// WebhookAppender 配置
#[serde_as]
#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(default)]
pub struct WebhookAppenderConfig {
    /// webhook 地址
    pub url: String,

    /// 显示名称
    pub username: Option<String>,

    /// 每秒最多发送次数（1..=10）
    #[default(1)]
    pub count_per_second: u32,

    /// 单次请求超时
    #[serde_as(as = "HumanDur")]
    #[default(Duration::from_secs(10))]
    pub timeout: Duration,
}

/// 将日志转发到限流 webhook 的输出器
///
/// `append` 从不因投递失败返回错误，失败的消息留在队列中等待下一次发送；
/// `flush` 会阻塞到队列排空，投递失败时返回错误
pub struct WebhookAppender {
    sink: WebhookSink,
}

impl WebhookAppender {
    pub fn new(config: WebhookAppenderConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(anyhow!("webhook url is required"));
        }
        if !(1..=10).contains(&config.count_per_second) {
            return Err(anyhow!(
                "count_per_second must be between 1 and 10, got {}",
                config.count_per_second
            ));
        }

        let transport = ReqwestTransport::new(config.timeout)?;
        let sink = WebhookSink::new(config.url, config.username, Arc::new(transport))
            .with_count_per_second(config.count_per_second);

        Ok(Self { sink })
    }

    /// 使用自定义的 sink（自定义 transport 或 clock）
    pub fn from_sink(sink: WebhookSink) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &WebhookSink {
        &self.sink
    }
}

#[async_trait::async_trait]
impl LogAppender for WebhookAppender {
    async fn append(&self, formatted_message: &str) -> Result<()> {
        if let DeliveryOutcome::Failed(failure) = self.sink.submit(Some(formatted_message)).await {
            tracing::debug!(url = %self.sink.url(), error = %failure, "webhook message kept for retry");
        }
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        match self.sink.flush().await {
            DeliveryOutcome::Failed(failure) => Err(anyhow!(
                "webhook flush failed for {}: {}",
                self.sink.url(),
                failure
            )),
            _ => Ok(()),
        }
    }
}

impl TryFrom<WebhookAppenderConfig> for WebhookAppender {
    type Error = anyhow::Error;

    fn try_from(config: WebhookAppenderConfig) -> Result<Self> {
        Self::new(config)
    }
}

crate::impl_box_from!(WebhookAppender => dyn LogAppender);

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_config_default() {
        let config = WebhookAppenderConfig::default();
        assert_eq!(config.url, "");
        assert_eq!(config.username, None);
        assert_eq!(config.count_per_second, 1);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_config_from_json() {
        let config: WebhookAppenderConfig = json5::from_str(
            r#"{
                url: "https://example.com/hook",
                username: "MyBot",
                count_per_second: 3,
                timeout: "2s",
            }"#,
        )
        .unwrap();

        assert_eq!(config.url, "https://example.com/hook");
        assert_eq!(config.username.as_deref(), Some("MyBot"));
        assert_eq!(config.count_per_second, 3);
        assert_eq!(config.timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        assert!(WebhookAppender::new(WebhookAppenderConfig::default()).is_err());

        let config = WebhookAppenderConfig {
            url: "https://example.com/hook".to_string(),
            count_per_second: 11,
            ..Default::default()
        };
        assert!(WebhookAppender::new(config).is_err());
    }

    #[tokio::test]
    async fn test_append_posts_message() -> Result<()> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("content".into(), "INFO: hello".into()),
                Matcher::UrlEncoded("username".into(), "MyBot".into()),
            ]))
            .with_status(204)
            .create_async()
            .await;

        let appender = WebhookAppender::new(WebhookAppenderConfig {
            url: format!("{}/hook", server.url()),
            username: Some("MyBot".to_string()),
            ..Default::default()
        })?;

        appender.append("INFO: hello").await?;
        appender.flush().await?;

        mock.assert_async().await;
        assert!(appender.sink().pending().await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_append_never_fails_but_flush_reports() -> Result<()> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .with_status(500)
            .expect_at_least(1)
            .create_async()
            .await;

        let appender = WebhookAppender::new(WebhookAppenderConfig {
            url: format!("{}/hook", server.url()),
            count_per_second: 10,
            ..Default::default()
        })?;

        assert!(appender.append("ERROR: down").await.is_ok());
        assert_eq!(appender.sink().pending().await, vec!["ERROR: down".to_string()]);
        assert!(appender.flush().await.is_err());

        mock.assert_async().await;
        Ok(())
    }
}
