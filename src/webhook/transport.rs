use chrono::{DateTime, SubsecRound, Utc};
use reqwest::header::HeaderMap;
use serde::Deserialize;
use std::time::Duration;

use super::error::WebhookError;

/// 剩余请求数
pub const HEADER_REMAINING: &str = "x-ratelimit-remaining";
/// 窗口重置时间（epoch 秒，可带小数）
pub const HEADER_RESET: &str = "x-ratelimit-reset";
/// 距窗口重置的秒数（可带小数）
pub const HEADER_RESET_AFTER: &str = "x-ratelimit-reset-after";

/// 一次投递的响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResponse {
    /// HTTP 状态码
    pub status: u16,
    /// 剩余请求数，缺失或无法解析时为 None
    pub remaining: Option<i64>,
    /// 窗口重置时间，缺失或无法解析时为 None
    pub reset_at: Option<DateTime<Utc>>,
}

impl DeliveryResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 投递能力
///
/// 负责实际的网络请求并返回状态码与限流头。重试、TLS、连接池由实现自行决定
#[async_trait::async_trait]
pub trait DeliveryTransport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        body: &str,
        username: Option<&str>,
    ) -> Result<DeliveryResponse, WebhookError>;
}

/// 429 响应体
#[derive(Debug, Deserialize)]
struct RateLimitedBody {
    retry_after: Option<f64>,
}

/// 基于 reqwest 的投递实现
///
/// 以表单提交 `content` 字段，设置了显示名时附带 `username` 字段
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, WebhookError> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }
}

#[async_trait::async_trait]
impl DeliveryTransport for ReqwestTransport {
    async fn post(
        &self,
        url: &str,
        body: &str,
        username: Option<&str>,
    ) -> Result<DeliveryResponse, WebhookError> {
        let mut form = vec![("content", body)];
        if let Some(username) = username {
            form.push(("username", username));
        }

        let resp = self.client.post(url).form(&form).send().await?;

        let now = Utc::now().trunc_subsecs(0);
        let status = resp.status().as_u16();
        let remaining = parse_remaining(resp.headers());
        let mut reset_at = parse_reset_at(resp.headers(), now);

        if status == 429 && reset_at.is_none() {
            // 响应体解析失败视为没有信息
            if let Ok(body) = resp.json::<RateLimitedBody>().await {
                reset_at = body.retry_after.and_then(|secs| seconds_after(now, secs));
            }
        }

        Ok(DeliveryResponse {
            status,
            remaining,
            reset_at,
        })
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name)?.to_str().ok().map(str::trim)
}

fn header_f64(headers: &HeaderMap, name: &str) -> Option<f64> {
    header_str(headers, name)?
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

pub(crate) fn parse_remaining(headers: &HeaderMap) -> Option<i64> {
    header_str(headers, HEADER_REMAINING)?.parse().ok()
}

/// 解析重置时间，向上取整到秒
pub(crate) fn parse_reset_at(headers: &HeaderMap, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if let Some(epoch) = header_f64(headers, HEADER_RESET) {
        return DateTime::from_timestamp(epoch.ceil() as i64, 0);
    }
    header_f64(headers, HEADER_RESET_AFTER).and_then(|secs| seconds_after(now, secs))
}

fn seconds_after(now: DateTime<Utc>, secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    now.checked_add_signed(chrono::Duration::seconds(secs.ceil() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_parse_remaining() {
        assert_eq!(parse_remaining(&headers(&[(HEADER_REMAINING, "4")])), Some(4));
        assert_eq!(parse_remaining(&headers(&[(HEADER_REMAINING, " 0 ")])), Some(0));
        assert_eq!(parse_remaining(&headers(&[(HEADER_REMAINING, "many")])), None);
        assert_eq!(parse_remaining(&HeaderMap::new()), None);
    }

    #[test]
    fn test_parse_reset_epoch_rounds_up() {
        let map = headers(&[(HEADER_RESET, "1700000003.123")]);
        assert_eq!(
            parse_reset_at(&map, now()),
            DateTime::from_timestamp(1_700_000_004, 0)
        );
    }

    #[test]
    fn test_parse_reset_after_fallback() {
        let map = headers(&[(HEADER_RESET_AFTER, "1.5")]);
        assert_eq!(
            parse_reset_at(&map, now()),
            Some(now() + chrono::Duration::seconds(2))
        );
    }

    #[test]
    fn test_parse_reset_malformed() {
        assert_eq!(parse_reset_at(&headers(&[(HEADER_RESET, "soon")]), now()), None);
        assert_eq!(parse_reset_at(&headers(&[(HEADER_RESET, "-1")]), now()), None);
        assert_eq!(parse_reset_at(&HeaderMap::new(), now()), None);
    }

    #[test]
    fn test_is_success() {
        let mut response = DeliveryResponse {
            status: 204,
            remaining: None,
            reset_at: None,
        };
        assert!(response.is_success());

        response.status = 429;
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_reqwest_transport_posts_form() -> anyhow::Result<()> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("content".into(), "INFO: hello".into()),
                mockito::Matcher::UrlEncoded("username".into(), "MyBot".into()),
            ]))
            .with_status(204)
            .with_header(HEADER_REMAINING, "4")
            .with_header(HEADER_RESET, "1700000010")
            .create_async()
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(5))?;
        let response = transport
            .post(&format!("{}/hook", server.url()), "INFO: hello", Some("MyBot"))
            .await?;

        mock.assert_async().await;
        assert!(response.is_success());
        assert_eq!(response.remaining, Some(4));
        assert_eq!(response.reset_at, DateTime::from_timestamp(1_700_000_010, 0));

        Ok(())
    }

    #[tokio::test]
    async fn test_reqwest_transport_rate_limited_body() -> anyhow::Result<()> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_header(HEADER_REMAINING, "0")
            .with_body(r#"{"message": "You are being rate limited.", "retry_after": 2.5}"#)
            .create_async()
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(5))?;
        let before = Utc::now().trunc_subsecs(0);
        let response = transport
            .post(&format!("{}/hook", server.url()), "x", None)
            .await?;

        mock.assert_async().await;
        assert_eq!(response.status, 429);
        assert_eq!(response.remaining, Some(0));
        let reset_at = response.reset_at.expect("retry_after should set reset_at");
        assert!(reset_at >= before + chrono::Duration::seconds(3));

        Ok(())
    }

    #[tokio::test]
    async fn test_reqwest_transport_connection_error() -> anyhow::Result<()> {
        let transport = ReqwestTransport::new(Duration::from_millis(500))?;
        let result = transport.post("http://127.0.0.1:1/hook", "x", None).await;
        assert!(matches!(result, Err(WebhookError::Request(_))));
        Ok(())
    }
}
