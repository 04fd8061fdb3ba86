use crate::cfg::{
    create_trait_from_type_options, register_fallible_trait, register_trait, TypeOptions,
};
use crate::log::appender::LogAppender;
use crate::log::appender::{
    console_appender::{ConsoleAppender, ConsoleAppenderConfig},
    rolling_file_appender::{RollingFileAppender, RollingFileAppenderConfig},
    webhook_appender::{WebhookAppender, WebhookAppenderConfig},
};
use anyhow::Result;

/// 注册所有 Appender 实现
pub fn register_appenders() -> Result<()> {
    register_trait::<ConsoleAppender, dyn LogAppender, ConsoleAppenderConfig>("ConsoleAppender")?;
    register_trait::<RollingFileAppender, dyn LogAppender, RollingFileAppenderConfig>(
        "RollingFileAppender",
    )?;
    register_fallible_trait::<WebhookAppender, dyn LogAppender, WebhookAppenderConfig>(
        "WebhookAppender",
    )?;
    Ok(())
}

/// 从 TypeOptions 创建 Appender
pub fn create_appender_from_options(options: &TypeOptions) -> Result<Box<dyn LogAppender>> {
    create_trait_from_type_options(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_console_appender() -> Result<()> {
        register_appenders()?;

        let opts = TypeOptions::from_json(
            r#"
            {
                "type": "ConsoleAppender",
                "options": {
                    "target": "stdout"
                }
            }
        "#,
        )?;

        let appender = create_appender_from_options(&opts)?;
        assert!(appender.append("test message").await.is_ok());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_rolling_file_appender() -> Result<()> {
        register_appenders()?;

        let temp_dir = tempfile::TempDir::new()?;
        let log_path = temp_dir.path().join("test.log");
        let opts = TypeOptions::from_json(&format!(
            r#"
            {{
                "type": "RollingFileAppender",
                "options": {{
                    "file_path": "{}",
                    "backup_count": 2
                }}
            }}
        "#,
            log_path.display()
        ))?;

        let appender = create_appender_from_options(&opts)?;
        appender.append("test message").await?;
        assert_eq!(tokio::fs::read_to_string(&log_path).await?, "test message\n");

        Ok(())
    }

    #[tokio::test]
    async fn test_create_webhook_appender() -> Result<()> {
        register_appenders()?;

        let opts = TypeOptions::from_toml(
            r#"
            type = "WebhookAppender"

            [options]
            url = "https://example.com/hook"
            username = "MyBot"
            timeout = "5s"
        "#,
        )?;

        assert!(create_appender_from_options(&opts).is_ok());

        Ok(())
    }

    #[test]
    fn test_invalid_webhook_appender_is_an_error() -> Result<()> {
        register_appenders()?;

        let opts = TypeOptions::with_options(
            "WebhookAppender",
            serde_json::json!({ "url": "https://example.com/hook", "count_per_second": 11 }),
        );
        let err = create_appender_from_options(&opts).err().unwrap();
        assert!(err.to_string().contains("count_per_second"));

        let opts = TypeOptions::new("WebhookAppender");
        assert!(create_appender_from_options(&opts).is_err());

        Ok(())
    }
}
