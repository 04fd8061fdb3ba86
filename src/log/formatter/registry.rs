use crate::cfg::{create_trait_from_type_options, register_trait, TypeOptions};
use crate::log::formatter::text_formatter::{TextFormatter, TextFormatterConfig};
use crate::log::formatter::LogFormatter;
use anyhow::Result;

/// 注册所有 Formatter 实现
pub fn register_formatters() -> Result<()> {
    register_trait::<TextFormatter, dyn LogFormatter, TextFormatterConfig>("TextFormatter")?;
    Ok(())
}

/// 从 TypeOptions 创建 Formatter
pub fn create_formatter_from_options(options: &TypeOptions) -> Result<Box<dyn LogFormatter>> {
    create_trait_from_type_options(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::{LogLevel, LogRecord};

    #[test]
    fn test_create_text_formatter() -> Result<()> {
        register_formatters()?;

        let opts = TypeOptions::from_json(
            r#"
            {
                "type": "TextFormatter",
                "options": {
                    "with_timestamp": false
                }
            }
        "#,
        )?;

        let formatter = create_formatter_from_options(&opts)?;
        let formatted = formatter.format(&LogRecord::new(LogLevel::Info, "msg"))?;
        assert_eq!(formatted, "INFO: msg");

        Ok(())
    }

    #[test]
    fn test_unknown_formatter() -> Result<()> {
        register_formatters()?;
        assert!(create_formatter_from_options(&TypeOptions::new("XmlFormatter")).is_err());
        Ok(())
    }
}
