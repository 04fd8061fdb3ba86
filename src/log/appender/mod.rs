mod console_appender;
mod registry;
mod rolling_file_appender;
mod trait_;
mod webhook_appender;

pub use console_appender::{ConsoleAppender, ConsoleAppenderConfig, Target};
pub use registry::{create_appender_from_options, register_appenders};
pub use rolling_file_appender::{RollingFileAppender, RollingFileAppenderConfig};
pub use trait_::LogAppender;
pub use webhook_appender::{WebhookAppender, WebhookAppenderConfig};
