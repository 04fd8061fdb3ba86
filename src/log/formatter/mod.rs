mod core;
mod registry;
mod text_formatter;

pub use self::core::LogFormatter;
pub use registry::{create_formatter_from_options, register_formatters};
pub use text_formatter::{TextFormatter, TextFormatterConfig};
