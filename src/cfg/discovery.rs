//! 配置文件发现
//!
//! 按 `APPDATA`、`XDG_CONFIG_HOME`、`$HOME/.config` 的顺序确定配置目录，
//! 读取其中按 section 组织的 TOML 配置文件

use std::path::{Path, PathBuf};
use thiserror::Error;

/// 配置文件名
pub const CONFIG_FILE_NAME: &str = "hooklog.toml";

/// 配置读取错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not find config")]
    NotFound,

    #[error("Section {section} not in config")]
    MissingSection { section: String },

    #[error("Variable {variable} not in section {section}")]
    MissingVariable { section: String, variable: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// 按 section 组织的配置文件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    table: toml::Table,
}

impl ConfigFile {
    /// 从 TOML 文本解析
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            table: text.parse::<toml::Table>()?,
        })
    }

    /// 从文件加载，文件不存在时返回空配置
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    /// 是否包含指定 section
    pub fn has_section(&self, section: &str) -> bool {
        matches!(self.table.get(section), Some(toml::Value::Table(_)))
    }

    /// 读取 section 中的变量，非字符串值按 TOML 文本返回
    pub fn get_config_var(&self, section: &str, variable: &str) -> Result<String, ConfigError> {
        let Some(toml::Value::Table(values)) = self.table.get(section) else {
            return Err(ConfigError::MissingSection {
                section: section.to_string(),
            });
        };

        match values.get(variable) {
            Some(toml::Value::String(s)) => Ok(s.clone()),
            Some(other) => Ok(other.to_string()),
            None => Err(ConfigError::MissingVariable {
                section: section.to_string(),
                variable: variable.to_string(),
            }),
        }
    }
}

/// 确定配置目录
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let env_dir = |key: &str| std::env::var_os(key).filter(|v| !v.is_empty()).map(PathBuf::from);

    // Windows
    if let Some(dir) = env_dir("APPDATA") {
        return Ok(dir);
    }
    if let Some(dir) = env_dir("XDG_CONFIG_HOME") {
        return Ok(dir);
    }
    env_dir("HOME")
        .map(|home| home.join(".config"))
        .ok_or(ConfigError::NotFound)
}

/// 加载配置目录下的 `hooklog.toml`
pub fn get_config() -> Result<ConfigFile, ConfigError> {
    ConfigFile::load(config_dir()?.join(CONFIG_FILE_NAME))
}
