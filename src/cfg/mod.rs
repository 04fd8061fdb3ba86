//! cfg 模块 - 配置管理
//!
//! 提供基于 `TypeOptions` 的组件创建，以及配置文件的发现与读取

pub mod discovery;
pub mod macros;
pub mod registry;
pub mod serde_duration;
pub mod type_options;

// 重新导出公共 API
pub use discovery::{config_dir, get_config, ConfigError, ConfigFile, CONFIG_FILE_NAME};
pub use registry::{create_trait_from_type_options, register_fallible_trait, register_trait};
pub use serde_duration::HumanDur;
pub use type_options::TypeOptions;
