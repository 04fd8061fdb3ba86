// Trait 注册表和工厂函数

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::RwLock;

use super::type_options::TypeOptions;

// 构造函数返回 Box<dyn Any>，实际内容为 Box<dyn Trait>
type TraitConstructor = Box<dyn Fn(JsonValue) -> Result<Box<dyn Any + Send + Sync>> + Send + Sync>;

// 外层 key 为 Trait 的 TypeId，内层 key 为类型名称
static TRAIT_REGISTRY: Lazy<RwLock<HashMap<TypeId, HashMap<String, TraitConstructor>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// 为实现特定 Trait 的类型注册构造函数
///
/// 同一个 Trait 可以注册多个实现，运行时根据 `TypeOptions.type` 选择
///
/// # 示例
/// ```ignore
/// register_trait::<ConsoleAppender, dyn LogAppender, ConsoleAppenderConfig>("ConsoleAppender")?;
///
/// let appender: Box<dyn LogAppender> = create_trait_from_type_options(&type_options)?;
/// ```
pub fn register_trait<T, Trait, Config>(type_name: &str) -> Result<()>
where
    T: Send + Sync + 'static,
    Trait: ?Sized + Send + Sync + 'static,
    Config: DeserializeOwned + Clone + Send + Sync + 'static,
    T: From<Config>,
    Box<T>: Into<Box<Trait>>,
{
    register_constructor::<Trait, Config>(type_name, |config| {
        Ok(Box::new(T::from(config)).into())
    })
}

/// 注册构造可能失败的实现
///
/// 构造失败时 `create_trait_from_type_options` 返回错误而不是 panic
pub fn register_fallible_trait<T, Trait, Config>(type_name: &str) -> Result<()>
where
    T: Send + Sync + 'static,
    Trait: ?Sized + Send + Sync + 'static,
    Config: DeserializeOwned + Clone + Send + Sync + 'static,
    T: TryFrom<Config, Error = anyhow::Error>,
    Box<T>: Into<Box<Trait>>,
{
    register_constructor::<Trait, Config>(type_name, |config| {
        Ok(Box::new(T::try_from(config)?).into())
    })
}

fn register_constructor<Trait, Config>(
    type_name: &str,
    build: impl Fn(Config) -> Result<Box<Trait>> + Send + Sync + 'static,
) -> Result<()>
where
    Trait: ?Sized + Send + Sync + 'static,
    Config: DeserializeOwned + Send + Sync + 'static,
{
    let constructor: TraitConstructor = Box::new(move |value| {
        let config: Config = serde_json::from_value(value)?;
        let trait_object: Box<Trait> = build(config)?;
        Ok(Box::new(trait_object) as Box<dyn Any + Send + Sync>)
    });

    let mut registry = TRAIT_REGISTRY
        .write()
        .map_err(|_| anyhow!("Failed to acquire write lock"))?;
    registry
        .entry(TypeId::of::<Trait>())
        .or_default()
        .insert(type_name.to_string(), constructor);

    Ok(())
}

/// 根据 TypeOptions 创建 trait object
pub fn create_trait_from_type_options<Trait>(type_options: &TypeOptions) -> Result<Box<Trait>>
where
    Trait: ?Sized + Send + Sync + 'static,
{
    let registry = TRAIT_REGISTRY
        .read()
        .map_err(|_| anyhow!("Failed to acquire read lock"))?;

    let constructor = registry
        .get(&TypeId::of::<Trait>())
        .ok_or_else(|| anyhow!("No implementations registered for trait"))?
        .get(&type_options.type_name)
        .ok_or_else(|| {
            anyhow!(
                "Type '{}' not registered for this trait",
                type_options.type_name
            )
        })?;

    constructor(type_options.options.clone())?
        .downcast::<Box<Trait>>()
        .map(|boxed| *boxed)
        .map_err(|_| anyhow!("Failed to downcast to target trait type"))
}
