//! 配置相关的宏定义
//!
//! 简化 `From<Config>` 与 `Box<dyn Trait>` 转换的实现，配合 `register_trait` 使用

/// 为配置类型自动实现 From trait
///
/// 支持两种模式：
/// 1. `impl_from!(ConfigType => Type)` - 调用 Type::new(config)
/// 2. `impl_from!(ConfigType => Type, expect: "错误消息")` - 调用 Type::new(config).expect("错误消息")
#[macro_export]
macro_rules! impl_from {
    ($config_type:ty => $target_type:ty) => {
        impl From<$config_type> for $target_type {
            fn from(config: $config_type) -> Self {
                <$target_type>::new(config)
            }
        }
    };

    ($config_type:ty => $target_type:ty, expect: $msg:literal) => {
        impl From<$config_type> for $target_type {
            fn from(config: $config_type) -> Self {
                <$target_type>::new(config).expect($msg)
            }
        }
    };
}

/// 为 Box<T> 类型自动实现到 Box<dyn Trait> 的转换
///
/// 用法：`impl_box_from!(Type => dyn TraitName)`
#[macro_export]
macro_rules! impl_box_from {
    ($source_type:ty => dyn $trait_name:path) => {
        impl From<Box<$source_type>> for Box<dyn $trait_name> {
            fn from(source: Box<$source_type>) -> Self {
                source as Box<dyn $trait_name>
            }
        }
    };
}

#[cfg(test)]
mod tests {
    #[derive(Debug)]
    struct SinkConfig {
        url: String,
    }

    #[derive(Debug)]
    struct Sink {
        url: String,
    }

    impl Sink {
        fn new(config: SinkConfig) -> Self {
            Self { url: config.url }
        }
    }

    #[derive(Debug)]
    struct FallibleSink;

    impl FallibleSink {
        fn new(config: SinkConfig) -> anyhow::Result<Self> {
            anyhow::ensure!(!config.url.is_empty(), "empty url");
            Ok(Self)
        }
    }

    trait Target {
        fn url(&self) -> &str;
    }

    impl Target for Sink {
        fn url(&self) -> &str {
            &self.url
        }
    }

    impl_from!(SinkConfig => Sink);
    impl_from!(SinkConfig => FallibleSink, expect: "invalid sink config");
    impl_box_from!(Sink => dyn Target);

    #[test]
    fn test_impl_from_new() {
        let sink = Sink::from(SinkConfig {
            url: "http://a".to_string(),
        });
        assert_eq!(sink.url, "http://a");
    }

    #[test]
    fn test_impl_from_expect() {
        let _ = FallibleSink::from(SinkConfig {
            url: "http://a".to_string(),
        });
    }

    #[test]
    #[should_panic(expected = "invalid sink config")]
    fn test_impl_from_expect_panics() {
        let _ = FallibleSink::from(SinkConfig { url: String::new() });
    }

    #[test]
    fn test_impl_box_from() {
        let boxed: Box<dyn Target> = Box::new(Sink::new(SinkConfig {
            url: "http://b".to_string(),
        }))
        .into();
        assert_eq!(boxed.url(), "http://b");
    }
}
