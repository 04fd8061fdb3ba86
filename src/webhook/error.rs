use thiserror::Error;

/// 传输层错误
#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("webhook transport error: {0}")]
    Transport(String),
}

/// 一次投递失败的原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// 远端返回非 2xx 状态
    #[error("webhook returned status {0}")]
    Status(u16),

    /// 请求未能完成
    #[error("{0}")]
    Transport(String),
}
