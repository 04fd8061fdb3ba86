//! webhook 模块 - 限流 webhook 投递引擎
//!
//! 将格式化后的日志消息投递到带限流协议的远端 webhook（如聊天频道通知），
//! 预算耗尽时合并排队，保证消息不因限流丢失。
//!
//! # 组成
//!
//! - [`RateLimitState`]: 远端公布的剩余额度与重置时间
//! - [`PendingQueue`]: 尚未投递的消息，按插入顺序保存
//! - [`WebhookSink`]: 提交、合并、投递、失败重新入队
//! - [`DeliveryTransport`]: 实际执行 POST 的可注入能力，默认实现为 [`ReqwestTransport`]
//! - [`Clock`]: 可注入的时间源
//!
//! # 示例
//!
//! ```rust,no_run
//! use hooklog::webhook::{ReqwestTransport, WebhookSink};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(10))?);
//!     let sink = WebhookSink::new("https://example.com/hook", Some("MyBot".to_string()), transport)
//!         .with_count_per_second(2);
//!
//!     let outcome = sink.submit(Some("INFO: started")).await;
//!     println!("{:?}", outcome);
//!
//!     // 退出前排空队列
//!     sink.flush().await;
//!     Ok(())
//! }
//! ```

mod clock;
mod error;
mod pending_queue;
mod rate_limit;
mod sink;
mod transport;

pub use clock::{Clock, SystemClock};
pub use error::{DeliveryFailure, WebhookError};
pub use pending_queue::PendingQueue;
pub use rate_limit::{RateLimitState, INITIAL_BUDGET};
pub use sink::{DeliveryOutcome, SinkPhase, WebhookSink, MAX_CONTENT_LENGTH};
pub use transport::{
    DeliveryResponse, DeliveryTransport, ReqwestTransport, HEADER_REMAINING, HEADER_RESET,
    HEADER_RESET_AFTER,
};

#[cfg(test)]
pub(crate) use clock::ManualClock;
