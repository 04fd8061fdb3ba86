use std::sync::Arc;
use tokio::sync::Mutex;

use super::clock::{Clock, SystemClock};
use super::error::DeliveryFailure;
use super::pending_queue::PendingQueue;
use super::rate_limit::RateLimitState;
use super::transport::DeliveryTransport;

/// 单次投递内容的最大字符数
pub const MAX_CONTENT_LENGTH: usize = 2000;

/// 一次提交的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// 已交给远端（或没有需要发送的内容）
    Sent,
    /// 额度不足，消息已排队
    Queued,
    /// 投递失败，内容已重新排队
    Failed(DeliveryFailure),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Sent)
    }
}

/// 投递阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkPhase {
    /// 有额度，消息直接发送
    Idle,
    /// 额度耗尽，新消息进入队列
    Throttled,
    /// flush 进行中，等待额度恢复后排空队列
    Draining,
}

struct SinkState {
    rate: RateLimitState,
    queue: PendingQueue,
    phase: SinkPhase,
}

/// 限流 webhook 投递器
///
/// 绑定一个目标地址与显示名。所有状态由一把锁保护，提交与 flush 串行执行，
/// 保证队列顺序与限流状态一致。提交从不返回错误，失败只体现在 [`DeliveryOutcome`] 上
pub struct WebhookSink {
    url: String,
    username: Option<String>,
    count_per_second: u32,
    transport: Arc<dyn DeliveryTransport>,
    clock: Arc<dyn Clock>,
    state: Mutex<SinkState>,
}

impl WebhookSink {
    pub fn new(
        url: impl Into<String>,
        username: Option<String>,
        transport: Arc<dyn DeliveryTransport>,
    ) -> Self {
        Self {
            url: url.into(),
            username,
            count_per_second: 1,
            transport,
            clock: Arc::new(SystemClock),
            state: Mutex::new(SinkState {
                rate: RateLimitState::default(),
                queue: PendingQueue::new(),
                phase: SinkPhase::Idle,
            }),
        }
    }

    /// 设置每秒最多发送次数，最小为 1
    pub fn with_count_per_second(mut self, count_per_second: u32) -> Self {
        self.count_per_second = count_per_second.max(1);
        self
    }

    /// 替换时间源
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn count_per_second(&self) -> u32 {
        self.count_per_second
    }

    /// 提交一条消息
    ///
    /// `None` 或空字符串不携带新内容，只触发一次排空尝试
    pub async fn submit(&self, message: Option<&str>) -> DeliveryOutcome {
        let mut state = self.state.lock().await;
        let outcome = self.deliver(&mut state, message, false).await;
        state.phase = phase_after(&outcome);
        outcome
    }

    /// 排空队列
    ///
    /// 额度耗尽时睡眠到窗口重置再发送，返回 `Sent` 时队列已为空。
    /// 只用于退出前或显式检查点，不应出现在日志热路径上
    pub async fn flush(&self) -> DeliveryOutcome {
        let mut state = self.state.lock().await;
        state.phase = SinkPhase::Draining;
        let outcome = self.deliver(&mut state, None, true).await;
        state.phase = phase_after(&outcome);
        outcome
    }

    /// 当前排队的消息
    pub async fn pending(&self) -> Vec<String> {
        let state = self.state.lock().await;
        state.queue.iter().map(str::to_string).collect()
    }

    /// 当前限流状态快照
    pub async fn rate_limit(&self) -> RateLimitState {
        self.state.lock().await.rate.clone()
    }

    pub async fn phase(&self) -> SinkPhase {
        self.state.lock().await.phase
    }

    async fn deliver(
        &self,
        state: &mut SinkState,
        message: Option<&str>,
        blocking: bool,
    ) -> DeliveryOutcome {
        let message = message.filter(|m| !m.is_empty());
        let mut now = self.clock.now();

        if blocking {
            if let Some(wait) = state.rate.wait_before_send(now, self.count_per_second) {
                tracing::debug!(url = %self.url, wait_secs = wait.as_secs(), "waiting for webhook rate limit reset");
                self.clock.sleep(wait).await;
                now = self.clock.now();
            }
        }

        state.rate.refresh(now);

        if !state.rate.allows(self.count_per_second) {
            if let Some(message) = message {
                state.queue.push(message);
            }
            tracing::trace!(url = %self.url, pending = state.queue.len(), "webhook throttled");
            return DeliveryOutcome::Queued;
        }

        let payload = state.queue.take_merged(message);
        if payload.is_empty() {
            return DeliveryOutcome::Sent;
        }

        let result = self
            .transport
            .post(
                &self.url,
                truncate_content(&payload, MAX_CONTENT_LENGTH),
                self.username.as_deref(),
            )
            .await;
        state.rate.record_attempt(now, result.as_ref().ok());

        let failure = match result {
            Ok(response) if response.is_success() => return DeliveryOutcome::Sent,
            Ok(response) => DeliveryFailure::Status(response.status),
            Err(e) => DeliveryFailure::Transport(e.to_string()),
        };

        // 假定远端什么都没收到，整批重新排队
        tracing::debug!(url = %self.url, error = %failure, "webhook delivery failed, requeued");
        state.queue.push(payload);
        DeliveryOutcome::Failed(failure)
    }
}

fn phase_after(outcome: &DeliveryOutcome) -> SinkPhase {
    match outcome {
        DeliveryOutcome::Queued => SinkPhase::Throttled,
        _ => SinkPhase::Idle,
    }
}

/// 按字符截断
fn truncate_content(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}
