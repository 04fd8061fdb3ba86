use chrono::{DateTime, Utc};
use std::time::Duration;

use super::transport::DeliveryResponse;

/// 首次收到响应之前假定的保守额度，窗口重置后也恢复到该值
pub const INITIAL_BUDGET: i64 = 5;

/// 远端限流状态
///
/// - `remaining`: 当前窗口剩余的请求数
/// - `reset_at`: 窗口重置时间，未知时为 None
/// - `last_sent_at` / `sent_this_window`: 本地每秒发送上限的计数，与远端窗口无关
///
/// 状态转换：
/// `Unknown -> Known` 收到第一个带限流头的响应；
/// `Known(remaining > 0) -> Known(0)` 发送耗尽额度；
/// `Known(0) -> Known(INITIAL_BUDGET)` 时间越过 `reset_at`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitState {
    remaining: i64,
    reset_at: Option<DateTime<Utc>>,
    last_sent_at: Option<DateTime<Utc>>,
    sent_this_window: u32,
}

impl Default for RateLimitState {
    fn default() -> Self {
        Self {
            remaining: INITIAL_BUDGET,
            reset_at: None,
            last_sent_at: None,
            sent_this_window: 0,
        }
    }
}

impl RateLimitState {
    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        self.reset_at
    }

    pub fn last_sent_at(&self) -> Option<DateTime<Utc>> {
        self.last_sent_at
    }

    pub fn sent_this_window(&self) -> u32 {
        self.sent_this_window
    }

    /// 阻塞模式下发送前需要等待的时长，无需等待时返回 None
    ///
    /// 额度耗尽时等待到 `reset_at`，至少 1 秒；本秒已达发送上限时等待 1 秒
    pub(crate) fn wait_before_send(
        &self,
        now: DateTime<Utc>,
        count_per_second: u32,
    ) -> Option<Duration> {
        if self.remaining <= 0 {
            let secs = self
                .reset_at
                .map(|reset_at| (reset_at - now).num_seconds())
                .unwrap_or(1)
                .max(1);
            return Some(Duration::from_secs(secs as u64));
        }

        if self.last_sent_at == Some(now) && self.sent_this_window >= count_per_second {
            return Some(Duration::from_secs(1));
        }

        None
    }

    /// 按当前时间刷新窗口
    pub(crate) fn refresh(&mut self, now: DateTime<Utc>) {
        if matches!(self.reset_at, Some(reset_at) if now >= reset_at) {
            self.remaining = INITIAL_BUDGET;
            self.reset_at = None;
        }

        if self.last_sent_at != Some(now) {
            self.sent_this_window = 0;
        }
    }

    /// 当前是否允许发送
    pub(crate) fn allows(&self, count_per_second: u32) -> bool {
        self.remaining > 0 && self.sent_this_window < count_per_second
    }

    /// 记录一次发送尝试
    ///
    /// 响应中缺失或无法解析的头不改变已有状态。剩余额度为 0 而重置时间未知时，
    /// 假定窗口在下一秒重置
    pub(crate) fn record_attempt(&mut self, now: DateTime<Utc>, response: Option<&DeliveryResponse>) {
        if let Some(response) = response {
            if let Some(remaining) = response.remaining {
                self.remaining = remaining.max(0);
            }
            if let Some(reset_at) = response.reset_at {
                self.reset_at = Some(reset_at);
            }
        }

        if self.remaining <= 0 && self.reset_at.is_none() {
            self.reset_at = Some(now + chrono::Duration::seconds(1));
        }

        self.last_sent_at = Some(now);
        self.sent_this_window += 1;
    }
}
