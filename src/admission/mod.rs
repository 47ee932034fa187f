//! Admission control for chat requests. Every message passes through
//! here before anything is sent to the language model.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. Per-minute limit keyed by client and session
//! 2. Daily limit keyed by client
//! 3. Message length
//! 4. Conversation length (message plus history)
//! 5. Abuse patterns
//!
//! Both limiters are checked before either is counted so a denied
//! request never uses up quota. Each window stays locked from its
//! check until the request is counted or turned away.

mod abuse;
mod rate_limiter;

pub use abuse::AbuseFilter;
pub use rate_limiter::{RateLimitRecord, RateLimiter, WindowSlot};

use chrono::{DateTime, TimeDelta, Utc};

use crate::core::ChatLimits;
use crate::core::usage::text_length;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitWindow {
    PerMinute,
    Daily,
}

impl LimitWindow {
    pub fn label(&self) -> &'static str {
        match self {
            LimitWindow::PerMinute => "1 minute",
            LimitWindow::Daily => "24 hours",
        }
    }

    // Per-minute waits are reported in seconds, daily waits in hours
    fn reset_in_units(&self, wait: TimeDelta) -> i64 {
        let millis = wait.num_milliseconds().max(0);
        let unit = match self {
            LimitWindow::PerMinute => 1000,
            LimitWindow::Daily => 1000 * 60 * 60,
        };
        (millis + unit - 1) / unit
    }
}

/// Why a request was turned away.
#[derive(Debug, Clone, PartialEq)]
pub enum Denial {
    RateLimited {
        window: LimitWindow,
        remaining: u32,
        reset_in: i64,
        limit: u32,
        retry_after: TimeDelta,
    },
    MessageTooLong {
        max: usize,
    },
    ConversationTooLong {
        max: usize,
    },
    Suspicious,
}

impl Denial {
    /// Short machine readable error name.
    pub fn error(&self) -> &'static str {
        match self {
            Denial::RateLimited {
                window: LimitWindow::PerMinute,
                ..
            } => "Rate limit exceeded",
            Denial::RateLimited {
                window: LimitWindow::Daily,
                ..
            } => "Daily limit exceeded",
            Denial::MessageTooLong { .. } => "Message too long",
            Denial::ConversationTooLong { .. } => "Conversation too long",
            Denial::Suspicious => "Suspicious request",
        }
    }

    /// Explanation shown to the visitor.
    pub fn message(&self) -> String {
        match self {
            Denial::RateLimited {
                window: LimitWindow::PerMinute,
                reset_in,
                ..
            } => format!(
                "Too many requests. Please wait {} seconds before trying again.",
                reset_in
            ),
            Denial::RateLimited {
                window: LimitWindow::Daily,
                reset_in,
                ..
            } => format!(
                "Daily chat limit reached. Please try again in {} hours.",
                reset_in
            ),
            Denial::MessageTooLong { max } => {
                format!("Please keep your message under {} characters.", max)
            }
            Denial::ConversationTooLong { .. } => {
                "Please start a new conversation or keep your message shorter.".to_string()
            }
            Denial::Suspicious => {
                "This type of request is not allowed to prevent abuse.".to_string()
            }
        }
    }

    /// How long the caller should wait before retrying, if waiting
    /// helps at all.
    pub fn retry_after(&self) -> Option<TimeDelta> {
        match self {
            Denial::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Denial::RateLimited { .. })
    }
}

/// Quota left after an admitted request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quota {
    pub remaining_per_minute: u32,
    pub remaining_daily: u32,
    pub total_length: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    Allowed(Quota),
    Denied(Denial),
}

/// Rate limiters and content checks guarding the model call. Cheap
/// to clone, clones share counters.
#[derive(Debug, Clone)]
pub struct AdmissionController {
    limits: ChatLimits,
    per_minute: RateLimiter,
    daily: RateLimiter,
    abuse: AbuseFilter,
}

impl AdmissionController {
    pub fn new(limits: ChatLimits) -> Self {
        let per_minute = RateLimiter::new(limits.per_minute);
        let daily = RateLimiter::new(limits.daily);
        Self::with_limiters(limits, per_minute, daily)
    }

    pub fn with_limiters(limits: ChatLimits, per_minute: RateLimiter, daily: RateLimiter) -> Self {
        Self {
            limits,
            per_minute,
            daily,
            abuse: AbuseFilter::default(),
        }
    }

    pub fn per_minute(&self) -> &RateLimiter {
        &self.per_minute
    }

    pub fn daily(&self) -> &RateLimiter {
        &self.daily
    }

    pub fn check<I, S>(&self, key: &str, daily_key: &str, message: &str, history: I) -> Admission
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.check_at(key, daily_key, message, history, Utc::now())
    }

    pub fn check_at<I, S>(
        &self,
        key: &str,
        daily_key: &str,
        message: &str,
        history: I,
        now: DateTime<Utc>,
    ) -> Admission
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let message_length = text_length(message);
        let history_length: usize = history
            .into_iter()
            .map(|content| text_length(content.as_ref()))
            .sum();
        let total_length = message_length + history_length;

        // Content is judged before any window is locked. Rate limits
        // still take precedence when reporting a denial.
        let content_denial = if message_length > self.limits.max_message_length {
            Some(Denial::MessageTooLong {
                max: self.limits.max_message_length,
            })
        } else if total_length > self.limits.max_conversation_length {
            Some(Denial::ConversationTooLong {
                max: self.limits.max_conversation_length,
            })
        } else if self.abuse.is_suspicious(message) {
            Some(Denial::Suspicious)
        } else {
            None
        };

        // Slot order is always per-minute then daily
        let minute = self.per_minute.slot(key, now);
        if !minute.has_capacity() {
            return Admission::Denied(rate_limited(LimitWindow::PerMinute, &minute, now));
        }

        let daily = self.daily.slot(daily_key, now);
        if !daily.has_capacity() {
            return Admission::Denied(rate_limited(LimitWindow::Daily, &daily, now));
        }

        if let Some(denial) = content_denial {
            drop(daily);
            drop(minute);
            if matches!(denial, Denial::Suspicious) {
                tracing::info!(
                    "Suspicious message from {}: {:?}",
                    daily_key,
                    self.abuse.matches(message)
                );
            }
            return Admission::Denied(denial);
        }

        Admission::Allowed(Quota {
            remaining_per_minute: minute.commit(now),
            remaining_daily: daily.commit(now),
            total_length,
        })
    }

    /// Drop expired records from both limiters.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        self.per_minute.sweep(now) + self.daily.sweep(now)
    }
}

fn rate_limited(window: LimitWindow, slot: &WindowSlot<'_>, now: DateTime<Utc>) -> Denial {
    let wait = slot.reset_in(now);
    Denial::RateLimited {
        window,
        remaining: slot.remaining(),
        reset_in: window.reset_in_units(wait),
        limit: slot.limit(),
        retry_after: wait,
    }
}
