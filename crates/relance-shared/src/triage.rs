//! Staleness classification for conversation snapshots.
//!
//! The follow-up rule is directional: a conversation needs a nudge only
//! when the last message is older than the threshold AND the local user
//! sent it.  When the other party sent the last message they are waiting
//! on a reply instead, which is surfaced separately by
//! [`StaleDetector::waiting_on_you`].

use chrono::{DateTime, Local, Timelike};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_STALE_THRESHOLD_HOURS;
use crate::models::Conversation;

/// A conversation annotated with staleness facts for one triage pass.
///
/// Recomputed from the wall clock on every pass; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaleConversation {
    /// The conversation snapshot this verdict is about.
    pub conversation: Conversation,
    /// Fractional hours since the newest message.
    pub hours_since_last_message: f64,
    /// Whether the local user sent the newest message.
    pub last_message_from_me: bool,
    /// Whether the local user should send a follow-up.
    pub requires_followup: bool,
    /// Human-readable verdict, shown to the user verbatim.
    pub reason: String,
}

/// Classifier for conversations that have gone quiet.
#[derive(Debug, Clone)]
pub struct StaleDetector {
    stale_threshold_hours: u32,
}

impl Default for StaleDetector {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_THRESHOLD_HOURS)
    }
}

impl StaleDetector {
    pub fn new(stale_threshold_hours: u32) -> Self {
        Self {
            stale_threshold_hours,
        }
    }

    /// Conversations the local user should nudge, in input order.
    ///
    /// The clock is sampled once for the whole pass, so every verdict in
    /// the result is relative to the same instant.  Conversations with no
    /// messages are skipped.
    pub fn analyze(&self, conversations: &[Conversation]) -> Vec<StaleConversation> {
        self.analyze_at(conversations, Local::now())
    }

    /// Clock-injected variant of [`analyze`](Self::analyze).
    pub fn analyze_at(
        &self,
        conversations: &[Conversation],
        now: DateTime<Local>,
    ) -> Vec<StaleConversation> {
        let mut flagged = Vec::new();

        for conversation in conversations {
            let Some(last) = &conversation.last_message else {
                continue;
            };

            let hours_since = hours_between(last.date, now);
            let last_from_me = last.is_from_me;
            let is_stale = hours_since >= f64::from(self.stale_threshold_hours);

            if !(is_stale && last_from_me) {
                continue;
            }

            flagged.push(StaleConversation {
                conversation: conversation.clone(),
                hours_since_last_message: hours_since,
                last_message_from_me: last_from_me,
                requires_followup: true,
                reason: reason(is_stale, last_from_me, hours_since),
            });
        }

        flagged
    }

    /// Conversations where the other party sent last and has been waiting
    /// at least `min_hours`, longest wait first.
    pub fn waiting_on_you(
        &self,
        conversations: &[Conversation],
        min_hours: f64,
    ) -> Vec<StaleConversation> {
        self.waiting_on_you_at(conversations, min_hours, Local::now())
    }

    /// Clock-injected variant of [`waiting_on_you`](Self::waiting_on_you).
    pub fn waiting_on_you_at(
        &self,
        conversations: &[Conversation],
        min_hours: f64,
        now: DateTime<Local>,
    ) -> Vec<StaleConversation> {
        let mut waiting = Vec::new();

        for conversation in conversations {
            let Some(last) = &conversation.last_message else {
                continue;
            };
            if last.is_from_me {
                continue;
            }

            let hours_since = hours_between(last.date, now);
            if hours_since < min_hours {
                continue;
            }

            waiting.push(StaleConversation {
                conversation: conversation.clone(),
                hours_since_last_message: hours_since,
                last_message_from_me: false,
                requires_followup: false,
                reason: "Waiting for your response".to_string(),
            });
        }

        waiting.sort_by(|a, b| {
            b.hours_since_last_message
                .total_cmp(&a.hours_since_last_message)
        });
        waiting
    }

    /// Minimum wait before a conversation shows up in
    /// [`waiting_on_you`](Self::waiting_on_you): a quarter of the stale
    /// threshold, floored to whole hours.
    pub fn reply_debt_floor(&self) -> f64 {
        f64::from(self.stale_threshold_hours / 4)
    }
}

/// Whether `hour` falls inside the `[start, end)` quiet window.
///
/// A window with `start > end` spans midnight: 22..8 covers 22:00 through
/// 07:59 local time.
pub fn hour_in_quiet_window(hour: u32, start: u32, end: u32) -> bool {
    if start < end {
        start <= hour && hour < end
    } else {
        hour >= start || hour < end
    }
}

/// Quiet-window check against the current local time.
pub fn is_quiet_hours(quiet_start: u32, quiet_end: u32) -> bool {
    hour_in_quiet_window(Local::now().hour(), quiet_start, quiet_end)
}

fn hours_between(earlier: DateTime<Local>, now: DateTime<Local>) -> f64 {
    now.signed_duration_since(earlier).num_milliseconds() as f64 / 3_600_000.0
}

fn reason(is_stale: bool, last_from_me: bool, hours_since: f64) -> String {
    if !is_stale {
        return format!("Recent activity ({hours_since:.1}h ago)");
    }
    if !last_from_me {
        return "Waiting for your response".to_string();
    }
    format!("No reply to your message for {hours_since:.1}h")
}
