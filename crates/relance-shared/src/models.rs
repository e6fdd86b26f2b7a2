//! Snapshot types read out of the local Messages database.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to a UI or HTTP layer.  All of them are read-only views: the
//! underlying history is never mutated through this crate.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single message as it appears in the history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// SQLite ROWID of the message, unique within one database.
    pub rowid: i64,
    /// Resolved message text.  `None` when the message carries no
    /// recoverable text (media, reactions, undecodable rich-text blobs).
    pub text: Option<String>,
    /// Phone number or email of the sender, or `"me"` for own messages.
    pub sender: String,
    /// Whether the local user sent this message.
    pub is_from_me: bool,
    /// When the message was sent, in local wall-clock time.
    pub date: DateTime<Local>,
    /// ROWID of the conversation this message belongs to.
    pub chat_id: i64,
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// A conversation (1:1 or group) with its most recent activity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversation {
    /// SQLite ROWID of the chat.
    pub chat_id: i64,
    /// Raw chat identifier: a phone number, an email, or a group id.
    pub identifier: String,
    /// Optional user-assigned name (group chats mostly).
    pub display_name: Option<String>,
    /// Distinct handles participating in the chat.  Order is not
    /// significant.
    pub participants: Vec<String>,
    /// The newest message, or `None` for a conversation with no messages.
    pub last_message: Option<Message>,
    /// Total number of messages in the chat.
    pub message_count: i64,
}

impl Conversation {
    /// A chat with more than one participant is a group chat.
    pub fn is_group(&self) -> bool {
        self.participants.len() > 1
    }

    /// Best human-readable label: the display name when set, otherwise the
    /// raw identifier.
    pub fn label(&self) -> &str {
        match &self.display_name {
            Some(name) if !name.is_empty() => name,
            _ => &self.identifier,
        }
    }
}

// ---------------------------------------------------------------------------
// History helpers
// ---------------------------------------------------------------------------

/// Count messages that carry real conversational text.
///
/// Very short texts (5 characters or fewer) are treated as noise, the same
/// bucket as reactions and media placeholders.
pub fn count_context_texts(messages: &[Message]) -> usize {
    messages
        .iter()
        .filter(|m| matches!(&m.text, Some(t) if t.chars().count() > 5))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn message(text: Option<&str>) -> Message {
        Message {
            rowid: 1,
            text: text.map(str::to_string),
            sender: "+15551234567".to_string(),
            is_from_me: false,
            date: Local.timestamp_opt(1_700_000_000, 0).unwrap(),
            chat_id: 7,
        }
    }

    #[test]
    fn test_is_group() {
        let mut convo = Conversation {
            chat_id: 7,
            identifier: "chat123".to_string(),
            display_name: None,
            participants: vec!["+15551234567".to_string()],
            last_message: None,
            message_count: 0,
        };
        assert!(!convo.is_group());

        convo.participants.push("friend@example.com".to_string());
        assert!(convo.is_group());
    }

    #[test]
    fn test_label_prefers_display_name() {
        let mut convo = Conversation {
            chat_id: 7,
            identifier: "+15551234567".to_string(),
            display_name: Some("Ski Trip".to_string()),
            participants: vec![],
            last_message: None,
            message_count: 0,
        };
        assert_eq!(convo.label(), "Ski Trip");

        convo.display_name = Some(String::new());
        assert_eq!(convo.label(), "+15551234567");

        convo.display_name = None;
        assert_eq!(convo.label(), "+15551234567");
    }

    #[test]
    fn test_count_context_texts_ignores_short_and_missing() {
        let history = vec![
            message(Some("are we still on for tomorrow?")),
            message(Some("ok")),
            message(Some("haha")),
            message(None),
            message(Some("sounds good to me")),
        ];
        assert_eq!(count_context_texts(&history), 2);
    }

    #[test]
    fn test_count_context_texts_boundary() {
        // Exactly five characters is still noise; six is context.
        let history = vec![message(Some("12345")), message(Some("123456"))];
        assert_eq!(count_context_texts(&history), 1);
    }
}
