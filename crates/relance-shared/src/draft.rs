//! Context and prompt assembly for the external drafting model.
//!
//! Relance never calls a completion API itself.  This module only builds
//! the strings a caller hands to whatever text generator it wires up, so
//! everything here is deterministic and testable.

use std::fmt::Write as _;

use crate::constants::CONTEXT_MESSAGE_COUNT;
use crate::models::{Conversation, Message};

/// Conversation context rendered for the drafting model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftContext {
    /// Whether the conversation is a group chat (changes the tone line).
    pub is_group: bool,
    /// The rendered context block: chat facts plus the tail of the history.
    pub body: String,
}

impl DraftContext {
    /// Render a conversation and the tail of its history.
    ///
    /// `history` must be ordered oldest to newest, as returned by the
    /// store; only the last [`CONTEXT_MESSAGE_COUNT`] messages are
    /// included.  Messages without text render as `[media/reaction]`.
    pub fn from_conversation(
        conversation: &Conversation,
        history: &[Message],
        hours_since: f64,
    ) -> Self {
        let is_group = conversation.is_group();
        let mut body = String::new();

        let chat_type = if is_group {
            "group chat"
        } else {
            "1:1 conversation"
        };
        let _ = writeln!(body, "Chat type: {chat_type}");

        if let Some(name) = conversation.display_name.as_deref().filter(|n| !n.is_empty()) {
            let _ = writeln!(body, "Chat name: {name}");
        }

        if is_group {
            let _ = writeln!(body, "Participants: {}", conversation.participants.join(", "));
        } else {
            let _ = writeln!(body, "Contact: {}", conversation.identifier);
        }

        let _ = writeln!(body);
        let _ = writeln!(body, "Time since last message: {hours_since:.1} hours");
        let _ = writeln!(body);
        let _ = writeln!(body, "Recent conversation (oldest to newest):");

        let tail_start = history.len().saturating_sub(CONTEXT_MESSAGE_COUNT);
        for message in &history[tail_start..] {
            let sender = if message.is_from_me {
                "You"
            } else {
                message.sender.as_str()
            };
            let text = message
                .text
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or("[media/reaction]");
            let _ = writeln!(body, "{sender}: {text}");
        }

        Self { is_group, body }
    }
}

/// Build the full instruction prompt for a follow-up draft.
pub fn followup_prompt(context: &DraftContext) -> String {
    let tone = if context.is_group {
        "casual and friendly for group chats"
    } else {
        "polite but not overly formal"
    };

    let mut prompt = String::from(
        "You are helping draft a follow-up message for an iMessage conversation \
         that hasn't received a reply.\n\n",
    );
    prompt.push_str(&context.body);
    let _ = write!(
        prompt,
        "\nGenerate a brief, natural follow-up message that:\n\
         1. Is {tone}\n\
         2. Acknowledges the delay without being pushy or annoying\n\
         3. Gently nudges for a response\n\
         4. Is SHORT (1-2 sentences max)\n\
         5. Sounds like something a real person would text\n\n\
         Do not include quotes or explanations - just output the message text \
         that should be sent."
    );
    prompt
}
