//! Conversation listing and lookup.

use relance_shared::models::Conversation;
use rusqlite::{params, Connection};

use crate::error::{Result, StoreError};
use crate::messages::last_message_for;
use crate::store::MessageStore;

impl MessageStore {
    /// List conversations by recency of their newest message.
    ///
    /// Chats without an identifier (dangling rows left behind by
    /// Messages) are skipped.  Ordering is last activity descending with
    /// the chat ROWID as a tie-break, so repeated passes over an
    /// unchanged database see the same order.  Chats with no messages
    /// sort last.
    pub fn recent_conversations(&self, limit: usize) -> Result<Vec<Conversation>> {
        let conn = self.read_connection()?;

        let mut stmt = conn.prepare(
            "SELECT
                 c.ROWID AS chat_id,
                 c.chat_identifier,
                 c.display_name,
                 MAX(m.date) AS last_message_date,
                 COUNT(m.ROWID) AS message_count
             FROM chat c
             LEFT JOIN chat_message_join cmj ON c.ROWID = cmj.chat_id
             LEFT JOIN message m ON cmj.message_id = m.ROWID
             WHERE c.chat_identifier IS NOT NULL AND c.chat_identifier != ''
             GROUP BY c.ROWID
             ORDER BY last_message_date DESC, chat_id ASC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], row_to_summary)?;

        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row?);
        }

        let mut conversations = Vec::with_capacity(summaries.len());
        for summary in summaries {
            conversations.push(assemble_conversation(&conn, summary)?);
        }

        tracing::debug!(count = conversations.len(), "listed recent conversations");
        Ok(conversations)
    }

    /// Fetch a single conversation by its ROWID.
    ///
    /// Fails with [`StoreError::NotFound`] when the chat does not exist
    /// or has no identifier.
    pub fn conversation_by_id(&self, chat_id: i64) -> Result<Conversation> {
        let conn = self.read_connection()?;

        let summary = conn
            .query_row(
                "SELECT
                     c.ROWID AS chat_id,
                     c.chat_identifier,
                     c.display_name,
                     MAX(m.date) AS last_message_date,
                     COUNT(m.ROWID) AS message_count
                 FROM chat c
                 LEFT JOIN chat_message_join cmj ON c.ROWID = cmj.chat_id
                 LEFT JOIN message m ON cmj.message_id = m.ROWID
                 WHERE c.ROWID = ?1
                   AND c.chat_identifier IS NOT NULL
                   AND c.chat_identifier != ''
                 GROUP BY c.ROWID",
                params![chat_id],
                row_to_summary,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })?;

        assemble_conversation(&conn, summary)
    }

    /// Distinct handles participating in a chat.
    pub fn participants(&self, chat_id: i64) -> Result<Vec<String>> {
        let conn = self.read_connection()?;
        participants_for(&conn, chat_id)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Chat facts that come straight out of the listing query.
struct ChatSummary {
    chat_id: i64,
    identifier: String,
    display_name: Option<String>,
    message_count: i64,
}

/// Map a listing row to a [`ChatSummary`].  An empty display name reads
/// as no name at all.
fn row_to_summary(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatSummary> {
    let display_name: Option<String> = row.get(2)?;

    Ok(ChatSummary {
        chat_id: row.get(0)?,
        identifier: row.get(1)?,
        display_name: display_name.filter(|name| !name.is_empty()),
        message_count: row.get(4)?,
    })
}

fn assemble_conversation(conn: &Connection, summary: ChatSummary) -> Result<Conversation> {
    let participants = participants_for(conn, summary.chat_id)?;
    let last_message = last_message_for(conn, summary.chat_id)?;

    Ok(Conversation {
        chat_id: summary.chat_id,
        identifier: summary.identifier,
        display_name: summary.display_name,
        participants,
        last_message,
        message_count: summary.message_count,
    })
}

pub(crate) fn participants_for(conn: &Connection, chat_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT h.id
         FROM handle h
         JOIN chat_handle_join chj ON h.ROWID = chj.handle_id
         WHERE chj.chat_id = ?1",
    )?;

    let rows = stmt.query_map(params![chat_id], |row| row.get::<_, String>(0))?;

    let mut participants = Vec::new();
    for row in rows {
        participants.push(row?);
    }
    Ok(participants)
}
