//! Message reads: per-chat history and newest-message lookup.

use relance_shared::models::Message;
use rusqlite::{params, Connection};

use crate::error::{Result, StoreError};
use crate::store::MessageStore;
use crate::text;
use crate::timestamp;

/// Shared column list: the sender handle collapses to `'me'` for own
/// messages, which have no handle row.
const MESSAGE_QUERY: &str = "SELECT
         m.ROWID,
         m.text,
         m.attributedBody,
         COALESCE(h.id, 'me') AS sender,
         m.is_from_me,
         m.date
     FROM message m
     LEFT JOIN handle h ON m.handle_id = h.ROWID
     JOIN chat_message_join cmj ON m.ROWID = cmj.message_id
     WHERE cmj.chat_id = ?1
     ORDER BY m.date DESC
     LIMIT ?2";

impl MessageStore {
    /// Message history for a chat, oldest first.
    ///
    /// The query walks the newest `limit` messages and the result is
    /// reversed, so the caller reads them top to bottom.
    pub fn conversation_history(&self, chat_id: i64, limit: usize) -> Result<Vec<Message>> {
        let conn = self.read_connection()?;

        let mut stmt = conn.prepare(MESSAGE_QUERY)?;
        let rows = stmt.query_map(params![chat_id, limit as i64], |row| {
            row_to_message(row, chat_id)
        })?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        messages.reverse();
        Ok(messages)
    }

    /// The newest message in a chat, or `None` for a chat with no
    /// messages.
    pub fn last_message(&self, chat_id: i64) -> Result<Option<Message>> {
        let conn = self.read_connection()?;
        last_message_for(&conn, chat_id)
    }
}

/// Newest message over an already-open connection.
pub(crate) fn last_message_for(conn: &Connection, chat_id: i64) -> Result<Option<Message>> {
    let result = conn.query_row(MESSAGE_QUERY, params![chat_id, 1i64], |row| {
        row_to_message(row, chat_id)
    });

    match result {
        Ok(message) => Ok(Some(message)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(other) => Err(StoreError::Sqlite(other)),
    }
}

/// Map a message row, resolving text and converting the timestamp.
///
/// Blob salvage failures degrade to `text: None`; a date outside the
/// representable range is a conversion error on column 5.
fn row_to_message(row: &rusqlite::Row<'_>, chat_id: i64) -> rusqlite::Result<Message> {
    let rowid: i64 = row.get(0)?;
    let raw_text: Option<String> = row.get(1)?;
    let attributed_body: Option<Vec<u8>> = row.get(2)?;
    let sender: String = row.get(3)?;
    let is_from_me: bool = row.get(4)?;
    let raw_date: i64 = row.get(5)?;

    let text = text::resolve_text(raw_text, attributed_body.as_deref());

    let date = timestamp::from_apple_timestamp(raw_date).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Integer, Box::new(e))
    })?;

    Ok(Message {
        rowid,
        text,
        sender,
        is_from_me,
        date,
        chat_id,
    })
}
