//! Message store handle and connection management.
//!
//! The [`MessageStore`] owns the database path and the contact lookup
//! table, not a connection.  Messages keeps writing to `chat.db` while we
//! read, so every operation opens its own short-lived read-only
//! connection and drops it before returning; nothing is pooled or shared.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};

use crate::contacts::ContactBook;
use crate::error::{Result, StoreError};

/// Read-only handle on the local Messages database.
pub struct MessageStore {
    db_path: PathBuf,
    contacts: ContactBook,
}

impl MessageStore {
    /// Open a store over the database at `db_path`.
    ///
    /// Fails with [`StoreError::StoreNotFound`] when the file does not
    /// exist.  Contacts are loaded from the default AddressBook location
    /// on a best-effort basis; a store without contacts still works, it
    /// just cannot resolve display names.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        Self::with_contacts(db_path, ContactBook::load_default())
    }

    /// Open a store with an explicit contact table.
    ///
    /// This is useful for tests and for callers that source contacts
    /// elsewhere.
    pub fn with_contacts(db_path: impl AsRef<Path>, contacts: ContactBook) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if !db_path.exists() {
            return Err(StoreError::StoreNotFound(db_path));
        }

        tracing::info!(
            path = %db_path.display(),
            contacts = contacts.len(),
            "opening message store"
        );

        Ok(Self { db_path, contacts })
    }

    /// The contact lookup table attached to this store.
    pub fn contacts(&self) -> &ContactBook {
        &self.contacts
    }

    /// Resolve a handle (phone or email) to an AddressBook name.
    pub fn contact_name(&self, identifier: &str) -> Option<&str> {
        self.contacts.lookup(identifier)
    }

    /// The filesystem path of the Messages database.
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Open a fresh read-only connection for a single operation.
    pub(crate) fn read_connection(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(&self.db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_database_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = MessageStore::open(dir.path().join("chat.db"));
        assert!(matches!(result, Err(StoreError::StoreNotFound(_))));
    }

    #[test]
    fn test_open_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.db");
        std::fs::File::create(&path).unwrap();

        let store = MessageStore::with_contacts(&path, ContactBook::empty()).expect("should open");
        assert_eq!(store.path(), path.as_path());
        assert!(store.contacts().is_empty());
    }
}
