//! Contact name resolution from the macOS AddressBook.
//!
//! Names are keyed by normalized identifiers: the significant digits of
//! a phone number, or a lowercased email address.  Loading is strictly
//! best-effort: a missing, unreadable, or foreign-schema AddressBook
//! produces an empty book with a warning, never an error.  Names are
//! cosmetic and must not block a triage pass.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::UserDirs;
use rusqlite::{Connection, OpenFlags};

use crate::error::Result;

/// Relative to the home directory; each synced account gets its own
/// source subdirectory.
const ADDRESSBOOK_SOURCES_DIR: &str = "Library/Application Support/AddressBook/Sources";

/// Database file name inside each source directory.
const ADDRESSBOOK_DB_NAME: &str = "AddressBook-v22.abcddb";

/// Immutable identifier-to-name lookup table.
///
/// Built once when the store opens and never mutated afterwards, so
/// shared references can be read from anywhere without synchronization.
#[derive(Debug, Clone, Default)]
pub struct ContactBook {
    names: HashMap<String, String>,
}

impl ContactBook {
    /// A book with no entries; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load contacts from the default AddressBook location.
    ///
    /// Scans the per-source directories and reads the first database
    /// found (sorted for determinism).  Every failure path degrades to an
    /// empty book.
    pub fn load_default() -> Self {
        let Some(dirs) = UserDirs::new() else {
            tracing::warn!("could not determine home directory, contacts disabled");
            return Self::empty();
        };

        let sources = dirs.home_dir().join(ADDRESSBOOK_SOURCES_DIR);
        let Some(db_path) = find_addressbook_db(&sources) else {
            tracing::debug!(dir = %sources.display(), "no AddressBook database, contacts disabled");
            return Self::empty();
        };

        match Self::from_db(&db_path) {
            Ok(book) => {
                tracing::debug!(
                    path = %db_path.display(),
                    contacts = book.len(),
                    "loaded contacts"
                );
                book
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %db_path.display(),
                    "could not read AddressBook, contacts disabled"
                );
                Self::empty()
            }
        }
    }

    /// Read names out of an AddressBook database.
    ///
    /// Phone numbers are keyed by their normalized digits, emails by
    /// their lowercased address.  Records without a usable name or
    /// identifier are skipped.
    pub fn from_db(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        let mut names = HashMap::new();

        let mut stmt = conn.prepare(
            "SELECT ZFULLNUMBER, ZFIRSTNAME, ZLASTNAME
             FROM ZABCDPHONENUMBER
             JOIN ZABCDRECORD ON ZABCDPHONENUMBER.ZOWNER = ZABCDRECORD.Z_PK
             WHERE ZFULLNUMBER IS NOT NULL",
        )?;
        let rows = stmt.query_map([], row_to_entry)?;
        for row in rows {
            let (number, name) = row?;
            if name.is_empty() {
                continue;
            }
            let key = normalize_phone(&number);
            if !key.is_empty() {
                names.insert(key, name);
            }
        }

        let mut stmt = conn.prepare(
            "SELECT ZADDRESS, ZFIRSTNAME, ZLASTNAME
             FROM ZABCDEMAILADDRESS
             JOIN ZABCDRECORD ON ZABCDEMAILADDRESS.ZOWNER = ZABCDRECORD.Z_PK
             WHERE ZADDRESS IS NOT NULL",
        )?;
        let rows = stmt.query_map([], row_to_entry)?;
        for row in rows {
            let (address, name) = row?;
            if name.is_empty() {
                continue;
            }
            let key = address.to_lowercase();
            if !key.is_empty() {
                names.insert(key, name);
            }
        }

        Ok(Self { names })
    }

    /// Register a name under an identifier's normalized key.
    pub fn insert(&mut self, identifier: &str, name: impl Into<String>) {
        let key = normalize_identifier(identifier);
        if !key.is_empty() {
            self.names.insert(key, name.into());
        }
    }

    /// Look up the name for a phone number or email.
    ///
    /// Tries the identifier as typed (trimmed, lowercased) first, which
    /// catches emails, then falls back to phone normalization.
    pub fn lookup(&self, identifier: &str) -> Option<&str> {
        if identifier.is_empty() {
            return None;
        }

        let direct = identifier.trim().to_lowercase();
        if let Some(name) = self.names.get(&direct) {
            return Some(name);
        }

        let as_phone = normalize_phone(identifier);
        if as_phone.is_empty() {
            return None;
        }
        self.names.get(&as_phone).map(String::as_str)
    }

    /// Number of known identifiers.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Normalize an identifier into its lookup key: emails are trimmed and
/// lowercased, everything else is treated as a phone number.
pub fn normalize_identifier(raw: &str) -> String {
    if raw.contains('@') {
        raw.trim().to_lowercase()
    } else {
        normalize_phone(raw)
    }
}

/// Reduce a phone number to the digits used for matching.
///
/// Formatting is stripped, a leading `1` on an 11-digit number (US
/// country code) is dropped, and only the last ten digits are kept.
/// Shorter numbers pass through as their bare digit string.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    let digits = if digits.len() == 11 && digits.starts_with('1') {
        digits[1..].to_string()
    } else {
        digits
    };

    if digits.len() >= 10 {
        digits[digits.len() - 10..].to_string()
    } else {
        digits
    }
}

fn find_addressbook_db(sources_dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(sources_dir).ok()?;
    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| {
            let path = entry.ok()?.path().join(ADDRESSBOOK_DB_NAME);
            path.is_file().then_some(path)
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

/// Map an identifier row to `(identifier, full name)`.
fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, String)> {
    let identifier: String = row.get(0)?;
    let first: Option<String> = row.get(1)?;
    let last: Option<String> = row.get(2)?;

    let name = format!(
        "{} {}",
        first.unwrap_or_default(),
        last.unwrap_or_default()
    )
    .trim()
    .to_string();

    Ok((identifier, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone_strips_formatting() {
        assert_eq!(normalize_phone("+1 (907) 764-8853"), "9077648853");
        assert_eq!(normalize_phone("907.764.8853"), "9077648853");
        assert_eq!(normalize_phone("19077648853"), "9077648853");
        // A bare ten-digit number is already in key form.
        assert_eq!(normalize_phone("9077648853"), "9077648853");
    }

    #[test]
    fn test_normalize_phone_short_numbers_pass_through() {
        assert_eq!(normalize_phone("764-8853"), "7648853");
        assert_eq!(normalize_phone(""), "");
        assert_eq!(normalize_phone("ext. 42"), "42");
    }

    #[test]
    fn test_normalize_phone_keeps_last_ten_digits() {
        // International number: no US prefix strip, last ten digits.
        assert_eq!(normalize_phone("+44 20 7946 0958"), "2079460958");
    }

    #[test]
    fn test_normalize_identifier_routes_emails() {
        assert_eq!(
            normalize_identifier("  John.Doe@Example.COM "),
            "john.doe@example.com"
        );
        assert_eq!(normalize_identifier("+1 (907) 764-8853"), "9077648853");
    }

    #[test]
    fn test_lookup_tries_email_then_phone() {
        let mut book = ContactBook::empty();
        book.insert("+19077648853", "Ana Chen");
        book.insert("ana@example.com", "Ana Chen");

        assert_eq!(book.lookup("+1 (907) 764-8853"), Some("Ana Chen"));
        assert_eq!(book.lookup("Ana@Example.com"), Some("Ana Chen"));
        assert_eq!(book.lookup("+15550001111"), None);
        assert_eq!(book.lookup(""), None);
    }

    #[test]
    fn test_from_db_reads_phones_and_emails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ADDRESSBOOK_DB_NAME);

        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE ZABCDRECORD (Z_PK INTEGER PRIMARY KEY, ZFIRSTNAME TEXT, ZLASTNAME TEXT);
             CREATE TABLE ZABCDPHONENUMBER (ZOWNER INTEGER, ZFULLNUMBER TEXT);
             CREATE TABLE ZABCDEMAILADDRESS (ZOWNER INTEGER, ZADDRESS TEXT);

             INSERT INTO ZABCDRECORD VALUES (1, 'Ana', 'Chen');
             INSERT INTO ZABCDRECORD VALUES (2, 'Ben', NULL);
             INSERT INTO ZABCDRECORD VALUES (3, NULL, NULL);

             INSERT INTO ZABCDPHONENUMBER VALUES (1, '+1 (907) 764-8853');
             INSERT INTO ZABCDPHONENUMBER VALUES (3, '+1 (555) 000-1111');

             INSERT INTO ZABCDEMAILADDRESS VALUES (2, 'Ben@Example.com');",
        )
        .unwrap();
        drop(conn);

        let book = ContactBook::from_db(&path).unwrap();
        assert_eq!(book.len(), 2);
        assert_eq!(book.lookup("9077648853"), Some("Ana Chen"));
        assert_eq!(book.lookup("ben@example.com"), Some("Ben"));
        // Record 3 has no name, so its number is not indexed.
        assert_eq!(book.lookup("+1 (555) 000-1111"), None);
    }

    #[test]
    fn test_from_db_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ContactBook::from_db(&dir.path().join("missing.abcddb")).is_err());
    }
}
