//! Runtime configuration loaded from environment variables.
//!
//! All settings have sensible defaults so a triage pass can run with zero
//! configuration on a stock macOS account.

use std::path::PathBuf;

use directories::UserDirs;

use crate::constants::{
    DEFAULT_DB_PATH, DEFAULT_MAX_CONVERSATIONS, DEFAULT_QUIET_HOURS_END,
    DEFAULT_QUIET_HOURS_START, DEFAULT_STALE_THRESHOLD_HOURS,
};

/// Triage configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Location of the Messages database.  A leading `~` expands to the
    /// user's home directory.
    /// Env: `IMESSAGE_DB_PATH`
    /// Default: `~/Library/Messages/chat.db`
    pub message_db_path: PathBuf,

    /// Hours without a reply before a conversation counts as stale.
    /// Env: `STALE_THRESHOLD_HOURS`
    /// Default: `48`
    pub stale_threshold_hours: u32,

    /// Maximum number of recent conversations examined per pass.
    /// Env: `MAX_CONVERSATIONS_TO_CHECK`
    /// Default: `20`
    pub max_conversations: usize,

    /// Hour at which the quiet window opens (0-23, local time).
    /// Env: `QUIET_HOURS_START`
    /// Default: `22`
    pub quiet_hours_start: u32,

    /// Hour at which the quiet window closes (0-23, exclusive).  A start
    /// hour after the end hour wraps past midnight.
    /// Env: `QUIET_HOURS_END`
    /// Default: `8`
    pub quiet_hours_end: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            message_db_path: expand_tilde(DEFAULT_DB_PATH),
            stale_threshold_hours: DEFAULT_STALE_THRESHOLD_HOURS,
            max_conversations: DEFAULT_MAX_CONVERSATIONS,
            quiet_hours_start: DEFAULT_QUIET_HOURS_START,
            quiet_hours_end: DEFAULT_QUIET_HOURS_END,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults.  Unparseable values are logged and ignored rather than
    /// aborting the pass.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("IMESSAGE_DB_PATH") {
            if path.is_empty() {
                tracing::warn!("Empty IMESSAGE_DB_PATH, using default");
            } else {
                config.message_db_path = expand_tilde(&path);
            }
        }

        if let Ok(val) = std::env::var("STALE_THRESHOLD_HOURS") {
            match val.trim().parse::<u32>() {
                Ok(hours) => config.stale_threshold_hours = hours,
                Err(_) => {
                    tracing::warn!(
                        value = %val,
                        "Invalid STALE_THRESHOLD_HOURS, using default"
                    );
                }
            }
        }

        if let Ok(val) = std::env::var("MAX_CONVERSATIONS_TO_CHECK") {
            match val.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.max_conversations = n,
                _ => {
                    tracing::warn!(
                        value = %val,
                        "Invalid MAX_CONVERSATIONS_TO_CHECK, using default"
                    );
                }
            }
        }

        if let Ok(val) = std::env::var("QUIET_HOURS_START") {
            match parse_hour(&val) {
                Ok(hour) => config.quiet_hours_start = hour,
                Err(e) => {
                    tracing::warn!(error = %e, "Invalid QUIET_HOURS_START, using default");
                }
            }
        }

        if let Ok(val) = std::env::var("QUIET_HOURS_END") {
            match parse_hour(&val) {
                Ok(hour) => config.quiet_hours_end = hour,
                Err(e) => {
                    tracing::warn!(error = %e, "Invalid QUIET_HOURS_END, using default");
                }
            }
        }

        config
    }
}

/// Expand a leading `~` to the user's home directory.
///
/// Paths without a tilde pass through untouched, as does everything when
/// no home directory can be determined.
fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(dirs) = UserDirs::new() {
            return dirs.home_dir().to_path_buf();
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(dirs) = UserDirs::new() {
            return dirs.home_dir().join(rest);
        }
    }
    PathBuf::from(path)
}

/// Parse a wall-clock hour in the range 0-23.
fn parse_hour(value: &str) -> Result<u32, String> {
    let hour: u32 = value
        .trim()
        .parse()
        .map_err(|_| format!("not a number: {value}"))?;
    if hour > 23 {
        return Err(format!("hour out of range 0-23: {hour}"));
    }
    Ok(hour)
}
