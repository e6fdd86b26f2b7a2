/// Default location of the Messages database on macOS
pub const DEFAULT_DB_PATH: &str = "~/Library/Messages/chat.db";

/// Hours without a reply before a conversation counts as stale
pub const DEFAULT_STALE_THRESHOLD_HOURS: u32 = 48;

/// How many recent conversations one triage pass examines
pub const DEFAULT_MAX_CONVERSATIONS: usize = 20;

/// Default quiet window start hour (local, 24h clock)
pub const DEFAULT_QUIET_HOURS_START: u32 = 22;

/// Default quiet window end hour (local, 24h clock)
pub const DEFAULT_QUIET_HOURS_END: u32 = 8;

/// Trailing history messages included in a drafting context block
pub const CONTEXT_MESSAGE_COUNT: usize = 5;
