/// Prefix shared by every event key in the key-value store.
pub const EVENT_KEY_PREFIX: &str = "event_";

/// How often a gallery re-reads its event.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

pub const DEFAULT_RETENTION_DAYS: u32 = 7;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5173";

/// Origin used when minting `blob:` references for uploaded bytes.
pub const BLOB_ORIGIN: &str = "snapshare";
