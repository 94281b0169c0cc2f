//! Shared defaults.

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default bind address.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Environment name that enables the local memory backend.
pub const DEVELOPMENT_ENV: &str = "development";

/// Default environment when none is configured.
pub const DEFAULT_ENVIRONMENT: &str = "production";

/// Default per-request timeout of the REST key-value client, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Records returned by "recent" queries when the caller gives no limit.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Recent interactions returned by default.
pub const DEFAULT_INTERACTION_LIMIT: usize = 5;

/// Recent moods returned by default (one week of daily moods).
pub const DEFAULT_MOOD_LIMIT: usize = 7;

/// Interaction lifetime: 24 hours.
pub const INTERACTION_TTL_SECS: i64 = 86_400;

/// Mood lifetime: 7 days.
pub const MOOD_TTL_SECS: i64 = 7 * 86_400;
