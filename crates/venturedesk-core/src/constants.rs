/// Identifier prefixes for generated calendar records
pub const AVAILABILITY_ID_PREFIX: &str = "avail";
pub const MEETING_ID_PREFIX: &str = "meet";

/// Event colors handed to the calendar widget
pub const AVAILABILITY_COLOR: &str = "#10b981";
pub const MEETING_COLOR: &str = "#3b82f6";
pub const PENDING_COLOR: &str = "#f59e0b";
pub const BLOCKED_COLOR: &str = "#6b7280";

/// Environment variable namespace used by the configuration loader
pub const ENV_PREFIX: &str = "VENTUREDESK";
pub const ENV_SEPARATOR: &str = "__";

/// Snapshot file written when no storage path is configured
pub const DEFAULT_SNAPSHOT_FILE: &str = const_str::concat!("venturedesk", "-calendar-events", ".json");

/// Bounds for the "max meetings per day" availability setting
pub const MIN_MEETINGS_PER_DAY: u32 = 1;
pub const MAX_MEETINGS_PER_DAY: u32 = 20;
