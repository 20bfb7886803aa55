/// Minimum time between two path recomputations (milliseconds).
pub const PATH_REBUILD_COOLDOWN_MS: f32 = 1000.0;

/// Poll interval for the filter region's world matrix (milliseconds).
pub const FILTER_MATRIX_CHECK_INTERVAL_MS: f32 = 500.0;

/// Poll interval for start/end anchor positions (milliseconds).
pub const ANCHOR_CHECK_INTERVAL_MS: f32 = 250.0;

/// Poll interval for the nearest sweep scan of a single anchor (milliseconds).
pub const NEAREST_SWEEP_CHECK_INTERVAL_MS: f32 = 300.0;

/// Lower edge traversal height handed to the sweep graph search (metres).
pub const SEARCH_MIN_HEIGHT: f32 = 0.4;

/// Upper edge traversal height handed to the sweep graph search (metres).
pub const SEARCH_MAX_HEIGHT: f32 = 0.8;

/// Maximum number of hops the sweep graph search may take.
pub const SEARCH_MAX_HOPS: u32 = 40;

/// Id of the synthetic point placed at the start anchor.
pub const START_POINT_ID: &str = "0";

/// Id of the synthetic point placed at the end anchor.
pub const END_POINT_ID: &str = "1";

/// Only sweeps with this alignment are usable for paths.
pub const ALIGNED_SWEEP: &str = "aligned";
