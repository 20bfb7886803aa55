/// Default fly-through speed (metres per second).
pub const DEFAULT_PLAYBACK_SPEED: f32 = 10.0;

/// Slowest speed the preview accepts (metres per second).
pub const MIN_PLAYBACK_SPEED: f32 = 0.1;

/// Frames the headless runner simulates before reporting.
pub const HEADLESS_FRAME_COUNT: u32 = 60;

/// Simulated frame length for headless runs (milliseconds).
pub const HEADLESS_FRAME_MS: u64 = 100;
