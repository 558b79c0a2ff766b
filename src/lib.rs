//! Tiger Merge - a falling-ball merge puzzle game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (gravity, collisions, merging, win check)
//! - `render`: DOM rendering adapter (wasm32 only)
//! - `highscores`: Local leaderboard in LocalStorage
//! - `settings`: Player preferences in LocalStorage

pub mod highscores;
#[cfg(target_arch = "wasm32")]
pub mod render;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::Settings;

/// Game tuning constants
pub mod consts {
    /// Downward acceleration per step (pixels/step²)
    pub const GRAVITY: f32 = 0.3;
    /// Horizontal velocity retained each step
    pub const FRICTION: f32 = 0.99;
    /// Velocity retained on a side-wall bounce
    pub const WALL_DAMPING: f32 = 0.7;
    /// Velocity retained on a floor bounce (nearly dead)
    pub const FLOOR_DAMPING: f32 = 0.1;
    /// Below this speed on both axes at the floor, a ball comes to rest
    pub const REST_SPEED: f32 = 0.5;

    /// Number of ball tiers (tier 8 is the tiger)
    pub const TIER_COUNT: usize = 9;
    /// Highest tier; reaching it wins the game
    pub const MAX_TIER: u8 = 8;
    /// Radius of a tier-0 ball
    pub const BALL_BASE_RADIUS: f32 = 30.0;
    /// Radius gained per tier
    pub const BALL_RADIUS_STEP: f32 = 12.0;

    /// Horizontal margin the drop position is clamped into
    pub const DROP_MARGIN: f32 = 20.0;
    /// Spawn height below the preview row (y = radius + this)
    pub const DROP_LINE_OFFSET: f32 = 5.0;

    /// Score awarded per merge is the new tier times this
    pub const MERGE_SCORE_STEP: u64 = 10;
    /// The very first queued tier is drawn from 0..this
    pub const FIRST_DROP_TIERS: u8 = 3;
    /// Every later queued tier is drawn from 0..this
    pub const LATER_DROP_TIERS: u8 = 5;
}

/// Radius for a ball of the given tier
#[inline]
pub fn tier_radius(tier: u8) -> f32 {
    consts::BALL_BASE_RADIUS + tier as f32 * consts::BALL_RADIUS_STEP
}
