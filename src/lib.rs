//! Block Dodger - A falling-block dodge arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (progression, spawning, collisions)
//! - `game`: Run lifecycle (Idle → Running → GameOver → Idle)
//! - `leaderboard`: Score submission and top-N lookup behind a swappable backend
//! - `persistence`: Client-side key/value storage
//! - `preferences`: Player name, skin and personal bests

pub mod game;
pub mod leaderboard;
pub mod persistence;
pub mod preferences;
pub mod sim;

pub use game::{Game, RunResult};
pub use leaderboard::{LeaderboardBackend, LocalLeaderboard};
pub use preferences::{Preferences, Skin};
pub use sim::{GamePhase, Mode};

/// Game configuration constants
pub mod consts {
    /// Frame length the per-tick speeds are tuned against (60 updates/s)
    pub const BASELINE_FRAME_MS: f32 = 16.67;
    /// Longest frame the adapter feeds into one tick (tab switches etc.)
    pub const MAX_FRAME_MS: f32 = 100.0;

    /// Default playfield, used by the headless runner
    pub const DEFAULT_WIDTH: f32 = 800.0;
    pub const DEFAULT_HEIGHT: f32 = 600.0;

    /// Player sprite
    pub const PLAYER_SIZE: f32 = 40.0;
    /// Distance from the bottom edge to the player's center
    pub const PLAYER_BOTTOM_OFFSET: f32 = 80.0;
    /// Pixels per baseline frame at the start of a run
    pub const PLAYER_BASE_SPEED: f32 = 24.0;
    /// Player speed multiplier applied on every speed step
    pub const PLAYER_SPEED_GROWTH: f32 = 1.10;

    /// Obstacle sprite (square)
    pub const OBSTACLE_SIZE: f32 = 40.0;
    /// Keeps spawned obstacles fully on screen
    pub const SPAWN_MARGIN: f32 = 40.0;
    /// Chance that a spawn is a bonus star instead of a block
    pub const BONUS_CHANCE: f64 = 0.10;
    /// Score for collecting a bonus
    pub const BONUS_SCORE: u64 = 10;
    /// Score for a block that leaves the screen (reward policy) or is shot down
    pub const HAZARD_SCORE: u64 = 1;

    /// Shooting mode: fixed projectile cadence
    pub const PROJECTILE_INTERVAL_MS: f32 = 500.0;
    /// Pixels per baseline frame
    pub const PROJECTILE_SPEED: f32 = 12.0;
    pub const PROJECTILE_WIDTH: f32 = 6.0;
    pub const PROJECTILE_HEIGHT: f32 = 16.0;

    /// Leaderboard rows shown per mode
    pub const LEADERBOARD_LIMIT: usize = 10;
}

/// Convert elapsed wall-clock time into baseline frames
#[inline]
pub fn frame_scale(elapsed_ms: f32) -> f32 {
    elapsed_ms / consts::BASELINE_FRAME_MS
}
