//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (passed in by the caller)
//! - Stable iteration order (spawn order)
//! - No rendering, timer or platform dependencies

pub mod collision;
pub mod profile;
pub mod progression;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::Aabb;
pub use profile::{CapacityFamily, EscapePolicy, Mode, ModeProfile};
pub use spawn::{IntervalTimer, spawn_projectile, try_spawn_obstacle};
pub use state::{
    Arena, GameEvent, GamePhase, Obstacle, ObstacleKind, Player, Projectile, RunState,
};
pub use tick::{TickInput, tick};
