//! Run state and core simulation types
//!
//! Everything a single run owns lives in `RunState`. Nothing here is global;
//! the lifecycle machine creates one per run and drops it on restart.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::profile::{Mode, ModeProfile};
use super::progression;
use crate::consts::*;

/// Lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a mode to be picked
    Idle,
    /// Active gameplay
    Running,
    /// Run ended, waiting for restart
    GameOver,
}

/// Playfield size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

/// Falling object types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Ends the run on contact
    Hazard,
    /// Worth `BONUS_SCORE` on contact
    Bonus,
}

/// A falling obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Center position
    pub pos: Vec2,
    /// Rolled once at spawn, pixels per baseline frame
    pub base_speed: f32,
    pub kind: ObstacleKind,
    /// Column it was dropped from
    pub spawn_x: f32,
}

impl Obstacle {
    /// Current fall speed under the run's multiplier
    #[inline]
    pub fn effective_speed(&self, multiplier: f32) -> f32 {
        self.base_speed * multiplier
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(OBSTACLE_SIZE))
    }
}

/// Shooting mode bullet, travels straight up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub speed: f32,
}

impl Projectile {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::new(PROJECTILE_WIDTH, PROJECTILE_HEIGHT))
    }
}

/// The player's sprite; y never changes during a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Player {
    pub fn new(arena: &Arena) -> Self {
        Self {
            pos: Vec2::new(arena.width / 2.0, arena.height - PLAYER_BOTTOM_OFFSET),
            size: Vec2::splat(PLAYER_SIZE),
        }
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.size.x / 2.0
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }

    /// Move toward a target x without overshooting it
    pub fn move_toward(&mut self, target_x: f32, max_step: f32) {
        let delta = target_x - self.pos.x;
        self.pos.x += delta.clamp(-max_step, max_step);
    }

    /// Keep the whole sprite inside the arena
    pub fn clamp_to(&mut self, arena: &Arena) {
        let half = self.half_width();
        let max_x = (arena.width - half).max(half);
        self.pos.x = self.pos.x.clamp(half, max_x);
    }
}

/// Things that happened during a tick (consumed by the adapter for the HUD)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A bonus star touched the player
    BonusCollected { score: u64 },
    /// A block fell past the bottom edge
    HazardEscaped { score: u64 },
    /// A projectile destroyed a block
    HazardShot { score: u64 },
    /// A block touched the player
    HazardHit,
    /// Speed step applied
    SpeedUp { multiplier: f32, player_speed: f32 },
    /// Capacity re-rolled
    CapacityChanged { capacity: u32 },
    /// The run just became terminal
    RunEnded { score: u64 },
}

/// Complete state of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub mode: Mode,
    pub arena: Arena,
    pub score: u64,
    /// Scales every obstacle's base speed, starts at 1
    pub speed_multiplier: f32,
    /// Pixels per baseline frame
    pub player_speed: f32,
    pub next_speed_score: u64,
    pub next_capacity_score: u64,
    /// Maximum number of live obstacles
    pub capacity: u32,
    /// Latched: never reverts within a run
    terminal: bool,
    /// Wall-clock time spent running
    pub elapsed_ms: f64,
    pub player: Player,
    /// Live obstacles (spawn order)
    pub obstacles: Vec<Obstacle>,
    /// Live projectiles (spawn order)
    pub projectiles: Vec<Projectile>,
    next_id: u32,
}

impl RunState {
    /// Fresh run with an initial capacity roll
    pub fn new<R: Rng + ?Sized>(mode: Mode, arena: Arena, rng: &mut R) -> Self {
        let profile = mode.profile();
        debug_assert!(profile.validate(), "invalid profile for {}", mode.as_str());
        let (next_speed_score, next_capacity_score) = progression::initial_thresholds(profile);

        Self {
            mode,
            arena,
            score: 0,
            speed_multiplier: 1.0,
            player_speed: PLAYER_BASE_SPEED,
            next_speed_score,
            next_capacity_score,
            capacity: progression::roll_capacity(profile, 0, rng),
            terminal: false,
            elapsed_ms: 0.0,
            player: Player::new(&arena),
            obstacles: Vec::new(),
            projectiles: Vec::new(),
            next_id: 1,
        }
    }

    #[inline]
    pub fn profile(&self) -> &'static ModeProfile {
        self.mode.profile()
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Latch the terminal flag. Returns true only on the call that flips it.
    pub fn set_terminal(&mut self) -> bool {
        if self.terminal {
            return false;
        }
        self.terminal = true;
        true
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Whether one more obstacle fits under the current capacity
    #[inline]
    pub fn has_room(&self) -> bool {
        self.obstacles.len() < self.capacity as usize
    }
}
