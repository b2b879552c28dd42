//! Obstacle and projectile creation
//!
//! Spawning is driven by fixed-period timers owned by the lifecycle machine.
//! The functions here are the timer callbacks: they decide, they never queue.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Obstacle, ObstacleKind, Projectile, RunState};
use crate::consts::*;

/// Fixed-period timer fed with elapsed wall-clock time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalTimer {
    pub period_ms: f32,
    elapsed_ms: f32,
}

impl IntervalTimer {
    pub fn new(period_ms: f32) -> Self {
        debug_assert!(period_ms > 0.0);
        Self {
            period_ms,
            elapsed_ms: 0.0,
        }
    }

    /// Advance by `elapsed_ms`, returning how many periods completed
    pub fn advance(&mut self, elapsed_ms: f32) -> u32 {
        self.elapsed_ms += elapsed_ms.max(0.0);
        let mut fires = 0;
        while self.elapsed_ms >= self.period_ms {
            self.elapsed_ms -= self.period_ms;
            fires += 1;
        }
        fires
    }
}

/// One spawn attempt. Returns the new obstacle's id, or `None` if the run is
/// at capacity (or already over).
pub fn try_spawn_obstacle<R: Rng + ?Sized>(run: &mut RunState, rng: &mut R) -> Option<u32> {
    if run.is_terminal() || !run.has_room() {
        return None;
    }
    let profile = run.profile();

    let kind = if rng.random_bool(BONUS_CHANCE) {
        ObstacleKind::Bonus
    } else {
        ObstacleKind::Hazard
    };

    // Narrow arenas collapse the range to the center column
    let max_x = (run.arena.width - SPAWN_MARGIN).max(SPAWN_MARGIN);
    let x = rng.random_range(SPAWN_MARGIN..=max_x);
    let base_speed =
        rng.random_range(profile.obstacle_speed_min..=profile.obstacle_speed_max) as f32;

    let id = run.next_entity_id();
    run.obstacles.push(Obstacle {
        id,
        pos: Vec2::new(x, 0.0),
        base_speed,
        kind,
        spawn_x: x,
    });
    Some(id)
}

/// Fire one projectile from the player's current position
pub fn spawn_projectile(run: &mut RunState) -> Option<u32> {
    if run.is_terminal() || !run.profile().fires_projectiles {
        return None;
    }
    let muzzle = Vec2::new(
        run.player.pos.x,
        run.player.pos.y - run.player.size.y / 2.0 - PROJECTILE_HEIGHT / 2.0,
    );
    let id = run.next_entity_id();
    run.projectiles.push(Projectile {
        id,
        pos: muzzle,
        speed: PROJECTILE_SPEED,
    });
    Some(id)
}
