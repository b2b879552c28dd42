//! Score-driven difficulty escalation
//!
//! Evaluated once per tick. Each kind of step (speed, capacity) applies at
//! most once per tick even if the score jumped past several thresholds; with
//! at most 10 points gained per tick and a threshold of 10 it never lags more
//! than one step behind.

use rand::Rng;

use super::profile::ModeProfile;
use super::state::{GameEvent, RunState};
use crate::consts::PLAYER_SPEED_GROWTH;

/// First (speed, capacity) thresholds of a run
pub fn initial_thresholds(profile: &ModeProfile) -> (u64, u64) {
    (profile.score_threshold, profile.capacity_threshold_step())
}

/// Highest capacity a roll can produce at this score
pub fn capacity_ceiling(profile: &ModeProfile, score: u64) -> u32 {
    let steps = (score / profile.capacity_divisor()) as u32;
    profile
        .max_obstacles
        .saturating_add(steps.saturating_mul(profile.capacity_step))
}

/// Uniform roll in `[min_obstacles, capacity_ceiling(score)]`
pub fn roll_capacity<R: Rng + ?Sized>(profile: &ModeProfile, score: u64, rng: &mut R) -> u32 {
    rng.random_range(profile.min_obstacles..=capacity_ceiling(profile, score))
}

/// Apply any due escalation steps to the run
pub fn advance<R: Rng + ?Sized>(run: &mut RunState, rng: &mut R, events: &mut Vec<GameEvent>) {
    let profile = run.profile();

    if run.score >= run.next_speed_score {
        run.speed_multiplier *= profile.speed_growth;
        run.player_speed *= PLAYER_SPEED_GROWTH;
        run.next_speed_score += profile.score_threshold;
        log::debug!(
            "Speed step at {}: multiplier={:.3} player_speed={:.2}",
            run.score,
            run.speed_multiplier,
            run.player_speed
        );
        events.push(GameEvent::SpeedUp {
            multiplier: run.speed_multiplier,
            player_speed: run.player_speed,
        });
    }

    if run.score >= run.next_capacity_score {
        run.capacity = roll_capacity(profile, run.score, rng);
        run.next_capacity_score += profile.capacity_threshold_step();
        log::debug!("Capacity re-rolled at {}: {}", run.score, run.capacity);
        events.push(GameEvent::CapacityChanged {
            capacity: run.capacity,
        });
    }
}
