//! Per-mode tuning table
//!
//! Every per-mode difference lives here as data. The rest of the simulation
//! reads a `ModeProfile` and never branches on `Mode` directly.

use serde::{Deserialize, Serialize};

/// Selectable game modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Normal,
    Asian,
    Shooting,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Normal, Mode::Asian, Mode::Shooting];

    /// Stable identifier (storage keys, leaderboard partition)
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Asian => "asian",
            Mode::Shooting => "shooting",
        }
    }

    /// Human-readable menu label
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Normal => "Normal Mode",
            Mode::Asian => "Asian Normal Mode",
            Mode::Shooting => "Shooting Mode",
        }
    }

    /// Look up this mode's tuning
    pub fn profile(&self) -> &'static ModeProfile {
        match self {
            Mode::Normal => &NORMAL,
            Mode::Asian => &ASIAN,
            Mode::Shooting => &SHOOTING,
        }
    }
}

/// Shape of the capacity escalation formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapacityFamily {
    /// Capacity re-rolled every 2 × threshold points, ceiling grows per 2 × threshold
    Normal,
    /// Capacity re-rolled every threshold points, ceiling grows per threshold
    Asian,
}

/// What a block that falls past the bottom edge does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscapePolicy {
    /// Dodged: +1 score
    Reward,
    /// Missed a target: run over
    Fail,
}

/// Immutable tuning for one mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeProfile {
    pub mode: Mode,
    /// Lower bound of every capacity roll
    pub min_obstacles: u32,
    /// Upper bound of the first capacity roll (grows with score)
    pub max_obstacles: u32,
    /// Base fall speed range, pixels per baseline frame
    pub obstacle_speed_min: u32,
    pub obstacle_speed_max: u32,
    /// Obstacle spawn timer period
    pub spawn_interval_ms: f32,
    /// Speed multiplier growth per speed step
    pub speed_growth: f32,
    /// How much the capacity ceiling grows per capacity divisor of score
    pub capacity_step: u32,
    /// Score distance between speed steps
    pub score_threshold: u64,
    pub capacity_family: CapacityFamily,
    pub escape: EscapePolicy,
    /// Player auto-fires projectiles on a fixed timer
    pub fires_projectiles: bool,
}

impl ModeProfile {
    /// Check the table invariants
    pub fn validate(&self) -> bool {
        self.min_obstacles <= self.max_obstacles
            && self.obstacle_speed_min > 0
            && self.obstacle_speed_min <= self.obstacle_speed_max
            && self.spawn_interval_ms > 0.0
            && self.speed_growth >= 1.0
            && self.score_threshold > 0
    }

    /// Score divisor used when widening the capacity ceiling
    pub fn capacity_divisor(&self) -> u64 {
        match self.capacity_family {
            CapacityFamily::Normal => self.score_threshold * 2,
            CapacityFamily::Asian => self.score_threshold,
        }
    }

    /// Distance between capacity re-rolls
    pub fn capacity_threshold_step(&self) -> u64 {
        match self.capacity_family {
            CapacityFamily::Normal => self.score_threshold * 2,
            CapacityFamily::Asian => self.score_threshold,
        }
    }
}

static NORMAL: ModeProfile = ModeProfile {
    mode: Mode::Normal,
    min_obstacles: 1,
    max_obstacles: 5,
    obstacle_speed_min: 5,
    obstacle_speed_max: 10,
    spawn_interval_ms: 500.0,
    speed_growth: 1.05,
    capacity_step: 1,
    score_threshold: 10,
    capacity_family: CapacityFamily::Normal,
    escape: EscapePolicy::Reward,
    fires_projectiles: false,
};

static ASIAN: ModeProfile = ModeProfile {
    mode: Mode::Asian,
    min_obstacles: 2,
    max_obstacles: 8,
    obstacle_speed_min: 8,
    obstacle_speed_max: 13,
    spawn_interval_ms: 300.0,
    speed_growth: 1.10,
    capacity_step: 2,
    score_threshold: 10,
    capacity_family: CapacityFamily::Asian,
    escape: EscapePolicy::Reward,
    fires_projectiles: false,
};

// Slower and sparser than Normal: every block has to be shot down.
static SHOOTING: ModeProfile = ModeProfile {
    mode: Mode::Shooting,
    min_obstacles: 1,
    max_obstacles: 4,
    obstacle_speed_min: 4,
    obstacle_speed_max: 8,
    spawn_interval_ms: 700.0,
    speed_growth: 1.05,
    capacity_step: 1,
    score_threshold: 10,
    capacity_family: CapacityFamily::Normal,
    escape: EscapePolicy::Fail,
    fires_projectiles: true,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_profiles_valid() {
        for mode in Mode::ALL {
            let profile = mode.profile();
            assert!(profile.validate(), "{} profile invalid", mode.as_str());
            assert_eq!(profile.mode, mode);
        }
    }

    #[test]
    fn test_capacity_family_asymmetry() {
        let normal = Mode::Normal.profile();
        assert_eq!(normal.capacity_divisor(), 20);
        assert_eq!(normal.capacity_threshold_step(), 20);

        let asian = Mode::Asian.profile();
        assert_eq!(asian.capacity_divisor(), 10);
        assert_eq!(asian.capacity_threshold_step(), 10);
    }

    #[test]
    fn test_only_shooting_fails_on_escape() {
        assert_eq!(Mode::Normal.profile().escape, EscapePolicy::Reward);
        assert_eq!(Mode::Asian.profile().escape, EscapePolicy::Reward);
        assert_eq!(Mode::Shooting.profile().escape, EscapePolicy::Fail);
        assert!(Mode::Shooting.profile().fires_projectiles);
    }
}
