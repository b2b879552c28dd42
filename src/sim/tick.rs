//! Per-frame simulation step
//!
//! Moves the player and every live entity, resolves overlaps and boundary
//! exits, then lets the progression clock react to the new score.

use rand::Rng;

use super::profile::EscapePolicy;
use super::progression;
use super::state::{GameEvent, ObstacleKind, RunState};
use crate::consts::*;
use crate::frame_scale;

/// Player input sampled for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held left key
    pub left: bool,
    /// Held right key
    pub right: bool,
    /// Pointer/touch x the player should slide toward
    pub target_x: Option<f32>,
}

/// Advance the run by `elapsed_ms` of wall-clock time
pub fn tick<R: Rng + ?Sized>(
    run: &mut RunState,
    input: &TickInput,
    elapsed_ms: f32,
    rng: &mut R,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if run.is_terminal() {
        return events;
    }

    // Clock skew can hand us a negative delta; time never runs backwards
    let elapsed_ms = elapsed_ms.max(0.0);
    let dt = frame_scale(elapsed_ms);
    run.elapsed_ms += elapsed_ms as f64;

    move_player(run, input, dt);
    advance_entities(run, dt);
    resolve_projectiles(run, &mut events);
    resolve_obstacles(run, &mut events);

    if !run.is_terminal() {
        progression::advance(run, rng, &mut events);
    }

    events
}

fn move_player(run: &mut RunState, input: &TickInput, dt: f32) {
    let step = run.player_speed * dt;
    let player = &mut run.player;

    // Left takes precedence when both are held
    if input.left {
        player.pos.x -= step;
    } else if input.right {
        player.pos.x += step;
    }
    if let Some(target) = input.target_x {
        player.move_toward(target, step);
    }
    player.clamp_to(&run.arena);
}

fn advance_entities(run: &mut RunState, dt: f32) {
    let multiplier = run.speed_multiplier;
    for obstacle in &mut run.obstacles {
        obstacle.pos.y += obstacle.effective_speed(multiplier) * dt;
    }

    for projectile in &mut run.projectiles {
        projectile.pos.y -= projectile.speed * dt;
    }
    // Gone once fully past the top edge
    run.projectiles.retain(|p| p.bounds().max.y >= 0.0);
}

/// Each projectile takes out at most one block
fn resolve_projectiles(run: &mut RunState, events: &mut Vec<GameEvent>) {
    if run.projectiles.is_empty() {
        return;
    }

    let mut spent: Vec<u32> = Vec::new();
    let mut shot: Vec<u32> = Vec::new();
    for projectile in &run.projectiles {
        let bounds = projectile.bounds();
        let target = run.obstacles.iter().find(|o| {
            o.kind == ObstacleKind::Hazard && !shot.contains(&o.id) && o.bounds().overlaps(&bounds)
        });
        if let Some(target) = target {
            shot.push(target.id);
            spent.push(projectile.id);
        }
    }

    if shot.is_empty() {
        return;
    }
    run.projectiles.retain(|p| !spent.contains(&p.id));
    run.obstacles.retain(|o| !shot.contains(&o.id));
    for _ in &shot {
        run.score += HAZARD_SCORE;
        events.push(GameEvent::HazardShot { score: run.score });
    }
}

fn resolve_obstacles(run: &mut RunState, events: &mut Vec<GameEvent>) {
    let player = run.player.bounds();
    let bottom = run.arena.height;
    let escape = run.profile().escape;

    let mut i = 0;
    while i < run.obstacles.len() {
        if run.is_terminal() {
            break;
        }
        let (kind, touching, escaped) = {
            let obstacle = &run.obstacles[i];
            (
                obstacle.kind,
                obstacle.bounds().overlaps(&player),
                obstacle.pos.y > bottom,
            )
        };

        if touching {
            match kind {
                ObstacleKind::Bonus => {
                    run.obstacles.remove(i);
                    run.score += BONUS_SCORE;
                    events.push(GameEvent::BonusCollected { score: run.score });
                    continue;
                }
                ObstacleKind::Hazard => {
                    events.push(GameEvent::HazardHit);
                    end_run(run, events);
                    break;
                }
            }
        }

        if escaped {
            run.obstacles.remove(i);
            if kind == ObstacleKind::Hazard {
                match escape {
                    EscapePolicy::Reward => {
                        run.score += HAZARD_SCORE;
                        events.push(GameEvent::HazardEscaped { score: run.score });
                    }
                    EscapePolicy::Fail => end_run(run, events),
                }
            }
            continue;
        }

        i += 1;
    }
}

fn end_run(run: &mut RunState, events: &mut Vec<GameEvent>) {
    if run.set_terminal() {
        log::info!("Run over: mode={} score={}", run.mode.as_str(), run.score);
        events.push(GameEvent::RunEnded { score: run.score });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::profile::Mode;
    use crate::sim::state::{Arena, Obstacle, Projectile};
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const FRAME: f32 = BASELINE_FRAME_MS;

    fn setup(mode: Mode) -> (RunState, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(12345);
        let run = RunState::new(mode, Arena::default(), &mut rng);
        (run, rng)
    }

    fn place(run: &mut RunState, kind: ObstacleKind, pos: Vec2, base_speed: f32) -> u32 {
        let id = run.next_entity_id();
        run.obstacles.push(Obstacle {
            id,
            pos,
            base_speed,
            kind,
            spawn_x: pos.x,
        });
        id
    }

    #[test]
    fn test_obstacle_moves_by_multiplied_speed() {
        let (mut run, mut rng) = setup(Mode::Normal);
        run.speed_multiplier = 2.0;
        place(&mut run, ObstacleKind::Hazard, Vec2::new(40.0, 100.0), 5.0);

        tick(&mut run, &TickInput::default(), FRAME, &mut rng);
        assert!((run.obstacles[0].pos.y - 110.0).abs() < 1e-3);

        // Double-length frame moves twice as far
        tick(&mut run, &TickInput::default(), FRAME * 2.0, &mut rng);
        assert!((run.obstacles[0].pos.y - 130.0).abs() < 1e-3);
    }

    #[test]
    fn test_keyboard_movement_and_clamp() {
        let (mut run, mut rng) = setup(Mode::Normal);
        let start = run.player.pos.x;
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        tick(&mut run, &right, FRAME, &mut rng);
        assert!((run.player.pos.x - (start + 24.0)).abs() < 1e-3);

        let left = TickInput {
            left: true,
            ..Default::default()
        };
        for _ in 0..100 {
            tick(&mut run, &left, FRAME, &mut rng);
        }
        assert_eq!(run.player.pos.x, PLAYER_SIZE / 2.0);
    }

    #[test]
    fn test_both_keys_held_moves_left() {
        let (mut run, mut rng) = setup(Mode::Asian);
        let start = run.player.pos.x;
        let both = TickInput {
            left: true,
            right: true,
            ..Default::default()
        };
        tick(&mut run, &both, FRAME, &mut rng);
        assert!((run.player.pos.x - (start - 24.0)).abs() < 1e-3);
    }

    #[test]
    fn test_negative_elapsed_is_a_zero_length_step() {
        let (mut run, mut rng) = setup(Mode::Normal);
        place(&mut run, ObstacleKind::Hazard, Vec2::new(40.0, 100.0), 5.0);
        let start = run.player.pos.x;
        let right = TickInput {
            right: true,
            ..Default::default()
        };

        tick(&mut run, &right, -1000.0, &mut rng);
        assert_eq!(run.obstacles[0].pos.y, 100.0);
        assert_eq!(run.player.pos.x, start);
        assert_eq!(run.elapsed_ms, 0.0);
        assert!(!run.is_terminal());
    }

    #[test]
    fn test_pointer_target_no_overshoot() {
        let (mut run, mut rng) = setup(Mode::Normal);
        let start = run.player.pos.x;
        let input = TickInput {
            target_x: Some(start + 30.0),
            ..Default::default()
        };
        tick(&mut run, &input, FRAME, &mut rng);
        assert!((run.player.pos.x - (start + 24.0)).abs() < 1e-3);
        tick(&mut run, &input, FRAME, &mut rng);
        assert!((run.player.pos.x - (start + 30.0)).abs() < 1e-3);
    }

    #[test]
    fn test_escape_rewards_in_normal_mode() {
        let (mut run, mut rng) = setup(Mode::Normal);
        place(&mut run, ObstacleKind::Hazard, Vec2::new(40.0, 598.0), 5.0);

        let events = tick(&mut run, &TickInput::default(), FRAME, &mut rng);
        assert!(run.obstacles.is_empty());
        assert_eq!(run.score, 1);
        assert!(!run.is_terminal());
        assert!(events.contains(&GameEvent::HazardEscaped { score: 1 }));
    }

    #[test]
    fn test_escaped_bonus_scores_nothing() {
        let (mut run, mut rng) = setup(Mode::Normal);
        place(&mut run, ObstacleKind::Bonus, Vec2::new(40.0, 598.0), 5.0);
        tick(&mut run, &TickInput::default(), FRAME, &mut rng);
        assert!(run.obstacles.is_empty());
        assert_eq!(run.score, 0);
    }

    #[test]
    fn test_hazard_contact_ends_run_once() {
        let (mut run, mut rng) = setup(Mode::Asian);
        let player_pos = run.player.pos;
        place(&mut run, ObstacleKind::Hazard, player_pos, 0.0);
        place(&mut run, ObstacleKind::Hazard, player_pos, 0.0);

        let events = tick(&mut run, &TickInput::default(), FRAME, &mut rng);
        assert!(run.is_terminal());
        let ended = events
            .iter()
            .filter(|e| matches!(e, GameEvent::RunEnded { .. }))
            .count();
        assert_eq!(ended, 1);

        // Latched: further ticks do nothing
        let events = tick(&mut run, &TickInput::default(), FRAME, &mut rng);
        assert!(events.is_empty());
    }

    #[test]
    fn test_projectile_shoots_hazard() {
        let (mut run, mut rng) = setup(Mode::Shooting);
        let target = place(&mut run, ObstacleKind::Hazard, Vec2::new(200.0, 300.0), 0.0);
        place(&mut run, ObstacleKind::Bonus, Vec2::new(400.0, 300.0), 0.0);
        let id = run.next_entity_id();
        run.projectiles.push(Projectile {
            id,
            pos: Vec2::new(200.0, 310.0),
            speed: PROJECTILE_SPEED,
        });

        let events = tick(&mut run, &TickInput::default(), FRAME, &mut rng);
        assert!(run.projectiles.is_empty());
        assert!(run.obstacles.iter().all(|o| o.id != target));
        assert_eq!(run.obstacles.len(), 1);
        assert_eq!(run.score, 1);
        assert!(events.contains(&GameEvent::HazardShot { score: 1 }));
    }

    #[test]
    fn test_projectile_ignores_bonus_and_culls_at_top() {
        let (mut run, mut rng) = setup(Mode::Shooting);
        place(&mut run, ObstacleKind::Bonus, Vec2::new(200.0, 10.0), 0.0);
        let id = run.next_entity_id();
        run.projectiles.push(Projectile {
            id,
            pos: Vec2::new(200.0, 14.0),
            speed: PROJECTILE_SPEED,
        });

        tick(&mut run, &TickInput::default(), FRAME, &mut rng);
        assert_eq!(run.projectiles.len(), 1);
        assert_eq!(run.obstacles.len(), 1);

        tick(&mut run, &TickInput::default(), FRAME, &mut rng);
        tick(&mut run, &TickInput::default(), FRAME, &mut rng);
        assert!(run.projectiles.is_empty());
        assert_eq!(run.score, 0);
    }

    #[test]
    fn test_progression_runs_after_scoring() {
        let (mut run, mut rng) = setup(Mode::Normal);
        run.score = 9;
        place(&mut run, ObstacleKind::Hazard, Vec2::new(40.0, 599.0), 5.0);

        let events = tick(&mut run, &TickInput::default(), FRAME, &mut rng);
        assert_eq!(run.score, 10);
        assert_eq!(run.next_speed_score, 20);
        assert!(events.iter().any(|e| matches!(e, GameEvent::SpeedUp { .. })));
    }
}
