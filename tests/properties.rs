// Randomized runs: whatever the player does, the run bookkeeping holds.

use block_dodger::sim::{Arena, Obstacle, ObstacleKind, RunState, TickInput, progression};
use block_dodger::{Game, GamePhase, Mode};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Snapshot {
    score: u64,
    speed_multiplier: f32,
    next_speed_score: u64,
    next_capacity_score: u64,
}

impl Snapshot {
    fn of(run: &RunState) -> Self {
        Self {
            score: run.score,
            speed_multiplier: run.speed_multiplier,
            next_speed_score: run.next_speed_score,
            next_capacity_score: run.next_capacity_score,
        }
    }
}

fn input_for(key: u8, target: f32) -> TickInput {
    match key {
        0 => TickInput::default(),
        1 => TickInput {
            left: true,
            ..Default::default()
        },
        2 => TickInput {
            right: true,
            ..Default::default()
        },
        _ => TickInput {
            target_x: Some(target),
            ..Default::default()
        },
    }
}

fn frames() -> impl Strategy<Value = Vec<(u8, f32, f32)>> {
    prop::collection::vec((0u8..4, 1.0f32..60.0, -100.0f32..900.0), 1..300)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn bookkeeping_never_goes_backwards(seed in any::<u64>(), mode in 0usize..3, steps in frames()) {
        let mut game = Game::new(Arena::default(), seed);
        prop_assert!(game.start(Mode::ALL[mode]));
        let mut last = Snapshot::of(game.run().unwrap());

        for (key, elapsed, target) in steps {
            game.frame(elapsed, &input_for(key, target));
            let run = game.run().unwrap();
            let now = Snapshot::of(run);

            prop_assert!(now.score >= last.score);
            prop_assert!(now.speed_multiplier >= last.speed_multiplier);
            prop_assert!(now.next_speed_score >= last.next_speed_score);
            prop_assert!(now.next_capacity_score >= last.next_capacity_score);

            let profile = run.profile();
            prop_assert!(run.capacity >= profile.min_obstacles);
            prop_assert!(run.capacity <= progression::capacity_ceiling(profile, run.score));

            // Player stays on the playfield
            let half = run.player.half_width();
            prop_assert!(run.player.pos.x >= half - 1e-3);
            prop_assert!(run.player.pos.x <= run.arena.width - half + 1e-3);

            prop_assert_eq!(run.is_terminal(), game.phase() == GamePhase::GameOver);
            last = now;
        }
    }

    #[test]
    fn spawning_never_exceeds_capacity(seed in any::<u64>(), mode in 0usize..3, attempts in 1usize..40) {
        let mut game = Game::new(Arena::default(), seed);
        game.start(Mode::ALL[mode]);

        for _ in 0..attempts {
            let before = game.run().unwrap().obstacles.len();
            let spawned = game.on_spawn_timer();
            let run = game.run().unwrap();
            if spawned.is_some() {
                prop_assert_eq!(run.obstacles.len(), before + 1);
                prop_assert!(run.obstacles.len() <= run.capacity as usize);
            } else {
                prop_assert_eq!(run.obstacles.len(), before);
            }
        }
    }

    #[test]
    fn game_over_is_final(seed in any::<u64>(), mode in 0usize..3, warmup in frames(), after in frames()) {
        let mut game = Game::new(Arena::default(), seed);
        game.start(Mode::ALL[mode]);
        for (key, elapsed, target) in warmup {
            game.frame(elapsed, &input_for(key, target));
        }

        // Make sure the run is over, whichever way it went
        if game.phase() == GamePhase::Running {
            let run = game.run_mut().unwrap();
            let id = run.next_entity_id();
            let pos = run.player.pos;
            run.obstacles.push(Obstacle {
                id,
                pos,
                base_speed: 0.0,
                kind: ObstacleKind::Hazard,
                spawn_x: pos.x,
            });
            game.on_tick(16.67, &TickInput::default());
        }
        prop_assert_eq!(game.phase(), GamePhase::GameOver);
        let frozen = game.run().unwrap().clone();
        let result = game.take_result();
        prop_assert_eq!(result.map(|r| r.score), Some(frozen.score));

        for (key, elapsed, target) in after {
            prop_assert!(game.frame(elapsed, &input_for(key, target)).is_empty());
            prop_assert!(game.on_spawn_timer().is_none());
            prop_assert!(game.on_projectile_timer().is_none());
        }
        let run = game.run().unwrap();
        prop_assert!(run.is_terminal());
        prop_assert_eq!(run.score, frozen.score);
        prop_assert_eq!(run.obstacles.len(), frozen.obstacles.len());
        prop_assert_eq!(run.projectiles.len(), frozen.projectiles.len());
        prop_assert!(!game.start(Mode::Normal));
        prop_assert!(game.take_result().is_none());
    }
}
