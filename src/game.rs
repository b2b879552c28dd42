//! Run lifecycle: Idle → Running → GameOver → Idle
//!
//! `Game` owns the current run, the RNG and both spawn timers. The host
//! adapter calls `frame()` once per animation frame (or the individual
//! `on_*` callbacks if it drives its own timers) and never touches run
//! state directly.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::PROJECTILE_INTERVAL_MS;
use crate::sim::{
    Arena, GameEvent, GamePhase, IntervalTimer, Mode, RunState, TickInput, spawn_projectile,
    tick, try_spawn_obstacle,
};

/// Outcome of a finished run, handed to the leaderboard collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub mode: Mode,
    pub score: u64,
    pub elapsed_ms: f64,
}

/// The run lifecycle state machine
#[derive(Debug, Clone)]
pub struct Game {
    phase: GamePhase,
    arena: Arena,
    rng: Pcg32,
    run: Option<RunState>,
    spawn_timer: Option<IntervalTimer>,
    projectile_timer: Option<IntervalTimer>,
    result: Option<RunResult>,
}

impl Game {
    pub fn new(arena: Arena, seed: u64) -> Self {
        Self {
            phase: GamePhase::Idle,
            arena,
            rng: Pcg32::seed_from_u64(seed),
            run: None,
            spawn_timer: None,
            projectile_timer: None,
            result: None,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn arena(&self) -> Arena {
        self.arena
    }

    /// Current run (also the reset run waiting in Idle after a restart)
    pub fn run(&self) -> Option<&RunState> {
        self.run.as_ref()
    }

    pub fn run_mut(&mut self) -> Option<&mut RunState> {
        self.run.as_mut()
    }

    /// New playfield size, applied from the next run on
    pub fn resize(&mut self, arena: Arena) {
        self.arena = arena;
    }

    /// Whether the (spawn, projectile) timers are armed
    pub fn timers_armed(&self) -> (bool, bool) {
        (self.spawn_timer.is_some(), self.projectile_timer.is_some())
    }

    /// Begin a run in `mode`. Only valid from Idle.
    pub fn start(&mut self, mode: Mode) -> bool {
        if self.phase != GamePhase::Idle {
            log::warn!("Ignoring start({}) in {:?}", mode.as_str(), self.phase);
            return false;
        }

        let run = RunState::new(mode, self.arena, &mut self.rng);
        let profile = run.profile();
        self.spawn_timer = Some(IntervalTimer::new(profile.spawn_interval_ms));
        self.projectile_timer = profile
            .fires_projectiles
            .then(|| IntervalTimer::new(PROJECTILE_INTERVAL_MS));

        log::info!(
            "Run started: mode={} capacity={} arena={}x{}",
            mode.as_str(),
            run.capacity,
            self.arena.width,
            self.arena.height
        );
        self.run = Some(run);
        self.result = None;
        self.phase = GamePhase::Running;
        true
    }

    /// Simulation step callback
    pub fn on_tick(&mut self, elapsed_ms: f32, input: &TickInput) -> Vec<GameEvent> {
        if self.phase != GamePhase::Running {
            return Vec::new();
        }
        let Some(run) = self.run.as_mut() else {
            return Vec::new();
        };

        let events = tick(run, input, elapsed_ms, &mut self.rng);
        if run.is_terminal() {
            self.finish();
        }
        events
    }

    /// Obstacle timer callback
    pub fn on_spawn_timer(&mut self) -> Option<u32> {
        if self.phase != GamePhase::Running {
            return None;
        }
        try_spawn_obstacle(self.run.as_mut()?, &mut self.rng)
    }

    /// Projectile timer callback (Shooting mode)
    pub fn on_projectile_timer(&mut self) -> Option<u32> {
        if self.phase != GamePhase::Running {
            return None;
        }
        spawn_projectile(self.run.as_mut()?)
    }

    /// Drive the owned timers, firing their callbacks for every elapsed period
    pub fn advance_timers(&mut self, elapsed_ms: f32) {
        let spawns = self
            .spawn_timer
            .as_mut()
            .map_or(0, |t| t.advance(elapsed_ms));
        for _ in 0..spawns {
            self.on_spawn_timer();
        }

        let shots = self
            .projectile_timer
            .as_mut()
            .map_or(0, |t| t.advance(elapsed_ms));
        for _ in 0..shots {
            self.on_projectile_timer();
        }
    }

    /// One animation frame: timers first, then the simulation step
    pub fn frame(&mut self, elapsed_ms: f32, input: &TickInput) -> Vec<GameEvent> {
        if self.phase != GamePhase::Running {
            return Vec::new();
        }
        self.advance_timers(elapsed_ms);
        self.on_tick(elapsed_ms, input)
    }

    /// Back to Idle with a clean run for the same mode
    pub fn restart(&mut self) {
        self.cancel_timers();
        if let Some(old) = self.run.take() {
            self.run = Some(RunState::new(old.mode, self.arena, &mut self.rng));
        }
        log::info!("Restart from {:?}", self.phase);
        self.phase = GamePhase::Idle;
    }

    /// Result of the last finished run, if not yet collected
    pub fn take_result(&mut self) -> Option<RunResult> {
        self.result.take()
    }

    fn finish(&mut self) {
        self.cancel_timers();
        if let Some(run) = &self.run {
            self.result = Some(RunResult {
                mode: run.mode,
                score: run.score,
                elapsed_ms: run.elapsed_ms,
            });
        }
        self.phase = GamePhase::GameOver;
    }

    fn cancel_timers(&mut self) {
        self.spawn_timer = None;
        self.projectile_timer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::BASELINE_FRAME_MS;
    use crate::sim::{Obstacle, ObstacleKind};
    use glam::Vec2;

    fn hazard_on_player(game: &mut Game) {
        let run = game.run_mut().unwrap();
        let id = run.next_entity_id();
        let pos = run.player.pos;
        run.obstacles.push(Obstacle {
            id,
            pos,
            base_speed: 5.0,
            kind: ObstacleKind::Hazard,
            spawn_x: pos.x,
        });
    }

    #[test]
    fn test_start_arms_timers_per_mode() {
        let mut game = Game::new(Arena::default(), 1);
        assert_eq!(game.phase(), GamePhase::Idle);
        assert!(game.start(Mode::Normal));
        assert_eq!(game.phase(), GamePhase::Running);
        assert_eq!(game.timers_armed(), (true, false));

        let mut game = Game::new(Arena::default(), 1);
        game.start(Mode::Shooting);
        assert_eq!(game.timers_armed(), (true, true));
    }

    #[test]
    fn test_start_only_from_idle() {
        let mut game = Game::new(Arena::default(), 1);
        assert!(game.start(Mode::Normal));
        assert!(!game.start(Mode::Asian));
        assert_eq!(game.run().unwrap().mode, Mode::Normal);
    }

    #[test]
    fn test_hazard_hit_enters_game_over() {
        let mut game = Game::new(Arena::default(), 9);
        game.start(Mode::Asian);
        hazard_on_player(&mut game);

        let events = game.on_tick(BASELINE_FRAME_MS, &TickInput::default());
        assert!(events.contains(&GameEvent::RunEnded { score: 0 }));
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert_eq!(game.timers_armed(), (false, false));

        let result = game.take_result().unwrap();
        assert_eq!(result.mode, Mode::Asian);
        assert_eq!(result.score, 0);
        assert!(game.take_result().is_none());

        // Latched until restart
        assert!(game.on_spawn_timer().is_none());
        assert!(game.frame(1000.0, &TickInput::default()).is_empty());
    }

    #[test]
    fn test_frame_spawns_on_timer() {
        let mut game = Game::new(Arena::default(), 5);
        game.start(Mode::Normal);
        game.run_mut().unwrap().capacity = 3;

        game.frame(499.0, &TickInput::default());
        assert_eq!(game.run().unwrap().obstacles.len(), 0);
        game.frame(1.0, &TickInput::default());
        assert_eq!(game.run().unwrap().obstacles.len(), 1);
    }

    #[test]
    fn test_shooting_fires_every_500ms() {
        let mut game = Game::new(Arena::default(), 5);
        game.start(Mode::Shooting);
        game.run_mut().unwrap().capacity = 0;

        game.advance_timers(1000.0);
        assert_eq!(game.run().unwrap().projectiles.len(), 2);
        assert!(game.run().unwrap().obstacles.is_empty());
    }

    #[test]
    fn test_restart_resets_run() {
        let mut game = Game::new(Arena::default(), 77);
        game.start(Mode::Normal);
        {
            let run = game.run_mut().unwrap();
            run.score = 42;
            run.speed_multiplier = 1.5;
            run.capacity = 7;
        }
        game.restart();
        // Second restart must be harmless
        game.restart();

        assert_eq!(game.phase(), GamePhase::Idle);
        assert_eq!(game.timers_armed(), (false, false));
        let run = game.run().unwrap();
        assert_eq!(run.score, 0);
        assert_eq!(run.speed_multiplier, 1.0);
        assert!(run.obstacles.is_empty());
        assert!((1..=5).contains(&run.capacity));

        assert!(game.start(Mode::Asian));
        assert_eq!(game.run().unwrap().mode, Mode::Asian);
    }

    #[test]
    fn test_resize_applies_to_next_run() {
        let mut game = Game::new(Arena::default(), 3);
        game.start(Mode::Normal);
        game.resize(Arena::new(320.0, 480.0));
        assert_eq!(game.run().unwrap().arena, Arena::default());

        game.restart();
        game.start(Mode::Normal);
        assert_eq!(game.run().unwrap().arena, Arena::new(320.0, 480.0));
        assert_eq!(game.run().unwrap().player.pos, Vec2::new(160.0, 400.0));
    }
}
