//! Block Dodger entry point
//!
//! Handles platform-specific initialization and runs the game loop.
//!
//! On the web the host page supplies the markup; elements that are missing
//! are skipped, except the canvas. Expected ids:
//! - `canvas`: the playfield `<canvas>`, sized by CSS
//! - `mode-menu`: menu panel with one `mode-normal` / `mode-asian` /
//!   `mode-shooting` button each, `skin-1`..`skin-3` buttons, a `player-name`
//!   `<input>` with a `change-name-btn` button, a `player-greeting` line,
//!   `best-<mode>` personal best slots and `leaderboard-<mode>` panels
//! - `hud` containing `hud-score`
//! - `game-over` panel containing `final-score` and a `restart-btn` button
//!
//! Hidden panels get the `hidden` class.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, HtmlCanvasElement, HtmlInputElement, KeyboardEvent, PointerEvent,
    };

    use block_dodger::consts::*;
    use block_dodger::leaderboard::{
        RemoteLeaderboard, check_name_available, fetch_top_scores, format_leaderboard,
        submit_run_result, unix_millis,
    };
    use block_dodger::persistence::BrowserStorage;
    use block_dodger::sim::{Arena, GameEvent, ObstacleKind, TickInput};
    use block_dodger::{Game, GamePhase, LeaderboardBackend, Mode, Preferences, Skin};

    /// Serverless functions next to the page
    const LEADERBOARD_URL: &str = "/.netlify/functions";

    /// Host-side state: the lifecycle machine plus everything it must not know about
    struct App {
        game: Game,
        prefs: Preferences,
        store: BrowserStorage,
        leaderboard: RemoteLeaderboard,
        input: TickInput,
        last_time: f64,
        ctx: CanvasRenderingContext2d,
    }

    impl App {
        fn start(&mut self, mode: Mode) {
            self.input = TickInput::default();
            self.last_time = 0.0;
            if self.game.start(mode) {
                set_visible("mode-menu", false);
                set_visible("game-over", false);
                set_visible("hud", true);
            }
        }

        fn update(&mut self, time: f64) {
            let elapsed = if self.last_time > 0.0 {
                ((time - self.last_time) as f32).min(MAX_FRAME_MS)
            } else {
                BASELINE_FRAME_MS
            };
            self.last_time = time;

            let events = self.game.frame(elapsed, &self.input);
            if events.iter().any(|e| matches!(e, GameEvent::RunEnded { .. })) {
                self.on_game_over();
            }
        }

        fn on_game_over(&mut self) {
            let Some(result) = self.game.take_result() else {
                return;
            };
            if self.prefs.record_score(result.mode, result.score) {
                self.prefs.save(&self.store);
            }

            // Fire and forget: the game-over panel never waits on this
            let leaderboard = self.leaderboard.clone();
            let name = self.prefs.display_name().to_string();
            wasm_bindgen_futures::spawn_local(async move {
                let now = unix_millis();
                submit_run_result(&leaderboard, result.mode, &name, result.score, now).await;
            });

            set_text("final-score", &result.score.to_string());
            set_visible("game-over", true);
        }

        fn render(&self) {
            let ctx = &self.ctx;
            let arena = self.game.arena();
            ctx.set_fill_style_str("#0b0d1a");
            ctx.fill_rect(0.0, 0.0, arena.width as f64, arena.height as f64);

            let Some(run) = self.game.run() else {
                return;
            };
            if self.game.phase() == GamePhase::Idle {
                return;
            }

            let (hazard, bonus) = match self.prefs.skin {
                Skin::Neon => ("#ff2bd6", "#2bffea"),
                _ => ("#e63946", "#ffd166"),
            };
            for obstacle in &run.obstacles {
                let b = obstacle.bounds();
                ctx.set_fill_style_str(match obstacle.kind {
                    ObstacleKind::Hazard => hazard,
                    ObstacleKind::Bonus => bonus,
                });
                ctx.fill_rect(b.min.x as f64, b.min.y as f64, b.width() as f64, b.height() as f64);
            }

            ctx.set_fill_style_str("#ffffff");
            for projectile in &run.projectiles {
                let b = projectile.bounds();
                ctx.fill_rect(b.min.x as f64, b.min.y as f64, b.width() as f64, b.height() as f64);
            }

            let player = run.player.bounds();
            ctx.set_fill_style_str(match self.prefs.skin {
                Skin::Classic => "#4cc9f0",
                Skin::Gold => "#f4a261",
                Skin::Neon => "#b5ff2b",
            });
            ctx.fill_rect(
                player.min.x as f64,
                player.min.y as f64,
                player.width() as f64,
                player.height() as f64,
            );

            set_text("hud-score", &format!("Score: {}", run.score));
        }
    }

    fn document() -> Option<web_sys::Document> {
        web_sys::window()?.document()
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(id: &str, visible: bool) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    fn on_click(id: &str, mut handler: impl FnMut() + 'static) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            let closure =
                Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| handler());
            let _ =
                el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Refresh the per-mode leaderboard panels and personal bests
    fn show_menu(app: &Rc<RefCell<App>>) {
        let (leaderboard, prefs) = {
            let a = app.borrow();
            (a.leaderboard.clone(), a.prefs.clone())
        };
        set_text("player-greeting", &format!("Hello, {}!", prefs.display_name()));
        for mode in Mode::ALL {
            set_text(
                &format!("best-{}", mode.as_str()),
                &prefs.high_score(mode).to_string(),
            );
            let panel = format!("leaderboard-{}", mode.as_str());
            set_text(&panel, "Loading...");
            let leaderboard = leaderboard.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let rows = fetch_top_scores(&leaderboard, mode, LEADERBOARD_LIMIT).await;
                set_text(&panel, &format_leaderboard(&rows));
            });
        }
        set_visible("hud", false);
        set_visible("mode-menu", true);
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Block Dodger starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        let width = canvas.client_width().max(1) as u32;
        let height = canvas.client_height().max(1) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let store = BrowserStorage;
        let prefs = Preferences::load(&store);
        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App {
            game: Game::new(Arena::new(width as f32, height as f32), seed),
            prefs,
            store,
            leaderboard: RemoteLeaderboard::new(LEADERBOARD_URL),
            input: TickInput::default(),
            last_time: 0.0,
            ctx,
        }));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&canvas, app.clone());
        setup_menu(app.clone());
        show_menu(&app);

        request_animation_frame(app);
        log::info!("Block Dodger running!");
    }

    fn setup_menu(app: Rc<RefCell<App>>) {
        for mode in Mode::ALL {
            let app = app.clone();
            on_click(&format!("mode-{}", mode.as_str()), move || {
                app.borrow_mut().start(mode);
            });
        }

        {
            let app = app.clone();
            on_click("restart-btn", move || {
                app.borrow_mut().game.restart();
                set_visible("game-over", false);
                show_menu(&app);
            });
        }

        for skin in Skin::ALL {
            let app = app.clone();
            on_click(&format!("skin-{}", skin.as_str()), move || {
                let mut a = app.borrow_mut();
                if a.prefs.select_skin(skin) {
                    let prefs = a.prefs.clone();
                    prefs.save(&a.store);
                } else if let (Some(window), Some(hint)) = (web_sys::window(), skin.unlock_hint()) {
                    let _ = window.alert_with_message(&hint);
                }
            });
        }

        on_click("change-name-btn", move || {
            let Some(input) = document()
                .and_then(|d| d.get_element_by_id("player-name"))
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            else {
                return;
            };
            let name = input.value().trim().to_string();
            if name.is_empty() {
                return;
            }
            let app = app.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let leaderboard = app.borrow().leaderboard.clone();
                if !check_name_available(&leaderboard, &name).await {
                    if let Some(window) = web_sys::window() {
                        let _ = window.alert_with_message(
                            "This name is already in use. Please choose a different name.",
                        );
                    }
                    return;
                }
                if let Err(e) = leaderboard.register_name(&name).await {
                    log::warn!("Name registration failed: {}", e);
                }
                {
                    let mut a = app.borrow_mut();
                    a.prefs.set_player_name(&name);
                    let prefs = a.prefs.clone();
                    prefs.save(&a.store);
                }
                set_text("player-greeting", &format!("Hello, {}!", name));
            });
        });
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Pointer: slide toward the pointer while it is down or hovering
        for event_name in ["pointerdown", "pointermove"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                app.borrow_mut().input.target_x = Some(event.offset_x() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
        for event_name in ["pointerup", "pointerleave"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                app.borrow_mut().input.target_x = None;
            });
            let _ = canvas
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard: held arrows
        let window = web_sys::window().expect("no window");
        for (event_name, pressed) in [("keydown", true), ("keyup", false)] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut a = app.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => a.input.left = pressed,
                    "ArrowRight" | "d" | "D" => a.input.right = pressed,
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            a.update(time);
            a.render();
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use block_dodger::consts::{BASELINE_FRAME_MS, LEADERBOARD_LIMIT};
    use block_dodger::leaderboard::{
        fetch_top_scores, format_leaderboard, submit_run_result, unix_millis,
    };
    use block_dodger::persistence::MemoryStore;
    use block_dodger::sim::Arena;
    use block_dodger::{Game, GamePhase, LocalLeaderboard, Mode, Preferences};

    env_logger::init();
    log::info!("Block Dodger (native) starting...");
    log::info!("Native mode plays headless demo runs - run with `trunk serve` for the web version");

    let store = MemoryStore::new();
    let leaderboard = LocalLeaderboard::new(store.clone());
    let mut prefs = Preferences::load(&store);
    prefs.set_player_name("Autopilot");

    // Ten minutes of game time per mode at most
    const MAX_FRAMES: u32 = 36_000;

    for (i, mode) in Mode::ALL.into_iter().enumerate() {
        let mut game = Game::new(Arena::default(), 0xB10C_D0D6 + i as u64);
        game.start(mode);

        let mut frames = 0;
        while game.phase() == GamePhase::Running && frames < MAX_FRAMES {
            let input = game
                .run()
                .map(autopilot::steer)
                .unwrap_or_default();
            game.frame(BASELINE_FRAME_MS, &input);
            frames += 1;
        }

        let (score, elapsed_ms) = match game.take_result() {
            Some(result) => (result.score, result.elapsed_ms),
            None => {
                let run = game.run();
                (run.map_or(0, |r| r.score), run.map_or(0.0, |r| r.elapsed_ms))
            }
        };
        prefs.record_score(mode, score);
        pollster::block_on(submit_run_result(
            &leaderboard,
            mode,
            prefs.display_name(),
            score,
            unix_millis(),
        ));
        println!(
            "{:<18} score {:>5} after {:>6.1}s",
            mode.label(),
            score,
            elapsed_ms / 1000.0
        );
        game.restart();
    }
    prefs.save(&store);

    for mode in Mode::ALL {
        let rows = pollster::block_on(fetch_top_scores(&leaderboard, mode, LEADERBOARD_LIMIT));
        println!("\n{}:\n{}", mode.label(), format_leaderboard(&rows));
    }
}

/// Simple bot for headless runs
#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use block_dodger::consts::{OBSTACLE_SIZE, PLAYER_SIZE};
    use block_dodger::sim::{ObstacleKind, RunState, TickInput};

    /// How far above the player a block is considered a threat
    const LOOKAHEAD: f32 = 260.0;

    pub fn steer(run: &RunState) -> TickInput {
        let player = &run.player;
        let reach = (PLAYER_SIZE + OBSTACLE_SIZE) / 2.0 + 4.0;
        let below_cutoff = player.pos.y - LOOKAHEAD;

        // Shooting: line up under the lowest block
        if run.profile().fires_projectiles {
            let lowest = run
                .obstacles
                .iter()
                .filter(|o| o.kind == ObstacleKind::Hazard)
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));
            return TickInput {
                target_x: lowest.map(|o| o.pos.x),
                ..Default::default()
            };
        }

        let threat = run
            .obstacles
            .iter()
            .filter(|o| o.kind == ObstacleKind::Hazard)
            .filter(|o| o.pos.y > below_cutoff && o.pos.y < player.pos.y + reach)
            .filter(|o| (o.pos.x - player.pos.x).abs() < reach)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

        if let Some(threat) = threat {
            // Dodge toward the side with more room
            let go_left = (threat.pos.x >= player.pos.x && player.pos.x > reach * 2.0)
                || player.pos.x > run.arena.width - reach * 2.0;
            let target = if go_left {
                threat.pos.x - reach - 1.0
            } else {
                threat.pos.x + reach + 1.0
            };
            return TickInput {
                target_x: Some(target),
                ..Default::default()
            };
        }

        // Nothing dangerous: chase a bonus
        let bonus = run
            .obstacles
            .iter()
            .filter(|o| o.kind == ObstacleKind::Bonus && o.pos.y < player.pos.y)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));
        TickInput {
            target_x: bonus.map(|o| o.pos.x),
            ..Default::default()
        }
    }
}
