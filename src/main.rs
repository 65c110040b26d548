//! Scene Arcade entry point
//!
//! In the browser, the host page provides `<script id="scene" type="application/json">`
//! (with `data-game="runner"` or `data-game="shooter"`), an optional
//! `<script id="tuning">`, a `#gameArea` container and an `#info` line.
//! Natively, both demo scenes are played headless by a simple autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, KeyboardEvent};

    use scene_arcade::consts::MAX_FRAME_MS;
    use scene_arcade::sim::{GamePhase, Session, VisualState};
    use scene_arcade::{EngineError, Tuning};

    /// Game instance holding the session and its DOM mirror
    struct Game {
        session: Session,
        last_time: f64,
        document: Document,
        area: Element,
        /// Entity id -> div, so unchanged entities are not recreated
        nodes: HashMap<String, Element>,
        last_phase: Option<GamePhase>,
    }

    impl Game {
        fn new(session: Session, document: Document, area: Element) -> Self {
            Self {
                session,
                last_time: 0.0,
                document,
                area,
                nodes: HashMap::new(),
                last_phase: None,
            }
        }

        /// Feed wall-clock time to the simulation
        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time).min(MAX_FRAME_MS)
            } else {
                0.0
            };
            self.last_time = time;
            self.session.advance(dt);
        }

        /// Mirror the frame into absolutely positioned divs
        fn render(&mut self) {
            let frame = self.session.frame();
            let mut seen = Vec::with_capacity(frame.entities.len());

            for entity in &frame.entities {
                let Some(node) = self.node(&entity.id) else {
                    continue;
                };
                let rect = entity.rect;
                let mut style = format!(
                    "position:absolute;left:{}px;top:{}px;width:{}px;height:{}px;",
                    rect.x, rect.y, rect.width, rect.height
                );
                let mut class = format!("entity {}", entity.visual.class());
                match &entity.visual {
                    VisualState::Decor { color: Some(color) } => {
                        style.push_str(&format!("background:{color};"));
                    }
                    VisualState::Text { text } => node.set_text_content(Some(text)),
                    VisualState::Player {
                        airborne,
                        visible,
                        weapon,
                        speed_boost,
                    } => {
                        if !visible {
                            style.push_str("visibility:hidden;");
                        }
                        if *airborne {
                            class.push_str(" airborne");
                        }
                        if *speed_boost {
                            class.push_str(" boosted");
                        }
                        class.push_str(&format!(" weapon-{weapon:?}").to_lowercase());
                    }
                    VisualState::Spikes { frame: Some(f) } => {
                        class.push_str(&format!(" frame-{f}"));
                    }
                    VisualState::Explosion { frame } => {
                        class.push_str(&format!(" frame-{frame}"));
                    }
                    _ => {}
                }
                let _ = node.set_attribute("style", &style);
                let _ = node.set_attribute("class", &class);
                seen.push(entity.id.as_str());
            }

            self.nodes.retain(|id, node| {
                let keep = seen.contains(&id.as_str());
                if !keep {
                    node.remove();
                }
                keep
            });

            let _ = self.area.set_attribute(
                "style",
                &format!("background-position:{}px 0;", -frame.background_offset),
            );
            set_info(&self.document, &frame.info);

            if self.last_phase != Some(frame.phase) {
                log::info!("Phase: {:?} (score {})", frame.phase, frame.score);
                self.last_phase = Some(frame.phase);
            }
        }

        fn node(&mut self, id: &str) -> Option<Element> {
            if let Some(node) = self.nodes.get(id) {
                return Some(node.clone());
            }
            let node = self.document.create_element("div").ok()?;
            let _ = node.set_attribute("data-id", id);
            self.area.append_child(&node).ok()?;
            self.nodes.insert(id.to_string(), node.clone());
            Some(node)
        }
    }

    fn set_info(document: &Document, text: &str) {
        if let Some(info) = document.get_element_by_id("info") {
            if info.text_content().as_deref() != Some(text) {
                info.set_text_content(Some(text));
            }
        }
    }

    /// Build the session from the page's scene and tuning elements
    fn load_session(document: &Document, seed: u64) -> Result<Session, EngineError> {
        let scene = document
            .get_element_by_id("scene")
            .ok_or_else(|| EngineError::SceneLoad {
                reason: "page has no #scene element".to_string(),
            })?;
        let scene_json = scene.text_content().unwrap_or_default();

        let tuning = match document
            .get_element_by_id("tuning")
            .and_then(|e| e.text_content())
        {
            Some(json) => Tuning::from_json(&json)?,
            None => match scene.get_attribute("data-game").as_deref() {
                Some("shooter") => Tuning::shooter(),
                _ => Tuning::runner(),
            },
        };
        Session::load(tuning, &scene_json, seed)
    }

    /// `event.code` then `event.key`; scene bindings may use either
    fn key_names(event: &KeyboardEvent) -> Vec<String> {
        let mut names = vec![event.code(), event.key()];
        names.retain(|n| !n.is_empty());
        names.dedup();
        names
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Scene Arcade starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");
        let area = document
            .get_element_by_id("gameArea")
            .expect("no #gameArea element");

        let seed = js_sys::Date::now() as u64;
        let session = match load_session(&document, seed) {
            Ok(session) => session,
            Err(err) => {
                log::error!("{err}");
                set_info(&document, &format!("Error: {err}"));
                return;
            }
        };
        set_info(&document, session.info());

        let game = Rc::new(RefCell::new(Game::new(session, document, area)));
        setup_input_handlers(game.clone());
        request_animation_frame(game);
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let names = key_names(&event);
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                if names.iter().any(|n| {
                    matches!(
                        *n,
                        "Space" | " " | "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight"
                    )
                }) {
                    event.prevent_default();
                }
                game.borrow_mut().session.key_down_as(&names);
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let names = key_names(&event);
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                game.borrow_mut().session.key_up_as(&names);
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Focus loss releases held keys
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().session.release_all();
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let restart = {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render();
            g.session.restart_requested()
        };

        if restart {
            // Restart is a fresh page load, not an in-place reset
            if let Some(window) = web_sys::window() {
                let _ = window.location().reload();
            }
            return;
        }
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use scene_arcade::consts::TICK_MS;
    use scene_arcade::sim::Session;
    use scene_arcade::{EngineError, Tuning};

    pub const RUNNER_SCENE: &str = include_str!("../scenes/runner.json");
    pub const SHOOTER_SCENE: &str = include_str!("../scenes/shooter.json");

    /// Longest simulated run per demo
    const DEMO_MS: f64 = 120_000.0;

    /// Jump whenever an obstacle is about to reach the player
    pub fn runner(seed: u64) -> Result<(), EngineError> {
        let mut session = Session::load(Tuning::runner(), RUNNER_SCENE, seed)?;
        while session.is_running() && session.now_ms() < DEMO_MS {
            let threat = session.entities().player.as_ref().is_some_and(|player| {
                let front = player.pos.x + player.size.x;
                session
                    .entities()
                    .obstacles
                    .iter()
                    .any(|o| (0.0..40.0).contains(&(o.pos.x - front)))
            });
            if threat {
                session.key_down("ArrowUp");
            } else {
                session.key_up("ArrowUp");
            }
            session.advance(TICK_MS);
        }
        report("runner", &session);
        Ok(())
    }

    /// Hold fire and chase the lowest enemy
    pub fn shooter(seed: u64) -> Result<(), EngineError> {
        let mut session = Session::load(Tuning::shooter(), SHOOTER_SCENE, seed)?;
        session.key_down("Space");
        while session.is_running() && session.now_ms() < DEMO_MS {
            let entities = session.entities();
            let target = entities
                .enemies
                .iter()
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .map(|e| e.pos.x + e.size.x / 2.0);
            let center = entities
                .player
                .as_ref()
                .map(|p| p.pos.x + p.size.x / 2.0);

            let (left, right) = match (target, center) {
                (Some(t), Some(c)) if t < c - 4.0 => (true, false),
                (Some(t), Some(c)) if t > c + 4.0 => (false, true),
                _ => (false, false),
            };
            for (key, down) in [("ArrowLeft", left), ("ArrowRight", right)] {
                if down {
                    session.key_down(key);
                } else {
                    session.key_up(key);
                }
            }
            session.advance(TICK_MS);
        }
        report("shooter", &session);
        Ok(())
    }

    fn report(name: &str, session: &Session) {
        let frame = session.frame();
        log::info!("{name}: {}", frame.info);
        println!(
            "{name}: {:?} after {:.1}s, score {}, difficulty {}",
            frame.phase,
            session.now_ms() / 1000.0,
            frame.score,
            frame.difficulty.as_str()
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Scene Arcade (native) starting...");
    log::info!("Native mode plays the demo scenes headless - build for wasm32 to play in a browser");

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    for (name, result) in [
        ("runner", headless::runner(seed)),
        ("shooter", headless::shooter(seed)),
    ] {
        if let Err(err) = result {
            log::error!("{name} demo failed: {err}");
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
