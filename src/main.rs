//! Tiger Merge entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlElement, MouseEvent, TouchEvent};

    use tiger_merge::consts::DROP_MARGIN;
    use tiger_merge::render::{DomRenderer, TIER_EMOJI, tier_class};
    use tiger_merge::sim::{GamePhase, GameState, step};
    use tiger_merge::{HighScores, Settings};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        renderer: DomRenderer,
        highscores: HighScores,
        settings: Settings,
        /// Horizontal drop position the player is aiming at
        preview_x: f32,
        dragging: bool,
        /// Placement/resize requests are queued here by the event handlers
        /// and applied between steps, never mid-step
        pending_place: Option<f32>,
        pending_resize: Option<(f32, f32)>,
        /// Preview style last pushed to the DOM (tier, x)
        preview_shown: Option<(u8, f32)>,
        score_recorded: bool,
    }

    impl Game {
        fn new(seed: u64, width: f32, height: f32, renderer: DomRenderer, settings: Settings) -> Self {
            Self {
                state: GameState::new(seed, width, height),
                renderer,
                highscores: HighScores::load(),
                settings,
                preview_x: width / 2.0,
                dragging: false,
                pending_place: None,
                pending_resize: None,
                preview_shown: None,
                score_recorded: false,
            }
        }

        fn clamp_preview(&mut self) {
            self.preview_x = self
                .preview_x
                .max(DROP_MARGIN)
                .min(self.state.width - DROP_MARGIN);
        }

        /// Run one frame: apply queued inputs, advance the sim, sync the DOM
        fn frame(&mut self, document: &Document) {
            if let Some((w, h)) = self.pending_resize.take() {
                self.state.resize(w, h);
                self.clamp_preview();
            }
            if let Some(x) = self.pending_place.take() {
                self.state.place(x);
            }

            step(&mut self.state);

            let events = self.state.take_events();
            if let Err(err) = self.renderer.apply(&events) {
                log::warn!("render error: {err:?}");
            }

            if self.state.phase == GamePhase::Won && !self.score_recorded {
                self.score_recorded = true;
                let rank = self.highscores.record(
                    self.state.score,
                    self.state.best_tier,
                    js_sys::Date::now(),
                );
                if let Some(rank) = rank {
                    log::info!("New high score, rank {rank}");
                }
                self.highscores.save();
            }

            self.update_preview(document);
            self.update_hud(document);
        }

        /// Restyle the drop preview when the queued tier or aim changed
        fn update_preview(&mut self, document: &Document) {
            let wanted = (self.state.next_tier, self.preview_x);
            if self.preview_shown == Some(wanted) {
                return;
            }
            if let Some(preview) = element(document, "previewBall") {
                if self
                    .renderer
                    .style_preview(&preview, wanted.0, wanted.1)
                    .is_ok()
                {
                    self.preview_shown = Some(wanted);
                }
            }
            if self.settings.show_drop_guide {
                if let Some(guide) = element(document, "dropGuide") {
                    let _ = guide
                        .style()
                        .set_property("left", &format!("{}px", self.preview_x));
                }
            }
        }

        /// Update HUD elements in the DOM
        fn update_hud(&self, document: &Document) {
            if let Some(el) = document.get_element_by_id("score") {
                el.set_text_content(Some(&self.state.score.to_string()));
            }

            if let Some(el) = document.get_element_by_id("nextItem") {
                el.set_text_content(Some(TIER_EMOJI[self.state.next_tier as usize]));
                el.set_class_name(&tier_class(self.state.next_tier));
            }

            // Button enablement follows the phase
            if let Some(el) = document.get_element_by_id("startBtn") {
                set_disabled(&el, self.state.phase != GamePhase::Ready);
            }
            if let Some(el) = document.get_element_by_id("pauseBtn") {
                set_disabled(
                    &el,
                    !matches!(self.state.phase, GamePhase::Playing | GamePhase::Paused),
                );
                el.set_text_content(Some(if self.state.phase == GamePhase::Paused {
                    "Resume"
                } else {
                    "Pause"
                }));
            }

            // Preview hidden unless actively playing
            if let Some(preview) = element(document, "previewBall") {
                let display = if self.state.phase == GamePhase::Playing {
                    "block"
                } else {
                    "none"
                };
                let _ = preview.style().set_property("display", display);
            }

            // Win overlay
            if let Some(over) = element(document, "gameOver") {
                if self.state.phase == GamePhase::Won {
                    let _ = over.style().set_property("display", "block");
                    if let Some(el) = document.get_element_by_id("finalScore") {
                        el.set_text_content(Some(&self.state.score.to_string()));
                    }
                } else {
                    let _ = over.style().set_property("display", "none");
                }
            }
        }

        /// Tear down the run and go back to the ready screen
        fn reset(&mut self, seed: u64) {
            let (w, h) = (self.state.width, self.state.height);
            self.state = GameState::new(seed, w, h);
            self.renderer.clear();
            self.preview_x = w / 2.0;
            self.preview_shown = None;
            self.pending_place = None;
            self.dragging = false;
            self.score_recorded = false;
            log::info!("Game reset with seed {seed}");
        }
    }

    fn element(document: &Document, id: &str) -> Option<HtmlElement> {
        document.get_element_by_id(id)?.dyn_into().ok()
    }

    fn set_disabled(el: &web_sys::Element, disabled: bool) {
        if disabled {
            let _ = el.set_attribute("disabled", "");
        } else {
            let _ = el.remove_attribute("disabled");
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Tiger Merge starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let area: HtmlElement = document
            .get_element_by_id("gameArea")
            .expect("no game area")
            .dyn_into()
            .expect("game area is not an element");

        let width = area.client_width() as f32;
        let height = area.client_height() as f32;

        let seed = js_sys::Date::now() as u64;
        let settings = Settings::load();
        let renderer = DomRenderer::new(document.clone(), area.clone(), !settings.reduced_motion);
        let game = Rc::new(RefCell::new(Game::new(
            seed, width, height, renderer, settings,
        )));

        log::info!("Game initialized with seed: {seed}");

        setup_pointer_handlers(&area, game.clone());
        setup_buttons(game.clone());
        setup_resize(&area, game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game);

        log::info!("Tiger Merge running!");
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        {
            let document = web_sys::window().unwrap().document().unwrap();
            game.borrow_mut().frame(&document);
        }
        request_animation_frame(game);
    }

    fn setup_pointer_handlers(area: &HtmlElement, game: Rc<RefCell<Game>>) {
        // Mouse down - start aiming
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.state.phase == GamePhase::Playing {
                    g.dragging = true;
                }
            });
            let _ = area
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move - drag the preview
        {
            let game = game.clone();
            let area_clone = area.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.state.phase != GamePhase::Playing || !g.dragging {
                    return;
                }
                let rect = area_clone.get_bounding_client_rect();
                g.preview_x = event.client_x() as f32 - rect.left() as f32;
                g.clamp_preview();
            });
            let _ = area
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up / leave - drop at the aimed position
        for kind in ["mouseup", "mouseleave"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.state.phase != GamePhase::Playing || !g.dragging {
                    return;
                }
                g.dragging = false;
                g.pending_place = Some(g.preview_x);
            });
            let _ = area.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let mut g = game.borrow_mut();
                if g.state.phase == GamePhase::Playing {
                    g.dragging = true;
                    event.prevent_default();
                }
            });
            let _ = area
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let area_clone = area.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let mut g = game.borrow_mut();
                if g.state.phase != GamePhase::Playing || !g.dragging {
                    return;
                }
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let rect = area_clone.get_bounding_client_rect();
                    g.preview_x = touch.client_x() as f32 - rect.left() as f32;
                    g.clamp_preview();
                }
            });
            let _ = area
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end - drop
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                let mut g = game.borrow_mut();
                if g.state.phase != GamePhase::Playing || !g.dragging {
                    return;
                }
                g.dragging = false;
                g.pending_place = Some(g.preview_x);
            });
            let _ = area
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        if let Some(btn) = document.get_element_by_id("startBtn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().state.start();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("pauseBtn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().state.toggle_pause();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("resetBtn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let seed = js_sys::Date::now() as u64;
                game.borrow_mut().reset(seed);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Restart from the win overlay: reset and go straight into play
        if let Some(btn) = document.get_element_by_id("restartBtn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let seed = js_sys::Date::now() as u64;
                let mut g = game.borrow_mut();
                g.reset(seed);
                g.state.start();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("toggleFullscreen") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                toggle_fullscreen();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn toggle_fullscreen() {
        let document = web_sys::window().unwrap().document().unwrap();
        if document.fullscreen_element().is_none() {
            if let Some(root) = document.document_element() {
                let _ = root.request_fullscreen();
            }
        } else {
            document.exit_fullscreen();
        }
    }

    fn setup_resize(area: &HtmlElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let area = area.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let w = area.client_width() as f32;
            let h = area.client_height() as f32;
            game.borrow_mut().pending_resize = Some((w, h));
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                let mut g = game.borrow_mut();
                if g.state.phase == GamePhase::Playing {
                    g.state.toggle_pause();
                    log::info!("Auto-paused (tab hidden)");
                }
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tiger Merge (native) starting...");

    // Headless demo: drop a handful of balls and let them settle
    use tiger_merge::sim::{GameState, step};

    let mut state = GameState::new(0xD1CE, 800.0, 600.0);
    state.start();
    for x in [200.0, 210.0, 400.0, 405.0, 600.0] {
        state.place(x);
        for _ in 0..240 {
            step(&mut state);
        }
    }
    println!(
        "headless demo: {} balls, score {}, best tier {}",
        state.balls.len(),
        state.score,
        state.best_tier
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
