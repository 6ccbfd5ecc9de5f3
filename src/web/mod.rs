//! Browser host: keeps the driver in a thread-local, wires rAF / interval
//! callbacks and input listeners to it, and redraws after every mutation.

use std::cell::{Cell, RefCell};

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, window};

use crate::config::GameConfig;
use crate::error::{GameError, ServiceError};
use crate::game::{Driver, GameEvent, GamePhase, box_nearest};
use crate::services::{
    InMemoryLeaderboard, Leaderboard, LeaderboardEntry, PlayerIdentity, SubmitOutcome, register_player,
    returning_player,
};

mod audio;
mod render;
mod schedule;

use audio::{SoundBank, SoundUrls};
use render::{BOX_TOP, Renderer, update_hud};
use schedule::BrowserScheduler;

type WebDriver = Driver<BrowserScheduler, StdRng>;

struct WebGame {
    driver: WebDriver,
    renderer: Renderer,
    doc: Document,
    recorded_locally: bool,
}

impl WebGame {
    fn frame(&mut self, ts: f64) {
        let events = self.driver.on_frame(ts);
        self.redraw();
        report(&events);
    }

    fn spawn(&mut self) {
        let events = self.driver.on_spawn_timer();
        report(&events);
    }

    fn press(&mut self, box_id: usize) {
        let events = self.driver.press_box(box_id);
        self.redraw();
        report(&events);
    }

    fn start(&mut self) -> Result<(), GameError> {
        self.driver.set_player(current_player());
        self.driver.start()?;
        self.recorded_locally = false;
        SOUNDS.with(|s| s.borrow().start_music());
        self.redraw();
        Ok(())
    }

    fn restart(&mut self) -> Result<(), GameError> {
        self.driver.set_player(current_player());
        self.driver.restart()?;
        self.recorded_locally = false;
        SOUNDS.with(|s| s.borrow().start_music());
        self.redraw();
        Ok(())
    }

    fn redraw(&self) {
        let snap = self.driver.snapshot();
        let cfg = self.driver.session().config();
        self.renderer.draw(&snap, cfg);
        update_hud(&self.doc, &snap, cfg.initial_lives);
    }
}

thread_local! {
    static GAME: RefCell<Option<WebGame>> = const { RefCell::new(None) };
    static PLAYER: RefCell<Option<PlayerIdentity>> = const { RefCell::new(None) };
    static LOCAL_BOARD: RefCell<InMemoryLeaderboard> = RefCell::new(InMemoryLeaderboard::new());
    static LISTENERS_INSTALLED: Cell<bool> = const { Cell::new(false) };
    static SOUNDS: RefCell<SoundBank> = RefCell::new(SoundBank::default());
}

fn with_game<T>(f: impl FnOnce(&mut WebGame) -> T) -> Option<T> {
    GAME.with(|cell| cell.borrow_mut().as_mut().map(f))
}

fn current_player() -> Option<PlayerIdentity> {
    PLAYER.with(|p| p.borrow().clone())
}

fn report(events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::GameEnded { outcome, score, .. } => info!("game over ({:?}), final score {}", outcome, score),
            other => debug!("{:?}", other),
        }
    }
    SOUNDS.with(|s| s.borrow().play_events(events));
}

fn dom_err(err: JsValue) -> GameError {
    GameError::Dom(format!("{:?}", err))
}

fn new_driver(cfg: GameConfig) -> Result<WebDriver, GameError> {
    let scheduler = BrowserScheduler::new(
        |ts| {
            with_game(|g| g.frame(ts));
        },
        || {
            with_game(|g| g.spawn());
        },
    );
    Driver::new(cfg, scheduler, StdRng::from_entropy())
}

/// Validate and remember the wallet identity for the next session.
pub fn set_player(wallet: &str, username: &str) -> Result<(), ServiceError> {
    let player = LOCAL_BOARD.with(|b| register_player(&mut *b.borrow_mut(), wallet, username))?;
    info!("player {} ({})", player.username.as_str(), player.wallet.as_str());
    PLAYER.with(|p| p.replace(Some(player)));
    Ok(())
}

/// Sign a wallet back in under the name it registered earlier. Returns that
/// name, or `None` when the wallet still has to pick one.
pub fn resume_player(wallet: &str) -> Result<Option<String>, ServiceError> {
    let Some(player) = LOCAL_BOARD.with(|b| returning_player(&*b.borrow(), wallet))? else {
        return Ok(None);
    };
    let name = player.username.as_str().to_string();
    info!("welcome back {name}");
    PLAYER.with(|p| p.replace(Some(player)));
    Ok(Some(name))
}

pub fn clear_player() {
    PLAYER.with(|p| p.replace(None));
    with_game(|g| g.driver.quit());
    SOUNDS.with(|s| s.borrow().stop_music());
}

/// Mount on first use, then idle -> playing. A new config is only applied
/// while no session is in progress.
pub fn start(cfg: Option<GameConfig>) -> Result<(), GameError> {
    if let Some(cfg) = &cfg {
        cfg.validate()?;
    }
    let mounted = GAME.with(|g| g.borrow().is_some());
    if !mounted {
        let win = window().ok_or_else(|| GameError::Dom("no window".into()))?;
        let doc = win.document().ok_or_else(|| GameError::Dom("no document".into()))?;
        let renderer = Renderer::mount(&doc).map_err(dom_err)?;
        install_listeners(&doc, &renderer)?;
        let game = WebGame {
            driver: new_driver(cfg.unwrap_or_default())?,
            renderer,
            doc,
            recorded_locally: false,
        };
        GAME.with(|g| g.replace(Some(game)));
    } else if let Some(cfg) = cfg {
        with_game(|g| -> Result<(), GameError> {
            if g.driver.phase() != GamePhase::Playing {
                g.driver.quit();
                g.driver = new_driver(cfg)?;
            }
            Ok(())
        })
        .transpose()?;
    }
    with_game(|g| g.start()).unwrap_or_else(|| Err(GameError::Dom("game not mounted".into())))
}

pub fn restart() -> Result<(), GameError> {
    with_game(|g| g.restart()).unwrap_or_else(|| start(None))
}

pub fn stop() {
    with_game(|g| {
        g.driver.quit();
        g.redraw();
    });
    SOUNDS.with(|s| s.borrow().stop_music());
}

/// Load sound clips from `{ music, correct, wrong, game_over, win }` URLs.
pub fn set_sounds(json: &str) -> Result<(), GameError> {
    let urls: SoundUrls = serde_json::from_str(json)?;
    SOUNDS.with(|s| s.replace(SoundBank::load(&urls)));
    Ok(())
}

pub fn press_box(box_id: usize) {
    with_game(|g| g.press(box_id));
}

pub fn snapshot_json() -> Result<String, GameError> {
    with_game(|g| serde_json::to_string(&g.driver.snapshot()).map_err(GameError::from))
        .unwrap_or_else(|| Ok("null".to_string()))
}

pub fn final_score_json() -> Result<String, GameError> {
    let score = with_game(|g| g.driver.final_score()).flatten();
    Ok(serde_json::to_string(&score)?)
}

/// Record the finished session on the in-page leaderboard. Returns true for a new best.
pub fn record_local_score() -> Result<bool, ServiceError> {
    let pending = with_game(|g| {
        if g.recorded_locally {
            return Err(ServiceError::AlreadySubmitted);
        }
        let score = g.driver.final_score().ok_or(ServiceError::SessionNotEnded)?;
        let player = g
            .driver
            .player()
            .cloned()
            .ok_or_else(|| ServiceError::Unavailable("no player identity".into()))?;
        Ok((player, score))
    })
    .unwrap_or(Err(ServiceError::SessionNotEnded))?;
    let (player, score) = pending;
    let outcome = LOCAL_BOARD.with(|b| b.borrow_mut().submit(&player, &score, None))?;
    with_game(|g| g.recorded_locally = true);
    Ok(outcome == SubmitOutcome::NewHighScore)
}

pub fn leaderboard(limit: usize) -> Result<Vec<LeaderboardEntry>, ServiceError> {
    LOCAL_BOARD.with(|b| b.borrow().top(limit))
}

fn install_listeners(doc: &Document, renderer: &Renderer) -> Result<(), GameError> {
    if LISTENERS_INSTALLED.with(|f| f.replace(true)) {
        return Ok(());
    }

    // Keys 1-4 press boxes; Enter starts or restarts.
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            let key = evt.key();
            if key == "Enter" {
                let phase = with_game(|g| g.driver.phase());
                let res = match phase {
                    Some(GamePhase::Ended) => restart(),
                    Some(GamePhase::Idle) => start(None),
                    _ => Ok(()),
                };
                if let Err(e) = res {
                    warn!("{e}");
                }
                return;
            }
            if let Some(digit) = key.chars().next().and_then(|c| c.to_digit(10)) {
                if key.len() == 1 && digit >= 1 {
                    press_box(digit as usize - 1);
                }
            }
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())
            .map_err(dom_err)?;
        closure.forget();
    }

    // Pointer presses in the box strip pick the nearest box column.
    {
        let canvas = renderer.canvas().clone();
        let canvas_down = canvas.clone();
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            let w = canvas_down.client_width().max(1) as f64;
            let h = canvas_down.client_height().max(1) as f64;
            let x_pct = evt.offset_x() as f64 / w * 100.0;
            let y_pct = evt.offset_y() as f64 / h * 100.0;
            if y_pct < BOX_TOP {
                return;
            }
            let target = with_game(|g| box_nearest(g.driver.session().snapshot().boxes, x_pct).map(|b| b.id)).flatten();
            if let Some(id) = target {
                press_box(id);
            }
        }) as Box<dyn FnMut(_)>);
        canvas
            .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())
            .map_err(dom_err)?;
        closure.forget();
    }
    Ok(())
}
