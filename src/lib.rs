//! Gift Catcher core crate.
//!
//! Gifts fall into a catch zone; the player presses the box of the matching
//! colour to catch them. The pure game core lives in [`game`] and runs natively
//! for tests; [`web`] drives it from the browser through `requestAnimationFrame`
//! and a spawn interval. Leaderboard and on-chain submission are reached through
//! the traits in [`services`].

use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod game;
pub mod logging;
pub mod services;
mod web;

pub use config::GameConfig;
pub use error::{GameError, ServiceError};
pub use game::{
    Advance, CatchBox, Driver, FinalScore, GameEvent, GameOutcome, GamePhase, Gift, GiftColor, GiftId, GiftKind,
    Scheduler, Session, SessionSnapshot, Spawner, advance, check_catch,
};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}

// -----------------------------------------------------------------------------
// JS entry points
// -----------------------------------------------------------------------------

/// Remember the connected wallet and chosen username. Required before `start_game`.
#[wasm_bindgen]
pub fn set_player(wallet: &str, username: &str) -> Result<(), JsValue> {
    web::set_player(wallet, username)?;
    Ok(())
}

/// Username already registered for `wallet`, signing that player in; `null`
/// when the wallet is new and must call `set_player`.
#[wasm_bindgen]
pub fn resume_player(wallet: &str) -> Result<Option<String>, JsValue> {
    Ok(web::resume_player(wallet)?)
}

/// Forget the player (wallet disconnected) and abandon any running session.
#[wasm_bindgen]
pub fn clear_player() {
    web::clear_player();
}

#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    web::start(None)?;
    Ok(())
}

/// Like `start_game`, overriding tuning constants from a partial JSON object.
#[wasm_bindgen]
pub fn start_game_with_config(json: &str) -> Result<(), JsValue> {
    let cfg = GameConfig::from_json(json)?;
    web::start(Some(cfg))?;
    Ok(())
}

#[wasm_bindgen]
pub fn restart_game() -> Result<(), JsValue> {
    web::restart()?;
    Ok(())
}

#[wasm_bindgen]
pub fn stop_game() {
    web::stop();
}

/// Sound clip URLs as JSON: `{ music, correct, wrong, game_over, win }`, all optional.
#[wasm_bindgen]
pub fn set_sounds(json: &str) -> Result<(), JsValue> {
    web::set_sounds(json)?;
    Ok(())
}

#[wasm_bindgen]
pub fn press_box(box_id: usize) {
    web::press_box(box_id);
}

/// Current session as JSON (`null` before the first start).
#[wasm_bindgen]
pub fn session_snapshot() -> Result<String, JsValue> {
    Ok(web::snapshot_json()?)
}

/// `{ score, best_streak, outcome }` once the session has ended, else `null`.
/// Hosts hand this to their leaderboard / chain submission.
#[wasm_bindgen]
pub fn final_score() -> Result<String, JsValue> {
    Ok(web::final_score_json()?)
}

#[wasm_bindgen]
pub fn record_local_score() -> Result<bool, JsValue> {
    Ok(web::record_local_score()?)
}

#[wasm_bindgen]
pub fn local_leaderboard(limit: usize) -> Result<String, JsValue> {
    let rows = web::leaderboard(limit)?;
    serde_json::to_string(&rows).map_err(|e| JsValue::from_str(&e.to_string()))
}
