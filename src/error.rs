use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::game::GamePhase;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("No player identity is available; connect a wallet first")]
    MissingIdentity,
    #[error("A session is already playing")]
    AlreadyPlaying,
    #[error("The session is {0:?}; it must be idle to start")]
    NotIdle(GamePhase),
    #[error("Invalid game configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("DOM operation failed: {0}")]
    Dom(String),
}

/// Failures of the remote collaborators (leaderboard, chain). Never fatal to the game loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Remote service unavailable: {0}")]
    Unavailable(String),
    #[error("Transaction rejected: {0}")]
    Rejected(String),
    #[error("Wrong network. Expected chain ID {expected}, got {actual}")]
    WrongNetwork { expected: u64, actual: u64 },
    #[error("Invalid username: {0}")]
    InvalidUsername(String),
    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),
    #[error("Username already taken: {0}")]
    UsernameTaken(String),
    #[error("Score already submitted")]
    AlreadySubmitted,
    #[error("Only a finished session can be submitted")]
    SessionNotEnded,
    #[error("Transaction hash not found")]
    MissingTxHash,
}

impl From<GameError> for JsValue {
    fn from(err: GameError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

impl From<ServiceError> for JsValue {
    fn from(err: ServiceError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
