//! Error types. The core itself is total over valid state; errors only come
//! from malformed state tables (fatal at construction) and host setup.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// A state table failed validation when an actor was built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActorError {
    #[error("state {state}: frame window start {start} is after end {end}")]
    InvertedFrameWindow {
        state: &'static str,
        start: u32,
        end: u32,
    },
    #[error("state {state}: frame duration must be positive, got {frame_ms}")]
    NonPositiveFrameDuration { state: &'static str, frame_ms: f64 },
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Actor(#[from] ActorError),
    #[error("no global `window`")]
    NoWindow,
    #[error("no `document` on window")]
    NoDocument,
    #[error("no `performance` on window")]
    NoPerformance,
    #[error("element #{0} not found")]
    MissingElement(String),
    #[error("element #{id} is not a {expected}")]
    WrongElementType { id: String, expected: &'static str },
    #[error("2d canvas context unavailable")]
    NoContext2d,
    #[error("DOM call failed: {0}")]
    Dom(String),
    #[cfg(feature = "serde_json")]
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

impl From<JsValue> for GameError {
    fn from(value: JsValue) -> Self {
        GameError::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<GameError> for JsValue {
    fn from(err: GameError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
