//! Desk Duty core crate.
//!
//! Hold the work key to keep the worker busy; let go while the supervisor is
//! peeking and the shift is over. The timed state machines, difficulty curve
//! and loss rule are plain Rust and run natively under `cargo test`; the
//! `web` module is the only part that touches the browser.

use wasm_bindgen::prelude::*;

pub mod actor;
pub mod clock;
pub mod config;
pub mod difficulty;
pub mod error;
pub mod session;
pub mod sprite;
mod telemetry;
pub mod web;

pub use actor::{Actor, Supervisor, SupervisorState, Worker, WorkerState};
pub use clock::{FrameClock, GameLoop, TimeSource};
pub use config::{HostConfig, Tuning};
pub use difficulty::{DifficultyParameters, compute_difficulty, hour_bucket};
pub use error::{ActorError, GameError};
pub use session::{Phase, Session, Snapshot, TickOutcome};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Starts the game against the default page layout.
#[wasm_bindgen]
pub fn start_game() -> Result<web::GameHandle, JsValue> {
    Ok(web::start(HostConfig::default())?)
}

/// Starts the game with a JSON object overriding parts of [`HostConfig`].
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_game_with_config(json: &str) -> Result<web::GameHandle, JsValue> {
    let config = HostConfig::from_json(json)?;
    Ok(web::start(config)?)
}
