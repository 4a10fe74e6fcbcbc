//! Game timings and host wiring.
//!
//! [`Tuning`] carries the built-in rule timings; [`HostConfig`] only says where
//! the page keeps its canvas, images and status line.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::Level;

/// Built-in game timings, all in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct Tuning {
    /// Length of one in-game hour of active play.
    pub ms_per_hour: f64,
    /// The worker gives up and relaxes after holding work this long.
    pub max_work_ms: f64,
    /// Guard before a relaxing worker may be sent back to work.
    pub min_relax_ms: f64,
    /// Guard before a crying worker may start a new shift.
    pub min_cry_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ms_per_hour: 2000.0,
            max_work_ms: 1500.0,
            min_relax_ms: 100.0,
            min_cry_ms: 3000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct HostConfig {
    pub canvas_id: String,
    pub background_id: String,
    pub worker_sprites_id: String,
    pub supervisor_sprites_id: String,
    pub status_id: String,
    pub container_id: String,
    pub touch_controller_id: String,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// `KeyboardEvent.key` that starts and holds work, compared case-insensitively.
    pub trigger_key: String,
    pub log_level: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            canvas_id: "work-canvas".into(),
            background_id: "background".into(),
            worker_sprites_id: "worker-sprites".into(),
            supervisor_sprites_id: "supervisor-sprites".into(),
            status_id: "text-space".into(),
            container_id: "container".into(),
            touch_controller_id: "touch-controller".into(),
            canvas_width: 400,
            canvas_height: 400,
            trigger_key: "w".into(),
            log_level: "info".into(),
        }
    }
}

impl HostConfig {
    /// Parses a possibly partial JSON object; absent fields keep their defaults.
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, crate::error::GameError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Unknown level names fall back to `INFO`.
    pub fn max_level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::INFO)
    }

    pub fn is_trigger_key(&self, key: &str) -> bool {
        key.eq_ignore_ascii_case(&self.trigger_key)
    }
}
