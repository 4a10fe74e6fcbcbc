//! Difficulty curve keyed on whole in-game hours of active play.
//!
//! Each parameter is `clamp(base ± rate * hour, limit)`. Values are recomputed
//! from the bucket rather than nudged tick by tick, so a bucket always maps to
//! the same parameters.

use rand::distributions::Standard;
use rand::{Rng, RngCore};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const RISE_BASE_MS: f64 = 3000.0;
const RISE_STEP_MS: f64 = 50.0;
/// Rise and lower animations are spread over seven frames' worth of time.
const RISE_DIVISOR: f64 = 7.0;
const RISE_FLOOR_MS: f64 = 1000.0 / RISE_DIVISOR;

const PEEP_MIN_BASE_MS: f64 = 800.0;
const PEEP_MIN_CEIL_MS: f64 = 1000.0;
const PEEP_MAX_BASE_MS: f64 = 1000.0;
const PEEP_MAX_CEIL_MS: f64 = 1200.0;
const PEEP_STEP_MS: f64 = 10.0;

const ABSENT_MIN_BASE_MS: f64 = 500.0;
const ABSENT_MIN_FLOOR_MS: f64 = 200.0;
const ABSENT_MIN_STEP_MS: f64 = 10.0;
const ABSENT_MAX_BASE_MS: f64 = 1200.0;
const ABSENT_MAX_FLOOR_MS: f64 = 1000.0;
const ABSENT_MAX_STEP_MS: f64 = 20.0;

/// Inclusive bounds, in milliseconds, for a duration rolled on state entry.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DurationRange {
    pub min_ms: f64,
    pub max_ms: f64,
}

impl DurationRange {
    pub const fn new(min_ms: f64, max_ms: f64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Uniform whole-millisecond draw from `[min_ms, max_ms]`, scaled from one
    /// unit float so a fixed generator maps to a fixed end of the range. A range
    /// whose bounds cross collapses onto its lower bound.
    pub fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        let lo = self.min_ms.max(0.0).ceil();
        let width = (self.max_ms.max(0.0).floor() - lo).max(0.0);
        let unit: f64 = rng.sample(Standard);
        lo + (unit * (width + 1.0)).floor().min(width)
    }

    pub fn contains(&self, ms: f64) -> bool {
        ms >= self.min_ms && ms <= self.max_ms
    }
}

/// Supervisor timings for one hour bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DifficultyParameters {
    /// Length of both the rise and the lower animation.
    pub rise_ms: f64,
    pub peep: DurationRange,
    pub absent: DurationRange,
}

impl DifficultyParameters {
    pub fn for_hour(hour: u32) -> Self {
        let h = f64::from(hour);
        Self {
            rise_ms: ((RISE_BASE_MS - RISE_STEP_MS * h) / RISE_DIVISOR).max(RISE_FLOOR_MS),
            peep: DurationRange::new(
                (PEEP_MIN_BASE_MS + PEEP_STEP_MS * h).min(PEEP_MIN_CEIL_MS),
                (PEEP_MAX_BASE_MS + PEEP_STEP_MS * h).min(PEEP_MAX_CEIL_MS),
            ),
            absent: DurationRange::new(
                (ABSENT_MIN_BASE_MS - ABSENT_MIN_STEP_MS * h).max(ABSENT_MIN_FLOOR_MS),
                (ABSENT_MAX_BASE_MS - ABSENT_MAX_STEP_MS * h).max(ABSENT_MAX_FLOOR_MS),
            ),
        }
    }
}

impl Default for DifficultyParameters {
    fn default() -> Self {
        Self::for_hour(0)
    }
}

/// `floor(active_ms / ms_per_hour)`, saturating; 0 for a non-positive hour length.
pub fn hour_bucket(active_ms: f64, ms_per_hour: f64) -> u32 {
    if ms_per_hour <= 0.0 || !active_ms.is_finite() {
        return 0;
    }
    (active_ms.max(0.0) / ms_per_hour).floor() as u32
}

pub fn compute_difficulty(active_ms: f64, ms_per_hour: f64) -> DifficultyParameters {
    DifficultyParameters::for_hour(hour_bucket(active_ms, ms_per_hour))
}
