//! The player's character.

use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Actor, Animation, StateTable};
use crate::config::Tuning;

const RELAX_FRAME_MS: f64 = 1000.0 / 7.0;
const WORK_FRAME_MS: f64 = 1000.0 / 21.0;
const CRY_FRAME_MS: f64 = 1000.0 / 7.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WorkerState {
    Relax,
    Work,
    Cry,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkerTable {
    pub max_work_ms: f64,
    pub min_relax_ms: f64,
    pub min_cry_ms: f64,
}

impl From<&Tuning> for WorkerTable {
    fn from(tuning: &Tuning) -> Self {
        Self {
            max_work_ms: tuning.max_work_ms,
            min_relax_ms: tuning.min_relax_ms,
            min_cry_ms: tuning.min_cry_ms,
        }
    }
}

impl StateTable for WorkerTable {
    type State = WorkerState;
    const STATES: &'static [WorkerState] =
        &[WorkerState::Relax, WorkerState::Work, WorkerState::Cry];
    const NAME: &'static str = "worker";

    fn state_name(state: WorkerState) -> &'static str {
        match state {
            WorkerState::Relax => "relax",
            WorkerState::Work => "work",
            WorkerState::Cry => "cry",
        }
    }

    fn duration(&self, state: WorkerState, _rng: &mut dyn RngCore) -> Option<f64> {
        match state {
            WorkerState::Work => Some(self.max_work_ms),
            WorkerState::Relax | WorkerState::Cry => None,
        }
    }

    fn animation(&self, state: WorkerState) -> Option<Animation> {
        Some(match state {
            WorkerState::Relax => Animation::looping(0, 4, RELAX_FRAME_MS),
            WorkerState::Work => Animation::looping(5, 8, WORK_FRAME_MS),
            WorkerState::Cry => Animation::looping(9, 11, CRY_FRAME_MS),
        })
    }

    fn next(&self, state: WorkerState) -> Option<WorkerState> {
        match state {
            WorkerState::Work => Some(WorkerState::Relax),
            WorkerState::Relax | WorkerState::Cry => None,
        }
    }
}

pub type Worker = Actor<WorkerTable>;

impl Actor<WorkerTable> {
    /// Whether a press may put the worker (back) to work: only after resting or
    /// crying for strictly longer than the matching guard.
    pub fn is_ready_for_action(&self) -> bool {
        let table = self.table();
        match self.state() {
            WorkerState::Relax => self.time_in_state() > table.min_relax_ms,
            WorkerState::Cry => self.time_in_state() > table.min_cry_ms,
            WorkerState::Work => false,
        }
    }
}
