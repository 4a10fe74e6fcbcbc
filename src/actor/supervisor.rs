//! The character who peeks in on the worker. Cycles rise → peep → lower →
//! absent until the session makes it mad.

use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Actor, Animation, StateTable};
use crate::difficulty::DifficultyParameters;

const PEEP_FRAME_MS: f64 = 1000.0 / 7.0;
const MAD_FRAME_MS: f64 = 1000.0 / 21.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SupervisorState {
    Rise,
    Peep,
    Lower,
    Absent,
    Mad,
}

/// Holds the latest difficulty. Only read on state entry, so a new bucket
/// never cuts short a countdown already running.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SupervisorTable {
    difficulty: DifficultyParameters,
}

impl SupervisorTable {
    pub fn new(difficulty: DifficultyParameters) -> Self {
        Self { difficulty }
    }

    pub fn difficulty(&self) -> &DifficultyParameters {
        &self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: DifficultyParameters) {
        self.difficulty = difficulty;
    }
}

impl StateTable for SupervisorTable {
    type State = SupervisorState;
    const STATES: &'static [SupervisorState] = &[
        SupervisorState::Rise,
        SupervisorState::Peep,
        SupervisorState::Lower,
        SupervisorState::Absent,
        SupervisorState::Mad,
    ];
    const NAME: &'static str = "supervisor";

    fn state_name(state: SupervisorState) -> &'static str {
        match state {
            SupervisorState::Rise => "rise",
            SupervisorState::Peep => "peep",
            SupervisorState::Lower => "lower",
            SupervisorState::Absent => "absent",
            SupervisorState::Mad => "mad",
        }
    }

    fn duration(&self, state: SupervisorState, rng: &mut dyn RngCore) -> Option<f64> {
        match state {
            SupervisorState::Rise | SupervisorState::Lower => Some(self.difficulty.rise_ms),
            SupervisorState::Peep => Some(self.difficulty.peep.sample(rng)),
            SupervisorState::Absent => Some(self.difficulty.absent.sample(rng)),
            SupervisorState::Mad => None,
        }
    }

    fn animation(&self, state: SupervisorState) -> Option<Animation> {
        match state {
            SupervisorState::Rise => Some(Animation::stretched(0, 2)),
            SupervisorState::Peep => Some(Animation::looping(3, 4, PEEP_FRAME_MS)),
            SupervisorState::Lower => Some(Animation::stretched(0, 2).reversed()),
            SupervisorState::Absent => None,
            SupervisorState::Mad => Some(Animation::looping(5, 7, MAD_FRAME_MS)),
        }
    }

    fn next(&self, state: SupervisorState) -> Option<SupervisorState> {
        match state {
            SupervisorState::Rise => Some(SupervisorState::Peep),
            SupervisorState::Peep => Some(SupervisorState::Lower),
            SupervisorState::Lower => Some(SupervisorState::Absent),
            SupervisorState::Absent => Some(SupervisorState::Rise),
            SupervisorState::Mad => None,
        }
    }
}

pub type Supervisor = Actor<SupervisorTable>;
