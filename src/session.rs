//! Session controller: owns both actors, runs the per-tick order of
//! operations, applies the loss rule and handles press / release.

use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::actor::{
    Actor, Supervisor, SupervisorState, SupervisorTable, Worker, WorkerState, WorkerTable,
};
use crate::clock::clamp_delta;
use crate::config::Tuning;
use crate::difficulty::{DifficultyParameters, compute_difficulty, hour_bucket};
use crate::error::ActorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Phase {
    /// Before the first shift; happens once.
    Intro,
    Playing,
    /// After being caught, until the next shift starts.
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// The supervisor peeked while the worker was relaxing this tick.
    Caught,
}

/// Point-in-time view for debugging hosts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Snapshot {
    pub phase: Phase,
    pub paused: bool,
    pub active_ms: f64,
    pub hours: u32,
    pub worker: WorkerState,
    pub worker_frame: Option<u32>,
    pub supervisor: SupervisorState,
    pub supervisor_frame: Option<u32>,
    pub status: String,
}

#[derive(Debug)]
pub struct Session {
    tuning: Tuning,
    phase: Phase,
    active_ms: f64,
    paused: bool,
    hour: u32,
    worker: Worker,
    supervisor: Supervisor,
}

impl Session {
    pub fn new(tuning: Tuning, rng: &mut dyn RngCore) -> Result<Self, ActorError> {
        let worker = Actor::new(WorkerTable::from(&tuning), WorkerState::Relax, rng)?;
        let supervisor = Actor::new(
            SupervisorTable::new(DifficultyParameters::for_hour(0)),
            SupervisorState::Absent,
            rng,
        )?;
        Ok(Self {
            tuning,
            phase: Phase::Intro,
            active_ms: 0.0,
            paused: false,
            hour: 0,
            worker,
            supervisor,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn active_ms(&self) -> f64 {
        self.active_ms
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn worker(&self) -> &Worker {
        &self.worker
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    /// Whole in-game hours survived in the current (or last) shift.
    pub fn hours_survived(&self) -> u32 {
        hour_bucket(self.active_ms, self.tuning.ms_per_hour)
    }

    pub fn tick(&mut self, delta: f64, rng: &mut dyn RngCore) -> TickOutcome {
        let delta = clamp_delta(delta);
        if self.phase == Phase::Playing {
            self.active_ms += delta;
        }
        self.worker.advance(delta, rng);
        if self.phase != Phase::Intro {
            self.supervisor.advance(delta, rng);
        }

        if self.worker.state() == WorkerState::Relax
            && self.supervisor.state() == SupervisorState::Peep
        {
            info!(hours = self.hours_survived(), "caught relaxing");
            self.phase = Phase::Summary;
            self.worker.set_state(WorkerState::Cry, rng);
            self.supervisor.set_state(SupervisorState::Mad, rng);
            return TickOutcome::Caught;
        }

        let hour = self.hours_survived();
        if hour != self.hour {
            debug!(hour, "difficulty bucket changed");
            self.hour = hour;
        }
        self.supervisor
            .table_mut()
            .set_difficulty(compute_difficulty(self.active_ms, self.tuning.ms_per_hour));
        TickOutcome::Continue
    }

    /// Press of the work input. Starts a new shift from intro or summary when
    /// the worker is ready, then puts the worker to work.
    pub fn on_press(&mut self, rng: &mut dyn RngCore) {
        if !self.worker.is_ready_for_action() {
            return;
        }
        if matches!(self.phase, Phase::Intro | Phase::Summary) {
            info!(from = ?self.phase, "shift started");
            self.phase = Phase::Playing;
            self.active_ms = 0.0;
            self.hour = 0;
            self.supervisor
                .table_mut()
                .set_difficulty(DifficultyParameters::for_hour(0));
            self.supervisor.set_state(SupervisorState::Absent, rng);
        }
        self.worker.set_state(WorkerState::Work, rng);
    }

    pub fn on_release(&mut self, rng: &mut dyn RngCore) {
        if self.worker.state() == WorkerState::Work {
            self.worker.set_state(WorkerState::Relax, rng);
        }
    }

    /// Seconds until a crying worker may start again, rounded half away from
    /// zero. `None` outside the summary countdown.
    pub fn retry_countdown_secs(&self) -> Option<u64> {
        let remaining = self.tuning.min_cry_ms - self.worker.time_in_state();
        if self.phase == Phase::Summary && remaining > 0.0 {
            Some((remaining / 1000.0).round() as u64)
        } else {
            None
        }
    }

    pub fn status_text(&self) -> String {
        if self.phase == Phase::Intro {
            return "Start Working?".to_string();
        }
        let hours = self.hours_survived();
        match self.retry_countdown_secs() {
            Some(secs) => format!("You survived work for {hours} hours... Try again in {secs}s."),
            None => format!("You survived work for {hours} hours..."),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            paused: self.paused,
            active_ms: self.active_ms,
            hours: self.hours_survived(),
            worker: self.worker.state(),
            worker_frame: self.worker.frame(),
            supervisor: self.supervisor.state(),
            supervisor_frame: self.supervisor.frame(),
            status: self.status_text(),
        }
    }
}
