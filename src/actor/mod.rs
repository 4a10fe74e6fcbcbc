//! Timed finite-state machine with a sprite-frame window per state.
//!
//! One [`Actor`] type drives both characters; what differs between them lives
//! in a [`StateTable`]: how long each state lasts, which frames it shows, and
//! where it goes when its time runs out.

use std::fmt;

use rand::RngCore;
use tracing::debug;

use crate::clock::clamp_delta;
use crate::error::ActorError;

pub mod supervisor;
pub mod worker;

pub use supervisor::{Supervisor, SupervisorState, SupervisorTable};
pub use worker::{Worker, WorkerState, WorkerTable};

/// Inclusive range of sprite-sheet cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameWindow {
    pub start: u32,
    pub end: u32,
}

impl FrameWindow {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn span(&self) -> u32 {
        self.end.saturating_sub(self.start) + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Forward,
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    pub window: FrameWindow,
    /// `None` stretches the window over the state's duration.
    pub frame_ms: Option<f64>,
    pub playback: Playback,
}

impl Animation {
    /// Loops `start..=end` at a fixed frame length.
    pub const fn looping(start: u32, end: u32, frame_ms: f64) -> Self {
        Self {
            window: FrameWindow::new(start, end),
            frame_ms: Some(frame_ms),
            playback: Playback::Forward,
        }
    }

    /// Plays `start..=end` once across the state's duration.
    pub const fn stretched(start: u32, end: u32) -> Self {
        Self {
            window: FrameWindow::new(start, end),
            frame_ms: None,
            playback: Playback::Forward,
        }
    }

    pub const fn reversed(mut self) -> Self {
        self.playback = Playback::Reverse;
        self
    }

    fn validate(&self, state: &'static str) -> Result<(), ActorError> {
        let FrameWindow { start, end } = self.window;
        if start > end {
            return Err(ActorError::InvertedFrameWindow { state, start, end });
        }
        if let Some(frame_ms) = self.frame_ms {
            if !(frame_ms.is_finite() && frame_ms > 0.0) {
                return Err(ActorError::NonPositiveFrameDuration { state, frame_ms });
            }
        }
        Ok(())
    }

    /// Frame shown `time_in_state` ms into a state lasting `duration`.
    pub fn frame_at(&self, time_in_state: f64, duration: Option<f64>) -> u32 {
        let span = self.window.span();
        let frame_ms = self
            .frame_ms
            .or_else(|| duration.map(|d| d / f64::from(span)));
        let ticks = match frame_ms {
            Some(ms) if ms.is_finite() && ms > 0.0 => (time_in_state / ms).floor() as u64,
            _ => 0,
        };
        let offset = (ticks % u64::from(span)) as u32;
        match self.playback {
            Playback::Forward => self.window.start + offset,
            Playback::Reverse => self.window.end - offset,
        }
    }
}

/// Per-character description of a timed state machine.
pub trait StateTable {
    type State: Copy + Eq + fmt::Debug + 'static;

    /// Every state, used to validate the table up front.
    const STATES: &'static [Self::State];
    /// Name used in logs.
    const NAME: &'static str;

    fn state_name(state: Self::State) -> &'static str;

    /// How long `state` lasts once entered, or `None` if it only ends on
    /// request. Called once per entry; may roll a random value.
    fn duration(&self, state: Self::State, rng: &mut dyn RngCore) -> Option<f64>;

    /// `None` means the state is not drawn.
    fn animation(&self, state: Self::State) -> Option<Animation>;

    /// Where `state` goes once its duration has been exceeded.
    fn next(&self, state: Self::State) -> Option<Self::State>;
}

pub struct Actor<T: StateTable> {
    table: T,
    state: T::State,
    time_in_state: f64,
    duration: Option<f64>,
    animation: Option<Animation>,
    frame: Option<u32>,
}

impl<T: StateTable> Actor<T> {
    /// Validates every frame window in `table`, then enters `initial`.
    pub fn new(table: T, initial: T::State, rng: &mut dyn RngCore) -> Result<Self, ActorError> {
        for &state in T::STATES {
            if let Some(animation) = table.animation(state) {
                animation.validate(T::state_name(state))?;
            }
        }
        let mut actor = Self {
            table,
            state: initial,
            time_in_state: 0.0,
            duration: None,
            animation: None,
            frame: None,
        };
        actor.enter(initial, rng);
        Ok(actor)
    }

    pub fn state(&self) -> T::State {
        self.state
    }

    pub fn time_in_state(&self) -> f64 {
        self.time_in_state
    }

    /// Duration rolled when the current state was entered.
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn animation(&self) -> Option<Animation> {
        self.animation
    }

    /// Sprite cell to draw, or `None` when the state is not drawn.
    pub fn frame(&self) -> Option<u32> {
        self.frame
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut T {
        &mut self.table
    }

    /// Unconditionally enters `state`, restarting its timer and re-deriving its
    /// duration and animation from the table.
    pub fn set_state(&mut self, state: T::State, rng: &mut dyn RngCore) {
        debug!(
            actor = T::NAME,
            from = T::state_name(self.state),
            to = T::state_name(state),
            "state change"
        );
        self.enter(state, rng);
    }

    /// Accumulates `delta` ms. Takes at most one automatic transition, once
    /// the time in state is strictly past its duration. Returns whether it did.
    pub fn advance(&mut self, delta: f64, rng: &mut dyn RngCore) -> bool {
        self.time_in_state += clamp_delta(delta);
        let mut transitioned = false;
        if let Some(duration) = self.duration {
            if self.time_in_state > duration {
                if let Some(next) = self.table.next(self.state) {
                    self.set_state(next, rng);
                    transitioned = true;
                }
            }
        }
        self.refresh_frame();
        transitioned
    }

    fn enter(&mut self, state: T::State, rng: &mut dyn RngCore) {
        self.state = state;
        self.time_in_state = 0.0;
        self.duration = self.table.duration(state, rng);
        self.animation = self.table.animation(state);
        self.refresh_frame();
    }

    fn refresh_frame(&mut self) {
        self.frame = self
            .animation
            .map(|a| a.frame_at(self.time_in_state, self.duration));
    }
}

impl<T: StateTable> fmt::Debug for Actor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(T::NAME)
            .field("state", &self.state)
            .field("time_in_state", &self.time_in_state)
            .field("duration", &self.duration)
            .field("frame", &self.frame)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Lamp {
        On,
        Off,
        Broken,
    }

    struct LampTable {
        broken_window: FrameWindow,
    }

    impl StateTable for LampTable {
        type State = Lamp;
        const STATES: &'static [Lamp] = &[Lamp::On, Lamp::Off, Lamp::Broken];
        const NAME: &'static str = "lamp";

        fn state_name(state: Lamp) -> &'static str {
            match state {
                Lamp::On => "on",
                Lamp::Off => "off",
                Lamp::Broken => "broken",
            }
        }

        fn duration(&self, state: Lamp, _rng: &mut dyn RngCore) -> Option<f64> {
            match state {
                Lamp::On => Some(300.0),
                Lamp::Off => Some(100.0),
                Lamp::Broken => None,
            }
        }

        fn animation(&self, state: Lamp) -> Option<Animation> {
            match state {
                Lamp::On => Some(Animation::stretched(0, 2)),
                Lamp::Off => Some(Animation::stretched(0, 2).reversed()),
                Lamp::Broken => Some(Animation {
                    window: self.broken_window,
                    frame_ms: Some(50.0),
                    playback: Playback::Forward,
                }),
            }
        }

        fn next(&self, state: Lamp) -> Option<Lamp> {
            match state {
                Lamp::On => Some(Lamp::Off),
                Lamp::Off => Some(Lamp::On),
                Lamp::Broken => None,
            }
        }
    }

    fn lamp() -> Actor<LampTable> {
        let table = LampTable {
            broken_window: FrameWindow::new(3, 3),
        };
        Actor::new(table, Lamp::On, &mut StepRng::new(0, 1)).unwrap()
    }

    fn listed_states<T: StateTable>() -> &'static [T::State] {
        T::STATES
    }

    #[test]
    fn state_list_outlives_any_table() {
        let states = listed_states::<LampTable>();
        assert_eq!(states, &[Lamp::On, Lamp::Off, Lamp::Broken]);
    }

    #[test]
    fn leaves_state_only_after_strictly_exceeding_duration() {
        let mut rng = StepRng::new(0, 1);
        let mut actor = lamp();
        assert!(!actor.advance(300.0, &mut rng));
        assert_eq!(actor.state(), Lamp::On);
        assert!(actor.advance(0.5, &mut rng));
        assert_eq!(actor.state(), Lamp::Off);
        assert_eq!(actor.time_in_state(), 0.0);
    }

    #[test]
    fn one_transition_per_advance_even_for_huge_deltas() {
        let mut rng = StepRng::new(0, 1);
        let mut actor = lamp();
        assert!(actor.advance(10_000.0, &mut rng));
        assert_eq!(actor.state(), Lamp::Off);
        assert!(actor.advance(10_000.0, &mut rng));
        assert_eq!(actor.state(), Lamp::On);
    }

    #[test]
    fn negative_delta_is_ignored() {
        let mut rng = StepRng::new(0, 1);
        let mut actor = lamp();
        actor.advance(120.0, &mut rng);
        actor.advance(-500.0, &mut rng);
        actor.advance(f64::NAN, &mut rng);
        assert_eq!(actor.time_in_state(), 120.0);
    }

    #[test]
    fn stretched_frames_cover_duration() {
        let mut rng = StepRng::new(0, 1);
        let mut actor = lamp();
        assert_eq!(actor.frame(), Some(0));
        actor.advance(99.0, &mut rng);
        assert_eq!(actor.frame(), Some(0));
        actor.advance(2.0, &mut rng);
        assert_eq!(actor.frame(), Some(1));
        actor.advance(100.0, &mut rng);
        assert_eq!(actor.frame(), Some(2));
    }

    #[test]
    fn reverse_playback_counts_down_from_end() {
        let anim = Animation::stretched(0, 2).reversed();
        assert_eq!(anim.frame_at(0.0, Some(300.0)), 2);
        assert_eq!(anim.frame_at(100.0, Some(300.0)), 1);
        assert_eq!(anim.frame_at(250.0, Some(300.0)), 0);
    }

    #[test]
    fn single_cell_window_is_legal() {
        let mut rng = StepRng::new(0, 1);
        let mut actor = lamp();
        actor.set_state(Lamp::Broken, &mut rng);
        actor.advance(1_234.0, &mut rng);
        assert_eq!(actor.frame(), Some(3));
        assert_eq!(actor.state(), Lamp::Broken);
    }

    #[test]
    fn stretched_without_duration_holds_first_frame() {
        let anim = Animation::stretched(4, 6);
        assert_eq!(anim.frame_at(5_000.0, None), 4);
    }

    #[test]
    fn inverted_window_is_rejected() {
        let table = LampTable {
            broken_window: FrameWindow::new(5, 2),
        };
        let err = Actor::new(table, Lamp::On, &mut StepRng::new(0, 1)).unwrap_err();
        assert_eq!(
            err,
            ActorError::InvertedFrameWindow {
                state: "broken",
                start: 5,
                end: 2
            }
        );
    }

    #[test]
    fn zero_frame_length_is_rejected() {
        let anim = Animation::looping(0, 1, 0.0);
        assert!(matches!(
            anim.validate("x"),
            Err(ActorError::NonPositiveFrameDuration { .. })
        ));
    }
}
