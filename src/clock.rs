//! Frame clock and the per-frame loop driver.
//!
//! Nothing here schedules anything: the host asks [`GameLoop::request_frame`]
//! whether it may arm `requestAnimationFrame`, then calls [`GameLoop::frame`]
//! from the callback with the current timestamp.

use rand::RngCore;
use tracing::debug;

use crate::session::{Session, TickOutcome};

/// Monotonic millisecond time source.
pub trait TimeSource {
    fn now(&self) -> f64;
}

/// Turns successive timestamps into frame deltas.
#[derive(Debug, Default, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta since the previous call. The first call (and the first call after
    /// [`reset`](Self::reset)) yields 0. Backwards or non-finite readings clamp
    /// to 0 so an actor's `time_in_state` never shrinks.
    pub fn delta(&mut self, now: f64) -> f64 {
        let delta = match self.last_ms {
            Some(last) => now - last,
            None => 0.0,
        };
        if now.is_finite() {
            self.last_ms = Some(now);
        }
        clamp_delta(delta)
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

pub(crate) fn clamp_delta(delta: f64) -> f64 {
    if delta.is_finite() && delta > 0.0 { delta } else { 0.0 }
}

/// Owns the session, the frame clock, the random source and the
/// "update pending" guard against arming two frame callbacks at once.
///
/// Two independent reasons can pause the loop: page code holding it
/// ([`set_paused`](Self::set_paused)) and the page being hidden
/// ([`set_hidden`](Self::set_hidden)). It runs only when neither applies.
pub struct GameLoop {
    session: Session,
    clock: FrameClock,
    rng: Box<dyn RngCore>,
    update_pending: bool,
    held: bool,
    hidden: bool,
}

impl GameLoop {
    pub fn new(session: Session, rng: Box<dyn RngCore>) -> Self {
        Self {
            session,
            clock: FrameClock::new(),
            rng,
            update_pending: false,
            held: false,
            hidden: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_paused(&self) -> bool {
        self.session.is_paused()
    }

    pub fn is_update_pending(&self) -> bool {
        self.update_pending
    }

    /// Marks a frame as scheduled. Returns `false` when one already is (or the
    /// loop is paused); the host must only arm a callback on `true`.
    pub fn request_frame(&mut self) -> bool {
        if self.update_pending || self.is_paused() {
            return false;
        }
        self.update_pending = true;
        true
    }

    /// Drops a request whose callback could not be armed, so the next
    /// [`request_frame`](Self::request_frame) can try again.
    pub fn cancel_request(&mut self) {
        self.update_pending = false;
    }

    /// Runs one frame. Returns `Some(outcome)` when the session was ticked and
    /// `None` while paused. After this, call [`request_frame`](Self::request_frame)
    /// to re-arm.
    pub fn frame(&mut self, now: f64) -> Option<TickOutcome> {
        self.update_pending = false;
        let delta = self.clock.delta(now);
        if self.is_paused() {
            return None;
        }
        Some(self.session.tick(delta, self.rng.as_mut()))
    }

    /// [`frame`](Self::frame) reading the timestamp from `source`.
    pub fn frame_at(&mut self, source: &impl TimeSource) -> Option<TickOutcome> {
        self.frame(source.now())
    }

    /// Pause requested by page code. Stays in force across visibility changes.
    pub fn set_paused(&mut self, paused: bool) {
        self.held = paused;
        self.sync_pause();
    }

    /// Pause while the page is hidden.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
        self.sync_pause();
    }

    /// Pausing stops re-arming. Resuming forgets the last timestamp so the
    /// time spent paused is not fed to the actors as one huge delta.
    fn sync_pause(&mut self) {
        let paused = self.held || self.hidden;
        if self.is_paused() == paused {
            return;
        }
        debug!(paused, held = self.held, hidden = self.hidden, "loop pause toggled");
        self.session.set_paused(paused);
        if !paused {
            self.clock.reset();
        }
    }

    pub fn press(&mut self) {
        self.session.on_press(self.rng.as_mut());
    }

    pub fn release(&mut self) {
        self.session.on_release(self.rng.as_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn game_loop() -> GameLoop {
        let mut rng = SmallRng::seed_from_u64(7);
        let session = Session::new(Tuning::default(), &mut rng).unwrap();
        GameLoop::new(session, Box::new(rng))
    }

    struct ManualTime(std::cell::Cell<f64>);

    impl TimeSource for ManualTime {
        fn now(&self) -> f64 {
            self.0.get()
        }
    }

    #[test]
    fn frame_at_reads_the_time_source() {
        let mut lp = game_loop();
        let time = ManualTime(std::cell::Cell::new(1_000.0));
        lp.frame_at(&time);
        time.0.set(1_040.0);
        lp.frame_at(&time);
        assert_eq!(lp.session().worker().time_in_state(), 40.0);
    }

    #[test]
    fn first_delta_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.delta(1234.0), 0.0);
        assert_eq!(clock.delta(1250.0), 16.0);
    }

    #[test]
    fn backwards_time_clamps_to_zero() {
        let mut clock = FrameClock::new();
        clock.delta(100.0);
        assert_eq!(clock.delta(90.0), 0.0);
        assert_eq!(clock.delta(95.0), 5.0);
        assert_eq!(clock.delta(f64::NAN), 0.0);
        assert_eq!(clock.delta(100.0), 5.0);
    }

    #[test]
    fn request_frame_guards_double_arming() {
        let mut lp = game_loop();
        assert!(lp.request_frame());
        assert!(!lp.request_frame());
        lp.frame(0.0);
        assert!(!lp.is_update_pending());
        assert!(lp.request_frame());
    }

    #[test]
    fn cancelled_request_can_be_rearmed() {
        let mut lp = game_loop();
        assert!(lp.request_frame());
        lp.cancel_request();
        assert!(!lp.is_update_pending());
        assert!(lp.request_frame());
    }

    #[test]
    fn page_pause_outlasts_visibility() {
        let mut lp = game_loop();
        lp.set_paused(true);
        lp.set_hidden(true);
        lp.set_hidden(false);
        assert!(lp.is_paused());
        assert!(!lp.request_frame());
        lp.set_paused(false);
        assert!(!lp.is_paused());
        assert!(lp.request_frame());
    }

    #[test]
    fn hidden_page_stays_paused_after_page_resume() {
        let mut lp = game_loop();
        lp.set_hidden(true);
        lp.set_paused(false);
        assert!(lp.is_paused());
        lp.set_hidden(false);
        assert!(!lp.is_paused());
    }

    #[test]
    fn paused_loop_does_not_tick_or_rearm() {
        let mut lp = game_loop();
        lp.frame(0.0);
        lp.set_paused(true);
        assert!(lp.frame(500.0).is_none());
        assert!(!lp.request_frame());
        let before = lp.session().worker().time_in_state();
        lp.set_paused(false);
        // first frame after resuming is a zero delta
        lp.frame(10_000.0);
        assert_eq!(lp.session().worker().time_in_state(), before);
        lp.frame(10_016.0);
        assert_eq!(lp.session().worker().time_in_state(), before + 16.0);
    }
}
