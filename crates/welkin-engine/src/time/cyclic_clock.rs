use std::time::Instant;

/// Length of one full cycle (one simulated day) in calendar seconds.
///
/// This constant fixes the meaning of the normalized value: it is always the
/// fraction of a calendar day. `seconds_per_cycle` governs how fast the
/// animation runs, not what the normalized value means.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Run state of a [`CyclicClock`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RunState {
    Running,
    Paused,
}

/// Wall-clock-driven source of "time of day".
///
/// The clock exposes the same instant in two views that always agree:
/// - `normalized()`: fractional position within the day cycle, in [0,1)
/// - `absolute_seconds()`: calendar time in whole seconds
///
/// Only absolute seconds are stored; the normalized value is derived on
/// read, so the two views cannot drift apart.
///
/// `seconds_per_cycle` is the wall-time length of one simulated day. A value
/// of `0.0` freezes the clock (no progression, no drift). Pausing freezes the
/// displayed value; `start()` resumes without a jump; `reset()` restores the
/// last explicitly set time.
#[derive(Debug, Clone)]
pub struct CyclicClock {
    seconds_per_cycle: f64,

    /// Absolute seconds at the last rebase point.
    base_seconds: f64,
    /// Absolute seconds of the last explicit set; restored by `reset()`.
    set_point_seconds: f64,
    /// Monotonic tick captured at the last rebase point.
    reference: Instant,

    current_seconds: f64,
    state: RunState,
}

impl CyclicClock {
    /// Creates a running clock from calendar seconds.
    pub fn from_absolute(seconds: u64, seconds_per_cycle: f64) -> Self {
        Self::at(seconds as f64, seconds_per_cycle, Instant::now())
    }

    /// Creates a running clock from a normalized time of day.
    ///
    /// `time` wraps via its fractional part, so any real value is accepted.
    pub fn from_normalized(time: f64, seconds_per_cycle: f64) -> Self {
        Self::at(frac(time) * SECONDS_PER_DAY, seconds_per_cycle, Instant::now())
    }

    fn at(seconds: f64, seconds_per_cycle: f64, now: Instant) -> Self {
        Self {
            seconds_per_cycle: seconds_per_cycle.max(0.0),
            base_seconds: seconds,
            set_point_seconds: seconds,
            reference: now,
            current_seconds: seconds,
            state: RunState::Running,
        }
    }

    /// Recomputes the current time from elapsed wall time.
    ///
    /// Call once per frame. While paused the displayed value stays frozen;
    /// repeated calls without intervening wall time produce the same result.
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    fn update_at(&mut self, now: Instant) {
        if self.state != RunState::Running {
            return;
        }
        self.current_seconds = self.base_seconds + self.elapsed_cycle_seconds(now);
    }

    /// Calendar seconds accumulated since the last rebase, scaled by the
    /// cycle rate. Zero while the cycle length is zero (frozen clock).
    fn elapsed_cycle_seconds(&self, now: Instant) -> f64 {
        if self.seconds_per_cycle == 0.0 {
            return 0.0;
        }
        let elapsed = now.saturating_duration_since(self.reference).as_secs_f64();
        elapsed * (SECONDS_PER_DAY / self.seconds_per_cycle)
    }

    /// Normalized time of day, in [0,1).
    #[inline]
    pub fn normalized(&self) -> f64 {
        frac(self.current_seconds / SECONDS_PER_DAY)
    }

    /// Calendar time, in whole seconds.
    #[inline]
    pub fn absolute_seconds(&self) -> u64 {
        self.current_seconds as u64
    }

    /// Rebases the clock from calendar seconds.
    ///
    /// The value reads back exactly until wall time elapses.
    pub fn set_absolute_seconds(&mut self, seconds: u64) {
        self.rebase(seconds as f64, Instant::now());
    }

    /// Rebases the time of day, preserving the whole-day component of the
    /// current absolute time. `time` wraps via its fractional part.
    pub fn set_normalized(&mut self, time: f64) {
        self.set_normalized_at(time, Instant::now());
    }

    fn set_normalized_at(&mut self, time: f64, now: Instant) {
        let day = (self.current_seconds / SECONDS_PER_DAY).floor() * SECONDS_PER_DAY;
        self.rebase(day + frac(time) * SECONDS_PER_DAY, now);
    }

    fn rebase(&mut self, seconds: f64, now: Instant) {
        self.base_seconds = seconds;
        self.set_point_seconds = seconds;
        self.current_seconds = seconds;
        self.reference = now;
    }

    /// Changes the animation rate without moving the displayed time.
    ///
    /// Negative values clamp to `0.0` (frozen).
    pub fn set_seconds_per_cycle(&mut self, seconds: f64) {
        self.set_seconds_per_cycle_at(seconds, Instant::now());
    }

    fn set_seconds_per_cycle_at(&mut self, seconds: f64, now: Instant) {
        // Fold elapsed time into the base first so the rate change is not
        // observable as a discontinuity.
        self.update_at(now);
        self.base_seconds = self.current_seconds;
        self.reference = now;
        self.seconds_per_cycle = seconds.max(0.0);
    }

    #[inline]
    pub fn seconds_per_cycle(&self) -> f64 {
        self.seconds_per_cycle
    }

    #[inline]
    pub fn run_state(&self) -> RunState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Resumes from the currently displayed value with no jump.
    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    fn start_at(&mut self, now: Instant) {
        if self.state == RunState::Running {
            return;
        }
        self.base_seconds = self.current_seconds;
        self.reference = now;
        self.state = RunState::Running;
    }

    /// Freezes the displayed value until `start()`.
    pub fn pause(&mut self) {
        self.pause_at(Instant::now());
    }

    fn pause_at(&mut self, now: Instant) {
        self.update_at(now);
        self.base_seconds = self.current_seconds;
        self.reference = now;
        self.state = RunState::Paused;
    }

    /// Restores the last explicitly set time, preserving the run state.
    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    fn reset_at(&mut self, now: Instant) {
        self.base_seconds = self.set_point_seconds;
        self.current_seconds = self.set_point_seconds;
        self.reference = now;
    }

    /// Pauses, then restores the last explicitly set time.
    pub fn stop(&mut self) {
        let now = Instant::now();
        self.pause_at(now);
        self.reset_at(now);
    }
}

/// Fractional part wrapped into [0,1); negative inputs wrap upward.
#[inline]
fn frac(x: f64) -> f64 {
    x.rem_euclid(1.0)
}
