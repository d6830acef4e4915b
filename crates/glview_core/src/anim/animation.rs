//! # Animation
//!
//! A value-in-time calculator driven by frame timestamps.
//!
//! ```text
//!   start()          calculate(t0)            calculate(t >= start + d)
//! Idle ──────► Pending ──────────► Running{t0} ────────────────────► Finished
//!   ▲                                 │  runs < repeat: start += elapsed
//!   └──────────── cancel() ◄──────────┘
//! ```
//!
//! The first `calculate` after `start` latches the start time, so the
//! animation begins on the first frame that actually renders it.

use super::Interpolator;

/// Outcome of one value step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Keep animating.
    Continue,
    /// Stop immediately. The finish hook is not invoked.
    Cancel,
}

/// The value side of an [`Animation`].
pub trait Calculate {
    /// Receives eased progress, usually in `[0, 1]`.
    fn on_calculate(&mut self, progress: f32) -> Step;

    /// Invoked exactly once when the last repeat completes.
    fn on_finish(&mut self) {}
}

/// Run state of an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// Never started, or cancelled.
    #[default]
    Idle,
    /// Armed. The next `calculate` latches the start time.
    Pending,
    /// Running since `start` (milliseconds).
    Running {
        /// Start of the current run.
        start: u64,
    },
    /// Completed all runs.
    Finished,
}

/// How many times an animation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatCount {
    /// Finishes once the run counter reaches the value. `0` and `1` both mean one run.
    Finite(u32),
    /// Never finishes on its own.
    Infinite,
}

impl Default for RepeatCount {
    fn default() -> Self {
        Self::Finite(0)
    }
}

/// What a repeated run does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatMode {
    /// Every run goes from 0 to 1.
    #[default]
    Restart,
    /// Odd runs go from 1 to 0.
    Reverse,
}

/// A time-based animation owning its value calculator.
#[derive(Debug, Clone)]
pub struct Animation<C> {
    calculator: C,
    duration_ms: u64,
    interpolator: Option<Interpolator>,
    repeat_count: RepeatCount,
    repeat_mode: RepeatMode,
    state: RunState,
    runs: u32,
    last_frame_time: u64,
}

impl<C: Calculate> Animation<C> {
    /// Creates an idle animation.
    #[must_use]
    pub fn new(calculator: C, duration_ms: u64) -> Self {
        Self {
            calculator,
            duration_ms,
            interpolator: None,
            repeat_count: RepeatCount::default(),
            repeat_mode: RepeatMode::default(),
            state: RunState::Idle,
            runs: 0,
            last_frame_time: 0,
        }
    }

    /// Sets the easing curve.
    #[must_use]
    pub fn with_interpolator(mut self, interpolator: Interpolator) -> Self {
        self.interpolator = Some(interpolator);
        self
    }

    /// Sets repeat count and mode.
    #[must_use]
    pub fn with_repeat(mut self, count: RepeatCount, mode: RepeatMode) -> Self {
        self.repeat_count = count;
        self.repeat_mode = mode;
        self
    }

    /// Sets the duration in milliseconds.
    pub fn set_duration(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    /// Sets or clears the easing curve.
    pub fn set_interpolator(&mut self, interpolator: Option<Interpolator>) {
        self.interpolator = interpolator;
    }

    /// Sets the repeat count.
    pub fn set_repeat_count(&mut self, count: RepeatCount) {
        self.repeat_count = count;
    }

    /// Sets the repeat mode.
    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat_mode = mode;
    }

    /// Arms the animation. No-op while already armed or running.
    pub fn start(&mut self) {
        if matches!(self.state, RunState::Idle | RunState::Finished) {
            self.state = RunState::Pending;
            self.runs = 0;
            self.last_frame_time = 0;
        }
    }

    /// Arms the animation with a fixed start time.
    pub fn start_at(&mut self, time_ms: u64) {
        self.start();
        self.set_start_time(time_ms);
    }

    /// Overrides the start time of the current run.
    pub fn set_start_time(&mut self, time_ms: u64) {
        self.state = RunState::Running { start: time_ms };
    }

    /// Stops the animation without invoking the finish hook.
    pub fn cancel(&mut self) {
        self.state = RunState::Idle;
    }

    /// Re-arms the animation with counters cleared.
    pub fn reset(&mut self) {
        self.state = RunState::Pending;
        self.runs = 0;
        self.last_frame_time = 0;
    }

    /// Advances the animation to `now_ms` and returns whether it is still active.
    ///
    /// `now_ms` must not decrease between calls.
    pub fn calculate(&mut self, now_ms: u64) -> bool {
        let start = match self.state {
            RunState::Idle | RunState::Finished => return false,
            RunState::Pending => {
                self.state = RunState::Running { start: now_ms };
                now_ms
            }
            RunState::Running { start } => start,
        };
        self.last_frame_time = now_ms;

        let elapsed = now_ms as i64 - start as i64;
        let duration = self.duration_ms as i64;
        let mut x = if duration == 0 {
            1.0
        } else {
            (elapsed as f32 / duration as f32).clamp(0.0, 1.0)
        };
        if self.repeat_mode == RepeatMode::Reverse && self.runs % 2 == 1 {
            x = 1.0 - x;
        }
        let progress = self.interpolator.map_or(x, |curve| curve.apply(x));

        if self.calculator.on_calculate(progress) == Step::Cancel {
            self.state = RunState::Idle;
            return false;
        }

        if elapsed >= duration {
            self.runs += 1;
            let done = match self.repeat_count {
                RepeatCount::Finite(count) => self.runs >= count,
                RepeatCount::Infinite => false,
            };
            if done {
                self.state = RunState::Finished;
                self.calculator.on_finish();
            } else {
                self.state = RunState::Running {
                    start: start + elapsed.max(0) as u64,
                };
            }
        }

        self.is_running()
    }

    /// Returns true while armed or running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.state, RunState::Pending | RunState::Running { .. })
    }

    /// Returns the run state.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Returns how many runs have completed.
    #[must_use]
    pub fn run_count(&self) -> u32 {
        self.runs
    }

    /// Returns the duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Returns the timestamp passed to the last `calculate`.
    #[must_use]
    pub fn last_frame_time(&self) -> u64 {
        self.last_frame_time
    }

    /// Returns the value calculator.
    #[must_use]
    pub fn calculator(&self) -> &C {
        &self.calculator
    }

    /// Returns the value calculator mutably.
    pub fn calculator_mut(&mut self) -> &mut C {
        &mut self.calculator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        values: Vec<f32>,
        finished: u32,
        cancel_at: Option<usize>,
    }

    impl Calculate for Recorder {
        fn on_calculate(&mut self, progress: f32) -> Step {
            self.values.push(progress);
            if self.cancel_at == Some(self.values.len()) {
                Step::Cancel
            } else {
                Step::Continue
            }
        }

        fn on_finish(&mut self) {
            self.finished += 1;
        }
    }

    #[test]
    fn test_repeat_count_scenario() {
        let mut anim = Animation::new(Recorder::default(), 1000)
            .with_repeat(RepeatCount::Finite(2), RepeatMode::Restart);
        anim.start_at(0);

        assert!(anim.calculate(500));
        assert!((anim.calculator().values[0] - 0.5).abs() < f32::EPSILON);

        assert!(anim.calculate(1000));
        assert_eq!(anim.run_count(), 1);
        assert_eq!(anim.state(), RunState::Running { start: 1000 });

        assert!(!anim.calculate(2500));
        assert_eq!(anim.run_count(), 2);
        assert_eq!(anim.state(), RunState::Finished);
        assert_eq!(anim.calculator().finished, 1);

        assert!(!anim.calculate(3000));
        assert_eq!(anim.calculator().finished, 1);
    }

    #[test]
    fn test_finished_is_idempotent() {
        let mut anim = Animation::new(Recorder::default(), 100);
        anim.start_at(0);
        assert!(!anim.calculate(100));
        let seen = anim.calculator().values.len();

        assert!(!anim.calculate(150));
        assert!(!anim.calculate(150));
        assert_eq!(anim.calculator().finished, 1);
        assert_eq!(anim.calculator().values.len(), seen);
    }

    #[test]
    fn test_progress_is_monotonic() {
        let mut anim = Animation::new(Recorder::default(), 1000);
        anim.start_at(0);
        for t in (0..=1000).step_by(37) {
            anim.calculate(t);
        }
        let values = &anim.calculator().values;
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_start_latches_first_frame() {
        let mut anim = Animation::new(Recorder::default(), 200);
        anim.start();
        assert_eq!(anim.state(), RunState::Pending);
        assert!(anim.calculate(5000));
        assert_eq!(anim.state(), RunState::Running { start: 5000 });
        assert!(anim.calculator().values[0].abs() < f32::EPSILON);

        // start() while running changes nothing
        anim.start();
        assert_eq!(anim.state(), RunState::Running { start: 5000 });
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let mut anim = Animation::new(Recorder::default(), 0);
        anim.start();
        assert!(!anim.calculate(42));
        assert!((anim.calculator().values[0] - 1.0).abs() < f32::EPSILON);
        assert_eq!(anim.calculator().finished, 1);
    }

    #[test]
    fn test_cancel_from_value_step() {
        let recorder = Recorder {
            cancel_at: Some(2),
            ..Recorder::default()
        };
        let mut anim = Animation::new(recorder, 100);
        anim.start_at(0);
        assert!(anim.calculate(10));
        assert!(!anim.calculate(200));
        assert_eq!(anim.state(), RunState::Idle);
        assert_eq!(anim.calculator().finished, 0);
        assert!(!anim.calculate(300));
    }

    #[test]
    fn test_cancel_and_reset() {
        let mut anim = Animation::new(Recorder::default(), 100);
        anim.start_at(0);
        anim.cancel();
        assert!(!anim.calculate(50));

        anim.reset();
        assert!(anim.is_running());
        assert!(anim.calculate(1000));
        assert_eq!(anim.state(), RunState::Running { start: 1000 });
    }

    #[test]
    fn test_infinite_reverse() {
        let mut anim = Animation::new(Recorder::default(), 100)
            .with_repeat(RepeatCount::Infinite, RepeatMode::Reverse);
        anim.start_at(0);
        assert!(anim.calculate(100));
        assert!(anim.calculate(125));
        assert!((anim.calculator().values[1] - 0.75).abs() < 1e-6);
        for t in (200..10_000).step_by(100) {
            assert!(anim.calculate(t));
        }
    }

    #[test]
    fn test_future_start_clamps_to_zero() {
        let mut anim = Animation::new(Recorder::default(), 100);
        anim.start_at(500);
        assert!(anim.calculate(400));
        assert!(anim.calculator().values[0].abs() < f32::EPSILON);
    }
}
