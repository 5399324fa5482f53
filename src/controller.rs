//! The timer state machine.
//!
//! A [`TimerController`] owns everything that changes between ticks: the
//! start anchor, the completion flag and the one outstanding scheduler
//! registration. Nothing else writes to them.
//!
//! ```text
//! Idle --start()--> Running --tick(), remaining == 0--> Completed
//!                      |
//!                      +--stop()--> Stopped
//!                      +--formatter error--> Failed
//! ```
//!
//! The controller does not call itself back. The host receives a
//! [`FrameHandle`] from the scheduler and, when that frame comes due, passes
//! it to [`TimerController::tick`]. This keeps the loop deterministic under a
//! fake clock and a manually drained [`FrameQueue`](crate::scheduler::FrameQueue).
//!
//! ```rust
//! use responsive_timer::clock::ManualClock;
//! use responsive_timer::config::TimerConfig;
//! use responsive_timer::controller::{TickOutcome, TimerController};
//! use responsive_timer::display::Recorder;
//! use responsive_timer::scheduler::FrameQueue;
//!
//! let clock = ManualClock::new();
//! let options = TimerConfig::countdown(1_000).build().unwrap();
//! let mut timer = TimerController::new(options, FrameQueue::new(), clock.clone(), Recorder::new());
//! timer.start().unwrap();
//!
//! for advance in [0, 400, 500, 100] {
//!     clock.advance(advance);
//!     let handle = timer.scheduler_mut().fire_next().unwrap();
//!     timer.tick(handle).unwrap();
//! }
//! assert_eq!(timer.sink().frames(), ["00:01.00", "00:00.60", "00:00.10", "00:00.00"]);
//! assert!(timer.completed());
//! ```

use tracing::{debug, trace, warn};

use crate::clock::TimeSource;
use crate::config::{TimerMode, TimerOptions};
use crate::display::DisplaySink;
use crate::error::TimerError;
use crate::scheduler::{FrameHandle, Scheduler};

/// Lifecycle of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Constructed, not started.
    Idle,
    /// Waiting for, or running, a tick.
    Running,
    /// Countdown reached zero. Terminal.
    Completed,
    /// Torn down by `stop()`. Terminal.
    Stopped,
    /// A tick failed. Terminal.
    Failed,
}

impl TimerState {
    /// Completed, stopped and failed timers never run again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TimerState::Completed | TimerState::Stopped | TimerState::Failed
        )
    }
}

/// Result of delivering a frame to [`TimerController::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was rendered and the next tick registered.
    Rendered {
        /// The registration for the following frame.
        next: FrameHandle,
    },
    /// The countdown rendered zero and finished. Nothing was re-registered.
    Completed,
    /// The handle was not the live registration (cancelled, superseded, or
    /// the timer is not running). Nothing happened.
    Stale,
}

/// Drives one timer readout.
///
/// `stop()` runs on drop, so a controller never leaves a registration behind
/// when its owner goes away.
pub struct TimerController<S, C, D>
where
    S: Scheduler,
    C: TimeSource,
    D: DisplaySink,
{
    options: TimerOptions,
    scheduler: S,
    clock: C,
    sink: D,
    state: TimerState,
    start_anchor: Option<u64>,
    completed: bool,
    active: Option<FrameHandle>,
    last_value: Option<u64>,
}

impl<S, C, D> TimerController<S, C, D>
where
    S: Scheduler,
    C: TimeSource,
    D: DisplaySink,
{
    /// An idle controller. Nothing is scheduled until [`TimerController::start`].
    pub fn new(options: TimerOptions, scheduler: S, clock: C, sink: D) -> Self {
        Self {
            options,
            scheduler,
            clock,
            sink,
            state: TimerState::Idle,
            start_anchor: None,
            completed: false,
            active: None,
            last_value: None,
        }
    }

    /// Registers the first tick.
    ///
    /// Fails with [`TimerError::DoubleStart`] while running, and with
    /// [`TimerError::AlreadyFinished`] once the timer has reached a terminal
    /// state. Neither failure touches the running state. Both clocks are read
    /// once up front so a missing clock is reported here rather than mid-run.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use responsive_timer::clock::ManualClock;
    /// use responsive_timer::config::TimerConfig;
    /// use responsive_timer::controller::{TimerController, TimerState};
    /// use responsive_timer::display::Recorder;
    /// use responsive_timer::error::TimerError;
    /// use responsive_timer::scheduler::FrameQueue;
    ///
    /// let options = TimerConfig::clock().build().unwrap();
    /// let mut timer = TimerController::new(options, FrameQueue::new(), ManualClock::new(), Recorder::new());
    /// timer.start().unwrap();
    /// assert_eq!(timer.state(), TimerState::Running);
    /// assert!(matches!(timer.start(), Err(TimerError::DoubleStart)));
    /// ```
    pub fn start(&mut self) -> Result<(), TimerError> {
        match self.state {
            TimerState::Idle => {}
            TimerState::Running => return Err(TimerError::DoubleStart),
            state => return Err(TimerError::AlreadyFinished(state)),
        }

        self.clock.monotonic_now()?;
        self.clock.wall_now()?;

        let handle = self.scheduler.schedule();
        self.active = Some(handle);
        self.state = TimerState::Running;
        debug!(
            mode = ?self.options.mode(),
            duration_ms = ?self.options.duration_ms(),
            target = self.options.display_target(),
            "timer started"
        );
        Ok(())
    }

    /// Runs one frame for `handle`.
    ///
    /// Errors (a failing clock read or custom formatter) are returned to the
    /// caller as-is: the timer moves to [`TimerState::Failed`], nothing is
    /// written for that frame and no further tick is registered.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use responsive_timer::clock::ManualClock;
    /// use responsive_timer::config::TimerConfig;
    /// use responsive_timer::controller::{TickOutcome, TimerController};
    /// use responsive_timer::display::Recorder;
    /// use responsive_timer::scheduler::FrameQueue;
    ///
    /// let options = TimerConfig::countdown(0).build().unwrap();
    /// let mut timer = TimerController::new(options, FrameQueue::new(), ManualClock::new(), Recorder::new());
    /// timer.start().unwrap();
    ///
    /// let handle = timer.scheduler_mut().fire_next().unwrap();
    /// assert_eq!(timer.tick(handle).unwrap(), TickOutcome::Completed);
    /// assert_eq!(timer.tick(handle).unwrap(), TickOutcome::Stale);
    /// ```
    pub fn tick(&mut self, handle: FrameHandle) -> Result<TickOutcome, TimerError> {
        if self.state != TimerState::Running || self.active != Some(handle) {
            trace!(handle = handle.get(), state = ?self.state, "ignoring stale frame");
            return Ok(TickOutcome::Stale);
        }
        self.active = None;

        match self.render_frame() {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                self.state = TimerState::Failed;
                warn!(error = %err, "timer tick failed, loop halted");
                Err(err)
            }
        }
    }

    fn render_frame(&mut self) -> Result<TickOutcome, TimerError> {
        let now = self.clock.monotonic_now()?;
        let anchor = *self.start_anchor.get_or_insert_with(|| {
            debug!(anchor_ms = now, "timer anchored");
            now
        });

        let value = match self.options.duration_ms() {
            Some(duration) => duration.saturating_sub(now.saturating_sub(anchor)),
            None => self.wall_value()?,
        };

        let text = self
            .options
            .formatter()
            .format(value)
            .map_err(TimerError::Format)?;
        self.sink.write(self.options.display_target(), &text);
        self.last_value = Some(value);
        trace!(value_ms = value, text = %text, "frame rendered");

        if self.options.mode() == TimerMode::Countdown && value == 0 {
            self.finish();
            return Ok(TickOutcome::Completed);
        }

        let next = self.scheduler.schedule();
        self.active = Some(next);
        Ok(TickOutcome::Rendered { next })
    }

    fn wall_value(&self) -> Result<u64, TimerError> {
        let wall_ms = self.clock.wall_now()?;
        u64::try_from(wall_ms).or_else(|_| {
            warn!(wall_ms, "wall clock before the epoch, clamping to 0");
            Ok(0)
        })
    }

    fn finish(&mut self) {
        self.completed = true;
        self.state = TimerState::Completed;
        debug!("countdown complete");
        if let Some(mut on_complete) = self.options.on_complete.take() {
            on_complete();
        }
    }

    /// Cancels any outstanding registration and stops a non-terminal timer.
    /// Safe to call any number of times, in any state.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use responsive_timer::clock::ManualClock;
    /// use responsive_timer::config::TimerConfig;
    /// use responsive_timer::controller::{TimerController, TimerState};
    /// use responsive_timer::display::Recorder;
    /// use responsive_timer::scheduler::FrameQueue;
    ///
    /// let options = TimerConfig::countdown(5_000).build().unwrap();
    /// let mut timer = TimerController::new(options, FrameQueue::new(), ManualClock::new(), Recorder::new());
    /// timer.start().unwrap();
    /// timer.stop();
    /// timer.stop();
    /// assert_eq!(timer.state(), TimerState::Stopped);
    /// assert_eq!(timer.scheduler().pending(), 0);
    /// ```
    pub fn stop(&mut self) {
        if let Some(handle) = self.active.take() {
            self.scheduler.cancel(handle);
        }
        if !self.state.is_terminal() {
            debug!(from = ?self.state, "timer stopped");
            self.state = TimerState::Stopped;
        }
    }

    /// What the readout shows before the first frame: the full duration for
    /// a countdown, the current time for a clock.
    pub fn preview(&self) -> Result<String, TimerError> {
        let value = match self.options.duration_ms() {
            Some(duration) => duration,
            None => self.wall_value()?,
        };
        self.options
            .formatter()
            .format(value)
            .map_err(TimerError::Format)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Clock or countdown, fixed at construction.
    pub fn mode(&self) -> TimerMode {
        self.options.mode()
    }

    /// Whether a tick is outstanding.
    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// True once a countdown has rendered zero. Always false for a clock.
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// The registration currently waiting to fire, if any.
    pub fn active_registration(&self) -> Option<FrameHandle> {
        self.active
    }

    /// The value passed to the formatter on the latest frame.
    pub fn last_value(&self) -> Option<u64> {
        self.last_value
    }

    /// The validated options this controller was built with.
    pub fn options(&self) -> &TimerOptions {
        &self.options
    }

    /// The display sink frames are written to.
    pub fn sink(&self) -> &D {
        &self.sink
    }

    /// Mutable access to the display sink.
    pub fn sink_mut(&mut self) -> &mut D {
        &mut self.sink
    }

    /// The scheduler ticks are registered with.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Mutable access to the scheduler, e.g. to drain due frames.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

impl<S, C, D> Drop for TimerController<S, C, D>
where
    S: Scheduler,
    C: TimeSource,
    D: DisplaySink,
{
    fn drop(&mut self) {
        self.stop();
    }
}
