//! Timer readout component for Bubble Tea applications.
//!
//! The widget wraps a [`TimerController`] driven by bubbletea-rs ticks: every
//! registration becomes a `tick` command carrying a [`FrameMsg`], and
//! [`Model::update`] hands the frame back to the controller. A countdown that
//! reaches zero additionally emits a [`CompletedMsg`].
//!
//! # Basic Usage
//!
//! ```rust
//! use responsive_timer::config::TimerConfig;
//! use responsive_timer::widget::Model;
//!
//! let options = TimerConfig::countdown(30_000).build().unwrap();
//! let timer = Model::new(options);
//! assert!(timer.view().contains("00:30.00"));
//! ```
//!
//! # bubbletea-rs Integration
//!
//! ```rust
//! use bubbletea_rs::{Cmd, Model as BubbleTeaModel, Msg};
//! use responsive_timer::config::TimerConfig;
//! use responsive_timer::widget::{CompletedMsg, Model};
//!
//! struct Testbed {
//!     countdown: Model,
//!     done: bool,
//! }
//!
//! impl BubbleTeaModel for Testbed {
//!     fn init() -> (Self, Option<Cmd>) {
//!         let options = TimerConfig::countdown(30_000)
//!             .class_name("countdown-display")
//!             .build()
//!             .unwrap();
//!         let mut countdown = Model::new(options);
//!         let cmd = countdown.init();
//!         (Self { countdown, done: false }, cmd)
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!         if let Some(completed) = msg.downcast_ref::<CompletedMsg>() {
//!             if completed.id == self.countdown.id() {
//!                 self.done = true;
//!             }
//!             return None;
//!         }
//!         self.countdown.update(msg)
//!     }
//!
//!     fn view(&self) -> String {
//!         format!("Remaining: {}", self.countdown.view())
//!     }
//! }
//! ```

use bubbletea_rs::{tick as bubbletea_tick, Cmd, Model as BubbleTeaModel, Msg};
use lipgloss_extras::prelude::*;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tracing::{error, warn};

use crate::clock::SystemClock;
use crate::config::{TimerMode, TimerOptions};
use crate::controller::{TickOutcome, TimerController, TimerState};
use crate::display::LatestFrame;
use crate::error::TimerError;
use crate::scheduler::{FrameHandle, Scheduler, FRAME_INTERVAL};

static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Delivers one refresh to the widget with the matching `id`.
#[derive(Debug, Clone)]
pub struct FrameMsg {
    /// Identifies the widget the frame belongs to.
    pub id: i64,
    /// The registration this frame fires.
    pub handle: FrameHandle,
}

/// Sent once when a countdown widget reaches zero.
#[derive(Debug, Clone)]
pub struct CompletedMsg {
    /// Identifies the widget that completed.
    pub id: i64,
}

/// Scheduler whose registrations become bubbletea `tick` commands.
///
/// Cancelling drops a registration that has not been turned into a command
/// yet. A command already in flight still delivers its [`FrameMsg`]; the
/// controller rejects it as stale.
#[derive(Debug)]
pub struct TickScheduler {
    interval: Duration,
    next: u64,
    pending: Option<FrameHandle>,
}

impl TickScheduler {
    /// Frames are delivered `interval` after each registration.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: 0,
            pending: None,
        }
    }

    /// Turns the pending registration into a command for widget `id`.
    pub fn take_cmd(&mut self, id: i64) -> Option<Cmd> {
        let handle = self.pending.take()?;
        Some(bubbletea_tick(self.interval, move |_| {
            Box::new(FrameMsg { id, handle }) as Msg
        }))
    }

    /// Whether a registration is waiting to become a command.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new(FRAME_INTERVAL)
    }
}

impl Scheduler for TickScheduler {
    fn schedule(&mut self) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle::new(self.next);
        self.pending = Some(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

/// A clock or countdown readout.
pub struct Model {
    /// Style applied to the rendered readout.
    pub style: Style,
    controller: TimerController<TickScheduler, SystemClock, LatestFrame>,
    error: Option<TimerError>,
    id: i64,
}

impl Model {
    /// Creates a widget refreshing at [`FRAME_INTERVAL`].
    pub fn new(options: TimerOptions) -> Self {
        Self::with_interval(options, FRAME_INTERVAL)
    }

    /// Creates a widget refreshing at a custom interval.
    pub fn with_interval(options: TimerOptions, interval: Duration) -> Self {
        Self {
            style: Style::new().bold(true),
            controller: TimerController::new(
                options,
                TickScheduler::new(interval),
                SystemClock::new(),
                LatestFrame::new(),
            ),
            error: None,
            id: next_id(),
        }
    }

    /// Sets the readout style using builder pattern.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Returns the widget's unique identifier.
    ///
    /// [`FrameMsg`]s and [`CompletedMsg`]s carry this id so several widgets
    /// can share one program.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use responsive_timer::widget::Model;
    ///
    /// let a = Model::default();
    /// let b = Model::default();
    /// assert_ne!(a.id(), b.id());
    /// ```
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Clock or countdown.
    pub fn mode(&self) -> TimerMode {
        self.controller.mode()
    }

    /// Lifecycle state of the underlying controller.
    pub fn state(&self) -> TimerState {
        self.controller.state()
    }

    /// True once a countdown has rendered zero.
    pub fn completed(&self) -> bool {
        self.controller.completed()
    }

    /// The error that halted the timer, if any.
    pub fn error(&self) -> Option<&TimerError> {
        self.error.as_ref()
    }

    /// Starts the timer and returns the command for its first frame.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use responsive_timer::config::TimerConfig;
    /// use responsive_timer::error::TimerError;
    /// use responsive_timer::widget::Model;
    ///
    /// let mut timer = Model::new(TimerConfig::countdown(5_000).build().unwrap());
    /// assert!(timer.start().is_ok());
    /// assert!(matches!(timer.start(), Err(TimerError::DoubleStart)));
    /// ```
    pub fn start(&mut self) -> Result<Cmd, TimerError> {
        self.controller.start()?;
        self.controller
            .scheduler_mut()
            .take_cmd(self.id)
            .ok_or(TimerError::DoubleStart)
    }

    /// Like [`Model::start`], logging instead of returning the error.
    pub fn init(&mut self) -> Option<Cmd> {
        match self.start() {
            Ok(cmd) => Some(cmd),
            Err(err) => {
                warn!(id = self.id, error = %err, "timer did not start");
                None
            }
        }
    }

    /// Stops the timer. Frames already in flight are ignored on arrival.
    pub fn stop(&mut self) {
        self.controller.stop();
    }

    /// Handles [`FrameMsg`]s addressed to this widget.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        let frame = msg.downcast_ref::<FrameMsg>()?;
        if frame.id != self.id {
            return None;
        }

        match self.controller.tick(frame.handle) {
            Ok(TickOutcome::Rendered { .. }) => self.controller.scheduler_mut().take_cmd(self.id),
            Ok(TickOutcome::Completed) => {
                let id = self.id;
                Some(bubbletea_tick(Duration::from_nanos(1), move |_| {
                    Box::new(CompletedMsg { id }) as Msg
                }))
            }
            Ok(TickOutcome::Stale) => None,
            Err(err) => {
                error!(id = self.id, error = %err, "timer halted");
                self.error = Some(err);
                None
            }
        }
    }

    /// The latest frame, or the initial readout before the first frame.
    pub fn view(&self) -> String {
        let text = match self.controller.sink().text() {
            Some(text) => text.to_string(),
            None => self.controller.preview().unwrap_or_default(),
        };
        self.style.render(&text)
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(TimerOptions::local_clock())
    }
}

impl BubbleTeaModel for Model {
    fn init() -> (Self, Option<Cmd>) {
        let mut model = Self::default();
        let cmd = model.init();
        (model, cmd)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        self.update(msg)
    }

    fn view(&self) -> String {
        self.view()
    }
}
