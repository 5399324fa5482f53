#![warn(missing_docs)]
#![doc(html_root_url = "https://docs.rs/responsive-timer/")]

//! # responsive-timer
//!
//! A display-refresh driven timer readout: either the current wall-clock time
//! or a countdown to zero, re-rendered on every refresh with centisecond
//! precision. Built for screen recordings and test beds where the on-screen
//! time must stay visibly live.
//!
//! ## Overview
//!
//! The crate is split into small pieces that each own one concern:
//!
//! - [`clock`]: the monotonic clock used for elapsed time and the wall clock
//!   used for display, kept strictly apart
//! - [`format`]: pure `ms -> String` formatters (`MM:SS.cc`, `HH:MM:SS.cc`)
//! - [`scheduler`]: "tick before the next refresh" registrations with
//!   cancellation
//! - [`controller`]: the state machine that anchors, computes, renders and
//!   decides when a countdown is over
//! - [`widget`]: a bubbletea-rs component wrapping the controller
//!
//! ## Driving a controller by hand
//!
//! ```rust
//! use responsive_timer::prelude::*;
//!
//! let clock = ManualClock::new();
//! let options = TimerConfig::countdown(2_500).build().unwrap();
//! let mut timer = TimerController::new(options, FrameQueue::new(), clock.clone(), LatestFrame::new());
//! timer.start().unwrap();
//!
//! let handle = timer.scheduler_mut().fire_next().unwrap();
//! timer.tick(handle).unwrap();
//! assert_eq!(timer.sink().text(), Some("00:02.50"));
//!
//! clock.advance(2_500);
//! let handle = timer.scheduler_mut().fire_next().unwrap();
//! assert_eq!(timer.tick(handle).unwrap(), TickOutcome::Completed);
//! assert_eq!(timer.sink().text(), Some("00:00.00"));
//! ```
//!
//! ## Component Overview
//!
//! | Type | Description |
//! |------|-------------|
//! | `TimerConfig` | Builder and validation for timer options |
//! | `TimerController` | Tick state machine |
//! | `FrameQueue` | Host-driven scheduler, also the test fake |
//! | `ManualClock` | Hand-advanced time source |
//! | `Timer` | bubbletea-rs widget |

pub mod clock;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod format;
pub mod scheduler;
pub mod widget;

pub use clock::{ManualClock, SystemClock, TimeSource};
pub use config::{TimerConfig, TimerMode, TimerOptions};
pub use controller::{TickOutcome, TimerController, TimerState};
pub use display::{DisplaySink, LatestFrame, Recorder};
pub use error::{ClockKind, ConfigError, FormatError, TimerError};
pub use format::{format_clock, format_countdown, Formatter};
pub use scheduler::{FrameHandle, FramePacer, FrameQueue, Scheduler, FRAME_INTERVAL};
pub use widget::{
    CompletedMsg as TimerCompletedMsg, FrameMsg as TimerFrameMsg, Model as Timer, TickScheduler,
};

/// Prelude module for convenient imports.
///
/// ```rust
/// use responsive_timer::prelude::*;
///
/// let options = TimerConfig::clock().timezone_offset(0).build().unwrap();
/// assert_eq!(options.mode(), TimerMode::Clock);
/// ```
pub mod prelude {
    pub use crate::clock::{ManualClock, SystemClock, TimeSource};
    pub use crate::config::{TimerConfig, TimerMode, TimerOptions};
    pub use crate::controller::{TickOutcome, TimerController, TimerState};
    pub use crate::display::{DisplaySink, LatestFrame, Recorder};
    pub use crate::error::{ConfigError, TimerError};
    pub use crate::format::Formatter;
    pub use crate::scheduler::{FrameHandle, FrameQueue, Scheduler};
    pub use crate::widget::{
        CompletedMsg as TimerCompletedMsg, FrameMsg as TimerFrameMsg, Model as Timer,
    };
}
