//! Error types for timer construction and the tick loop.

use thiserror::Error;

use crate::controller::TimerState;

/// Boxed error type returned by custom formatters.
pub type FormatError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which of the two host clocks failed to produce a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockKind {
    /// The clock used for elapsed-time arithmetic.
    Monotonic,
    /// The clock used for absolute time display.
    Wall,
}

impl std::fmt::Display for ClockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClockKind::Monotonic => f.write_str("monotonic"),
            ClockKind::Wall => f.write_str("wall"),
        }
    }
}

/// Invalid timer configuration, reported before the timer is started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Countdown mode was requested without a duration.
    #[error("countdown mode requires a duration")]
    MissingDuration,

    /// The countdown duration is below zero.
    #[error("countdown duration must not be negative (got {0} ms)")]
    NegativeDuration(i64),

    /// The timezone offset is a day or more in either direction.
    #[error("timezone offset {0} min is outside of -1439..=1439")]
    TimezoneOffsetOutOfRange(i32),

    /// A timezone offset was given for a countdown.
    #[error("a timezone offset only applies to clock mode")]
    TimezoneOffsetOnCountdown,

    /// A duration was given for a timer explicitly set to clock mode.
    #[error("clock mode does not take a duration")]
    DurationOnClock,
}

/// Errors raised while starting or driving a timer.
#[derive(Debug, Error)]
pub enum TimerError {
    /// Configuration rejected by [`TimerConfig::build`](crate::config::TimerConfig::build).
    #[error("invalid timer configuration")]
    Config(#[from] ConfigError),

    /// A custom formatter returned an error. The tick loop halts.
    #[error("custom formatter failed")]
    Format(#[source] FormatError),

    /// The host could not provide a clock reading.
    #[error("{0} clock is unavailable")]
    ClockUnavailable(ClockKind),

    /// `start()` was called on a running timer.
    #[error("timer is already running")]
    DoubleStart,

    /// `start()` was called after the timer reached a terminal state.
    #[error("timer cannot be restarted from the {0:?} state")]
    AlreadyFinished(TimerState),
}
