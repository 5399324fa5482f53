//! Timer construction options.
//!
//! The mode is implied by the presence of a duration unless it is set
//! explicitly. Everything is validated by [`TimerConfig::build`], before the
//! timer can be started.
//!
//! ```rust
//! use responsive_timer::config::{TimerConfig, TimerMode};
//!
//! let options = TimerConfig::countdown(30_000)
//!     .class_name("countdown-display")
//!     .on_complete(|| println!("done"))
//!     .build()
//!     .unwrap();
//! assert_eq!(options.mode(), TimerMode::Countdown);
//! assert_eq!(options.display_target(), "responsive-timer countdown-display");
//! ```

use std::fmt;

use crate::error::{ConfigError, FormatError};
use crate::format::Formatter;

/// Largest accepted timezone offset magnitude, in minutes.
pub const MAX_TIMEZONE_OFFSET: i32 = 24 * 60 - 1;

const TARGET_PREFIX: &str = "responsive-timer";

/// What the readout shows. Fixed once the timer is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    /// Current wall-clock time, forever.
    Clock,
    /// Remaining time down to zero, then completes.
    Countdown,
}

/// Invoked once when a countdown reaches zero.
pub type CompleteFn = Box<dyn FnMut() + Send>;

/// Builder for [`TimerOptions`].
#[derive(Default)]
pub struct TimerConfig {
    mode: Option<TimerMode>,
    duration_ms: Option<i64>,
    on_complete: Option<CompleteFn>,
    formatter: Option<Formatter>,
    timezone_offset: Option<i32>,
    class_name: String,
}

impl TimerConfig {
    /// Clock readout in the host's local time.
    pub fn clock() -> Self {
        Self::default()
    }

    /// Countdown from `duration_ms` to zero.
    pub fn countdown(duration_ms: i64) -> Self {
        Self {
            duration_ms: Some(duration_ms),
            ..Self::default()
        }
    }

    /// Overrides the mode implied by the duration.
    ///
    /// An explicit [`TimerMode::Clock`] together with a duration is rejected
    /// with [`ConfigError::DurationOnClock`].
    pub fn mode(mut self, mode: TimerMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Sets the countdown length in milliseconds.
    pub fn duration_ms(mut self, duration_ms: i64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Called exactly once when a countdown reaches zero. Never called in
    /// clock mode or when the timer is stopped early.
    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Replaces the mode's default formatter.
    ///
    /// In clock mode the formatter receives raw milliseconds since the epoch
    /// and any [`TimerConfig::timezone_offset`] is not applied.
    pub fn format_time<F>(mut self, f: F) -> Self
    where
        F: Fn(u64) -> String + Send + Sync + 'static,
    {
        self.formatter = Some(Formatter::custom(f));
        self
    }

    /// Like [`TimerConfig::format_time`], for formatters that can fail.
    pub fn try_format_time<F, E>(mut self, f: F) -> Self
    where
        F: Fn(u64) -> Result<String, E> + Send + Sync + 'static,
        E: Into<FormatError>,
    {
        self.formatter = Some(Formatter::try_custom(f));
        self
    }

    /// Signed minutes added to UTC before formatting. Clock mode only.
    ///
    /// Only the default clock formatter uses the offset; a custom formatter
    /// set through [`TimerConfig::format_time`] replaces it. The offset is
    /// still range checked.
    pub fn timezone_offset(mut self, minutes: i32) -> Self {
        self.timezone_offset = Some(minutes);
        self
    }

    /// Opaque class forwarded to the display sink.
    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    /// Validates the configuration.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use responsive_timer::config::TimerConfig;
    /// use responsive_timer::error::ConfigError;
    ///
    /// assert!(TimerConfig::countdown(1_000).build().is_ok());
    /// assert_eq!(
    ///     TimerConfig::countdown(-5).build().unwrap_err(),
    ///     ConfigError::NegativeDuration(-5)
    /// );
    /// ```
    pub fn build(self) -> Result<TimerOptions, ConfigError> {
        let mode = self.mode.unwrap_or(match self.duration_ms {
            Some(_) => TimerMode::Countdown,
            None => TimerMode::Clock,
        });

        let duration_ms = match mode {
            TimerMode::Countdown => {
                let ms = self.duration_ms.ok_or(ConfigError::MissingDuration)?;
                if ms < 0 {
                    return Err(ConfigError::NegativeDuration(ms));
                }
                Some(ms as u64)
            }
            TimerMode::Clock => {
                if self.duration_ms.is_some() {
                    return Err(ConfigError::DurationOnClock);
                }
                None
            }
        };

        if let Some(offset) = self.timezone_offset {
            if mode == TimerMode::Countdown {
                return Err(ConfigError::TimezoneOffsetOnCountdown);
            }
            if offset.abs() > MAX_TIMEZONE_OFFSET {
                return Err(ConfigError::TimezoneOffsetOutOfRange(offset));
            }
        }

        let formatter = self.formatter.unwrap_or(match mode {
            TimerMode::Countdown => Formatter::Countdown,
            TimerMode::Clock => Formatter::Clock {
                offset_minutes: self.timezone_offset,
            },
        });

        let display_target = format!("{} {}", TARGET_PREFIX, self.class_name)
            .trim_end()
            .to_string();

        Ok(TimerOptions {
            mode,
            duration_ms,
            on_complete: self.on_complete,
            formatter,
            display_target,
        })
    }
}

/// Validated configuration consumed by the controller.
pub struct TimerOptions {
    mode: TimerMode,
    duration_ms: Option<u64>,
    pub(crate) on_complete: Option<CompleteFn>,
    formatter: Formatter,
    display_target: String,
}

impl TimerOptions {
    /// Clock readout in local time with the default formatter.
    pub fn local_clock() -> Self {
        Self {
            mode: TimerMode::Clock,
            duration_ms: None,
            on_complete: None,
            formatter: Formatter::Clock {
                offset_minutes: None,
            },
            display_target: TARGET_PREFIX.to_string(),
        }
    }

    /// The mode the timer runs in.
    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    /// Countdown length; `None` in clock mode.
    pub fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    /// The formatter every frame is rendered with.
    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    /// `responsive-timer` followed by the configured class name.
    pub fn display_target(&self) -> &str {
        &self.display_target
    }
}

impl fmt::Debug for TimerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerOptions")
            .field("mode", &self.mode)
            .field("duration_ms", &self.duration_ms)
            .field("on_complete", &self.on_complete.is_some())
            .field("formatter", &self.formatter)
            .field("display_target", &self.display_target)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_implied_by_duration() {
        assert_eq!(TimerConfig::clock().build().unwrap().mode(), TimerMode::Clock);
        let countdown = TimerConfig::countdown(5_000).build().unwrap();
        assert_eq!(countdown.mode(), TimerMode::Countdown);
        assert_eq!(countdown.duration_ms(), Some(5_000));
    }

    #[test]
    fn test_countdown_without_duration_rejected() {
        let err = TimerConfig::clock()
            .mode(TimerMode::Countdown)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingDuration);
    }

    #[test]
    fn test_negative_duration_rejected() {
        let err = TimerConfig::countdown(-1).build().unwrap_err();
        assert_eq!(err, ConfigError::NegativeDuration(-1));
    }

    #[test]
    fn test_zero_duration_allowed() {
        let options = TimerConfig::countdown(0).build().unwrap();
        assert_eq!(options.duration_ms(), Some(0));
    }

    #[test]
    fn test_explicit_clock_rejects_duration() {
        let err = TimerConfig::countdown(1_000)
            .mode(TimerMode::Clock)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::DurationOnClock);

        let options = TimerConfig::clock().mode(TimerMode::Clock).build().unwrap();
        assert_eq!(options.duration_ms(), None);
    }

    #[test]
    fn test_timezone_offset_validation() {
        assert_eq!(
            TimerConfig::countdown(1_000)
                .timezone_offset(60)
                .build()
                .unwrap_err(),
            ConfigError::TimezoneOffsetOnCountdown
        );
        assert_eq!(
            TimerConfig::clock().timezone_offset(1_440).build().unwrap_err(),
            ConfigError::TimezoneOffsetOutOfRange(1_440)
        );
        assert!(TimerConfig::clock().timezone_offset(-720).build().is_ok());
    }

    #[test]
    fn test_default_formatter_follows_mode() {
        let clock = TimerConfig::clock().timezone_offset(330).build().unwrap();
        assert!(matches!(
            clock.formatter(),
            Formatter::Clock {
                offset_minutes: Some(330)
            }
        ));

        let custom = TimerConfig::countdown(10)
            .format_time(|ms| ms.to_string())
            .build()
            .unwrap();
        assert_eq!(custom.formatter().format(7).unwrap(), "7");
    }

    #[test]
    fn test_custom_formatter_ignores_timezone_offset() {
        let options = TimerConfig::clock()
            .timezone_offset(60)
            .format_time(|ms| ms.to_string())
            .build()
            .unwrap();
        assert_eq!(options.formatter().format(0).unwrap(), "0");

        assert_eq!(
            TimerConfig::clock()
                .timezone_offset(2_000)
                .format_time(|ms| ms.to_string())
                .build()
                .unwrap_err(),
            ConfigError::TimezoneOffsetOutOfRange(2_000)
        );
    }

    #[test]
    fn test_display_target() {
        assert_eq!(
            TimerConfig::clock().build().unwrap().display_target(),
            "responsive-timer"
        );
        assert_eq!(
            TimerConfig::clock()
                .class_name("current-time-display")
                .build()
                .unwrap()
                .display_target(),
            "responsive-timer current-time-display"
        );
    }
}
