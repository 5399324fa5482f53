//! Display formatting for timer readouts.
//!
//! Both default formats use two-digit, zero-padded fields and truncate to
//! centiseconds (they never round up):
//!
//! - countdown: `MM:SS.cc`, or `HH:MM:SS.cc` once an hour or more remains
//! - clock: always `HH:MM:SS.cc`, 24-hour
//!
//! ```rust
//! use responsive_timer::format::{format_countdown, format_clock};
//!
//! assert_eq!(format_countdown(0), "00:00.00");
//! assert_eq!(format_countdown(3_661_000), "01:01:01.00");
//! assert_eq!(format_clock(45_296_789, Some(0)), "12:34:56.78");
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::{Local, Offset, TimeZone};

use crate::error::FormatError;

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR as i64;

/// Caller supplied formatter. Receives the same value the default would.
pub type FormatFn = Arc<dyn Fn(u64) -> Result<String, FormatError> + Send + Sync>;

struct Fields {
    hours: u64,
    minutes: u64,
    seconds: u64,
    centis: u64,
}

fn split(ms: u64) -> Fields {
    Fields {
        hours: ms / MS_PER_HOUR,
        minutes: (ms % MS_PER_HOUR) / MS_PER_MINUTE,
        seconds: (ms % MS_PER_MINUTE) / MS_PER_SECOND,
        centis: (ms % MS_PER_SECOND) / 10,
    }
}

/// Formats remaining milliseconds for a countdown.
pub fn format_countdown(remaining_ms: u64) -> String {
    let f = split(remaining_ms);
    if f.hours > 0 {
        format!(
            "{:02}:{:02}:{:02}.{:02}",
            f.hours, f.minutes, f.seconds, f.centis
        )
    } else {
        format!("{:02}:{:02}.{:02}", f.minutes, f.seconds, f.centis)
    }
}

/// Formats an absolute instant (ms since the epoch) as a time of day.
///
/// `offset_minutes` shifts UTC by a signed number of minutes; `None` uses the
/// host's local offset at that instant.
pub fn format_clock(wall_ms: u64, offset_minutes: Option<i32>) -> String {
    let wall_ms = i64::try_from(wall_ms).unwrap_or(i64::MAX);
    let offset_ms = match offset_minutes {
        Some(minutes) => i64::from(minutes) * MS_PER_MINUTE as i64,
        None => local_offset_ms(wall_ms),
    };

    let time_of_day = wall_ms.saturating_add(offset_ms).rem_euclid(MS_PER_DAY) as u64;
    let f = split(time_of_day);
    format!(
        "{:02}:{:02}:{:02}.{:02}",
        f.hours, f.minutes, f.seconds, f.centis
    )
}

fn local_offset_ms(wall_ms: i64) -> i64 {
    Local
        .timestamp_millis_opt(wall_ms)
        .single()
        .map(|at| i64::from(at.offset().fix().local_minus_utc()) * MS_PER_SECOND as i64)
        .unwrap_or(0)
}

/// The formatter a timer renders with.
#[derive(Clone)]
pub enum Formatter {
    /// [`format_countdown`].
    Countdown,
    /// [`format_clock`] with an optional fixed offset in minutes.
    Clock {
        /// Minutes east of UTC; `None` for the host's local time.
        offset_minutes: Option<i32>,
    },
    /// Replaces the default entirely.
    Custom(FormatFn),
}

impl Formatter {
    /// Wraps an infallible closure.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(u64) -> String + Send + Sync + 'static,
    {
        Formatter::Custom(Arc::new(move |ms| Ok(f(ms))))
    }

    /// Wraps a closure that may fail; its error is surfaced by the tick.
    pub fn try_custom<F, E>(f: F) -> Self
    where
        F: Fn(u64) -> Result<String, E> + Send + Sync + 'static,
        E: Into<FormatError>,
    {
        Formatter::Custom(Arc::new(move |ms| f(ms).map_err(Into::into)))
    }

    /// Renders `value_ms`: remaining time for a countdown, milliseconds since
    /// the epoch for a clock.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use responsive_timer::format::Formatter;
    ///
    /// assert_eq!(Formatter::Countdown.format(61_250).unwrap(), "01:01.25");
    /// let seconds = Formatter::custom(|ms| format!("{}s", ms / 1_000));
    /// assert_eq!(seconds.format(9_999).unwrap(), "9s");
    /// ```
    pub fn format(&self, value_ms: u64) -> Result<String, FormatError> {
        match self {
            Formatter::Countdown => Ok(format_countdown(value_ms)),
            Formatter::Clock { offset_minutes } => Ok(format_clock(value_ms, *offset_minutes)),
            Formatter::Custom(f) => f(value_ms),
        }
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formatter::Countdown => f.write_str("Countdown"),
            Formatter::Clock { offset_minutes } => f
                .debug_struct("Clock")
                .field("offset_minutes", offset_minutes)
                .finish(),
            Formatter::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_without_hours() {
        assert_eq!(format_countdown(0), "00:00.00");
        assert_eq!(format_countdown(1_000), "00:01.00");
        assert_eq!(format_countdown(59_999), "00:59.99");
        assert_eq!(format_countdown(30_000), "00:30.00");
        assert_eq!(format_countdown(3_599_990), "59:59.99");
    }

    #[test]
    fn test_countdown_with_hours() {
        assert_eq!(format_countdown(3_600_000), "01:00:00.00");
        assert_eq!(format_countdown(3_661_000), "01:01:01.00");
        assert_eq!(format_countdown(36_000_000 + 5_432), "10:00:05.43");
    }

    #[test]
    fn test_centiseconds_truncate() {
        assert_eq!(format_countdown(9), "00:00.00");
        assert_eq!(format_countdown(19), "00:00.01");
        assert_eq!(format_countdown(999), "00:00.99");
    }

    #[test]
    fn test_clock_fixed_offsets() {
        // 1970-01-01T12:34:56.789Z
        let instant = 45_296_789;
        assert_eq!(format_clock(instant, Some(0)), "12:34:56.78");
        assert_eq!(format_clock(instant, Some(90)), "14:04:56.78");
        assert_eq!(format_clock(instant, Some(-780)), "23:34:56.78");
        assert_eq!(format_clock(0, Some(-1)), "23:59:00.00");
    }

    #[test]
    fn test_clock_local_has_fixed_shape() {
        let rendered = format_clock(1_700_000_000_123, None);
        assert_eq!(rendered.len(), "HH:MM:SS.cc".len());
        assert!(rendered.ends_with(".12"));
    }

    #[test]
    fn test_custom_replaces_default() {
        let formatter = Formatter::custom(|ms| format!("{}s", ms / 1_000));
        assert_eq!(formatter.format(42_000).unwrap(), "42s");
    }

    #[test]
    fn test_try_custom_surfaces_error() {
        let formatter = Formatter::try_custom(|_| Err::<String, _>("bad frame"));
        let err = formatter.format(1).unwrap_err();
        assert_eq!(err.to_string(), "bad frame");
    }

    #[test]
    fn test_formatter_is_pure() {
        let formatter = Formatter::Countdown;
        assert_eq!(formatter.format(1_234).unwrap(), formatter.format(1_234).unwrap());
        assert_eq!(format!("{:?}", Formatter::custom(|_| String::new())), "Custom(..)");
    }
}
