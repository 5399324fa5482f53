//! Time sources for the timer loop.
//!
//! Two clocks are read and they are never mixed:
//!
//! - the **monotonic** clock feeds elapsed/remaining arithmetic and never goes
//!   backwards, regardless of NTP slew or manual adjustment;
//! - the **wall** clock is only used for what the clock readout displays and
//!   may jump.
//!
//! [`SystemClock`] reads the host clocks. [`ManualClock`] is a deterministic
//! stand-in whose readings are advanced by hand, for driving a controller in
//! tests or replays.
//!
//! ```rust
//! use responsive_timer::clock::{ManualClock, TimeSource};
//!
//! let clock = ManualClock::new();
//! clock.advance(400);
//! assert_eq!(clock.monotonic_now().unwrap(), 400);
//! ```

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::error::{ClockKind, TimerError};

/// Source of the two instants the controller reads on every tick.
pub trait TimeSource {
    /// Milliseconds on a non-decreasing clock with an arbitrary origin.
    fn monotonic_now(&self) -> Result<u64, TimerError>;

    /// Milliseconds since the Unix epoch, as perceived by the host.
    fn wall_now(&self) -> Result<i64, TimerError>;
}

/// Host clocks: [`Instant`] for elapsed time, [`chrono::Utc`] for display.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock whose monotonic origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn monotonic_now(&self) -> Result<u64, TimerError> {
        u64::try_from(self.origin.elapsed().as_millis())
            .map_err(|_| TimerError::ClockUnavailable(ClockKind::Monotonic))
    }

    fn wall_now(&self) -> Result<i64, TimerError> {
        Ok(Utc::now().timestamp_millis())
    }
}

/// Manually advanced clock.
///
/// Clones share the same readings, so a test can keep one handle while the
/// controller owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    monotonic: Arc<AtomicU64>,
    wall: Arc<AtomicI64>,
    unavailable: Option<ClockKind>,
}

impl ManualClock {
    /// Both clocks start at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the wall clock at `wall_ms` since the epoch.
    pub fn with_wall(wall_ms: i64) -> Self {
        let clock = Self::default();
        clock.wall.store(wall_ms, Ordering::SeqCst);
        clock
    }

    /// A clock whose `kind` reading always fails.
    pub fn unavailable(kind: ClockKind) -> Self {
        Self {
            unavailable: Some(kind),
            ..Self::default()
        }
    }

    /// Moves both clocks forward by `ms`.
    pub fn advance(&self, ms: u64) {
        self.monotonic.fetch_add(ms, Ordering::SeqCst);
        self.wall.fetch_add(ms as i64, Ordering::SeqCst);
    }

    /// Sets the monotonic reading to `ms`. Earlier readings are kept.
    pub fn set_monotonic(&self, ms: u64) {
        self.monotonic.fetch_max(ms, Ordering::SeqCst);
    }

    /// Jumps the wall clock without touching the monotonic one.
    pub fn set_wall(&self, wall_ms: i64) {
        self.wall.store(wall_ms, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn monotonic_now(&self) -> Result<u64, TimerError> {
        if self.unavailable == Some(ClockKind::Monotonic) {
            return Err(TimerError::ClockUnavailable(ClockKind::Monotonic));
        }
        Ok(self.monotonic.load(Ordering::SeqCst))
    }

    fn wall_now(&self) -> Result<i64, TimerError> {
        if self.unavailable == Some(ClockKind::Wall) {
            return Err(TimerError::ClockUnavailable(ClockKind::Wall));
        }
        Ok(self.wall.load(Ordering::SeqCst))
    }
}
