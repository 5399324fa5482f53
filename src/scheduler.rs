//! Refresh scheduling for the timer loop.
//!
//! A [`Scheduler`] only decides *when* the next tick happens. Registering
//! returns a [`FrameHandle`]; the host later hands that handle back to
//! [`TimerController::tick`](crate::controller::TimerController::tick).
//! All timing decisions (anchoring, remaining time, termination) stay in the
//! controller.
//!
//! Cadence is best effort. A slow host simply delivers fewer frames, which
//! shows up as a larger elapsed value on the next tick.

use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};

/// Default refresh interval, roughly one 60 Hz display frame.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Identifies one single-shot registration. Never reused by a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(u64);

impl FrameHandle {
    /// Wraps a raw registration number.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw registration number.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// "Run the tick before the next display refresh."
pub trait Scheduler {
    /// Registers a single tick strictly after now.
    fn schedule(&mut self) -> FrameHandle;

    /// Prevents the tick for `handle` from firing. Cancelling a handle that
    /// already fired or was already cancelled is a no-op.
    fn cancel(&mut self, handle: FrameHandle);
}

impl<S: Scheduler + ?Sized> Scheduler for &mut S {
    fn schedule(&mut self) -> FrameHandle {
        (**self).schedule()
    }

    fn cancel(&mut self, handle: FrameHandle) {
        (**self).cancel(handle);
    }
}

/// Host-driven scheduler: registrations wait in a queue until the host's
/// refresh loop calls [`FrameQueue::take_due`].
///
/// ```rust
/// use responsive_timer::scheduler::{FrameQueue, Scheduler};
///
/// let mut queue = FrameQueue::new();
/// let handle = queue.schedule();
/// assert_eq!(queue.take_due(), vec![handle]);
/// assert!(queue.take_due().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct FrameQueue {
    next: u64,
    pending: VecDeque<FrameHandle>,
    cancelled: u64,
}

impl FrameQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains everything registered before this refresh, in registration order.
    pub fn take_due(&mut self) -> Vec<FrameHandle> {
        self.pending.drain(..).collect()
    }

    /// Pops the oldest pending registration.
    pub fn fire_next(&mut self) -> Option<FrameHandle> {
        self.pending.pop_front()
    }

    /// Number of registrations waiting for a refresh.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Number of cancellations that removed a live registration.
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl Scheduler for FrameQueue {
    fn schedule(&mut self) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.pending.push_back(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        let before = self.pending.len();
        self.pending.retain(|h| *h != handle);
        if self.pending.len() != before {
            self.cancelled += 1;
        }
    }
}

/// Paces a blocking refresh loop at a fixed interval.
///
/// Missed frames are skipped rather than replayed in a burst.
#[derive(Debug)]
pub struct FramePacer {
    interval: Duration,
    deadline: Instant,
}

impl FramePacer {
    /// First deadline is one `interval` from now.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: Instant::now() + interval,
        }
    }

    /// Time between frame deadlines.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleeps until the next frame deadline and returns how many frame slots
    /// passed since the previous call (1 when on time).
    pub fn wait(&mut self) -> u32 {
        let now = Instant::now();
        if now < self.deadline {
            thread::sleep(self.deadline - now);
        }

        let now = Instant::now();
        let mut slots = 1;
        self.deadline += self.interval;
        while self.deadline <= now && !self.interval.is_zero() {
            self.deadline += self.interval;
            slots += 1;
        }
        slots
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(FRAME_INTERVAL)
    }
}
