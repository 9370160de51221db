// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Clock and timer abstractions the decoder is built against.
//!
//! The decoder never touches hardware directly; it measures time through
//! [`ElapsedClock`] and requests its frame-tail callback through
//! [`FrameTimer`]. This keeps the state machine deterministic under test
//! (inject fakes) and portable across platforms (implement the traits on
//! whatever the target offers).
//!
//! Two ready-made implementations cover async targets with an `embassy-time`
//! driver:
//!
//! - [`InstantClock`] - a restartable stopwatch over [`Instant`]
//! - [`Deadline`] - a shared deadline cell that an event loop polls with
//!   `Timer::at`, standing in for a hardware one-shot timer

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Duration, Instant};

/// Restartable monotonic stopwatch, microsecond resolution.
///
/// Contract:
/// - `elapsed` returns the time accumulated while running
/// - `start` is idempotent while running
/// - `stop` freezes `elapsed`; `start` afterwards resumes accumulating
/// - `reset` zeroes `elapsed` without changing the running state
pub trait ElapsedClock {
    /// Starts the stopwatch if it is not already running.
    fn start(&mut self);
    /// Stops the stopwatch, freezing the elapsed value.
    fn stop(&mut self);
    /// Zeroes the elapsed value.
    fn reset(&mut self);
    /// Returns the accumulated running time.
    fn elapsed(&self) -> Duration;
}

/// Reschedulable single-shot timer for frame-tail detection.
///
/// `schedule` replaces any pending request, so at most one firing is ever
/// outstanding; `cancel` revokes it. Both must be cheap and non-blocking,
/// as the decoder calls them from interrupt context after every bit.
pub trait FrameTimer {
    /// Requests a single firing after `after`, replacing any pending one.
    fn schedule(&mut self, after: Duration);
    /// Revokes any pending firing.
    fn cancel(&mut self);
}

/// [`ElapsedClock`] implementation over [`embassy_time::Instant`].
///
/// # Examples
///
/// ```ignore
/// static RECEIVER: IrReceiver<InstantClock, &Deadline> =
///     IrReceiver::new(InstantClock::new(), &DEADLINE);
/// ```
pub struct InstantClock {
    /// Instant the current running span started, `None` while stopped.
    started_at: Option<Instant>,
    /// Time accumulated by completed running spans.
    accumulated: Duration,
}

impl InstantClock {
    /// Creates a stopped, zeroed stopwatch.
    pub const fn new() -> Self {
        Self {
            started_at: None,
            accumulated: Duration::from_ticks(0),
        }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ElapsedClock for InstantClock {
    fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    fn stop(&mut self) {
        if let Some(started_at) = self.started_at.take() {
            self.accumulated += started_at.elapsed();
        }
    }

    fn reset(&mut self) {
        self.accumulated = Duration::from_ticks(0);
        if self.started_at.is_some() {
            self.started_at = Some(Instant::now());
        }
    }

    fn elapsed(&self) -> Duration {
        let running = match self.started_at {
            Some(started_at) => started_at.elapsed(),
            None => Duration::from_ticks(0),
        };
        self.accumulated + running
    }
}

/// Shared one-shot deadline, the async stand-in for a hardware timer.
///
/// The decoder arms it through the [`FrameTimer`] impl on `&Deadline`;
/// the [`driver::run`](crate::driver::run) event loop polls it with
/// `Timer::at` and delivers the firing as a tail-timeout event. The cell
/// sits behind a critical section so both sides can touch it from any
/// context.
pub struct Deadline {
    /// Pending firing instant, `None` while disarmed.
    at: Mutex<CriticalSectionRawMutex, Cell<Option<Instant>>>,
}

impl Deadline {
    /// Creates a disarmed deadline, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            at: Mutex::new(Cell::new(None)),
        }
    }

    /// Returns the pending firing instant, if armed.
    pub fn get(&self) -> Option<Instant> {
        self.at.lock(|at| at.get())
    }

    /// Disarms the deadline.
    pub fn clear(&self) {
        self.at.lock(|at| at.set(None));
    }

    /// Arms the deadline at an absolute instant, replacing any pending one.
    fn set(&self, instant: Instant) {
        self.at.lock(|at| at.set(Some(instant)));
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer for &Deadline {
    fn schedule(&mut self, after: Duration) {
        self.set(Instant::now() + after);
    }

    fn cancel(&mut self) {
        self.clear();
    }
}
