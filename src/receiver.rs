// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Interrupt-safe receiver front: the decoder behind a critical section.
//!
//! Edge, timer and watchdog handlers run to completion without preempting
//! each other, but any of them can preempt application code that is reading
//! a frame out. [`IrReceiver`] therefore keeps the whole decoder state
//! tuple inside one blocking critical-section mutex: every entry point and
//! every accessor takes the full lock, so readers always observe a
//! consistent snapshot and partial updates are impossible.
//!
//! Every method takes `&self`, and construction is `const`, so a receiver
//! can live in a `static` and be shared freely between interrupt handlers,
//! async tasks and the main loop.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::decoder::{Config, Decoder, State};
use crate::frame::CapacityError;
use crate::protocol::Format;
use crate::time::{ElapsedClock, FrameTimer};

/// Shared infrared receiver: a [`Decoder`] plus the critical section that
/// makes it usable from interrupt context.
///
/// # Examples
///
/// ```ignore
/// use remote_ir::{Deadline, InstantClock, IrReceiver, State};
///
/// static DEADLINE: Deadline = Deadline::new();
/// static RECEIVER: IrReceiver<InstantClock, &Deadline> =
///     IrReceiver::new(InstantClock::new(), &DEADLINE);
///
/// // In the application loop:
/// if RECEIVER.state() == State::Received {
///     let mut buf = [0u8; 32];
///     let (format, bits) = RECEIVER.read_frame(&mut buf)?;
/// }
/// ```
pub struct IrReceiver<C: ElapsedClock, T: FrameTimer> {
    /// Decoder state tuple, guarded as a whole.
    decoder: Mutex<CriticalSectionRawMutex, RefCell<Decoder<C, T>>>,
}

impl<C: ElapsedClock, T: FrameTimer> IrReceiver<C, T> {
    /// Creates an idle receiver with the default configuration.
    ///
    /// # Arguments
    ///
    /// * `clock` - Elapsed clock to timestamp edges with
    /// * `timer` - Single-shot timer for frame-tail detection
    pub const fn new(clock: C, timer: T) -> Self {
        Self {
            decoder: Mutex::new(RefCell::new(Decoder::new(clock, timer))),
        }
    }

    /// Creates an idle receiver with an explicit configuration.
    pub const fn with_config(clock: C, timer: T, config: Config) -> Self {
        Self {
            decoder: Mutex::new(RefCell::new(Decoder::with_config(clock, timer, config))),
        }
    }

    /// Returns a snapshot of the decoder state.
    pub fn state(&self) -> State {
        self.decoder.lock(|decoder| decoder.borrow().state())
    }

    /// Copies the decoded frame out and rearms the decoder.
    ///
    /// See [`Decoder::read_frame`] for the full contract. The copy and the
    /// reset happen inside one critical section, so a frame is consumed
    /// exactly once even if a new leader starts arriving mid-call.
    ///
    /// # Arguments
    ///
    /// * `buf` - Destination for the packed frame bits, LSB first
    ///
    /// # Returns
    ///
    /// * `Ok((format, bit_count))` - Protocol and number of valid bits
    /// * `Err(CapacityError)` - `buf` too small; the frame is retained
    pub fn read_frame(&self, buf: &mut [u8]) -> Result<(Format, usize), CapacityError> {
        self.decoder
            .lock(|decoder| decoder.borrow_mut().read_frame(buf))
    }

    /// Delivers a falling edge (carrier turning on) to the decoder.
    pub fn falling_edge(&self) {
        self.decoder.lock(|decoder| decoder.borrow_mut().falling_edge());
    }

    /// Delivers a rising edge (carrier turning off) to the decoder.
    pub fn rising_edge(&self) {
        self.decoder.lock(|decoder| decoder.borrow_mut().rising_edge());
    }

    /// Delivers a frame-tail timer firing to the decoder.
    pub fn tail_timeout(&self) {
        self.decoder.lock(|decoder| decoder.borrow_mut().tail_timeout());
    }

    /// Delivers a watchdog tick to the decoder.
    pub fn watchdog_tick(&self) {
        self.decoder
            .lock(|decoder| decoder.borrow_mut().watchdog_tick());
    }
}
