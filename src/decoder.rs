// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Edge-timing decoder state machine.
//!
//! This module implements the complete decoder for NEC, AEHA and SONY
//! infrared protocols from raw receiver edge events.
//!
//! # State Machine
//!
//! ```text
//!          leader classified              tail silence
//! [Idle] ----------------------> [Receiving] ---------> [Received]
//!    ^                                |                      |
//!    |   mismatch / ambiguous bit     |                      |
//!    +--------------------------------+                      |
//!    |                frame consumed / watchdog reset        |
//!    +-------------------------------------------------------+
//! ```
//!
//! Leader detection runs inside `Idle`: the first falling edge starts the
//! elapsed clock, the following rising and falling edges measure the leader
//! mark and space, and the pair selects the protocol. Repeat markers jump
//! straight to `Received` with zero bits. During `Receiving` every bit cycle
//! is classified and appended, and the frame-tail timer is rearmed; the
//! timer firing is what ends the frame, since frame lengths vary by remote
//! model.
//!
//! # Failure Recovery
//!
//! Three independent mechanisms return the machine to `Idle` without any
//! outside help:
//!
//! - A leader or bit cycle that matches no tolerance band resets immediately
//! - The frame-tail timer closes frames whose transmitter went quiet
//! - The watchdog wipes any partial state that sits unchanged past its limit
//!   (missed edges can strand leader detection, which the tail timer cannot
//!   reach because it only arms during `Receiving`)

use embassy_time::Duration;

use crate::config::{
    AEHA_TAIL_TIMEOUT, MIN_LEADER_WIDTH, NEC_TAIL_TIMEOUT, SONY_TAIL_TIMEOUT, SONY_UNIT,
    WATCHDOG_LIMIT,
};
use crate::frame::{CapacityError, Frame};
use crate::protocol::{in_tolerance, Format};
use crate::time::{ElapsedClock, FrameTimer};

/// Decoder lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Waiting for a leader; the first edges of a candidate leader are
    /// tracked here until the pattern is classified.
    Idle,
    /// Leader recognized, data bits are being decoded.
    Receiving,
    /// A complete frame is frozen and waiting to be consumed.
    Received,
}

/// Edge timestamps of the frame in progress.
///
/// `c1`..`c3` bracket the leader (first falling, rising, second falling
/// edge); `d1`/`d2` bracket the current bit cycle. `None` means the edge
/// has not been seen yet.
#[derive(Debug, Clone, Copy)]
struct Timestamps {
    c1: Option<Duration>,
    c2: Option<Duration>,
    c3: Option<Duration>,
    d1: Option<Duration>,
    d2: Option<Duration>,
}

impl Timestamps {
    const fn new() -> Self {
        Self {
            c1: None,
            c2: None,
            c3: None,
            d1: None,
            d2: None,
        }
    }

    fn clear(&mut self) {
        *self = Self::new();
    }

    fn any_set(&self) -> bool {
        self.c1.is_some()
            || self.c2.is_some()
            || self.c3.is_some()
            || self.d1.is_some()
            || self.d2.is_some()
    }
}

/// Tunable decoder parameters.
///
/// The defaults suit standard remotes; [`Config::sony_tail_timeout`] exists
/// because SONY frame completion is purely silence-driven and some remote
/// models pause longer between bits.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Silence after the last SONY bit that ends the frame.
    pub sony_tail_timeout: Duration,
    /// Watchdog ticks of continuous partial activity before a forced reset.
    pub watchdog_limit: u32,
}

impl Config {
    /// Creates the default configuration.
    pub const fn new() -> Self {
        Self {
            sony_tail_timeout: SONY_TAIL_TIMEOUT,
            watchdog_limit: WATCHDOG_LIMIT,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Infrared decoder state machine.
///
/// Owns the elapsed clock it measures edges against and the single-shot
/// timer it uses for frame-tail detection; both are injected so the machine
/// runs identically on hardware and under test.
///
/// `Decoder` itself is not interrupt-safe; wrap it in an
/// [`IrReceiver`](crate::IrReceiver) to share it between interrupt handlers
/// and application code.
pub struct Decoder<C: ElapsedClock, T: FrameTimer> {
    /// Monotonic clock, started by the first edge of a candidate leader.
    clock: C,
    /// Single-shot frame-tail timer, rearmed after every decoded bit.
    timer: T,
    /// Tunable parameters.
    config: Config,
    /// Current lifecycle state.
    state: State,
    /// Edge timestamps of the frame in progress.
    work: Timestamps,
    /// Frame being assembled, or the completed frame in `Received`.
    frame: Frame,
    /// Consecutive watchdog ticks spent with partial state present.
    stale_ticks: u32,
}

impl<C: ElapsedClock, T: FrameTimer> Decoder<C, T> {
    /// Creates an idle decoder with the default configuration.
    ///
    /// # Arguments
    ///
    /// * `clock` - Elapsed clock to timestamp edges with
    /// * `timer` - Single-shot timer for frame-tail detection
    pub const fn new(clock: C, timer: T) -> Self {
        Self::with_config(clock, timer, Config::new())
    }

    /// Creates an idle decoder with an explicit configuration.
    pub const fn with_config(clock: C, timer: T, config: Config) -> Self {
        Self {
            clock,
            timer,
            config,
            state: State::Idle,
            work: Timestamps::new(),
            frame: Frame::new(),
            stale_ticks: 0,
        }
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Copies the decoded frame out and rearms the decoder.
    ///
    /// On success the frame is consumed: the decoder performs a full reset
    /// and the next call returns `(Format::Unknown, 0)`. If `buf` cannot
    /// hold the decoded bits, nothing is touched and the call can be
    /// retried with a larger buffer.
    ///
    /// Callers normally wait for [`Decoder::state`] to report
    /// [`State::Received`] first; calling mid-reception drains the partial
    /// frame and restarts the decoder.
    ///
    /// # Arguments
    ///
    /// * `buf` - Destination for the packed frame bits, LSB first
    ///
    /// # Returns
    ///
    /// * `Ok((format, bit_count))` - Protocol and number of valid bits;
    ///   `buf[..bit_count.div_ceil(8)]` holds the data
    /// * `Err(CapacityError)` - `buf` holds fewer bits than the frame
    pub fn read_frame(&mut self, buf: &mut [u8]) -> Result<(Format, usize), CapacityError> {
        let bits = self.frame.bit_count();
        if buf.len() * 8 < bits {
            return Err(CapacityError {
                required_bits: bits,
            });
        }
        let format = self.frame.format();
        let bytes = self.frame.as_bytes();
        buf[..bytes.len()].copy_from_slice(bytes);
        self.reset();
        Ok((format, bits))
    }

    /// Processes a falling edge (carrier turning on).
    pub fn falling_edge(&mut self) {
        match self.state {
            State::Idle => {
                if self.work.c1.is_none() {
                    // First edge of a candidate leader opens the
                    // measurement window.
                    self.clock.start();
                    self.work.c1 = Some(self.clock.elapsed());
                } else {
                    self.work.c3 = Some(self.clock.elapsed());
                    self.classify_leader();
                }
            }
            State::Receiving => self.receive_falling(),
            State::Received => {}
        }
    }

    /// Processes a rising edge (carrier turning off).
    pub fn rising_edge(&mut self) {
        match self.state {
            State::Idle => self.classify_leader_mark(),
            State::Receiving => self.receive_rising(),
            State::Received => {}
        }
    }

    /// Processes a firing of the frame-tail timer.
    ///
    /// Ends the frame if one is being received; stale firings that arrive
    /// after the frame was consumed or reset are ignored.
    pub fn tail_timeout(&mut self) {
        if self.state != State::Receiving {
            return;
        }
        self.state = State::Received;
        self.work.clear();
        #[cfg(feature = "defmt")]
        defmt::trace!(
            "frame complete: {} ({} bits)",
            self.frame.format(),
            self.frame.bit_count()
        );
    }

    /// Processes one watchdog tick.
    ///
    /// Call on a fixed period
    /// ([`WATCHDOG_PERIOD`](crate::config::WATCHDOG_PERIOD)). Any partial
    /// state that survives more than [`Config::watchdog_limit`] consecutive
    /// ticks is wiped; this recovers from missed edges and electrical noise
    /// that strand leader detection, which the tail timer cannot reach
    /// because it only arms during [`State::Receiving`].
    pub fn watchdog_tick(&mut self) {
        if self.state != State::Idle || self.work.any_set() {
            self.stale_ticks += 1;
            if self.stale_ticks > self.config.watchdog_limit {
                #[cfg(feature = "defmt")]
                defmt::warn!("decoder stale in {}, forcing reset", self.state);
                self.reset();
                self.stale_ticks = 0;
            }
        } else {
            self.stale_ticks = 0;
        }
    }

    /// Full reset back to `Idle`: timestamps, frame, clock and any pending
    /// tail-timer firing.
    fn reset(&mut self) {
        self.state = State::Idle;
        self.work.clear();
        self.frame.clear();
        self.clock.stop();
        self.clock.reset();
        self.timer.cancel();
    }

    /// Classifies the leader mark on a rising edge in `Idle`.
    ///
    /// A mark of 4 SONY units is a complete SONY leader (SONY defines no
    /// leader space). Anything narrower than the minimum leader width is
    /// noise. Any other width may be an NEC or AEHA leader mark, so the
    /// timestamp is kept and classification waits for the closing falling
    /// edge.
    fn classify_leader_mark(&mut self) {
        let Some(c1) = self.work.c1 else {
            // Rising edge with no opening mark: stray transition.
            self.reset();
            return;
        };
        let c2 = self.clock.elapsed();
        self.work.c2 = Some(c2);
        let mark = c2 - c1;
        if in_tolerance(mark, SONY_UNIT * 4) {
            #[cfg(feature = "defmt")]
            defmt::trace!("leader classified: {}", Format::Sony);
            self.frame.begin(Format::Sony);
            self.state = State::Receiving;
        } else if mark < MIN_LEADER_WIDTH {
            self.reset();
        }
    }

    /// Classifies the full leader pattern on the second falling edge.
    fn classify_leader(&mut self) {
        let (Some(c1), Some(c2), Some(c3)) = (self.work.c1, self.work.c2, self.work.c3) else {
            // A leader needs all three edges; a missing rising edge means
            // the pattern cannot be measured.
            self.reset();
            return;
        };
        let mark = c2 - c1;
        let space = c3 - c2;
        match Format::from_leader(mark, space) {
            Some(format) if format.is_repeat() => {
                // Repeat markers carry no data bits; the frame is already
                // complete.
                #[cfg(feature = "defmt")]
                defmt::trace!("leader classified: {}", format);
                self.frame.begin(format);
                self.state = State::Received;
                self.work.clear();
            }
            Some(format) => {
                #[cfg(feature = "defmt")]
                defmt::trace!("leader classified: {}", format);
                self.frame.begin(format);
                self.state = State::Receiving;
            }
            None => {
                #[cfg(feature = "defmt")]
                defmt::trace!("leader mismatch, resetting");
                self.reset();
            }
        }
    }

    /// Falling edge during `Receiving`.
    ///
    /// For NEC and AEHA this closes a bit cycle (the space width carries
    /// the bit). For SONY it opens one (the mark width carries the bit).
    fn receive_falling(&mut self) {
        match self.frame.format() {
            Format::Nec | Format::Aeha => {
                let d2 = self.clock.elapsed();
                self.work.d2 = Some(d2);
                let Some(d1) = self.work.d1 else {
                    self.reset();
                    return;
                };
                self.store_bit(d2 - d1);
            }
            Format::Sony => self.work.d1 = Some(self.clock.elapsed()),
            _ => {}
        }
    }

    /// Rising edge during `Receiving`.
    fn receive_rising(&mut self) {
        match self.frame.format() {
            Format::Nec | Format::Aeha => self.work.d1 = Some(self.clock.elapsed()),
            Format::Sony => {
                let d2 = self.clock.elapsed();
                self.work.d2 = Some(d2);
                let Some(d1) = self.work.d1 else {
                    self.reset();
                    return;
                };
                self.store_bit(d2 - d1);
            }
            _ => {}
        }
    }

    /// Classifies one bit cycle, appends the bit and rearms the tail timer.
    ///
    /// A cycle outside both bit bands means edges were lost or mangled and
    /// the rest of the frame cannot be trusted; the frame is abandoned and
    /// the transmitter's usual repeats deliver a clean copy.
    fn store_bit(&mut self, cycle: Duration) {
        let format = self.frame.format();
        match format.classify_bit(cycle) {
            Some(bit) => {
                self.frame.push(bit);
                self.timer.schedule(self.tail_timeout_after(format));
            }
            None => self.reset(),
        }
    }

    /// Returns the tail silence that ends a frame of the given format.
    fn tail_timeout_after(&self, format: Format) -> Duration {
        match format {
            Format::Aeha => AEHA_TAIL_TIMEOUT,
            Format::Sony => self.config.sony_tail_timeout,
            _ => NEC_TAIL_TIMEOUT,
        }
    }
}
