// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Multi-protocol infrared remote-control receiver decoder.
//!
//! This crate decodes the edge-timing output of a demodulating IR receiver
//! module (38 kHz carrier, active-low output) into a protocol identifier and
//! a packed bit sequence. It is written for interrupt-driven embedded use:
//! every buffer is fixed-capacity, handlers never block, and all shared
//! state sits behind a bounded critical section.
//!
//! # Supported Protocols
//!
//! | Protocol | Unit width | Leader | Bit encoding |
//! |----------|------------|--------|--------------|
//! | NEC | 562 µs | 16 units mark + 8 units space | space width, 3 units = 1, 1 unit = 0 |
//! | NEC repeat | 562 µs | 16 units mark + 4 units space | no data bits |
//! | AEHA | 425 µs | 8 units mark + 4 units space | space width, 3 units = 1, 1 unit = 0 |
//! | AEHA repeat | 425 µs | 8 units mark + 8 units space | no data bits |
//! | SONY | 600 µs | 4 units mark | mark width, 2 units = 1, 1 unit = 0 |
//!
//! All timing comparisons use a +/-30% tolerance band around the nominal
//! width, matching the spread of real remote-control transmitters.
//!
//! # Decoding Model
//!
//! The decoder is a three-state machine (`Idle` -> `Receiving` -> `Received`)
//! driven by four event entry points:
//!
//! - **Falling edge** and **rising edge** from the receiver pin
//! - **Tail timeout** from a reschedulable single-shot timer, which detects
//!   the trailing silence that ends a frame (frame lengths vary by remote
//!   model, so no fixed bit count is assumed)
//! - **Watchdog tick** on a fixed 10 ms period, which force-resets the
//!   machine if noise or a missed edge leaves it stuck mid-frame
//!
//! A completed frame stays frozen in `Received` until the application
//! consumes it with [`IrReceiver::read_frame`], which also rearms the
//! machine for the next frame.
//!
//! # Usage
//!
//! The [`driver::run`] event loop multiplexes all four event sources over a
//! single GPIO edge future, so on an async runtime no interrupt handlers
//! need to be written by hand:
//!
//! ```ignore
//! use remote_ir::{driver, Deadline, Edge, EdgeInput, InstantClock, IrReceiver, State};
//!
//! static DEADLINE: Deadline = Deadline::new();
//! static RECEIVER: IrReceiver<InstantClock, &Deadline> =
//!     IrReceiver::new(InstantClock::new(), &DEADLINE);
//!
//! struct PinEdges(embassy_rp::gpio::Input<'static>);
//!
//! impl EdgeInput for PinEdges {
//!     async fn wait_edge(&mut self) -> Edge {
//!         self.0.wait_for_any_edge().await;
//!         if self.0.is_high() { Edge::Rising } else { Edge::Falling }
//!     }
//! }
//!
//! #[embassy_executor::task]
//! async fn ir_task(pin: embassy_rp::gpio::Input<'static>) -> ! {
//!     let mut edges = PinEdges(pin);
//!     driver::run(&RECEIVER, &DEADLINE, &mut edges).await
//! }
//!
//! // Elsewhere, poll for completed frames:
//! if RECEIVER.state() == State::Received {
//!     let mut buf = [0u8; 32];
//!     if let Ok((format, bits)) = RECEIVER.read_frame(&mut buf) {
//!         // buf[..bits.div_ceil(8)] now holds the frame, LSB first
//!     }
//! }
//! ```
//!
//! Platforms without an async runtime can instead call the
//! [`IrReceiver`] entry points directly from edge/timer interrupt handlers;
//! every entry point takes `&self` and is safe to invoke from interrupt
//! context.
//!
//! # Feature Flags
//!
//! - `defmt` - derive `defmt::Format` on the public types and emit trace
//!   and warning logs at decoder state transitions

#![no_std]

pub mod config;
pub mod decoder;
pub mod driver;
pub mod frame;
pub mod protocol;
pub mod receiver;
pub mod time;

pub use decoder::{Config, Decoder, State};
pub use driver::{Edge, EdgeInput};
pub use frame::{CapacityError, Frame};
pub use protocol::Format;
pub use receiver::IrReceiver;
pub use time::{Deadline, ElapsedClock, FrameTimer, InstantClock};
