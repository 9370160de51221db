// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Async event-loop front-end for the receiver.
//!
//! On an async runtime there is no need to register raw edge and timer
//! interrupts by hand: [`run`] multiplexes the three event sources the
//! decoder needs over futures and delivers them in order:
//!
//! - Pin edges, through the platform's [`EdgeInput`] implementation
//! - The frame-tail [`Deadline`], polled with `Timer::at`
//! - The fixed-period watchdog tick, from a [`Ticker`]
//!
//! The loop runs forever; spawn it as its own task.
//!
//! # Examples
//!
//! ```ignore
//! use embassy_rp::gpio::{Input, Pull};
//! use remote_ir::{driver, Deadline, Edge, EdgeInput, InstantClock, IrReceiver};
//!
//! static DEADLINE: Deadline = Deadline::new();
//! static RECEIVER: IrReceiver<InstantClock, &Deadline> =
//!     IrReceiver::new(InstantClock::new(), &DEADLINE);
//!
//! struct PinEdges(Input<'static>);
//!
//! impl EdgeInput for PinEdges {
//!     async fn wait_edge(&mut self) -> Edge {
//!         self.0.wait_for_any_edge().await;
//!         if self.0.is_high() { Edge::Rising } else { Edge::Falling }
//!     }
//! }
//!
//! #[embassy_executor::task]
//! async fn ir_task(pin: Input<'static>) -> ! {
//!     // IR receiver modules idle high, so configure the pin with Pull::Up.
//!     let mut edges = PinEdges(pin);
//!     driver::run(&RECEIVER, &DEADLINE, &mut edges).await
//! }
//! ```

use core::future::pending;

use embassy_futures::select::{select3, Either3};
use embassy_time::{Ticker, Timer};

use crate::config::WATCHDOG_PERIOD;
use crate::receiver::IrReceiver;
use crate::time::{Deadline, InstantClock};

/// Direction of a receiver pin transition.
///
/// Demodulating IR receivers are active low: a falling edge means the
/// carrier turned on (mark start), a rising edge means it turned off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// Pin went high; carrier off, space begins.
    Rising,
    /// Pin went low; carrier on, mark begins.
    Falling,
}

/// Source of receiver pin edges.
///
/// Implement this on whatever the platform offers for edge-triggered GPIO
/// waits; see the [module documentation](self) for an example.
#[allow(async_fn_in_trait)]
pub trait EdgeInput {
    /// Waits for the next pin transition and reports its direction.
    async fn wait_edge(&mut self) -> Edge;
}

/// Drives a receiver from an edge source until the end of time.
///
/// Delivers pin edges, frame-tail deadline firings and watchdog ticks to
/// the receiver as they occur. `deadline` must be the same deadline the
/// receiver's decoder was constructed with; the loop clears it when it
/// fires so a consumed firing is never delivered twice.
///
/// # Arguments
///
/// * `receiver` - Shared receiver to deliver events to
/// * `deadline` - Frame-tail deadline armed by the receiver's decoder
/// * `edges` - Platform edge source
pub async fn run<'a, E: EdgeInput>(
    receiver: &IrReceiver<InstantClock, &'a Deadline>,
    deadline: &'a Deadline,
    edges: &mut E,
) -> ! {
    let mut ticker = Ticker::every(WATCHDOG_PERIOD);
    loop {
        let tail = async {
            match deadline.get() {
                Some(at) => Timer::at(at).await,
                None => pending().await,
            }
        };
        match select3(edges.wait_edge(), tail, ticker.next()).await {
            Either3::First(Edge::Falling) => receiver.falling_edge(),
            Either3::First(Edge::Rising) => receiver.rising_edge(),
            Either3::Second(()) => {
                deadline.clear();
                receiver.tail_timeout();
            }
            Either3::Third(()) => receiver.watchdog_tick(),
        }
    }
}
