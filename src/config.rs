// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Protocol timing constants and decoder capacities.
//!
//! This module collects every tunable of the decoder in one place:
//! - Per-protocol unit widths (the base duration all mark/space widths are
//!   multiples of)
//! - Frame-tail silence timeouts
//! - Watchdog cadence and staleness limit
//! - Frame buffer capacity
//!
//! # Timing Summary
//!
//! | Constant | Value | Derivation |
//! |----------|-------|------------|
//! | `NEC_UNIT` | 562 µs | NEC base pulse width |
//! | `AEHA_UNIT` | 425 µs | AEHA base pulse width |
//! | `SONY_UNIT` | 600 µs | SONY base pulse width |
//! | `NEC_TAIL_TIMEOUT` | 2810 µs | 5 NEC units of silence |
//! | `AEHA_TAIL_TIMEOUT` | 2125 µs | 5 AEHA units of silence |
//! | `SONY_TAIL_TIMEOUT` | 2400 µs | 4 SONY units of silence |

use embassy_time::Duration;

/// NEC protocol unit width (one base pulse).
pub const NEC_UNIT: Duration = Duration::from_micros(562);

/// AEHA protocol unit width (one base pulse).
pub const AEHA_UNIT: Duration = Duration::from_micros(425);

/// SONY protocol unit width (one base pulse).
pub const SONY_UNIT: Duration = Duration::from_micros(600);

/// Narrowest mark that can open any leader; anything shorter is noise.
pub const MIN_LEADER_WIDTH: Duration = Duration::from_micros(150);

/// Silence after the last NEC bit that ends the frame (5 units).
pub const NEC_TAIL_TIMEOUT: Duration = Duration::from_micros(5 * 562);

/// Silence after the last AEHA bit that ends the frame (5 units).
pub const AEHA_TAIL_TIMEOUT: Duration = Duration::from_micros(5 * 425);

/// Default silence after the last SONY bit that ends the frame (4 units).
///
/// SONY frame length varies by remote model (12, 15 or 20 bits) and is not
/// bounded by the decoder, so frame completion relies entirely on this
/// timeout. Remotes with unusual inter-bit gaps can override it through
/// [`Config::sony_tail_timeout`](crate::Config).
pub const SONY_TAIL_TIMEOUT: Duration = Duration::from_micros(4 * 600);

/// Interval at which the watchdog entry point is expected to be invoked.
pub const WATCHDOG_PERIOD: Duration = Duration::from_millis(10);

/// Watchdog ticks of continuous partial activity before a forced reset
/// (50 ticks at 10 ms, roughly 500 ms).
pub const WATCHDOG_LIMIT: u32 = 50;

/// Frame buffer capacity in bytes.
pub const FRAME_CAPACITY_BYTES: usize = 32;

/// Frame buffer capacity in bits; writes past this limit are dropped.
pub const FRAME_CAPACITY_BITS: usize = FRAME_CAPACITY_BYTES * 8;
