// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Protocol identification and pulse-width classification.
//!
//! Every decision the decoder makes is a comparison of a measured duration
//! against a nominal one, using the same +/-30% tolerance band:
//!
//! - The leader mark/space pair selects the protocol ([`Format::from_leader`])
//! - Each subsequent mark or space cycle selects a data bit
//!   ([`Format::classify_bit`])
//!
//! All functions here are pure; they know nothing about clocks, pins or
//! interrupts, which keeps them testable in isolation.

use embassy_time::Duration;

use crate::config::{AEHA_UNIT, NEC_UNIT, SONY_UNIT};

/// Remote-control protocol family of a decoded frame.
///
/// The repeat variants are short marker frames meaning "same command as
/// last, button still held"; they carry no data bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Format {
    /// No frame decoded yet, or the frame was already consumed.
    Unknown,
    /// NEC frame with data bits.
    Nec,
    /// NEC repeat marker, no data bits.
    NecRepeat,
    /// AEHA (Japanese consumer electronics) frame with data bits.
    Aeha,
    /// AEHA repeat marker, no data bits.
    AehaRepeat,
    /// SONY SIRC frame with data bits.
    Sony,
}

/// Checks a measured duration against a nominal one with a +/-30% band.
///
/// The band is open on both ends: exactly 0.7x or 1.3x the nominal width
/// does not match. Real transmitters sit well inside the band, and the
/// open bounds keep adjacent nominal widths (1, 2, 3 and 4 units) from
/// overlapping.
///
/// # Arguments
///
/// * `measured` - Duration measured between two edges
/// * `nominal` - Expected duration for a clean signal
///
/// # Returns
///
/// `true` if `0.7 * nominal < measured < 1.3 * nominal`.
///
/// # Examples
///
/// ```ignore
/// use embassy_time::Duration;
///
/// let nominal = Duration::from_micros(562);
/// assert!(in_tolerance(Duration::from_micros(600), nominal));
/// assert!(!in_tolerance(Duration::from_micros(1124), nominal));
/// ```
pub fn in_tolerance(measured: Duration, nominal: Duration) -> bool {
    let measured = measured.as_micros();
    let nominal = nominal.as_micros();
    nominal * 7 < measured * 10 && measured * 10 < nominal * 13
}

impl Format {
    /// Classifies a leader mark/space pair into a protocol.
    ///
    /// Four patterns are recognized, checked in order:
    ///
    /// | Mark | Space | Result |
    /// |------|-------|--------|
    /// | 16 NEC units | 8 NEC units | [`Format::Nec`] |
    /// | 16 NEC units | 4 NEC units | [`Format::NecRepeat`] |
    /// | 8 AEHA units | 4 AEHA units | [`Format::Aeha`] |
    /// | 8 AEHA units | 8 AEHA units | [`Format::AehaRepeat`] |
    ///
    /// The SONY leader is a bare 4-unit mark with no defined space width,
    /// so it is detected earlier, on the rising edge that ends the mark,
    /// and never reaches this classification.
    ///
    /// # Arguments
    ///
    /// * `mark` - Width of the leader mark (carrier on)
    /// * `space` - Width of the leader space (carrier off)
    ///
    /// # Returns
    ///
    /// The matching protocol, or `None` if the pair matches no pattern.
    pub fn from_leader(mark: Duration, space: Duration) -> Option<Format> {
        if in_tolerance(mark, NEC_UNIT * 16) && in_tolerance(space, NEC_UNIT * 8) {
            Some(Format::Nec)
        } else if in_tolerance(mark, NEC_UNIT * 16) && in_tolerance(space, NEC_UNIT * 4) {
            Some(Format::NecRepeat)
        } else if in_tolerance(mark, AEHA_UNIT * 8) && in_tolerance(space, AEHA_UNIT * 4) {
            Some(Format::Aeha)
        } else if in_tolerance(mark, AEHA_UNIT * 8) && in_tolerance(space, AEHA_UNIT * 8) {
            Some(Format::AehaRepeat)
        } else {
            None
        }
    }

    /// Classifies one bit cycle of this protocol.
    ///
    /// NEC and AEHA encode bits in the space width between marks
    /// (3 units = 1, 1 unit = 0). SONY encodes bits in the mark width
    /// (2 units = 1, 1 unit = 0).
    ///
    /// # Arguments
    ///
    /// * `cycle` - Measured duration of the bit cycle
    ///
    /// # Returns
    ///
    /// * `Some(true)` / `Some(false)` - A clean 1 or 0 bit
    /// * `None` - Outside both bands, or this format carries no data bits
    pub fn classify_bit(&self, cycle: Duration) -> Option<bool> {
        let (one, zero) = match self {
            Format::Nec => (NEC_UNIT * 3, NEC_UNIT),
            Format::Aeha => (AEHA_UNIT * 3, AEHA_UNIT),
            Format::Sony => (SONY_UNIT * 2, SONY_UNIT),
            _ => return None,
        };
        if in_tolerance(cycle, one) {
            Some(true)
        } else if in_tolerance(cycle, zero) {
            Some(false)
        } else {
            None
        }
    }

    /// Returns `true` for the repeat marker variants.
    pub fn is_repeat(&self) -> bool {
        matches!(self, Format::NecRepeat | Format::AehaRepeat)
    }
}
