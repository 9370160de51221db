// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! End-to-end test of the async event-loop front-end.
//!
//! Runs `driver::run` against a scripted edge source on the host time
//! driver, so the frame-tail deadline and the watchdog ticker fire for
//! real. Pulse widths are programmed at the short end of each tolerance
//! band; host scheduling can only lengthen a sleep, so measurements stay
//! inside the band.

use embassy_futures::block_on;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Instant, Timer};
use remote_ir::{driver, Deadline, Edge, EdgeInput, Format, InstantClock, IrReceiver, State};

/// Replays a fixed list of (delay, edge) events, then goes silent.
///
/// The pending event survives cancellation: `driver::run` drops the edge
/// future whenever the deadline or the watchdog ticker wins its select, and
/// the event must not be lost when that happens.
struct ScriptedEdges {
    events: std::vec::IntoIter<(u64, Edge)>,
    pending: Option<(Instant, Edge)>,
}

impl ScriptedEdges {
    fn new(events: Vec<(u64, Edge)>) -> Self {
        Self {
            events: events.into_iter(),
            pending: None,
        }
    }
}

impl EdgeInput for ScriptedEdges {
    async fn wait_edge(&mut self) -> Edge {
        let (at, edge) = match self.pending {
            Some(pending) => pending,
            None => match self.events.next() {
                Some((delay_us, edge)) => {
                    let at = Instant::now() + Duration::from_micros(delay_us);
                    self.pending = Some((at, edge));
                    (at, edge)
                }
                None => core::future::pending().await,
            },
        };
        Timer::at(at).await;
        self.pending = None;
        edge
    }
}

/// Edge script for one NEC frame carrying `payload`, LSB first.
fn nec_script(payload: &[u8]) -> Vec<(u64, Edge)> {
    let mut events = vec![
        (1_000, Edge::Falling),
        (8_000, Edge::Rising),
        (3_600, Edge::Falling),
    ];
    for i in 0..payload.len() * 8 {
        events.push((450, Edge::Rising));
        let bit = (payload[i / 8] >> (i % 8)) & 1 != 0;
        events.push((if bit { 1_300 } else { 450 }, Edge::Falling));
    }
    events
}

/// Runs the driver against `edges` until a frame completes, then reads it.
fn decode_one(events: Vec<(u64, Edge)>) -> (Format, usize, [u8; 8]) {
    let deadline = Deadline::new();
    let receiver = IrReceiver::new(InstantClock::new(), &deadline);
    let mut edges = ScriptedEdges::new(events);

    block_on(async {
        let decode = driver::run(&receiver, &deadline, &mut edges);
        let observe = async {
            let mut waited_ms = 0u32;
            while receiver.state() != State::Received {
                assert!(waited_ms < 2_000, "frame never completed");
                Timer::after(Duration::from_millis(1)).await;
                waited_ms += 1;
            }
            let mut buf = [0u8; 8];
            let (format, bits) = receiver.read_frame(&mut buf).expect("buffer large enough");
            (format, bits, buf)
        };
        match select(decode, observe).await {
            Either::First(never) => match never {},
            Either::Second(result) => result,
        }
    })
}

#[test]
fn scripted_nec_frame_decodes_end_to_end() {
    let payload = [0x04, 0xFB, 0x08, 0xF7];
    let (format, bits, buf) = decode_one(nec_script(&payload));
    assert_eq!(format, Format::Nec);
    assert_eq!(bits, 32);
    assert_eq!(&buf[..4], &payload);
}

#[test]
fn scripted_nec_repeat_decodes_end_to_end() {
    // 16-unit mark then a 4-unit space completes without any data bits
    let events = vec![
        (1_000, Edge::Falling),
        (8_000, Edge::Rising),
        (1_800, Edge::Falling),
    ];
    let (format, bits, _) = decode_one(events);
    assert_eq!(format, Format::NecRepeat);
    assert_eq!(bits, 0);
}
