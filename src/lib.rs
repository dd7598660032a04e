#![cfg_attr(not(test), no_std)]

//! # slowrf
//!
//! Pulse demodulator and frame decoder for the legacy sub-GHz
//! home-automation protocols: FS20/FS10, FHT, HMS, EM, KS300/S300, ESA,
//! TX3, Revolt, InterTechno V1/V3, TCM97001 and Hoermann.
//!
//! The radio front-end raises an interrupt on every transition of the
//! demodulated data line. The time between transitions, scaled to 16 µs
//! units, is all this crate consumes: [`Receiver::rf_edge`] classifies the
//! modulation, learns the zero/one bit-cell shapes of the current frame and
//! fills a bucket with raw bits. A compare interrupt after a silence
//! interval ([`Receiver::rf_silence`]) closes the frame, and the main-loop
//! task [`Receiver::rf_analyze`] runs the protocol decoders over it,
//! filters repeats and emits the decoded line.
//!
//! Hardware is abstracted behind two small traits: [`Frontend`] (tick
//! counter, RSSI, pulse counter and silence-compare control, optional FHT
//! and rf-router hooks) and [`Console`] (byte sink for the output lines),
//! so the same core runs under an MCU interrupt/main-loop split and under a
//! hosted test harness.

pub mod output;
pub mod proto;
pub mod rx;

pub use output::Console;
pub use proto::Protocol;
pub use rx::bucket::{Bucket, BucketState};
pub use rx::wave::{makeavg, tscale, Pulse, Wave, TDIFF, TDIFFIT};
pub use rx::{
    Frontend, Receiver, TxReport, REPTIME, REP_BINTIME, REP_BITS, REP_FHTPROTO, REP_KNOWN,
    REP_LCDMON, REP_MONITOR, REP_REPEATED, REP_RSSI, SILENCE,
};

/// Raw frame buffer size in bytes, sized for the largest frame the
/// enabled decoders accept: EM's 90 bits in the base set, Revolt's 103,
/// ESA's 144 (160 in the GIRA variant).
#[cfg(feature = "gira")]
pub const MAXMSG: usize = 20;
#[cfg(all(feature = "esa", not(feature = "gira")))]
pub const MAXMSG: usize = 18;
#[cfg(all(feature = "revolt", not(feature = "esa")))]
pub const MAXMSG: usize = 13;
#[cfg(not(any(feature = "esa", feature = "revolt")))]
pub const MAXMSG: usize = 12;

/// Number of working frame buffers between the edge handler and the
/// analyze task. One slot is always kept free for the frame being filled.
pub const RCV_BUCKETS: usize = 4;
