//! Protocol decoders.
//!
//! A completed bucket is offered to every enabled decoder in a fixed
//! priority order; the first success wins. FS20/FHT, EM and KS300 share
//! one bit stream shape (a stop or parity bit between payload bytes) and
//! go through [`unframe`]; the remaining protocols read the raw bits with
//! their own framing.

use crate::rx::bits::{parity_even_bit, BitReader};
use crate::rx::bucket::{Bucket, BucketState};
use crate::rx::wave::Pulse;
use crate::MAXMSG;

pub mod em;
#[cfg(feature = "esa")]
pub mod esa;
pub mod fs20;
pub mod hms;
#[cfg(feature = "hoermann")]
pub mod hoermann;
#[cfg(feature = "it")]
pub mod it;
pub mod ks300;
#[cfg(feature = "revolt")]
pub mod revolt;
#[cfg(feature = "tcm97001")]
pub mod tcm97001;
#[cfg(feature = "tx3")]
pub mod tx3;

/// Decoded frame family. The tag byte prefixes every emitted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Protocol {
    Fs20,
    Fht,
    Em,
    Hms,
    Ks300,
    Esa,
    Tx3,
    It,
    Tcm97001,
    Revolt,
    Hoermann,
}

impl Protocol {
    /// ASCII type tag of the output line.
    pub fn tag(self) -> u8 {
        match self {
            Protocol::Fs20 => b'F',
            Protocol::Fht => b'T',
            Protocol::Em => b'E',
            Protocol::Hms => b'H',
            Protocol::Ks300 => b'K',
            Protocol::Esa => b'S',
            Protocol::Tx3 => b't',
            Protocol::It => b'i',
            Protocol::Tcm97001 => b's',
            Protocol::Revolt => b'r',
            Protocol::Hoermann => b'R',
        }
    }
}

/// Parity-stripped decode output. Owned by the analyze task, valid for one
/// dispatch run. `nibble` marks a trailing half byte (KS300).
#[derive(Debug)]
pub struct Scratch {
    pub obuf: [u8; MAXMSG],
    pub oby: usize,
    pub nibble: bool,
}

impl Scratch {
    pub const fn new() -> Self {
        Self {
            obuf: [0; MAXMSG],
            oby: 0,
            nibble: false,
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.obuf[..self.oby]
    }
}

impl Default for Scratch {
    fn default() -> Self {
        Self::new()
    }
}

/// Inter-byte structure of the shared bit stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Framing {
    /// Even-parity bit after every byte, MSB-first payload (FS20/FHT).
    EvenParity,
    /// Mandatory 1 stop bit after every byte, LSB-first payload (EM).
    ByteStop,
    /// Stop bit between nibbles and bytes, LSB-first payload, may end on
    /// a half byte (KS300).
    NibbleStop,
}

/// Strip the inter-byte bits off the raw stream into `sc`. Returns false
/// on any framing violation or an empty result.
pub(crate) fn unframe(b: &Bucket, framing: Framing, sc: &mut Scratch) -> bool {
    let max = b.bit_len();
    let mut input = BitReader::new(&b.data);
    let mut obi: i8 = 7;

    sc.nibble = false;
    sc.oby = 0;
    sc.obuf[0] = 0;

    let mut cnt = 0;
    while cnt < max {
        cnt += 1;
        let bit = input.getbit();

        if framing == Framing::NibbleStop && obi == 3 {
            if !sc.nibble {
                if !bit {
                    return false;
                }
                sc.nibble = true;
                continue;
            }
            sc.nibble = false;
        }

        if obi == -1 {
            // byte boundary
            match framing {
                Framing::EvenParity => {
                    if parity_even_bit(sc.obuf[sc.oby]) != bit {
                        return false;
                    }
                }
                Framing::ByteStop | Framing::NibbleStop => {
                    if !bit {
                        return false;
                    }
                }
            }
            sc.oby += 1;
            if sc.oby >= MAXMSG {
                return false;
            }
            sc.obuf[sc.oby] = 0;
            obi = 7;
        } else {
            if bit {
                match framing {
                    Framing::EvenParity => sc.obuf[sc.oby] |= 1 << obi,
                    Framing::ByteStop | Framing::NibbleStop => sc.obuf[sc.oby] |= 1 << (7 - obi),
                }
            }
            obi -= 1;
        }
    }

    if framing == Framing::ByteStop && obi == -1 {
        // the stop bit of the last byte fell into the silence
        sc.oby += 1;
    } else if sc.nibble {
        // count the trailing half byte
        sc.oby += 1;
    }
    sc.oby != 0
}

/// Run the decoders over a completed bucket, first success wins.
pub(crate) fn dispatch(b: &mut Bucket, sc: &mut Scratch, hightime: Pulse) -> Option<Protocol> {
    sc.nibble = false;

    #[cfg(feature = "it")]
    if it::analyze(b, sc) {
        return Some(Protocol::It);
    }
    #[cfg(feature = "tcm97001")]
    if tcm97001::analyze(b, sc) {
        return Some(Protocol::Tcm97001);
    }
    #[cfg(feature = "revolt")]
    if revolt::analyze(b, sc) {
        return Some(Protocol::Revolt);
    }

    // The long-preamble states never hold a short-pulse frame.
    if matches!(
        b.state,
        BucketState::Revolt | BucketState::It | BucketState::Tcm97001
    ) {
        return None;
    }

    #[cfg(feature = "esa")]
    if esa::analyze(b, sc) {
        return Some(Protocol::Esa);
    }
    if let Some(p) = fs20::analyze(b, sc) {
        return Some(p);
    }
    if em::analyze(b, sc) {
        return Some(Protocol::Em);
    }
    if hms::analyze(b, sc) {
        return Some(Protocol::Hms);
    }
    #[cfg(feature = "tx3")]
    if tx3::analyze(b, sc) {
        return Some(Protocol::Tx3);
    }
    if ks300::analyze(b, sc, hightime) {
        return Some(Protocol::Ks300);
    }
    #[cfg(feature = "hoermann")]
    if hoermann::analyze(b, sc, hightime) {
        return Some(Protocol::Hoermann);
    }
    None
}
