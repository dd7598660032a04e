//! FS20 / FS10 command frames, and the FHT frames sharing their framing.
//!
//! Both run the parity stream through [`unframe`]; the additive checksum
//! seed tells the two families apart (6 for FS20, 12 for FHT).

use super::{unframe, Framing, Protocol, Scratch};
use crate::rx::bucket::Bucket;

/// FHT command bytes the repeat filter treats as protocol chatter.
pub const FHT_ACK: u8 = 0x4B;
pub const FHT_CAN_XMIT: u8 = 0x53;
pub const FHT_CAN_RCV: u8 = 0x54;
pub const FHT_ACK2: u8 = 0x69;
pub const FHT_START_XMIT: u8 = 0x7D;
pub const FHT_END_XMIT: u8 = 0x7E;

/// Additive checksum over `buf`, seeded with `s`.
pub fn cksum1(s: u8, buf: &[u8]) -> u8 {
    buf.iter().fold(s, |sum, &d| sum.wrapping_add(d))
}

/// A checksum one above the FS20 base marks a repeater retransmission; it
/// is rewritten to the canonical value so both copies deduplicate to one
/// frame.
pub(crate) fn analyze(b: &Bucket, sc: &mut Scratch) -> Option<Protocol> {
    if !unframe(b, Framing::EvenParity, sc) {
        return None;
    }
    sc.oby -= 1; // split off the checksum byte
    if sc.oby < 4 {
        return None;
    }
    let csum = sc.obuf[sc.oby];
    let fs_csum = cksum1(6, sc.payload());
    if fs_csum == csum {
        Some(Protocol::Fs20)
    } else if fs_csum.wrapping_add(1) == csum {
        sc.obuf[sc.oby] = fs_csum;
        Some(Protocol::Fs20)
    } else if cksum1(12, sc.payload()) == csum {
        Some(Protocol::Fht)
    } else {
        None
    }
}
