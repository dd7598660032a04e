//! KS300 / S300 weather station frames.
//!
//! Nibble-framed stream; the last bit of a frame has no trailing rising
//! edge, so the decode speculatively appends the most plausible value and
//! rolls it back when the frame does not check out.

use super::{unframe, Framing, Scratch};
use crate::rx::bucket::Bucket;
use crate::rx::wave::Pulse;

/// Nibble checksum: XOR and additive halves packed into one byte. With a
/// trailing half byte the low nibble of the last byte is left out.
pub fn cksum3(buf: &[u8], nibble: bool) -> u8 {
    let mut x = 0u8;
    let mut y = 5u8;
    for (cnt, &d) in buf.iter().rev().enumerate() {
        x ^= d >> 4;
        y = y.wrapping_add(d >> 4);
        if !nibble || cnt != 0 {
            x ^= d & 0xf;
            y = y.wrapping_add(d & 0xf);
        }
    }
    y = y.wrapping_add(x);
    (y << 4) | x
}

/// `hightime` is the high time of the hanging final half-cell; the
/// speculative bit is a 1 iff it fits the one template.
pub(crate) fn analyze(b: &mut Bucket, sc: &mut Scratch, hightime: Pulse) -> bool {
    let bit = b.one.matches(hightime, b.one.lowtime, b.state.tolerance());
    if !b.addbit(bit) {
        return false;
    }
    if unframe(b, Framing::NibbleStop, sc) {
        sc.oby -= 1;
        let csum = sc.obuf[sc.oby - sc.nibble as usize];
        if cksum3(sc.payload(), sc.nibble) == csum {
            return true;
        }
    }
    b.delbit();
    false
}
