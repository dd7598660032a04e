//! Hoermann garage door remotes.
//!
//! The encoding is not understood beyond its outer shape (a 960/480 µs
//! zero cell and 36 collected bits plus one hanging high); the five raw
//! bytes are passed through without content validation.

use super::Scratch;
use crate::rx::bucket::Bucket;
use crate::rx::wave::{tscale, Pulse};

pub(crate) fn analyze(b: &mut Bucket, sc: &mut Scratch, hightime: Pulse) -> bool {
    if b.byteidx != 4
        || b.bitidx != 4
        || !b.zero.matches(tscale(960), tscale(480), b.state.tolerance())
    {
        return false;
    }
    let bit = b.one.matches(hightime, tscale(480), b.state.tolerance());
    if !b.addbit(bit) {
        return false;
    }
    sc.obuf[..5].copy_from_slice(&b.data[..5]);
    sc.oby = 5;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::testutil::*;
    use crate::rx::bucket::BucketState;
    use crate::rx::wave::Wave;

    fn shaped_bucket() -> Bucket {
        let mut bits = std::vec::Vec::new();
        for &v in &[0x11u8, 0x22, 0x44, 0x88] {
            bits.extend(byte_bits_msb(v));
        }
        bits.extend([true, false, true]);
        let mut b = bucket_from_bits(BucketState::Collect, &bits);
        b.zero = Wave::new(tscale(960), tscale(480));
        b.one = Wave::new(tscale(480), tscale(960));
        b
    }

    #[test]
    fn shape_match_copies_five_bytes() {
        let mut b = shaped_bucket();
        let mut sc = Scratch::new();
        // hanging high matches the one template: final bit is a 1
        assert!(analyze(&mut b, &mut sc, tscale(480)));
        assert_eq!(sc.oby, 5);
        assert_eq!(&sc.obuf[..4], &[0x11, 0x22, 0x44, 0x88]);
        assert_eq!(sc.obuf[4], 0xB0);
    }

    #[test]
    fn wrong_zero_template_rejects() {
        let mut b = shaped_bucket();
        b.zero = Wave::new(30, 30);
        let mut sc = Scratch::new();
        assert!(!analyze(&mut b, &mut sc, tscale(480)));
    }

    #[test]
    fn wrong_cursor_rejects() {
        let mut b = shaped_bucket();
        b.delbit();
        let mut sc = Scratch::new();
        assert!(!analyze(&mut b, &mut sc, tscale(480)));
    }
}
