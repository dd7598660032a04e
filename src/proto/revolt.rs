//! Revolt power meter frames: eleven payload bytes plus an additive
//! checksum byte.

use super::Scratch;
use crate::rx::bucket::{Bucket, BucketState};

pub(crate) fn analyze(b: &Bucket, sc: &mut Scratch) -> bool {
    if b.byteidx != 12 || b.state != BucketState::Revolt || b.bitidx != 0 {
        return false;
    }
    let mut sum = 0u8;
    for (oby, &d) in b.data[..11].iter().enumerate() {
        sum = sum.wrapping_add(d);
        sc.obuf[oby] = d;
    }
    sc.oby = 11;
    sum == b.data[11]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::testutil::*;

    fn frame(payload: &[u8; 11]) -> std::vec::Vec<bool> {
        let sum = payload.iter().fold(0u8, |s, &d| s.wrapping_add(d));
        let mut bits = std::vec::Vec::new();
        for &v in payload.iter().chain(core::iter::once(&sum)) {
            bits.extend(byte_bits_msb(v));
        }
        // the sender keeps clocking bits into the silence window
        bits.extend([false; 7]);
        bits
    }

    const PAYLOAD: [u8; 11] = [
        0x2A, 0x04, 0x33, 0x90, 0x00, 0x17, 0x02, 0x41, 0x05, 0x0C, 0x60,
    ];

    #[test]
    fn additive_checksum_accepts() {
        let b = bucket_from_bits(BucketState::Revolt, &frame(&PAYLOAD));
        let mut sc = Scratch::new();
        assert!(analyze(&b, &mut sc));
        assert_eq!(sc.payload(), &PAYLOAD);
    }

    #[test]
    fn checksum_mismatch_rejects() {
        let mut bits = frame(&PAYLOAD);
        // flip a payload bit, keep the stored checksum
        bits[3] = !bits[3];
        let b = bucket_from_bits(BucketState::Revolt, &bits);
        let mut sc = Scratch::new();
        assert!(!analyze(&b, &mut sc));
    }

    #[test]
    fn wrong_cursor_rejects() {
        let mut bits = frame(&PAYLOAD);
        bits.pop();
        let b = bucket_from_bits(BucketState::Revolt, &bits);
        let mut sc = Scratch::new();
        assert!(!analyze(&b, &mut sc));
    }
}
