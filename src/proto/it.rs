//! InterTechno remote frames: raw pass-through, 3 bytes for V1 and 8 for
//! V3, validated by shape only.

use super::Scratch;
use crate::rx::bucket::{Bucket, BucketState};

pub(crate) fn analyze(b: &Bucket, sc: &mut Scratch) -> bool {
    let ok = (b.state == BucketState::It && b.byteidx == 3 && b.bitidx == 7)
        || (b.state == BucketState::ItV3 && b.byteidx == 8 && b.bitidx == 7);
    if !ok {
        return false;
    }
    let n = b.byteidx as usize;
    sc.obuf[..n].copy_from_slice(&b.data[..n]);
    sc.oby = n;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::testutil::*;

    #[test]
    fn v1_is_three_raw_bytes() {
        let mut bits = std::vec::Vec::new();
        for &v in &[0x23u8, 0x5C, 0x0F] {
            bits.extend(byte_bits_msb(v));
        }
        let b = bucket_from_bits(BucketState::It, &bits);
        let mut sc = Scratch::new();
        assert!(analyze(&b, &mut sc));
        assert_eq!(sc.payload(), &[0x23, 0x5C, 0x0F]);
    }

    #[test]
    fn v3_is_eight_raw_bytes() {
        let mut bits = std::vec::Vec::new();
        for v in 0..8u8 {
            bits.extend(byte_bits_msb(v.wrapping_mul(0x31)));
        }
        let b = bucket_from_bits(BucketState::ItV3, &bits);
        let mut sc = Scratch::new();
        assert!(analyze(&b, &mut sc));
        assert_eq!(sc.oby, 8);
    }

    #[test]
    fn partial_frame_rejects() {
        let bits = [true; 20];
        let b = bucket_from_bits(BucketState::It, &bits);
        let mut sc = Scratch::new();
        assert!(!analyze(&b, &mut sc));
    }

    #[test]
    fn v1_length_on_v3_state_rejects() {
        let bits = [true; 24];
        let b = bucket_from_bits(BucketState::ItV3, &bits);
        let mut sc = Scratch::new();
        assert!(!analyze(&b, &mut sc));
    }
}
