//! TCM97001 weather sensor frames: three raw bytes, shape only.

use super::Scratch;
use crate::rx::bucket::{Bucket, BucketState};

pub(crate) fn analyze(b: &Bucket, sc: &mut Scratch) -> bool {
    if b.state != BucketState::Tcm97001 || b.byteidx != 3 || b.bitidx != 7 {
        return false;
    }
    sc.obuf[..3].copy_from_slice(&b.data[..3]);
    sc.oby = 3;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::testutil::*;

    #[test]
    fn three_raw_bytes_pass_through() {
        let mut bits = std::vec::Vec::new();
        for &v in &[0x4Eu8, 0x81, 0x13] {
            bits.extend(byte_bits_msb(v));
        }
        let b = bucket_from_bits(BucketState::Tcm97001, &bits);
        let mut sc = Scratch::new();
        assert!(analyze(&b, &mut sc));
        assert_eq!(sc.payload(), &[0x4E, 0x81, 0x13]);
    }

    #[test]
    fn wrong_state_rejects() {
        let bits = [false; 24];
        let b = bucket_from_bits(BucketState::Collect, &bits);
        let mut sc = Scratch::new();
        assert!(!analyze(&b, &mut sc));
    }

    #[test]
    fn wrong_length_rejects() {
        let bits = [false; 25];
        let b = bucket_from_bits(BucketState::Tcm97001, &bits);
        let mut sc = Scratch::new();
        assert!(!analyze(&b, &mut sc));
    }
}
