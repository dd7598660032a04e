//! EM power meter frames: nine payload bytes guarded by an XOR byte.

use super::{unframe, Framing, Scratch};
use crate::rx::bucket::Bucket;

/// XOR checksum over `buf`.
pub fn cksum2(buf: &[u8]) -> u8 {
    buf.iter().fold(0, |s, &d| s ^ d)
}

pub(crate) fn analyze(b: &Bucket, sc: &mut Scratch) -> bool {
    if !unframe(b, Framing::ByteStop, sc) {
        return false;
    }
    sc.oby -= 1; // split off the checksum byte
    sc.oby == 9 && cksum2(sc.payload()) == sc.obuf[sc.oby]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::testutil::*;
    use crate::rx::bucket::BucketState;

    fn frame(payload: &[u8], csum: u8, last_stop: bool) -> Bucket {
        let mut bits = std::vec::Vec::new();
        for &v in payload.iter().chain(core::iter::once(&csum)) {
            bits.extend(byte_bits_lsb(v));
            bits.push(true);
        }
        if !last_stop {
            bits.pop();
        }
        bucket_from_bits(BucketState::Collect, &bits)
    }

    const PAYLOAD: [u8; 9] = [0x01, 0x02, 0x10, 0x05, 0x33, 0x00, 0x00, 0x12, 0x9A];

    #[test]
    fn xor_checksum_accepts() {
        let b = frame(&PAYLOAD, cksum2(&PAYLOAD), true);
        let mut sc = Scratch::new();
        assert!(analyze(&b, &mut sc));
        assert_eq!(sc.payload(), &PAYLOAD);
    }

    #[test]
    fn final_stop_bit_may_fall_into_the_silence() {
        let b = frame(&PAYLOAD, cksum2(&PAYLOAD), false);
        let mut sc = Scratch::new();
        assert!(analyze(&b, &mut sc));
        assert_eq!(sc.payload(), &PAYLOAD);
    }

    #[test]
    fn wrong_length_rejects() {
        let short = &PAYLOAD[..7];
        let b = frame(short, cksum2(short), true);
        let mut sc = Scratch::new();
        assert!(!analyze(&b, &mut sc));
    }

    #[test]
    fn wrong_checksum_rejects() {
        let b = frame(&PAYLOAD, cksum2(&PAYLOAD) ^ 0x40, true);
        let mut sc = Scratch::new();
        assert!(!analyze(&b, &mut sc));
    }
}
