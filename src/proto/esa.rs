//! ESA energy monitor frames.
//!
//! The payload arrives scrambled: every byte is XORed with a salt chained
//! off the previous raw byte. An additive CRC runs over the raw stream and
//! must cancel against the big-endian trailer.

use super::Scratch;
use crate::rx::bits::BitReader;
use crate::rx::bucket::{Bucket, BucketState};

#[cfg(not(feature = "gira"))]
const BITLEN: u16 = 144;
#[cfg(not(feature = "gira"))]
const DATALEN: usize = 15;
#[cfg(not(feature = "gira"))]
const CRC_INIT: u16 = 0xf00f;

#[cfg(feature = "gira")]
const BITLEN: u16 = 160;
#[cfg(feature = "gira")]
const DATALEN: usize = 17;
#[cfg(feature = "gira")]
const CRC_INIT: u16 = 0xee11;

pub(crate) fn analyze(b: &Bucket, sc: &mut Scratch) -> bool {
    if b.state != BucketState::Esa || b.bit_len() != BITLEN {
        return false;
    }
    let mut input = BitReader::new(&b.data);

    let mut salt = 0x89u8;
    let mut crc = CRC_INIT;
    for oby in 0..DATALEN {
        let byte = input.getbits_msb(8);
        crc = crc.wrapping_add(byte as u16);
        sc.obuf[oby] = byte ^ salt;
        salt = byte.wrapping_add(0x24);
    }
    let byte = input.getbits_msb(8);
    crc = crc.wrapping_add(byte as u16);
    sc.obuf[DATALEN] = byte ^ 0xff;
    sc.oby = DATALEN + 1;

    crc = crc.wrapping_sub((input.getbits_msb(8) as u16) << 8);
    crc = crc.wrapping_sub(input.getbits_msb(8) as u16);
    crc == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::testutil::*;

    /// Scramble a plain payload into the raw stream and close it with the
    /// matching CRC trailer.
    fn raw_frame(plain: &[u8]) -> std::vec::Vec<u8> {
        assert_eq!(plain.len(), DATALEN + 1);
        let mut raw = std::vec::Vec::new();
        let mut salt = 0x89u8;
        for &p in &plain[..DATALEN] {
            let byte = p ^ salt;
            raw.push(byte);
            salt = byte.wrapping_add(0x24);
        }
        raw.push(plain[DATALEN] ^ 0xff);
        let crc: u16 = raw
            .iter()
            .fold(CRC_INIT, |c, &b| c.wrapping_add(b as u16));
        raw.push((crc >> 8) as u8);
        raw.push((crc & 0xff) as u8);
        raw
    }

    fn bucket_of(raw: &[u8]) -> Bucket {
        let mut bits = std::vec::Vec::new();
        for &v in raw {
            bits.extend(byte_bits_msb(v));
        }
        bucket_from_bits(BucketState::Esa, &bits)
    }

    #[test]
    fn descrambles_and_validates() {
        let mut plain = std::vec::Vec::new();
        for i in 0..DATALEN + 1 {
            plain.push((i as u8).wrapping_mul(0x1F).wrapping_add(3));
        }
        let b = bucket_of(&raw_frame(&plain));
        let mut sc = Scratch::new();
        assert!(analyze(&b, &mut sc));
        assert_eq!(sc.payload(), &plain[..]);
    }

    #[test]
    fn wrong_bit_count_rejects() {
        let plain = std::vec::Vec::from([0u8; DATALEN + 1]);
        let raw = raw_frame(&plain);
        let mut bits = std::vec::Vec::new();
        for &v in &raw {
            bits.extend(byte_bits_msb(v));
        }
        bits.pop(); // one bit short of a full frame
        let b = bucket_from_bits(BucketState::Esa, &bits);
        let mut sc = Scratch::new();
        assert!(!analyze(&b, &mut sc));
    }

    #[test]
    fn wrong_state_rejects() {
        let plain = std::vec::Vec::from([0u8; DATALEN + 1]);
        let b = {
            let mut b = bucket_of(&raw_frame(&plain));
            b.state = BucketState::Collect;
            b
        };
        let mut sc = Scratch::new();
        assert!(!analyze(&b, &mut sc));
    }

    #[test]
    fn crc_trailer_mismatch_rejects() {
        let plain = std::vec::Vec::from([0x11u8; DATALEN + 1]);
        let mut raw = raw_frame(&plain);
        let n = raw.len();
        raw[n - 1] = raw[n - 1].wrapping_add(1);
        let b = bucket_of(&raw);
        let mut sc = Scratch::new();
        assert!(!analyze(&b, &mut sc));
    }
}
