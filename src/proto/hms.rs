//! HMS sensor frames: six LSB-first payload bytes, each guarded by an
//! even-parity bit and a mandatory zero bit, closed by an XOR byte with
//! its own parity.

use super::Scratch;
use crate::rx::bits::{parity_even_bit, BitReader};
use crate::rx::bucket::Bucket;

pub(crate) fn analyze(b: &Bucket, sc: &mut Scratch) -> bool {
    if b.bit_len() < 69 {
        return false;
    }
    let mut input = BitReader::new(&b.data);

    let mut crc = 0u8;
    for oby in 0..6 {
        let byte = input.getbits_lsb(8);
        if parity_even_bit(byte) != input.getbit() {
            return false;
        }
        if input.getbit() {
            return false;
        }
        sc.obuf[oby] = byte;
        crc ^= byte;
    }
    sc.oby = 6;

    let check = input.getbits_lsb(8);
    if parity_even_bit(check) != input.getbit() {
        return false;
    }
    crc == check
}
