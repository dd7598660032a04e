//! LaCrosse TX3 sensor frames: 7-bit first and last byte, a fixed 0xA
//! header nibble and a nibble-sum fold.

use super::Scratch;
use crate::rx::bits::BitReader;
use crate::rx::bucket::Bucket;

pub(crate) fn analyze(b: &Bucket, sc: &mut Scratch) -> bool {
    if b.byteidx != 4 || b.bitidx != 1 {
        return false;
    }
    let mut input = BitReader::new(&b.data);

    let mut crc = 0u8;
    for oby in 0..4 {
        let n = if oby == 0 {
            0x80 | input.getbits_msb(7)
        } else {
            input.getbits_msb(8)
        };
        crc = crc.wrapping_add(n >> 4).wrapping_add(n & 0xf);
        sc.obuf[oby] = n;
    }
    sc.obuf[4] = input.getbits_msb(7) << 1;
    crc = crc.wrapping_add(sc.obuf[4] >> 4) & 0xf;
    sc.oby = 5;

    (crc >> 4) == 0 && (sc.obuf[0] >> 4) == 0xA
}
