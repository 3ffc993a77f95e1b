//! Settings checksum
//!
//! CRC-16 with polynomial 0x1021, MSB first, no reflection and no final
//! XOR. The caller owns the running value and picks the seed; seeded
//! with 0 this is CRC-16/XMODEM.

const POLY: u16 = 0x1021;

/// Fold `data` into the running checksum `crc`
///
/// Folding is associative over concatenation: folding `a` then `b`
/// gives the same value as folding `a ++ b` once.
pub fn crc16(crc: &mut u16, data: &[u8]) {
    for &byte in data {
        *crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if *crc & 0x8000 != 0 {
                *crc = (*crc << 1) ^ POLY;
            } else {
                *crc <<= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_value() {
        let mut crc = 0;
        crc16(&mut crc, b"123456789");
        assert_eq!(crc, 0x31C3);
    }

    #[test]
    fn test_empty_leaves_value() {
        let mut crc = 0xBEEF;
        crc16(&mut crc, &[]);
        assert_eq!(crc, 0xBEEF);
    }

    #[test]
    fn test_split_matches_whole() {
        let mut whole = 0;
        crc16(&mut whole, b"123456789");

        let mut split = 0;
        crc16(&mut split, b"1234");
        crc16(&mut split, b"56789");
        assert_eq!(split, whole);
    }
}
