//! Reply checksum
//!
//! The control unit appends one checksum byte to every data reply: the sum of
//! the payload bytes, masked to the low nibble and biased into `'0'..='?'`.

use super::CMD_TERMINATOR;

/// Offset that keeps the checksum byte printable
const CHECKSUM_BIAS: u8 = 0x30;

/// Calculate the checksum byte for a payload
pub fn checksum(payload: &[u8]) -> u8 {
    let sum = payload.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    (sum & 0x0F) | CHECKSUM_BIAS
}

/// Frame a payload as `<payload><checksum>$`
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(payload.len() + 2);
    bytes.extend_from_slice(payload);
    bytes.push(checksum(payload));
    bytes.push(CMD_TERMINATOR);
    bytes
}

/// Check a received checksum byte against its payload
pub fn verify(payload: &[u8], checksum_byte: u8) -> bool {
    checksum(payload) == checksum_byte
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_checksum() {
        // 0x35 + 0x33 + 0x32 + 0x31 = 0xCB
        assert_eq!(checksum(b"5321"), b';');
        assert_eq!(frame(b"5321"), b"5321;$".to_vec());
    }

    #[test]
    fn test_checksum_range() {
        for b in 0..=255u8 {
            let c = checksum(&[b, b.wrapping_mul(7), 0xFF]);
            assert!((0x30..=0x3F).contains(&c), "checksum {c:#04x} out of range");
        }
    }

    #[test]
    fn test_empty_payload() {
        assert_eq!(checksum(b""), b'0');
        assert_eq!(frame(b""), b"0$".to_vec());
    }

    #[test]
    fn test_depends_only_on_sum_mod_16() {
        // 0x01 and 0x11 differ only above the low nibble
        assert_eq!(checksum(&[0x01]), checksum(&[0x11]));
        assert_eq!(checksum(&[0x08, 0x08]), checksum(&[0x10]));
        assert_ne!(checksum(&[0x01]), checksum(&[0x02]));
    }

    #[test]
    fn test_permutation_invariant() {
        assert_eq!(checksum(b"AB"), checksum(b"BA"));
        assert_eq!(
            checksum(b":TTTTTTVVSMBBAXX"),
            checksum(b"XXABBMSVVTTTTTT:")
        );
    }

    #[test]
    fn test_accumulator_wraps() {
        let payload = [0xFFu8; 64];
        // 64 * 0xFF = 0x3FC0, low nibble 0
        assert_eq!(checksum(&payload), b'0');
    }

    #[test]
    fn test_verify() {
        let c = checksum(b"FBBBBBBBBG");
        assert!(verify(b"FBBBBBBBBG", c));
        assert!(!verify(b"FBBBBBBBBG", c ^ 0x01));
    }
}
