//! Response frame decoders, one module per command.
//!
//! Multi-byte fields are little-endian on the wire. Decoders read them by
//! reversing the byte range and interpreting the result as big-endian,
//! which works the same for any range width, cell pairs included.

pub(crate) mod battery_info;
pub(crate) mod serial_number;
pub(crate) mod version;

use crate::error::DecodeError;

/// Reverse `bytes` and interpret the result as a big-endian unsigned
/// integer.
pub(crate) fn uint_from_reversed(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .rev()
        .fold(0, |n, &byte| (n << 8) | u64::from(byte))
}

/// Reversed copy of a 4-byte flag field.
pub(crate) fn reversed_flags(bytes: &[u8]) -> [u8; 4] {
    [bytes[3], bytes[2], bytes[1], bytes[0]]
}

/// Reject frames below the decoder's minimum length.
pub(crate) fn ensure_len(frame: &[u8], expected: usize) -> Result<(), DecodeError> {
    if frame.len() < expected {
        return Err(DecodeError::FrameTooShort {
            expected,
            actual: frame.len(),
        });
    }
    Ok(())
}

#[test]
fn test_uint_from_reversed() {
    assert_eq!(uint_from_reversed(&[0x0A, 0x0D]), 0x0D0A);
    assert_eq!(uint_from_reversed(&[0x1C, 0x34, 0x00, 0x00]), 0x341C);
    assert_eq!(uint_from_reversed(&[0x00]), 0);
}

#[test]
fn test_reversed_flags() {
    assert_eq!(reversed_flags(&[1, 2, 3, 4]), [4, 3, 2, 1]);
}
