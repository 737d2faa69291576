//! Serialization of segments into the padded sequence of data codewords.

use core::convert::TryFrom;

use crate::ecc::{num_data_codewords, ErrorCorrectionLevel};
use crate::segment::Segment;
use crate::version::Version;

/// An appendable sequence of bits (0s and 1s).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitBuffer(Vec<bool>);

impl BitBuffer {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self(Vec::with_capacity(bits))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends the given number of low-order bits of the given value, most significant first.
    ///
    /// # Panics
    ///
    /// Panics if `len > 31` or `val` does not fit in `len` bits.
    pub fn append_bits(&mut self, val: u32, len: u8) {
        assert!(len <= 31 && (val >> len) == 0, "Value out of range");
        self.0.extend((0..len).rev().map(|i| ((val >> i) & 1) != 0));
    }

    pub fn extend_from_slice(&mut self, bits: &[bool]) {
        self.0.extend_from_slice(bits);
    }

    pub fn into_bits(self) -> Vec<bool> {
        self.0
    }

    /// Packs the bits into bytes, big endian. The length must be a multiple of 8.
    pub fn to_bytes(&self) -> Vec<u8> {
        debug_assert_eq!(self.0.len() % 8, 0);
        let mut result = vec![0u8; self.0.len() / 8];
        for (i, &bit) in self.0.iter().enumerate() {
            result[i >> 3] |= u8::from(bit) << (7 - (i & 7));
        }
        result
    }
}

/// Concatenates the segments, then adds the terminator, byte alignment and 0xEC/0x11 padding
/// so that the result is exactly the data capacity of `version` at `ecl`.
///
/// # Panics
///
/// Panics if the segments do not fit in that capacity.
pub fn assemble_data_codewords(
    segs: &[Segment],
    version: Version,
    ecl: ErrorCorrectionLevel,
) -> Vec<u8> {
    let datacapacitybits: usize = num_data_codewords(version, ecl) * 8;
    let mut bb = BitBuffer::with_capacity(datacapacitybits);
    for seg in segs {
        bb.append_bits(seg.mode().mode_bits(), 4);
        bb.append_bits(
            u32::try_from(seg.num_chars()).unwrap(),
            seg.mode().num_char_count_bits(version),
        );
        bb.extend_from_slice(seg.data());
    }
    debug_assert_eq!(Some(bb.len()), Segment::total_bits(segs, version));
    assert!(bb.len() <= datacapacitybits, "Data exceeds capacity");

    // Add terminator and pad up to a byte if applicable
    let numzerobits: usize = core::cmp::min(4, datacapacitybits - bb.len());
    bb.append_bits(0, u8::try_from(numzerobits).unwrap());
    let numzerobits: usize = bb.len().wrapping_neg() & 7;
    bb.append_bits(0, u8::try_from(numzerobits).unwrap());
    debug_assert_eq!(bb.len() % 8, 0);

    // Pad with alternating bytes until data capacity is reached
    for &padbyte in [0xec, 0x11].iter().cycle() {
        if bb.len() >= datacapacitybits {
            break;
        }
        bb.append_bits(padbyte, 8);
    }
    debug_assert_eq!(bb.len(), datacapacitybits);
    bb.to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_bits() {
        let mut bb = BitBuffer::new();
        bb.append_bits(0b101, 3);
        bb.append_bits(0, 0);
        bb.append_bits(0x1f, 5);
        assert_eq!(bb.len(), 8);
        assert_eq!(bb.to_bytes(), [0b1011_1111]);
    }

    #[test]
    #[should_panic(expected = "Value out of range")]
    fn test_append_bits_overflow() {
        BitBuffer::new().append_bits(4, 2);
    }

    #[test]
    fn test_hello_world_1m() {
        let segs = [Segment::make_alphanumeric("HELLO WORLD")];
        let data = assemble_data_codewords(&segs, Version::new(1), ErrorCorrectionLevel::Medium);
        assert_eq!(
            data,
            [32, 91, 11, 120, 209, 114, 220, 77, 67, 64, 236, 17, 236, 17, 236, 17]
        );
    }

    #[test]
    fn test_empty_byte_segment() {
        let segs = [Segment::make_bytes(&[])];
        let data = assemble_data_codewords(&segs, Version::new(1), ErrorCorrectionLevel::Low);
        assert_eq!(data.len(), 19);
        // 0100 00000000 0000 then padding
        assert_eq!(&data[..4], &[0x40, 0x00, 0xec, 0x11]);
    }

    #[test]
    fn test_terminator_truncated_at_capacity() {
        // 17 bytes use 148 of the 152 bits at 1-L, leaving exactly the 4-bit terminator.
        let segs = [Segment::make_bytes(&[0xff; 17])];
        let data = assemble_data_codewords(&segs, Version::new(1), ErrorCorrectionLevel::Low);
        assert_eq!(data.len(), 19);
        assert_eq!(data[18], 0xf0);
    }
}
