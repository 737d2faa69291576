//! Symbol versions, mask patterns, and the capacity search over versions.

use crate::ecc::{num_data_codewords, ErrorCorrectionLevel};
use crate::error::EncodeError;
use crate::segment::Segment;

/// A QR code version (1–40).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Version(u8);

impl Version {
    /// The minimum version number supported in the QR Code Model 2 standard.
    pub const MIN: Version = Version(1);

    /// The maximum version number supported in the QR Code Model 2 standard.
    pub const MAX: Version = Version(40);

    /// Creates a version object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [1, 40].
    pub const fn new(ver: u8) -> Self {
        assert!(
            Version::MIN.value() <= ver && ver <= Version::MAX.value(),
            "Version number out of range"
        );
        Self(ver)
    }

    /// Returns the value, which is in the range [1, 40].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Side length of the symbol in modules, `version * 4 + 17`.
    pub const fn size(self) -> i32 {
        (self.0 as i32) * 4 + 17
    }

    /// The next version, or `None` at version 40.
    pub fn next(self) -> Option<Version> {
        (self < Version::MAX).then(|| Version(self.0 + 1))
    }

    /// Index into the three character-count width tiers: 1–9, 10–26, 27–40.
    pub(crate) fn tier(self) -> usize {
        usize::from((self.0 + 7) / 17)
    }

    /// The last version of this version's tier.
    pub(crate) fn tier_end(self) -> Version {
        Version([9, 26, 40][self.tier()])
    }

    /// Number of modules available for data and ECC bits, remainder bits included.
    /// Everything except the function patterns.
    pub fn num_raw_data_modules(self) -> usize {
        let ver = usize::from(self.0);
        let mut result: usize = (16 * ver + 128) * ver + 64;
        if ver >= 2 {
            let numalign: usize = ver / 7 + 2;
            result -= (25 * numalign - 10) * numalign - 55;
            if ver >= 7 {
                result -= 36;
            }
        }
        debug_assert!((208..=29648).contains(&result));
        result
    }

    /// Number of 8-bit codewords (data plus ECC) the symbol holds.
    pub fn num_raw_codewords(self) -> usize {
        self.num_raw_data_modules() / 8
    }

    /// Ascending centre coordinates of the alignment patterns, used for both axes.
    /// Empty for version 1.
    pub fn alignment_pattern_positions(self) -> Vec<i32> {
        let ver = i32::from(self.0);
        if ver == 1 {
            return Vec::new();
        }
        let numalign: i32 = ver / 7 + 2;
        let step: i32 = if ver == 32 {
            26
        } else {
            ((ver * 4 + numalign * 2 + 1) / (numalign * 2 - 2)) * 2
        };
        let size = self.size();
        let mut result: Vec<i32> = (0..numalign - 1).map(|i| size - 7 - i * step).collect();
        result.push(6);
        result.reverse();
        result
    }
}

/// A mask pattern (0–7).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Mask(u8);

impl Mask {
    /// All eight patterns in index order.
    pub const ALL: [Mask; 8] = [
        Mask(0),
        Mask(1),
        Mask(2),
        Mask(3),
        Mask(4),
        Mask(5),
        Mask(6),
        Mask(7),
    ];

    /// Creates a mask object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [0, 7].
    pub const fn new(mask: u8) -> Self {
        assert!(mask <= 7, "Mask value out of range");
        Self(mask)
    }

    /// Returns the value, which is in the range [0, 7].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Whether this pattern inverts the module at column `x`, row `y`.
    pub fn inverts(self, x: i32, y: i32) -> bool {
        match self.0 {
            0 => (x + y) % 2 == 0,
            1 => y % 2 == 0,
            2 => x % 3 == 0,
            3 => (x + y) % 3 == 0,
            4 => (x / 3 + y / 2) % 2 == 0,
            5 => ((x * y) % 2) + ((x * y) % 3) == 0,
            6 => (((x * y) % 2) + ((x * y) % 3)) % 2 == 0,
            7 => (((x + y) % 2) + ((x * y) % 3)) % 2 == 0,
            _ => unreachable!(),
        }
    }
}

/// Finds the smallest version in `[min, max]` whose data capacity at `ecl` holds `segs`.
///
/// A version where some segment overflows its character count field is infeasible.
pub fn select_version(
    segs: &[Segment],
    ecl: ErrorCorrectionLevel,
    min: Version,
    max: Version,
) -> Result<Version, EncodeError> {
    assert!(min <= max, "Invalid value");
    let mut version = min;
    loop {
        let capacity = num_data_codewords(version, ecl) * 8;
        let used = Segment::total_bits(segs, version);
        if used.map_or(false, |n| n <= capacity) {
            return Ok(version);
        }
        match version.next() {
            Some(v) if version < max => version = v,
            _ => {
                return Err(match used {
                    None => EncodeError::SegmentTooLong,
                    Some(used) => EncodeError::DataOverCapacity { used, capacity },
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(1, &[])]
    #[test_case(2, &[6, 18])]
    #[test_case(7, &[6, 22, 38])]
    #[test_case(32, &[6, 34, 60, 86, 112, 138])]
    #[test_case(40, &[6, 30, 58, 86, 114, 142, 170])]
    fn test_alignment_positions(ver: u8, expected: &[i32]) {
        assert_eq!(Version::new(ver).alignment_pattern_positions(), expected);
    }

    #[test]
    fn test_raw_modules() {
        assert_eq!(Version::new(1).num_raw_data_modules(), 208);
        assert_eq!(Version::new(1).num_raw_codewords(), 26);
        assert_eq!(Version::new(7).num_raw_codewords(), 196);
        assert_eq!(Version::MAX.num_raw_codewords(), 3706);
    }

    #[test]
    fn test_size_and_tier() {
        assert_eq!(Version::MIN.size(), 21);
        assert_eq!(Version::MAX.size(), 177);
        assert_eq!(Version::new(9).tier(), 0);
        assert_eq!(Version::new(10).tier(), 1);
        assert_eq!(Version::new(26).tier(), 1);
        assert_eq!(Version::new(27).tier(), 2);
        assert_eq!(Version::new(1).tier_end(), Version::new(9));
        assert_eq!(Version::new(10).tier_end(), Version::new(26));
        assert_eq!(Version::new(40).tier_end(), Version::MAX);
        assert_eq!(Version::MAX.next(), None);
    }

    #[test]
    #[should_panic(expected = "Version number out of range")]
    fn test_version_zero_panics() {
        let _ = Version::new(0);
    }

    #[test]
    fn test_mask_patterns_at_origin() {
        // Every pattern inverts (0, 0).
        assert!(Mask::ALL.iter().all(|m| m.inverts(0, 0)));
        assert!(!Mask::new(0).inverts(1, 0));
        assert!(Mask::new(2).inverts(3, 1));
    }

    #[test]
    fn test_select_version() {
        let segs = [Segment::make_bytes(&[0u8; 17])];
        let v = select_version(&segs, ErrorCorrectionLevel::Low, Version::MIN, Version::MAX);
        assert_eq!(v, Ok(Version::MIN));
        let segs = [Segment::make_bytes(&[0u8; 18])];
        let v = select_version(&segs, ErrorCorrectionLevel::Low, Version::MIN, Version::MAX);
        assert_eq!(v, Ok(Version::new(2)));
        let err = select_version(&segs, ErrorCorrectionLevel::Low, Version::MIN, Version::MIN);
        assert_eq!(err, Err(EncodeError::DataOverCapacity { used: 156, capacity: 152 }));
    }

    #[test]
    fn test_count_field_overflow_is_infeasible() {
        // 256 bytes overflow the 8-bit count field of versions 1-9.
        let data = vec![0u8; 256];
        let segs = [Segment::make_bytes(&data)];
        let err = select_version(&segs, ErrorCorrectionLevel::Low, Version::MIN, Version::new(9));
        assert_eq!(err, Err(EncodeError::SegmentTooLong));
        let v = select_version(&segs, ErrorCorrectionLevel::Low, Version::MIN, Version::MAX);
        assert_eq!(v, Ok(Version::new(10)));
    }
}
