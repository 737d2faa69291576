use thiserror::Error;

/// Error returned when the text cannot fit into any version in the requested range.
/// Every variant is a way of being too long; match on them for the details.
///
/// Ways to handle this error include:
///
/// - Decrease the error correction level if it was greater than `ErrorCorrectionLevel::Low`.
/// - Increase the maximum version if it was less than `Version::MAX`.
/// - Change the text to be shorter, or to fit a denser character set (e.g. alphanumeric).
/// - Propagate the error upward to the caller/user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// A segment's character count does not fit its count field at any version tried.
    #[error("segment too long for its character count field")]
    SegmentTooLong,
    /// The encoded bits exceed the capacity of the largest version tried.
    #[error("data length = {used} bits, max capacity = {capacity} bits")]
    DataOverCapacity { used: usize, capacity: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = EncodeError::DataOverCapacity { used: 200, capacity: 152 };
        assert_eq!(err.to_string(), "data length = 200 bits, max capacity = 152 bits");
        assert_eq!(
            EncodeError::SegmentTooLong.to_string(),
            "segment too long for its character count field"
        );
    }
}
