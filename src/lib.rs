//! # qrstep
//!
//! A Rust library that turns Unicode text into a fully specified QR Code symbol.
//!
//! `qrstep` follows the QR Code Model 2 standard for versions 1 to 40 and all four error
//! correction levels. Every intermediate stage stays inspectable: the optimal segment list, the
//! interleaved codeword stream with block roles, the typed module grid, and the penalty
//! breakdown of all eight mask candidates.
//!
//! ## Features
//!
//! - Optimal segmentation across numeric, alphanumeric, byte and kanji modes.
//! - Smallest-version selection within a caller-given version range.
//! - Reed-Solomon error correction over GF(256) with block interleaving.
//! - Typed module grid (finder, timing, alignment, format, version, codeword, remainder).
//! - Automatic mask selection by the four penalty rules, or a fixed mask.
//! - Optional `image` feature: copy a symbol into an in-memory grayscale buffer.
//!
//! ## Example
//!
//! ```rust
//! use qrstep::{ErrorCorrectionLevel, QrSymbol, SegmentMode, Version};
//!
//! let qr = QrSymbol::encode(
//!     "31415926535897932384626433832795028841971693993",
//!     ErrorCorrectionLevel::Quartile,
//!     Version::MIN,
//!     Version::MAX,
//! ).unwrap();
//!
//! assert_eq!(qr.segments()[0].mode(), SegmentMode::Numeric);
//! println!("Version: {}, mask: {:?}", qr.version().value(), qr.mask());
//! ```
//!
//! ## Modules
//!
//! - [`qrcode`]: The module grid, drawing phases, masking and the `encode*` entry points.
//! - [`segment`] and [`segmenter`]: Segments and the optimal segmentation.
//! - [`bitstream`]: Data codeword assembly.
//! - [`ecc`]: Error correction levels, Reed-Solomon coding and interleaving.
//! - [`penalty`]: Mask penalty scoring.
//! - [`version`]: Versions, masks and capacity search.
//! - `helper` (feature `image`): In-memory image buffers.

#![forbid(unsafe_code)]

pub mod bitstream;
pub mod ecc;
pub mod error;
#[cfg(feature = "image")]
pub mod helper;
pub mod penalty;
pub mod qrcode;
pub mod segment;
pub mod segmenter;
pub mod version;

pub use ecc::{Codeword, CodewordRole, ErrorCorrectionLevel};
pub use error::EncodeError;
pub use penalty::PenaltyInfo;
pub use qrcode::{EncodeOptions, FunctionKind, Module, QrSymbol};
pub use segment::{CodePoint, Segment, SegmentMode};
pub use version::{Mask, Version};
