#![forbid(unsafe_code)]
//! QR code symbol construction.
//!
//! This module owns the module grid and the drawing phases that fill it: timing, finder,
//! alignment, format and version patterns, the zigzag placement of codewords, and mask
//! selection. It also hosts the `encode*` entry points that run the whole pipeline.

use log::{debug, trace};

use crate::bitstream::assemble_data_codewords;
use crate::ecc::{interleave, num_data_codewords, split_into_blocks, Codeword, ErrorCorrectionLevel};
use crate::error::EncodeError;
use crate::penalty::PenaltyInfo;
use crate::segment::Segment;
use crate::segmenter::make_segments_optimally;
use crate::version::{select_version, Mask, Version};

/// The structural role of a function module.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum FunctionKind {
    Finder,
    Separator,
    Timing,
    Alignment,
    FormatInfo,
    VersionInfo,
    DarkModule,
}

/// One cell of the symbol grid.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Module {
    /// Not drawn yet.
    Unfilled,
    /// Fixed structural bit. Never touched by masking.
    Function { kind: FunctionKind, dark: bool },
    /// Bit `bit` (7 = most significant) of codeword `index` in the interleaved stream.
    Codeword { index: usize, bit: u8, dark: bool },
    /// Filler after the last codeword bit. Light before masking.
    Remainder { dark: bool },
    /// Cell of a mask preview grid.
    Mask { invert: bool },
}

impl Module {
    pub fn is_dark(self) -> bool {
        match self {
            Module::Unfilled => false,
            Module::Function { dark, .. } | Module::Codeword { dark, .. } | Module::Remainder { dark } => {
                dark
            }
            Module::Mask { invert } => invert,
        }
    }

    pub fn is_function(self) -> bool {
        matches!(self, Module::Function { .. })
    }

    fn inverted(self) -> Self {
        match self {
            Module::Codeword { index, bit, dark } => Module::Codeword {
                index,
                bit,
                dark: !dark,
            },
            Module::Remainder { dark } => Module::Remainder { dark: !dark },
            other => other,
        }
    }
}

/// Parameters of an encode call.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EncodeOptions {
    pub ecl: ErrorCorrectionLevel,
    pub min_version: Version,
    pub max_version: Version,
    /// `None` selects the mask with the lowest penalty.
    pub mask: Option<Mask>,
    /// Raise the error correction level when it does not increase the version.
    pub boost_ecl: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            ecl: ErrorCorrectionLevel::Low,
            min_version: Version::MIN,
            max_version: Version::MAX,
            mask: None,
            boost_ecl: false,
        }
    }
}

impl EncodeOptions {
    pub fn new(ecl: ErrorCorrectionLevel) -> Self {
        Self {
            ecl,
            ..Self::default()
        }
    }

    pub fn with_version_range(mut self, min: Version, max: Version) -> Self {
        assert!(min <= max, "Invalid value");
        self.min_version = min;
        self.max_version = max;
        self
    }

    pub fn with_mask(mut self, mask: Mask) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn with_boost_ecl(mut self, boost: bool) -> Self {
        self.boost_ecl = boost;
        self
    }
}

/// The 15-bit format information for a level and mask: 5 data bits, 10 BCH check bits,
/// XORed with 0x5412.
pub fn format_bits(ecl: ErrorCorrectionLevel, mask: Mask) -> u32 {
    let data = u32::from((ecl.format_bits() << 3) | mask.value());
    let mut rem: u32 = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * 0x537);
    }
    let bits = ((data << 10) | rem) ^ 0x5412;
    debug_assert_eq!(bits >> 15, 0);
    bits
}

/// The 18-bit version information: 6 data bits and 12 BCH check bits.
pub fn version_bits(ver: Version) -> u32 {
    let data = u32::from(ver.value());
    let mut rem: u32 = data;
    for _ in 0..12 {
        rem = (rem << 1) ^ ((rem >> 11) * 0x1f25);
    }
    let bits = (data << 12) | rem;
    debug_assert_eq!(bits >> 18, 0);
    bits
}

/// A QR Code symbol: a square grid of typed modules.
///
/// # Creation
///
/// - High-level: [`QrSymbol::encode`], [`QrSymbol::encode_with`], [`QrSymbol::encode_binary`].
/// - Mid-level: [`QrSymbol::encode_segments`].
/// - Low-level: [`QrSymbol::encode_codewords`], or [`QrSymbol::new`] followed by the
///   individual drawing phases.
///
/// # Example
///
/// ```rust
/// use qrstep::{ErrorCorrectionLevel, QrSymbol, Version};
///
/// let qr = QrSymbol::encode("HELLO WORLD", ErrorCorrectionLevel::Medium, Version::MIN, Version::MAX).unwrap();
/// assert_eq!(qr.version(), Version::new(1));
/// assert_eq!(qr.size(), 21);
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct QrSymbol {
    version: Version,
    size: i32,
    ecl: ErrorCorrectionLevel,
    mask: Option<Mask>,
    modules: Vec<Module>,
    segments: Vec<Segment>,
    codewords: Vec<Codeword>,
    penalties: Vec<PenaltyInfo>,
}

impl QrSymbol {
    /// Encodes text into a symbol, choosing the segmentation and the smallest version in
    /// `[minversion, maxversion]` that holds it.
    pub fn encode(
        text: &str,
        ecl: ErrorCorrectionLevel,
        minversion: Version,
        maxversion: Version,
    ) -> Result<Self, EncodeError> {
        let options = EncodeOptions::new(ecl).with_version_range(minversion, maxversion);
        Self::encode_with(text, &options)
    }

    /// Encodes text with full control over the encoding parameters.
    pub fn encode_with(text: &str, options: &EncodeOptions) -> Result<Self, EncodeError> {
        if text.is_empty() {
            return Self::encode_segments(&[Segment::make_bytes(&[])], options);
        }
        let (segs, version) =
            make_segments_optimally(text, options.ecl, options.min_version, options.max_version)?;
        Self::encode_segments_at(segs, version, options)
    }

    /// Encodes arbitrary bytes as a single byte-mode segment.
    pub fn encode_binary(data: &[u8], options: &EncodeOptions) -> Result<Self, EncodeError> {
        Self::encode_segments(&[Segment::make_bytes(data)], options)
    }

    /// Encodes the given segments as they are.
    pub fn encode_segments(segs: &[Segment], options: &EncodeOptions) -> Result<Self, EncodeError> {
        let version = select_version(segs, options.ecl, options.min_version, options.max_version)?;
        Self::encode_segments_at(segs.to_vec(), version, options)
    }

    fn encode_segments_at(
        segs: Vec<Segment>,
        version: Version,
        options: &EncodeOptions,
    ) -> Result<Self, EncodeError> {
        let used = Segment::total_bits(&segs, version).ok_or(EncodeError::SegmentTooLong)?;
        let mut ecl = options.ecl;
        if options.boost_ecl {
            while let Some(next) = ecl.stronger() {
                if used > num_data_codewords(version, next) * 8 {
                    break;
                }
                ecl = next;
            }
        }
        debug!(
            "encoding {} segments {:?} in version {} at {:?}",
            segs.len(),
            segs.iter().map(Segment::mode).collect::<Vec<_>>(),
            version.value(),
            ecl
        );
        let data = assemble_data_codewords(&segs, version, ecl);
        let mut result = Self::encode_codewords(version, ecl, &data, options.mask);
        result.segments = segs;
        Ok(result)
    }

    /// Builds a symbol from data codewords: ECC, interleaving, drawing and masking.
    ///
    /// # Panics
    ///
    /// Panics if `datacodewords` is not exactly the data capacity of `version` at `ecl`.
    pub fn encode_codewords(
        version: Version,
        ecl: ErrorCorrectionLevel,
        datacodewords: &[u8],
        msk: Option<Mask>,
    ) -> Self {
        let codewords = interleave(&split_into_blocks(datacodewords, version, ecl));
        let bytes: Vec<u8> = codewords.iter().map(|c| c.value).collect();

        let mut result = Self::new(version, ecl);
        result.draw_function_patterns();
        result.draw_codewords(&bytes);
        result.codewords = codewords;

        let msk: Mask = match msk {
            Some(m) => m,
            None => result.choose_mask(),
        };
        result.apply_mask(msk);
        result.draw_format_bits(Some(msk));
        result.mask = Some(msk);
        debug!("selected mask {}", msk.value());
        result
    }

    /// Tries every mask in index order and keeps the first one with the lowest total penalty.
    /// Leaves the grid unmasked.
    fn choose_mask(&mut self) -> Mask {
        let mut best: Option<(Mask, u32)> = None;
        let mut penalties = Vec::with_capacity(Mask::ALL.len());
        for msk in Mask::ALL {
            self.apply_mask(msk);
            self.draw_format_bits(Some(msk));
            let info = self.penalty();
            trace!("mask {} penalties {:?}", msk.value(), info.totals());
            if best.map_or(true, |(_, total)| info.total() < total) {
                best = Some((msk, info.total()));
            }
            penalties.push(info);
            self.apply_mask(msk); // Undoes the mask due to XOR
        }
        self.penalties = penalties;
        best.map(|(m, _)| m).unwrap_or(Mask::new(0))
    }

    /// An empty grid for the given version and level.
    pub fn new(version: Version, ecl: ErrorCorrectionLevel) -> Self {
        let size = version.size();
        Self {
            version,
            size,
            ecl,
            mask: None,
            modules: vec![Module::Unfilled; (size * size) as usize],
            segments: Vec::new(),
            codewords: Vec::new(),
            penalties: Vec::new(),
        }
    }

    /// Returns this QR Code's version, in the range [1, 40].
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns this QR Code's size, in the range [21, 177].
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Returns this QR Code's error correction level.
    pub fn error_correction_level(&self) -> ErrorCorrectionLevel {
        self.ecl
    }

    /// The applied mask, `None` until one is applied permanently.
    pub fn mask(&self) -> Option<Mask> {
        self.mask
    }

    /// Segments the data was encoded from.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The interleaved codeword stream placed into the grid.
    pub fn codewords(&self) -> &[Codeword] {
        &self.codewords
    }

    /// Penalties of the eight candidate masks, in index order. Empty if the mask was fixed.
    pub fn penalties(&self) -> &[PenaltyInfo] {
        &self.penalties
    }

    /// All modules, row-major.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// The module at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the grid.
    pub fn module(&self, x: i32, y: i32) -> Module {
        let range = 0..self.size;
        assert!(range.contains(&x) && range.contains(&y));
        self.modules[(y * self.size + x) as usize]
    }

    /// Returns the color of the module at the given coordinates.
    ///
    /// Returns `true` for dark modules and `false` for light modules. Coordinates outside the QR
    /// code's bounds return `false`.
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        let range = 0..self.size;
        range.contains(&x) && range.contains(&y) && self.module(x, y).is_dark()
    }

    /// Colours of all modules, row-major, `true` = dark.
    pub fn colors(&self) -> Vec<bool> {
        self.modules.iter().map(|m| m.is_dark()).collect()
    }

    /// Scores the grid as it currently stands.
    pub fn penalty(&self) -> PenaltyInfo {
        PenaltyInfo::compute(self.size, &self.colors())
    }

    fn set_function_module(&mut self, x: i32, y: i32, kind: FunctionKind, dark: bool) {
        let index = (y * self.size + x) as usize;
        self.modules[index] = Module::Function { kind, dark };
    }

    /// Draws timing, finder, alignment, blank format and version patterns, in that order.
    pub fn draw_function_patterns(&mut self) {
        self.draw_timing_patterns();
        self.draw_finder_patterns();
        self.draw_alignment_patterns();
        self.draw_format_bits(None);
        self.draw_version_information();
    }

    pub fn draw_timing_patterns(&mut self) {
        for i in 0..self.size {
            self.set_function_module(6, i, FunctionKind::Timing, i % 2 == 0);
            self.set_function_module(i, 6, FunctionKind::Timing, i % 2 == 0);
        }
    }

    /// Draws the three finder patterns with their separators.
    pub fn draw_finder_patterns(&mut self) {
        let size = self.size;
        for (cx, cy) in [(3, 3), (size - 4, 3), (3, size - 4)] {
            for dy in -4i32..=4 {
                for dx in -4i32..=4 {
                    let (x, y) = (cx + dx, cy + dy);
                    if !(0..size).contains(&x) || !(0..size).contains(&y) {
                        continue;
                    }
                    // Chebyshev/infinity norm
                    let dist: i32 = dx.abs().max(dy.abs());
                    let kind = if dist == 4 {
                        FunctionKind::Separator
                    } else {
                        FunctionKind::Finder
                    };
                    self.set_function_module(x, y, kind, dist != 2 && dist != 4);
                }
            }
        }
    }

    /// Draws the alignment patterns, skipping the three that would overlap finder patterns.
    pub fn draw_alignment_patterns(&mut self) {
        let alignpatpos: Vec<i32> = self.version.alignment_pattern_positions();
        let numalign: usize = alignpatpos.len();
        for (i, &cx) in alignpatpos.iter().enumerate() {
            for (j, &cy) in alignpatpos.iter().enumerate() {
                if (i == 0 && j == 0) || (i == 0 && j == numalign - 1) || (i == numalign - 1 && j == 0) {
                    continue;
                }
                for dy in -2i32..=2 {
                    for dx in -2i32..=2 {
                        let dark = dx.abs().max(dy.abs()) != 1;
                        self.set_function_module(cx + dx, cy + dy, FunctionKind::Alignment, dark);
                    }
                }
            }
        }
    }

    /// Draws both copies of the format information for `mask`. With `None` every format
    /// bit is light. The dark module is always drawn.
    pub fn draw_format_bits(&mut self, mask: Option<Mask>) {
        let bits: u32 = mask.map_or(0, |m| format_bits(self.ecl, m));
        let bit = |i: i32| get_bit(bits, i);
        let kind = FunctionKind::FormatInfo;

        // First copy, around the top left finder
        for i in 0..6 {
            self.set_function_module(8, i, kind, bit(i));
        }
        self.set_function_module(8, 7, kind, bit(6));
        self.set_function_module(8, 8, kind, bit(7));
        self.set_function_module(7, 8, kind, bit(8));
        for i in 9..15 {
            self.set_function_module(14 - i, 8, kind, bit(i));
        }

        // Second copy, split between the other two finders
        let size = self.size;
        for i in 0..8 {
            self.set_function_module(size - 1 - i, 8, kind, bit(i));
        }
        for i in 8..15 {
            self.set_function_module(8, size - 15 + i, kind, bit(i));
        }
        self.set_function_module(8, size - 8, FunctionKind::DarkModule, true);
    }

    /// Draws the two 3×6 version blocks, for versions 7 and up.
    pub fn draw_version_information(&mut self) {
        if self.version.value() < 7 {
            return;
        }
        let bits = version_bits(self.version);
        for i in 0..18 {
            let bit: bool = get_bit(bits, i);
            let a: i32 = self.size - 11 + i % 3;
            let b: i32 = i / 3;
            self.set_function_module(a, b, FunctionKind::VersionInfo, bit);
            self.set_function_module(b, a, FunctionKind::VersionInfo, bit);
        }
    }

    /// Coordinates of all non-function modules in zigzag placement order: column pairs from
    /// the right edge, alternating upward and downward, with column 6 skipped.
    pub fn data_positions(&self) -> Vec<(i32, i32)> {
        let size = self.size;
        let mut result = Vec::with_capacity(self.version.num_raw_data_modules());
        let mut right: i32 = size - 1;
        while right >= 1 {
            if right == 6 {
                right = 5;
            }
            let upward: bool = ((right + 1) & 2) == 0;
            for vert in 0..size {
                let y: i32 = if upward { size - 1 - vert } else { vert };
                for j in 0..2 {
                    let x: i32 = right - j;
                    if !self.module(x, y).is_function() {
                        result.push((x, y));
                    }
                }
            }
            right -= 2;
        }
        result
    }

    /// Places the interleaved codewords along the zigzag scan, most significant bit first,
    /// and fills the leftover positions with light remainder bits.
    ///
    /// # Panics
    ///
    /// Panics if the number of codewords differs from the version's raw codeword count.
    pub fn draw_codewords(&mut self, data: &[u8]) {
        assert_eq!(data.len(), self.version.num_raw_codewords(), "Illegal argument");
        let numbits = data.len() * 8;
        let positions = self.data_positions();
        debug_assert_eq!(positions.len(), self.version.num_raw_data_modules());
        for (i, (x, y)) in positions.into_iter().enumerate() {
            let module = if i < numbits {
                let bit = 7 - (i & 7) as u8;
                Module::Codeword {
                    index: i >> 3,
                    bit,
                    dark: get_bit(u32::from(data[i >> 3]), i32::from(bit)),
                }
            } else {
                Module::Remainder { dark: false }
            };
            self.modules[(y * self.size + x) as usize] = module;
        }
    }

    /// The scratch grid of `mask`: function modules are copied, every other cell is a
    /// [`Module::Mask`] telling whether the pattern inverts it.
    pub fn mask_pattern(&self, mask: Mask) -> Vec<Module> {
        let size = self.size;
        self.modules
            .iter()
            .enumerate()
            .map(|(i, &m)| {
                if m.is_function() {
                    m
                } else {
                    let (x, y) = (i as i32 % size, i as i32 / size);
                    Module::Mask {
                        invert: mask.inverts(x, y),
                    }
                }
            })
            .collect()
    }

    /// XORs the mask pattern into every codeword and remainder module.
    /// Applying the same mask twice restores the grid.
    pub fn apply_mask(&mut self, mask: Mask) {
        let pattern = self.mask_pattern(mask);
        for (m, p) in self.modules.iter_mut().zip(pattern) {
            if let Module::Mask { invert: true } = p {
                *m = m.inverted();
            }
        }
    }

    /// Reads the codeword stream back out of the grid in placement order, undoing the
    /// applied mask.
    pub fn read_codewords(&self) -> Vec<u8> {
        let mut result = vec![0u8; self.version.num_raw_codewords()];
        let numbits = result.len() * 8;
        for (i, (x, y)) in self.data_positions().into_iter().take(numbits).enumerate() {
            let inverted = self.mask.map_or(false, |m| m.inverts(x, y));
            if self.module(x, y).is_dark() != inverted {
                result[i >> 3] |= 1 << (7 - (i & 7));
            }
        }
        result
    }
}

fn get_bit(x: u32, i: i32) -> bool {
    ((x >> i) & 1) != 0
}
