//! Segments: runs of text encoded under a single character mode.

use core::convert::TryFrom;

use crate::bitstream::BitBuffer;
use crate::version::Version;

/// The 45 characters of alphanumeric mode, in code order.
pub static ALPHANUMERIC_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// One Unicode scalar value of the input text.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct CodePoint(char);

impl CodePoint {
    pub fn new(c: char) -> Self {
        Self(c)
    }

    /// Splits a string into its scalar values.
    pub fn from_text(text: &str) -> Vec<CodePoint> {
        text.chars().map(CodePoint).collect()
    }

    pub fn value(self) -> char {
        self.0
    }

    /// The UTF-8 bytes used by byte mode.
    pub fn utf8(self) -> Vec<u8> {
        let mut buf = [0u8; 4];
        self.0.encode_utf8(&mut buf).as_bytes().to_vec()
    }

    pub fn utf8_len(self) -> usize {
        self.0.len_utf8()
    }

    /// UTF-16 code units, one or two.
    pub fn utf16(self) -> Vec<u16> {
        let mut buf = [0u16; 2];
        self.0.encode_utf16(&mut buf).to_vec()
    }

    pub fn is_numeric(self) -> bool {
        self.0.is_ascii_digit()
    }

    pub fn is_alphanumeric(self) -> bool {
        ALPHANUMERIC_CHARSET.contains(self.0)
    }

    pub fn is_kanji(self) -> bool {
        kanji_value(self.0).is_some()
    }
}

/// JIS X 0208 characters that the WHATWG Shift_JIS table maps differently, paired with the
/// character WHATWG puts at the same code.
const JIS_X0208_REMAP: [(char, char); 6] = [
    ('\u{301c}', '\u{ff5e}'), // WAVE DASH, 0x8160
    ('\u{2016}', '\u{2225}'), // DOUBLE VERTICAL LINE, 0x8161
    ('\u{2212}', '\u{ff0d}'), // MINUS SIGN, 0x817C
    ('\u{00a2}', '\u{ffe0}'), // CENT SIGN, 0x8191
    ('\u{00a3}', '\u{ffe1}'), // POUND SIGN, 0x8192
    ('\u{00ac}', '\u{ffe2}'), // NOT SIGN, 0x81CA
];

/// The 13-bit kanji mode value of `c`, or `None` if `c` is not in the kanji repertoire.
///
/// The repertoire is JIS X 0208: characters whose Shift_JIS form is a double-byte code in
/// 0x8140..=0x9FFC or 0xE040..=0xEBBF, excluding the NEC row 13 extensions at 0x8740..=0x879F.
pub fn kanji_value(c: char) -> Option<u16> {
    if c.is_ascii() {
        return None;
    }
    let c = match JIS_X0208_REMAP.iter().find(|&&(jis, whatwg)| c == jis || c == whatwg) {
        Some(&(jis, whatwg)) if c == jis => whatwg,
        Some(_) => return None,
        None => c,
    };
    let mut buf = [0u8; 4];
    let (bytes, _, had_errors) = encoding_rs::SHIFT_JIS.encode(c.encode_utf8(&mut buf));
    if had_errors || bytes.len() != 2 {
        return None;
    }
    let code: u16 = (u16::from(bytes[0]) << 8) | u16::from(bytes[1]);
    let offset: u16 = match code {
        0x8740..=0x879f => return None,
        0x8140..=0x9ffc => 0x8140,
        0xe040..=0xebbf => 0xc140,
        _ => return None,
    };
    let rel = code - offset;
    Some((rel >> 8) * 0xc0 + (rel & 0xff))
}

/// Describes how a segment's data bits are interpreted.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum SegmentMode {
    Numeric,
    Alphanumeric,
    Byte,
    Kanji,
    Eci,
}

impl SegmentMode {
    /// The four character modes considered by segmentation, in table order.
    pub const CHARACTER_MODES: [SegmentMode; 4] = [
        SegmentMode::Byte,
        SegmentMode::Alphanumeric,
        SegmentMode::Numeric,
        SegmentMode::Kanji,
    ];

    /// The 4-bit mode indicator.
    pub fn mode_bits(self) -> u32 {
        use SegmentMode::*;
        match self {
            Numeric => 0x1,
            Alphanumeric => 0x2,
            Byte => 0x4,
            Kanji => 0x8,
            Eci => 0x7,
        }
    }

    /// Widths of the character count field for versions 1–9, 10–26 and 27–40.
    pub fn char_count_bits_table(self) -> [u8; 3] {
        use SegmentMode::*;
        match self {
            Numeric => [10, 12, 14],
            Alphanumeric => [9, 11, 13],
            Byte => [8, 16, 16],
            Kanji => [8, 10, 12],
            Eci => [0, 0, 0],
        }
    }

    /// Width of the character count field at the given version.
    pub fn num_char_count_bits(self, ver: Version) -> u8 {
        self.char_count_bits_table()[ver.tier()]
    }

    /// Whether `cp` can be encoded in this mode.
    pub fn can_encode(self, cp: CodePoint) -> bool {
        use SegmentMode::*;
        match self {
            Numeric => cp.is_numeric(),
            Alphanumeric => cp.is_alphanumeric(),
            Byte => true,
            Kanji => cp.is_kanji(),
            Eci => false,
        }
    }
}

/// A segment of character/binary/control data in a QR Code symbol.
///
/// The character count is the byte count for byte mode and the code point count otherwise.
/// Immutable once built.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Segment {
    mode: SegmentMode,
    numchars: usize,
    data: Vec<bool>,
}

impl Segment {
    /// Returns a segment representing the given binary data encoded in byte mode.
    pub fn make_bytes(data: &[u8]) -> Self {
        let mut bb = BitBuffer::with_capacity(data.len() * 8);
        for &b in data {
            bb.append_bits(u32::from(b), 8);
        }
        Segment::new(SegmentMode::Byte, data.len(), bb.into_bits())
    }

    /// Returns a segment representing the given string of decimal digits encoded in numeric mode.
    ///
    /// # Panics
    ///
    /// Panics if `text` contains non-digit characters.
    pub fn make_numeric(text: &str) -> Self {
        let mut bb = BitBuffer::with_capacity(text.len() * 3 + (text.len() + 2) / 3);
        let mut accumdata: u32 = 0;
        let mut accumcount: u8 = 0;
        for b in text.bytes() {
            assert!(b.is_ascii_digit(), "String contains non-numeric characters");
            accumdata = accumdata * 10 + u32::from(b - b'0');
            accumcount += 1;
            if accumcount == 3 {
                bb.append_bits(accumdata, 10);
                accumdata = 0;
                accumcount = 0;
            }
        }
        if accumcount > 0 {
            // 1 or 2 digits remaining
            bb.append_bits(accumdata, accumcount * 3 + 1);
        }
        Segment::new(SegmentMode::Numeric, text.len(), bb.into_bits())
    }

    /// Returns a segment representing the given text string encoded in alphanumeric mode.
    ///
    /// Allowed characters: 0–9, A–Z (uppercase), space, `$`, `%`, `*`, `+`, `-`, `.`, `/`, `:`.
    ///
    /// # Panics
    ///
    /// Panics if `text` contains characters outside that set.
    pub fn make_alphanumeric(text: &str) -> Self {
        let mut bb = BitBuffer::with_capacity(text.len() * 6);
        let mut accumdata: u32 = 0;
        let mut accumcount: u32 = 0;
        for c in text.chars() {
            let i: usize = ALPHANUMERIC_CHARSET
                .find(c)
                .expect("String contains unencodable characters in alphanumeric mode");
            accumdata = accumdata * 45 + u32::try_from(i).unwrap();
            accumcount += 1;
            if accumcount == 2 {
                bb.append_bits(accumdata, 11);
                accumdata = 0;
                accumcount = 0;
            }
        }
        if accumcount > 0 {
            // 1 character remaining
            bb.append_bits(accumdata, 6);
        }
        Segment::new(SegmentMode::Alphanumeric, text.chars().count(), bb.into_bits())
    }

    /// Returns a segment representing the given text encoded in kanji mode, 13 bits per character.
    ///
    /// # Panics
    ///
    /// Panics if some character is outside the kanji repertoire.
    pub fn make_kanji(text: &str) -> Self {
        let mut bb = BitBuffer::with_capacity(text.chars().count() * 13);
        for c in text.chars() {
            let v = kanji_value(c).expect("String contains non-kanji-mode characters");
            bb.append_bits(u32::from(v), 13);
        }
        Segment::new(SegmentMode::Kanji, text.chars().count(), bb.into_bits())
    }

    /// Returns a segment representing an Extended Channel Interpretation
    /// (ECI) designator with the given assignment value.
    ///
    /// # Panics
    ///
    /// Panics if `assignval` is 1 000 000 or more.
    pub fn make_eci(assignval: u32) -> Self {
        let mut bb = BitBuffer::with_capacity(24);
        if assignval < (1 << 7) {
            bb.append_bits(assignval, 8);
        } else if assignval < (1 << 14) {
            bb.append_bits(0b10, 2);
            bb.append_bits(assignval, 14);
        } else if assignval < 1_000_000 {
            bb.append_bits(0b110, 3);
            bb.append_bits(assignval, 21);
        } else {
            panic!("ECI assignment value out of range");
        }
        Segment::new(SegmentMode::Eci, 0, bb.into_bits())
    }

    /// Encodes a run of code points that are all representable in `mode`.
    pub(crate) fn from_code_points(mode: SegmentMode, cps: &[CodePoint]) -> Self {
        let text: String = cps.iter().map(|cp| cp.value()).collect();
        match mode {
            SegmentMode::Byte => Segment::make_bytes(text.as_bytes()),
            SegmentMode::Numeric => Segment::make_numeric(&text),
            SegmentMode::Alphanumeric => Segment::make_alphanumeric(&text),
            SegmentMode::Kanji => Segment::make_kanji(&text),
            SegmentMode::Eci => unreachable!("ECI carries no characters"),
        }
    }

    /// Creates a segment from raw parts. The bit length is `data.len()`.
    pub fn new(mode: SegmentMode, numchars: usize, data: Vec<bool>) -> Self {
        Self { mode, numchars, data }
    }

    pub fn mode(&self) -> SegmentMode {
        self.mode
    }

    pub fn num_chars(&self) -> usize {
        self.numchars
    }

    pub fn data(&self) -> &[bool] {
        &self.data
    }

    pub fn bit_length(&self) -> usize {
        self.data.len()
    }

    /// Total bits (headers included) needed to encode `segs` at `version`,
    /// or `None` if a character count overflows its field.
    pub fn total_bits(segs: &[Self], version: Version) -> Option<usize> {
        let mut result: usize = 0;
        for seg in segs {
            let ccbits: u8 = seg.mode.num_char_count_bits(version);
            if let Some(limit) = 1usize.checked_shl(u32::from(ccbits)) {
                if seg.numchars >= limit {
                    return None;
                }
            }
            result = result.checked_add(4 + usize::from(ccbits))?;
            result = result.checked_add(seg.data.len())?;
        }
        Some(result)
    }

    pub fn is_numeric(text: &str) -> bool {
        text.chars().all(|c| c.is_ascii_digit())
    }

    pub fn is_alphanumeric(text: &str) -> bool {
        text.chars().all(|c| ALPHANUMERIC_CHARSET.contains(c))
    }

    pub fn is_kanji(text: &str) -> bool {
        text.chars().all(|c| kanji_value(c).is_some())
    }
}
