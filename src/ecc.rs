//! Error correction: GF(256) arithmetic, Reed-Solomon remainders, block splitting and
//! codeword interleaving.

use crate::version::Version;

/// Error correction level for a QR code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum ErrorCorrectionLevel {
    /// Tolerates ~7% erroneous codewords.
    Low,
    /// Tolerates ~15% erroneous codewords.
    Medium,
    /// Tolerates ~25% erroneous codewords.
    Quartile,
    /// Tolerates ~30% erroneous codewords.
    High,
}

impl ErrorCorrectionLevel {
    /// Row index into the per-level tables (0 to 3).
    pub fn ordinal(self) -> usize {
        use ErrorCorrectionLevel::*;
        match self {
            Low => 0,
            Medium => 1,
            Quartile => 2,
            High => 3,
        }
    }

    /// Returns an unsigned 2-bit integer (in the range 0 to 3).
    pub fn format_bits(self) -> u8 {
        use ErrorCorrectionLevel::*;
        match self {
            Low => 1,
            Medium => 0,
            Quartile => 3,
            High => 2,
        }
    }

    /// The next stronger level, if any.
    pub(crate) fn stronger(self) -> Option<Self> {
        use ErrorCorrectionLevel::*;
        match self {
            Low => Some(Medium),
            Medium => Some(Quartile),
            Quartile => Some(High),
            High => None,
        }
    }
}

/// ECC codewords in each block.
pub fn ecc_codewords_per_block(ver: Version, ecl: ErrorCorrectionLevel) -> usize {
    table_get(&ECC_CODEWORDS_PER_BLOCK, ver, ecl)
}

/// Number of error correction blocks.
pub fn num_error_correction_blocks(ver: Version, ecl: ErrorCorrectionLevel) -> usize {
    table_get(&NUM_ERROR_CORRECTION_BLOCKS, ver, ecl)
}

/// Number of 8-bit data codewords (excluding ECC) for the version and level.
pub fn num_data_codewords(ver: Version, ecl: ErrorCorrectionLevel) -> usize {
    ver.num_raw_codewords() - ecc_codewords_per_block(ver, ecl) * num_error_correction_blocks(ver, ecl)
}

fn table_get(table: &'static [[i8; 41]; 4], ver: Version, ecl: ErrorCorrectionLevel) -> usize {
    table[ecl.ordinal()][usize::from(ver.value())] as usize
}

/// Multiplies two elements of GF(2^8) modulo x^8 + x^4 + x^3 + x^2 + 1 (0x11D).
pub fn gf_multiply(x: u8, y: u8) -> u8 {
    let mut z: u8 = 0;
    for i in (0..8).rev() {
        z = (z << 1) ^ ((z >> 7) * 0x1d);
        z ^= ((y >> i) & 1) * x;
    }
    z
}

/// Divisor polynomial for a given ECC length, shared by every block of a symbol.
#[derive(Clone, Debug)]
pub struct ReedSolomonGenerator {
    /// Coefficients from the highest power down, without the leading 1.
    divisor: Vec<u8>,
}

impl ReedSolomonGenerator {
    /// Builds the product (x - 2^0)(x - 2^1)...(x - 2^(degree-1)).
    ///
    /// # Panics
    ///
    /// Panics if `degree` is outside [1, 255].
    pub fn new(degree: usize) -> Self {
        assert!((1..=255).contains(&degree), "Degree out of range");
        let mut divisor = vec![0u8; degree - 1];
        divisor.push(1);
        let mut root: u8 = 1;
        for _ in 0..degree {
            for j in 0..degree {
                divisor[j] = gf_multiply(divisor[j], root);
                if j + 1 < degree {
                    divisor[j] ^= divisor[j + 1];
                }
            }
            root = gf_multiply(root, 0x02);
        }
        Self { divisor }
    }

    pub fn degree(&self) -> usize {
        self.divisor.len()
    }

    pub fn coefficients(&self) -> &[u8] {
        &self.divisor
    }

    /// Remainder of `data` (times x^degree) divided by the generator: the block's ECC bytes.
    pub fn remainder(&self, data: &[u8]) -> Vec<u8> {
        let mut result = vec![0u8; self.degree()];
        for &b in data {
            let factor: u8 = b ^ result[0];
            result.copy_within(1.., 0);
            let last = result.len() - 1;
            result[last] = 0;
            for (x, &y) in result.iter_mut().zip(self.divisor.iter()) {
                *x ^= gf_multiply(y, factor);
            }
        }
        result
    }
}

/// Whether a codeword carries data or error correction.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum CodewordRole {
    Data,
    Ecc,
}

/// One byte of the final codeword stream.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Codeword {
    pub value: u8,
    pub role: CodewordRole,
    /// Block the codeword belongs to.
    pub block: usize,
    /// Position within its block's data or ECC run.
    pub index_in_block: usize,
    /// Position in the interleaved stream.
    pub index_in_stream: usize,
}

/// The data codewords of one block and the ECC computed over them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub data: Vec<u8>,
    pub ecc: Vec<u8>,
}

/// Splits data codewords into the version's blocks and appends ECC to each.
///
/// The last `rawcodewords % numblocks` blocks hold one more data codeword than the rest.
///
/// # Panics
///
/// Panics if `data` is not exactly the data capacity of the version and level.
pub fn split_into_blocks(data: &[u8], ver: Version, ecl: ErrorCorrectionLevel) -> Vec<Block> {
    assert_eq!(data.len(), num_data_codewords(ver, ecl), "Illegal argument");
    let numblocks = num_error_correction_blocks(ver, ecl);
    let blockecclen = ecc_codewords_per_block(ver, ecl);
    let rawcodewords = ver.num_raw_codewords();
    let numshortblocks = numblocks - rawcodewords % numblocks;
    let shortblockdatalen = rawcodewords / numblocks - blockecclen;

    let rs = ReedSolomonGenerator::new(blockecclen);
    let mut blocks = Vec::with_capacity(numblocks);
    let mut rest = data;
    for i in 0..numblocks {
        let datlen = shortblockdatalen + usize::from(i >= numshortblocks);
        let (dat, tail) = rest.split_at(datlen);
        blocks.push(Block {
            data: dat.to_vec(),
            ecc: rs.remainder(dat),
        });
        rest = tail;
    }
    debug_assert!(rest.is_empty());
    blocks
}

/// Interleaves blocks column by column: all data codewords first, then all ECC codewords.
pub fn interleave(blocks: &[Block]) -> Vec<Codeword> {
    let mut result = Vec::new();
    for role in [CodewordRole::Data, CodewordRole::Ecc] {
        let run = |block: &Block| -> Vec<u8> {
            match role {
                CodewordRole::Data => block.data.clone(),
                CodewordRole::Ecc => block.ecc.clone(),
            }
        };
        let runs: Vec<Vec<u8>> = blocks.iter().map(run).collect();
        let longest = runs.iter().map(Vec::len).max().unwrap_or(0);
        for i in 0..longest {
            for (j, codewords) in runs.iter().enumerate() {
                if let Some(&value) = codewords.get(i) {
                    let index_in_stream = result.len();
                    result.push(Codeword {
                        value,
                        role,
                        block: j,
                        index_in_block: i,
                        index_in_stream,
                    });
                }
            }
        }
    }
    result
}

static ECC_CODEWORDS_PER_BLOCK: [[i8; 41]; 4] = [
    // Version: (note that index 0 is for padding, and is set to an illegal value)
    //0,  1,  2,  3,  4,  5,  6,  7,  8,  9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40
    [-1,  7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28, 30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30], // Low
    [-1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28], // Medium
    [-1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30, 30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30], // Quartile
    [-1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30], // High
];

static NUM_ERROR_CORRECTION_BLOCKS: [[i8; 41]; 4] = [
    //0, 1, 2, 3, 4, 5, 6, 7, 8, 9,10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40
    [-1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4,  4,  4,  4,  4,  6,  6,  6,  6,  7,  8,  8,  9,  9, 10, 12, 12, 12, 13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25], // Low
    [-1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5,  5,  8,  9,  9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21, 23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49], // Medium
    [-1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8,  8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29, 34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68], // Quartile
    [-1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32, 35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81], // High
];
