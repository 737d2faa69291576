//! Optimal segmentation of text into numeric, alphanumeric, byte and kanji runs.
//!
//! Costs are kept in sixths of a bit so that numeric (10/3 bits per character) and
//! alphanumeric (11/2 bits per character) runs stay in exact integer arithmetic.

use log::{debug, trace};

use crate::ecc::{num_data_codewords, ErrorCorrectionLevel};
use crate::error::EncodeError;
use crate::segment::{CodePoint, Segment, SegmentMode};
use crate::version::{select_version, Version};

const MODES: [SegmentMode; 4] = SegmentMode::CHARACTER_MODES;

/// Per-character extension cost in sixths of a bit, or `None` if `mode` cannot encode `cp`.
fn extension_cost(mode: SegmentMode, cp: CodePoint) -> Option<u64> {
    if !mode.can_encode(cp) {
        return None;
    }
    Some(match mode {
        SegmentMode::Byte => cp.utf8_len() as u64 * 8 * 6,
        SegmentMode::Alphanumeric => 33,
        SegmentMode::Numeric => 20,
        SegmentMode::Kanji => 78,
        SegmentMode::Eci => unreachable!(),
    })
}

/// Assigns a mode to every code point so that the total encoded length at `version` is minimal.
pub fn compute_character_modes(cps: &[CodePoint], version: Version) -> Vec<SegmentMode> {
    if cps.is_empty() {
        return Vec::new();
    }
    let headcosts: [u64; 4] =
        MODES.map(|m| (4 + u64::from(m.num_char_count_bits(version))) * 6);

    // charmodes[i][j] is the index into MODES of character i in the cheapest encoding of
    // the first i+1 characters whose open segment is in MODES[j].
    let mut charmodes: Vec<[Option<usize>; 4]> = vec![[None; 4]; cps.len()];
    let mut prevcosts: [u64; 4] = headcosts;

    for (i, &cp) in cps.iter().enumerate() {
        let mut curcosts = [u64::MAX; 4];
        for (j, &mode) in MODES.iter().enumerate() {
            if let Some(cost) = extension_cost(mode, cp) {
                curcosts[j] = prevcosts[j] + cost;
                charmodes[i][j] = Some(j);
            }
        }
        // Close a segment after this character and open one in another mode
        for j in 0..MODES.len() {
            for k in 0..MODES.len() {
                if charmodes[i][k].is_none() {
                    continue;
                }
                let newcost = (curcosts[k] + 5) / 6 * 6 + headcosts[j];
                if newcost < curcosts[j] {
                    curcosts[j] = newcost;
                    charmodes[i][j] = Some(k);
                }
            }
        }
        prevcosts = curcosts;
    }

    let mut best = 0;
    for j in 1..MODES.len() {
        if prevcosts[j] < prevcosts[best] {
            best = j;
        }
    }
    let mut j = best;
    let mut result = vec![SegmentMode::Byte; cps.len()];
    for i in (0..cps.len()).rev() {
        j = charmodes[i][j].expect("every final state has a back-pointer");
        result[i] = MODES[j];
    }
    result
}

/// Coalesces consecutive characters with equal modes into segments.
pub fn split_into_segments(cps: &[CodePoint], modes: &[SegmentMode]) -> Vec<Segment> {
    assert_eq!(cps.len(), modes.len());
    let mut result = Vec::new();
    let mut start = 0;
    for i in 1..=cps.len() {
        if i == cps.len() || modes[i] != modes[start] {
            result.push(Segment::from_code_points(modes[start], &cps[start..i]));
            start = i;
        }
    }
    result
}

/// Optimal segments for `cps` at one fixed version.
pub fn make_segments_for_version(cps: &[CodePoint], version: Version) -> Vec<Segment> {
    let modes = compute_character_modes(cps, version);
    split_into_segments(cps, &modes)
}

/// Segments `text` optimally and picks the smallest version in `[min, max]` that holds it.
///
/// Segmentation is recomputed at `min` and at the versions where character count widths
/// change (10 and 27); versions in between reuse the segmentation of their tier.
pub fn make_segments_optimally(
    text: &str,
    ecl: ErrorCorrectionLevel,
    min: Version,
    max: Version,
) -> Result<(Vec<Segment>, Version), EncodeError> {
    assert!(min <= max, "Invalid value");
    let cps = CodePoint::from_text(text);
    let mut start = min;
    loop {
        let end = start.tier_end().min(max);
        let segs = make_segments_for_version(&cps, start);
        trace!(
            "segmented {} code points at version {} into {} segments",
            cps.len(),
            start.value(),
            segs.len()
        );
        match select_version(&segs, ecl, start, end) {
            Ok(version) => {
                debug!(
                    "version {} holds {:?} bits of {} at {:?}",
                    version.value(),
                    Segment::total_bits(&segs, version),
                    num_data_codewords(version, ecl) * 8,
                    ecl
                );
                return Ok((segs, version));
            }
            Err(err) if end >= max => return Err(err),
            Err(_) => start = Version::new(end.value() + 1),
        }
    }
}
