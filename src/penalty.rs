//! Mask penalty scoring.
//!
//! The four rules, applied to a finished grid of light/dark modules:
//!
//! 1. each maximal same-colour run of length >= 5 in a row or column scores 3 + (length - 5);
//! 2. each 2x2 same-colour block scores 3, overlapping blocks included;
//! 3. each finder-like 1:1:3:1:1 dark/light pattern with a 4-unit light border scores 40;
//! 4. balance of dark modules, 10 points per 5% band away from 50% that is strictly exceeded.

const PENALTY_N1: u32 = 3;
const PENALTY_N2: u32 = 3;
const PENALTY_N3: u32 = 40;
const PENALTY_N4: u32 = 10;

/// A row or column of the grid.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Line {
    Row(i32),
    Column(i32),
}

/// A same-colour run that scored under rule 1.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Run {
    pub line: Line,
    pub start: i32,
    pub len: i32,
    pub dark: bool,
}

/// A finder-like pattern that scored under rule 3. `start` is the first dark module of the
/// 1:1:3:1:1 core; `light_before` tells which side carried the 4-unit light border.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FinderLike {
    pub line: Line,
    pub start: i32,
    pub unit: i32,
    pub light_before: bool,
}

/// Penalty totals of one masked grid, with the features that produced them.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct PenaltyInfo {
    pub rule1: u32,
    pub rule2: u32,
    pub rule3: u32,
    pub rule4: u32,
    pub runs: Vec<Run>,
    /// Top-left corners of the scoring 2x2 blocks.
    pub boxes: Vec<(i32, i32)>,
    pub finder_likes: Vec<FinderLike>,
    pub dark_modules: usize,
}

impl PenaltyInfo {
    /// Scores a `size`×`size` grid of colours stored row-major, `true` = dark.
    pub fn compute(size: i32, dark: &[bool]) -> Self {
        assert_eq!(dark.len(), (size * size) as usize, "Illegal argument");
        let at = |x: i32, y: i32| dark[(y * size + x) as usize];
        let mut result = PenaltyInfo::default();

        for y in 0..size {
            result.scan_line(size, Line::Row(y), |x| at(x, y));
        }
        for x in 0..size {
            result.scan_line(size, Line::Column(x), |y| at(x, y));
        }

        for y in 0..size - 1 {
            for x in 0..size - 1 {
                let color: bool = at(x, y);
                if color == at(x + 1, y) && color == at(x, y + 1) && color == at(x + 1, y + 1) {
                    result.rule2 += PENALTY_N2;
                    result.boxes.push((x, y));
                }
            }
        }

        let numdark = dark.iter().filter(|&&d| d).count();
        let total = (size * size) as i64;
        // Smallest k >= 0 with (45-5k)% <= dark/total <= (55+5k)%
        let k: i64 = (((numdark as i64) * 20 - total * 10).abs() + total - 1) / total - 1;
        debug_assert!((0..=9).contains(&k));
        result.rule4 = (k as u32) * PENALTY_N4;
        result.dark_modules = numdark;
        result
    }

    pub fn total(&self) -> u32 {
        self.rule1 + self.rule2 + self.rule3 + self.rule4
    }

    /// The four rule totals in order.
    pub fn totals(&self) -> [u32; 4] {
        [self.rule1, self.rule2, self.rule3, self.rule4]
    }

    fn scan_line(&mut self, size: i32, line: Line, color: impl Fn(i32) -> bool) {
        let mut runcolor = false;
        let mut runlen: i32 = 0;
        let mut history = FinderPenalty::new(size);
        for pos in 0..size {
            if color(pos) == runcolor {
                runlen += 1;
            } else {
                self.end_run(line, runcolor, pos, runlen);
                history.add_history(runlen, pos);
                if !runcolor {
                    self.count_finder_likes(line, &history);
                }
                runcolor = color(pos);
                runlen = 1;
            }
        }
        self.end_run(line, runcolor, size, runlen);
        let history = history.terminate(runcolor, runlen, size);
        self.count_finder_likes(line, &history);
    }

    fn end_run(&mut self, line: Line, dark: bool, end: i32, len: i32) {
        if len >= 5 {
            self.rule1 += PENALTY_N1 + (len - 5) as u32;
            self.runs.push(Run {
                line,
                start: end - len,
                len,
                dark,
            });
        }
    }

    fn count_finder_likes(&mut self, line: Line, history: &FinderPenalty) {
        let (before, after) = history.count_patterns();
        let unit = history.run_history[1];
        let start = history.run_starts[5];
        for (matched, light_before) in [(before, true), (after, false)] {
            if matched {
                self.rule3 += PENALTY_N3;
                self.finder_likes.push(FinderLike {
                    line,
                    start,
                    unit,
                    light_before,
                });
            }
        }
    }
}

/// The last seven run lengths of a line, newest first, starting with the light run
/// that just ended. Lines are treated as if padded by `size` light modules on both ends.
struct FinderPenalty {
    qr_size: i32,
    run_history: [i32; 7],
    run_starts: [i32; 7],
}

impl FinderPenalty {
    fn new(size: i32) -> Self {
        Self {
            qr_size: size,
            run_history: [0; 7],
            run_starts: [0; 7],
        }
    }

    /// Records a run of `len` modules ending just before `end`.
    fn add_history(&mut self, len: i32, end: i32) {
        self.push(len, end - len);
    }

    fn push(&mut self, mut len: i32, start: i32) {
        if self.run_history[0] == 0 {
            // Add light border to initial run
            len += self.qr_size;
        }
        self.run_history.copy_within(0..6, 1);
        self.run_starts.copy_within(0..6, 1);
        self.run_history[0] = len;
        self.run_starts[0] = start;
    }

    /// Whether the newest runs form a core pattern with a wide light run before it,
    /// and whether they form one with a wide light run after it.
    fn count_patterns(&self) -> (bool, bool) {
        let rh = &self.run_history;
        let n = rh[1];
        let core = n > 0 && rh[2] == n && rh[3] == n * 3 && rh[4] == n && rh[5] == n;
        (
            core && rh[6] >= n * 4 && rh[0] >= n,
            core && rh[0] >= n * 4 && rh[6] >= n,
        )
    }

    /// Closes the line: flushes a trailing dark run, then the light border.
    fn terminate(mut self, currentruncolor: bool, mut currentrunlength: i32, end: i32) -> Self {
        if currentruncolor {
            self.add_history(currentrunlength, end);
            currentrunlength = 0;
        }
        self.push(currentrunlength + self.qr_size, end - currentrunlength);
        self
    }
}
