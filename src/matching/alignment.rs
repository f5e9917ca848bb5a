//! Greedy common-substring alignment.
//!
//! The alignment repeatedly takes the longest substring shared by the current
//! pair of ranges and then aligns whatever lies to its left and to its right.
//! It is not an optimal LCS; it reproduces the matching blocks of a classic
//! "Ratio" sequence matcher without junk heuristics.

/// A run of characters shared by both strings:
/// `a[a_start..a_start + len] == b[b_start..b_start + len]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingBlock {
    pub a_start: usize,
    pub b_start: usize,
    pub len: usize,
}

impl MatchingBlock {
    #[must_use]
    pub fn a_end(&self) -> usize {
        self.a_start + self.len
    }

    #[must_use]
    pub fn b_end(&self) -> usize {
        self.b_start + self.len
    }
}

/// Half-open index ranges still waiting to be aligned
#[derive(Debug, Clone, Copy)]
struct Span {
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
}

/// Row buffers for the longest-match dynamic program, reused across spans
struct Scratch {
    prev: Vec<usize>,
    cur: Vec<usize>,
}

impl Scratch {
    fn new(b_len: usize) -> Self {
        Self {
            prev: vec![0; b_len + 1],
            cur: vec![0; b_len + 1],
        }
    }
}

/// Align two strings, counting positions in Unicode scalar values.
///
/// # Examples
///
/// ```
/// use fund_linker::matching::alignment::align;
///
/// let blocks = align("abxcd", "abcd");
/// assert_eq!(blocks.len(), 2);
/// assert_eq!((blocks[0].a_start, blocks[0].b_start, blocks[0].len), (0, 0, 2));
/// assert_eq!((blocks[1].a_start, blocks[1].b_start, blocks[1].len), (3, 2, 2));
/// ```
#[must_use]
pub fn align(a: &str, b: &str) -> Vec<MatchingBlock> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    align_chars(&a, &b)
}

/// Align two character slices.
///
/// Returns non-overlapping blocks sorted ascending by `a_start` (and therefore
/// by `b_start`). Uses an explicit work-list so long inputs cannot exhaust the
/// stack.
#[must_use]
pub fn align_chars(a: &[char], b: &[char]) -> Vec<MatchingBlock> {
    let mut blocks = Vec::new();
    if a.is_empty() || b.is_empty() {
        return blocks;
    }

    let mut scratch = Scratch::new(b.len());
    let mut pending = vec![Span {
        a_lo: 0,
        a_hi: a.len(),
        b_lo: 0,
        b_hi: b.len(),
    }];

    while let Some(span) = pending.pop() {
        let Some(block) = find_longest_match(a, b, span, &mut scratch) else {
            continue;
        };

        if span.a_lo < block.a_start && span.b_lo < block.b_start {
            pending.push(Span {
                a_lo: span.a_lo,
                a_hi: block.a_start,
                b_lo: span.b_lo,
                b_hi: block.b_start,
            });
        }
        if block.a_end() < span.a_hi && block.b_end() < span.b_hi {
            pending.push(Span {
                a_lo: block.a_end(),
                a_hi: span.a_hi,
                b_lo: block.b_end(),
                b_hi: span.b_hi,
            });
        }
        blocks.push(block);
    }

    blocks.sort_unstable_by_key(|block| block.a_start);
    blocks
}

/// Total number of characters covered by a set of blocks
#[must_use]
pub fn matched_len(blocks: &[MatchingBlock]) -> usize {
    blocks.iter().map(|block| block.len).sum()
}

/// Longest substring common to `a[a_lo..a_hi]` and `b[b_lo..b_hi]`.
///
/// Ties go to the smallest start in `a`, then the smallest start in `b`: rows
/// are scanned in ascending `i`, columns in ascending `j`, and the best block
/// is only replaced by a strictly longer one.
fn find_longest_match(
    a: &[char],
    b: &[char],
    span: Span,
    scratch: &mut Scratch,
) -> Option<MatchingBlock> {
    let Scratch { prev, cur } = scratch;
    // prev[j + 1] / cur[j + 1] hold the length of the common run ending at b[j]
    prev[span.b_lo..=span.b_hi].fill(0);

    let mut best: Option<MatchingBlock> = None;
    let mut best_len = 0;

    for i in span.a_lo..span.a_hi {
        cur[span.b_lo] = 0;
        for j in span.b_lo..span.b_hi {
            let run = if a[i] == b[j] { prev[j] + 1 } else { 0 };
            cur[j + 1] = run;
            if run > best_len {
                best_len = run;
                best = Some(MatchingBlock {
                    a_start: i + 1 - run,
                    b_start: j + 1 - run,
                    len: run,
                });
            }
        }
        std::mem::swap(prev, cur);
    }

    best
}
