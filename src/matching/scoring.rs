use std::cell::OnceCell;

use crate::core::error::MatchError;
use crate::matching::alignment::{align_chars, matched_len, MatchingBlock};
use crate::utils::validation::{count_to_f64, ratio_to_score, validate_digit_multiplier, MAX_SCORE};

/// Similarity scorer with a heavier penalty for unmatched digits.
///
/// The score is the share of aligned characters among aligned plus unaligned
/// characters of both strings, where an unaligned digit counts
/// `digit_multiplier` times. Fund names that differ only in a number
/// ("fund 2030" vs "fund 2040") are usually different funds, so digits
/// deserve more weight than letters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityScorer {
    digit_multiplier: f64,
}

impl SimilarityScorer {
    /// Create a scorer.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::InvalidConfig` unless `digit_multiplier` is a
    /// finite number greater than zero.
    pub fn new(digit_multiplier: f64) -> Result<Self, MatchError> {
        Ok(Self {
            digit_multiplier: validate_digit_multiplier(digit_multiplier)?,
        })
    }

    #[must_use]
    pub fn digit_multiplier(&self) -> f64 {
        self.digit_multiplier
    }

    /// Cheap upper bound on [`Self::compute_score`].
    ///
    /// No alignment can cover more characters than the shorter string holds.
    /// The bound holds whenever `digit_multiplier >= 1`.
    #[must_use]
    pub fn real_quick_ratio(&self, a: &str, b: &str) -> u8 {
        quick_ratio_from_lengths(a.chars().count(), b.chars().count())
    }

    /// Digit-weighted alignment score in `0..=100`.
    ///
    /// Two empty strings score 100; exactly one empty string scores 0. The
    /// pair is aligned in a canonical order so that the score is symmetric.
    #[must_use]
    pub fn compute_score(&self, a: &str, b: &str) -> u8 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        self.score_chars(&a, &b)
    }

    /// Score after sorting the whitespace-separated words of both strings,
    /// which makes "high yield" and "yield high" identical.
    #[must_use]
    pub fn compute_token_sorted_score(&self, a: &str, b: &str) -> u8 {
        let a = sort_tokens(a);
        let b = sort_tokens(b);
        self.score_chars(&a, &b)
    }

    /// Bind the scorer to a fixed query string so its decoded form is reused
    /// across many candidates.
    pub(crate) fn prepare<'q>(&self, query: &'q str) -> PreparedQuery<'q> {
        PreparedQuery {
            scorer: *self,
            text: query,
            chars: query.chars().collect(),
            token_sorted: OnceCell::new(),
        }
    }

    fn score_chars(&self, a: &[char], b: &[char]) -> u8 {
        match (a.is_empty(), b.is_empty()) {
            (true, true) => return MAX_SCORE,
            (true, false) | (false, true) => return 0,
            (false, false) => {}
        }

        // Greedy alignment is order dependent; fix the order to stay symmetric
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        let blocks = align_chars(first, second);

        let matches = matched_len(&blocks);
        let penalty = self.unmatched_penalty(first, &blocks, |block| {
            (block.a_start, block.a_end())
        }) + self.unmatched_penalty(second, &blocks, |block| {
            (block.b_start, block.b_end())
        });

        let matches = count_to_f64(matches);
        ratio_to_score(matches / (matches + penalty))
    }

    /// Weighted count of the characters of `seq` not covered by any block
    fn unmatched_penalty(
        &self,
        seq: &[char],
        blocks: &[MatchingBlock],
        bounds: impl Fn(&MatchingBlock) -> (usize, usize),
    ) -> f64 {
        let mut penalty = 0.0;
        let mut cursor = 0;
        for block in blocks {
            let (start, end) = bounds(block);
            penalty += self.weigh(&seq[cursor..start]);
            cursor = end;
        }
        penalty + self.weigh(&seq[cursor..])
    }

    fn weigh(&self, unmatched: &[char]) -> f64 {
        unmatched
            .iter()
            .map(|c| {
                if c.is_ascii_digit() {
                    self.digit_multiplier
                } else {
                    1.0
                }
            })
            .sum()
    }
}

/// A query string decoded once and scored against many candidates.
///
/// Owned by a single funnel stage; never shared between threads.
pub(crate) struct PreparedQuery<'q> {
    scorer: SimilarityScorer,
    text: &'q str,
    chars: Vec<char>,
    token_sorted: OnceCell<Vec<char>>,
}

impl PreparedQuery<'_> {
    pub(crate) fn real_quick_ratio(&self, candidate: &str) -> u8 {
        quick_ratio_from_lengths(self.chars.len(), candidate.chars().count())
    }

    pub(crate) fn score(&self, candidate: &str) -> u8 {
        let candidate: Vec<char> = candidate.chars().collect();
        self.scorer.score_chars(&self.chars, &candidate)
    }

    pub(crate) fn token_sorted_score(&self, candidate: &str) -> u8 {
        let query = self.token_sorted.get_or_init(|| sort_tokens(self.text));
        self.scorer.score_chars(query, &sort_tokens(candidate))
    }
}

/// Combine two field scores into one: `floor(sqrt(primary * secondary))`
#[must_use]
pub fn weighted_score(primary: u8, secondary: u8) -> u8 {
    let product = f64::from(primary) * f64::from(secondary);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // sqrt of 0..=10_000
    let weighted = product.sqrt().floor() as u8;
    weighted.min(MAX_SCORE)
}

fn quick_ratio_from_lengths(a_len: usize, b_len: usize) -> u8 {
    if a_len == 0 && b_len == 0 {
        return MAX_SCORE;
    }
    // Integer division is an exact floor; 2 * shorter never exceeds the total
    let pct = 200 * a_len.min(b_len) / (a_len + b_len);
    u8::try_from(pct).map_or(MAX_SCORE, |pct| pct.min(MAX_SCORE))
}

/// Sort words alphabetically and rejoin them with single spaces
fn sort_tokens(s: &str) -> Vec<char> {
    let mut words: Vec<&str> = s.split_whitespace().collect();
    words.sort();
    words.join(" ").chars().collect()
}
