//! Centralized validation and helper functions.

use crate::core::error::MatchError;

/// Highest attainable similarity score
pub const MAX_SCORE: u8 = 100;

/// Validate a score threshold (must lie in `0..=100`).
///
/// # Examples
///
/// ```
/// use fund_linker::utils::validation::validate_threshold;
///
/// assert!(validate_threshold(95).is_ok());
/// assert!(validate_threshold(0).is_ok());
/// assert!(validate_threshold(101).is_err());
/// ```
///
/// # Errors
///
/// Returns `MatchError::InvalidConfig` if the threshold exceeds 100.
pub fn validate_threshold(threshold: u32) -> Result<u8, MatchError> {
    u8::try_from(threshold)
        .ok()
        .filter(|t| *t <= MAX_SCORE)
        .ok_or_else(|| {
            MatchError::InvalidConfig(format!(
                "valid threshold must be between 0 and {MAX_SCORE}, got {threshold}"
            ))
        })
}

/// Validate the penalty multiplier applied to unmatched digits.
///
/// # Errors
///
/// Returns `MatchError::InvalidConfig` unless the multiplier is finite and
/// strictly positive.
pub fn validate_digit_multiplier(multiplier: f64) -> Result<f64, MatchError> {
    if multiplier.is_finite() && multiplier > 0.0 {
        Ok(multiplier)
    } else {
        Err(MatchError::InvalidConfig(format!(
            "digit multiplier must be a positive number, got {multiplier}"
        )))
    }
}

/// Validate a required text field of an input record.
///
/// Returns the trimmed value, or `MatchError::MalformedInput` naming the field
/// when it is absent or blank.
///
/// # Errors
///
/// Returns `MatchError::MalformedInput` if the field is missing or blank.
pub fn require_field<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, MatchError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(MatchError::MalformedInput(format!(
            "missing required field '{field}'"
        ))),
    }
}

/// Safely convert a count to f64 for ratio calculations
#[inline]
#[must_use]
pub fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Floor a ratio in `0.0..=1.0` to an integer percentage.
///
/// Values outside the range are clamped so the result is always a valid score.
#[inline]
#[must_use]
pub fn ratio_to_score(ratio: f64) -> u8 {
    let pct = (100.0 * ratio).floor().clamp(0.0, f64::from(MAX_SCORE));
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to 0..=100
    {
        pct as u8
    }
}
