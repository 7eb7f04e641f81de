//! Order statistics over evidence scores.
//!
//! The even-length median is computed in decimal rather than binary floating
//! point. Each middle value is taken at its shortest round-trip decimal form,
//! summed and halved exactly, then converted back to the nearest `f64`. For
//! example, the median of `[0.1, 0.2]` is `0.15` and not `0.15000000000000002`.

use crate::error::ScoreError;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Median of `scores`. The caller's slice is left untouched.
pub fn median(scores: &[f64]) -> Result<f64, ScoreError> {
    if scores.is_empty() {
        return Err(ScoreError::InvalidInput(
            "Attempt to calculate the median of an empty list of scores".to_string(),
        ));
    }

    let mut sorted = scores.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Ok(sorted[mid])
    } else {
        Ok(exact_midpoint(sorted[mid - 1], sorted[mid]))
    }
}

/// The arithmetic mean of `lower` and `upper`, computed in decimal.
///
/// The decimal type holds at most 28 fractional digits and rounds silently past
/// that, so the halved sum is only used when doubling it gives the sum back.
/// Everything else (non-finite, beyond ~7.9e28, or needing a 29th fractional
/// digit) falls back to the overflow-safe binary midpoint.
fn exact_midpoint(lower: f64, upper: f64) -> f64 {
    let decimal_mid = to_decimal(lower)
        .zip(to_decimal(upper))
        .and_then(|(a, b)| a.checked_add(b))
        .and_then(|sum| {
            sum.checked_div(Decimal::TWO)
                .filter(|mid| mid.checked_mul(Decimal::TWO) == Some(sum))
        })
        .and_then(|mid| mid.to_string().parse::<f64>().ok());

    decimal_mid.unwrap_or_else(|| lower + (upper - lower) / 2.0)
}

fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    let mut buffer = ryu::Buffer::new();
    let text = buffer.format_finite(value);
    if text.contains(['e', 'E']) {
        Decimal::from_scientific(text).ok()
    } else {
        Decimal::from_str(text).ok()
    }
}
