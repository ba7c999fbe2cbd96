// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Frequency string canonicalization.
//!
//! Frequencies travel as MHz decimal strings. The canonical form has at most
//! five fractional digits with trailing zeros and a dangling point removed,
//! so `"771.106250"` and `"771.10625"` compare equal after normalization.

pub const FREQUENCY_PRECISION: usize = 5;

/// Canonicalize one frequency token, or `None` if it is not a positive number.
pub fn canonicalize_frequency(raw: &str) -> Option<String> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    let fixed = format!("{:.*}", FREQUENCY_PRECISION, value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    // Positive values below the precision collapse to zero.
    if trimmed == "0" {
        return None;
    }
    Some(trimmed.to_string())
}

/// Split a frequency list on `;`, `|` or whitespace.
pub fn split_frequency_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|c: char| c == ';' || c == '|' || c.is_whitespace())
        .filter(|token| !token.is_empty())
}

/// Split and canonicalize, silently dropping invalid tokens.
pub fn normalize_frequency_list(raw: &str) -> Vec<String> {
    split_frequency_list(raw)
        .filter_map(canonicalize_frequency)
        .collect()
}
