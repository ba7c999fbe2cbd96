// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

pub mod profile;
pub mod site;
pub mod talkgroup;

/// Truncate `value` to at most `max` characters. Control characters
/// (line breaks, tabs) become spaces so free text stays on one TSV line.
pub(crate) fn clamp_chars(value: &str, max: usize) -> String {
    value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .take(max)
        .collect()
}

/// Trimmed, length-clamped optional string; blank input becomes `None`.
pub(crate) fn optional_text(value: &str, max: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(clamp_chars(trimmed, max))
    }
}
