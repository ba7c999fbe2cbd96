// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::fmt;

use serde::{Deserialize, Serialize};

pub const MAX_LABEL_LEN: usize = 128;
pub const MAX_CATEGORY_LEN: usize = 64;
pub const DEFAULT_CATEGORY: &str = "uncategorized";

/// Talkgroup traffic mode as understood by the decoder.
///
/// `D`/`T` are clear digital/TDMA, the `E` suffix marks encrypted traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TalkgroupMode {
    #[default]
    D,
    T,
    DE,
    TE,
}

impl TalkgroupMode {
    /// Case-insensitive parse of one of the four known modes.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "D" => Some(Self::D),
            "T" => Some(Self::T),
            "DE" => Some(Self::DE),
            "TE" => Some(Self::TE),
            _ => None,
        }
    }

    /// Parse, falling back to `D` on anything unrecognized.
    pub fn parse_or_default(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::D => "D",
            Self::T => "T",
            Self::DE => "DE",
            Self::TE => "TE",
        }
    }

    pub fn is_encrypted(self) -> bool {
        matches!(self, Self::DE | Self::TE)
    }

    pub fn filter_action(self) -> FilterAction {
        if self.is_encrypted() {
            FilterAction::Deny
        } else {
            FilterAction::Allow
        }
    }
}

impl fmt::Display for TalkgroupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterAction {
    Allow,
    Deny,
}

/// A talkgroup entry after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Talkgroup {
    pub tgid: u16,
    pub label: String,
    pub mode: TalkgroupMode,
    pub encrypted: bool,
    pub category: String,
    pub favorite: bool,
    pub filter_action: FilterAction,
    pub enabled: bool,
}

impl Talkgroup {
    /// Build an entry with defaults for everything but the identity fields.
    /// `encrypted` and `filter_action` are derived from `mode`.
    pub fn new(tgid: u16, label: impl Into<String>, mode: TalkgroupMode) -> Self {
        Self {
            tgid,
            label: label.into(),
            mode,
            encrypted: mode.is_encrypted(),
            category: DEFAULT_CATEGORY.to_string(),
            favorite: false,
            filter_action: mode.filter_action(),
            enabled: true,
        }
    }

    /// Fallback label used when structured input omits one.
    pub fn default_label(tgid: u16) -> String {
        format!("TG {tgid}")
    }
}
