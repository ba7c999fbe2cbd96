// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Profile-name guard.
//!
//! Every path the store builds is derived from a [`ProfileName`], so a name
//! that fails [`ProfileName::parse`] never reaches the filesystem.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_PROFILE_NAME_LEN: usize = 64;
pub const MAX_FILE_NAME_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("profile name must not be empty")]
    Empty,
    #[error("profile name is {0} characters long (max {MAX_PROFILE_NAME_LEN})")]
    TooLong(usize),
    #[error("profile name contains invalid character {0:?} (allowed: A-Z a-z 0-9 _ -)")]
    InvalidChar(char),
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// A validated profile identifier matching `^[A-Za-z0-9_-]{1,64}$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProfileName(String);

impl ProfileName {
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        if raw.is_empty() {
            return Err(NameError::Empty);
        }
        let len = raw.chars().count();
        if len > MAX_PROFILE_NAME_LEN {
            return Err(NameError::TooLong(len));
        }
        if let Some(bad) = raw.chars().find(|c| !is_name_char(*c)) {
            return Err(NameError::InvalidChar(bad));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<name>.<suffix>`, e.g. `file_name("trunk.tsv")`.
    pub fn file_name(&self, suffix: &str) -> String {
        format!("{}.{}", self.0, suffix)
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProfileName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ProfileName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProfileName> for String {
    fn from(value: ProfileName) -> Self {
        value.0
    }
}

impl AsRef<str> for ProfileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// True for a bare file name that stays inside its directory: no separators,
/// no leading dot, only `[A-Za-z0-9._-]`.
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_FILE_NAME_LEN
        && !name.starts_with('.')
        && name.chars().all(|c| is_name_char(c) || c == '.')
}
