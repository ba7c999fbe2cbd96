// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! On-disk locations. Per-profile paths are only built from a
//! [`ProfileName`], never from raw request strings.

use std::path::{Path, PathBuf};

use rfc_core::ProfileName;
use rfc_trunk::{tags_file_name, trunk_file_name};

pub const ACTIVE_PROFILE_FILE: &str = "active-profile.json";
pub const LEGACY_ACTIVE_PROFILE_FILE: &str = "active_profile.json";
pub const RELOAD_REQUEST_FILE: &str = "reload-request.json";
pub const PROFILE_SUFFIX: &str = "profile.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    profiles_dir: PathBuf,
    runtime_dir: PathBuf,
}

impl StoreLayout {
    pub fn new(profiles_dir: impl Into<PathBuf>, runtime_dir: impl Into<PathBuf>) -> Self {
        Self {
            profiles_dir: profiles_dir.into(),
            runtime_dir: runtime_dir.into(),
        }
    }

    pub fn profiles_dir(&self) -> &Path {
        &self.profiles_dir
    }

    pub fn runtime_dir(&self) -> &Path {
        &self.runtime_dir
    }

    pub fn profile_path(&self, name: &ProfileName) -> PathBuf {
        self.profiles_dir.join(name.file_name(PROFILE_SUFFIX))
    }

    pub fn talkgroups_path(&self, name: &ProfileName) -> PathBuf {
        self.profiles_dir.join(name.file_name("talkgroups.json"))
    }

    pub fn trunk_path(&self, name: &ProfileName) -> PathBuf {
        self.profiles_dir.join(trunk_file_name(name))
    }

    pub fn tags_path(&self, name: &ProfileName) -> PathBuf {
        self.profiles_dir.join(tags_file_name(name))
    }

    /// Runtime mirror of the filter policy read by the decoder supervisor.
    pub fn filter_path(&self, name: &ProfileName) -> PathBuf {
        self.runtime_dir.join(name.file_name("filter.json"))
    }

    pub fn active_path(&self) -> PathBuf {
        self.runtime_dir.join(ACTIVE_PROFILE_FILE)
    }

    pub fn legacy_active_path(&self) -> PathBuf {
        self.runtime_dir.join(LEGACY_ACTIVE_PROFILE_FILE)
    }

    pub fn reload_path(&self) -> PathBuf {
        self.runtime_dir.join(RELOAD_REQUEST_FILE)
    }

    /// Every file owned by one profile.
    pub fn profile_files(&self, name: &ProfileName) -> [PathBuf; 5] {
        [
            self.profile_path(name),
            self.talkgroups_path(name),
            self.trunk_path(name),
            self.tags_path(name),
            self.filter_path(name),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_follow_naming_scheme() {
        let layout = StoreLayout::new("/data/profiles", "/data/runtime");
        let name = ProfileName::parse("metro").unwrap();
        assert_eq!(
            layout.profile_path(&name),
            PathBuf::from("/data/profiles/metro.profile.json")
        );
        assert_eq!(
            layout.talkgroups_path(&name),
            PathBuf::from("/data/profiles/metro.talkgroups.json")
        );
        assert_eq!(
            layout.trunk_path(&name),
            PathBuf::from("/data/profiles/metro.trunk.tsv")
        );
        assert_eq!(
            layout.filter_path(&name),
            PathBuf::from("/data/runtime/metro.filter.json")
        );
        assert_eq!(
            layout.legacy_active_path(),
            PathBuf::from("/data/runtime/active_profile.json")
        );
    }
}
