// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use serde::{Deserialize, Serialize};

use super::site::Site;

/// System-wide identifiers shared by every site of a profile.
///
/// Per-site values take priority; these fill in whatever a site leaves empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemInfo {
    pub name: Option<String>,
    pub sysid: Option<String>,
    pub wacn: Option<String>,
    pub nac: Option<String>,
    pub bandplan: Option<String>,
    pub sites: Vec<Site>,
}

/// Persisted profile document (`<profile>.profile.json`).
///
/// Always written wholesale; there is no partial update path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub system: SystemInfo,
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub import_source: String,
}

impl Profile {
    pub fn meta(&self) -> ProfileMeta {
        ProfileMeta {
            label: non_empty(&self.label),
            system_name: self.system.name.clone(),
            sysid: self.system.sysid.clone(),
            wacn: self.system.wacn.clone(),
            nac: self.system.nac.clone(),
            bandplan: self.system.bandplan.clone(),
        }
    }
}

/// Profile-level values consulted by the trunk writer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileMeta {
    pub label: Option<String>,
    pub system_name: Option<String>,
    pub sysid: Option<String>,
    pub wacn: Option<String>,
    pub nac: Option<String>,
    pub bandplan: Option<String>,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
