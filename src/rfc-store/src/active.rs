// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Persisted active-profile pointer and its one-time legacy migration.

use std::fs;
use std::io::ErrorKind;

use rfc_core::ProfileName;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::StoreResult;
use crate::json::{read_json, write_json};
use crate::layout::StoreLayout;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredPointer")]
pub struct ActivePointer {
    pub profile: String,
    pub changed_at: String,
    pub changed_by: String,
}

/// On-disk shape. Older writers used `activeProfile`; some files carry both
/// keys, in which case a non-empty `profile` wins.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredPointer {
    #[serde(default)]
    profile: Option<String>,
    #[serde(default)]
    active_profile: Option<String>,
    #[serde(default)]
    changed_at: String,
    #[serde(default)]
    changed_by: String,
}

impl TryFrom<StoredPointer> for ActivePointer {
    type Error = String;

    fn try_from(stored: StoredPointer) -> Result<Self, Self::Error> {
        let profile = stored
            .profile
            .filter(|p| !p.trim().is_empty())
            .or(stored.active_profile)
            .ok_or_else(|| "active pointer has no profile".to_string())?;
        Ok(Self {
            profile,
            changed_at: stored.changed_at,
            changed_by: stored.changed_by,
        })
    }
}

impl ActivePointer {
    /// The pointed-at profile, if its name passes the guard.
    pub fn profile_name(&self) -> Option<ProfileName> {
        ProfileName::parse(&self.profile).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "camelCase")]
pub enum MigrationOutcome {
    NothingToMigrate,
    Migrated,
    SkippedCanonicalExists,
    Failed(String),
}

/// Read the canonical pointer. Unreadable pointers and pointers naming an
/// invalid profile are treated as absent.
pub fn read_active(layout: &StoreLayout) -> Option<ActivePointer> {
    let path = layout.active_path();
    match read_json::<ActivePointer>(&path) {
        Ok(Some(pointer)) if pointer.profile_name().is_some() => Some(pointer),
        Ok(Some(pointer)) => {
            warn!("Ignoring active pointer with invalid profile '{}'", pointer.profile);
            None
        }
        Ok(None) => None,
        Err(e) => {
            warn!("Ignoring unreadable active pointer: {}", e);
            None
        }
    }
}

pub fn write_active(layout: &StoreLayout, pointer: &ActivePointer) -> StoreResult<()> {
    write_json(&layout.active_path(), pointer)
}

/// Move the legacy pointer into the canonical location.
///
/// Either both files end up in their pre-migration state or the legacy file
/// is gone and the canonical one holds its content.
pub fn migrate_legacy_pointer(layout: &StoreLayout) -> MigrationOutcome {
    let legacy = layout.legacy_active_path();
    let canonical = layout.active_path();

    if !legacy.exists() {
        return MigrationOutcome::NothingToMigrate;
    }
    if canonical.exists() {
        return MigrationOutcome::SkippedCanonicalExists;
    }

    let pointer = match read_json::<ActivePointer>(&legacy) {
        Ok(Some(pointer)) => pointer,
        Ok(None) => return MigrationOutcome::NothingToMigrate,
        Err(e) => return MigrationOutcome::Failed(e.to_string()),
    };
    if pointer.profile_name().is_none() {
        return MigrationOutcome::Failed(format!(
            "legacy pointer names invalid profile '{}'",
            pointer.profile
        ));
    }

    if let Err(e) = write_json(&canonical, &pointer) {
        return MigrationOutcome::Failed(e.to_string());
    }
    if let Err(e) = fs::remove_file(&legacy) {
        if e.kind() != ErrorKind::NotFound {
            // Roll back so the legacy file stays authoritative.
            let _ = fs::remove_file(&canonical);
            return MigrationOutcome::Failed(format!(
                "failed to remove {}: {}",
                legacy.display(),
                e
            ));
        }
    }

    info!(
        "Migrated active profile pointer '{}' from {} to {}",
        pointer.profile,
        legacy.display(),
        canonical.display()
    );
    MigrationOutcome::Migrated
}
