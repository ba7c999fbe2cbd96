// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::Utc;
use rfc_core::import::ProfileFields;
use rfc_core::{
    build_filter_policy, canonicalize_talkgroups, FilterPolicy, ImportBatch, ImportInput,
    Profile, ProfileMeta, ProfileName, RowError, Site, SystemInfo, Talkgroup,
};
use rfc_trunk::{
    validate_trunk_file, write_tags_tsv, write_trunk_tsv, ValidateOptions, ValidationReport,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::active::{
    migrate_legacy_pointer, read_active, write_active, ActivePointer, MigrationOutcome,
};
use crate::command::{
    default_command, expand_placeholders, rewrite_command, split_command, LaunchContext,
    DEFAULT_COMMAND, PROFILES_DIR_PLACEHOLDER,
};
use crate::error::{StoreError, StoreResult};
use crate::json::{read_json, write_json};
use crate::layout::{StoreLayout, PROFILE_SUFFIX};
use crate::reload::request_reload;

/// RFC 3339 UTC timestamp with second precision.
pub fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Profiles directory as the decoder sees it, used for the `-T` argument.
    pub decoder_profiles_dir: String,
    /// Used when a profile has no command of its own.
    pub default_command: Vec<String>,
    /// Save the valid rows of a batch that also has row errors.
    pub skip_invalid_rows: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            decoder_profiles_dir: PROFILES_DIR_PLACEHOLDER.to_string(),
            default_command: split_command(DEFAULT_COMMAND).unwrap_or_default(),
            skip_invalid_rows: false,
        }
    }
}

/// `<profile>.talkgroups.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TalkgroupsDocument {
    pub profile: String,
    pub updated_at: String,
    pub filter: FilterPolicy,
    pub entries: Vec<Talkgroup>,
}

/// Runtime filter mirror (`<runtime>/<profile>.filter.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterMirror {
    pub profile: String,
    pub updated_at: String,
    #[serde(flatten)]
    pub filter: FilterPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistOutcome {
    pub updated_at: String,
    pub filter: FilterPolicy,
    pub entries: Vec<Talkgroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub saved: bool,
    pub source: String,
    pub errors: Vec<RowError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub talkgroups: Option<PersistOutcome>,
}

/// Dry-run result of an import: what would be saved and why not.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub source: String,
    pub errors: Vec<RowError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sites: Option<Vec<Site>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub talkgroups: Option<Vec<Talkgroup>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterPolicy>,
}

/// Normalize an import without touching disk.
pub fn preview_import(input: ImportInput) -> ImportPreview {
    let source = input.source_tag().to_string();
    let batch = input.into_batch();
    let filter = batch.talkgroups.as_deref().map(build_filter_policy);
    ImportPreview {
        source,
        errors: batch.errors,
        sites: batch.sites,
        talkgroups: batch.talkgroups,
        filter,
    }
}

/// Persistence for profiles, talkgroups and the runtime documents derived
/// from them.
pub struct ProfileStore {
    layout: StoreLayout,
    options: StoreOptions,
    migration: MigrationOutcome,
}

impl ProfileStore {
    /// Create the storage directories if needed and migrate the legacy
    /// active pointer.
    pub fn open(layout: StoreLayout, options: StoreOptions) -> StoreResult<Self> {
        for dir in [layout.profiles_dir(), layout.runtime_dir()] {
            fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        }

        let migration = migrate_legacy_pointer(&layout);
        if let MigrationOutcome::Failed(reason) = &migration {
            warn!("Active pointer migration failed: {}", reason);
        }

        Ok(Self {
            layout,
            options,
            migration,
        })
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    pub fn migration(&self) -> &MigrationOutcome {
        &self.migration
    }

    /// Guard every externally supplied name before any path is built.
    pub fn resolve_name(&self, raw: &str) -> StoreResult<ProfileName> {
        ProfileName::parse(raw).map_err(|source| StoreError::InvalidName {
            raw: raw.to_string(),
            source,
        })
    }

    pub fn list_profiles(&self) -> StoreResult<Vec<String>> {
        let dir = self.layout.profiles_dir();
        let suffix = format!(".{PROFILE_SUFFIX}");
        let mut names = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))? {
            let entry = entry.map_err(|e| StoreError::io(dir, e))?;
            let file_name = entry.file_name();
            let Some(stem) = file_name.to_str().and_then(|n| n.strip_suffix(&suffix)) else {
                continue;
            };
            if ProfileName::parse(stem).is_ok() {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn load_profile(&self, name: &ProfileName) -> StoreResult<Profile> {
        read_json(&self.layout.profile_path(name))?
            .ok_or_else(|| StoreError::ProfileNotFound(name.to_string()))
    }

    fn profile_exists(&self, name: &ProfileName) -> bool {
        self.layout.profile_path(name).is_file()
    }

    /// Replace the profile document and regenerate its decoder files.
    pub fn save_profile(&self, name: &ProfileName, mut profile: Profile) -> StoreResult<Profile> {
        if profile.system.sites.is_empty() {
            return Err(StoreError::Rejected(
                "profile needs at least one site".to_string(),
            ));
        }
        if let Some(site) = profile
            .system
            .sites
            .iter()
            .find(|site| site.control_channels.is_empty())
        {
            return Err(StoreError::Rejected(format!(
                "site '{}' needs at least one valid control channel frequency",
                site.name
            )));
        }

        profile.name = name.to_string();
        profile.updated_at = timestamp();
        let command = std::mem::take(&mut profile.command);
        let command = if command.is_empty() {
            default_command(&self.options.default_command, name)
        } else {
            command
        };
        profile.command = rewrite_command(&command, name, &self.options.decoder_profiles_dir);

        write_json(&self.layout.profile_path(name), &profile)?;
        self.write_trunk(name, &profile.system.sites, &profile.meta())?;
        let talkgroups = self.load_talkgroups(name)?;
        self.write_tags(name, &talkgroups)?;
        request_reload(&self.layout, name.as_str(), "profile", &profile.updated_at)?;

        info!(
            "Saved profile '{}' ({} sites)",
            name,
            profile.system.sites.len()
        );
        Ok(profile)
    }

    /// Stored talkgroups, empty when none have been saved yet.
    pub fn load_talkgroups(&self, name: &ProfileName) -> StoreResult<Vec<Talkgroup>> {
        let doc: Option<TalkgroupsDocument> = read_json(&self.layout.talkgroups_path(name))?;
        Ok(doc
            .map(|doc| canonicalize_talkgroups(doc.entries))
            .unwrap_or_default())
    }

    /// Replace the talkgroup set, recompute the filter policy and regenerate
    /// the tags file and runtime filter mirror.
    pub fn persist_talkgroups(
        &self,
        name: &ProfileName,
        entries: Vec<Talkgroup>,
    ) -> StoreResult<PersistOutcome> {
        let entries = canonicalize_talkgroups(entries);
        let filter = build_filter_policy(&entries);
        let updated_at = timestamp();

        let doc = TalkgroupsDocument {
            profile: name.to_string(),
            updated_at: updated_at.clone(),
            filter: filter.clone(),
            entries,
        };
        write_json(&self.layout.talkgroups_path(name), &doc)?;
        self.write_tags(name, &doc.entries)?;

        let mirror = FilterMirror {
            profile: name.to_string(),
            updated_at: updated_at.clone(),
            filter: filter.clone(),
        };
        write_json(&self.layout.filter_path(name), &mirror)?;
        request_reload(&self.layout, name.as_str(), "talkgroups", &updated_at)?;

        info!(
            "Saved {} talkgroups for '{}' ({:?}, {} effective)",
            doc.entries.len(),
            name,
            filter.policy,
            filter.effective.len()
        );
        Ok(PersistOutcome {
            updated_at,
            filter,
            entries: doc.entries,
        })
    }

    pub fn write_trunk(
        &self,
        name: &ProfileName,
        sites: &[Site],
        meta: &ProfileMeta,
    ) -> StoreResult<PathBuf> {
        let dir = self.layout.profiles_dir();
        write_trunk_tsv(dir, name, sites, meta)
            .map_err(|e| StoreError::io(&self.layout.trunk_path(name), e))
    }

    fn write_tags(&self, name: &ProfileName, talkgroups: &[Talkgroup]) -> StoreResult<PathBuf> {
        let dir = self.layout.profiles_dir();
        write_tags_tsv(dir, name, talkgroups)
            .map_err(|e| StoreError::io(&self.layout.tags_path(name), e))
    }

    pub fn validate_profile_files(
        &self,
        name: &ProfileName,
        opts: ValidateOptions,
    ) -> ValidationReport {
        validate_trunk_file(
            &self.layout.trunk_path(name),
            name,
            self.layout.profiles_dir(),
            opts,
        )
    }

    /// Normalize and, when nothing blocks it, persist an import.
    ///
    /// Table-level errors always block. Row errors block unless
    /// `skip_invalid_rows` (or the store default) allows saving the
    /// remaining rows.
    pub fn import(
        &self,
        name: &ProfileName,
        input: ImportInput,
        skip_invalid_rows: Option<bool>,
    ) -> StoreResult<ImportOutcome> {
        let source = input.source_tag().to_string();
        let mut batch = input.into_batch();
        let lenient = skip_invalid_rows.unwrap_or(self.options.skip_invalid_rows);

        let profile_touched = batch.profile.is_some() || batch.sites.is_some();
        if profile_touched && batch.sites.as_ref().map_or(true, Vec::is_empty) {
            batch
                .errors
                .push(RowError::table("profile needs at least one site"));
        }

        let blocked = batch
            .errors
            .iter()
            .any(|err| err.row.is_none() || !lenient);
        if blocked {
            warn!(
                "Import into '{}' rejected with {} errors",
                name,
                batch.errors.len()
            );
            return Ok(ImportOutcome {
                saved: false,
                source,
                errors: batch.errors,
                profile: None,
                talkgroups: None,
            });
        }

        let ImportBatch {
            sites,
            talkgroups,
            profile: fields,
            errors,
        } = batch;

        let talkgroups = match talkgroups {
            Some(entries) => Some(self.persist_talkgroups(name, entries)?),
            None => None,
        };

        let profile = match (fields, sites) {
            (Some(fields), sites) => {
                let profile = profile_from_fields(name, fields, sites.unwrap_or_default(), &source);
                Some(self.save_profile(name, profile)?)
            }
            (None, Some(sites)) => {
                let mut profile = match self.load_profile(name) {
                    Ok(profile) => profile,
                    Err(StoreError::ProfileNotFound(_)) => empty_profile(name),
                    Err(e) => return Err(e),
                };
                profile.system.sites = sites;
                profile.import_source = source.clone();
                Some(self.save_profile(name, profile)?)
            }
            (None, None) => None,
        };

        Ok(ImportOutcome {
            saved: true,
            source,
            errors,
            profile,
            talkgroups,
        })
    }

    pub fn active_profile(&self) -> Option<ActivePointer> {
        read_active(&self.layout)
    }

    /// Point the decoder at `name`. The profile must already exist.
    pub fn switch_active(&self, name: &ProfileName, changed_by: &str) -> StoreResult<ActivePointer> {
        if !self.profile_exists(name) {
            return Err(StoreError::ProfileNotFound(name.to_string()));
        }
        let pointer = ActivePointer {
            profile: name.to_string(),
            changed_at: timestamp(),
            changed_by: changed_by.to_string(),
        };
        write_active(&self.layout, &pointer)?;
        request_reload(&self.layout, name.as_str(), "activate", &pointer.changed_at)?;
        info!("Active profile is now '{}' (by {})", name, changed_by);
        Ok(pointer)
    }

    /// Remove every file owned by `name`. The active profile cannot be
    /// deleted.
    pub fn delete_profile(&self, name: &ProfileName) -> StoreResult<Vec<PathBuf>> {
        if !self.profile_exists(name) {
            return Err(StoreError::ProfileNotFound(name.to_string()));
        }
        if self
            .active_profile()
            .is_some_and(|pointer| pointer.profile == name.as_str())
        {
            return Err(StoreError::Rejected(format!(
                "cannot delete the active profile '{name}'"
            )));
        }

        let mut removed = Vec::new();
        for path in self.layout.profile_files(name) {
            match fs::remove_file(&path) {
                Ok(()) => removed.push(path),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::io(&path, e)),
            }
        }
        info!("Deleted profile '{}' ({} files)", name, removed.len());
        Ok(removed)
    }

    /// The stored command with launch placeholders expanded.
    pub fn launch_argv(&self, name: &ProfileName) -> StoreResult<Vec<String>> {
        let profile = self.load_profile(name)?;
        let command = if profile.command.is_empty() {
            rewrite_command(
                &default_command(&self.options.default_command, name),
                name,
                &self.options.decoder_profiles_dir,
            )
        } else {
            profile.command
        };
        let ctx = LaunchContext {
            profile: name.to_string(),
            profiles_dir: self.layout.profiles_dir().display().to_string(),
            runtime_dir: self.layout.runtime_dir().display().to_string(),
            talkgroups_file: self.layout.talkgroups_path(name).display().to_string(),
        };
        Ok(expand_placeholders(&command, &ctx))
    }
}

fn empty_profile(name: &ProfileName) -> Profile {
    Profile {
        name: name.to_string(),
        label: String::new(),
        description: String::new(),
        notes: String::new(),
        system: SystemInfo::default(),
        command: Vec::new(),
        updated_at: String::new(),
        import_source: String::new(),
    }
}

fn profile_from_fields(
    name: &ProfileName,
    fields: ProfileFields,
    sites: Vec<Site>,
    source: &str,
) -> Profile {
    Profile {
        name: name.to_string(),
        label: fields.label,
        description: fields.description,
        notes: fields.notes,
        system: SystemInfo {
            name: fields.system_name,
            sysid: fields.sysid,
            wacn: fields.wacn,
            nac: fields.nac,
            bandplan: fields.bandplan,
            sites,
        },
        command: fields.command.unwrap_or_default(),
        updated_at: String::new(),
        import_source: source.to_string(),
    }
}
