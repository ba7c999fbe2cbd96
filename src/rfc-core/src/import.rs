// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Import input variants and their adapters into the canonical model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::site::{Site, MAX_BANDPLAN_LEN, MAX_SITE_NAME_LEN, MAX_SYSTEM_ID_LEN};
use crate::model::talkgroup::Talkgroup;
use crate::model::optional_text;
use crate::normalize::{
    json_text, normalize_site_entries, normalize_sites_csv, normalize_talkgroup_entries,
    normalize_talkgroups_csv, Normalized, RowError,
};

/// Which table a delimited or structured import describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Sites,
    Talkgroups,
}

/// Every shape an import request can take.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportInput {
    /// Pasted CSV/TSV text.
    DelimitedText { kind: TableKind, text: String },
    /// Already key-value entries, e.g. a JSON array.
    StructuredEntries { kind: TableKind, entries: Vec<Value> },
    /// A whole profile document with system, sites, talkgroups and command.
    ProfileImportDocument(Value),
}

/// Profile-level fields carried by a profile import document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    pub label: String,
    pub description: String,
    pub notes: String,
    pub system_name: Option<String>,
    pub sysid: Option<String>,
    pub wacn: Option<String>,
    pub nac: Option<String>,
    pub bandplan: Option<String>,
    /// `None` when the document has no command at all.
    pub command: Option<Vec<String>>,
}

/// Canonical output of any import variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportBatch {
    pub sites: Option<Vec<Site>>,
    pub talkgroups: Option<Vec<Talkgroup>>,
    pub profile: Option<ProfileFields>,
    pub errors: Vec<RowError>,
}

impl ImportBatch {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl ImportInput {
    /// Pick a variant from raw request text.
    ///
    /// A leading `[` is a structured entry array, a leading `{` is either an
    /// `{"entries": [...]}` wrapper or a profile document; anything else is
    /// delimited text.
    pub fn detect(kind: TableKind, text: &str) -> Result<Self, serde_json::Error> {
        let trimmed = text.trim_start_matches('\u{feff}').trim_start();
        if trimmed.starts_with('[') {
            let entries: Vec<Value> = serde_json::from_str(trimmed)?;
            return Ok(Self::StructuredEntries { kind, entries });
        }
        if trimmed.starts_with('{') {
            let value: Value = serde_json::from_str(trimmed)?;
            if let Some(Value::Array(entries)) = value.get("entries") {
                return Ok(Self::StructuredEntries {
                    kind,
                    entries: entries.clone(),
                });
            }
            return Ok(Self::ProfileImportDocument(value));
        }
        Ok(Self::DelimitedText {
            kind,
            text: text.to_string(),
        })
    }

    /// Provenance tag recorded as a profile's `importSource`.
    pub fn source_tag(&self) -> &'static str {
        match self {
            Self::DelimitedText { .. } => "csv",
            Self::StructuredEntries { .. } => "entries",
            Self::ProfileImportDocument(_) => "profile-json",
        }
    }

    pub fn into_batch(self) -> ImportBatch {
        match self {
            Self::DelimitedText { kind, text } => match kind {
                TableKind::Sites => sites_batch(normalize_sites_csv(&text)),
                TableKind::Talkgroups => talkgroups_batch(normalize_talkgroups_csv(&text)),
            },
            Self::StructuredEntries { kind, entries } => match kind {
                TableKind::Sites => sites_batch(normalize_site_entries(&entries)),
                TableKind::Talkgroups => talkgroups_batch(normalize_talkgroup_entries(&entries)),
            },
            Self::ProfileImportDocument(doc) => profile_document_batch(&doc),
        }
    }
}

fn sites_batch(out: Normalized<Site>) -> ImportBatch {
    ImportBatch {
        sites: Some(out.entries),
        errors: out.errors,
        ..ImportBatch::default()
    }
}

fn talkgroups_batch(out: Normalized<Talkgroup>) -> ImportBatch {
    ImportBatch {
        talkgroups: Some(out.entries),
        errors: out.errors,
        ..ImportBatch::default()
    }
}

fn prefixed(section: &str, errors: Vec<RowError>) -> impl Iterator<Item = RowError> + '_ {
    errors
        .into_iter()
        .map(move |err| RowError::table(format!("{section} {err}")))
}

fn text_field(obj: &Map<String, Value>, key: &str) -> String {
    json_text(obj.get(key)).trim().to_string()
}

fn parse_command(value: &Value) -> Result<Vec<String>, RowError> {
    match value {
        Value::String(s) => shlex::split(s)
            .ok_or_else(|| RowError::table("command has unbalanced quotes")),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| RowError::table("command entries must be strings"))
            })
            .collect(),
        _ => Err(RowError::table(
            "command must be a string or an array of strings",
        )),
    }
}

fn profile_document_batch(doc: &Value) -> ImportBatch {
    let mut batch = ImportBatch::default();
    let Some(obj) = doc.as_object() else {
        batch
            .errors
            .push(RowError::table("profile document must be a JSON object"));
        return batch;
    };

    let empty = Map::new();
    let system = obj.get("system").and_then(Value::as_object).unwrap_or(&empty);

    let command = match obj.get("command").filter(|v| !v.is_null()) {
        Some(value) => match parse_command(value) {
            Ok(tokens) => Some(tokens),
            Err(err) => {
                batch.errors.push(err);
                None
            }
        },
        None => None,
    };

    batch.profile = Some(ProfileFields {
        label: text_field(obj, "label"),
        description: text_field(obj, "description"),
        notes: text_field(obj, "notes"),
        system_name: optional_text(&json_text(system.get("name")), MAX_SITE_NAME_LEN),
        sysid: optional_text(&json_text(system.get("sysid")), MAX_SYSTEM_ID_LEN),
        wacn: optional_text(&json_text(system.get("wacn")), MAX_SYSTEM_ID_LEN),
        nac: optional_text(&json_text(system.get("nac")), MAX_SYSTEM_ID_LEN),
        bandplan: optional_text(&json_text(system.get("bandplan")), MAX_BANDPLAN_LEN),
        command,
    });

    let sites = system
        .get("sites")
        .or_else(|| obj.get("sites"))
        .and_then(Value::as_array);
    if let Some(sites) = sites {
        let out = normalize_site_entries(sites);
        batch.errors.extend(prefixed("sites", out.errors));
        batch.sites = Some(out.entries);
    }

    if let Some(talkgroups) = obj.get("talkgroups").and_then(Value::as_array) {
        let out = normalize_talkgroup_entries(talkgroups);
        batch.errors.extend(prefixed("talkgroups", out.errors));
        batch.talkgroups = Some(out.entries);
    }

    batch
}
