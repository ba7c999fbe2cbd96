// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Row normalization for talkgroup and site imports.
//!
//! Row problems never abort a batch: the offending row is dropped and a
//! [`RowError`] is recorded, so one call reports every bad row at once.
//! Whether any error blocks persistence is the caller's decision.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::csv::{parse_table, Row, Table};
use crate::freq::normalize_frequency_list;
use crate::model::site::{Site, MAX_BANDPLAN_LEN, MAX_SITE_NAME_LEN, MAX_SYSTEM_ID_LEN};
use crate::model::talkgroup::{
    Talkgroup, TalkgroupMode, DEFAULT_CATEGORY, MAX_CATEGORY_LEN, MAX_LABEL_LEN,
};
use crate::model::{clamp_chars, optional_text};

const TGID_HEADERS: &[&str] = &["tgid", "decimal"];
const LABEL_HEADERS: &[&str] = &["label", "alpha_tag", "alpha tag"];
const SITE_NAME_HEADERS: &[&str] = &["name", "site_name", "site"];
const CONTROL_HEADERS: &[&str] = &["control_channels", "control_channel_list", "control"];
const ALTERNATE_HEADERS: &[&str] = &["alternate_channels", "alt_channel_list", "alternate"];

/// CSV data rows are reported with the header counted as row 1.
const CSV_ROW_OFFSET: usize = 2;
/// Structured entries are reported 1-based.
const ENTRY_ROW_OFFSET: usize = 1;

/// One accumulated validation problem.
///
/// Serializes as its display string, e.g. `"row 3: invalid tgid 'x'"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// `None` for table-level problems such as a missing header.
    pub row: Option<usize>,
    pub message: String,
}

impl RowError {
    pub fn at(row: usize, message: impl Into<String>) -> Self {
        Self {
            row: Some(row),
            message: message.into(),
        }
    }

    pub fn table(message: impl Into<String>) -> Self {
        Self {
            row: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row {
            Some(row) => write!(f, "row {}: {}", row, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl Serialize for RowError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Accumulated normalization output: every valid entry plus every row error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Normalized<T> {
    pub errors: Vec<RowError>,
    pub entries: Vec<T>,
}

impl<T> Default for Normalized<T> {
    fn default() -> Self {
        Self {
            errors: Vec::new(),
            entries: Vec::new(),
        }
    }
}

impl<T> Normalized<T> {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Permissive boolean: `1`, `true`, `yes`, `y`, `on` (any case) are true.
pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

/// Like [`parse_flag`], but blank input means "not given".
pub fn parse_optional_flag(raw: &str) -> Option<bool> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(parse_flag(raw))
    }
}

fn parse_tgid(raw: &str) -> Result<u16, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("tgid is required".to_string());
    }
    raw.parse::<u16>()
        .map_err(|_| format!("invalid tgid '{raw}' (expected integer 0-65535)"))
}

/// Field values gathered from either input shape before defaults apply.
struct TalkgroupFields<'a> {
    tgid: u16,
    label: &'a str,
    mode: &'a str,
    encrypted: Option<bool>,
    category: &'a str,
    favorite: bool,
    enabled: Option<bool>,
}

impl TalkgroupFields<'_> {
    fn into_talkgroup(self) -> Talkgroup {
        let mode = TalkgroupMode::parse_or_default(self.mode);
        Talkgroup {
            tgid: self.tgid,
            label: clamp_chars(self.label.trim(), MAX_LABEL_LEN),
            mode,
            encrypted: self.encrypted.unwrap_or_else(|| mode.is_encrypted()),
            category: optional_text(self.category, MAX_CATEGORY_LEN)
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            favorite: self.favorite,
            filter_action: mode.filter_action(),
            enabled: self.enabled.unwrap_or(true),
        }
    }
}

fn cell<'a>(row: &'a Row, column: Option<&str>) -> &'a str {
    column
        .and_then(|c| row.get(c))
        .map(String::as_str)
        .unwrap_or("")
}

fn require_header<'t>(
    table: &'t Table,
    aliases: &[&str],
    errors: &mut Vec<RowError>,
) -> Option<&'t str> {
    let found = table.find_header(aliases);
    if found.is_none() {
        errors.push(RowError::table(format!(
            "missing required header: {}",
            aliases[0]
        )));
    }
    found
}

/// Deduplicate by tgid (last occurrence wins) and sort ascending.
fn collect_talkgroups(items: impl IntoIterator<Item = Talkgroup>) -> Vec<Talkgroup> {
    let mut by_tgid = BTreeMap::new();
    for tg in items {
        by_tgid.insert(tg.tgid, tg);
    }
    by_tgid.into_values().collect()
}

/// Restore the stored-set invariants on entries built elsewhere:
/// `filter_action` follows `mode`, tgids are unique (last wins) and sorted.
pub fn canonicalize_talkgroups(entries: Vec<Talkgroup>) -> Vec<Talkgroup> {
    collect_talkgroups(entries.into_iter().map(|mut tg| {
        tg.filter_action = tg.mode.filter_action();
        tg
    }))
}

/// Normalize pasted talkgroup CSV/TSV.
///
/// Requires `tgid` and `label` headers; optional columns are `mode`,
/// `encrypted`, `category`, `favorite` and `enabled`.
pub fn normalize_talkgroups_csv(text: &str) -> Normalized<Talkgroup> {
    let table = parse_table(text, None);
    let mut out = Normalized::default();

    let tgid_col = require_header(&table, TGID_HEADERS, &mut out.errors);
    let label_col = require_header(&table, LABEL_HEADERS, &mut out.errors);
    let (Some(tgid_col), Some(label_col)) = (tgid_col, label_col) else {
        return out;
    };
    let mode_col = table.find_header(&["mode"]);
    let encrypted_col = table.find_header(&["encrypted"]);
    let category_col = table.find_header(&["category"]);
    let favorite_col = table.find_header(&["favorite"]);
    let enabled_col = table.find_header(&["enabled"]);

    let mut accepted = Vec::with_capacity(table.rows.len());
    for (index, row) in table.rows.iter().enumerate() {
        let row_number = index + CSV_ROW_OFFSET;
        let tgid = match parse_tgid(cell(row, Some(tgid_col))) {
            Ok(tgid) => tgid,
            Err(msg) => {
                out.errors.push(RowError::at(row_number, msg));
                continue;
            }
        };
        let label = cell(row, Some(label_col));
        if label.trim().is_empty() {
            out.errors
                .push(RowError::at(row_number, format!("label is required for tgid {tgid}")));
            continue;
        }
        accepted.push(
            TalkgroupFields {
                tgid,
                label,
                mode: cell(row, mode_col),
                encrypted: parse_optional_flag(cell(row, encrypted_col)),
                category: cell(row, category_col),
                favorite: parse_flag(cell(row, favorite_col)),
                enabled: parse_optional_flag(cell(row, enabled_col)),
            }
            .into_talkgroup(),
        );
    }

    out.entries = collect_talkgroups(accepted);
    out
}

pub(crate) fn json_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn json_flag(value: Option<&Value>) -> Option<bool> {
    match value {
        Some(Value::Bool(b)) => Some(*b),
        Some(Value::Number(n)) => Some(n.as_f64().is_some_and(|v| v != 0.0)),
        Some(Value::String(s)) => parse_optional_flag(s),
        _ => None,
    }
}

fn json_tgid(value: Option<&Value>) -> Result<u16, String> {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u16::try_from(v).ok())
            .ok_or_else(|| format!("invalid tgid '{n}' (expected integer 0-65535)")),
        Some(Value::String(s)) => parse_tgid(s),
        None | Some(Value::Null) => Err("tgid is required".to_string()),
        Some(other) => Err(format!("invalid tgid '{other}' (expected integer 0-65535)")),
    }
}

fn first_present<'v>(obj: &'v serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'v Value> {
    keys.iter().find_map(|k| obj.get(*k)).filter(|v| !v.is_null())
}

/// Normalize already-structured talkgroup entries (JSON objects).
///
/// Unlike CSV input, a missing label falls back to `"TG <tgid>"`.
pub fn normalize_talkgroup_entries(entries: &[Value]) -> Normalized<Talkgroup> {
    let mut out = Normalized::default();
    let mut accepted = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let row_number = index + ENTRY_ROW_OFFSET;
        let Some(obj) = entry.as_object() else {
            out.errors
                .push(RowError::at(row_number, "entry must be a JSON object"));
            continue;
        };
        let tgid = match json_tgid(obj.get("tgid")) {
            Ok(tgid) => tgid,
            Err(msg) => {
                out.errors.push(RowError::at(row_number, msg));
                continue;
            }
        };

        let mut label = json_text(first_present(obj, &["label", "tag"]));
        if label.trim().is_empty() {
            label = Talkgroup::default_label(tgid);
        }
        let mode = json_text(obj.get("mode"));
        let category = json_text(obj.get("category"));

        accepted.push(
            TalkgroupFields {
                tgid,
                label: &label,
                mode: &mode,
                encrypted: json_flag(obj.get("encrypted")),
                category: &category,
                favorite: json_flag(obj.get("favorite")).unwrap_or(false),
                enabled: json_flag(obj.get("enabled")),
            }
            .into_talkgroup(),
        );
    }

    out.entries = collect_talkgroups(accepted);
    out
}

struct SiteFields<'a> {
    name: &'a str,
    control: Vec<String>,
    alternate: Vec<String>,
    nac: &'a str,
    sysid: &'a str,
    wacn: &'a str,
    bandplan: &'a str,
}

impl SiteFields<'_> {
    fn into_site(self, row_number: usize) -> Result<Site, RowError> {
        let name = self.name.trim();
        if self.control.is_empty() {
            return Err(RowError::at(
                row_number,
                format!("site '{name}' needs at least one valid control channel frequency"),
            ));
        }
        Ok(Site {
            name: clamp_chars(name, MAX_SITE_NAME_LEN),
            nac: optional_text(self.nac, MAX_SYSTEM_ID_LEN),
            sysid: optional_text(self.sysid, MAX_SYSTEM_ID_LEN),
            wacn: optional_text(self.wacn, MAX_SYSTEM_ID_LEN),
            control_channels: self.control,
            alternate_channels: self.alternate,
            bandplan: optional_text(self.bandplan, MAX_BANDPLAN_LEN),
        })
    }
}

/// Normalize pasted site CSV/TSV.
///
/// Requires a site name and control channel column. Channel cells may hold
/// several frequencies separated by `;`, `|` or whitespace.
pub fn normalize_sites_csv(text: &str) -> Normalized<Site> {
    let table = parse_table(text, None);
    let mut out = Normalized::default();

    let name_col = require_header(&table, SITE_NAME_HEADERS, &mut out.errors);
    let control_col = require_header(&table, CONTROL_HEADERS, &mut out.errors);
    let (Some(name_col), Some(control_col)) = (name_col, control_col) else {
        return out;
    };
    let alternate_col = table.find_header(ALTERNATE_HEADERS);
    let nac_col = table.find_header(&["nac"]);
    let sysid_col = table.find_header(&["sysid"]);
    let wacn_col = table.find_header(&["wacn"]);
    let bandplan_col = table.find_header(&["bandplan"]);

    for (index, row) in table.rows.iter().enumerate() {
        let row_number = index + CSV_ROW_OFFSET;
        let name = cell(row, Some(name_col));
        if name.trim().is_empty() {
            out.errors
                .push(RowError::at(row_number, "site name is required"));
            continue;
        }
        let fields = SiteFields {
            name,
            control: normalize_frequency_list(cell(row, Some(control_col))),
            alternate: normalize_frequency_list(cell(row, alternate_col)),
            nac: cell(row, nac_col),
            sysid: cell(row, sysid_col),
            wacn: cell(row, wacn_col),
            bandplan: cell(row, bandplan_col),
        };
        match fields.into_site(row_number) {
            Ok(site) => out.entries.push(site),
            Err(err) => out.errors.push(err),
        }
    }
    out
}

fn json_frequencies(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .flat_map(|item| normalize_frequency_list(&json_text(Some(item))))
            .collect(),
        other => normalize_frequency_list(&json_text(other)),
    }
}

/// Normalize structured site objects; a missing name becomes `"Site N"`.
pub fn normalize_site_entries(entries: &[Value]) -> Normalized<Site> {
    let mut out = Normalized::default();

    for (index, entry) in entries.iter().enumerate() {
        let row_number = index + ENTRY_ROW_OFFSET;
        let Some(obj) = entry.as_object() else {
            out.errors
                .push(RowError::at(row_number, "site must be a JSON object"));
            continue;
        };

        let mut name = json_text(first_present(obj, &["name", "siteName"]));
        if name.trim().is_empty() {
            name = format!("Site {row_number}");
        }
        let nac = json_text(obj.get("nac"));
        let sysid = json_text(obj.get("sysid"));
        let wacn = json_text(obj.get("wacn"));
        let bandplan = json_text(obj.get("bandplan"));

        let fields = SiteFields {
            name: &name,
            control: json_frequencies(first_present(
                obj,
                &["controlChannels", "control_channels"],
            )),
            alternate: json_frequencies(first_present(
                obj,
                &["alternateChannels", "alternate_channels"],
            )),
            nac: &nac,
            sysid: &sysid,
            wacn: &wacn,
            bandplan: &bandplan,
        };
        match fields.into_site(row_number) {
            Ok(site) => out.entries.push(site),
            Err(err) => out.errors.push(err),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::talkgroup::FilterAction;
    use serde_json::json;

    const SAMPLE: &str = "tgid,label,mode,encrypted,category,favorite,enabled\n\
        1201,Dispatch A,D,false,dispatch,true,true\n\
        1299,Encrypted Ops,DE,true,ops,false,true";

    #[test]
    fn test_well_formed_csv_has_no_errors() {
        let out = normalize_talkgroups_csv(SAMPLE);
        assert!(out.is_clean());
        assert_eq!(out.entries.len(), 2);
        assert_eq!(out.entries[0].tgid, 1201);
        assert!(out.entries[0].favorite);
        assert_eq!(out.entries[0].category, "dispatch");
        assert_eq!(out.entries[1].filter_action, FilterAction::Deny);
        assert!(out.entries[1].encrypted);
    }

    #[test]
    fn test_output_sorted_by_tgid() {
        let out = normalize_talkgroups_csv("tgid,label\n300,C\n100,A\n200,B");
        let ids: Vec<u16> = out.entries.iter().map(|t| t.tgid).collect();
        assert_eq!(ids, vec![100, 200, 300]);
    }

    #[test]
    fn test_duplicate_tgid_last_row_wins() {
        let out = normalize_talkgroups_csv("tgid,label,mode\n1201,First,D\n1201,Second,TE");
        assert!(out.is_clean());
        assert_eq!(out.entries.len(), 1);
        assert_eq!(out.entries[0].label, "Second");
        assert_eq!(out.entries[0].mode, TalkgroupMode::TE);
    }

    #[test]
    fn test_bad_rows_are_dropped_with_row_numbers() {
        let out = normalize_talkgroups_csv("tgid,label\nabc,Bad\n70000,Too big\n5,\n6,Ok");
        assert_eq!(out.entries.len(), 1);
        assert_eq!(out.entries[0].tgid, 6);
        let messages: Vec<String> = out.errors.iter().map(ToString::to_string).collect();
        assert_eq!(messages.len(), 3);
        assert!(messages[0].starts_with("row 2: invalid tgid 'abc'"));
        assert!(messages[1].starts_with("row 3: invalid tgid '70000'"));
        assert_eq!(messages[2], "row 4: label is required for tgid 5");
    }

    #[test]
    fn test_missing_headers_reported_once() {
        let out = normalize_talkgroups_csv("id,name\n1,x");
        assert!(out.entries.is_empty());
        let messages: Vec<String> = out.errors.iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            vec![
                "missing required header: tgid",
                "missing required header: label"
            ]
        );
    }

    #[test]
    fn test_empty_input_yields_header_errors_not_rows() {
        let out = normalize_talkgroups_csv("");
        assert!(out.entries.is_empty());
        assert_eq!(out.errors.len(), 2);
    }

    #[test]
    fn test_mode_defaults_and_encryption_derivation() {
        let out = normalize_talkgroups_csv("tgid,label,mode,encrypted\n1,A,analog,\n2,B,te,\n3,C,D,yes");
        assert_eq!(out.entries[0].mode, TalkgroupMode::D);
        assert!(!out.entries[0].encrypted);
        assert!(out.entries[1].encrypted);
        // explicit flag wins over mode
        assert!(out.entries[2].encrypted);
        assert_eq!(out.entries[2].filter_action, FilterAction::Allow);
    }

    #[test]
    fn test_enabled_defaults_true_and_parses_permissively() {
        let out = normalize_talkgroups_csv("tgid,label,enabled,favorite\n1,A,,ON\n2,B,no,0\n3,C,Y,");
        assert!(out.entries[0].enabled);
        assert!(out.entries[0].favorite);
        assert!(!out.entries[1].enabled);
        assert!(!out.entries[1].favorite);
        assert!(out.entries[2].enabled);
    }

    #[test]
    fn test_label_and_category_clamped() {
        let long = "x".repeat(200);
        let out = normalize_talkgroups_csv(&format!("tgid,label,category\n1,{long},{long}"));
        assert_eq!(out.entries[0].label.chars().count(), MAX_LABEL_LEN);
        assert_eq!(out.entries[0].category.chars().count(), MAX_CATEGORY_LEN);
    }

    #[test]
    fn test_radioreference_style_headers() {
        let out = normalize_talkgroups_csv("Decimal,Alpha Tag,Mode\n1201,Dispatch,D");
        assert!(out.is_clean());
        assert_eq!(out.entries[0].label, "Dispatch");
    }

    #[test]
    fn test_structured_entries_default_label() {
        let entries = vec![
            json!({"tgid": 42}),
            json!({"tgid": "7", "label": "Seven", "mode": "de", "enabled": false}),
            json!({"tgid": -1}),
            json!("nope"),
        ];
        let out = normalize_talkgroup_entries(&entries);
        assert_eq!(out.entries.len(), 2);
        assert_eq!(out.entries[0].tgid, 7);
        assert!(!out.entries[0].enabled);
        assert_eq!(out.entries[0].mode, TalkgroupMode::DE);
        assert_eq!(out.entries[1].label, "TG 42");
        let messages: Vec<String> = out.errors.iter().map(ToString::to_string).collect();
        assert!(messages[0].starts_with("row 3: invalid tgid"));
        assert_eq!(messages[1], "row 4: entry must be a JSON object");
    }

    #[test]
    fn test_structured_explicit_encrypted_wins() {
        let out = normalize_talkgroup_entries(&[json!({"tgid": 1, "mode": "DE", "encrypted": false})]);
        assert!(!out.entries[0].encrypted);
        assert_eq!(out.entries[0].filter_action, FilterAction::Deny);
    }

    #[test]
    fn test_sites_csv_normalizes_frequencies() {
        let text = "name,control_channels,alternate_channels,nac,sysid,wacn,bandplan\n\
            North,771.106250;772.50000,773.0,293,3AB,BEE00,\n\
            South,0 -5,,,,,";
        let out = normalize_sites_csv(text);
        assert_eq!(out.entries.len(), 1);
        let site = &out.entries[0];
        assert_eq!(site.control_channels, vec!["771.10625", "772.5"]);
        assert_eq!(site.alternate_channels, vec!["773"]);
        assert_eq!(site.nac.as_deref(), Some("293"));
        assert_eq!(site.bandplan, None);
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].to_string().starts_with("row 3: site 'South'"));
    }

    #[test]
    fn test_sites_csv_requires_name() {
        let out = normalize_sites_csv("name,control\n,851.0125");
        assert!(out.entries.is_empty());
        assert_eq!(out.errors[0].to_string(), "row 2: site name is required");
    }

    #[test]
    fn test_site_entries_default_name_and_array_channels() {
        let entries = vec![
            json!({"controlChannels": ["851.012500", 852.5], "nac": 293}),
            json!({"name": "Empty", "controlChannels": []}),
        ];
        let out = normalize_site_entries(&entries);
        assert_eq!(out.entries.len(), 1);
        assert_eq!(out.entries[0].name, "Site 1");
        assert_eq!(out.entries[0].control_channels, vec!["851.0125", "852.5"]);
        assert_eq!(out.entries[0].nac.as_deref(), Some("293"));
        assert_eq!(out.errors.len(), 1);
    }

    #[test]
    fn test_canonicalize_restores_invariants() {
        let mut stale = Talkgroup::new(9, "Nine", TalkgroupMode::TE);
        stale.filter_action = FilterAction::Allow;
        let out = canonicalize_talkgroups(vec![
            stale,
            Talkgroup::new(3, "Old", TalkgroupMode::D),
            Talkgroup::new(3, "New", TalkgroupMode::D),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].label, "New");
        assert_eq!(out[1].filter_action, FilterAction::Deny);
    }

    #[test]
    fn test_row_error_serializes_as_string() {
        let value = serde_json::to_value(RowError::at(4, "boom")).unwrap();
        assert_eq!(value, json!("row 4: boom"));
    }
}
