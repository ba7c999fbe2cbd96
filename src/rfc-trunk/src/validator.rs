// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Pre-flight validation of a profile's trunk file.
//!
//! Structural problems stop validation at the first error. Missing tag
//! files are only checked once the trunk file itself parsed cleanly, and can
//! optionally be repaired by creating header-only placeholders.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use rfc_app::write_atomic;
use rfc_core::ProfileName;
use serde::Serialize;
use tracing::{info, warn};

use crate::tsv::parse_document;
use crate::writer::{render_tags, tags_file_name};

const TAGS_SUFFIX: &str = ".tags.tsv";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Create header-only tag files for missing relative references.
    pub create_missing_tags: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationDetails {
    pub trunk_file: String,
    /// Data rows parsed before validation finished or halted.
    pub parsed_rows: usize,
    pub expected_columns: Option<usize>,
    pub referenced_tag_files: Vec<String>,
    pub created_tag_files: Vec<String>,
    pub missing_tag_files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub ok: bool,
    /// First error encountered, if any.
    pub error: Option<String>,
    pub details: ValidationDetails,
}

impl ValidationReport {
    fn pass(details: ValidationDetails) -> Self {
        Self {
            ok: true,
            error: None,
            details,
        }
    }

    fn fail(error: impl Into<String>, details: ValidationDetails) -> Self {
        let error = error.into();
        warn!("Trunk validation failed for {}: {}", details.trunk_file, error);
        Self {
            ok: false,
            error: Some(error),
            details,
        }
    }
}

/// Relative references must stay below the profile directory.
fn is_contained(reference: &Path) -> bool {
    reference
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}

/// A file in the same directory whose name differs only in letter case.
fn case_insensitive_sibling(path: &Path) -> Option<String> {
    let wanted = path.file_name()?.to_string_lossy().to_string();
    let parent = path.parent()?;
    fs::read_dir(parent)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .find(|name| name != &wanted && name.eq_ignore_ascii_case(&wanted))
}

enum TagCheck {
    Present,
    Created,
    Missing(String),
}

fn check_tag_file(reference: &str, profiles_dir: &Path, opts: ValidateOptions) -> TagCheck {
    let reference_path = Path::new(reference);
    let relative = !reference_path.is_absolute();
    if relative && !is_contained(reference_path) {
        return TagCheck::Missing(format!(
            "tags file reference '{reference}' escapes the profile directory"
        ));
    }
    let resolved: PathBuf = if relative {
        profiles_dir.join(reference_path)
    } else {
        reference_path.to_path_buf()
    };
    if resolved.is_file() {
        return TagCheck::Present;
    }

    if opts.create_missing_tags && relative {
        return match write_atomic(&resolved, render_tags(&[]).as_bytes()) {
            Ok(()) => {
                info!("Created placeholder tags file {}", resolved.display());
                TagCheck::Created
            }
            Err(e) => TagCheck::Missing(format!(
                "tags file not found: {reference}; creating placeholder failed: {e}"
            )),
        };
    }

    if let Some(sibling) = case_insensitive_sibling(&resolved) {
        return TagCheck::Missing(format!(
            "tags file not found: {reference}; found '{sibling}' which differs only in letter case (rename it or fix the trunk file)"
        ));
    }
    if relative {
        TagCheck::Missing(format!(
            "tags file not found: {reference}; re-run with createMissingTags to create an empty placeholder"
        ))
    } else {
        TagCheck::Missing(format!(
            "tags file not found: {reference} (absolute paths are never auto-created)"
        ))
    }
}

/// Validate `trunk_path` for `profile`, resolving relative tag references
/// against `profiles_dir`.
///
/// Only writes to disk when `opts.create_missing_tags` is set and a
/// referenced tags file is missing.
pub fn validate_trunk_file(
    trunk_path: &Path,
    profile: &ProfileName,
    profiles_dir: &Path,
    opts: ValidateOptions,
) -> ValidationReport {
    let mut details = ValidationDetails {
        trunk_file: trunk_path.display().to_string(),
        ..ValidationDetails::default()
    };

    let content = match fs::read_to_string(trunk_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return ValidationReport::fail(
                format!("trunk file not found: {}", trunk_path.display()),
                details,
            )
        }
        Err(e) => {
            return ValidationReport::fail(
                format!("failed to read trunk file {}: {}", trunk_path.display(), e),
                details,
            )
        }
    };

    let parsed = parse_document(&content);
    details.parsed_rows = parsed.table.rows.len();
    details.expected_columns = parsed.table.expected_columns();
    if let Some(err) = parsed.error {
        return ValidationReport::fail(err.to_string(), details);
    }
    if parsed.table.rows.is_empty() {
        return ValidationReport::fail("no usable rows in trunk file", details);
    }

    let mut referenced: BTreeSet<String> = parsed
        .table
        .fields()
        .map(str::trim)
        .filter(|f| f.to_ascii_lowercase().ends_with(TAGS_SUFFIX))
        .map(str::to_string)
        .collect();
    if referenced.is_empty() {
        referenced.insert(tags_file_name(profile));
    }
    details.referenced_tag_files = referenced.iter().cloned().collect();

    let mut first_error = None;
    for reference in &referenced {
        match check_tag_file(reference, profiles_dir, opts) {
            TagCheck::Present => {}
            TagCheck::Created => details.created_tag_files.push(reference.clone()),
            TagCheck::Missing(message) => {
                details.missing_tag_files.push(reference.clone());
                if first_error.is_none() {
                    first_error = Some(message);
                }
            }
        }
    }

    match first_error {
        Some(error) => ValidationReport::fail(error, details),
        None => ValidationReport::pass(details),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tsv::format_row;
    use crate::writer::{write_tags_tsv, write_trunk_tsv, TRUNK_COLUMNS};
    use rfc_core::{ProfileMeta, Site};
    use tempfile::TempDir;

    fn profile() -> ProfileName {
        ProfileName::parse("metro").unwrap()
    }

    fn sites(n: usize) -> Vec<Site> {
        (0..n)
            .map(|i| Site {
                name: format!("Site {}", i + 1),
                nac: None,
                sysid: None,
                wacn: None,
                control_channels: vec!["851.0125".to_string()],
                alternate_channels: vec![],
                bandplan: None,
            })
            .collect()
    }

    #[test]
    fn test_written_trunk_validates() {
        let dir = TempDir::new().unwrap();
        let trunk = write_trunk_tsv(dir.path(), &profile(), &sites(3), &ProfileMeta::default())
            .unwrap();
        write_tags_tsv(dir.path(), &profile(), &[]).unwrap();

        let report = validate_trunk_file(&trunk, &profile(), dir.path(), ValidateOptions::default());
        assert!(report.ok, "{:?}", report.error);
        assert_eq!(report.details.parsed_rows, 3);
        assert_eq!(report.details.expected_columns, Some(TRUNK_COLUMNS.len()));
        assert_eq!(report.details.referenced_tag_files, vec!["metro.tags.tsv"]);
    }

    #[test]
    fn test_column_mismatch_reports_line() {
        let dir = TempDir::new().unwrap();
        let trunk = dir.path().join("metro.trunk.tsv");
        let short = ["a", "b", "c", "d", "e", "f", "g"];
        let content = format!("{}\n{}\n", format_row(&TRUNK_COLUMNS), format_row(&short));
        fs::write(&trunk, content).unwrap();

        let report = validate_trunk_file(&trunk, &profile(), dir.path(), ValidateOptions::default());
        assert!(!report.ok);
        assert_eq!(
            report.error.as_deref(),
            Some("line 2: expected 9 columns, found 7")
        );
        assert_eq!(report.details.parsed_rows, 0);
        assert_eq!(report.details.expected_columns, Some(9));
    }

    #[test]
    fn test_header_only_has_no_usable_rows() {
        let dir = TempDir::new().unwrap();
        let trunk = dir.path().join("metro.trunk.tsv");
        fs::write(&trunk, format!("# generated\n{}\n\n", format_row(&TRUNK_COLUMNS))).unwrap();

        let report = validate_trunk_file(&trunk, &profile(), dir.path(), ValidateOptions::default());
        assert_eq!(report.error.as_deref(), Some("no usable rows in trunk file"));
    }

    #[test]
    fn test_missing_trunk_file() {
        let dir = TempDir::new().unwrap();
        let trunk = dir.path().join("metro.trunk.tsv");
        let report = validate_trunk_file(&trunk, &profile(), dir.path(), ValidateOptions::default());
        assert!(!report.ok);
        assert!(report.error.unwrap().starts_with("trunk file not found"));
    }

    #[test]
    fn test_missing_tags_suggests_repair_flag() {
        let dir = TempDir::new().unwrap();
        let trunk = write_trunk_tsv(dir.path(), &profile(), &sites(1), &ProfileMeta::default())
            .unwrap();

        let report = validate_trunk_file(&trunk, &profile(), dir.path(), ValidateOptions::default());
        assert!(!report.ok);
        let error = report.error.unwrap();
        assert!(error.contains("metro.tags.tsv"));
        assert!(error.contains("createMissingTags"));
        assert_eq!(report.details.missing_tag_files, vec!["metro.tags.tsv"]);
        assert!(!dir.path().join("metro.tags.tsv").exists());
    }

    #[test]
    fn test_create_missing_tags_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let trunk = write_trunk_tsv(dir.path(), &profile(), &sites(1), &ProfileMeta::default())
            .unwrap();

        let opts = ValidateOptions {
            create_missing_tags: true,
        };
        let report = validate_trunk_file(&trunk, &profile(), dir.path(), opts);
        assert!(report.ok, "{:?}", report.error);
        assert_eq!(report.details.created_tag_files, vec!["metro.tags.tsv"]);
        assert_eq!(
            fs::read_to_string(dir.path().join("metro.tags.tsv")).unwrap(),
            "\"tgid\"\t\"tag\"\t\"mode\"\n"
        );
    }

    #[test]
    fn test_case_collision_is_called_out() {
        let dir = TempDir::new().unwrap();
        let trunk = write_trunk_tsv(dir.path(), &profile(), &sites(1), &ProfileMeta::default())
            .unwrap();
        fs::write(dir.path().join("METRO.tags.tsv"), "").unwrap();

        let report = validate_trunk_file(&trunk, &profile(), dir.path(), ValidateOptions::default());
        // Case-insensitive filesystems resolve the reference directly.
        if !report.ok {
            assert!(report.error.unwrap().contains("METRO.tags.tsv"));
        }
    }

    #[test]
    fn test_traversal_reference_is_never_created() {
        let dir = TempDir::new().unwrap();
        let profiles = dir.path().join("profiles");
        fs::create_dir_all(&profiles).unwrap();
        let trunk = profiles.join("metro.trunk.tsv");
        let row = ["Metro", "N", "851.0125", "", "", "", "", "P25 Auto", "../evil.tags.tsv"];
        fs::write(
            &trunk,
            format!("{}\n{}\n", format_row(&TRUNK_COLUMNS), format_row(&row)),
        )
        .unwrap();

        let opts = ValidateOptions {
            create_missing_tags: true,
        };
        let report = validate_trunk_file(&trunk, &profile(), &profiles, opts);
        assert!(!report.ok);
        assert!(report.error.unwrap().contains("escapes the profile directory"));
        assert!(!dir.path().join("evil.tags.tsv").exists());
    }

    #[test]
    fn test_reference_match_is_case_insensitive_suffix() {
        let dir = TempDir::new().unwrap();
        let trunk = dir.path().join("metro.trunk.tsv");
        let row = ["Metro", "N", "851.0125", "", "", "", "", "P25 Auto", "Other.TAGS.TSV"];
        fs::write(
            &trunk,
            format!("{}\n{}\n", format_row(&TRUNK_COLUMNS), format_row(&row)),
        )
        .unwrap();
        fs::write(dir.path().join("Other.TAGS.TSV"), "").unwrap();

        let report = validate_trunk_file(&trunk, &profile(), dir.path(), ValidateOptions::default());
        assert!(report.ok, "{:?}", report.error);
        assert_eq!(report.details.referenced_tag_files, vec!["Other.TAGS.TSV"]);
    }
}
