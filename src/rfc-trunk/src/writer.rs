// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Trunk and tags file generation.
//!
//! Output depends only on the inputs, so regenerating from unchanged data
//! yields byte-identical files.

use std::io;
use std::path::{Path, PathBuf};

use rfc_app::write_atomic;
use rfc_core::{ProfileMeta, ProfileName, Site, Talkgroup};
use tracing::info;

use crate::tsv::format_row;

pub const TRUNK_COLUMNS: [&str; 9] = [
    "sysname",
    "site_name",
    "control_channel_list",
    "alt_channel_list",
    "nac",
    "sysid",
    "wacn",
    "bandplan",
    "tags_file",
];
pub const TAGS_COLUMNS: [&str; 3] = ["tgid", "tag", "mode"];
pub const DEFAULT_BANDPLAN: &str = "P25 Auto";

pub fn trunk_file_name(profile: &ProfileName) -> String {
    profile.file_name("trunk.tsv")
}

pub fn tags_file_name(profile: &ProfileName) -> String {
    profile.file_name("tags.tsv")
}

fn or_fallback<'a>(value: &'a Option<String>, fallback: &'a Option<String>) -> &'a str {
    value
        .as_deref()
        .or(fallback.as_deref())
        .unwrap_or("")
}

/// Render the trunk table: header plus one row per site.
///
/// Site identifiers fall back to the profile-level system values; the
/// bandplan falls back further to [`DEFAULT_BANDPLAN`].
pub fn render_trunk(profile: &ProfileName, sites: &[Site], meta: &ProfileMeta) -> String {
    let sysname = meta
        .system_name
        .as_deref()
        .or(meta.label.as_deref())
        .unwrap_or(profile.as_str());
    let tags_file = tags_file_name(profile);

    let mut out = format_row(&TRUNK_COLUMNS);
    out.push('\n');
    for site in sites {
        let bandplan = site
            .bandplan
            .as_deref()
            .or(meta.bandplan.as_deref())
            .unwrap_or(DEFAULT_BANDPLAN);
        let control = site.control_channels.join(",");
        let alternate = site.alternate_channels.join(",");
        let row = [
            sysname,
            site.name.as_str(),
            control.as_str(),
            alternate.as_str(),
            or_fallback(&site.nac, &meta.nac),
            or_fallback(&site.sysid, &meta.sysid),
            or_fallback(&site.wacn, &meta.wacn),
            bandplan,
            tags_file.as_str(),
        ];
        out.push_str(&format_row(&row));
        out.push('\n');
    }
    out
}

/// Render the tags table: header plus one row per talkgroup, in input order.
pub fn render_tags(talkgroups: &[Talkgroup]) -> String {
    let mut out = format_row(&TAGS_COLUMNS);
    out.push('\n');
    for tg in talkgroups {
        let tgid = tg.tgid.to_string();
        out.push_str(&format_row(&[tgid.as_str(), tg.label.as_str(), tg.mode.as_str()]));
        out.push('\n');
    }
    out
}

/// Write `<profile>.trunk.tsv` into `dir`, replacing any previous file.
pub fn write_trunk_tsv(
    dir: &Path,
    profile: &ProfileName,
    sites: &[Site],
    meta: &ProfileMeta,
) -> io::Result<PathBuf> {
    let path = dir.join(trunk_file_name(profile));
    write_atomic(&path, render_trunk(profile, sites, meta).as_bytes())?;
    info!("Wrote trunk file {} ({} sites)", path.display(), sites.len());
    Ok(path)
}

/// Write `<profile>.tags.tsv` into `dir`, replacing any previous file.
pub fn write_tags_tsv(
    dir: &Path,
    profile: &ProfileName,
    talkgroups: &[Talkgroup],
) -> io::Result<PathBuf> {
    let path = dir.join(tags_file_name(profile));
    write_atomic(&path, render_tags(talkgroups).as_bytes())?;
    info!(
        "Wrote tags file {} ({} talkgroups)",
        path.display(),
        talkgroups.len()
    );
    Ok(path)
}
