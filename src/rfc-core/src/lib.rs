// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

pub mod csv;
pub mod filter;
pub mod freq;
pub mod import;
pub mod model;
pub mod name;
pub mod normalize;

pub type DynResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub use filter::{build_filter_policy, FilterPolicy, PolicyKind};
pub use import::{ImportBatch, ImportInput, TableKind};
pub use model::profile::{Profile, ProfileMeta, SystemInfo};
pub use model::site::Site;
pub use model::talkgroup::{FilterAction, Talkgroup, TalkgroupMode};
pub use name::{NameError, ProfileName};
pub use normalize::{
    canonicalize_talkgroups, normalize_site_entries, normalize_sites_csv,
    normalize_talkgroup_entries, normalize_talkgroups_csv, Normalized, RowError,
};
