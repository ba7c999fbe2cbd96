// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use serde::{Deserialize, Serialize};

pub const MAX_SITE_NAME_LEN: usize = 128;
pub const MAX_SYSTEM_ID_LEN: usize = 16;
pub const MAX_BANDPLAN_LEN: usize = 64;

/// One trunked radio site: its control channels plus system identifiers.
///
/// `control_channels` is never empty once a site leaves the normalizer;
/// every entry is a canonical frequency string (see [`crate::freq`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub name: String,
    pub nac: Option<String>,
    pub sysid: Option<String>,
    pub wacn: Option<String>,
    pub control_channels: Vec<String>,
    #[serde(default)]
    pub alternate_channels: Vec<String>,
    pub bandplan: Option<String>,
}
