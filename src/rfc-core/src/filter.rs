// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Talkgroup filter policy.
//!
//! The policy is a pure function of the talkgroup set. It is recomputed on
//! every save and never stored apart from the entries it was derived from.

use serde::{Deserialize, Serialize};

use crate::model::talkgroup::{FilterAction, Talkgroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    Whitelist,
    Blacklist,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPolicy {
    pub policy: PolicyKind,
    /// Enabled entries whose mode allows decoding.
    pub allow: Vec<u16>,
    /// Enabled entries whose mode is encrypted.
    pub deny: Vec<u16>,
    /// `allow` under a whitelist, `deny` under a blacklist.
    pub effective: Vec<u16>,
}

/// Derive the filter policy: whitelist iff any enabled entry is allowed.
pub fn build_filter_policy(talkgroups: &[Talkgroup]) -> FilterPolicy {
    let ids_with = |action: FilterAction| -> Vec<u16> {
        let mut ids: Vec<u16> = talkgroups
            .iter()
            .filter(|tg| tg.enabled && tg.filter_action == action)
            .map(|tg| tg.tgid)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    };

    let allow = ids_with(FilterAction::Allow);
    let deny = ids_with(FilterAction::Deny);
    let (policy, effective) = if allow.is_empty() {
        (PolicyKind::Blacklist, deny.clone())
    } else {
        (PolicyKind::Whitelist, allow.clone())
    };

    FilterPolicy {
        policy,
        allow,
        deny,
        effective,
    }
}
