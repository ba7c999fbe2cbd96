// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreResult;
use crate::json::write_json;
use crate::layout::StoreLayout;

/// Marker asking the decoder supervisor to re-read its configuration.
/// Fire-and-forget: nothing waits for the supervisor to act on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadRequest {
    pub requested_at: String,
    pub profile: String,
    pub reason: String,
}

pub fn request_reload(
    layout: &StoreLayout,
    profile: &str,
    reason: &str,
    requested_at: &str,
) -> StoreResult<ReloadRequest> {
    let request = ReloadRequest {
        requested_at: requested_at.to_string(),
        profile: profile.to_string(),
        reason: reason.to_string(),
    };
    write_json(&layout.reload_path(), &request)?;
    debug!("Reload requested for '{}' ({})", profile, reason);
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::read_json;
    use tempfile::TempDir;

    #[test]
    fn test_reload_marker_overwritten() {
        let dir = TempDir::new().unwrap();
        let layout = StoreLayout::new(dir.path(), dir.path());
        request_reload(&layout, "a", "talkgroups", "2026-01-01T00:00:00Z").unwrap();
        request_reload(&layout, "b", "profile", "2026-01-02T00:00:00Z").unwrap();

        let marker: ReloadRequest = read_json(&layout.reload_path()).unwrap().unwrap();
        assert_eq!(marker.profile, "b");
        assert_eq!(marker.reason, "profile");
        assert_eq!(marker.requested_at, "2026-01-02T00:00:00Z");
    }
}
