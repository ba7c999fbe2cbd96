// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Decoder argv handling: stored-form rewriting and launch-time expansion.

use rfc_core::ProfileName;
use rfc_trunk::trunk_file_name;

pub const PROFILE_PLACEHOLDER: &str = "{PROFILE}";
pub const PROFILES_DIR_PLACEHOLDER: &str = "{PROFILES_DIR}";
pub const RUNTIME_DIR_PLACEHOLDER: &str = "{RUNTIME_DIR}";
pub const FILTER_FILE_PLACEHOLDER: &str = "{TG_FILTER_FILE}";

pub const DEFAULT_COMMAND: &str =
    "python3 rx.py --args rtl -S 2400000 -T {PROFILES_DIR}/{PROFILE}.trunk.tsv -2 -V -U";

const TRUNK_FLAG: &str = "-T";

/// Split a command string into argv tokens with shell quoting rules.
/// `None` when quotes are unbalanced.
pub fn split_command(command: &str) -> Option<Vec<String>> {
    shlex::split(command)
}

/// Template with only `{PROFILE}` filled in.
pub fn default_command(template: &[String], profile: &ProfileName) -> Vec<String> {
    template
        .iter()
        .map(|token| token.replace(PROFILE_PLACEHOLDER, profile.as_str()))
        .collect()
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Rewrite `<profile>.tsv` to `<profile>.trunk.tsv` when it is a whole path
/// component, so `xmetro.tsv` is left alone for profile `metro`.
fn rewrite_legacy_trunk(token: &str, profile: &ProfileName) -> String {
    let legacy = profile.file_name("tsv");
    let Some(stem) = token.strip_suffix(legacy.as_str()) else {
        return token.to_string();
    };
    if stem.chars().next_back().is_some_and(is_name_char) {
        return token.to_string();
    }
    format!("{stem}{}", trunk_file_name(profile))
}

/// Bring a stored command into canonical form for `profile`.
///
/// Legacy trunk names are renamed and the `-T` argument always points at
/// `<decoder_profiles_dir>/<profile>.trunk.tsv`.
pub fn rewrite_command(
    tokens: &[String],
    profile: &ProfileName,
    decoder_profiles_dir: &str,
) -> Vec<String> {
    let mut out: Vec<String> = tokens
        .iter()
        .map(|token| rewrite_legacy_trunk(token, profile))
        .collect();

    let trunk_path = format!(
        "{}/{}",
        decoder_profiles_dir.trim_end_matches('/'),
        trunk_file_name(profile)
    );
    match out.iter().position(|token| token == TRUNK_FLAG) {
        Some(i) if i + 1 < out.len() => out[i + 1] = trunk_path,
        Some(_) => out.push(trunk_path),
        None => {
            out.push(TRUNK_FLAG.to_string());
            out.push(trunk_path);
        }
    }
    out
}

/// Concrete values for launch-time placeholder expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchContext {
    pub profile: String,
    pub profiles_dir: String,
    pub runtime_dir: String,
    /// Expansion of `{TG_FILTER_FILE}`: the profile's talkgroups document.
    pub talkgroups_file: String,
}

pub fn expand_placeholders(tokens: &[String], ctx: &LaunchContext) -> Vec<String> {
    tokens
        .iter()
        .map(|token| {
            token
                .replace(PROFILE_PLACEHOLDER, &ctx.profile)
                .replace(PROFILES_DIR_PLACEHOLDER, &ctx.profiles_dir)
                .replace(RUNTIME_DIR_PLACEHOLDER, &ctx.runtime_dir)
                .replace(FILTER_FILE_PLACEHOLDER, &ctx.talkgroups_file)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(s: &str) -> Vec<String> {
        split_command(s).unwrap()
    }

    fn metro() -> ProfileName {
        ProfileName::parse("metro").unwrap()
    }

    #[test]
    fn test_split_command_honours_quotes() {
        assert_eq!(
            argv("rx.py --args 'rtl=0 buflen=1' -V"),
            ["rx.py", "--args", "rtl=0 buflen=1", "-V"]
        );
        assert_eq!(split_command("rx.py \"-T"), None);
    }

    #[test]
    fn test_default_command_fills_profile_only() {
        let out = default_command(&argv(DEFAULT_COMMAND), &metro());
        assert!(out.contains(&"{PROFILES_DIR}/metro.trunk.tsv".to_string()));
    }

    #[test]
    fn test_rewrite_replaces_existing_trunk_arg() {
        let out = rewrite_command(&argv("rx.py -T /old/metro.tsv -V"), &metro(), "/config/");
        assert_eq!(out, argv("rx.py -T /config/metro.trunk.tsv -V"));
    }

    #[test]
    fn test_rewrite_appends_missing_trunk_arg() {
        let out = rewrite_command(&argv("rx.py -V"), &metro(), "{PROFILES_DIR}");
        assert_eq!(out, argv("rx.py -V -T {PROFILES_DIR}/metro.trunk.tsv"));

        let out = rewrite_command(&argv("rx.py -T"), &metro(), "/cfg");
        assert_eq!(out, argv("rx.py -T /cfg/metro.trunk.tsv"));
    }

    #[test]
    fn test_legacy_rewrite_respects_boundaries() {
        let p = metro();
        assert_eq!(rewrite_legacy_trunk("/a/metro.tsv", &p), "/a/metro.trunk.tsv");
        assert_eq!(rewrite_legacy_trunk("metro.tsv", &p), "metro.trunk.tsv");
        assert_eq!(rewrite_legacy_trunk("/a/xmetro.tsv", &p), "/a/xmetro.tsv");
        assert_eq!(rewrite_legacy_trunk("metro.tags.tsv", &p), "metro.tags.tsv");
    }

    #[test]
    fn test_expand_placeholders() {
        let ctx = LaunchContext {
            profile: "metro".into(),
            profiles_dir: "/p".into(),
            runtime_dir: "/r".into(),
            talkgroups_file: "/p/metro.talkgroups.json".into(),
        };
        let out = expand_placeholders(
            &argv("rx.py -T {PROFILES_DIR}/{PROFILE}.trunk.tsv --log {RUNTIME_DIR}/x --filter {TG_FILTER_FILE}"),
            &ctx,
        );
        assert_eq!(
            out,
            argv("rx.py -T /p/metro.trunk.tsv --log /r/x --filter /p/metro.talkgroups.json")
        );
    }
}
