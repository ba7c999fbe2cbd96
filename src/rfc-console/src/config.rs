// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Configuration file support for rf-console.
//!
//! Config is loaded from the `[rf-console]` section of `rf-console.toml`.
//! Default search order:
//! 1. Path specified via `--config` CLI argument
//! 2. `./rf-console.toml`
//! 3. `~/.config/rf-console/rf-console.toml`
//! 4. `/etc/rf-console/rf-console.toml`

use std::collections::BTreeMap;
use std::path::PathBuf;

use rfc_app::ConfigFile;
use rfc_store::command::{split_command, DEFAULT_COMMAND, PROFILES_DIR_PLACEHOLDER};
use rfc_store::StoreOptions;
use serde::{Deserialize, Serialize};

const SECTION_KEY: &str = "rf-console";

/// Top-level console configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub general: GeneralConfig,
    pub paths: PathsConfig,
    pub import: ImportConfig,
    pub decoder: DecoderConfig,
    pub active: ActiveConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: Option<String>,
}

/// Storage locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub profiles_dir: PathBuf,
    /// Filter mirrors, the active pointer and the reload marker live here.
    pub runtime_dir: PathBuf,
    /// Profiles directory as seen by the decoder process.
    pub decoder_profiles_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            profiles_dir: PathBuf::from("data/profiles"),
            runtime_dir: PathBuf::from("data/runtime"),
            decoder_profiles_dir: PROFILES_DIR_PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Save the valid rows of a batch that has row errors.
    pub skip_invalid_rows: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Command used for profiles that do not carry one.
    pub default_command: String,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            default_command: DEFAULT_COMMAND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveConfig {
    /// Recorded as `changedBy` when switching profiles.
    pub changed_by: String,
}

impl Default for ActiveConfig {
    fn default() -> Self {
        Self {
            changed_by: "rf-console".to_string(),
        }
    }
}

impl ConsoleConfig {
    pub fn validate(&self) -> Result<(), String> {
        validate_log_level(self.general.log_level.as_deref())?;

        if self.paths.profiles_dir.as_os_str().is_empty() {
            return Err("[paths].profiles_dir must not be empty".to_string());
        }
        if self.paths.runtime_dir.as_os_str().is_empty() {
            return Err("[paths].runtime_dir must not be empty".to_string());
        }
        if self.paths.decoder_profiles_dir.trim().is_empty() {
            return Err("[paths].decoder_profiles_dir must not be empty".to_string());
        }
        match split_command(&self.decoder.default_command) {
            Some(tokens) if !tokens.is_empty() => {}
            Some(_) => return Err("[decoder].default_command must not be empty".to_string()),
            None => {
                return Err("[decoder].default_command has unbalanced quotes".to_string())
            }
        }
        if self.active.changed_by.trim().is_empty() {
            return Err("[active].changed_by must not be empty".to_string());
        }
        Ok(())
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            decoder_profiles_dir: self.paths.decoder_profiles_dir.clone(),
            default_command: split_command(&self.decoder.default_command)
                .unwrap_or_default(),
            skip_invalid_rows: self.import.skip_invalid_rows,
        }
    }

    /// Example file content, wrapped in its `[rf-console]` section.
    pub fn example_toml() -> String {
        let example = ConsoleConfig {
            general: GeneralConfig {
                log_level: Some("info".to_string()),
            },
            paths: PathsConfig {
                profiles_dir: PathBuf::from("/opt/stacks/rf-console/data/profiles"),
                runtime_dir: PathBuf::from("/opt/stacks/rf-console/data/runtime"),
                decoder_profiles_dir: "/config".to_string(),
            },
            ..ConsoleConfig::default()
        };
        let wrapped = BTreeMap::from([(SECTION_KEY, example)]);
        toml::to_string_pretty(&wrapped).unwrap_or_default()
    }
}

fn validate_log_level(level: Option<&str>) -> Result<(), String> {
    if let Some(level) = level {
        match level {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(format!(
                    "[general].log_level '{}' is invalid (expected one of: trace, debug, info, warn, error)",
                    level
                ))
            }
        }
    }
    Ok(())
}

impl ConfigFile for ConsoleConfig {
    fn section_key() -> &'static str {
        SECTION_KEY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ConsoleConfig::default();
        assert_eq!(config.paths.profiles_dir, PathBuf::from("data/profiles"));
        assert_eq!(config.paths.runtime_dir, PathBuf::from("data/runtime"));
        assert_eq!(config.paths.decoder_profiles_dir, "{PROFILES_DIR}");
        assert!(!config.import.skip_invalid_rows);
        assert_eq!(config.active.changed_by, "rf-console");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_console_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rf-console.toml");
        std::fs::write(
            &path,
            r#"
[rf-console.general]
log_level = "debug"

[rf-console.paths]
profiles_dir = "/srv/profiles"

[rf-console.import]
skip_invalid_rows = true
"#,
        )
        .unwrap();

        let config = ConsoleConfig::load_from_file(&path).unwrap();
        assert_eq!(config.general.log_level.as_deref(), Some("debug"));
        assert_eq!(config.paths.profiles_dir, PathBuf::from("/srv/profiles"));
        assert_eq!(config.paths.runtime_dir, PathBuf::from("data/runtime"));
        assert!(config.store_options().skip_invalid_rows);
    }

    #[test]
    fn test_example_toml_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rf-console.toml");
        std::fs::write(&path, ConsoleConfig::example_toml()).unwrap();
        let config = ConsoleConfig::load_from_file(&path).unwrap();
        assert_eq!(config.paths.decoder_profiles_dir, "/config");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_log_level() {
        let mut config = ConsoleConfig::default();
        config.general.log_level = Some("loud".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_command() {
        let mut config = ConsoleConfig::default();
        config.decoder.default_command = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unbalanced_command_quotes() {
        let mut config = ConsoleConfig::default();
        config.decoder.default_command = "rx.py --args \"rtl=0".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_store_options_split_command() {
        let config = ConsoleConfig::default();
        let options = config.store_options();
        assert_eq!(options.default_command[0], "python3");
        assert!(options.default_command.contains(&"-T".to_string()));
    }
}
