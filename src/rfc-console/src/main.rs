// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

mod config;

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use rfc_app::{init_logging, ConfigFile};
use rfc_core::{DynResult, ImportInput, ProfileName, TableKind};
use rfc_store::{preview_import, ProfileStore, StoreLayout};
use rfc_trunk::ValidateOptions;

use config::ConsoleConfig;

const PKG_DESCRIPTION: &str = concat!(env!("CARGO_PKG_NAME"), " - RF console profile manager");
/// Exit status when a validation or import was refused.
const EXIT_REJECTED: i32 = 2;

#[derive(Debug, Parser)]
#[command(
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = PKG_DESCRIPTION,
)]
struct Cli {
    /// Path to configuration file
    #[arg(long = "config", short = 'C', value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print example configuration and exit
    #[arg(long = "print-config")]
    print_config: bool,
    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level")]
    log_level: Option<String>,
    /// Override [paths].profiles_dir
    #[arg(long = "profiles-dir", value_name = "DIR")]
    profiles_dir: Option<PathBuf>,
    /// Override [paths].runtime_dir
    #[arg(long = "runtime-dir", value_name = "DIR")]
    runtime_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List stored profiles
    Profiles,
    /// Show a profile with its talkgroups
    Show { profile: String },
    /// Import a whole profile JSON document
    ImportProfile {
        profile: String,
        /// Input file, or `-` for stdin
        file: PathBuf,
    },
    /// Import talkgroups from CSV/TSV or JSON entries
    ImportTalkgroups {
        profile: String,
        file: PathBuf,
        /// Normalize and report without saving
        #[arg(long)]
        preview: bool,
        /// Save the valid rows even when some rows are invalid
        #[arg(long)]
        skip_invalid_rows: bool,
    },
    /// Import sites from CSV/TSV or JSON entries
    ImportSites {
        profile: String,
        file: PathBuf,
        #[arg(long)]
        preview: bool,
    },
    /// Check the profile's trunk file and its tag file references
    Validate {
        profile: String,
        /// Create header-only placeholders for missing tags files
        #[arg(long)]
        create_missing_tags: bool,
    },
    /// Make a profile the active one
    Activate {
        profile: String,
        /// Recorded as the author of the switch
        #[arg(long = "by")]
        changed_by: Option<String>,
    },
    /// Print the active-profile pointer
    Active,
    /// Print the decoder command for a profile
    Command { profile: String },
    /// Delete a profile and its decoder files
    Delete { profile: String },
}

fn print_json<T: Serialize>(value: &T) -> DynResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_input(path: &Path) -> DynResult<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e).into())
}

fn load_config(cli: &Cli) -> DynResult<(ConsoleConfig, Option<PathBuf>)> {
    let (mut cfg, config_path) = if let Some(ref path) = cli.config {
        let cfg = ConsoleConfig::load_from_file(path)?;
        (cfg, Some(path.clone()))
    } else {
        ConsoleConfig::load_from_default_paths()?
    };

    if let Some(ref level) = cli.log_level {
        cfg.general.log_level = Some(level.clone());
    }
    if let Some(ref dir) = cli.profiles_dir {
        cfg.paths.profiles_dir = dir.clone();
    }
    if let Some(ref dir) = cli.runtime_dir {
        cfg.paths.runtime_dir = dir.clone();
    }
    cfg.validate()
        .map_err(|e| format!("Invalid rf-console configuration: {}", e))?;
    Ok((cfg, config_path))
}

/// Runs one subcommand; `Ok(false)` means the request was refused.
fn run(command: Command, store: &ProfileStore, cfg: &ConsoleConfig) -> DynResult<bool> {
    match command {
        Command::Profiles => {
            let active = store.active_profile().map(|pointer| pointer.profile);
            print_json(&json!({
                "profiles": store.list_profiles()?,
                "active": active,
            }))?;
        }
        Command::Show { profile } => {
            let name = store.resolve_name(&profile)?;
            let doc = store.load_profile(&name)?;
            let talkgroups = store.load_talkgroups(&name)?;
            let active = store
                .active_profile()
                .is_some_and(|pointer| pointer.profile == name.as_str());
            print_json(&json!({
                "profile": doc,
                "talkgroups": talkgroups,
                "active": active,
            }))?;
        }
        Command::ImportProfile { profile, file } => {
            let name = store.resolve_name(&profile)?;
            let doc: Value = serde_json::from_str(&read_input(&file)?)?;
            let outcome = store.import(&name, ImportInput::ProfileImportDocument(doc), None)?;
            print_json(&outcome)?;
            return Ok(outcome.saved);
        }
        Command::ImportTalkgroups {
            profile,
            file,
            preview,
            skip_invalid_rows,
        } => {
            let name = store.resolve_name(&profile)?;
            let input = ImportInput::detect(TableKind::Talkgroups, &read_input(&file)?)?;
            return import_table(store, &name, input, preview, skip_invalid_rows);
        }
        Command::ImportSites {
            profile,
            file,
            preview,
        } => {
            let name = store.resolve_name(&profile)?;
            let input = ImportInput::detect(TableKind::Sites, &read_input(&file)?)?;
            return import_table(store, &name, input, preview, false);
        }
        Command::Validate {
            profile,
            create_missing_tags,
        } => {
            let name = store.resolve_name(&profile)?;
            let report =
                store.validate_profile_files(&name, ValidateOptions { create_missing_tags });
            print_json(&report)?;
            return Ok(report.ok);
        }
        Command::Activate {
            profile,
            changed_by,
        } => {
            let name = store.resolve_name(&profile)?;
            let by = changed_by.unwrap_or_else(|| cfg.active.changed_by.clone());
            print_json(&store.switch_active(&name, &by)?)?;
        }
        Command::Active => {
            print_json(&store.active_profile())?;
        }
        Command::Command { profile } => {
            let name = store.resolve_name(&profile)?;
            let stored = store.load_profile(&name)?.command;
            print_json(&json!({
                "profile": name,
                "command": stored,
                "argv": store.launch_argv(&name)?,
            }))?;
        }
        Command::Delete { profile } => {
            let name = store.resolve_name(&profile)?;
            let removed: Vec<String> = store
                .delete_profile(&name)?
                .iter()
                .map(|path| path.display().to_string())
                .collect();
            print_json(&json!({ "profile": name, "removed": removed }))?;
        }
    }
    Ok(true)
}

fn import_table(
    store: &ProfileStore,
    name: &ProfileName,
    input: ImportInput,
    preview: bool,
    skip_invalid_rows: bool,
) -> DynResult<bool> {
    if preview {
        let preview = preview_import(input);
        print_json(&preview)?;
        return Ok(preview.errors.is_empty());
    }
    let outcome = store.import(name, input, skip_invalid_rows.then_some(true))?;
    print_json(&outcome)?;
    Ok(outcome.saved)
}

fn main() -> DynResult<()> {
    let cli = Cli::parse();

    if cli.print_config {
        println!("{}", ConsoleConfig::example_toml());
        return Ok(());
    }

    let (cfg, config_path) = load_config(&cli)?;
    init_logging(cfg.general.log_level.as_deref());

    if let Some(ref path) = config_path {
        info!("Loaded configuration from {}", path.display());
    }

    let layout = StoreLayout::new(&cfg.paths.profiles_dir, &cfg.paths.runtime_dir);
    let store = ProfileStore::open(layout, cfg.store_options())?;
    debug!("Active pointer migration: {:?}", store.migration());

    let Some(command) = cli.command else {
        return Err("No command given (try --help)".into());
    };
    if !run(command, &store, &cfg)? {
        std::process::exit(EXIT_REJECTED);
    }
    Ok(())
}
