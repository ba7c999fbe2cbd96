// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

pub mod config;
pub mod fs;
pub mod logging;

pub use config::{ConfigError, ConfigFile, CONFIG_FILE_NAME};
pub use fs::write_atomic;
pub use logging::init_logging;
