// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Decoder-facing configuration files.
//!
//! The decoder reads sites from `<profile>.trunk.tsv` and talkgroup labels
//! from `<profile>.tags.tsv`. Both are quoted, tab-separated tables: every
//! field is wrapped in `"` with embedded quotes doubled. [`writer`] produces
//! them from the canonical model, [`validator`] checks an existing trunk file
//! before the decoder is started.

pub mod tsv;
pub mod validator;
pub mod writer;

pub use tsv::{ParseResult, TrunkTable, TsvError};
pub use validator::{validate_trunk_file, ValidateOptions, ValidationDetails, ValidationReport};
pub use writer::{
    render_tags, render_trunk, tags_file_name, trunk_file_name, write_tags_tsv, write_trunk_tsv,
    DEFAULT_BANDPLAN, TAGS_COLUMNS, TRUNK_COLUMNS,
};
