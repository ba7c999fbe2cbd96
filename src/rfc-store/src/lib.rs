// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

pub mod active;
pub mod command;
pub mod error;
pub mod json;
pub mod layout;
pub mod reload;
pub mod store;

pub use active::{ActivePointer, MigrationOutcome};
pub use error::{StoreError, StoreResult};
pub use layout::StoreLayout;
pub use reload::ReloadRequest;
pub use store::{
    preview_import, ImportOutcome, ImportPreview, PersistOutcome, ProfileStore, StoreOptions,
};
