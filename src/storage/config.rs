// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Configuration for opening a store.

use std::path::{Path, PathBuf};

/// File name used when the configured location cannot be opened.
pub const FALLBACK_FILE_NAME: &str = "_default.db";

/// Durability mode for write operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurabilityMode {
    /// Writes go to the WAL without an fsync.
    /// Survives process crashes but not power failures.
    #[default]
    WalOnly,
    /// Every write batch is fsynced.
    FsyncEveryWrite,
}

/// Where and how a store is opened.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the store.
    pub dir: PathBuf,
    /// Store name; the on-disk location is `<dir>/<name>.db`.
    pub name: String,
    /// Retry at `<cwd>/_default.db` when the configured location fails to open.
    pub fallback: bool,
    /// Write durability.
    pub durability: DurabilityMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./"),
            name: "default".to_string(),
            fallback: true,
            durability: DurabilityMode::default(),
        }
    }
}

impl StoreConfig {
    /// Creates a configuration for `<dir>/<name>.db`.
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Enables or disables the working-directory fallback.
    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    /// Sets the write durability.
    pub fn with_durability(mut self, durability: DurabilityMode) -> Self {
        self.durability = durability;
        self
    }

    /// Returns the configured on-disk location.
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.db", self.name))
    }

    /// Returns the fallback location relative to `cwd`.
    pub fn fallback_path(cwd: &Path) -> PathBuf {
        cwd.join(FALLBACK_FILE_NAME)
    }
}
