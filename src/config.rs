// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `STARSHELF_*` environment variables.

use crate::error::Result;
use crate::github::{DEFAULT_API_URL, MAX_PER_PAGE};
use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "hyperpolymath", "starshelf")
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory for the store entries
    pub data_dir: PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Repositories per page in `view`
    pub page_size: usize,
    /// Records requested per GitHub page
    pub per_page: u32,
    /// Pause between GitHub pages
    pub page_delay_ms: u64,
    /// GitHub REST API root
    pub api_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: project_dirs()
                .map(|d| d.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("~/.local/share/starshelf")),
            log_level: "info".to_string(),
            page_size: 8,
            per_page: MAX_PER_PAGE,
            page_delay_ms: 1000,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

/// Default settings file location
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("config.toml"))
}

/// Load settings from `path` (or the default location) and the environment.
///
/// A missing file is not an error.
pub fn load(path: Option<&Path>) -> Result<Settings> {
    let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);
    if let Some(path) = path.map(Path::to_path_buf).or_else(default_path) {
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
    }
    let settings = builder
        .add_source(Environment::with_prefix("STARSHELF").try_parsing(true))
        .build()?
        .try_deserialize()?;
    Ok(settings)
}

impl Settings {
    /// Write these settings as TOML
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}
