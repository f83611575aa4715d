// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Export command - writes a snapshot of the whole store

use super::Context;
use anyhow::{Context as _, Result};
use chrono::Utc;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Default snapshot file name for a given day
#[must_use]
pub fn default_file_name(date: chrono::NaiveDate) -> String {
    format!("github-stars-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Run the export command
pub fn run(ctx: &Context, output: Option<PathBuf>) -> Result<()> {
    let shelf = ctx.shelf();
    if shelf.repos().is_empty() {
        eprintln!("Warning: no repositories stored. Run 'starshelf sync' first.");
    }

    let now = Utc::now();
    let content = shelf.export(now).context("Failed to build snapshot")?;

    match output {
        Some(path) => {
            let path = if path.is_dir() { path.join(default_file_name(now.date_naive())) } else { path };
            fs::write(&path, &content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
            info!("Exported snapshot to {}", path.display());
            println!("Exported to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}
