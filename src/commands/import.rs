// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Import command - restores a snapshot into the store

use super::Context;
use anyhow::{Context as _, Result};
use chrono::Utc;
use std::path::Path;

/// Run the import command
pub fn run(ctx: &Context, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let mut shelf = ctx.shelf();
    shelf
        .import(&json, Utc::now())
        .with_context(|| format!("Failed to import {}", file.display()))?;

    if ctx.json {
        return ctx.print_json(&serde_json::json!({
            "repositories": shelf.repos().len(),
            "tags": shelf.tags().len(),
            "rules": shelf.rules().len(),
        }));
    }
    println!(
        "Imported {}: {} repositories, {} tags, {} rules",
        file.display(),
        shelf.repos().len(),
        shelf.tags().len(),
        shelf.rules().len()
    );
    Ok(())
}
