// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Config command - reads and writes user settings

use super::Context;
use crate::shelf::ConfigPatch;
use anyhow::{Context as _, Result};

const KEYS: &str = "username, token, auto-classify, data-dir, list, save-settings";

fn mask(token: Option<&str>) -> String {
    match token {
        Some(t) if t.chars().count() > 4 => format!("{}…", t.chars().take(4).collect::<String>()),
        Some(_) => "set".to_string(),
        None => "unset".to_string(),
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        other => anyhow::bail!("Expected true or false, got: {}", other),
    }
}

/// Run the config command
pub fn run(ctx: &Context, key: &str, value: Option<String>) -> Result<()> {
    let mut shelf = ctx.shelf();

    let patch = match (key, value) {
        ("list" | "show", _) => {
            let config = shelf.config();
            if ctx.json {
                return ctx.print_json(&serde_json::json!({
                    "username": config.username,
                    "token": mask(config.github_token.as_deref()),
                    "autoClassify": config.auto_classify,
                    "dataDir": ctx.settings.data_dir,
                }));
            }
            println!("username      = {}", config.username);
            println!("token         = {}", mask(config.github_token.as_deref()));
            println!("auto-classify = {}", config.auto_classify);
            println!("data-dir      = {}", ctx.settings.data_dir.display());
            return Ok(());
        }
        ("save-settings", _) => {
            let path = ctx
                .settings_path
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("No settings path; pass --config <file>"))?;
            ctx.settings.save(path)?;
            println!("Wrote settings to {}", path.display());
            return Ok(());
        }
        ("username", None) => {
            println!("{}", shelf.config().username);
            return Ok(());
        }
        ("token", None) => {
            println!("{}", mask(shelf.config().github_token.as_deref()));
            return Ok(());
        }
        ("auto-classify", None) => {
            println!("{}", shelf.config().auto_classify);
            return Ok(());
        }
        ("data-dir", None) => {
            println!("{}", ctx.settings.data_dir.display());
            return Ok(());
        }
        ("username", Some(v)) => ConfigPatch { username: Some(v), ..ConfigPatch::default() },
        ("token", Some(v)) => ConfigPatch { github_token: Some(Some(v)), ..ConfigPatch::default() },
        ("auto-classify", Some(v)) => {
            let auto = parse_bool(&v).context("Invalid auto-classify value")?;
            ConfigPatch { auto_classify: Some(auto), ..ConfigPatch::default() }
        }
        ("data-dir", Some(_)) => {
            anyhow::bail!("data-dir is read-only here; set STARSHELF_DATA_DIR or data_dir in the settings file");
        }
        (other, _) => anyhow::bail!("Unknown key: {}. Valid: {}", other, KEYS),
    };

    tracing::info!("Setting {}", key);
    shelf.update_config(patch);
    println!("Updated {key}");
    Ok(())
}
