// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Sync command - fetches every starred repository from GitHub

use super::Context;
use crate::github::GitHubClient;
use crate::shelf::ConfigPatch;
use anyhow::{Context as _, Result};
use chrono::Utc;
use std::time::Duration;
use tracing::info;

/// Run the sync command
pub async fn run(ctx: &Context, username: Option<String>) -> Result<()> {
    let mut shelf = ctx.shelf();
    if let Some(username) = username {
        shelf.update_config(ConfigPatch { username: Some(username), ..ConfigPatch::default() });
    }

    let client = GitHubClient::new(&ctx.settings.api_url, shelf.config().github_token.clone())
        .context("Failed to build GitHub client")?
        .with_per_page(ctx.settings.per_page)
        .with_page_delay(Duration::from_millis(ctx.settings.page_delay_ms));

    let count = match shelf.sync(&client, Utc::now()).await {
        Ok(count) => count,
        Err(e) => {
            let hint = if e.is_retryable() { "; try again later" } else { "" };
            return Err(e).with_context(|| format!("Sync failed for '{}'{}", shelf.config().username, hint));
        }
    };
    info!("Sync complete");

    if ctx.json {
        ctx.print_json(&serde_json::json!({
            "username": shelf.config().username,
            "repositories": count,
            "categories": shelf.categories().len(),
        }))?;
        return Ok(());
    }

    if count == 0 {
        println!("{} has no starred repositories.", shelf.config().username);
        return Ok(());
    }

    println!("Synced {} starred repositories for {}", count, shelf.config().username);
    for category in shelf.categories() {
        println!(
            "  {:<24} {}",
            ctx.paint(&category.name, category.color.as_deref()),
            category.repos.len()
        );
    }
    Ok(())
}
