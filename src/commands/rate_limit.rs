// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Rate-limit command - reports the remaining GitHub API quota

use super::Context;
use crate::github::GitHubClient;
use anyhow::{Context as _, Result};

/// Run the rate-limit command
pub async fn run(ctx: &Context) -> Result<()> {
    let shelf = ctx.shelf();
    let token = shelf.config().github_token.clone();
    let authenticated = token.is_some();
    let client = GitHubClient::new(&ctx.settings.api_url, token).context("Failed to build GitHub client")?;

    let limit = client.rate_limit().await.context("Failed to query the rate limit")?;
    let reset = limit.reset_at();

    if ctx.json {
        return ctx.print_json(&serde_json::json!({
            "limit": limit.limit,
            "remaining": limit.remaining,
            "reset": reset,
            "authenticated": authenticated,
        }));
    }

    println!("Remaining: {} / {}", limit.remaining, limit.limit);
    if let Some(reset) = reset {
        println!("Resets:    {}", reset.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if !authenticated {
        println!("{}", ctx.dim("Unauthenticated; set a token with 'starshelf config token <token>' for a higher limit."));
    }
    Ok(())
}
