// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Stats and languages commands - collection overview

use super::Context;
use crate::pipeline;
use crate::stats::Summary;
use anyhow::Result;

/// Run the stats command
pub fn run(ctx: &Context) -> Result<()> {
    let shelf = ctx.shelf();
    let summary = Summary::compute(shelf.repos(), shelf.categories());

    if ctx.json {
        return ctx.print_json(&summary);
    }

    if summary.total_repos == 0 {
        println!("No starred repositories. Run 'starshelf sync' first.");
        return Ok(());
    }

    println!("Repositories: {}", summary.total_repos);
    println!("Total stars:  {}", summary.total_stars);
    println!("Languages:    {}", summary.language_count);
    if let Some(last) = shelf.store().last_sync() {
        println!("Last sync:    {}", last.format("%Y-%m-%d %H:%M UTC"));
    }
    if let Some(top) = summary.most_starred {
        println!("Most starred: {} (★ {})", top.full_name, top.stargazers_count);
    }

    println!();
    println!("Top languages:");
    for (language, count) in &summary.top_languages {
        println!("  {language:<20} {count:>5}");
    }

    println!();
    println!("Recently pushed:");
    for repo in &summary.recently_pushed {
        println!("  {:<40} {}", repo.full_name, ctx.dim(&repo.last_activity().format("%Y-%m-%d").to_string()));
    }

    println!();
    println!("Categories:");
    for stats in &summary.categories {
        let color = shelf.tags().iter().find(|t| t.id == stats.id).map(|t| t.color.as_str());
        println!(
            "  {:<24} {:>5} {:>9}  {}",
            ctx.paint(&stats.name, color),
            stats.repo_count,
            format!("★ {}", stats.total_stars),
            ctx.dim(&format!("{:.1}%", stats.percentage))
        );
    }
    Ok(())
}

/// Run the languages command
pub fn languages(ctx: &Context) -> Result<()> {
    let shelf = ctx.shelf();
    let languages = pipeline::languages(shelf.repos());

    if ctx.json {
        return ctx.print_json(&languages);
    }
    for language in &languages {
        println!("{language}");
    }
    Ok(())
}
