// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Reclassify command - re-runs keyword rules over the stored collection

use super::Context;
use crate::stats::Summary;
use anyhow::Result;

/// Run the reclassify command
pub fn run(ctx: &Context) -> Result<()> {
    let mut shelf = ctx.shelf();
    shelf.reclassify()?;

    let summary = Summary::compute(shelf.repos(), shelf.categories());
    if ctx.json {
        return ctx.print_json(&summary.categories);
    }

    println!("Classified {} repositories into {} categories:", summary.total_repos, summary.categories.len());
    for stats in &summary.categories {
        let color = shelf.tags().iter().find(|t| t.id == stats.id).map(|t| t.color.as_str());
        println!(
            "  {:<24} {:>5}  {}",
            ctx.paint(&stats.name, color),
            stats.repo_count,
            ctx.dim(&format!("{:.1}%", stats.percentage))
        );
    }
    Ok(())
}
