// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! View command - browses the collection through one lens

use super::Context;
use crate::lens::{Lens, Level};
use crate::pipeline::{self, Page, SortDirection, SortKey};
use crate::types::Repository;
use anyhow::Result;
use chrono::Utc;
use serde::Serialize;

/// Options for `view`
#[derive(Debug, Clone, clap::Args)]
pub struct ViewArgs {
    /// Lens to browse through
    #[arg(value_enum)]
    pub lens: Lens,

    /// Category key (defaults to the lens' first tab)
    #[arg(short = 'C', long)]
    pub category: Option<String>,

    /// Search name, description, topics and language
    #[arg(short = 'Q', long, default_value = "")]
    pub query: String,

    /// Sort field
    #[arg(long, value_enum)]
    pub sort: Option<SortKey>,

    /// Sort direction
    #[arg(long, value_enum)]
    pub order: Option<SortDirection>,

    /// Page number, starting at 1
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// Repositories per page
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Only repositories with this primary language ("all" for any)
    #[arg(short, long)]
    pub language: Option<String>,
}

#[derive(Serialize)]
struct LevelCount {
    #[serde(flatten)]
    level: Level,
    count: usize,
}

#[derive(Serialize)]
struct ViewOutput<'a> {
    levels: Vec<LevelCount>,
    active: String,
    sort: SortKey,
    direction: SortDirection,
    #[serde(flatten)]
    page: Page<'a>,
}

/// Run the view command
pub fn run(ctx: &Context, args: &ViewArgs) -> Result<()> {
    let shelf = ctx.shelf();
    if shelf.repos().is_empty() {
        if ctx.json {
            return ctx.print_json(&serde_json::json!({ "levels": [], "items": [], "total": 0 }));
        }
        println!("No starred repositories. Run 'starshelf sync' first.");
        return Ok(());
    }

    let lens = args.lens;
    let levels = lens.levels(shelf.categories());
    let grouped = lens.group(shelf.repos(), shelf.categories(), Utc::now());
    let language = args.language.as_deref().unwrap_or("all");
    let members = |key: &str| -> Vec<&Repository> {
        pipeline::filter_by_language(grouped.get(key), language)
            .into_iter()
            .filter(|r| pipeline::matches_query(r, &args.query))
            .collect()
    };

    let mut state = lens.initial_state(shelf.categories());
    if let Some(category) = &args.category {
        if !grouped.contains_key(category) {
            let valid: Vec<&str> = levels.iter().map(|l| l.key.as_str()).collect();
            anyhow::bail!("Unknown category: {}. Valid: {}", category, valid.join(", "));
        }
        state.select(category);
    }
    state.query.clone_from(&args.query);
    if let Some(sort) = args.sort {
        state.sort = sort;
    }
    if let Some(order) = args.order {
        state.direction = order;
    }
    let active = state.active.clone();
    state.set_page(&active, args.page);

    let page_size = args.page_size.unwrap_or(ctx.settings.page_size);
    let candidates = pipeline::filter_by_language(grouped.get(&active), language);
    let page = pipeline::view(&candidates, &state.query_for(&active, page_size));

    let counts: Vec<LevelCount> = levels
        .into_iter()
        .map(|level| {
            let count = members(&level.key).len();
            LevelCount { level, count }
        })
        .collect();

    if ctx.json {
        return ctx.print_json(&ViewOutput {
            levels: counts,
            active,
            sort: state.sort,
            direction: state.direction,
            page,
        });
    }

    for entry in &counts {
        let label = format!("{} {}", entry.level.icon.as_deref().unwrap_or(""), entry.level.name);
        let marker = if entry.level.key == active { ">" } else { " " };
        println!(
            "{} {:<28} {:>5}",
            marker,
            ctx.paint(label.trim(), entry.level.color.as_deref()),
            entry.count
        );
    }
    println!();

    if page.total == 0 {
        println!("Nothing in '{}' matches.", active);
        return Ok(());
    }

    for repo in &page.items {
        println!(
            "  {:<40} {:>7}  {}",
            repo.full_name,
            format!("★ {}", repo.stargazers_count),
            ctx.dim(repo.language.as_deref().unwrap_or("-"))
        );
        if let Some(description) = repo.description.as_deref().filter(|d| !d.is_empty()) {
            println!("      {}", ctx.dim(description));
        }
    }
    println!();
    println!("Page {} of {} ({} repositories)", page.page, page.page_count.max(1), page.total);
    Ok(())
}
