// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Keyword rule management commands

use super::{split_keywords, Context};
use crate::shelf::RulePatch;
use anyhow::{Context as _, Result};

/// Fields accepted by `rule add` and `rule update`
#[derive(Debug, Clone, Default)]
pub struct RuleFields {
    /// Comma-separated keywords
    pub keywords: Option<String>,
    /// Target tag id
    pub tag: Option<String>,
    /// Priority, higher first
    pub priority: Option<i32>,
}

fn parse_index(raw: Option<String>) -> Result<usize> {
    let raw = raw.ok_or_else(|| anyhow::anyhow!("Rule index is required (see 'starshelf rule list')"))?;
    raw.parse().with_context(|| format!("Invalid rule index: {raw}"))
}

/// Run rule command
pub fn run(ctx: &Context, action: &str, index: Option<String>, fields: RuleFields) -> Result<()> {
    let mut shelf = ctx.shelf();

    match action {
        "list" | "ls" => {
            if ctx.json {
                return ctx.print_json(shelf.rules());
            }
            if shelf.rules().is_empty() {
                println!("No keyword rules. Use 'starshelf rule add --tag <id> --keywords a,b' to create one.");
                return Ok(());
            }
            println!("Keyword rules ({}):", shelf.rules().len());
            for (i, rule) in shelf.rules().iter().enumerate() {
                let tag = shelf.tags().iter().find(|t| t.id == rule.tag_id);
                let label = tag.map_or_else(|| format!("{} (missing)", rule.tag_id), |t| t.name.clone());
                println!(
                    "  [{:>2}] {:<20} p{:<3} {}",
                    i,
                    ctx.paint(&label, tag.map(|t| t.color.as_str())),
                    rule.priority,
                    ctx.dim(&rule.keywords.join(", "))
                );
            }
        }

        "add" | "create" | "new" => {
            let keywords = fields.keywords.ok_or_else(|| anyhow::anyhow!("--keywords is required"))?;
            let tag = fields.tag.ok_or_else(|| anyhow::anyhow!("--tag is required"))?;
            let rule = shelf.add_rule(split_keywords(&keywords), &tag, fields.priority)?;
            if ctx.json {
                return ctx.print_json(rule);
            }
            println!("Added rule -> {} (priority {}): {}", rule.tag_id, rule.priority, rule.keywords.join(", "));
        }

        "update" | "edit" => {
            let index = parse_index(index)?;
            let patch = RulePatch {
                keywords: fields.keywords.as_deref().map(split_keywords),
                tag_id: fields.tag,
                priority: fields.priority,
            };
            let rule = shelf.update_rule(index, patch)?;
            if ctx.json {
                return ctx.print_json(rule);
            }
            println!("Updated rule [{}] -> {} (priority {})", index, rule.tag_id, rule.priority);
        }

        "delete" | "rm" => {
            let index = parse_index(index)?;
            let rule = shelf.delete_rule(index)?;
            if ctx.json {
                return ctx.print_json(&rule);
            }
            println!("Deleted rule [{}] -> {}: {}", index, rule.tag_id, rule.keywords.join(", "));
        }

        other => {
            anyhow::bail!("Unknown action: {}. Valid: list, add, update, delete", other);
        }
    }

    Ok(())
}
