// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Tag management commands

use super::Context;
use crate::shelf::TagPatch;
use anyhow::Result;

/// Color given to tags created without one
pub const DEFAULT_COLOR: &str = "#7f8c8d";

/// Fields accepted by `tag add` and `tag update`
#[derive(Debug, Clone, Default)]
pub struct TagFields {
    /// Display name
    pub name: Option<String>,
    /// Hex color
    pub color: Option<String>,
    /// Description
    pub description: Option<String>,
}

/// Run tag command
pub fn run(ctx: &Context, action: &str, target: Option<String>, fields: TagFields) -> Result<()> {
    let mut shelf = ctx.shelf();

    match action {
        "list" | "ls" => {
            if ctx.json {
                return ctx.print_json(shelf.tags());
            }
            println!("Tags ({}):", shelf.tags().len());
            for tag in shelf.tags() {
                let members = shelf.categories().iter().find(|c| c.id == tag.id).map_or(0, |c| c.repos.len());
                println!(
                    "  {:<16} {:<28} {:>5}  {}",
                    tag.id,
                    ctx.paint(&tag.name, Some(tag.color.as_str())),
                    members,
                    ctx.dim(tag.description.as_deref().unwrap_or(""))
                );
            }
        }

        "add" | "create" | "new" => {
            let name = fields
                .name
                .or(target)
                .ok_or_else(|| anyhow::anyhow!("Tag name is required"))?;
            let color = fields.color.unwrap_or_else(|| DEFAULT_COLOR.to_string());
            let tag = shelf.add_tag(&name, &color, fields.description)?;
            if ctx.json {
                return ctx.print_json(&tag);
            }
            println!("Created tag: {} ({})", ctx.paint(&tag.name, Some(tag.color.as_str())), tag.id);
        }

        "update" | "edit" => {
            let id = target.ok_or_else(|| anyhow::anyhow!("Tag id is required"))?;
            let patch = TagPatch { name: fields.name, color: fields.color, description: fields.description };
            let tag = shelf.update_tag(&id, patch)?;
            if ctx.json {
                return ctx.print_json(tag);
            }
            println!("Updated tag: {} ({})", tag.name, tag.id);
        }

        "delete" | "rm" => {
            let id = target.ok_or_else(|| anyhow::anyhow!("Tag id is required"))?;
            let tag = shelf.delete_tag(&id)?;
            if ctx.json {
                return ctx.print_json(&tag);
            }
            println!("Deleted tag: {} ({}) and its rules", tag.name, tag.id);
        }

        other => {
            anyhow::bail!("Unknown action: {}. Valid: list, add, update, delete", other);
        }
    }

    Ok(())
}
