// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Clear command - deletes every stored entry

use super::Context;
use anyhow::Result;

/// Run the clear command
pub fn run(ctx: &Context, yes: bool) -> Result<()> {
    if !yes {
        anyhow::bail!("Refusing to clear {} without --yes", ctx.settings.data_dir.display());
    }
    let mut shelf = ctx.shelf();
    shelf.clear_all();
    println!("Cleared all data in {}", ctx.settings.data_dir.display());
    Ok(())
}
