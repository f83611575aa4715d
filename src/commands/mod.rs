// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod clear;
pub mod completions;
pub mod config;
pub mod export;
pub mod import;
pub mod rate_limit;
pub mod reclassify;
pub mod rule;
pub mod stats;
pub mod sync;
pub mod tag;
pub mod view;

use crate::config::Settings;
use crate::shelf::Shelf;
use crate::store::Store;
use anyhow::{Context as _, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::PathBuf;

/// Settings and output flags shared by every command
#[derive(Debug, Clone)]
pub struct Context {
    /// Resolved settings
    pub settings: Settings,
    /// Settings file in effect, if any
    pub settings_path: Option<PathBuf>,
    /// Print JSON instead of text
    pub json: bool,
    /// Allow ANSI colors
    pub color: bool,
}

impl Context {
    /// Open the shelf in the configured data directory
    #[must_use]
    pub fn shelf(&self) -> Shelf {
        Shelf::open(Store::open(&self.settings.data_dir))
    }

    /// Print `value` as pretty JSON on stdout
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
        println!("{out}");
        Ok(())
    }

    /// Color `text` with a `#rrggbb` value when colors are on
    #[must_use]
    pub fn paint(&self, text: &str, hex: Option<&str>) -> String {
        match hex.and_then(parse_hex).filter(|_| self.color) {
            Some((r, g, b)) => text.truecolor(r, g, b).to_string(),
            None => text.to_string(),
        }
    }

    /// Dim `text` when colors are on
    #[must_use]
    pub fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Split a comma-separated keyword list
#[must_use]
pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',').map(|k| k.trim().to_string()).filter(|k| !k.is_empty()).collect()
}
