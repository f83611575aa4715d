// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Building tag categories from classification output

use crate::classify::classify_all;
use crate::types::{Category, KeywordRule, Repository, Tag};

/// One category per declared tag with at least one member, most populated first.
///
/// Ties keep tag declaration order. Rules pointing at undeclared tags
/// contribute nothing.
#[must_use]
pub fn build_categories(repos: &[Repository], tags: &[Tag], rules: &[KeywordRule]) -> Vec<Category> {
    let by_tag = classify_all(repos, rules);

    let mut categories: Vec<Category> = tags
        .iter()
        .filter_map(|tag| {
            let members = by_tag.get(&tag.id);
            if members.is_empty() {
                return None;
            }
            Some(Category {
                id: tag.id.clone(),
                name: tag.name.clone(),
                description: tag.description.clone(),
                color: Some(tag.color.clone()),
                tags: vec![tag.clone()],
                repos: members.iter().map(|r| (*r).clone()).collect(),
            })
        })
        .collect();

    categories.sort_by(|a, b| b.repos.len().cmp(&a.repos.len()));
    categories
}
