// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Collection summary statistics

use crate::types::{Category, Repository};
use serde::Serialize;
use std::collections::HashMap;

const TOP_N: usize = 5;

/// Per-category totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    /// Category id
    pub id: String,
    /// Display name
    pub name: String,
    /// Members in this category
    pub repo_count: usize,
    /// Stars summed over members
    pub total_stars: u64,
    /// Share of the whole collection, 0-100
    pub percentage: f64,
}

/// Dashboard-style overview of a collection
#[derive(Debug, Clone, Serialize)]
pub struct Summary<'a> {
    /// Distinct repositories
    pub total_repos: usize,
    /// Stars summed over the collection
    pub total_stars: u64,
    /// Distinct primary languages
    pub language_count: usize,
    /// Repository with the most stars
    pub most_starred: Option<&'a Repository>,
    /// Most recently pushed
    pub recently_pushed: Vec<&'a Repository>,
    /// Most common languages with counts
    pub top_languages: Vec<(String, usize)>,
    /// Category totals, most populated first.
    ///
    /// Percentages sum past 100 when repositories carry several tags.
    pub categories: Vec<CategoryStats>,
}

impl<'a> Summary<'a> {
    /// Summarize `repos` and their cached `categories`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(repos: &'a [Repository], categories: &[Category]) -> Self {
        let total_stars = repos.iter().map(|r| r.stargazers_count).sum();

        let mut most_starred: Option<&Repository> = None;
        for repo in repos {
            if repo.stargazers_count > most_starred.map_or(0, |m| m.stargazers_count) {
                most_starred = Some(repo);
            }
        }

        let mut recently_pushed: Vec<&Repository> = repos.iter().collect();
        recently_pushed.sort_by(|a, b| b.last_activity().cmp(&a.last_activity()));
        recently_pushed.truncate(TOP_N);

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for lang in repos.iter().filter_map(|r| r.language.as_deref()) {
            *counts.entry(lang).or_default() += 1;
        }
        let language_count = counts.len();
        let mut top_languages: Vec<(String, usize)> =
            counts.into_iter().map(|(l, n)| (l.to_string(), n)).collect();
        top_languages.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_languages.truncate(TOP_N);

        let mut category_stats: Vec<CategoryStats> = categories
            .iter()
            .map(|c| CategoryStats {
                id: c.id.clone(),
                name: c.name.clone(),
                repo_count: c.repos.len(),
                total_stars: c.repos.iter().map(|r| r.stargazers_count).sum(),
                percentage: if repos.is_empty() {
                    0.0
                } else {
                    c.repos.len() as f64 / repos.len() as f64 * 100.0
                },
            })
            .collect();
        category_stats.sort_by(|a, b| b.repo_count.cmp(&a.repo_count));

        Self {
            total_repos: repos.len(),
            total_stars,
            language_count,
            most_starred,
            recently_pushed,
            top_languages,
            categories: category_stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::build_categories;
    use crate::testutil::repo;
    use crate::types::{KeywordRule, Tag};

    #[test]
    fn test_summary_totals() {
        let mut repos: Vec<_> = (1..=7).map(|i| repo(i, &format!("r{i}"))).collect();
        for (i, r) in repos.iter_mut().enumerate() {
            r.stargazers_count = (i as u64 + 1) * 10;
            r.language = Some(if i % 2 == 0 { "Rust" } else { "Go" }.into());
        }
        repos[6].language = None;

        let summary = Summary::compute(&repos, &[]);

        assert_eq!(summary.total_repos, 7);
        assert_eq!(summary.total_stars, 280);
        assert_eq!(summary.language_count, 2);
        assert_eq!(summary.most_starred.map(|r| r.id), Some(7));
        assert_eq!(summary.recently_pushed.len(), 5);
        assert_eq!(summary.top_languages, vec![("Go".to_string(), 3), ("Rust".to_string(), 3)]);
    }

    #[test]
    fn test_zero_star_collection_has_no_most_starred() {
        let repos = vec![repo(1, "a"), repo(2, "b")];
        assert!(Summary::compute(&repos, &[]).most_starred.is_none());
    }

    #[test]
    fn test_category_percentages_count_memberships() {
        let repos = vec![repo(1, "react-api-server"), repo(2, "plain")];
        let cats = build_categories(&repos, &Tag::defaults(), &KeywordRule::defaults());

        let summary = Summary::compute(&repos, &cats);
        let total: f64 = summary.categories.iter().map(|c| c.percentage).sum();

        assert!(total > 100.0);
    }
}
