// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Filter, sort and paginate pipeline shared by every view
//!
//! The pipeline holds no state. Callers own a [`ViewState`] per view and
//! pass the query, sort and page cursor in on every call.

use crate::types::Repository;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Field a view is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Repository name
    Name,
    /// Star count
    Stars,
    /// Last push, else last update
    Updated,
    /// Creation time
    Created,
    /// Time starred
    Starred,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first
    Asc,
    /// Largest first
    Desc,
}

/// One pipeline invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewQuery {
    /// Case-insensitive search text; empty passes everything
    pub query: String,
    /// Sort field
    pub sort: SortKey,
    /// Sort direction
    pub direction: SortDirection,
    /// 1-indexed page
    pub page: usize,
    /// Items per page
    pub page_size: usize,
}

/// A bounded slice of a filtered, sorted collection
#[derive(Debug, Clone, Serialize)]
pub struct Page<'a> {
    /// Repositories on this page
    pub items: Vec<&'a Repository>,
    /// Filtered count before slicing
    pub total: usize,
    /// Requested page
    pub page: usize,
    /// Pages needed for `total`
    pub page_count: usize,
}

/// Whether `repo` matches `query` on name, description, any topic or language
#[must_use]
pub fn matches_query(repo: &Repository, query: &str) -> bool {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let hit = |field: &str| field.to_lowercase().contains(&needle);
    hit(&repo.name)
        || repo.description.as_deref().is_some_and(hit)
        || repo.topics.iter().any(|t| hit(t))
        || repo.language.as_deref().is_some_and(hit)
}

fn compare(a: &Repository, b: &Repository, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Stars => a.stargazers_count.cmp(&b.stargazers_count),
        SortKey::Updated => a.last_activity().cmp(&b.last_activity()),
        SortKey::Created => a.created_at.cmp(&b.created_at),
        SortKey::Starred => a.starred_at.cmp(&b.starred_at),
    }
}

/// Stable sort; descending swaps operands so ties keep input order either way
pub fn sort_repos(repos: &mut [&Repository], key: SortKey, direction: SortDirection) {
    match direction {
        SortDirection::Asc => repos.sort_by(|a, b| compare(a, b, key)),
        SortDirection::Desc => repos.sort_by(|a, b| compare(b, a, key)),
    }
}

/// Slice `[(page-1)*size, page*size)`; page 0 or out of range is empty
#[must_use]
pub fn paginate<'a, 'r>(repos: &'r [&'a Repository], page: usize, page_size: usize) -> &'r [&'a Repository] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= repos.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(repos.len());
    &repos[start..end]
}

/// Filter, sort and slice `repos` for one view
#[must_use]
pub fn view<'a>(repos: &[&'a Repository], query: &ViewQuery) -> Page<'a> {
    let mut filtered: Vec<&'a Repository> = repos
        .iter()
        .copied()
        .filter(|r| matches_query(r, &query.query))
        .collect();
    sort_repos(&mut filtered, query.sort, query.direction);

    let total = filtered.len();
    let page_count = if query.page_size == 0 { 0 } else { total.div_ceil(query.page_size) };
    Page {
        items: paginate(&filtered, query.page, query.page_size).to_vec(),
        total,
        page: query.page,
        page_count,
    }
}

/// Keep repositories whose primary language is `language`; "all" or empty keeps everything
#[must_use]
pub fn filter_by_language<'a>(repos: &[&'a Repository], language: &str) -> Vec<&'a Repository> {
    if language.is_empty() || language == "all" {
        return repos.to_vec();
    }
    repos
        .iter()
        .copied()
        .filter(|r| r.language.as_deref() == Some(language))
        .collect()
}

/// Distinct primary languages, sorted
#[must_use]
pub fn languages(repos: &[Repository]) -> Vec<String> {
    let mut langs: Vec<String> = repos.iter().filter_map(|r| r.language.clone()).collect();
    langs.sort();
    langs.dedup();
    langs
}

// =============================================================================
// View State
// =============================================================================

/// Per-view search, sort and page cursors
#[derive(Debug, Clone)]
pub struct ViewState {
    /// Search text
    pub query: String,
    /// Sort field
    pub sort: SortKey,
    /// Sort direction
    pub direction: SortDirection,
    /// Active category key
    pub active: String,
    pages: HashMap<String, usize>,
}

impl ViewState {
    /// Fresh state with the given defaults
    #[must_use]
    pub fn new(sort: SortKey, direction: SortDirection, active: impl Into<String>) -> Self {
        Self {
            query: String::new(),
            sort,
            direction,
            active: active.into(),
            pages: HashMap::new(),
        }
    }

    /// Current page of `category`, 1 if never set
    #[must_use]
    pub fn page_for(&self, category: &str) -> usize {
        self.pages.get(category).copied().unwrap_or(1)
    }

    /// Move the cursor of one category
    pub fn set_page(&mut self, category: &str, page: usize) {
        self.pages.insert(category.to_string(), page);
    }

    /// Switch tabs; the new tab starts on page 1
    pub fn select(&mut self, category: &str) {
        self.active = category.to_string();
        self.set_page(category, 1);
    }

    /// Pipeline query for `category` at its own cursor
    #[must_use]
    pub fn query_for(&self, category: &str, page_size: usize) -> ViewQuery {
        ViewQuery {
            query: self.query.clone(),
            sort: self.sort,
            direction: self.direction,
            page: self.page_for(category),
            page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::repo;

    fn q(query: &str, sort: SortKey, direction: SortDirection, page: usize, page_size: usize) -> ViewQuery {
        ViewQuery { query: query.into(), sort, direction, page, page_size }
    }

    fn sample() -> Vec<Repository> {
        let mut a = repo(1, "Alpha");
        a.stargazers_count = 30;
        a.topics = vec!["parser".into()];
        let mut b = repo(2, "bravo");
        b.stargazers_count = 10;
        b.language = Some("Rust".into());
        let mut c = repo(3, "charlie");
        c.stargazers_count = 20;
        c.description = Some("A Fast Server".into());
        vec![a, b, c]
    }

    #[test]
    fn test_empty_query_passes_all() {
        let repos = sample();
        let refs: Vec<_> = repos.iter().collect();
        let page = view(&refs, &q("", SortKey::Stars, SortDirection::Desc, 1, 10));
        assert_eq!(page.total, 3);
        let ids: Vec<_> = page.items.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn test_query_matches_each_field() {
        let repos = sample();
        assert!(matches_query(&repos[0], "PARS"));
        assert!(matches_query(&repos[1], "rust"));
        assert!(matches_query(&repos[2], "fast"));
        assert!(matches_query(&repos[0], "alp"));
        assert!(!matches_query(&repos[0], "rust"));
    }

    #[test]
    fn test_query_whitespace_is_literal() {
        let repos = vec![repo(1, "myapp"), repo(2, "my app")];
        assert!(!matches_query(&repos[0], " app"));
        assert!(matches_query(&repos[1], " app"));
        assert!(!matches_query(&repos[0], "   "));

        let refs: Vec<_> = repos.iter().collect();
        let page = view(&refs, &q(" ", SortKey::Name, SortDirection::Asc, 1, 10));
        assert_eq!(page.total, 1);
    }

    #[test]
    fn test_name_sort_case_insensitive() {
        let repos = sample();
        let mut refs: Vec<_> = repos.iter().collect();
        sort_repos(&mut refs, SortKey::Name, SortDirection::Asc);
        let names: Vec<_> = refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "bravo", "charlie"]);
    }

    #[test]
    fn test_ties_stable_in_both_directions() {
        let repos = vec![repo(1, "a"), repo(2, "b"), repo(3, "c")];
        let mut refs: Vec<_> = repos.iter().collect();

        sort_repos(&mut refs, SortKey::Stars, SortDirection::Desc);
        assert_eq!(refs.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        sort_repos(&mut refs, SortKey::Stars, SortDirection::Asc);
        assert_eq!(refs.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_updated_prefers_pushed_at() {
        let mut a = repo(1, "a");
        let mut b = repo(2, "b");
        a.pushed_at = None;
        a.updated_at = b.updated_at + chrono::Duration::days(1);
        b.pushed_at = Some(b.updated_at + chrono::Duration::days(2));
        let repos = vec![a, b];
        let mut refs: Vec<_> = repos.iter().collect();

        sort_repos(&mut refs, SortKey::Updated, SortDirection::Desc);

        assert_eq!(refs[0].id, 2);
    }

    #[test]
    fn test_pagination_bounds() {
        let repos: Vec<_> = (1..=5).map(|i| repo(i, &format!("r{i}"))).collect();
        let refs: Vec<_> = repos.iter().collect();

        let p2 = view(&refs, &q("", SortKey::Name, SortDirection::Asc, 2, 2));
        assert_eq!(p2.items.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(p2.page_count, 3);

        let p3 = view(&refs, &q("", SortKey::Name, SortDirection::Asc, 3, 2));
        assert_eq!(p3.items.len(), 1);

        let beyond = view(&refs, &q("", SortKey::Name, SortDirection::Asc, 4, 2));
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 5);

        let zero = view(&refs, &q("", SortKey::Name, SortDirection::Asc, 0, 2));
        assert!(zero.items.is_empty());
        assert_eq!(zero.total, 5);
    }

    #[test]
    fn test_language_helpers() {
        let mut repos = sample();
        repos[0].language = Some("Go".into());
        let refs: Vec<_> = repos.iter().collect();

        assert_eq!(languages(&repos), vec!["Go", "Rust"]);
        assert_eq!(filter_by_language(&refs, "Rust").len(), 1);
        assert_eq!(filter_by_language(&refs, "all").len(), 3);
    }

    #[test]
    fn test_view_state_cursors_independent() {
        let mut state = ViewState::new(SortKey::Stars, SortDirection::Desc, "a");
        state.set_page("a", 3);
        state.set_page("b", 2);
        assert_eq!(state.page_for("a"), 3);
        assert_eq!(state.page_for("b"), 2);
        assert_eq!(state.page_for("c"), 1);

        state.select("b");
        assert_eq!(state.active, "b");
        assert_eq!(state.page_for("b"), 1);
        assert_eq!(state.page_for("a"), 3);
        assert_eq!(state.query_for("a", 8).page, 3);
    }
}
