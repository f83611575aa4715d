// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Keyword-rule classification of repositories into tags

use crate::bucket::Grouped;
use crate::types::{KeywordRule, Repository, OTHER_TAG_ID};

/// Whether any keyword of `rule` occurs in the lower-cased `corpus`
fn rule_matches(rule: &KeywordRule, corpus: &str) -> bool {
    rule.keywords
        .iter()
        .filter(|k| !k.is_empty())
        .any(|k| corpus.contains(&k.to_lowercase()))
}

/// Tag ids for `repo`, highest priority first, each at most once.
///
/// Falls back to exactly `["other"]` when no rule matches.
#[must_use]
pub fn classify(repo: &Repository, rules: &[KeywordRule]) -> Vec<String> {
    let corpus = repo.classification_corpus();

    let mut matched: Vec<&KeywordRule> = rules.iter().filter(|r| rule_matches(r, &corpus)).collect();
    // stable: equal priorities keep rule order
    matched.sort_by(|a, b| b.priority.cmp(&a.priority));

    let mut tags: Vec<String> = Vec::with_capacity(matched.len());
    for rule in matched {
        if !tags.iter().any(|t| t == &rule.tag_id) {
            tags.push(rule.tag_id.clone());
        }
    }

    if tags.is_empty() {
        tags.push(OTHER_TAG_ID.to_string());
    }
    tags
}

/// Invert per-repository tags into a tag -> repositories multimap.
///
/// A repository with N tags appears under N keys. Keys appear in order of
/// first assignment.
#[must_use]
pub fn classify_all<'a>(repos: &'a [Repository], rules: &[KeywordRule]) -> Grouped<'a> {
    let mut grouped = Grouped::default();
    for repo in repos {
        for tag_id in classify(repo, rules) {
            grouped.push(&tag_id, repo);
        }
    }
    tracing::debug!(
        repos = repos.len(),
        rules = rules.len(),
        tags = grouped.len(),
        "classified collection"
    );
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::repo;

    fn rule(tag: &str, priority: i32, keywords: &[&str]) -> KeywordRule {
        KeywordRule {
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
            tag_id: tag.into(),
            priority,
        }
    }

    #[test]
    fn test_no_rules_is_other() {
        assert_eq!(classify(&repo(1, "anything"), &[]), vec!["other"]);
    }

    #[test]
    fn test_react_app_default_rules() {
        let mut r = repo(1, "my-react-app");
        r.topics = vec!["frontend".into()];

        let tags = classify(&r, &KeywordRule::defaults());

        assert_eq!(tags[0], "frontend");
        assert!(!tags.contains(&"other".to_string()));
    }

    #[test]
    fn test_case_insensitive_substring() {
        let mut r = repo(1, "Tokio");
        r.description = Some("An ASYNC Runtime".into());
        let rules = vec![rule("async", 5, &["Async"])];
        assert_eq!(classify(&r, &rules), vec!["async"]);
    }

    #[test]
    fn test_priority_order_and_dedup() {
        let mut r = repo(1, "rust-cli-tool");
        r.language = Some("Rust".into());
        let rules = vec![
            rule("tools", 3, &["cli"]),
            rule("lang", 9, &["rust"]),
            rule("tools", 8, &["tool"]),
        ];

        assert_eq!(classify(&r, &rules), vec!["lang", "tools"]);
    }

    #[test]
    fn test_ties_keep_rule_order() {
        let r = repo(1, "alpha-beta");
        let rules = vec![rule("b", 1, &["beta"]), rule("a", 1, &["alpha"])];
        assert_eq!(classify(&r, &rules), vec!["b", "a"]);
    }

    #[test]
    fn test_corpus_spans_fields() {
        let mut r = repo(1, "x");
        r.topics = vec!["kubernetes".into(), "operator".into()];
        r.language = Some("Go".into());
        let rules = vec![rule("devops", 1, &["kubernetes"]), rule("go", 1, &["go"])];
        assert_eq!(classify(&r, &rules), vec!["devops", "go"]);
    }

    #[test]
    fn test_empty_keyword_never_matches() {
        let rules = vec![rule("empty", 1, &[""])];
        assert_eq!(classify(&repo(1, "x"), &rules), vec!["other"]);
    }

    #[test]
    fn test_classify_all_fans_out() {
        let repos = vec![repo(1, "react-api"), repo(2, "plain")];
        let rules = vec![rule("web", 1, &["react"]), rule("api", 1, &["api"])];

        let grouped = classify_all(&repos, &rules);

        assert_eq!(grouped.get("web").len(), 1);
        assert_eq!(grouped.get("api").len(), 1);
        assert_eq!(grouped.get("other")[0].id, 2);
        // three memberships for two repositories
        assert_eq!(grouped.membership_count(), 3);
    }
}
