// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! The shelf: in-memory collection, tags and rules backed by a [`Store`]
//!
//! In-memory state is authoritative for the session. Store writes that fail
//! are logged and otherwise ignored.

use crate::category::build_categories;
use crate::error::{Error, Result};
use crate::github::StarSource;
use crate::store::Store;
use crate::types::{Category, KeywordRule, Repository, Tag, UserConfig};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

/// Partial update to [`UserConfig`]
#[derive(Debug, Clone, Default)]
pub struct ConfigPatch {
    /// New username
    pub username: Option<String>,
    /// New token; `Some(None)` clears it
    pub github_token: Option<Option<String>>,
    /// New auto-classify flag
    pub auto_classify: Option<bool>,
}

/// Partial update to a [`Tag`]
#[derive(Debug, Clone, Default)]
pub struct TagPatch {
    /// New name
    pub name: Option<String>,
    /// New color
    pub color: Option<String>,
    /// New description
    pub description: Option<String>,
}

/// Partial update to a [`KeywordRule`]
#[derive(Debug, Clone, Default)]
pub struct RulePatch {
    /// New keyword list
    pub keywords: Option<Vec<String>>,
    /// New target tag
    pub tag_id: Option<String>,
    /// New priority
    pub priority: Option<i32>,
}

fn clean_keywords(keywords: Vec<String>) -> Vec<String> {
    keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Starred collection with its classification state
#[derive(Debug)]
pub struct Shelf {
    store: Store,
    config: UserConfig,
    tags: Vec<Tag>,
    repos: Vec<Repository>,
    categories: Vec<Category>,
}

impl Shelf {
    /// Load everything from `store`.
    ///
    /// With `auto_classify` on and a non-empty collection the categories are
    /// rebuilt; otherwise the cached categories are used.
    #[must_use]
    pub fn open(store: Store) -> Self {
        let mut shelf = Self {
            config: store.load_config(),
            tags: store.load_tags(),
            repos: store.load_repositories(),
            categories: Vec::new(),
            store,
        };
        if shelf.config.auto_classify && !shelf.repos.is_empty() {
            shelf.rebuild();
        } else {
            shelf.categories = shelf.store.load_categories();
        }
        shelf
    }

    fn persist(what: &str, result: Result<()>) {
        if let Err(e) = result {
            warn!("Could not save {}: {}", what, e);
        }
    }

    fn rebuild(&mut self) {
        self.categories = build_categories(&self.repos, &self.tags, &self.config.keyword_rules);
        debug!("Rebuilt {} categories", self.categories.len());
        Self::persist("categories", self.store.save_categories(&self.categories));
    }

    fn refresh(&mut self) {
        if self.config.auto_classify {
            self.rebuild();
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// User settings
    #[must_use]
    pub fn config(&self) -> &UserConfig {
        &self.config
    }

    /// Tag list
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Keyword rules
    #[must_use]
    pub fn rules(&self) -> &[KeywordRule] {
        &self.config.keyword_rules
    }

    /// Starred repositories
    #[must_use]
    pub fn repos(&self) -> &[Repository] {
        &self.repos
    }

    /// Current tag categories
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Backing store
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    // =========================================================================
    // Configuration and Sync
    // =========================================================================

    /// Apply `patch` to the user settings
    pub fn update_config(&mut self, patch: ConfigPatch) {
        if let Some(username) = patch.username {
            self.config.username = username.trim().to_string();
        }
        if let Some(token) = patch.github_token {
            self.config.github_token = token.filter(|t| !t.is_empty());
        }
        if let Some(auto) = patch.auto_classify {
            self.config.auto_classify = auto;
        }
        Self::persist("user config", self.store.save_config(&self.config));
    }

    /// Replace the collection with the configured user's stars.
    ///
    /// Fails before any request when no username is set. Nothing changes
    /// unless every page was fetched.
    pub async fn sync<S: StarSource>(&mut self, source: &S, now: DateTime<Utc>) -> Result<usize> {
        let username = self.config.username.trim().to_string();
        if username.is_empty() {
            return Err(Error::Validation("GitHub username is not set; run `starshelf config username <name>`".into()));
        }

        info!("Syncing starred repositories for {}", username);
        if !source.user_exists(&username).await? {
            return Err(Error::UserNotFound(username));
        }
        let repos = source.fetch_all_starred(&username).await?;

        self.repos = repos;
        Self::persist("repositories", self.store.save_repositories(&self.repos, now));
        self.refresh();
        Ok(self.repos.len())
    }

    /// Re-run classification over the whole collection
    pub fn reclassify(&mut self) -> Result<&[Category]> {
        if self.repos.is_empty() {
            return Err(Error::Validation("No repositories to classify; run `starshelf sync` first".into()));
        }
        self.rebuild();
        Ok(&self.categories)
    }

    // =========================================================================
    // Tags
    // =========================================================================

    fn generate_tag_id(&self, name: &str) -> String {
        let mut salt: u32 = 0;
        loop {
            let mut hasher = Sha256::new();
            hasher.update(name.as_bytes());
            hasher.update(Utc::now().timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
            hasher.update(salt.to_le_bytes());
            let id = format!("tag_{}", &hex::encode(hasher.finalize())[..12]);
            if !self.tags.iter().any(|t| t.id == id) {
                return id;
            }
            salt += 1;
        }
    }

    /// Create a tag with a generated id
    pub fn add_tag(&mut self, name: &str, color: &str, description: Option<String>) -> Result<Tag> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("Tag name is required".into()));
        }
        if color.trim().is_empty() {
            return Err(Error::Validation("Tag color is required".into()));
        }
        let tag = Tag {
            id: self.generate_tag_id(name),
            name: name.to_string(),
            color: color.trim().to_string(),
            description: description.filter(|d| !d.is_empty()),
        };
        self.tags.push(tag.clone());
        Self::persist("tags", self.store.save_tags(&self.tags));
        Ok(tag)
    }

    /// Edit a tag in place
    pub fn update_tag(&mut self, id: &str, patch: TagPatch) -> Result<&Tag> {
        let index = self
            .tags
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::Validation(format!("Tag not found: {id}")))?;
        {
            let tag = &mut self.tags[index];
            if let Some(name) = patch.name {
                tag.name = name;
            }
            if let Some(color) = patch.color {
                tag.color = color;
            }
            if let Some(description) = patch.description {
                tag.description = Some(description).filter(|d| !d.is_empty());
            }
        }
        Self::persist("tags", self.store.save_tags(&self.tags));
        self.refresh();
        Ok(&self.tags[index])
    }

    /// Remove a tag and every rule pointing at it
    pub fn delete_tag(&mut self, id: &str) -> Result<Tag> {
        let index = self
            .tags
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::Validation(format!("Tag not found: {id}")))?;
        let removed = self.tags.remove(index);
        Self::persist("tags", self.store.save_tags(&self.tags));

        let before = self.config.keyword_rules.len();
        self.config.keyword_rules.retain(|r| r.tag_id != id);
        if self.config.keyword_rules.len() != before {
            Self::persist("user config", self.store.save_config(&self.config));
        }
        self.refresh();
        Ok(removed)
    }

    // =========================================================================
    // Rules
    // =========================================================================

    fn rule_index(&self, index: usize) -> Result<usize> {
        if index < self.config.keyword_rules.len() {
            Ok(index)
        } else {
            Err(Error::Validation(format!(
                "No rule at index {index} ({} rules)",
                self.config.keyword_rules.len()
            )))
        }
    }

    /// Append a rule; priority defaults to [`KeywordRule::DEFAULT_PRIORITY`]
    pub fn add_rule(&mut self, keywords: Vec<String>, tag_id: &str, priority: Option<i32>) -> Result<&KeywordRule> {
        let keywords = clean_keywords(keywords);
        if keywords.is_empty() {
            return Err(Error::Validation("At least one keyword is required".into()));
        }
        if !self.tags.iter().any(|t| t.id == tag_id) {
            warn!("Rule targets unknown tag {}; it will not produce a category", tag_id);
        }
        self.config.keyword_rules.push(KeywordRule {
            keywords,
            tag_id: tag_id.to_string(),
            priority: priority.unwrap_or(KeywordRule::DEFAULT_PRIORITY),
        });
        Self::persist("user config", self.store.save_config(&self.config));
        self.refresh();
        let last = self.config.keyword_rules.len() - 1;
        Ok(&self.config.keyword_rules[last])
    }

    /// Edit the rule at `index`
    pub fn update_rule(&mut self, index: usize, patch: RulePatch) -> Result<&KeywordRule> {
        let index = self.rule_index(index)?;
        let keywords = patch.keywords.map(clean_keywords);
        if keywords.as_ref().is_some_and(Vec::is_empty) {
            return Err(Error::Validation("At least one keyword is required".into()));
        }
        {
            let rule = &mut self.config.keyword_rules[index];
            if let Some(keywords) = keywords {
                rule.keywords = keywords;
            }
            if let Some(tag_id) = patch.tag_id {
                rule.tag_id = tag_id;
            }
            if let Some(priority) = patch.priority {
                rule.priority = priority;
            }
        }
        Self::persist("user config", self.store.save_config(&self.config));
        self.refresh();
        Ok(&self.config.keyword_rules[index])
    }

    /// Remove the rule at `index`
    pub fn delete_rule(&mut self, index: usize) -> Result<KeywordRule> {
        let index = self.rule_index(index)?;
        let removed = self.config.keyword_rules.remove(index);
        Self::persist("user config", self.store.save_config(&self.config));
        self.refresh();
        Ok(removed)
    }

    // =========================================================================
    // Whole-store operations
    // =========================================================================

    /// Drop every store entry and reset to defaults
    pub fn clear_all(&mut self) {
        Self::persist("cleared store", self.store.clear());
        self.config = UserConfig::default();
        self.tags = Tag::defaults();
        self.repos.clear();
        self.categories.clear();
    }

    /// Serialize the store as a snapshot
    pub fn export(&self, now: DateTime<Utc>) -> Result<String> {
        self.store.export_snapshot(now)
    }

    /// Import a snapshot, then reload from the store
    pub fn import(&mut self, json: &str, now: DateTime<Utc>) -> Result<()> {
        self.store.import_snapshot(json, now)?;
        *self = Self::open(self.store.clone());
        info!("Imported snapshot: {} repositories, {} tags", self.repos.len(), self.tags.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{now, repo};
    use std::cell::Cell;
    use tempfile::TempDir;

    struct FakeSource {
        exists: bool,
        repos: Result<Vec<Repository>>,
        calls: Cell<usize>,
    }

    impl FakeSource {
        fn with(repos: Vec<Repository>) -> Self {
            Self { exists: true, repos: Ok(repos), calls: Cell::new(0) }
        }
    }

    impl StarSource for FakeSource {
        async fn user_exists(&self, _username: &str) -> Result<bool> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.exists)
        }

        async fn fetch_all_starred(&self, _username: &str) -> Result<Vec<Repository>> {
            self.calls.set(self.calls.get() + 1);
            match &self.repos {
                Ok(repos) => Ok(repos.clone()),
                Err(_) => Err(Error::RateLimited { reset: None }),
            }
        }
    }

    fn shelf(dir: &TempDir) -> Shelf {
        Shelf::open(Store::open(dir.path()))
    }

    fn with_user(dir: &TempDir) -> Shelf {
        let mut s = shelf(dir);
        s.update_config(ConfigPatch { username: Some("octocat".into()), ..ConfigPatch::default() });
        s
    }

    #[tokio::test]
    async fn test_sync_requires_username() {
        let dir = TempDir::new().unwrap();
        let mut s = shelf(&dir);
        let source = FakeSource::with(vec![repo(1, "a")]);

        let err = s.sync(&source, now()).await.unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(source.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_sync_unknown_user_distinct_from_empty() {
        let dir = TempDir::new().unwrap();
        let mut s = with_user(&dir);

        let missing = FakeSource { exists: false, ..FakeSource::with(vec![]) };
        assert!(matches!(s.sync(&missing, now()).await, Err(Error::UserNotFound(_))));

        let empty = FakeSource::with(vec![]);
        assert_eq!(s.sync(&empty, now()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sync_classifies_and_persists() {
        let dir = TempDir::new().unwrap();
        let mut s = with_user(&dir);
        let source = FakeSource::with(vec![repo(1, "vue-admin"), repo(2, "zzz")]);

        assert_eq!(s.sync(&source, now()).await.unwrap(), 2);

        assert!(s.categories().iter().any(|c| c.id == "frontend"));
        assert_eq!(s.store().load_repositories().len(), 2);
        assert_eq!(s.store().last_sync(), Some(now()));
    }

    #[tokio::test]
    async fn test_failed_sync_keeps_previous_collection() {
        let dir = TempDir::new().unwrap();
        let mut s = with_user(&dir);
        s.sync(&FakeSource::with(vec![repo(1, "a")]), now()).await.unwrap();

        let failing = FakeSource { repos: Err(Error::RateLimited { reset: None }), ..FakeSource::with(vec![]) };
        assert!(s.sync(&failing, now()).await.is_err());

        assert_eq!(s.repos().len(), 1);
        assert_eq!(s.store().load_repositories().len(), 1);
    }

    #[tokio::test]
    async fn test_rule_edits_reclassify() {
        let dir = TempDir::new().unwrap();
        let mut s = with_user(&dir);
        s.sync(&FakeSource::with(vec![repo(1, "zzz")]), now()).await.unwrap();
        assert_eq!(s.categories()[0].id, "other");

        s.add_rule(vec![" zzz ".into(), String::new()], "tools", Some(20)).unwrap();
        assert_eq!(s.rules().last().unwrap().keywords, vec!["zzz"]);
        assert_eq!(s.categories()[0].id, "tools");

        let last = s.rules().len() - 1;
        s.delete_rule(last).unwrap();
        assert_eq!(s.categories()[0].id, "other");
    }

    #[test]
    fn test_rule_index_validation() {
        let dir = TempDir::new().unwrap();
        let mut s = shelf(&dir);
        let n = s.rules().len();
        assert!(matches!(s.delete_rule(n), Err(Error::Validation(_))));
        assert!(matches!(s.add_rule(vec![" ".into()], "x", None), Err(Error::Validation(_))));
        assert_eq!(s.add_rule(vec!["k".into()], "x", None).unwrap().priority, 10);
    }

    #[test]
    fn test_delete_tag_cascades_rules() {
        let dir = TempDir::new().unwrap();
        let mut s = shelf(&dir);
        let before = s.rules().len();

        s.delete_tag("frontend").unwrap();

        assert!(s.tags().iter().all(|t| t.id != "frontend"));
        assert_eq!(s.rules().len(), before - 1);
        assert!(s.rules().iter().all(|r| r.tag_id != "frontend"));
        assert_eq!(s.store().load_config().keyword_rules.len(), before - 1);
    }

    #[test]
    fn test_add_and_update_tag() {
        let dir = TempDir::new().unwrap();
        let mut s = shelf(&dir);

        let tag = s.add_tag("Rust", "#dea584", None).unwrap();
        assert!(tag.id.starts_with("tag_"));
        assert_eq!(tag.id.len(), 16);

        let updated = s
            .update_tag(&tag.id, TagPatch { name: Some("Rustacean".into()), ..TagPatch::default() })
            .unwrap();
        assert_eq!(updated.name, "Rustacean");
        assert!(matches!(s.update_tag("nope", TagPatch::default()), Err(Error::Validation(_))));
        assert!(matches!(s.add_tag(" ", "#fff", None), Err(Error::Validation(_))));
    }

    #[test]
    fn test_reclassify_needs_repos() {
        let dir = TempDir::new().unwrap();
        let mut s = shelf(&dir);
        assert!(matches!(s.reclassify(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_open_uses_cache_when_auto_classify_off() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path());
        store.save_repositories(&[repo(1, "vue")], now()).unwrap();
        store
            .save_config(&UserConfig { auto_classify: false, ..UserConfig::default() })
            .unwrap();
        store.save_categories(&[]).unwrap();

        let s = Shelf::open(store);

        assert!(s.categories().is_empty());
    }

    #[test]
    fn test_import_reloads() {
        let dir = TempDir::new().unwrap();
        let mut s = shelf(&dir);
        let json = r##"{"tags": [{"id": "only", "name": "Only", "color": "#111111"}]}"##;

        s.import(json, now()).unwrap();

        assert_eq!(s.tags().len(), 1);
        assert!(s.import("not json", now()).is_err());
        assert_eq!(s.tags().len(), 1);
    }

    #[test]
    fn test_clear_all_resets() {
        let dir = TempDir::new().unwrap();
        let mut s = with_user(&dir);
        s.clear_all();
        assert!(s.config().username.is_empty());
        assert_eq!(s.store().load_config().username, "");
    }
}
