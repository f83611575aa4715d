// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Persisted shelf state: one JSON file per entry in the data directory

use crate::error::{Error, Result};
use crate::types::{Category, KeywordRule, Repository, Tag, UserConfig};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const USER_CONFIG: &str = "user_config";
const REPOS: &str = "repos";
const TAGS: &str = "tags";
const CATEGORIES: &str = "categories";
const KEYWORD_RULES: &str = "keyword_rules";
const LAST_SYNC: &str = "last_sync";

const ENTRIES: [&str; 6] = [USER_CONFIG, REPOS, TAGS, CATEGORIES, KEYWORD_RULES, LAST_SYNC];

/// Full export document; every field optional on import
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// User settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_config: Option<UserConfig>,
    /// Repository cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repos: Option<Vec<Repository>>,
    /// Tag list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    /// Category cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
    /// Keyword rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_rules: Option<Vec<KeywordRule>>,
    /// Last successful sync
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
    /// When the snapshot was taken
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_time: Option<DateTime<Utc>>,
}

/// JSON-file store rooted at a data directory
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Store over `dir`; the directory is created on first write
    #[must_use]
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, entry: &str) -> PathBuf {
        self.dir.join(format!("{entry}.json"))
    }

    /// Read an entry; `None` when absent or unreadable
    fn read<T: DeserializeOwned>(&self, entry: &'static str) -> Option<T> {
        let path = self.path(entry);
        if !path.exists() {
            return None;
        }
        let parsed = fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()));
        match parsed {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring unreadable {} ({}): {}", entry, path.display(), e);
                None
            }
        }
    }

    fn encode<T: Serialize + ?Sized>(entry: &'static str, value: &T) -> Result<String> {
        serde_json::to_string_pretty(value).map_err(|source| Error::Serialize { entry, source })
    }

    fn write_file(path: &Path, entry: &'static str, contents: &str) -> Result<()> {
        fs::write(path, contents).map_err(|source| Error::Persistence { entry, source })
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|source| Error::Persistence { entry: "data directory", source })
    }

    /// Write an entry through a temp file and rename
    fn write<T: Serialize + ?Sized>(&self, entry: &'static str, value: &T) -> Result<()> {
        let json = Self::encode(entry, value)?;
        self.ensure_dir()?;
        let tmp = self.dir.join(format!("{entry}.json.tmp"));
        Self::write_file(&tmp, entry, &json)?;
        fs::rename(&tmp, self.path(entry)).map_err(|source| Error::Persistence { entry, source })?;
        debug!("Wrote {}", entry);
        Ok(())
    }

    // =========================================================================
    // Entries
    // =========================================================================

    /// User settings, with the stored rule list overlaid when present
    #[must_use]
    pub fn load_config(&self) -> UserConfig {
        let mut config: UserConfig = self.read(USER_CONFIG).unwrap_or_default();
        if let Some(rules) = self.read::<Vec<KeywordRule>>(KEYWORD_RULES) {
            config.keyword_rules = rules;
        }
        config
    }

    /// Persist settings and their rule list
    pub fn save_config(&self, config: &UserConfig) -> Result<()> {
        self.write(USER_CONFIG, config)?;
        self.write(KEYWORD_RULES, &config.keyword_rules)
    }

    /// Tag list, defaults when absent
    #[must_use]
    pub fn load_tags(&self) -> Vec<Tag> {
        self.read(TAGS).unwrap_or_else(Tag::defaults)
    }

    /// Persist the tag list
    pub fn save_tags(&self, tags: &[Tag]) -> Result<()> {
        self.write(TAGS, tags)
    }

    /// Keyword rules, defaults when absent
    #[must_use]
    pub fn load_keyword_rules(&self) -> Vec<KeywordRule> {
        self.read(KEYWORD_RULES).unwrap_or_else(KeywordRule::defaults)
    }

    /// Persist keyword rules
    pub fn save_keyword_rules(&self, rules: &[KeywordRule]) -> Result<()> {
        self.write(KEYWORD_RULES, rules)
    }

    /// Repository cache
    #[must_use]
    pub fn load_repositories(&self) -> Vec<Repository> {
        self.read(REPOS).unwrap_or_default()
    }

    /// Persist the repository cache and stamp the sync time
    pub fn save_repositories(&self, repos: &[Repository], now: DateTime<Utc>) -> Result<()> {
        self.write(REPOS, repos)?;
        self.write(LAST_SYNC, &now)
    }

    /// Category cache
    #[must_use]
    pub fn load_categories(&self) -> Vec<Category> {
        self.read(CATEGORIES).unwrap_or_default()
    }

    /// Persist the category cache
    pub fn save_categories(&self, categories: &[Category]) -> Result<()> {
        self.write(CATEGORIES, categories)
    }

    /// Time of the last repository save
    #[must_use]
    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.read(LAST_SYNC)
    }

    /// Remove every entry
    pub fn clear(&self) -> Result<()> {
        for entry in ENTRIES {
            let path = self.path(entry);
            if path.exists() {
                fs::remove_file(&path).map_err(|source| Error::Persistence { entry, source })?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Everything in the store as one pretty-printed JSON document
    pub fn export_snapshot(&self, now: DateTime<Utc>) -> Result<String> {
        let snapshot = Snapshot {
            user_config: Some(self.load_config()),
            repos: Some(self.load_repositories()),
            tags: Some(self.load_tags()),
            categories: Some(self.load_categories()),
            keyword_rules: Some(self.load_keyword_rules()),
            last_sync: self.last_sync(),
            export_time: Some(now),
        };
        Self::encode("snapshot", &snapshot)
    }

    /// Replace the entries present in `json`; absent fields are untouched.
    ///
    /// Nothing is written unless the whole document parses. Every staged
    /// file is written before any is moved into place, and a failed move
    /// restores the entries already replaced.
    pub fn import_snapshot(&self, json: &str, now: DateTime<Utc>) -> Result<()> {
        let snapshot: Snapshot = serde_json::from_str(json).map_err(Error::Import)?;

        let mut staged: Vec<(&'static str, String)> = Vec::new();
        if let Some(config) = &snapshot.user_config {
            staged.push((USER_CONFIG, Self::encode(USER_CONFIG, config)?));
        }
        if let Some(repos) = &snapshot.repos {
            staged.push((REPOS, Self::encode(REPOS, repos)?));
            let stamp = snapshot.last_sync.unwrap_or(now);
            staged.push((LAST_SYNC, Self::encode(LAST_SYNC, &stamp)?));
        } else if let Some(stamp) = &snapshot.last_sync {
            staged.push((LAST_SYNC, Self::encode(LAST_SYNC, stamp)?));
        }
        if let Some(tags) = &snapshot.tags {
            staged.push((TAGS, Self::encode(TAGS, tags)?));
        }
        if let Some(categories) = &snapshot.categories {
            staged.push((CATEGORIES, Self::encode(CATEGORIES, categories)?));
        }
        if let Some(rules) = &snapshot.keyword_rules {
            staged.push((KEYWORD_RULES, Self::encode(KEYWORD_RULES, rules)?));
        }

        self.ensure_dir()?;
        let mut written: Vec<(&'static str, PathBuf)> = Vec::with_capacity(staged.len());
        for &(entry, ref json) in &staged {
            let tmp = self.dir.join(format!("{entry}.json.import"));
            if let Err(e) = Self::write_file(&tmp, entry, json) {
                for (_, path) in &written {
                    discard(path);
                }
                return Err(e);
            }
            written.push((entry, tmp));
        }
        self.commit(&written)?;
        debug!("Imported {} entries", staged.len());
        Ok(())
    }

    /// Move one staged file into place, keeping the current file as a backup
    fn swap_in(&self, entry: &'static str, staged: &Path) -> Result<Option<PathBuf>> {
        let path = self.path(entry);
        let backup = if path.exists() {
            let backup = self.dir.join(format!("{entry}.json.bak"));
            fs::rename(&path, &backup).map_err(|source| Error::Persistence { entry, source })?;
            Some(backup)
        } else {
            None
        };
        if let Err(source) = fs::rename(staged, &path) {
            self.restore(entry, backup.as_deref());
            return Err(Error::Persistence { entry, source });
        }
        Ok(backup)
    }

    /// Put an entry back the way it was before [`Self::swap_in`]
    fn restore(&self, entry: &'static str, backup: Option<&Path>) {
        let path = self.path(entry);
        let result = match backup {
            Some(backup) => fs::rename(backup, &path),
            None if path.exists() => fs::remove_file(&path),
            None => Ok(()),
        };
        if let Err(e) = result {
            warn!("Could not restore {} ({}): {}", entry, path.display(), e);
        }
    }

    /// Swap every staged file in, or none of them
    fn commit(&self, staged: &[(&'static str, PathBuf)]) -> Result<()> {
        let mut committed: Vec<(&'static str, Option<PathBuf>)> = Vec::with_capacity(staged.len());
        for &(entry, ref tmp) in staged {
            match self.swap_in(entry, tmp) {
                Ok(backup) => committed.push((entry, backup)),
                Err(e) => {
                    for &(entry, ref backup) in committed.iter().rev() {
                        self.restore(entry, backup.as_deref());
                    }
                    for (_, tmp) in staged {
                        discard(tmp);
                    }
                    return Err(e);
                }
            }
        }
        for (_, backup) in &committed {
            if let Some(backup) = backup {
                discard(backup);
            }
        }
        Ok(())
    }
}

/// Remove a leftover staging or backup file
fn discard(path: &Path) {
    if path.exists() {
        if let Err(e) = fs::remove_file(path) {
            warn!("Could not remove {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{now, repo};
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_empty() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path());

        assert_eq!(store.load_tags(), Tag::defaults());
        assert_eq!(store.load_keyword_rules(), KeywordRule::defaults());
        assert!(store.load_repositories().is_empty());
        assert!(store.last_sync().is_none());
        assert!(store.load_config().auto_classify);
    }

    #[test]
    fn test_corrupt_entry_falls_back() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("tags.json"), "{not json").unwrap();
        let store = Store::open(dir.path());
        assert_eq!(store.load_tags().len(), Tag::defaults().len());
    }

    #[test]
    fn test_repositories_stamp_last_sync() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path());
        store.save_repositories(&[repo(1, "a")], now()).unwrap();

        assert_eq!(store.load_repositories().len(), 1);
        assert_eq!(store.last_sync(), Some(now()));
    }

    #[test]
    fn test_config_rules_round_trip_through_rule_entry() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path());
        let config = UserConfig {
            username: "octocat".into(),
            keyword_rules: vec![],
            ..UserConfig::default()
        };
        store.save_config(&config).unwrap();

        let loaded = store.load_config();
        assert_eq!(loaded.username, "octocat");
        assert!(loaded.keyword_rules.is_empty());
        assert!(store.load_keyword_rules().is_empty());
    }

    #[test]
    fn test_import_tags_only_leaves_rest() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path());
        store.save_repositories(&[repo(1, "keep")], now()).unwrap();
        store
            .save_config(&UserConfig { username: "keeper".into(), ..UserConfig::default() })
            .unwrap();

        let json = r##"{"tags": [{"id": "rust", "name": "Rust", "color": "#dea584"}]}"##;
        store.import_snapshot(json, now()).unwrap();

        assert_eq!(store.load_tags().len(), 1);
        assert_eq!(store.load_repositories()[0].name, "keep");
        assert_eq!(store.load_config().username, "keeper");
    }

    #[test]
    fn test_malformed_import_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path());
        store.save_tags(&Tag::defaults()).unwrap();

        let json = r#"{"tags": [{"id": "x"}], "repos": "nope"}"#;
        assert!(matches!(store.import_snapshot(json, now()), Err(Error::Import(_))));
        assert_eq!(store.load_tags(), Tag::defaults());
        assert!(!dir.path().join("repos.json").exists());
    }

    #[test]
    fn test_export_then_import_into_fresh_store() {
        let src_dir = TempDir::new().unwrap();
        let src = Store::open(src_dir.path());
        src.save_repositories(&[repo(1, "a"), repo(2, "b")], now()).unwrap();
        let json = src.export_snapshot(now()).unwrap();
        assert!(json.contains("\"exportTime\""));
        assert!(json.contains("\"keywordRules\""));

        let dst_dir = TempDir::new().unwrap();
        let dst = Store::open(dst_dir.path());
        dst.import_snapshot(&json, now()).unwrap();

        assert_eq!(dst.load_repositories().len(), 2);
        assert_eq!(dst.last_sync(), Some(now()));
        assert_eq!(dst.load_tags(), Tag::defaults());
    }

    #[test]
    fn test_config_only_import_keeps_custom_rules() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path());
        let custom = vec![KeywordRule {
            keywords: vec!["zzz".into()],
            tag_id: "tools".into(),
            priority: KeywordRule::DEFAULT_PRIORITY,
        }];
        store.save_keyword_rules(&custom).unwrap();

        let json = r#"{"userConfig": {"username": "other", "autoClassify": false}}"#;
        store.import_snapshot(json, now()).unwrap();

        let config = store.load_config();
        assert_eq!(config.username, "other");
        assert!(!config.auto_classify);
        assert_eq!(store.load_keyword_rules(), custom);
        assert_eq!(config.keyword_rules, custom);
    }

    #[test]
    fn test_failed_commit_restores_every_entry() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path());
        let tags = Tag::defaults();
        let rules = KeywordRule::defaults();
        store.save_tags(&tags).unwrap();
        store.save_keyword_rules(&rules).unwrap();
        // a directory in the backup slot makes the rules swap fail after tags went in
        let blocker = dir.path().join("keyword_rules.json.bak");
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep"), "x").unwrap();

        let json = r##"{
            "tags": [{"id": "solo", "name": "Solo", "color": "#123456"}],
            "keywordRules": []
        }"##;
        let result = store.import_snapshot(json, now());

        assert!(matches!(result, Err(Error::Persistence { .. })));
        assert_eq!(store.load_tags(), tags);
        assert_eq!(store.load_keyword_rules(), rules);
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".import") || name == "tags.json.bak")
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }

    #[test]
    fn test_clear_removes_entries() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path());
        store.save_tags(&[]).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load_tags(), Tag::defaults());
    }
}
