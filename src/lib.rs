// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Starshelf library - browse starred repositories through classification lenses
//!
//! This crate provides rule-based tagging of starred repositories, threshold
//! bucketing along popularity, maturity, activity and collection-time
//! dimensions, and the filter/sort/paginate pipeline shared by every view.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bucket;
pub mod category;
pub mod classify;
pub mod commands;
pub mod config;
pub mod error;
pub mod github;
pub mod lens;
pub mod pipeline;
pub mod shelf;
pub mod stats;
pub mod store;

/// Core data types shared by every classification dimension
pub mod types {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    /// Tag id assigned when no keyword rule matches
    pub const OTHER_TAG_ID: &str = "other";

    // =========================================================================
    // Repository
    // =========================================================================

    /// Owner of a starred repository
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Owner {
        /// Account login
        pub login: String,
        /// Avatar image URL
        #[serde(default)]
        pub avatar_url: String,
    }

    /// A starred repository record as fetched from the remote forge
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Repository {
        /// Forge-assigned numeric id
        pub id: u64,
        /// Short name
        pub name: String,
        /// owner/name
        pub full_name: String,
        /// Free-text description
        pub description: Option<String>,
        /// Browser URL
        pub html_url: String,
        /// Star count
        pub stargazers_count: u64,
        /// Primary language
        pub language: Option<String>,
        /// Topic labels
        #[serde(default)]
        pub topics: Vec<String>,
        /// Creation time
        pub created_at: DateTime<Utc>,
        /// Last metadata update
        pub updated_at: DateTime<Utc>,
        /// Last push, if any
        pub pushed_at: Option<DateTime<Utc>>,
        /// When the user starred it
        pub starred_at: DateTime<Utc>,
        /// Owning account
        pub owner: Owner,
    }

    impl Repository {
        /// Most recent activity: last push, falling back to last update
        #[must_use]
        pub fn last_activity(&self) -> DateTime<Utc> {
            self.pushed_at.unwrap_or(self.updated_at)
        }

        /// Lower-cased text that keyword rules are matched against
        #[must_use]
        pub fn classification_corpus(&self) -> String {
            let mut parts: Vec<&str> = Vec::with_capacity(self.topics.len() + 3);
            parts.push(&self.name);
            parts.push(self.description.as_deref().unwrap_or(""));
            parts.extend(self.topics.iter().map(String::as_str));
            parts.push(self.language.as_deref().unwrap_or(""));
            parts.join(" ").to_lowercase()
        }
    }

    // =========================================================================
    // Tags and Rules
    // =========================================================================

    /// User-managed topical label
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Tag {
        /// Unique identifier
        pub id: String,
        /// Display name
        pub name: String,
        /// Hex color, e.g. `#1890ff`
        pub color: String,
        /// Description
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
    }

    impl Tag {
        fn new(id: &str, name: &str, color: &str, description: &str) -> Self {
            Self {
                id: id.into(),
                name: name.into(),
                color: color.into(),
                description: Some(description.into()),
            }
        }

        /// The tag set a fresh shelf starts with
        #[must_use]
        pub fn defaults() -> Vec<Self> {
            vec![
                Self::new("frontend", "Frontend", "#1890ff", "Frontend frameworks, libraries and tooling"),
                Self::new("backend", "Backend", "#52c41a", "Backend frameworks, APIs and servers"),
                Self::new("mobile", "Mobile", "#722ed1", "Mobile application development"),
                Self::new("ai-ml", "AI/ML", "#fa541c", "Artificial intelligence and machine learning"),
                Self::new("devops", "DevOps", "#13c2c2", "Deployment, monitoring and operations"),
                Self::new("database", "Database", "#eb2f96", "Databases and data storage"),
                Self::new("tools", "Dev Tools", "#faad14", "Developer utilities"),
                Self::new("game", "Game Dev", "#f759ab", "Game engines and game development"),
                Self::new("security", "Security", "#ff4d4f", "Security and cryptography"),
                Self::new("data", "Data Science", "#9254de", "Data analysis and visualization"),
                Self::new("ui-ux", "UI/UX", "#36cfc9", "UI components and design systems"),
                Self::new("testing", "Testing", "#ffc53d", "Testing frameworks and tools"),
                Self::new("docs", "Docs", "#95de64", "Documentation and tutorials"),
                Self::new(OTHER_TAG_ID, "Other", "#d9d9d9", "Uncategorized projects"),
            ]
        }
    }

    /// Maps a keyword set to a tag; higher priority wins ordering
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct KeywordRule {
        /// Any keyword matching the corpus fires the rule
        pub keywords: Vec<String>,
        /// Tag to assign (may dangle)
        pub tag_id: String,
        /// Larger is higher priority
        pub priority: i32,
    }

    impl KeywordRule {
        /// Priority given to rules created without one
        pub const DEFAULT_PRIORITY: i32 = 10;

        fn new(tag_id: &str, priority: i32, keywords: &[&str]) -> Self {
            Self {
                keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
                tag_id: tag_id.into(),
                priority,
            }
        }

        /// The rule set a fresh shelf starts with
        #[must_use]
        pub fn defaults() -> Vec<Self> {
            vec![
                Self::new("frontend", 10, &[
                    "react", "vue", "angular", "svelte", "frontend", "javascript", "typescript",
                    "css", "html", "webpack", "vite", "next.js", "nuxt",
                ]),
                Self::new("backend", 10, &[
                    "node.js", "express", "koa", "nestjs", "spring", "django", "flask", "fastapi",
                    "gin", "echo", "backend", "api", "server", "microservice",
                ]),
                Self::new("mobile", 10, &[
                    "react-native", "flutter", "ionic", "cordova", "xamarin", "android", "ios",
                    "mobile", "app",
                ]),
                Self::new("ai-ml", 10, &[
                    "tensorflow", "pytorch", "keras", "scikit-learn", "machine-learning",
                    "deep-learning", "neural-network", "ai", "ml", "nlp", "computer-vision",
                ]),
                Self::new("devops", 10, &[
                    "docker", "kubernetes", "jenkins", "gitlab-ci", "github-actions", "terraform",
                    "ansible", "devops", "ci-cd", "deployment",
                ]),
                Self::new("database", 10, &[
                    "mysql", "postgresql", "mongodb", "redis", "elasticsearch", "database", "sql",
                    "nosql", "orm",
                ]),
                Self::new("tools", 8, &[
                    "vscode", "vim", "emacs", "git", "cli", "terminal", "shell", "bash", "zsh",
                    "tool", "utility", "helper",
                ]),
                Self::new("game", 10, &[
                    "unity", "unreal", "godot", "game", "gaming", "gamedev", "engine",
                ]),
                Self::new("security", 10, &[
                    "security", "encryption", "crypto", "ssl", "tls", "auth", "authentication",
                    "authorization", "vulnerability",
                ]),
                Self::new("data", 10, &[
                    "pandas", "numpy", "matplotlib", "jupyter", "data-science", "analytics",
                    "visualization", "chart", "graph",
                ]),
                Self::new("ui-ux", 9, &[
                    "ui", "ux", "design", "component", "antd", "material-ui", "bootstrap",
                    "tailwind", "css-framework",
                ]),
                Self::new("testing", 9, &[
                    "jest", "mocha", "chai", "cypress", "selenium", "testing", "test", "unit-test",
                    "e2e",
                ]),
                Self::new("docs", 7, &[
                    "documentation", "docs", "readme", "tutorial", "guide", "book", "learning",
                ]),
            ]
        }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Materialized grouping of repositories under one tag
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Category {
        /// Tag id
        pub id: String,
        /// Display name
        pub name: String,
        /// Description
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        /// Display color
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub color: Option<String>,
        /// Tags behind this category
        #[serde(default)]
        pub tags: Vec<Tag>,
        /// Members
        #[serde(default)]
        pub repos: Vec<Repository>,
    }

    // =========================================================================
    // User Configuration
    // =========================================================================

    fn default_true() -> bool {
        true
    }

    /// Persisted per-user settings
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserConfig {
        /// Personal access token for the forge API
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub github_token: Option<String>,
        /// Account whose stars are synced
        #[serde(default)]
        pub username: String,
        /// Re-classify automatically after syncs and rule edits
        #[serde(default = "default_true")]
        pub auto_classify: bool,
        /// Active keyword rules
        #[serde(default = "KeywordRule::defaults")]
        pub keyword_rules: Vec<KeywordRule>,
    }

    impl Default for UserConfig {
        fn default() -> Self {
            Self {
                github_token: None,
                username: String::new(),
                auto_classify: true,
                keyword_rules: KeywordRule::defaults(),
            }
        }
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::*;
}
