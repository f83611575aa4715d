// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Classification lenses: one browse dimension each

use crate::bucket::{self, days_since, BucketDefinition, Grouped};
use crate::pipeline::{SortDirection, SortKey, ViewState};
use crate::types::{Category, Repository};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A browse dimension over the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Lens {
    /// Keyword-rule tag categories
    Tags,
    /// When the repository was starred
    Time,
    /// Star count tiers
    Popularity,
    /// Age and stars combined
    Maturity,
    /// Days since last activity
    Activity,
}

/// Display data for one category of a lens
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Level {
    /// Category key
    pub key: String,
    /// Display name
    pub name: String,
    /// Icon glyph
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Hex color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&BucketDefinition> for Level {
    fn from(d: &BucketDefinition) -> Self {
        Self {
            key: d.key.to_string(),
            name: d.name.to_string(),
            icon: d.icon.map(String::from),
            color: d.color.map(String::from),
            description: d.description.map(String::from),
        }
    }
}

impl From<&Category> for Level {
    fn from(c: &Category) -> Self {
        Self {
            key: c.id.clone(),
            name: c.name.clone(),
            icon: None,
            color: c.color.clone(),
            description: c.description.clone(),
        }
    }
}

#[allow(clippy::cast_possible_wrap)]
fn star_scalar(repo: &Repository) -> i64 {
    repo.stargazers_count as i64
}

impl Lens {
    /// Categories of this lens in display order
    #[must_use]
    pub fn levels(self, categories: &[Category]) -> Vec<Level> {
        match self {
            Self::Tags => categories.iter().map(Level::from).collect(),
            Self::Time => bucket::collection_time().definitions().map(Level::from).collect(),
            Self::Popularity => bucket::popularity().definitions().map(Level::from).collect(),
            Self::Maturity => bucket::maturity().definitions().map(Level::from).collect(),
            Self::Activity => bucket::activity().definitions().map(Level::from).collect(),
        }
    }

    /// Group the collection for this lens.
    ///
    /// The tags lens reads members from the category cache; every other lens
    /// buckets `repos` afresh against `now`.
    #[must_use]
    pub fn group<'a>(self, repos: &'a [Repository], categories: &'a [Category], now: DateTime<Utc>) -> Grouped<'a> {
        match self {
            Self::Tags => {
                let mut grouped = Grouped::with_keys(categories.iter().map(|c| c.id.clone()));
                for category in categories {
                    for repo in &category.repos {
                        grouped.push(&category.id, repo);
                    }
                }
                grouped
            }
            Self::Time => bucket::collection_time().bucketize(repos, |r| days_since(r.starred_at, now)),
            Self::Popularity => bucket::popularity().bucketize(repos, star_scalar),
            Self::Maturity => bucket::maturity().bucketize(repos, now),
            Self::Activity => bucket::activity().bucketize(repos, |r| days_since(r.last_activity(), now)),
        }
    }

    /// Default sort field and direction
    #[must_use]
    pub fn default_sort(self) -> (SortKey, SortDirection) {
        match self {
            Self::Tags | Self::Popularity => (SortKey::Stars, SortDirection::Desc),
            Self::Time => (SortKey::Starred, SortDirection::Desc),
            Self::Maturity => (SortKey::Created, SortDirection::Asc),
            Self::Activity => (SortKey::Updated, SortDirection::Desc),
        }
    }

    /// Category shown first
    #[must_use]
    pub fn default_active(self, categories: &[Category]) -> String {
        match self {
            Self::Tags => categories.first().map(|c| c.id.clone()).unwrap_or_default(),
            Self::Time => "thisWeek".into(),
            Self::Popularity => "superPopular".into(),
            Self::Maturity => "mature".into(),
            Self::Activity => "veryActive".into(),
        }
    }

    /// Sort fields offered by this lens
    #[must_use]
    pub fn sort_options(self) -> &'static [SortKey] {
        match self {
            Self::Time => &[SortKey::Starred, SortKey::Created, SortKey::Updated, SortKey::Stars, SortKey::Name],
            Self::Activity => &[SortKey::Updated, SortKey::Stars, SortKey::Created, SortKey::Name],
            Self::Tags | Self::Popularity | Self::Maturity => {
                &[SortKey::Stars, SortKey::Created, SortKey::Updated, SortKey::Name]
            }
        }
    }

    /// View state seeded with this lens' defaults
    #[must_use]
    pub fn initial_state(self, categories: &[Category]) -> ViewState {
        let (sort, direction) = self.default_sort();
        ViewState::new(sort, direction, self.default_active(categories))
    }
}
