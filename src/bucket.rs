// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Threshold bucketing of repositories along numeric and time dimensions
//!
//! Every bucketer carries an explicit fallback bucket that receives whatever
//! no threshold tier accepts, so a bucketing is always an exhaustive,
//! disjoint partition of its input.

use crate::types::Repository;
use chrono::{DateTime, Utc};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Whole days elapsed from `date` to `now`, floored (negative for future dates)
#[must_use]
pub fn days_since(date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - date).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

// =============================================================================
// Definitions
// =============================================================================

/// Display half of a bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketDefinition {
    /// Stable key used in grouped output
    pub key: &'static str,
    /// Display name
    pub name: &'static str,
    /// Icon glyph
    pub icon: Option<&'static str>,
    /// Hex color
    pub color: Option<&'static str>,
    /// One-line description
    pub description: Option<&'static str>,
}

impl BucketDefinition {
    /// Bucket with only a key and a name
    #[must_use]
    pub const fn named(key: &'static str, name: &'static str) -> Self {
        Self { key, name, icon: None, color: None, description: None }
    }

    /// Bucket with icon and color
    #[must_use]
    pub const fn styled(
        key: &'static str,
        name: &'static str,
        icon: &'static str,
        color: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            name,
            icon: Some(icon),
            color: Some(color),
            description: Some(description),
        }
    }
}

/// Threshold half of a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketTest {
    /// `scalar <= high`
    AtMost(i64),
    /// `offset <= scalar < offset + span`
    Window {
        /// Lower bound, inclusive
        offset: i64,
        /// Width of the window
        span: i64,
    },
    /// `scalar >= low`
    AtLeast(i64),
}

impl BucketTest {
    /// Whether `scalar` passes this test
    #[must_use]
    pub fn accepts(self, scalar: i64) -> bool {
        match self {
            Self::AtMost(high) => scalar <= high,
            Self::Window { offset, span } => scalar >= offset && scalar < offset.saturating_add(span),
            Self::AtLeast(low) => scalar >= low,
        }
    }
}

// =============================================================================
// Grouped output
// =============================================================================

/// Ordered map from category key to member repositories
#[derive(Debug, Clone, Default)]
pub struct Grouped<'a> {
    entries: Vec<(String, Vec<&'a Repository>)>,
}

impl<'a> Grouped<'a> {
    /// Grouping with one empty entry per key, in order
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: keys.into_iter().map(|k| (k.into(), Vec::new())).collect(),
        }
    }

    /// Append `repo` under `key`, creating the entry at the end if new
    pub fn push(&mut self, key: &str, repo: &'a Repository) {
        if let Some((_, members)) = self.entries.iter_mut().find(|(k, _)| k == key) {
            members.push(repo);
        } else {
            self.entries.push((key.to_string(), vec![repo]));
        }
    }

    /// Members under `key`; empty for unknown keys
    #[must_use]
    pub fn get(&self, key: &str) -> &[&'a Repository] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, members)| members.as_slice())
            .unwrap_or(&[])
    }

    /// Whether an entry exists for `key`
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[&'a Repository])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of memberships across entries.
    ///
    /// For tag groupings a repository with several tags counts once per tag,
    /// so this is not a count of distinct repositories.
    #[must_use]
    pub fn membership_count(&self) -> usize {
        self.entries.iter().map(|(_, v)| v.len()).sum()
    }
}

// =============================================================================
// Single-scalar bucketer
// =============================================================================

/// Ordered threshold tiers plus a designated fallback bucket
#[derive(Debug, Clone)]
pub struct Bucketer {
    tiers: Vec<(BucketDefinition, BucketTest)>,
    fallback: BucketDefinition,
}

impl Bucketer {
    /// Build from tiers (evaluated in order) and the fallback
    #[must_use]
    pub fn new(tiers: Vec<(BucketDefinition, BucketTest)>, fallback: BucketDefinition) -> Self {
        Self { tiers, fallback }
    }

    /// Every bucket, fallback last
    pub fn definitions(&self) -> impl Iterator<Item = &BucketDefinition> {
        self.tiers.iter().map(|(d, _)| d).chain(std::iter::once(&self.fallback))
    }

    /// The fallback bucket
    #[must_use]
    pub fn fallback(&self) -> &BucketDefinition {
        &self.fallback
    }

    /// Key of the first tier accepting `scalar`, else the fallback key
    #[must_use]
    pub fn key_for(&self, scalar: i64) -> &'static str {
        self.tiers
            .iter()
            .find(|(_, test)| test.accepts(scalar))
            .map_or(self.fallback.key, |(d, _)| d.key)
    }

    /// Partition `repos` by the scalar each one derives
    pub fn bucketize<'a, F>(&self, repos: &'a [Repository], scalar_of: F) -> Grouped<'a>
    where
        F: Fn(&Repository) -> i64,
    {
        let mut grouped = Grouped::with_keys(self.definitions().map(|d| d.key));
        for repo in repos {
            grouped.push(self.key_for(scalar_of(repo)), repo);
        }
        grouped
    }
}

// =============================================================================
// Age x stars cascade
// =============================================================================

/// One conjunctive guard of the maturity cascade
#[derive(Debug, Clone)]
pub struct MaturityRung {
    /// Bucket assigned when the guard holds
    pub bucket: BucketDefinition,
    /// Minimum age in years (365-day years)
    pub min_age_years: f64,
    /// Minimum star count
    pub min_stars: u64,
}

/// Priority-ordered decision list over age and popularity
#[derive(Debug, Clone)]
pub struct MaturityLadder {
    rungs: Vec<MaturityRung>,
    fallback: BucketDefinition,
}

impl MaturityLadder {
    /// Build from rungs (first match wins) and the fallback
    #[must_use]
    pub fn new(rungs: Vec<MaturityRung>, fallback: BucketDefinition) -> Self {
        Self { rungs, fallback }
    }

    /// Every bucket, fallback last
    pub fn definitions(&self) -> impl Iterator<Item = &BucketDefinition> {
        self.rungs.iter().map(|r| &r.bucket).chain(std::iter::once(&self.fallback))
    }

    /// Key for a repository of the given age and star count
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn key_for(&self, age_days: i64, stars: u64) -> &'static str {
        let age_years = age_days as f64 / 365.0;
        self.rungs
            .iter()
            .find(|r| age_years >= r.min_age_years && stars >= r.min_stars)
            .map_or(self.fallback.key, |r| r.bucket.key)
    }

    /// Partition `repos` by age since creation and stars
    pub fn bucketize<'a>(&self, repos: &'a [Repository], now: DateTime<Utc>) -> Grouped<'a> {
        let mut grouped = Grouped::with_keys(self.definitions().map(|d| d.key));
        for repo in repos {
            let age = days_since(repo.created_at, now);
            grouped.push(self.key_for(age, repo.stargazers_count), repo);
        }
        grouped
    }
}

// =============================================================================
// Built-in dimensions
// =============================================================================

/// Buckets by days since last activity
#[must_use]
pub fn activity() -> Bucketer {
    Bucketer::new(
        vec![
            (BucketDefinition::styled("veryActive", "Very active", "🔥", "#ff4d4f", "Updated within a week"), BucketTest::AtMost(7)),
            (BucketDefinition::styled("active", "Active", "⚡", "#fa8c16", "Updated within a month"), BucketTest::AtMost(30)),
            (BucketDefinition::styled("moderate", "Moderate", "📈", "#faad14", "Updated within three months"), BucketTest::AtMost(90)),
            (BucketDefinition::styled("slow", "Slow", "🐌", "#52c41a", "Updated within six months"), BucketTest::AtMost(180)),
            (BucketDefinition::styled("occasional", "Occasional", "🌙", "#1890ff", "Updated within a year"), BucketTest::AtMost(365)),
            (BucketDefinition::styled("dormant", "Dormant", "😴", "#722ed1", "Updated within two years"), BucketTest::AtMost(730)),
        ],
        BucketDefinition::styled("inactive", "Inactive", "💤", "#8c8c8c", "No updates for over two years"),
    )
}

/// Buckets by star count
#[must_use]
pub fn popularity() -> Bucketer {
    Bucketer::new(
        vec![
            (BucketDefinition::styled("superPopular", "Super popular", "🔥", "#ff4d4f", "10000+ stars"), BucketTest::AtLeast(10_000)),
            (BucketDefinition::styled("veryPopular", "Very popular", "⭐", "#fa8c16", "5000-9999 stars"), BucketTest::AtLeast(5_000)),
            (BucketDefinition::styled("popular", "Popular", "🌟", "#faad14", "1000-4999 stars"), BucketTest::AtLeast(1_000)),
            (BucketDefinition::styled("rising", "Rising", "📈", "#52c41a", "500-999 stars"), BucketTest::AtLeast(500)),
            (BucketDefinition::styled("promising", "Promising", "💎", "#1890ff", "100-499 stars"), BucketTest::AtLeast(100)),
            (BucketDefinition::styled("emerging", "Emerging", "🌱", "#722ed1", "50-99 stars"), BucketTest::AtLeast(50)),
        ],
        BucketDefinition::styled("starter", "Starter", "🚀", "#eb2f96", "0-49 stars"),
    )
}

/// Buckets by days since the user starred the repository
#[must_use]
pub fn collection_time() -> Bucketer {
    let window = |span| BucketTest::Window { offset: 0, span };
    Bucketer::new(
        vec![
            (BucketDefinition::named("thisWeek", "This week"), window(7)),
            (BucketDefinition::named("thisMonth", "This month"), window(30)),
            (BucketDefinition::named("last3Months", "Last 3 months"), window(90)),
            (BucketDefinition::named("last6Months", "Last 6 months"), window(180)),
            (BucketDefinition::named("thisYear", "This year"), window(365)),
            (BucketDefinition::named("lastYear", "Last year"), BucketTest::Window { offset: 365, span: 730 }),
        ],
        BucketDefinition::named("older", "Older"),
    )
}

/// Age x stars maturity cascade
#[must_use]
pub fn maturity() -> MaturityLadder {
    let rung = |bucket, min_age_years, min_stars| MaturityRung { bucket, min_age_years, min_stars };
    MaturityLadder::new(
        vec![
            rung(BucketDefinition::styled("legendary", "Legendary", "👑", "#722ed1", "Over 5 years and 10k+ stars"), 5.0, 10_000),
            rung(BucketDefinition::styled("veteran", "Veteran", "🏆", "#1890ff", "Over 3 years and 5k+ stars"), 3.0, 5_000),
            rung(BucketDefinition::styled("mature", "Mature", "🎖️", "#52c41a", "Over 2 years and 1k+ stars"), 2.0, 1_000),
            rung(BucketDefinition::styled("established", "Established", "🥉", "#faad14", "Over a year and 500+ stars"), 1.0, 500),
            rung(BucketDefinition::styled("growing", "Growing", "🌱", "#fa8c16", "Over six months and 100+ stars"), 0.5, 100),
            rung(BucketDefinition::styled("emerging", "Emerging", "🚀", "#ff4d4f", "Over three months with some attention"), 0.25, 10),
        ],
        BucketDefinition::styled("fresh", "Fresh", "🌟", "#eb2f96", "Just getting started"),
    )
}
