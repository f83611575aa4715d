// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Benchmarks for whole-collection classification and the view pipeline

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use starshelf::category::build_categories;
use starshelf::lens::Lens;
use starshelf::pipeline::{self, SortDirection, SortKey, ViewQuery};
use starshelf::types::{KeywordRule, Owner, Repository, Tag};

const SIZES: [usize; 3] = [100, 1_000, 5_000];
const WORDS: [&str; 8] = ["react", "kube", "llm", "cli", "postgres", "game", "docs", "misc"];

fn collection(n: usize) -> Vec<Repository> {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let word = WORDS[i % WORDS.len()];
            let at = now - Duration::days((i % 2000) as i64);
            Repository {
                id: i as u64,
                name: format!("{word}-{i}"),
                full_name: format!("bench/{word}-{i}"),
                description: Some(format!("A {word} project number {i}")),
                html_url: format!("https://github.com/bench/{word}-{i}"),
                stargazers_count: (i * 37 % 20_000) as u64,
                language: Some(["Rust", "Go", "TypeScript"][i % 3].into()),
                topics: vec![word.into()],
                created_at: at,
                updated_at: at,
                pushed_at: Some(at),
                starred_at: at,
                owner: Owner {
                    login: "bench".into(),
                    avatar_url: String::new(),
                },
            }
        })
        .collect()
}

fn bench_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    let tags = Tag::defaults();
    let rules = KeywordRule::defaults();

    for size in SIZES {
        let repos = collection(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("build_categories", size), &repos, |b, repos| {
            b.iter(|| black_box(build_categories(repos, &tags, &rules)));
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();

    for size in SIZES {
        let repos = collection(size);
        let refs: Vec<&Repository> = repos.iter().collect();
        let query = ViewQuery {
            query: "rust".into(),
            sort: SortKey::Stars,
            direction: SortDirection::Desc,
            page: 2,
            page_size: 8,
        };
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("view", size), &refs, |b, refs| {
            b.iter(|| black_box(pipeline::view(refs, &query).total));
        });
        group.bench_with_input(BenchmarkId::new("maturity_lens", size), &repos, |b, repos| {
            b.iter(|| black_box(Lens::Maturity.group(repos, &[], now).len()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_classification, bench_pipeline);
criterion_main!(benches);
