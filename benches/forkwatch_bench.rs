// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Benchmarks for clustering and patch grouping

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use forkwatch::analysis::{analyze, recommend};
use forkwatch::noise::NoiseRules;
use forkwatch::types::{CommitInfo, Comparison, FileDelta, ForkIdentity, UpstreamRepo};

/// Synthetic network: each fork touches a few of 20 files with one of 4 diffs
fn network(forks: usize) -> Vec<Comparison> {
    (0..forks)
        .map(|i| Comparison {
            fork: ForkIdentity {
                owner: format!("user{i}"),
                repo: "widget".into(),
                default_branch: "main".into(),
                html_url: format!("https://github.com/user{i}/widget"),
                pushed_at: None,
            },
            ahead_by: 2,
            commits: vec![CommitInfo {
                author: format!("user{i}"),
                login: None,
                message: "tweak".into(),
            }],
            files: (0..3)
                .map(|j| FileDelta {
                    path: format!("src/file{}.rs", (i * 7 + j * 3) % 20),
                    additions: 3,
                    deletions: 1,
                    patch: format!("@@ -1,1 +1,1 @@\n-old\n+variant {}\n", (i + j) % 4),
                })
                .collect(),
        })
        .collect()
}

fn bench_analyze(c: &mut Criterion) {
    let upstream = UpstreamRepo {
        owner: "acme".into(),
        repo: "widget".into(),
        default_branch: "main".into(),
        fork_count: 1_000,
    };
    let rules = NoiseRules::default();
    let mut group = c.benchmark_group("analyze");

    for forks in [10, 100, 1_000] {
        let input = network(forks);
        group.throughput(Throughput::Elements(forks as u64));
        group.bench_with_input(BenchmarkId::from_parameter(forks), &input, |b, input| {
            b.iter(|| {
                let result = analyze(&upstream, input.len(), input.clone(), &rules);
                black_box(recommend(&result))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_analyze);
criterion_main!(benches);
