use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cdn_placement::prelude::*;

/// Deterministic synthetic workload shaped like the contest datasets
fn synthetic_catalog(videos: usize, endpoints: usize, caches: usize, requests: usize) -> Catalog {
    let sizes: Vec<u64> = (0..videos).map(|i| 10 + (i as u64 * 37) % 490).collect();

    let endpoints: Vec<Endpoint> = (0..endpoints)
        .map(|e| {
            let links = (0..caches)
                .filter(|c| (e + c) % 3 != 0)
                .map(|c| CacheLink {
                    cache: c,
                    latency: 5 + ((e * 31 + c * 17) % 495) as u64,
                })
                .collect();
            Endpoint::new(e, 500 + (e as u64 * 13) % 1500, links)
        })
        .collect();

    let requests: Vec<Request> = (0..requests)
        .map(|r| {
            let video = (r * 7919) % videos;
            let endpoint = (r * 104_729) % endpoints.len();
            Request::new(endpoint, video, sizes[video], 1 + (r as u64 * 97) % 1000)
        })
        .collect();

    Catalog::new(&sizes, caches, 50_000, endpoints, requests)
}

fn bench_allocator(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocator_run");

    for n_requests in [1_000, 10_000, 50_000] {
        let catalog = synthetic_catalog(5_000, 100, 50, n_requests);
        group.bench_with_input(
            BenchmarkId::new("requests", n_requests),
            &catalog,
            |b, catalog| {
                b.iter(|| {
                    let mut catalog = catalog.clone();
                    Allocator::default().run(black_box(&mut catalog))
                })
            },
        );
    }
    group.finish();
}

fn bench_scheduler_drain(c: &mut Criterion) {
    let catalog = synthetic_catalog(5_000, 1_000, 50, 50_000);

    c.bench_function("scheduler_drain_50000", |bench| {
        bench.iter(|| DemandScheduler::build(black_box(&catalog.requests)).count())
    });
}

fn bench_affinity_build(c: &mut Criterion) {
    let catalog = synthetic_catalog(100, 1_000, 500, 10);

    c.bench_function("affinity_build_1000x500", |bench| {
        bench.iter(|| {
            catalog
                .endpoints
                .iter()
                .map(|ep| AffinityIndex::build(black_box(ep), AffinityOrder::SlowestFirst))
                .count()
        })
    });
}

fn bench_score(c: &mut Criterion) {
    let mut catalog = synthetic_catalog(5_000, 100, 50, 50_000);
    let outcome = Allocator::default().run(&mut catalog);

    c.bench_function("score_50000", |bench| {
        bench.iter(|| score(black_box(&catalog), black_box(&outcome.allocation)))
    });
}

criterion_group!(
    benches,
    bench_allocator,
    bench_scheduler_drain,
    bench_affinity_build,
    bench_score,
);
criterion_main!(benches);
