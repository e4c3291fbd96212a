//! Placement Walkthrough Example
//!
//! Builds a small workload in code, allocates it with both cache scan
//! orders, and prints the resulting submissions and scores.
//!
//! ```bash
//! cargo run --example zoo_walkthrough
//! ```

use cdn_placement::prelude::*;

fn workload() -> Catalog {
    let sizes = [50, 50, 80, 30, 110, 20];

    let endpoints = vec![
        Endpoint::new(
            0,
            1000,
            vec![
                CacheLink { cache: 0, latency: 100 },
                CacheLink { cache: 2, latency: 200 },
                CacheLink { cache: 1, latency: 300 },
            ],
        ),
        Endpoint::new(1, 500, vec![]),
        Endpoint::new(
            2,
            800,
            vec![
                CacheLink { cache: 1, latency: 50 },
                CacheLink { cache: 2, latency: 400 },
            ],
        ),
    ];

    let requests = vec![
        Request::new(0, 3, sizes[3], 1500),
        Request::new(1, 0, sizes[0], 1000),
        Request::new(0, 4, sizes[4], 500),
        Request::new(0, 1, sizes[1], 1000),
        Request::new(2, 5, sizes[5], 2500),
        Request::new(2, 3, sizes[3], 300),
    ];

    Catalog::new(&sizes, 3, 100, endpoints, requests)
}

fn main() {
    println!("=== Demand-Ordered Placement Demo ===\n");

    let catalog = workload();
    println!(
        "{} videos, {} caches (capacity {}), {} endpoints, {} requests\n",
        catalog.videos.len(),
        catalog.caches.len(),
        catalog.cache_capacity(),
        catalog.endpoints.len(),
        catalog.requests.len()
    );

    // --- Scheduling order ---
    println!("Scheduling order (endpoint, request, demand):");
    for pick in DemandScheduler::build(&catalog.requests) {
        println!(
            "  endpoint {} -> request {:>2} ({:>4})",
            pick.endpoint, pick.request, pick.demand
        );
    }

    // --- Both scan orders ---
    for order in [AffinityOrder::SlowestFirst, AffinityOrder::FastestFirst] {
        println!("\n=== {:?} ===\n", order);

        let config = PlannerConfig {
            affinity_order: order,
            ..Default::default()
        };
        let mut catalog = workload();
        let plan = Planner::new(config).run(&mut catalog);

        print!("{}", render_submission(&plan.outcome.allocation));
        println!("\nScore:       {:.2}", plan.report.score);
        println!("Hit rate:    {:.1}%", plan.report.hit_rate() * 100.0);
        println!("Unservable:  {}", plan.outcome.unservable);
        for cache in &catalog.caches {
            println!("  cache {} used {:>3} / {}", cache.id, cache.used(), cache.capacity);
        }
    }
}
