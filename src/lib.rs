//! CDN Placement: Offline Latency-Optimized Video Placement for Edge Caches
//!
//! Given a fleet of capacity-limited edge caches, a set of endpoints with
//! known latencies to the datacenter and to the caches they reach, and a
//! known workload of video requests, this crate computes one static
//! assignment of videos to caches and scores it by the average latency it
//! saves compared to always fetching from the datacenter.
//!
//! # Design Philosophy
//!
//! > "Serve the loudest endpoint first."
//!
//! The whole workload is known up front, so the allocator is a single greedy
//! pass driven by demand: the endpoint with the most unresolved requests is
//! served first, and each of its requests is placed on the first reachable
//! cache that still has room.
//!
//! # Core Components
//!
//! ## Affinity Index
//!
//! Per endpoint, the reachable caches ranked by latency. The default
//! ranking scans the **slowest** cache first:
//!
//! ```text
//! links:  c0=100ms  c1=300ms  c2=200ms   ->   scan c1, c2, c0
//! ```
//!
//! ## Demand Scheduler
//!
//! Requests clustered by endpoint inside a max-heap keyed by remaining
//! demand:
//!
//! ```text
//! next = heaviest cluster -> heaviest unresolved request in it
//! ```
//!
//! ## Allocator
//!
//! Drains the scheduler, placing each video on the first cache where
//! `remaining_capacity - size > 0`. A video already on that cache is a
//! no-op; a request with no room anywhere is recorded as unservable.
//!
//! ## Scorer
//!
//! ```text
//! score = Σ (dc_latency - cache_latency) * count / Σ count * 1000
//! ```
//!
//! # Example
//!
//! ```rust
//! use cdn_placement::prelude::*;
//!
//! let input = "\
//! 1 1 1 1 15
//! 10
//! 100 1
//! 0 10
//! 0 0 5
//! ";
//! let mut catalog = parse_dataset(input).unwrap();
//!
//! let outcome = Allocator::default().run(&mut catalog);
//! assert_eq!(outcome.allocation.videos(0), &[0]);
//!
//! let report = score(&catalog, &outcome.allocation);
//! assert_eq!(report.score, 90_000.0);
//!
//! assert_eq!(render_submission(&outcome.allocation), "1\n0 0\n");
//! ```
//!
//! # Performance Characteristics
//!
//! | Operation | Complexity | Notes |
//! |-----------|------------|-------|
//! | Affinity build | O(K log K) per endpoint | K = reachable caches |
//! | Scheduler build | O(R log R) | R = requests |
//! | Scheduler pick | O(log E) | E = endpoints with demand |
//! | Allocation step | O(K) | first-fit scan |
//! | Scoring | O(R · K) | |

pub mod affinity;
pub mod allocator;
pub mod catalog;
pub mod config;
pub mod dataset;
pub mod error;
pub mod planner;
pub mod scheduler;
pub mod scorer;
pub mod submission;

// Re-export main types
pub use affinity::{AffinityIndex, AffinityOrder, AffinityTable};
pub use allocator::{Allocation, AllocationOutcome, Allocator, CachePlacement, Decision};
pub use catalog::{
    Cache, CacheId, CacheLink, Catalog, Endpoint, EndpointId, Latency, Request, RequestId, Video,
    VideoId,
};
pub use config::PlannerConfig;
pub use dataset::{load_dataset, parse_dataset, MAX_TOTAL_REQUESTS, MAX_VALUE};
pub use error::{ConfigError, DatasetError, SubmissionError};
pub use planner::{Plan, Planner};
pub use scheduler::{DemandScheduler, Scheduled};
pub use scorer::{score, serving_cache, ScoreReport, SCORE_SCALE};
pub use submission::{
    load_submission, parse_submission, render_submission, save_submission, write_submission,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::affinity::{AffinityIndex, AffinityOrder};
    pub use crate::allocator::{Allocation, AllocationOutcome, Allocator};
    pub use crate::catalog::{CacheLink, Catalog, Endpoint, Request};
    pub use crate::config::PlannerConfig;
    pub use crate::dataset::parse_dataset;
    pub use crate::planner::Planner;
    pub use crate::scheduler::DemandScheduler;
    pub use crate::scorer::{score, ScoreReport};
    pub use crate::submission::{parse_submission, render_submission};
}
