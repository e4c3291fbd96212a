//! Scorer: average latency saved per request
//!
//! ```text
//! saved(r) = latency_to_datacenter(e) - latency(e, c)   if a cache c reachable
//!                                                        from e holds r.video
//!          = 0                                           otherwise
//!
//! score    = Σ saved(r) * count(r) / Σ count(r) * 1000
//! ```
//!
//! Weights use the original request counts, never the remaining ones, so the
//! scorer gives the same answer before and after the allocator ran. When
//! several reachable caches hold the video, the one that appears first in
//! the [`Allocation`]'s iteration order serves it.

use std::fmt;

use tracing::debug;

use crate::allocator::Allocation;
use crate::catalog::{CacheId, Catalog, Endpoint, Latency, VideoId};

/// Scaling factor applied to the average
pub const SCORE_SCALE: f64 = 1000.0;

/// Score and the totals it was computed from
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScoreReport {
    /// Average latency saved per request, times [`SCORE_SCALE`]
    pub score: f64,
    /// Sum of original request counts
    pub total_requests: u128,
    /// Requests (weighted) served from some cache
    pub cache_hits: u128,
    /// Sum of latency saved, weighted by request count
    pub latency_saved: i128,
}

impl ScoreReport {
    /// Fraction of requests served from a cache
    pub fn hit_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        self.cache_hits as f64 / self.total_requests as f64
    }
}

impl fmt::Display for ScoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "score {:.2} (hit rate {:.1}%, {} of {} requests from caches)",
            self.score,
            self.hit_rate() * 100.0,
            self.cache_hits,
            self.total_requests,
        )
    }
}

/// Cache that serves `video` to `endpoint`, with its latency.
///
/// Among the reachable caches holding the video, the earliest one in
/// allocation order wins.
pub fn serving_cache(
    endpoint: &Endpoint,
    video: VideoId,
    allocation: &Allocation,
) -> Option<(CacheId, Latency)> {
    endpoint
        .links()
        .iter()
        .filter(|link| allocation.holds(link.cache, video))
        .min_by_key(|link| allocation.position(link.cache))
        .map(|link| (link.cache, link.latency))
}

/// Score `allocation` against every request in `catalog`
pub fn score(catalog: &Catalog, allocation: &Allocation) -> ScoreReport {
    let mut report = ScoreReport::default();

    for request in &catalog.requests {
        report.total_requests += u128::from(request.count);

        let Some(endpoint) = catalog.endpoint(request.endpoint) else {
            continue;
        };
        if let Some((_, latency)) = serving_cache(endpoint, request.video, allocation) {
            let saved = i128::from(endpoint.latency_to_datacenter) - i128::from(latency);
            report.latency_saved += saved * i128::from(request.count);
            report.cache_hits += u128::from(request.count);
        }
    }

    if report.total_requests > 0 {
        report.score =
            report.latency_saved as f64 / report.total_requests as f64 * SCORE_SCALE;
    }

    debug!(
        score = report.score,
        hits = report.cache_hits,
        total = report.total_requests,
        "allocation scored"
    );

    report
}
