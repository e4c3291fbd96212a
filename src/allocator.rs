//! Allocator: greedy placement of requested videos onto caches
//!
//! The allocator drains the [`DemandScheduler`] one request at a time. For
//! each request it walks the endpoint's [`AffinityIndex`](crate::affinity::AffinityIndex)
//! and takes the first cache the video still fits into:
//!
//! ```text
//! loop {
//!     r = scheduler.pop_next()            // heaviest cluster, heaviest request
//!     c = affinity[r.endpoint].first_fit  // strict: remaining - size > 0
//!     none            -> unservable
//!     video already c -> duplicate, no charge
//!     otherwise       -> place, charge c
//!     r.remaining = 0
//! }
//! ```
//!
//! Every iteration resolves exactly one request and later iterations see the
//! capacity consumed by earlier ones, so the loop is strictly sequential.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, trace};

use crate::affinity::{AffinityOrder, AffinityTable};
use crate::catalog::{CacheId, Catalog, RequestId, VideoId};
use crate::config::PlannerConfig;
use crate::scheduler::DemandScheduler;

/// Videos placed on one cache, in placement order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachePlacement {
    pub cache: CacheId,
    videos: Vec<VideoId>,
    members: HashSet<VideoId>,
    used: u64,
}

impl CachePlacement {
    fn new(cache: CacheId) -> Self {
        Self {
            cache,
            videos: Vec::new(),
            members: HashSet::new(),
            used: 0,
        }
    }

    /// Placed videos in placement order
    #[inline]
    pub fn videos(&self) -> &[VideoId] {
        &self.videos
    }

    #[inline]
    pub fn contains(&self, video: VideoId) -> bool {
        self.members.contains(&video)
    }

    /// Total size of the placed videos
    #[inline]
    pub fn used(&self) -> u64 {
        self.used
    }
}

/// The result set: cache -> distinct videos placed on it.
///
/// Caches appear in the order they first received a video; a cache with no
/// placements is absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Allocation {
    entries: Vec<CachePlacement>,
    slots: HashMap<CacheId, usize>,
}

impl Allocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `video` on `cache`. Returns `false` if it was already there.
    ///
    /// This only books the placement; capacity is enforced by the allocator.
    pub fn insert(&mut self, cache: CacheId, video: VideoId, size: u64) -> bool {
        let slot = match self.slots.get(&cache) {
            Some(&slot) => slot,
            None => {
                self.entries.push(CachePlacement::new(cache));
                self.slots.insert(cache, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };

        let entry = &mut self.entries[slot];
        if !entry.members.insert(video) {
            return false;
        }
        entry.videos.push(video);
        // Saturates so an oversized submission still reads as over capacity
        entry.used = entry.used.saturating_add(size);
        true
    }

    /// Whether `video` is placed on `cache`
    #[inline]
    pub fn holds(&self, cache: CacheId, video: VideoId) -> bool {
        self.get(cache).is_some_and(|entry| entry.contains(video))
    }

    #[inline]
    pub fn get(&self, cache: CacheId) -> Option<&CachePlacement> {
        self.slots.get(&cache).map(|&slot| &self.entries[slot])
    }

    /// Videos on `cache` in placement order (empty if none)
    pub fn videos(&self, cache: CacheId) -> &[VideoId] {
        self.get(cache).map(|entry| entry.videos()).unwrap_or(&[])
    }

    /// Position of `cache` in iteration order
    #[inline]
    pub fn position(&self, cache: CacheId) -> Option<usize> {
        self.slots.get(&cache).copied()
    }

    /// Caches with at least one placement, in first-placement order
    pub fn iter(&self) -> impl Iterator<Item = &CachePlacement> {
        self.entries.iter()
    }

    /// Number of caches with at least one placement
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of (cache, video) placements
    pub fn placement_count(&self) -> usize {
        self.entries.iter().map(|e| e.videos.len()).sum()
    }
}

/// What the allocator did with one request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Video placed and capacity charged
    Placed { cache: CacheId },
    /// Video already on the chosen cache; nothing charged
    Duplicate { cache: CacheId },
    /// No reachable cache had room
    Unservable,
}

/// Allocation plus run diagnostics
#[derive(Clone, Debug, Default)]
pub struct AllocationOutcome {
    pub allocation: Allocation,
    /// Requests no reachable cache had room for
    pub unservable: usize,
    /// Requests whose video was already on the chosen cache
    pub duplicates: usize,
    /// Requests that caused a placement
    pub placed: usize,
    /// Loop iterations (equals the number of resolved requests)
    pub iterations: usize,
}

/// Greedy, demand-ordered cache allocator
#[derive(Clone, Debug)]
pub struct Allocator {
    order: AffinityOrder,
    progress_every: u64,
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new(AffinityOrder::default())
    }
}

impl Allocator {
    /// Create an allocator scanning caches in `order`
    pub fn new(order: AffinityOrder) -> Self {
        Self {
            order,
            progress_every: 0,
        }
    }

    /// Create an allocator from planner settings
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(config.affinity_order).with_progress_every(config.progress_every)
    }

    /// Emit a progress event every `n` iterations (0 disables)
    pub fn with_progress_every(mut self, n: u64) -> Self {
        self.progress_every = n;
        self
    }

    /// Resolve every request in `catalog`, mutating cache capacities and
    /// request counters.
    pub fn run(&self, catalog: &mut Catalog) -> AllocationOutcome {
        let affinity = AffinityTable::build(&catalog.endpoints, self.order);
        let mut scheduler = DemandScheduler::build(&catalog.requests);
        let total = scheduler.remaining_demand();

        info!(
            requests = catalog.requests.len(),
            clusters = scheduler.active_clusters(),
            caches = catalog.caches.len(),
            demand = total,
            "allocation started"
        );

        let mut outcome = AllocationOutcome::default();
        while let Some(pick) = scheduler.pop_next() {
            let decision = self.step(catalog, &affinity, &mut outcome.allocation, pick.request);
            debug_assert!(catalog.requests[pick.request].is_resolved());

            match decision {
                Decision::Placed { .. } => outcome.placed += 1,
                Decision::Duplicate { .. } => outcome.duplicates += 1,
                Decision::Unservable => {
                    outcome.unservable += 1;
                    debug!(request = pick.request, endpoint = pick.endpoint, "request unservable");
                }
            }
            outcome.iterations += 1;

            if self.progress_every > 0 && outcome.iterations as u64 % self.progress_every == 0 {
                debug!(
                    iterations = outcome.iterations,
                    remaining = scheduler.remaining_demand(),
                    "allocation progress"
                );
            }
        }

        info!(
            iterations = outcome.iterations,
            placed = outcome.placed,
            duplicates = outcome.duplicates,
            unservable = outcome.unservable,
            caches_used = outcome.allocation.len(),
            "allocation finished"
        );

        outcome
    }

    /// Resolve a single request against the current cache state
    fn step(
        &self,
        catalog: &mut Catalog,
        affinity: &AffinityTable,
        allocation: &mut Allocation,
        id: RequestId,
    ) -> Decision {
        let Catalog {
            caches, requests, ..
        } = catalog;
        let request = &mut requests[id];
        let size = request.video_size;

        let chosen = affinity
            .get(request.endpoint)
            .and_then(|index| index.first_fit(&caches[..], size));

        let decision = match chosen {
            None => Decision::Unservable,
            Some(cache) if allocation.holds(cache, request.video) => Decision::Duplicate { cache },
            Some(cache) => {
                allocation.insert(cache, request.video, size);
                caches[cache].charge(size);
                Decision::Placed { cache }
            }
        };

        trace!(request = id, video = request.video, ?decision, "request resolved");
        request.resolve();
        decision
    }
}
