//! Catalog: the immutable workload the planner runs against
//!
//! Videos, caches, endpoints and requests live in flat arenas indexed by
//! their integer ids. Nothing here decides anything; the only mutable state
//! is a cache's remaining capacity and a request's remaining count, and both
//! are only touched by the [`Allocator`](crate::allocator::Allocator).
//!
//! ```text
//! Endpoint ──(latency_to_datacenter)──> Datacenter
//!    │
//!    ├──(latency)──> Cache 0
//!    └──(latency)──> Cache 2
//! ```

/// Video identifier (index into [`Catalog::videos`])
pub type VideoId = usize;

/// Cache identifier (index into [`Catalog::caches`])
pub type CacheId = usize;

/// Endpoint identifier (index into [`Catalog::endpoints`])
pub type EndpointId = usize;

/// Request identifier (index into [`Catalog::requests`])
pub type RequestId = usize;

/// Latency in milliseconds
pub type Latency = u64;

/// A video and its size
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Video {
    pub id: VideoId,
    /// Size in dataset units (MB in the contest datasets)
    pub size: u64,
}

/// An edge cache with a uniform configured capacity
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cache {
    pub id: CacheId,
    /// Capacity the cache started with
    pub capacity: u64,
    /// Capacity not yet consumed by placements
    remaining: u64,
}

impl Cache {
    /// Create an empty cache
    pub fn new(id: CacheId, capacity: u64) -> Self {
        Self {
            id,
            capacity,
            remaining: capacity,
        }
    }

    /// Capacity left for further placements
    #[inline]
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Capacity already consumed
    #[inline]
    pub fn used(&self) -> u64 {
        self.capacity - self.remaining
    }

    /// Whether a video of `size` still fits.
    ///
    /// Strict: a placement that would leave exactly zero capacity is refused.
    #[inline]
    pub fn can_hold(&self, size: u64) -> bool {
        self.remaining > size
    }

    /// Charge `size` against the remaining capacity.
    ///
    /// Callers must check [`Cache::can_hold`] first.
    #[inline]
    pub(crate) fn charge(&mut self, size: u64) {
        debug_assert!(self.can_hold(size), "cache {} overcommitted", self.id);
        self.remaining -= size;
    }
}

/// A link from an endpoint to a cache it can reach
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheLink {
    pub cache: CacheId,
    pub latency: Latency,
}

/// A client access point
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub id: EndpointId,
    pub latency_to_datacenter: Latency,
    /// Reachable caches in input order
    links: Vec<CacheLink>,
}

impl Endpoint {
    /// Create an endpoint. `links` keep their given order.
    pub fn new(id: EndpointId, latency_to_datacenter: Latency, links: Vec<CacheLink>) -> Self {
        Self {
            id,
            latency_to_datacenter,
            links,
        }
    }

    /// Reachable caches in input order
    #[inline]
    pub fn links(&self) -> &[CacheLink] {
        &self.links
    }

    /// Latency from this endpoint to `cache`, if reachable
    pub fn latency_to(&self, cache: CacheId) -> Option<Latency> {
        self.links
            .iter()
            .find(|link| link.cache == cache)
            .map(|link| link.latency)
    }

    /// Whether this endpoint can only be served by the datacenter
    #[inline]
    pub fn is_datacenter_only(&self) -> bool {
        self.links.is_empty()
    }
}

/// A batch of identical reads for one video from one endpoint
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub endpoint: EndpointId,
    pub video: VideoId,
    /// Denormalized from [`Video::size`]
    pub video_size: u64,
    /// Number of client requests this record represents
    pub count: u64,
    remaining: u64,
}

impl Request {
    /// Create an unresolved request
    pub fn new(endpoint: EndpointId, video: VideoId, video_size: u64, count: u64) -> Self {
        Self {
            endpoint,
            video,
            video_size,
            count,
            remaining: count,
        }
    }

    /// Demand not yet resolved (either `count` or 0)
    #[inline]
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.remaining == 0
    }

    /// Zero the remaining demand, returning how much was released.
    ///
    /// Resolution is one-shot: a second call releases nothing.
    #[inline]
    pub(crate) fn resolve(&mut self) -> u64 {
        core::mem::take(&mut self.remaining)
    }
}

/// The full workload: all entities of one dataset
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    pub videos: Vec<Video>,
    pub caches: Vec<Cache>,
    pub endpoints: Vec<Endpoint>,
    pub requests: Vec<Request>,
}

impl Catalog {
    /// Assemble a catalog with `cache_count` caches of uniform `capacity`.
    ///
    /// Ids are positions: `video_sizes[i]` becomes video `i`, and so on.
    pub fn new(
        video_sizes: &[u64],
        cache_count: usize,
        capacity: u64,
        endpoints: Vec<Endpoint>,
        requests: Vec<Request>,
    ) -> Self {
        let videos = video_sizes
            .iter()
            .enumerate()
            .map(|(id, &size)| Video { id, size })
            .collect();
        let caches = (0..cache_count).map(|id| Cache::new(id, capacity)).collect();

        Self {
            videos,
            caches,
            endpoints,
            requests,
        }
    }

    #[inline]
    pub fn video(&self, id: VideoId) -> Option<&Video> {
        self.videos.get(id)
    }

    #[inline]
    pub fn cache(&self, id: CacheId) -> Option<&Cache> {
        self.caches.get(id)
    }

    #[inline]
    pub fn endpoint(&self, id: EndpointId) -> Option<&Endpoint> {
        self.endpoints.get(id)
    }

    /// Uniform capacity shared by every cache (0 for a catalog without caches)
    pub fn cache_capacity(&self) -> u64 {
        self.caches.first().map_or(0, |c| c.capacity)
    }

    /// Replace the uniform capacity, resetting every cache to empty
    pub fn set_cache_capacity(&mut self, capacity: u64) {
        for cache in &mut self.caches {
            *cache = Cache::new(cache.id, capacity);
        }
    }

    /// Sum of original request counts
    pub fn total_requests(&self) -> u64 {
        self.requests.iter().map(|r| r.count).sum()
    }

    /// Sum of remaining demand over all requests
    pub fn remaining_demand(&self) -> u64 {
        self.requests.iter().map(|r| r.remaining()).sum()
    }
}
