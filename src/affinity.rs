//! Affinity Index: which caches an endpoint tries, and in what order
//!
//! Each endpoint's reachable caches are ranked once at load time. The
//! allocator walks that ranking and takes the first cache that still has
//! room for the video.
//!
//! The default ranking is **slowest first**: descending latency, with the
//! fastest reachable cache tried last. Scores of existing submissions depend
//! on that direction, so it stays the default; [`AffinityOrder::FastestFirst`]
//! exists for experiments and changes results.
//!
//! ```text
//! links:        c0=300ms  c1=100ms  c2=200ms
//! SlowestFirst: c0 -> c2 -> c1
//! FastestFirst: c1 -> c2 -> c0
//! ```

use serde::Deserialize;

use crate::catalog::{Cache, CacheId, CacheLink, Endpoint, EndpointId};

/// Direction in which an endpoint's caches are scanned
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffinityOrder {
    /// Descending latency (default)
    #[default]
    SlowestFirst,
    /// Ascending latency
    FastestFirst,
}

/// Ranked cache candidates for a single endpoint
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AffinityIndex {
    endpoint: EndpointId,
    ranked: Vec<CacheLink>,
}

impl AffinityIndex {
    /// Rank an endpoint's links.
    ///
    /// The sort is stable: links with equal latency keep their input order.
    pub fn build(endpoint: &Endpoint, order: AffinityOrder) -> Self {
        let mut ranked = endpoint.links().to_vec();
        match order {
            AffinityOrder::SlowestFirst => ranked.sort_by(|a, b| b.latency.cmp(&a.latency)),
            AffinityOrder::FastestFirst => ranked.sort_by(|a, b| a.latency.cmp(&b.latency)),
        }

        Self {
            endpoint: endpoint.id,
            ranked,
        }
    }

    #[inline]
    pub fn endpoint(&self) -> EndpointId {
        self.endpoint
    }

    /// Candidates in scan order
    #[inline]
    pub fn candidates(&self) -> &[CacheLink] {
        &self.ranked
    }

    /// First cache in scan order that can still hold `size`
    #[inline]
    pub fn first_fit(&self, caches: &[Cache], size: u64) -> Option<CacheId> {
        self.ranked
            .iter()
            .map(|link| link.cache)
            .find(|&id| caches[id].can_hold(size))
    }
}

/// Affinity indexes for every endpoint, indexed by endpoint id
#[derive(Clone, Debug, Default)]
pub struct AffinityTable {
    indexes: Vec<AffinityIndex>,
}

impl AffinityTable {
    /// Build one index per endpoint
    pub fn build(endpoints: &[Endpoint], order: AffinityOrder) -> Self {
        Self {
            indexes: endpoints
                .iter()
                .map(|ep| AffinityIndex::build(ep, order))
                .collect(),
        }
    }

    #[inline]
    pub fn get(&self, endpoint: EndpointId) -> Option<&AffinityIndex> {
        self.indexes.get(endpoint)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> Endpoint {
        Endpoint::new(
            0,
            1000,
            vec![
                CacheLink { cache: 0, latency: 300 },
                CacheLink { cache: 1, latency: 100 },
                CacheLink { cache: 2, latency: 200 },
            ],
        )
    }

    fn ids(index: &AffinityIndex) -> Vec<CacheId> {
        index.candidates().iter().map(|l| l.cache).collect()
    }

    #[test]
    fn test_slowest_first_is_default() {
        let index = AffinityIndex::build(&endpoint(), AffinityOrder::default());
        assert_eq!(ids(&index), vec![0, 2, 1]);
    }

    #[test]
    fn test_fastest_first() {
        let index = AffinityIndex::build(&endpoint(), AffinityOrder::FastestFirst);
        assert_eq!(ids(&index), vec![1, 2, 0]);
    }

    #[test]
    fn test_equal_latency_keeps_input_order() {
        let ep = Endpoint::new(
            0,
            500,
            vec![
                CacheLink { cache: 4, latency: 50 },
                CacheLink { cache: 1, latency: 80 },
                CacheLink { cache: 3, latency: 50 },
                CacheLink { cache: 0, latency: 80 },
            ],
        );
        let slow = AffinityIndex::build(&ep, AffinityOrder::SlowestFirst);
        assert_eq!(ids(&slow), vec![1, 0, 4, 3]);

        let fast = AffinityIndex::build(&ep, AffinityOrder::FastestFirst);
        assert_eq!(ids(&fast), vec![4, 3, 1, 0]);
    }

    #[test]
    fn test_first_fit_skips_full_caches() {
        let index = AffinityIndex::build(&endpoint(), AffinityOrder::SlowestFirst);
        let mut caches: Vec<Cache> = (0..3).map(|id| Cache::new(id, 100)).collect();

        assert_eq!(index.first_fit(&caches, 40), Some(0));

        caches[0].charge(70);
        assert_eq!(index.first_fit(&caches, 40), Some(2));

        // Exactly filling a cache is refused
        assert_eq!(index.first_fit(&caches, 100), None);
    }

    #[test]
    fn test_datacenter_only_endpoint() {
        let ep = Endpoint::new(7, 100, vec![]);
        let index = AffinityIndex::build(&ep, AffinityOrder::SlowestFirst);
        assert_eq!(index.endpoint(), 7);
        assert!(index.candidates().is_empty());
        assert_eq!(index.first_fit(&[], 1), None);
    }

    #[test]
    fn test_table_lookup() {
        let endpoints = [endpoint(), Endpoint::new(1, 50, vec![])];
        let table = AffinityTable::build(&endpoints, AffinityOrder::SlowestFirst);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1).map(|i| i.endpoint()), Some(1));
        assert!(table.get(2).is_none());
    }
}
