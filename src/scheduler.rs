//! Demand Scheduler: which request the allocator handles next
//!
//! Requests are grouped into clusters by endpoint. The next eligible request
//! always comes from the cluster with the most unresolved demand, and within
//! that cluster it is the request with the most unresolved demand.
//!
//! Instead of re-sorting every cluster on every pick, clusters sit in a
//! max-heap keyed by their remaining demand. Only the cluster that was just
//! served changes, so each pick is O(log E) with no stale heap entries.
//!
//! Tie-breaks, in order:
//! - equal cluster demand: lowest endpoint id first
//! - equal request demand inside a cluster: input order
//!
//! A request's demand is released in full the moment it is scheduled,
//! because the allocator resolves every request it is handed in one step.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use crate::catalog::{EndpointId, Request, RequestId};

/// A request handed to the allocator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scheduled {
    pub request: RequestId,
    pub endpoint: EndpointId,
    /// Demand released from the scheduler by this pick
    pub demand: u64,
}

/// All unresolved requests of one endpoint
#[derive(Clone, Debug)]
struct Cluster {
    endpoint: EndpointId,
    /// (request, demand), demand descending, input order on ties
    queue: Vec<(RequestId, u64)>,
    cursor: usize,
    remaining: u64,
}

/// Heap key; derived ordering compares `remaining` first, then prefers the
/// lower endpoint id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct ClusterKey {
    remaining: u64,
    endpoint: Reverse<EndpointId>,
    slot: usize,
}

/// Priority queue over endpoint clusters
#[derive(Clone, Debug, Default)]
pub struct DemandScheduler {
    clusters: Vec<Cluster>,
    heap: BinaryHeap<ClusterKey>,
    remaining: u64,
}

impl DemandScheduler {
    /// Group unresolved requests by endpoint and rank them.
    pub fn build(requests: &[Request]) -> Self {
        let mut grouped: BTreeMap<EndpointId, Vec<(RequestId, u64)>> = BTreeMap::new();
        for (id, request) in requests.iter().enumerate() {
            if !request.is_resolved() {
                grouped
                    .entry(request.endpoint)
                    .or_default()
                    .push((id, request.remaining()));
            }
        }

        let mut scheduler = Self::default();
        for (endpoint, mut queue) in grouped {
            // Stable: equal demand keeps ascending request id
            queue.sort_by(|a, b| b.1.cmp(&a.1));
            let remaining = queue.iter().map(|&(_, demand)| demand).sum();

            let slot = scheduler.clusters.len();
            scheduler.heap.push(ClusterKey {
                remaining,
                endpoint: Reverse(endpoint),
                slot,
            });
            scheduler.remaining += remaining;
            scheduler.clusters.push(Cluster {
                endpoint,
                queue,
                cursor: 0,
                remaining,
            });
        }

        scheduler
    }

    /// Request that would be handed out next, without releasing it
    pub fn peek(&self) -> Option<Scheduled> {
        let key = self.heap.peek()?;
        let cluster = &self.clusters[key.slot];
        let (request, demand) = cluster.queue[cluster.cursor];
        Some(Scheduled {
            request,
            endpoint: cluster.endpoint,
            demand,
        })
    }

    /// Release the next eligible request, or `None` once all demand is gone.
    ///
    /// Total remaining demand strictly decreases on every `Some`.
    pub fn pop_next(&mut self) -> Option<Scheduled> {
        let key = self.heap.pop()?;
        let cluster = &mut self.clusters[key.slot];

        let (request, demand) = cluster.queue[cluster.cursor];
        cluster.cursor += 1;
        cluster.remaining -= demand;
        self.remaining -= demand;

        if cluster.remaining > 0 {
            self.heap.push(ClusterKey {
                remaining: cluster.remaining,
                ..key
            });
        }

        Some(Scheduled {
            request,
            endpoint: cluster.endpoint,
            demand,
        })
    }

    /// Demand not yet handed out
    #[inline]
    pub fn remaining_demand(&self) -> u64 {
        self.remaining
    }

    /// Remaining demand of one endpoint's cluster
    pub fn cluster_demand(&self, endpoint: EndpointId) -> u64 {
        self.clusters
            .iter()
            .find(|c| c.endpoint == endpoint)
            .map_or(0, |c| c.remaining)
    }

    /// Clusters that still hold demand
    #[inline]
    pub fn active_clusters(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.heap.is_empty()
    }
}

impl Iterator for DemandScheduler {
    type Item = Scheduled;

    fn next(&mut self) -> Option<Self::Item> {
        self.pop_next()
    }
}
