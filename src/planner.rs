//! One planning run: configure, allocate, score.

use std::time::{Duration, Instant};

use tracing::info;

use crate::allocator::{AllocationOutcome, Allocator};
use crate::catalog::Catalog;
use crate::config::PlannerConfig;
use crate::scorer::{score, ScoreReport};

/// Everything a run produced
#[derive(Clone, Debug)]
pub struct Plan {
    pub outcome: AllocationOutcome,
    pub report: ScoreReport,
    /// Wall time spent allocating and scoring
    pub elapsed: Duration,
}

/// Runs the allocator and scorer over a catalog
#[derive(Clone, Debug, Default)]
pub struct Planner {
    config: PlannerConfig,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Allocate every request of `catalog` and score the result.
    ///
    /// `catalog` is consumed in the sense that its caches and requests are
    /// left in their post-allocation state.
    pub fn run(&self, catalog: &mut Catalog) -> Plan {
        let started = Instant::now();

        self.config.apply(catalog);
        let outcome = Allocator::from_config(&self.config).run(catalog);
        let report = score(catalog, &outcome.allocation);
        let elapsed = started.elapsed();

        info!(
            score = report.score,
            hit_rate = report.hit_rate(),
            unservable = outcome.unservable,
            elapsed_ms = elapsed.as_millis() as u64,
            "plan complete"
        );

        Plan {
            outcome,
            report,
            elapsed,
        }
    }
}
