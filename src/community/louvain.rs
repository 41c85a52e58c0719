//! Louvain algorithm for community detection.
//!
//! Greedy local moving followed by aggregation, repeated until the aggregated graph no
//! longer merges.
//!
//! ## The Algorithm (Blondel et al. 2008)
//!
//! 1. **Local Moving**: move each node to the group with the largest positive quality
//!    gain until no node moves.
//! 2. **Aggregation**: groups become super-nodes; edge weights are sums of cross-group
//!    weights. Strength and size are carried along, so the null model of the quality
//!    function is unchanged.
//! 3. **Iterate** on the aggregated graph.
//!
//! Usually paired with [`Modularity`](super::Modularity), but any [`Quality`] works.
//!
//! ## References
//!
//! Blondel et al. (2008). "Fast unfolding of communities in large networks."
//! Journal of Statistical Mechanics: Theory and Experiment, P10008.

use super::config::{OptimizerConfig, ResolutionMode, Selector};
use super::optimizer::LocalMoving;
use super::traits::{CommunityDetection, Quality};
use crate::error::Result;
use crate::partition::Partition;

/// Louvain community detection algorithm.
#[derive(Debug, Clone, Default)]
pub struct Louvain {
    engine: LocalMoving,
}

impl Louvain {
    /// Sequential selector, multiple resolution, no shuffle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a full configuration.
    pub fn with_config(config: OptimizerConfig) -> Self {
        Self {
            engine: LocalMoving::new(config),
        }
    }

    /// Set the move selector.
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.engine = self.engine.with_selector(selector);
        self
    }

    /// Set single or multiple resolution.
    pub fn with_resolution_mode(mut self, mode: ResolutionMode) -> Self {
        self.engine = self.engine.with_resolution_mode(mode);
        self
    }

    /// Shuffle node order on every sweep.
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.engine = self.engine.with_shuffle(shuffle);
        self
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.engine = self.engine.with_seed(seed);
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &OptimizerConfig {
        self.engine.config()
    }
}

impl CommunityDetection for Louvain {
    fn detect<Q: Quality>(&self, model: &Q, initial: &Partition) -> Result<Partition> {
        self.engine.optimize(model, initial)
    }
}
