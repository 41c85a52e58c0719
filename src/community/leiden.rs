//! Leiden entry point.
//!
//! Runs the same local-moving and aggregation skeleton as [`Louvain`](super::Louvain)
//! and is usually paired with [`Cpm`](super::Cpm), which has no resolution limit.
//! There is no refinement phase: groups are not checked or split for internal
//! connectivity before aggregation, so results match Louvain's for the same model and
//! configuration.
//!
//! ## References
//!
//! Traag, Waltman, van Eck (2019). "From Louvain to Leiden: guaranteeing
//! well-connected communities." Scientific Reports 9, 5233.

use super::config::{OptimizerConfig, ResolutionMode, Selector};
use super::optimizer::LocalMoving;
use super::traits::{CommunityDetection, Quality};
use crate::error::Result;
use crate::partition::Partition;

/// Leiden community detection algorithm.
#[derive(Debug, Clone, Default)]
pub struct Leiden {
    engine: LocalMoving,
}

impl Leiden {
    /// Create a new Leiden detector.
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

impl CommunityDetection for Leiden {
    fn detect<Q: Quality>(&self, model: &Q, initial: &Partition) -> Result<Partition> {
        self.engine.optimize(model, initial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::community::{Cpm, Louvain, Modularity};
    use crate::graph::ConcurrenceGraph;

    fn two_cliques() -> ConcurrenceGraph {
        ConcurrenceGraph::from_edges(
            8,
            [
                (0, 1, 3),
                (0, 2, 3),
                (0, 3, 3),
                (1, 2, 3),
                (1, 3, 3),
                (2, 3, 3),
                (4, 5, 3),
                (4, 6, 3),
                (4, 7, 3),
                (5, 6, 3),
                (5, 7, 3),
                (6, 7, 3),
                (3, 4, 1),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_leiden_two_cliques_cpm() {
        let p = Leiden::new()
            .detect_from_singletons(&Cpm::new(two_cliques(), 1.0))
            .unwrap();
        assert_eq!(
            p.canonical(),
            Partition::from_groups([vec![0, 1, 2, 3], vec![4, 5, 6, 7]])
        );
    }

    #[test]
    fn test_leiden_resolution_parameter() {
        // r = 0 makes every merge free for CPM: one group.
        let low = Leiden::new()
            .detect_from_singletons(&Cpm::new(two_cliques(), 0.0))
            .unwrap();
        assert_eq!(low.len(), 1);

        // Above every weight nothing merges.
        let high = Leiden::new()
            .detect_from_singletons(&Cpm::new(two_cliques(), 10.0))
            .unwrap();
        assert_eq!(high.len(), 8);
    }

    #[test]
    fn test_leiden_matches_louvain() {
        let model = Modularity::new(two_cliques());
        let config = OptimizerConfig::from_options(["priority selector", "single resolution"]);
        let a = Leiden::with_config(config)
            .detect_from_singletons(&model)
            .unwrap();
        let b = Louvain::with_config(config)
            .detect_from_singletons(&model)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_leiden_keeps_initial_grouping_when_optimal() {
        let initial: Partition = Partition::from_groups([vec![0, 1, 2, 3]]);
        let p = Leiden::new()
            .with_resolution_mode(ResolutionMode::Single)
            .detect(&Cpm::new(two_cliques(), 1.0), &initial)
            .unwrap();
        assert!(p.iter().any(|g| g.len() == 4 && g.contains(&0) && g.contains(&3)));
    }
}
