//! Multi-resolution local moving, the engine behind [`Louvain`](super::Louvain) and
//! [`Leiden`](super::Leiden).
//!
//! 1. **Local moving**: starting from the completed initial partition, move nodes to the
//!    group with the best strictly positive quality gain until no move improves quality.
//! 2. **Compaction**: drop groups emptied by the moves.
//! 3. **Aggregation** (multiple resolution only): collapse each group to a super-node,
//!    optimize the aggregated model from singletons, and expand the result if it merged
//!    anything.
//!
//! Every accepted move raises quality by more than [`MIN_GAIN`] and every recursion runs
//! on strictly fewer nodes, so the optimizer terminates.

use super::config::{OptimizerConfig, ResolutionMode, Selector};
use super::traits::{GroupTotals, Quality};
use crate::error::{Error, Result};
use crate::graph::{ConcurrenceGraph, Weight};
use crate::partition::Partition;
use rand::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Smallest gain that counts as an improvement.
pub const MIN_GAIN: f64 = 1e-10;

/// Shared local-moving optimizer.
#[derive(Debug, Clone, Default)]
pub struct LocalMoving {
    config: OptimizerConfig,
    /// Random seed for shuffled sweeps.
    seed: Option<u64>,
}

impl LocalMoving {
    /// Optimizer with the given configuration.
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config, seed: None }
    }

    /// Set the selector.
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.config.selector = selector;
        self
    }

    /// Set the resolution mode.
    pub fn with_resolution_mode(mut self, mode: ResolutionMode) -> Self {
        self.config.resolution_mode = mode;
        self
    }

    /// Enable or disable shuffled sweeps.
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.config.shuffle = shuffle;
        self
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Optimize `model` from `initial`.
    pub fn optimize<Q: Quality>(&self, model: &Q, initial: &Partition) -> Result<Partition> {
        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };
        self.optimize_with_rng(model, initial, &mut rng)
    }

    /// Optimize `model` from `initial`, drawing shuffles from `rng`.
    pub fn optimize_with_rng<Q, R>(
        &self,
        model: &Q,
        initial: &Partition,
        rng: &mut R,
    ) -> Result<Partition>
    where
        Q: Quality,
        R: Rng + ?Sized,
    {
        let r = model.resolution();
        if !r.is_finite() || r < 0.0 {
            return Err(Error::InvalidParameter {
                name: "resolution",
                message: "must be finite and non-negative",
            });
        }
        self.optimize_level(model, initial, rng, 0)
    }

    fn optimize_level<Q, R>(
        &self,
        model: &Q,
        initial: &Partition,
        rng: &mut R,
        level: usize,
    ) -> Result<Partition>
    where
        Q: Quality,
        R: Rng + ?Sized,
    {
        let start = model.complete_partition(initial)?;
        let mut state = MoveState::new(model.graph(), start);
        let moves = match self.config.selector {
            Selector::Sequential => state.run_sequential(model, self.config.shuffle, rng),
            Selector::Priority => state.run_priority(model, self.config.shuffle, rng),
        };
        let mut partition = state.into_partition();
        log::debug!(
            "level {level}: {} nodes, {moves} moves, {} groups",
            model.node_count(),
            partition.len()
        );

        if self.config.resolution_mode == ResolutionMode::Multiple
            && partition.len() < model.node_count()
        {
            let aggregated = model.aggregate(&partition)?;
            let coarse = self.optimize_level(&aggregated, &Partition::new(), rng, level + 1)?;
            if coarse.len() < aggregated.node_count() {
                partition = coarse.flatten(&partition)?;
            }
        }
        Ok(partition)
    }
}

/// Groups plus the per-group totals needed for O(deg) gain evaluation.
#[derive(Debug, Clone)]
pub(crate) struct MoveState {
    groups: Vec<BTreeSet<usize>>,
    group_of: Vec<usize>,
    strength: Vec<Weight>,
    size: Vec<usize>,
}

impl MoveState {
    /// `partition` must be complete over `graph`.
    pub(crate) fn new(graph: &ConcurrenceGraph, partition: Partition) -> Self {
        let groups = partition.into_groups();
        let mut group_of = vec![0; graph.node_count()];
        let mut strength = vec![0; groups.len()];
        let mut size = vec![0; groups.len()];
        for (g, members) in groups.iter().enumerate() {
            for &u in members {
                group_of[u] = g;
                strength[g] += graph.strength(u);
                size[g] += graph.node_size(u);
            }
        }
        Self {
            groups,
            group_of,
            strength,
            size,
        }
    }

    #[cfg(test)]
    pub(crate) fn partition(&self) -> Partition {
        self.groups.iter().cloned().collect()
    }

    fn into_partition(self) -> Partition {
        let mut p: Partition = self.groups.into_iter().collect();
        p.compact();
        p
    }

    /// Weight from `node` into each group it touches.
    fn link_weights(&self, graph: &ConcurrenceGraph, node: usize) -> BTreeMap<usize, Weight> {
        let mut links = BTreeMap::new();
        for (&v, &w) in graph.neighbors(node) {
            *links.entry(self.group_of[v]).or_insert(0) += w;
        }
        links
    }

    fn totals(
        &self,
        graph: &ConcurrenceGraph,
        node: usize,
        group: usize,
        links: &BTreeMap<usize, Weight>,
    ) -> GroupTotals {
        let (own_strength, own_size) = if self.group_of[node] == group {
            (graph.strength(node), graph.node_size(node))
        } else {
            (0, 0)
        };
        GroupTotals {
            link_weight: links.get(&group).copied().unwrap_or(0) as f64,
            strength: (self.strength[group] - own_strength) as f64,
            size: (self.size[group] - own_size) as f64,
        }
    }

    /// Best strictly improving target group for `node`, if any.
    fn best_move<Q: Quality>(&self, model: &Q, node: usize) -> Option<(usize, f64)> {
        let graph = model.graph();
        let from = self.group_of[node];
        let links = self.link_weights(graph, node);
        let from_totals = self.totals(graph, node, from, &links);

        let mut best_group = from;
        let mut best_gain = 0.0;
        for to in 0..self.groups.len() {
            if to == from {
                continue;
            }
            let gain = model.move_gain(node, &from_totals, &self.totals(graph, node, to, &links));
            if gain > best_gain {
                best_gain = gain;
                best_group = to;
            }
        }
        (best_group != from && best_gain > MIN_GAIN).then_some((best_group, best_gain))
    }

    fn apply_move(&mut self, graph: &ConcurrenceGraph, node: usize, to: usize) {
        let from = self.group_of[node];
        let _ = self.groups[from].remove(&node);
        let _ = self.groups[to].insert(node);
        self.group_of[node] = to;
        self.strength[from] -= graph.strength(node);
        self.strength[to] += graph.strength(node);
        self.size[from] -= graph.node_size(node);
        self.size[to] += graph.node_size(node);
    }

    /// One sequential pass over `order`; returns the number of moves.
    pub(crate) fn sweep<Q: Quality>(&mut self, model: &Q, order: &[usize]) -> usize {
        let mut moved = 0;
        for &node in order {
            if let Some((to, _)) = self.best_move(model, node) {
                self.apply_move(model.graph(), node, to);
                moved += 1;
            }
        }
        moved
    }

    fn run_sequential<Q, R>(&mut self, model: &Q, shuffle: bool, rng: &mut R) -> usize
    where
        Q: Quality,
        R: Rng + ?Sized,
    {
        let mut order: Vec<usize> = (0..self.group_of.len()).collect();
        let mut total = 0;
        for sweep in 1.. {
            if shuffle {
                order.shuffle(rng);
            }
            let moved = self.sweep(model, &order);
            log::trace!("sweep {sweep}: {moved} moves");
            if moved == 0 {
                break;
            }
            total += moved;
        }
        total
    }

    fn run_priority<Q, R>(&mut self, model: &Q, shuffle: bool, rng: &mut R) -> usize
    where
        Q: Quality,
        R: Rng + ?Sized,
    {
        let mut order: Vec<usize> = (0..self.group_of.len()).collect();
        let mut total = 0;
        loop {
            if shuffle {
                order.shuffle(rng);
            }
            let mut best: Option<(usize, usize, f64)> = None;
            for &node in &order {
                if let Some((to, gain)) = self.best_move(model, node) {
                    if best.map_or(true, |(_, _, g)| gain > g) {
                        best = Some((node, to, gain));
                    }
                }
            }
            let Some((node, to, gain)) = best else { break };
            log::trace!("priority move: node {node} -> group {to} (gain {gain})");
            self.apply_move(model.graph(), node, to);
            total += 1;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::community::quality::{Cpm, Modularity};

    fn ring_of_cliques() -> ConcurrenceGraph {
        // Four 4-cliques joined in a ring by single light edges.
        let mut edges = Vec::new();
        for c in 0..4 {
            let base = c * 4;
            for i in 0..4 {
                for j in i + 1..4 {
                    edges.push((base + i, base + j, 5));
                }
            }
            edges.push((base + 3, (base + 4) % 16, 1));
        }
        ConcurrenceGraph::from_edges(16, edges).unwrap()
    }

    fn expected_cliques() -> Partition {
        Partition::from_groups((0..4).map(|c| (c * 4)..(c * 4 + 4)))
    }

    #[test]
    fn test_sweeps_never_decrease_quality() {
        let model = Modularity::new(ring_of_cliques());
        let mut state = MoveState::new(model.graph(), Partition::singletons(16));
        let order: Vec<usize> = (0..16).collect();
        let mut q = model.quality(&state.partition());
        loop {
            let moved = state.sweep(&model, &order);
            let next = model.quality(&state.partition());
            assert!(next >= q - 1e-12);
            q = next;
            if moved == 0 {
                break;
            }
        }
        assert!(q > 0.0);
    }

    #[test]
    fn test_sequential_finds_cliques() {
        let model = Modularity::new(ring_of_cliques());
        let p = LocalMoving::default()
            .optimize(&model, &Partition::new())
            .unwrap();
        assert_eq!(p.canonical(), expected_cliques().canonical());
    }

    #[test]
    fn test_priority_finds_cliques() {
        let model = Modularity::new(ring_of_cliques());
        let p = LocalMoving::default()
            .with_selector(Selector::Priority)
            .optimize(&model, &Partition::new())
            .unwrap();
        assert_eq!(p.canonical(), expected_cliques().canonical());
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let model = Cpm::new(ring_of_cliques(), 0.5);
        let opt = LocalMoving::default().with_shuffle(true).with_seed(7);
        let a = opt.optimize(&model, &Partition::new()).unwrap();
        let b = opt.optimize(&model, &Partition::new()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_initial_partition_is_completed() {
        let model = Modularity::new(ring_of_cliques());
        let initial: Partition = Partition::from_groups([vec![0, 1]]);
        let p = LocalMoving::default()
            .with_resolution_mode(ResolutionMode::Single)
            .optimize(&model, &initial)
            .unwrap();
        assert_eq!(p.member_count(), 16);
        assert!(p.validate(16).is_ok());
        assert!(p.iter().all(|g| !g.is_empty()));
    }

    #[test]
    fn test_no_edges_stays_singletons() {
        let g = ConcurrenceGraph::from_edges(4, Vec::new()).unwrap();
        let model = Modularity::new(g);
        let p = LocalMoving::default()
            .optimize(&model, &Partition::new())
            .unwrap();
        assert_eq!(p, Partition::singletons(4));
    }

    #[test]
    fn test_rejects_negative_resolution() {
        let model = Cpm::new(ring_of_cliques(), -1.0);
        assert!(matches!(
            LocalMoving::default().optimize(&model, &Partition::new()),
            Err(Error::InvalidParameter { name: "resolution", .. })
        ));
    }

    #[test]
    fn test_rejects_duplicate_initial_assignment() {
        let model = Modularity::new(ring_of_cliques());
        let initial: Partition = Partition::from_groups([vec![0, 1], vec![1, 2]]);
        assert_eq!(
            LocalMoving::default().optimize(&model, &initial),
            Err(Error::DuplicateAssignment { node: 1 })
        );
    }
}
