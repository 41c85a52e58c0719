//! Community detection traits.

use crate::error::{Error, Result};
use crate::graph::ConcurrenceGraph;
use crate::partition::Partition;

/// Aggregate view of one group as seen from a node being moved.
///
/// `link_weight` is the node's weight into the group; the other totals exclude the node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroupTotals {
    /// Sum of `weight(u, j)` over members `j != u`.
    pub link_weight: f64,
    /// Sum of member strengths, `u` excluded.
    pub strength: f64,
    /// Sum of member sizes, `u` excluded.
    pub size: f64,
}

impl GroupTotals {
    /// Gather totals of `group` relative to `node` in O(|group|).
    pub fn gather<'a, I>(graph: &ConcurrenceGraph, node: usize, group: I) -> Self
    where
        I: IntoIterator<Item = &'a usize>,
    {
        let mut totals = Self::default();
        for &j in group {
            if j == node {
                continue;
            }
            totals.link_weight += graph.weight(node, j) as f64;
            totals.strength += graph.strength(j) as f64;
            totals.size += graph.node_size(j) as f64;
        }
        totals
    }
}

/// A quality function over partitions of a concurrence graph.
///
/// Implementations own a graph and a resolution `r`. Aggregation produces a new model of the
/// same kind over the collapsed graph; the original is never mutated.
pub trait Quality: Sized {
    /// The graph being partitioned.
    fn graph(&self) -> &ConcurrenceGraph;

    /// Resolution parameter `r`.
    fn resolution(&self) -> f64;

    /// Number of nodes of the underlying graph.
    fn node_count(&self) -> usize {
        self.graph().node_count()
    }

    /// See [`ConcurrenceGraph::complete_partition`].
    fn complete_partition(&self, partial: &Partition) -> Result<Partition> {
        self.graph().complete_partition(partial)
    }

    /// Same model over the graph collapsed by `partition`.
    fn aggregate(&self, partition: &Partition) -> Result<Self>;

    /// Quality of `partition`. Members must be valid node ids.
    fn quality(&self, partition: &Partition) -> f64;

    /// Change in quality from moving `node` out of a group with totals `from` into one with
    /// totals `to`.
    fn move_gain(&self, node: usize, from: &GroupTotals, to: &GroupTotals) -> f64;

    /// Change in quality from moving `node` from group `from` to group `to`.
    ///
    /// Exactly 0 when `from == to`. Indices past the end behave as empty groups; use
    /// [`checked_delta_quality`](Quality::checked_delta_quality) to reject them.
    fn delta_quality(&self, partition: &Partition, node: usize, from: usize, to: usize) -> f64 {
        if from == to {
            return 0.0;
        }
        let totals = |idx: usize| {
            partition
                .group(idx)
                .map(|g| GroupTotals::gather(self.graph(), node, g))
                .unwrap_or_default()
        };
        self.move_gain(node, &totals(from), &totals(to))
    }

    /// [`delta_quality`](Quality::delta_quality) with index and partition validation.
    fn checked_delta_quality(
        &self,
        partition: &Partition,
        node: usize,
        from: usize,
        to: usize,
    ) -> Result<f64> {
        let n = self.node_count();
        if node >= n {
            return Err(Error::NodeOutOfRange { node, n });
        }
        partition.validate(n)?;
        for group in [from, to] {
            if group >= partition.len() {
                return Err(Error::GroupOutOfRange {
                    group,
                    len: partition.len(),
                });
            }
        }
        Ok(self.delta_quality(partition, node, from, to))
    }
}

/// Trait for community detection algorithms.
pub trait CommunityDetection {
    /// Optimize `model` starting from `initial` (completed with singletons).
    ///
    /// Returns a complete partition without empty groups.
    fn detect<Q: Quality>(&self, model: &Q, initial: &Partition) -> Result<Partition>;

    /// Detect starting from all singletons.
    fn detect_from_singletons<Q: Quality>(&self, model: &Q) -> Result<Partition> {
        self.detect(model, &Partition::new())
    }
}
