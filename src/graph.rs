//! The concurrence graph.
//!
//! A weighted undirected graph over dense node ids `0..n` whose edge weights count how
//! often two nodes were observed together. Construction validates the input once; after
//! that the graph is read-only; [`ConcurrenceGraph::aggregate`] produces a new, smaller
//! graph rather than mutating this one.
//!
//! ## Node statistics
//!
//! | Statistic | Meaning |
//! |-----------|---------|
//! | `strength(u)` | sum of u's incident weights (`k_u`) |
//! | `total_weight()` | sum of all strengths (`W`, each edge counted from both ends) |
//! | `mean_weight(u)`, `var_weight(u)` | population moments of u's stored incident weights |
//! | `node_size(u)` | number of original nodes u stands for (1 before aggregation) |
//!
//! After aggregation a super-node keeps the summed strength and size of its members even
//! though intra-group weight is dropped from the edges, so the null model seen by a
//! quality function does not change between levels.

use crate::error::{Error, Result};
use crate::partition::Partition;
use std::collections::BTreeMap;

/// Concurrence count between two nodes.
pub type Weight = u64;

/// Sparse symmetric input mapping: `node -> (neighbor -> weight)`.
pub type Concurrences = BTreeMap<usize, BTreeMap<usize, Weight>>;

static EMPTY_ROW: BTreeMap<usize, Weight> = BTreeMap::new();

/// Immutable weighted concurrence graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcurrenceGraph {
    rows: Vec<BTreeMap<usize, Weight>>,
    strength: Vec<Weight>,
    total_weight: Weight,
    node_size: Vec<usize>,
    mean_weight: Vec<f64>,
    var_weight: Vec<f64>,
}

impl ConcurrenceGraph {
    /// Build from a symmetric sparse weight mapping.
    ///
    /// Fails when `weight(u, v) != weight(v, u)` for some stored entry, when an id is
    /// `>= n`, or when a node concurs with itself. Zero weights are accepted (they must
    /// still be symmetric) and dropped.
    pub fn new(n: usize, concurrences: Concurrences) -> Result<Self> {
        for (&u, row) in &concurrences {
            if u >= n {
                return Err(Error::NodeOutOfRange { node: u, n });
            }
            for (&v, &w) in row {
                if v >= n {
                    return Err(Error::NodeOutOfRange { node: v, n });
                }
                if v == u {
                    return Err(Error::SelfLoop { node: u });
                }
                let back = concurrences.get(&v).and_then(|r| r.get(&u));
                if back != Some(&w) {
                    return Err(Error::AsymmetricConcurrence { u, v });
                }
            }
        }

        let mut rows = vec![BTreeMap::new(); n];
        for (u, row) in concurrences {
            rows[u] = row.into_iter().filter(|&(_, w)| w > 0).collect();
        }
        Ok(Self::assemble(rows, None, vec![1; n]))
    }

    /// Build from an undirected edge list.
    ///
    /// Each `(u, v, w)` is stored in both directions; repeated edges accumulate.
    pub fn from_edges<I>(n: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize, Weight)>,
    {
        let mut rows: Vec<BTreeMap<usize, Weight>> = vec![BTreeMap::new(); n];
        for (u, v, w) in edges {
            if u >= n {
                return Err(Error::NodeOutOfRange { node: u, n });
            }
            if v >= n {
                return Err(Error::NodeOutOfRange { node: v, n });
            }
            if u == v {
                return Err(Error::SelfLoop { node: u });
            }
            if w == 0 {
                continue;
            }
            *rows[u].entry(v).or_insert(0) += w;
            *rows[v].entry(u).or_insert(0) += w;
        }
        Ok(Self::assemble(rows, None, vec![1; n]))
    }

    /// Precompute node statistics. `strength` overrides the row sums (aggregation).
    fn assemble(
        rows: Vec<BTreeMap<usize, Weight>>,
        strength: Option<Vec<Weight>>,
        node_size: Vec<usize>,
    ) -> Self {
        let row_sums: Vec<Weight> = rows.iter().map(|r| r.values().sum()).collect();

        let mean_weight: Vec<f64> = rows
            .iter()
            .zip(&row_sums)
            .map(|(row, &sum)| {
                if row.is_empty() {
                    0.0
                } else {
                    sum as f64 / row.len() as f64
                }
            })
            .collect();

        let var_weight: Vec<f64> = rows
            .iter()
            .zip(&mean_weight)
            .map(|(row, &mean)| {
                if row.is_empty() {
                    return 0.0;
                }
                let ss: f64 = row
                    .values()
                    .map(|&w| {
                        let d = w as f64 - mean;
                        d * d
                    })
                    .sum();
                ss / row.len() as f64
            })
            .collect();

        let strength = strength.unwrap_or(row_sums);
        let total_weight = strength.iter().sum();

        Self {
            rows,
            strength,
            total_weight,
            node_size,
            mean_weight,
            var_weight,
        }
    }

    /// Number of nodes `n`.
    pub fn node_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of undirected edges with positive weight.
    pub fn edge_count(&self) -> usize {
        self.rows.iter().map(BTreeMap::len).sum::<usize>() / 2
    }

    /// Weight between `u` and `v`; 0 for any pair without a stored concurrence.
    pub fn weight(&self, u: usize, v: usize) -> Weight {
        self.rows
            .get(u)
            .and_then(|row| row.get(&v))
            .copied()
            .unwrap_or(0)
    }

    /// Sparse row of `u` (empty for isolated or unknown nodes).
    pub fn neighbors(&self, u: usize) -> &BTreeMap<usize, Weight> {
        self.rows.get(u).unwrap_or(&EMPTY_ROW)
    }

    /// Degree-like strength `k_u`.
    pub fn strength(&self, u: usize) -> Weight {
        self.strength[u]
    }

    /// Sum of all strengths `W`.
    pub fn total_weight(&self) -> Weight {
        self.total_weight
    }

    /// Mean of u's stored incident weights (0 when isolated).
    pub fn mean_weight(&self, u: usize) -> f64 {
        self.mean_weight[u]
    }

    /// Population variance of u's stored incident weights (0 when isolated).
    pub fn var_weight(&self, u: usize) -> f64 {
        self.var_weight[u]
    }

    /// Number of original nodes represented by `u`.
    pub fn node_size(&self, u: usize) -> usize {
        self.node_size[u]
    }

    /// Copy `partial`, then append a singleton for every uncovered node in id order.
    ///
    /// Fails if a node is assigned twice or an id is `>= n`.
    pub fn complete_partition(&self, partial: &Partition) -> Result<Partition> {
        let group_of = partial.group_of(self.node_count())?;
        let mut complete = partial.clone();
        for (node, g) in group_of.into_iter().enumerate() {
            if g.is_none() {
                complete.push([node].into());
            }
        }
        Ok(complete)
    }

    /// Collapse each group of `partition` into one super-node, numbered by group position.
    ///
    /// Cross-group weights are summed; intra-group weight is dropped. Strength and size of
    /// a super-node are the sums over its members. Nodes not covered by the partition do
    /// not appear in the result.
    pub fn aggregate(&self, partition: &Partition) -> Result<Self> {
        let group_of = partition.group_of(self.node_count())?;
        let k = partition.len();

        let mut rows: Vec<BTreeMap<usize, Weight>> = vec![BTreeMap::new(); k];
        let mut strength = vec![0; k];
        let mut node_size = vec![0; k];

        for (u, gu) in group_of.iter().enumerate() {
            let Some(gu) = *gu else { continue };
            strength[gu] += self.strength[u];
            node_size[gu] += self.node_size[u];
            for (&v, &w) in &self.rows[u] {
                match group_of[v] {
                    Some(gv) if gv != gu => *rows[gu].entry(gv).or_insert(0) += w,
                    _ => {}
                }
            }
        }

        log::debug!(
            "aggregated {} nodes into {} super-nodes",
            self.node_count(),
            k
        );
        Ok(Self::assemble(rows, Some(strength), node_size))
    }

    /// Build from a petgraph undirected graph with integer weights.
    ///
    /// Node ids are `NodeIndex::index()`; parallel edges accumulate.
    #[cfg(feature = "petgraph")]
    pub fn from_petgraph<N>(graph: &petgraph::graph::UnGraph<N, Weight>) -> Result<Self> {
        use petgraph::visit::EdgeRef;

        Self::from_edges(
            graph.node_count(),
            graph
                .edge_references()
                .map(|e| (e.source().index(), e.target().index(), *e.weight())),
        )
    }

    /// Export as a petgraph undirected graph (one edge per stored pair).
    #[cfg(feature = "petgraph")]
    pub fn to_petgraph(&self) -> petgraph::graph::UnGraph<(), Weight> {
        use petgraph::graph::NodeIndex;

        let mut graph = petgraph::graph::UnGraph::with_capacity(self.node_count(), self.edge_count());
        for _ in 0..self.node_count() {
            let _ = graph.add_node(());
        }
        for (u, row) in self.rows.iter().enumerate() {
            for (&v, &w) in row.range(u + 1..) {
                let _ = graph.add_edge(NodeIndex::new(u), NodeIndex::new(v), w);
            }
        }
        graph
    }
}
