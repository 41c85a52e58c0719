//! DBSCAN over similarity matrices.
//!
//! # The Algorithm (Ester et al., 1996)
//!
//! Density-based clustering with similarities in place of distances:
//!
//! - **Epsilon (ε)**: `v` is in the neighborhood of `u` iff `sim(u, v) + ε >= 1`.
//! - **MinPts**: a subject whose neighborhood (itself included) has at least MinPts members
//!   is a **core** subject.
//! - **Border**: a non-core subject in the neighborhood of a core subject.
//!
//! ## Algorithm Steps
//!
//! 1. Compute neighborhoods and densities; split core neighborhoods into core and
//!    border neighbors.
//! 2. Seed a cluster at the densest unassigned core subject (ties go to the smallest key).
//! 3. Expand breadth-first through core neighbors; border neighbors are absorbed but
//!    not expanded.
//! 4. Repeat until no unassigned core remains. Every subject never reached becomes a
//!    singleton.
//!
//! Unlike classic DBSCAN there is no noise label: every subject ends up in exactly one
//! group, so the result is always a complete partition of the subjects.
//!
//! ## Complexity
//!
//! - **Time**: O(S · d) for S subjects with at most d stored similarities each, on top
//!   of building the matrix.
//! - **Space**: O(S · d).
//!
//! ## References
//!
//! Ester et al. (1996). "A Density-Based Algorithm for Discovering Clusters
//! in Large Spatial Databases with Noise." KDD-96.

use crate::error::{Error, Result};
use crate::graph::ConcurrenceGraph;
use crate::partition::Partition;
use crate::similarity::{self, NodePair, SimilarityKind, SimilarityMatrix};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt::Debug;

/// DBSCAN over nodes, node pairs or groups.
#[derive(Debug, Clone)]
pub struct Dbscan {
    /// Epsilon: similarity slack for neighborhood membership.
    epsilon: f64,
    /// Minimum neighborhood size (center included) for a core subject.
    min_pts: usize,
    /// Transform used to derive node similarities.
    similarity: SimilarityKind,
}

impl Dbscan {
    /// Create a new DBSCAN clusterer.
    ///
    /// # Arguments
    ///
    /// * `epsilon` - Subjects with `sim + epsilon >= 1` are neighbors.
    /// * `min_pts` - Minimum neighborhood size, center included, of a core subject.
    pub fn new(epsilon: f64, min_pts: usize) -> Self {
        Self {
            epsilon,
            min_pts,
            similarity: SimilarityKind::default(),
        }
    }

    /// Set epsilon.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set minimum points for core classification.
    pub fn with_min_pts(mut self, min_pts: usize) -> Self {
        self.min_pts = min_pts;
        self
    }

    /// Set the similarity transform.
    pub fn with_similarity(mut self, similarity: SimilarityKind) -> Self {
        self.similarity = similarity;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(Error::InvalidParameter {
                name: "epsilon",
                message: "must be finite and non-negative",
            });
        }
        if self.min_pts == 0 {
            return Err(Error::InvalidParameter {
                name: "min_pts",
                message: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Cluster the nodes of `graph`. Every node appears in exactly one group.
    pub fn fit_nodes(&self, graph: &ConcurrenceGraph) -> Result<Partition> {
        self.validate()?;
        self.fit_matrix(&similarity::induce(graph, self.similarity))
    }

    /// Cluster the node pairs that have a stored similarity.
    pub fn fit_pairs(&self, graph: &ConcurrenceGraph) -> Result<Partition<NodePair>> {
        self.validate()?;
        self.fit_matrix(&similarity::induce_pairs(graph, self.similarity))
    }

    /// Cluster caller-defined groups of nodes. Output members are group positions.
    pub fn fit_groups(&self, graph: &ConcurrenceGraph, groups: &Partition) -> Result<Partition> {
        self.validate()?;
        self.fit_matrix(&similarity::induce_groups(graph, self.similarity, groups)?)
    }

    /// Cluster the subjects of an arbitrary similarity matrix.
    pub fn fit_matrix<K>(&self, sims: &SimilarityMatrix<K>) -> Result<Partition<K>>
    where
        K: Ord + Clone + Debug,
    {
        self.validate()?;
        let hoods = Neighborhoods::build(sims, self.epsilon, self.min_pts);

        let mut assigned: BTreeSet<&K> = BTreeSet::new();
        let mut clusters: Vec<BTreeSet<K>> = Vec::new();

        while let Some(seed) = hoods.densest_unassigned_core(&assigned) {
            let mut cluster = BTreeSet::from([seed.clone()]);
            let _ = assigned.insert(seed);
            let mut queue = VecDeque::from([seed]);

            while let Some(center) = queue.pop_front() {
                let Some(links) = hoods.core_links.get(center) else {
                    continue;
                };
                for &border in &links.border {
                    if assigned.insert(border) {
                        let _ = cluster.insert(border.clone());
                    }
                }
                for &core in &links.core {
                    if assigned.insert(core) {
                        let _ = cluster.insert(core.clone());
                        queue.push_back(core);
                    }
                }
            }
            clusters.push(cluster);
        }

        let n_dense = clusters.len();
        for key in sims.keys() {
            if !assigned.contains(key) {
                clusters.push(BTreeSet::from([key.clone()]));
            }
        }

        log::debug!(
            "dbscan: {} subjects, {} cores, {} dense clusters, {} singletons",
            sims.len(),
            hoods.core_links.len(),
            n_dense,
            clusters.len() - n_dense
        );
        Ok(clusters.into_iter().collect())
    }
}

impl Default for Dbscan {
    fn default() -> Self {
        Self::new(0.5, 3)
    }
}

/// Neighbors of a core subject, split by whether they are core themselves.
#[derive(Debug)]
struct CoreLinks<'a, K> {
    core: Vec<&'a K>,
    border: Vec<&'a K>,
}

#[derive(Debug)]
struct Neighborhoods<'a, K> {
    density: BTreeMap<&'a K, usize>,
    core_links: BTreeMap<&'a K, CoreLinks<'a, K>>,
}

impl<'a, K: Ord + Clone + Debug> Neighborhoods<'a, K> {
    fn build(sims: &'a SimilarityMatrix<K>, epsilon: f64, min_pts: usize) -> Self {
        let members: BTreeMap<&'a K, Vec<&'a K>> = sims
            .rows()
            .map(|(key, row)| {
                let hood = row
                    .iter()
                    .filter(|&(_, &s)| s + epsilon >= 1.0)
                    .map(|(other, _)| other)
                    .collect();
                (key, hood)
            })
            .collect();

        let density: BTreeMap<&'a K, usize> =
            members.iter().map(|(&k, hood)| (k, hood.len())).collect();
        let is_core = |k: &K| density.get(k).is_some_and(|&d| d >= min_pts);

        let mut core_links = BTreeMap::new();
        for (&key, hood) in &members {
            if !is_core(key) {
                continue;
            }
            let (core, border): (Vec<&K>, Vec<&K>) = hood
                .iter()
                .copied()
                .filter(|&other| other != key)
                .partition(|&other| is_core(other));
            let _ = core_links.insert(key, CoreLinks { core, border });
        }

        Self {
            density,
            core_links,
        }
    }

    fn densest_unassigned_core(&self, assigned: &BTreeSet<&'a K>) -> Option<&'a K> {
        let mut best: Option<(&'a K, usize)> = None;
        for &key in self.core_links.keys() {
            if assigned.contains(key) {
                continue;
            }
            let d = self.density.get(key).copied().unwrap_or(0);
            if best.map_or(true, |(_, bd)| d > bd) {
                best = Some((key, d));
            }
        }
        best.map(|(key, _)| key)
    }
}
