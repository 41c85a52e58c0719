//! Single-linkage agglomerative clustering.
//!
//! Bottom-up clustering over `distance = 1 − similarity`: repeatedly merge the closest
//! pair of clusters until the closest pair is farther apart than `epsilon`.
//!
//! # Single Linkage
//!
//! ```text
//! d(A ∪ B, C) = min(d(A, C), d(B, C))
//! ```
//!
//! Single linkage chains: two clusters join as soon as any pair of their members is
//! close enough. The clusters at threshold ε are therefore the connected components of
//! the graph whose edges are the stored similarities with `1 − sim <= ε`.
//!
//! Only stored similarities link clusters. A pair without a stored similarity is never
//! merged directly, whatever ε is.
//!
//! # Merge Order
//!
//! Cluster `i` keeps its id when `j > i` merges into it. The closest pair is found by a
//! row-major scan and the first strictly smaller distance wins, so ties go to the
//! smallest `(i, j)`.

use super::dendrogram::Dendrogram;
use crate::error::{Error, Result};
use crate::graph::ConcurrenceGraph;
use crate::partition::Partition;
use crate::similarity::{self, NodePair, SimilarityKind, SimilarityMatrix};
use kodama::{linkage as kodama_linkage, Method as KodamaMethod};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

/// Single-linkage clustering with a distance cutoff.
#[derive(Debug, Clone)]
pub struct SingleLinkage {
    /// Largest distance at which two clusters still merge.
    epsilon: f64,
    /// Transform used to derive node similarities.
    similarity: SimilarityKind,
}

impl SingleLinkage {
    /// Create a new single-linkage clusterer with cutoff `epsilon`.
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon,
            similarity: SimilarityKind::default(),
        }
    }

    /// Set the cutoff.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
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
        Ok(())
    }

    /// Cluster the nodes of `graph`.
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
    ///
    /// Clusters are returned in order of their smallest subject.
    pub fn fit_matrix<K>(&self, sims: &SimilarityMatrix<K>) -> Result<Partition<K>>
    where
        K: Ord + Clone + Debug,
    {
        self.validate()?;
        let keys: Vec<&K> = sims.keys().collect();
        let index: BTreeMap<&K, usize> = keys.iter().enumerate().map(|(i, &k)| (k, i)).collect();

        let mut members: Vec<Option<BTreeSet<usize>>> =
            (0..keys.len()).map(|i| Some(BTreeSet::from([i]))).collect();
        let mut dist: Vec<BTreeMap<usize, f64>> = keys
            .iter()
            .map(|&k| {
                sims.row(k)
                    .into_iter()
                    .flatten()
                    .filter(|&(other, _)| other != k)
                    .filter_map(|(other, &s)| index.get(other).map(|&j| (j, 1.0 - s)))
                    .collect()
            })
            .collect();

        let mut merges = 0;
        loop {
            let mut closest: Option<(usize, usize, f64)> = None;
            for (i, row) in dist.iter().enumerate() {
                for (&j, &d) in row.range(i + 1..) {
                    if closest.map_or(true, |(_, _, best)| d < best) {
                        closest = Some((i, j, d));
                    }
                }
            }
            let Some((i, j, d)) = closest else { break };
            if d > self.epsilon {
                break;
            }

            log::trace!("merge {j} into {i} at distance {d}");
            let absorbed = members[j].take().unwrap_or_default();
            if let Some(target) = members[i].as_mut() {
                target.extend(absorbed);
            }
            let row_j = std::mem::take(&mut dist[j]);
            let _ = dist[i].remove(&j);
            for (m, dj) in row_j {
                if m == i {
                    continue;
                }
                let _ = dist[m].remove(&j);
                let merged = dist[i].get(&m).map_or(dj, |&di| di.min(dj));
                let _ = dist[i].insert(m, merged);
                let _ = dist[m].insert(i, merged);
            }
            merges += 1;
        }

        let clusters: Partition<K> = members
            .into_iter()
            .flatten()
            .map(|group| group.into_iter().map(|i| keys[i].clone()).collect::<BTreeSet<K>>())
            .collect();
        log::debug!(
            "single linkage: {} subjects, {merges} merges, {} clusters",
            keys.len(),
            clusters.len()
        );
        Ok(clusters)
    }

    /// Full single-linkage merge history of the nodes of `graph`.
    pub fn dendrogram_nodes(&self, graph: &ConcurrenceGraph) -> Dendrogram<usize> {
        Self::dendrogram_matrix(&similarity::induce(graph, self.similarity))
    }

    /// Full single-linkage merge history over the subjects of `sims`.
    ///
    /// Missing similarities count as distance 1. Cutting the result at any `eps < 1`
    /// gives the same partition as [`fit_matrix`](Self::fit_matrix) with that cutoff.
    pub fn dendrogram_matrix<K>(sims: &SimilarityMatrix<K>) -> Dendrogram<K>
    where
        K: Ord + Clone + Debug,
    {
        let keys: Vec<K> = sims.keys().cloned().collect();
        let n = keys.len();
        let mut dendro = Dendrogram::new(keys);
        if n < 2 {
            return dendro;
        }

        // Condensed dissimilarity matrix (upper triangle, row-major).
        let leaves = dendro.leaves();
        let mut condensed = Vec::with_capacity((n * (n - 1)) / 2);
        for row in 0..(n - 1) {
            for col in (row + 1)..n {
                condensed.push(1.0 - sims.get(&leaves[row], &leaves[col]));
            }
        }

        let steps = kodama_linkage(&mut condensed, n, KodamaMethod::Single);
        for step in steps.steps() {
            dendro.add_merge(step.cluster1, step.cluster2, step.dissimilarity, step.size);
        }
        dendro
    }
}

impl Default for SingleLinkage {
    fn default() -> Self {
        Self::new(0.5)
    }
}
