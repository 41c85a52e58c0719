//! Dendrogram of single-linkage merges.
//!
//! A dendrogram records the nested structure of clusters produced by agglomerative
//! clustering. Leaves are numbered `0..n` in subject order; merge `i` creates cluster
//! `n + i` (the SciPy/MATLAB convention used by `kodama`).

use crate::partition::Partition;
use std::collections::BTreeSet;

/// A single merge operation in the dendrogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    /// First cluster being merged (index).
    pub cluster_a: usize,
    /// Second cluster being merged (index).
    pub cluster_b: usize,
    /// Distance at which the merge occurred.
    pub distance: f64,
    /// Size of resulting cluster.
    pub size: usize,
}

/// Merge history over subjects of type `K`.
#[derive(Debug, Clone)]
pub struct Dendrogram<K> {
    leaves: Vec<K>,
    merges: Vec<Merge>,
}

impl<K: Ord + Clone> Dendrogram<K> {
    /// A dendrogram over `leaves` with no merges yet.
    pub fn new(leaves: Vec<K>) -> Self {
        let capacity = leaves.len().saturating_sub(1);
        Self {
            leaves,
            merges: Vec::with_capacity(capacity),
        }
    }

    /// Record a merge operation.
    pub fn add_merge(&mut self, cluster_a: usize, cluster_b: usize, distance: f64, size: usize) {
        self.merges.push(Merge {
            cluster_a,
            cluster_b,
            distance,
            size,
        });
    }

    /// Clusters after applying every merge at distance `<= threshold`.
    ///
    /// Groups are ordered by their smallest leaf.
    pub fn cut_at_distance(&self, threshold: f64) -> Partition<K> {
        self.cut(|_, m| m.distance <= threshold)
    }

    /// Clusters after the first `n - k` merges (at least `k` clusters remain).
    pub fn cut_to_k(&self, k: usize) -> Partition<K> {
        let keep = self.leaves.len().saturating_sub(k);
        self.cut(|i, _| i < keep)
    }

    fn cut(&self, mut apply: impl FnMut(usize, &Merge) -> bool) -> Partition<K> {
        let n = self.leaves.len();
        let mut parent: Vec<usize> = (0..n + self.merges.len()).collect();

        fn find(parent: &mut [usize], mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }

        for (i, merge) in self.merges.iter().enumerate() {
            if !apply(i, merge) {
                continue;
            }
            let a = find(&mut parent, merge.cluster_a);
            let b = find(&mut parent, merge.cluster_b);
            parent[a] = n + i;
            parent[b] = n + i;
        }

        let mut root_to_group: Vec<Option<usize>> = vec![None; parent.len()];
        let mut groups: Vec<BTreeSet<K>> = Vec::new();
        for (leaf, key) in self.leaves.iter().enumerate() {
            let root = find(&mut parent, leaf);
            let idx = *root_to_group[root].get_or_insert_with(|| {
                groups.push(BTreeSet::new());
                groups.len() - 1
            });
            let _ = groups[idx].insert(key.clone());
        }
        groups.into_iter().collect()
    }

    /// Subjects in leaf order.
    pub fn leaves(&self) -> &[K] {
        &self.leaves
    }

    /// Number of original items.
    pub fn n_items(&self) -> usize {
        self.leaves.len()
    }

    /// Number of merges recorded.
    pub fn n_merges(&self) -> usize {
        self.merges.len()
    }

    /// Iterate over merges.
    pub fn merges(&self) -> impl Iterator<Item = &Merge> {
        self.merges.iter()
    }

    /// Get the merge distances (for visualization).
    pub fn distances(&self) -> Vec<f64> {
        self.merges.iter().map(|m| m.distance).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dendrogram<char> {
        let mut d = Dendrogram::new(vec!['a', 'b', 'c', 'd']);
        d.add_merge(0, 1, 0.2, 2);
        d.add_merge(2, 3, 0.5, 2);
        d.add_merge(4, 5, 0.9, 4);
        d
    }

    #[test]
    fn test_dendrogram_creation() {
        let d: Dendrogram<usize> = Dendrogram::new((0..5).collect());
        assert_eq!(d.n_items(), 5);
        assert_eq!(d.n_merges(), 0);
        assert_eq!(d.cut_at_distance(1.0).len(), 5);
    }

    #[test]
    fn test_cut_at_distance() {
        let d = sample();
        assert_eq!(
            d.cut_at_distance(0.1),
            Partition::from_groups([vec!['a'], vec!['b'], vec!['c'], vec!['d']])
        );
        assert_eq!(
            d.cut_at_distance(0.5),
            Partition::from_groups([vec!['a', 'b'], vec!['c', 'd']])
        );
        assert_eq!(d.cut_at_distance(0.95).len(), 1);
    }

    #[test]
    fn test_cut_to_k() {
        let d = sample();
        assert_eq!(d.cut_to_k(3), Partition::from_groups([vec!['a', 'b'], vec!['c'], vec!['d']]));
        assert_eq!(d.cut_to_k(1).len(), 1);
        assert_eq!(d.cut_to_k(10).len(), 4);
        assert_eq!(d.distances(), vec![0.2, 0.5, 0.9]);
    }
}
