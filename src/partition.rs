//! Partitions: ordered sequences of disjoint groups.
//!
//! Invariants (checked by [`Partition::validate`] for node partitions):
//! - no member appears in two groups;
//! - every member of a node partition is a node id `< n`.
//!
//! Group order is meaningful: aggregation numbers super-nodes by group position, and
//! [`Partition::flatten`] depends on it.

use crate::error::{Error, Result};
use std::collections::{BTreeSet, HashMap};

/// An ordered list of groups of subjects (nodes, node pairs, or group indices).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition<K = usize> {
    groups: Vec<BTreeSet<K>>,
}

impl<K: Ord> Default for Partition<K> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<K: Ord + Clone> Partition<K> {
    /// An empty partition (no groups).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from any nested iterable of members.
    pub fn from_groups<I, G>(groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: IntoIterator<Item = K>,
    {
        Self {
            groups: groups
                .into_iter()
                .map(|g| g.into_iter().collect())
                .collect(),
        }
    }

    /// The groups, in order.
    pub fn groups(&self) -> &[BTreeSet<K>] {
        &self.groups
    }

    /// Group at `idx`, if any.
    pub fn group(&self, idx: usize) -> Option<&BTreeSet<K>> {
        self.groups.get(idx)
    }

    /// Number of groups (empty groups included).
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True when there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over groups.
    pub fn iter(&self) -> std::slice::Iter<'_, BTreeSet<K>> {
        self.groups.iter()
    }

    /// Append a group.
    pub fn push(&mut self, group: BTreeSet<K>) {
        self.groups.push(group);
    }

    /// Consume into the raw groups.
    pub fn into_groups(self) -> Vec<BTreeSet<K>> {
        self.groups
    }

    /// Total number of members over all groups.
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(BTreeSet::len).sum()
    }

    /// Drop empty groups, keeping the relative order of the rest.
    pub fn compact(&mut self) {
        self.groups.retain(|g| !g.is_empty());
    }

    /// Same groups, empty ones removed, sorted.
    ///
    /// Two partitions that differ only in group order have equal canonical forms.
    pub fn canonical(&self) -> Self {
        let mut groups: Vec<BTreeSet<K>> =
            self.groups.iter().filter(|g| !g.is_empty()).cloned().collect();
        groups.sort();
        Self { groups }
    }
}

impl Partition<usize> {
    /// One singleton group per node, in ascending id order.
    pub fn singletons(n: usize) -> Self {
        Self {
            groups: (0..n).map(|u| BTreeSet::from([u])).collect(),
        }
    }

    /// Build from per-node community labels (`labels[u]` = community of u).
    ///
    /// Groups are ordered by the first node carrying each label.
    pub fn from_labels(labels: &[usize]) -> Self {
        let mut index: HashMap<usize, usize> = HashMap::new();
        let mut groups: Vec<BTreeSet<usize>> = Vec::new();
        for (node, &label) in labels.iter().enumerate() {
            let idx = *index.entry(label).or_insert_with(|| {
                groups.push(BTreeSet::new());
                groups.len() - 1
            });
            let _ = groups[idx].insert(node);
        }
        Self { groups }
    }

    /// Check that groups are disjoint and every member is `< n`.
    pub fn validate(&self, n: usize) -> Result<()> {
        self.group_of(n).map(|_| ())
    }

    /// Per-node group index (`None` for uncovered nodes), validating on the way.
    pub fn group_of(&self, n: usize) -> Result<Vec<Option<usize>>> {
        let mut group_of = vec![None; n];
        for (idx, group) in self.groups.iter().enumerate() {
            for &node in group {
                if node >= n {
                    return Err(Error::NodeOutOfRange { node, n });
                }
                if group_of[node].is_some() {
                    return Err(Error::DuplicateAssignment { node });
                }
                group_of[node] = Some(idx);
            }
        }
        Ok(group_of)
    }

    /// Community labels `0..k` for a complete partition, numbered by group position
    /// after dropping empty groups.
    pub fn labels(&self, n: usize) -> Result<Vec<usize>> {
        let mut compacted = self.clone();
        compacted.compact();
        compacted
            .group_of(n)?
            .into_iter()
            .enumerate()
            .map(|(node, g)| g.ok_or(Error::IncompletePartition { node }))
            .collect()
    }

    /// Expand a partition of super-nodes back onto the groups they were built from.
    ///
    /// `self` groups indices into `base`; each output group is the union of the `base`
    /// groups it names.
    pub fn flatten<K: Ord + Clone>(&self, base: &Partition<K>) -> Result<Partition<K>> {
        let mut groups = Vec::with_capacity(self.groups.len());
        for agg in &self.groups {
            let mut merged = BTreeSet::new();
            for &idx in agg {
                let group = base.group(idx).ok_or(Error::GroupOutOfRange {
                    group: idx,
                    len: base.len(),
                })?;
                merged.extend(group.iter().cloned());
            }
            groups.push(merged);
        }
        Ok(Partition { groups })
    }
}

impl<K: Ord> FromIterator<BTreeSet<K>> for Partition<K> {
    fn from_iter<I: IntoIterator<Item = BTreeSet<K>>>(iter: I) -> Self {
        Self {
            groups: iter.into_iter().collect(),
        }
    }
}

impl<'a, K> IntoIterator for &'a Partition<K> {
    type Item = &'a BTreeSet<K>;
    type IntoIter = std::slice::Iter<'a, BTreeSet<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_duplicates_and_out_of_range() {
        let dup: Partition = Partition::from_groups([vec![0, 1], vec![1, 2]]);
        assert_eq!(dup.validate(3), Err(Error::DuplicateAssignment { node: 1 }));

        let oob: Partition = Partition::from_groups([vec![0, 5]]);
        assert_eq!(oob.validate(3), Err(Error::NodeOutOfRange { node: 5, n: 3 }));
    }

    #[test]
    fn test_labels_round_trip() {
        let labels = vec![2, 2, 7, 2, 7, 0];
        let p = Partition::from_labels(&labels);
        assert_eq!(p.len(), 3);
        assert_eq!(p.labels(6).unwrap(), vec![0, 0, 1, 0, 1, 2]);
    }

    #[test]
    fn test_labels_incomplete() {
        let p: Partition = Partition::from_groups([vec![0, 2]]);
        assert_eq!(p.labels(3), Err(Error::IncompletePartition { node: 1 }));
    }

    #[test]
    fn test_flatten() {
        let base: Partition = Partition::from_groups([vec![0, 1], vec![2], vec![3, 4]]);
        let agg: Partition = Partition::from_groups([vec![0, 2], vec![1]]);
        let flat = agg.flatten(&base).unwrap();
        assert_eq!(flat, Partition::from_groups([vec![0, 1, 3, 4], vec![2]]));

        let bad: Partition = Partition::from_groups([vec![3]]);
        assert_eq!(
            bad.flatten(&base),
            Err(Error::GroupOutOfRange { group: 3, len: 3 })
        );
    }

    #[test]
    fn test_compact_and_canonical() {
        let mut p: Partition = Partition::from_groups([vec![3, 4], vec![], vec![0]]);
        assert_eq!(p.canonical(), Partition::from_groups([vec![0], vec![3, 4]]));
        p.compact();
        assert_eq!(p.len(), 2);
        assert_eq!(p.member_count(), 3);
    }
}
