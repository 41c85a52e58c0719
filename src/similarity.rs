//! Similarity induction: turning concurrence weights into `[0, 1]` similarities.
//!
//! Every transform visits each stored concurrence `(u, v)` once and writes the result
//! into both rows, so the induced matrices are exactly symmetric. Every node gets a row
//! holding at least its diagonal `1.0`; isolated nodes therefore stay visible to the
//! clustering algorithms and end up as singletons.
//!
//! | Kind | `sim(u, v)` |
//! |------|-------------|
//! | [`Plain`](SimilarityKind::Plain) | `w_uv · (0.5/k_u + 0.5/k_v)` |
//! | [`Normalized`](SimilarityKind::Normalized) | mean of `Φ_u(w_uv)` and `Φ_v(w_uv)` |
//! | [`Jaccard`](SimilarityKind::Jaccard) | `|N(u) ∩ N(v)| / |N(u) ∪ N(v)|` |
//! | [`WeightedJaccard`](SimilarityKind::WeightedJaccard) | `Σ_shared (w_uk/k_u)(w_vk/k_v)` |
//! | [`NormalizedJaccard`](SimilarityKind::NormalizedJaccard) | as weighted, with `Φ`-shaped weights renormalized per node |
//!
//! `Φ_x(w) = 0.5 · (1 + erf((w − mean_x) / var_x))` maps a node's mean weight to 0.5.
//! When `var_x == 0` the argument is taken as 0, so the node contributes the neutral 0.5.
//!
//! Pairwise and group clustering lift node similarities to [`NodePair`] subjects
//! ([`pair_similarities`]) and to caller-defined groups ([`group_similarities`]).

use crate::error::{Error, Result};
use crate::graph::{ConcurrenceGraph, Weight};
use crate::partition::Partition;
use statrs::function::erf::erf;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

/// Which transform derives similarities from concurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SimilarityKind {
    /// Weight relative to both endpoints' strengths.
    #[default]
    Plain,
    /// Gaussian-CDF shaped weight, averaged over both endpoints.
    Normalized,
    /// Jaccard index of neighbor sets.
    Jaccard,
    /// Shared-neighbor mass of strength-normalized weights.
    WeightedJaccard,
    /// Shared-neighbor mass of CDF-shaped, renormalized weights.
    NormalizedJaccard,
}

/// Unordered pair of node ids, stored with `lo <= hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodePair {
    lo: usize,
    hi: usize,
}

impl NodePair {
    /// Canonicalize `(a, b)`.
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    /// Smaller id.
    pub fn lo(&self) -> usize {
        self.lo
    }

    /// Larger id.
    pub fn hi(&self) -> usize {
        self.hi
    }
}

impl From<(usize, usize)> for NodePair {
    fn from((a, b): (usize, usize)) -> Self {
        Self::new(a, b)
    }
}

/// Sparse symmetric similarity matrix over subjects `K`, diagonal `1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix<K: Ord> {
    rows: BTreeMap<K, BTreeMap<K, f64>>,
}

impl<K: Ord + Clone + Debug> SimilarityMatrix<K> {
    /// Validate caller-built rows.
    ///
    /// Every value must be finite and in `[0, 1]`, every referenced subject must have a
    /// row, and `sim(a, b)` must equal `sim(b, a)`. Diagonal entries are set to `1.0`.
    pub fn from_rows(mut rows: BTreeMap<K, BTreeMap<K, f64>>) -> Result<Self> {
        for (a, row) in &rows {
            for (b, &s) in row {
                if !s.is_finite() || !(0.0..=1.0).contains(&s) {
                    return Err(Error::SimilarityOutOfRange { value: s });
                }
                if a == b {
                    continue;
                }
                let other = rows.get(b).ok_or_else(|| Error::MissingSimilarityRow {
                    key: format!("{b:?}"),
                })?;
                match other.get(a) {
                    Some(&t) if (t - s).abs() <= 1e-12 => {}
                    _ => {
                        return Err(Error::AsymmetricSimilarity {
                            key_a: format!("{a:?}"),
                            key_b: format!("{b:?}"),
                        })
                    }
                }
            }
        }
        for (key, row) in rows.iter_mut() {
            let _ = row.insert(key.clone(), 1.0);
        }
        Ok(Self { rows })
    }

    fn from_rows_unchecked(rows: BTreeMap<K, BTreeMap<K, f64>>) -> Self {
        Self { rows }
    }

    /// `sim(a, b)`, 0 when not stored.
    pub fn get(&self, a: &K, b: &K) -> f64 {
        self.rows
            .get(a)
            .and_then(|row| row.get(b))
            .copied()
            .unwrap_or(0.0)
    }

    /// Row of `a`, including the diagonal.
    pub fn row(&self, a: &K) -> Option<&BTreeMap<K, f64>> {
        self.rows.get(a)
    }

    /// Subjects in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.rows.keys()
    }

    /// `(subject, row)` in ascending subject order.
    pub fn rows(&self) -> impl Iterator<Item = (&K, &BTreeMap<K, f64>)> {
        self.rows.iter()
    }

    /// Number of subjects.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when there are no subjects.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Induce node similarities with the chosen transform.
pub fn induce(graph: &ConcurrenceGraph, kind: SimilarityKind) -> SimilarityMatrix<usize> {
    match kind {
        SimilarityKind::Plain => plain(graph),
        SimilarityKind::Normalized => normalized(graph),
        SimilarityKind::Jaccard => jaccard(graph),
        SimilarityKind::WeightedJaccard => weighted_jaccard(graph),
        SimilarityKind::NormalizedJaccard => normalized_jaccard(graph),
    }
}

/// `w_uv · (0.5/k_u + 0.5/k_v)`.
pub fn plain(graph: &ConcurrenceGraph) -> SimilarityMatrix<usize> {
    fill_symmetric(graph, |u, v, w| {
        let cu = 0.5 / graph.strength(u) as f64;
        let cv = 0.5 / graph.strength(v) as f64;
        Some(w as f64 * (cu + cv))
    })
}

/// Mean of both endpoints' Gaussian-CDF shaped weight.
pub fn normalized(graph: &ConcurrenceGraph) -> SimilarityMatrix<usize> {
    fill_symmetric(graph, |u, v, w| {
        Some(0.5 * (shaped_weight(graph, u, w) + shaped_weight(graph, v, w)))
    })
}

/// Jaccard index of neighbor sets; pairs without a shared neighbor are not stored.
pub fn jaccard(graph: &ConcurrenceGraph) -> SimilarityMatrix<usize> {
    fill_symmetric(graph, |u, v, _| {
        let (nu, nv) = (graph.neighbors(u), graph.neighbors(v));
        let (small, large) = if nu.len() <= nv.len() { (nu, nv) } else { (nv, nu) };
        let shared = small.keys().filter(|k| large.contains_key(k)).count();
        if shared == 0 {
            return None;
        }
        let union = nu.len() + nv.len() - shared;
        Some(shared as f64 / union as f64)
    })
}

/// Shared-neighbor mass of `w_uk / k_u` profiles.
pub fn weighted_jaccard(graph: &ConcurrenceGraph) -> SimilarityMatrix<usize> {
    let profiles: Vec<BTreeMap<usize, f64>> = (0..graph.node_count())
        .map(|u| {
            let ku = graph.strength(u) as f64;
            graph
                .neighbors(u)
                .iter()
                .map(|(&k, &w)| (k, w as f64 / ku))
                .collect()
        })
        .collect();
    fill_symmetric(graph, |u, v, _| shared_mass(&profiles[u], &profiles[v]))
}

/// Shared-neighbor mass of CDF-shaped weights, renormalized to sum to 1 per node.
pub fn normalized_jaccard(graph: &ConcurrenceGraph) -> SimilarityMatrix<usize> {
    let profiles: Vec<BTreeMap<usize, f64>> = (0..graph.node_count())
        .map(|u| {
            let shaped: BTreeMap<usize, f64> = graph
                .neighbors(u)
                .iter()
                .map(|(&k, &w)| (k, shaped_weight(graph, u, w)))
                .collect();
            let total: f64 = shaped.values().sum();
            shaped.into_iter().map(|(k, s)| (k, s / total)).collect()
        })
        .collect();
    fill_symmetric(graph, |u, v, _| shared_mass(&profiles[u], &profiles[v]))
}

/// `Φ_u(w) = 0.5 · (1 + erf((w − mean_u) / var_u))`, neutral 0.5 at zero variance.
fn shaped_weight(graph: &ConcurrenceGraph, u: usize, w: Weight) -> f64 {
    let var = graph.var_weight(u);
    let z = if var > 0.0 {
        (w as f64 - graph.mean_weight(u)) / var
    } else {
        0.0
    };
    0.5 * (1.0 + erf(z))
}

fn shared_mass(pu: &BTreeMap<usize, f64>, pv: &BTreeMap<usize, f64>) -> Option<f64> {
    let (small, large) = if pu.len() <= pv.len() { (pu, pv) } else { (pv, pu) };
    let mut any = false;
    let mut mass = 0.0;
    for (k, a) in small {
        if let Some(b) = large.get(k) {
            any = true;
            mass += a * b;
        }
    }
    any.then_some(mass)
}

/// Identity rows for every node, then `f` once per stored unordered pair.
fn fill_symmetric<F>(graph: &ConcurrenceGraph, mut f: F) -> SimilarityMatrix<usize>
where
    F: FnMut(usize, usize, Weight) -> Option<f64>,
{
    let n = graph.node_count();
    let mut rows: Vec<BTreeMap<usize, f64>> = (0..n).map(|u| BTreeMap::from([(u, 1.0)])).collect();
    for u in 0..n {
        for (&v, &w) in graph.neighbors(u).range(u + 1..) {
            if let Some(s) = f(u, v, w) {
                let s = s.clamp(0.0, 1.0);
                let _ = rows[u].insert(v, s);
                let _ = rows[v].insert(u, s);
            }
        }
    }
    SimilarityMatrix::from_rows_unchecked(rows.into_iter().enumerate().collect())
}

/// Lift node similarities to unordered node pairs.
///
/// Subjects are all pairs `{u, v}` (`u != v`) with a stored similarity. Two pairs are as
/// similar as the mean of their four cross-node similarities (diagonal counted as 1).
pub fn pair_similarities(nodes: &SimilarityMatrix<usize>) -> SimilarityMatrix<NodePair> {
    let pairs: Vec<NodePair> = nodes
        .rows()
        .flat_map(|(&u, row)| {
            row.keys()
                .filter(move |&&v| v != u)
                .map(move |&v| NodePair::new(u, v))
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut rows: BTreeMap<NodePair, BTreeMap<NodePair, f64>> = pairs
        .iter()
        .map(|&p| (p, BTreeMap::from([(p, 1.0)])))
        .collect();

    for (idx, p1) in pairs.iter().enumerate() {
        for p2 in &pairs[idx + 1..] {
            let s = 0.25
                * (nodes.get(&p1.lo, &p2.lo)
                    + nodes.get(&p1.lo, &p2.hi)
                    + nodes.get(&p1.hi, &p2.lo)
                    + nodes.get(&p1.hi, &p2.hi));
            if s > 0.0 {
                let s = s.min(1.0);
                if let Some(row) = rows.get_mut(p1) {
                    let _ = row.insert(*p2, s);
                }
                if let Some(row) = rows.get_mut(p2) {
                    let _ = row.insert(*p1, s);
                }
            }
        }
    }

    log::trace!("lifted {} nodes to {} pairs", nodes.len(), pairs.len());
    SimilarityMatrix::from_rows_unchecked(rows)
}

/// Lift pair similarities to caller-defined groups, keyed by group position.
///
/// A group is represented by its internal pairs; two groups are as similar as the
/// average pair similarity across them. Groups with fewer than two members are only
/// similar to themselves.
pub fn group_similarities(
    groups: &[BTreeSet<usize>],
    pairs: &SimilarityMatrix<NodePair>,
) -> SimilarityMatrix<usize> {
    let pairs_of: Vec<Vec<NodePair>> = groups
        .iter()
        .map(|g| {
            let members: Vec<usize> = g.iter().copied().collect();
            let mut out = Vec::new();
            for (i, &a) in members.iter().enumerate() {
                for &b in &members[i + 1..] {
                    out.push(NodePair::new(a, b));
                }
            }
            out
        })
        .collect();

    let mut rows: Vec<BTreeMap<usize, f64>> = (0..groups.len())
        .map(|g| BTreeMap::from([(g, 1.0)]))
        .collect();

    for i in 0..groups.len() {
        for j in i + 1..groups.len() {
            let (pi, pj) = (&pairs_of[i], &pairs_of[j]);
            let mut total = 0.0;
            for a in pi {
                let Some(row) = pairs.row(a) else { continue };
                for b in pj {
                    if let Some(s) = row.get(b) {
                        total += s;
                    }
                }
            }
            if total == 0.0 {
                continue;
            }
            let s = (total / (pi.len() * pj.len()) as f64).min(1.0);
            let _ = rows[i].insert(j, s);
            let _ = rows[j].insert(i, s);
        }
    }

    SimilarityMatrix::from_rows_unchecked(rows.into_iter().enumerate().collect())
}

/// [`induce`] followed by [`pair_similarities`].
pub fn induce_pairs(graph: &ConcurrenceGraph, kind: SimilarityKind) -> SimilarityMatrix<NodePair> {
    pair_similarities(&induce(graph, kind))
}

/// Group similarities for `groups` of nodes of `graph`, keyed by group position.
///
/// Fails if a member is not a node of `graph`. Groups may overlap.
pub fn induce_groups(
    graph: &ConcurrenceGraph,
    kind: SimilarityKind,
    groups: &Partition,
) -> Result<SimilarityMatrix<usize>> {
    let n = graph.node_count();
    if let Some(&node) = groups.iter().flatten().find(|&&u| u >= n) {
        return Err(Error::NodeOutOfRange { node, n });
    }
    Ok(group_similarities(groups.groups(), &induce_pairs(graph, kind)))
}
