//! Similarity-based clustering of nodes, node pairs and groups.
//!
//! Both algorithms work on a [`SimilarityMatrix`](crate::similarity::SimilarityMatrix)
//! and are parameterized by the [`SimilarityKind`](crate::similarity::SimilarityKind)
//! used to derive it from a concurrence graph. Each offers the same four entry points:
//!
//! | Method | Subjects |
//! |--------|----------|
//! | `fit_nodes` | graph nodes |
//! | `fit_pairs` | unordered node pairs with a stored similarity |
//! | `fit_groups` | caller-defined node groups, by position |
//! | `fit_matrix` | any caller-supplied similarity matrix |
//!
//! Both always return a complete partition of their subjects: anything not clustered
//! is a singleton.
//!
//! ## Algorithms
//!
//! ### DBSCAN
//!
//! Density-based: subjects with at least `min_pts` neighbors (`sim + ε >= 1`) are core
//! and grow clusters through each other. Border subjects join the first cluster that
//! reaches them.
//!
//! ### Single Linkage
//!
//! Agglomerative: merge the closest clusters until the closest pair is more than `ε`
//! apart, with `distance = 1 − sim`. [`SingleLinkage::dendrogram_matrix`] records the
//! complete merge history as a [`Dendrogram`] you can cut at any height.
//!
//! | Linkage | Distance | Effect |
//! |---------|----------|--------|
//! | Single | min(pairwise) | Chaining; elongated clusters |
//!
//! ## Usage
//!
//! ```rust
//! use concur::cluster::{Dbscan, SingleLinkage};
//! use concur::ConcurrenceGraph;
//!
//! let graph = ConcurrenceGraph::from_edges(
//!     4,
//!     [(0, 1, 5), (2, 3, 5), (1, 2, 1)],
//! )
//! .unwrap();
//!
//! let dense = Dbscan::new(0.5, 2).fit_nodes(&graph).unwrap();
//! let linked = SingleLinkage::new(0.5).fit_nodes(&graph).unwrap();
//! assert_eq!(dense.canonical(), linked.canonical());
//! ```

mod dbscan;
mod dendrogram;
mod hierarchical;

pub use dbscan::Dbscan;
pub use dendrogram::{Dendrogram, Merge};
pub use hierarchical::SingleLinkage;
