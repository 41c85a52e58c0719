//! # concur
//!
//! Clustering of concurrence graphs: nodes are subjects, integer weights count how often
//! two subjects occur together.
//!
//! - [`graph`]: the validated, symmetric [`ConcurrenceGraph`] with per-node statistics
//!   and aggregation.
//! - [`similarity`]: five transforms from concurrences to `[0, 1]` similarities, lifted to
//!   node pairs and caller-defined groups.
//! - [`community`]: modularity and CPM quality functions optimized by multi-resolution
//!   local moving ([`Louvain`], [`Leiden`]).
//! - [`cluster`]: DBSCAN and single-linkage clustering of nodes, pairs and groups.
//!
//! ```rust
//! use concur::{CommunityDetection, ConcurrenceGraph, Louvain, Modularity, Partition};
//!
//! let graph = ConcurrenceGraph::from_edges(
//!     6,
//!     [(0, 1, 10), (1, 2, 10), (0, 2, 10), (3, 4, 10), (4, 5, 10), (3, 5, 10), (1, 3, 1)],
//! )
//! .unwrap();
//!
//! let groups = Louvain::new().detect_from_singletons(&Modularity::new(graph)).unwrap();
//! assert_eq!(groups.canonical(), Partition::from_groups([vec![0, 1, 2], vec![3, 4, 5]]));
//! ```
//!
//! The library logs through the `log` facade and never installs a logger.

pub mod cluster;
pub mod community;
/// Error types used across `concur`.
pub mod error;
pub mod graph;
pub mod partition;
pub mod similarity;

pub use error::{Error, Result};
pub use graph::{ConcurrenceGraph, Concurrences, Weight};
pub use partition::Partition;
pub use similarity::{NodePair, SimilarityKind, SimilarityMatrix};

pub use cluster::{Dbscan, Dendrogram, SingleLinkage};
pub use community::{
    CommunityDetection, Cpm, Leiden, LocalMoving, Louvain, Modularity, OptimizerConfig,
    Quality, QualityModel,
};
