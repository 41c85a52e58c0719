//! Community detection by quality optimization.
//!
//! Given a concurrence graph, find groups whose internal weight is high compared to
//! what a null model predicts.
//!
//! ## Quality Functions
//!
//! **Modularity** compares internal weight with the expectation under a random graph
//! with the same strengths:
//!
//! ```text
//! Q = (1/W) × Σ_g [Σ_{i,j∈g} w_ij − r × K_g² / W]
//! ```
//!
//! **CPM** (Constant Potts Model) replaces the null model with a size penalty:
//!
//! ```text
//! Q = Σ_g [Σ_{i,j∈g} w_ij − r × S_g²]
//! ```
//!
//! ## The Resolution Parameter r
//!
//! - **r = 1**: standard modularity
//! - **r > 1**: smaller groups
//! - **r < 1**: larger groups
//!
//! For CPM, `r` acts as a density threshold: groups only form where the average
//! internal weight per member pair exceeds it.
//!
//! ## Algorithms
//!
//! [`Louvain`] and [`Leiden`] share one [`LocalMoving`] engine (local moving, compaction,
//! aggregation). Selector, resolution mode and shuffling are configured through
//! [`OptimizerConfig`] or the builder methods.
//!
//! ## Usage
//!
//! ```rust
//! use concur::community::{CommunityDetection, Louvain, Modularity};
//! use concur::ConcurrenceGraph;
//!
//! let graph = ConcurrenceGraph::from_edges(3, [(0, 1, 2), (1, 2, 2), (0, 2, 2)]).unwrap();
//! let model = Modularity::new(graph);
//!
//! let groups = Louvain::new().detect_from_singletons(&model).unwrap();
//! assert_eq!(groups.len(), 1);
//! ```
//!
//! ## References
//!
//! - Traag, Waltman, van Eck (2019). "From Louvain to Leiden: guaranteeing
//!   well-connected communities." Scientific Reports 9, 5233.
//! - Blondel et al. (2008). "Fast unfolding of communities in large networks."
//! - Newman & Girvan (2004). "Finding and evaluating community structure in networks."
//! - Traag, Van Dooren, Nesterov (2011). "Narrow scope for resolution-limit-free
//!   community detection." Physical Review E 84, 016114.

mod config;
mod leiden;
mod louvain;
mod optimizer;
mod quality;
mod traits;

pub use config::{OptimizerConfig, OptimizerOption, ResolutionMode, Selector};
pub use leiden::Leiden;
pub use louvain::Louvain;
pub use optimizer::{LocalMoving, MIN_GAIN};
pub use quality::{Cpm, Modularity, QualityModel};
pub use traits::{CommunityDetection, GroupTotals, Quality};
