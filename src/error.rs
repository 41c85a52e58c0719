/// Result alias for `concur`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by graph construction, partition handling and the clustering entry points.
///
/// Every variant is a precondition violation: the computation that produced it is abandoned
/// and no partial result is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// `weight(u, v)` and `weight(v, u)` disagree (or one of them is missing).
    #[error("asymmetric concurrence between {u} and {v}")]
    AsymmetricConcurrence {
        /// First endpoint.
        u: usize,
        /// Second endpoint.
        v: usize,
    },

    /// A node id is not in `0..n`.
    #[error("node {node} out of range (n = {n})")]
    NodeOutOfRange {
        /// Offending id.
        node: usize,
        /// Node count of the graph.
        n: usize,
    },

    /// A concurrence of a node with itself.
    #[error("self concurrence at node {node}")]
    SelfLoop {
        /// Offending node.
        node: usize,
    },

    /// A node was placed in more than one group.
    #[error("node {node} is in multiple groups")]
    DuplicateAssignment {
        /// Offending node.
        node: usize,
    },

    /// A complete partition was required but a node is not covered.
    #[error("node {node} is not assigned to any group")]
    IncompletePartition {
        /// First uncovered node.
        node: usize,
    },

    /// A group index is not in `0..len`.
    #[error("group {group} out of range ({len} groups)")]
    GroupOutOfRange {
        /// Offending index.
        group: usize,
        /// Number of groups.
        len: usize,
    },

    /// A similarity matrix references a subject that has no row.
    #[error("similarity matrix has no row for {key}")]
    MissingSimilarityRow {
        /// Debug rendering of the subject.
        key: String,
    },

    /// `sim(a, b) != sim(b, a)`.
    #[error("asymmetric similarity between {key_a} and {key_b}")]
    AsymmetricSimilarity {
        /// Debug rendering of the first subject.
        key_a: String,
        /// Debug rendering of the second subject.
        key_b: String,
    },

    /// A similarity is not a finite value in `[0, 1]`.
    #[error("similarity {value} is outside [0, 1]")]
    SimilarityOutOfRange {
        /// Offending value.
        value: f64,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// An optimizer option token that is not one of the six known tokens.
    #[error("unknown optimizer option '{0}'")]
    UnknownOption(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let e = Error::NodeOutOfRange { node: 7, n: 5 };
        assert_eq!(e.to_string(), "node 7 out of range (n = 5)");

        let e = Error::InvalidParameter {
            name: "epsilon",
            message: "must be finite and non-negative",
        };
        assert_eq!(
            e.to_string(),
            "invalid parameter 'epsilon': must be finite and non-negative"
        );
    }
}
