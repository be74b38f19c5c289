//! Core error types for netmotif operations.
//!
//! Two families matter to callers: validation errors, raised before any
//! computation starts and never partially processed, and computation
//! errors, raised when an algorithm cannot finish.

use thiserror::Error;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input: dangling endpoints, duplicate ids, bad edge lists.
    Validation,
    /// Internal failure while an algorithm was running.
    Computation,
    /// The job was abandoned by its owner before it finished.
    Cancelled,
}

/// Core error type for netmotif operations.
#[derive(Debug, Error)]
pub enum Error {
    // Validation errors
    #[error("edge {edge_index} references unknown node '{endpoint}'")]
    DanglingEndpoint { endpoint: String, edge_index: usize },

    #[error("duplicate node id '{id}'")]
    DuplicateNode { id: String },

    #[error("node id '{id}' cannot be written to an edge list: {reason}")]
    UnwritableNodeId { id: String, reason: String },

    #[error("edge list parse error on line {line}: {reason}")]
    EdgeListParse { line: usize, reason: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // Computation errors
    #[error("computation failed: {reason}")]
    ComputationFailed { reason: String },

    #[error("generation cancelled")]
    Cancelled,
}

impl Error {
    /// Create a dangling endpoint error.
    pub fn dangling_endpoint(endpoint: impl Into<String>, edge_index: usize) -> Self {
        Self::DanglingEndpoint {
            endpoint: endpoint.into(),
            edge_index,
        }
    }

    /// Create a duplicate node error.
    pub fn duplicate_node(id: impl Into<String>) -> Self {
        Self::DuplicateNode { id: id.into() }
    }

    /// Create an error for a node id the edge-list format cannot carry.
    pub fn unwritable_node_id(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnwritableNodeId {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create an edge list parse error for a 1-based line number.
    pub fn edge_list_parse(line: usize, reason: impl Into<String>) -> Self {
        Self::EdgeListParse {
            line,
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a computation error.
    pub fn computation(reason: impl Into<String>) -> Self {
        Self::ComputationFailed {
            reason: reason.into(),
        }
    }

    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DanglingEndpoint { .. }
            | Self::DuplicateNode { .. }
            | Self::UnwritableNodeId { .. }
            | Self::EdgeListParse { .. }
            | Self::InvalidConfig { .. } => ErrorKind::Validation,
            Self::ComputationFailed { .. } => ErrorKind::Computation,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// True for errors caused by malformed input.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dangling_endpoint_names_the_endpoint() {
        let err = Error::dangling_endpoint("Z", 3);
        assert!(err.to_string().contains("'Z'"));
        assert!(err.to_string().contains("edge 3"));
        assert!(err.is_validation());
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(Error::duplicate_node("a").kind(), ErrorKind::Validation);
        assert_eq!(Error::edge_list_parse(2, "x").kind(), ErrorKind::Validation);
        assert_eq!(Error::computation("boom").kind(), ErrorKind::Computation);
        assert_eq!(Error::Cancelled.kind(), ErrorKind::Cancelled);
        assert_eq!(
            Error::unwritable_node_id("a b", "contains whitespace").kind(),
            ErrorKind::Validation
        );
        assert!(!Error::computation("boom").is_validation());
    }
}
