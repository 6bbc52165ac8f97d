//! Error taxonomy shared across the crate.

use crate::ident::EdgeId;
use crate::store::CollectionKind;

/// Malformed `"collection/key"` text, rejected before it can enter a search.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdParseError {
    /// No `/` separator between collection name and key.
    #[error("document id '{text}' is missing the '/' separator")]
    MissingSeparator {
        /// The rejected input.
        text: String,
    },
    /// The collection component is empty.
    #[error("document id '{text}' has an empty collection name")]
    EmptyCollection {
        /// The rejected input.
        text: String,
    },
    /// The key component is empty.
    #[error("document id '{text}' has an empty key")]
    EmptyKey {
        /// The rejected input.
        text: String,
    },
}

impl IdParseError {
    /// The input that failed to parse.
    pub fn text(&self) -> &str {
        match self {
            IdParseError::MissingSeparator { text }
            | IdParseError::EmptyCollection { text }
            | IdParseError::EmptyKey { text } => text,
        }
    }
}

/// Failure reported by the storage collaborator.
///
/// The engine treats these as opaque: any storage failure aborts the
/// in-progress search, and retry policy belongs to the store or the caller.
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    /// The named collection does not exist in the catalog.
    #[error("collection '{name}' not found")]
    CollectionNotFound {
        /// Requested collection name.
        name: String,
    },
    /// The named collection exists but holds the wrong kind of document.
    #[error("collection '{name}' is not a {expected} collection")]
    WrongCollectionKind {
        /// Requested collection name.
        name: String,
        /// Kind the operation required.
        expected: CollectionKind,
    },
    /// The read snapshot is no longer serviceable by the store.
    #[error("read snapshot is no longer valid")]
    SnapshotGone,
    /// A store request carried an argument the store rejects.
    #[error("invalid argument: {0}")]
    Invalid(String),
    /// Any other read-side failure, described by the store.
    #[error("storage read failed: {0}")]
    ReadFailed(String),
    /// Underlying I/O failure.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Caller-facing error for a shortest-path query.
///
/// "No path found" is not an error; it is the `Ok(None)` result.
#[derive(thiserror::Error, Debug)]
pub enum TraverseError {
    /// A vertex or edge id failed validation.
    #[error(transparent)]
    InvalidId(#[from] IdParseError),
    /// The storage collaborator failed mid-search; no partial path is kept.
    #[error("traversal aborted by storage: {0}")]
    Storage(#[from] StorageError),
    /// Attributed weighting found no usable numeric value on an edge.
    #[error("edge '{edge}' has no numeric '{attribute}' attribute usable as a weight")]
    MissingWeight {
        /// The offending edge document.
        edge: EdgeId,
        /// The configured weight attribute.
        attribute: String,
    },
    /// An edge carried a negative weight, which the algorithm's
    /// preconditions exclude.
    #[error("edge '{edge}' carries negative weight {weight}")]
    NegativeWeight {
        /// The offending edge document.
        edge: EdgeId,
        /// The rejected value.
        weight: f64,
    },
    /// Reconstructed path weight disagrees with the cost the search settled
    /// on. Indicates a defect in expansion or relaxation, never a user error.
    #[error("reconstructed path weight {found} does not match search cost {expected}")]
    PathMismatch {
        /// Cost recorded at the meeting vertex.
        expected: f64,
        /// Sum of per-hop weights along the assembled path.
        found: f64,
    },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TraverseError>;
