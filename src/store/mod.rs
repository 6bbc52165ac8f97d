//! Storage collaborator contract.
//!
//! The engine never talks to a database directly: it sees storage through the
//! [`EdgeStore`] trait, reads everything under one [`StoreSnapshot`], and
//! resolves collection names through the immutable [`CollectionCatalog`]
//! captured in a [`QueryContext`] when the query starts. Both search
//! directions of one query share that context, so forward and backward
//! expansion observe the same graph state without any shared mutable
//! resolver.

pub mod memory;

use std::fmt;

use rustc_hash::FxHashMap;

use crate::error::StorageError;
use crate::ident::{EdgeId, VertexId};

/// Numeric handle a store assigns to a collection.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct CollectionId(pub u64);

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// What a collection holds.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CollectionKind {
    /// Vertex documents.
    Vertex,
    /// Edge documents, each joining two vertices.
    Edge,
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKind::Vertex => f.write_str("vertex"),
            CollectionKind::Edge => f.write_str("edge"),
        }
    }
}

/// Physical direction of an edge lookup. The logical `Any` direction is the
/// expander's concern; a store is only ever asked one side at a time.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LookupDirection {
    /// Edges whose `from` endpoint is the queried vertex.
    Outbound,
    /// Edges whose `to` endpoint is the queried vertex.
    Inbound,
}

/// One raw edge row returned by a lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeRecord {
    /// The edge document behind this row.
    pub edge: EdgeId,
    /// The endpoint that is not the queried vertex.
    pub other: VertexId,
    /// Numeric value of the weight attribute the lookup was asked to
    /// surface; `None` when the attribute is absent or non-numeric.
    pub weight_field: Option<f64>,
}

/// Opaque read-snapshot token issued by [`EdgeStore::begin_read`].
///
/// The engine never inspects the watermark; it only carries the token back
/// into every read so the store can serve a consistent view.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct StoreSnapshot {
    watermark: u64,
}

impl StoreSnapshot {
    /// Creates a token around a store-defined watermark. Only store
    /// implementations call this.
    pub fn new(watermark: u64) -> Self {
        StoreSnapshot { watermark }
    }

    /// The store-defined watermark this token pins.
    pub fn watermark(&self) -> u64 {
        self.watermark
    }
}

/// Immutable name → (id, kind) mapping captured when a query starts.
#[derive(Clone, Debug, Default)]
pub struct CollectionCatalog {
    by_name: FxHashMap<String, (CollectionId, CollectionKind)>,
}

impl CollectionCatalog {
    /// Builds a catalog from `(name, id, kind)` rows.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (String, CollectionId, CollectionKind)>,
    ) -> Self {
        let by_name = entries
            .into_iter()
            .map(|(name, id, kind)| (name, (id, kind)))
            .collect();
        CollectionCatalog { by_name }
    }

    /// Looks a collection up by name.
    pub fn get(&self, name: &str) -> Option<(CollectionId, CollectionKind)> {
        self.by_name.get(name).copied()
    }

    /// Resolves `name` as an edge collection.
    pub fn expect_edge(&self, name: &str) -> Result<CollectionId, StorageError> {
        self.expect_kind(name, CollectionKind::Edge)
    }

    /// Resolves `name` as a vertex collection.
    pub fn expect_vertex(&self, name: &str) -> Result<CollectionId, StorageError> {
        self.expect_kind(name, CollectionKind::Vertex)
    }

    fn expect_kind(
        &self,
        name: &str,
        expected: CollectionKind,
    ) -> Result<CollectionId, StorageError> {
        match self.get(name) {
            None => Err(StorageError::CollectionNotFound {
                name: name.to_string(),
            }),
            Some((_, kind)) if kind != expected => Err(StorageError::WrongCollectionKind {
                name: name.to_string(),
                expected,
            }),
            Some((id, _)) => Ok(id),
        }
    }

    /// Number of known collections.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Read-side contract the engine consumes. Implementations must serve every
/// lookup for a given snapshot from the same consistent view, even while
/// writers proceed.
pub trait EdgeStore: Send + Sync {
    /// Opens a consistent read snapshot covering the vertex and edge
    /// collections.
    fn begin_read(&self) -> Result<StoreSnapshot, StorageError>;

    /// The collection catalog as of `snap`.
    fn catalog(&self, snap: &StoreSnapshot) -> Result<CollectionCatalog, StorageError>;

    /// Lists the edges of `edge_collection` incident to `vertex` on one
    /// physical side, as of `snap`. When `weight_field` names an attribute,
    /// each record surfaces that attribute's numeric value.
    fn lookup_edges(
        &self,
        snap: &StoreSnapshot,
        edge_collection: CollectionId,
        vertex: &VertexId,
        direction: LookupDirection,
        weight_field: Option<&str>,
    ) -> Result<Vec<EdgeRecord>, StorageError>;
}

/// Per-query read context: one snapshot, one catalog, built once when the
/// query starts and shared (by `Arc`) between the forward and backward
/// expanders.
#[derive(Clone, Debug)]
pub struct QueryContext {
    snapshot: StoreSnapshot,
    catalog: CollectionCatalog,
}

impl QueryContext {
    /// Opens a snapshot on `store` and captures its catalog.
    pub fn open(store: &dyn EdgeStore) -> Result<Self, StorageError> {
        let snapshot = store.begin_read()?;
        let catalog = store.catalog(&snapshot)?;
        Ok(QueryContext { snapshot, catalog })
    }

    /// The pinned read snapshot.
    pub fn snapshot(&self) -> &StoreSnapshot {
        &self.snapshot
    }

    /// The immutable collection catalog.
    pub fn catalog(&self) -> &CollectionCatalog {
        &self.catalog
    }
}
