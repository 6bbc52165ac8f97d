//! In-memory reference implementation of the storage contract.
//!
//! [`MemoryGraph`] keeps vertex and edge documents in named collections and
//! serves snapshot-consistent reads: every mutation bumps a version counter,
//! rows are stamped with the version that created them, and a lookup only
//! sees rows at or below its snapshot's watermark. Tests, benches, and
//! embedders get real snapshot semantics without a database underneath.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::StorageError;
use crate::ident::{EdgeId, VertexId};
use crate::store::{
    CollectionCatalog, CollectionId, CollectionKind, EdgeRecord, EdgeStore, LookupDirection,
    StoreSnapshot,
};

#[derive(Debug)]
struct StoredVertex {
    doc: Value,
    created_at: u64,
}

#[derive(Debug)]
struct StoredEdge {
    id: EdgeId,
    from: VertexId,
    to: VertexId,
    doc: serde_json::Map<String, Value>,
    created_at: u64,
}

#[derive(Debug)]
struct Collection {
    name: String,
    kind: CollectionKind,
    created_at: u64,
    vertices: FxHashMap<String, StoredVertex>,
    edges: Vec<StoredEdge>,
    // Adjacency over the full "collection/key" handle, one posting list per
    // physical side.
    out_index: FxHashMap<String, Vec<usize>>,
    in_index: FxHashMap<String, Vec<usize>>,
}

#[derive(Debug, Default)]
struct Inner {
    version: u64,
    by_name: FxHashMap<String, CollectionId>,
    collections: Vec<Collection>,
}

/// In-memory, snapshot-consistent document-graph store.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    inner: RwLock<Inner>,
}

impl MemoryGraph {
    /// Creates an empty store.
    pub fn new() -> Self {
        MemoryGraph::default()
    }

    /// Creates a collection. Names must be non-empty, must not contain `/`,
    /// and must be unique.
    pub fn create_collection(
        &self,
        name: &str,
        kind: CollectionKind,
    ) -> Result<CollectionId, StorageError> {
        if name.is_empty() || name.contains('/') {
            return Err(StorageError::Invalid(format!(
                "bad collection name '{name}'"
            )));
        }
        let mut inner = self.inner.write();
        if inner.by_name.contains_key(name) {
            return Err(StorageError::Invalid(format!(
                "collection '{name}' already exists"
            )));
        }
        inner.version += 1;
        let created_at = inner.version;
        let id = CollectionId(inner.collections.len() as u64);
        inner.collections.push(Collection {
            name: name.to_string(),
            kind,
            created_at,
            vertices: FxHashMap::default(),
            edges: Vec::new(),
            out_index: FxHashMap::default(),
            in_index: FxHashMap::default(),
        });
        inner.by_name.insert(name.to_string(), id);
        debug!(name, kind = %kind, id = %id, "mem.collection.created");
        Ok(id)
    }

    /// Inserts a vertex document, failing on duplicate keys.
    pub fn insert_vertex(
        &self,
        collection: &str,
        key: &str,
        doc: Value,
    ) -> Result<VertexId, StorageError> {
        let id = VertexId::parse(&format!("{collection}/{key}"))
            .map_err(|err| StorageError::Invalid(err.to_string()))?;
        let mut inner = self.inner.write();
        let cid = resolve(&inner, collection, CollectionKind::Vertex)?;
        if inner.collections[cid.0 as usize].vertices.contains_key(key) {
            return Err(StorageError::Invalid(format!(
                "duplicate vertex key '{key}' in '{collection}'"
            )));
        }
        inner.version += 1;
        let created_at = inner.version;
        inner.collections[cid.0 as usize]
            .vertices
            .insert(key.to_string(), StoredVertex { doc, created_at });
        Ok(id)
    }

    /// Inserts an edge document joining `from` and `to`. The document must
    /// be a JSON object; its attributes are what weighted lookups read.
    pub fn insert_edge(
        &self,
        collection: &str,
        key: &str,
        from: &VertexId,
        to: &VertexId,
        doc: Value,
    ) -> Result<EdgeId, StorageError> {
        let id = EdgeId::parse(&format!("{collection}/{key}"))
            .map_err(|err| StorageError::Invalid(err.to_string()))?;
        let doc = match doc {
            Value::Object(map) => map,
            other => {
                return Err(StorageError::Invalid(format!(
                    "edge document must be an object, got {other}"
                )))
            }
        };
        let mut inner = self.inner.write();
        let cid = resolve(&inner, collection, CollectionKind::Edge)?;
        // Endpoints must live in known vertex collections; their keys are
        // not required to exist yet.
        resolve(&inner, from.collection(), CollectionKind::Vertex)?;
        resolve(&inner, to.collection(), CollectionKind::Vertex)?;
        inner.version += 1;
        let created_at = inner.version;
        let col = &mut inner.collections[cid.0 as usize];
        let ix = col.edges.len();
        col.out_index
            .entry(from.as_str().to_string())
            .or_default()
            .push(ix);
        col.in_index
            .entry(to.as_str().to_string())
            .or_default()
            .push(ix);
        col.edges.push(StoredEdge {
            id: id.clone(),
            from: from.clone(),
            to: to.clone(),
            doc,
            created_at,
        });
        Ok(id)
    }

    /// Fetches a vertex document as of `snap`, or `None` when the key is
    /// unknown (or newer than the snapshot).
    pub fn vertex(
        &self,
        snap: &StoreSnapshot,
        id: &VertexId,
    ) -> Result<Option<Value>, StorageError> {
        let inner = self.inner.read();
        if snap.watermark() > inner.version {
            return Err(StorageError::SnapshotGone);
        }
        let cid = resolve(&inner, id.collection(), CollectionKind::Vertex)?;
        Ok(inner.collections[cid.0 as usize]
            .vertices
            .get(id.key())
            .filter(|row| row.created_at <= snap.watermark())
            .map(|row| row.doc.clone()))
    }

    /// Number of vertices currently in `collection`.
    pub fn vertex_count(&self, collection: &str) -> Result<usize, StorageError> {
        let inner = self.inner.read();
        let cid = resolve(&inner, collection, CollectionKind::Vertex)?;
        Ok(inner.collections[cid.0 as usize].vertices.len())
    }

    /// Number of edges currently in `collection`.
    pub fn edge_count(&self, collection: &str) -> Result<usize, StorageError> {
        let inner = self.inner.read();
        let cid = resolve(&inner, collection, CollectionKind::Edge)?;
        Ok(inner.collections[cid.0 as usize].edges.len())
    }
}

fn resolve(
    inner: &Inner,
    name: &str,
    expected: CollectionKind,
) -> Result<CollectionId, StorageError> {
    let id = inner
        .by_name
        .get(name)
        .copied()
        .ok_or_else(|| StorageError::CollectionNotFound {
            name: name.to_string(),
        })?;
    let col = &inner.collections[id.0 as usize];
    if col.kind != expected {
        return Err(StorageError::WrongCollectionKind {
            name: name.to_string(),
            expected,
        });
    }
    Ok(id)
}

impl EdgeStore for MemoryGraph {
    fn begin_read(&self) -> Result<StoreSnapshot, StorageError> {
        Ok(StoreSnapshot::new(self.inner.read().version))
    }

    fn catalog(&self, snap: &StoreSnapshot) -> Result<CollectionCatalog, StorageError> {
        let inner = self.inner.read();
        if snap.watermark() > inner.version {
            return Err(StorageError::SnapshotGone);
        }
        Ok(CollectionCatalog::from_entries(
            inner
                .collections
                .iter()
                .enumerate()
                .filter(|(_, col)| col.created_at <= snap.watermark())
                .map(|(ix, col)| (col.name.clone(), CollectionId(ix as u64), col.kind)),
        ))
    }

    fn lookup_edges(
        &self,
        snap: &StoreSnapshot,
        edge_collection: CollectionId,
        vertex: &VertexId,
        direction: LookupDirection,
        weight_field: Option<&str>,
    ) -> Result<Vec<EdgeRecord>, StorageError> {
        let inner = self.inner.read();
        if snap.watermark() > inner.version {
            return Err(StorageError::SnapshotGone);
        }
        let col = inner
            .collections
            .get(edge_collection.0 as usize)
            .filter(|col| col.created_at <= snap.watermark())
            .ok_or_else(|| {
                StorageError::ReadFailed(format!("unknown collection id {edge_collection}"))
            })?;
        if col.kind != CollectionKind::Edge {
            return Err(StorageError::WrongCollectionKind {
                name: col.name.clone(),
                expected: CollectionKind::Edge,
            });
        }
        let index = match direction {
            LookupDirection::Outbound => &col.out_index,
            LookupDirection::Inbound => &col.in_index,
        };
        let mut records = Vec::new();
        if let Some(postings) = index.get(vertex.as_str()) {
            for &ix in postings {
                let edge = &col.edges[ix];
                if edge.created_at > snap.watermark() {
                    continue;
                }
                let other = match direction {
                    LookupDirection::Outbound => edge.to.clone(),
                    LookupDirection::Inbound => edge.from.clone(),
                };
                let weight = weight_field
                    .and_then(|attr| edge.doc.get(attr))
                    .and_then(Value::as_f64);
                records.push(EdgeRecord {
                    edge: edge.id.clone(),
                    other,
                    weight_field: weight,
                });
            }
        }
        trace!(
            vertex = %vertex,
            direction = ?direction,
            rows = records.len(),
            "mem.lookup"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vid(text: &str) -> VertexId {
        VertexId::parse(text).unwrap()
    }

    fn seeded() -> MemoryGraph {
        let g = MemoryGraph::new();
        g.create_collection("persons", CollectionKind::Vertex)
            .unwrap();
        g.create_collection("knows", CollectionKind::Edge).unwrap();
        g.insert_vertex("persons", "alice", json!({})).unwrap();
        g.insert_vertex("persons", "bob", json!({})).unwrap();
        g.insert_edge(
            "knows",
            "ab",
            &vid("persons/alice"),
            &vid("persons/bob"),
            json!({"cost": 2.5, "label": "friend"}),
        )
        .unwrap();
        g
    }

    #[test]
    fn lookup_serves_both_physical_sides() -> Result<(), StorageError> {
        let g = seeded();
        let snap = g.begin_read()?;
        let knows = g.catalog(&snap)?.expect_edge("knows")?;

        let out = g.lookup_edges(&snap, knows, &vid("persons/alice"), LookupDirection::Outbound, None)?;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].other, vid("persons/bob"));
        assert_eq!(out[0].weight_field, None);

        let inbound = g.lookup_edges(&snap, knows, &vid("persons/bob"), LookupDirection::Inbound, None)?;
        assert_eq!(inbound.len(), 1);
        assert_eq!(inbound[0].other, vid("persons/alice"));

        let none = g.lookup_edges(&snap, knows, &vid("persons/bob"), LookupDirection::Outbound, None)?;
        assert!(none.is_empty());
        Ok(())
    }

    #[test]
    fn weight_attribute_extraction_is_numeric_only() -> Result<(), StorageError> {
        let g = seeded();
        let snap = g.begin_read()?;
        let knows = g.catalog(&snap)?.expect_edge("knows")?;
        let alice = vid("persons/alice");

        let rows = g.lookup_edges(&snap, knows, &alice, LookupDirection::Outbound, Some("cost"))?;
        assert_eq!(rows[0].weight_field, Some(2.5));

        let rows = g.lookup_edges(&snap, knows, &alice, LookupDirection::Outbound, Some("label"))?;
        assert_eq!(rows[0].weight_field, None);

        let rows = g.lookup_edges(&snap, knows, &alice, LookupDirection::Outbound, Some("absent"))?;
        assert_eq!(rows[0].weight_field, None);
        Ok(())
    }

    #[test]
    fn vertex_reads_are_snapshot_scoped() -> Result<(), StorageError> {
        let g = seeded();
        let snap = g.begin_read()?;
        g.insert_vertex("persons", "carol", json!({"age": 30}))?;
        assert_eq!(g.vertex(&snap, &vid("persons/carol"))?, None);
        let fresh = g.begin_read()?;
        assert_eq!(
            g.vertex(&fresh, &vid("persons/carol"))?,
            Some(json!({"age": 30}))
        );
        assert!(g.vertex(&fresh, &vid("persons/ghost"))?.is_none());
        Ok(())
    }

    #[test]
    fn snapshot_hides_later_writes() -> Result<(), StorageError> {
        let g = seeded();
        let snap = g.begin_read()?;
        g.insert_edge(
            "knows",
            "ba",
            &vid("persons/bob"),
            &vid("persons/alice"),
            json!({}),
        )?;
        let knows = g.catalog(&snap)?.expect_edge("knows")?;
        let rows = g.lookup_edges(&snap, knows, &vid("persons/bob"), LookupDirection::Outbound, None)?;
        assert!(rows.is_empty(), "edge inserted after the snapshot leaked in");

        let fresh = g.begin_read()?;
        let rows = g.lookup_edges(&fresh, knows, &vid("persons/bob"), LookupDirection::Outbound, None)?;
        assert_eq!(rows.len(), 1);
        Ok(())
    }

    #[test]
    fn catalog_is_versioned_too() -> Result<(), StorageError> {
        let g = seeded();
        let snap = g.begin_read()?;
        g.create_collection("likes", CollectionKind::Edge)?;
        assert!(g.catalog(&snap)?.get("likes").is_none());
        let fresh = g.begin_read()?;
        assert!(g.catalog(&fresh)?.get("likes").is_some());
        Ok(())
    }

    #[test]
    fn foreign_snapshot_tokens_are_rejected() {
        let g = seeded();
        let bogus = StoreSnapshot::new(u64::MAX);
        assert!(matches!(
            g.catalog(&bogus),
            Err(StorageError::SnapshotGone)
        ));
    }

    #[test]
    fn mutators_validate_collections_and_keys() {
        let g = seeded();
        assert!(matches!(
            g.create_collection("persons", CollectionKind::Vertex),
            Err(StorageError::Invalid(_))
        ));
        assert!(matches!(
            g.create_collection("a/b", CollectionKind::Vertex),
            Err(StorageError::Invalid(_))
        ));
        assert!(matches!(
            g.insert_vertex("knows", "x", json!({})),
            Err(StorageError::WrongCollectionKind { .. })
        ));
        assert!(matches!(
            g.insert_vertex("persons", "alice", json!({})),
            Err(StorageError::Invalid(_))
        ));
        assert!(matches!(
            g.insert_edge(
                "knows",
                "xx",
                &vid("ghosts/a"),
                &vid("persons/bob"),
                json!({})
            ),
            Err(StorageError::CollectionNotFound { .. })
        ));
        assert_eq!(g.vertex_count("persons").unwrap(), 2);
        assert_eq!(g.edge_count("knows").unwrap(), 1);
    }
}
