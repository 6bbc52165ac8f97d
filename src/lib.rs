//! Bidirectional shortest-path traversal over property-graph collections.
//!
//! Vereda layers weighted graph search on top of a snapshot-reading document
//! store. Vertices and edges live in named collections, edges carry JSON
//! documents, and a search reaches storage only through [`Expander`]s, each
//! bound to one edge collection, a direction, and a weighting. Two expanders
//! walking toward each other drive [`Traverser::shortest_path`].
//!
//! ```
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use vereda::{
//!     CollectionKind, Direction, DocumentExpander, EdgeStore, MemoryGraph, QueryContext,
//!     Traverser, Weighting,
//! };
//!
//! fn main() -> vereda::Result<()> {
//!     let graph = Arc::new(MemoryGraph::new());
//!     graph.create_collection("places", CollectionKind::Vertex)?;
//!     graph.create_collection("roads", CollectionKind::Edge)?;
//!     let a = graph.insert_vertex("places", "a", json!({}))?;
//!     let b = graph.insert_vertex("places", "b", json!({}))?;
//!     let c = graph.insert_vertex("places", "c", json!({}))?;
//!     graph.insert_edge("roads", "ab", &a, &b, json!({ "km": 2.0 }))?;
//!     graph.insert_edge("roads", "bc", &b, &c, json!({ "km": 3.0 }))?;
//!     graph.insert_edge("roads", "ac", &a, &c, json!({ "km": 9.0 }))?;
//!
//!     let ctx = Arc::new(QueryContext::open(graph.as_ref())?);
//!     let store: Arc<dyn EdgeStore> = graph;
//!     let weighting = Weighting::Attribute { field: "km".into() };
//!     let forward = DocumentExpander::new(
//!         store.clone(),
//!         ctx.clone(),
//!         "roads",
//!         Direction::Outbound,
//!         weighting.clone(),
//!     )?;
//!     let backward =
//!         DocumentExpander::new(store, ctx, "roads", Direction::Inbound, weighting)?;
//!
//!     let mut traverser = Traverser::new(forward, backward);
//!     let path = traverser.shortest_path(&a, &c)?.expect("a reaches c");
//!     assert_eq!(path.weight, 5.0);
//!     assert_eq!(path.vertices, vec![a, b, c]);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod expand;
pub mod ident;
pub mod store;
pub mod traverse;

pub use error::{IdParseError, Result, StorageError, TraverseError};
pub use expand::{Direction, DocumentExpander, Expander, Step, Weighting};
pub use ident::{EdgeId, VertexId};
pub use store::memory::MemoryGraph;
pub use store::{
    CollectionCatalog, CollectionId, CollectionKind, EdgeRecord, EdgeStore, LookupDirection,
    QueryContext, StoreSnapshot,
};
pub use traverse::{Path, TraverseOptions, Traverser};
