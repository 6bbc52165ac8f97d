//! Edge expansion: from a vertex to its deduplicated neighbor steps.
//!
//! An expander is bound at construction to one edge collection, one traversal
//! direction, and one weighting policy, and holds no search state at all, so
//! the forward and backward searches of a query may call their expanders
//! concurrently under the shared read snapshot.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Result, TraverseError};
use crate::ident::{EdgeId, VertexId};
use crate::store::{CollectionId, EdgeStore, LookupDirection, QueryContext};

/// Which logical side(s) of a vertex an expander walks.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum Direction {
    /// Edges leaving the vertex.
    Outbound,
    /// Edges arriving at the vertex.
    Inbound,
    /// Both, treating the graph as undirected.
    Any,
}

impl Direction {
    /// Whether expansion reads the outbound side.
    pub fn includes_out(&self) -> bool {
        matches!(self, Direction::Outbound | Direction::Any)
    }

    /// Whether expansion reads the inbound side.
    pub fn includes_in(&self) -> bool {
        matches!(self, Direction::Inbound | Direction::Any)
    }

    /// The direction a backward search walks when the forward search walks
    /// `self`.
    pub fn reversed(self) -> Direction {
        match self {
            Direction::Outbound => Direction::Inbound,
            Direction::Inbound => Direction::Outbound,
            Direction::Any => Direction::Any,
        }
    }
}

/// How a step's weight is derived from the edge document.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum Weighting {
    /// Every step costs 1.
    Uniform,
    /// The named edge attribute carries the weight; an edge without a usable
    /// numeric value is an error, never a silent default.
    Attribute {
        /// Edge document attribute to read.
        field: String,
    },
}

impl Weighting {
    /// The attribute a weighted lookup must surface, if any.
    pub fn attribute(&self) -> Option<&str> {
        match self {
            Weighting::Uniform => None,
            Weighting::Attribute { field } => Some(field),
        }
    }
}

/// One discovered hop. `from`/`to` are oriented in the forward sense of the
/// logical graph no matter which physical side produced the edge.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    /// Tail vertex in forward orientation.
    pub from: VertexId,
    /// Head vertex in forward orientation.
    pub to: VertexId,
    /// Non-negative hop weight.
    pub weight: f64,
    /// Edge document backing the hop.
    pub edge: EdgeId,
}

impl Step {
    /// The endpoint that is not `vertex`. Callers only hand in the vertex
    /// the step was expanded from, so exactly one endpoint matches.
    pub fn neighbor_of(&self, vertex: &VertexId) -> &VertexId {
        if self.from == *vertex {
            &self.to
        } else {
            &self.from
        }
    }
}

/// Neighbor discovery, the only thing the search algorithm knows about
/// storage. Implementations must be stateless with respect to search
/// progress; `Send + Sync` lets both search sides expand concurrently.
pub trait Expander: Send + Sync {
    /// Produces the deduplicated steps leaving `vertex`: at most one step per
    /// distinct neighbor (minimum weight wins), self-loops excluded.
    fn expand(&self, vertex: &VertexId) -> Result<Vec<Step>>;
}

/// [`Expander`] over document collections: queries one edge collection
/// through the storage contract and normalizes rows into [`Step`]s.
pub struct DocumentExpander {
    store: Arc<dyn EdgeStore>,
    ctx: Arc<QueryContext>,
    collection: CollectionId,
    collection_name: String,
    direction: Direction,
    weighting: Weighting,
}

impl DocumentExpander {
    /// Binds an expander to `edge_collection`, failing early when the
    /// catalog does not know it as an edge collection.
    pub fn new(
        store: Arc<dyn EdgeStore>,
        ctx: Arc<QueryContext>,
        edge_collection: &str,
        direction: Direction,
        weighting: Weighting,
    ) -> Result<Self> {
        let collection = ctx.catalog().expect_edge(edge_collection)?;
        Ok(DocumentExpander {
            store,
            ctx,
            collection,
            collection_name: edge_collection.to_string(),
            direction,
            weighting,
        })
    }

    /// The direction this expander walks.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    fn step_weight(&self, edge: &EdgeId, surfaced: Option<f64>) -> Result<f64> {
        let field = match &self.weighting {
            Weighting::Uniform => return Ok(1.0),
            Weighting::Attribute { field } => field,
        };
        let weight = surfaced.filter(|w| w.is_finite()).ok_or_else(|| {
            TraverseError::MissingWeight {
                edge: edge.clone(),
                attribute: field.clone(),
            }
        })?;
        if weight < 0.0 {
            return Err(TraverseError::NegativeWeight {
                edge: edge.clone(),
                weight,
            });
        }
        Ok(weight)
    }
}

// The store handle is a trait object, so Debug is written out by hand over
// the configuration fields.
impl fmt::Debug for DocumentExpander {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentExpander")
            .field("collection", &self.collection_name)
            .field("direction", &self.direction)
            .field("weighting", &self.weighting)
            .finish_non_exhaustive()
    }
}

impl Expander for DocumentExpander {
    fn expand(&self, vertex: &VertexId) -> Result<Vec<Step>> {
        self.ctx.catalog().expect_vertex(vertex.collection())?;

        let mut sides: Vec<LookupDirection> = Vec::with_capacity(2);
        if self.direction.includes_out() {
            sides.push(LookupDirection::Outbound);
        }
        if self.direction.includes_in() {
            sides.push(LookupDirection::Inbound);
        }

        // First-encounter slots keep the output order deterministic while a
        // cheaper parallel edge may still replace a slot's content.
        let mut steps: Vec<Step> = Vec::new();
        let mut slot_of: FxHashMap<VertexId, usize> = FxHashMap::default();

        for side in sides {
            let records = self.store.lookup_edges(
                self.ctx.snapshot(),
                self.collection,
                vertex,
                side,
                self.weighting.attribute(),
            )?;
            for record in records {
                if record.other == *vertex {
                    continue;
                }
                let weight = self.step_weight(&record.edge, record.weight_field)?;
                let (from, to) = match side {
                    LookupDirection::Outbound => (vertex.clone(), record.other.clone()),
                    LookupDirection::Inbound => (record.other.clone(), vertex.clone()),
                };
                match slot_of.get(&record.other) {
                    None => {
                        slot_of.insert(record.other, steps.len());
                        steps.push(Step {
                            from,
                            to,
                            weight,
                            edge: record.edge,
                        });
                    }
                    Some(&ix) if weight < steps[ix].weight => {
                        trace!(
                            neighbor = %record.other,
                            kept = %record.edge,
                            dropped = %steps[ix].edge,
                            "expand.dedup_drop"
                        );
                        steps[ix] = Step {
                            from,
                            to,
                            weight,
                            edge: record.edge,
                        };
                    }
                    Some(_) => {}
                }
            }
        }

        trace!(
            vertex = %vertex,
            collection = %self.collection_name,
            steps = steps.len(),
            "expand.steps"
        );
        Ok(steps)
    }
}
