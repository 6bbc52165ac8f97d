//! The path result and its assembly from two predecessor chains.

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{Result, TraverseError};
use crate::ident::{EdgeId, VertexId};
use crate::traverse::frontier::Frontier;

/// Relative tolerance for the reconstructed-weight check. Weight totals are
/// floating-point sums taken in different association orders by the search
/// and by reconstruction, so exact equality is only guaranteed for integral
/// weights.
const WEIGHT_TOLERANCE: f64 = 1e-9;

/// A minimum-weight path between two vertices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// Vertices in travel order; the start is first, the target last.
    pub vertices: Vec<VertexId>,
    /// Edges in travel order; `edges[i]` joins `vertices[i]` and
    /// `vertices[i + 1]`.
    pub edges: Vec<EdgeId>,
    /// Total weight: the sum of the traversed edges' weights.
    pub weight: f64,
}

impl Path {
    /// The zero-weight path from a vertex to itself.
    pub(crate) fn trivial(vertex: VertexId) -> Self {
        Path {
            vertices: vec![vertex],
            edges: Vec::new(),
            weight: 0.0,
        }
    }

    /// Number of hops.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether this is the trivial single-vertex path.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Stitches the two predecessor chains at `meeting` into one forward-ordered
/// path and re-derives the total weight from the per-hop weights, comparing
/// it against the cost the search settled on.
pub(crate) fn assemble(
    forward: &Frontier,
    backward: &Frontier,
    meeting: &VertexId,
    best_cost: f64,
) -> Result<Path> {
    let mut vertices = vec![meeting.clone()];
    let mut edges = Vec::new();
    let mut recomputed = 0.0;

    // Forward chain runs meeting -> start; reverse it into travel order.
    let mut cursor = meeting.clone();
    while let Some(link) = forward.predecessor(&cursor) {
        edges.push(link.edge.clone());
        recomputed += link.weight;
        cursor = link.vertex.clone();
        vertices.push(cursor.clone());
    }
    vertices.reverse();
    edges.reverse();

    // Backward links already point toward the target, so the tail appends in
    // travel order, with the meeting vertex counted once.
    let mut cursor = meeting.clone();
    while let Some(link) = backward.predecessor(&cursor) {
        edges.push(link.edge.clone());
        recomputed += link.weight;
        cursor = link.vertex.clone();
        vertices.push(cursor.clone());
    }

    if (recomputed - best_cost).abs() > WEIGHT_TOLERANCE * best_cost.abs().max(1.0) {
        error!(
            expected = best_cost,
            found = recomputed,
            meeting = %meeting,
            vertices = ?vertices,
            "traverse.path_mismatch"
        );
        return Err(TraverseError::PathMismatch {
            expected: best_cost,
            found: recomputed,
        });
    }

    Ok(Path {
        vertices,
        edges,
        weight: recomputed,
    })
}
