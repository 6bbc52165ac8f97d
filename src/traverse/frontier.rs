//! Per-direction search state: tentative costs, predecessor links, the
//! finalized set, and the cost-ordered extraction heap.
//!
//! The heap tolerates duplicate entries; relaxation pushes a fresh entry on
//! every improvement and extraction skips entries that no longer match the
//! recorded cost (lazy deletion). Ties on cost break by vertex id, which
//! keeps extraction order, and with it the whole search, deterministic.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

use crate::ident::{EdgeId, VertexId};

/// Back-link to the vertex a cheapest-known path arrives through, with the
/// hop that produced it. The hop weight is kept so path assembly can re-sum
/// weights without trusting accumulated totals.
#[derive(Clone, Debug)]
pub(crate) struct Predecessor {
    pub(crate) vertex: VertexId,
    pub(crate) edge: EdgeId,
    pub(crate) weight: f64,
}

#[derive(Debug)]
struct VertexState {
    cost: f64,
    predecessor: Option<Predecessor>,
    finalized: bool,
}

#[derive(Debug)]
struct QueueEntry {
    cost: f64,
    vertex: VertexId,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.vertex.cmp(&other.vertex))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

/// One direction's in-progress exploration state.
#[derive(Debug)]
pub(crate) struct Frontier {
    state: FxHashMap<VertexId, VertexState>,
    queue: BinaryHeap<Reverse<QueueEntry>>,
}

impl Frontier {
    /// A frontier seeded at `origin` with cost zero.
    pub(crate) fn seeded(origin: VertexId) -> Self {
        let mut frontier = Frontier {
            state: FxHashMap::default(),
            queue: BinaryHeap::new(),
        };
        frontier.state.insert(
            origin.clone(),
            VertexState {
                cost: 0.0,
                predecessor: None,
                finalized: false,
            },
        );
        frontier.queue.push(Reverse(QueueEntry {
            cost: 0.0,
            vertex: origin,
        }));
        frontier
    }

    /// Cost of the cheapest un-finalized vertex, after discarding stale heap
    /// entries. `None` once the frontier is exhausted.
    pub(crate) fn min_pending(&mut self) -> Option<f64> {
        loop {
            let (cost, stale) = match self.queue.peek() {
                None => return None,
                Some(Reverse(entry)) => match self.state.get(&entry.vertex) {
                    Some(state) if !state.finalized && entry.cost <= state.cost => {
                        (entry.cost, false)
                    }
                    _ => (0.0, true),
                },
            };
            if stale {
                self.queue.pop();
                continue;
            }
            return Some(cost);
        }
    }

    /// Pops and finalizes the cheapest un-finalized vertex.
    pub(crate) fn pop_min(&mut self) -> Option<(VertexId, f64)> {
        while let Some(Reverse(entry)) = self.queue.pop() {
            let Some(state) = self.state.get_mut(&entry.vertex) else {
                continue;
            };
            if state.finalized || entry.cost > state.cost {
                continue;
            }
            state.finalized = true;
            return Some((entry.vertex, entry.cost));
        }
        None
    }

    /// Records a cheaper path to `vertex`, pushing a fresh heap entry.
    /// Returns whether the relaxation improved anything.
    pub(crate) fn relax(&mut self, vertex: VertexId, cost: f64, via: Predecessor) -> bool {
        match self.state.get_mut(&vertex) {
            Some(state) => {
                if state.finalized || state.cost <= cost {
                    return false;
                }
                state.cost = cost;
                state.predecessor = Some(via);
            }
            None => {
                self.state.insert(
                    vertex.clone(),
                    VertexState {
                        cost,
                        predecessor: Some(via),
                        finalized: false,
                    },
                );
            }
        }
        self.queue.push(Reverse(QueueEntry { cost, vertex }));
        true
    }

    /// Any recorded cost for `vertex`, tentative or finalized.
    pub(crate) fn cost_of(&self, vertex: &VertexId) -> Option<f64> {
        self.state.get(vertex).map(|state| state.cost)
    }

    /// The back-link recorded for `vertex`, absent for the seed.
    pub(crate) fn predecessor(&self, vertex: &VertexId) -> Option<&Predecessor> {
        self.state.get(vertex).and_then(|state| state.predecessor.as_ref())
    }

    /// Number of vertices this side has touched at all.
    pub(crate) fn reached(&self) -> usize {
        self.state.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vid(text: &str) -> VertexId {
        VertexId::parse(text).unwrap()
    }

    fn link(from: &str, edge: &str, weight: f64) -> Predecessor {
        Predecessor {
            vertex: vid(from),
            edge: EdgeId::parse(edge).unwrap(),
            weight,
        }
    }

    #[test]
    fn seed_pops_first_and_is_finalized() {
        let mut f = Frontier::seeded(vid("v/s"));
        assert_eq!(f.min_pending(), Some(0.0));
        assert_eq!(f.pop_min(), Some((vid("v/s"), 0.0)));
        assert_eq!(f.pop_min(), None);
        assert_eq!(f.cost_of(&vid("v/s")), Some(0.0));
    }

    #[test]
    fn equal_costs_pop_in_lexical_order() {
        let mut f = Frontier::seeded(vid("v/s"));
        f.pop_min();
        assert!(f.relax(vid("v/b"), 1.0, link("v/s", "e/sb", 1.0)));
        assert!(f.relax(vid("v/a"), 1.0, link("v/s", "e/sa", 1.0)));
        assert_eq!(f.pop_min(), Some((vid("v/a"), 1.0)));
        assert_eq!(f.pop_min(), Some((vid("v/b"), 1.0)));
    }

    #[test]
    fn improvement_leaves_a_stale_entry_behind() {
        let mut f = Frontier::seeded(vid("v/s"));
        f.pop_min();
        assert!(f.relax(vid("v/a"), 5.0, link("v/s", "e/slow", 5.0)));
        assert!(f.relax(vid("v/a"), 2.0, link("v/s", "e/fast", 2.0)));
        assert_eq!(f.min_pending(), Some(2.0));
        assert_eq!(f.pop_min(), Some((vid("v/a"), 2.0)));
        // The 5.0 entry is still queued but must be skipped.
        assert_eq!(f.pop_min(), None);
        assert_eq!(
            f.predecessor(&vid("v/a")).map(|p| p.edge.as_str().to_string()),
            Some("e/fast".to_string())
        );
    }

    #[test]
    fn relax_rejects_worse_costs_and_finalized_vertices() {
        let mut f = Frontier::seeded(vid("v/s"));
        f.pop_min();
        assert!(f.relax(vid("v/a"), 2.0, link("v/s", "e/sa", 2.0)));
        assert!(!f.relax(vid("v/a"), 2.0, link("v/s", "e/dup", 2.0)));
        assert!(!f.relax(vid("v/a"), 3.0, link("v/s", "e/worse", 3.0)));
        f.pop_min();
        assert!(!f.relax(vid("v/a"), 1.0, link("v/s", "e/late", 1.0)));
        assert_eq!(f.cost_of(&vid("v/a")), Some(2.0));
        assert_eq!(f.reached(), 2);
    }
}
