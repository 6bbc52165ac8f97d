//! Bidirectional shortest-path search.
//!
//! Two frontiers run uniform-cost search toward each other, one seeded at
//! the start and expanded forward, one seeded at the target and expanded
//! backward. Whichever side currently has the cheaper pending vertex
//! advances; a vertex reached by both sides yields a meeting candidate, and
//! the search stops once the two pending minimums together can no longer
//! beat the best candidate. The optional parallel mode advances both sides
//! per round and dispatches the two expansions to worker threads.

pub(crate) mod frontier;
mod path;

pub use path::Path;

use tracing::{debug, trace};

use crate::error::Result;
use crate::expand::{Expander, Step};
use crate::ident::VertexId;
use crate::traverse::frontier::{Frontier, Predecessor};

/// Knobs for one search. The default is an unbounded, sequential search.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct TraverseOptions {
    /// Upper bound on the returned path's total weight. Exploration beyond
    /// the bound is pruned per side; a graph whose only connections are more
    /// expensive yields `None`.
    pub max_cost: Option<f64>,
    /// Expand the two sides of each round concurrently.
    pub parallel_expand: bool,
}

impl TraverseOptions {
    /// Sequential search that rejects paths heavier than `max_cost`.
    pub fn bounded(max_cost: f64) -> Self {
        TraverseOptions {
            max_cost: Some(max_cost),
            ..TraverseOptions::default()
        }
    }

    /// Unbounded search with concurrent two-sided expansion.
    pub fn parallel() -> Self {
        TraverseOptions {
            parallel_expand: true,
            ..TraverseOptions::default()
        }
    }
}

/// Best meeting found so far: a vertex both sides have costs for, with the
/// combined total at the time it was recorded.
#[derive(Clone, Debug)]
struct Meeting {
    vertex: VertexId,
    cost: f64,
}

/// Bidirectional shortest-path search over a pair of expanders.
///
/// The forward expander walks from the start, the backward expander toward
/// the target; for a directed interpretation they are typically constructed
/// as `Outbound` and `Inbound` over the same edge collection. All search
/// state lives inside [`shortest_path`](Traverser::shortest_path), so a
/// traverser may be reused for queries one at a time; `&mut self` makes
/// concurrent reuse a compile error rather than a data race.
pub struct Traverser<F, B> {
    forward: F,
    backward: B,
    options: TraverseOptions,
}

impl<F: Expander, B: Expander> Traverser<F, B> {
    /// A traverser with default options.
    pub fn new(forward: F, backward: B) -> Self {
        Traverser::with_options(forward, backward, TraverseOptions::default())
    }

    /// A traverser with explicit options.
    pub fn with_options(forward: F, backward: B, options: TraverseOptions) -> Self {
        Traverser {
            forward,
            backward,
            options,
        }
    }

    /// The options this traverser searches with.
    pub fn options(&self) -> &TraverseOptions {
        &self.options
    }

    /// Computes a minimum-weight path from `start` to `target`.
    ///
    /// `Ok(None)` means the two vertices are not connected (within the
    /// configured cost bound); storage failures abort the search with no
    /// partial result.
    pub fn shortest_path(
        &mut self,
        start: &VertexId,
        target: &VertexId,
    ) -> Result<Option<Path>> {
        if start == target {
            debug!(start = %start, "traverse.trivial");
            return Ok(Some(Path::trivial(start.clone())));
        }
        debug!(
            start = %start,
            target = %target,
            parallel = self.options.parallel_expand,
            "traverse.begin"
        );

        let mut search = Search {
            forward: &self.forward,
            backward: &self.backward,
            max_cost: self.options.max_cost,
            parallel: self.options.parallel_expand,
            fwd: Frontier::seeded(start.clone()),
            bwd: Frontier::seeded(target.clone()),
            best: None,
        };
        let outcome = search.run()?;

        match outcome {
            None => {
                debug!(
                    reached_forward = search.fwd.reached(),
                    reached_backward = search.bwd.reached(),
                    "traverse.exhausted"
                );
                Ok(None)
            }
            Some(meeting) => {
                let path = path::assemble(&search.fwd, &search.bwd, &meeting.vertex, meeting.cost)?;
                debug_assert_eq!(path.vertices.first(), Some(start));
                debug_assert_eq!(path.vertices.last(), Some(target));
                debug!(
                    weight = path.weight,
                    hops = path.len(),
                    meeting = %meeting.vertex,
                    "traverse.found"
                );
                Ok(Some(path))
            }
        }
    }
}

/// State for one `shortest_path` call.
struct Search<'a, F, B> {
    forward: &'a F,
    backward: &'a B,
    max_cost: Option<f64>,
    parallel: bool,
    fwd: Frontier,
    bwd: Frontier,
    best: Option<Meeting>,
}

impl<F: Expander, B: Expander> Search<'_, F, B> {
    fn run(&mut self) -> Result<Option<Meeting>> {
        loop {
            let min_f = self.fwd.min_pending();
            let min_b = self.bwd.min_pending();

            if let Some(best) = &self.best {
                let reachable = min_f.unwrap_or(f64::INFINITY) + min_b.unwrap_or(f64::INFINITY);
                if reachable >= best.cost {
                    break;
                }
            }
            let (Some(min_f), Some(min_b)) = (min_f, min_b) else {
                // A drained side has finalized everything it can reach; with
                // no candidate on record the two components never touch.
                break;
            };

            if self.parallel {
                self.parallel_round()?;
            } else if min_f <= min_b {
                self.forward_round()?;
            } else {
                self.backward_round()?;
            }
        }
        Ok(self.best.take())
    }

    fn forward_round(&mut self) -> Result<()> {
        let Some((vertex, cost)) = self.fwd.pop_min() else {
            return Ok(());
        };
        self.expand_forward(vertex, cost)
    }

    fn backward_round(&mut self) -> Result<()> {
        let Some((vertex, cost)) = self.bwd.pop_min() else {
            return Ok(());
        };
        self.expand_backward(vertex, cost)
    }

    fn expand_forward(&mut self, vertex: VertexId, cost: f64) -> Result<()> {
        trace!(side = "forward", vertex = %vertex, cost, "traverse.finalize");
        let steps = self.forward.expand(&vertex)?;
        relax_steps(&mut self.fwd, &vertex, cost, steps, self.max_cost);
        record_meeting(
            &mut self.best,
            &self.bwd,
            &vertex,
            cost,
            self.max_cost,
            "forward",
        );
        Ok(())
    }

    fn expand_backward(&mut self, vertex: VertexId, cost: f64) -> Result<()> {
        trace!(side = "backward", vertex = %vertex, cost, "traverse.finalize");
        let steps = self.backward.expand(&vertex)?;
        relax_steps(&mut self.bwd, &vertex, cost, steps, self.max_cost);
        record_meeting(
            &mut self.best,
            &self.fwd,
            &vertex,
            cost,
            self.max_cost,
            "backward",
        );
        Ok(())
    }

    /// Advances both sides in one round, expanding them on worker threads.
    /// All frontier mutation stays on the calling thread, and the meeting
    /// checks run after both sides' relaxations in a fixed order, so the
    /// outcome does not depend on which expansion finishes first. A drained
    /// side degrades the round to a one-sided expansion, so a popped vertex
    /// is always expanded.
    fn parallel_round(&mut self) -> Result<()> {
        let Some((vf, cf)) = self.fwd.pop_min() else {
            return self.backward_round();
        };
        let Some((vb, cb)) = self.bwd.pop_min() else {
            return self.expand_forward(vf, cf);
        };
        trace!(forward = %vf, backward = %vb, "traverse.finalize_pair");
        let (steps_f, steps_b) =
            rayon::join(|| self.forward.expand(&vf), || self.backward.expand(&vb));
        let steps_f = steps_f?;
        let steps_b = steps_b?;

        relax_steps(&mut self.fwd, &vf, cf, steps_f, self.max_cost);
        relax_steps(&mut self.bwd, &vb, cb, steps_b, self.max_cost);
        record_meeting(&mut self.best, &self.bwd, &vf, cf, self.max_cost, "forward");
        record_meeting(&mut self.best, &self.fwd, &vb, cb, self.max_cost, "backward");
        Ok(())
    }
}

fn relax_steps(
    frontier: &mut Frontier,
    vertex: &VertexId,
    cost: f64,
    steps: Vec<Step>,
    max_cost: Option<f64>,
) {
    for step in steps {
        let neighbor = step.neighbor_of(vertex).clone();
        let next = cost + step.weight;
        if let Some(bound) = max_cost {
            if next > bound {
                continue;
            }
        }
        frontier.relax(
            neighbor,
            next,
            Predecessor {
                vertex: vertex.clone(),
                edge: step.edge,
                weight: step.weight,
            },
        );
    }
}

/// The meeting rule: a vertex finalized on one side meets the other side as
/// soon as the other side has any cost for it, tentative or final. Waiting
/// for double finalization would miss paths whose middle edge straddles the
/// two frontiers and can return a non-optimal result under the standard
/// stopping rule.
fn record_meeting(
    best: &mut Option<Meeting>,
    other: &Frontier,
    vertex: &VertexId,
    cost: f64,
    max_cost: Option<f64>,
    side: &'static str,
) {
    let Some(other_cost) = other.cost_of(vertex) else {
        return;
    };
    let total = cost + other_cost;
    if let Some(bound) = max_cost {
        if total > bound {
            return;
        }
    }
    let improved = match best {
        None => true,
        Some(meeting) => total < meeting.cost,
    };
    if improved {
        debug!(side, meeting = %vertex, total, "traverse.candidate");
        *best = Some(Meeting {
            vertex: vertex.clone(),
            cost: total,
        });
    }
}
