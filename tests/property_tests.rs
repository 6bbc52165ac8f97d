use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;
use vereda::{
    CollectionKind, Direction, DocumentExpander, EdgeStore, MemoryGraph, QueryContext,
    TraverseOptions, Traverser, VertexId, Weighting,
};

/// A random directed multigraph: vertex count, `(from, to, weight)` edges
/// (self-loops and parallel edges included on purpose), and two endpoints.
fn arb_graph() -> impl Strategy<Value = (usize, Vec<(usize, usize, u32)>, usize, usize)> {
    (2usize..=10).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::vec((0..n, 0..n, 1u32..=100), 0..=35),
            0..n,
            0..n,
        )
    })
}

fn build_graph(n: usize, edges: &[(usize, usize, u32)]) -> (Arc<MemoryGraph>, Vec<VertexId>) {
    let graph = Arc::new(MemoryGraph::new());
    graph
        .create_collection("nodes", CollectionKind::Vertex)
        .unwrap();
    graph
        .create_collection("links", CollectionKind::Edge)
        .unwrap();
    let vids: Vec<VertexId> = (0..n)
        .map(|i| {
            graph
                .insert_vertex("nodes", &format!("v{i}"), json!({}))
                .unwrap()
        })
        .collect();
    for (i, &(from, to, w)) in edges.iter().enumerate() {
        graph
            .insert_edge(
                "links",
                &format!("e{i}"),
                &vids[from],
                &vids[to],
                json!({ "w": w }),
            )
            .unwrap();
    }
    (graph, vids)
}

fn engine(
    graph: &Arc<MemoryGraph>,
    options: TraverseOptions,
) -> Traverser<DocumentExpander, DocumentExpander> {
    let ctx = Arc::new(QueryContext::open(graph.as_ref()).unwrap());
    let store: Arc<dyn EdgeStore> = graph.clone();
    let weighting = Weighting::Attribute { field: "w".into() };
    let forward = DocumentExpander::new(
        Arc::clone(&store),
        Arc::clone(&ctx),
        "links",
        Direction::Outbound,
        weighting.clone(),
    )
    .unwrap();
    let backward =
        DocumentExpander::new(store, ctx, "links", Direction::Inbound, weighting).unwrap();
    Traverser::with_options(forward, backward, options)
}

/// Plain one-sided Dijkstra over the same edge list, in exact integer
/// arithmetic.
fn reference_distance(
    n: usize,
    edges: &[(usize, usize, u32)],
    start: usize,
    target: usize,
) -> Option<u64> {
    let mut adj: Vec<Vec<(usize, u64)>> = vec![Vec::new(); n];
    for &(from, to, w) in edges {
        if from != to {
            adj[from].push((to, u64::from(w)));
        }
    }
    let mut dist: Vec<Option<u64>> = vec![None; n];
    let mut heap = BinaryHeap::new();
    dist[start] = Some(0);
    heap.push(Reverse((0u64, start)));
    while let Some(Reverse((cost, vertex))) = heap.pop() {
        if dist[vertex] != Some(cost) {
            continue;
        }
        if vertex == target {
            return Some(cost);
        }
        for &(next, w) in &adj[vertex] {
            let candidate = cost + w;
            if dist[next].map_or(true, |d| candidate < d) {
                dist[next] = Some(candidate);
                heap.push(Reverse((candidate, next)));
            }
        }
    }
    None
}

proptest! {
    #[test]
    fn prop_matches_reference_dijkstra((n, edges, start, target) in arb_graph()) {
        let (graph, vids) = build_graph(n, &edges);
        let edge_rows: HashMap<String, (usize, usize, u32)> = edges
            .iter()
            .enumerate()
            .map(|(i, &(from, to, w))| (format!("links/e{i}"), (from, to, w)))
            .collect();

        let mut t = engine(&graph, TraverseOptions::default());
        let found = t.shortest_path(&vids[start], &vids[target]).unwrap();
        let expected = reference_distance(n, &edges, start, target);

        match (found, expected) {
            (None, None) => {}
            (Some(path), Some(distance)) => {
                prop_assert_eq!(path.weight, distance as f64);
                prop_assert_eq!(path.vertices.first(), Some(&vids[start]));
                prop_assert_eq!(path.vertices.last(), Some(&vids[target]));
                prop_assert_eq!(path.vertices.len(), path.edges.len() + 1);

                // Every reported hop must be a real edge, oriented along the
                // walk, and the hop weights must add up to the total.
                let mut total = 0u64;
                for (i, edge) in path.edges.iter().enumerate() {
                    let row = edge_rows.get(edge.as_str());
                    prop_assert!(row.is_some(), "unknown edge {}", edge);
                    let &(from, to, w) = row.unwrap();
                    prop_assert_eq!(&path.vertices[i], &vids[from]);
                    prop_assert_eq!(&path.vertices[i + 1], &vids[to]);
                    total += u64::from(w);
                }
                prop_assert_eq!(path.weight, total as f64);
            }
            (found, expected) => {
                prop_assert!(false, "engine found {:?}, reference found {:?}", found, expected);
            }
        }
    }

    #[test]
    fn prop_reruns_and_modes_agree(
        (n, edges, start, target) in arb_graph(),
        bound in 1u32..=250,
    ) {
        let (graph, vids) = build_graph(n, &edges);
        let expected = reference_distance(n, &edges, start, target);

        let mut sequential = engine(&graph, TraverseOptions::default());
        let base = sequential.shortest_path(&vids[start], &vids[target]).unwrap();
        let rerun = sequential.shortest_path(&vids[start], &vids[target]).unwrap();
        prop_assert_eq!(&base, &rerun);

        let mut parallel = engine(&graph, TraverseOptions::parallel());
        let par = parallel.shortest_path(&vids[start], &vids[target]).unwrap();
        prop_assert_eq!(
            base.as_ref().map(|p| p.weight),
            par.map(|p| p.weight)
        );

        let mut bounded = engine(&graph, TraverseOptions::bounded(f64::from(bound)));
        let capped = bounded.shortest_path(&vids[start], &vids[target]).unwrap();
        match expected {
            Some(distance) if distance <= u64::from(bound) => {
                prop_assert_eq!(capped.map(|p| p.weight), Some(distance as f64));
            }
            _ => prop_assert!(capped.is_none()),
        }
    }
}
