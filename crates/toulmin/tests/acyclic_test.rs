use toulmin::graphlib::{alg, Graph, GraphOptions};
use toulmin::{acyclic, EdgeLabel, LayoutGraph, NodeLabel};

// Cycle removal runs on the engine's working copy, which is a multigraph so
// a reversed edge can coexist with an existing opposite edge.
fn working_graph() -> LayoutGraph {
    Graph::new(GraphOptions {
        directed: true,
        multigraph: true,
        compound: true,
    })
}

#[test]
fn acyclic_input_is_untouched() {
    let mut g = working_graph();
    g.set_edge("a", "b");
    g.set_edge("b", "c");
    g.set_edge("b", "d");
    let removed = acyclic::remove_cycles(&mut g);
    assert!(removed.loops.is_empty());
    assert!(removed.reversed.is_empty());
    assert_eq!(g.edge_count(), 3);
}

#[test]
fn self_loops_are_deleted_and_reported() {
    let mut g = working_graph();
    g.set_edge("a", "a");
    g.set_edge("a", "b");
    let removed = acyclic::remove_cycles(&mut g);
    assert_eq!(removed.loops.len(), 1);
    assert_eq!(removed.loops[0].0.v, "a");
    assert_eq!(removed.loops[0].0.w, "a");
    assert!(!g.has_edge("a", "a", None));
    assert!(alg::is_acyclic(&g));
}

#[test]
fn a_three_cycle_reverses_exactly_one_edge() {
    let mut g = working_graph();
    g.set_edge("a", "b");
    g.set_edge("b", "c");
    g.set_edge("c", "a");
    g.set_edge("a", "a");

    let removed = acyclic::remove_cycles(&mut g);
    assert_eq!(removed.loops.len(), 1);
    assert_eq!(removed.reversed.len(), 1);
    assert!(alg::is_acyclic(&g));
    assert_eq!(g.edge_count(), 3);
}

#[test]
fn reversed_edges_keep_their_labels() {
    let mut g = working_graph();
    g.set_edge("a", "b");
    g.set_edge_with_label(
        "b",
        "a",
        EdgeLabel {
            weight: 4.0,
            minlen: 2,
            ..Default::default()
        },
    );
    // A two-cycle: one direction must be reversed and keep weight/minlen.
    let removed = acyclic::remove_cycles(&mut g);
    assert_eq!(removed.reversed.len(), 1);
    assert!(alg::is_acyclic(&g));
    let (key, label) = &removed.reversed[0];
    let flipped = g
        .out_edges(&key.w, Some(&key.v))
        .into_iter()
        .find_map(|k| {
            let l = g.edge_by_key(&k)?;
            l.reversed.then_some(l)
        })
        .expect("reversed edge present");
    assert_eq!(flipped.weight, label.weight);
    assert_eq!(flipped.minlen, label.minlen);
}

#[test]
fn undo_restores_the_original_edge_set() {
    let mut g = working_graph();
    for id in ["a", "b", "c", "d"] {
        g.set_node(id, NodeLabel::statement());
    }
    g.set_edge("a", "b");
    g.set_edge("b", "c");
    g.set_edge("c", "a");
    g.set_edge("c", "d");
    g.set_edge("d", "d");

    let removed = acyclic::remove_cycles(&mut g);
    assert!(alg::is_acyclic(&g));
    acyclic::undo(&mut g, &removed);

    assert_eq!(g.edge_count(), 5);
    for (v, w) in [("a", "b"), ("b", "c"), ("c", "a"), ("c", "d"), ("d", "d")] {
        assert!(g.has_edge(v, w, None), "missing edge ({v}, {w})");
    }
    for key in g.edge_keys() {
        assert!(!g.edge_by_key(&key).unwrap().reversed);
    }
}
