use toulmin::graphlib::{Graph, GraphOptions};
use toulmin::order::{cross_count, two_layer_cross_count};
use toulmin::{acyclic, order, rank, EdgeLabel, LayoutGraph, NodeLabel};

fn working_graph() -> LayoutGraph {
    Graph::new(GraphOptions {
        directed: true,
        multigraph: true,
        compound: true,
    })
}

fn strings(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn two_layer_count_for_a_plain_crossing() {
    let mut g = working_graph();
    g.set_edge("a", "d");
    g.set_edge("b", "c");
    let north = strings(&["a", "b"]);
    let south = strings(&["c", "d"]);
    assert_eq!(two_layer_cross_count(&g, &north, &south), 1.0);
}

#[test]
fn two_layer_count_multiplies_weights() {
    let mut g = working_graph();
    g.set_edge_with_label(
        "a",
        "d",
        EdgeLabel {
            weight: 2.0,
            ..Default::default()
        },
    );
    g.set_edge_with_label(
        "b",
        "c",
        EdgeLabel {
            weight: 3.0,
            ..Default::default()
        },
    );
    let north = strings(&["a", "b"]);
    let south = strings(&["c", "d"]);
    assert_eq!(two_layer_cross_count(&g, &north, &south), 6.0);
}

#[test]
fn parallel_edges_do_not_cross() {
    let mut g = working_graph();
    g.set_edge("a", "c");
    g.set_edge("b", "d");
    let layering = vec![strings(&["a", "b"]), strings(&["c", "d"])];
    assert_eq!(cross_count(&g, &layering), 0.0);
}

#[test]
fn long_edges_are_split_to_unit_spans() {
    let mut g = working_graph();
    g.set_edge("a", "b");
    g.set_edge("b", "c");
    g.set_edge("a", "c");
    let mut table = rank::assign_ranks(&mut g).unwrap();
    order::run(&mut g, &mut table);

    for key in g.edge_keys() {
        let span = g.node(&key.w).and_then(|n| n.rank).unwrap()
            - g.node(&key.v).and_then(|n| n.rank).unwrap();
        assert_eq!(span, 1.0, "edge ({}, {}) spans {span}", key.v, key.w);
    }
}

#[test]
fn a_tree_in_natural_order_has_zero_crossings() {
    let mut g = working_graph();
    for id in ["a", "b", "c", "d", "e", "f", "g"] {
        g.set_node(id, NodeLabel::statement());
    }
    for (v, w) in [("a", "b"), ("a", "c"), ("b", "d"), ("b", "e"), ("c", "f"), ("c", "g")] {
        g.set_edge(v, w);
    }
    let removed = acyclic::remove_cycles(&mut g);
    assert!(removed.reversed.is_empty());

    let mut table = rank::assign_ranks(&mut g).unwrap();
    let artifacts = order::run(&mut g, &mut table);
    assert_eq!(cross_count(&g, &artifacts.layering), 0.0);
}

#[test]
fn the_crossing_sweeps_untangle_a_fan() {
    let mut g = working_graph();
    for id in ["a", "b", "c", "d", "e"] {
        g.set_node(id, NodeLabel::statement());
    }
    for (v, w) in [("a", "d"), ("a", "e"), ("b", "d"), ("c", "d")] {
        g.set_edge(v, w);
    }
    acyclic::remove_cycles(&mut g);
    let mut table = rank::assign_ranks(&mut g).unwrap();
    let artifacts = order::run(&mut g, &mut table);
    assert_eq!(cross_count(&g, &artifacts.layering), 0.0);
}

#[test]
fn a_warrant_target_edge_is_visible_to_adjacent_rows() {
    let mut g = working_graph();
    g.set_edge("a", "c");
    toulmin::set_warrant_edge(&mut g, "b", ("a", "c"), EdgeLabel::default()).unwrap();

    let mut table = rank::assign_ranks(&mut g).unwrap();
    let artifacts = order::run(&mut g, &mut table);

    // The targeted edge is split across the warrant's half-rank row...
    assert!(!g.has_edge("a", "c", None));
    let succ = g.successors("a").first().map(|s| s.to_string()).unwrap();
    let dummy = g.node(&succ).unwrap();
    assert!(dummy.is_dummy());
    assert_eq!(dummy.rank, Some(0.5));

    // ...so every remaining edge connects vertices at most one row apart.
    let mut row_of: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for (i, row) in artifacts.layering.iter().enumerate() {
        for v in row {
            row_of.insert(v.clone(), i);
        }
    }
    for key in g.edge_keys() {
        let (Some(&rv), Some(&rw)) = (row_of.get(&key.v), row_of.get(&key.w)) else {
            continue;
        };
        assert!(rw.abs_diff(rv) <= 1, "edge ({}, {}) skips rows", key.v, key.w);
    }
}

#[test]
fn conjunct_premises_stay_adjacent() {
    let mut g = working_graph();
    g.set_node("a", NodeLabel::statement());
    g.set_node("b", NodeLabel::statement());
    g.set_node("c", NodeLabel::statement());
    g.set_edge("a", "c");
    toulmin::set_conjunct_node(&mut g, "b", ("a", "c")).unwrap();

    let mut table = rank::assign_ranks(&mut g).unwrap();
    let artifacts = order::run(&mut g, &mut table);

    let row = artifacts
        .layering
        .iter()
        .find(|row| row.iter().any(|v| v == "a"))
        .unwrap();
    let pos = |v: &str| row.iter().position(|x| x == v).unwrap();
    assert_eq!(pos("a").abs_diff(pos("b")), 1);
}

#[test]
fn a_binary_tree_with_two_back_edges_reaches_zero_crossings() {
    let mut g = working_graph();
    for id in [
        "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r",
    ] {
        g.set_node(id, NodeLabel::statement());
    }
    for (v, w) in [
        ("a", "b"),
        ("a", "c"),
        ("b", "d"),
        ("b", "e"),
        ("c", "f"),
        ("c", "g"),
        ("d", "n"),
        ("d", "o"),
        ("e", "p"),
        ("e", "q"),
        ("f", "h"),
        ("f", "i"),
        ("g", "j"),
        ("g", "k"),
        ("j", "l"),
        ("j", "m"),
        ("h", "r"),
        ("i", "c"),
        ("l", "g"),
    ] {
        g.set_edge(v, w);
    }

    let removed = acyclic::remove_cycles(&mut g);
    assert_eq!(removed.reversed.len(), 2);

    let mut table = rank::assign_ranks(&mut g).unwrap();
    let artifacts = order::run(&mut g, &mut table);
    assert_eq!(cross_count(&g, &artifacts.layering), 0.0);
}
