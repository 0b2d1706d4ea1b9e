use toulmin::graphlib::{Graph, GraphOptions};
use toulmin::{acyclic, rank, EdgeLabel, LayoutGraph, NodeLabel};

fn working_graph() -> LayoutGraph {
    Graph::new(GraphOptions {
        directed: true,
        multigraph: true,
        compound: true,
    })
}

fn rank_of(g: &LayoutGraph, v: &str) -> f64 {
    g.node(v).and_then(|n| n.rank).unwrap()
}

#[test]
fn chain_ranks_are_consecutive() {
    let mut g = working_graph();
    g.set_edge("a", "b");
    g.set_edge("b", "c");
    let table = rank::assign_ranks(&mut g).unwrap();
    assert_eq!(table.rank("a"), Some(0.0));
    assert_eq!(table.rank("b"), Some(1.0));
    assert_eq!(table.rank("c"), Some(2.0));
    assert_eq!(table.min_rank(), Some(0.0));
}

#[test]
fn minlen_stretches_an_edge() {
    let mut g = working_graph();
    g.set_edge_with_label(
        "a",
        "b",
        EdgeLabel {
            minlen: 2,
            ..Default::default()
        },
    );
    let table = rank::assign_ranks(&mut g).unwrap();
    assert_eq!(table.rank("b"), Some(2.0));
}

#[test]
fn every_edge_respects_its_minimum_length() {
    let mut g = working_graph();
    g.set_edge("a", "b");
    g.set_edge("a", "c");
    g.set_edge("b", "d");
    g.set_edge("c", "d");
    g.set_edge("a", "d");
    rank::assign_ranks(&mut g).unwrap();
    for key in g.edge_keys() {
        let minlen = f64::from(g.edge_by_key(&key).unwrap().minlen);
        assert!(
            rank_of(&g, &key.w) - rank_of(&g, &key.v) >= minlen,
            "edge ({}, {}) is too short",
            key.v,
            key.w
        );
    }
}

#[test]
fn network_simplex_pulls_heavy_edges_tight() {
    // The light edge a->b stretches so the heavy path a->c->b stays tight.
    let mut g = working_graph();
    g.set_edge_with_label(
        "a",
        "b",
        EdgeLabel {
            weight: 1.0,
            ..Default::default()
        },
    );
    g.set_edge_with_label(
        "a",
        "c",
        EdgeLabel {
            weight: 10.0,
            ..Default::default()
        },
    );
    g.set_edge_with_label(
        "c",
        "b",
        EdgeLabel {
            weight: 10.0,
            ..Default::default()
        },
    );
    let table = rank::assign_ranks(&mut g).unwrap();
    assert_eq!(table.rank("a"), Some(0.0));
    assert_eq!(table.rank("c"), Some(1.0));
    assert_eq!(table.rank("b"), Some(2.0));
}

#[test]
fn balance_moves_a_vertex_to_the_emptier_rank() {
    // x can sit on rank 1 (with b1) or rank 2 (with b2 alone after it
    // leaves); balance picks the less populated one.
    let mut g = working_graph();
    g.set_edge("a", "b1");
    g.set_edge("b1", "b2");
    g.set_edge("b2", "c");
    g.set_edge("a", "x");
    g.set_edge("x", "c");
    let table = rank::assign_ranks(&mut g).unwrap();
    assert_eq!(table.rank("x"), Some(2.0));
}

#[test]
fn disconnected_components_are_all_ranked() {
    let mut g = working_graph();
    g.set_edge("a", "b");
    g.set_edge("p", "q");
    g.set_node("lonely", NodeLabel::statement());
    let table = rank::assign_ranks(&mut g).unwrap();
    for v in ["a", "b", "p", "q", "lonely"] {
        assert!(table.rank(v).is_some(), "{v} unranked");
    }
    assert_eq!(table.rank("lonely"), Some(0.0));
}

#[test]
fn conjunct_children_share_the_container_rank() {
    let mut g = working_graph();
    g.set_node("a", NodeLabel::statement());
    g.set_node("b", NodeLabel::statement());
    g.set_node("c", NodeLabel::statement());
    g.set_edge("a", "c");
    toulmin::set_conjunct_node(&mut g, "b", ("a", "c")).unwrap();

    let table = rank::assign_ranks(&mut g).unwrap();
    let container = table.rank("-> c").unwrap();
    assert_eq!(table.rank("a"), Some(container));
    assert_eq!(table.rank("b"), Some(container));
    assert_eq!(table.rank("c"), Some(container + 1.0));
    assert!(g.has_edge("-> c", "c", None));
}

#[test]
fn warrant_sits_half_a_rank_below_the_targeted_tail() {
    let mut g = working_graph();
    g.set_edge("a", "c");
    toulmin::set_warrant_edge(&mut g, "b", ("a", "c"), EdgeLabel::default()).unwrap();

    let table = rank::assign_ranks(&mut g).unwrap();
    assert_eq!(table.rank("a"), Some(0.0));
    assert_eq!(table.rank("b"), Some(0.5));
    assert_eq!(table.rank("a -> c"), Some(0.5));
    assert_eq!(table.rank("c"), Some(1.0));
    assert!(g.has_edge("a", "c", None));
    assert!(g.has_edge("b", "a -> c", None));
}

#[test]
fn balance_leaves_warrant_scaffolding_pinned() {
    // The path through x stretches the targeted edge, giving the merged
    // warrant scaffolding a wider feasible window with an emptier rank in
    // it; the sink must stay half a rank below the targeted edge's tail
    // anyway.
    let mut g = working_graph();
    g.set_edge("a", "c");
    g.set_edge("a", "x");
    g.set_edge("x", "c");
    toulmin::set_warrant_edge(&mut g, "b", ("a", "c"), EdgeLabel::default()).unwrap();

    let table = rank::assign_ranks(&mut g).unwrap();
    assert_eq!(table.rank("a"), Some(0.0));
    assert_eq!(table.rank("a -> c"), Some(0.5));
    assert_eq!(table.rank("b"), Some(0.5));
    assert_eq!(table.rank("x"), Some(1.0));
    assert_eq!(table.rank("c"), Some(3.0));
}

#[test]
fn warrant_push_shifts_everything_downstream() {
    let mut g = working_graph();
    g.set_edge("a", "c");
    g.set_edge("c", "d");
    toulmin::set_warrant_edge(&mut g, "b", ("a", "c"), EdgeLabel::default()).unwrap();

    let table = rank::assign_ranks(&mut g).unwrap();
    assert_eq!(table.rank("c"), Some(1.0));
    assert_eq!(table.rank("d"), Some(2.0));
}

#[test]
fn ranks_survive_cycle_removal() {
    let mut g = working_graph();
    g.set_edge("a", "b");
    g.set_edge("b", "c");
    g.set_edge("c", "a");
    acyclic::remove_cycles(&mut g);
    let table = rank::assign_ranks(&mut g).unwrap();
    assert_eq!(table.min_rank(), Some(0.0));
    assert_eq!(table.max_rank(), Some(2.0));
}
