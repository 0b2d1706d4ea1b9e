use toulmin_graphlib::{alg, Graph, GraphError, GraphOptions};

fn new_graph() -> Graph<(), i64, ()> {
    Graph::new(GraphOptions::default())
}

#[test]
fn nodes_iterate_in_insertion_order() {
    let mut g = new_graph();
    g.set_node("b", ());
    g.set_node("a", ());
    g.set_node("c", ());
    let ids: Vec<&str> = g.nodes().collect();
    assert_eq!(ids, vec!["b", "a", "c"]);
}

#[test]
fn set_edge_creates_missing_endpoints() {
    let mut g = new_graph();
    g.set_edge("a", "b");
    assert!(g.has_node("a"));
    assert!(g.has_node("b"));
    assert!(g.has_edge("a", "b", None));
    assert_eq!(g.edge_count(), 1);
}

#[test]
fn non_multigraph_ignores_edge_names() {
    let mut g = new_graph();
    g.set_edge_named("a", "b", Some("x"), Some(1));
    g.set_edge_named("a", "b", Some("y"), Some(2));
    assert_eq!(g.edge_count(), 1);
    assert_eq!(g.edge("a", "b", None), Some(&2));
}

#[test]
fn multigraph_keeps_parallel_named_edges() {
    let mut g: Graph<(), i64, ()> = Graph::new(GraphOptions {
        multigraph: true,
        ..Default::default()
    });
    g.set_edge_named("a", "b", None::<&str>, Some(1));
    g.set_edge_named("a", "b", Some("x"), Some(2));
    assert_eq!(g.edge_count(), 2);
    assert_eq!(g.edge("a", "b", None), Some(&1));
    assert_eq!(g.edge("a", "b", Some("x")), Some(&2));
}

#[test]
fn remove_node_removes_incident_edges() {
    let mut g = new_graph();
    g.set_edge("a", "b");
    g.set_edge("b", "c");
    g.set_edge("a", "c");
    assert!(g.remove_node("b"));
    assert_eq!(g.edge_count(), 1);
    assert!(g.has_edge("a", "c", None));
    assert!(!g.has_edge("a", "b", None));
    assert!(!g.has_edge("b", "c", None));
}

#[test]
fn adjacency_follows_edge_insertion_order() {
    let mut g = new_graph();
    g.set_edge("a", "c");
    g.set_edge("a", "b");
    g.set_edge("d", "a");
    assert_eq!(g.successors("a"), vec!["c", "b"]);
    assert_eq!(g.predecessors("a"), vec!["d"]);
    assert_eq!(g.neighbors("a"), vec!["c", "b", "d"]);
}

#[test]
fn in_and_out_edges_filter_by_other_endpoint() {
    let mut g = new_graph();
    g.set_edge("a", "b");
    g.set_edge("a", "c");
    g.set_edge("b", "c");
    assert_eq!(g.out_edges("a", Some("b")).len(), 1);
    assert_eq!(g.out_edges("a", None).len(), 2);
    assert_eq!(g.in_edges("c", Some("b")).len(), 1);
    assert_eq!(g.in_edges("c", None).len(), 2);
}

#[test]
fn self_loops_are_allowed_and_reported_once_in_node_edges() {
    let mut g = new_graph();
    g.set_edge("a", "a");
    g.set_edge("a", "b");
    assert_eq!(g.node_edges("a").len(), 2);
    assert_eq!(g.successors("a"), vec!["a", "b"]);
}

#[test]
fn sources_and_sinks() {
    let mut g = new_graph();
    g.set_edge("a", "b");
    g.set_edge("b", "c");
    assert_eq!(g.sources(), vec!["a"]);
    assert_eq!(g.sinks(), vec!["c"]);
}

#[test]
fn set_parent_rejects_cycles() {
    let mut g: Graph<(), (), ()> = Graph::new(GraphOptions {
        compound: true,
        ..Default::default()
    });
    g.set_parent("b", "a").unwrap();
    g.set_parent("c", "b").unwrap();
    let err = g.set_parent("a", "c").unwrap_err();
    assert!(matches!(err, GraphError::ParentCycle { .. }));
    assert_eq!(g.parent("a"), None);
}

#[test]
fn set_parent_moves_child_between_containers() {
    let mut g: Graph<(), (), ()> = Graph::new(GraphOptions {
        compound: true,
        ..Default::default()
    });
    g.set_parent("x", "a").unwrap();
    g.set_parent("x", "b").unwrap();
    assert_eq!(g.parent("x"), Some("b"));
    assert!(g.children("a").is_empty());
    assert_eq!(g.children("b"), ["x".to_string()]);
}

#[test]
fn copy_structure_carries_structure_with_default_labels() {
    let mut g: Graph<i64, i64, ()> = Graph::new(GraphOptions {
        compound: true,
        ..Default::default()
    });
    g.set_node("a", 7);
    g.set_node("b", 8);
    g.set_edge_with_label("a", "b", 9);
    g.set_parent("b", "a").unwrap();

    let copy: Graph<(), (), ()> = g.copy_structure();
    assert_eq!(copy.node_count(), 2);
    assert!(copy.has_edge("a", "b", None));
    assert_eq!(copy.parent("b"), Some("a"));
}

#[test]
fn postorder_visits_children_before_parents() {
    let mut g = new_graph();
    g.set_edge("a", "b");
    g.set_edge("a", "c");
    let order = alg::postorder(&g, &["a"]);
    let pos = |v: &str| order.iter().position(|x| x == v).unwrap();
    assert_eq!(order.len(), 3);
    assert!(pos("b") < pos("a"));
    assert!(pos("c") < pos("a"));
}

#[test]
fn preorder_visits_parents_before_children() {
    let mut g = new_graph();
    g.set_edge("a", "b");
    g.set_edge("b", "c");
    assert_eq!(alg::preorder(&g, &["a"]), vec!["a", "b", "c"]);
}

#[test]
fn is_acyclic_detects_cycles_and_loops() {
    let mut g = new_graph();
    g.set_edge("a", "b");
    g.set_edge("b", "c");
    assert!(alg::is_acyclic(&g));
    g.set_edge("c", "a");
    assert!(!alg::is_acyclic(&g));

    let mut h = new_graph();
    h.set_edge("a", "a");
    assert!(!alg::is_acyclic(&h));
}
