use toulmin::graphlib::{Graph, GraphOptions};
use toulmin::{
    layout, new_layout_graph, set_warrant_edge, EdgeLabel, Error, LayoutGraph, NodeLabel,
};

fn statements(g: &mut LayoutGraph, ids: &[&str]) {
    for id in ids {
        g.set_node(*id, NodeLabel::statement());
    }
}

#[test]
fn an_empty_graph_lays_out_without_error() {
    let mut g = new_layout_graph();
    layout(&mut g).unwrap();
    assert_eq!(g.node_count(), 0);
    assert_eq!(g.graph().width, None);
}

#[test]
fn a_single_vertex_sits_at_the_origin() {
    let mut g = new_layout_graph();
    g.set_node("a", NodeLabel::statement());
    layout(&mut g).unwrap();
    let a = g.node("a").unwrap();
    assert_eq!(a.x, Some(0.0));
    assert_eq!(a.y, Some(0.0));
    assert_eq!(g.graph().width, Some(300.0));
    assert_eq!(g.graph().height, Some(100.0));
}

#[test]
fn an_undirected_graph_is_rejected() {
    let mut g: LayoutGraph = Graph::new(GraphOptions {
        directed: false,
        multigraph: false,
        compound: true,
    });
    g.set_edge("a", "b");
    assert_eq!(layout(&mut g), Err(Error::Undirected));
}

#[test]
fn a_non_positive_minlen_is_rejected() {
    let mut g = new_layout_graph();
    g.set_edge_with_label(
        "a",
        "b",
        EdgeLabel {
            minlen: 0,
            ..Default::default()
        },
    );
    let err = layout(&mut g).unwrap_err();
    assert!(matches!(err, Error::BadMinlen { minlen: 0, .. }));
    // Nothing was written.
    assert_eq!(g.node("a").unwrap().x, None);
}

#[test]
fn input_extents_are_preserved() {
    let mut g = new_layout_graph();
    g.set_node(
        "a",
        NodeLabel {
            width: 42.0,
            height: 17.0,
            ..Default::default()
        },
    );
    g.set_node("b", NodeLabel::statement());
    g.set_edge("a", "b");
    layout(&mut g).unwrap();
    assert_eq!(g.node("a").unwrap().width, 42.0);
    assert_eq!(g.node("a").unwrap().height, 17.0);
}

#[test]
fn extras_survive_layout_untouched() {
    let mut g = new_layout_graph();
    let mut node = NodeLabel::statement();
    node.extras
        .insert("kind".to_string(), serde_json::json!("premise"));
    g.set_node("a", node);
    g.set_node("b", NodeLabel::statement());
    let mut edge = EdgeLabel::default();
    edge.extras
        .insert("scheme".to_string(), serde_json::json!({"id": 3}));
    g.set_edge_with_label("a", "b", edge);
    layout(&mut g).unwrap();

    assert_eq!(
        g.node("a").unwrap().extras["kind"],
        serde_json::json!("premise")
    );
    assert_eq!(
        g.edge("a", "b", None).unwrap().extras["scheme"],
        serde_json::json!({"id": 3})
    );
}

#[test]
fn every_edge_gets_three_points_anchored_at_the_centers() {
    let mut g = new_layout_graph();
    statements(&mut g, &["a", "b", "c"]);
    g.set_edge("a", "b");
    g.set_edge("b", "c");
    g.set_edge("a", "c");
    layout(&mut g).unwrap();

    for key in g.edge_keys() {
        let points = &g.edge_by_key(&key).unwrap().points;
        assert_eq!(points.len(), 3, "edge ({}, {})", key.v, key.w);
        let v = g.node(&key.v).unwrap();
        let w = g.node(&key.w).unwrap();
        assert_eq!((points[0].x, points[0].y), (v.x.unwrap(), v.y.unwrap()));
        assert_eq!((points[2].x, points[2].y), (w.x.unwrap(), w.y.unwrap()));
    }
}

#[test]
fn cycles_are_restored_in_their_original_direction() {
    let mut g = new_layout_graph();
    statements(&mut g, &["a", "b", "c"]);
    g.set_edge("a", "b");
    g.set_edge("b", "c");
    g.set_edge("c", "a");
    g.set_edge("a", "a");
    layout(&mut g).unwrap();

    assert_eq!(g.edge_count(), 4);
    for (v, w) in [("a", "b"), ("b", "c"), ("c", "a")] {
        assert!(g.has_edge(v, w, None));
        let points = &g.edge(v, w, None).unwrap().points;
        assert_eq!(points.len(), 3);
        let source = g.node(v).unwrap();
        assert_eq!((points[0].x, points[0].y), (source.x.unwrap(), source.y.unwrap()));
    }
    // The self-loop is back, without routed points.
    assert!(g.has_edge("a", "a", None));
}

#[test]
fn the_bounding_box_covers_every_vertex() {
    let mut g = new_layout_graph();
    statements(&mut g, &["a", "b", "c", "d"]);
    for (v, w) in [("a", "c"), ("b", "c"), ("c", "d")] {
        g.set_edge(v, w);
    }
    layout(&mut g).unwrap();

    let width = g.graph().width.unwrap();
    let height = g.graph().height.unwrap();
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for id in g.node_ids() {
        let n = g.node(&id).unwrap();
        min_x = min_x.min(n.x.unwrap() - n.width / 2.0);
        max_x = max_x.max(n.x.unwrap() + n.width / 2.0);
        min_y = min_y.min(n.y.unwrap() - n.height / 2.0);
        max_y = max_y.max(n.y.unwrap() + n.height / 2.0);
    }
    assert_eq!(width, max_x - min_x);
    assert_eq!(height, max_y - min_y);
}

#[test]
fn a_warrant_is_drawn_beside_its_targeted_edge() {
    let mut g = new_layout_graph();
    statements(&mut g, &["a", "b", "c"]);
    g.set_edge("a", "c");
    set_warrant_edge(&mut g, "b", ("a", "c"), EdgeLabel::default()).unwrap();
    layout(&mut g).unwrap();

    let a = g.node("a").unwrap();
    let b = g.node("b").unwrap();
    let c = g.node("c").unwrap();
    let sink = g.node("a -> c").unwrap();

    assert_eq!(a.y, Some(0.0));
    assert_eq!(b.y, Some(112.5));
    assert_eq!(sink.y, Some(112.5));
    assert_eq!(c.y, Some(225.0));

    // The sink sits on the inference it annotates; the warrant statement
    // sits in its reserved column beside it.
    assert_eq!(sink.x, a.x);
    assert!(b.x.unwrap() > a.x.unwrap());

    // The warrant edge still connects b to the sink.
    let points = &g.edge("b", "a -> c", None).unwrap().points;
    assert_eq!(points.len(), 3);
}

#[test]
fn layout_is_deterministic() {
    let build = || {
        let mut g = new_layout_graph();
        statements(&mut g, &["a", "b", "c", "d", "e"]);
        for (v, w) in [("a", "d"), ("a", "e"), ("b", "d"), ("c", "d"), ("e", "b")] {
            g.set_edge(v, w);
        }
        g
    };
    let mut first = build();
    let mut second = build();
    layout(&mut first).unwrap();
    layout(&mut second).unwrap();
    for id in first.node_ids() {
        assert_eq!(first.node(&id).unwrap().x, second.node(&id).unwrap().x);
        assert_eq!(first.node(&id).unwrap().y, second.node(&id).unwrap().y);
    }
}
