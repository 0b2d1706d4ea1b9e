use toulmin::{layout, new_layout_graph, LayoutGraph, NodeLabel};

fn statements(g: &mut LayoutGraph, ids: &[&str]) {
    for id in ids {
        g.set_node(*id, NodeLabel::statement());
    }
}

fn x_of(g: &LayoutGraph, v: &str) -> f64 {
    g.node(v).and_then(|n| n.x).unwrap()
}

fn y_of(g: &LayoutGraph, v: &str) -> f64 {
    g.node(v).and_then(|n| n.y).unwrap()
}

/// Groups vertices by y and checks the separation invariant within each row.
fn assert_separation(g: &LayoutGraph, nodesep: f64) {
    let mut rows: std::collections::BTreeMap<i64, Vec<String>> = std::collections::BTreeMap::new();
    for id in g.node_ids() {
        let Some(y) = g.node(&id).and_then(|n| n.y) else {
            continue;
        };
        rows.entry((y * 2.0).round() as i64).or_default().push(id);
    }
    for row in rows.values_mut() {
        row.sort_by(|a, b| x_of(g, a).total_cmp(&x_of(g, b)));
        for pair in row.windows(2) {
            let (u, v) = (&pair[0], &pair[1]);
            let needed =
                nodesep + (g.node(u).unwrap().width + g.node(v).unwrap().width) / 2.0;
            assert!(
                x_of(g, v) - x_of(g, u) >= needed - 1e-6,
                "{u} and {v} are {:.1} apart, need {needed:.1}",
                x_of(g, v) - x_of(g, u)
            );
        }
    }
}

#[test]
fn a_chain_becomes_one_straight_column() {
    let mut g = new_layout_graph();
    statements(&mut g, &["a", "b", "c"]);
    g.set_edge("a", "b");
    g.set_edge("b", "c");
    layout(&mut g).unwrap();

    assert_eq!(y_of(&g, "a"), 0.0);
    assert_eq!(y_of(&g, "b"), 225.0);
    assert_eq!(y_of(&g, "c"), 450.0);
    assert_eq!(x_of(&g, "a"), x_of(&g, "b"));
    assert_eq!(x_of(&g, "b"), x_of(&g, "c"));
}

#[test]
fn a_fan_in_centers_the_conclusion_near_the_median_premise() {
    let mut g = new_layout_graph();
    statements(&mut g, &["a", "b", "c", "d", "e"]);
    for (v, w) in [("a", "d"), ("a", "e"), ("b", "d"), ("c", "d")] {
        g.set_edge(v, w);
    }
    layout(&mut g).unwrap();

    let mut premises = [x_of(&g, "a"), x_of(&g, "b"), x_of(&g, "c")];
    premises.sort_by(f64::total_cmp);
    let median = premises[1];
    assert!(
        (x_of(&g, "d") - median).abs() <= 100.0,
        "conclusion at {} but median premise at {median}",
        x_of(&g, "d")
    );
    assert_separation(&g, 100.0);
}

#[test]
fn rows_keep_the_configured_node_separation() {
    let mut g = new_layout_graph();
    statements(&mut g, &["a", "b", "c", "d", "e", "f"]);
    for (v, w) in [("a", "c"), ("a", "d"), ("b", "d"), ("b", "e"), ("d", "f")] {
        g.set_edge(v, w);
    }
    layout(&mut g).unwrap();
    assert_separation(&g, 100.0);
}

#[test]
fn conjunct_premises_fill_the_container_side_by_side() {
    let mut g = new_layout_graph();
    statements(&mut g, &["a", "b", "c"]);
    g.set_edge("a", "c");
    toulmin::set_conjunct_node(&mut g, "b", ("a", "c")).unwrap();
    layout(&mut g).unwrap();

    assert_eq!(y_of(&g, "a"), 0.0);
    assert_eq!(y_of(&g, "b"), 0.0);
    assert_eq!(y_of(&g, "c"), 225.0);

    // Premises sit exactly one width plus nodesep apart.
    assert_eq!((x_of(&g, "a") - x_of(&g, "b")).abs(), 400.0);
    // The conclusion is centered over the cluster.
    let midpoint = (x_of(&g, "a") + x_of(&g, "b")) / 2.0;
    assert_eq!(x_of(&g, "c"), midpoint);
    // And the container reports the same center.
    assert_eq!(x_of(&g, "-> c"), midpoint);
}

#[test]
fn custom_spacing_is_respected() {
    let mut g = new_layout_graph();
    g.graph_mut().ranksep = 50.0;
    g.graph_mut().nodesep = 10.0;
    statements(&mut g, &["a", "b", "c"]);
    g.set_edge("a", "b");
    g.set_edge("a", "c");
    layout(&mut g).unwrap();

    assert_eq!(y_of(&g, "b"), 50.0);
    assert_separation(&g, 10.0);
}
