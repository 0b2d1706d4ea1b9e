//! Layered layout for argument maps.
//!
//! Statements are vertices, inferences are directed edges, and two
//! argument-specific structures get first-class treatment: conjunct clusters
//! (premises that jointly imply one conclusion, kept side by side in a
//! layer) and warrants (a statement licensing an inference, drawn beside the
//! edge it targets). The pipeline is Sugiyama-style: cycle removal, network
//! simplex ranking, constrained barycenter ordering, Brandes-Koepf
//! positioning, and Bezier routing.
//!
//! ```no_run
//! use toulmin::{layout, new_layout_graph, NodeLabel};
//!
//! let mut g = new_layout_graph();
//! g.set_node("all humans are mortal", NodeLabel::statement());
//! g.set_node("socrates is mortal", NodeLabel::statement());
//! g.set_edge("all humans are mortal", "socrates is mortal");
//! layout(&mut g).unwrap();
//! let conclusion = g.node("socrates is mortal").unwrap();
//! println!("at ({:?}, {:?})", conclusion.x, conclusion.y);
//! ```

pub use toulmin_graphlib as graphlib;

pub mod acyclic;
pub mod argument;
mod error;
pub mod model;
pub mod normalize;
pub mod order;
pub mod pipeline;
pub mod position;
pub mod rank;
pub mod rank_table;
pub mod router;
pub(crate) mod util;

pub use argument::{
    new_layout_graph, remove_edge_and_cleanup, set_conjunct_node, set_warrant_edge,
};
pub use error::{Error, Result};
pub use model::{DummyKind, EdgeLabel, GraphLabel, LayoutGraph, NodeLabel, Point};
pub use pipeline::layout;
pub use rank_table::RankTable;
