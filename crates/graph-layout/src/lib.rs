//! Level layout for diagrams
//!
//! This crate turns a directed diagram of named nodes and labelled edges
//! into 2D coordinates that any renderer can draw. Nodes are placed on
//! levels (rows) growing with the depth from the roots, ordered left to
//! right by declaration order, and the result is optionally scaled to fit a
//! requested canvas. Cyclic and disconnected diagrams are handled.
//!
//! # Pipeline
//!
//! - [`Diagram`]: validated graph model
//! - [`LevelLayout::compute_layers`]: levels and per-level ordering
//! - [`LevelLayout::compute_positions`]: natural coordinates and size
//! - [`scale::fit`]: reconcile natural and requested sizes
//! - [`LayoutEngine`]: runs all of the above and answers renderer queries
//!
//! # Example
//!
//! ```
//! use diagram_layout::{Diagram, EdgeDef, LayoutEngine, Node, Vec2};
//!
//! let nodes = ["from", "to"].map(|id| Node::new(id.to_string(), id.to_string()));
//! let edges = [EdgeDef::new(
//!     "route".to_string(),
//!     "direct".to_string(),
//!     "from".to_string(),
//!     "to".to_string(),
//! )];
//! let diagram = Diagram::new("example", nodes, edges).unwrap();
//!
//! let mut engine = LayoutEngine::new(&diagram);
//! engine.set_shape_sizes(Vec2::new(100.0, 50.0));
//! engine.set_ignore_size(true);
//! engine.initialize();
//!
//! let to = diagram.find("to").unwrap();
//! assert_eq!(engine.y(to).unwrap(), 70.0);
//! assert_eq!(engine.size().unwrap(), Vec2::new(120.0, 140.0));
//! ```

mod engine;
mod geometry;
mod model;
mod sizes;

pub mod layered;
pub mod scale;

pub use engine::{LayoutEngine, LayoutError};
pub use geometry::{Point, Vec2};
pub use model::{Diagram, DiagramError, Edge, EdgeDef, Node};
pub use sizes::ShapeSizes;

// Re-export petgraph index types used to address nodes and edges
pub use petgraph::graph::{EdgeIndex, NodeIndex};

pub use layered::{Layers, LevelLayout};
