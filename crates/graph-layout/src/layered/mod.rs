mod levels;
mod order;
mod positions;

use crate::Vec2;
use petgraph::visit::{IntoEdges, IntoNodeIdentifiers};
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

pub use levels::Levels;
pub use positions::Placement;

use levels::assign_levels;
use order::{count_crossings, order_levels};
use positions::assign_coordinates;

/// Configuration for the level (rank based) layout
#[derive(Debug, Clone)]
pub struct LevelLayout {
    /// Horizontal and vertical margins between nodes
    pub margin: Vec2,
}

impl Default for LevelLayout {
    fn default() -> Self {
        Self {
            margin: Vec2::new(20.0, 20.0),
        }
    }
}

impl LevelLayout {
    /// Create a new level layout with the given margin
    pub fn new(margin: Vec2) -> Self {
        Self { margin }
    }
}

/// Level structure that can be cached and reused
#[derive(Debug, Clone)]
pub struct Layers<N, E>
where
    N: Copy + Eq + Hash,
    E: Copy + Eq + Hash,
{
    /// Level of each node and the edges ignored to break cycles
    pub levels: Levels<N, E>,

    /// Nodes of each level, left to right
    pub nodes: Vec<Vec<N>>,

    /// Number of edge crossings between adjacent levels (quality metric)
    pub crossings: usize,
}

impl LevelLayout {
    /// Compute the level structure
    ///
    /// This phase only depends on the graph structure, not on node sizes.
    /// It never fails: cycles are broken by ignoring their back edges.
    pub fn compute_layers<G>(&self, graph: G) -> Layers<G::NodeId, G::EdgeId>
    where
        G: IntoNodeIdentifiers + IntoEdges,
        G::NodeId: Copy + Eq + Hash + Debug,
        G::EdgeId: Copy + Ord + Hash + Debug,
    {
        let levels = assign_levels(graph);
        let nodes = order_levels(graph, &levels);
        let crossings = count_crossings(graph, &nodes);
        debug!("{} levels with {crossings} crossings", nodes.len());

        Layers {
            levels,
            nodes,
            crossings,
        }
    }

    /// Compute unscaled positions from cached layers
    ///
    /// Cheap compared to [`LevelLayout::compute_layers`], rerun it when the
    /// shape sizes change.
    pub fn compute_positions<N, E, F>(&self, layers: &Layers<N, E>, size_of: F) -> Placement<N>
    where
        N: Copy + Eq + Hash,
        E: Copy + Eq + Hash,
        F: Fn(N) -> Vec2,
    {
        assign_coordinates(&layers.nodes, size_of, self.margin)
    }
}
