use crate::layered::{Layers, LevelLayout};
use crate::scale::{fit, Fit};
use crate::{Diagram, Point, ShapeSizes, Vec2};
use petgraph::graph::{EdgeIndex, NodeIndex};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Errors returned by [`LayoutEngine`] queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The layout was queried before `initialize` or `reset`
    #[error("layout queried before being initialized")]
    NotInitialized,

    #[error("node {0:?} is not part of the diagram")]
    UnknownNode(NodeIndex),

    #[error("edge {0:?} is not part of the diagram")]
    UnknownEdge(EdgeIndex),
}

/// Result of a full pipeline run
#[derive(Debug)]
struct Computed {
    layers: Layers<NodeIndex, EdgeIndex>,
    natural: Vec2,
    fit: Fit,
    positions: HashMap<NodeIndex, Point>,
}

/// Computes and serves the coordinates of one diagram
///
/// The engine is configured first, then computed once with
/// [`LayoutEngine::initialize`]. Changing the configuration drops the
/// computed layout, so queries fail until the next `initialize` or `reset`.
pub struct LayoutEngine<'d> {
    diagram: &'d Diagram,
    layout: LevelLayout,
    size: Vec2,
    ignore_size: bool,
    sizes: Box<dyn ShapeSizes + 'd>,
    computed: Option<Computed>,
}

impl<'d> LayoutEngine<'d> {
    /// 640x480 canvas, 50x50 shapes and 20 pixel margins
    pub fn new(diagram: &'d Diagram) -> Self {
        Self {
            diagram,
            layout: LevelLayout::default(),
            size: Vec2::new(640.0, 480.0),
            ignore_size: false,
            sizes: Box::new(Vec2::new(50.0, 50.0)),
            computed: None,
        }
    }

    /// Requested canvas size
    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
        self.computed = None;
    }

    /// When set, the final size is the natural size and nothing is scaled
    pub fn set_ignore_size(&mut self, ignore_size: bool) {
        self.ignore_size = ignore_size;
        self.computed = None;
    }

    pub fn set_shape_sizes(&mut self, sizes: impl ShapeSizes + 'd) {
        self.sizes = Box::new(sizes);
        self.computed = None;
    }

    pub fn set_margin(&mut self, margin: Vec2) {
        self.layout.margin = margin;
        self.computed = None;
    }

    pub fn requested_size(&self) -> Vec2 {
        self.size
    }

    pub fn ignore_size(&self) -> bool {
        self.ignore_size
    }

    pub fn margin(&self) -> Vec2 {
        self.layout.margin
    }

    /// Run the layout unless the current configuration was already computed
    pub fn initialize(&mut self) {
        if self.computed.is_none() {
            self.computed = Some(self.compute());
        }
    }

    /// Drop any computed layout and run it again from scratch
    pub fn reset(&mut self) {
        self.computed = None;
        self.initialize();
    }

    pub fn is_initialized(&self) -> bool {
        self.computed.is_some()
    }

    fn compute(&self) -> Computed {
        let graph = self.diagram.graph();
        let layers = self.layout.compute_layers(graph);
        let placement = self
            .layout
            .compute_positions(&layers, |node| self.sizes.shape_size(&graph[node]));
        let fit = fit(placement.size, self.size, self.ignore_size);

        debug!(
            "Layout of {:?}: natural size {:?}, final size {:?}, scale {}",
            self.diagram.name(),
            placement.size,
            fit.size,
            fit.scale
        );

        let positions = placement
            .positions
            .into_iter()
            .map(|(node, position)| (node, position * fit.scale))
            .collect();

        Computed {
            layers,
            natural: placement.size,
            fit,
            positions,
        }
    }

    fn computed(&self) -> Result<&Computed, LayoutError> {
        self.computed.as_ref().ok_or(LayoutError::NotInitialized)
    }

    /// The diagram being laid out, for renderers that need the topology
    pub fn diagram(&self) -> &'d Diagram {
        self.diagram
    }

    /// Final canvas size
    pub fn size(&self) -> Result<Vec2, LayoutError> {
        Ok(self.computed()?.fit.size)
    }

    /// Size of the content before fitting it to the requested size
    pub fn natural_size(&self) -> Result<Vec2, LayoutError> {
        Ok(self.computed()?.natural)
    }

    /// Factor applied to every natural position
    pub fn scale(&self) -> Result<f32, LayoutError> {
        Ok(self.computed()?.fit.scale)
    }

    /// Top-left corner of the node shape
    pub fn position(&self, node: NodeIndex) -> Result<Point, LayoutError> {
        self.computed()?
            .positions
            .get(&node)
            .copied()
            .ok_or(LayoutError::UnknownNode(node))
    }

    pub fn x(&self, node: NodeIndex) -> Result<f32, LayoutError> {
        Ok(self.position(node)?.x)
    }

    pub fn y(&self, node: NodeIndex) -> Result<f32, LayoutError> {
        Ok(self.position(node)?.y)
    }

    /// Configured shape size of a node, available before initialization
    pub fn shape_size(&self, node: NodeIndex) -> Result<Vec2, LayoutError> {
        self.diagram
            .node(node)
            .map(|node| self.sizes.shape_size(node))
            .ok_or(LayoutError::UnknownNode(node))
    }

    pub fn level(&self, node: NodeIndex) -> Result<usize, LayoutError> {
        self.computed()?
            .layers
            .levels
            .level(node)
            .ok_or(LayoutError::UnknownNode(node))
    }

    /// Whether the edge closes a cycle and was ignored for leveling
    pub fn is_back_edge(&self, edge: EdgeIndex) -> Result<bool, LayoutError> {
        let computed = self.computed()?;
        if self.diagram.edge(edge).is_none() {
            return Err(LayoutError::UnknownEdge(edge));
        }
        Ok(computed.layers.levels.is_back_edge(edge))
    }

    pub fn layers(&self) -> Result<&Layers<NodeIndex, EdgeIndex>, LayoutError> {
        Ok(&self.computed()?.layers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EdgeDef, Node};
    use test_log::test;

    fn diagram(nodes: &[&str], edges: &[(&str, &str)]) -> Diagram {
        Diagram::new(
            "test",
            nodes
                .iter()
                .map(|id| Node::new(id.to_string(), id.to_string())),
            edges.iter().enumerate().map(|(i, (from, to))| {
                EdgeDef::new(format!("e{i}"), String::new(), from.to_string(), to.to_string())
            }),
        )
        .unwrap()
    }

    #[test]
    fn query_before_initialize() {
        let diagram = diagram(&["a"], &[]);
        let a = diagram.find("a").unwrap();
        let engine = LayoutEngine::new(&diagram);

        assert!(!engine.is_initialized());
        assert_eq!(engine.size(), Err(LayoutError::NotInitialized));
        assert_eq!(engine.x(a), Err(LayoutError::NotInitialized));
        assert_eq!(engine.shape_size(a), Ok(Vec2::new(50.0, 50.0)));
    }

    #[test]
    fn natural_layout() {
        let diagram = diagram(&["a", "b", "c"], &[("a", "b"), ("a", "c")]);
        let [a, b, c] = ["a", "b", "c"].map(|id| diagram.find(id).unwrap());

        let mut engine = LayoutEngine::new(&diagram);
        engine.set_ignore_size(true);
        engine.initialize();

        assert_eq!(engine.size(), Ok(Vec2::new(140.0, 140.0)));
        assert_eq!(engine.scale(), Ok(1.0));
        assert_eq!(engine.position(a), Ok(Point::new(35.0, 0.0)));
        assert_eq!(engine.position(b), Ok(Point::new(0.0, 70.0)));
        assert_eq!(engine.position(c), Ok(Point::new(70.0, 70.0)));
        assert_eq!(engine.level(c), Ok(1));
    }

    #[test]
    fn scaled_layout() {
        let diagram = diagram(&["a", "b", "c"], &[("a", "b"), ("a", "c")]);
        let c = diagram.find("c").unwrap();

        let mut engine = LayoutEngine::new(&diagram);
        engine.set_size(Vec2::new(70.0, 280.0));
        engine.initialize();

        assert_eq!(engine.natural_size(), Ok(Vec2::new(140.0, 140.0)));
        assert_eq!(engine.scale(), Ok(0.5));
        assert_eq!(engine.size(), Ok(Vec2::new(70.0, 70.0)));
        assert_eq!(engine.position(c), Ok(Point::new(35.0, 35.0)));
    }

    #[test]
    fn configuration_change_requires_recompute() {
        let diagram = diagram(&["a", "b"], &[("a", "b")]);
        let b = diagram.find("b").unwrap();

        let mut engine = LayoutEngine::new(&diagram);
        engine.set_ignore_size(true);
        engine.initialize();
        let before = engine.position(b).unwrap();

        engine.initialize();
        assert_eq!(engine.position(b), Ok(before));

        engine.set_margin(Vec2::new(0.0, 0.0));
        assert_eq!(engine.position(b), Err(LayoutError::NotInitialized));

        engine.reset();
        assert_eq!(engine.position(b), Ok(Point::new(0.0, 50.0)));
    }

    #[test]
    fn shape_sizes_from_labels() {
        let diagram = diagram(&["a", "long"], &[]);
        let long = diagram.find("long").unwrap();

        let mut engine = LayoutEngine::new(&diagram);
        engine.set_ignore_size(true);
        engine.set_margin(Vec2::new(10.0, 10.0));
        engine.set_shape_sizes(|node: &Node| Vec2::new(10.0 * node.text.len() as f32, 20.0));
        engine.reset();

        assert_eq!(engine.shape_size(long), Ok(Vec2::new(40.0, 20.0)));
        assert_eq!(engine.x(long), Ok(20.0));
        assert_eq!(engine.size(), Ok(Vec2::new(70.0, 30.0)));
    }

    #[test]
    fn back_edges_and_unknown_ids() {
        let diagram = diagram(&["a", "b"], &[("a", "b"), ("b", "a")]);
        let edges: Vec<_> = diagram.edges().collect();

        let mut engine = LayoutEngine::new(&diagram);
        engine.initialize();

        assert_eq!(engine.is_back_edge(edges[0]), Ok(false));
        assert_eq!(engine.is_back_edge(edges[1]), Ok(true));
        assert_eq!(
            engine.is_back_edge(EdgeIndex::new(9)),
            Err(LayoutError::UnknownEdge(EdgeIndex::new(9)))
        );
        assert_eq!(
            engine.position(NodeIndex::new(9)),
            Err(LayoutError::UnknownNode(NodeIndex::new(9)))
        );
    }

    #[test]
    fn empty_diagram() {
        let diagram = diagram(&[], &[]);
        let mut engine = LayoutEngine::new(&diagram);
        engine.initialize();

        assert_eq!(engine.size(), Ok(Vec2::new(640.0, 480.0)));
        assert_eq!(engine.natural_size(), Ok(Vec2::zero()));
        assert_eq!(engine.layers().unwrap().nodes.len(), 0);

        engine.set_ignore_size(true);
        engine.initialize();
        assert_eq!(engine.size(), Ok(Vec2::zero()));
    }
}
