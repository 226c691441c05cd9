use crate::{Node, Vec2};
use std::collections::HashMap;

/// Shape size of the node used by the renderer
///
/// Only spacing is derived from it, the layout never draws anything.
pub trait ShapeSizes {
    /// Get the width and height of a node's shape
    fn shape_size(&self, node: &Node) -> Vec2;
}

// Blanket implementation for closures
impl<F> ShapeSizes for F
where
    F: Fn(&Node) -> Vec2,
{
    fn shape_size(&self, node: &Node) -> Vec2 {
        self(node)
    }
}

// Every node gets the same shape
impl ShapeSizes for Vec2 {
    fn shape_size(&self, _node: &Node) -> Vec2 {
        *self
    }
}

// Sizes keyed by node id, unknown nodes take no room
impl ShapeSizes for HashMap<String, Vec2> {
    fn shape_size(&self, node: &Node) -> Vec2 {
        self.get(&node.id).copied().unwrap_or(Vec2::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn providers() {
        let node = Node::new("a".to_string(), "A".to_string());
        let other = Node::new("b".to_string(), "B".to_string());

        assert_eq!(Vec2::new(3.0, 4.0).shape_size(&node), Vec2::new(3.0, 4.0));

        let by_label = |n: &Node| Vec2::new(10.0 * n.text.len() as f32, 20.0);
        assert_eq!(by_label.shape_size(&node), Vec2::new(10.0, 20.0));

        let map = HashMap::from([("a".to_string(), Vec2::new(7.0, 8.0))]);
        assert_eq!(map.shape_size(&node), Vec2::new(7.0, 8.0));
        assert_eq!(map.shape_size(&other), Vec2::zero());
    }
}
