use crate::{Point, Vec2};
use std::collections::HashMap;
use std::hash::Hash;

/// Unscaled node coordinates and the box they fit in
#[derive(Debug, Clone)]
pub struct Placement<N>
where
    N: Copy + Eq + Hash,
{
    /// Top-left corner of each node shape
    pub positions: HashMap<N, Point>,

    /// Natural size of the diagram
    pub size: Vec2,
}

/// Assign coordinates to nodes based on their rows and shape sizes
///
/// Rows are stacked top to bottom, each one as tall as its tallest node plus
/// the vertical margin. Inside a row nodes are laid left to right, each one
/// taking its width plus the horizontal margin, and the row is centered
/// against the widest one.
pub(crate) fn assign_coordinates<N, F>(rows: &[Vec<N>], size_of: F, margin: Vec2) -> Placement<N>
where
    N: Copy + Eq + Hash,
    F: Fn(N) -> Vec2,
{
    // Width of each row (margins included) and height of its tallest node
    let extents: Vec<Vec2> = rows
        .iter()
        .map(|row| {
            row.iter().map(|&node| size_of(node)).fold(Vec2::zero(), |extent, size| {
                Vec2::new(extent.x + size.x + margin.x, extent.y.max(size.y))
            })
        })
        .collect();

    let width = extents.iter().map(|extent| extent.x).fold(0.0, f32::max);

    let mut positions = HashMap::new();
    let mut y = 0.0;
    for (row, extent) in rows.iter().zip(&extents) {
        let mut x = (width - extent.x) / 2.0;
        for &node in row {
            positions.insert(node, Point::new(x, y));
            x += size_of(node).x + margin.x;
        }
        y += extent.y + margin.y;
    }

    Placement {
        positions,
        size: Vec2::new(width, y),
    }
}
