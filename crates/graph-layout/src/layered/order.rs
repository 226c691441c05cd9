use super::levels::Levels;
use petgraph::visit::{EdgeRef, IntoEdges, IntoNodeIdentifiers};
use std::collections::HashMap;
use std::hash::Hash;

/// Group nodes into rows, one per level, keeping node order inside a row
///
/// No crossing reduction happens here: the declaration order of the nodes
/// is the placement order, which keeps layouts stable across runs.
pub(crate) fn order_levels<G>(graph: G, levels: &Levels<G::NodeId, G::EdgeId>) -> Vec<Vec<G::NodeId>>
where
    G: IntoNodeIdentifiers,
    G::NodeId: Copy + Eq + Hash,
    G::EdgeId: Copy + Eq + Hash,
{
    let mut rows = vec![Vec::new(); levels.count()];
    for node in graph.node_identifiers() {
        if let Some(level) = levels.level(node) {
            rows[level].push(node);
        }
    }
    rows
}

/// Count the edge crossings between adjacent rows
///
/// Only edges going exactly one row down are considered, longer edges and
/// back edges have no straight segment between two neighbouring rows.
pub(crate) fn count_crossings<G>(graph: G, rows: &[Vec<G::NodeId>]) -> usize
where
    G: IntoEdges,
    G::NodeId: Copy + Eq + Hash,
{
    let slots: HashMap<G::NodeId, (usize, usize)> = rows
        .iter()
        .enumerate()
        .flat_map(|(level, row)| {
            row.iter()
                .enumerate()
                .map(move |(index, &node)| (node, (level, index)))
        })
        .collect();

    // Segments between row i and row i + 1, as (upper index, lower index)
    let mut segments = vec![Vec::new(); rows.len()];
    for (level, row) in rows.iter().enumerate() {
        for (index, &node) in row.iter().enumerate() {
            for edge in graph.edges(node) {
                match slots.get(&edge.target()) {
                    Some(&(target_level, target_index)) if target_level == level + 1 => {
                        segments[level].push((index, target_index));
                    }
                    _ => {}
                }
            }
        }
    }

    segments
        .into_iter()
        .map(|mut segments: Vec<(usize, usize)>| {
            // Two segments cross when their lower ends come in the opposite
            // order of their upper ends
            segments.sort_unstable();
            let mut lower: Vec<usize> = segments.into_iter().map(|(_, lower)| lower).collect();
            count_inversions(&mut lower)
        })
        .sum()
}

/// Count pairs `i < j` with `values[i] > values[j]`, sorting `values` in the process
fn count_inversions(values: &mut [usize]) -> usize {
    if values.len() < 2 {
        return 0;
    }

    let mid = values.len() / 2;
    let mut inversions = count_inversions(&mut values[..mid]) + count_inversions(&mut values[mid..]);

    let mut merged = Vec::with_capacity(values.len());
    let (left, right) = values.split_at(mid);
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        if left[i] <= right[j] {
            merged.push(left[i]);
            i += 1;
        } else {
            // Everything left in `left` is greater than right[j]
            inversions += left.len() - i;
            merged.push(right[j]);
            j += 1;
        }
    }
    merged.extend_from_slice(&left[i..]);
    merged.extend_from_slice(&right[j..]);
    values.copy_from_slice(&merged);

    inversions
}
