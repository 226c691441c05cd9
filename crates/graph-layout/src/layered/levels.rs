use petgraph::visit::{EdgeRef, IntoEdges, IntoNodeIdentifiers};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, trace};

/// Traversal state of a node during the depth-first walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum VisitState {
    #[default]
    Unvisited,
    /// On the active path, reaching it again closes a cycle
    InProgress,
    Done,
}

/// Work-list item, replaces the call stack of a recursive walk
enum Step<N> {
    Enter(N),
    Exit(N),
}

/// Level of every node, and the edges that were left out to break cycles
#[derive(Debug, Clone)]
pub struct Levels<N, E>
where
    N: Copy + Eq + Hash,
    E: Copy + Eq + Hash,
{
    levels: HashMap<N, usize>,
    back_edges: HashSet<E>,
    count: usize,
}

impl<N, E> Levels<N, E>
where
    N: Copy + Eq + Hash,
    E: Copy + Eq + Hash,
{
    /// Level of a node, `None` if the node is not part of the graph
    pub fn level(&self, node: N) -> Option<usize> {
        self.levels.get(&node).copied()
    }

    /// Whether the edge closes a cycle and was ignored for leveling
    pub fn is_back_edge(&self, edge: E) -> bool {
        self.back_edges.contains(&edge)
    }

    pub fn back_edges(&self) -> impl Iterator<Item = E> + '_ {
        self.back_edges.iter().copied()
    }

    /// Number of levels, zero for an empty graph
    pub fn count(&self) -> usize {
        self.count
    }
}

/// Assign a level to every node of a possibly cyclic graph
///
/// Two passes:
/// - A depth-first walk starting from the nodes without incoming edges (in
///   node order), then from any node still unvisited, which stands in as the
///   root of a component that only contains cycles. Edges reaching a node on
///   the active path are recorded as back edges.
/// - With back edges left out the graph is acyclic and the reversed finish
///   order is topological, so each node is placed one level below its
///   deepest predecessor.
pub(crate) fn assign_levels<G>(graph: G) -> Levels<G::NodeId, G::EdgeId>
where
    G: IntoNodeIdentifiers + IntoEdges,
    G::NodeId: Copy + Eq + Hash + Debug,
    G::EdgeId: Copy + Ord + Hash + Debug,
{
    let mut in_degree: HashMap<G::NodeId, usize> =
        graph.node_identifiers().map(|node| (node, 0)).collect();
    for node in graph.node_identifiers() {
        for edge in graph.edges(node) {
            *in_degree.entry(edge.target()).or_default() += 1;
        }
    }

    let mut state = HashMap::new();
    let mut back_edges = HashSet::new();
    let mut finished = Vec::with_capacity(in_degree.len());

    for root in graph.node_identifiers().filter(|node| in_degree[node] == 0) {
        walk(graph, root, &mut state, &mut back_edges, &mut finished);
    }

    for node in graph.node_identifiers() {
        if state.get(&node).copied().unwrap_or_default() == VisitState::Unvisited {
            debug!("No root reaches {node:?}, using it as a synthetic root");
            walk(graph, node, &mut state, &mut back_edges, &mut finished);
        }
    }

    let mut levels: HashMap<G::NodeId, usize> = HashMap::with_capacity(finished.len());
    for &node in finished.iter().rev() {
        let level = *levels.entry(node).or_insert(0);
        for edge in graph.edges(node) {
            if back_edges.contains(&edge.id()) {
                continue;
            }
            let child = levels.entry(edge.target()).or_insert(0);
            *child = (*child).max(level + 1);
        }
    }

    let count = levels.values().max().map_or(0, |max| max + 1);
    debug!(
        "Assigned {} nodes to {count} levels, {} back edges",
        levels.len(),
        back_edges.len()
    );

    Levels {
        levels,
        back_edges,
        count,
    }
}

/// Depth-first walk from `root` with an explicit work-list
fn walk<G>(
    graph: G,
    root: G::NodeId,
    state: &mut HashMap<G::NodeId, VisitState>,
    back_edges: &mut HashSet<G::EdgeId>,
    finished: &mut Vec<G::NodeId>,
) where
    G: IntoEdges,
    G::NodeId: Copy + Eq + Hash + Debug,
    G::EdgeId: Copy + Ord + Hash + Debug,
{
    let mut stack = vec![Step::Enter(root)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Exit(node) => {
                state.insert(node, VisitState::Done);
                finished.push(node);
            }
            Step::Enter(node) => {
                // Already reached through another path
                if state.get(&node).copied().unwrap_or_default() != VisitState::Unvisited {
                    continue;
                }
                state.insert(node, VisitState::InProgress);
                stack.push(Step::Exit(node));

                // Push in reverse so the first declared edge is followed first
                let mut edges: Vec<_> = graph.edges(node).collect();
                edges.sort_by_key(|edge| Reverse(edge.id()));

                for edge in edges {
                    let target = edge.target();
                    match state.get(&target).copied().unwrap_or_default() {
                        VisitState::InProgress => {
                            trace!("Edge {:?} closes a cycle at {target:?}", edge.id());
                            back_edges.insert(edge.id());
                        }
                        VisitState::Unvisited => stack.push(Step::Enter(target)),
                        VisitState::Done => {}
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::graph::{DiGraph, NodeIndex};
    use test_log::test;

    fn graph(nodes: usize, edges: &[(u32, u32)]) -> (DiGraph<(), ()>, Vec<NodeIndex>) {
        let mut graph = DiGraph::new();
        let nodes = (0..nodes).map(|_| graph.add_node(())).collect();
        graph.extend_with_edges(edges);
        (graph, nodes)
    }

    #[test]
    fn chain() {
        let (graph, nodes) = graph(4, &[(0, 1), (1, 2), (2, 3)]);
        let levels = assign_levels(&graph);

        let got: Vec<_> = nodes.iter().map(|&n| levels.level(n).unwrap()).collect();
        assert_eq!(got, vec![0, 1, 2, 3]);
        assert_eq!(levels.count(), 4);
        assert_eq!(levels.back_edges().count(), 0);
    }

    #[test]
    fn longest_path_wins() {
        // 0 -> 1 -> 2 and a shortcut 0 -> 2
        let (graph, nodes) = graph(3, &[(0, 2), (0, 1), (1, 2)]);
        let levels = assign_levels(&graph);

        assert_eq!(levels.level(nodes[0]), Some(0));
        assert_eq!(levels.level(nodes[1]), Some(1));
        assert_eq!(levels.level(nodes[2]), Some(2));
    }

    #[test]
    fn self_loop() {
        let (graph, nodes) = graph(1, &[(0, 0)]);
        let levels = assign_levels(&graph);

        assert_eq!(levels.level(nodes[0]), Some(0));
        assert_eq!(levels.back_edges().count(), 1);
        assert_eq!(levels.count(), 1);
    }

    #[test]
    fn two_cycle() {
        let (graph, nodes) = graph(2, &[(0, 1), (1, 0)]);
        let levels = assign_levels(&graph);

        assert_eq!(levels.level(nodes[0]), Some(0));
        assert_eq!(levels.level(nodes[1]), Some(1));

        let back: Vec<_> = levels.back_edges().collect();
        assert_eq!(back.len(), 1);
        assert_eq!(graph.edge_endpoints(back[0]), Some((nodes[1], nodes[0])));
    }

    #[test]
    fn cycle_below_a_root() {
        // 0 -> 1 -> 2 -> 1
        let (graph, nodes) = graph(3, &[(0, 1), (1, 2), (2, 1)]);
        let levels = assign_levels(&graph);

        let got: Vec<_> = nodes.iter().map(|&n| levels.level(n).unwrap()).collect();
        assert_eq!(got, vec![0, 1, 2]);
        let back: Vec<_> = levels.back_edges().collect();
        assert_eq!(graph.edge_endpoints(back[0]), Some((nodes[2], nodes[1])));
    }

    #[test]
    fn disconnected_components() {
        // 0 -> 1, and a rootless cycle 2 -> 3 -> 2, and an isolated 4
        let (graph, nodes) = graph(5, &[(0, 1), (2, 3), (3, 2)]);
        let levels = assign_levels(&graph);

        let got: Vec<_> = nodes.iter().map(|&n| levels.level(n).unwrap()).collect();
        assert_eq!(got, vec![0, 1, 0, 1, 0]);
        assert_eq!(levels.count(), 2);
    }

    #[test]
    fn parallel_edges() {
        let (graph, nodes) = graph(2, &[(0, 1), (0, 1)]);
        let levels = assign_levels(&graph);

        assert_eq!(levels.level(nodes[1]), Some(1));
        assert_eq!(levels.back_edges().count(), 0);
    }

    #[test]
    fn empty() {
        let (graph, _) = graph(0, &[]);
        let levels = assign_levels(&graph);
        assert_eq!(levels.count(), 0);
    }
}
