use anyhow::{Context, Result};
use diagram_layout::{Diagram, EdgeDef, Node};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct DiagramFile {
    name: String,
    #[serde(default)]
    nodes: Vec<NodeFile>,
    #[serde(default)]
    edges: Vec<EdgeFile>,
}

#[derive(Debug, Deserialize)]
struct NodeFile {
    id: String,
    /// Shown text, the id when empty
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct EdgeFile {
    /// `from->to` when empty
    #[serde(default)]
    id: String,
    #[serde(default)]
    text: String,
    from: String,
    to: String,
}

impl DiagramFile {
    fn into_diagram(self) -> Result<Diagram> {
        let nodes = self.nodes.into_iter().map(|node| {
            let text = if node.text.is_empty() {
                node.id.clone()
            } else {
                node.text
            };
            Node::new(node.id, text)
        });
        let edges = self.edges.into_iter().map(|edge| {
            let id = if edge.id.is_empty() {
                format!("{}->{}", edge.from, edge.to)
            } else {
                edge.id
            };
            EdgeDef::new(id, edge.text, edge.from, edge.to)
        });

        Diagram::new(&self.name, nodes, edges)
            .with_context(|| format!("Invalid diagram {:?}", self.name))
    }
}

/// Parse a list of diagrams from RON
pub fn parse(source: &str) -> Result<Vec<Diagram>> {
    let files: Vec<DiagramFile> = ron::from_str(source).context("Failed to parse diagrams")?;
    files.into_iter().map(DiagramFile::into_diagram).collect()
}

/// Load every diagram declared in a RON file
pub fn load(path: &Path) -> Result<Vec<Diagram>> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse(&source).with_context(|| format!("Failed to load {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    const ROUTES: &str = r#"[
        (
            name: "orders",
            nodes: [
                (id: "in", text: "from:jms"),
                (id: "split"),
                (id: "out", text: "to:file"),
            ],
            edges: [
                (id: "e1", from: "in", to: "split"),
                (text: "body", from: "split", to: "out"),
            ],
        ),
        (name: "empty"),
    ]"#;

    #[test]
    fn parse_diagrams() {
        let diagrams = parse(ROUTES).unwrap();
        assert_eq!(diagrams.len(), 2);

        let orders = &diagrams[0];
        assert_eq!(orders.name(), "orders");
        assert_eq!(orders.node_count(), 3);

        let split = orders.find("split").unwrap();
        assert_eq!(orders.node(split).unwrap().text, "split");

        let edges: Vec<_> = orders.edges().collect();
        assert_eq!(orders.edge(edges[0]).unwrap().id, "e1");
        let second = orders.edge(edges[1]).unwrap();
        assert_eq!(second.id, "split->out");
        assert_eq!(second.text, "body");

        assert_eq!(diagrams[1].node_count(), 0);
    }

    #[test]
    fn invalid_diagram_is_reported() {
        let source = r#"[(name: "broken", nodes: [(id: "a")], edges: [(from: "a", to: "b")])]"#;
        let err = parse(source).unwrap_err();
        assert!(format!("{err:#}").contains("unknown node \"b\""));
    }

    #[test]
    fn labelled_node_and_explicit_edge_id() {
        let source = r#"[(
            name: "d",
            nodes: [(id: "a", text: "A"), (id: "b")],
            edges: [(id: "ab", text: "go", from: "a", to: "b")],
        )]"#;
        let diagrams = parse(source).unwrap();
        let diagram = &diagrams[0];

        let a = diagram.find("a").unwrap();
        let b = diagram.find("b").unwrap();
        assert_eq!(diagram.node(a).unwrap().text, "A");
        assert_eq!(diagram.node(b).unwrap().text, "b");

        let edge = diagram.edges().next().unwrap();
        assert_eq!(diagram.edge(edge).unwrap().id, "ab");
        assert_eq!(diagram.edge(edge).unwrap().text, "go");
    }

    #[test]
    fn demo_routes() {
        let diagrams = parse(include_str!("../../../demos/routes.ron")).unwrap();
        let names: Vec<_> = diagrams.iter().map(Diagram::name).collect();
        assert_eq!(names, vec!["orders", "heartbeat"]);
        assert_eq!(diagrams[0].edge_count(), 6);
    }

    #[test]
    fn missing_file() {
        assert!(load(Path::new("does/not/exist.ron")).is_err());
    }
}
