use anyhow::{anyhow, Context, Result};
use diagram_layout::{Diagram, EdgeIndex, LayoutEngine, NodeIndex};
use enum_dispatch::enum_dispatch;
use ron::ser::PrettyConfig;
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Output written for a laid out diagram
#[enum_dispatch]
pub trait Render {
    /// File extension of the produced output
    fn extension(&self) -> &'static str;

    /// Write an initialized layout to `out`
    fn render(&self, engine: &LayoutEngine<'_>, out: &mut dyn Write) -> Result<()>;
}

#[enum_dispatch(Render)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Renderer {
    Text(TextRenderer),
    Ron(RonRenderer),
}

/// Known renderers by name
const RENDERERS: &[(&str, Renderer)] = &[
    ("text", Renderer::Text(TextRenderer)),
    ("ron", Renderer::Ron(RonRenderer)),
];

impl FromStr for Renderer {
    type Err = anyhow::Error;

    fn from_str(name: &str) -> Result<Self> {
        RENDERERS
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|&(_, renderer)| renderer)
            .ok_or_else(|| {
                let known: Vec<_> = RENDERERS.iter().map(|(known, _)| *known).collect();
                anyhow!("Unknown renderer {name:?}, expected one of {}", known.join(", "))
            })
    }
}

impl fmt::Display for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = RENDERERS
            .iter()
            .find(|(_, renderer)| renderer == self)
            .map_or("?", |(name, _)| *name);
        f.write_str(name)
    }
}

fn node_id(diagram: &Diagram, node: NodeIndex) -> Result<&str> {
    diagram
        .node(node)
        .map(|node| node.id.as_str())
        .with_context(|| format!("Node {node:?} is not part of {:?}", diagram.name()))
}

fn endpoints(diagram: &Diagram, edge: EdgeIndex) -> Result<(&str, &str)> {
    let source = diagram.source(edge).context("Edge without source")?;
    let dest = diagram.dest(edge).context("Edge without destination")?;
    Ok((node_id(diagram, source)?, node_id(diagram, dest)?))
}

/// Line oriented dump of the layout, one line per node and edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRenderer;

impl Render for TextRenderer {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, engine: &LayoutEngine<'_>, out: &mut dyn Write) -> Result<()> {
        let diagram = engine.diagram();
        let size = engine.size()?;
        writeln!(
            out,
            "diagram {:?} size {}x{} scale {}",
            diagram.name(),
            size.x,
            size.y,
            engine.scale()?
        )?;

        for node in diagram.nodes() {
            let position = engine.position(node)?;
            let shape = engine.shape_size(node)?;
            let text = diagram.node(node).map_or("", |node| node.text.as_str());
            writeln!(
                out,
                "node {} {text:?} at {},{} size {}x{} level {}",
                node_id(diagram, node)?,
                position.x,
                position.y,
                shape.x,
                shape.y,
                engine.level(node)?
            )?;
        }

        for edge in diagram.edges() {
            let (source, dest) = endpoints(diagram, edge)?;
            let Some(weight) = diagram.edge(edge) else {
                continue;
            };
            let back = if engine.is_back_edge(edge)? { " back" } else { "" };
            writeln!(out, "edge {} {:?} {source} -> {dest}{back}", weight.id, weight.text)?;
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct Snapshot<'a> {
    name: &'a str,
    size: (f32, f32),
    scale: f32,
    nodes: Vec<NodeSnapshot<'a>>,
    edges: Vec<EdgeSnapshot<'a>>,
}

#[derive(Serialize)]
struct NodeSnapshot<'a> {
    id: &'a str,
    text: &'a str,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    level: usize,
}

#[derive(Serialize)]
struct EdgeSnapshot<'a> {
    id: &'a str,
    text: &'a str,
    from: &'a str,
    to: &'a str,
    back: bool,
}

/// Serialized layout, for tools that draw it themselves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RonRenderer;

impl Render for RonRenderer {
    fn extension(&self) -> &'static str {
        "ron"
    }

    fn render(&self, engine: &LayoutEngine<'_>, out: &mut dyn Write) -> Result<()> {
        let diagram = engine.diagram();
        let size = engine.size()?;

        let nodes = diagram
            .nodes()
            .filter_map(|node| diagram.node(node).map(|weight| (node, weight)))
            .map(|(node, weight)| -> Result<NodeSnapshot<'_>> {
                let position = engine.position(node)?;
                let shape = engine.shape_size(node)?;
                Ok(NodeSnapshot {
                    id: &weight.id,
                    text: &weight.text,
                    x: position.x,
                    y: position.y,
                    width: shape.x,
                    height: shape.y,
                    level: engine.level(node)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let edges = diagram
            .edges()
            .filter_map(|edge| diagram.edge(edge).map(|weight| (edge, weight)))
            .map(|(edge, weight)| -> Result<EdgeSnapshot<'_>> {
                let (from, to) = endpoints(diagram, edge)?;
                Ok(EdgeSnapshot {
                    id: &weight.id,
                    text: &weight.text,
                    from,
                    to,
                    back: engine.is_back_edge(edge)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let snapshot = Snapshot {
            name: diagram.name(),
            size: (size.x, size.y),
            scale: engine.scale()?,
            nodes,
            edges,
        };

        let serialized = ron::ser::to_string_pretty(&snapshot, PrettyConfig::default())
            .context("Failed to serialize layout")?;
        writeln!(out, "{serialized}")?;
        Ok(())
    }
}
