mod loader;
mod render;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use diagram_layout::{Diagram, LayoutEngine, Vec2};
use render::{Render, Renderer};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Lay out route diagrams and write their coordinates
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// RON file holding the diagrams
    #[arg(short, long)]
    input: PathBuf,

    /// Directory receiving one file per diagram
    #[arg(short, long, default_value = "target/diagram")]
    output: PathBuf,

    /// Requested canvas width
    #[arg(long, default_value_t = 640.0)]
    width: f32,

    /// Requested canvas height
    #[arg(long, default_value_t = 480.0)]
    height: f32,

    /// Keep the natural size of each diagram instead of scaling it to the canvas
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    adjust: bool,

    /// Output kind: text or ron
    #[arg(short, long, default_value = "text")]
    renderer: Renderer,

    #[arg(long, default_value_t = 50.0)]
    node_width: f32,

    #[arg(long, default_value_t = 50.0)]
    node_height: f32,

    /// Space between nodes, both horizontally and vertically
    #[arg(long, default_value_t = 20.0)]
    margin: f32,
}

impl Args {
    /// Engine configured from the command line, not yet initialized
    fn engine<'d>(&self, diagram: &'d Diagram) -> LayoutEngine<'d> {
        let mut engine = LayoutEngine::new(diagram);
        engine.set_size(Vec2::new(self.width, self.height));
        engine.set_ignore_size(self.adjust);
        engine.set_shape_sizes(Vec2::new(self.node_width, self.node_height));
        engine.set_margin(Vec2::new(self.margin, self.margin));
        engine
    }
}

/// Diagram names become file names inside the output directory
fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." {
        bail!("Diagram name {name:?} is not a valid file name");
    }
    if name.contains(['/', '\\']) {
        bail!("Diagram name {name:?} contains a path separator");
    }
    Ok(())
}

/// Lay out one diagram and write it to the output directory
fn render_diagram(args: &Args, diagram: &Diagram) -> Result<PathBuf> {
    let mut engine = args.engine(diagram);
    engine.initialize();

    let path = args
        .output
        .join(format!("{}.{}", diagram.name(), args.renderer.extension()));
    let file =
        File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);

    args.renderer
        .render(&engine, &mut out)
        .with_context(|| format!("Failed to render {:?}", diagram.name()))?;
    out.flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}

fn run(args: &Args) -> Result<Vec<PathBuf>> {
    let diagrams = loader::load(&args.input)?;
    debug!("Loaded {} diagrams from {:?}", diagrams.len(), args.input);

    let mut names = HashSet::new();
    for diagram in &diagrams {
        check_name(diagram.name())?;
        if !names.insert(diagram.name()) {
            bail!("Diagram {:?} is declared twice", diagram.name());
        }
    }

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    diagrams
        .iter()
        .map(|diagram| {
            let path = render_diagram(args, diagram)?;
            info!(
                "Rendered {:?} ({} nodes, {} edges) to {}",
                diagram.name(),
                diagram.node_count(),
                diagram.edge_count(),
                path.display()
            );
            Ok(path)
        })
        .collect()
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    run(&args)?;
    Ok(())
}
