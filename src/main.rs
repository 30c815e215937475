use anyhow::Context;
use clap::{Parser, ValueEnum};
use pipeflow_viz::{Result, correlate, load, render};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Dot,
    Json,
    Png,
    Svg,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Dot => "gv",
            Format::Json => "graph.json",
            Format::Png => "png",
            Format::Svg => "svg",
        }
    }

    /// Argument for `dot -T`; only image formats go through graphviz.
    fn graphviz_format(self) -> Option<&'static str> {
        match self {
            Format::Dot | Format::Json => None,
            Format::Png => Some("png"),
            Format::Svg => Some("svg"),
        }
    }
}

#[derive(Parser)]
#[command(name = "pipeflow-viz")]
#[command(about = "Draw the data-flow graph of a JSON pipeline description", long_about = None)]
struct Cli {
    /// Pipeline description (.json)
    path: PathBuf,

    /// Output file. Defaults to the input path with the format's extension.
    #[arg(short = 'o', long)]
    out: Option<PathBuf>,

    /// Output format (png/svg need graphviz `dot` on PATH)
    #[arg(long, value_enum, default_value_t = Format::Dot)]
    format: Format,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // 1) Load + validate the description.
    let pipeline = load::load_pipeline(&cli.path)?;

    // 2) Correlate (diagnostics are logged as they are found).
    let (graph, _report) = correlate(&pipeline);

    // 3) Render.
    let out = cli
        .out
        .clone()
        .unwrap_or_else(|| default_output(&cli.path, cli.format));
    match (cli.format, cli.format.graphviz_format()) {
        (_, Some(image)) => {
            let dot = render::render_dot(&graph)?;
            render::render_with_graphviz(&dot, image, &out)?;
        }
        (Format::Json, None) => write_text(&out, &render::render_json(&graph)?)?,
        (_, None) => write_text(&out, &render::render_dot(&graph)?)?,
    }
    println!("Wrote {}", out.display());

    Ok(())
}

fn default_output(input: &Path, format: Format) -> PathBuf {
    input.with_extension(format.extension())
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).with_context(|| format!("write {}", path.display()))
}
