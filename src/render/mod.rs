//! Output formats for a correlated graph.

pub mod dot;

pub use dot::render_dot;

use crate::graph::FlowGraph;
use anyhow::{Context, bail};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Pretty-printed JSON of the abstract graph (nodes, edges, clusters).
pub fn render_json(graph: &FlowGraph) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(graph)?)
}

/// Lay out `dot_source` with the Graphviz `dot` binary and write the image to
/// `out`. `format` is passed through as `-T<format>` (e.g. `png`, `svg`).
pub fn render_with_graphviz(dot_source: &str, format: &str, out: &Path) -> anyhow::Result<()> {
    run_layout("dot", dot_source, format, out)
}

fn run_layout(program: &str, dot_source: &str, format: &str, out: &Path) -> anyhow::Result<()> {
    let mut child = Command::new(program)
        .arg(format!("-T{}", format))
        .arg("-o")
        .arg(out)
        .stdin(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawn graphviz `{program}` (is graphviz installed?)"))?;

    {
        let mut stdin = child
            .stdin
            .take()
            .with_context(|| format!("graphviz `{program}` has no stdin"))?;
        stdin
            .write_all(dot_source.as_bytes())
            .context("write DOT source to graphviz")?;
    }

    let output = child
        .wait_with_output()
        .with_context(|| format!("wait for graphviz `{program}`"))?;
    if !output.status.success() {
        bail!(
            "graphviz `{} -T{}` failed ({}): {}",
            program,
            format,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeStyle, GraphSink, NodeColor};
    use pretty_assertions::assert_eq;

    #[test]
    fn json_lists_nodes_edges_and_clusters() {
        let mut g = FlowGraph::new();
        g.add_node("a", "A", NodeColor::Global);
        g.add_node("b", "B(No-Feed)", NodeColor::Unfed);
        g.add_edge("a", "b", EdgeStyle::data_flow());
        g.add_cluster("global_inputs", "global-inputs", vec!["a".into()]);

        let value: serde_json::Value = serde_json::from_str(&render_json(&g).unwrap()).unwrap();
        assert_eq!(value["nodes"][1]["color"], "unfed");
        assert_eq!(value["edges"][0]["style"]["directed"], true);
        assert_eq!(value["edges"][0]["style"]["color"], serde_json::Value::Null);
        assert_eq!(value["clusters"][0]["members"], serde_json::json!(["a"]));
    }

    #[test]
    fn missing_layout_program_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_layout(
            "pipeflow-viz-no-such-layout-program",
            "digraph {}",
            "png",
            &dir.path().join("out.png"),
        )
        .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("spawn graphviz `pipeflow-viz-no-such-layout-program`"), "{msg}");
        assert!(msg.contains("is graphviz installed?"), "{msg}");
    }

    #[test]
    fn failing_layout_program_is_reported() {
        // `false` ignores its arguments and exits 1; it may exit before the
        // DOT source is written, so either error path is acceptable.
        let dir = tempfile::tempdir().unwrap();
        let err = run_layout("false", "digraph {}", "png", &dir.path().join("out.png")).unwrap_err();
        let msg = format!("{err:#}");
        assert!(
            msg.contains("graphviz `false -Tpng` failed") || msg.contains("write DOT source to graphviz"),
            "{msg}"
        );
    }

    #[test]
    fn unknown_graphviz_format_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = render_with_graphviz("digraph {}", "no-such-format", &dir.path().join("out"))
            .unwrap_err();
        let msg = format!("{err:#}");
        // Without graphviz on PATH the spawn itself fails.
        assert!(
            msg.contains("graphviz `dot -Tno-such-format` failed")
                || msg.contains("write DOT source to graphviz")
                || msg.contains("spawn graphviz `dot`"),
            "{msg}"
        );
    }
}
