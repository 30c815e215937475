//! Graphviz DOT output for a correlated pipeline graph.
//!
//! One `subgraph cluster_*` per cluster, nodes outside any cluster at top
//! level, then all edges. Diagnostic edges are drawn undirected
//! (`dir=both`) with a colored caption.

use crate::correlate::{GLOBAL_INPUTS_CLUSTER, GLOBAL_OUTPUTS_CLUSTER, LEGEND_CLUSTER};
use crate::graph::{Cluster, Edge, FlowGraph, Node};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt::Write;
use std::sync::LazyLock;

/// Emit the graph as a Graphviz DOT string.
pub fn render_dot(graph: &FlowGraph) -> anyhow::Result<String> {
    let mut buf = String::new();

    writeln!(buf, "digraph pipeline {{")?;
    writeln!(
        buf,
        "    graph [rankdir=LR, compound=true, ranksep=2, color=blue, fontname=\"Helvetica\"];"
    )?;
    writeln!(
        buf,
        "    node [style=filled, color=grey, fontname=\"Helvetica\"];"
    )?;
    writeln!(buf, "    edge [fontname=\"Helvetica\"];")?;

    let nodes: HashMap<&str, &Node> = graph.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let mut clustered: HashSet<&str> = HashSet::new();

    for cluster in &graph.clusters {
        writeln!(buf)?;
        write_cluster(&mut buf, cluster, &nodes)?;
        clustered.extend(cluster.members.iter().map(String::as_str));
    }

    let loose: Vec<&Node> = graph
        .nodes
        .iter()
        .filter(|n| !clustered.contains(n.id.as_str()))
        .collect();
    if !loose.is_empty() {
        writeln!(buf)?;
        for node in loose {
            write_node(&mut buf, node, "    ")?;
        }
    }

    if !graph.edges.is_empty() {
        writeln!(buf)?;
        for edge in &graph.edges {
            write_edge(&mut buf, edge)?;
        }
    }

    writeln!(buf, "}}")?;
    Ok(buf)
}

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Characters that must be backslash-escaped inside a DOT string literal.
static DOT_SPECIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["\\]"#).expect("valid DOT escape pattern"));

/// Quote an arbitrary label as a DOT string literal.
fn quote(s: &str) -> String {
    let escaped = DOT_SPECIAL.replace_all(s, r"\$0");
    format!("\"{}\"", escaped.replace('\n', "\\n"))
}

fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn write_cluster(
    buf: &mut String,
    cluster: &Cluster,
    nodes: &HashMap<&str, &Node>,
) -> std::fmt::Result {
    writeln!(buf, "    subgraph cluster_{} {{", sanitize(&cluster.id))?;
    writeln!(buf, "        label={};", quote(&cluster.label))?;
    match cluster.id.as_str() {
        LEGEND_CLUSTER => writeln!(buf, "        color=green3;")?,
        GLOBAL_INPUTS_CLUSTER | GLOBAL_OUTPUTS_CLUSTER => {}
        _ => writeln!(buf, "        rank=same;")?,
    }
    for member in &cluster.members {
        if let Some(node) = nodes.get(member.as_str()) {
            write_node(buf, node, "        ")?;
        }
    }
    writeln!(buf, "    }}")
}

fn write_node(buf: &mut String, node: &Node, indent: &str) -> std::fmt::Result {
    writeln!(
        buf,
        "{indent}{} [label={}, color={}];",
        quote(&node.id),
        quote(&node.label),
        node.color.graphviz()
    )
}

fn write_edge(buf: &mut String, edge: &Edge) -> std::fmt::Result {
    let style = &edge.style;
    let mut attrs: Vec<String> = Vec::new();
    if style.is_diagnostic() {
        attrs.push("dir=both".to_string());
        if let Some(color) = style.color {
            attrs.push(format!("color={color}"));
            attrs.push(format!("fontcolor={color}"));
        }
        if let Some(label) = style.label {
            attrs.push(format!("label={}", quote(label)));
            attrs.push("fontsize=20".to_string());
        }
    } else if let Some(color) = style.color {
        attrs.push(format!("color={color}"));
    }

    write!(buf, "    {} -> {}", quote(&edge.from), quote(&edge.to))?;
    if !attrs.is_empty() {
        write!(buf, " [{}]", attrs.join(", "))?;
    }
    writeln!(buf, ";")
}
