//! Abstract data-flow graph handed to renderers.
//!
//! The correlator only talks to a [`GraphSink`]; it never decides layout or
//! output format. [`FlowGraph`] is the in-memory sink used by the CLI and the
//! tests.

use serde::Serialize;

/// Visual role of a node. Renderers map it to a concrete color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeColor {
    /// Global input or output slot.
    Global,
    /// Method input fed by at least one producer.
    Input,
    /// Method output.
    Output,
    /// Method input with no producer.
    Unfed,
}

impl NodeColor {
    pub const ALL: [NodeColor; 4] = [
        NodeColor::Global,
        NodeColor::Input,
        NodeColor::Output,
        NodeColor::Unfed,
    ];

    /// Graphviz color name.
    pub fn graphviz(self) -> &'static str {
        match self {
            NodeColor::Global => "grey",
            NodeColor::Input => "red",
            NodeColor::Output => "turquoise",
            NodeColor::Unfed => "green3",
        }
    }

    /// Caption shown in the legend cluster.
    pub fn legend_caption(self) -> &'static str {
        match self {
            NodeColor::Global => "global slots",
            NodeColor::Input => "inputs slots",
            NodeColor::Output => "outputs slots",
            NodeColor::Unfed => "No-Feed-inputs",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Producer feeds consumer.
    DataFlow,
    /// Two methods emit an output with the same label.
    SameNodeOutputs,
    /// A global output shares its label with a producer already in scope.
    GlobalAlias,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeStyle {
    pub kind: EdgeKind,
    pub directed: bool,
    pub color: Option<&'static str>,
    pub label: Option<&'static str>,
}

impl EdgeStyle {
    pub fn data_flow() -> Self {
        Self {
            kind: EdgeKind::DataFlow,
            directed: true,
            color: None,
            label: None,
        }
    }

    pub fn same_node_outputs() -> Self {
        Self {
            kind: EdgeKind::SameNodeOutputs,
            directed: false,
            color: Some("dodgerblue"),
            label: Some("same-node-outputs"),
        }
    }

    pub fn global_alias() -> Self {
        Self {
            kind: EdgeKind::GlobalAlias,
            directed: false,
            color: Some("red"),
            label: Some("same-global-inputs-outputs"),
        }
    }

    pub fn is_diagnostic(&self) -> bool {
        self.kind != EdgeKind::DataFlow
    }
}

/// Side-effecting sink the correlator emits into.
pub trait GraphSink {
    fn add_node(&mut self, id: &str, label: &str, color: NodeColor);
    fn add_edge(&mut self, from: &str, to: &str, style: EdgeStyle);
    fn add_cluster(&mut self, id: &str, label: &str, members: Vec<String>);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub color: NodeColor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub style: EdgeStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub id: String,
    pub label: String,
    pub members: Vec<String>,
}

/// Everything emitted during one run, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlowGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub clusters: Vec<Cluster>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn cluster(&self, id: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.id == id)
    }

    pub fn edges_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.style.kind == kind)
    }

    /// Edges whose target is `id`.
    pub fn edges_into<'a, 'b>(&'a self, id: &'b str) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |e| e.to == id)
    }

    /// Id of the cluster that owns `node_id`, if any.
    pub fn cluster_of(&self, node_id: &str) -> Option<&str> {
        self.clusters
            .iter()
            .find(|c| c.members.iter().any(|m| m == node_id))
            .map(|c| c.id.as_str())
    }
}

impl GraphSink for FlowGraph {
    fn add_node(&mut self, id: &str, label: &str, color: NodeColor) {
        self.nodes.push(Node {
            id: id.to_string(),
            label: label.to_string(),
            color,
        });
    }

    fn add_edge(&mut self, from: &str, to: &str, style: EdgeStyle) {
        self.edges.push(Edge {
            from: from.to_string(),
            to: to.to_string(),
            style,
        });
    }

    fn add_cluster(&mut self, id: &str, label: &str, members: Vec<String>) {
        self.clusters.push(Cluster {
            id: id.to_string(),
            label: label.to_string(),
            members,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn flow_graph_records_in_emission_order() {
        let mut g = FlowGraph::new();
        g.add_node("a", "A", NodeColor::Global);
        g.add_node("b", "B", NodeColor::Input);
        g.add_edge("a", "b", EdgeStyle::data_flow());
        g.add_cluster("c", "cluster", vec!["b".into()]);

        assert_eq!(g.nodes.len(), 2);
        assert_eq!(g.node("b").map(|n| n.color), Some(NodeColor::Input));
        assert_eq!(g.edges_into("b").count(), 1);
        assert_eq!(g.cluster_of("b"), Some("c"));
        assert_eq!(g.cluster_of("a"), None);
    }

    #[test]
    fn only_data_flow_edges_are_directed() {
        assert!(EdgeStyle::data_flow().directed);
        assert!(!EdgeStyle::data_flow().is_diagnostic());
        for style in [EdgeStyle::same_node_outputs(), EdgeStyle::global_alias()] {
            assert!(!style.directed);
            assert!(style.is_diagnostic());
            assert!(style.label.is_some());
        }
    }

    #[test]
    fn serializes_roles_in_snake_case() {
        let json = serde_json::to_value(Edge {
            from: "x".into(),
            to: "y".into(),
            style: EdgeStyle::same_node_outputs(),
        })
        .unwrap();
        assert_eq!(json["style"]["kind"], "same_node_outputs");
        assert_eq!(json["style"]["color"], "dodgerblue");
        assert_eq!(
            serde_json::to_value(NodeColor::Unfed).unwrap(),
            serde_json::json!("unfed")
        );
    }
}
