//! Label correlation: who feeds whom.
//!
//! One top-to-bottom pass over the pipeline:
//! 1) global inputs become producers
//! 2) each method, in workflow order, resolves its inputs against the
//!    producers registered so far, then registers its outputs (flagging
//!    outputs whose label an earlier method already produced)
//! 3) global outputs are checked against every producer (alias warning)
//!    and against the global outputs declared before them
//!
//! Every matching producer gets an edge, not only the first or the latest.
//! An input with no match is unfed; that is a diagnostic, not an error.

pub mod registry;

pub use registry::{RegisteredSlot, SlotRegistry};

use crate::graph::{EdgeStyle, FlowGraph, GraphSink, NodeColor};
use crate::pipeline::{Method, Pipeline, SlotId, SlotKind};
use serde::Serialize;
use tracing::{debug, info, warn};

pub const LEGEND_CLUSTER: &str = "legend";
pub const GLOBAL_INPUTS_CLUSTER: &str = "global_inputs";
pub const GLOBAL_OUTPUTS_CLUSTER: &str = "global_outputs";

/// Suffix appended to the label of an unfed input.
pub const UNFED_SUFFIX: &str = "(No-Feed)";

/// A slot named in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotRef {
    pub id: SlotId,
    pub label: String,
}

/// Two slots linked by label equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotLink {
    pub from: SlotId,
    pub to: SlotId,
    pub label: String,
}

/// What a run found, independent of the graph sink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorrelationReport {
    /// producer -> consumer.
    pub data_flow: Vec<SlotLink>,
    pub unfed: Vec<SlotRef>,
    /// later output -> earlier output of another method.
    pub duplicate_outputs: Vec<SlotLink>,
    /// producer -> global output.
    pub global_aliases: Vec<SlotLink>,
    /// later global output -> earlier global output with the same label.
    pub repeated_global_outputs: Vec<SlotLink>,
}

impl CorrelationReport {
    pub fn diagnostic_count(&self) -> usize {
        self.unfed.len()
            + self.duplicate_outputs.len()
            + self.global_aliases.len()
            + self.repeated_global_outputs.len()
    }
}

/// Registries owned by a single run. Dropped when the run ends.
#[derive(Debug, Default)]
pub struct CorrelationState {
    /// Global inputs plus every method output registered so far.
    pub producers: SlotRegistry,
    /// Outputs of methods that have finished processing.
    pub prior_outputs: SlotRegistry,
    /// Global outputs declared so far.
    pub global_outputs: SlotRegistry,
}

/// Correlate `pipeline` into a fresh [`FlowGraph`].
pub fn correlate(pipeline: &Pipeline) -> (FlowGraph, CorrelationReport) {
    let mut graph = FlowGraph::new();
    let report = analyze(pipeline, &mut graph);
    (graph, report)
}

/// Run the correlation pass, emitting nodes, edges and clusters into `sink`.
pub fn analyze<S: GraphSink + ?Sized>(pipeline: &Pipeline, sink: &mut S) -> CorrelationReport {
    let mut run = Correlator {
        sink,
        state: CorrelationState::default(),
        report: CorrelationReport::default(),
    };

    run.emit_legend();
    run.global_inputs(pipeline);
    for (index, method) in pipeline.methods.iter().enumerate() {
        run.method(index, method);
    }
    run.global_outputs(pipeline);

    info!(
        producers = run.state.producers.len(),
        edges = run.report.data_flow.len(),
        diagnostics = run.report.diagnostic_count(),
        "correlation finished"
    );
    run.report
}

struct Correlator<'s, S: GraphSink + ?Sized> {
    sink: &'s mut S,
    state: CorrelationState,
    report: CorrelationReport,
}

impl<S: GraphSink + ?Sized> Correlator<'_, S> {
    fn emit_legend(&mut self) {
        let mut members = Vec::with_capacity(NodeColor::ALL.len());
        for color in NodeColor::ALL {
            let id = format!("legend_{}", color.graphviz());
            self.sink.add_node(&id, color.legend_caption(), color);
            members.push(id);
        }
        self.sink.add_cluster(LEGEND_CLUSTER, "legend", members);
    }

    fn global_inputs(&mut self, pipeline: &Pipeline) {
        let mut members = Vec::with_capacity(pipeline.global_inputs.len());
        for (group, position, label) in pipeline.global_inputs.slots() {
            let id = SlotId::global(SlotKind::GlobalInput, group, position);
            let node = id.to_string();
            self.sink.add_node(&node, label, NodeColor::Global);
            self.state.producers.register(id, label);
            debug!(slot = %id, label, "registered global input");
            members.push(node);
        }
        self.sink
            .add_cluster(GLOBAL_INPUTS_CLUSTER, "global-inputs", members);
    }

    fn method(&mut self, index: usize, method: &Method) {
        let mut members = Vec::with_capacity(method.inputs.len() + method.outputs.len());

        for (group, position, label) in method.inputs.slots() {
            let id = SlotId::method(index, SlotKind::MethodInput, group, position);
            members.push(self.resolve_input(id, label));
        }

        let mut produced = Vec::with_capacity(method.outputs.len());
        for (group, position, label) in method.outputs.slots() {
            let id = SlotId::method(index, SlotKind::MethodOutput, group, position);
            members.push(self.register_output(id, label));
            produced.push((id, label));
        }

        // Only visible to duplicate detection once the whole method is done,
        // so a method repeating its own output label is not flagged.
        for (id, label) in produced {
            self.state.prior_outputs.register(id, label);
        }

        self.sink
            .add_cluster(&format!("method{}", index), &method.caption(), members);
    }

    /// Link `id` to every producer registered so far, or mark it unfed.
    fn resolve_input(&mut self, id: SlotId, label: &str) -> String {
        let node = id.to_string();
        let producers: Vec<SlotId> = self
            .state
            .producers
            .matches(label)
            .map(|p| p.id)
            .collect();

        if producers.is_empty() {
            self.sink
                .add_node(&node, &format!("{}{}", label, UNFED_SUFFIX), NodeColor::Unfed);
            self.report.unfed.push(SlotRef {
                id,
                label: label.to_string(),
            });
            warn!(slot = %id, label, "input has no producer");
            return node;
        }

        self.sink.add_node(&node, label, NodeColor::Input);
        for producer in producers {
            self.sink
                .add_edge(&producer.to_string(), &node, EdgeStyle::data_flow());
            self.report.data_flow.push(SlotLink {
                from: producer,
                to: id,
                label: label.to_string(),
            });
            debug!(from = %producer, to = %id, label, "data flow");
        }
        node
    }

    /// Flag earlier methods' outputs with the same label, then make `id`
    /// visible as a producer.
    fn register_output(&mut self, id: SlotId, label: &str) -> String {
        let node = id.to_string();
        self.sink.add_node(&node, label, NodeColor::Output);

        let earlier: Vec<SlotId> = self
            .state
            .prior_outputs
            .matches(label)
            .map(|p| p.id)
            .collect();
        for prior in earlier {
            self.sink
                .add_edge(&node, &prior.to_string(), EdgeStyle::same_node_outputs());
            self.report.duplicate_outputs.push(SlotLink {
                from: id,
                to: prior,
                label: label.to_string(),
            });
            warn!(
                slot = %id,
                earlier = %prior,
                label,
                "output label already produced by an earlier method"
            );
        }

        self.state.producers.register(id, label);
        node
    }

    fn global_outputs(&mut self, pipeline: &Pipeline) {
        let mut members = Vec::with_capacity(pipeline.global_outputs.len());
        for (group, position, label) in pipeline.global_outputs.slots() {
            let id = SlotId::global(SlotKind::GlobalOutput, group, position);
            let node = id.to_string();
            self.sink.add_node(&node, label, NodeColor::Global);

            let aliases: Vec<SlotId> = self
                .state
                .producers
                .matches(label)
                .map(|p| p.id)
                .collect();
            for producer in aliases {
                self.sink
                    .add_edge(&producer.to_string(), &node, EdgeStyle::global_alias());
                self.report.global_aliases.push(SlotLink {
                    from: producer,
                    to: id,
                    label: label.to_string(),
                });
                warn!(
                    producer = %producer,
                    global_output = %id,
                    label,
                    "global output shares its label with a producer"
                );
            }

            let repeated: Vec<SlotId> = self
                .state
                .global_outputs
                .matches(label)
                .map(|g| g.id)
                .collect();
            for earlier in repeated {
                self.report.repeated_global_outputs.push(SlotLink {
                    from: id,
                    to: earlier,
                    label: label.to_string(),
                });
                warn!(
                    slot = %id,
                    earlier = %earlier,
                    label,
                    "global output declared more than once"
                );
            }

            self.state.global_outputs.register(id, label);
            members.push(node);
        }
        self.sink
            .add_cluster(GLOBAL_OUTPUTS_CLUSTER, "global-outputs", members);
    }
}
