//! Edge-level rules: port type compatibility, source→action reachability,
//! and output-handle usage on multi-output indicators.

use std::collections::{BTreeSet, HashSet};

use petgraph::visit::Bfs;

use super::Context;
use super::report::{Category, Severity, ValidationError};
use crate::parse::types::NodeKind;
use crate::rules;

pub fn check_type_compatibility(ctx: &Context) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for edge in &ctx.workflow.edges {
        let (Some(source), Some(target)) = (ctx.node(&edge.source), ctx.node(&edge.target)) else {
            continue;
        };
        let produced = rules::output_type(source.kind(), edge.source_handle.as_deref());
        let accepted = rules::input_type(target.kind(), edge.target_handle.as_deref());

        if !produced.feeds(accepted) {
            errors.push(
                ValidationError::error(
                    "type_mismatch",
                    Category::Connection,
                    Severity::High,
                    format!(
                        "Cannot connect {} output of '{}' to {} input of '{}'",
                        produced, edge.source, accepted, edge.target
                    ),
                )
                .on_node(edge.target.as_str())
                .on_edge(edge.id.as_str())
                .with_suggestion(format!(
                    "Connect '{}' to a node that accepts {} data",
                    edge.source, produced
                )),
            );
        }
    }

    errors
}

/// Reachability of every (data source, action) pair.
#[derive(Debug, Clone, Default)]
pub struct SignalPaths {
    pub pairs: Vec<SignalPath>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalPath {
    pub source: String,
    pub action: String,
    pub reachable: bool,
}

impl SignalPaths {
    pub fn reachable_count(&self) -> usize {
        self.pairs.iter().filter(|p| p.reachable).count()
    }
}

/// One BFS per data source; every action is then a set lookup.
/// O(sources · (V + E) + sources · actions).
pub fn trace_signal_paths(ctx: &Context) -> SignalPaths {
    let actions: Vec<&str> = ctx
        .workflow
        .nodes_of_kind(NodeKind::Action)
        .map(|n| n.id())
        .collect();
    let mut pairs = Vec::new();

    for source in ctx.workflow.nodes.iter().filter(|n| n.is_data_source()) {
        let mut reached = HashSet::new();
        if let Some(start) = ctx.graph.index(source.id()) {
            let mut bfs = Bfs::new(&ctx.graph.graph, start);
            while let Some(nx) = bfs.next(&ctx.graph.graph) {
                reached.insert(ctx.graph.node_id(nx));
            }
        }
        for &action in &actions {
            pairs.push(SignalPath {
                source: source.id().to_string(),
                action: action.to_string(),
                reachable: reached.contains(action),
            });
        }
    }

    SignalPaths { pairs }
}

/// Disconnected pairs are warnings: a workflow may hold several independent strategies.
pub fn check_signal_paths(paths: &SignalPaths) -> Vec<ValidationError> {
    paths
        .pairs
        .iter()
        .filter(|p| !p.reachable)
        .map(|p| {
            ValidationError::warning(
                "no_signal_path",
                Category::Connection,
                Severity::Medium,
                format!(
                    "No signal path from data source '{}' to action '{}'",
                    p.source, p.action
                ),
            )
            .on_node(p.action.as_str())
        })
        .collect()
}

pub fn check_multi_output_indicators(ctx: &Context) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for node in ctx.workflow.nodes_of_kind(NodeKind::TechnicalIndicator) {
        let Some(indicator) = node.indicator_params().and_then(|p| p.indicator.as_ref()) else {
            continue;
        };
        if !indicator.is_multi_output() {
            continue;
        }

        let outgoing = ctx.graph.outgoing_edges(node.id());
        let mut used: BTreeSet<Option<&str>> = BTreeSet::new();

        for edge in &outgoing {
            let label = edge.weight();
            let handle = label.source_handle.as_deref();

            match handle {
                Some(h) if !indicator.accepts_output_handle(h) => {
                    errors.push(
                        ValidationError::error(
                            "invalid_output_handle",
                            Category::Connection,
                            Severity::High,
                            format!(
                                "{} has no output named '{}' (node '{}')",
                                indicator,
                                h,
                                node.id()
                            ),
                        )
                        .on_node(node.id())
                        .on_edge(label.edge_id.as_str())
                        .with_suggestion(format!(
                            "Use one of: {}",
                            indicator.output_handles().unwrap_or_default().join(", ")
                        )),
                    );
                }
                _ => {
                    used.insert(handle);
                }
            }
        }

        let expected = indicator.expected_output_count();
        if !used.is_empty() && used.len() < expected {
            errors.push(
                ValidationError::info(
                    "underutilized_outputs",
                    Category::Connection,
                    format!(
                        "{} node '{}' uses {} of {} available outputs",
                        indicator,
                        node.id(),
                        used.len(),
                        expected
                    ),
                )
                .on_node(node.id()),
            );
        }
    }

    errors
}
