//! Structural rules: acyclicity, minimum node set, input cardinality.

use std::collections::VecDeque;

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::visit::EdgeRef;

use super::Context;
use super::report::{Category, Severity, ValidationError};
use crate::parse::types::NodeKind;
use crate::rules;

/// Depth-first cycle search. Reports at most one cycle.
pub fn check_dag(ctx: &Context) -> Vec<ValidationError> {
    match toposort(&ctx.graph.graph, None) {
        Ok(_) => vec![],
        Err(cycle) => {
            let node_id = ctx.graph.node_id(cycle.node_id());
            vec![
                ValidationError::error(
                    "circular_dependency",
                    Category::Structure,
                    Severity::Critical,
                    format!(
                        "Workflow contains a circular dependency through node '{}'",
                        node_id
                    ),
                )
                .on_node(node_id)
                .with_suggestion("Remove one of the connections that forms the loop"),
            ]
        }
    }
}

pub fn check_minimum_requirements(ctx: &Context) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let nodes = &ctx.workflow.nodes;

    if !nodes.iter().any(|n| n.is_data_source()) {
        errors.push(
            ValidationError::error(
                "missing_data_source",
                Category::Structure,
                Severity::Critical,
                "Workflow must contain at least one data source",
            )
            .with_suggestion("Add a data source node to feed market data into the strategy"),
        );
    }

    if !nodes.iter().any(|n| n.kind() == NodeKind::Output) {
        errors.push(
            ValidationError::warning(
                "missing_output",
                Category::Structure,
                Severity::Medium,
                "Workflow has no output node",
            )
            .with_suggestion("Add an output node to collect the strategy's results"),
        );
    }

    if nodes.len() > 1 {
        for node in nodes {
            let incident =
                ctx.graph.incoming_count(node.id()) + ctx.graph.outgoing_count(node.id());
            if incident == 0 {
                errors.push(
                    ValidationError::warning(
                        "isolated_node",
                        Category::Structure,
                        Severity::Low,
                        format!("Node '{}' is not connected to anything", display_name(node)),
                    )
                    .on_node(node.id())
                    .with_suggestion("Connect the node or remove it"),
                );
            }
        }
    }

    errors
}

pub fn check_connection_cardinality(ctx: &Context) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for node in &ctx.workflow.nodes {
        let kind = node.kind();
        let expected = rules::cardinality(kind, ctx.logic_inputs(node));
        let actual = ctx.graph.incoming_count(node.id());

        if actual < expected.required {
            errors.push(
                ValidationError::error(
                    "insufficient_inputs",
                    Category::Connection,
                    Severity::High,
                    format!(
                        "{} node '{}' requires {} input(s), found {}",
                        kind,
                        display_name(node),
                        expected.required,
                        actual
                    ),
                )
                .on_node(node.id()),
            );
        }

        if let Some(max) = expected.max {
            if actual > max {
                errors.push(
                    ValidationError::error(
                        "too_many_inputs",
                        Category::Connection,
                        Severity::Medium,
                        format!(
                            "{} node '{}' accepts at most {} input(s), found {}",
                            kind,
                            display_name(node),
                            max,
                            actual
                        ),
                    )
                    .on_node(node.id()),
                );
            }
        }

        if kind == NodeKind::Action && ctx.graph.outgoing_count(node.id()) > 0 {
            errors.push(
                ValidationError::warning(
                    "action_has_outputs",
                    Category::Connection,
                    Severity::Low,
                    format!(
                        "Action node '{}' has outgoing connections; actions should end a signal path",
                        display_name(node)
                    ),
                )
                .on_node(node.id()),
            );
        }
    }

    errors
}

/// Kahn's algorithm. Runs independently of `check_dag`, so one cycle
/// yields a finding from each.
pub fn check_topological_order(ctx: &Context) -> Vec<ValidationError> {
    let g = &ctx.graph.graph;
    let mut in_degree: Vec<usize> = g
        .node_indices()
        .map(|n| g.edges_directed(n, Direction::Incoming).count())
        .collect();
    let mut queue: VecDeque<_> = g
        .node_indices()
        .filter(|n| in_degree[n.index()] == 0)
        .collect();

    let mut processed = 0;
    while let Some(n) = queue.pop_front() {
        processed += 1;
        for edge in g.edges_directed(n, Direction::Outgoing) {
            let target = edge.target().index();
            in_degree[target] -= 1;
            if in_degree[target] == 0 {
                queue.push_back(edge.target());
            }
        }
    }

    if processed >= g.node_count() {
        return vec![];
    }

    let stuck: Vec<&str> = g
        .node_indices()
        .filter(|n| in_degree[n.index()] > 0)
        .map(|n| ctx.graph.node_id(n))
        .collect();
    vec![
        ValidationError::error(
            "circular_dependency_topological",
            Category::Structure,
            Severity::Critical,
            format!(
                "Topological ordering failed: {} of {} nodes cannot be scheduled ({})",
                g.node_count() - processed,
                g.node_count(),
                stuck.join(", ")
            ),
        )
        .with_suggestion("Break the cycle so every node can run after its inputs"),
    ]
}

fn display_name(node: &crate::parse::types::WorkflowNode) -> &str {
    if node.label().is_empty() {
        node.id()
    } else {
        node.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidatorConfig;
    use crate::parse::graph::StrategyGraph;
    use crate::parse::types::*;

    fn node(id: &str, json_type: &str) -> WorkflowNode {
        serde_json::from_value(serde_json::json!({ "id": id, "type": json_type })).unwrap()
    }

    fn edge(s: &str, t: &str) -> WorkflowEdge {
        WorkflowEdge {
            id: format!("{}-{}", s, t),
            source: s.into(),
            target: t.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    fn run<F>(workflow: &Workflow, check: F) -> Vec<ValidationError>
    where
        F: Fn(&Context) -> Vec<ValidationError>,
    {
        let graph = StrategyGraph::build(workflow);
        let config = ValidatorConfig::default();
        let ctx = Context::new(workflow, &graph, &config);
        check(&ctx)
    }

    #[test]
    fn both_cycle_checks_fire_on_a_loop() {
        let workflow = Workflow::new(
            vec![
                node("a", "condition"),
                node("b", "condition"),
                node("c", "condition"),
            ],
            vec![edge("a", "b"), edge("b", "c"), edge("c", "a")],
        );
        assert_eq!(run(&workflow, check_dag).len(), 1);
        let kahn = run(&workflow, check_topological_order);
        assert_eq!(kahn.len(), 1);
        assert!(kahn[0].message.contains("3 of 3"));
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let workflow = Workflow::new(vec![node("a", "condition")], vec![edge("a", "a")]);
        assert_eq!(run(&workflow, check_dag)[0].node_id.as_deref(), Some("a"));
        assert_eq!(run(&workflow, check_topological_order).len(), 1);
    }

    #[test]
    fn single_node_is_not_isolated() {
        let workflow = Workflow::new(vec![node("ds", "dataSource")], vec![]);
        let errors = run(&workflow, check_minimum_requirements);
        assert!(!errors.iter().any(|e| e.code == "isolated_node"));
        assert!(errors.iter().any(|e| e.code == "missing_output"));
    }

    #[test]
    fn custom_dataset_counts_as_source() {
        let workflow = Workflow::new(vec![node("ds", "custom-dataset")], vec![]);
        let errors = run(&workflow, check_minimum_requirements);
        assert!(!errors.iter().any(|e| e.code == "missing_data_source"));
    }

    #[test]
    fn correlation_needs_two_inputs() {
        let workflow = Workflow::new(
            vec![node("ds", "dataSource"), node("corr", "correlationAnalysis")],
            vec![edge("ds", "corr")],
        );
        let errors = run(&workflow, check_connection_cardinality);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "insufficient_inputs");
        assert_eq!(errors[0].severity, Severity::High);
    }

    #[test]
    fn action_with_outputs_is_flagged() {
        let workflow = Workflow::new(
            vec![
                node("c", "condition"),
                node("act", "action"),
                node("out", "output"),
            ],
            vec![edge("c", "act"), edge("act", "out")],
        );
        let errors = run(&workflow, check_connection_cardinality);
        let warning = errors
            .iter()
            .find(|e| e.code == "action_has_outputs")
            .unwrap();
        assert_eq!(warning.severity, Severity::Low);
        assert_eq!(warning.node_id.as_deref(), Some("act"));
    }
}
