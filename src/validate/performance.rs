//! Complexity scoring and runtime estimates.

use super::Context;
use super::report::{Category, PerformanceMetrics, Severity, ValidationError};
use crate::parse::types::{NodeKind, WorkflowNode};

const NODE_WEIGHT: u64 = 10;
const EDGE_WEIGHT: u64 = 5;
const INDICATOR_WEIGHT: u64 = 20;
const HEAVY_INDICATOR_WEIGHT: u64 = 10;
const CONDITION_WEIGHT: u64 = 15;
const LOGIC_INPUT_WEIGHT: u64 = 5;
const DEFAULT_WEIGHT: u64 = 5;

/// Saturates rather than wrapping; a gate may declare any input count.
pub fn complexity_score(ctx: &Context) -> u64 {
    let nodes = &ctx.workflow.nodes;
    let base = NODE_WEIGHT
        .saturating_mul(nodes.len() as u64)
        .saturating_add(EDGE_WEIGHT.saturating_mul(ctx.workflow.edges.len() as u64));
    nodes
        .iter()
        .map(|n| node_weight(ctx, n))
        .fold(base, u64::saturating_add)
}

fn node_weight(ctx: &Context, node: &WorkflowNode) -> u64 {
    match node {
        WorkflowNode::TechnicalIndicator(n) => {
            let heavy = n
                .data
                .parameters
                .period
                .is_some_and(|p| p > ctx.config.heavy_indicator_period);
            INDICATOR_WEIGHT + if heavy { HEAVY_INDICATOR_WEIGHT } else { 0 }
        }
        WorkflowNode::Condition(_) => CONDITION_WEIGHT,
        WorkflowNode::LogicGate(_) => {
            LOGIC_INPUT_WEIGHT.saturating_mul(ctx.logic_inputs(node) as u64)
        }
        _ => DEFAULT_WEIGHT,
    }
}

pub fn check_performance_impact(ctx: &Context, complexity: u64) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if complexity > ctx.config.complexity_threshold {
        errors.push(
            ValidationError::warning(
                "high_complexity",
                Category::Performance,
                Severity::Medium,
                format!(
                    "Workflow complexity score {} exceeds {}",
                    complexity, ctx.config.complexity_threshold
                ),
            )
            .with_suggestion("Split the strategy or consolidate indicators"),
        );
    }

    for node in ctx.workflow.nodes_of_kind(NodeKind::TechnicalIndicator) {
        let Some(period) = node.indicator_params().and_then(|p| p.period) else {
            continue;
        };
        if period > ctx.config.long_lookback_period {
            errors.push(
                ValidationError::warning(
                    "long_lookback_period",
                    Category::Performance,
                    Severity::Low,
                    format!(
                        "Indicator '{}' uses a {}-bar lookback, which needs a long warm-up history",
                        node.id(),
                        period
                    ),
                )
                .on_node(node.id()),
            );
        }
    }

    errors
}

pub fn metrics(
    ctx: &Context,
    complexity: u64,
    logic_depth: usize,
    signal_path_count: usize,
) -> PerformanceMetrics {
    let nodes = ctx.workflow.nodes.len() as u64;
    let edges = ctx.workflow.edges.len() as u64;
    let indicator_count = ctx
        .workflow
        .nodes_of_kind(NodeKind::TechnicalIndicator)
        .count();
    let logic_gate_count = ctx.workflow.nodes_of_kind(NodeKind::LogicGate).count() as u64;

    let base_time = (complexity as f64 / 100.0).max(10.0);
    let estimated_execution_time =
        base_time + 2.0 * indicator_count as f64 + 5.0 * logic_depth as f64;
    let memory_usage = [
        (1024u64, nodes),
        (512, edges),
        (2048, indicator_count as u64),
        (512, logic_gate_count),
    ]
    .into_iter()
    .fold(0u64, |acc, (bytes, n)| acc.saturating_add(bytes.saturating_mul(n)));

    PerformanceMetrics {
        estimated_complexity: complexity,
        estimated_execution_time,
        memory_usage,
        logic_depth,
        indicator_count,
        signal_path_count,
    }
}
