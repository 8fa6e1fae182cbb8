//! Node-level rules: parameter ranges, timeframe consistency and logic-gate
//! integrity.

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::Direction;
use petgraph::graph::NodeIndex;

use super::Context;
use super::report::{Category, Severity, ValidationError};
use crate::parse::types::{ConditionOperator, NodeKind, WorkflowNode};

pub fn check_parameter_ranges(ctx: &Context) -> Vec<ValidationError> {
    let config = ctx.config;
    let mut errors = Vec::new();

    for node in &ctx.workflow.nodes {
        match node {
            WorkflowNode::TechnicalIndicator(n) => {
                if let Some(period) = n.data.parameters.period {
                    if period < config.min_period || period > config.max_period {
                        errors.push(out_of_range(
                            node,
                            format!(
                                "Indicator period {} is outside [{}, {}]",
                                period, config.min_period, config.max_period
                            ),
                        ));
                    }
                }
            }
            WorkflowNode::Condition(n) => {
                let p = &n.data.parameters;
                if p.condition == Some(ConditionOperator::Range) {
                    if let (Some(lower), Some(upper)) = (p.value, p.value2) {
                        if lower >= upper {
                            errors.push(
                                ValidationError::error(
                                    "invalid_range",
                                    Category::Parameter,
                                    Severity::High,
                                    format!(
                                        "Range condition lower bound {} must be below upper bound {}",
                                        lower, upper
                                    ),
                                )
                                .on_node(node.id())
                                .with_suggestion("Swap the bounds or widen the range"),
                            );
                        }
                    }
                }
            }
            WorkflowNode::Action(n) => {
                if let Some(quantity) = n.data.parameters.quantity {
                    if quantity < 0.0 {
                        errors.push(out_of_range(
                            node,
                            format!("Action quantity {} must not be negative", quantity),
                        ));
                    }
                }
            }
            WorkflowNode::Risk(n) => {
                if let Some(max_loss) = n.data.parameters.max_loss {
                    if max_loss <= 0.0 || max_loss > config.max_loss_ceiling {
                        errors.push(out_of_range(
                            node,
                            format!(
                                "Maximum loss {}% must be above 0 and at most {}%",
                                max_loss, config.max_loss_ceiling
                            ),
                        ));
                    }
                }
            }
            _ => {}
        }
    }

    errors
}

fn out_of_range(node: &WorkflowNode, message: String) -> ValidationError {
    ValidationError::error(
        "parameter_out_of_range",
        Category::Parameter,
        Severity::High,
        message,
    )
    .on_node(node.id())
}

/// Flags indicator and condition nodes fed by sources at different timeframes.
pub fn check_timeframe_consistency(ctx: &Context) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for node in &ctx.workflow.nodes {
        if !matches!(node.kind(), NodeKind::TechnicalIndicator | NodeKind::Condition) {
            continue;
        }
        let timeframes = upstream_timeframes(ctx, node.id());
        if timeframes.len() > 1 {
            let listed: Vec<&str> = timeframes.into_iter().collect();
            errors.push(
                ValidationError::warning(
                    "timeframe_mismatch",
                    Category::Parameter,
                    Severity::Medium,
                    format!(
                        "Node '{}' combines data from multiple timeframes: {}",
                        node.id(),
                        listed.join(", ")
                    ),
                )
                .on_node(node.id())
                .with_suggestion("Align source timeframes or add a multi-timeframe analysis node"),
            );
        }
    }

    errors
}

/// Timeframes of every data source upstream of `node_id`. Iterative, with one
/// visited set per walk, so cyclic input terminates.
fn upstream_timeframes<'a>(ctx: &Context<'a>, node_id: &str) -> BTreeSet<&'a str> {
    let mut timeframes = BTreeSet::new();
    let Some(start) = ctx.graph.index(node_id) else {
        return timeframes;
    };

    let mut visited = HashSet::from([start]);
    let mut stack = vec![start];
    while let Some(idx) = stack.pop() {
        for parent in ctx.graph.graph.neighbors_directed(idx, Direction::Incoming) {
            if !visited.insert(parent) {
                continue;
            }
            if let Some(node) = ctx.node_at(parent) {
                if let Some(tf) = node.timeframe() {
                    timeframes.insert(tf);
                }
            }
            stack.push(parent);
        }
    }

    timeframes
}

/// Nesting depth of every logic gate: a gate fed by no other gate has depth 1.
#[derive(Debug, Clone, Default)]
pub struct LogicDepths {
    depths: HashMap<NodeIndex, usize>,
}

impl LogicDepths {
    pub fn depth_of(&self, idx: NodeIndex) -> usize {
        self.depths.get(&idx).copied().unwrap_or(0)
    }

    pub fn max_depth(&self) -> usize {
        self.depths.values().copied().max().unwrap_or(0)
    }
}

pub fn logic_depths(ctx: &Context) -> LogicDepths {
    let mut memo = HashMap::new();
    for node in ctx.workflow.nodes_of_kind(NodeKind::LogicGate) {
        if let Some(idx) = ctx.graph.index(node.id()) {
            resolve_depth(ctx, idx, &mut memo);
        }
    }
    LogicDepths { depths: memo }
}

/// Post-order walk over logic-gate parents with an explicit stack. A parent
/// still on the current path closes a cycle and contributes nothing.
fn resolve_depth(ctx: &Context, start: NodeIndex, memo: &mut HashMap<NodeIndex, usize>) {
    let mut on_path = HashSet::new();
    let mut stack = vec![(start, false)];

    while let Some((idx, expanded)) = stack.pop() {
        if memo.contains_key(&idx) {
            continue;
        }
        let parents = logic_parents(ctx, idx);
        if expanded {
            let deepest = parents.iter().filter_map(|p| memo.get(p)).max().copied();
            memo.insert(idx, 1 + deepest.unwrap_or(0));
            on_path.remove(&idx);
        } else {
            on_path.insert(idx);
            stack.push((idx, true));
            for parent in parents {
                if !memo.contains_key(&parent) && !on_path.contains(&parent) {
                    stack.push((parent, false));
                }
            }
        }
    }
}

fn logic_parents(ctx: &Context, idx: NodeIndex) -> Vec<NodeIndex> {
    ctx.graph
        .graph
        .neighbors_directed(idx, Direction::Incoming)
        .filter(|&p| ctx.node_at(p).is_some_and(|n| n.kind() == NodeKind::LogicGate))
        .collect()
}

pub fn check_logic_gates(ctx: &Context, depths: &LogicDepths) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for node in ctx.workflow.nodes_of_kind(NodeKind::LogicGate) {
        let declared = ctx.logic_inputs(node);
        let actual = ctx.graph.incoming_count(node.id());
        if actual < declared {
            errors.push(
                ValidationError::error(
                    "logic_insufficient_inputs",
                    Category::Connection,
                    Severity::High,
                    format!(
                        "Logic gate '{}' declares {} inputs but only {} are connected",
                        node.id(),
                        declared,
                        actual
                    ),
                )
                .on_node(node.id())
                .with_suggestion("Connect more conditions or lower the declared input count"),
            );
        }

        let Some(idx) = ctx.graph.index(node.id()) else {
            continue;
        };
        let depth = depths.depth_of(idx);
        if depth > ctx.config.max_logic_depth {
            errors.push(
                ValidationError::warning(
                    "excessive_logic_depth",
                    Category::Performance,
                    Severity::Medium,
                    format!(
                        "Logic gate '{}' is nested {} levels deep (limit {})",
                        node.id(),
                        depth,
                        ctx.config.max_logic_depth
                    ),
                )
                .on_node(node.id())
                .with_suggestion("Flatten nested gates into fewer, wider gates"),
            );
        }
    }

    errors
}
