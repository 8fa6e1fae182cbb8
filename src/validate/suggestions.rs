//! Non-blocking optimization hints produced after the rule pipeline.

use std::collections::BTreeMap;

use super::Context;
use super::report::{Priority, SuggestionType, ValidationSuggestion};
use crate::parse::types::NodeKind;

pub fn generate(ctx: &Context) -> Vec<ValidationSuggestion> {
    let mut suggestions = Vec::new();

    suggestions.extend(duplicate_indicators(ctx));
    suggestions.extend(complex_logic_gates(ctx));
    suggestions.extend(indicator_overload(ctx));
    suggestions.extend(missing_risk_management(ctx));

    for (i, s) in suggestions.iter_mut().enumerate() {
        s.id = format!("{}_{}", s.code, i + 1);
    }
    suggestions
}

fn suggestion(
    code: &str,
    kind: SuggestionType,
    priority: Priority,
    message: String,
    node_ids: Vec<String>,
) -> ValidationSuggestion {
    ValidationSuggestion {
        id: String::new(),
        kind,
        code: code.into(),
        priority,
        message,
        node_ids,
    }
}

/// Indicators computing the same series could share one node.
fn duplicate_indicators(ctx: &Context) -> Vec<ValidationSuggestion> {
    // Keyed by display strings; insertion order within a group follows the node list.
    let mut groups: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
    for node in ctx.workflow.nodes_of_kind(NodeKind::TechnicalIndicator) {
        let Some(params) = node.indicator_params() else {
            continue;
        };
        let indicator = params
            .indicator
            .as_ref()
            .map_or_else(|| "unknown".to_string(), |i| i.to_string());
        let period = params
            .period
            .map_or_else(|| "default".to_string(), |p| p.to_string());
        groups
            .entry((indicator, period))
            .or_default()
            .push(node.id().to_string());
    }

    groups
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|((indicator, period), ids)| {
            suggestion(
                "consolidate_indicators",
                SuggestionType::Optimization,
                Priority::Medium,
                format!(
                    "{} nodes compute {} with period {}; reuse one node for all consumers",
                    ids.len(),
                    indicator,
                    period
                ),
                ids,
            )
        })
        .collect()
}

fn complex_logic_gates(ctx: &Context) -> Vec<ValidationSuggestion> {
    ctx.workflow
        .nodes_of_kind(NodeKind::LogicGate)
        .filter_map(|node| {
            let inputs = ctx.graph.incoming_count(node.id());
            let outputs = ctx.graph.outgoing_count(node.id());
            (inputs > 3 || outputs > 2).then(|| {
                suggestion(
                    "simplify_logic",
                    SuggestionType::Simplification,
                    Priority::Medium,
                    format!(
                        "Logic gate '{}' has {} inputs and {} outputs; consider splitting it",
                        node.id(),
                        inputs,
                        outputs
                    ),
                    vec![node.id().to_string()],
                )
            })
        })
        .collect()
}

fn indicator_overload(ctx: &Context) -> Option<ValidationSuggestion> {
    let ids: Vec<String> = ctx
        .workflow
        .nodes_of_kind(NodeKind::TechnicalIndicator)
        .map(|n| n.id().to_string())
        .collect();
    (ids.len() > ctx.config.max_indicators).then(|| {
        suggestion(
            "too_many_indicators",
            SuggestionType::Performance,
            Priority::High,
            format!(
                "{} indicators in one strategy; more than {} rarely adds signal and slows evaluation",
                ids.len(),
                ctx.config.max_indicators
            ),
            ids,
        )
    })
}

fn missing_risk_management(ctx: &Context) -> Option<ValidationSuggestion> {
    let actions: Vec<String> = ctx
        .workflow
        .nodes_of_kind(NodeKind::Action)
        .map(|n| n.id().to_string())
        .collect();
    let has_risk = ctx.workflow.nodes_of_kind(NodeKind::Risk).next().is_some();
    (!actions.is_empty() && !has_risk).then(|| {
        suggestion(
            "add_risk_management",
            SuggestionType::RiskManagement,
            Priority::High,
            "Strategy places orders without a risk node; add stop-loss or position limits"
                .to_string(),
            actions,
        )
    })
}
