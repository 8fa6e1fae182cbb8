//! Property tests over randomly wired strategy graphs.

#[allow(dead_code)]
mod helpers;

use helpers::*;
use proptest::prelude::*;
use proptest::sample::Index;
use serde_json::json;
use strategy_validator::parse::{Workflow, WorkflowEdge};
use strategy_validator::validate::Severity;

const ALL_KINDS: &[&str] = &[
    "dataSource",
    "customDataset",
    "technicalIndicator",
    "condition",
    "logicGate",
    "action",
    "risk",
    "output",
    "marketRegimeDetection",
    "multiTimeframeAnalysis",
    "correlationAnalysis",
    "sentimentAnalysis",
];

const NON_SOURCE_KINDS: &[&str] = &[
    "technicalIndicator",
    "condition",
    "logicGate",
    "action",
    "risk",
    "output",
];

fn parameters_for(kind: &str, knob: i32) -> serde_json::Value {
    match kind {
        "dataSource" => json!({ "timeframe": if knob % 2 == 0 { "1h" } else { "4h" } }),
        "technicalIndicator" => json!({ "indicator": "MACD", "period": knob }),
        "logicGate" => json!({ "inputs": knob.rem_euclid(5) }),
        "action" => json!({ "quantity": knob }),
        "risk" => json!({ "maxLoss": knob }),
        _ => json!({}),
    }
}

fn arb_workflow(kinds: &'static [&'static str]) -> impl Strategy<Value = Workflow> {
    (1usize..12)
        .prop_flat_map(move |n| {
            (
                proptest::collection::vec((0..kinds.len(), -20i32..600), n),
                proptest::collection::vec((0..n, 0..n, 0usize..4), 0..n * 2),
            )
        })
        .prop_map(move |(specs, wires)| {
            let nodes = specs
                .iter()
                .enumerate()
                .map(|(i, &(k, knob))| {
                    node(&format!("n{}", i), kinds[k], parameters_for(kinds[k], knob))
                })
                .collect();
            let edges = wires
                .iter()
                .enumerate()
                .map(|(i, &(s, t, h))| WorkflowEdge {
                    id: format!("e{}", i),
                    source: format!("n{}", s),
                    target: format!("n{}", t),
                    source_handle: [None, Some("macd-output"), Some("upper-output"), Some("output-2")]
                        [h]
                        .map(String::from),
                    target_handle: None,
                })
                .collect();
            Workflow::new(nodes, edges)
        })
}

proptest! {
    #[test]
    fn validation_is_deterministic(workflow in arb_workflow(ALL_KINDS)) {
        let first = validate(&workflow);
        let second = validate(&workflow);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn validity_matches_error_list(workflow in arb_workflow(ALL_KINDS)) {
        let result = validate(&workflow);
        prop_assert_eq!(result.is_valid, result.errors.is_empty());
        prop_assert!(result.errors.iter().all(|e| e.is_error()));
        prop_assert!(result.warnings.iter().all(|e| !e.is_error()));
    }

    #[test]
    fn any_cycle_invalidates(workflow in arb_workflow(ALL_KINDS), a in any::<Index>(), b in any::<Index>()) {
        let mut workflow = workflow;
        let n = workflow.nodes.len();
        let (a, b) = (a.index(n), b.index(n));
        workflow.edges.push(edge(&format!("n{}", a), &format!("n{}", b)));
        workflow.edges.push(edge(&format!("n{}", b), &format!("n{}", a)));

        let result = validate(&workflow);
        prop_assert!(!result.is_valid);
        let cycle = result.with_code("circular_dependency").next();
        prop_assert!(cycle.is_some_and(|f| f.severity == Severity::Critical));
    }

    #[test]
    fn no_data_source_is_never_valid(workflow in arb_workflow(NON_SOURCE_KINDS)) {
        let result = validate(&workflow);
        prop_assert!(!result.is_valid);
        prop_assert!(result.has_code("missing_data_source"));
    }
}
