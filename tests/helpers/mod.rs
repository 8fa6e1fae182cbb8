use serde_json::{Value, json};
use strategy_validator::parse::{Workflow, WorkflowEdge, WorkflowNode};
use strategy_validator::validate::{Severity, ValidationError, ValidationResult, WorkflowValidator};

// =============================================================================
// Node builders
// =============================================================================

pub fn node(id: &str, node_type: &str, parameters: Value) -> WorkflowNode {
    serde_json::from_value(json!({
        "id": id,
        "type": node_type,
        "data": { "label": id, "parameters": parameters }
    }))
    .unwrap_or_else(|e| panic!("bad test node '{}': {}", id, e))
}

pub fn data_source(id: &str) -> WorkflowNode {
    node(id, "dataSource", json!({ "symbol": "BTCUSDT", "timeframe": "1h" }))
}

pub fn data_source_at(id: &str, timeframe: &str) -> WorkflowNode {
    node(id, "dataSource", json!({ "symbol": "BTCUSDT", "timeframe": timeframe }))
}

pub fn indicator(id: &str, name: &str, period: f64) -> WorkflowNode {
    node(
        id,
        "technicalIndicator",
        json!({ "indicator": name, "period": period }),
    )
}

pub fn condition(id: &str) -> WorkflowNode {
    node(id, "condition", json!({ "condition": "greater_than", "value": 70 }))
}

pub fn logic_gate(id: &str, inputs: usize) -> WorkflowNode {
    node(id, "logicGate", json!({ "operation": "AND", "inputs": inputs }))
}

pub fn action(id: &str, quantity: f64) -> WorkflowNode {
    node(id, "action", json!({ "action": "buy", "quantity": quantity }))
}

pub fn risk(id: &str, max_loss: f64) -> WorkflowNode {
    node(id, "risk", json!({ "maxLoss": max_loss }))
}

pub fn output(id: &str) -> WorkflowNode {
    node(id, "output", json!({}))
}

// =============================================================================
// Edge builders
// =============================================================================

pub fn edge(source: &str, target: &str) -> WorkflowEdge {
    WorkflowEdge {
        id: format!("{}->{}", source, target),
        source: source.into(),
        target: target.into(),
        source_handle: None,
        target_handle: None,
    }
}

pub fn handle_edge(source: &str, handle: &str, target: &str) -> WorkflowEdge {
    WorkflowEdge {
        id: format!("{}:{}->{}", source, handle, target),
        source: source.into(),
        target: target.into(),
        source_handle: Some(handle.into()),
        target_handle: None,
    }
}

// =============================================================================
// Workflows
// =============================================================================

/// ds → RSI(14) → condition → buy, with a risk node gating the order and an
/// output collecting fills. Valid and warning-free.
pub fn complete_strategy() -> Workflow {
    Workflow::new(
        vec![
            data_source("ds1"),
            indicator("rsi", "RSI", 14.0),
            condition("cond"),
            risk("risk", 5.0),
            action("buy", 1.0),
            output("out"),
        ],
        vec![
            edge("ds1", "rsi"),
            edge("rsi", "cond"),
            edge("cond", "risk"),
            edge("risk", "buy"),
            edge("risk", "out"),
        ],
    )
}

pub fn validate(workflow: &Workflow) -> ValidationResult {
    WorkflowValidator::new().validate(workflow)
}

// =============================================================================
// Assertions
// =============================================================================

pub fn assert_has(result: &ValidationResult, code: &str) -> ValidationError {
    result
        .with_code(code)
        .next()
        .cloned()
        .unwrap_or_else(|| panic!("Expected finding {}, got: {:#?}", code, codes(result)))
}

pub fn assert_lacks(result: &ValidationResult, code: &str) {
    assert!(
        !result.has_code(code),
        "Did not expect finding {}, but got: {:#?}",
        code,
        codes(result)
    );
}

pub fn assert_severity(finding: &ValidationError, severity: Severity) {
    assert_eq!(finding.severity, severity, "{}", finding);
}

pub fn codes(result: &ValidationResult) -> Vec<&str> {
    result.findings().map(|f| f.code.as_str()).collect()
}
