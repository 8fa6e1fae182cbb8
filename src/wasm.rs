//! WASM entry points for the strategy editor.

use wasm_bindgen::prelude::*;

use crate::error::ValidatorError;
use crate::validate::{ValidationResult, WorkflowValidator};

/// Validate a `{ nodes, edges }` workflow JSON document.
/// Returns `{ status: "ok", result }` or `{ status: "error", phase, message }`.
#[wasm_bindgen]
pub fn validate_workflow(json: &str) -> JsValue {
    let outcome = validate_workflow_inner(json);
    serde_wasm_bindgen::to_value(&outcome).unwrap_or(JsValue::NULL)
}

/// Validate node and edge arrays held separately by the editor.
#[wasm_bindgen]
pub fn validate_graph(nodes_json: &str, edges_json: &str) -> JsValue {
    let outcome = validate_graph_inner(nodes_json, edges_json);
    serde_wasm_bindgen::to_value(&outcome).unwrap_or(JsValue::NULL)
}

/// Validate with threshold overrides from a JSON `ValidatorConfig`.
#[wasm_bindgen]
pub fn validate_workflow_with_config(json: &str, config_json: &str) -> JsValue {
    let outcome = match crate::config::ValidatorConfig::from_json(config_json) {
        Ok(config) => run(crate::parse::parse(json), &WorkflowValidator::with_config(config)),
        Err(e) => Outcome::from(e),
    };
    serde_wasm_bindgen::to_value(&outcome).unwrap_or(JsValue::NULL)
}

fn validate_workflow_inner(json: &str) -> Outcome {
    run(crate::parse::parse(json), &WorkflowValidator::new())
}

fn validate_graph_inner(nodes_json: &str, edges_json: &str) -> Outcome {
    run(
        crate::parse::parse_parts(nodes_json, edges_json),
        &WorkflowValidator::new(),
    )
}

fn run(
    workflow: Result<crate::parse::Workflow, ValidatorError>,
    validator: &WorkflowValidator,
) -> Outcome {
    match workflow {
        Ok(workflow) => Outcome::Ok {
            result: validator.validate(&workflow),
        },
        Err(e) => Outcome::from(e),
    }
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(serde::Serialize)]
#[serde(tag = "status")]
enum Outcome {
    #[serde(rename = "ok")]
    Ok { result: ValidationResult },
    #[serde(rename = "error")]
    Error { phase: String, message: String },
}

impl From<ValidatorError> for Outcome {
    fn from(e: ValidatorError) -> Self {
        Outcome::Error {
            phase: e.phase().to_string(),
            message: e.to_string(),
        }
    }
}
