//! Parse phase: editor JSON → Rust types + graph construction.

pub mod graph;
pub mod types;

pub use graph::StrategyGraph;
pub use types::*;

use crate::error::ValidatorError;

/// Deserialize a `{ nodes, edges }` document and check its input constraints.
pub fn parse(json: &str) -> Result<Workflow, ValidatorError> {
    let workflow = serde_json::from_str::<Workflow>(json)
        .map_err(|e| ValidatorError::malformed(format!("failed to parse workflow JSON: {}", e)))?;
    workflow.check_preconditions()?;
    Ok(workflow)
}

/// Deserialize separately held node and edge arrays, as the editor stores them.
pub fn parse_parts(nodes_json: &str, edges_json: &str) -> Result<Workflow, ValidatorError> {
    let nodes = serde_json::from_str::<Vec<WorkflowNode>>(nodes_json)
        .map_err(|e| ValidatorError::malformed(format!("failed to parse nodes: {}", e)))?;
    let edges = serde_json::from_str::<Vec<WorkflowEdge>>(edges_json)
        .map_err(|e| ValidatorError::malformed(format!("failed to parse edges: {}", e)))?;
    let workflow = Workflow::new(nodes, edges);
    workflow.check_preconditions()?;
    Ok(workflow)
}
