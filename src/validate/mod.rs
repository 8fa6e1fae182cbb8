//! Strategy graph validation.
//!
//! A fixed pipeline of twelve checks runs over the same nodes and edges.
//! Every stage returns its own findings; nothing short-circuits, so one pass
//! reports every problem in the graph.

pub mod connections;
pub mod parameters;
pub mod performance;
pub mod report;
pub mod security;
pub mod structural;
pub mod suggestions;

use std::collections::HashMap;

use petgraph::graph::NodeIndex;
use tracing::{debug, debug_span, info};

use crate::config::ValidatorConfig;
use crate::error::ValidatorError;
use crate::parse::graph::StrategyGraph;
use crate::parse::types::{Workflow, WorkflowEdge, WorkflowNode};

pub use report::*;

/// Read-only view shared by all stages of one validation run.
pub struct Context<'a> {
    pub workflow: &'a Workflow,
    pub graph: &'a StrategyGraph,
    pub config: &'a ValidatorConfig,
    nodes_by_id: HashMap<&'a str, &'a WorkflowNode>,
}

impl<'a> Context<'a> {
    pub fn new(
        workflow: &'a Workflow,
        graph: &'a StrategyGraph,
        config: &'a ValidatorConfig,
    ) -> Self {
        let nodes_by_id = workflow.nodes.iter().map(|n| (n.id(), n)).collect();
        Context {
            workflow,
            graph,
            config,
            nodes_by_id,
        }
    }

    pub fn node(&self, id: &str) -> Option<&'a WorkflowNode> {
        self.nodes_by_id.get(id).copied()
    }

    pub fn node_at(&self, idx: NodeIndex) -> Option<&'a WorkflowNode> {
        self.node(self.graph.node_id(idx))
    }

    /// Declared input count of a logic gate, falling back to the configured default.
    pub fn logic_inputs(&self, node: &WorkflowNode) -> usize {
        node.logic_params()
            .and_then(|p| p.inputs)
            .unwrap_or(self.config.default_logic_inputs)
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorkflowValidator {
    config: ValidatorConfig,
}

impl WorkflowValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidatorConfig) -> Self {
        WorkflowValidator { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Run the full pipeline. Callers are expected to have checked
    /// `Workflow::check_preconditions` (the `parse` functions do).
    pub fn validate(&self, workflow: &Workflow) -> ValidationResult {
        let _span = debug_span!(
            "validate_workflow",
            nodes = workflow.nodes.len(),
            edges = workflow.edges.len()
        )
        .entered();

        let graph = StrategyGraph::build(workflow);
        let ctx = Context::new(workflow, &graph, &self.config);

        let signal_paths = connections::trace_signal_paths(&ctx);
        let logic_depths = parameters::logic_depths(&ctx);
        let complexity = performance::complexity_score(&ctx);

        let stages = [
            ("dag_structure", structural::check_dag(&ctx)),
            ("minimum_requirements", structural::check_minimum_requirements(&ctx)),
            ("connection_cardinality", structural::check_connection_cardinality(&ctx)),
            ("type_compatibility", connections::check_type_compatibility(&ctx)),
            ("parameter_ranges", parameters::check_parameter_ranges(&ctx)),
            ("topological_order", structural::check_topological_order(&ctx)),
            ("timeframe_consistency", parameters::check_timeframe_consistency(&ctx)),
            ("signal_paths", connections::check_signal_paths(&signal_paths)),
            ("logic_gates", parameters::check_logic_gates(&ctx, &logic_depths)),
            ("multi_output", connections::check_multi_output_indicators(&ctx)),
            ("performance_impact", performance::check_performance_impact(&ctx, complexity)),
            ("security", security::check_security(&ctx)),
        ];

        let mut findings = Vec::new();
        for (stage, stage_findings) in stages {
            debug!(stage, findings = stage_findings.len(), "stage complete");
            findings.extend(stage_findings);
        }
        for (i, finding) in findings.iter_mut().enumerate() {
            finding.id = format!("{}_{}", finding.code, i + 1);
        }

        let suggestions = suggestions::generate(&ctx);
        let performance = performance::metrics(
            &ctx,
            complexity,
            logic_depths.max_depth(),
            signal_paths.reachable_count(),
        );

        let result = ValidationResult::from_findings(findings, suggestions, performance);
        info!(
            valid = result.is_valid,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            suggestions = result.suggestions.len(),
            "workflow validated"
        );
        result
    }
}

/// Validate a graph with the default thresholds. Duplicate node ids are
/// rejected before any check runs.
pub fn validate_workflow(
    nodes: Vec<WorkflowNode>,
    edges: Vec<WorkflowEdge>,
) -> Result<ValidationResult, ValidatorError> {
    let workflow = Workflow::new(nodes, edges);
    workflow.check_preconditions()?;
    Ok(WorkflowValidator::new().validate(&workflow))
}
