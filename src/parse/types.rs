//! Rust types for the strategy editor's graph JSON.
//!
//! Nodes are a tagged union on `type`. Parameters that every rule depends on
//! are typed per node kind; anything else the editor attaches lands in the
//! flattened `extra` bag so dynamic indicator settings survive untouched.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidatorError;
use crate::rules::indicators::Indicator;

/// Open key/value bag for parameters without a fixed schema.
pub type Parameters = BTreeMap<String, serde_json::Value>;

// =============================================================================
// TOP-LEVEL WORKFLOW
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub nodes: Vec<WorkflowNode>,
    pub edges: Vec<WorkflowEdge>,
}

impl Workflow {
    pub fn new(nodes: Vec<WorkflowNode>, edges: Vec<WorkflowEdge>) -> Self {
        Workflow {
            id: None,
            nodes,
            edges,
        }
    }

    /// Input constraints that are rejected outright rather than reported as findings.
    pub fn check_preconditions(&self) -> Result<(), ValidatorError> {
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id()) {
                return Err(ValidatorError::DuplicateNodeId(node.id().to_string()));
            }
        }
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &WorkflowNode> {
        self.nodes.iter().filter(move |n| n.kind() == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

// =============================================================================
// NODE BASE
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(bound(deserialize = "P: Deserialize<'de> + Default"))]
pub struct NodeData<P> {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub parameters: P,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "P: Deserialize<'de> + Default"))]
pub struct NodeBase<P> {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default)]
    pub data: NodeData<P>,
}

// =============================================================================
// TYPED PARAMETERS
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSourceParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    #[serde(flatten)]
    pub extra: Parameters,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator: Option<Indicator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<f64>,
    #[serde(flatten)]
    pub extra: Parameters,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConditionParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionOperator>,
    /// Comparison value, or the lower bound in `range` mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Upper bound in `range` mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value2: Option<f64>,
    #[serde(flatten)]
    pub extra: Parameters,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(flatten)]
    pub extra: Parameters,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogicGateParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Declared number of input ports.
    #[serde(
        default,
        deserialize_with = "port_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub inputs: Option<usize>,
    #[serde(flatten)]
    pub extra: Parameters,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskParams {
    /// Maximum loss as a percentage of position value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_loss: Option<f64>,
    #[serde(flatten)]
    pub extra: Parameters,
}

/// Non-negative whole number, written either as an integer or as an
/// integral float (`2.0`). Counts beyond `usize` saturate.
fn port_count<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Some(n) = number.as_u64() {
        return Ok(Some(usize::try_from(n).unwrap_or(usize::MAX)));
    }
    match number.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 => Ok(Some(f as usize)),
        _ => Err(D::Error::custom(format!(
            "expected a non-negative whole number of inputs, found {}",
            number
        ))),
    }
}

/// Comparison mode of a condition node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionOperator {
    GreaterThan,
    LessThan,
    Equals,
    CrossesAbove,
    CrossesBelow,
    /// `value` is the lower bound, `value2` the upper bound.
    Range,
    Other(String),
}

impl From<String> for ConditionOperator {
    fn from(s: String) -> Self {
        match s.as_str() {
            "greater_than" | "greaterThan" | ">" => ConditionOperator::GreaterThan,
            "less_than" | "lessThan" | "<" => ConditionOperator::LessThan,
            "equals" | "==" => ConditionOperator::Equals,
            "crosses_above" | "crossesAbove" => ConditionOperator::CrossesAbove,
            "crosses_below" | "crossesBelow" => ConditionOperator::CrossesBelow,
            "range" | "between" => ConditionOperator::Range,
            _ => ConditionOperator::Other(s),
        }
    }
}

impl From<ConditionOperator> for String {
    fn from(op: ConditionOperator) -> Self {
        match op {
            ConditionOperator::GreaterThan => "greater_than".into(),
            ConditionOperator::LessThan => "less_than".into(),
            ConditionOperator::Equals => "equals".into(),
            ConditionOperator::CrossesAbove => "crosses_above".into(),
            ConditionOperator::CrossesBelow => "crosses_below".into(),
            ConditionOperator::Range => "range".into(),
            ConditionOperator::Other(s) => s,
        }
    }
}

// =============================================================================
// WORKFLOW NODE: tagged union over 12 node kinds
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkflowNode {
    // Inputs
    #[serde(rename = "dataSource", alias = "data-source")]
    DataSource(NodeBase<DataSourceParams>),
    #[serde(rename = "customDataset", alias = "custom-dataset")]
    CustomDataset(NodeBase<DataSourceParams>),

    // Signal construction
    #[serde(rename = "technicalIndicator", alias = "technical-indicator")]
    TechnicalIndicator(NodeBase<IndicatorParams>),
    #[serde(rename = "condition")]
    Condition(NodeBase<ConditionParams>),
    #[serde(rename = "logicGate", alias = "logic-gate")]
    LogicGate(NodeBase<LogicGateParams>),

    // Execution
    #[serde(rename = "action")]
    Action(NodeBase<ActionParams>),
    #[serde(rename = "risk")]
    Risk(NodeBase<RiskParams>),
    #[serde(rename = "output")]
    Output(NodeBase<Parameters>),

    // Analysis
    #[serde(rename = "marketRegimeDetection", alias = "market-regime-detection")]
    MarketRegimeDetection(NodeBase<Parameters>),
    #[serde(rename = "multiTimeframeAnalysis", alias = "multi-timeframe-analysis")]
    MultiTimeframeAnalysis(NodeBase<Parameters>),
    #[serde(rename = "correlationAnalysis", alias = "correlation-analysis")]
    CorrelationAnalysis(NodeBase<Parameters>),
    #[serde(rename = "sentimentAnalysis", alias = "sentiment-analysis")]
    SentimentAnalysis(NodeBase<Parameters>),
}

/// Fieldless mirror of `WorkflowNode`, used as the key of every rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    DataSource,
    CustomDataset,
    TechnicalIndicator,
    Condition,
    LogicGate,
    Action,
    Risk,
    Output,
    MarketRegimeDetection,
    MultiTimeframeAnalysis,
    CorrelationAnalysis,
    SentimentAnalysis,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::DataSource => "dataSource",
            NodeKind::CustomDataset => "customDataset",
            NodeKind::TechnicalIndicator => "technicalIndicator",
            NodeKind::Condition => "condition",
            NodeKind::LogicGate => "logicGate",
            NodeKind::Action => "action",
            NodeKind::Risk => "risk",
            NodeKind::Output => "output",
            NodeKind::MarketRegimeDetection => "marketRegimeDetection",
            NodeKind::MultiTimeframeAnalysis => "multiTimeframeAnalysis",
            NodeKind::CorrelationAnalysis => "correlationAnalysis",
            NodeKind::SentimentAnalysis => "sentimentAnalysis",
        }
    }

    /// Both market data feeds and user-uploaded datasets originate price data.
    pub fn is_data_source(self) -> bool {
        matches!(self, NodeKind::DataSource | NodeKind::CustomDataset)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WorkflowNode {
    pub fn id(&self) -> &str {
        match self {
            WorkflowNode::DataSource(n) => &n.id,
            WorkflowNode::CustomDataset(n) => &n.id,
            WorkflowNode::TechnicalIndicator(n) => &n.id,
            WorkflowNode::Condition(n) => &n.id,
            WorkflowNode::LogicGate(n) => &n.id,
            WorkflowNode::Action(n) => &n.id,
            WorkflowNode::Risk(n) => &n.id,
            WorkflowNode::Output(n) => &n.id,
            WorkflowNode::MarketRegimeDetection(n) => &n.id,
            WorkflowNode::MultiTimeframeAnalysis(n) => &n.id,
            WorkflowNode::CorrelationAnalysis(n) => &n.id,
            WorkflowNode::SentimentAnalysis(n) => &n.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            WorkflowNode::DataSource(n) => &n.data.label,
            WorkflowNode::CustomDataset(n) => &n.data.label,
            WorkflowNode::TechnicalIndicator(n) => &n.data.label,
            WorkflowNode::Condition(n) => &n.data.label,
            WorkflowNode::LogicGate(n) => &n.data.label,
            WorkflowNode::Action(n) => &n.data.label,
            WorkflowNode::Risk(n) => &n.data.label,
            WorkflowNode::Output(n) => &n.data.label,
            WorkflowNode::MarketRegimeDetection(n) => &n.data.label,
            WorkflowNode::MultiTimeframeAnalysis(n) => &n.data.label,
            WorkflowNode::CorrelationAnalysis(n) => &n.data.label,
            WorkflowNode::SentimentAnalysis(n) => &n.data.label,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            WorkflowNode::DataSource(_) => NodeKind::DataSource,
            WorkflowNode::CustomDataset(_) => NodeKind::CustomDataset,
            WorkflowNode::TechnicalIndicator(_) => NodeKind::TechnicalIndicator,
            WorkflowNode::Condition(_) => NodeKind::Condition,
            WorkflowNode::LogicGate(_) => NodeKind::LogicGate,
            WorkflowNode::Action(_) => NodeKind::Action,
            WorkflowNode::Risk(_) => NodeKind::Risk,
            WorkflowNode::Output(_) => NodeKind::Output,
            WorkflowNode::MarketRegimeDetection(_) => NodeKind::MarketRegimeDetection,
            WorkflowNode::MultiTimeframeAnalysis(_) => NodeKind::MultiTimeframeAnalysis,
            WorkflowNode::CorrelationAnalysis(_) => NodeKind::CorrelationAnalysis,
            WorkflowNode::SentimentAnalysis(_) => NodeKind::SentimentAnalysis,
        }
    }

    pub fn node_type(&self) -> &'static str {
        self.kind().as_str()
    }

    /// All parameters, typed and free-form, as one JSON object.
    pub fn parameters_json(&self) -> serde_json::Map<String, serde_json::Value> {
        let value = match self {
            WorkflowNode::DataSource(n) | WorkflowNode::CustomDataset(n) => {
                serde_json::to_value(&n.data.parameters)
            }
            WorkflowNode::TechnicalIndicator(n) => serde_json::to_value(&n.data.parameters),
            WorkflowNode::Condition(n) => serde_json::to_value(&n.data.parameters),
            WorkflowNode::LogicGate(n) => serde_json::to_value(&n.data.parameters),
            WorkflowNode::Action(n) => serde_json::to_value(&n.data.parameters),
            WorkflowNode::Risk(n) => serde_json::to_value(&n.data.parameters),
            WorkflowNode::Output(n)
            | WorkflowNode::MarketRegimeDetection(n)
            | WorkflowNode::MultiTimeframeAnalysis(n)
            | WorkflowNode::CorrelationAnalysis(n)
            | WorkflowNode::SentimentAnalysis(n) => serde_json::to_value(&n.data.parameters),
        };
        match value {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }

    /// Timeframe this node produces data at, for nodes that originate data.
    pub fn timeframe(&self) -> Option<&str> {
        match self {
            WorkflowNode::DataSource(n) | WorkflowNode::CustomDataset(n) => {
                n.data.parameters.timeframe.as_deref()
            }
            _ => None,
        }
    }

    pub fn indicator_params(&self) -> Option<&IndicatorParams> {
        match self {
            WorkflowNode::TechnicalIndicator(n) => Some(&n.data.parameters),
            _ => None,
        }
    }

    pub fn logic_params(&self) -> Option<&LogicGateParams> {
        match self {
            WorkflowNode::LogicGate(n) => Some(&n.data.parameters),
            _ => None,
        }
    }

    pub fn is_data_source(&self) -> bool {
        self.kind().is_data_source()
    }
}
