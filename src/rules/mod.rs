//! Static rule tables: port data types, the compatibility matrix and
//! per-kind input cardinality.

pub mod indicators;

use serde::{Deserialize, Serialize};

use crate::parse::types::NodeKind;

/// Semantic data type carried over an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortType {
    Ohlcv,
    Numeric,
    Value,
    Signal,
    Risk,
    Execution,
    Any,
}

impl PortType {
    pub fn as_str(self) -> &'static str {
        match self {
            PortType::Ohlcv => "ohlcv",
            PortType::Numeric => "numeric",
            PortType::Value => "value",
            PortType::Signal => "signal",
            PortType::Risk => "risk",
            PortType::Execution => "execution",
            PortType::Any => "any",
        }
    }

    /// Whether data of type `self` may feed an input declared as `input`.
    pub fn feeds(self, input: PortType) -> bool {
        if input == PortType::Any || self == input {
            return true;
        }
        use PortType::*;
        match self {
            Ohlcv | Numeric | Value => matches!(input, Ohlcv | Numeric | Value),
            Signal | Risk | Execution => false,
            Any => true,
        }
    }
}

impl std::fmt::Display for PortType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output type produced on `handle` of a node of `kind`.
pub fn output_type(kind: NodeKind, handle: Option<&str>) -> PortType {
    match (kind, handle) {
        (NodeKind::Risk, Some("risk-output")) => PortType::Risk,
        (NodeKind::DataSource | NodeKind::CustomDataset, _) => PortType::Ohlcv,
        (NodeKind::TechnicalIndicator, _) => PortType::Numeric,
        (NodeKind::Condition | NodeKind::LogicGate | NodeKind::Risk, _) => PortType::Signal,
        (NodeKind::Action, _) => PortType::Execution,
        (NodeKind::Output, _) => PortType::Any,
        (NodeKind::MarketRegimeDetection, _) => PortType::Value,
        (NodeKind::MultiTimeframeAnalysis, _) => PortType::Ohlcv,
        (NodeKind::CorrelationAnalysis | NodeKind::SentimentAnalysis, _) => PortType::Numeric,
    }
}

/// Input type accepted on `handle` of a node of `kind`.
pub fn input_type(kind: NodeKind, handle: Option<&str>) -> PortType {
    match (kind, handle) {
        (NodeKind::Action, Some("risk-input")) => PortType::Risk,
        (NodeKind::Action, Some("execution-input")) => PortType::Execution,
        (NodeKind::TechnicalIndicator, _) => PortType::Ohlcv,
        (NodeKind::Condition, _) => PortType::Numeric,
        (NodeKind::LogicGate | NodeKind::Risk | NodeKind::Action, _) => PortType::Signal,
        (
            NodeKind::MarketRegimeDetection
            | NodeKind::MultiTimeframeAnalysis
            | NodeKind::CorrelationAnalysis,
            _,
        ) => PortType::Ohlcv,
        (NodeKind::Output | NodeKind::SentimentAnalysis, _) => PortType::Any,
        // Sources take no inputs; anything wired into them is a cardinality problem.
        (NodeKind::DataSource | NodeKind::CustomDataset, _) => PortType::Any,
    }
}

/// Required and maximum number of incoming edges. `max: None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cardinality {
    pub required: usize,
    pub max: Option<usize>,
}

impl Cardinality {
    const fn exact(n: usize) -> Self {
        Cardinality {
            required: n,
            max: Some(n),
        }
    }

    const fn between(required: usize, max: usize) -> Self {
        Cardinality {
            required,
            max: Some(max),
        }
    }
}

/// Input cardinality for `kind`. Logic gates take exactly their declared
/// input count, supplied by the caller.
pub fn cardinality(kind: NodeKind, logic_inputs: usize) -> Cardinality {
    match kind {
        NodeKind::DataSource | NodeKind::CustomDataset => Cardinality::exact(0),
        NodeKind::TechnicalIndicator => Cardinality {
            required: 1,
            max: None,
        },
        NodeKind::Condition | NodeKind::Risk => Cardinality::between(1, 2),
        NodeKind::LogicGate => Cardinality::exact(logic_inputs),
        NodeKind::CorrelationAnalysis => Cardinality::exact(2),
        NodeKind::Action
        | NodeKind::Output
        | NodeKind::MarketRegimeDetection
        | NodeKind::MultiTimeframeAnalysis
        | NodeKind::SentimentAnalysis => Cardinality::exact(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compatibility_matrix() {
        assert!(PortType::Ohlcv.feeds(PortType::Numeric));
        assert!(PortType::Numeric.feeds(PortType::Ohlcv));
        assert!(PortType::Value.feeds(PortType::Numeric));
        assert!(PortType::Signal.feeds(PortType::Signal));
        assert!(PortType::Signal.feeds(PortType::Any));
        assert!(!PortType::Signal.feeds(PortType::Numeric));
        assert!(!PortType::Numeric.feeds(PortType::Signal));
        assert!(!PortType::Risk.feeds(PortType::Signal));
        assert!(!PortType::Execution.feeds(PortType::Risk));
    }

    #[test]
    fn handle_specific_ports() {
        assert_eq!(output_type(NodeKind::Risk, None), PortType::Signal);
        assert_eq!(
            output_type(NodeKind::Risk, Some("risk-output")),
            PortType::Risk
        );
        assert_eq!(
            input_type(NodeKind::Action, Some("risk-input")),
            PortType::Risk
        );
        assert_eq!(
            input_type(NodeKind::Action, Some("signal-input")),
            PortType::Signal
        );
    }

    #[test]
    fn cardinality_table() {
        assert_eq!(cardinality(NodeKind::DataSource, 2), Cardinality::exact(0));
        assert_eq!(cardinality(NodeKind::TechnicalIndicator, 2).max, None);
        assert_eq!(cardinality(NodeKind::LogicGate, 4), Cardinality::exact(4));
        assert_eq!(cardinality(NodeKind::CorrelationAnalysis, 2).required, 2);
        assert_eq!(cardinality(NodeKind::Risk, 2).max, Some(2));
    }
}
