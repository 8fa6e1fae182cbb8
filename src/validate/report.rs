//! Validation report types, serialized camelCase for the strategy editor.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingType {
    /// Blocks compilation.
    Error,
    Warning,
    /// Advisory only.
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Structure,
    Connection,
    Parameter,
    Performance,
    Security,
}

/// UI ordering hint, independent of `FindingType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Unique within one result; assigned once all stages have run.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FindingType,
    pub category: Category,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_id: Option<String>,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationError {
    fn new(
        kind: FindingType,
        code: &str,
        category: Category,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        ValidationError {
            id: String::new(),
            kind,
            category,
            code: code.into(),
            message: message.into(),
            node_id: None,
            edge_id: None,
            severity,
            suggestion: None,
        }
    }

    pub fn error(
        code: &str,
        category: Category,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self::new(FindingType::Error, code, category, severity, message)
    }

    pub fn warning(
        code: &str,
        category: Category,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self::new(FindingType::Warning, code, category, severity, message)
    }

    pub fn info(code: &str, category: Category, message: impl Into<String>) -> Self {
        Self::new(FindingType::Info, code, category, Severity::Low, message)
    }

    pub fn on_node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    pub fn on_edge(mut self, edge_id: impl Into<String>) -> Self {
        self.edge_id = Some(edge_id.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.kind == FindingType::Error
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.node_id, &self.edge_id) {
            (_, Some(edge)) => write!(f, "[{}] {} (edge '{}')", self.code, self.message, edge),
            (Some(node), None) => write!(f, "[{}] {} (node '{}')", self.code, self.message, node),
            (None, None) => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionType {
    Optimization,
    Simplification,
    RiskManagement,
    Performance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSuggestion {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SuggestionType,
    pub code: String,
    pub priority: Priority,
    pub message: String,
    pub node_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub estimated_complexity: u64,
    /// Milliseconds per evaluation.
    pub estimated_execution_time: f64,
    /// Bytes.
    pub memory_usage: u64,
    pub logic_depth: usize,
    pub indicator_count: usize,
    pub signal_path_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    /// Warnings and info findings.
    pub warnings: Vec<ValidationError>,
    pub suggestions: Vec<ValidationSuggestion>,
    pub performance: PerformanceMetrics,
}

impl ValidationResult {
    /// Split findings by type and derive `is_valid`.
    pub fn from_findings(
        findings: Vec<ValidationError>,
        suggestions: Vec<ValidationSuggestion>,
        performance: PerformanceMetrics,
    ) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            findings.into_iter().partition(ValidationError::is_error);
        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            suggestions,
            performance,
        }
    }

    /// Every finding, errors first.
    pub fn findings(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().chain(self.warnings.iter())
    }

    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.findings().filter(move |f| f.code == code)
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.with_code(code).next().is_some()
    }

    pub fn suggestion(&self, code: &str) -> Option<&ValidationSuggestion> {
        self.suggestions.iter().find(|s| s.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_drives_validity() {
        let findings = vec![
            ValidationError::warning("w", Category::Structure, Severity::Low, "warn"),
            ValidationError::info("i", Category::Connection, "note"),
        ];
        let result =
            ValidationResult::from_findings(findings, vec![], PerformanceMetrics::default());
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 2);

        let findings = vec![ValidationError::error(
            "e",
            Category::Parameter,
            Severity::High,
            "bad",
        )];
        let result =
            ValidationResult::from_findings(findings, vec![], PerformanceMetrics::default());
        assert!(!result.is_valid);
        assert!(result.has_code("e"));
    }

    #[test]
    fn serializes_for_editor() {
        let finding = ValidationError::error(
            "type_mismatch",
            Category::Connection,
            Severity::High,
            "signal cannot feed numeric",
        )
        .on_edge("e1");
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["severity"], "high");
        assert_eq!(json["edgeId"], "e1");
        assert!(json.get("nodeId").is_none());
    }
}
