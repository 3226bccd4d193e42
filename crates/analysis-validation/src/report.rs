use analysis_core::LayerKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Structural problem; makes the record invalid
    Issue,
    /// Cosmetic or partial-result notice; never affects validity
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    MissingData,
    OutOfRangeValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub severity: Severity,
    pub kind: FindingKind,
    /// `None` for record-level findings (authoritative decision, whole record)
    pub layer: Option<LayerKind>,
    pub message: String,
}

/// Structural completeness of one composite record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    pub is_valid: bool,
    pub findings: Vec<ValidationFinding>,
}

impl ValidationReport {
    pub(crate) fn new() -> Self {
        Self {
            is_valid: true,
            ..Default::default()
        }
    }

    pub(crate) fn issue(&mut self, kind: FindingKind, layer: Option<LayerKind>, message: String) {
        self.issues.push(message.clone());
        self.is_valid = false;
        self.findings.push(ValidationFinding {
            severity: Severity::Issue,
            kind,
            layer,
            message,
        });
    }

    pub(crate) fn warning(&mut self, kind: FindingKind, layer: Option<LayerKind>, message: String) {
        self.warnings.push(message.clone());
        self.findings.push(ValidationFinding {
            severity: Severity::Warning,
            kind,
            layer,
            message,
        });
    }

    /// Findings about one layer
    pub fn findings_for(&self, layer: LayerKind) -> impl Iterator<Item = &ValidationFinding> {
        self.findings.iter().filter(move |f| f.layer == Some(layer))
    }
}
