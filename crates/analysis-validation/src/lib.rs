//! Structural validation of composite analysis records.

pub mod report;
pub mod validator;

pub use report::{FindingKind, Severity, ValidationFinding, ValidationReport};
pub use validator::{validate, RecordValidator};
