use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The input is not a record container at all (e.g. a JSON array or string)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
