use thiserror::Error;

/// Errors that reject a whole ranking run before any scoring starts
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid job specification: {0}")]
    InvalidJobSpec(String),

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),
}

/// Errors scoped to a single required skill
///
/// The skill is marked unmatched; the rest of the resume keeps scoring.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatcherError {
    #[error("search pattern is empty")]
    EmptyPattern,

    #[error("malformed skill '{0}': no searchable characters")]
    MalformedSkill(String),
}
