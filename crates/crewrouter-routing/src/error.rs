//! Error types for the routing pipeline

use thiserror::Error;

/// Errors that can occur in the routing pipeline
#[derive(Debug, Error)]
pub enum RoutingError {
    /// Context analysis failed
    #[error("Context analysis error: {0}")]
    ContextAnalysis(String),

    /// Agent scoring failed
    #[error("Scoring error: {0}")]
    Scoring(String),

    /// Capability registry error
    #[error("Capability error: {0}")]
    Capability(#[from] crewrouter_capabilities::CapabilityError),

    /// IO error from a file-reader collaborator
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for routing operations
pub type Result<T> = std::result::Result<T, RoutingError>;
