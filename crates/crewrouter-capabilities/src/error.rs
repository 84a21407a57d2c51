//! Error types for capability registry operations

use thiserror::Error;

/// Errors that can occur in capability registry operations
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// Registry accessed before `initialize()` completed
    #[error("Capability registry is not initialized; call initialize() first")]
    NotInitialized,

    /// Agent role not found in the registry
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    /// Capability document could not be loaded
    #[error("Capability load error: {0}")]
    LoadError(String),

    /// Capability document structure is invalid
    #[error("Invalid capability document: {0}")]
    InvalidDocument(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for capability registry operations
pub type Result<T> = std::result::Result<T, CapabilityError>;
