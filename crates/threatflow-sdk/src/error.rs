//! Error types for the Threatflow SDK

use threatflow::{MappingError, OpsError};
use thiserror::Error;

/// Errors that can occur when executing components
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// Non-success HTTP response; status and body are passed through verbatim
    #[error("Remote executor returned {status}: {body}")]
    Remote { status: u16, body: String },

    /// Component failed in-process
    #[error("Execution error: {0}")]
    Ops(#[from] OpsError),

    /// Document could not be mapped
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;
