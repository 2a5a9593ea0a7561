//! Mapping errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MappingError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("OTM document must be a JSON object")]
    NotAnObject,

    #[error("OTM document is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("OTM field '{0}' must be an array")]
    NotAnArray(&'static str),
}

pub type MappingResult<T> = Result<T, MappingError>;
