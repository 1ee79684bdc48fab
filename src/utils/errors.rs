use std::io;
use thiserror::Error;

/// Errors raised while loading and assembling a vehicle description.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported table dimensionality: {0} independent variables")]
    TableDimension(usize),

    #[error("Malformed table data: {0}")]
    TableData(String),

    #[error("Unresolvable include: {0}")]
    Include(String),

    #[error("Invalid vehicle configuration: {0}")]
    Validation(String),
}

/// Errors raised by the strict model accessors. The lenient variants log a
/// warning and carry on instead.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Property not found: {0}")]
    UnknownProperty(String),

    #[error("Function not found: {0}")]
    UnknownFunction(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}
