use thiserror::Error;

use crate::data::DataId;

/// Errors raised by the data store
#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    #[error("Data id {0} already exists")]
    DuplicateIndex(DataId),

    #[error("No data entry with id {0}")]
    MissingEntry(DataId),

    #[error("Identity key '{key}' not found in {side} metadata while merging")]
    MissingIdentityKey { key: String, side: &'static str },

    #[error("Cannot append slice: expected {expected:?}, got {actual:?}")]
    SliceMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Result type for data store operations
pub type DataResult<T> = Result<T, DataError>;

/// Errors raised by the tool registry
#[derive(Debug, Error, PartialEq)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

/// Result type for tool operations
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors that can occur while loading the session configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),
}
