//! Error types for day-resolver operations.
//!
//! An unrecognized date expression is not an error; resolution reports it
//! as `None`. These variants cover the layers around the resolver: tool
//! arguments and clock configuration.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}

pub type Result<T> = std::result::Result<T, ResolverError>;
