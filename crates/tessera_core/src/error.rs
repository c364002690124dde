//! # Error Types
//!
//! Recoverable errors of the component layer.
//!
//! Missing data is not an error (lookups return `None`), and misuse such as
//! removing a component an entity never had is a panic. What remains are the
//! failures a well-formed program can meet at startup: bad configuration and
//! bad component registration.

use thiserror::Error;

/// Errors that can occur while configuring the component layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The same component type was registered twice.
    #[error("component already registered: {0}")]
    DuplicateComponent(&'static str),

    /// Every component id is taken.
    #[error("too many component types: limit is {max}, cannot register {name}")]
    TooManyComponents {
        /// Configured limit.
        max: usize,
        /// The component type that did not fit.
        name: &'static str,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("cannot read configuration {path}: {reason}")]
    ConfigIo {
        /// Path that failed.
        path: String,
        /// Underlying I/O error message.
        reason: String,
    },
}

/// Result type for component layer operations.
pub type EcsResult<T> = Result<T, EcsError>;
