/// DbAutoFill Error Module
///
/// This module defines the error types shared by the binding engine and the
/// stored-procedure layer. Binding primitives propagate these directly; the
/// command helper is the only place that turns them into a `DbResponse`.
use thiserror::Error;

/// Error type for every fallible operation in the crate.
///
/// The first three variants are raised by the binding engine itself:
/// - `InvalidArgument` for absent inputs and empty parameter names
/// - `MissingField` when a required column is not in the result set
/// - `TypeConversion` when a raw value cannot be coerced to the member type
///
/// The remaining variants only come out of the connection and configuration
/// layers.
#[derive(Error, Debug)]
pub enum DbAutoFillError {
    /// An input was absent or malformed (empty alias, empty parameter name)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A required column was absent from the result set
    #[error("No column named '{column}' in reader for object '{type_name}'.")]
    MissingField { column: String, type_name: String },

    /// A raw database value could not be converted to the target type
    #[error("Type conversion error: {0}")]
    TypeConversion(String),

    /// Opening a connection failed
    #[error("Connection error: {0}")]
    Connection(String),

    /// Preparing or running a procedure failed
    #[error("Execution error: {0}")]
    Execution(String),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors surfaced by SQLite
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl DbAutoFillError {
    /// Builds a `TypeConversion` error naming the value and the target type.
    pub fn conversion(value: impl std::fmt::Display, target: &str, reason: impl std::fmt::Display) -> Self {
        DbAutoFillError::TypeConversion(format!(
            "cannot convert '{}' to {}: {}",
            value, target, reason
        ))
    }
}

/// Type alias for Result to use DbAutoFillError as the error type.
pub type Result<T> = std::result::Result<T, DbAutoFillError>;
