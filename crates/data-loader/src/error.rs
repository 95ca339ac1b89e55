//! Error types for the data-loader crate.
//!
//! Two families live here:
//! - `DataLoadError` for problems reading or indexing the recipe catalog
//! - `ProfileError` for user profiles that fail intake validation

use thiserror::Error;

/// Errors that can occur while loading, parsing or indexing the catalog
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The catalog document couldn't be decoded
    ///
    /// `line` and `column` point into the JSON source.
    #[error("Parse error at line {line}, column {column} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        column: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Referenced entity doesn't exist (e.g., an ingredient naming an unknown food)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: String },

    /// Two entities share a key that must be unique
    #[error("Duplicate {entity}: {key}")]
    Duplicate { entity: String, key: String },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;

/// A user profile field outside its accepted range.
///
/// Enumerated fields (gender, activity level, goal) are closed at the type
/// level, so only numeric bounds can fail here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f32,
        max: f32,
        value: f32,
    },
}
