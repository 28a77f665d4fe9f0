//! Error types for the diff crate.
//!
//! Comparison itself never fails; errors only arise when turning
//! caller-supplied strings into view options.

/// Errors that can occur while configuring a diff.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DiffError {
    /// A view option had a value outside its accepted set.
    #[error("invalid value {value:?} for {option}")]
    InvalidViewOption { option: &'static str, value: String },

    /// A field name in a field filter is not a tracked field.
    #[error("unknown tracked field: {0:?}")]
    UnknownField(String),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
