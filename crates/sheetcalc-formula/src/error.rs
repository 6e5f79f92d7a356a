//! Formula error types

use sheetcalc_core::CellError;
use thiserror::Error;

/// Result type for formula operations
pub type Result<T> = std::result::Result<T, FormulaError>;

/// Faults raised while parsing or evaluating a formula
///
/// Spreadsheet errors such as `#DIV/0!` are ordinary values
/// ([`FormulaValue::Error`](crate::FormulaValue::Error)); this type covers
/// the conditions that abort an evaluation step instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Formula evaluation error
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Unknown function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// A cell's formula depends on its own value
    #[error("Circular reference at {0}")]
    CircularReference(String),

    /// Expression nesting or reference chain exceeded the configured limit
    #[error("Maximum evaluation depth of {0} exceeded")]
    DepthExceeded(usize),

    /// Reference to invalid cell
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Failure reported by a registered custom function
    #[error("{0}")]
    Custom(String),
}

impl FormulaError {
    /// Create a custom function error
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        FormulaError::Custom(msg.into())
    }

    /// The spreadsheet error code this fault surfaces as
    pub fn cell_error(&self) -> CellError {
        match self {
            FormulaError::UnknownFunction(_) => CellError::Name,
            FormulaError::CircularReference(_) => CellError::Ref,
            _ => CellError::Generic,
        }
    }

    /// Whether this fault aborts the whole evaluation rather than only the
    /// referenced cell it was raised in
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FormulaError::CircularReference(_) | FormulaError::DepthExceeded(_)
        )
    }
}
