//! Tagged outcome of a top-level evaluation

use crate::error::FormulaError;
use crate::value::FormulaValue;
use sheetcalc_core::{CellError, CellValue};
use std::fmt;

const CIRCULAR_REFERENCE: &str = "Circular reference";

/// Kind of value a [`FormulaResult`] carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ResultType {
    Number,
    String,
    Boolean,
    Error,
    Array,
}

impl ResultType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultType::Number => "number",
            ResultType::String => "string",
            ResultType::Boolean => "boolean",
            ResultType::Error => "error",
            ResultType::Array => "array",
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value and type of an evaluated formula
///
/// `error()` is `Some` exactly when `result_type()` is [`ResultType::Error`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FormulaResult {
    value: FormulaValue,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    result_type: ResultType,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    error: Option<String>,
}

impl FormulaResult {
    /// Classify a computed value
    ///
    /// An empty value reads as the number 0, and text starting with `#` is
    /// reported as an error.
    pub fn from_value(value: FormulaValue) -> Self {
        match value {
            FormulaValue::Number(_) => Self::plain(value, ResultType::Number),
            FormulaValue::Boolean(_) => Self::plain(value, ResultType::Boolean),
            FormulaValue::Array(_) => Self::plain(value, ResultType::Array),
            FormulaValue::Empty => Self::plain(FormulaValue::Number(0.0), ResultType::Number),
            FormulaValue::Error(e) => Self::error(e, e.description()),
            FormulaValue::String(s) if s.starts_with('#') => Self {
                error: Some(match CellError::from_str(&s) {
                    Some(e) => e.description().to_string(),
                    None => s.clone(),
                }),
                value: FormulaValue::String(s),
                result_type: ResultType::Error,
            },
            FormulaValue::String(_) => Self::plain(value, ResultType::String),
        }
    }

    /// An error result with an explanatory message
    pub fn error<S: Into<String>>(code: CellError, message: S) -> Self {
        Self {
            value: FormulaValue::Error(code),
            result_type: ResultType::Error,
            error: Some(message.into()),
        }
    }

    /// The error result a fault surfaces as
    pub fn from_fault(err: &FormulaError) -> Self {
        let message = match err {
            FormulaError::CircularReference(_) => CIRCULAR_REFERENCE.to_string(),
            other => other.to_string(),
        };
        Self::error(err.cell_error(), message)
    }

    fn plain(value: FormulaValue, result_type: ResultType) -> Self {
        Self {
            value,
            result_type,
            error: None,
        }
    }

    /// Computed value
    pub fn value(&self) -> &FormulaValue {
        &self.value
    }

    /// Consume the result, keeping the value
    pub fn into_value(self) -> FormulaValue {
        self.value
    }

    /// Type tag
    pub fn result_type(&self) -> ResultType {
        self.result_type
    }

    /// Error message, present only for error results
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Check if this is an error result
    pub fn is_error(&self) -> bool {
        self.result_type == ResultType::Error
    }

    /// Whether this result reports a circular reference
    pub fn is_circular_reference(&self) -> bool {
        self.value == FormulaValue::Error(CellError::Ref)
            && self.error.as_deref() == Some(CIRCULAR_REFERENCE)
    }

    /// Numeric value, if the result is a number
    pub fn as_number(&self) -> Option<f64> {
        match self.value {
            FormulaValue::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Display text for the result
    pub fn text(&self) -> String {
        self.value.to_text()
    }

    /// Value to store in a cell's cache
    pub fn to_cell_value(&self) -> CellValue {
        match &self.value {
            FormulaValue::String(s) if self.is_error() => CellError::from_str(s)
                .map(CellValue::Error)
                .unwrap_or_else(|| CellValue::string(s.as_str())),
            v => v.clone().into(),
        }
    }
}

impl fmt::Display for FormulaResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}
