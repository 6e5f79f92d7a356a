//! Cell value types

use crate::serial;
use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;

/// Type tag of a cell value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CellValueType {
    Number,
    String,
    Boolean,
    Date,
    Error,
    Empty,
}

impl CellValueType {
    /// Lowercase name, as shown to hosting UIs
    pub fn as_str(&self) -> &'static str {
        match self {
            CellValueType::Number => "number",
            CellValueType::String => "string",
            CellValueType::Boolean => "boolean",
            CellValueType::Date => "date",
            CellValueType::Error => "error",
            CellValueType::Empty => "empty",
        }
    }
}

impl fmt::Display for CellValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents the value stored in a cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty cell (no value)
    Empty,

    /// Boolean value (TRUE/FALSE)
    Boolean(bool),

    /// Numeric value
    Number(f64),

    /// String value
    String(SharedString),

    /// Date as a serial number (days since 1899-12-30, fraction = time of day)
    Date(f64),

    /// Error value (#DIV/0!, #REF!, etc.)
    Error(CellError),
}

impl CellValue {
    /// Create a new string value
    pub fn string<S: Into<String>>(s: S) -> Self {
        CellValue::String(SharedString::new(s.into()))
    }

    /// Create a date value from a calendar date
    pub fn date(date: NaiveDate) -> Self {
        CellValue::Date(serial::serial_from_date(date))
    }

    /// The type tag of this value
    pub fn value_type(&self) -> CellValueType {
        match self {
            CellValue::Empty => CellValueType::Empty,
            CellValue::Boolean(_) => CellValueType::Boolean,
            CellValue::Number(_) => CellValueType::Number,
            CellValue::String(_) => CellValueType::String,
            CellValue::Date(_) => CellValueType::Date,
            CellValue::Error(_) => CellValueType::Error,
        }
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Check if the cell contains an error
    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }

    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) | CellValue::Date(n) => Some(*n),
            CellValue::Boolean(true) => Some(1.0),
            CellValue::Boolean(false) => Some(0.0),
            _ => None,
        }
    }

    /// Try to get the value as a string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Interpret typed user input: numbers, TRUE/FALSE, error codes, otherwise text
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return CellValue::Number(n);
            }
        }
        if trimmed.eq_ignore_ascii_case("TRUE") {
            return CellValue::Boolean(true);
        }
        if trimmed.eq_ignore_ascii_case("FALSE") {
            return CellValue::Boolean(false);
        }
        if let Some(e) = CellError::from_str(trimmed) {
            return CellValue::Error(e);
        }
        CellValue::string(input)
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::String(s) => write!(f, "{}", s.as_str()),
            CellValue::Date(serial) => match serial::datetime_from_serial(*serial) {
                Some(dt) if serial.fract() == 0.0 => write!(f, "{}", dt.date()),
                Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
                None => write!(f, "{}", serial),
            },
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::string(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::string(s)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::date(d)
    }
}

impl From<CellError> for CellValue {
    fn from(e: CellError) -> Self {
        CellValue::Error(e)
    }
}

/// Spreadsheet error values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    /// #ERROR! - Generic evaluation fault (parse failure, depth exhaustion, ...)
    Generic,
    /// #NAME? - Unrecognized function name
    Name,
    /// #DIV/0! - Division by zero
    Div0,
    /// #N/A - Lookup found no match
    Na,
    /// #REF! - Reference outside bounds, or circular reference
    Ref,
    /// #VALUE! - Wrong type of argument or operand
    Value,
    /// #NUM! - Invalid numeric value
    Num,
}

impl CellError {
    /// Get the display string for this error
    pub fn as_str(&self) -> &'static str {
        match self {
            CellError::Generic => "#ERROR!",
            CellError::Name => "#NAME?",
            CellError::Div0 => "#DIV/0!",
            CellError::Na => "#N/A",
            CellError::Ref => "#REF!",
            CellError::Value => "#VALUE!",
            CellError::Num => "#NUM!",
        }
    }

    /// Short human-readable explanation
    pub fn description(&self) -> &'static str {
        match self {
            CellError::Generic => "Evaluation error",
            CellError::Name => "Unknown function name",
            CellError::Div0 => "Division by zero",
            CellError::Na => "No matching value",
            CellError::Ref => "Reference out of bounds",
            CellError::Value => "Wrong value type",
            CellError::Num => "Invalid numeric value",
        }
    }

    /// Parse an error string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "#ERROR!" => Some(CellError::Generic),
            "#NAME?" => Some(CellError::Name),
            "#DIV/0!" => Some(CellError::Div0),
            "#N/A" => Some(CellError::Na),
            "#REF!" => Some(CellError::Ref),
            "#VALUE!" => Some(CellError::Value),
            "#NUM!" => Some(CellError::Num),
            _ => None,
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference-counted string shared between a cell and values read from it
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SharedString(Arc<str>);

impl SharedString {
    /// Create a new shared string
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        SharedString(Arc::from(s.as_ref()))
    }

    /// Get the string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the length of the string
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the string is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SharedString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SharedString {
    fn from(s: &str) -> Self {
        SharedString::new(s)
    }
}

impl From<String> for SharedString {
    fn from(s: String) -> Self {
        SharedString::new(s)
    }
}
