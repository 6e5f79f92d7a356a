//! Runtime values produced during evaluation

use sheetcalc_core::{CellError, CellValue};
use std::cmp::Ordering;

/// Value types during formula evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaValue {
    Number(f64),
    String(String),
    Boolean(bool),
    Error(CellError),
    /// Rows of values, as produced by a range reference
    Array(Vec<Vec<FormulaValue>>),
    Empty,
}

impl FormulaValue {
    /// Numeric view of a value that is numeric-coercible
    ///
    /// Numbers, booleans (1/0) and strings that parse as numbers qualify. A
    /// 1×1 array is viewed through its element. Empty values, errors and
    /// other text do not.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormulaValue::Number(n) => Some(*n),
            FormulaValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            FormulaValue::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else {
                    s.parse::<f64>().ok().filter(|n| n.is_finite())
                }
            }
            FormulaValue::Array(_) => self.single().and_then(FormulaValue::as_number),
            FormulaValue::Error(_) | FormulaValue::Empty => None,
        }
    }

    /// Loose numeric coercion used by arithmetic and summation
    ///
    /// Anything that is not numeric-coercible becomes 0.
    pub fn to_number(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }

    /// Truthiness used by `IF`, `AND`, `OR` and `NOT`
    ///
    /// `"TRUE"`/`"FALSE"` text is read case-insensitively, numeric text by
    /// its value, any other non-empty text is true.
    pub fn to_bool(&self) -> bool {
        match self {
            FormulaValue::Boolean(b) => *b,
            FormulaValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FormulaValue::String(s) => {
                let t = s.trim();
                if t.eq_ignore_ascii_case("TRUE") {
                    true
                } else if t.eq_ignore_ascii_case("FALSE") {
                    false
                } else if let Ok(n) = t.parse::<f64>() {
                    n != 0.0 && !n.is_nan()
                } else {
                    !t.is_empty()
                }
            }
            FormulaValue::Array(rows) => match self.single() {
                Some(v) => v.to_bool(),
                None => rows.iter().any(|r| !r.is_empty()),
            },
            FormulaValue::Error(_) | FormulaValue::Empty => false,
        }
    }

    /// Display text
    pub fn to_text(&self) -> String {
        match self {
            FormulaValue::Number(n) => format_number(*n),
            FormulaValue::String(s) => s.clone(),
            FormulaValue::Boolean(true) => "TRUE".to_string(),
            FormulaValue::Boolean(false) => "FALSE".to_string(),
            FormulaValue::Error(e) => e.to_string(),
            FormulaValue::Empty => String::new(),
            FormulaValue::Array(_) => match self.single() {
                Some(v) => v.to_text(),
                None => CellError::Value.to_string(),
            },
        }
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self, FormulaValue::Error(_))
    }

    /// An error value, or text that reads as one (starts with `#`)
    pub fn is_error_like(&self) -> bool {
        match self {
            FormulaValue::Error(_) => true,
            FormulaValue::String(s) => s.starts_with('#'),
            _ => false,
        }
    }

    /// Get the error if this is one
    pub fn error(&self) -> Option<CellError> {
        match self {
            FormulaValue::Error(e) => Some(*e),
            _ => None,
        }
    }

    /// Whether this is an empty value
    pub fn is_empty(&self) -> bool {
        matches!(self, FormulaValue::Empty)
    }

    /// The element of a 1×1 array
    fn single(&self) -> Option<&FormulaValue> {
        match self {
            FormulaValue::Array(rows) if rows.len() == 1 && rows[0].len() == 1 => {
                Some(&rows[0][0])
            }
            _ => None,
        }
    }

    /// Reduce an array to a scalar: a 1×1 array yields its element, any
    /// other array becomes `#VALUE!`
    pub fn into_scalar(self) -> FormulaValue {
        match self {
            FormulaValue::Array(mut rows) => {
                if rows.len() == 1 && rows[0].len() == 1 {
                    rows.remove(0).remove(0).into_scalar()
                } else {
                    FormulaValue::Error(CellError::Value)
                }
            }
            v => v,
        }
    }

    /// Rows of a range argument; a scalar is treated as a 1×1 range
    pub fn rows(&self) -> Vec<Vec<&FormulaValue>> {
        match self {
            FormulaValue::Array(rows) => rows.iter().map(|r| r.iter().collect()).collect(),
            v => vec![vec![v]],
        }
    }
}

/// Recursively expand array arguments into one linear sequence
pub fn flatten(args: &[FormulaValue]) -> Vec<&FormulaValue> {
    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        flatten_into(arg, &mut out);
    }
    out
}

fn flatten_into<'a>(value: &'a FormulaValue, out: &mut Vec<&'a FormulaValue>) {
    match value {
        FormulaValue::Array(rows) => {
            for v in rows.iter().flatten() {
                flatten_into(v, out);
            }
        }
        v => out.push(v),
    }
}

/// First error among the (flattened) arguments
pub fn first_error(args: &[FormulaValue]) -> Option<CellError> {
    flatten(args).into_iter().find_map(FormulaValue::error)
}

/// Format a number the way cells display it: integral values without a
/// fractional part
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Order two values for comparison operators
///
/// Empty compares as 0 against numbers and as `""` against text. Numbers
/// compare numerically, text case-insensitively, FALSE < TRUE. Across kinds
/// numbers sort before text, and text before booleans.
pub fn compare_values(left: &FormulaValue, right: &FormulaValue) -> Ordering {
    use FormulaValue::*;

    match (left, right) {
        (Array(_), _) | (_, Array(_)) => {
            compare_values(&left.clone().into_scalar(), &right.clone().into_scalar())
        }
        (Error(e), other) => compare_values(&String(e.to_string()), other),
        (other, Error(e)) => compare_values(other, &String(e.to_string())),

        (Empty, Empty) => Ordering::Equal,
        (Empty, String(s)) => "".cmp(s.as_str()),
        (String(s), Empty) => s.as_str().cmp(""),
        (Empty, other) => compare_values(&Number(0.0), other),
        (other, Empty) => compare_values(other, &Number(0.0)),

        (Number(l), Number(r)) => l.partial_cmp(r).unwrap_or(Ordering::Equal),
        (String(l), String(r)) => l.to_lowercase().cmp(&r.to_lowercase()),
        (Boolean(l), Boolean(r)) => l.cmp(r),

        (Number(_), _) => Ordering::Less,
        (_, Number(_)) => Ordering::Greater,
        (String(_), Boolean(_)) => Ordering::Less,
        (Boolean(_), String(_)) => Ordering::Greater,
    }
}

/// Serialized as plain JSON-style data: errors as their code text, empty as
/// null and arrays as nested sequences
#[cfg(feature = "serde")]
impl serde::Serialize for FormulaValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FormulaValue::Number(n) => serializer.serialize_f64(*n),
            FormulaValue::String(s) => serializer.serialize_str(s),
            FormulaValue::Boolean(b) => serializer.serialize_bool(*b),
            FormulaValue::Error(e) => serializer.serialize_str(e.as_str()),
            FormulaValue::Array(rows) => serde::Serialize::serialize(rows, serializer),
            FormulaValue::Empty => serializer.serialize_none(),
        }
    }
}

impl From<CellValue> for FormulaValue {
    fn from(value: CellValue) -> Self {
        match value {
            CellValue::Empty => FormulaValue::Empty,
            CellValue::Number(n) | CellValue::Date(n) => FormulaValue::Number(n),
            CellValue::String(s) => FormulaValue::String(s.as_str().to_string()),
            CellValue::Boolean(b) => FormulaValue::Boolean(b),
            CellValue::Error(e) => FormulaValue::Error(e),
        }
    }
}

impl From<&CellValue> for FormulaValue {
    fn from(value: &CellValue) -> Self {
        value.clone().into()
    }
}

impl From<FormulaValue> for CellValue {
    fn from(value: FormulaValue) -> Self {
        match value {
            FormulaValue::Empty => CellValue::Empty,
            FormulaValue::Number(n) => CellValue::Number(n),
            FormulaValue::String(s) => CellValue::String(s.into()),
            FormulaValue::Boolean(b) => CellValue::Boolean(b),
            FormulaValue::Error(e) => CellValue::Error(e),
            arr @ FormulaValue::Array(_) => match arr.into_scalar() {
                FormulaValue::Array(_) => CellValue::Error(CellError::Value),
                v => v.into(),
            },
        }
    }
}

impl From<f64> for FormulaValue {
    fn from(n: f64) -> Self {
        FormulaValue::Number(n)
    }
}

impl From<bool> for FormulaValue {
    fn from(b: bool) -> Self {
        FormulaValue::Boolean(b)
    }
}

impl From<&str> for FormulaValue {
    fn from(s: &str) -> Self {
        FormulaValue::String(s.to_string())
    }
}

impl From<String> for FormulaValue {
    fn from(s: String) -> Self {
        FormulaValue::String(s)
    }
}

impl From<CellError> for FormulaValue {
    fn from(e: CellError) -> Self {
        FormulaValue::Error(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn grid(rows: Vec<Vec<f64>>) -> FormulaValue {
        FormulaValue::Array(
            rows.into_iter()
                .map(|r| r.into_iter().map(FormulaValue::Number).collect())
                .collect(),
        )
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(FormulaValue::Number(2.5).as_number(), Some(2.5));
        assert_eq!(FormulaValue::Boolean(true).as_number(), Some(1.0));
        assert_eq!(FormulaValue::from(" 42 ").as_number(), Some(42.0));
        assert_eq!(FormulaValue::from("abc").as_number(), None);
        assert_eq!(FormulaValue::from("").as_number(), None);
        assert_eq!(FormulaValue::Empty.as_number(), None);

        assert_eq!(FormulaValue::from("abc").to_number(), 0.0);
        assert_eq!(FormulaValue::Empty.to_number(), 0.0);
        assert_eq!(FormulaValue::Error(CellError::Na).to_number(), 0.0);
        assert_eq!(grid(vec![vec![7.0]]).to_number(), 7.0);
        assert_eq!(grid(vec![vec![1.0, 2.0]]).to_number(), 0.0);
    }

    #[test]
    fn test_truthiness() {
        assert!(FormulaValue::Number(-1.0).to_bool());
        assert!(!FormulaValue::Number(0.0).to_bool());
        assert!(!FormulaValue::from("false").to_bool());
        assert!(FormulaValue::from("yes").to_bool());
        assert!(!FormulaValue::from("0").to_bool());
        assert!(!FormulaValue::Empty.to_bool());
    }

    #[test]
    fn test_text() {
        assert_eq!(FormulaValue::Number(60.0).to_text(), "60");
        assert_eq!(FormulaValue::Number(0.5).to_text(), "0.5");
        assert_eq!(FormulaValue::Boolean(true).to_text(), "TRUE");
        assert_eq!(FormulaValue::Error(CellError::Div0).to_text(), "#DIV/0!");
        assert_eq!(grid(vec![vec![1.0], vec![2.0]]).to_text(), "#VALUE!");
    }

    #[test]
    fn test_flatten() {
        let args = vec![
            FormulaValue::Number(1.0),
            grid(vec![vec![2.0, 3.0], vec![4.0, 5.0]]),
            FormulaValue::Array(vec![vec![grid(vec![vec![6.0]])]]),
        ];
        let flat: Vec<f64> = flatten(&args).into_iter().map(|v| v.to_number()).collect();
        assert_eq!(flat, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_first_error() {
        let args = vec![
            FormulaValue::Number(1.0),
            FormulaValue::Array(vec![vec![
                FormulaValue::Empty,
                FormulaValue::Error(CellError::Na),
            ]]),
            FormulaValue::Error(CellError::Div0),
        ];
        assert_eq!(first_error(&args), Some(CellError::Na));
        assert_eq!(first_error(&[FormulaValue::Empty]), None);
    }

    #[test]
    fn test_compare_values() {
        use FormulaValue::*;
        assert_eq!(compare_values(&Number(1.0), &Number(2.0)), Ordering::Less);
        assert_eq!(
            compare_values(&"Apple".into(), &"apple".into()),
            Ordering::Equal
        );
        assert_eq!(compare_values(&Empty, &Number(0.0)), Ordering::Equal);
        assert_eq!(compare_values(&Empty, &"".into()), Ordering::Equal);
        assert_eq!(compare_values(&Number(99.0), &"1".into()), Ordering::Less);
        assert_eq!(compare_values(&Boolean(false), &"z".into()), Ordering::Greater);
    }

    #[test]
    fn test_cell_value_conversions() {
        assert_eq!(FormulaValue::from(CellValue::Date(45292.0)), FormulaValue::Number(45292.0));
        assert_eq!(CellValue::from(grid(vec![vec![3.0]])), CellValue::Number(3.0));
        assert_eq!(
            CellValue::from(grid(vec![vec![1.0, 2.0]])),
            CellValue::Error(CellError::Value)
        );
    }
}
