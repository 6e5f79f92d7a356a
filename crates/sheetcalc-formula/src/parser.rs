//! Formula parser
//!
//! Formula text is matched against a fixed list of alternatives, tried in
//! order, each of which must consume the whole (trimmed) text:
//!
//! 1. quoted string literal (`""` is an escaped quote)
//! 2. numeric literal `-?digits(.digits)?`
//! 3. `TRUE` / `FALSE`
//! 4. cell reference `A1`
//! 5. range reference `A1:C3`
//! 6. function call `NAME(args)` whose parentheses enclose the rest of the text
//! 7. parenthesised group
//! 8. binary operators, split at a top-level occurrence (see [`Precedence`])
//! 9. unary minus
//! 10. anything else is kept verbatim as a string

use crate::ast::{BinaryOperator, Formula, FormulaExpr};
use crate::error::{FormulaError, Result};
use crate::scanner::{closes_at_end, parens_balanced, preceding_char, split_args, top_level};
use crate::settings::{EvaluatorSettings, Precedence};
use lazy_regex::{regex_captures, regex_is_match};
use sheetcalc_core::{CellAddress, CellRange};

/// Parse formula text into a [`Formula`]
///
/// A single leading `=` is optional.
///
/// # Example
/// ```rust
/// use sheetcalc_formula::{parse_formula, EvaluatorSettings, FormulaExpr};
///
/// let formula = parse_formula("=SUM(A1:A10)", &EvaluatorSettings::default()).unwrap();
/// assert!(matches!(formula.expr(), FormulaExpr::Function { name, .. } if name == "SUM"));
/// assert_eq!(formula.references().len(), 1);
/// ```
pub fn parse_formula(formula: &str, settings: &EvaluatorSettings) -> Result<Formula> {
    let trimmed = formula.trim();
    let body = trimmed.strip_prefix('=').unwrap_or(trimmed);

    if !parens_balanced(body) {
        return Err(FormulaError::Parse(format!(
            "Unbalanced parentheses in '{}'",
            trimmed
        )));
    }

    let parser = Parser {
        precedence: settings.precedence,
        max_depth: settings.max_depth,
    };
    let expr = parser.parse(body, 0)?;
    Ok(Formula::new(trimmed, expr))
}

struct Parser {
    precedence: Precedence,
    max_depth: usize,
}

impl Parser {
    fn parse(&self, text: &str, depth: usize) -> Result<FormulaExpr> {
        if depth > self.max_depth {
            return Err(FormulaError::DepthExceeded(self.max_depth));
        }

        let text = text.trim();
        if text.is_empty() {
            return Ok(FormulaExpr::Empty);
        }

        // === Literals ===
        if let Some((_, inner)) = regex_captures!(r#"(?s)^"((?:[^"]|"")*)"$"#, text) {
            return Ok(FormulaExpr::String(inner.replace("\"\"", "\"")));
        }

        if regex_is_match!(r"^-?\d+(?:\.\d+)?$", text) {
            return text
                .parse()
                .map(FormulaExpr::Number)
                .map_err(|_| FormulaError::Parse(format!("Invalid number '{}'", text)));
        }

        if text.eq_ignore_ascii_case("TRUE") {
            return Ok(FormulaExpr::Boolean(true));
        }
        if text.eq_ignore_ascii_case("FALSE") {
            return Ok(FormulaExpr::Boolean(false));
        }

        // === References ===
        if regex_is_match!(r"^[A-Za-z]+[0-9]+$", text) {
            let addr = CellAddress::parse(text)
                .map_err(|e| FormulaError::InvalidReference(e.to_string()))?;
            return Ok(FormulaExpr::CellRef(addr));
        }

        if regex_is_match!(r"^[A-Za-z]+[0-9]+:[A-Za-z]+[0-9]+$", text) {
            let range = CellRange::parse(text)
                .map_err(|e| FormulaError::InvalidReference(e.to_string()))?;
            return Ok(FormulaExpr::RangeRef(range));
        }

        // === Function call ===
        if let Some((_, name, inner)) =
            regex_captures!(r"(?s)^([A-Za-z_][A-Za-z0-9_]*)\((.*)\)$", text)
        {
            if closes_at_end(text, name.len()) {
                let args = split_args(inner)
                    .into_iter()
                    .map(|arg| self.parse(arg, depth + 1))
                    .collect::<Result<Vec<_>>>()?;
                return Ok(FormulaExpr::Function {
                    name: name.to_ascii_uppercase(),
                    args,
                });
            }
        }

        // === Grouping ===
        if text.starts_with('(') && closes_at_end(text, 0) {
            return self.parse(&text[1..text.len() - 1], depth + 1);
        }

        // === Operators ===
        let split = match self.precedence {
            Precedence::FirstMatch => self.first_match_split(text),
            Precedence::Standard => self.standard_split(text),
        };
        if let Some((pos, op)) = split {
            let len = op.symbol().len();
            let left = self.parse(&text[..pos], depth + 1)?;
            let right = self.parse(&text[pos + len..], depth + 1)?;
            return Ok(FormulaExpr::binary(op, left, right));
        }

        if let Some(rest) = text.strip_prefix('-') {
            return Ok(FormulaExpr::negate(self.parse(rest, depth + 1)?));
        }
        if self.precedence == Precedence::Standard {
            if let Some(rest) = text.strip_prefix('+') {
                return self.parse(rest, depth + 1);
            }
        }

        Ok(FormulaExpr::String(text.to_string()))
    }

    /// First top-level occurrence of the first operator that occurs at all
    fn first_match_split(&self, text: &str) -> Option<(usize, BinaryOperator)> {
        let arithmetic = [
            ('+', BinaryOperator::Add),
            ('-', BinaryOperator::Subtract),
            ('*', BinaryOperator::Multiply),
            ('/', BinaryOperator::Divide),
        ];
        for (symbol, op) in arithmetic {
            let found = top_level(text)
                .find(|&(i, c)| c == symbol && (c != '-' || is_binary_position(text, i)));
            if let Some((pos, _)) = found {
                return Some((pos, op));
            }
        }

        for op in BinaryOperator::COMPARISONS {
            let symbol = op.symbol();
            if let Some((pos, _)) = top_level(text).find(|&(i, _)| text[i..].starts_with(symbol)) {
                return Some((pos, op));
            }
        }

        top_level(text)
            .find(|&(_, c)| c == '&')
            .map(|(pos, _)| (pos, BinaryOperator::Concat))
    }

    /// Rightmost top-level operator of the loosest-binding level present
    fn standard_split(&self, text: &str) -> Option<(usize, BinaryOperator)> {
        let chars: Vec<(usize, char)> = top_level(text).collect();

        let mut comparison = None;
        let mut k = 0;
        while k < chars.len() {
            let (pos, c) = chars[k];
            let rest = &text[pos..];
            let op = match c {
                '<' if rest.starts_with("<=") => Some(BinaryOperator::LessEqual),
                '<' if rest.starts_with("<>") => Some(BinaryOperator::NotEqual),
                '<' => Some(BinaryOperator::LessThan),
                '>' if rest.starts_with(">=") => Some(BinaryOperator::GreaterEqual),
                '>' => Some(BinaryOperator::GreaterThan),
                '=' => Some(BinaryOperator::Equal),
                _ => None,
            };
            if let Some(op) = op {
                comparison = Some((pos, op));
                k += op.symbol().len();
            } else {
                k += 1;
            }
        }
        if comparison.is_some() {
            return comparison;
        }

        let rightmost = |pred: &dyn Fn(usize, char) -> bool| {
            chars.iter().rev().find(|&&(i, c)| pred(i, c)).copied()
        };

        if let Some((pos, _)) = rightmost(&|_, c| c == '&') {
            return Some((pos, BinaryOperator::Concat));
        }
        if let Some((pos, c)) =
            rightmost(&|i, c| (c == '+' || c == '-') && is_binary_position(text, i))
        {
            let op = if c == '+' {
                BinaryOperator::Add
            } else {
                BinaryOperator::Subtract
            };
            return Some((pos, op));
        }
        if let Some((pos, c)) = rightmost(&|_, c| c == '*' || c == '/') {
            let op = if c == '*' {
                BinaryOperator::Multiply
            } else {
                BinaryOperator::Divide
            };
            return Some((pos, op));
        }
        None
    }
}

/// A sign is binary unless it starts the text or follows another operator,
/// an opening parenthesis or a comma
fn is_binary_position(text: &str, pos: usize) -> bool {
    match preceding_char(text, pos) {
        None => false,
        Some(c) => !matches!(
            c,
            '+' | '-' | '*' | '/' | '&' | '=' | '<' | '>' | '(' | ','
        ),
    }
}
