//! Text functions
//!
//! Lengths and positions count characters, not bytes.

use super::{number_arg, text_arg};
use crate::error::Result;
use crate::evaluator::EvaluationContext;
use crate::value::{flatten, FormulaValue};
use sheetcalc_core::CellError;

/// Character count argument; `None` when negative
fn count_arg(args: &[FormulaValue], i: usize, default: f64) -> Option<usize> {
    let n = number_arg(args, i, default).trunc();
    if n < 0.0 {
        None
    } else {
        Some(n as usize)
    }
}

/// CONCATENATE(text1, ...)
pub fn fn_concatenate(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(FormulaValue::String(
        args.iter().map(FormulaValue::to_text).collect(),
    ))
}

/// CONCAT(text1, ...) - like CONCATENATE, but ranges contribute every cell
pub fn fn_concat(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(FormulaValue::String(
        flatten(args).into_iter().map(FormulaValue::to_text).collect(),
    ))
}

/// LEFT(text, [num_chars])
pub fn fn_left(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let text = text_arg(args, 0);
    match count_arg(args, 1, 1.0) {
        Some(n) => Ok(FormulaValue::String(text.chars().take(n).collect())),
        None => Ok(FormulaValue::Error(CellError::Value)),
    }
}

/// RIGHT(text, [num_chars])
pub fn fn_right(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let text = text_arg(args, 0);
    let n = match count_arg(args, 1, 1.0) {
        Some(n) => n,
        None => return Ok(FormulaValue::Error(CellError::Value)),
    };
    let len = text.chars().count();
    Ok(FormulaValue::String(
        text.chars().skip(len.saturating_sub(n)).collect(),
    ))
}

/// MID(text, start_num, num_chars) - `start_num` is 1-based
pub fn fn_mid(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let text = text_arg(args, 0);
    let start = number_arg(args, 1, 1.0).trunc();
    let count = count_arg(args, 2, 0.0);

    match count {
        Some(count) if start >= 1.0 => Ok(FormulaValue::String(
            text.chars().skip(start as usize - 1).take(count).collect(),
        )),
        _ => Ok(FormulaValue::Error(CellError::Value)),
    }
}

/// LEN function
pub fn fn_len(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(FormulaValue::Number(text_arg(args, 0).chars().count() as f64))
}

/// TRIM - drop leading and trailing whitespace and collapse inner runs
pub fn fn_trim(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let text = text_arg(args, 0);
    Ok(FormulaValue::String(
        text.split_whitespace().collect::<Vec<_>>().join(" "),
    ))
}

/// UPPER function
pub fn fn_upper(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(FormulaValue::String(text_arg(args, 0).to_uppercase()))
}

/// LOWER function
pub fn fn_lower(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(FormulaValue::String(text_arg(args, 0).to_lowercase()))
}

/// PROPER - capitalise the first letter of each whitespace-delimited word
pub fn fn_proper(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let text = text_arg(args, 0);
    let mut result = String::with_capacity(text.len());
    let mut word_start = true;

    for ch in text.chars() {
        if ch.is_whitespace() {
            result.push(ch);
            word_start = true;
        } else if word_start {
            result.extend(ch.to_uppercase());
            word_start = false;
        } else {
            result.extend(ch.to_lowercase());
        }
    }

    Ok(FormulaValue::String(result))
}
