//! Logical functions

use super::arg;
use crate::error::Result;
use crate::evaluator::EvaluationContext;
use crate::value::{flatten, FormulaValue};

/// IF(condition, value_if_true, [value_if_false])
///
/// A missing else branch yields FALSE.
pub fn fn_if(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    if arg(args, 0).to_bool() {
        Ok(arg(args, 1).clone())
    } else {
        Ok(args
            .get(2)
            .cloned()
            .unwrap_or(FormulaValue::Boolean(false)))
    }
}

/// AND function
pub fn fn_and(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(FormulaValue::Boolean(
        flatten(args).into_iter().all(FormulaValue::to_bool),
    ))
}

/// OR function
pub fn fn_or(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(FormulaValue::Boolean(
        flatten(args).into_iter().any(FormulaValue::to_bool),
    ))
}

/// NOT function
pub fn fn_not(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(FormulaValue::Boolean(!arg(args, 0).to_bool()))
}

/// IFERROR(value, value_if_error)
///
/// Text beginning with `#` counts as an error, the same as an error value.
pub fn fn_iferror(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let value = arg(args, 0);
    if value.is_error_like() {
        Ok(arg(args, 1).clone())
    } else {
        Ok(value.clone())
    }
}
