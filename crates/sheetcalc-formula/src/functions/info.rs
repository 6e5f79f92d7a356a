//! Information functions
//!
//! These inspect an argument without coercing it, so they are registered to
//! receive error values.

use super::arg;
use crate::error::Result;
use crate::evaluator::EvaluationContext;
use crate::value::FormulaValue;

fn scalar(args: &[FormulaValue]) -> FormulaValue {
    arg(args, 0).clone().into_scalar()
}

/// ISERROR(value) - error values and text that looks like one
pub fn fn_iserror(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(FormulaValue::Boolean(arg(args, 0).is_error_like()))
}

/// ISBLANK(value)
pub fn fn_isblank(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(FormulaValue::Boolean(scalar(args).is_empty()))
}

/// ISNUMBER(value)
pub fn fn_isnumber(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(FormulaValue::Boolean(matches!(
        scalar(args),
        FormulaValue::Number(_)
    )))
}

/// ISTEXT(value)
pub fn fn_istext(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(FormulaValue::Boolean(matches!(
        scalar(args),
        FormulaValue::String(_)
    )))
}
