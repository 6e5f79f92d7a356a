//! Math functions
//!
//! Aggregates flatten their arguments. `SUM` coerces every value loosely;
//! the others only look at numeric-coercible values.

use super::number_arg;
use crate::error::Result;
use crate::evaluator::EvaluationContext;
use crate::value::{flatten, FormulaValue};
use sheetcalc_core::CellError;

fn numbers(args: &[FormulaValue]) -> Vec<f64> {
    flatten(args)
        .into_iter()
        .filter_map(FormulaValue::as_number)
        .collect()
}

fn checked(n: f64) -> FormulaValue {
    if n.is_finite() {
        FormulaValue::Number(n)
    } else {
        FormulaValue::Error(CellError::Num)
    }
}

/// SUM function
pub fn fn_sum(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let sum: f64 = flatten(args).into_iter().map(FormulaValue::to_number).sum();
    Ok(FormulaValue::Number(sum))
}

/// AVERAGE function; 0 when nothing is numeric
pub fn fn_average(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let values = numbers(args);
    if values.is_empty() {
        return Ok(FormulaValue::Number(0.0));
    }
    Ok(FormulaValue::Number(
        values.iter().sum::<f64>() / values.len() as f64,
    ))
}

/// COUNT function
pub fn fn_count(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(FormulaValue::Number(numbers(args).len() as f64))
}

/// COUNTA function: everything except empty cells and empty text
pub fn fn_counta(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let count = flatten(args)
        .into_iter()
        .filter(|v| match v {
            FormulaValue::Empty => false,
            FormulaValue::String(s) => !s.is_empty(),
            _ => true,
        })
        .count();
    Ok(FormulaValue::Number(count as f64))
}

/// MAX function
pub fn fn_max(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let max = numbers(args).into_iter().reduce(f64::max);
    Ok(FormulaValue::Number(max.unwrap_or(0.0)))
}

/// MIN function
pub fn fn_min(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let min = numbers(args).into_iter().reduce(f64::min);
    Ok(FormulaValue::Number(min.unwrap_or(0.0)))
}

/// ABS function
pub fn fn_abs(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(FormulaValue::Number(number_arg(args, 0, 0.0).abs()))
}

/// ROUND(number, [digits]) - half away from zero
pub fn fn_round(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let number = number_arg(args, 0, 0.0);
    let digits = number_arg(args, 1, 0.0).trunc() as i32;

    // Scale, round, unscale. Negative digits round left of the decimal point.
    let result = if digits >= 0 {
        let scaled = number * 10_f64.powi(digits);
        // Past f64 precision there is nothing left to round
        if scaled.is_finite() {
            scaled.round() / 10_f64.powi(digits)
        } else {
            number
        }
    } else {
        let factor = 10_f64.powi(-digits);
        if factor.is_finite() {
            (number / factor).round() * factor
        } else {
            0.0
        }
    };

    Ok(checked(result))
}

/// FLOOR(number, [significance]) - round down to a multiple of significance
pub fn fn_floor(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let number = number_arg(args, 0, 0.0);
    let significance = number_arg(args, 1, 1.0);

    if significance == 0.0 {
        return Ok(FormulaValue::Error(CellError::Div0));
    }
    if number > 0.0 && significance < 0.0 {
        return Ok(FormulaValue::Error(CellError::Num));
    }
    Ok(checked((number / significance).floor() * significance))
}

/// CEILING(number, [significance]) - round up to a multiple of significance
pub fn fn_ceiling(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let number = number_arg(args, 0, 0.0);
    let significance = number_arg(args, 1, 1.0);

    if significance == 0.0 {
        return Ok(FormulaValue::Number(0.0));
    }
    if number > 0.0 && significance < 0.0 {
        return Ok(FormulaValue::Error(CellError::Num));
    }
    Ok(checked((number / significance).ceil() * significance))
}

/// SQRT function
pub fn fn_sqrt(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let number = number_arg(args, 0, 0.0);
    if number < 0.0 {
        return Ok(FormulaValue::Error(CellError::Num));
    }
    Ok(FormulaValue::Number(number.sqrt()))
}

/// POWER(base, exponent)
pub fn fn_power(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let base = number_arg(args, 0, 0.0);
    let exponent = number_arg(args, 1, 0.0);
    if base == 0.0 && exponent < 0.0 {
        return Ok(FormulaValue::Error(CellError::Div0));
    }
    Ok(checked(base.powf(exponent)))
}

/// MOD(number, divisor) - result has the sign of the divisor
pub fn fn_mod(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let number = number_arg(args, 0, 0.0);
    let divisor = number_arg(args, 1, 0.0);
    if divisor == 0.0 {
        return Ok(FormulaValue::Error(CellError::Div0));
    }
    Ok(checked(number - divisor * (number / divisor).floor()))
}

/// INT function - round down to an integer
pub fn fn_int(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(FormulaValue::Number(number_arg(args, 0, 0.0).floor()))
}

/// PI function
pub fn fn_pi(_args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(FormulaValue::Number(std::f64::consts::PI))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::Evaluator;
    use sheetcalc_core::{CellAddress, Sheet};

    fn eval(formula: &str) -> FormulaValue {
        Evaluator::new()
            .evaluate(formula, &Sheet::default(), CellAddress::new(0, 0))
            .into_value()
    }

    fn assert_approx(value: FormulaValue, expected: f64) {
        match value {
            FormulaValue::Number(n) => assert!(
                (n - expected).abs() < 1e-9,
                "expected {}, got {}",
                expected,
                n
            ),
            other => panic!("expected number, got {:?}", other),
        }
    }

    #[test]
    fn test_sum_coerces_loosely() {
        assert_eq!(eval("=SUM(1,2,3)"), FormulaValue::Number(6.0));
        assert_eq!(eval("=SUM(1,\"2\",\"abc\",TRUE)"), FormulaValue::Number(4.0));
    }

    #[test]
    fn test_average_count() {
        assert_eq!(eval("=AVERAGE(2,4,6)"), FormulaValue::Number(4.0));
        assert_eq!(eval("=AVERAGE(\"x\")"), FormulaValue::Number(0.0));
        assert_eq!(eval("=COUNT(1,2,\"a\",3)"), FormulaValue::Number(3.0));
        assert_eq!(eval("=COUNTA(1,\"a\",\"\",FALSE)"), FormulaValue::Number(3.0));
    }

    #[test]
    fn test_min_max() {
        assert_eq!(eval("=MIN(5,2,8,1)"), FormulaValue::Number(1.0));
        assert_eq!(eval("=MAX(5,2,8,1)"), FormulaValue::Number(8.0));
        assert_eq!(eval("=MAX(\"none\")"), FormulaValue::Number(0.0));
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(eval("=ROUND(2.5,0)"), FormulaValue::Number(3.0));
        assert_eq!(eval("=ROUND(-2.5,0)"), FormulaValue::Number(-3.0));
        assert_approx(eval("=ROUND(3.14159,2)"), 3.14);
        assert_eq!(eval("=ROUND(1234,-2)"), FormulaValue::Number(1200.0));
        assert_eq!(eval("=ROUND(7.6)"), FormulaValue::Number(8.0));
    }

    #[test]
    fn test_round_extreme_digits() {
        assert_eq!(eval("=ROUND(2.5,309)"), FormulaValue::Number(2.5));
        assert_eq!(eval("=ROUND(2.5,400)"), FormulaValue::Number(2.5));
        assert_eq!(eval("=ROUND(POWER(10,300),20)"), eval("=POWER(10,300)"));
        assert_eq!(eval("=ROUND(1234,-400)"), FormulaValue::Number(0.0));
    }

    #[test]
    fn test_floor_ceiling() {
        assert_eq!(eval("=FLOOR(7.8)"), FormulaValue::Number(7.0));
        assert_eq!(eval("=FLOOR(17,5)"), FormulaValue::Number(15.0));
        assert_eq!(eval("=CEILING(7.2)"), FormulaValue::Number(8.0));
        assert_eq!(eval("=CEILING(12,5)"), FormulaValue::Number(15.0));
        assert_eq!(eval("=FLOOR(3,0)"), FormulaValue::Error(CellError::Div0));
    }

    #[test]
    fn test_sqrt_power_abs() {
        assert_eq!(eval("=SQRT(16)"), FormulaValue::Number(4.0));
        assert_eq!(eval("=SQRT(-1)"), FormulaValue::Error(CellError::Num));
        assert_eq!(eval("=POWER(2,10)"), FormulaValue::Number(1024.0));
        assert_eq!(eval("=ABS(-3)"), FormulaValue::Number(3.0));
    }

    #[test]
    fn test_mod_int_pi() {
        assert_eq!(eval("=MOD(10,3)"), FormulaValue::Number(1.0));
        assert_eq!(eval("=MOD(-3,2)"), FormulaValue::Number(1.0));
        assert_eq!(eval("=MOD(1,0)"), FormulaValue::Error(CellError::Div0));
        assert_eq!(eval("=INT(-2.5)"), FormulaValue::Number(-3.0));
        assert_approx(eval("=PI()"), std::f64::consts::PI);
    }
}
