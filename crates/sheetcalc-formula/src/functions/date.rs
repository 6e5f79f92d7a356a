//! Date functions
//!
//! Dates are serial numbers counting days since 1899-12-30.

use super::{arg, number_arg};
use crate::error::Result;
use crate::evaluator::EvaluationContext;
use crate::value::FormulaValue;
use chrono::{Datelike, Duration, Local, NaiveDate};
use sheetcalc_core::serial::{date_from_serial, serial_from_date, serial_from_datetime};
use sheetcalc_core::CellError;

/// Offsets beyond these cannot land inside year 9999
const MAX_MONTH_OFFSET: i64 = 120_000;
const MAX_DAY_OFFSET: i64 = 3_660_000;

/// Calendar date of a date argument: a serial number, or ISO `YYYY-MM-DD` text
fn date_arg(value: &FormulaValue) -> Option<NaiveDate> {
    if let FormulaValue::String(s) = value {
        if let Ok(date) = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
            return Some(date);
        }
    }
    let serial = value.as_number()?;
    if serial < 0.0 {
        return None;
    }
    date_from_serial(serial)
}

fn date_part(args: &[FormulaValue], part: fn(&NaiveDate) -> u32) -> FormulaValue {
    match date_arg(arg(args, 0)) {
        Some(date) => FormulaValue::Number(part(&date) as f64),
        None => FormulaValue::Error(CellError::Value),
    }
}

/// TODAY() - serial of the current local date
pub fn fn_today(_args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(FormulaValue::Number(serial_from_date(Local::now().date_naive())))
}

/// NOW() - serial of the current local date and time
pub fn fn_now(_args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(FormulaValue::Number(serial_from_datetime(
        Local::now().naive_local(),
    )))
}

/// YEAR(serial)
pub fn fn_year(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    match date_arg(arg(args, 0)) {
        Some(date) => Ok(FormulaValue::Number(date.year() as f64)),
        None => Ok(FormulaValue::Error(CellError::Value)),
    }
}

/// MONTH(serial)
pub fn fn_month(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(date_part(args, NaiveDate::month))
}

/// DAY(serial)
pub fn fn_day(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(date_part(args, NaiveDate::day))
}

/// DATE(year, month, day)
///
/// Months and days outside their usual range roll over into neighbouring
/// months and years. Years 0..1899 are offset by 1900.
pub fn fn_date(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let mut year = number_arg(args, 0, 0.0).trunc() as i64;
    let month = number_arg(args, 1, 0.0).trunc() as i64;
    let day = number_arg(args, 2, 0.0).trunc() as i64;

    if (0..1900).contains(&year) {
        year += 1900;
    }
    if !(0..=9999).contains(&year)
        || !(-MAX_MONTH_OFFSET..=MAX_MONTH_OFFSET).contains(&month)
        || !(-MAX_DAY_OFFSET..=MAX_DAY_OFFSET).contains(&day)
    {
        return Ok(FormulaValue::Error(CellError::Num));
    }

    // 0-based month index handles negative months
    let total_months = year * 12 + (month - 1);
    let norm_year = total_months.div_euclid(12) as i32;
    let norm_month = total_months.rem_euclid(12) as u32 + 1;

    let date = NaiveDate::from_ymd_opt(norm_year, norm_month, 1)
        .and_then(|first| first.checked_add_signed(Duration::days(day - 1)));

    match date {
        Some(date) => {
            let serial = serial_from_date(date);
            if serial < 0.0 {
                Ok(FormulaValue::Error(CellError::Num))
            } else {
                Ok(FormulaValue::Number(serial))
            }
        }
        None => Ok(FormulaValue::Error(CellError::Num)),
    }
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

    #[test]
    fn test_date_serials() {
        assert_eq!(eval("=DATE(2024,1,1)"), FormulaValue::Number(45292.0));
        assert_eq!(eval("=DATE(1900,1,1)"), FormulaValue::Number(2.0));
        assert_eq!(eval("=DATE(2023,13,1)"), FormulaValue::Number(45292.0));
        assert_eq!(eval("=DATE(2024,3,0)"), FormulaValue::Number(45351.0));
        assert_eq!(eval("=DATE(124,1,1)"), FormulaValue::Number(45292.0));
        assert_eq!(eval("=DATE(10000,1,1)"), FormulaValue::Error(CellError::Num));
        assert_eq!(eval("=DATE(2000,1,99999999)"), FormulaValue::Error(CellError::Num));
    }

    #[test]
    fn test_date_parts() {
        assert_eq!(eval("=YEAR(45292)"), FormulaValue::Number(2024.0));
        assert_eq!(eval("=MONTH(45292.75)"), FormulaValue::Number(1.0));
        assert_eq!(eval("=DAY(DATE(2000,2,29))"), FormulaValue::Number(29.0));
        assert_eq!(eval("=MONTH(\"2021-07-04\")"), FormulaValue::Number(7.0));
        assert_eq!(eval("=YEAR(\"soon\")"), FormulaValue::Error(CellError::Value));
    }

    #[test]
    fn test_today_and_now() {
        let today = match eval("=TODAY()") {
            FormulaValue::Number(n) => n,
            other => panic!("expected number, got {:?}", other),
        };
        let now = match eval("=NOW()") {
            FormulaValue::Number(n) => n,
            other => panic!("expected number, got {:?}", other),
        };
        assert_eq!(today.fract(), 0.0);
        assert!(today > 45000.0);
        // NOW may cross midnight after TODAY was taken
        assert!(now >= today && now < today + 2.0);
    }
}
