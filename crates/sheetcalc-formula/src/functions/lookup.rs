//! Lookup and reference functions
//!
//! Lookups scan linearly and stop at the first qualifying entry; they never
//! assume the data is sorted.

use super::{arg, number_arg};
use crate::error::Result;
use crate::evaluator::EvaluationContext;
use crate::value::{flatten, FormulaValue};
use sheetcalc_core::CellError;
use std::cmp::Ordering;

/// Compare a candidate with a lookup key; values of different kinds (or
/// empty cells) never match
fn lookup_cmp(candidate: &FormulaValue, key: &FormulaValue) -> Option<Ordering> {
    match (candidate, key) {
        (FormulaValue::Number(a), FormulaValue::Number(b)) => a.partial_cmp(b),
        (FormulaValue::String(a), FormulaValue::String(b)) => {
            Some(a.to_lowercase().cmp(&b.to_lowercase()))
        }
        (FormulaValue::Boolean(a), FormulaValue::Boolean(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Shared body of VLOOKUP and HLOOKUP; `lines` are rows for VLOOKUP and
/// columns for HLOOKUP
fn table_lookup(args: &[FormulaValue], lines: Vec<Vec<&FormulaValue>>) -> FormulaValue {
    let key = arg(args, 0).clone().into_scalar();
    let index = number_arg(args, 2, 0.0).trunc();
    let width = lines.first().map_or(0, Vec::len);
    if index < 1.0 || index > width as f64 {
        return FormulaValue::Error(CellError::Ref);
    }
    let index = index as usize - 1;
    let exact = args.get(3).map_or(true, FormulaValue::to_bool);

    for line in &lines {
        let hit = match line.first().and_then(|first| lookup_cmp(first, &key)) {
            Some(Ordering::Equal) => true,
            Some(Ordering::Less) => !exact,
            _ => false,
        };
        if hit {
            return line
                .get(index)
                .map_or(FormulaValue::Error(CellError::Ref), |v| (*v).clone());
        }
    }
    FormulaValue::Error(CellError::Na)
}

/// VLOOKUP(key, table, col_index, [exact_match])
///
/// `exact_match` defaults to TRUE. When FALSE, the first row whose key is
/// less than or equal to the lookup key is taken.
pub fn fn_vlookup(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(table_lookup(args, arg(args, 1).rows()))
}

/// HLOOKUP(key, table, row_index, [exact_match])
pub fn fn_hlookup(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let rows = arg(args, 1).rows();
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let columns = (0..width)
        .map(|c| rows.iter().filter_map(|row| row.get(c).copied()).collect())
        .collect();
    Ok(table_lookup(args, columns))
}

/// INDEX(array, row_num, [col_num]) - 1-based
///
/// With a single-row array and no column, `row_num` selects the column.
pub fn fn_index(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let rows = arg(args, 0).rows();
    let (row, col) = match args.get(2) {
        Some(col) => (number_arg(args, 1, 0.0), col.to_number()),
        None if rows.len() == 1 => (1.0, number_arg(args, 1, 0.0)),
        None => (number_arg(args, 1, 0.0), 1.0),
    };
    let (row, col) = (row.trunc(), col.trunc());
    if row < 1.0 || col < 1.0 {
        return Ok(FormulaValue::Error(CellError::Ref));
    }

    let value = rows
        .get(row as usize - 1)
        .and_then(|r| r.get(col as usize - 1));
    Ok(value.map_or(FormulaValue::Error(CellError::Ref), |v| (*v).clone()))
}

/// MATCH(key, range, [match_type]) - 1-based position
///
/// `match_type` 0 finds an equal value, 1 (default) the first value less
/// than or equal to the key, -1 the first value greater than or equal.
pub fn fn_match(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let key = arg(args, 0).clone().into_scalar();
    let match_type = number_arg(args, 2, 1.0);
    let candidates = flatten(std::slice::from_ref(arg(args, 1)));

    let position = candidates.iter().position(|candidate| {
        match (lookup_cmp(candidate, &key), match_type) {
            (Some(Ordering::Equal), _) => true,
            (Some(Ordering::Less), t) => t > 0.0,
            (Some(Ordering::Greater), t) => t < 0.0,
            (None, _) => false,
        }
    });

    Ok(match position {
        Some(i) => FormulaValue::Number((i + 1) as f64),
        None => FormulaValue::Error(CellError::Na),
    })
}

/// ROWS(range)
pub fn fn_rows(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(FormulaValue::Number(arg(args, 0).rows().len() as f64))
}

/// COLUMNS(range)
pub fn fn_columns(args: &[FormulaValue], _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let rows = arg(args, 0).rows();
    Ok(FormulaValue::Number(rows.first().map_or(0, Vec::len) as f64))
}
