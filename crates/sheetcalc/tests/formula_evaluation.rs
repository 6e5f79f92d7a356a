//! Tests for formula evaluation with cell references

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sheetcalc::prelude::*;
use sheetcalc::{from_address, parse_range, to_address};

fn document_with(cells: &[(&str, f64)]) -> Document {
    let mut doc = Document::new();
    let sheet = doc.sheet_mut(0).unwrap();
    for (addr, value) in cells {
        sheet.set_cell_value(addr, *value).unwrap();
    }
    doc
}

/// Address labels round-trip through their indices
#[test]
fn test_address_round_trip() {
    assert_eq!(to_address(0, 0), "A1");
    assert_eq!(to_address(0, 26), "AA1");
    assert_eq!(from_address("AA1").unwrap(), CellAddress::new(0, 26));
    assert!(from_address("1A").is_err());
}

proptest! {
    #[test]
    fn prop_address_round_trip(row in 0u32..5_000_000, col in 0u32..100_000) {
        let label = to_address(row, col);
        prop_assert_eq!(from_address(&label).unwrap(), CellAddress::new(row, col));
    }
}

/// Ranges are normalized whichever corners are given
#[test]
fn test_range_normalization() {
    let swapped = parse_range("C3:A1").unwrap();
    assert_eq!(swapped.start, CellAddress::new(0, 0));
    assert_eq!(swapped.end, CellAddress::new(2, 2));
    assert_eq!(swapped, parse_range("A1:C3").unwrap());

    let single = parse_range("B2").unwrap();
    assert_eq!(single.start, single.end);
}

#[test]
fn test_sum_and_average_over_range() {
    let doc = document_with(&[("A1", 10.0), ("A2", 20.0), ("A3", 30.0)]);

    let result = doc.evaluate(0, "=SUM(A1:A3)", "B1").unwrap();
    assert_eq!(result.result_type(), ResultType::Number);
    assert_eq!(result.as_number(), Some(60.0));

    let result = doc.evaluate(0, "=AVERAGE(A1:A3)", "B1").unwrap();
    assert_eq!(result.as_number(), Some(20.0));
}

#[test]
fn test_if_with_comparison() {
    let doc = document_with(&[("A1", 100.0)]);
    let result = doc.evaluate(0, "=IF(A1>50,\"big\",\"small\")", "B1").unwrap();
    assert_eq!(result.value(), &FormulaValue::String("big".into()));

    let doc = document_with(&[("A1", 30.0)]);
    let result = doc.evaluate(0, "=IF(A1>50,\"big\",\"small\")", "B1").unwrap();
    assert_eq!(result.value(), &FormulaValue::String("small".into()));
}

#[test]
fn test_division_by_zero_is_an_error_result() {
    let doc = Document::new();
    let result = doc.evaluate(0, "=10/0", "A1").unwrap();
    assert_eq!(result.result_type(), ResultType::Error);
    assert!(result.error_message().is_some());
    assert_eq!(result.text(), "#DIV/0!");
}

#[test]
fn test_unknown_function_is_an_error_result() {
    let doc = Document::new();
    let result = doc.evaluate(0, "=NOPE(1)", "A1").unwrap();
    assert_eq!(result.result_type(), ResultType::Error);
    assert_eq!(result.text(), "#NAME?");
}

#[test]
fn test_vlookup_miss() {
    let mut doc = document_with(&[("A1", 1.0), ("A2", 2.0)]);
    let sheet = doc.sheet_mut(0).unwrap();
    sheet.set_cell_value("B1", "one").unwrap();
    sheet.set_cell_value("B2", "two").unwrap();

    let hit = doc.evaluate(0, "=VLOOKUP(2,A1:B2,2,TRUE)", "C1").unwrap();
    assert_eq!(hit.text(), "two");

    let miss = doc.evaluate(0, "=VLOOKUP(3,A1:B2,2,TRUE)", "C1").unwrap();
    assert_eq!(miss.result_type(), ResultType::Error);
    assert_eq!(miss.value(), &FormulaValue::Error(CellError::Na));
}

#[test]
fn test_custom_function() {
    let mut doc = Document::new();
    doc.register_function("DOUBLE", |args, _ctx| {
        Ok(FormulaValue::Number(args[0].to_number() * 2.0))
    });
    let result = doc.evaluate(0, "=DOUBLE(5)", "A1").unwrap();
    assert_eq!(result.as_number(), Some(10.0));
}

#[test]
fn test_evaluation_is_idempotent() {
    let mut doc = document_with(&[("A1", 2.0)]);
    let sheet = doc.sheet_mut(0).unwrap();
    sheet.set_cell_formula("A2", "=A1*10").unwrap();
    sheet.set_cell_formula("A3", "=SUM(A1:A2)&\" total\"").unwrap();

    let first = doc.evaluate(0, "=A3", "B1").unwrap();
    let second = doc.evaluate(0, "=A3", "B1").unwrap();
    assert_eq!(first, second);
    assert_eq!(first.text(), "22 total");
}

#[test]
fn test_missing_reference_resolves_to_zero() {
    let doc = Document::new();
    let result = doc.evaluate(0, "=Q42", "A1").unwrap();
    assert_eq!(result.result_type(), ResultType::Number);
    assert_eq!(result.as_number(), Some(0.0));

    let result = doc.evaluate(0, "=Q42*3+1", "A1").unwrap();
    assert_eq!(result.as_number(), Some(1.0));
}

#[test]
fn test_circular_reference_in_document() {
    let mut doc = Document::new();
    let sheet = doc.sheet_mut(0).unwrap();
    sheet.set_cell_formula("A1", "=A2+1").unwrap();
    sheet.set_cell_formula("A2", "=A1+1").unwrap();

    let result = doc.evaluate(0, "=A1", "B1").unwrap();
    assert_eq!(result.value(), &FormulaValue::Error(CellError::Ref));
    assert_eq!(result.error_message(), Some("Circular reference"));

    let stats = doc.calculate();
    assert_eq!(stats.circular_references, 2);
}

#[test]
fn test_error_policy_choice() {
    let cells = |doc: &mut Document| {
        let sheet = doc.sheet_mut(0).unwrap();
        sheet.set_cell_value("A1", 5.0).unwrap();
        sheet.set_cell_formula("A2", "=NOPE()").unwrap();
    };

    let mut absorbing = Document::new();
    cells(&mut absorbing);
    let result = absorbing.evaluate(0, "=SUM(A1:A2)", "B1").unwrap();
    assert_eq!(result.as_number(), Some(5.0));

    let mut propagating = Document::with_settings(
        EvaluatorSettings::new().with_error_policy(ErrorPolicy::Propagate),
    );
    cells(&mut propagating);
    let result = propagating.evaluate(0, "=SUM(A1:A2)", "B1").unwrap();
    assert_eq!(result.value(), &FormulaValue::Error(CellError::Name));
}

#[test]
fn test_precedence_choice() {
    let first_match = Document::new();
    assert_eq!(
        first_match.evaluate(0, "=10-4-3", "A1").unwrap().as_number(),
        Some(9.0)
    );

    let standard =
        Document::with_settings(EvaluatorSettings::new().with_precedence(Precedence::Standard));
    assert_eq!(
        standard.evaluate(0, "=10-4-3", "A1").unwrap().as_number(),
        Some(3.0)
    );
}

#[test]
fn test_calculate_writes_caches() {
    let mut doc = document_with(&[("A1", 3.0), ("A2", 4.0)]);
    let sheet = doc.sheet_mut(0).unwrap();
    sheet.set_cell_formula("A3", "=SQRT(A1*A1+A2*A2)").unwrap();
    sheet.set_cell_formula("B1", "=\"Side: \"&A3").unwrap();

    let stats = doc.calculate();
    assert_eq!(stats.formula_count, 2);
    assert_eq!(stats.errors, 0);

    let sheet = doc.sheet(0).unwrap();
    assert_eq!(sheet.get_value("A3").unwrap(), CellValue::Number(5.0));
    assert_eq!(sheet.cell("B1").unwrap().unwrap().text, "Side: 5");
}

#[test]
fn test_long_reference_chain_in_document() {
    let mut doc = document_with(&[("A1", 1.0)]);
    let sheet = doc.sheet_mut(0).unwrap();
    for row in 2..=1000 {
        sheet
            .set_cell_formula(&format!("A{}", row), &format!("=A{}+1", row - 1))
            .unwrap();
    }

    let result = doc.evaluate(0, "=A1000", "B1").unwrap();
    assert_eq!(result.as_number(), Some(1000.0));

    let stats = doc.calculate();
    assert_eq!(stats.errors, 0);
    let sheet = doc.sheet(0).unwrap();
    assert_eq!(sheet.get_value("A258").unwrap(), CellValue::Number(258.0));
    assert_eq!(sheet.get_value("A1000").unwrap(), CellValue::Number(1000.0));
}

#[test]
fn test_reading_the_evaluation_cell_is_circular() {
    let mut doc = document_with(&[("A1", 5.0)]);
    let result = doc.evaluate(0, "=A1*2", "A1").unwrap();
    assert!(result.is_circular_reference());

    doc.sheet_mut(0).unwrap().set_cell_formula("A1", "=2+3").unwrap();
    let result = doc.evaluate(0, "=A1*2", "A1").unwrap();
    assert!(result.is_circular_reference());

    let result = doc.evaluate(0, "=A1*2", "B1").unwrap();
    assert_eq!(result.as_number(), Some(10.0));
}
