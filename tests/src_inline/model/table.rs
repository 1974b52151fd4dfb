use std::collections::BTreeMap;

use super::*;

fn table_with(rows: &[(&str, &str)]) -> AnalysisTable {
    let mut t = AnalysisTable::new("ariba_mlst", vec!["ST".to_string()]);
    for (sample, st) in rows {
        t.push(Row::new(*sample, vec![Cell::text(*st)]));
    }
    t
}

#[test]
fn test_missing_never_agrees() {
    assert!(!Cell::Missing.agrees_with(&Cell::Missing));
    assert!(!Cell::Missing.agrees_with(&Cell::text("nan")));
    assert!(!Cell::text("x").agrees_with(&Cell::Missing));
}

#[test]
fn test_numeric_agreement_across_int_and_float() {
    assert!(Cell::Int(2).agrees_with(&Cell::Float(2.0)));
    assert!(Cell::Float(2.0).agrees_with(&Cell::Int(2)));
    assert!(!Cell::Int(2).agrees_with(&Cell::Float(2.5)));
    assert!(!Cell::Int(2).agrees_with(&Cell::text("2")));
    assert!(Cell::text("11").agrees_with(&Cell::text("11")));
}

#[test]
fn test_display_matches_table_text() {
    assert_eq!(Cell::Missing.to_string(), "nan");
    assert_eq!(Cell::Int(7).to_string(), "7");
    assert_eq!(Cell::Float(1.0).to_string(), "1.0");
    assert_eq!(Cell::Float(97.25).to_string(), "97.25");
    assert_eq!(Cell::text("ST11").to_string(), "ST11");
}

#[test]
fn test_coerce_int_truncates_and_defaults_to_zero() {
    assert_eq!(Cell::Float(99.7).coerce_int(), 99);
    assert_eq!(Cell::text("85.2").coerce_int(), 85);
    assert_eq!(Cell::text(" 12 ").coerce_int(), 12);
    assert_eq!(Cell::text("abc").coerce_int(), 0);
    assert_eq!(Cell::Missing.coerce_int(), 0);
    assert_eq!(Cell::Float(f64::NAN).coerce_int(), 0);
}

#[test]
fn test_samples_keep_first_seen_order() {
    let t = table_with(&[("B_X_WGS_EQA_1", "1"), ("A_X_WGS_EQA_1", "2"), ("B_X_WGS_EQA_1", "3")]);
    assert_eq!(t.samples(), vec!["B_X_WGS_EQA_1", "A_X_WGS_EQA_1"]);
    assert!(t.has_duplicate_samples());
    assert_eq!(t.rows_for("B_X_WGS_EQA_1").count(), 2);
}

#[test]
fn test_rename_columns_leaves_unlisted_names() {
    let mut t = AnalysisTable::new("x", vec!["ST".to_string(), "locus_1".to_string()]);
    let renames = BTreeMap::from([("locus_1".to_string(), "adk".to_string())]);
    t.rename_columns(&renames);
    assert_eq!(t.columns, vec!["ST", "adk"]);
}

#[test]
fn test_sort_by_column_orders_by_value_then_sample() {
    let mut t = table_with(&[
        ("B_X_WGS_EQA_1", "2"),
        ("A_X_WGS_EQA_1", "9"),
        ("C_X_WGS_EQA_1", "1"),
        ("A_X_WGS_EQA_2", "1"),
    ]);
    assert!(t.sort_by_column("ST"));
    let order: Vec<(&str, String)> = t
        .rows
        .iter()
        .map(|r| (r.sample.as_str(), r.cells[0].to_string()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("A_X_WGS_EQA_2", "1".to_string()),
            ("C_X_WGS_EQA_1", "1".to_string()),
            ("B_X_WGS_EQA_1", "2".to_string()),
            ("A_X_WGS_EQA_1", "9".to_string()),
        ]
    );
    assert!(!t.sort_by_column("nope"));
}
