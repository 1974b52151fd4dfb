use super::*;
use crate::model::identifiers::DEFAULT_FIXED_REFERENCE_LAB;

fn gene_table(rows: &[(&str, &str)]) -> AnalysisTable {
    let mut t = AnalysisTable::new(
        "ariba_resfinder",
        vec!["GENE".to_string(), "%COVERAGE".to_string()],
    );
    for (sample, gene) in rows {
        t.push(Row::new(*sample, vec![Cell::text(*gene), Cell::Int(100)]));
    }
    t
}

fn options() -> AssemblyOptions {
    AssemblyOptions {
        fixed_reference_lab: DEFAULT_FIXED_REFERENCE_LAB.to_string(),
        ..AssemblyOptions::default()
    }
}

#[test]
fn test_duplicate_rows_are_joined() {
    let table = gene_table(&[
        ("AAA_BTP_WGS_EQA_01", "blaTEM"),
        ("AAA_BTP_WGS_EQA_01", "sul2"),
        ("AAA_BTP_WGS_EQA_02", "aac"),
    ]);
    let out = reconcile_table(&table);
    assert_eq!(out.len(), 2);
    assert!(!out.has_duplicate_samples());
    assert_eq!(out.rows[0].cells[0], Cell::text("blaTEM,sul2"));
    assert_eq!(out.rows[0].cells[1], Cell::text("100,100"));
    assert_eq!(out.rows[1].cells[0], Cell::text("aac"));
}

#[test]
fn test_missing_cells_join_as_nan() {
    let mut table = gene_table(&[("AAA_BTP_WGS_EQA_01", "blaTEM")]);
    table.push(Row::new(
        "AAA_BTP_WGS_EQA_01",
        vec![Cell::Missing, Cell::Missing],
    ));
    let out = reconcile_table(&table);
    assert_eq!(out.rows[0].cells[0], Cell::text("blaTEM,nan"));
}

#[test]
fn test_reconcile_is_idempotent_and_keeps_order() {
    let table = gene_table(&[
        ("CCC_BTP_WGS_EQA_01", "x"),
        ("AAA_BTP_WGS_EQA_01", "a"),
        ("CCC_BTP_WGS_EQA_01", "y"),
        ("BBB_BTP_WGS_EQA_01", "b"),
    ]);
    let once = reconcile_table(&table);
    assert_eq!(
        once.samples(),
        vec!["CCC_BTP_WGS_EQA_01", "AAA_BTP_WGS_EQA_01", "BBB_BTP_WGS_EQA_01"]
    );
    assert_eq!(reconcile_table(&once), once);
}

#[test]
fn test_unique_rows_pass_through_unchanged() {
    let table = gene_table(&[("AAA_BTP_WGS_EQA_01", "a"), ("BBB_BTP_WGS_EQA_01", "b")]);
    assert_eq!(reconcile_table(&table), table);
}

#[test]
fn test_assembly_collects_roster_and_samples() {
    let table = gene_table(&[
        ("BBB_BTP_WGS_EQA_02", "b"),
        ("SSI_BTP_WGS_EQA_01", "r"),
        ("AAA_BTP_WGS_EQA_01", "a1"),
        ("AAA_BTP_WGS_EQA_01", "a2"),
    ]);
    let input = assemble_for_comparison(&[table], &options()).unwrap();
    assert_eq!(input.kmas, vec!["AAA_BTP_WGS", "BBB_BTP_WGS", "SSI_BTP_WGS"]);
    assert_eq!(input.samples, vec!["EQA_01", "EQA_02"]);
    assert_eq!(input.table.len(), 3);
    assert!(!input.table.has_duplicate_samples());
}

#[test]
fn test_fixed_reference_rows_come_from_first_table_only() {
    let first = gene_table(&[("SSI_BTP_WGS_EQA_01", "ref"), ("AAA_BTP_WGS_EQA_01", "a")]);
    let second = gene_table(&[("SSI_BTP_WGS_EQA_01", "other"), ("BBB_BTP_WGS_EQA_01", "b")]);
    let input = assemble_for_comparison(&[first, second], &options()).unwrap();
    let reference: Vec<String> = input
        .table
        .rows_for("SSI_BTP_WGS_EQA_01")
        .map(|r| r.cells[0].to_string())
        .collect();
    assert_eq!(reference, vec!["ref"]);
    assert!(input.table.contains_sample("BBB_BTP_WGS_EQA_01"));
}

#[test]
fn test_overlapping_tables_merge_into_one_row() {
    let first = gene_table(&[("AAA_BTP_WGS_EQA_01", "blaTEM"), ("SSI_BTP_WGS_EQA_01", "r")]);
    let second = gene_table(&[("AAA_BTP_WGS_EQA_01", "sul2"), ("BBB_BTP_WGS_EQA_01", "b")]);
    let input = assemble_for_comparison(&[first, second], &options()).unwrap();
    assert!(!input.table.has_duplicate_samples());
    let merged: Vec<String> = input
        .table
        .rows_for("AAA_BTP_WGS_EQA_01")
        .map(|r| r.cells[0].to_string())
        .collect();
    assert_eq!(merged, vec!["blaTEM,sul2"]);
    assert_eq!(input.table.len(), 3);
    assert_eq!(input.kmas, vec!["AAA_BTP_WGS", "BBB_BTP_WGS", "SSI_BTP_WGS"]);
}

#[test]
fn test_sort_column_takes_precedence_over_identifier() {
    let table = gene_table(&[("AAA_BTP_WGS_EQA_01", "zzz"), ("BBB_BTP_WGS_EQA_01", "aaa")]);
    let opts = AssemblyOptions {
        sort_by: Some("GENE".to_string()),
        ..options()
    };
    let input = assemble_for_comparison(&[table], &opts).unwrap();
    assert_eq!(
        input.table.samples(),
        vec!["BBB_BTP_WGS_EQA_01", "AAA_BTP_WGS_EQA_01"]
    );
}

#[test]
fn test_assembly_renames_and_sorts() {
    let table = gene_table(&[("BBB_BTP_WGS_EQA_01", "b"), ("AAA_BTP_WGS_EQA_01", "a")]);
    let opts = AssemblyOptions {
        renames: BTreeMap::from([("GENE".to_string(), "gene".to_string())]),
        sort_by: Some("gene".to_string()),
        ..options()
    };
    let input = assemble_for_comparison(&[table], &opts).unwrap();
    assert_eq!(input.table.columns[0], "gene");
    assert_eq!(
        input.table.samples(),
        vec!["AAA_BTP_WGS_EQA_01", "BBB_BTP_WGS_EQA_01"]
    );
}

#[test]
fn test_assembly_errors() {
    let bad = gene_table(&[("AAA_BTP_EQA_01", "a")]);
    assert_eq!(
        assemble_for_comparison(&[bad], &options()).unwrap_err(),
        CompareError::IdentifierShape("AAA_BTP_EQA_01".to_string())
    );

    let ok = gene_table(&[("AAA_BTP_WGS_EQA_01", "a")]);
    let opts = AssemblyOptions {
        sort_by: Some("nope".to_string()),
        ..options()
    };
    assert_eq!(
        assemble_for_comparison(&[ok], &opts).unwrap_err(),
        CompareError::UnknownColumn("nope".to_string())
    );

    let empty = gene_table(&[]);
    assert!(matches!(
        assemble_for_comparison(&[empty], &options()),
        Err(CompareError::EmptyTable(_))
    ));
}
