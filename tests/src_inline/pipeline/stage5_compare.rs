use super::*;
use crate::model::identifiers::DEFAULT_FIXED_REFERENCE_LAB;
use crate::pipeline::stage3_anonymize::anonymize_for_lab;

const LAB: &str = "AAA_BTP_WGS";

fn mlst_row(id: &str, alleles: [&str; 8]) -> Row {
    Row::new(id, alleles.iter().map(|a| Cell::text(*a)).collect())
}

fn roster() -> Vec<String> {
    ["AAA_BTP_WGS", "BBB_BTP_WGS", "CCC_BTP_WGS", "SSI_BTP_WGS"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn eqa_table() -> AnalysisTable {
    let cols = ["ST", "l1", "l2", "l3", "l4", "l5", "l6", "l7"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut t = AnalysisTable::new("ariba_mlst", cols);
    t.push(mlst_row("AAA_BTP_WGS_EQA_01", ["5", "1", "2", "3", "4", "5", "6", "7"]));
    t.push(mlst_row("AAA_BTP_WGS_EQA_01-2", ["5", "1", "2", "3", "4", "5", "6", "7"]));
    t.push(mlst_row("BBB_BTP_WGS_EQA_01", ["5", "1", "2", "3", "4", "5", "6", "9"]));
    t.push(mlst_row("CCC_BTP_WGS_EQA_02", ["8", "1", "1", "1", "1", "1", "1", "1"]));
    t.push(mlst_row("SSI_BTP_WGS_EQA_01", ["5", "1", "2", "3", "4", "5", "6", "7"]));
    t
}

fn anonymized(lab: &str) -> (AnalysisTable, AnonymizationMap) {
    anonymize_for_lab(&eqa_table(), &roster(), lab, DEFAULT_FIXED_REFERENCE_LAB).unwrap()
}

#[test]
fn test_expected_row_order() {
    let (anon, map) = anonymized(LAB);
    let ids = expected_rows(&anon, LAB, "EQA_01", &map, DEFAULT_FIXED_REFERENCE_LAB).unwrap();
    assert_eq!(
        ids,
        vec![
            "AAA_BTP_WGS_EQA_01",
            "AAA_BTP_WGS_EQA_01-2",
            "SSI_BTP_WGS_EQA_01",
            "other_kma_2_EQA_01",
            "other_kma_1_EQA_01",
        ]
    );
}

#[test]
fn test_absent_rows_are_synthesized_as_no_data() {
    let (anon, map) = anonymized(LAB);
    let sub = build_sub_table(&anon, LAB, "EQA_01", &map, DEFAULT_FIXED_REFERENCE_LAB).unwrap();
    assert_eq!(sub.table.len(), 5);
    assert_eq!(sub.synthesized, vec!["other_kma_1_EQA_01"]);
    let last = &sub.table.rows[4];
    assert_eq!(last.cells.len(), 8);
    assert!(last.cells.iter().all(|c| c.to_string() == NO_DATA));
}

#[test]
fn test_fixed_reference_lab_as_target_has_no_extra_reference_row() {
    let (anon, map) = anonymized(DEFAULT_FIXED_REFERENCE_LAB);
    let ids = expected_rows(
        &anon,
        DEFAULT_FIXED_REFERENCE_LAB,
        "EQA_01",
        &map,
        DEFAULT_FIXED_REFERENCE_LAB,
    )
    .unwrap();
    assert_eq!(ids[0], "SSI_BTP_WGS_EQA_01");
    assert_eq!(ids.iter().filter(|id| id.starts_with("SSI_")).count(), 1);
    assert_eq!(ids.len(), 5);
}

#[test]
fn test_identifier_and_lab_errors() {
    let (anon, map) = anonymized(LAB);
    assert_eq!(
        expected_rows(&anon, "BAD_LAB", "EQA_01", &map, DEFAULT_FIXED_REFERENCE_LAB).unwrap_err(),
        CompareError::IdentifierShape("BAD_LAB_EQA_01".to_string())
    );
    assert_eq!(
        expected_rows(&anon, "ZZZ_BTP_WGS", "EQA_01", &map, DEFAULT_FIXED_REFERENCE_LAB)
            .unwrap_err(),
        CompareError::UnknownLab("ZZZ_BTP_WGS".to_string())
    );
}

#[test]
fn test_classify_seven_of_eight() {
    let cols = (0..8).map(|i| format!("c{i}")).collect();
    let mut t = AnalysisTable::new("ariba_mlst", cols);
    t.push(mlst_row("AAA_BTP_WGS_EQA_01", ["5", "1", "2", "3", "4", "5", "6", "7"]));
    t.push(mlst_row("other_kma_1_EQA_01", ["5", "1", "2", "3", "4", "5", "6", "9"]));

    let classes = classify(&t);
    assert_eq!(classes.shape(), (2, 8));
    assert!(classes.row(0).iter().all(|&c| c == CellClass::Reference));
    assert_eq!(classes.count(CellClass::Match), 7);
    assert_eq!(classes.count(CellClass::Mismatch), 1);
    assert_eq!(classes.get(1, 7), CellClass::Mismatch);
}

#[test]
fn test_no_data_rows_never_match() {
    let (anon, map) = anonymized(LAB);
    let sub = build_sub_table(&anon, LAB, "EQA_01", &map, DEFAULT_FIXED_REFERENCE_LAB).unwrap();
    let classes = classify(&sub.table);
    assert!(classes.row(4).iter().all(|&c| c == CellClass::Mismatch));
    assert!(classes.row(1).iter().all(|&c| c == CellClass::Match));
}
