use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_eqa_validate_test_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_file(path: &Path, contents: &str) {
    let mut f = BufWriter::new(File::create(path).unwrap());
    f.write_all(contents.as_bytes()).unwrap();
}

fn sample_dir(root: &Path, name: &str, skip: &[&str]) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    for suffix in EXPECTED_RESULT_SUFFIXES {
        if !skip.contains(&suffix) {
            write_file(&dir.join(format!("{name}{suffix}")), "sample:\n  name: x\n");
        }
    }
    dir
}

#[test]
fn test_three_missing_files_reported() {
    let root = make_temp_dir();
    let skip = [
        "__ariba_mlst.yaml",
        "__sp_cdiff_fbi.yaml",
        "__whats_my_species.yaml",
    ];
    let dir = sample_dir(&root, "HER_BTP_WGS_EQA_01", &skip);

    let status = check_sample_dir(&dir);
    assert!(status.exists);
    assert_eq!(status.files.len(), 14);
    let missing: Vec<&str> = status.missing_files().collect();
    assert_eq!(
        missing,
        vec![
            "HER_BTP_WGS_EQA_01__ariba_mlst.yaml",
            "HER_BTP_WGS_EQA_01__sp_cdiff_fbi.yaml",
            "HER_BTP_WGS_EQA_01__whats_my_species.yaml",
        ]
    );
}

#[test]
fn test_missing_directory_is_recorded_not_fatal() {
    let root = make_temp_dir();
    let present = sample_dir(&root, "A_B_WGS_EQA_01", &[]);
    let absent = root.join("A_B_WGS_EQA_02");

    let report = check_samples(&[present.clone(), absent.clone()]);
    assert_eq!(report.len(), 2);
    assert!(report[&present].exists);
    assert!(!report[&absent].exists);
    assert!(report[&absent].files.is_empty());
}

#[test]
fn test_routing_groups_present_files_by_analysis() {
    let root = make_temp_dir();
    let a = sample_dir(&root, "A_B_WGS_EQA_01", &["__ariba_mlst.yaml"]);
    let b = sample_dir(&root, "C_D_WGS_EQA_01", &[]);
    let report = check_samples(&[a.clone(), b.clone(), root.join("missing")]);

    let routed = route_analysis_files(&report);
    assert_eq!(routed.len(), 14);
    assert_eq!(
        routed["ariba_mlst"],
        vec![b.join("C_D_WGS_EQA_01__ariba_mlst.yaml")]
    );
    assert_eq!(routed["ssi_stamper"].len(), 2);
    assert!(routed["ssi_stamper"].contains(&a.join("A_B_WGS_EQA_01__ssi_stamper.yaml")));
}
