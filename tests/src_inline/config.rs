use std::path::Path;

use super::*;

#[test]
fn test_minimal_config_uses_defaults() {
    let config = parse_config(
        Path::new("run.yaml"),
        "sample_sheet: samples.tsv\noutput_dir: out\n",
    )
    .unwrap();
    assert_eq!(config.fixed_reference_lab, DEFAULT_FIXED_REFERENCE_LAB);
    assert_eq!(config.thresholds, ThresholdProfile::default_v1());
    assert_eq!(config.render, RenderOptions::default());
    assert!(config.comparisons.is_empty());
}

#[test]
fn test_full_config() {
    let text = "\
sample_sheet: /data/samples.tsv
output_dir: /data/out
fixed_reference_lab: REF_LAB_WGS
thresholds:
  plasmid: { min_coverage: 90, min_identity: 95 }
render:
  max_width: 40
  truncate: true
comparisons:
  - analysis: ariba_mlst
    rename:
      locus_1: adk
  - analysis: ariba_resfinder
    metric: GENE
    columns: [GENE]
    sort_by: GENE
";
    let config = parse_config(Path::new("run.yaml"), text).unwrap();
    assert_eq!(config.fixed_reference_lab, "REF_LAB_WGS");
    assert_eq!(config.thresholds.plasmid.min_coverage, 90);
    assert_eq!(config.thresholds.resistance, ThresholdProfile::default_v1().resistance);
    assert!(config.render.truncate);
    assert_eq!(config.render.max_width, 40);

    let mlst = &config.comparisons[0];
    assert_eq!(mlst.metric, ALL_COLUMNS);
    assert_eq!(mlst.rename.get("locus_1").map(String::as_str), Some("adk"));
    assert_eq!(mlst.comparison_options("REF_LAB_WGS").metric, Metric::MatchCount);

    let res = &config.comparisons[1];
    let options = res.comparison_options(&config.fixed_reference_lab);
    assert_eq!(options.metric, Metric::Jaccard("GENE".to_string()));
    assert_eq!(options.columns, vec!["GENE"]);
    let assembly = res.assembly_options(&config.fixed_reference_lab);
    assert_eq!(assembly.sort_by.as_deref(), Some("GENE"));
    assert_eq!(assembly.fixed_reference_lab, "REF_LAB_WGS");
}

#[test]
fn test_unknown_field_is_rejected() {
    let err = parse_config(
        Path::new("run.yaml"),
        "sample_sheet: s.tsv\noutput_dir: out\nthreshold: 3\n",
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Yaml { .. }));
}

#[test]
fn test_relative_paths_follow_config_location() {
    let mut config = parse_config(
        Path::new("run.yaml"),
        "sample_sheet: samples.tsv\noutput_dir: /abs/out\n",
    )
    .unwrap();
    config.resolve_paths(Path::new("/runs/eqa"));
    assert_eq!(config.sample_sheet, Path::new("/runs/eqa/samples.tsv"));
    assert_eq!(config.output_dir, Path::new("/abs/out"));
}

#[test]
fn test_missing_config_file() {
    let err = load_config(Path::new("/definitely/not/here.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
