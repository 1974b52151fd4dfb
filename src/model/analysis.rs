use std::fmt;

/// Result file suffixes every sample directory is expected to hold.
pub const EXPECTED_RESULT_SUFFIXES: [&str; 14] = [
    "__amrfinderplus_fbi.yaml",
    "__ariba_mlst.yaml",
    "__ariba_plasmidfinder.yaml",
    "__ariba_resfinder.yaml",
    "__ariba_virulencefinder.yaml",
    "__assemblatron.yaml",
    "__kma_pointmutations.yaml",
    "__min_read_check.yaml",
    "__reslab_stamper.yaml",
    "__sp_cdiff_fbi.yaml",
    "__sp_ecoli_fbi.yaml",
    "__sp_salm_fbi.yaml",
    "__ssi_stamper.yaml",
    "__whats_my_species.yaml",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FinderKind {
    Plasmid,
    Resistance,
    Virulence,
}

impl FinderKind {
    /// Key of the hit list inside the record summary.
    pub fn summary_key(self) -> &'static str {
        match self {
            FinderKind::Plasmid => "ariba_plasmidfinder",
            FinderKind::Resistance => "ariba_resfinder",
            FinderKind::Virulence => "ariba_virulencefinder",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StamperKind {
    Ssi,
    Reslab,
}

/// Every analysis type with a normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnalysisKind {
    Mlst,
    PointMutations,
    Amr,
    Finder(FinderKind),
    Stamper(StamperKind),
    Species,
    Assembly,
}

pub const MLST_COLUMNS: [&str; 8] = [
    "ST", "locus_1", "locus_2", "locus_3", "locus_4", "locus_5", "locus_6", "locus_7",
];

/// Point-finder result header, used when no hit names its own columns.
pub const POINT_MUTATION_COLUMNS: [&str; 5] = [
    "Mutation",
    "Nucleotide change",
    "Amino acid change",
    "Resistance",
    "PMID",
];

pub const AMR_COLUMNS: [&str; 22] = [
    "% Coverage of reference sequence",
    "% Identity to reference sequence",
    "Accession of closest sequence",
    "Alignment length",
    "Class",
    "Contig id",
    "Element subtype",
    "Element type",
    "Gene symbol",
    "HMM description",
    "HMM id",
    "Method",
    "Name of closest sequence",
    "Protein identifier",
    "Reference sequence length",
    "Scope",
    "Sequence name",
    "Start",
    "Stop",
    "Strand",
    "Subclass",
    "Target length",
];

pub const FINDER_COLUMNS: [&str; 8] = [
    "GENE",
    "%COVERAGE",
    "%IDENTITY",
    "SEQUENCE",
    "START",
    "END",
    "DATABASE",
    "ACCESSION",
];

/// Finder columns coerced to integers.
pub const FINDER_NUMERIC_COLUMNS: [&str; 4] = ["%COVERAGE", "%IDENTITY", "START", "END"];

pub const STAMPER_COLUMNS: [&str; 1] = ["qc_outcome"];

/// Source keys in the record summary, in output order.
pub const SPECIES_FIELDS: [&str; 5] = [
    "name_classified_species_1",
    "percent_classified_species_1",
    "name_classified_species_2",
    "percent_classified_species_2",
    "percent_unclassified",
];

pub const SPECIES_DERIVED_COLUMN: &str = "sum_unclassified_species1";

/// (summary key, output column) pairs for assembly metrics.
pub const ASSEMBLY_FIELDS: [(&str, &str); 9] = [
    ("GC", "GC %"),
    ("N50", "N50"),
    ("bin_contigs_at_1x", "Number of contigs (1x cov.)"),
    ("bin_contigs_at_10x", "Number of contigs (10x cov.)"),
    ("bin_coverage_at_1x", "Average coverage (1x)"),
    ("bin_length_at_1x", "Genome size at 1x depth"),
    ("bin_length_at_10x", "Genome size at 10x depth"),
    ("bin_length_at_25x", "Genome size at 25x depth"),
    ("snp_filter_10x_10%", "Ambiguous sites"),
];

/// Column dropped from point mutation hits; it repeats the sample name.
pub const POINT_MUTATION_SAMPLE_COLUMN: &str = "#Sample";

impl AnalysisKind {
    pub fn all() -> &'static [AnalysisKind] {
        &[
            AnalysisKind::Mlst,
            AnalysisKind::Finder(FinderKind::Plasmid),
            AnalysisKind::Finder(FinderKind::Resistance),
            AnalysisKind::Finder(FinderKind::Virulence),
            AnalysisKind::Assembly,
            AnalysisKind::PointMutations,
            AnalysisKind::Amr,
            AnalysisKind::Stamper(StamperKind::Ssi),
            AnalysisKind::Stamper(StamperKind::Reslab),
            AnalysisKind::Species,
        ]
    }

    /// Analysis name as it appears in `<sample>__<name>.yaml`.
    pub fn name(self) -> &'static str {
        match self {
            AnalysisKind::Mlst => "ariba_mlst",
            AnalysisKind::PointMutations => "kma_pointmutations",
            AnalysisKind::Amr => "amrfinderplus_fbi",
            AnalysisKind::Finder(kind) => kind.summary_key(),
            AnalysisKind::Stamper(StamperKind::Ssi) => "ssi_stamper",
            AnalysisKind::Stamper(StamperKind::Reslab) => "reslab_stamper",
            AnalysisKind::Species => "whats_my_species",
            AnalysisKind::Assembly => "assemblatron",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.name() == name)
    }

    /// Fixed output columns. Point mutations are discovered from the hits and
    /// return an empty schema here.
    pub fn columns(self) -> Vec<String> {
        let cols: Vec<&str> = match self {
            AnalysisKind::Mlst => MLST_COLUMNS.to_vec(),
            AnalysisKind::PointMutations => POINT_MUTATION_COLUMNS.to_vec(),
            AnalysisKind::Amr => AMR_COLUMNS.to_vec(),
            AnalysisKind::Finder(_) => FINDER_COLUMNS.to_vec(),
            AnalysisKind::Stamper(_) => STAMPER_COLUMNS.to_vec(),
            AnalysisKind::Species => {
                let mut v = SPECIES_FIELDS.to_vec();
                v.push(SPECIES_DERIVED_COLUMN);
                v
            }
            AnalysisKind::Assembly => ASSEMBLY_FIELDS.iter().map(|(_, col)| *col).collect(),
        };
        cols.into_iter().map(str::to_string).collect()
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Analysis name encoded in a result file name, e.g. `S1__ariba_mlst.yaml` -> `ariba_mlst`.
pub fn analysis_name_from_file(file_name: &str) -> Option<&str> {
    let stem = file_name.strip_suffix(".yaml")?;
    let (_, name) = stem.rsplit_once("__")?;
    if name.is_empty() { None } else { Some(name) }
}
