//! # Outlier-window clustering for windowed FST scans
//!
//! Post-processing for genome-wide FST scans: pick out highly differentiated
//! windows, merge neighbouring ones into multi-locus regions, and look up the
//! genes those windows touch in a GFF annotation.
//!
//! ## Pipeline
//!
//! 1. **Load**: parse the per-window FST table ([`windows`])
//! 2. **Select**: threshold and rank outlier windows ([`outliers`])
//! 3. **Cluster**: merge adjacent outliers per chromosome under a gap limit ([`cluster`])
//! 4. **Intersect**: find genes overlapping significant windows ([`annotation`])
//! 5. **Report**: shape and persist summary tables ([`report`])
//!
//! ## Usage Example
//!
//! ```no_run
//! use fstregions::{Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::new(PipelineConfig::default())?;
//! let output = pipeline.run("red_vs_white.windowed.weir.fst", "annotation.gff")?;
//! output.write("fst_results")?;
//! println!("{} clusters", output.clusters.clusters.len());
//! # Ok::<(), fstregions::PipelineError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod annotation; // Gene annotation parsing and overlap search
pub mod cluster; // Gap-tolerant window merging
pub mod outliers; // Threshold selection and ranking
pub mod report; // Output records, tables and console text
pub mod windows; // FST window table

pub use annotation::{
    AnnotationError, AnnotationIntersector, AnnotationReader, ChromosomeNaming,
    CooccurrenceReport, GeneFeature, GeneGroup,
};
pub use cluster::{Cluster, ClusterBuilder, ClusterSet};
pub use outliers::{OutlierSelector, OutlierSet, ThresholdReport};
pub use report::{ClusterRecord, GeneGroupRecord, ReportError};
pub use windows::{FstSummary, Window, WindowTableError};

use std::fmt;
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// File name of the ranked high-FST window table.
pub const HIGH_FST_REGIONS: &str = "high_fst_regions.csv";
/// File name of the cluster summary table.
pub const MULTI_LOCUS_CLUSTERS: &str = "multi_locus_clusters.csv";
/// File name of the co-occurring genes annotation.
pub const COOCCURRING_GENES: &str = "cooccurring_genes.gff";
/// File name of the gene group summary table.
pub const GENE_GROUPS: &str = "gene_groups.csv";

/// Every threshold and limit used by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Thresholds of the diagnostic sweep.
    pub sweep_thresholds: Vec<f64>,

    /// Ranked rows shown per sweep threshold.
    pub top_k: usize,

    /// Minimum FST for windows entering the cluster builder (θ).
    pub cluster_threshold: f64,

    /// Largest gap (bp) allowed between consecutive clustered windows.
    pub gap_limit: u64,

    /// Minimum FST for the high-FST table and the gene intersection.
    pub report_threshold: f64,

    /// Window-to-annotation chromosome naming.
    pub naming: ChromosomeNaming,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sweep_thresholds: outliers::DEFAULT_SWEEP_THRESHOLDS.to_vec(),
            top_k: outliers::DEFAULT_TOP_K,
            cluster_threshold: cluster::DEFAULT_CLUSTER_THRESHOLD,
            gap_limit: cluster::DEFAULT_GAP_LIMIT,
            report_threshold: annotation::DEFAULT_REPORT_THRESHOLD,
            naming: ChromosomeNaming::default(),
        }
    }
}

impl PipelineConfig {
    /// Reject thresholds that cannot select anything meaningful.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sweep_thresholds.is_empty() {
            return Err(ConfigError::EmptySweep);
        }
        let named = [
            ("cluster threshold", self.cluster_threshold),
            ("report threshold", self.report_threshold),
        ];
        let swept = self.sweep_thresholds.iter().map(|&value| ("sweep threshold", value));
        for (name, value) in named.into_iter().chain(swept) {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteThreshold { name, value });
            }
        }
        Ok(())
    }
}

/// Invalid pipeline configuration.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// A threshold is NaN or infinite.
    #[error("{name} must be a finite number, got {value}")]
    NonFiniteThreshold {
        /// Which threshold.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// The sweep has no thresholds.
    #[error("threshold sweep needs at least one threshold")]
    EmptySweep,
}

/// Errors that abort a pipeline run, tagged with the failing stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid configuration.
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    /// The window table could not be loaded.
    #[error("window table stage: {0}")]
    Windows(#[from] WindowTableError),

    /// The annotation could not be read.
    #[error("annotation stage: {0}")]
    Annotation(#[from] AnnotationError),

    /// Outputs could not be written.
    #[error("report stage: {0}")]
    Report(#[from] ReportError),
}

/// Empty but valid outcomes worth telling the user about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PipelineWarning {
    /// No run of outlier windows reached two windows.
    NoClusters {
        /// Cluster threshold in effect.
        threshold: f64,
    },
    /// No chromosome had more than one overlapping gene.
    NoOverlaps {
        /// Report threshold in effect.
        threshold: f64,
    },
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineWarning::NoClusters { threshold } => {
                write!(f, "no multi-locus clusters at FST >= {threshold}")
            }
            PipelineWarning::NoOverlaps { threshold } => {
                write!(f, "no chromosome with co-occurring genes at FST >= {threshold}")
            }
        }
    }
}

/// Paths of the files written by [`PipelineOutput::write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    /// Ranked high-FST windows.
    pub high_fst_regions: PathBuf,
    /// Cluster summary table.
    pub multi_locus_clusters: PathBuf,
    /// Co-occurring genes annotation.
    pub cooccurring_genes: PathBuf,
    /// Gene group summary table.
    pub gene_groups: PathBuf,
}

impl OutputFiles {
    /// Standard file names inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            high_fst_regions: dir.join(HIGH_FST_REGIONS),
            multi_locus_clusters: dir.join(MULTI_LOCUS_CLUSTERS),
            cooccurring_genes: dir.join(COOCCURRING_GENES),
            gene_groups: dir.join(GENE_GROUPS),
        }
    }
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Distribution of the weighted FST column.
    pub summary: FstSummary,

    /// Windows at the report threshold, FST descending.
    pub high_fst: Vec<Window>,

    /// Multi-locus clusters and the windows left out of them.
    pub clusters: ClusterSet,

    /// Genes overlapping the high-FST windows.
    pub cooccurrence: CooccurrenceReport,

    /// One row per cluster.
    pub cluster_records: Vec<ClusterRecord>,

    /// One row per retained gene group.
    pub gene_group_records: Vec<GeneGroupRecord>,

    /// Empty-result notices; never fatal.
    pub warnings: Vec<PipelineWarning>,
}

impl PipelineOutput {
    /// Write all outputs into `dir`, creating it if needed.
    pub fn write<P: AsRef<Path>>(&self, dir: P) -> Result<OutputFiles, ReportError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| ReportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let files = OutputFiles::in_dir(dir);

        let high_fst: Vec<&Window> = self.high_fst.iter().collect();
        report::write_table_file(&files.high_fst_regions, |w| {
            report::write_windows(w, &high_fst)
        })?;
        report::write_table_file(&files.multi_locus_clusters, |w| {
            report::write_clusters(w, &self.cluster_records)
        })?;
        report::write_table_file(&files.gene_groups, |w| {
            report::write_gene_groups(w, &self.gene_group_records)
        })?;

        let mut genes = fs::File::create(&files.cooccurring_genes)
            .map(std::io::BufWriter::new)
            .map_err(|source| ReportError::Io {
                path: files.cooccurring_genes.clone(),
                source,
            })?;
        report::write_cooccurring_genes(&mut genes, &self.cooccurrence).map_err(|source| {
            ReportError::Io {
                path: files.cooccurring_genes.clone(),
                source,
            }
        })?;

        tracing::info!(dir = %dir.display(), "wrote reports");
        Ok(files)
    }
}

/// Runs the load → select → cluster → intersect → report chain.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline after validating `config`.
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Whether the cluster threshold is masked by the report threshold.
    ///
    /// [`analyze`](Self::analyze) clusters the high-FST windows, so a lower
    /// cluster threshold cannot admit any extra window.
    pub fn clusters_only_high_fst(&self) -> bool {
        self.config.cluster_threshold < self.config.report_threshold
    }

    /// Diagnostic sweep over the configured thresholds.
    pub fn sweep<'a>(&self, windows: &'a [Window]) -> Vec<ThresholdReport<'a>> {
        outliers::sweep(windows, &self.config.sweep_thresholds, self.config.top_k)
    }

    /// Windows at the report threshold, ranked by FST descending.
    pub fn high_fst<'a>(&self, windows: &'a [Window]) -> OutlierSet<'a> {
        OutlierSelector::new(self.config.report_threshold)
            .select(windows)
            .ranked()
    }

    /// Cluster the members of `outliers` that pass the cluster threshold.
    pub fn cluster(&self, outliers: &OutlierSet<'_>) -> ClusterSet {
        let input = outliers.refine(self.config.cluster_threshold);
        let set = ClusterBuilder::new(self.config.gap_limit).build(input.windows());
        tracing::info!(
            windows = input.len(),
            clusters = set.clusters.len(),
            isolated = set.isolated.len(),
            "built clusters"
        );
        set
    }

    /// Intersect an annotation stream with the significant windows.
    pub fn cooccurring_genes<R: BufRead>(
        &self,
        reader: AnnotationReader<R>,
        significant: &OutlierSet<'_>,
    ) -> Result<CooccurrenceReport, AnnotationError> {
        AnnotationIntersector::new(self.config.naming.clone()).intersect(reader, significant.windows())
    }

    /// Run every stage on already-loaded windows.
    pub fn analyze<R: BufRead>(
        &self,
        windows: &[Window],
        annotation: AnnotationReader<R>,
    ) -> Result<PipelineOutput, PipelineError> {
        if self.clusters_only_high_fst() {
            tracing::warn!(
                cluster_threshold = self.config.cluster_threshold,
                report_threshold = self.config.report_threshold,
                "cluster threshold is below the report threshold; clustering only sees high-FST windows"
            );
        }

        let summary = FstSummary::from_windows(windows);
        let high = self.high_fst(windows);
        tracing::info!(
            threshold = self.config.report_threshold,
            windows = high.len(),
            "selected high-FST windows"
        );

        let clusters = self.cluster(&high);
        let cooccurrence = self.cooccurring_genes(annotation, &high)?;

        let mut warnings = Vec::new();
        if clusters.is_empty() {
            warnings.push(PipelineWarning::NoClusters {
                threshold: self.config.cluster_threshold,
            });
        }
        if cooccurrence.is_empty() {
            warnings.push(PipelineWarning::NoOverlaps {
                threshold: self.config.report_threshold,
            });
        }
        for warning in &warnings {
            tracing::warn!("{warning}");
        }

        Ok(PipelineOutput {
            summary,
            high_fst: high.to_windows(),
            cluster_records: report::cluster_records(&clusters),
            gene_group_records: report::gene_group_records(&cooccurrence),
            clusters,
            cooccurrence,
            warnings,
        })
    }

    /// Load both inputs from disk and run every stage.
    pub fn run<P, Q>(&self, fst_table: P, annotation: Q) -> Result<PipelineOutput, PipelineError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let windows = windows::load_windows(fst_table)?;
        let reader = AnnotationReader::open(annotation)?;
        self.analyze(&windows, reader)
    }
}
