use serde::Serialize;

use crate::annotation::CooccurrenceReport;
use crate::cluster::{Cluster, ClusterSet};
use crate::windows::Window;

/// Row of the high-FST window table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowRecord<'a> {
    /// Chromosome id.
    pub chrom: &'a str,
    /// Bin start.
    pub bin_start: u64,
    /// Bin end.
    pub bin_end: u64,
    /// Variants in the bin, if known.
    pub n_variants: Option<u64>,
    /// Weighted FST.
    pub weighted_fst: f64,
    /// Mean FST, if known.
    pub mean_fst: Option<f64>,
}

impl WindowRecord<'_> {
    /// Column names, in serialization order.
    pub const HEADER: [&'static str; 6] = [
        "CHROM",
        "BIN_START",
        "BIN_END",
        "N_VARIANTS",
        "WEIGHTED_FST",
        "MEAN_FST",
    ];
}

impl<'a> From<&'a Window> for WindowRecord<'a> {
    fn from(window: &'a Window) -> Self {
        Self {
            chrom: &window.chrom,
            bin_start: window.bin_start,
            bin_end: window.bin_end,
            n_variants: window.n_variants,
            weighted_fst: window.weighted_fst,
            mean_fst: window.mean_fst,
        }
    }
}

/// Summary row for one multi-locus cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterRecord {
    /// Chromosome id.
    pub chrom: String,
    /// Start of the first window.
    pub start: u64,
    /// End of the last window.
    pub end: u64,
    /// `end − start`.
    pub size_bp: u64,
    /// Member windows.
    pub window_count: usize,
    /// Mean weighted FST.
    pub mean_fst: f64,
    /// Highest weighted FST.
    pub max_fst: f64,
}

impl ClusterRecord {
    /// Column names, in serialization order.
    pub const HEADER: [&'static str; 7] = [
        "CHROM",
        "BIN_START",
        "BIN_END",
        "SIZE_BP",
        "WINDOW_COUNT",
        "AVG_FST",
        "MAX_FST",
    ];
}

impl From<&Cluster> for ClusterRecord {
    fn from(cluster: &Cluster) -> Self {
        Self {
            chrom: cluster.chrom().to_string(),
            start: cluster.span_start(),
            end: cluster.span_end(),
            size_bp: cluster.size_bp(),
            window_count: cluster.window_count(),
            mean_fst: cluster.mean_fst(),
            max_fst: cluster.max_fst(),
        }
    }
}

/// Gene count of one retained co-occurrence group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneGroupRecord {
    /// Annotation-side chromosome name.
    pub chrom: String,
    /// Genes in the group.
    pub gene_count: usize,
}

impl GeneGroupRecord {
    /// Column names, in serialization order.
    pub const HEADER: [&'static str; 2] = ["CHROM", "GENE_COUNT"];
}

/// One summary row per cluster, in cluster order.
pub fn cluster_records(set: &ClusterSet) -> Vec<ClusterRecord> {
    set.clusters.iter().map(ClusterRecord::from).collect()
}

/// One row per retained gene group, in group order.
pub fn gene_group_records(report: &CooccurrenceReport) -> Vec<GeneGroupRecord> {
    report
        .groups
        .iter()
        .map(|group| GeneGroupRecord {
            chrom: group.chrom.clone(),
            gene_count: group.gene_count(),
        })
        .collect()
}
