//! Per-window FST records produced by an upstream windowed FST scan.
//!
//! The loader accepts both the raw tab-delimited scan output and the
//! comma-delimited high-FST table this crate writes, so the same record type
//! flows through every later stage.

mod loader;
mod stats;

pub use loader::{
    load_windows, read_windows, TableDelimiter, WindowTableError, BIN_END, BIN_START, CHROM,
    MEAN_FST, N_VARIANTS, WEIGHTED_FST,
};
pub use stats::FstSummary;

use std::cmp::Ordering;
use std::sync::Arc;

/// One genomic bin with its weighted FST estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    /// Chromosome identifier as written in the window table.
    pub chrom: Arc<str>,
    /// First base of the bin (inclusive).
    pub bin_start: u64,
    /// Last base of the bin (inclusive).
    pub bin_end: u64,
    /// Number of variants in the bin, when the table carries `N_VARIANTS`.
    pub n_variants: Option<u64>,
    /// Weighted FST; may be negative or NaN.
    pub weighted_fst: f64,
    /// Unweighted mean FST, when the table carries `MEAN_FST`.
    pub mean_fst: Option<f64>,
}

impl Window {
    /// Construct a window with only the required columns populated.
    pub fn new(chrom: impl Into<Arc<str>>, bin_start: u64, bin_end: u64, weighted_fst: f64) -> Self {
        Self {
            chrom: chrom.into(),
            bin_start,
            bin_end,
            n_variants: None,
            weighted_fst,
            mean_fst: None,
        }
    }

    /// Attach the optional pass-through columns.
    pub fn with_variant_stats(mut self, n_variants: Option<u64>, mean_fst: Option<f64>) -> Self {
        self.n_variants = n_variants;
        self.mean_fst = mean_fst;
        self
    }

    /// Closed-interval overlap against `[start, end]`.
    pub fn overlaps(&self, start: u64, end: u64) -> bool {
        start <= self.bin_end && end >= self.bin_start
    }

    /// Distance from `previous_end` to the start of this window.
    ///
    /// Windows starting at or before `previous_end` report a gap of zero.
    pub fn gap_after(&self, previous_end: u64) -> u64 {
        self.bin_start.saturating_sub(previous_end)
    }

    /// Whether the FST value meets `threshold`. NaN never qualifies.
    pub fn passes(&self, threshold: f64) -> bool {
        self.weighted_fst >= threshold
    }
}

/// Orders FST values from highest to lowest, NaN last.
pub fn fst_descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}
