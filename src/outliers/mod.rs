//! Threshold-based selection and ranking of outlier windows.
//!
//! Selections borrow the loaded windows; nothing is copied until a report
//! needs owned rows.

use crate::windows::{fst_descending, Window};

/// Default thresholds for the diagnostic sweep.
pub const DEFAULT_SWEEP_THRESHOLDS: [f64; 4] = [0.02, 0.03, 0.04, 0.05];
/// Default number of ranked rows shown per sweep threshold.
pub const DEFAULT_TOP_K: usize = 10;

/// Selects windows whose weighted FST meets a fixed threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierSelector {
    threshold: f64,
}

impl OutlierSelector {
    /// Create a selector for `weighted_fst >= threshold`.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Threshold applied by this selector.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Keep the qualifying windows, preserving their relative order.
    pub fn select<'a, I>(&self, windows: I) -> OutlierSet<'a>
    where
        I: IntoIterator<Item = &'a Window>,
    {
        let windows = windows
            .into_iter()
            .filter(|window| window.passes(self.threshold))
            .collect();
        OutlierSet {
            threshold: self.threshold,
            windows,
        }
    }
}

/// Read-only view of the windows that passed a threshold.
#[derive(Debug, Clone)]
pub struct OutlierSet<'a> {
    threshold: f64,
    windows: Vec<&'a Window>,
}

impl<'a> OutlierSet<'a> {
    /// Threshold the set was selected at.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Number of selected windows.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Whether nothing passed the threshold.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Selected windows in their current order.
    pub fn windows(&self) -> &[&'a Window] {
        &self.windows
    }

    /// Iterate over the selected windows.
    pub fn iter(&self) -> impl Iterator<Item = &'a Window> + '_ {
        self.windows.iter().copied()
    }

    /// The same selection ordered by FST descending; ties keep input order.
    pub fn ranked(&self) -> OutlierSet<'a> {
        let mut windows = self.windows.clone();
        windows.sort_by(|a, b| fst_descending(a.weighted_fst, b.weighted_fst));
        OutlierSet {
            threshold: self.threshold,
            windows,
        }
    }

    /// The `k` highest-FST windows; ties keep input order.
    pub fn top_k(&self, k: usize) -> Vec<&'a Window> {
        let mut ranked = self.ranked().windows;
        ranked.truncate(k);
        ranked
    }

    /// Narrow this selection to a stricter threshold, keeping the current order.
    pub fn refine(&self, threshold: f64) -> OutlierSet<'a> {
        OutlierSelector::new(threshold).select(self.iter())
    }

    /// Owned copies of the selected windows.
    pub fn to_windows(&self) -> Vec<Window> {
        self.windows.iter().map(|&window| window.clone()).collect()
    }
}

/// Count and leading rows for one threshold of a sweep.
#[derive(Debug, Clone)]
pub struct ThresholdReport<'a> {
    /// Threshold applied.
    pub threshold: f64,
    /// Number of windows at or above the threshold.
    pub count: usize,
    /// Highest-ranked windows, at most `k`.
    pub top: Vec<&'a Window>,
}

/// Evaluate several thresholds over the same windows for diagnostics.
pub fn sweep<'a>(windows: &'a [Window], thresholds: &[f64], k: usize) -> Vec<ThresholdReport<'a>> {
    thresholds
        .iter()
        .map(|&threshold| {
            let selected = OutlierSelector::new(threshold).select(windows);
            tracing::debug!(threshold, count = selected.len(), "threshold sweep");
            ThresholdReport {
                threshold,
                count: selected.len(),
                top: selected.top_k(k),
            }
        })
        .collect()
}
