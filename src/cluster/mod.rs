//! Merging of physically adjacent outlier windows into multi-locus clusters.
//!
//! Windows are grouped per chromosome, sorted by start, and swept once from
//! left to right. A window joins the open run when the distance from the end
//! of the run's last window to its own start is within the gap limit; runs of
//! a single window are not clusters.

use std::collections::HashMap;
use std::sync::Arc;

use crate::windows::Window;

/// Default maximum distance (bp) between consecutive windows of a cluster.
pub const DEFAULT_GAP_LIMIT: u64 = 50_000;
/// Default FST threshold for windows entering the cluster builder.
pub const DEFAULT_CLUSTER_THRESHOLD: f64 = 0.10;

/// Run of at least two adjacent outlier windows on one chromosome.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    chrom: Arc<str>,
    windows: Vec<Window>,
}

impl Cluster {
    /// Chromosome shared by every window.
    pub fn chrom(&self) -> &Arc<str> {
        &self.chrom
    }

    /// Member windows sorted by `bin_start`.
    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    /// Start of the first window.
    pub fn span_start(&self) -> u64 {
        self.windows[0].bin_start
    }

    /// End of the last window.
    pub fn span_end(&self) -> u64 {
        self.windows[self.windows.len() - 1].bin_end
    }

    /// `span_end − span_start`.
    pub fn size_bp(&self) -> u64 {
        self.span_end() - self.span_start()
    }

    /// Number of member windows (always at least two).
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Mean weighted FST of the member windows.
    pub fn mean_fst(&self) -> f64 {
        self.windows.iter().map(|w| w.weighted_fst).sum::<f64>() / self.windows.len() as f64
    }

    /// Highest weighted FST among the member windows.
    pub fn max_fst(&self) -> f64 {
        self.windows
            .iter()
            .map(|w| w.weighted_fst)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Clusters found by one [`ClusterBuilder::build`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterSet {
    /// Clusters in chromosome first-appearance order, then by position.
    pub clusters: Vec<Cluster>,
    /// Windows that had no neighbour within the gap limit.
    pub isolated: Vec<Window>,
}

impl ClusterSet {
    /// Whether no cluster was found.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

/// Greedy single-pass window merger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterBuilder {
    gap_limit: u64,
}

impl Default for ClusterBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_GAP_LIMIT)
    }
}

impl ClusterBuilder {
    /// Builder allowing gaps of up to `gap_limit` bp between windows.
    pub fn new(gap_limit: u64) -> Self {
        Self { gap_limit }
    }

    /// Cluster pre-filtered outlier windows.
    ///
    /// Chromosomes are visited in order of first appearance in `outliers`.
    pub fn build(&self, outliers: &[&Window]) -> ClusterSet {
        let mut set = ClusterSet::default();

        for (chrom, mut windows) in group_by_chromosome(outliers) {
            // stable: equal starts keep input order
            windows.sort_by_key(|window| window.bin_start);

            let found = set.clusters.len();
            let mut run: Vec<&Window> = Vec::new();
            for window in windows {
                let extends = run
                    .last()
                    .map_or(true, |last| window.gap_after(last.bin_end) <= self.gap_limit);
                if !extends {
                    close_run(&chrom, &mut run, &mut set);
                }
                run.push(window);
            }
            close_run(&chrom, &mut run, &mut set);

            tracing::debug!(
                chrom = %chrom,
                clusters = set.clusters.len() - found,
                "clustered chromosome"
            );
        }

        set
    }
}

fn close_run(chrom: &Arc<str>, run: &mut Vec<&Window>, set: &mut ClusterSet) {
    if run.len() >= 2 {
        set.clusters.push(Cluster {
            chrom: Arc::clone(chrom),
            windows: run.iter().map(|&window| window.clone()).collect(),
        });
    } else {
        set.isolated.extend(run.iter().map(|&window| window.clone()));
    }
    run.clear();
}

fn group_by_chromosome<'a>(windows: &[&'a Window]) -> Vec<(Arc<str>, Vec<&'a Window>)> {
    let mut order: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(Arc<str>, Vec<&'a Window>)> = Vec::new();
    for &window in windows {
        let slot = *order.entry(window.chrom.as_ref()).or_insert_with(|| {
            groups.push((Arc::clone(&window.chrom), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(window);
    }
    groups
}
