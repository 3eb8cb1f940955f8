use crate::annotation::IntersectionStats;
use crate::outliers::ThresholdReport;
use crate::windows::FstSummary;

use super::ClusterRecord;

/// `describe()`-style block for the weighted FST column.
pub fn render_summary(summary: &FstSummary) -> String {
    let rows = [
        ("mean", summary.mean),
        ("std", summary.std_dev),
        ("min", summary.min),
        ("25%", summary.q25),
        ("50%", summary.median),
        ("75%", summary.q75),
        ("max", summary.max),
    ];
    let mut out = format!("FST stats (WEIGHTED_FST)\ncount\t{}\n", summary.count);
    for (label, value) in rows {
        out.push_str(&format!("{label}\t{}\n", stat(value)));
    }
    out
}

/// Count and top rows for every threshold of a sweep.
pub fn render_sweep(reports: &[ThresholdReport<'_>]) -> String {
    let mut out = String::new();
    for report in reports {
        out.push_str(&format!(
            "\nFST >= {}: {} windows\n",
            report.threshold, report.count
        ));
        if report.top.is_empty() {
            continue;
        }
        out.push_str("rank\tCHROM\tBIN_START\tBIN_END\tWEIGHTED_FST\n");
        for (rank, window) in report.top.iter().enumerate() {
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\t{:.4}\n",
                rank + 1,
                window.chrom,
                window.bin_start,
                window.bin_end,
                window.weighted_fst
            ));
        }
    }
    out
}

/// Human-readable listing of multi-locus regions.
pub fn render_clusters(records: &[ClusterRecord]) -> String {
    let mut out = format!("Found {} multi-locus regions\n", records.len());
    for (idx, record) in records.iter().enumerate() {
        out.push_str(&format!(
            "\nRegion {} Chr{}:\n  position: {}-{}\n  length: {:.1}kb, windows: {}\n  mean FST: {:.3} (max: {:.3})\n",
            idx + 1,
            record.chrom,
            thousands(record.start),
            thousands(record.end),
            record.size_bp as f64 / 1000.0,
            record.window_count,
            record.mean_fst,
            record.max_fst
        ));
    }
    out
}

/// Per-chromosome overlap counts, single-gene chromosomes included.
pub fn render_gene_stats(stats: &IntersectionStats) -> String {
    let mut out = format!(
        "Total chromosomes with high FST genes: {}\n",
        stats.genes_per_chromosome.len()
    );
    for (chrom, count) in &stats.genes_per_chromosome {
        out.push_str(&format!("{chrom}: {count} genes\n"));
    }
    out.push_str(&format!("Total genes found: {}\n", stats.overlapping_genes()));
    out
}

fn stat(value: Option<f64>) -> String {
    value.map_or_else(|| "NaN".to_string(), |value| format!("{value:.6}"))
}

fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, digit) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}
