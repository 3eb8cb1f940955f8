#[path = "common/mod.rs"]
mod common;

use common::{gene_line, window};
use fstregions::annotation::AnnotationIntersector;
use fstregions::report::{cluster_records, render_cooccurring_genes, render_table, write_clusters};
use fstregions::{AnnotationReader, ClusterBuilder, OutlierSelector, Window};
use test_case::test_case;

fn cluster_spans(windows: &[Window], threshold: f64, gap_limit: u64) -> Vec<(String, u64, u64, usize)> {
    let outliers = OutlierSelector::new(threshold).select(windows);
    ClusterBuilder::new(gap_limit)
        .build(outliers.windows())
        .clusters
        .iter()
        .map(|c| (c.chrom().to_string(), c.span_start(), c.span_end(), c.window_count()))
        .collect()
}

#[test]
fn distant_singleton_is_left_out_of_the_cluster() {
    let windows = vec![
        window("chr1", 0, 1000, 0.2),
        window("chr1", 1010, 2000, 0.3),
        window("chr1", 100000, 101000, 0.4),
    ];
    let outliers = OutlierSelector::new(0.1).select(&windows);
    let set = ClusterBuilder::new(50_000).build(outliers.windows());

    assert_eq!(set.clusters.len(), 1);
    let cluster = &set.clusters[0];
    assert_eq!((cluster.span_start(), cluster.span_end()), (0, 2000));
    assert_eq!(cluster.size_bp(), 2000);
    assert_eq!(cluster.window_count(), 2);
    assert_eq!(set.isolated.len(), 1);
    assert_eq!(set.isolated[0].bin_start, 100000);
}

#[test]
fn empty_outlier_set_writes_header_only() {
    let windows = vec![window("1", 1, 10000, 0.01)];
    let outliers = OutlierSelector::new(0.1).select(&windows);
    let set = ClusterBuilder::default().build(outliers.windows());
    assert!(set.is_empty());

    let records = cluster_records(&set);
    let text = render_table(|buffer| write_clusters(buffer, &records)).unwrap();
    assert_eq!(text, "CHROM,BIN_START,BIN_END,SIZE_BP,WINDOW_COUNT,AVG_FST,MAX_FST\n");
}

#[test]
fn gene_spanning_two_windows_is_counted_once() {
    let windows = vec![
        window("1", 1000, 2000, 0.08),
        window("1", 1400, 3000, 0.06),
    ];
    let significant = OutlierSelector::new(0.05).select(&windows).ranked();
    let gff = [
        gene_line("chr_1", 500, 1500, "spanning"),
        gene_line("chr_1", 2500, 2600, "second"),
    ]
    .concat();

    let report = AnnotationIntersector::default()
        .intersect(
            AnnotationReader::new(gff.as_bytes(), "scenario.gff"),
            significant.windows(),
        )
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    let genes = &report.groups[0].genes;
    assert_eq!(genes.len(), 2);
    assert!(genes[0].feature.raw_line.contains("ID=spanning"));
    assert_eq!(genes[0].fst(), 0.08);
    assert_eq!(genes[1].fst(), 0.06);
}

#[test]
fn single_gene_chromosome_is_dropped() {
    let windows = vec![window("1", 1000, 2000, 0.08), window("2", 1000, 2000, 0.5)];
    let significant = OutlierSelector::new(0.05).select(&windows).ranked();
    let gff = [
        gene_line("chr_1", 500, 1500, "a"),
        gene_line("chr_1", 1600, 1700, "b"),
        gene_line("chr_2", 1500, 1600, "lonely"),
    ]
    .concat();

    let report = AnnotationIntersector::default()
        .intersect(
            AnnotationReader::new(gff.as_bytes(), "scenario.gff"),
            significant.windows(),
        )
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].chrom, "chr_1");
    assert_eq!(report.stats.genes_per_chromosome.get("chr_2"), Some(&1));
}

#[test_case(10, 1 ; "touching windows merge")]
#[test_case(50_000, 1 ; "gap equal to the limit merges")]
#[test_case(50_001, 0 ; "gap one past the limit splits")]
fn gap_limit_is_inclusive(gap: u64, expected_clusters: usize) {
    let windows = vec![window("1", 1, 1000, 0.2), window("1", 1000 + gap, 2000 + gap, 0.2)];
    assert_eq!(cluster_spans(&windows, 0.1, 50_000).len(), expected_clusters);
}

#[test_case(0.05, 1 ; "both windows above threshold")]
#[test_case(0.2, 1 ; "threshold is inclusive")]
#[test_case(0.25, 0 ; "one window filtered leaves a singleton")]
fn cluster_threshold_filters_members(threshold: f64, expected_clusters: usize) {
    let windows = vec![window("1", 1, 1000, 0.3), window("1", 1001, 2000, 0.2)];
    assert_eq!(cluster_spans(&windows, threshold, 50_000).len(), expected_clusters);
}

#[test_case(500, 999, false ; "ends before window")]
#[test_case(500, 1000, true ; "touches window start")]
#[test_case(2000, 2500, true ; "touches window end")]
#[test_case(2001, 2500, false ; "starts after window")]
#[test_case(1200, 1300, true ; "inside window")]
fn overlap_uses_closed_intervals(start: u64, end: u64, expected: bool) {
    let windows = vec![window("1", 1000, 2000, 0.5)];
    let significant = OutlierSelector::new(0.05).select(&windows);
    let gff = [
        gene_line("chr_1", start, end, "query"),
        gene_line("chr_1", 1500, 1600, "anchor"),
    ]
    .concat();

    let report = AnnotationIntersector::default()
        .intersect(
            AnnotationReader::new(gff.as_bytes(), "scenario.gff"),
            significant.windows(),
        )
        .unwrap();
    let found = report
        .groups
        .iter()
        .flat_map(|group| &group.genes)
        .any(|gene| gene.feature.raw_line.contains("ID=query"));
    assert_eq!(found, expected);
}

#[test]
fn annotation_without_final_newline_renders_one_record_per_line() {
    let windows = vec![window("1", 1, 1000, 0.1), window("1", 10_000, 20_000, 0.4)];
    let significant = OutlierSelector::new(0.05).select(&windows).ranked();
    let gff = format!(
        "{}chr_1\ts\tgene\t15000\t15100\t.\t+\t.\tID=b",
        gene_line("chr_1", 100, 200, "a")
    );

    let report = AnnotationIntersector::default()
        .intersect(
            AnnotationReader::new(gff.as_bytes(), "scenario.gff"),
            significant.windows(),
        )
        .unwrap();
    let text = render_cooccurring_genes(&report).unwrap();

    let records: Vec<&str> = text.lines().filter(|line| line.starts_with("chr_1")).collect();
    assert_eq!(records.len(), 2);
    assert!(records[0].ends_with("ID=b"));
    assert!(records[1].ends_with("ID=a"));
    assert!(text.ends_with("ID=a\n\n"));
}

#[test]
fn clusters_follow_first_appearance_of_chromosomes() {
    let windows = vec![
        window("7", 1, 1000, 0.9),
        window("2", 1, 1000, 0.8),
        window("7", 1001, 2000, 0.7),
        window("2", 1001, 2000, 0.6),
    ];
    let chroms: Vec<String> = cluster_spans(&windows, 0.1, 50_000)
        .into_iter()
        .map(|(chrom, ..)| chrom)
        .collect();
    assert_eq!(chroms, vec!["7", "2"]);
}
