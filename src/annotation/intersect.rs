use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;

use super::{AnnotationError, AnnotationReader, ChromosomeNaming, GeneFeature, WindowIndex};
use crate::windows::{fst_descending, Window};

/// Default FST threshold for windows entering the intersector.
pub const DEFAULT_REPORT_THRESHOLD: f64 = 0.05;

/// A gene credited to the first significant window it overlaps.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneHit {
    /// The annotation record.
    pub feature: GeneFeature,
    /// The window that produced the match.
    pub window: Window,
}

impl GeneHit {
    /// FST of the matching window.
    pub fn fst(&self) -> f64 {
        self.window.weighted_fst
    }
}

/// Genes overlapping significant windows on one annotation chromosome.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneGroup {
    /// Annotation-side chromosome name.
    pub chrom: String,
    /// Genes ordered by associated FST, highest first.
    pub genes: Vec<GeneHit>,
}

impl GeneGroup {
    /// Number of genes in the group.
    pub fn gene_count(&self) -> usize {
        self.genes.len()
    }
}

/// Counters describing one intersection run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntersectionStats {
    /// Non-comment records in the annotation source.
    pub records_scanned: usize,
    /// `gene` records in the annotation source.
    pub genes_scanned: usize,
    /// Significant windows that were indexed.
    pub windows_indexed: usize,
    /// Overlapping genes per chromosome, single-gene chromosomes included.
    pub genes_per_chromosome: BTreeMap<String, usize>,
    /// First few chromosome names seen in the annotation.
    pub annotation_chromosomes: Vec<String>,
    /// Mapped window chromosomes absent from the annotation, sorted.
    pub unmatched_chromosomes: Vec<String>,
}

impl IntersectionStats {
    /// Overlapping genes across all chromosomes.
    pub fn overlapping_genes(&self) -> usize {
        self.genes_per_chromosome.values().sum()
    }
}

/// Outcome of intersecting an annotation source with significant windows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CooccurrenceReport {
    /// Groups with more than one gene, in chromosome name order.
    pub groups: Vec<GeneGroup>,
    /// Run counters.
    pub stats: IntersectionStats,
}

impl CooccurrenceReport {
    /// Whether no group survived.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Genes across all retained groups.
    pub fn gene_count(&self) -> usize {
        self.groups.iter().map(GeneGroup::gene_count).sum()
    }
}

/// Finds genes overlapping significant windows.
#[derive(Debug, Clone, Default)]
pub struct AnnotationIntersector {
    naming: ChromosomeNaming,
}

impl AnnotationIntersector {
    /// Intersector translating window chromosomes through `naming`.
    pub fn new(naming: ChromosomeNaming) -> Self {
        Self { naming }
    }

    /// Intersect the annotation file at `path`.
    pub fn intersect_path<P: AsRef<Path>>(
        &self,
        path: P,
        significant: &[&Window],
    ) -> Result<CooccurrenceReport, AnnotationError> {
        self.intersect(AnnotationReader::open(path)?, significant)
    }

    /// Intersect an annotation stream with `significant`.
    ///
    /// When a gene overlaps several windows it is credited to the one that
    /// comes first in `significant`.
    pub fn intersect<R: BufRead>(
        &self,
        mut reader: AnnotationReader<R>,
        significant: &[&Window],
    ) -> Result<CooccurrenceReport, AnnotationError> {
        let index = WindowIndex::build(significant, &self.naming);

        let mut by_chrom: BTreeMap<String, Vec<GeneHit>> = BTreeMap::new();
        for feature in reader.by_ref() {
            let feature = feature?;
            let Some(rank) = index.first_overlap(&feature.chrom, feature.start, feature.end) else {
                continue;
            };
            by_chrom
                .entry(feature.chrom.clone())
                .or_default()
                .push(GeneHit {
                    feature,
                    window: significant[rank].clone(),
                });
        }

        if reader.records_seen() == 0 {
            return Err(AnnotationError::Empty {
                path: reader.origin().to_path_buf(),
            });
        }

        let mut unmatched: Vec<String> = index
            .chromosomes()
            .filter(|chrom| !reader.has_chromosome(chrom))
            .map(str::to_string)
            .collect();
        unmatched.sort();
        if !unmatched.is_empty() {
            tracing::warn!(
                chromosomes = ?unmatched,
                sample = ?reader.chromosome_sample(),
                "window chromosomes not found in annotation; check the naming convention"
            );
        }

        let stats = IntersectionStats {
            records_scanned: reader.records_seen(),
            genes_scanned: reader.genes_seen(),
            windows_indexed: index.len(),
            genes_per_chromosome: by_chrom
                .iter()
                .map(|(chrom, genes)| (chrom.clone(), genes.len()))
                .collect(),
            annotation_chromosomes: reader.chromosome_sample().to_vec(),
            unmatched_chromosomes: unmatched,
        };

        let groups: Vec<GeneGroup> = by_chrom
            .into_iter()
            .filter(|(_, genes)| genes.len() > 1)
            .map(|(chrom, mut genes)| {
                // stable: equal FST keeps annotation order
                genes.sort_by(|a, b| fst_descending(a.fst(), b.fst()));
                GeneGroup { chrom, genes }
            })
            .collect();

        tracing::info!(
            genes_scanned = stats.genes_scanned,
            overlapping = stats.overlapping_genes(),
            groups = groups.len(),
            "intersected annotation"
        );

        Ok(CooccurrenceReport { groups, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gene(chrom: &str, start: u64, end: u64, id: &str) -> String {
        format!("{chrom}\tGnomon\tgene\t{start}\t{end}\t.\t+\t.\tID={id}\n")
    }

    fn run(gff: &str, windows: &[Window]) -> CooccurrenceReport {
        let refs: Vec<&Window> = windows.iter().collect();
        AnnotationIntersector::default()
            .intersect(AnnotationReader::new(gff.as_bytes(), "test.gff"), &refs)
            .unwrap()
    }

    #[test]
    fn groups_sorted_by_fst_and_single_gene_groups_dropped() {
        let windows = vec![
            Window::new("1", 1000, 2000, 0.08),
            Window::new("1", 5000, 6000, 0.2),
            Window::new("2", 1000, 2000, 0.3),
        ];
        let gff = [
            gene("chr_1", 500, 1500, "a"),
            gene("chr_1", 5500, 5600, "b"),
            gene("chr_1", 3000, 4000, "miss"),
            gene("chr_2", 1900, 2500, "lonely"),
        ]
        .concat();

        let report = run(&gff, &windows);
        assert_eq!(report.groups.len(), 1);
        let group = &report.groups[0];
        assert_eq!(group.chrom, "chr_1");
        let ids: Vec<_> = group.genes.iter().map(|g| g.feature.raw_line.trim_end()).collect();
        assert!(ids[0].ends_with("ID=b"));
        assert!(ids[1].ends_with("ID=a"));
        assert_eq!(report.stats.overlapping_genes(), 3);
        assert_eq!(report.stats.genes_per_chromosome.get("chr_2"), Some(&1));
    }

    #[test]
    fn gene_spanning_two_windows_is_recorded_once_with_first_window() {
        let windows = vec![Window::new("1", 1000, 2000, 0.08), Window::new("1", 2001, 3000, 0.5)];
        let gff = [gene("chr_1", 1500, 2500, "wide"), gene("chr_1", 2900, 3100, "edge")].concat();
        let report = run(&gff, &windows);
        let group = &report.groups[0];
        assert_eq!(group.gene_count(), 2);
        assert_eq!(group.genes[0].fst(), 0.5);
        assert_eq!(group.genes[1].fst(), 0.08);
        assert!(group.genes[1].feature.raw_line.contains("ID=wide"));
    }

    #[test]
    fn equal_fst_keeps_annotation_order() {
        let windows = vec![Window::new("1", 1000, 2000, 0.2), Window::new("1", 5000, 6000, 0.2)];
        let gff = [
            gene("chr_1", 1800, 1900, "late"),
            gene("chr_1", 5100, 5200, "other-window"),
            gene("chr_1", 1100, 1200, "early"),
        ]
        .concat();
        let report = run(&gff, &windows);
        let ids: Vec<_> = report.groups[0]
            .genes
            .iter()
            .map(|g| g.feature.raw_line.trim_end().rsplit('=').next().unwrap_or(""))
            .collect();
        assert_eq!(ids, vec!["late", "other-window", "early"]);
    }

    #[test]
    fn unmatched_window_chromosomes_are_reported() {
        let windows = vec![Window::new("7", 1, 10, 0.1)];
        let report = run(&gene("chr_1", 1, 10, "x"), &windows);
        assert!(report.is_empty());
        assert_eq!(report.stats.unmatched_chromosomes, vec!["chr_7".to_string()]);
    }

    #[test]
    fn comment_only_source_is_empty() {
        let windows = vec![Window::new("1", 1, 10, 0.1)];
        let refs: Vec<&Window> = windows.iter().collect();
        let err = AnnotationIntersector::default()
            .intersect(AnnotationReader::new("##gff-version 3\n".as_bytes(), "x.gff"), &refs)
            .unwrap_err();
        assert!(matches!(err, AnnotationError::Empty { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = AnnotationIntersector::default()
            .intersect_path("/no/such/annotation.gff", &[])
            .unwrap_err();
        assert!(matches!(err, AnnotationError::Io { .. }));
    }
}
