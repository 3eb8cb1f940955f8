use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Feature type considered by the intersector.
pub const GENE_FEATURE: &str = "gene";
/// Minimum number of tab-separated columns of a feature record.
pub const MIN_COLUMNS: usize = 9;
/// Number of distinct chromosome names kept as a diagnostic sample.
const CHROM_SAMPLE_SIZE: usize = 5;

/// Errors raised while reading the annotation source.
#[derive(Debug, Error)]
pub enum AnnotationError {
    /// The annotation file could not be opened or read.
    #[error("failed to read annotation file {}: {source}", .path.display())]
    Io {
        /// Annotation path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The annotation file holds no feature records.
    #[error("annotation file {} contains no feature records", .path.display())]
    Empty {
        /// Annotation path.
        path: PathBuf,
    },

    /// A gene record has a non-integer start or end.
    #[error(
        "annotation file {} line {line}: `{value}` is not a valid {column} coordinate",
        .path.display()
    )]
    InvalidCoordinate {
        /// Annotation path.
        path: PathBuf,
        /// 1-based line number.
        line: u64,
        /// `start` or `end`.
        column: &'static str,
        /// Raw field value.
        value: String,
    },

    /// The chromosome alias table could not be parsed.
    #[error("invalid chromosome alias table {}: {source}", .path.display())]
    Aliases {
        /// Alias table path.
        path: PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },
}

/// One `gene` record of the annotation source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneFeature {
    /// Chromosome in the annotation's own naming convention.
    pub chrom: String,
    /// 1-based inclusive start.
    pub start: u64,
    /// 1-based inclusive end.
    pub end: u64,
    /// Column 3 of the record.
    pub feature_type: String,
    /// The record exactly as read, line terminator included.
    pub raw_line: String,
    /// 1-based line number in the source.
    pub line: u64,
}

impl GeneFeature {
    /// Closed-interval overlap against `[start, end]`.
    pub fn overlaps(&self, start: u64, end: u64) -> bool {
        self.start <= end && self.end >= start
    }
}

/// Streams `gene` records out of a GFF-style annotation source.
///
/// Comment lines (`#`), blank lines, records with fewer than nine columns and
/// non-gene records are skipped but still counted where relevant.
#[derive(Debug)]
pub struct AnnotationReader<R> {
    reader: R,
    origin: PathBuf,
    line: u64,
    records: usize,
    genes: usize,
    chromosomes: HashSet<String>,
    sample: Vec<String>,
}

impl AnnotationReader<BufReader<File>> {
    /// Open an annotation file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AnnotationError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| AnnotationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file), path))
    }
}

impl<R: BufRead> AnnotationReader<R> {
    /// Wrap any buffered reader; `origin` names the source in errors.
    pub fn new(reader: R, origin: impl Into<PathBuf>) -> Self {
        Self {
            reader,
            origin: origin.into(),
            line: 0,
            records: 0,
            genes: 0,
            chromosomes: HashSet::new(),
            sample: Vec::new(),
        }
    }

    /// Source name used in errors.
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Non-comment, non-blank records read so far.
    pub fn records_seen(&self) -> usize {
        self.records
    }

    /// Gene records read so far.
    pub fn genes_seen(&self) -> usize {
        self.genes
    }

    /// Whether `chrom` appeared in column 1 of any record read so far.
    pub fn has_chromosome(&self, chrom: &str) -> bool {
        self.chromosomes.contains(chrom)
    }

    /// First few distinct chromosome names, in file order.
    pub fn chromosome_sample(&self) -> &[String] {
        &self.sample
    }

    fn note_chromosome(&mut self, chrom: &str) {
        if self.chromosomes.contains(chrom) {
            return;
        }
        self.chromosomes.insert(chrom.to_string());
        if self.sample.len() < CHROM_SAMPLE_SIZE {
            self.sample.push(chrom.to_string());
        }
    }

    fn parse_record(&mut self, raw: String) -> Result<Option<GeneFeature>, AnnotationError> {
        let (chrom, feature_type, start, end) = {
            let columns: Vec<&str> = raw.trim().split('\t').collect();
            self.note_chromosome(columns[0]);
            if columns.len() < MIN_COLUMNS || columns[2] != GENE_FEATURE {
                return Ok(None);
            }
            let start = self.coordinate("start", columns[3])?;
            let end = self.coordinate("end", columns[4])?;
            (columns[0].to_string(), columns[2].to_string(), start, end)
        };
        self.genes += 1;

        Ok(Some(GeneFeature {
            chrom,
            start,
            end,
            feature_type,
            raw_line: raw,
            line: self.line,
        }))
    }

    fn coordinate(&self, column: &'static str, value: &str) -> Result<u64, AnnotationError> {
        value
            .trim()
            .parse()
            .map_err(|_| AnnotationError::InvalidCoordinate {
                path: self.origin.clone(),
                line: self.line,
                column,
                value: value.to_string(),
            })
    }
}

impl<R: BufRead> Iterator for AnnotationReader<R> {
    type Item = Result<GeneFeature, AnnotationError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut raw = String::new();
            match self.reader.read_line(&mut raw) {
                Ok(0) => return None,
                Ok(_) => self.line += 1,
                Err(source) => {
                    return Some(Err(AnnotationError::Io {
                        path: self.origin.clone(),
                        source,
                    }))
                }
            }

            if raw.starts_with('#') || raw.trim().is_empty() {
                continue;
            }
            self.records += 1;

            match self.parse_record(raw) {
                Ok(Some(feature)) => return Some(Ok(feature)),
                Ok(None) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
