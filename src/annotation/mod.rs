//! Gene annotation parsing and window/gene intersection.
//!
//! The window table and the annotation source name chromosomes differently;
//! [`ChromosomeNaming`] is the single place where one is translated into the
//! other. Overlap lookups go through a per-chromosome [`WindowIndex`] rather
//! than comparing every gene with every window.

mod feature;
mod index;
mod intersect;
mod naming;

pub use feature::{AnnotationError, AnnotationReader, GeneFeature, GENE_FEATURE, MIN_COLUMNS};
pub use index::WindowIndex;
pub use intersect::{
    AnnotationIntersector, CooccurrenceReport, GeneGroup, GeneHit, IntersectionStats,
    DEFAULT_REPORT_THRESHOLD,
};
pub use naming::{ChromosomeNaming, DEFAULT_CHROM_PREFIX};
