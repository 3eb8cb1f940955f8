//! Report assembly and persistence.
//!
//! Pipeline results are first shaped into flat rows ([`ClusterRecord`],
//! [`GeneGroupRecord`], [`WindowRecord`]). The writers persist those rows as
//! CSV tables next to the co-occurring genes annotation file, and the console
//! renderers format the same data for a terminal.

mod console;
mod gff;
mod records;
mod tables;

pub use console::{render_clusters, render_gene_stats, render_summary, render_sweep};
pub use gff::{render_cooccurring_genes, write_cooccurring_genes, COOCCURRENCE_HEADER};
pub use records::{
    cluster_records, gene_group_records, ClusterRecord, GeneGroupRecord, WindowRecord,
};
pub use tables::{
    render_table, write_clusters, write_gene_groups, write_table_file, write_windows,
    ReportError,
};
