use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use csv::{Terminator, WriterBuilder};
use serde::Serialize;
use thiserror::Error;

use super::{ClusterRecord, GeneGroupRecord, WindowRecord};
use crate::windows::Window;

/// Errors raised while persisting reports.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The output file could not be created or written.
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A table row could not be serialized.
    #[error("failed to write table {}: {source}", .path.display())]
    Csv {
        /// Output path.
        path: PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },
}

// Header is written by hand so that empty tables still get one.
fn write_table<W, T, I>(writer: W, header: &[&str], rows: I) -> csv::Result<()>
where
    W: Write,
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);
    wtr.write_record(header)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the high-FST window table (rows in the given order).
pub fn write_windows<W: Write>(writer: W, windows: &[&Window]) -> csv::Result<()> {
    write_table(
        writer,
        &WindowRecord::HEADER,
        windows.iter().map(|&window| WindowRecord::from(window)),
    )
}

/// Write the multi-locus cluster table.
pub fn write_clusters<W: Write>(writer: W, records: &[ClusterRecord]) -> csv::Result<()> {
    write_table(writer, &ClusterRecord::HEADER, records)
}

/// Write the gene group summary table.
pub fn write_gene_groups<W: Write>(writer: W, records: &[GeneGroupRecord]) -> csv::Result<()> {
    write_table(writer, &GeneGroupRecord::HEADER, records)
}

/// Create `path` and hand a buffered writer to `write`.
pub fn write_table_file<F>(path: &Path, write: F) -> Result<(), ReportError>
where
    F: FnOnce(BufWriter<File>) -> csv::Result<()>,
{
    let file = File::create(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write(BufWriter::new(file)).map_err(|source| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "wrote table");
    Ok(())
}

/// Render any of the tables into a string (useful for tests and snapshots).
pub fn render_table<F>(write: F) -> csv::Result<String>
where
    F: FnOnce(&mut Vec<u8>) -> csv::Result<()>,
{
    let mut buffer = Vec::new();
    write(&mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
