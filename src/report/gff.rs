use std::io::{self, Write};

use crate::annotation::CooccurrenceReport;

/// First line of the co-occurring genes file.
pub const COOCCURRENCE_HEADER: &str = "## Cooccurring genes in high FST regions ##\n";

/// Write retained gene groups as annotation text.
///
/// Each group gets a `# Chromosome <name>: <count> genes #` line, its feature
/// records exactly as read, and a trailing blank line. A record read without
/// a line terminator (last line of the source) is terminated with `\n`.
pub fn write_cooccurring_genes<W: Write>(writer: &mut W, report: &CooccurrenceReport) -> io::Result<()> {
    writer.write_all(COOCCURRENCE_HEADER.as_bytes())?;
    for group in &report.groups {
        writeln!(writer, "# Chromosome {}: {} genes #", group.chrom, group.gene_count())?;
        for gene in &group.genes {
            let raw = gene.feature.raw_line.as_bytes();
            writer.write_all(raw)?;
            if !raw.ends_with(b"\n") {
                writer.write_all(b"\n")?;
            }
        }
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Render the co-occurring genes file into a string.
pub fn render_cooccurring_genes(report: &CooccurrenceReport) -> io::Result<String> {
    let mut buffer = Vec::new();
    write_cooccurring_genes(&mut buffer, report)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
