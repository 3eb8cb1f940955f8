use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord, Trim};
use thiserror::Error;

use super::Window;

/// Chromosome column.
pub const CHROM: &str = "CHROM";
/// Bin start column.
pub const BIN_START: &str = "BIN_START";
/// Bin end column.
pub const BIN_END: &str = "BIN_END";
/// Variant count column (optional).
pub const N_VARIANTS: &str = "N_VARIANTS";
/// Weighted FST column.
pub const WEIGHTED_FST: &str = "WEIGHTED_FST";
/// Mean FST column (optional).
pub const MEAN_FST: &str = "MEAN_FST";

/// Errors raised while loading a window table.
#[derive(Debug, Error)]
pub enum WindowTableError {
    /// The file could not be opened or read.
    #[error("failed to read window table {}: {source}", .path.display())]
    Io {
        /// Table path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The delimited text itself is broken (e.g. ragged rows).
    #[error("malformed window table {}: {source}", .path.display())]
    Csv {
        /// Table path.
        path: PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// A required column is absent from the header.
    #[error("malformed window table {}: missing required column `{column}`", .path.display())]
    MissingColumn {
        /// Table path.
        path: PathBuf,
        /// Name of the missing column.
        column: &'static str,
    },

    /// A numeric field could not be parsed.
    #[error(
        "parse error in {} line {line}, column `{column}`: `{value}` is not a valid {expected}",
        .path.display()
    )]
    Parse {
        /// Table path.
        path: PathBuf,
        /// 1-based line number.
        line: u64,
        /// Offending column.
        column: &'static str,
        /// Raw field value.
        value: String,
        /// What the field should have contained.
        expected: &'static str,
    },

    /// The window ends before it starts.
    #[error(
        "invalid window in {} line {line}: BIN_END {end} is before BIN_START {start}",
        .path.display()
    )]
    InvalidInterval {
        /// Table path.
        path: PathBuf,
        /// 1-based line number.
        line: u64,
        /// Parsed start.
        start: u64,
        /// Parsed end.
        end: u64,
    },
}

/// Field separator of a window table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableDelimiter {
    /// Tab-separated (raw scan output).
    Tab,
    /// Comma-separated (high-FST table).
    Comma,
}

impl TableDelimiter {
    /// Pick the delimiter from the header line: any tab wins, otherwise comma.
    pub fn detect(contents: &[u8]) -> Self {
        let header_end = contents
            .iter()
            .position(|&byte| byte == b'\n')
            .unwrap_or(contents.len());
        if contents[..header_end].contains(&b'\t') {
            TableDelimiter::Tab
        } else {
            TableDelimiter::Comma
        }
    }

    fn as_byte(self) -> u8 {
        match self {
            TableDelimiter::Tab => b'\t',
            TableDelimiter::Comma => b',',
        }
    }
}

/// Load every window from a table on disk, preserving row order.
pub fn load_windows<P: AsRef<Path>>(path: P) -> Result<Vec<Window>, WindowTableError> {
    let path = path.as_ref();
    let contents = fs::read(path).map_err(|source| WindowTableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let windows = read_windows(&contents, path)?;
    tracing::info!(path = %path.display(), windows = windows.len(), "loaded window table");
    Ok(windows)
}

/// Parse an in-memory window table. `origin` is only used in error messages.
pub fn read_windows(contents: &[u8], origin: &Path) -> Result<Vec<Window>, WindowTableError> {
    let delimiter = TableDelimiter::detect(contents);
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter.as_byte())
        .trim(Trim::All)
        .from_reader(contents);

    let csv_error = |source| WindowTableError::Csv {
        path: origin.to_path_buf(),
        source,
    };

    let headers = reader.headers().map_err(csv_error)?.clone();
    let columns = Columns::resolve(&headers, origin)?;

    let mut windows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        windows.push(columns.parse(&record, origin)?);
    }
    tracing::debug!(path = %origin.display(), ?delimiter, rows = windows.len(), "parsed window table");
    Ok(windows)
}

/// Header positions of the columns we understand.
struct Columns {
    chrom: usize,
    bin_start: usize,
    bin_end: usize,
    weighted_fst: usize,
    n_variants: Option<usize>,
    mean_fst: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord, origin: &Path) -> Result<Self, WindowTableError> {
        let find = |name: &str| headers.iter().position(|header| header == name);
        let require = |name: &'static str| {
            find(name).ok_or_else(|| WindowTableError::MissingColumn {
                path: origin.to_path_buf(),
                column: name,
            })
        };

        Ok(Self {
            chrom: require(CHROM)?,
            bin_start: require(BIN_START)?,
            bin_end: require(BIN_END)?,
            weighted_fst: require(WEIGHTED_FST)?,
            n_variants: find(N_VARIANTS),
            mean_fst: find(MEAN_FST),
        })
    }

    fn parse(&self, record: &StringRecord, origin: &Path) -> Result<Window, WindowTableError> {
        let line = record.position().map(|pos| pos.line()).unwrap_or(0);
        let field = |idx: usize| record.get(idx).unwrap_or("");
        let parse_error = |column: &'static str, value: &str, expected: &'static str| {
            WindowTableError::Parse {
                path: origin.to_path_buf(),
                line,
                column,
                value: value.to_string(),
                expected,
            }
        };

        let coordinate = |column: &'static str, idx: usize| {
            let value = field(idx);
            parse_count(value).ok_or_else(|| parse_error(column, value, "non-negative integer"))
        };
        let fst = |column: &'static str, idx: usize| {
            let value = field(idx);
            parse_fst(value).ok_or_else(|| parse_error(column, value, "number"))
        };

        let chrom: Arc<str> = Arc::from(field(self.chrom));
        let bin_start = coordinate(BIN_START, self.bin_start)?;
        let bin_end = coordinate(BIN_END, self.bin_end)?;
        if bin_end < bin_start {
            return Err(WindowTableError::InvalidInterval {
                path: origin.to_path_buf(),
                line,
                start: bin_start,
                end: bin_end,
            });
        }
        let weighted_fst = fst(WEIGHTED_FST, self.weighted_fst)?;

        let n_variants = match self.n_variants {
            Some(idx) if !field(idx).is_empty() => Some(coordinate(N_VARIANTS, idx)?),
            _ => None,
        };
        let mean_fst = match self.mean_fst {
            Some(idx) if !field(idx).is_empty() => Some(fst(MEAN_FST, idx)?),
            _ => None,
        };

        Ok(Window::new(chrom, bin_start, bin_end, weighted_fst).with_variant_stats(n_variants, mean_fst))
    }
}

/// Integers, also accepting integral floats such as `1000.0`.
fn parse_count(value: &str) -> Option<u64> {
    if let Ok(parsed) = value.parse::<u64>() {
        return Some(parsed);
    }
    let float = value.parse::<f64>().ok()?;
    if float.is_finite() && float >= 0.0 && float.fract() == 0.0 && float <= u64::MAX as f64 {
        Some(float as u64)
    } else {
        None
    }
}

/// FST values; an empty field or any spelling of NaN loads as NaN.
fn parse_fst(value: &str) -> Option<f64> {
    if value.is_empty() {
        return Some(f64::NAN);
    }
    value.parse::<f64>().ok()
}
