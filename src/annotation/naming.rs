use std::collections::HashMap;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;

use super::AnnotationError;

/// Prefix the annotation source puts in front of bare chromosome ids.
pub const DEFAULT_CHROM_PREFIX: &str = "chr_";

/// Maps window-table chromosome ids to annotation chromosome names.
///
/// Explicit aliases win; everything else gets `prefix` prepended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromosomeNaming {
    prefix: String,
    aliases: HashMap<String, String>,
}

impl Default for ChromosomeNaming {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_CHROM_PREFIX)
    }
}

#[derive(Debug, Deserialize)]
struct AliasRow {
    window: String,
    annotation: String,
}

impl ChromosomeNaming {
    /// Prefix-only convention.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            aliases: HashMap::new(),
        }
    }

    /// Both sources already use the same names.
    pub fn identity() -> Self {
        Self::with_prefix("")
    }

    /// Add one explicit mapping.
    pub fn with_alias(mut self, window: impl Into<String>, annotation: impl Into<String>) -> Self {
        self.aliases.insert(window.into(), annotation.into());
        self
    }

    /// Add mappings from a two-column, tab-separated file without header.
    ///
    /// Lines starting with `#` are ignored.
    pub fn load_aliases<P: AsRef<Path>>(mut self, path: P) -> Result<Self, AnnotationError> {
        let path = path.as_ref();
        let alias_error = |source| AnnotationError::Aliases {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .comment(Some(b'#'))
            .trim(Trim::All)
            .from_path(path)
            .map_err(alias_error)?;

        for row in reader.deserialize::<AliasRow>() {
            let row = row.map_err(alias_error)?;
            self.aliases.insert(row.window, row.annotation);
        }
        tracing::debug!(path = %path.display(), aliases = self.aliases.len(), "loaded chromosome aliases");
        Ok(self)
    }

    /// Annotation-side name for a window-table chromosome id.
    pub fn annotation_name(&self, chrom: &str) -> String {
        match self.aliases.get(chrom) {
            Some(alias) => alias.clone(),
            None => format!("{}{}", self.prefix, chrom),
        }
    }
}
