//! Concordance table loading and local caching.

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;

use crate::error::{ExtractorError, Result};
use crate::http::{bytes_to_string, download_bytes};

const VARIABLE_COLUMN: &str = "variable_name";
const XPATH_COLUMN: &str = "xpath";
const DESCRIPTION_COLUMN: &str = "description";

/// All known xpaths for one concordance variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableEntry {
    pub variable_name: String,
    pub description: String,
    /// Candidate xpaths in file order, which is also preference order.
    pub xpaths: Vec<String>,
}

/// The loaded concordance, keyed by variable name.
///
/// Immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct Concordance {
    entries: Vec<VariableEntry>,
    index: HashMap<String, usize>,
}

impl Concordance {
    /// Load a concordance CSV from a file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes).map_err(|e| match e {
            ExtractorError::EmptyConcordance { .. } => ExtractorError::EmptyConcordance {
                source_name: Some(path.display().to_string()),
            },
            other => other,
        })
    }

    /// Load a concordance CSV from any reader.
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let text = bytes_to_string(bytes, "concordance CSV");
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let variable_idx =
            column(VARIABLE_COLUMN).ok_or_else(|| ExtractorError::MissingColumn(VARIABLE_COLUMN.into()))?;
        let xpath_idx =
            column(XPATH_COLUMN).ok_or_else(|| ExtractorError::MissingColumn(XPATH_COLUMN.into()))?;
        let description_idx = column(DESCRIPTION_COLUMN);

        let mut concordance = Self::default();
        let mut rows = 0usize;

        for row in reader.records() {
            let row = row?;
            let field = |idx: usize| row.get(idx).map(str::trim).unwrap_or_default();

            let variable = field(variable_idx);
            let xpath = field(xpath_idx);
            if variable.is_empty() || xpath.is_empty() {
                continue;
            }
            let description = description_idx.map(field).unwrap_or_default();

            concordance.insert(variable, xpath, description);
            rows += 1;
        }

        if concordance.is_empty() {
            return Err(ExtractorError::EmptyConcordance { source_name: None });
        }

        tracing::info!(
            variables = concordance.len(),
            rows,
            "loaded concordance"
        );
        Ok(concordance)
    }

    fn insert(&mut self, variable: &str, xpath: &str, description: &str) {
        let idx = match self.index.get(variable) {
            Some(&idx) => idx,
            None => {
                self.entries.push(VariableEntry {
                    variable_name: variable.to_string(),
                    description: description.to_string(),
                    xpaths: Vec::new(),
                });
                let idx = self.entries.len() - 1;
                self.index.insert(variable.to_string(), idx);
                idx
            }
        };

        let entry = &mut self.entries[idx];
        if !entry.xpaths.iter().any(|x| x == xpath) {
            entry.xpaths.push(xpath.to_string());
        }
    }

    #[must_use]
    pub fn get(&self, variable: &str) -> Option<&VariableEntry> {
        self.index.get(variable).map(|&idx| &self.entries[idx])
    }

    /// Variables in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &VariableEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Make sure a local copy of the concordance exists and return its path.
///
/// An existing file is reused unless `force` is set.
pub fn download_concordance(
    client: &Client,
    url: &str,
    cache_path: &Path,
    force: bool,
) -> Result<PathBuf> {
    if cache_path.exists() && !force {
        tracing::debug!(path = %cache_path.display(), "concordance already cached");
        return Ok(cache_path.to_path_buf());
    }

    tracing::info!(url, "downloading master concordance");
    let bytes = download_bytes(client, url).map_err(|e| {
        if let ExtractorError::Http(source) = e {
            ExtractorError::ConcordanceDownload {
                url: url.to_string(),
                source,
            }
        } else {
            e
        }
    })?;

    if let Some(parent) = cache_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(cache_path, &bytes)?;

    tracing::info!(
        path = %cache_path.display(),
        size_kb = bytes.len() / 1024,
        "concordance saved"
    );
    Ok(cache_path.to_path_buf())
}
