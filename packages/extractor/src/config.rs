//! Configuration constants and environment-driven settings.

use std::path::{Path, PathBuf};

use crate::error::{ExtractorError, Result};

/// Master concordance file published by the Nonprofit Open Data Collective.
pub const CONCORDANCE_CSV_URL: &str = "https://raw.githubusercontent.com/Nonprofit-Open-Data-Collective/irs-efile-master-concordance-file/master/concordance.csv";

/// HTTP timeout in seconds.
///
/// The concordance CSV is several megabytes and is served from a CDN that
/// can be slow on a cold cache.
pub const HTTP_TIMEOUT_SECS: u64 = 120;

/// Default root for cached and generated data.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// File name of the cached concordance inside the concordance directory.
pub const CONCORDANCE_FILE_NAME: &str = "concordance.csv";

/// Output file for filing records.
pub const FILINGS_FILE_NAME: &str = "filings.jsonl";

/// Output file for Schedule M records.
pub const SCHEDULE_M_FILE_NAME: &str = "schedule_m.jsonl";

/// Suffix the IRS appends to e-file object ids in published file names.
pub const PUBLIC_FILE_SUFFIX: &str = "_public";

/// Number of documents handed to the worker pool per round.
///
/// Results of one chunk are written before the next chunk starts, which
/// bounds memory for multi-hundred-thousand file runs.
pub const BATCH_CHUNK_SIZE: usize = 1000;

/// Runtime configuration for the extractor.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub data_dir: PathBuf,
    pub concordance_url: String,
    pub workers: usize,
}

impl ExtractorConfig {
    /// Build configuration from `DATA_DIR` and `CONCORDANCE_URL`.
    ///
    /// The worker count starts at [`default_workers`]; commands that run a
    /// batch apply `PARSE_WORKERS` through [`Self::with_workers_from_env`].
    pub fn from_env() -> Self {
        let data_dir = std::env::var("DATA_DIR")
            .unwrap_or_else(|_| DEFAULT_DATA_DIR.into())
            .into();

        let concordance_url =
            std::env::var("CONCORDANCE_URL").unwrap_or_else(|_| CONCORDANCE_CSV_URL.into());

        Self {
            data_dir,
            concordance_url,
            workers: default_workers(),
        }
    }

    /// Apply `PARSE_WORKERS` when it is set.
    pub fn with_workers_from_env(self) -> Result<Self> {
        match std::env::var("PARSE_WORKERS") {
            Ok(v) => Ok(self.with_workers(parse_workers(&v)?)),
            Err(_) => Ok(self),
        }
    }

    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            concordance_url: CONCORDANCE_CSV_URL.into(),
            workers: default_workers(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_concordance_url(mut self, url: impl Into<String>) -> Self {
        self.concordance_url = url.into();
        self
    }

    pub fn xml_dir(&self) -> PathBuf {
        self.data_dir.join("xml")
    }

    pub fn parsed_dir(&self) -> PathBuf {
        self.data_dir.join("parsed")
    }

    pub fn concordance_dir(&self) -> PathBuf {
        self.data_dir.join("concordance")
    }

    pub fn concordance_path(&self) -> PathBuf {
        self.concordance_dir().join(CONCORDANCE_FILE_NAME)
    }
}

/// All available CPUs but one, never less than one.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}

fn parse_workers(value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err(ExtractorError::Config(
            "PARSE_WORKERS must be at least 1".into(),
        )),
        Ok(n) => Ok(n),
        Err(_) => Err(ExtractorError::Config(format!(
            "PARSE_WORKERS must be a positive integer, got '{value}'"
        ))),
    }
}

/// Derive the e-file object id from an XML file path.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use irs990_extractor::config::object_id_from_path;
///
/// assert_eq!(
///     object_id_from_path(Path::new("data/xml/201541349349307794_public.xml")),
///     Some("201541349349307794".to_string())
/// );
/// ```
pub fn object_id_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let id = stem.strip_suffix(PUBLIC_FILE_SUFFIX).unwrap_or(stem);
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}
