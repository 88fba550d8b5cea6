//! Directory-level extraction run.
//!
//! Every `*.xml` file in the input directory becomes at most one line in
//! `filings.jsonl` and at most one line in `schedule_m.jsonl`. Documents
//! are independent: they are extracted on a rayon pool and a failure in
//! one never affects another.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use roxmltree::Document;

use crate::config::{
    default_workers, object_id_from_path, BATCH_CHUNK_SIZE, FILINGS_FILE_NAME,
    SCHEDULE_M_FILE_NAME,
};
use crate::concordance::ConcordanceMaps;
use crate::error::Result;
use crate::filing::FilingExtractor;
use crate::output::JsonLinesWriter;
use crate::schedule::extract_schedule;
use crate::types::{FilingRecord, ScheduleRecord};

/// Options for [`run_batch`].
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Worker threads.
    pub workers: usize,
    /// Re-run even when both outputs already exist.
    pub force: bool,
    /// Documents extracted per parallel round.
    pub chunk_size: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            force: false,
            chunk_size: BATCH_CHUNK_SIZE,
        }
    }
}

impl BatchOptions {
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

/// Counts reported by a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// XML files found.
    pub documents: usize,
    /// Filing records written.
    pub filings: usize,
    /// Schedule M records written.
    pub schedules: usize,
    /// Documents that could not be read or parsed.
    pub failures: usize,
    /// True when existing outputs were kept and nothing ran.
    pub skipped: bool,
}

/// An input document and its object id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPath {
    pub path: PathBuf,
    pub object_id: String,
}

/// List `*.xml` files directly inside `xml_dir`, sorted by path.
pub fn list_documents(xml_dir: &Path) -> Result<Vec<DocumentPath>> {
    let mut documents = Vec::new();

    for entry in fs::read_dir(xml_dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("xml") {
            continue;
        }
        match object_id_from_path(&path) {
            Some(object_id) => documents.push(DocumentPath { path, object_id }),
            None => tracing::debug!(path = %path.display(), "no object id in file name, skipping"),
        }
    }

    documents.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(documents)
}

/// Receives progress from [`run_batch_with_progress`].
pub trait BatchProgress {
    /// Called once with the number of documents about to be extracted.
    fn start(&mut self, _total: usize) {}

    /// Called after each chunk with the number of documents it held.
    fn advance(&mut self, _done: usize) {}
}

impl BatchProgress for () {}

/// True when both output files are already present in `out_dir`.
pub fn outputs_exist(out_dir: &Path) -> bool {
    out_dir.join(FILINGS_FILE_NAME).exists() && out_dir.join(SCHEDULE_M_FILE_NAME).exists()
}

/// Extract every document in `xml_dir` into two JSON-lines files in `out_dir`.
///
/// # Arguments
/// * `xml_dir` - Directory holding the e-file XML documents
/// * `out_dir` - Directory receiving `filings.jsonl` and `schedule_m.jsonl`
/// * `maps` - Concordance maps shared read-only by every worker
/// * `options` - Worker count, chunk size and force flag
///
/// # Returns
/// Counts of what was found, written and skipped.
pub fn run_batch(
    xml_dir: &Path,
    out_dir: &Path,
    maps: &ConcordanceMaps,
    options: &BatchOptions,
) -> Result<BatchSummary> {
    run_batch_with_progress(xml_dir, out_dir, maps, options, &mut ())
}

/// Like [`run_batch`], reporting the document total and each finished
/// chunk to `progress`.
pub fn run_batch_with_progress<P>(
    xml_dir: &Path,
    out_dir: &Path,
    maps: &ConcordanceMaps,
    options: &BatchOptions,
    progress: &mut P,
) -> Result<BatchSummary>
where
    P: BatchProgress + ?Sized,
{
    if outputs_exist(out_dir) && !options.force {
        tracing::info!(dir = %out_dir.display(), "parsed files already exist, skipping");
        return Ok(BatchSummary {
            skipped: true,
            ..BatchSummary::default()
        });
    }

    let documents = list_documents(xml_dir)?;
    if documents.is_empty() {
        tracing::warn!(dir = %xml_dir.display(), "no XML files found");
        return Ok(BatchSummary::default());
    }
    tracing::info!(documents = documents.len(), workers = options.workers, "parsing XML files");
    progress.start(documents.len());

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers.max(1))
        .build()?;
    let extractor = FilingExtractor::new(maps);

    let mut filings = JsonLinesWriter::create(&out_dir.join(FILINGS_FILE_NAME))?;
    let mut schedules = JsonLinesWriter::create(&out_dir.join(SCHEDULE_M_FILE_NAME))?;
    let mut summary = BatchSummary {
        documents: documents.len(),
        ..BatchSummary::default()
    };

    for chunk in documents.chunks(options.chunk_size.max(1)) {
        let outcomes: Vec<_> = pool.install(|| {
            chunk
                .par_iter()
                .map(|document| (document, process_document(&extractor, document)))
                .collect()
        });

        for (document, outcome) in outcomes {
            match outcome {
                Ok((filing, schedule)) => {
                    filings.write(&filing)?;
                    summary.filings += 1;
                    if let Some(schedule) = schedule {
                        schedules.write(&schedule)?;
                        summary.schedules += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        object_id = %document.object_id,
                        error = %e,
                        "skipping document"
                    );
                    summary.failures += 1;
                }
            }
        }

        progress.advance(chunk.len());
    }

    filings.finish()?;
    schedules.finish()?;

    tracing::info!(
        filings = summary.filings,
        schedules = summary.schedules,
        failures = summary.failures,
        "parsing complete"
    );
    Ok(summary)
}

/// Read, parse once, then extract the filing and its Schedule M.
fn process_document(
    extractor: &FilingExtractor<'_>,
    document: &DocumentPath,
) -> Result<(FilingRecord, Option<ScheduleRecord>)> {
    let bytes = fs::read(&document.path)?;
    let text = String::from_utf8_lossy(&bytes);
    let doc = Document::parse(&text)?;

    let filing = extractor.extract_document(&doc, &document.object_id);
    let schedule = extract_schedule(&doc, &document.object_id, filing.ein(), filing.tax_year());
    Ok((filing, schedule))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const FILING: &str = r#"<Return xmlns="http://www.irs.gov/efile">
        <ReturnHeader><Filer><EIN>987654321</EIN></Filer><TaxYr>2021</TaxYr></ReturnHeader>
        <ReturnData><IRS990ScheduleM><ThirdPartiesUsedInd>1</ThirdPartiesUsedInd></IRS990ScheduleM></ReturnData>
    </Return>"#;

    #[test]
    fn test_list_documents_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b_public.xml"), FILING).unwrap();
        fs::write(dir.path().join("a.xml"), FILING).unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("nested.xml")).unwrap();

        let ids: Vec<_> = list_documents(dir.path())
            .unwrap()
            .into_iter()
            .map(|d| d.object_id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_run_counts_failures_without_aborting() {
        let xml_dir = tempdir().unwrap();
        let out_dir = tempdir().unwrap();
        fs::write(xml_dir.path().join("good.xml"), FILING).unwrap();
        fs::write(xml_dir.path().join("broken.xml"), "<Return><ReturnData>").unwrap();

        let options = BatchOptions::default().with_workers(2).with_chunk_size(1);
        let summary = run_batch(
            xml_dir.path(),
            out_dir.path(),
            &ConcordanceMaps::default(),
            &options,
        )
        .unwrap();

        assert_eq!(
            summary,
            BatchSummary {
                documents: 2,
                filings: 1,
                schedules: 1,
                failures: 1,
                skipped: false,
            }
        );

        let schedules = fs::read_to_string(out_dir.path().join(SCHEDULE_M_FILE_NAME)).unwrap();
        let record: serde_json::Value = serde_json::from_str(schedules.trim()).unwrap();
        assert_eq!(record["object_id"], "good");
        assert_eq!(record["ein"], "987654321");
        assert_eq!(record["uses_third_parties"], true);
    }

    #[test]
    fn test_existing_outputs_are_kept_unless_forced() {
        let xml_dir = tempdir().unwrap();
        let out_dir = tempdir().unwrap();
        fs::write(xml_dir.path().join("good.xml"), FILING).unwrap();
        fs::write(out_dir.path().join(FILINGS_FILE_NAME), "").unwrap();
        fs::write(out_dir.path().join(SCHEDULE_M_FILE_NAME), "").unwrap();

        let maps = ConcordanceMaps::default();
        let kept = run_batch(xml_dir.path(), out_dir.path(), &maps, &BatchOptions::default()).unwrap();
        assert!(kept.skipped);

        let forced = run_batch(
            xml_dir.path(),
            out_dir.path(),
            &maps,
            &BatchOptions::default().with_force(true),
        )
        .unwrap();
        assert!(!forced.skipped);
        assert_eq!(forced.filings, 1);
    }

    #[derive(Default)]
    struct Recorder {
        total: Option<usize>,
        done: usize,
    }

    impl BatchProgress for Recorder {
        fn start(&mut self, total: usize) {
            self.total = Some(total);
        }

        fn advance(&mut self, done: usize) {
            self.done += done;
        }
    }

    #[test]
    fn test_progress_reports_every_document() {
        let xml_dir = tempdir().unwrap();
        let out_dir = tempdir().unwrap();
        for idx in 0..5 {
            fs::write(xml_dir.path().join(format!("{idx}.xml")), FILING).unwrap();
        }

        let mut recorder = Recorder::default();
        let options = BatchOptions::default().with_chunk_size(2);
        run_batch_with_progress(
            xml_dir.path(),
            out_dir.path(),
            &ConcordanceMaps::default(),
            &options,
            &mut recorder,
        )
        .unwrap();
        assert_eq!(recorder.total, Some(5));
        assert_eq!(recorder.done, 5);
    }

    #[test]
    fn test_skipped_run_reports_no_progress() {
        let xml_dir = tempdir().unwrap();
        let out_dir = tempdir().unwrap();
        fs::write(xml_dir.path().join("good.xml"), FILING).unwrap();
        assert!(!outputs_exist(out_dir.path()));
        fs::write(out_dir.path().join(FILINGS_FILE_NAME), "").unwrap();
        assert!(!outputs_exist(out_dir.path()));
        fs::write(out_dir.path().join(SCHEDULE_M_FILE_NAME), "").unwrap();
        assert!(outputs_exist(out_dir.path()));

        let mut recorder = Recorder::default();
        let summary = run_batch_with_progress(
            xml_dir.path(),
            out_dir.path(),
            &ConcordanceMaps::default(),
            &BatchOptions::default(),
            &mut recorder,
        )
        .unwrap();
        assert!(summary.skipped);
        assert_eq!(recorder.total, None);
        assert_eq!(recorder.done, 0);
    }
}
