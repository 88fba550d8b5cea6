//! IRS 990 Extractor - Turn Form 990 e-file XML into flat, typed records.
//!
//! Field locations come from the Nonprofit Open Data Collective master
//! concordance, which lists every known xpath for a variable across IRS
//! schema versions. Each field is resolved through an ordered chain of
//! strategies: the concordance xpaths first, then a search for the leaf
//! element name anywhere in the return. Schedule M uses a fixed 28-line
//! template instead of the concordance.
//!
//! # Example
//!
//! ```
//! use irs990_extractor::{Concordance, ConcordanceMaps, FilingExtractor};
//!
//! let csv = "variable_name,xpath\nF9_00_TAX_YEAR,/Return/ReturnHeader/TaxYr\n";
//! let maps = ConcordanceMaps::build(&Concordance::from_reader(csv.as_bytes()).unwrap());
//!
//! let xml = r#"<Return xmlns="http://www.irs.gov/efile"><ReturnHeader><TaxYr>2022</TaxYr></ReturnHeader></Return>"#;
//! let filing = FilingExtractor::new(&maps).extract(xml, "OBJ").unwrap();
//! assert_eq!(filing.tax_year(), Some(2022));
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Configuration constants and environment settings
//! - [`error`]: Error types and Result alias
//! - [`http`]: HTTP client for the concordance download
//! - [`xml`]: Local-name helpers and the xpath evaluator
//! - [`coerce`]: Integer, date and boolean coercions
//! - [`types`]: Output records
//! - [`concordance`]: Concordance loading and column maps
//! - [`resolver`]: Field resolution strategies
//! - [`filing`]: Filing Extractor
//! - [`schedule`]: Schedule M template and extractor
//! - [`output`]: JSON-lines writer
//! - [`batch`]: Parallel directory runs
//! - [`cli`]: Command-line interface

pub mod batch;
pub mod cli;
pub mod coerce;
pub mod concordance;
pub mod config;
pub mod error;
pub mod filing;
pub mod http;
pub mod output;
pub mod resolver;
pub mod schedule;
pub mod types;
pub mod xml;

// Re-export main entry points
pub use batch::{run_batch, BatchOptions, BatchProgress, BatchSummary};
pub use filing::{filing_columns, FilingExtractor};
pub use schedule::{extract_schedule, schedule_columns};

// Re-export commonly used items
pub use concordance::{Concordance, ConcordanceMaps, FieldMap, VariableEntry};
pub use error::{ExtractorError, Result};
pub use resolver::FieldResolver;
pub use types::{FieldValue, FilingRecord, Record, ScheduleRecord};
