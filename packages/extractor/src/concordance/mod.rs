//! Concordance: the third-party crosswalk from stable variable names to
//! the xpaths that have located them across e-file schema versions.
//!
//! Loading produces an immutable [`Concordance`]; resolving the output
//! column tables against it produces [`ConcordanceMaps`], which is what the
//! extractors read.

mod fields;
mod loader;
mod map;

pub use fields::{FieldGroup, FieldSpec, HEADER_FIELDS, SIGNATURE_FIELDS, SUMMARY_FIELDS};
pub use loader::{download_concordance, Concordance, VariableEntry};
pub use map::{CandidatePath, ConcordanceMaps, FieldMap};
