//! Schedule M (noncash contributions) extraction.
//!
//! The 28 property lines are data in [`template`]; [`extract_schedule`]
//! walks that table and fills each line completely or not at all.

mod extractor;
pub mod template;

pub use extractor::extract_schedule;
pub use template::{schedule_columns, PropertyRow, SubField, PROPERTY_ROWS};
