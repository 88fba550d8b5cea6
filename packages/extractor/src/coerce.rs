//! Typed coercions applied to raw extracted text.
//!
//! All coercions are total: unparseable input becomes `None` (or is passed
//! through, for dates) instead of an error.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::FieldValue;

/// Already-normalized date: YYYY-MM-DD.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid regex"));

/// Compact date: YYYYMMDD.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static COMPACT_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{8}$").expect("valid regex"));

/// Width of a normalized EIN.
pub const EIN_WIDTH: usize = 9;

/// How a column's raw text is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Date,
    Boolean,
}

impl FieldKind {
    /// Convert raw extracted text into a typed value.
    pub fn apply(self, raw: Option<&str>) -> FieldValue {
        match self {
            Self::Text => raw.map(FieldValue::text).unwrap_or(FieldValue::Null),
            Self::Integer => to_int(raw).into(),
            Self::Date => to_date(raw).into(),
            Self::Boolean => to_bool(raw).into(),
        }
    }
}

/// Parse an integer, tolerating thousands separators and decimal notation.
///
/// # Examples
/// ```
/// use irs990_extractor::coerce::to_int;
///
/// assert_eq!(to_int(Some("1,000")), Some(1000));
/// assert_eq!(to_int(Some("123.0")), Some(123));
/// assert_eq!(to_int(Some("abc")), None);
/// assert_eq!(to_int(None), None);
/// ```
pub fn to_int(value: Option<&str>) -> Option<i64> {
    let cleaned = value?.trim().replace(',', "");
    if let Ok(n) = cleaned.parse::<i64>() {
        return Some(n);
    }

    // i64::MAX is not exactly representable; stay strictly inside the range.
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && f.abs() < 9.0e18)
        .map(|f| f.trunc() as i64)
}

/// Three-valued boolean coercion.
///
/// A present-but-empty value is an explicit "no" (`Some(false)`), while an
/// absent value stays unknown (`None`). Unrecognized tokens are also `None`.
///
/// # Examples
/// ```
/// use irs990_extractor::coerce::to_bool;
///
/// assert_eq!(to_bool(Some("X")), Some(true));
/// assert_eq!(to_bool(Some("")), Some(false));
/// assert_eq!(to_bool(Some("maybe")), None);
/// assert_eq!(to_bool(None), None);
/// ```
pub fn to_bool(value: Option<&str>) -> Option<bool> {
    let normalized = value?.trim().to_ascii_uppercase();
    match normalized.as_str() {
        "1" | "TRUE" | "X" | "YES" | "Y" => Some(true),
        "0" | "FALSE" | "NO" | "N" | "" => Some(false),
        _ => None,
    }
}

/// Normalize a date to YYYY-MM-DD where the shape is known.
///
/// Compact `YYYYMMDD` values get separators; every other non-empty value is
/// passed through unchanged.
///
/// # Examples
/// ```
/// use irs990_extractor::coerce::to_date;
///
/// assert_eq!(to_date(Some("2022-01-01")), Some("2022-01-01".to_string()));
/// assert_eq!(to_date(Some("20220101")), Some("2022-01-01".to_string()));
/// assert_eq!(to_date(Some("01/01/2022")), Some("01/01/2022".to_string()));
/// ```
pub fn to_date(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }

    if ISO_DATE.is_match(trimmed) {
        return Some(trimmed.to_string());
    }

    if COMPACT_DATE.is_match(trimmed) {
        return Some(format!(
            "{}-{}-{}",
            &trimmed[..4],
            &trimmed[4..6],
            &trimmed[6..]
        ));
    }

    Some(trimmed.to_string())
}

/// Left-pad an EIN with zeros to nine characters.
///
/// # Examples
/// ```
/// use irs990_extractor::coerce::normalize_ein;
///
/// assert_eq!(normalize_ein("12345678"), Some("012345678".to_string()));
/// assert_eq!(normalize_ein(" 123456789 "), Some("123456789".to_string()));
/// assert_eq!(normalize_ein("  "), None);
/// ```
pub fn normalize_ein(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(format!("{trimmed:0>width$}", width = EIN_WIDTH))
}
