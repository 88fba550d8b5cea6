//! Core output types: typed field values and flat column records.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A single typed output value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Null,
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<Option<i64>> for FieldValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Self::Null, Self::Integer)
    }
}

impl From<Option<bool>> for FieldValue {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Self::Null, Self::Boolean)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Null, Self::Text)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Flat, ordered column → value mapping.
///
/// Columns keep insertion order so serialized records have a stable layout.
/// Records are built with their full column set up front and every column
/// starts out null, which keeps the key set identical across documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    /// Create a record holding every column in `columns`, all null.
    #[must_use]
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: columns
                .into_iter()
                .map(|c| (c.into(), FieldValue::Null))
                .collect(),
        }
    }

    /// Set a column, appending it if it is not yet present.
    pub fn set(&mut self, column: &str, value: impl Into<FieldValue>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| name == column) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((column.to_string(), value)),
        }
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(FieldValue::as_str)
    }

    fn int(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(FieldValue::as_int)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Header, contact and financial summary fields of one filing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilingRecord(Record);

impl FilingRecord {
    pub(crate) fn new(record: Record) -> Self {
        Self(record)
    }

    #[must_use]
    pub fn object_id(&self) -> &str {
        self.0.text("object_id").unwrap_or_default()
    }

    #[must_use]
    pub fn ein(&self) -> Option<&str> {
        self.0.text("ein").filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn tax_year(&self) -> Option<i64> {
        self.0.int("tax_year")
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.0.get(column)
    }

    #[must_use]
    pub fn record(&self) -> &Record {
        &self.0
    }
}

/// Schedule M noncash contribution detail of one filing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScheduleRecord(Record);

impl ScheduleRecord {
    pub(crate) fn new(record: Record) -> Self {
        Self(record)
    }

    #[must_use]
    pub fn object_id(&self) -> &str {
        self.0.text("object_id").unwrap_or_default()
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.0.get(column)
    }

    #[must_use]
    pub fn record(&self) -> &Record {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_columns_starts_null() {
        let record = Record::with_columns(["object_id", "ein"]);
        assert_eq!(record.len(), 2);
        assert!(record.get("ein").unwrap().is_null());
        assert!(record.get("missing").is_none());
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut record = Record::with_columns(["a", "b"]);
        record.set("a", Some(1_i64));
        record.set("c", "new");

        let columns: Vec<_> = record.columns().collect();
        assert_eq!(columns, vec!["a", "b", "c"]);
        assert_eq!(record.get("a"), Some(&FieldValue::Integer(1)));
        assert_eq!(record.get("c"), Some(&FieldValue::text("new")));
    }

    #[test]
    fn test_serialize_preserves_order_and_nulls() {
        let mut record = Record::with_columns(["object_id", "tax_year", "has_schedule_m", "ein"]);
        record.set("object_id", "OBJ");
        record.set("tax_year", Some(2022_i64));
        record.set("has_schedule_m", Some(true));

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"object_id":"OBJ","tax_year":2022,"has_schedule_m":true,"ein":null}"#
        );
    }

    #[test]
    fn test_filing_record_accessors() {
        let mut record = Record::with_columns(["object_id", "ein", "tax_year"]);
        record.set("object_id", "OBJ_1");
        record.set("ein", "");
        record.set("tax_year", Some(2023_i64));

        let filing = FilingRecord::new(record);
        assert_eq!(filing.object_id(), "OBJ_1");
        assert_eq!(filing.ein(), None);
        assert_eq!(filing.tax_year(), Some(2023));
    }

    #[test]
    fn test_field_value_from_options() {
        assert_eq!(FieldValue::from(None::<i64>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(false)), FieldValue::Boolean(false));
        assert_eq!(
            FieldValue::from(Some("x".to_string())),
            FieldValue::Text("x".to_string())
        );
    }
}
