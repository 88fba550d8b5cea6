//! Reverse maps from output columns to ordered candidate xpaths.

use super::fields::FieldGroup;
use super::loader::Concordance;
use crate::xml::{is_ncname, XPath};

/// One candidate location for a field, compiled once.
#[derive(Debug, Clone)]
pub struct CandidatePath {
    raw: String,
    xpath: Option<XPath>,
    local_name: Option<String>,
}

impl CandidatePath {
    /// Compile a candidate. An expression outside the supported xpath
    /// subset is kept; it simply never matches on the xpath tier.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let xpath = match XPath::parse(&raw) {
            Ok(xpath) => Some(xpath),
            Err(e) => {
                tracing::debug!(xpath = %raw, error = %e, "candidate xpath not compilable");
                None
            }
        };
        let local_name = leaf_local_name(&raw);
        Self {
            raw,
            xpath,
            local_name,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The compiled xpath, when the expression is supported.
    #[must_use]
    pub fn xpath(&self) -> Option<&XPath> {
        self.xpath.as_ref()
    }

    /// The final path segment read as a bare element name.
    #[must_use]
    pub fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }
}

/// Read the last segment of an xpath as a namespace-free element name.
///
/// Predicates and prefixes are dropped; segments that are not element names
/// (`text()`, `@attr`, `*`) yield `None`.
fn leaf_local_name(raw: &str) -> Option<String> {
    let last = raw.trim().trim_end_matches('/').rsplit('/').next()?;
    let name = last.split('[').next()?.trim();
    let local = name.rsplit(':').next()?;
    is_ncname(local).then(|| local.to_string())
}

/// Output column → ordered candidate list.
///
/// A column whose variable is not in the concordance maps to an empty list.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    entries: Vec<(String, Vec<CandidatePath>)>,
}

impl FieldMap {
    /// Candidates for `column`; empty when the column is unknown or unresolved.
    #[must_use]
    pub fn candidates(&self, column: &str) -> &[CandidatePath] {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, candidates)| candidates.as_slice())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[CandidatePath])> {
        self.entries
            .iter()
            .map(|(name, candidates)| (name.as_str(), candidates.as_slice()))
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

impl Concordance {
    /// Resolve an output-column → variable-name table into a [`FieldMap`].
    ///
    /// Unknown variables are logged and produce an empty candidate list.
    pub fn resolve<'t>(&self, table: impl IntoIterator<Item = (&'t str, &'t str)>) -> FieldMap {
        let entries = table
            .into_iter()
            .map(|(column, variable)| {
                let candidates = match self.get(variable) {
                    Some(entry) => entry.xpaths.iter().map(CandidatePath::new).collect(),
                    None => {
                        tracing::warn!(variable, column, "concordance variable not found");
                        Vec::new()
                    }
                };
                (column.to_string(), candidates)
            })
            .collect();

        FieldMap { entries }
    }
}

/// Every field map extraction needs, built once per run and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct ConcordanceMaps {
    header: FieldMap,
    signature: FieldMap,
    summary: FieldMap,
}

impl ConcordanceMaps {
    /// Resolve all filing field groups against `concordance`.
    #[must_use]
    pub fn build(concordance: &Concordance) -> Self {
        Self {
            header: concordance.resolve(FieldGroup::Header.variable_table()),
            signature: concordance.resolve(FieldGroup::Signature.variable_table()),
            summary: concordance.resolve(FieldGroup::Summary.variable_table()),
        }
    }

    #[must_use]
    pub fn group(&self, group: FieldGroup) -> &FieldMap {
        match group {
            FieldGroup::Header => &self.header,
            FieldGroup::Signature => &self.signature,
            FieldGroup::Summary => &self.summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concordance() -> Concordance {
        let csv = "\
variable_name,xpath,description
F9_00_ORG_EIN,/Return/ReturnHeader/Filer/EIN,EIN
F9_00_TAX_YEAR,/Return/ReturnHeader/TaxYr,Tax year
F9_00_TAX_YEAR,/Return/ReturnHeader/TaxYear,Tax year (2013)
";
        Concordance::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_resolve_preserves_candidate_order() {
        let map = concordance().resolve([("tax_year", "F9_00_TAX_YEAR")]);
        let raw: Vec<_> = map.candidates("tax_year").iter().map(|c| c.as_str()).collect();
        assert_eq!(raw, vec!["/Return/ReturnHeader/TaxYr", "/Return/ReturnHeader/TaxYear"]);
    }

    #[test]
    fn test_resolve_missing_variable_maps_to_empty() {
        let map = concordance().resolve([("ein", "F9_00_ORG_EIN"), ("website", "F9_00_ORG_WEBSITE")]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.candidates("ein").len(), 1);
        assert!(map.candidates("website").is_empty());
        assert!(map.candidates("not_a_column").is_empty());
    }

    #[test]
    fn test_build_covers_every_group_column() {
        let maps = ConcordanceMaps::build(&concordance());
        for group in FieldGroup::ALL {
            let columns: Vec<_> = maps.group(group).iter().map(|(c, _)| c).collect();
            let expected: Vec<_> = group.fields().iter().map(|f| f.column).collect();
            assert_eq!(columns, expected);
        }
    }

    #[test]
    fn test_candidate_path_local_name() {
        assert_eq!(
            CandidatePath::new("/Return/ReturnData/IRS990/WebsiteAddressTxt").local_name(),
            Some("WebsiteAddressTxt")
        );
        assert_eq!(
            CandidatePath::new("/Return/efile:ReturnData/efile:TaxYr[1]").local_name(),
            Some("TaxYr")
        );
        assert_eq!(CandidatePath::new("/Return/ReturnHeader/").local_name(), Some("ReturnHeader"));
        assert_eq!(CandidatePath::new("/Return/@returnVersion").local_name(), None);
        assert_eq!(CandidatePath::new("/Return/TaxYr/text()").local_name(), None);
    }

    #[test]
    fn test_candidate_path_keeps_uncompilable_expression() {
        let candidate = CandidatePath::new("/Return/ReturnHeader/TaxYr[");
        assert!(candidate.xpath().is_none());
        assert_eq!(candidate.local_name(), Some("TaxYr"));
    }
}
