//! Filing Extractor: one normalized [`FilingRecord`] per e-file document.
//!
//! The header, signature and summary groups are resolved through the
//! concordance maps; the EIN fallback, the noncash total and the
//! Schedule M indicator use fixed element names.

use roxmltree::{Document, Node};

use crate::coerce::{normalize_ein, to_bool, to_int};
use crate::concordance::{ConcordanceMaps, FieldGroup};
use crate::resolver::FieldResolver;
use crate::types::{FieldValue, FilingRecord, Record};
use crate::xml::{find_child, find_descendant, find_descendants, find_text, get_text, NameMatch};

/// Form type written to every filing record.
pub const FORM_TYPE: &str = "990";

/// Container that holds the substantive return content.
const RETURN_DATA: &str = "ReturnData";

/// Part VIII line 1g, across schema versions.
const NONCASH_TOTAL_NAMES: &[&str] = &[
    "NoncashContributionsAmt",
    "NoncashContributions",
    "AllOtherContributionsAmt",
];

/// Part IV indicators that a Schedule M is attached.
const SCHEDULE_M_INDICATOR_NAMES: &[&str] = &[
    "NoncashContributionsInd",
    "MoreThan25KNoncashInd",
    "ArtHistTreasuresContribInd",
    "MoreThan25000",
    "ArtHistTreasuresContrib",
];

/// All filing output columns, in record order.
#[must_use]
pub fn filing_columns() -> Vec<&'static str> {
    let mut columns = vec!["object_id", "form_type"];
    for group in FieldGroup::ALL {
        columns.extend(group.fields().iter().map(|f| f.column));
    }
    columns.push("noncash_contributions_total");
    columns.push("has_schedule_m");
    columns
}

/// Extracts filing records using a prebuilt set of concordance maps.
#[derive(Debug)]
pub struct FilingExtractor<'m> {
    maps: &'m ConcordanceMaps,
    resolver: FieldResolver,
}

impl<'m> FilingExtractor<'m> {
    /// Create an extractor with the standard resolver chain.
    #[must_use]
    pub fn new(maps: &'m ConcordanceMaps) -> Self {
        Self {
            maps,
            resolver: FieldResolver::standard(),
        }
    }

    /// Replace the resolver chain.
    #[must_use]
    pub fn with_resolver(mut self, resolver: FieldResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Parse `xml` and extract its filing record.
    ///
    /// Returns `None` only when the document is not well-formed XML.
    pub fn extract(&self, xml: &str, object_id: &str) -> Option<FilingRecord> {
        match Document::parse(xml) {
            Ok(doc) => Some(self.extract_document(&doc, object_id)),
            Err(e) => {
                tracing::warn!(object_id, error = %e, "failed to parse XML");
                None
            }
        }
    }

    /// Extract the filing record of an already parsed document.
    pub fn extract_document(&self, doc: &Document<'_>, object_id: &str) -> FilingRecord {
        let root = doc.root_element();
        let scope = find_descendant(root, RETURN_DATA, NameMatch::Exact).unwrap_or(root);

        let mut record = Record::with_columns(filing_columns());
        record.set("object_id", object_id);
        record.set("form_type", FORM_TYPE);

        for group in FieldGroup::ALL {
            let map = self.maps.group(group);
            for field in group.fields() {
                let raw = self.resolver.resolve(scope, map.candidates(field.column));
                let value: FieldValue = if field.column == "ein" {
                    raw.as_deref().and_then(normalize_ein).into()
                } else {
                    field.kind.apply(raw.as_deref())
                };
                record.set(field.column, value);
            }
        }

        if matches!(record.get("ein"), None | Some(FieldValue::Null)) {
            if let Some(ein) = fallback_ein(root) {
                tracing::debug!(object_id, ein = %ein, "EIN taken from filer element");
                record.set("ein", ein);
            }
        }

        let noncash = find_text(scope, NONCASH_TOTAL_NAMES, NameMatch::Exact);
        record.set("noncash_contributions_total", to_int(noncash.as_deref()));

        let indicator = SCHEDULE_M_INDICATOR_NAMES
            .iter()
            .filter_map(|name| find_text(scope, &[*name], NameMatch::Exact))
            .find(|text| !text.is_empty());
        record.set("has_schedule_m", to_bool(indicator.as_deref()));

        FilingRecord::new(record)
    }
}

/// Search the whole document for the filer's EIN, then for any EIN.
fn fallback_ein(root: Node<'_, '_>) -> Option<String> {
    let filer_ein = find_descendants(root, "Filer", NameMatch::Exact)
        .filter_map(|filer| find_child(filer, "EIN"))
        .map(get_text)
        .find(|text| !text.is_empty());

    filer_ein
        .or_else(|| {
            find_descendants(root, "EIN", NameMatch::Exact)
                .map(get_text)
                .find(|text| !text.is_empty())
        })
        .and_then(|raw| normalize_ein(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concordance::Concordance;

    const CONCORDANCE: &str = "\
variable_name,xpath,description
F9_00_ORG_NAME_L1,/Return/ReturnHeader/Filer/BusinessName/BusinessNameLine1Txt,Name
F9_00_ORG_EIN,/Return/ReturnHeader/Filer/EIN,EIN
F9_00_TAX_YEAR,/Return/ReturnHeader/TaxYr,Tax year
F9_00_TAX_PERIOD_BEGIN_DATE,/Return/ReturnHeader/TaxPeriodBeginDt,Begin
F9_01_ACT_GVRN_EMPL_TOT,/Return/ReturnData/IRS990/TotalEmployeeCnt,Employees
F9_01_REV_TOT_CY,/Return/ReturnData/IRS990/CYTotalRevenueAmt,Revenue
";

    fn maps() -> ConcordanceMaps {
        ConcordanceMaps::build(&Concordance::from_reader(CONCORDANCE.as_bytes()).unwrap())
    }

    #[test]
    fn test_filing_columns_order() {
        let columns = filing_columns();
        assert_eq!(columns[0], "object_id");
        assert_eq!(columns[1], "form_type");
        assert_eq!(columns[2], "org_name");
        assert_eq!(columns[columns.len() - 2], "noncash_contributions_total");
        assert_eq!(columns[columns.len() - 1], "has_schedule_m");
        assert_eq!(columns.len(), 2 + 12 + 3 + 22 + 2);
    }

    #[test]
    fn test_extract_typed_fields() {
        let xml = r#"<Return xmlns="http://www.irs.gov/efile">
            <ReturnHeader>
                <TaxPeriodBeginDt>20220101</TaxPeriodBeginDt>
                <TaxYr>2022</TaxYr>
                <Filer><EIN>12345678</EIN><BusinessName><BusinessNameLine1Txt>ACME</BusinessNameLine1Txt></BusinessName></Filer>
            </ReturnHeader>
            <ReturnData><IRS990>
                <TotalEmployeeCnt>1,045</TotalEmployeeCnt>
                <CYTotalRevenueAmt>6000000.00</CYTotalRevenueAmt>
            </IRS990></ReturnData>
        </Return>"#;
        let maps = maps();
        let filing = FilingExtractor::new(&maps).extract(xml, "OBJ").unwrap();

        assert_eq!(filing.object_id(), "OBJ");
        assert_eq!(filing.get("form_type"), Some(&FieldValue::text("990")));
        assert_eq!(filing.get("org_name"), Some(&FieldValue::text("ACME")));
        assert_eq!(filing.ein(), Some("012345678"));
        assert_eq!(filing.tax_year(), Some(2022));
        assert_eq!(
            filing.get("tax_period_begin"),
            Some(&FieldValue::text("2022-01-01"))
        );
        assert_eq!(filing.get("num_employees"), Some(&FieldValue::Integer(1045)));
        assert_eq!(filing.get("total_revenue_cy"), Some(&FieldValue::Integer(6_000_000)));
        assert_eq!(filing.get("website"), Some(&FieldValue::Null));
    }

    #[test]
    fn test_ein_fallback_without_concordance() {
        let xml = r#"<Return><ReturnHeader><Filer><EIN>5678</EIN></Filer></ReturnHeader><ReturnData/></Return>"#;
        let maps = ConcordanceMaps::default();
        let filing = FilingExtractor::new(&maps).extract(xml, "OBJ").unwrap();
        assert_eq!(filing.ein(), Some("000005678"));
    }

    #[test]
    fn test_ein_fallback_prefers_filer() {
        let xml = r#"<Return>
            <ReturnData><Preparer><EIN>111111111</EIN></Preparer></ReturnData>
            <ReturnHeader><Filer><EIN>222222222</EIN></Filer></ReturnHeader>
        </Return>"#;
        let maps = ConcordanceMaps::default();
        let filing = FilingExtractor::new(&maps).extract(xml, "OBJ").unwrap();
        assert_eq!(filing.ein(), Some("222222222"));
    }

    #[test]
    fn test_schedule_m_indicator_and_noncash_total() {
        let xml = r#"<Return><ReturnData><IRS990>
            <NoncashContributionsInd></NoncashContributionsInd>
            <MoreThan25KNoncashInd>X</MoreThan25KNoncashInd>
            <NoncashContributionsAmt>750,000</NoncashContributionsAmt>
        </IRS990></ReturnData></Return>"#;
        let maps = ConcordanceMaps::default();
        let filing = FilingExtractor::new(&maps).extract(xml, "OBJ").unwrap();
        assert_eq!(filing.get("has_schedule_m"), Some(&FieldValue::Boolean(true)));
        assert_eq!(
            filing.get("noncash_contributions_total"),
            Some(&FieldValue::Integer(750_000))
        );
    }

    #[test]
    fn test_missing_indicator_is_null() {
        let xml = r#"<Return><ReturnData><IRS990/></ReturnData></Return>"#;
        let maps = ConcordanceMaps::default();
        let filing = FilingExtractor::new(&maps).extract(xml, "OBJ").unwrap();
        assert_eq!(filing.get("has_schedule_m"), Some(&FieldValue::Null));
        assert_eq!(filing.get("noncash_contributions_total"), Some(&FieldValue::Null));
    }

    #[test]
    fn test_every_column_present() {
        let xml = r#"<Return/>"#;
        let maps = maps();
        let filing = FilingExtractor::new(&maps).extract(xml, "OBJ").unwrap();
        let columns: Vec<_> = filing.record().columns().collect();
        assert_eq!(columns, filing_columns());
    }

    #[test]
    fn test_malformed_document_is_absent() {
        let maps = maps();
        assert!(FilingExtractor::new(&maps).extract("<Return><Open>", "OBJ").is_none());
    }
}
