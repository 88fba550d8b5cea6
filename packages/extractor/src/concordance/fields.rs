//! Output column tables for the filing record.
//!
//! Each table maps one of our stable output columns to the concordance
//! variable that locates it, plus the coercion applied to the raw text.

use crate::coerce::FieldKind;

/// One output column backed by a concordance variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub column: &'static str,
    pub variable: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn text(column: &'static str, variable: &'static str) -> Self {
        Self {
            column,
            variable,
            kind: FieldKind::Text,
        }
    }

    const fn int(column: &'static str, variable: &'static str) -> Self {
        Self {
            column,
            variable,
            kind: FieldKind::Integer,
        }
    }

    const fn date(column: &'static str, variable: &'static str) -> Self {
        Self {
            column,
            variable,
            kind: FieldKind::Date,
        }
    }
}

/// Header / identity fields (Part 00).
pub const HEADER_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("org_name", "F9_00_ORG_NAME_L1"),
    FieldSpec::text("org_city", "F9_00_ORG_ADDR_CITY"),
    FieldSpec::text("org_state", "F9_00_ORG_ADDR_STATE"),
    FieldSpec::text("org_zip", "F9_00_ORG_ADDR_ZIP"),
    FieldSpec::text("org_phone", "F9_00_ORG_PHONE"),
    FieldSpec::text("website", "F9_00_ORG_WEBSITE"),
    FieldSpec::text("principal_officer_name", "F9_00_PRIN_OFF_NAME_PERS"),
    FieldSpec::text("ein", "F9_00_ORG_EIN"),
    FieldSpec::int("tax_year", "F9_00_TAX_YEAR"),
    FieldSpec::date("tax_period_begin", "F9_00_TAX_PERIOD_BEGIN_DATE"),
    FieldSpec::date("tax_period_end", "F9_00_TAX_PERIOD_END_DATE"),
    FieldSpec::int("year_formation", "F9_00_YEAR_FORMATION"),
];

/// Signature block (Part 02).
pub const SIGNATURE_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("signing_officer_name", "F9_02_SIGNING_OFF_NAME"),
    FieldSpec::text("signing_officer_title", "F9_02_SIGNING_OFF_TITLE"),
    FieldSpec::text("signing_officer_phone", "F9_02_SIGNING_OFF_PHONE"),
];

/// Part I summary: mission, governance counts and financial totals.
pub const SUMMARY_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("mission", "F9_03_ORG_MISSION_PURPOSE"),
    FieldSpec::int("num_voting_members", "F9_01_ACT_GVRN_NUM_VOTE_MEMB"),
    FieldSpec::int("num_voting_members_independent", "F9_01_ACT_GVRN_NUM_VOTE_MEMB_IND"),
    FieldSpec::int("num_employees", "F9_01_ACT_GVRN_EMPL_TOT"),
    FieldSpec::int("num_volunteers", "F9_01_ACT_GVRN_VOL_TOT"),
    FieldSpec::int("contributions_grants_cy", "F9_01_REV_CONTR_TOT_CY"),
    FieldSpec::int("program_service_revenue_cy", "F9_01_REV_PROG_TOT_CY"),
    FieldSpec::int("investment_income_cy", "F9_01_REV_INVEST_TOT_CY"),
    FieldSpec::int("other_revenue_cy", "F9_01_REV_OTH_CY"),
    FieldSpec::int("total_revenue_cy", "F9_01_REV_TOT_CY"),
    FieldSpec::int("total_revenue_py", "F9_01_REV_TOT_PY"),
    FieldSpec::int("grants_similar_cy", "F9_01_EXP_GRANT_SIMILAR_CY"),
    FieldSpec::int("salaries_cy", "F9_01_EXP_SAL_ETC_CY"),
    FieldSpec::int("total_expenses_cy", "F9_01_EXP_TOT_CY"),
    FieldSpec::int("total_expenses_py", "F9_01_EXP_TOT_PY"),
    FieldSpec::int("revenue_less_expenses_cy", "F9_01_EXP_REV_LESS_EXP_CY"),
    FieldSpec::int("total_assets_boy", "F9_01_NAFB_ASSET_TOT_BOY"),
    FieldSpec::int("total_assets_eoy", "F9_01_NAFB_ASSET_TOT_EOY"),
    FieldSpec::int("total_liabilities_boy", "F9_01_NAFB_LIAB_TOT_BOY"),
    FieldSpec::int("total_liabilities_eoy", "F9_01_NAFB_LIAB_TOT_EOY"),
    FieldSpec::int("net_assets_boy", "F9_01_NAFB_TOT_BOY"),
    FieldSpec::int("net_assets_eoy", "F9_01_NAFB_TOT_EOY"),
];

/// The concordance-driven field groups of a filing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldGroup {
    Header,
    Signature,
    Summary,
}

impl FieldGroup {
    /// All groups in output order.
    pub const ALL: [FieldGroup; 3] = [Self::Header, Self::Signature, Self::Summary];

    #[must_use]
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            Self::Header => HEADER_FIELDS,
            Self::Signature => SIGNATURE_FIELDS,
            Self::Summary => SUMMARY_FIELDS,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Signature => "signature",
            Self::Summary => "summary",
        }
    }

    /// `(column, variable)` pairs for concordance resolution.
    pub fn variable_table(self) -> impl Iterator<Item = (&'static str, &'static str)> {
        self.fields().iter().map(|f| (f.column, f.variable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_columns_unique_across_groups() {
        let mut seen = HashSet::new();
        for group in FieldGroup::ALL {
            for field in group.fields() {
                assert!(seen.insert(field.column), "duplicate column {}", field.column);
            }
        }
        assert_eq!(seen.len(), 12 + 3 + 22);
    }

    #[test]
    fn test_summary_kinds() {
        let text_columns: Vec<_> = SUMMARY_FIELDS
            .iter()
            .filter(|f| f.kind == FieldKind::Text)
            .map(|f| f.column)
            .collect();
        assert_eq!(text_columns, vec!["mission"]);
    }

    #[test]
    fn test_variable_table() {
        let table: Vec<_> = FieldGroup::Signature.variable_table().collect();
        assert_eq!(table[0], ("signing_officer_name", "F9_02_SIGNING_OFF_NAME"));
        assert_eq!(table.len(), 3);
    }
}
