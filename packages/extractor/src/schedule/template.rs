//! The fixed Schedule M layout.
//!
//! Schedule M Part I has 28 property-type lines. Each line is described by
//! a [`PropertyRow`]; extraction is driven generically over
//! [`PROPERTY_ROWS`].

use crate::coerce::FieldKind;

/// Top-level Schedule M element names across schema versions.
pub const SCHEDULE_CONTAINERS: &[&str] = &["IRS990ScheduleM", "ScheduleM"];

/// One sub-field of a property row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubField {
    /// Column (a): the line is checked.
    Checkbox,
    /// Column (b): number of contributions or items.
    Count,
    /// Column (c): revenue amount reported.
    Amount,
    /// Column (d): method of determining the amount.
    Method,
    /// Free-text description on the "other" lines.
    Description,
}

impl SubField {
    /// Sub-fields of a regular line.
    pub const STANDARD: &'static [SubField] =
        &[Self::Checkbox, Self::Count, Self::Amount, Self::Method];

    /// Sub-fields of an "other" line.
    pub const DESCRIBED: &'static [SubField] = &[
        Self::Checkbox,
        Self::Count,
        Self::Amount,
        Self::Method,
        Self::Description,
    ];

    /// Column name suffix.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Checkbox => "x",
            Self::Count => "count",
            Self::Amount => "amount",
            Self::Method => "method",
            Self::Description => "desc",
        }
    }

    /// Known element names, in preference order.
    #[must_use]
    pub fn names(self) -> &'static [&'static str] {
        match self {
            Self::Checkbox => &[
                "NoncashCheckboxInd",
                "NonCashCheckbox",
                "ContributionCheckInd",
                "Checkbox",
            ],
            Self::Count => &[
                "NoncashContributionsCnt",
                "NoncashContributions",
                "ContributionsItemsCnt",
                "NumberOfContributions",
            ],
            Self::Amount => &[
                "NoncashContributionsAmt",
                "NoncashContributions",
                "FairMarketValueAmt",
                "FMVReportedAmt",
                "NoncashContributionAmt",
            ],
            Self::Method => &[
                "MethodOfDeterminingAmt",
                "MethodOfDetermination",
                "MethodOfDeterminationDesc",
                "NoncashContributionMethod",
            ],
            Self::Description => &["Desc", "Description", "TypeDesc"],
        }
    }

    #[must_use]
    pub fn kind(self) -> FieldKind {
        match self {
            Self::Checkbox => FieldKind::Boolean,
            Self::Count | Self::Amount => FieldKind::Integer,
            Self::Method | Self::Description => FieldKind::Text,
        }
    }
}

/// One property-type line of Schedule M Part I.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyRow {
    /// Line number on the form, 1 through 28.
    pub line: u8,
    /// Output column prefix.
    pub prefix: &'static str,
    pub description: &'static str,
    /// Container element names, in preference order.
    pub containers: &'static [&'static str],
    /// Whether the line carries a free-text description.
    pub described: bool,
}

impl PropertyRow {
    const fn new(
        line: u8,
        prefix: &'static str,
        description: &'static str,
        containers: &'static [&'static str],
    ) -> Self {
        Self {
            line,
            prefix,
            description,
            containers,
            described: false,
        }
    }

    const fn other(
        line: u8,
        prefix: &'static str,
        description: &'static str,
        containers: &'static [&'static str],
    ) -> Self {
        Self {
            line,
            prefix,
            description,
            containers,
            described: true,
        }
    }

    #[must_use]
    pub fn sub_fields(&self) -> &'static [SubField] {
        if self.described {
            SubField::DESCRIBED
        } else {
            SubField::STANDARD
        }
    }

    /// Output column for one sub-field, e.g. `food_inventory_count`.
    #[must_use]
    pub fn column(&self, sub_field: SubField) -> String {
        format!("{}_{}", self.prefix, sub_field.suffix())
    }
}

pub const PROPERTY_ROWS: [PropertyRow; 28] = [
    PropertyRow::new(1, "art_works", "Art - Works of art", &["ArtWorksOfArt", "ArtWorksOfArtGrp"]),
    PropertyRow::new(
        2,
        "art_historical",
        "Art - Historical treasures",
        &["ArtHistoricalTreasures", "ArtHistoricalTreasuresGrp"],
    ),
    PropertyRow::new(
        3,
        "art_fractional",
        "Art - Fractional interests",
        &["ArtFractionalInterests", "ArtFractionalInterestsGrp"],
    ),
    PropertyRow::new(
        4,
        "books_publications",
        "Books and publications",
        &["BooksAndPublications", "BooksAndPublicationsGrp"],
    ),
    PropertyRow::new(
        5,
        "clothing_household",
        "Clothing and household goods",
        &["ClothingAndHouseholdGoods", "ClothingAndHouseholdGoodsGrp"],
    ),
    PropertyRow::new(
        6,
        "cars_vehicles",
        "Cars and other vehicles",
        &["CarsAndOtherVehicles", "CarsAndOtherVehiclesGrp"],
    ),
    PropertyRow::new(7, "boats_planes", "Boats and planes", &["BoatsAndPlanes", "BoatsAndPlanesGrp"]),
    PropertyRow::new(
        8,
        "intellectual_property",
        "Intellectual property",
        &["IntellectualProperty", "IntellectualPropertyGrp"],
    ),
    PropertyRow::new(
        9,
        "securities_publicly_traded",
        "Securities - Publicly traded",
        &["SecuritiesPubliclyTraded", "SecuritiesPubliclyTradedGrp"],
    ),
    PropertyRow::new(
        10,
        "securities_closely_held",
        "Securities - Closely held stock",
        &["SecuritiesCloselyHeldStock", "SecuritiesCloselyHeldStockGrp"],
    ),
    PropertyRow::new(
        11,
        "securities_partnership",
        "Securities - Partnership, LLC, or trust",
        &[
            "SecuritiesPartnership",
            "SecuritiesPartnershipGrp",
            "SecPrtnrshpTrustInterests",
            "SecPrtnrshpTrustInterestsGrp",
        ],
    ),
    PropertyRow::new(
        12,
        "securities_misc",
        "Securities - Miscellaneous",
        &["SecuritiesMiscellaneous", "SecuritiesMiscellaneousGrp"],
    ),
    PropertyRow::new(
        13,
        "conservation_historic",
        "Qualified conservation - Historic structures",
        &["QualifiedContribHistStruct", "QualifiedContribHistStructGrp"],
    ),
    PropertyRow::new(
        14,
        "conservation_other",
        "Qualified conservation - Other",
        &["QualifiedContribOther", "QualifiedContribOtherGrp"],
    ),
    PropertyRow::new(
        15,
        "real_estate_residential",
        "Real estate - Residential",
        &["RealEstateResidential", "RealEstateResidentialGrp"],
    ),
    PropertyRow::new(
        16,
        "real_estate_commercial",
        "Real estate - Commercial",
        &["RealEstateCommercial", "RealEstateCommercialGrp"],
    ),
    PropertyRow::new(
        17,
        "real_estate_other",
        "Real estate - Other",
        &["RealEstateOther", "RealEstateOtherGrp"],
    ),
    PropertyRow::new(18, "collectibles", "Collectibles", &["Collectibles", "CollectiblesGrp"]),
    PropertyRow::new(19, "food_inventory", "Food inventory", &["FoodInventory", "FoodInventoryGrp"]),
    PropertyRow::new(
        20,
        "drugs_medical",
        "Drugs and medical supplies",
        &["DrugsAndMedicalSupplies", "DrugsAndMedicalSuppliesGrp"],
    ),
    PropertyRow::new(21, "taxidermy", "Taxidermy", &["Taxidermy", "TaxidermyGrp"]),
    PropertyRow::new(
        22,
        "historical_artifacts",
        "Historical artifacts",
        &["HistoricalArtifacts", "HistoricalArtifactsGrp"],
    ),
    PropertyRow::new(
        23,
        "scientific_specimens",
        "Scientific specimens",
        &["ScientificSpecimens", "ScientificSpecimensGrp"],
    ),
    PropertyRow::new(
        24,
        "archaeological_artifacts",
        "Archeological artifacts",
        &["ArcheologicalArtifacts", "ArcheologicalArtifactsGrp"],
    ),
    PropertyRow::other(25, "other_1", "Other (1)", &["OtherNoncashContri25", "OtherNoncashContriTable25Grp"]),
    PropertyRow::other(26, "other_2", "Other (2)", &["OtherNoncashContri26", "OtherNoncashContriTable26Grp"]),
    PropertyRow::other(27, "other_3", "Other (3)", &["OtherNoncashContri27", "OtherNoncashContriTable27Grp"]),
    PropertyRow::other(28, "other_4", "Other (4)", &["OtherNoncashContri28", "OtherNoncashContriTable28Grp"]),
];

/// A document-level Schedule M question (lines 29-32).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleQuestion {
    pub column: &'static str,
    pub names: &'static [&'static str],
    pub kind: FieldKind,
}

pub const SCHEDULE_QUESTIONS: &[ScheduleQuestion] = &[
    ScheduleQuestion {
        column: "num_forms_8283",
        names: &[
            "NumberOf8283Received",
            "NumberOf8283ReceivedCnt",
            "Form8283ReceivedCnt",
        ],
        kind: FieldKind::Integer,
    },
    ScheduleQuestion {
        column: "hold_3_years_required",
        names: &[
            "AnyPropertyThatMustBeHeldInd",
            "AnyPropertyThatMustBeHeld",
            "PropertyMustBeHeldInd",
        ],
        kind: FieldKind::Boolean,
    },
    ScheduleQuestion {
        column: "gift_acceptance_policy",
        names: &[
            "ReviewProcessUnusualNCGiftsInd",
            "ReviewProcessUnusualNCGifts",
            "GiftAcceptancePolicyInd",
        ],
        kind: FieldKind::Boolean,
    },
    ScheduleQuestion {
        column: "uses_third_parties",
        names: &[
            "ThirdPartiesUsedInd",
            "ThirdPartiesUsed",
            "HireOrUseThirdPartiesInd",
        ],
        kind: FieldKind::Boolean,
    },
];

/// All Schedule M output columns, in record order.
#[must_use]
pub fn schedule_columns() -> Vec<String> {
    let mut columns = vec![
        "object_id".to_string(),
        "ein".to_string(),
        "tax_year".to_string(),
    ];
    for row in &PROPERTY_ROWS {
        columns.extend(row.sub_fields().iter().map(|&sub| row.column(sub)));
    }
    columns.extend(SCHEDULE_QUESTIONS.iter().map(|q| q.column.to_string()));
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rows_numbered_in_order() {
        for (idx, row) in PROPERTY_ROWS.iter().enumerate() {
            assert_eq!(usize::from(row.line), idx + 1, "row {}", row.prefix);
            assert!(!row.containers.is_empty());
        }
    }

    #[test]
    fn test_only_other_rows_are_described() {
        let described: Vec<_> = PROPERTY_ROWS
            .iter()
            .filter(|r| r.described)
            .map(|r| r.line)
            .collect();
        assert_eq!(described, vec![25, 26, 27, 28]);
    }

    #[test]
    fn test_schedule_columns() {
        let columns = schedule_columns();
        assert_eq!(columns.len(), 3 + 24 * 4 + 4 * 5 + 4);
        assert_eq!(&columns[..4], &["object_id", "ein", "tax_year", "art_works_x"]);
        assert_eq!(columns.last().map(String::as_str), Some("uses_third_parties"));
        assert!(columns.contains(&"other_4_desc".to_string()));
        assert!(!columns.contains(&"food_inventory_desc".to_string()));

        let unique: HashSet<_> = columns.iter().collect();
        assert_eq!(unique.len(), columns.len());
    }
}
