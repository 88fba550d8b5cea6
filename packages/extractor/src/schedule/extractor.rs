//! Schedule Extractor.

use roxmltree::{Document, Node};

use super::template::{
    schedule_columns, PropertyRow, PROPERTY_ROWS, SCHEDULE_CONTAINERS, SCHEDULE_QUESTIONS,
};
use crate::types::{FieldValue, Record, ScheduleRecord};
use crate::xml::{find_first_of, find_text, NameMatch};

/// Extract the Schedule M record of a parsed document.
///
/// Returns `None` when the document has no Schedule M, which is the common
/// case. `ein` and `tax_year` come from the filing record of the same
/// document.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use irs990_extractor::schedule::extract_schedule;
///
/// let doc = Document::parse("<Return><ReturnData><IRS990/></ReturnData></Return>").unwrap();
/// assert!(extract_schedule(&doc, "OBJ", Some("123456789"), Some(2022)).is_none());
/// ```
pub fn extract_schedule(
    doc: &Document<'_>,
    object_id: &str,
    ein: Option<&str>,
    tax_year: Option<i64>,
) -> Option<ScheduleRecord> {
    let schedule = find_first_of(doc.root(), SCHEDULE_CONTAINERS, NameMatch::Exact)?;

    let mut record = Record::with_columns(schedule_columns());
    record.set("object_id", object_id);
    record.set("ein", ein.unwrap_or_default());
    record.set("tax_year", tax_year);

    for row in &PROPERTY_ROWS {
        for (column, value) in extract_row(schedule, row, object_id) {
            record.set(&column, value);
        }
    }

    for question in SCHEDULE_QUESTIONS {
        let raw = find_text(schedule, question.names, NameMatch::IgnoreCase);
        record.set(question.column, question.kind.apply(raw.as_deref()));
    }

    Some(ScheduleRecord::new(record))
}

/// Resolve every sub-field of one row, or none of them.
///
/// A row whose container is missing, or whose container lacks any
/// sub-field, comes back entirely null.
fn extract_row(
    schedule: Node<'_, '_>,
    row: &PropertyRow,
    object_id: &str,
) -> Vec<(String, FieldValue)> {
    let sub_fields = row.sub_fields();
    let null_row = || -> Vec<(String, FieldValue)> {
        sub_fields
            .iter()
            .map(|&sub| (row.column(sub), FieldValue::Null))
            .collect()
    };

    let Some(container) = find_first_of(schedule, row.containers, NameMatch::IgnoreCase) else {
        return null_row();
    };

    let values: Vec<(String, FieldValue)> = sub_fields
        .iter()
        .map(|&sub| {
            let raw = find_text(container, sub.names(), NameMatch::IgnoreCase);
            (row.column(sub), sub.kind().apply(raw.as_deref()))
        })
        .collect();

    if let Some((column, _)) = values.iter().find(|(_, value)| value.is_null()) {
        tracing::debug!(
            object_id,
            line = row.line,
            missing = %column,
            "incomplete Schedule M row left empty"
        );
        return null_row();
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(body: &str) -> String {
        format!(
            r#"<Return xmlns="http://www.irs.gov/efile"><ReturnData><IRS990ScheduleM>{body}</IRS990ScheduleM></ReturnData></Return>"#
        )
    }

    fn extract(xml: &str) -> ScheduleRecord {
        let doc = Document::parse(xml).unwrap();
        extract_schedule(&doc, "OBJ", Some("123456789"), Some(2022)).unwrap()
    }

    #[test]
    fn test_food_inventory_row() {
        let xml = schedule(
            "<FoodInventoryGrp>
                <NoncashCheckboxInd>X</NoncashCheckboxInd>
                <ContributionsItemsCnt>350</ContributionsItemsCnt>
                <NoncashContributionsAmt>750000</NoncashContributionsAmt>
                <MethodOfDeterminingAmt>Cost</MethodOfDeterminingAmt>
            </FoodInventoryGrp>",
        );
        let record = extract(&xml);
        assert_eq!(record.get("food_inventory_x"), Some(&FieldValue::Boolean(true)));
        assert_eq!(record.get("food_inventory_count"), Some(&FieldValue::Integer(350)));
        assert_eq!(
            record.get("food_inventory_amount"),
            Some(&FieldValue::Integer(750_000))
        );
        assert_eq!(record.get("food_inventory_method"), Some(&FieldValue::text("Cost")));
    }

    #[test]
    fn test_absent_rows_are_null_not_omitted() {
        let record = extract(&schedule(""));
        for column in ["art_works_x", "art_works_method", "other_1_desc"] {
            assert_eq!(record.get(column), Some(&FieldValue::Null), "{column}");
        }
        let columns: Vec<_> = record.record().columns().map(str::to_string).collect();
        assert_eq!(columns, schedule_columns());
    }

    #[test]
    fn test_partial_row_is_null_filled() {
        let xml = schedule(
            "<BooksAndPublicationsGrp>
                <NoncashCheckboxInd>X</NoncashCheckboxInd>
                <NoncashContributionsAmt>1200</NoncashContributionsAmt>
            </BooksAndPublicationsGrp>",
        );
        let record = extract(&xml);
        for sub in ["x", "count", "amount", "method"] {
            let column = format!("books_publications_{sub}");
            assert_eq!(record.get(&column), Some(&FieldValue::Null), "{column}");
        }
    }

    #[test]
    fn test_other_row_requires_description() {
        let row = "<NoncashCheckboxInd>X</NoncashCheckboxInd>
            <NoncashContributionsCnt>2</NoncashContributionsCnt>
            <NoncashContributionsAmt>500</NoncashContributionsAmt>
            <MethodOfDeterminingAmt>Appraisal</MethodOfDeterminingAmt>";

        let undescribed = extract(&schedule(&format!(
            "<OtherNoncashContriTable25Grp>{row}</OtherNoncashContriTable25Grp>"
        )));
        assert_eq!(undescribed.get("other_1_amount"), Some(&FieldValue::Null));

        let described = extract(&schedule(&format!(
            "<OtherNoncashContriTable25Grp><Desc>Gift cards</Desc>{row}</OtherNoncashContriTable25Grp>"
        )));
        assert_eq!(described.get("other_1_desc"), Some(&FieldValue::text("Gift cards")));
        assert_eq!(described.get("other_1_count"), Some(&FieldValue::Integer(2)));
    }

    #[test]
    fn test_container_match_ignores_case() {
        let xml = schedule(
            "<foodinventorygrp>
                <noncashcheckboxind>x</noncashcheckboxind>
                <NONCASHCONTRIBUTIONSCNT>3</NONCASHCONTRIBUTIONSCNT>
                <FairMarketValueAmt>90</FairMarketValueAmt>
                <MethodOfDetermination>FMV</MethodOfDetermination>
            </foodinventorygrp>",
        );
        let record = extract(&xml);
        assert_eq!(record.get("food_inventory_x"), Some(&FieldValue::Boolean(true)));
        assert_eq!(record.get("food_inventory_count"), Some(&FieldValue::Integer(3)));
    }

    #[test]
    fn test_summary_questions() {
        let xml = schedule(
            "<Form8283ReceivedCnt>4</Form8283ReceivedCnt>
             <AnyPropertyThatMustBeHeldInd>0</AnyPropertyThatMustBeHeldInd>
             <ReviewProcessUnusualNCGiftsInd>true</ReviewProcessUnusualNCGiftsInd>
             <ThirdPartiesUsedInd></ThirdPartiesUsedInd>",
        );
        let record = extract(&xml);
        assert_eq!(record.get("num_forms_8283"), Some(&FieldValue::Integer(4)));
        assert_eq!(record.get("hold_3_years_required"), Some(&FieldValue::Boolean(false)));
        assert_eq!(record.get("gift_acceptance_policy"), Some(&FieldValue::Boolean(true)));
        // Present but blank is "no", not "unknown".
        assert_eq!(record.get("uses_third_parties"), Some(&FieldValue::Boolean(false)));
    }

    #[test]
    fn test_identity_columns() {
        let xml = schedule("");
        let doc = Document::parse(&xml).unwrap();
        let record = extract_schedule(&doc, "OBJ_2", None, None).unwrap();
        assert_eq!(record.object_id(), "OBJ_2");
        assert_eq!(record.get("ein"), Some(&FieldValue::text("")));
        assert_eq!(record.get("tax_year"), Some(&FieldValue::Null));
    }

    #[test]
    fn test_legacy_container_name() {
        let doc = Document::parse("<Return><ScheduleM><Taxidermy/></ScheduleM></Return>").unwrap();
        assert!(extract_schedule(&doc, "OBJ", None, None).is_some());
    }
}
