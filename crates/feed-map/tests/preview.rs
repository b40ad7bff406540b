use feed_map::{PreviewPage, build_preview};
use feed_model::{Condition, Mapping, MappingSet, Operator, Record};

fn records() -> Vec<Record> {
    (1..=7)
        .map(|i| {
            let mut record = Record::new();
            record.insert("sku", format!("P{i}"));
            record.insert("title", format!("Item {i}"));
            if i % 2 == 0 {
                record.insert("color", "Red");
            }
            record
        })
        .collect()
}

fn mappings() -> MappingSet {
    vec![
        Mapping::rename("color", "color")
            .unwrap()
            .with_condition(Condition::only_if("title", Operator::ExcludesSubstring, "4"))
            .unwrap(),
    ]
    .into()
}

#[test]
fn rows_pair_original_and_mapped_values() {
    let rows = build_preview(&records(), &mappings(), "color").unwrap();
    assert_eq!(rows.len(), 7);

    assert_eq!(rows[0].record_id, "P1");
    assert_eq!(rows[0].record_label, "Item 1");
    assert_eq!(rows[0].target_field, "color");
    assert_eq!(rows[0].original_value, None);
    assert_eq!(rows[0].mapped_value, None);

    assert_eq!(rows[1].original_value.as_deref(), Some("Red"));
    assert_eq!(rows[1].mapped_value.as_deref(), Some("Red"));

    // excluded by the condition
    assert_eq!(rows[3].original_value.as_deref(), Some("Red"));
    assert_eq!(rows[3].mapped_value, None);
}

#[test]
fn identity_fields_follow_document_order() {
    let records: Vec<Record> = vec![
        [("sku", "1"), ("title", "Shoe"), ("brand_name", "Acme")]
            .into_iter()
            .collect(),
    ];
    let rows = build_preview(&records, &MappingSet::new(), "title").unwrap();
    assert_eq!(rows[0].record_id, "1");
    assert_eq!(rows[0].record_label, "Shoe");
}

#[test]
fn records_without_identity_fields_get_placeholders() {
    let records: Vec<Record> = vec![[("color", "Red")].into_iter().collect(), Record::new()];
    let rows = build_preview(&records, &MappingSet::new(), "color").unwrap();
    assert_eq!(rows[0].record_id, "ITEM_1");
    assert_eq!(rows[1].record_id, "ITEM_2");
    assert_eq!(rows[1].record_label, "Product");
}

#[test]
fn preview_of_empty_feed_is_empty() {
    let rows = build_preview(&[], &mappings(), "color").unwrap();
    assert!(rows.is_empty());
    assert_eq!(PreviewPage::from(rows).total_pages(), 1);
}

#[test]
fn preview_pages_hold_five_rows() {
    let rows = build_preview(&records(), &mappings(), "color").unwrap();
    let pages = PreviewPage::from(rows);
    assert_eq!(pages.page_size(), 5);
    assert_eq!(pages.total_pages(), 2);
    assert_eq!(pages.page(2)[0].record_id, "P6");
}

#[test]
fn rows_serialize_camel_case() {
    let rows = build_preview(&records()[..1], &MappingSet::new(), "title").unwrap();
    let json = serde_json::to_value(&rows[0]).unwrap();
    assert_eq!(json["recordId"], "P1");
    assert_eq!(json["originalValue"], "Item 1");
    assert!(json["mappedValue"].is_null());
}
