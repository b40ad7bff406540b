use feed_model::{
    Condition, FieldRef, Mapping, MappingKind, MappingSet, ModelError, Operator, Record,
};

#[test]
fn mapping_rejects_empty_target() {
    let err = Mapping::rename("  ", "sku").unwrap_err();
    assert_eq!(err, ModelError::EmptyTargetField);
}

#[test]
fn mapping_rejects_empty_rename_source() {
    let err = Mapping::rename("id", "").unwrap_err();
    assert!(matches!(err, ModelError::EmptySourceField { .. }));
}

#[test]
fn mapping_rejects_blank_combine_field() {
    let err = Mapping::combine("title", ["brand", " "], " ").unwrap_err();
    assert_eq!(
        err,
        ModelError::EmptyCombineField {
            target: "title".to_string(),
            index: 1
        }
    );
}

#[test]
fn mapping_allows_combine_without_fields() {
    let mapping = Mapping::combine("title", Vec::<FieldRef>::new(), "-").unwrap();
    assert!(matches!(mapping.kind(), MappingKind::Combine { fields, .. } if fields.is_empty()));
}

#[test]
fn mapping_rejects_condition_without_field() {
    let err = Mapping::builder("id")
        .rename("sku")
        .only_if("", Operator::EqualTo, "x")
        .build()
        .unwrap_err();
    assert!(matches!(err, ModelError::EmptyConditionField { .. }));
}

#[test]
fn mapping_rejects_targets_that_are_not_element_names() {
    let err = Mapping::static_value("my field", "x").unwrap_err();
    assert_eq!(err, ModelError::InvalidTargetField("my field".to_string()));
    assert!(Mapping::static_value(" brand ", "Acme").is_err());
    assert!(Mapping::rename("1st", "sku").is_err());
    assert!(Mapping::builder("a<b").empty().build().is_err());
}

#[test]
fn mapping_keeps_field_names_verbatim() {
    let mapping = Mapping::builder("g:price")
        .rename(" price ")
        .only_if(" stock ", Operator::NotEqualTo, "0")
        .build()
        .unwrap();
    assert_eq!(mapping.target_field(), "g:price");
    assert_eq!(mapping.kind().source_fields(), vec![" price "]);
}

#[test]
fn invalid_target_fails_to_deserialize() {
    let json = r#"{ "targetField": "my field", "type": "static", "value": "x" }"#;
    assert!(serde_json::from_str::<Mapping>(json).is_err());
}

#[test]
fn builder_assembles_combine_incrementally() {
    let mapping = Mapping::builder("title")
        .separator(" - ")
        .combine_field("brand")
        .combine_field("name")
        .combine_field("color")
        .remove_combine_field("name")
        .build()
        .unwrap();
    assert_eq!(
        mapping.kind(),
        &MappingKind::Combine {
            fields: vec![FieldRef::from("brand"), FieldRef::from("color")],
            separator: " - ".to_string(),
        }
    );
    assert!(mapping.condition().is_all());
}

#[test]
fn mapping_set_replaces_same_target_in_place() {
    let mut set = MappingSet::new();
    set.insert(Mapping::rename("id", "sku").unwrap());
    set.insert(Mapping::rename("title", "name").unwrap());
    let replaced = set.insert(Mapping::static_value("id", "X").unwrap());

    assert_eq!(replaced, Some(Mapping::rename("id", "sku").unwrap()));
    assert_eq!(set.len(), 2);
    let targets: Vec<&str> = set.target_fields().collect();
    assert_eq!(targets, vec!["id", "title"]);
    assert!(matches!(set.get("id").unwrap().kind(), MappingKind::Static { .. }));
}

#[test]
fn mapping_set_remove() {
    let mut set: MappingSet = vec![
        Mapping::rename("id", "sku").unwrap(),
        Mapping::empty("brand").unwrap(),
    ]
    .into();
    assert!(set.remove("brand").is_some());
    assert!(set.remove("brand").is_none());
    assert_eq!(set.len(), 1);
}

#[test]
fn mapping_serializes_flat() {
    let mapping = Mapping::builder("title")
        .rename("name")
        .only_if("status", Operator::EqualTo, "active")
        .build()
        .unwrap();
    let json = serde_json::to_value(&mapping).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "targetField": "title",
            "type": "rename",
            "sourceField": "name",
            "condition": {
                "onlyIf": { "field": "status", "operator": "equalTo", "value": "active" }
            }
        })
    );
}

#[test]
fn mapping_set_deserializes_from_json_with_labels() {
    let json = r#"[
        { "targetField": "id", "type": "rename", "sourceField": "sku" },
        { "targetField": "title", "type": "combine",
          "fields": ["brand", { "value": "name", "label": "Name" }], "separator": " " },
        { "targetField": "brand", "type": "static", "value": "Acme",
          "condition": { "onlyIf": { "field": "brand", "operator": "doesn't include", "value": "x" } } },
        { "targetField": "gtin", "type": "empty", "condition": "all" },
        { "targetField": "id", "type": "rename", "sourceField": "code" }
    ]"#;
    let set: MappingSet = serde_json::from_str(json).unwrap();
    assert_eq!(set.len(), 4);
    assert_eq!(
        set.get("id").unwrap().kind(),
        &MappingKind::Rename {
            source_field: "code".to_string()
        }
    );
    assert_eq!(
        set.get("brand").unwrap().condition(),
        &Condition::only_if("brand", Operator::ExcludesSubstring, "x")
    );
    assert_eq!(set.get("title").unwrap().kind().source_fields(), vec!["brand", "name"]);
}

#[test]
fn invalid_mapping_fails_to_deserialize() {
    let json = r#"{ "targetField": "", "type": "empty" }"#;
    assert!(serde_json::from_str::<Mapping>(json).is_err());
}

#[test]
fn mapping_set_deserializes_from_toml() {
    #[derive(serde::Deserialize)]
    struct File {
        mapping: MappingSet,
    }

    let text = r#"
[[mapping]]
targetField = "id"
type = "rename"
sourceField = "sku"

[[mapping]]
targetField = "availability"
type = "static"
value = "in stock"

[mapping.condition.onlyIf]
field = "stock"
operator = "notEqualTo"
value = "0"
"#;
    let file: File = toml::from_str(text).unwrap();
    assert_eq!(file.mapping.len(), 2);
    assert_eq!(
        file.mapping.get("availability").unwrap().condition(),
        &Condition::only_if("stock", Operator::NotEqualTo, "0")
    );
}

#[test]
fn operator_parses_labels() {
    assert_eq!("is equal to".parse::<Operator>().unwrap(), Operator::EqualTo);
    assert_eq!("doesn't include".parse::<Operator>().unwrap(), Operator::ExcludesSubstring);
    assert!("matches".parse::<Operator>().is_err());
}

#[test]
fn operators_are_case_sensitive() {
    assert!(!Operator::EqualTo.evaluate("Active", "active"));
    assert!(Operator::Includes.evaluate("Red Shoe", "Shoe"));
    assert!(!Operator::Includes.evaluate("Red Shoe", "shoe"));
    assert!(Operator::ExcludesSubstring.evaluate("Red Shoe", "shoe"));
    assert!(Operator::NotEqualTo.evaluate("", "x"));
}

#[test]
fn record_keeps_insertion_order() {
    let mut record = Record::from_iter([("title", "Shoe"), ("id", "1")]);
    assert_eq!(record.insert("title", "Boot"), Some("Shoe".to_string()));
    record.insert("brand", "Acme");
    assert_eq!(
        record.iter().collect::<Vec<_>>(),
        vec![("title", "Boot"), ("id", "1"), ("brand", "Acme")]
    );
    assert_eq!(
        serde_json::to_string(&record).unwrap(),
        r#"{"title":"Boot","id":"1","brand":"Acme"}"#
    );
    let back: Record = serde_json::from_str(r#"{"b":"2","a":"1"}"#).unwrap();
    assert_eq!(back.field_names().collect::<Vec<_>>(), vec!["b", "a"]);
}

#[test]
fn record_equality_ignores_field_order() {
    let a = Record::from_iter([("id", "1"), ("title", "Shoe")]);
    let b = Record::from_iter([("title", "Shoe"), ("id", "1")]);
    assert_eq!(a, b);
    assert_ne!(a, Record::from_iter([("id", "1")]));
}

#[test]
fn record_value_or_empty() {
    let record = Record::from_iter([("sku", "1"), ("color", "")]);
    assert_eq!(record.value_or_empty("sku"), "1");
    assert_eq!(record.value_or_empty("missing"), "");
    assert!(record.contains("color"));
    assert!(!record.has_value("color"));
}
