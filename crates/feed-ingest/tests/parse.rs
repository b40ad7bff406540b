use std::io::Write;

use feed_ingest::{IngestError, count_items, parse_feed, parse_feed_bytes, read_feed};

const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss>
  <channel>
    <item>
      <sku required="true" description="Stock keeping unit">1</sku>
      <name>Shoe</name>
      <color>Red</color>
    </item>
    <item>
      <sku>2</sku>
      <name description="Ignored, not first sighting">Hat</name>
      <color>Blue</color>
      <brand description="Maker" />
    </item>
  </channel>
</rss>
"#;

#[test]
fn parses_items_at_any_depth() {
    let feed = parse_feed(SAMPLE_FEED).unwrap();
    assert_eq!(feed.records.len(), 2);
    assert_eq!(feed.records[0].get("sku"), Some("1"));
    assert_eq!(feed.records[0].get("name"), Some("Shoe"));
    assert_eq!(feed.records[1].get("color"), Some("Blue"));
}

#[test]
fn empty_children_are_omitted_from_records() {
    let feed = parse_feed(SAMPLE_FEED).unwrap();
    assert!(!feed.records[1].contains("brand"));
}

#[test]
fn schema_uses_first_sighting() {
    let feed = parse_feed(SAMPLE_FEED).unwrap();
    let names: Vec<&str> = feed.schema.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["sku", "name", "color", "brand"]);

    let sku = feed.schema_entry("sku").unwrap();
    assert!(sku.required);
    assert_eq!(sku.help_text.as_deref(), Some("Stock keeping unit"));

    let name = feed.schema_entry("name").unwrap();
    assert!(!name.required);
    assert_eq!(name.help_text, None);

    let brand = feed.schema_entry("brand").unwrap();
    assert_eq!(brand.help_text.as_deref(), Some("Maker"));
}

#[test]
fn required_attribute_presence_not_value() {
    let feed =
        parse_feed(r#"<items><item><id required="false">7</id></item></items>"#).unwrap();
    assert!(feed.schema_entry("id").unwrap().required);
}

#[test]
fn text_values_are_decoded_and_kept_verbatim() {
    let feed = parse_feed(
        "<items><item><title>  A &amp; B &lt; C </title><desc><![CDATA[<b>bold</b>]]></desc></item></items>",
    )
    .unwrap();
    assert_eq!(feed.records[0].get("title"), Some("  A & B < C "));
    assert_eq!(feed.records[0].get("desc"), Some("<b>bold</b>"));
}

#[test]
fn tag_match_is_case_sensitive() {
    let feed = parse_feed("<items><Item><sku>1</sku></Item></items>").unwrap();
    assert!(feed.is_empty());
    assert!(feed.schema.is_empty());
}

#[test]
fn no_items_is_not_an_error() {
    let feed = parse_feed("<catalog><product>1</product></catalog>").unwrap();
    assert!(feed.records.is_empty());
    assert!(feed.schema.is_empty());
}

#[test]
fn malformed_xml_is_parse_error() {
    let err = parse_feed("<items><item><sku>1</item></items>").unwrap_err();
    assert!(matches!(err, IngestError::Parse { .. }));
    assert_eq!(err.category(), "could not parse uploaded file");
}

#[test]
fn unknown_entity_is_parse_error() {
    let err = parse_feed("<items><item><t>&nbsp;</t></item></items>").unwrap_err();
    assert!(matches!(err, IngestError::Parse { .. }));
}

#[test]
fn invalid_utf8_is_encoding_error() {
    let err = parse_feed_bytes(b"<items>\xff</items>").unwrap_err();
    assert!(matches!(err, IngestError::Encoding { offset: 7 }));
}

#[test]
fn byte_order_mark_is_skipped() {
    let feed = parse_feed_bytes(b"\xEF\xBB\xBF<items><item><a>1</a></item></items>").unwrap();
    assert_eq!(feed.len(), 1);
}

#[test]
fn counts_items() {
    assert_eq!(count_items(SAMPLE_FEED).unwrap(), 2);
    assert!(count_items("<broken>").is_err());
}

#[test]
fn reads_feed_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SAMPLE_FEED.as_bytes()).unwrap();
    let feed = read_feed(file.path()).unwrap();
    assert_eq!(feed.len(), 2);
}

#[test]
fn missing_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_feed(&dir.path().join("missing.xml")).unwrap_err();
    assert!(matches!(err, IngestError::FileRead { .. }));
}
