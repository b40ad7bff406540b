//! Integration tests for the pipeline and settings modules.

use std::fs;
use std::path::Path;

use feed_channels::ChannelRegistry;
use feed_cli::pipeline::{
    MappingFormat, export_shop_feed, ingest, ingest_str, load_mappings, parse_mappings, run_map,
    unmapped_required,
};
use feed_cli::settings::Settings;
use feed_model::{ChannelField, ChannelRef, Mapping, MappingKind, MappingSet, Shop};
use feed_output::XmlOptions;

const FEED: &str = r#"<rss><channel>
  <item><sku>1</sku><brand>Acme</brand><name>Hat</name></item>
  <item><sku>2</sku><name>Scarf</name></item>
</channel></rss>"#;

const MAPPINGS_JSON: &str = r#"[
    { "targetField": "id", "type": "rename", "sourceField": "sku" },
    { "targetField": "title", "type": "combine", "fields": ["brand", "name"], "separator": " " }
]"#;

const MAPPINGS_TOML: &str = r#"
[[mapping]]
targetField = "id"
type = "rename"
sourceField = "sku"

[[mapping]]
targetField = "title"
type = "combine"
fields = ["brand", "name"]
separator = " "

[[mapping]]
targetField = "brand"
type = "static"
value = "Acme"
condition = { onlyIf = { field = "sku", operator = "equalTo", value = "1" } }
"#;

fn snapchat_schema(registry: &ChannelRegistry) -> &[ChannelField] {
    registry.schema("snapchat").unwrap()
}

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn mapping_format_follows_extension() {
    assert_eq!(
        MappingFormat::from_path(Path::new("a/m.json")).unwrap(),
        MappingFormat::Json
    );
    assert_eq!(
        MappingFormat::from_path(Path::new("M.TOML")).unwrap(),
        MappingFormat::Toml
    );
    let err = MappingFormat::from_path(Path::new("m.yaml")).unwrap_err();
    assert!(err.to_string().contains("unsupported mapping file"));
}

#[test]
fn json_and_toml_mappings_agree() {
    let json = parse_mappings(MAPPINGS_JSON, MappingFormat::Json).unwrap();
    let toml = parse_mappings(MAPPINGS_TOML, MappingFormat::Toml).unwrap();
    assert_eq!(json.len(), 2);
    assert_eq!(toml.len(), 3);
    assert_eq!(json.get("id"), toml.get("id"));
    assert_eq!(json.get("title"), toml.get("title"));
    assert_eq!(
        toml.get("brand").unwrap().kind(),
        &MappingKind::Static {
            value: "Acme".to_string()
        }
    );
}

#[test]
fn toml_without_mappings_is_empty_set() {
    let set = parse_mappings("", MappingFormat::Toml).unwrap();
    assert!(set.is_empty());
}

#[test]
fn load_mappings_reports_path_on_bad_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "broken.json", "{ not json");
    let err = load_mappings(&path).unwrap_err();
    assert!(format!("{err:#}").contains("broken.json"));

    let path = write(dir.path(), "good.toml", MAPPINGS_TOML);
    assert_eq!(load_mappings(&path).unwrap().len(), 3);
}

#[test]
fn ingest_errors_carry_category() {
    let dir = tempfile::tempdir().unwrap();
    let err = ingest(&dir.path().join("missing.xml")).unwrap_err();
    assert!(format!("{err:#}").starts_with("could not read uploaded file"));

    let err = ingest_str("<items><item><sku>1</item></items>").unwrap_err();
    assert!(format!("{err:#}").starts_with("could not parse uploaded file"));
}

#[test]
fn run_map_writes_channel_feed() {
    let registry = ChannelRegistry::builtin();
    let feed = ingest_str(FEED).unwrap();
    let mappings = parse_mappings(MAPPINGS_JSON, MappingFormat::Json).unwrap();

    let outcome = run_map(
        &feed,
        &mappings,
        Some(snapchat_schema(&registry)),
        &XmlOptions::default(),
    )
    .unwrap();

    assert_eq!(outcome.source_records, 2);
    assert_eq!(outcome.mapped_records, 2);
    assert_eq!(outcome.mappings, 2);
    assert!(outcome.unresolved_sources.is_empty());
    assert_eq!(
        outcome.unmapped_required,
        vec!["description", "link", "image_link", "availability", "price"]
    );
    let empty_required = "<description></description><link></link><image_link></image_link>\
                          <availability></availability><price></price>";
    assert_eq!(
        outcome.xml,
        format!(
            "<items><item><id>1</id><title>Acme Hat</title>{empty_required}</item>\
             <item><id>2</id><title> Scarf</title>{empty_required}</item></items>"
        )
    );
}

#[test]
fn run_map_reports_unresolved_sources() {
    let feed = ingest_str(FEED).unwrap();
    let mut mappings = MappingSet::new();
    mappings.insert(Mapping::rename("gtin", "ean").unwrap());

    let outcome = run_map(&feed, &mappings, None, &XmlOptions::default()).unwrap();

    assert_eq!(outcome.unresolved_sources, vec!["ean"]);
    assert_eq!(
        outcome.xml,
        "<items><item><gtin></gtin></item><item><gtin></gtin></item></items>"
    );
}

#[test]
fn unmapped_required_ignores_optional_fields() {
    let schema = [ChannelField::required("id"), ChannelField::optional("gtin")];
    let mappings = MappingSet::new();
    assert_eq!(unmapped_required(&schema, &mappings), vec!["id"]);
}

fn shop_with_feed() -> Shop {
    let mut shop = Shop::new("ab12c", "Hats");
    shop.xml_content = Some(FEED.to_string());
    shop.product_count = 2;
    shop
}

#[test]
fn export_without_channel_writes_stored_records() {
    let registry = ChannelRegistry::builtin();
    let shop = shop_with_feed();

    let xml = export_shop_feed(&shop, &registry, None, &XmlOptions::default()).unwrap();

    assert_eq!(
        xml,
        "<items><item><sku>1</sku><brand>Acme</brand><name>Hat</name></item>\
         <item><sku>2</sku><name>Scarf</name></item></items>"
    );
}

#[test]
fn export_layers_internal_then_channel_mappings() {
    let registry = ChannelRegistry::builtin();
    let mut shop = shop_with_feed();
    shop.internal_mappings.insert(Mapping::rename("code", "sku").unwrap());
    shop.internal_mappings
        .insert(Mapping::static_value("label", "Winter").unwrap());
    shop.channels.push(ChannelRef {
        id: "snapchat".to_string(),
        name: "Snapchat".to_string(),
    });
    let mut channel = MappingSet::new();
    channel.insert(Mapping::rename("id", "code").unwrap());
    channel.insert(Mapping::rename("title", "label").unwrap());
    channel.insert(Mapping::rename("brand", "brand").unwrap());
    shop.channel_mappings.insert("snapchat".to_string(), channel);

    let xml = export_shop_feed(&shop, &registry, Some("snapchat"), &XmlOptions::default()).unwrap();

    // `brand` was not carried through the internal mapping.
    assert!(xml.starts_with("<items><item><id>1</id><title>Winter</title><description>"));
    assert!(!xml.contains("Acme"));
    assert_eq!(xml.matches("<item>").count(), 2);
}

#[test]
fn export_uses_configured_formatting() {
    let registry = ChannelRegistry::builtin();
    let mut shop = shop_with_feed();
    shop.channels.push(ChannelRef {
        id: "snapchat".to_string(),
        name: "Snapchat".to_string(),
    });
    let mut channel = MappingSet::new();
    channel.insert(Mapping::rename("id", "sku").unwrap());
    channel.insert(Mapping::rename("brand_gtin_or_mpn", "brand").unwrap());
    shop.channel_mappings.insert("snapchat".to_string(), channel);

    let options = Settings::default().xml_options();
    let xml = export_shop_feed(&shop, &registry, Some("snapchat"), &options).unwrap();

    insta::assert_snapshot!(xml, @r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <items>
      <item>
        <id>1</id>
        <title></title>
        <description></description>
        <link></link>
        <image_link></image_link>
        <availability></availability>
        <price></price>
        <brand_gtin_or_mpn>Acme</brand_gtin_or_mpn>
      </item>
      <item>
        <id>2</id>
        <title></title>
        <description></description>
        <link></link>
        <image_link></image_link>
        <availability></availability>
        <price></price>
      </item>
    </items>
    "#);
}

#[test]
fn export_requires_attached_and_mapped_channel() {
    let registry = ChannelRegistry::builtin();
    let mut shop = shop_with_feed();

    let err = export_shop_feed(&shop, &registry, Some("snapchat"), &XmlOptions::default())
        .unwrap_err();
    assert!(err.to_string().contains("not attached"));

    shop.channels.push(ChannelRef {
        id: "snapchat".to_string(),
        name: "Snapchat".to_string(),
    });
    let err = export_shop_feed(&shop, &registry, Some("snapchat"), &XmlOptions::default())
        .unwrap_err();
    assert!(err.to_string().contains("no saved mappings"));
}

#[test]
fn export_without_feed_fails() {
    let registry = ChannelRegistry::builtin();
    let shop = Shop::new("zz999", "Empty");
    let err = export_shop_feed(&shop, &registry, None, &XmlOptions::default()).unwrap_err();
    assert!(err.to_string().contains("no uploaded feed"));
}

#[test]
fn settings_load_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "settings.toml",
        "[export]\noutput_dir = \"out\"\nindent = 0\ndeclaration = false\n",
    );

    let settings = Settings::load(Some(&path)).unwrap();

    assert_eq!(settings.export.output_dir, Path::new("out"));
    assert_eq!(settings.xml_options(), XmlOptions::default());
    assert_eq!(settings.preview.page_size, 5);
}

#[test]
fn settings_missing_explicit_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Settings::load(Some(&dir.path().join("nope.toml"))).is_err());
}

#[test]
fn settings_overlay_must_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "settings.toml",
        "[channels]\noverlay = \"/definitely/not/here.toml\"\n",
    );
    let settings = Settings::load(Some(&path)).unwrap();
    assert!(settings.channel_registry().is_err());
}
