use std::fs;

use feed_channels::{BUILTIN_VERSION, ChannelError, ChannelRegistry};

fn field_names(registry: &ChannelRegistry, id: &str) -> String {
    registry
        .schema(id)
        .unwrap()
        .iter()
        .map(|f| {
            if f.optional {
                format!("{}?", f.name)
            } else {
                f.name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[test]
fn builtin_channels_are_listed_in_order() {
    let registry = ChannelRegistry::builtin();
    let ids: Vec<&str> = registry.ids().collect();
    assert_eq!(ids, vec!["facebook", "google", "snapchat", "tiktok"]);
    assert_eq!(registry.version(), BUILTIN_VERSION);
}

#[test]
fn facebook_fields_snapshot() {
    let registry = ChannelRegistry::builtin();
    insta::assert_snapshot!(
        field_names(&registry, "facebook"),
        @"id,title,description,availability,condition,price,link,image_link,brand"
    );
}

#[test]
fn google_fields_snapshot() {
    let registry = ChannelRegistry::builtin();
    insta::assert_snapshot!(
        field_names(&registry, "google"),
        @"g_id,g_title,g_description,g_availability,g_price,g_link,g_image_link"
    );
}

#[test]
fn snapchat_has_one_optional_field() {
    let registry = ChannelRegistry::builtin();
    insta::assert_snapshot!(
        field_names(&registry, "snapchat"),
        @"id,title,description,link,image_link,availability,price,brand_gtin_or_mpn?"
    );
}

#[test]
fn tiktok_required_and_optional_counts() {
    let registry = ChannelRegistry::builtin();
    let tiktok = registry.get("tiktok").unwrap();
    assert_eq!(tiktok.required_fields().count(), 10);
    assert_eq!(tiktok.optional_fields().count(), 21);
    assert!(tiktok.field("custom_label_4").unwrap().optional);
    assert!(tiktok.field("age_group").unwrap().is_required());
}

#[test]
fn unknown_channel_is_an_error() {
    let registry = ChannelRegistry::builtin();
    let err = registry.schema("myspace").unwrap_err();
    assert!(matches!(err, ChannelError::UnknownChannel { ref id } if id == "myspace"));
}

#[test]
fn overlay_replaces_and_appends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("channels.toml");
    fs::write(
        &path,
        r#"
version = "shop-7"

[[channel]]
id = "google"
name = "Google Shopping"

[[channel.field]]
name = "id"

[[channel.field]]
name = "gtin"
optional = true

[[channel]]
id = "pinterest"
name = "Pinterest"

[[channel.field]]
name = "id"
"#,
    )
    .unwrap();

    let registry = ChannelRegistry::with_overlay(&path).unwrap();
    let ids: Vec<&str> = registry.ids().collect();
    assert_eq!(ids, vec!["facebook", "google", "snapchat", "tiktok", "pinterest"]);
    assert_eq!(field_names(&registry, "google"), "id,gtin?");
    assert_eq!(registry.get("google").unwrap().name, "Google Shopping");
    assert_eq!(registry.version(), format!("{BUILTIN_VERSION}+shop-7"));
}

#[test]
fn duplicate_fields_are_rejected() {
    let err = ChannelRegistry::from_toml_str(
        r#"
[[channel]]
id = "x"
name = "X"

[[channel.field]]
name = "id"

[[channel.field]]
name = "id"
"#,
    )
    .unwrap_err();
    assert!(matches!(err, ChannelError::Invalid { .. }));
}

#[test]
fn field_names_must_be_element_names() {
    let err = ChannelRegistry::from_toml_str(
        r#"
[[channel]]
id = "x"
name = "X"

[[channel.field]]
name = "sale price"
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("'sale price'"));
}

#[test]
fn malformed_table_is_toml_error() {
    let err = ChannelRegistry::from_toml_str("[[channel]\nid=").unwrap_err();
    assert!(matches!(err, ChannelError::Toml { .. }));
}
