//! Built-in channel table.

use feed_model::ChannelField;

use crate::registry::ChannelDefinition;

pub const BUILTIN_VERSION: &str = "2024.1";

const FACEBOOK_REQUIRED: &[&str] = &[
    "id",
    "title",
    "description",
    "availability",
    "condition",
    "price",
    "link",
    "image_link",
    "brand",
];

const GOOGLE_REQUIRED: &[&str] = &[
    "g_id",
    "g_title",
    "g_description",
    "g_availability",
    "g_price",
    "g_link",
    "g_image_link",
];

const SNAPCHAT_REQUIRED: &[&str] = &[
    "id",
    "title",
    "description",
    "link",
    "image_link",
    "availability",
    "price",
];

const SNAPCHAT_OPTIONAL: &[&str] = &["brand_gtin_or_mpn"];

const TIKTOK_REQUIRED: &[&str] = &[
    "sku_id",
    "title",
    "description",
    "availability",
    "condition",
    "price",
    "link",
    "image_link",
    "brand",
    "age_group",
];

const TIKTOK_OPTIONAL: &[&str] = &[
    "color",
    "gender",
    "gtin",
    "mpn",
    "size",
    "material",
    "pattern",
    "item_group_id",
    "sale_price",
    "sale_price_effective_date",
    "additional_image_link",
    "product_type",
    "google_product_category",
    "shipping",
    "shipping_weight",
    "tax",
    "custom_label_0",
    "custom_label_1",
    "custom_label_2",
    "custom_label_3",
    "custom_label_4",
];

pub(crate) fn builtin_channels() -> Vec<ChannelDefinition> {
    vec![
        channel("facebook", "Facebook Product Ads", FACEBOOK_REQUIRED, &[]),
        channel("google", "Google", GOOGLE_REQUIRED, &[]),
        channel("snapchat", "Snapchat", SNAPCHAT_REQUIRED, SNAPCHAT_OPTIONAL),
        channel("tiktok", "TikTok", TIKTOK_REQUIRED, TIKTOK_OPTIONAL),
    ]
}

fn channel(id: &str, name: &str, required: &[&str], optional: &[&str]) -> ChannelDefinition {
    let fields = required
        .iter()
        .map(|name| ChannelField::required(*name))
        .chain(optional.iter().map(|name| ChannelField::optional(*name)))
        .collect();
    ChannelDefinition {
        id: id.to_string(),
        name: name.to_string(),
        fields,
    }
}
