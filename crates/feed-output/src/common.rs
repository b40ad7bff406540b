//! Shared helpers for feed output.

use std::path::Path;

use anyhow::{Context, Result};

pub const FEED_EXTENSION: &str = "xml";

/// Suggested file name for an export: `<shop>-<channel>.xml`, or
/// `<shop>-feed.xml` for the shop's internal feed.
pub fn export_file_name(shop_name: &str, channel_id: Option<&str>) -> String {
    let suffix = channel_id.filter(|id| !id.is_empty()).unwrap_or("feed");
    format!("{shop_name}-{suffix}.{FEED_EXTENSION}")
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    Ok(())
}
