//! Product feed output.
//!
//! - [`generate_xml`]: records to an `<items>` document string
//! - [`write_feed_xml`] / [`write_feed_file`]: the same into a writer or a file
//! - [`export_file_name`]: suggested download name for an export

mod common;
mod feed_xml;

pub use common::{FEED_EXTENSION, export_file_name};
pub use feed_xml::{
    ITEM_TAG, ROOT_TAG, XmlOptions, generate_xml, generate_xml_with, write_feed_file,
    write_feed_xml,
};
