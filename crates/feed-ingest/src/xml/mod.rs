//! XML document handling.

mod tree;

pub(crate) use tree::{Element, parse_document};
