//! Library components of the `feedmap` command line tool.

#![allow(missing_docs)]

pub mod logging;
pub mod pipeline;
pub mod settings;
