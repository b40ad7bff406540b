#![deny(unsafe_code)]

mod builtin;
pub mod error;
pub mod registry;

pub use crate::builtin::BUILTIN_VERSION;
pub use crate::error::ChannelError;
pub use crate::registry::{ChannelDefinition, ChannelRegistry};
