//! Field mapping for product feeds.
//!
//! - [`MappingEngine`] / [`apply_mappings`]: derive output records from source
//!   records and a mapping set snapshot
//! - [`MappingState`]: draft/saved mapping sets for an editing session
//! - [`build_preview`]: original versus mapped value of one field per record

mod engine;
mod error;
mod preview;
mod state;
mod utils;

// === Error Types ===
pub use error::{MappingError, Result};

// === Engine ===
pub use engine::{
    MappingEngine, apply_mapping, apply_mappings, compute_value, evaluate_condition, map_record,
};

// === Mapping State ===
pub use state::{FieldMappingStatus, MappingField, MappingState, MappingSummary};

// === Preview ===
pub use preview::{
    DEFAULT_PAGE_SIZE, FALLBACK_LABEL, PreviewPage, PreviewRow, RecordIdentity, build_preview,
    infer_record_identity,
};

// === Utilities ===
pub use utils::{field_options, identity_mappings};
