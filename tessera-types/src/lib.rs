//! Tessera-specific value types and configuration primitives shared across the workspace.
#![warn(missing_docs)]

mod config;
mod error;
mod frequency;
mod key;
mod metadata;

pub use config::{Alignment, CollectionConfig, ColumnOrder, MaxWindow};
pub use error::TesseraError;
pub use frequency::Frequency;
pub use key::SeriesKey;
pub use metadata::{MetaMap, SeriesMetadata};
