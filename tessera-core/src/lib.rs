//! tessera-core
//!
//! In-memory multi-symbol, multi-series time series engine.
//!
//! - `frame`: the structural table model used for both ingestion input and
//!   aligned output. A frame's index is either a plain timestamp axis or a
//!   two-level (timestamp, entity) axis; its columns are either flat names or
//!   two-level (symbol, series) labels. The ingestion entry point classifies
//!   each frame into exactly one of three shapes from that structure.
//! - `timeseries`: cadence inference from raw timestamps and period-string
//!   helpers for bounding reads.
//! - `collection`: the [`TimeSeriesCollection`] itself — keyed storage with
//!   create/merge/replace mutation semantics, per-series rolling-window
//!   trimming, union-timeline alignment under a configurable policy, and
//!   full state round-tripping.
//!
//! All operations are synchronous and run to completion on the calling
//! thread; a collection instance owns its maps exclusively and performs no
//! internal locking.
#![warn(missing_docs)]

/// Structural table model shared by ingestion and retrieval.
pub mod frame;
/// Cadence inference and period helpers.
pub mod timeseries;
/// The time series collection engine.
pub mod collection;

pub use collection::{AddMode, AddOptions, TimeSeriesCollection, UpdateMode};
pub use collection::state::{CollectionState, SeriesState};
pub use frame::{Frame, FrameColumns, FrameIndex};
pub use timeseries::infer::{estimate_step_seconds, infer_frequency};
pub use timeseries::period::period_bounds;

pub use tessera_types::{
    Alignment, CollectionConfig, ColumnOrder, Frequency, MaxWindow, MetaMap, SeriesKey,
    SeriesMetadata, TesseraError,
};
