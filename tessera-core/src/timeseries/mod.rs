//! Time-series utilities shared by ingestion and retrieval.
//!
//! Modules include:
//! - `infer`: estimate a representative step and map it onto a canonical frequency
//! - `period`: convert period strings into inclusive (start, end) bounds

/// Step estimation and frequency inference from raw timestamps.
pub mod infer;
/// Period-string parsing for bounding reads.
pub mod period;
