//! Multi-symbol, multi-series time series collection.
//!
//! Storage model: one composite map `SeriesKey -> { data, metadata }`, so a
//! series' numeric body and its descriptive record are created, updated, and
//! removed together. Series bodies are `BTreeMap<DateTime<Utc>, f64>`; a
//! timestamp appears at most once per series and insertion order never
//! matters.

mod align;
mod ingest;
/// Serialized collection state for caching and persistence.
pub mod state;

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use chrono::{DateTime, Duration, Utc};
use tessera_types::{
    Alignment, CollectionConfig, Frequency, MaxWindow, SeriesKey, SeriesMetadata, TesseraError,
};

pub use ingest::{AddMode, AddOptions};

/// Numeric body of one series: observations keyed by timestamp.
pub(crate) type SeriesData = BTreeMap<DateTime<Utc>, f64>;

/// Composite stored record: data and metadata live and die together.
#[derive(Debug, Clone)]
pub(crate) struct SeriesEntry {
    pub(crate) data: SeriesData,
    pub(crate) metadata: SeriesMetadata,
}

/// Strategy for a direct update against an already-existing series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Union new timestamps in; on a timestamp conflict the incoming value wins.
    #[default]
    Append,
    /// Overlay incoming values onto matching timestamps and append novel ones.
    Update,
    /// Discard the prior series body entirely and substitute the new points.
    Replace,
}

/// In-memory engine for heterogeneous time series keyed by `(symbol, name)`.
///
/// Ingestion accepts three frame shapes with automatic detection (see
/// [`TimeSeriesCollection::add`]), storage preserves each series' native
/// frequency, and retrieval produces one combined table on a unified
/// timeline under the configured [`Alignment`] policy.
///
/// The collection is a single-threaded, synchronous structure: no internal
/// locking, no background work. Callers needing cross-thread access must
/// synchronize externally.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesCollection {
    entries: BTreeMap<SeriesKey, SeriesEntry>,
    config: CollectionConfig,
    /// Frequency pinned by the first ingested series under strict alignment.
    primary_frequency: Option<Frequency>,
}

impl TimeSeriesCollection {
    /// Create an empty collection with the default configuration
    /// (forward-fill alignment, symbol-major columns, unbounded window).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection with an explicit configuration.
    #[must_use]
    pub fn with_config(config: CollectionConfig) -> Self {
        Self {
            entries: BTreeMap::new(),
            config,
            primary_frequency: None,
        }
    }

    /// The constructor configuration.
    #[must_use]
    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// Number of stored series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collection holds no series.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate all stored series keys in `(symbol, name)` order.
    pub fn keys(&self) -> impl Iterator<Item = &SeriesKey> {
        self.entries.keys()
    }

    /// Update an existing series with new points.
    ///
    /// `last_update` on the series' metadata is set to the newest timestamp
    /// of the incoming payload, which on a historical backfill can be older
    /// than the merged series' true maximum.
    ///
    /// # Errors
    /// Returns [`TesseraError::NotFound`] if the series does not exist
    /// (updates never create; use [`TimeSeriesCollection::add`] first) and
    /// [`TesseraError::InvalidArg`] for an empty payload.
    pub fn update(
        &mut self,
        points: &[(DateTime<Utc>, f64)],
        symbol: &str,
        name: &str,
        mode: UpdateMode,
    ) -> Result<(), TesseraError> {
        let newest = points
            .iter()
            .map(|(ts, _)| *ts)
            .max()
            .ok_or_else(|| TesseraError::InvalidArg("update requires at least one point".into()))?;

        let key = SeriesKey::new(symbol, name);
        let entry = self
            .entries
            .get_mut(&key)
            .ok_or_else(|| TesseraError::series_not_found(symbol, name))?;

        match mode {
            UpdateMode::Replace => {
                entry.data = points.iter().copied().collect();
            }
            UpdateMode::Append | UpdateMode::Update => {
                for &(ts, value) in points {
                    entry.data.insert(ts, value);
                }
            }
        }
        entry.metadata.last_update = newest;

        if let Some(window) = self.config.max_window {
            trim_window(&mut entry.data, window);
        }
        Ok(())
    }

    /// Remove series by granularity and return how many were removed.
    ///
    /// - `(Some(symbol), Some(name))`: the exact series;
    /// - `(Some(symbol), None)`: every series under the symbol;
    /// - `(None, Some(name))`: the name across all symbols;
    /// - `(None, None)`: everything.
    ///
    /// Removal is idempotent: a target that matches nothing logs a warning
    /// and removes zero series.
    pub fn remove(&mut self, symbol: Option<&str>, name: Option<&str>) -> usize {
        let before = self.entries.len();
        match (symbol, name) {
            (Some(s), Some(n)) => {
                self.entries.remove(&SeriesKey::new(s, n));
            }
            (Some(s), None) => self.entries.retain(|k, _| k.symbol != s),
            (None, Some(n)) => self.entries.retain(|k, _| k.name != n),
            (None, None) => self.entries.clear(),
        }
        let removed = before - self.entries.len();
        if removed == 0 {
            tracing::warn!(?symbol, ?name, "remove matched no stored series");
        }
        removed
    }

    /// All series' metadata records, in key order.
    #[must_use]
    pub fn list_series(&self) -> Vec<&SeriesMetadata> {
        self.entries.values().map(|e| &e.metadata).collect()
    }

    /// Metadata for one series.
    ///
    /// # Errors
    /// Returns [`TesseraError::NotFound`] if the series does not exist.
    pub fn get_metadata(&self, symbol: &str, name: &str) -> Result<&SeriesMetadata, TesseraError> {
        self.entries
            .get(&SeriesKey::new(symbol, name))
            .map(|e| &e.metadata)
            .ok_or_else(|| TesseraError::series_not_found(symbol, name))
    }

    /// Distinct forecast-origin boundaries across all series.
    ///
    /// Series without a forecast origin contribute nothing; an empty set
    /// means the collection is purely historical.
    #[must_use]
    pub fn get_forecast_origins(&self) -> BTreeSet<DateTime<Utc>> {
        self.entries
            .values()
            .filter_map(|e| e.metadata.forecast_origin)
            .collect()
    }

    pub(crate) fn entries(&self) -> &BTreeMap<SeriesKey, SeriesEntry> {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut BTreeMap<SeriesKey, SeriesEntry> {
        &mut self.entries
    }

    pub(crate) fn primary_frequency(&self) -> Option<Frequency> {
        self.primary_frequency
    }

    pub(crate) fn set_primary_frequency(&mut self, frequency: Frequency) {
        self.primary_frequency.get_or_insert(frequency);
    }

    /// Validate an incoming frequency against the pinned one under strict
    /// alignment. Under any other policy this is a no-op.
    pub(crate) fn check_strict_frequency(&self, frequency: Frequency) -> Result<(), TesseraError> {
        if self.config.alignment == Alignment::Strict
            && let Some(primary) = self.primary_frequency
            && primary != frequency
        {
            return Err(TesseraError::FrequencyMismatch {
                expected: primary,
                got: frequency,
            });
        }
        Ok(())
    }
}

/// Inclusive range bounds for a `BTreeMap::range` call.
pub(crate) fn range_bounds(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> (Bound<DateTime<Utc>>, Bound<DateTime<Utc>>) {
    (
        start.map_or(Bound::Unbounded, Bound::Included),
        end.map_or(Bound::Unbounded, Bound::Included),
    )
}

/// Trim one series body to the configured rolling window.
///
/// `Days(n)` keeps the trailing calendar span measured from the series' own
/// newest timestamp (inclusive cutoff); `Bars(n)` keeps the most recent `n`
/// observations.
pub(crate) fn trim_window(data: &mut SeriesData, window: MaxWindow) {
    match window {
        MaxWindow::Days(n) => {
            if let Some((&newest, _)) = data.iter().next_back() {
                let cutoff = newest - Duration::days(i64::from(n));
                let kept = data.split_off(&cutoff);
                *data = kept;
            }
        }
        MaxWindow::Bars(n) => {
            while data.len() > n {
                data.pop_first();
            }
        }
    }
}
