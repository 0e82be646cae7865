//! Round-trip serialization of the full collection state.
//!
//! The state is a plain nested structure: the constructor configuration
//! plus one record per series carrying its points and metadata. Keys are
//! structured `(symbol, name)` fields on each record — never a stringified
//! tuple that would need re-parsing on restore.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tessera_types::{Alignment, CollectionConfig, SeriesKey, SeriesMetadata, TesseraError};

use super::{SeriesEntry, TimeSeriesCollection};

/// Serialized form of one stored series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesState {
    /// Symbol half of the series key.
    pub symbol: String,
    /// Series-name half of the series key.
    pub name: String,
    /// Observations in ascending timestamp order.
    pub points: Vec<(DateTime<Utc>, f64)>,
    /// The full metadata record.
    pub metadata: SeriesMetadata,
}

/// Serialized form of an entire collection, sufficient to reconstruct an
/// equivalent instance via [`TimeSeriesCollection::from_state`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionState {
    /// The three constructor configuration values.
    pub config: CollectionConfig,
    /// One record per stored series, in key order.
    pub series: Vec<SeriesState>,
}

impl TimeSeriesCollection {
    /// Dump the collection into a plain serializable state.
    #[must_use]
    pub fn to_state(&self) -> CollectionState {
        CollectionState {
            config: *self.config(),
            series: self
                .entries()
                .iter()
                .map(|(key, entry)| SeriesState {
                    symbol: key.symbol.clone(),
                    name: key.name.clone(),
                    points: entry.data.iter().map(|(ts, v)| (*ts, *v)).collect(),
                    metadata: entry.metadata.clone(),
                })
                .collect(),
        }
    }

    /// Reconstruct a collection from a dumped state.
    ///
    /// Under strict alignment the collection frequency is re-pinned from the
    /// restored metadata (every restored series already shares it).
    ///
    /// # Errors
    /// Returns [`TesseraError::State`] for a record whose metadata key
    /// disagrees with its own `(symbol, name)` fields, a duplicate key, or
    /// a series with no points.
    pub fn from_state(state: CollectionState) -> Result<Self, TesseraError> {
        let mut collection = Self::with_config(state.config);
        for series in state.series {
            let key = SeriesKey::new(&series.symbol, &series.name);
            if series.metadata.symbol != series.symbol || series.metadata.name != series.name {
                return Err(TesseraError::State(format!(
                    "metadata key ({}, {}) disagrees with record key {key}",
                    series.metadata.symbol, series.metadata.name
                )));
            }
            if series.points.is_empty() {
                return Err(TesseraError::State(format!("series {key} has no points")));
            }
            let entry = SeriesEntry {
                data: series.points.into_iter().collect(),
                metadata: series.metadata,
            };
            if collection.entries_mut().insert(key.clone(), entry).is_some() {
                return Err(TesseraError::State(format!("duplicate series {key}")));
            }
        }
        if collection.config().alignment == Alignment::Strict {
            let pinned = collection
                .entries()
                .values()
                .next()
                .map(|e| e.metadata.frequency);
            if let Some(frequency) = pinned {
                collection.set_primary_frequency(frequency);
            }
        }
        Ok(collection)
    }

    /// Dump the collection state as a JSON string.
    ///
    /// # Errors
    /// Returns [`TesseraError::State`] if JSON encoding fails.
    pub fn to_json(&self) -> Result<String, TesseraError> {
        serde_json::to_string(&self.to_state()).map_err(|e| TesseraError::State(e.to_string()))
    }

    /// Restore a collection from a JSON state dump.
    ///
    /// # Errors
    /// Returns [`TesseraError::State`] for malformed JSON or an
    /// inconsistent state (see [`TimeSeriesCollection::from_state`]).
    pub fn from_json(json: &str) -> Result<Self, TesseraError> {
        let state: CollectionState =
            serde_json::from_str(json).map_err(|e| TesseraError::State(e.to_string()))?;
        Self::from_state(state)
    }
}
