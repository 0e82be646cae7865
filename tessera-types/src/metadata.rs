use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Frequency;

/// Open mapping of free-form metadata keys to arbitrary JSON values.
pub type MetaMap = BTreeMap<String, serde_json::Value>;

/// Descriptive record attached to every stored series.
///
/// `symbol` and `name` are denormalized copies of the series key so callers
/// can iterate metadata records without carrying the key alongside.
/// Display hints (`color`, `line_style`, `opacity`, `display_axis`) are
/// carried for downstream visualization and never interpreted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesMetadata {
    /// Ticker symbol or identifier.
    pub symbol: String,
    /// Series name (e.g. `"close"`, `"volume"`, `"sma_20"`).
    pub name: String,
    /// Canonical spacing of the series' timestamps.
    pub frequency: Frequency,
    /// Free-text provenance tag (e.g. `"yfinance"`, `"calculated"`).
    pub source: String,
    /// Timestamp of the most recent data point supplied by the latest
    /// mutating call. On a historical backfill this can be older than the
    /// merged series' true maximum.
    pub last_update: DateTime<Utc>,
    /// Boundary between historical and forecasted data; `None` means the
    /// series is purely historical.
    pub forecast_origin: Option<DateTime<Utc>>,
    /// Display color hint.
    pub color: Option<String>,
    /// Line style hint (`"solid"`, `"dash"`, `"dot"`).
    pub line_style: String,
    /// Opacity hint in `0.0..=1.0`.
    pub opacity: f64,
    /// Subplot/panel assignment (1 = price, 2 = volume, ...).
    pub display_axis: i32,
    /// User-defined keys that do not belong to the typed field set.
    pub custom: MetaMap,
}

impl SeriesMetadata {
    /// Build a record with the documented defaults for every optional field.
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        frequency: Frequency,
        last_update: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            frequency,
            source: "unknown".into(),
            last_update,
            forecast_origin: None,
            color: None,
            line_style: "solid".into(),
            opacity: 1.0,
            display_axis: 1,
            custom: MetaMap::new(),
        }
    }

    /// Whether this series carries forecasted data.
    #[must_use]
    pub const fn is_forecast(&self) -> bool {
        self.forecast_origin.is_some()
    }
}
