use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered `(symbol, name)` pair uniquely identifying one scalar time series.
///
/// The key is the sole addressing scheme for both series data and metadata;
/// no series exists with only one half of the pair. Keys serialize as a
/// two-field record, never as a stringified tuple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    /// Ticker symbol or instrument identifier, e.g. `"AAPL"`.
    pub symbol: String,
    /// Series name, e.g. `"close"`, `"volume"`, `"sma_20"`.
    pub name: String,
}

impl SeriesKey {
    /// Build a key from its two halves.
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.symbol, self.name)
    }
}
