//! Configuration types for the time series collection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::TesseraError;

/// Strategy for reconciling series of different native frequencies onto one
/// shared timeline at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Forward-fill each series onto the unified timeline (default).
    /// A series is never filled before its first real observation.
    #[default]
    Ffill,
    /// Require every ingested series to share one frequency; the first series
    /// pins it and any later mismatch is a hard error at ingestion time.
    Strict,
    /// No gap filling: cells stay missing wherever a series lacks a timestamp.
    None,
}

/// Two-level column arrangement of the combined table returned by `get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnOrder {
    /// `(symbol, series_name)` — group columns by instrument (default).
    #[default]
    SymbolFirst,
    /// `(series_name, symbol)` — group columns by metric.
    SeriesFirst,
}

/// Rolling-window bound applied per series after every mutation.
///
/// Parsed from the same configuration strings the original callers pass:
/// a suffixed day count keeps a trailing calendar span, a bare integer keeps
/// a trailing observation count.
///
/// ```
/// use tessera_types::MaxWindow;
///
/// assert_eq!("30d".parse::<MaxWindow>().unwrap(), MaxWindow::Days(30));
/// assert_eq!("1000".parse::<MaxWindow>().unwrap(), MaxWindow::Bars(1000));
/// assert!("monthly".parse::<MaxWindow>().is_err());
/// assert!("0".parse::<MaxWindow>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum MaxWindow {
    /// Keep the trailing `n` calendar days, measured from the series' newest
    /// timestamp (inclusive cutoff).
    Days(u32),
    /// Keep the `n` most recent observations.
    Bars(usize),
}

impl fmt::Display for MaxWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Days(n) => write!(f, "{n}d"),
            Self::Bars(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for MaxWindow {
    type Err = TesseraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // A zero-sized window would empty every series it trims.
        if let Some(num) = s.strip_suffix('d') {
            let n: u32 = num
                .parse()
                .map_err(|_| TesseraError::InvalidArg(format!("invalid window '{s}'")))?;
            if n == 0 {
                return Err(TesseraError::InvalidArg(
                    "window '0d' would retain nothing".into(),
                ));
            }
            return Ok(Self::Days(n));
        }
        if let Ok(n) = s.parse::<usize>() {
            if n == 0 {
                return Err(TesseraError::InvalidArg(
                    "window '0' would retain nothing".into(),
                ));
            }
            return Ok(Self::Bars(n));
        }
        Err(TesseraError::InvalidArg(format!(
            "invalid window '{s}' (expected '<n>d' or a bare bar count)"
        )))
    }
}

impl From<MaxWindow> for String {
    fn from(w: MaxWindow) -> Self {
        w.to_string()
    }
}

impl TryFrom<String> for MaxWindow {
    type Error = TesseraError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Constructor configuration for a time series collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Alignment strategy applied by `get`.
    pub alignment: Alignment,
    /// Column arrangement of the combined table.
    pub column_order: ColumnOrder,
    /// Optional per-series rolling-window bound; `None` means unbounded.
    pub max_window: Option<MaxWindow>,
}
