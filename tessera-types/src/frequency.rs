use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::TesseraError;

/// Canonical spacing descriptor for a time series.
///
/// The string vocabulary follows the conventions callers already use for
/// market data (`"5min"`, `"1h"`, `"1d"`, `"B"`, `"1w"`). Business-day is a
/// distinct cadence from calendar-daily: it skips weekends, so its adjacent
/// deltas alternate between one and three days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Frequency {
    /// Fixed minute cadence, e.g. `Minutes(5)` for five-minute bars.
    Minutes(u32),
    /// Hourly bars.
    Hourly,
    /// Calendar-daily bars (weekends included).
    Daily,
    /// Business-day bars (Monday through Friday).
    BusinessDaily,
    /// Weekly bars.
    Weekly,
}

impl Frequency {
    /// Nominal spacing in seconds between adjacent observations.
    ///
    /// Business-day reports the single-step spacing of 86 400 seconds; the
    /// weekend gap is a property of the calendar, not of the cadence.
    #[must_use]
    pub const fn step_seconds(self) -> i64 {
        match self {
            Self::Minutes(n) => 60 * n as i64,
            Self::Hourly => 3_600,
            Self::Daily | Self::BusinessDaily => 86_400,
            Self::Weekly => 604_800,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minutes(n) => write!(f, "{n}min"),
            Self::Hourly => write!(f, "1h"),
            Self::Daily => write!(f, "1d"),
            Self::BusinessDaily => write!(f, "B"),
            Self::Weekly => write!(f, "1w"),
        }
    }
}

impl FromStr for Frequency {
    type Err = TesseraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "B" => return Ok(Self::BusinessDaily),
            "1h" | "h" => return Ok(Self::Hourly),
            "1d" | "d" => return Ok(Self::Daily),
            "1w" | "w" => return Ok(Self::Weekly),
            _ => {}
        }
        if let Some(num) = s.strip_suffix("min") {
            let n: u32 = num
                .parse()
                .map_err(|_| TesseraError::InvalidArg(format!("invalid frequency '{s}'")))?;
            if n == 0 {
                return Err(TesseraError::InvalidArg(
                    "frequency '0min' has no spacing".into(),
                ));
            }
            return Ok(Self::Minutes(n));
        }
        Err(TesseraError::InvalidArg(format!(
            "invalid frequency '{s}' (expected '<n>min', '1h', '1d', 'B', or '1w')"
        )))
    }
}

impl From<Frequency> for String {
    fn from(f: Frequency) -> Self {
        f.to_string()
    }
}

impl TryFrom<String> for Frequency {
    type Error = TesseraError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
