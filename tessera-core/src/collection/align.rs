//! Union-timeline alignment and retrieval.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use tessera_types::{Alignment, ColumnOrder};

use crate::frame::{Frame, FrameColumns, FrameIndex};

use super::{TimeSeriesCollection, range_bounds};

impl TimeSeriesCollection {
    /// Produce one combined table of every stored series on a unified
    /// timeline, optionally bounded to `[start, end]` (inclusive both ends).
    ///
    /// The timeline is the union of all surviving series' timestamps — a
    /// strict superset spanning every series, which deliberately preserves
    /// forecast-horizon timestamps extending beyond any single series. A
    /// series with zero points in range is dropped from this read. Fill
    /// behavior follows the configured [`Alignment`]:
    ///
    /// - `Ffill`: forward-fill each series independently, never before its
    ///   first real in-range observation;
    /// - `None` and `Strict`: gaps stay missing (strict collections already
    ///   share one frequency, so gaps only arise from differing ranges).
    ///
    /// Output columns are two-level `(symbol, series)` or
    /// `(series, symbol)` labels per the configured [`ColumnOrder`], sorted
    /// lexicographically. An empty collection, bounds that eliminate every
    /// series, or inverted bounds (`start > end`) all yield [`Frame::empty`]
    /// rather than an error.
    #[must_use]
    pub fn get(&self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Frame {
        if self.is_empty() {
            return Frame::empty();
        }
        // Inverted bounds select nothing; BTreeMap::range would panic on them.
        if let (Some(s), Some(e)) = (start, end)
            && s > e
        {
            return Frame::empty();
        }

        let bounds = range_bounds(start, end);
        // BTreeMap keyed by output label: assembly and lexicographic column
        // ordering in one step.
        let mut in_range: BTreeMap<(String, String), BTreeMap<DateTime<Utc>, f64>> =
            BTreeMap::new();
        for (key, entry) in self.entries() {
            let points: BTreeMap<DateTime<Utc>, f64> = entry
                .data
                .range(bounds)
                .map(|(ts, v)| (*ts, *v))
                .collect();
            if points.is_empty() {
                continue;
            }
            let label = match self.config().column_order {
                ColumnOrder::SymbolFirst => (key.symbol.clone(), key.name.clone()),
                ColumnOrder::SeriesFirst => (key.name.clone(), key.symbol.clone()),
            };
            in_range.insert(label, points);
        }
        if in_range.is_empty() {
            return Frame::empty();
        }

        let timeline: Vec<DateTime<Utc>> = in_range
            .values()
            .flat_map(|points| points.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let ffill = self.config().alignment == Alignment::Ffill;
        let mut labels = Vec::with_capacity(in_range.len());
        let mut values = Vec::with_capacity(in_range.len());
        for (label, points) in in_range {
            let mut column = Vec::with_capacity(timeline.len());
            let mut carried: Option<f64> = None;
            for ts in &timeline {
                let cell = match points.get(ts) {
                    Some(&v) => {
                        carried = Some(v);
                        Some(v)
                    }
                    None if ffill => carried,
                    None => None,
                };
                column.push(cell);
            }
            labels.push(label);
            values.push(column);
        }

        let level_names = match self.config().column_order {
            ColumnOrder::SymbolFirst => ("symbol".to_owned(), "series".to_owned()),
            ColumnOrder::SeriesFirst => ("series".to_owned(), "symbol".to_owned()),
        };
        Frame::from_parts(
            FrameIndex::Time(timeline),
            FrameColumns::Multi {
                level_names,
                labels,
            },
            values,
        )
    }
}
