//! Format-detecting ingestion: shape classification, the three fixed-shape
//! adapters, and metadata precedence resolution.
//!
//! Every call is all-or-nothing: shape validation, frequency checking,
//! metadata typing, and create-mode conflict detection all complete before
//! the first store mutation, so a failing call leaves the collection
//! untouched.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tessera_types::{Frequency, MetaMap, SeriesKey, SeriesMetadata, TesseraError};

use crate::frame::{Frame, FrameColumns, FrameIndex};
use crate::timeseries::infer::infer_frequency;

use super::{SeriesData, SeriesEntry, TimeSeriesCollection, trim_window};

/// Accepted names for the entity level of a tall index or a wide-multi
/// column level.
const ENTITY_LEVELS: [&str; 2] = ["symbol", "id"];

/// Reserved flat column name skipped as a sentinel in wide-single frames.
const SYMBOL_SENTINEL: &str = "symbol";

/// Ingestion mode for [`TimeSeriesCollection::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddMode {
    /// Strict create: fail if any derived `(symbol, name)` key already
    /// exists. For safe, once-only initial loads.
    #[default]
    Add,
    /// Idempotent merge: new keys insert as-is; existing keys merge
    /// last-write-wins per timestamp and append novel timestamps.
    Upsert,
}

/// Options for one ingestion call.
///
/// Metadata precedence, highest to lowest: per-series override
/// ([`AddOptions::series_metadata`]) > call-level metadata
/// ([`AddOptions::metadata`]) > fallback defaults ([`AddOptions::fallback`]).
/// Known keys (`source`, `forecast_origin`, `color`, `line_style`,
/// `opacity`, `display_axis`) route into the typed metadata fields;
/// anything else is preserved verbatim in the custom map.
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    symbol: Option<String>,
    frequency: Option<Frequency>,
    metadata: MetaMap,
    metadata_series: BTreeMap<String, MetaMap>,
    fallback: MetaMap,
    mode: AddMode,
}

impl AddOptions {
    /// Start from the defaults: no symbol, inferred frequency, empty
    /// metadata tiers, strict-create mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Symbol for wide-single frames. Ignored (with a warning) for tall and
    /// wide-multi frames, which carry their own symbols.
    #[must_use]
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Explicit frequency; skips inference entirely.
    #[must_use]
    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    /// Ingestion mode.
    #[must_use]
    pub fn mode(mut self, mode: AddMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set a call-level metadata field applied to every series in this call.
    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Set a per-series-name metadata override, e.g. routing `"volume"` to
    /// a secondary display axis.
    #[must_use]
    pub fn series_metadata(
        mut self,
        series: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.metadata_series
            .entry(series.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Set a lowest-priority fallback default.
    #[must_use]
    pub fn fallback(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fallback.insert(key.into(), value.into());
        self
    }

    /// Merge the three tiers for one series name. Nulls are dropped per tier
    /// before merging, so a null in a higher tier never shadows (and then
    /// discards) a lower tier's real value.
    fn resolve_fields(&self, name: &str) -> MetaMap {
        let tiers = [
            Some(&self.fallback),
            Some(&self.metadata),
            self.metadata_series.get(name),
        ];
        let mut merged = MetaMap::new();
        for tier in tiers.into_iter().flatten() {
            for (key, value) in tier {
                if !value.is_null() {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }
        merged
    }
}

/// One fully validated series ready to commit.
struct Prepared {
    key: SeriesKey,
    data: SeriesData,
    /// Metadata built from defaults plus this call's resolved fields; used
    /// verbatim on insert, and as the source of overlay values on upsert.
    metadata: SeriesMetadata,
    /// The resolved field map; names which typed fields the call explicitly
    /// provided, so an upsert overlays only those.
    fields: MetaMap,
    /// Newest timestamp of this call's payload for this series.
    newest: DateTime<Utc>,
}

impl TimeSeriesCollection {
    /// Ingest one frame, classifying it into exactly one of three shapes:
    ///
    /// 1. **Tall** — two-level `(timestamp, entity)` index, flat data
    ///    columns. Every column becomes one series per distinct entity.
    ///    The entity level must be named `"symbol"` or `"id"`.
    /// 2. **Wide-multi** — timestamp index, two-level column labels where
    ///    one level is named `"symbol"` or `"id"` (either position) and the
    ///    other carries series names. Each column becomes one series.
    /// 3. **Wide-single** — timestamp index, flat columns, mandatory
    ///    [`AddOptions::symbol`]. Every column except a literal `"symbol"`
    ///    sentinel becomes one series under that symbol.
    ///
    /// Frequency is taken from [`AddOptions::frequency`] or inferred from
    /// the timestamps (tall: from the first entity's own dates); inference
    /// failure falls back to business-day with a logged warning.
    ///
    /// # Errors
    /// - [`TesseraError::Frame`] for an unsupported structure or level name;
    /// - [`TesseraError::MissingSymbol`] for wide-single without a symbol;
    /// - [`TesseraError::FrequencyMismatch`] under strict alignment;
    /// - [`TesseraError::AlreadyExists`] in [`AddMode::Add`] when a derived
    ///   key is already stored;
    /// - [`TesseraError::Metadata`] for a wrong-typed metadata value;
    /// - [`TesseraError::InvalidArg`] for an empty frame or a column with
    ///   zero real observations.
    ///
    /// No error path mutates the collection.
    pub fn add(&mut self, frame: &Frame, opts: &AddOptions) -> Result<(), TesseraError> {
        if frame.n_rows() == 0 {
            return Err(TesseraError::InvalidArg("frame has no rows".into()));
        }
        if frame.n_cols() == 0 {
            return Err(TesseraError::InvalidArg("frame has no columns".into()));
        }

        let prepared = match (frame.index(), frame.columns()) {
            (FrameIndex::TimeEntity { level, rows }, FrameColumns::Flat(names)) => {
                if let Some(symbol) = &opts.symbol {
                    tracing::warn!(
                        %symbol,
                        "ignoring symbol parameter for tall format; symbols come from the entity index level"
                    );
                }
                self.prepare_tall(frame, level, rows, names, opts)?
            }
            (FrameIndex::TimeEntity { .. }, FrameColumns::Multi { .. }) => {
                return Err(TesseraError::frame(
                    "a two-level index cannot be combined with two-level columns",
                ));
            }
            (FrameIndex::Time(timestamps), FrameColumns::Multi { level_names, labels }) => {
                if let Some(symbol) = &opts.symbol {
                    tracing::warn!(
                        %symbol,
                        "ignoring symbol parameter for wide multi-level format; symbols come from the column labels"
                    );
                }
                self.prepare_wide_multi(frame, timestamps, level_names, labels, opts)?
            }
            (FrameIndex::Time(timestamps), FrameColumns::Flat(names)) => {
                let symbol = opts.symbol.as_deref().ok_or(TesseraError::MissingSymbol)?;
                self.prepare_wide_single(frame, timestamps, names, symbol, opts)?
            }
        };

        let (prepared, frequency) = prepared;
        self.commit(prepared, frequency, opts.frequency, opts.mode)
    }

    fn prepare_tall(
        &self,
        frame: &Frame,
        level: &str,
        rows: &[(DateTime<Utc>, String)],
        names: &[String],
        opts: &AddOptions,
    ) -> Result<(Vec<Prepared>, Frequency), TesseraError> {
        if !ENTITY_LEVELS.contains(&level) {
            return Err(TesseraError::frame(format!(
                "entity index level must be named 'symbol' or 'id', got '{level}'"
            )));
        }

        // Infer from the first entity's own dates: the merged multi-entity
        // index can look irregular even when each entity's series is uniform.
        let frequency = match opts.frequency {
            Some(f) => f,
            None => {
                let first_entity = &rows[0].1;
                let first_dates: Vec<DateTime<Utc>> = rows
                    .iter()
                    .filter(|(_, e)| e == first_entity)
                    .map(|(ts, _)| *ts)
                    .collect();
                fallback_frequency(infer_frequency(&first_dates))
            }
        };
        self.check_strict_frequency(frequency)?;

        // Distinct entities in first-appearance order.
        let mut entities: Vec<&str> = Vec::new();
        for (_, e) in rows {
            if !entities.contains(&e.as_str()) {
                entities.push(e.as_str());
            }
        }

        let mut prepared = Vec::with_capacity(names.len() * entities.len());
        for (col, name) in names.iter().enumerate() {
            let cells = frame
                .column_values(col)
                .ok_or_else(|| TesseraError::frame(format!("missing cells for column {col}")))?;
            let fields = opts.resolve_fields(name);
            for &entity in &entities {
                let mut data = SeriesData::new();
                for (row, cell) in rows.iter().zip(cells) {
                    if row.1 == entity
                        && let Some(value) = *cell
                    {
                        data.insert(row.0, value);
                    }
                }
                prepared.push(prepare_one(entity, name, data, frequency, &fields)?);
            }
        }
        Ok((prepared, frequency))
    }

    fn prepare_wide_multi(
        &self,
        frame: &Frame,
        timestamps: &[DateTime<Utc>],
        level_names: &(String, String),
        labels: &[(String, String)],
        opts: &AddOptions,
    ) -> Result<(Vec<Prepared>, Frequency), TesseraError> {
        // Find which label position carries the symbol; "symbol" is checked
        // across both positions before "id".
        let symbol_level = ENTITY_LEVELS
            .iter()
            .find_map(|want| {
                if level_names.0 == *want {
                    Some(0)
                } else if level_names.1 == *want {
                    Some(1)
                } else {
                    None
                }
            })
            .ok_or_else(|| {
                TesseraError::frame(format!(
                    "column levels must include 'symbol' or 'id', got ('{}', '{}')",
                    level_names.0, level_names.1
                ))
            })?;

        let frequency = match opts.frequency {
            Some(f) => f,
            None => fallback_frequency(infer_frequency(timestamps)),
        };
        self.check_strict_frequency(frequency)?;

        let mut prepared = Vec::with_capacity(labels.len());
        for (col, label) in labels.iter().enumerate() {
            let (symbol, name) = if symbol_level == 0 {
                (label.0.as_str(), label.1.as_str())
            } else {
                (label.1.as_str(), label.0.as_str())
            };
            // An unnamed series level falls back to a generic name.
            let name = if name.is_empty() { "value" } else { name };

            let cells = frame
                .column_values(col)
                .ok_or_else(|| TesseraError::frame(format!("missing cells for column {col}")))?;
            let data: SeriesData = timestamps
                .iter()
                .zip(cells)
                .filter_map(|(ts, cell)| cell.map(|v| (*ts, v)))
                .collect();
            let fields = opts.resolve_fields(name);
            prepared.push(prepare_one(symbol, name, data, frequency, &fields)?);
        }
        Ok((prepared, frequency))
    }

    fn prepare_wide_single(
        &self,
        frame: &Frame,
        timestamps: &[DateTime<Utc>],
        names: &[String],
        symbol: &str,
        opts: &AddOptions,
    ) -> Result<(Vec<Prepared>, Frequency), TesseraError> {
        let frequency = match opts.frequency {
            Some(f) => f,
            None => fallback_frequency(infer_frequency(timestamps)),
        };
        self.check_strict_frequency(frequency)?;

        let mut prepared = Vec::with_capacity(names.len());
        for (col, name) in names.iter().enumerate() {
            if name == SYMBOL_SENTINEL {
                continue;
            }
            let cells = frame
                .column_values(col)
                .ok_or_else(|| TesseraError::frame(format!("missing cells for column {col}")))?;
            let data: SeriesData = timestamps
                .iter()
                .zip(cells)
                .filter_map(|(ts, cell)| cell.map(|v| (*ts, v)))
                .collect();
            let fields = opts.resolve_fields(name);
            prepared.push(prepare_one(symbol, name, data, frequency, &fields)?);
        }
        if prepared.is_empty() {
            return Err(TesseraError::InvalidArg(
                "frame has no data columns besides the symbol sentinel".into(),
            ));
        }
        Ok((prepared, frequency))
    }

    /// Commit fully validated series. The create-mode conflict scan runs
    /// before the first insertion so a conflicting call changes nothing.
    fn commit(
        &mut self,
        prepared: Vec<Prepared>,
        frequency: Frequency,
        explicit_frequency: Option<Frequency>,
        mode: AddMode,
    ) -> Result<(), TesseraError> {
        if mode == AddMode::Add {
            // A frame deriving the same key twice is a create conflict too,
            // not a silent intra-call merge.
            let mut seen: BTreeSet<&SeriesKey> = BTreeSet::new();
            for p in &prepared {
                if self.entries().contains_key(&p.key) || !seen.insert(&p.key) {
                    return Err(TesseraError::AlreadyExists {
                        symbol: p.key.symbol.clone(),
                        name: p.key.name.clone(),
                    });
                }
            }
        }

        let window = self.config().max_window;
        for p in prepared {
            match self.entries_mut().entry(p.key) {
                Entry::Vacant(slot) => {
                    let mut entry = SeriesEntry {
                        data: p.data,
                        metadata: p.metadata,
                    };
                    if let Some(w) = window {
                        trim_window(&mut entry.data, w);
                    }
                    slot.insert(entry);
                }
                Entry::Occupied(mut slot) => {
                    let entry = slot.get_mut();
                    for (ts, value) in p.data {
                        entry.data.insert(ts, value);
                    }
                    overlay_fields(&mut entry.metadata, &p.metadata, &p.fields);
                    // Freshness of this call's payload, not of the merged series.
                    entry.metadata.last_update = p.newest;
                    // An inferred cadence from a partial batch must not clobber
                    // the stored one; only an explicit frequency overwrites.
                    if let Some(f) = explicit_frequency {
                        entry.metadata.frequency = f;
                    }
                    if let Some(w) = window {
                        trim_window(&mut entry.data, w);
                    }
                }
            }
        }
        self.set_primary_frequency(frequency);
        Ok(())
    }
}

/// Build one validated series, rejecting columns with zero real observations.
fn prepare_one(
    symbol: &str,
    name: &str,
    data: SeriesData,
    frequency: Frequency,
    fields: &MetaMap,
) -> Result<Prepared, TesseraError> {
    let Some((&newest, _)) = data.iter().next_back() else {
        return Err(TesseraError::InvalidArg(format!(
            "column '{name}' has no observations for '{symbol}'"
        )));
    };
    let mut metadata = SeriesMetadata::new(symbol, name, frequency, newest);
    apply_fields(&mut metadata, fields)?;
    Ok(Prepared {
        key: SeriesKey::new(symbol, name),
        data,
        metadata,
        fields: fields.clone(),
        newest,
    })
}

/// Route resolved metadata fields into the typed record: known keys go to
/// their typed fields with type checking, everything else lands in `custom`.
fn apply_fields(meta: &mut SeriesMetadata, fields: &MetaMap) -> Result<(), TesseraError> {
    for (key, value) in fields {
        match key.as_str() {
            "source" => meta.source = expect_string(key, value)?,
            "forecast_origin" => meta.forecast_origin = Some(expect_timestamp(key, value)?),
            "color" => meta.color = Some(expect_string(key, value)?),
            "line_style" => meta.line_style = expect_string(key, value)?,
            "opacity" => meta.opacity = expect_f64(key, value)?,
            "display_axis" => meta.display_axis = expect_i32(key, value)?,
            _ => {
                meta.custom.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(())
}

/// Copy only the fields named in `fields` from a freshly built record onto
/// a stored one. The values in `built` already passed `apply_fields`, so
/// this overlay cannot fail.
fn overlay_fields(stored: &mut SeriesMetadata, built: &SeriesMetadata, fields: &MetaMap) {
    for (key, value) in fields {
        match key.as_str() {
            "source" => stored.source = built.source.clone(),
            "forecast_origin" => stored.forecast_origin = built.forecast_origin,
            "color" => stored.color = built.color.clone(),
            "line_style" => stored.line_style = built.line_style.clone(),
            "opacity" => stored.opacity = built.opacity,
            "display_axis" => stored.display_axis = built.display_axis,
            _ => {
                stored.custom.insert(key.clone(), value.clone());
            }
        }
    }
}

fn fallback_frequency(inferred: Option<Frequency>) -> Frequency {
    inferred.unwrap_or_else(|| {
        tracing::warn!(
            "could not infer frequency; defaulting to business-day — pass an explicit frequency if incorrect"
        );
        Frequency::BusinessDaily
    })
}

fn expect_string(key: &str, value: &Value) -> Result<String, TesseraError> {
    value
        .as_str()
        .map(ToOwned::to_owned)
        .ok_or_else(|| TesseraError::Metadata {
            field: key.to_owned(),
            msg: format!("expected a string, got {value}"),
        })
}

fn expect_timestamp(key: &str, value: &Value) -> Result<DateTime<Utc>, TesseraError> {
    let text = value.as_str().ok_or_else(|| TesseraError::Metadata {
        field: key.to_owned(),
        msg: format!("expected an RFC 3339 timestamp string, got {value}"),
    })?;
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TesseraError::Metadata {
            field: key.to_owned(),
            msg: format!("invalid RFC 3339 timestamp '{text}': {e}"),
        })
}

fn expect_f64(key: &str, value: &Value) -> Result<f64, TesseraError> {
    value.as_f64().ok_or_else(|| TesseraError::Metadata {
        field: key.to_owned(),
        msg: format!("expected a number, got {value}"),
    })
}

fn expect_i32(key: &str, value: &Value) -> Result<i32, TesseraError> {
    value
        .as_i64()
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| TesseraError::Metadata {
            field: key.to_owned(),
            msg: format!("expected an integer, got {value}"),
        })
}
