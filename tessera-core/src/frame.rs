//! Structural table model for ingestion input and aligned output.
//!
//! A [`Frame`] is the Rust stand-in for the loosely shaped tables the
//! collection accepts: instead of duck-typing an index at runtime, the index
//! and column structure are explicit tagged variants that the ingestion
//! entry point classifies up front. Cells are `Option<f64>`; a `None` cell
//! means "no observation for this column at this row".

use chrono::{DateTime, Utc};
use tessera_types::TesseraError;

/// Row axis of a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameIndex {
    /// Plain timestamp axis (the "wide" shapes).
    Time(Vec<DateTime<Utc>>),
    /// Two-level (timestamp, entity) axis (the "tall" shape). `level` is the
    /// name of the entity level; ingestion requires it to be `"symbol"` or
    /// `"id"`.
    TimeEntity {
        /// Name of the second index level.
        level: String,
        /// Stacked rows, one `(timestamp, entity)` pair per observation row.
        rows: Vec<(DateTime<Utc>, String)>,
    },
}

impl FrameIndex {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Time(ts) => ts.len(),
            Self::TimeEntity { rows, .. } => rows.len(),
        }
    }

    /// Whether the axis has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Column axis of a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameColumns {
    /// Single-level column names.
    Flat(Vec<String>),
    /// Two-level column labels with per-level names. Ingestion requires one
    /// of `level_names` to be `"symbol"` or `"id"`; the other level carries
    /// series names.
    Multi {
        /// Names of the two label levels, in label order.
        level_names: (String, String),
        /// One two-part label per column.
        labels: Vec<(String, String)>,
    },
}

impl FrameColumns {
    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Flat(names) => names.len(),
            Self::Multi { labels, .. } => labels.len(),
        }
    }

    /// Whether there are no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A rectangular, timestamp-indexed table of optional numeric cells.
///
/// Values are stored column-major: `values[c][r]` is the cell of column `c`
/// at row `r`. Constructors validate that every column has exactly one cell
/// per index row.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    index: FrameIndex,
    columns: FrameColumns,
    values: Vec<Vec<Option<f64>>>,
}

impl Frame {
    /// Build a frame from its parts, validating dimensions.
    ///
    /// # Errors
    /// Returns [`TesseraError::Frame`] if the number of value columns does
    /// not match the column axis, or if any column's length differs from the
    /// index length.
    pub fn new(
        index: FrameIndex,
        columns: FrameColumns,
        values: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, TesseraError> {
        if values.len() != columns.len() {
            return Err(TesseraError::frame(format!(
                "{} value columns for {} column labels",
                values.len(),
                columns.len()
            )));
        }
        let rows = index.len();
        for (i, col) in values.iter().enumerate() {
            if col.len() != rows {
                return Err(TesseraError::frame(format!(
                    "column {i} has {} cells for {rows} index rows",
                    col.len()
                )));
            }
        }
        Ok(Self {
            index,
            columns,
            values,
        })
    }

    /// Internal constructor for parts whose dimensions are correct by
    /// construction (the alignment engine builds every column on the union
    /// timeline).
    pub(crate) fn from_parts(
        index: FrameIndex,
        columns: FrameColumns,
        values: Vec<Vec<Option<f64>>>,
    ) -> Self {
        debug_assert_eq!(values.len(), columns.len());
        debug_assert!(values.iter().all(|c| c.len() == index.len()));
        Self {
            index,
            columns,
            values,
        }
    }

    /// The canonical empty frame: no rows, no columns.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            index: FrameIndex::Time(Vec::new()),
            columns: FrameColumns::Flat(Vec::new()),
            values: Vec::new(),
        }
    }

    /// Build a wide frame with flat columns over a single timestamp axis.
    ///
    /// # Errors
    /// Returns [`TesseraError::Frame`] on a column/index length mismatch.
    pub fn wide(
        timestamps: Vec<DateTime<Utc>>,
        columns: Vec<(String, Vec<Option<f64>>)>,
    ) -> Result<Self, TesseraError> {
        let (names, values): (Vec<_>, Vec<_>) = columns.into_iter().unzip();
        Self::new(
            FrameIndex::Time(timestamps),
            FrameColumns::Flat(names),
            values,
        )
    }

    /// Build a wide frame with two-level `(level_names)` column labels.
    ///
    /// # Errors
    /// Returns [`TesseraError::Frame`] on a column/index length mismatch.
    pub fn wide_multi(
        timestamps: Vec<DateTime<Utc>>,
        level_names: (&str, &str),
        columns: Vec<((String, String), Vec<Option<f64>>)>,
    ) -> Result<Self, TesseraError> {
        let (labels, values): (Vec<_>, Vec<_>) = columns.into_iter().unzip();
        Self::new(
            FrameIndex::Time(timestamps),
            FrameColumns::Multi {
                level_names: (level_names.0.to_owned(), level_names.1.to_owned()),
                labels,
            },
            values,
        )
    }

    /// Build a tall frame: stacked `(timestamp, entity)` rows with flat data
    /// columns. `level` names the entity index level.
    ///
    /// # Errors
    /// Returns [`TesseraError::Frame`] on a column/index length mismatch.
    pub fn tall(
        level: &str,
        rows: Vec<(DateTime<Utc>, String)>,
        columns: Vec<(String, Vec<Option<f64>>)>,
    ) -> Result<Self, TesseraError> {
        let (names, values): (Vec<_>, Vec<_>) = columns.into_iter().unzip();
        Self::new(
            FrameIndex::TimeEntity {
                level: level.to_owned(),
                rows,
            },
            FrameColumns::Flat(names),
            values,
        )
    }

    /// Build a one-column wide frame from `(timestamp, value)` pairs.
    #[must_use]
    pub fn single(name: &str, points: &[(DateTime<Utc>, f64)]) -> Self {
        let timestamps = points.iter().map(|(ts, _)| *ts).collect();
        let cells = points.iter().map(|(_, v)| Some(*v)).collect();
        Self {
            index: FrameIndex::Time(timestamps),
            columns: FrameColumns::Flat(vec![name.to_owned()]),
            values: vec![cells],
        }
    }

    /// Row axis.
    #[must_use]
    pub fn index(&self) -> &FrameIndex {
        &self.index
    }

    /// Column axis.
    #[must_use]
    pub fn columns(&self) -> &FrameColumns {
        &self.columns
    }

    /// Number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    /// Number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Whether the frame has no rows and no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty() && self.columns.is_empty()
    }

    /// The timestamp axis, when the index is single-level.
    #[must_use]
    pub fn time_index(&self) -> Option<&[DateTime<Utc>]> {
        match &self.index {
            FrameIndex::Time(ts) => Some(ts),
            FrameIndex::TimeEntity { .. } => None,
        }
    }

    /// Two-level column labels, when the column axis is multi-level.
    #[must_use]
    pub fn multi_labels(&self) -> Option<&[(String, String)]> {
        match &self.columns {
            FrameColumns::Multi { labels, .. } => Some(labels),
            FrameColumns::Flat(_) => None,
        }
    }

    /// Cells of column `col`, in row order.
    #[must_use]
    pub fn column_values(&self, col: usize) -> Option<&[Option<f64>]> {
        self.values.get(col).map(Vec::as_slice)
    }

    /// Cell at `(row, col)`; `None` for a missing cell or out-of-range access.
    #[must_use]
    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(col).and_then(|c| c.get(row)).copied().flatten()
    }

    /// Cells of the flat column named `name`.
    #[must_use]
    pub fn flat_column(&self, name: &str) -> Option<&[Option<f64>]> {
        match &self.columns {
            FrameColumns::Flat(names) => {
                let idx = names.iter().position(|n| n == name)?;
                self.column_values(idx)
            }
            FrameColumns::Multi { .. } => None,
        }
    }

    /// Cells of the multi-level column labeled `(first, second)`.
    #[must_use]
    pub fn multi_column(&self, first: &str, second: &str) -> Option<&[Option<f64>]> {
        match &self.columns {
            FrameColumns::Multi { labels, .. } => {
                let idx = labels
                    .iter()
                    .position(|(a, b)| a == first && b == second)?;
                self.column_values(idx)
            }
            FrameColumns::Flat(_) => None,
        }
    }
}
