//! Record-source boundary trait for testability
//!
//! The index never fetches its rows through ambient globals; any object
//! fulfilling [`RecordSource`] can back it — a database result set, a
//! parsed file, or the in-memory [`MemoryTable`] used in tests.

use std::collections::HashMap;

/// Ordered, indexable collection of rows with named-column access.
///
/// A `None` cell value means null/absent; it is distinct from a column
/// that does not exist at all, which [`RecordSource::has_column`] guards.
pub trait RecordSource: Send + Sync {
    /// Number of rows in the source.
    fn row_count(&self) -> usize;

    /// Whether the named column exists on the source schema.
    fn has_column(&self, column: &str) -> bool;

    /// Value of `column` at `row`; `None` for a null cell or a row/column
    /// outside the source.
    fn value(&self, row: usize, column: &str) -> Option<&str>;

    /// Entire column as an ordered sequence aligned by row index.
    /// Returns `None` if the column does not exist.
    fn column_values(&self, column: &str) -> Option<Vec<Option<String>>> {
        if !self.has_column(column) {
            return None;
        }
        Some(
            (0..self.row_count())
                .map(|row| self.value(row, column).map(str::to_string))
                .collect(),
        )
    }
}

/// In-memory `RecordSource` backed by column-major storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    columns: Vec<String>,
    by_name: HashMap<String, usize>,
    /// Row-major cells, each row aligned with `columns`
    rows: Vec<Vec<Option<String>>>,
}

impl MemoryTable {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let by_name = columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            columns,
            by_name,
            rows: Vec::new(),
        }
    }

    /// Append a row; missing trailing cells are filled with null.
    pub fn push_row<I, S>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let mut row: Vec<Option<String>> =
            cells.into_iter().map(|c| c.map(Into::into)).collect();
        row.resize(self.columns.len(), None);
        self.rows.push(row);
        self
    }
}

impl RecordSource for MemoryTable {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn has_column(&self, column: &str) -> bool {
        self.by_name.contains_key(column)
    }

    fn value(&self, row: usize, column: &str) -> Option<&str> {
        let col = *self.by_name.get(column)?;
        self.rows.get(row)?.get(col)?.as_deref()
    }
}
