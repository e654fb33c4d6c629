//! Hierarchy errors and derivation warnings (no external dependencies)

use thiserror::Error;

/// Fatal or caller-recoverable failures of the hierarchy index.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    /// A configured column name does not exist on the record source.
    /// Surfaced at flattening time; nothing is derived.
    #[error("column not found on record source: {0}")]
    MissingColumn(String),

    #[error("no entry with id: {0}")]
    NotFound(String),

    #[error("hierarchy level index out of range: {index} (level count: {count})")]
    LevelOutOfRange { index: usize, count: usize },
}

/// Result type for hierarchy operations.
pub type HierarchyResult<T> = Result<T, HierarchyError>;

/// Non-fatal data-quality findings collected during derivation.
///
/// Warnings never abort the derivation; they are kept on the derived
/// state and also emitted through `tracing::warn!`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchyWarning {
    /// A later record reused an existing id and overwrote the earlier
    /// one in the mapping view. The ordered view keeps both.
    DuplicateId { id: String },

    /// An entry's ancestor chain looped back to the entry itself; the
    /// entry was promoted to an additional root to break the cycle.
    CyclicRelationship { id: String },
}
