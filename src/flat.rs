//! Flattening pass: record-source rows → normalized flat entries
//!
//! Produces the canonical ordered store plus the id mapping derived from
//! it. Ids are case-folded here, once; everything downstream compares
//! them with plain equality.

use std::collections::{BTreeMap, HashMap};

use tracing::{instrument, warn};

use crate::errors::{HierarchyError, HierarchyResult, HierarchyWarning};
use crate::settings::HierarchySettings;
use crate::source::RecordSource;

/// Normalized projection of one source row. Immutable after flattening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatEntry {
    /// Case-folded id
    pub id: String,
    /// Label column verbatim, may carry the ancestor path
    pub raw_label: String,
    /// Label with the ancestor-path prefix removed and trimmed
    pub self_name: String,
    /// Case-folded parent id, `None` for roots
    pub parent_id: Option<String>,
    /// Extra column values keyed by configured suffix; empty values are
    /// never attached
    pub extras: BTreeMap<String, String>,
}

/// Flattened rows: ordered store plus id mapping.
///
/// The ordered store keeps every occurrence in source order; the mapping
/// points at the last occurrence of each id. The two views therefore
/// disagree on count exactly when duplicate ids are present.
#[derive(Debug, Default)]
pub struct FlatSet {
    entries: Vec<FlatEntry>,
    by_id: HashMap<String, usize>,
    warnings: Vec<HierarchyWarning>,
}

impl FlatSet {
    /// Ordered view, source order, duplicates included.
    pub fn entries(&self) -> &[FlatEntry] {
        &self.entries
    }

    /// Mapping view: entry for an already case-folded id.
    pub fn get(&self, folded_id: &str) -> Option<&FlatEntry> {
        self.by_id.get(folded_id).map(|&pos| &self.entries[pos])
    }

    pub fn contains(&self, folded_id: &str) -> bool {
        self.by_id.contains_key(folded_id)
    }

    /// Number of distinct ids.
    pub fn distinct_count(&self) -> usize {
        self.by_id.len()
    }

    /// Entries that won the mapping view, in source order, with their
    /// position in the ordered store. One item per distinct id;
    /// superseded duplicates are skipped.
    pub fn iter_distinct(&self) -> impl Iterator<Item = (usize, &FlatEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|&(pos, entry)| self.by_id.get(&entry.id) == Some(&pos))
    }

    pub fn warnings(&self) -> &[HierarchyWarning] {
        &self.warnings
    }
}

/// Strip the ancestor-path prefix from a label.
///
/// Keeps everything after the last occurrence of `separator`, trimmed of
/// surrounding whitespace; a label without the separator is returned
/// whole, trimmed.
pub fn self_name(label: &str, separator: &str) -> String {
    let tail = if separator.is_empty() {
        label
    } else {
        label
            .rfind(separator)
            .map(|at| &label[at + separator.len()..])
            .unwrap_or(label)
    };
    tail.trim().to_string()
}

/// Flatten all rows of `source` into a [`FlatSet`].
///
/// Fails with [`HierarchyError::MissingColumn`] if any configured column
/// (including derived extra-column keys) is absent from the source
/// schema. Null cell values are not errors: a null id or label folds to
/// the empty string, a null or empty relationship value means no parent.
#[instrument(level = "debug", skip(source, settings))]
pub fn flatten(
    source: &dyn RecordSource,
    settings: &HierarchySettings,
) -> HierarchyResult<FlatSet> {
    for column in [
        &settings.id_column_name,
        &settings.text_column_name,
        &settings.relationship_column_name,
    ] {
        if !source.has_column(column) {
            return Err(HierarchyError::MissingColumn(column.clone()));
        }
    }

    // Whole-column fetch for extras, aligned by row index
    let mut extra_columns: Vec<(&str, Vec<Option<String>>)> = Vec::new();
    for suffix in &settings.additional_columns {
        let key = settings.extra_column_key(suffix);
        let values = source
            .column_values(&key)
            .ok_or(HierarchyError::MissingColumn(key))?;
        extra_columns.push((suffix.as_str(), values));
    }

    let mut flat = FlatSet::default();
    for row in 0..source.row_count() {
        let mut entry = flatten_row(source, settings, row);
        for (suffix, values) in &extra_columns {
            if let Some(Some(value)) = values.get(row) {
                if !value.is_empty() {
                    entry.extras.insert(suffix.to_string(), value.clone());
                }
            }
        }

        let pos = flat.entries.len();
        if flat.by_id.insert(entry.id.clone(), pos).is_some() {
            warn!(id = %entry.id, "duplicate id, later row overwrites mapping view");
            flat.warnings
                .push(HierarchyWarning::DuplicateId { id: entry.id.clone() });
        }
        flat.entries.push(entry);
    }

    Ok(flat)
}

fn flatten_row(
    source: &dyn RecordSource,
    settings: &HierarchySettings,
    row: usize,
) -> FlatEntry {
    let raw_label = source
        .value(row, &settings.text_column_name)
        .unwrap_or_default()
        .to_string();
    let parent_id = source
        .value(row, &settings.relationship_column_name)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase);

    FlatEntry {
        id: source
            .value(row, &settings.id_column_name)
            .unwrap_or_default()
            .to_lowercase(),
        self_name: self_name(&raw_label, &settings.text_separator),
        raw_label,
        parent_id,
        extras: BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryTable;

    fn table() -> MemoryTable {
        let mut table = MemoryTable::new(["id", "text", "parent", "text_code"]);
        table
            .push_row([Some("A1"), Some("Root"), None, Some("r-01")])
            .push_row([Some("B2"), Some("Root|Child"), Some("A1"), Some("")])
            .push_row([Some("C3"), Some(" Root | Leaf "), Some("b2"), None]);
        table
    }

    #[test]
    fn test_self_name_strips_ancestor_path() {
        assert_eq!(self_name("A|B|C", "|"), "C");
        assert_eq!(self_name("Solo", "|"), "Solo");
        assert_eq!(self_name(" A | B ", "|"), "B");
        assert_eq!(self_name("A::B::C", "::"), "C");
        assert_eq!(self_name(" padded ", ""), "padded");
    }

    #[test]
    fn test_flatten_case_folds_ids_and_parents() {
        let flat = flatten(&table(), &HierarchySettings::default()).unwrap();
        assert_eq!(flat.entries().len(), 3);
        assert_eq!(flat.entries()[0].id, "a1");
        assert_eq!(flat.entries()[1].parent_id.as_deref(), Some("a1"));
        assert_eq!(flat.entries()[2].parent_id.as_deref(), Some("b2"));
        assert_eq!(flat.entries()[2].self_name, "Leaf");
        assert_eq!(flat.entries()[2].raw_label, " Root | Leaf ");
    }

    #[test]
    fn test_flatten_attaches_only_nonempty_extras() {
        let settings = HierarchySettings::default().with_additional_columns(["_code"]);
        let flat = flatten(&table(), &settings).unwrap();
        assert_eq!(flat.entries()[0].extras.get("_code").unwrap(), "r-01");
        assert!(flat.entries()[1].extras.is_empty());
        assert!(flat.entries()[2].extras.is_empty());
    }

    #[test]
    fn test_flatten_missing_configured_column() {
        let settings = HierarchySettings::default().with_relationship_column("ancestor");
        let err = flatten(&table(), &settings).unwrap_err();
        assert_eq!(err, HierarchyError::MissingColumn("ancestor".to_string()));
    }

    #[test]
    fn test_flatten_missing_extra_column() {
        let settings = HierarchySettings::default().with_additional_columns(["_weight"]);
        let err = flatten(&table(), &settings).unwrap_err();
        assert_eq!(
            err,
            HierarchyError::MissingColumn("text_weight".to_string())
        );
    }

    #[test]
    fn test_duplicate_id_overwrites_mapping_keeps_order() {
        let mut table = MemoryTable::new(["id", "text", "parent"]);
        table
            .push_row([Some("X"), Some("First"), None])
            .push_row([Some("x"), Some("Second"), None]);
        let flat = flatten(&table, &HierarchySettings::default()).unwrap();

        assert_eq!(flat.entries().len(), 2);
        assert_eq!(flat.distinct_count(), 1);
        assert_eq!(flat.get("x").unwrap().raw_label, "Second");
        assert_eq!(
            flat.warnings(),
            &[HierarchyWarning::DuplicateId { id: "x".to_string() }]
        );
        let distinct: Vec<_> = flat.iter_distinct().collect();
        assert_eq!(distinct.len(), 1);
        assert_eq!(distinct[0].0, 1);
        assert_eq!(distinct[0].1.raw_label, "Second");
    }
}
