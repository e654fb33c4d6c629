//! The hierarchy index: lazy, memoized derivation and the query surface
//!
//! Construction stores the record source and settings only; the first
//! query pulls the rows, flattens them, links the forest and buckets the
//! levels, all at once. Every later query is served from the cached
//! derivation. There is no invalidation path: the derived state is
//! immutable, a new source means a new index.

use std::cell::OnceCell;
use std::collections::BTreeMap;

use generational_arena::Index;
use tracing::instrument;

use crate::arena::{Forest, ForestIterator, Node};
use crate::errors::{HierarchyError, HierarchyResult, HierarchyWarning};
use crate::flat::{flatten, FlatEntry, FlatSet};
use crate::linker::{link, Linked};
use crate::settings::HierarchySettings;
use crate::source::RecordSource;

/// Everything computed on first query.
#[derive(Debug)]
struct Derived {
    flat: FlatSet,
    linked: Linked,
    levels: Vec<Vec<Index>>,
    warnings: Vec<HierarchyWarning>,
}

/// Hierarchy derived from a flat record source.
///
/// Memoizes once per instance behind a [`OnceCell`], so the computed /
/// uncomputed state is explicit rather than inferred from emptiness (an
/// empty hierarchy is a legitimate result). The cell makes this type
/// `!Sync`; a concurrent embedding would swap in `OnceLock` or derive
/// eagerly at construction.
#[derive(Debug)]
pub struct HierarchyIndex<S: RecordSource> {
    source: S,
    settings: HierarchySettings,
    derived: OnceCell<Derived>,
}

impl<S: RecordSource> HierarchyIndex<S> {
    /// Index over `source` with default column mappings.
    pub fn new(source: S) -> Self {
        Self::with_settings(source, HierarchySettings::default())
    }

    pub fn with_settings(source: S, settings: HierarchySettings) -> Self {
        Self {
            source,
            settings,
            derived: OnceCell::new(),
        }
    }

    pub fn settings(&self) -> &HierarchySettings {
        &self.settings
    }

    /// Root nodes, in discovery order.
    pub fn forest(&self) -> HierarchyResult<&[Index]> {
        Ok(self.derived()?.linked.forest.roots())
    }

    /// Nodes at depth `level`, breadth-first discovery order.
    pub fn level(&self, level: usize) -> HierarchyResult<&[Index]> {
        let derived = self.derived()?;
        derived
            .levels
            .get(level)
            .map(Vec::as_slice)
            .ok_or(HierarchyError::LevelOutOfRange {
                index: level,
                count: derived.levels.len(),
            })
    }

    pub fn level_count(&self) -> HierarchyResult<usize> {
        Ok(self.derived()?.levels.len())
    }

    /// Maximum node depth; equals [`HierarchyIndex::level_count`].
    pub fn depth(&self) -> HierarchyResult<usize> {
        Ok(self.derived()?.linked.forest.depth())
    }

    /// Ordered flat view, source order, duplicate ids included.
    pub fn flat(&self) -> HierarchyResult<&[FlatEntry]> {
        Ok(self.derived()?.flat.entries())
    }

    /// Entry lookup by id, case-insensitive on the input.
    pub fn entry(&self, id: &str) -> HierarchyResult<&FlatEntry> {
        let folded = id.to_lowercase();
        self.derived()?
            .flat
            .get(&folded)
            .ok_or(HierarchyError::NotFound(folded))
    }

    /// Node lookup by id, case-insensitive on the input.
    pub fn by_id(&self, id: &str) -> HierarchyResult<Index> {
        let folded = id.to_lowercase();
        self.derived()?
            .linked
            .node_of
            .get(&folded)
            .copied()
            .ok_or(HierarchyError::NotFound(folded))
    }

    /// Resolve an arena index handed out by [`HierarchyIndex::forest`],
    /// [`HierarchyIndex::level`] or [`HierarchyIndex::by_id`].
    pub fn node(&self, idx: Index) -> Option<&Node> {
        self.derived.get()?.linked.forest.node(idx)
    }

    /// Flat entry behind a node.
    pub fn node_entry(&self, idx: Index) -> Option<&FlatEntry> {
        let derived = self.derived.get()?;
        let node = derived.linked.forest.node(idx)?;
        derived.flat.entries().get(node.entry)
    }

    /// Extra column values of a node's entry.
    pub fn node_extras(&self, idx: Index) -> Option<&BTreeMap<String, String>> {
        self.node_entry(idx).map(|entry| &entry.extras)
    }

    /// Depth-first traversal over the whole forest.
    pub fn iter(&self) -> HierarchyResult<ForestIterator<'_>> {
        Ok(self.derived()?.linked.forest.iter())
    }

    /// Data-quality findings from derivation: duplicate ids and broken
    /// cycles, in detection order.
    pub fn warnings(&self) -> HierarchyResult<&[HierarchyWarning]> {
        Ok(&self.derived()?.warnings)
    }

    /// Borrow the full forest structure.
    pub fn forest_structure(&self) -> HierarchyResult<&Forest> {
        Ok(&self.derived()?.linked.forest)
    }

    /// Memoized derivation: flatten, link, bucket by level.
    #[instrument(level = "debug", skip(self))]
    fn derived(&self) -> HierarchyResult<&Derived> {
        if let Some(derived) = self.derived.get() {
            return Ok(derived);
        }
        let flat = flatten(&self.source, &self.settings)?;
        let mut linked = link(&flat);
        let levels = linked.forest.level_buckets();
        let mut warnings = flat.warnings().to_vec();
        warnings.append(&mut linked.warnings);
        Ok(self.derived.get_or_init(|| Derived {
            flat,
            linked,
            levels,
            warnings,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryTable;

    fn two_row_index() -> HierarchyIndex<MemoryTable> {
        let mut table = MemoryTable::new(["id", "text", "parent"]);
        table
            .push_row([Some("1"), Some("Root"), None])
            .push_row([Some("2"), Some("Root|Child"), Some("1")]);
        HierarchyIndex::new(table)
    }

    #[test]
    fn test_two_row_scenario() {
        let index = two_row_index();
        let roots = index.forest().unwrap();
        assert_eq!(roots.len(), 1);
        let root = index.node(roots[0]).unwrap();
        assert_eq!(index.node_entry(roots[0]).unwrap().id, "1");
        assert_eq!(root.children.len(), 1);
        assert_eq!(index.node_entry(root.children[0]).unwrap().id, "2");

        assert_eq!(index.level_count().unwrap(), 2);
        assert_eq!(index.level(0).unwrap(), roots);
        let level1 = index.level(1).unwrap();
        assert_eq!(index.node_entry(level1[0]).unwrap().self_name, "Child");
    }

    #[test]
    fn test_level_out_of_range() {
        let index = two_row_index();
        assert_eq!(
            index.level(5).unwrap_err(),
            HierarchyError::LevelOutOfRange { index: 5, count: 2 }
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut table = MemoryTable::new(["id", "text", "parent"]);
        table.push_row([Some("AbC"), Some("Mixed"), None]);
        let index = HierarchyIndex::new(table);
        let lower = index.entry("abc").unwrap();
        let upper = index.entry("ABC").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(index.by_id("aBc").unwrap(), index.by_id("ABC").unwrap());
        assert_eq!(
            index.entry("nope").unwrap_err(),
            HierarchyError::NotFound("nope".to_string())
        );
    }

    #[test]
    fn test_queries_are_idempotent() {
        let index = two_row_index();
        let first: Vec<Index> = index.forest().unwrap().to_vec();
        let second: Vec<Index> = index.forest().unwrap().to_vec();
        // Same node identities, not a recomputed copy
        assert_eq!(first, second);
        assert_eq!(index.by_id("2").unwrap(), index.by_id("2").unwrap());
    }

    #[test]
    fn test_missing_column_surfaces_on_first_query() {
        let table = MemoryTable::new(["id", "text"]);
        let index = HierarchyIndex::new(table);
        assert_eq!(
            index.forest().unwrap_err(),
            HierarchyError::MissingColumn("parent".to_string())
        );
        // Still fails on the next query; nothing was cached
        assert!(index.level_count().is_err());
    }

    #[test]
    fn test_empty_source_yields_empty_hierarchy() {
        let table = MemoryTable::new(["id", "text", "parent"]);
        let index = HierarchyIndex::new(table);
        assert!(index.forest().unwrap().is_empty());
        assert_eq!(index.level_count().unwrap(), 0);
        assert_eq!(index.depth().unwrap(), 0);
        assert!(index.warnings().unwrap().is_empty());
    }
}
