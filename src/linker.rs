//! Tree linking: flat entries → forest
//!
//! Single pass over the distinct entries in source order. Parents may
//! appear before or after their children; resolution goes through the id
//! mapping, not through source order. A node whose parent id is null,
//! empty or unknown becomes a root — promoted, never dropped. A node
//! whose ancestor chain loops back to itself is promoted to an
//! additional root, breaking the cycle exactly once.

use std::collections::{HashMap, HashSet};

use generational_arena::Index;
use tracing::{instrument, warn};

use crate::arena::Forest;
use crate::errors::HierarchyWarning;
use crate::flat::{FlatEntry, FlatSet};

/// Forest plus the id → node mapping produced by linking.
#[derive(Debug, Default)]
pub struct Linked {
    pub forest: Forest,
    pub node_of: HashMap<String, Index>,
    pub warnings: Vec<HierarchyWarning>,
}

/// How one entry was resolved against its declared parent.
enum Resolution {
    Root,
    CycleRoot,
    Child,
}

/// Link all distinct flat entries into a forest.
#[instrument(level = "debug", skip(flat))]
pub fn link(flat: &FlatSet) -> Linked {
    let mut linked = Linked::default();

    // First pass: one arena node per distinct id, so a parent can be
    // resolved regardless of where source order put it.
    for (pos, entry) in flat.iter_distinct() {
        let idx = linked.forest.insert_node(pos);
        linked.node_of.insert(entry.id.clone(), idx);
    }

    // Second pass, same order: decide each entry's effective parent and
    // wire the links. `effective` records decisions already made so the
    // cycle walk never loops through a broken cycle again.
    let mut effective: HashMap<String, Option<String>> = HashMap::new();
    for (_, entry) in flat.iter_distinct() {
        let resolution = resolve(entry, flat, &effective);

        let parent = match resolution {
            Resolution::Child => entry.parent_id.clone(),
            Resolution::Root => None,
            Resolution::CycleRoot => {
                warn!(id = %entry.id, "ancestor chain loops back, promoting to root");
                linked.warnings.push(HierarchyWarning::CyclicRelationship {
                    id: entry.id.clone(),
                });
                None
            }
        };

        let Some(&idx) = linked.node_of.get(&entry.id) else {
            continue;
        };
        match parent.as_deref().and_then(|p| linked.node_of.get(p)) {
            Some(&parent_idx) => linked.forest.attach_child(parent_idx, idx),
            None => linked.forest.push_root(idx),
        }
        effective.insert(entry.id.clone(), parent);
    }

    linked
}

/// Walk the ancestor chain of `entry`, following effective parents for
/// entries already decided and declared parents otherwise.
///
/// The walk is bounded: it stops at the first revisited id. Only a chain
/// that returns to `entry` itself promotes it; an upstream cycle not
/// containing `entry` links normally and is broken later, when one of
/// its own members is processed.
fn resolve(
    entry: &FlatEntry,
    flat: &FlatSet,
    effective: &HashMap<String, Option<String>>,
) -> Resolution {
    let Some(parent_id) = entry.parent_id.as_deref() else {
        return Resolution::Root;
    };
    if !flat.contains(parent_id) {
        // Orphan: declared parent is absent from the flat set
        return Resolution::Root;
    }

    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(entry.id.as_str());
    let mut current = parent_id;

    loop {
        if current == entry.id {
            return Resolution::CycleRoot;
        }
        if !seen.insert(current) {
            return Resolution::Child;
        }
        let next = match effective.get(current) {
            Some(decided) => decided.as_deref(),
            None => flat.get(current).and_then(|e| e.parent_id.as_deref()),
        };
        match next {
            Some(n) if flat.contains(n) => current = n,
            _ => return Resolution::Child,
        }
    }
}
