//! rowtree: derive a hierarchy from flat parent-linked table rows
//!
//! A flat collection of records, each carrying its own id and an
//! optional parent id, is turned into three consistent views over one
//! canonical node set: a forest of nested nodes, the same nodes grouped
//! by depth level, and O(1) lookup by id. Derivation is lazy and
//! memoized once per [`HierarchyIndex`]; rows come from any
//! [`RecordSource`] the caller supplies.
//!
//! ```
//! use rowtree::{HierarchyIndex, MemoryTable};
//!
//! let mut table = MemoryTable::new(["id", "text", "parent"]);
//! table
//!     .push_row([Some("1"), Some("Root"), None])
//!     .push_row([Some("2"), Some("Root|Child"), Some("1")]);
//!
//! let index = HierarchyIndex::new(table);
//! let roots = index.forest().unwrap();
//! assert_eq!(index.node_entry(roots[0]).unwrap().self_name, "Root");
//! assert_eq!(index.level_count().unwrap(), 2);
//! ```

pub mod arena;
pub mod display;
pub mod errors;
pub mod flat;
pub mod index;
pub mod linker;
pub mod settings;
pub mod source;

pub use arena::{Forest, ForestIterator, Node};
pub use display::TreeDisplay;
pub use errors::{HierarchyError, HierarchyResult, HierarchyWarning};
pub use flat::{self_name, FlatEntry};
pub use index::HierarchyIndex;
pub use settings::HierarchySettings;
pub use source::{MemoryTable, RecordSource};

// Node handles are arena indices; re-exported so callers need not
// depend on generational-arena directly.
pub use generational_arena::Index;
