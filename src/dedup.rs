// 🔁 Dedup Collector - unique canonical keys in first-seen order
// One provider call per unique number is the whole point: duplicates across
// rows and columns collapse before anything touches the network

use crate::columns::PhoneColumn;
use crate::normalize::{normalize, KeyConvention};
use crate::table::SheetTable;
use std::collections::HashSet;

/// Collect every normalizable phone value under the given columns into a
/// deduplicated, order-stable key sequence.
///
/// Traversal is column-major and fixed: all rows of the first phone column,
/// then all rows of the next. Rejected cells are dropped silently. The first
/// occurrence of a key decides its position.
pub fn collect_unique_keys(
    table: &SheetTable,
    columns: &[PhoneColumn],
    convention: KeyConvention,
) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut keys = Vec::new();

    for column in columns {
        for cell in table.column_values(column.index) {
            if let Some(key) = normalize(cell, convention) {
                if seen.insert(key.clone()) {
                    keys.push(key);
                }
            }
        }
    }

    keys
}

// ============================================================================
// TESTS
// ============================================================================
