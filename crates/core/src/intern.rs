//! Per-result string interning.

use std::collections::HashMap;

/// Builds the deduplicated string table of one aggregate result.
///
/// Strings are assigned dense `u32` indices in first-seen order.
/// Indices are only meaningful within the result the table ships with.
#[derive(Debug, Default)]
pub struct StringInterner {
    table: Vec<String>,
    index: HashMap<String, u32>,
}

impl StringInterner {
    /// Create an empty interner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `s`, returning its index in the table.
    pub fn intern(&mut self, s: &str) -> u32 {
        if let Some(&idx) = self.index.get(s) {
            return idx;
        }
        let idx = self.table.len() as u32;
        self.table.push(s.to_owned());
        self.index.insert(s.to_owned(), idx);
        idx
    }

    /// Number of distinct strings interned so far.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether nothing has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Consume the interner, yielding the first-seen-ordered table.
    pub fn into_table(self) -> Vec<String> {
        self.table
    }
}
