// 🗃️ Order Record Store - Append-only during traversal, frozen afterwards
// Insertion order is page-traversal order (newest first)

use crate::order::OrderRecord;
use std::ops::Index;
use std::sync::Arc;

// ============================================================================
// BUILDER (write phase)
// ============================================================================

/// Grows monotonically while the pagination controller walks the listing
#[derive(Debug, Default)]
pub struct ResultSetBuilder {
    records: Vec<OrderRecord>,
}

impl ResultSetBuilder {
    pub fn new() -> Self {
        ResultSetBuilder::default()
    }

    pub fn push(&mut self, record: OrderRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// End the write phase. Nothing can be added or changed afterwards
    pub fn freeze(self) -> SessionResultSet {
        SessionResultSet {
            records: self.records.into(),
        }
    }
}

// ============================================================================
// FROZEN RESULT SET (read phase)
// ============================================================================

/// Read-only view shared with the query engine
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResultSet {
    records: Arc<[OrderRecord]>,
}

impl Default for SessionResultSet {
    fn default() -> Self {
        ResultSetBuilder::new().freeze()
    }
}

impl SessionResultSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&OrderRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OrderRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[OrderRecord] {
        &self.records
    }
}

impl Index<usize> for SessionResultSet {
    type Output = OrderRecord;

    fn index(&self, index: usize) -> &OrderRecord {
        &self.records[index]
    }
}

impl<'a> IntoIterator for &'a SessionResultSet {
    type Item = &'a OrderRecord;
    type IntoIter = std::slice::Iter<'a, OrderRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<OrderRecord> for SessionResultSet {
    fn from_iter<I: IntoIterator<Item = OrderRecord>>(iter: I) -> Self {
        let mut builder = ResultSetBuilder::new();
        for record in iter {
            builder.push(record);
        }
        builder.freeze()
    }
}
