use std::collections::BTreeMap;

use crate::{Column, NameMatching, QualifiedName, Value};

/// Supplies backfill values for mandatory columns added to populated tables.
pub trait ValueForNullProvider: Send + Sync {
    fn value_for(&self, table: &QualifiedName, column: &Column) -> Option<Value>;

    fn has_value_for(&self, table: &QualifiedName, column: &Column) -> bool {
        self.value_for(table, column).is_some()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyValueForNullProvider;

impl ValueForNullProvider for EmptyValueForNullProvider {
    fn value_for(&self, _table: &QualifiedName, _column: &Column) -> Option<Value> {
        None
    }
}

/// Fixed values keyed by `table.column`, matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct FixedValueForNullProvider {
    values: BTreeMap<String, Value>,
}

impl FixedValueForNullProvider {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value(mut self, table: &str, column: &str, value: Value) -> Self {
        self.values.insert(key(table, column), value);
        self
    }
}

impl ValueForNullProvider for FixedValueForNullProvider {
    fn value_for(&self, table: &QualifiedName, column: &Column) -> Option<Value> {
        self.values.get(&key(&table.name, &column.name)).cloned()
    }
}

fn key(table: &str, column: &str) -> String {
    let matching = NameMatching::CaseInsensitive;
    format!("{}.{}", matching.key(table), matching.key(column))
}
