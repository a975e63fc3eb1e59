use crate::{Column, DataMap, DatabaseAdapter, Dialect, NameMatching, Relationship, Table};

/// Observer of ToModel changes, e.g. to keep dependent mapping layers in sync.
pub trait ModelMergeDelegate {
    fn table_added(&self, _table: &Table) {}

    fn table_removed(&self, _table: &Table) {}

    fn column_added(&self, _table: &Table, _column: &Column) {}

    fn column_removed(&self, _table: &Table, _column: &Column) {}

    fn column_changed(&self, _table: &Table, _column: &Column) {}

    fn relationship_added(&self, _table: &Table, _relationship: &Relationship) {}

    fn relationship_removed(&self, _table: &Table, _relationship: &Relationship) {}

    fn primary_key_changed(&self, _table: &Table) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopModelMergeDelegate;

impl ModelMergeDelegate for NoopModelMergeDelegate {}

static NOOP_DELEGATE: NoopModelMergeDelegate = NoopModelMergeDelegate;

/// What tokens execute against: the model they mutate (ToModel) and the
/// connection they run DDL on (ToDb).
pub struct MergerContext<'a> {
    dialect: &'a dyn Dialect,
    data_map: &'a mut DataMap,
    adapter: Option<&'a dyn DatabaseAdapter>,
    delegate: &'a dyn ModelMergeDelegate,
    name_matching: NameMatching,
}

impl<'a> MergerContext<'a> {
    pub fn new(dialect: &'a dyn Dialect, data_map: &'a mut DataMap) -> Self {
        Self {
            dialect,
            data_map,
            adapter: None,
            delegate: &NOOP_DELEGATE,
            name_matching: NameMatching::default(),
        }
    }

    #[must_use]
    pub fn with_adapter(mut self, adapter: &'a dyn DatabaseAdapter) -> Self {
        self.adapter = Some(adapter);
        self
    }

    #[must_use]
    pub fn with_delegate(mut self, delegate: &'a dyn ModelMergeDelegate) -> Self {
        self.delegate = delegate;
        self
    }

    #[must_use]
    pub fn with_name_matching(mut self, name_matching: NameMatching) -> Self {
        self.name_matching = name_matching;
        self
    }

    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    pub fn data_map(&self) -> &DataMap {
        self.data_map
    }

    pub fn data_map_mut(&mut self) -> &mut DataMap {
        self.data_map
    }

    pub fn adapter(&self) -> Option<&'a dyn DatabaseAdapter> {
        self.adapter
    }

    pub fn delegate(&self) -> &'a dyn ModelMergeDelegate {
        self.delegate
    }

    pub fn name_matching(&self) -> NameMatching {
        self.name_matching
    }
}
