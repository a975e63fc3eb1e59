use dbsync_core::{Column, EquivalencePolicy};

use crate::normalize;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MysqlEquivalencePolicy;

pub(crate) static MYSQL_EQUIVALENCE_POLICY: MysqlEquivalencePolicy = MysqlEquivalencePolicy;

/// Compares the column types MySQL would create, so `NVARCHAR(20)` in the
/// model matches a `varchar(20)` column.
impl EquivalencePolicy for MysqlEquivalencePolicy {
    fn is_equivalent_type(&self, existing: &Column, target: &Column) -> bool {
        normalize::type_name(existing) == normalize::type_name(target)
    }
}
