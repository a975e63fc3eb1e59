use dbsync_core::{Column, EquivalencePolicy};

use crate::normalize;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MssqlEquivalencePolicy;

pub(crate) static MSSQL_EQUIVALENCE_POLICY: MssqlEquivalencePolicy = MssqlEquivalencePolicy;

impl EquivalencePolicy for MssqlEquivalencePolicy {
    fn is_equivalent_type(&self, existing: &Column, target: &Column) -> bool {
        normalize::type_name(existing) == normalize::type_name(target)
    }
}

#[cfg(test)]
mod tests {
    use dbsync_core::{Column, DataType, verify_equivalence_policy_contract};

    use super::*;

    #[test]
    fn unbounded_character_types_are_equivalent() {
        let policy = MssqlEquivalencePolicy;
        let clob = Column::new("BODY", DataType::Clob);
        let varchar_max = Column::new("BODY", DataType::Varchar);
        let national = Column::new("BODY", DataType::NVarchar);

        assert!(policy.is_equivalent_type(&clob, &varchar_max));
        assert!(!policy.is_equivalent_type(&clob, &national));
        assert_eq!(
            verify_equivalence_policy_contract(
                &policy,
                &[(&clob, &varchar_max), (&clob, &national)]
            ),
            Ok(())
        );
    }
}
