use dbsync_core::{Column, EquivalencePolicy};

use crate::normalize;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PostgresEquivalencePolicy;

pub(crate) static POSTGRES_EQUIVALENCE_POLICY: PostgresEquivalencePolicy =
    PostgresEquivalencePolicy;

/// Types are equal when PostgreSQL stores them as the same native type, so
/// `BIT` in the model matches the `boolean` column it was created as.
impl EquivalencePolicy for PostgresEquivalencePolicy {
    fn is_equivalent_type(&self, existing: &Column, target: &Column) -> bool {
        normalize::type_name(existing) == normalize::type_name(target)
    }
}

#[cfg(test)]
mod tests {
    use dbsync_core::{Column, DataType, verify_equivalence_policy_contract};

    use super::*;

    #[test]
    fn storage_aliases_are_equivalent() {
        let policy = PostgresEquivalencePolicy;
        let bit = Column::new("FLAG", DataType::Bit);
        let boolean = Column::new("FLAG", DataType::Boolean);
        let clob = Column::new("BODY", DataType::Clob);
        let text = Column::new("BODY", DataType::LongVarchar);
        let short = Column::new("NAME", DataType::Varchar).with_length(40);
        let long = Column::new("NAME", DataType::Varchar).with_length(80);

        assert!(policy.is_equivalent_type(&bit, &boolean));
        assert!(policy.is_equivalent_type(&clob, &text));
        assert!(!policy.is_equivalent_type(&short, &long));
        assert_eq!(
            verify_equivalence_policy_contract(
                &policy,
                &[(&bit, &boolean), (&clob, &text), (&short, &long)]
            ),
            Ok(())
        );
    }
}
