use std::sync::Arc;

use crate::{
    Column, Direction, EmptyValueForNullProvider, FiltersConfig, NameMatching,
    ValueForNullProvider,
};

/// Dialect-specific loosening of column type comparison, e.g. for types a
/// database stores under a different code than the model declares.
pub trait EquivalencePolicy: Send + Sync {
    fn is_equivalent_type(&self, existing: &Column, target: &Column) -> bool {
        existing.same_type(target)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEquivalencePolicy;

impl EquivalencePolicy for DefaultEquivalencePolicy {}

pub static DEFAULT_EQUIVALENCE_POLICY: DefaultEquivalencePolicy = DefaultEquivalencePolicy;

#[derive(Clone)]
pub struct MergerOptions {
    /// Which side the tokens change; the other input is authoritative.
    pub direction: Direction,
    pub name_matching: NameMatching,
    pub skip_relationships: bool,
    pub skip_primary_keys: bool,
    pub filters: FiltersConfig,
    pub value_for_null: Arc<dyn ValueForNullProvider>,
}

impl Default for MergerOptions {
    fn default() -> Self {
        Self {
            direction: Direction::ToDb,
            name_matching: NameMatching::CaseInsensitive,
            skip_relationships: false,
            skip_primary_keys: false,
            filters: FiltersConfig::include_all(),
            value_for_null: Arc::new(EmptyValueForNullProvider),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquivalencePolicyContractError {
    NotSymmetric { case_index: usize },
    NotStable { case_index: usize },
    NotReflexive { case_index: usize },
}

/// Checks that `policy` is reflexive, symmetric and stable over `cases`.
pub fn verify_equivalence_policy_contract(
    policy: &dyn EquivalencePolicy,
    cases: &[(&Column, &Column)],
) -> std::result::Result<(), EquivalencePolicyContractError> {
    for (case_index, (left, right)) in cases.iter().enumerate() {
        if !policy.is_equivalent_type(left, left) || !policy.is_equivalent_type(right, right) {
            return Err(EquivalencePolicyContractError::NotReflexive { case_index });
        }

        let forward_first = policy.is_equivalent_type(left, right);
        let forward_second = policy.is_equivalent_type(left, right);
        if forward_first != forward_second {
            return Err(EquivalencePolicyContractError::NotStable { case_index });
        }

        let backward = policy.is_equivalent_type(right, left);
        if forward_first != backward {
            return Err(EquivalencePolicyContractError::NotSymmetric { case_index });
        }
    }

    Ok(())
}
