mod compare;
mod policy;

use std::{collections::HashSet, sync::Arc};

pub use policy::{
    DEFAULT_EQUIVALENCE_POLICY, DefaultEquivalencePolicy, EquivalencePolicy,
    EquivalencePolicyContractError, MergerOptions, verify_equivalence_policy_contract,
};

use crate::{
    ConfigError, DataMap, Direction, EntityFilters, FiltersConfig, MergerToken, NameMatching,
    QualifiedName, Result, TokenFactory, TokenOp, ValueForNullProvider, ordering::sort_tokens,
};

/// Computes the ordered tokens that make `target` structurally match
/// `existing`.
pub struct DbMerger<'a> {
    factory: TokenFactory<'a>,
    options: MergerOptions,
    filters: EntityFilters,
    equivalence: &'static dyn EquivalencePolicy,
}

pub struct DbMergerBuilder<'a> {
    factory: TokenFactory<'a>,
    options: MergerOptions,
    equivalence: &'static dyn EquivalencePolicy,
}

impl<'a> DbMerger<'a> {
    pub fn builder(factory: TokenFactory<'a>) -> DbMergerBuilder<'a> {
        DbMergerBuilder {
            factory,
            options: MergerOptions::default(),
            equivalence: factory.dialect().equivalence_policy(),
        }
    }

    pub fn new(factory: TokenFactory<'a>) -> std::result::Result<Self, ConfigError> {
        Self::builder(factory).build()
    }

    pub fn options(&self) -> &MergerOptions {
        &self.options
    }

    pub fn factory(&self) -> &TokenFactory<'a> {
        &self.factory
    }

    /// `existing` is authoritative and `target` is the side to change:
    /// the database for [`Direction::ToDb`], the model for
    /// [`Direction::ToModel`].
    ///
    /// Fails only when a model is malformed, e.g. a primary key naming a
    /// column that the table lacks.
    pub fn merge(&self, existing: &DataMap, target: &DataMap) -> Result<Vec<MergerToken>> {
        let tokens = compare::Comparison::new(self, existing, target).run()?;
        Ok(sort_tokens(tokens))
    }
}

impl<'a> DbMergerBuilder<'a> {
    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.options.direction = direction;
        self
    }

    #[must_use]
    pub fn name_matching(mut self, name_matching: NameMatching) -> Self {
        self.options.name_matching = name_matching;
        self
    }

    #[must_use]
    pub fn skip_relationships(mut self, skip: bool) -> Self {
        self.options.skip_relationships = skip;
        self
    }

    #[must_use]
    pub fn skip_primary_keys(mut self, skip: bool) -> Self {
        self.options.skip_primary_keys = skip;
        self
    }

    #[must_use]
    pub fn filters(mut self, filters: FiltersConfig) -> Self {
        self.options.filters = filters;
        self
    }

    #[must_use]
    pub fn value_for_null(mut self, provider: Arc<dyn ValueForNullProvider>) -> Self {
        self.options.value_for_null = provider;
        self
    }

    #[must_use]
    pub fn equivalence_policy(mut self, policy: &'static dyn EquivalencePolicy) -> Self {
        self.equivalence = policy;
        self
    }

    #[must_use]
    pub fn options(mut self, options: MergerOptions) -> Self {
        self.options = options;
        self
    }

    /// Validates the filters against the dialect before any diffing.
    pub fn build(self) -> std::result::Result<DbMerger<'a>, ConfigError> {
        let filters = self.options.filters.validate(self.factory.dialect())?;
        Ok(DbMerger {
            factory: self.factory,
            options: self.options,
            filters,
            equivalence: self.equivalence,
        })
    }
}

/// Inverts every token and restores dependency order. The result is not the
/// input order reversed: the order is recomputed for the new token kinds.
pub fn reverse_tokens(tokens: &[MergerToken], factory: &TokenFactory<'_>) -> Vec<MergerToken> {
    sort_tokens(
        tokens
            .iter()
            .rev()
            .map(|token| token.create_reverse(factory))
            .collect(),
    )
}

/// Turns a model-to-database token list into the changes that import the
/// database state into the model. Tokens already aimed at the model are
/// kept as they are. The nullability follow-ups of columns the import
/// removes are dropped.
pub fn to_model_tokens(tokens: &[MergerToken], factory: &TokenFactory<'_>) -> Vec<MergerToken> {
    let added = tokens
        .iter()
        .filter(|token| token.direction() == Direction::ToDb)
        .filter_map(|token| match token.op() {
            TokenOp::AddColumn { table, column } => Some(column_key(table, &column.name)),
            _ => None,
        })
        .collect::<HashSet<_>>();

    sort_tokens(
        tokens
            .iter()
            .filter(|token| match token.op() {
                TokenOp::SetNotNull { table, column }
                | TokenOp::SetValueForNull { table, column, .. } => {
                    !added.contains(&column_key(table, &column.name))
                }
                _ => true,
            })
            .map(|token| match token.direction() {
                Direction::ToDb => token.create_reverse(factory),
                Direction::ToModel => token.clone(),
            })
            .collect(),
    )
}

fn column_key(table: &QualifiedName, column: &str) -> (String, String) {
    let matching = NameMatching::CaseInsensitive;
    (matching.key(&table.name), matching.key(column))
}
