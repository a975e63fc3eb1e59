mod adapter;
mod config;
mod context;
pub mod ddl;
mod dialect;
mod diff;
mod error;
mod executor;
mod factory;
mod filter;
mod ir;
mod orchestrator;
mod ordering;
mod renderer;
mod statement;
mod token;
mod value_for_null;

pub use adapter::{COMMIT_SQL, DatabaseAdapter, ROLLBACK_SQL, Transaction};
pub use config::{ConnectionConfig, Version};
pub use context::{MergerContext, ModelMergeDelegate, NoopModelMergeDelegate};
pub use dialect::Dialect;
pub use diff::{
    DEFAULT_EQUIVALENCE_POLICY, DbMerger, DbMergerBuilder, DefaultEquivalencePolicy,
    EquivalencePolicy, EquivalencePolicyContractError, MergerOptions, reverse_tokens,
    to_model_tokens, verify_equivalence_policy_contract,
};
pub use error::{
    ConfigError, Error, ExecutionError, FactoryError, GenerateError, ModelError, Result,
};
pub use executor::{
    ExecutionPolicy, ExecutionReport, Executor, TokenFailure, format_token_line, log_tokens,
};
pub use factory::TokenFactory;
pub use filter::{
    CatalogFilter, EntityFilters, FiltersConfig, IncludeTableFilter, PatternFilter, SchemaFilter,
    TableFilter,
};
pub use ir::{
    Column, DataMap, DataType, ForeignKeyRow, Join, NameMatching, QualifiedName, Relationship,
    Table, Value, attach_foreign_keys,
};
pub use orchestrator::{Mode, Orchestrator, OrchestratorOutput, SyncOptions};
pub use ordering::sort_tokens;
pub use renderer::Renderer;
pub use statement::Statement;
pub use token::{Direction, MergerToken, TokenOp};
pub use value_for_null::{
    EmptyValueForNullProvider, FixedValueForNullProvider, ValueForNullProvider,
};
