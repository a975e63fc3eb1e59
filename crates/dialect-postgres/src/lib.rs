mod adapter;
mod equivalence;
mod generator;
mod normalize;
mod schema_queries;

use dbsync_core::{
    Column, ConnectionConfig, DatabaseAdapter, Dialect, EquivalencePolicy, Result, Statement,
    TokenOp,
};

pub use adapter::{parse_search_path, parse_server_version};

#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn DatabaseAdapter>> {
        adapter::connect(config)
    }

    fn type_name(&self, column: &Column) -> String {
        normalize::type_name(column)
    }

    fn equivalence_policy(&self) -> &'static dyn EquivalencePolicy {
        &equivalence::POSTGRES_EQUIVALENCE_POLICY
    }

    fn generate_ddl(&self, op: &TokenOp) -> Result<Vec<Statement>> {
        generator::generate_ddl(self, op)
    }
}
