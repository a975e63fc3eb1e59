mod adapter;
mod equivalence;
mod generator;
mod normalize;
mod schema_queries;

use dbsync_core::{
    Column, ConnectionConfig, DatabaseAdapter, Dialect, EquivalencePolicy, Result, Statement,
    TokenOp, Value,
};

pub use adapter::{parse_schema_search_path, parse_server_version};

#[derive(Debug, Default, Clone, Copy)]
pub struct MssqlDialect;

impl Dialect for MssqlDialect {
    fn name(&self) -> &'static str {
        "mssql"
    }

    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn DatabaseAdapter>> {
        adapter::connect(config)
    }

    fn type_name(&self, column: &Column) -> String {
        normalize::type_name(column)
    }

    fn quote_ident(&self, ident: &str) -> String {
        format!("[{}]", ident.replace(']', "]]"))
    }

    fn value_literal(&self, value: &Value) -> String {
        match value {
            Value::String(text) => format!("N'{}'", text.replace('\'', "''")),
            Value::Bool(flag) => u8::from(*flag).to_string(),
            other => other.to_sql_literal(),
        }
    }

    fn supports_catalogs(&self) -> bool {
        true
    }

    fn batch_separator(&self) -> &'static str {
        "GO"
    }

    fn equivalence_policy(&self) -> &'static dyn EquivalencePolicy {
        &equivalence::MSSQL_EQUIVALENCE_POLICY
    }

    fn generate_ddl(&self, op: &TokenOp) -> Result<Vec<Statement>> {
        generator::generate_ddl(self, op)
    }
}
