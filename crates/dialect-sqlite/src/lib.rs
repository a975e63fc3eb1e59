mod adapter;
mod generator;
mod normalize;
mod schema_queries;

use dbsync_core::{
    Column, ConnectionConfig, DatabaseAdapter, Dialect, Result, Statement, TokenOp, Value,
};

pub use adapter::parse_server_version;

#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn DatabaseAdapter>> {
        adapter::connect(config)
    }

    fn type_name(&self, column: &Column) -> String {
        normalize::type_name(column)
    }

    fn value_literal(&self, value: &Value) -> String {
        match value {
            Value::Bool(flag) => i32::from(*flag).to_string(),
            other => other.to_sql_literal(),
        }
    }

    fn supports_schemas(&self) -> bool {
        false
    }

    /// Foreign keys can only be declared inside `CREATE TABLE`.
    fn supports_fk_constraints(&self) -> bool {
        false
    }

    fn generate_ddl(&self, op: &TokenOp) -> Result<Vec<Statement>> {
        generator::generate_ddl(self, op)
    }
}
