mod adapter;
mod equivalence;
mod generator;
mod normalize;
mod schema_queries;

use dbsync_core::{
    Column, ConnectionConfig, DatabaseAdapter, Dialect, EquivalencePolicy, Result, Statement,
    TokenOp, Value,
};

pub use adapter::parse_server_version;

/// MySQL databases are addressed as catalogs; there is no schema level.
#[derive(Debug, Default, Clone, Copy)]
pub struct MysqlDialect;

impl Dialect for MysqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn DatabaseAdapter>> {
        adapter::connect(config)
    }

    fn type_name(&self, column: &Column) -> String {
        normalize::type_name(column)
    }

    fn quote_ident(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    /// Backslashes are escapes inside MySQL string literals.
    fn value_literal(&self, value: &Value) -> String {
        match value {
            Value::String(text) => format!("'{}'", text.replace('\\', "\\\\").replace('\'', "''")),
            other => other.to_sql_literal(),
        }
    }

    fn supports_catalogs(&self) -> bool {
        true
    }

    fn supports_schemas(&self) -> bool {
        false
    }

    fn equivalence_policy(&self) -> &'static dyn EquivalencePolicy {
        &equivalence::MYSQL_EQUIVALENCE_POLICY
    }

    fn generate_ddl(&self, op: &TokenOp) -> Result<Vec<Statement>> {
        generator::generate_ddl(self, op)
    }
}
