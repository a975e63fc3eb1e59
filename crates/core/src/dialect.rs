use crate::{
    Column, ConnectionConfig, DEFAULT_EQUIVALENCE_POLICY, DatabaseAdapter, EquivalencePolicy,
    QualifiedName, Result, Statement, TokenOp, Value,
};

/// Database-specific DDL syntax and type mapping.
pub trait Dialect: Send + Sync {
    fn name(&self) -> &'static str;

    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn DatabaseAdapter>>;

    /// Native type name for the column, including length, precision and scale.
    fn type_name(&self, column: &Column) -> String;

    fn quote_ident(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn qualified_name(&self, name: &QualifiedName) -> String {
        let mut parts = Vec::with_capacity(3);
        if self.supports_catalogs()
            && let Some(catalog) = &name.catalog
        {
            parts.push(self.quote_ident(catalog));
        }
        if self.supports_schemas()
            && let Some(schema) = &name.schema
        {
            parts.push(self.quote_ident(schema));
        }
        parts.push(self.quote_ident(&name.name));
        parts.join(".")
    }

    fn value_literal(&self, value: &Value) -> String {
        value.to_sql_literal()
    }

    fn supports_catalogs(&self) -> bool {
        false
    }

    fn supports_schemas(&self) -> bool {
        true
    }

    fn supports_fk_constraints(&self) -> bool {
        true
    }

    fn batch_separator(&self) -> &'static str {
        ""
    }

    fn equivalence_policy(&self) -> &'static dyn EquivalencePolicy {
        &DEFAULT_EQUIVALENCE_POLICY
    }

    /// Statements that apply `op` to the database.
    fn generate_ddl(&self, op: &TokenOp) -> Result<Vec<Statement>>;
}
