use dbsync_core::{
    Column, ConnectionConfig, DatabaseAdapter, Dialect, GenerateError, QualifiedName, Result,
    Statement, TokenOp, ddl,
};

/// Unquoted standard DDL; no database behind it.
#[derive(Debug, Default)]
pub struct OfflineFakeDialect;

impl Dialect for OfflineFakeDialect {
    fn name(&self) -> &'static str {
        "offline_fake"
    }

    fn connect(&self, _config: &ConnectionConfig) -> Result<Box<dyn DatabaseAdapter>> {
        Err(GenerateError::unsupported("Connect", self.name(), "no database behind it").into())
    }

    fn type_name(&self, column: &Column) -> String {
        match column.length {
            Some(length) if column.data_type.uses_length() => {
                format!("{}({length})", column.data_type.sql_name())
            }
            _ => column.data_type.sql_name().to_string(),
        }
    }

    fn quote_ident(&self, ident: &str) -> String {
        ident.to_string()
    }

    fn generate_ddl(&self, op: &TokenOp) -> Result<Vec<Statement>> {
        let alter = |table: &QualifiedName, column: &Column, clause: String| {
            Statement::sql(format!(
                "ALTER TABLE {} ALTER COLUMN {} {clause}",
                self.qualified_name(table),
                column.name
            ))
        };
        match op {
            TokenOp::SetNotNull { table, column } => {
                Ok(vec![alter(table, column, "SET NOT NULL".to_string())])
            }
            TokenOp::SetAllowNull { table, column } => {
                Ok(vec![alter(table, column, "DROP NOT NULL".to_string())])
            }
            TokenOp::SetColumnType { table, to, .. } => {
                Ok(vec![alter(table, to, format!("TYPE {}", self.type_name(to)))])
            }
            _ => ddl::standard_generate_ddl(self, op),
        }
    }
}
