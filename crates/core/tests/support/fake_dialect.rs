use dbsync_core::{
    Column, ConnectionConfig, DatabaseAdapter, Dialect, GenerateError, Result, Statement, TokenOp,
    ddl,
};

use super::fake_adapter::FakeAdapter;

#[derive(Debug, Clone, Default)]
pub struct FakeDialect {
    catalogs: bool,
    no_fk_constraints: bool,
    batch_separator: &'static str,
}

#[allow(dead_code)]
impl FakeDialect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalogs(mut self) -> Self {
        self.catalogs = true;
        self
    }

    pub fn without_fk_constraints(mut self) -> Self {
        self.no_fk_constraints = true;
        self
    }

    pub fn with_batch_separator(mut self, separator: &'static str) -> Self {
        self.batch_separator = separator;
        self
    }
}

impl Dialect for FakeDialect {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn connect(&self, _config: &ConnectionConfig) -> Result<Box<dyn DatabaseAdapter>> {
        Ok(Box::new(FakeAdapter::default()))
    }

    fn type_name(&self, column: &Column) -> String {
        let base = column.data_type.sql_name();
        match (column.length, column.precision, column.scale) {
            (Some(length), _, _) if column.data_type.uses_length() => format!("{base}({length})"),
            (_, Some(precision), scale) if column.data_type.uses_precision() => {
                format!("{base}({precision},{})", scale.unwrap_or(0))
            }
            _ => base.to_string(),
        }
    }

    fn supports_catalogs(&self) -> bool {
        self.catalogs
    }

    fn supports_fk_constraints(&self) -> bool {
        !self.no_fk_constraints
    }

    fn batch_separator(&self) -> &'static str {
        self.batch_separator
    }

    fn generate_ddl(&self, op: &TokenOp) -> Result<Vec<Statement>> {
        let alter_column = |table, column: &Column, action: &str| {
            Statement::sql(format!(
                "ALTER TABLE {} ALTER COLUMN {} {action}",
                self.qualified_name(table),
                self.quote_ident(&column.name)
            ))
        };

        match op {
            TokenOp::SetColumnType { table, to, .. } => Ok(vec![alter_column(
                table,
                to,
                &format!("TYPE {}", self.type_name(to)),
            )]),
            TokenOp::SetNotNull { table, column } => {
                Ok(vec![alter_column(table, column, "SET NOT NULL")])
            }
            TokenOp::SetAllowNull { table, column } => {
                Ok(vec![alter_column(table, column, "DROP NOT NULL")])
            }
            TokenOp::SetPrimaryKey {
                table,
                old,
                new,
                constraint_name,
            } => {
                let name = ddl::primary_key_constraint_name(
                    table,
                    constraint_name.as_deref(),
                    |table| format!("{table}_pkey"),
                );
                let mut statements = Vec::new();
                if !old.is_empty() {
                    statements.push(Statement::sql(ddl::drop_constraint(self, table, &name)));
                }
                if !new.is_empty() {
                    statements.push(Statement::sql(ddl::add_primary_key(
                        self,
                        table,
                        Some(&name),
                        new,
                    )));
                }
                Ok(statements)
            }
            TokenOp::SetGeneratedFlag { .. } => Err(GenerateError::unsupported(
                op.name(),
                self.name(),
                "generated columns are fixed at creation",
            )
            .into()),
            _ => ddl::standard_generate_ddl(self, op),
        }
    }
}
