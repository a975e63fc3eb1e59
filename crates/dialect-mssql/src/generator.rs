use dbsync_core::{
    Column, Dialect, GenerateError, QualifiedName, Result, Statement, Table, TokenOp, ddl,
};

const IDENTITY_REASON: &str =
    "SQL Server cannot add or remove IDENTITY on an existing column without rebuilding the table";

pub(crate) fn generate_ddl(dialect: &dyn Dialect, op: &TokenOp) -> Result<Vec<Statement>> {
    let statements = match op {
        TokenOp::CreateTable { table } => vec![create_table(dialect, table)],
        TokenOp::AddColumn { table, column } => {
            let mut sql = format!(
                "ALTER TABLE {} ADD {} {}",
                dialect.qualified_name(table),
                dialect.quote_ident(&column.name),
                dialect.type_name(column)
            );
            if column.generated {
                sql.push_str(" IDENTITY(1,1)");
            }
            vec![sql]
        }
        TokenOp::SetColumnType { table, from, to, .. } => {
            vec![alter_column(dialect, table, to, from.mandatory)]
        }
        TokenOp::SetNotNull { table, column } => vec![alter_column(dialect, table, column, true)],
        TokenOp::SetAllowNull { table, column } => {
            vec![alter_column(dialect, table, column, false)]
        }
        TokenOp::SetPrimaryKey {
            table,
            old,
            new,
            constraint_name,
        } => {
            let name = primary_key_name(table, constraint_name.as_deref());
            let mut statements = Vec::with_capacity(2);
            if !old.is_empty() {
                statements.push(ddl::drop_constraint(dialect, table, &name));
            }
            if !new.is_empty() {
                statements.push(ddl::add_primary_key(dialect, table, Some(&name), new));
            }
            statements
        }
        TokenOp::SetGeneratedFlag { .. } => {
            return Err(
                GenerateError::unsupported(op.name(), dialect.name(), IDENTITY_REASON).into(),
            );
        }
        TokenOp::DropTable { .. }
        | TokenOp::DropColumn { .. }
        | TokenOp::SetValueForNull { .. }
        | TokenOp::AddRelationship { .. }
        | TokenOp::DropRelationship { .. } => return ddl::standard_generate_ddl(dialect, op),
    };

    Ok(statements.into_iter().map(Statement::sql).collect())
}

fn primary_key_name(table: &QualifiedName, constraint_name: Option<&str>) -> String {
    ddl::primary_key_constraint_name(table, constraint_name, |table| format!("PK_{table}"))
}

/// Named primary key so that later key changes can drop it.
fn create_table(dialect: &dyn Dialect, table: &Table) -> String {
    let mut parts = table
        .columns
        .iter()
        .map(|column| {
            let mut definition = ddl::column_definition(dialect, column);
            if column.generated {
                definition.push_str(" IDENTITY(1,1)");
            }
            format!("    {definition}")
        })
        .collect::<Vec<_>>();

    let primary_key = table.primary_key_names();
    if !primary_key.is_empty() {
        parts.push(format!(
            "    CONSTRAINT {} PRIMARY KEY ({})",
            dialect.quote_ident(&primary_key_name(
                &table.name,
                table.primary_key_name.as_deref()
            )),
            ddl::column_list(dialect, &primary_key)
        ));
    }

    format!(
        "CREATE TABLE {} (\n{}\n)",
        dialect.qualified_name(&table.name),
        parts.join(",\n")
    )
}

fn alter_column(
    dialect: &dyn Dialect,
    table: &QualifiedName,
    column: &Column,
    not_null: bool,
) -> String {
    format!(
        "ALTER TABLE {} ALTER COLUMN {} {}{}",
        dialect.qualified_name(table),
        dialect.quote_ident(&column.name),
        dialect.type_name(column),
        if not_null { " NOT NULL" } else { " NULL" }
    )
}
