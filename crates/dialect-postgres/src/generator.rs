use dbsync_core::{Column, Dialect, QualifiedName, Result, Statement, TokenOp, ddl};

pub(crate) fn generate_ddl(dialect: &dyn Dialect, op: &TokenOp) -> Result<Vec<Statement>> {
    let statements = match op {
        TokenOp::CreateTable { table } => vec![ddl::create_table(dialect, table, |column| {
            column_definition(dialect, column)
        })],
        TokenOp::AddColumn { table, column } => {
            let mut sql = ddl::add_column(dialect, table, column);
            if column.generated {
                sql.push_str(" GENERATED BY DEFAULT AS IDENTITY");
            }
            vec![sql]
        }
        TokenOp::SetColumnType { table, to, to_type, .. } => vec![format!(
            "{} TYPE {to_type}",
            alter_column(dialect, table, to)
        )],
        TokenOp::SetNotNull { table, column } => {
            vec![format!("{} SET NOT NULL", alter_column(dialect, table, column))]
        }
        TokenOp::SetAllowNull { table, column } => {
            vec![format!("{} DROP NOT NULL", alter_column(dialect, table, column))]
        }
        TokenOp::SetPrimaryKey {
            table,
            old,
            new,
            constraint_name,
        } => set_primary_key(dialect, table, old, new, constraint_name.as_deref()),
        TokenOp::SetGeneratedFlag {
            table,
            column,
            generated: true,
        } => vec![format!(
            "{} ADD GENERATED BY DEFAULT AS IDENTITY",
            alter_column(dialect, table, column)
        )],
        TokenOp::SetGeneratedFlag {
            table,
            column,
            generated: false,
        } => vec![format!(
            "{} DROP IDENTITY IF EXISTS",
            alter_column(dialect, table, column)
        )],
        TokenOp::DropTable { .. }
        | TokenOp::DropColumn { .. }
        | TokenOp::SetValueForNull { .. }
        | TokenOp::AddRelationship { .. }
        | TokenOp::DropRelationship { .. } => return ddl::standard_generate_ddl(dialect, op),
    };

    Ok(statements.into_iter().map(Statement::sql).collect())
}

fn column_definition(dialect: &dyn Dialect, column: &Column) -> String {
    let mut definition = ddl::column_definition(dialect, column);
    if column.generated {
        definition.push_str(" GENERATED BY DEFAULT AS IDENTITY");
    }
    definition
}

fn alter_column(dialect: &dyn Dialect, table: &QualifiedName, column: &Column) -> String {
    format!(
        "ALTER TABLE {} ALTER COLUMN {}",
        dialect.qualified_name(table),
        dialect.quote_ident(&column.name)
    )
}

/// Postgres names an unnamed primary key `{table}_pkey`.
fn set_primary_key(
    dialect: &dyn Dialect,
    table: &QualifiedName,
    old: &[String],
    new: &[String],
    constraint_name: Option<&str>,
) -> Vec<String> {
    let name = ddl::primary_key_constraint_name(table, constraint_name, |table| {
        format!("{table}_pkey")
    });

    let mut statements = Vec::with_capacity(2);
    if !old.is_empty() {
        statements.push(format!(
            "ALTER TABLE {} DROP CONSTRAINT IF EXISTS {}",
            dialect.qualified_name(table),
            dialect.quote_ident(&name)
        ));
    }
    if !new.is_empty() {
        statements.push(ddl::add_primary_key(dialect, table, Some(&name), new));
    }
    statements
}
