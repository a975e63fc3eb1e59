use dbsync_core::{Column, Dialect, QualifiedName, Result, Statement, TokenOp, ddl};

const TABLE_OPTIONS: &str = " ENGINE=InnoDB";

pub(crate) fn generate_ddl(dialect: &dyn Dialect, op: &TokenOp) -> Result<Vec<Statement>> {
    let statements = match op {
        TokenOp::CreateTable { table } => {
            let mut sql = ddl::create_table(dialect, table, |column| {
                column_definition(dialect, column, column.mandatory, column.generated)
            });
            sql.push_str(TABLE_OPTIONS);
            vec![sql]
        }
        // Current nullability is kept; a separate token changes it once
        // nulls are backfilled.
        TokenOp::SetColumnType { table, from, to, .. } => vec![change_column(
            dialect,
            table,
            to,
            from.mandatory,
            from.generated,
        )],
        TokenOp::SetNotNull { table, column } => {
            vec![change_column(dialect, table, column, true, column.generated)]
        }
        TokenOp::SetAllowNull { table, column } => {
            vec![change_column(dialect, table, column, false, column.generated)]
        }
        TokenOp::SetGeneratedFlag {
            table,
            column,
            generated,
        } => vec![change_column(
            dialect,
            table,
            column,
            column.mandatory,
            *generated,
        )],
        TokenOp::SetPrimaryKey { table, old, new, .. } => {
            let mut statements = Vec::with_capacity(2);
            if !old.is_empty() {
                statements.push(format!(
                    "ALTER TABLE {} DROP PRIMARY KEY",
                    dialect.qualified_name(table)
                ));
            }
            // MySQL always names the key `PRIMARY`.
            if !new.is_empty() {
                statements.push(ddl::add_primary_key(dialect, table, None, new));
            }
            statements
        }
        TokenOp::DropRelationship {
            table,
            relationship,
        } => vec![format!(
            "ALTER TABLE {} DROP FOREIGN KEY {}",
            dialect.qualified_name(table),
            dialect.quote_ident(&ddl::foreign_key_name(table, relationship))
        )],
        TokenOp::DropTable { .. }
        | TokenOp::AddColumn { .. }
        | TokenOp::DropColumn { .. }
        | TokenOp::SetValueForNull { .. }
        | TokenOp::AddRelationship { .. } => return ddl::standard_generate_ddl(dialect, op),
    };

    Ok(statements.into_iter().map(Statement::sql).collect())
}

fn column_definition(
    dialect: &dyn Dialect,
    column: &Column,
    not_null: bool,
    auto_increment: bool,
) -> String {
    let mut definition = format!(
        "{} {}",
        dialect.quote_ident(&column.name),
        dialect.type_name(column)
    );
    definition.push_str(if not_null { " NOT NULL" } else { " NULL" });
    if auto_increment {
        definition.push_str(" AUTO_INCREMENT");
    }
    definition
}

/// `CHANGE COLUMN` restates the whole definition.
fn change_column(
    dialect: &dyn Dialect,
    table: &QualifiedName,
    column: &Column,
    not_null: bool,
    auto_increment: bool,
) -> String {
    format!(
        "ALTER TABLE {} CHANGE COLUMN {} {}",
        dialect.qualified_name(table),
        dialect.quote_ident(&column.name),
        column_definition(dialect, column, not_null, auto_increment)
    )
}
