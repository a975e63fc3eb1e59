use dbsync_core::{DataType, Dialect, GenerateError, Result, Statement, Table, TokenOp, ddl};

const REBUILD_REASON: &str =
    "sqlite cannot alter existing columns or constraints without rebuilding the table";

pub(crate) fn generate_ddl(dialect: &dyn Dialect, op: &TokenOp) -> Result<Vec<Statement>> {
    match op {
        TokenOp::CreateTable { table } => Ok(vec![Statement::sql(create_table(dialect, table))]),
        TokenOp::DropTable { .. }
        | TokenOp::AddColumn { .. }
        | TokenOp::DropColumn { .. }
        | TokenOp::SetValueForNull { .. } => ddl::standard_generate_ddl(dialect, op),
        TokenOp::SetColumnType { .. }
        | TokenOp::SetNotNull { .. }
        | TokenOp::SetAllowNull { .. }
        | TokenOp::SetPrimaryKey { .. }
        | TokenOp::SetGeneratedFlag { .. }
        | TokenOp::AddRelationship { .. }
        | TokenOp::DropRelationship { .. } => {
            Err(GenerateError::unsupported(op.name(), dialect.name(), REBUILD_REASON).into())
        }
    }
}

/// A generated single-column integer key becomes the rowid alias; other keys
/// and foreign keys are table constraints.
fn create_table(dialect: &dyn Dialect, table: &Table) -> String {
    let primary_key = table.primary_key();
    let rowid_alias = match primary_key.as_slice() {
        [column] if column.generated && column.data_type == DataType::Integer => {
            Some(column.name.as_str())
        }
        _ => None,
    };

    let mut parts = table
        .columns
        .iter()
        .map(|column| {
            let mut definition = ddl::column_definition(dialect, column);
            if rowid_alias == Some(column.name.as_str()) {
                definition.push_str(" PRIMARY KEY AUTOINCREMENT");
            }
            format!("    {definition}")
        })
        .collect::<Vec<_>>();

    if rowid_alias.is_none() && !primary_key.is_empty() {
        parts.push(format!(
            "    PRIMARY KEY ({})",
            ddl::column_list(dialect, &table.primary_key_names())
        ));
    }

    for relationship in table.relationships.iter().filter(|rel| rel.is_foreign_key()) {
        parts.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {} ({})",
            ddl::column_list(dialect, &relationship.source_columns()),
            dialect.qualified_name(&relationship.target),
            ddl::column_list(dialect, &relationship.target_columns())
        ));
    }

    format!(
        "CREATE TABLE {} (\n{}\n)",
        dialect.qualified_name(&table.name),
        parts.join(",\n")
    )
}
