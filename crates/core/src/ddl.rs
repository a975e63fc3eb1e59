//! SQL builders shared by the dialect generators.
//!
//! Every function renders one statement without a trailing semicolon; the
//! renderer adds terminators and batch separators.

use crate::{
    Column, Dialect, GenerateError, QualifiedName, Relationship, Result, Statement, Table, TokenOp,
    Value,
};

pub fn column_list(dialect: &dyn Dialect, columns: &[impl AsRef<str>]) -> String {
    columns
        .iter()
        .map(|column| dialect.quote_ident(column.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `name type [NOT NULL]`.
pub fn column_definition(dialect: &dyn Dialect, column: &Column) -> String {
    let mut definition = format!(
        "{} {}",
        dialect.quote_ident(&column.name),
        dialect.type_name(column)
    );
    if column.mandatory {
        definition.push_str(" NOT NULL");
    }
    definition
}

/// `CREATE TABLE` with an inline primary key. Relationships are not
/// rendered; each becomes its own `ADD CONSTRAINT`.
pub fn create_table(
    dialect: &dyn Dialect,
    table: &Table,
    column_definition: impl Fn(&Column) -> String,
) -> String {
    let mut parts = table
        .columns
        .iter()
        .map(|column| format!("    {}", column_definition(column)))
        .collect::<Vec<_>>();

    let primary_key = table.primary_key_names();
    if !primary_key.is_empty() {
        parts.push(format!(
            "    PRIMARY KEY ({})",
            column_list(dialect, &primary_key)
        ));
    }

    format!(
        "CREATE TABLE {} (\n{}\n)",
        dialect.qualified_name(&table.name),
        parts.join(",\n")
    )
}

pub fn drop_table(dialect: &dyn Dialect, table: &QualifiedName) -> String {
    format!("DROP TABLE {}", dialect.qualified_name(table))
}

/// The column is always added as nullable; `NOT NULL` follows once existing
/// rows have a value.
pub fn add_column(dialect: &dyn Dialect, table: &QualifiedName, column: &Column) -> String {
    format!(
        "ALTER TABLE {} ADD COLUMN {} {}",
        dialect.qualified_name(table),
        dialect.quote_ident(&column.name),
        dialect.type_name(column)
    )
}

pub fn drop_column(dialect: &dyn Dialect, table: &QualifiedName, column: &Column) -> String {
    format!(
        "ALTER TABLE {} DROP COLUMN {}",
        dialect.qualified_name(table),
        dialect.quote_ident(&column.name)
    )
}

pub fn update_null_values(
    dialect: &dyn Dialect,
    table: &QualifiedName,
    column: &Column,
    value: &Value,
) -> String {
    let column = dialect.quote_ident(&column.name);
    format!(
        "UPDATE {} SET {column} = {} WHERE {column} IS NULL",
        dialect.qualified_name(table),
        dialect.value_literal(value)
    )
}

/// The declared constraint name, or `fk_{table}_{target}_{columns}`.
pub fn foreign_key_name(table: &QualifiedName, relationship: &Relationship) -> String {
    if let Some(name) = &relationship.fk_name {
        return name.clone();
    }

    let mut name = format!("fk_{}_{}", table.name, relationship.target.name);
    for column in relationship.source_columns() {
        name.push('_');
        name.push_str(column);
    }
    name
}

pub fn add_foreign_key(
    dialect: &dyn Dialect,
    table: &QualifiedName,
    relationship: &Relationship,
) -> String {
    format!(
        "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
        dialect.qualified_name(table),
        dialect.quote_ident(&foreign_key_name(table, relationship)),
        column_list(dialect, &relationship.source_columns()),
        dialect.qualified_name(&relationship.target),
        column_list(dialect, &relationship.target_columns())
    )
}

pub fn drop_constraint(dialect: &dyn Dialect, table: &QualifiedName, name: &str) -> String {
    format!(
        "ALTER TABLE {} DROP CONSTRAINT {}",
        dialect.qualified_name(table),
        dialect.quote_ident(name)
    )
}

pub fn add_primary_key(
    dialect: &dyn Dialect,
    table: &QualifiedName,
    constraint_name: Option<&str>,
    columns: &[String],
) -> String {
    let constraint = constraint_name
        .map(|name| format!("CONSTRAINT {} ", dialect.quote_ident(name)))
        .unwrap_or_default();
    format!(
        "ALTER TABLE {} ADD {constraint}PRIMARY KEY ({})",
        dialect.qualified_name(table),
        column_list(dialect, columns)
    )
}

/// The declared constraint name, or the dialect's naming convention applied
/// to the table name.
pub fn primary_key_constraint_name(
    table: &QualifiedName,
    constraint_name: Option<&str>,
    convention: impl FnOnce(&str) -> String,
) -> String {
    constraint_name.map_or_else(|| convention(&table.name), str::to_string)
}

/// Statements for the operations whose syntax is common to every supported
/// dialect. Anything else is reported as unsupported so that each dialect
/// handles it explicitly.
pub fn standard_generate_ddl(dialect: &dyn Dialect, op: &TokenOp) -> Result<Vec<Statement>> {
    let sql = match op {
        TokenOp::CreateTable { table } => {
            create_table(dialect, table, |column| column_definition(dialect, column))
        }
        TokenOp::DropTable { table } => drop_table(dialect, &table.name),
        TokenOp::AddColumn { table, column } => add_column(dialect, table, column),
        TokenOp::DropColumn { table, column } => drop_column(dialect, table, column),
        TokenOp::SetValueForNull {
            table,
            column,
            value: Some(value),
        } => update_null_values(dialect, table, column, value),
        TokenOp::SetValueForNull { value: None, .. } => return Ok(Vec::new()),
        TokenOp::AddRelationship {
            table,
            relationship,
        } => add_foreign_key(dialect, table, relationship),
        TokenOp::DropRelationship {
            table,
            relationship,
        } => drop_constraint(dialect, table, &foreign_key_name(table, relationship)),
        other => {
            return Err(GenerateError::unsupported(
                other.name(),
                dialect.name(),
                "no portable syntax",
            )
            .into());
        }
    };
    Ok(vec![Statement::sql(sql)])
}
