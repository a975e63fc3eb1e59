mod to_db;
mod to_model;

use std::fmt;

use crate::{
    Column, Dialect, MergerContext, QualifiedName, Relationship, Result, Statement, Table,
    TokenFactory, Value,
};

/// Which side of the merge a token changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// The model is authoritative; the database changes.
    #[default]
    ToDb,
    /// The database is authoritative; the model changes.
    ToModel,
}

impl Direction {
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::ToDb => Self::ToModel,
            Self::ToModel => Self::ToDb,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToDb => f.write_str("To DB"),
            Self::ToModel => f.write_str("To Model"),
        }
    }
}

/// One schema change. Table names are those of the side being changed.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenOp {
    CreateTable {
        table: Table,
    },
    DropTable {
        table: Table,
    },
    AddColumn {
        table: QualifiedName,
        column: Column,
    },
    DropColumn {
        table: QualifiedName,
        column: Column,
    },
    SetColumnType {
        table: QualifiedName,
        from: Column,
        to: Column,
        from_type: String,
        to_type: String,
    },
    SetNotNull {
        table: QualifiedName,
        column: Column,
    },
    SetAllowNull {
        table: QualifiedName,
        column: Column,
    },
    SetValueForNull {
        table: QualifiedName,
        column: Column,
        value: Option<Value>,
    },
    AddRelationship {
        table: QualifiedName,
        relationship: Relationship,
    },
    DropRelationship {
        table: QualifiedName,
        relationship: Relationship,
    },
    SetPrimaryKey {
        table: QualifiedName,
        old: Vec<String>,
        new: Vec<String>,
        constraint_name: Option<String>,
    },
    SetGeneratedFlag {
        table: QualifiedName,
        column: Column,
        generated: bool,
    },
}

impl TokenOp {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateTable { .. } => "Create Table",
            Self::DropTable { .. } => "Drop Table",
            Self::AddColumn { .. } => "Add Column",
            Self::DropColumn { .. } => "Drop Column",
            Self::SetColumnType { .. } => "Set Column Type",
            Self::SetNotNull { .. } => "Set Not Null",
            Self::SetAllowNull { .. } => "Set Allow Null",
            Self::SetValueForNull { .. } => "Set Value For Null",
            Self::AddRelationship { .. } => "Add Relationship",
            Self::DropRelationship { .. } => "Drop Relationship",
            Self::SetPrimaryKey { .. } => "Set Primary Key",
            Self::SetGeneratedFlag {
                generated: true, ..
            } => "Set Is Generated",
            Self::SetGeneratedFlag {
                generated: false, ..
            } => "Drop Is Generated",
        }
    }

    pub fn table_name(&self) -> &QualifiedName {
        match self {
            Self::CreateTable { table } | Self::DropTable { table } => &table.name,
            Self::AddColumn { table, .. }
            | Self::DropColumn { table, .. }
            | Self::SetColumnType { table, .. }
            | Self::SetNotNull { table, .. }
            | Self::SetAllowNull { table, .. }
            | Self::SetValueForNull { table, .. }
            | Self::AddRelationship { table, .. }
            | Self::DropRelationship { table, .. }
            | Self::SetPrimaryKey { table, .. }
            | Self::SetGeneratedFlag { table, .. } => table,
        }
    }

    /// The table, or `table.column` for column-level changes.
    pub fn target(&self) -> String {
        let table = &self.table_name().name;
        match self {
            Self::AddColumn { column, .. }
            | Self::DropColumn { column, .. }
            | Self::SetNotNull { column, .. }
            | Self::SetAllowNull { column, .. }
            | Self::SetValueForNull { column, .. }
            | Self::SetGeneratedFlag { column, .. } => format!("{table}.{}", column.name),
            Self::SetColumnType { from, .. } => format!("{table}.{}", from.name),
            _ => table.clone(),
        }
    }

    pub fn value(&self) -> String {
        match self {
            Self::SetColumnType {
                from_type, to_type, ..
            } => format!("{} ({from_type} -> {to_type})", self.target()),
            Self::AddRelationship {
                table,
                relationship,
            }
            | Self::DropRelationship {
                table,
                relationship,
            } => format!("{}->{}", table.name, relationship.target.name),
            Self::SetPrimaryKey { old, new, .. } => format!(
                "{} ({} -> {})",
                self.target(),
                render_key(old),
                render_key(new)
            ),
            _ => self.target(),
        }
    }
}

fn render_key(columns: &[String]) -> String {
    if columns.is_empty() {
        return "<none>".to_string();
    }
    columns.join(", ")
}

/// A single-use, reversible schema change command.
#[derive(Debug, Clone, PartialEq)]
pub struct MergerToken {
    direction: Direction,
    op: TokenOp,
}

impl MergerToken {
    pub(crate) const fn new(direction: Direction, op: TokenOp) -> Self {
        Self { direction, op }
    }

    pub const fn direction(&self) -> Direction {
        self.direction
    }

    pub const fn op(&self) -> &TokenOp {
        &self.op
    }

    pub fn into_op(self) -> TokenOp {
        self.op
    }

    pub fn token_name(&self) -> &'static str {
        self.op.name()
    }

    pub fn token_value(&self) -> String {
        self.op.value()
    }

    /// Database statements for a ToDb token; empty for ToModel tokens and for
    /// changes with no database representation.
    pub fn statements(&self, dialect: &dyn Dialect) -> Result<Vec<Statement>> {
        match self.direction {
            Direction::ToDb => to_db::statements(&self.op, dialect),
            Direction::ToModel => Ok(Vec::new()),
        }
    }

    pub fn execute(&self, context: &mut MergerContext<'_>) -> Result<()> {
        match self.direction {
            Direction::ToDb => to_db::execute(self, context),
            Direction::ToModel => to_model::execute(&self.op, context),
        }
    }

    #[must_use]
    pub fn create_reverse(&self, factory: &TokenFactory<'_>) -> Self {
        factory.reverse(self)
    }
}

impl fmt::Display for MergerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.token_name(),
            self.token_value(),
            self.direction
        )
    }
}
