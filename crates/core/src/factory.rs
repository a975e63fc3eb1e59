use crate::{
    Column, Dialect, Direction, FactoryError, MergerToken, NameMatching, Relationship, Table,
    TokenOp, Value,
};

/// Whether a relationship is expressed as a foreign-key constraint in `dialect`.
/// To-many sides and sides pointing at a dependent primary key carry no DDL.
pub(crate) fn foreign_key_required(dialect: &dyn Dialect, relationship: &Relationship) -> bool {
    dialect.supports_fk_constraints() && relationship.is_foreign_key()
}

/// Dialect-bound constructor of merge tokens.
#[derive(Clone, Copy)]
pub struct TokenFactory<'a> {
    dialect: &'a dyn Dialect,
}

impl<'a> TokenFactory<'a> {
    #[must_use]
    pub const fn new(dialect: &'a dyn Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    pub fn should_generate_fk_constraint(&self, relationship: &Relationship) -> bool {
        foreign_key_required(self.dialect, relationship)
    }

    pub fn create_create_table_to_db(&self, table: &Table) -> MergerToken {
        create_table(Direction::ToDb, table)
    }

    pub fn create_create_table_to_model(&self, table: &Table) -> MergerToken {
        create_table(Direction::ToModel, table)
    }

    pub fn create_drop_table_to_db(&self, table: &Table) -> MergerToken {
        drop_table(Direction::ToDb, table)
    }

    pub fn create_drop_table_to_model(&self, table: &Table) -> MergerToken {
        drop_table(Direction::ToModel, table)
    }

    pub fn create_add_column_to_db(&self, table: &Table, column: &Column) -> MergerToken {
        add_column(Direction::ToDb, table, column)
    }

    pub fn create_add_column_to_model(&self, table: &Table, column: &Column) -> MergerToken {
        add_column(Direction::ToModel, table, column)
    }

    pub fn create_drop_column_to_db(
        &self,
        table: &Table,
        column: &Column,
    ) -> Result<MergerToken, FactoryError> {
        drop_column(Direction::ToDb, table, column)
    }

    pub fn create_drop_column_to_model(
        &self,
        table: &Table,
        column: &Column,
    ) -> Result<MergerToken, FactoryError> {
        drop_column(Direction::ToModel, table, column)
    }

    pub fn create_set_column_type_to_db(
        &self,
        table: &Table,
        from: &Column,
        to: &Column,
    ) -> Result<MergerToken, FactoryError> {
        self.set_column_type(Direction::ToDb, table, from, to)
    }

    pub fn create_set_column_type_to_model(
        &self,
        table: &Table,
        from: &Column,
        to: &Column,
    ) -> Result<MergerToken, FactoryError> {
        self.set_column_type(Direction::ToModel, table, from, to)
    }

    pub fn create_set_not_null_to_db(
        &self,
        table: &Table,
        column: &Column,
    ) -> Result<MergerToken, FactoryError> {
        set_nullability(Direction::ToDb, table, column, true)
    }

    pub fn create_set_not_null_to_model(
        &self,
        table: &Table,
        column: &Column,
    ) -> Result<MergerToken, FactoryError> {
        set_nullability(Direction::ToModel, table, column, true)
    }

    pub fn create_set_allow_null_to_db(
        &self,
        table: &Table,
        column: &Column,
    ) -> Result<MergerToken, FactoryError> {
        set_nullability(Direction::ToDb, table, column, false)
    }

    pub fn create_set_allow_null_to_model(
        &self,
        table: &Table,
        column: &Column,
    ) -> Result<MergerToken, FactoryError> {
        set_nullability(Direction::ToModel, table, column, false)
    }

    /// The column may still be pending creation by a preceding AddColumn.
    pub fn create_set_value_for_null_to_db(
        &self,
        table: &Table,
        column: &Column,
        value: Value,
    ) -> MergerToken {
        MergerToken::new(
            Direction::ToDb,
            TokenOp::SetValueForNull {
                table: table.name.clone(),
                column: column.clone(),
                value: Some(value),
            },
        )
    }

    pub fn create_add_relationship_to_db(
        &self,
        table: &Table,
        relationship: &Relationship,
    ) -> Result<MergerToken, FactoryError> {
        add_relationship(Direction::ToDb, table, relationship)
    }

    pub fn create_add_relationship_to_model(
        &self,
        table: &Table,
        relationship: &Relationship,
    ) -> Result<MergerToken, FactoryError> {
        add_relationship(Direction::ToModel, table, relationship)
    }

    pub fn create_drop_relationship_to_db(
        &self,
        table: &Table,
        relationship: &Relationship,
    ) -> Result<MergerToken, FactoryError> {
        drop_relationship(Direction::ToDb, table, relationship)
    }

    pub fn create_drop_relationship_to_model(
        &self,
        table: &Table,
        relationship: &Relationship,
    ) -> Result<MergerToken, FactoryError> {
        drop_relationship(Direction::ToModel, table, relationship)
    }

    /// `table` must contain every column of `new`; its `primary_key_name`
    /// names the constraint being replaced.
    pub fn create_set_primary_key_to_db(
        &self,
        table: &Table,
        old: &[String],
        new: &[String],
    ) -> Result<MergerToken, FactoryError> {
        set_primary_key(Direction::ToDb, table, old, new)
    }

    pub fn create_set_primary_key_to_model(
        &self,
        table: &Table,
        old: &[String],
        new: &[String],
    ) -> Result<MergerToken, FactoryError> {
        set_primary_key(Direction::ToModel, table, old, new)
    }

    pub fn create_set_generated_flag_to_db(
        &self,
        table: &Table,
        column: &Column,
        generated: bool,
    ) -> Result<MergerToken, FactoryError> {
        set_generated_flag(Direction::ToDb, table, column, generated)
    }

    pub fn create_set_generated_flag_to_model(
        &self,
        table: &Table,
        column: &Column,
        generated: bool,
    ) -> Result<MergerToken, FactoryError> {
        set_generated_flag(Direction::ToModel, table, column, generated)
    }

    /// The inverse change, in the opposite direction.
    pub fn reverse(&self, token: &MergerToken) -> MergerToken {
        let op = match token.op().clone() {
            TokenOp::CreateTable { table } => TokenOp::DropTable { table },
            TokenOp::DropTable { table } => TokenOp::CreateTable { table },
            TokenOp::AddColumn { table, column } => TokenOp::DropColumn { table, column },
            TokenOp::DropColumn { table, column } => TokenOp::AddColumn { table, column },
            TokenOp::SetColumnType {
                table,
                from,
                to,
                from_type,
                to_type,
            } => TokenOp::SetColumnType {
                table,
                from: to,
                to: from,
                from_type: to_type,
                to_type: from_type,
            },
            TokenOp::SetNotNull { table, mut column } => {
                column.mandatory = false;
                TokenOp::SetAllowNull { table, column }
            }
            TokenOp::SetAllowNull { table, mut column } => {
                column.mandatory = true;
                TokenOp::SetNotNull { table, column }
            }
            op @ TokenOp::SetValueForNull { .. } => op,
            TokenOp::AddRelationship {
                table,
                relationship,
            } => TokenOp::DropRelationship {
                table,
                relationship,
            },
            TokenOp::DropRelationship {
                table,
                relationship,
            } => TokenOp::AddRelationship {
                table,
                relationship,
            },
            TokenOp::SetPrimaryKey {
                table,
                old,
                new,
                constraint_name,
            } => TokenOp::SetPrimaryKey {
                table,
                old: new,
                new: old,
                constraint_name,
            },
            TokenOp::SetGeneratedFlag {
                table,
                mut column,
                generated,
            } => {
                column.generated = !generated;
                TokenOp::SetGeneratedFlag {
                    table,
                    column,
                    generated: !generated,
                }
            }
        };

        MergerToken::new(token.direction().reverse(), op)
    }

    pub(crate) fn set_column_type(
        &self,
        direction: Direction,
        table: &Table,
        from: &Column,
        to: &Column,
    ) -> Result<MergerToken, FactoryError> {
        require_column(table, &from.name, "Set Column Type")?;
        Ok(MergerToken::new(
            direction,
            TokenOp::SetColumnType {
                table: table.name.clone(),
                from: from.clone(),
                to: to.renamed(&from.name),
                from_type: self.dialect.type_name(from),
                to_type: self.dialect.type_name(to),
            },
        ))
    }
}

pub(crate) fn create_table(direction: Direction, table: &Table) -> MergerToken {
    MergerToken::new(
        direction,
        TokenOp::CreateTable {
            table: table.clone(),
        },
    )
}

pub(crate) fn drop_table(direction: Direction, table: &Table) -> MergerToken {
    MergerToken::new(
        direction,
        TokenOp::DropTable {
            table: table.clone(),
        },
    )
}

pub(crate) fn add_column(direction: Direction, table: &Table, column: &Column) -> MergerToken {
    MergerToken::new(
        direction,
        TokenOp::AddColumn {
            table: table.name.clone(),
            column: column.clone(),
        },
    )
}

pub(crate) fn drop_column(
    direction: Direction,
    table: &Table,
    column: &Column,
) -> Result<MergerToken, FactoryError> {
    require_column(table, &column.name, "Drop Column")?;
    Ok(MergerToken::new(
        direction,
        TokenOp::DropColumn {
            table: table.name.clone(),
            column: column.clone(),
        },
    ))
}

pub(crate) fn set_nullability(
    direction: Direction,
    table: &Table,
    column: &Column,
    mandatory: bool,
) -> Result<MergerToken, FactoryError> {
    let token = if mandatory { "Set Not Null" } else { "Set Allow Null" };
    require_column(table, &column.name, token)?;
    let column = Column {
        mandatory,
        ..column.clone()
    };
    let table = table.name.clone();
    let op = if mandatory {
        TokenOp::SetNotNull { table, column }
    } else {
        TokenOp::SetAllowNull { table, column }
    };
    Ok(MergerToken::new(direction, op))
}

pub(crate) fn add_relationship(
    direction: Direction,
    table: &Table,
    relationship: &Relationship,
) -> Result<MergerToken, FactoryError> {
    require_joins(table, relationship, "Add Relationship")?;
    Ok(MergerToken::new(
        direction,
        TokenOp::AddRelationship {
            table: table.name.clone(),
            relationship: relationship.clone(),
        },
    ))
}

pub(crate) fn drop_relationship(
    direction: Direction,
    table: &Table,
    relationship: &Relationship,
) -> Result<MergerToken, FactoryError> {
    require_joins(table, relationship, "Drop Relationship")?;
    Ok(MergerToken::new(
        direction,
        TokenOp::DropRelationship {
            table: table.name.clone(),
            relationship: relationship.clone(),
        },
    ))
}

pub(crate) fn set_primary_key(
    direction: Direction,
    table: &Table,
    old: &[String],
    new: &[String],
) -> Result<MergerToken, FactoryError> {
    const TOKEN: &str = "Set Primary Key";
    if table.columns.is_empty() {
        return Err(FactoryError::EmptyTable {
            token: TOKEN,
            table: table.name.name.clone(),
        });
    }
    for name in new {
        require_column(table, name, TOKEN)?;
    }

    Ok(MergerToken::new(
        direction,
        TokenOp::SetPrimaryKey {
            table: table.name.clone(),
            old: old.to_vec(),
            new: new.to_vec(),
            constraint_name: table.primary_key_name.clone(),
        },
    ))
}

pub(crate) fn set_generated_flag(
    direction: Direction,
    table: &Table,
    column: &Column,
    generated: bool,
) -> Result<MergerToken, FactoryError> {
    let token = if generated {
        "Set Is Generated"
    } else {
        "Drop Is Generated"
    };
    require_column(table, &column.name, token)?;
    Ok(MergerToken::new(
        direction,
        TokenOp::SetGeneratedFlag {
            table: table.name.clone(),
            column: Column {
                generated,
                ..column.clone()
            },
            generated,
        },
    ))
}

fn require_column(table: &Table, column: &str, token: &'static str) -> Result<(), FactoryError> {
    if table
        .find_column(column, NameMatching::CaseInsensitive)
        .is_some()
    {
        return Ok(());
    }
    Err(FactoryError::UnknownColumn {
        token,
        table: table.name.name.clone(),
        column: column.to_string(),
    })
}

fn require_joins(
    table: &Table,
    relationship: &Relationship,
    token: &'static str,
) -> Result<(), FactoryError> {
    if !relationship.joins.is_empty() {
        return Ok(());
    }
    Err(FactoryError::EmptyJoins {
        token,
        table: table.name.name.clone(),
        relationship: relationship.name.clone(),
    })
}
