use crate::{DataType, ModelError, NameMatching, QualifiedName};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub mandatory: bool,
    pub primary_key: bool,
    pub generated: bool,
    pub comment: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            length: None,
            precision: None,
            scale: None,
            mandatory: false,
            primary_key: false,
            generated: false,
            comment: None,
        }
    }

    #[must_use]
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    #[must_use]
    pub fn with_precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    #[must_use]
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Primary-key columns are always mandatory.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.mandatory = true;
        self
    }

    #[must_use]
    pub fn generated(mut self) -> Self {
        self.generated = true;
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Compares name, type, length, precision, scale and the mandatory flag.
    /// Comments and key flags are not part of a column's structure.
    pub fn structurally_equal(&self, other: &Self, matching: NameMatching) -> bool {
        matching.eq(&self.name, &other.name)
            && self.same_type(other)
            && self.mandatory == other.mandatory
    }

    pub fn same_type(&self, other: &Self) -> bool {
        if self.data_type != other.data_type {
            return false;
        }
        if self.data_type.uses_length() && self.length != other.length {
            return false;
        }
        if self.data_type.uses_precision()
            && (self.precision != other.precision || self.scale != other.scale)
        {
            return false;
        }
        true
    }

    #[must_use]
    pub(crate) fn renamed(&self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Join {
    pub source: String,
    pub target: String,
}

impl Join {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    #[must_use]
    pub fn swapped(&self) -> Self {
        Self {
            source: self.target.clone(),
            target: self.source.clone(),
        }
    }
}

/// A directed relationship owned by its source table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub name: String,
    pub target: QualifiedName,
    pub to_many: bool,
    pub to_dependent_pk: bool,
    pub joins: Vec<Join>,
    pub fk_name: Option<String>,
}

impl Relationship {
    pub fn new(name: impl Into<String>, target: QualifiedName) -> Self {
        Self {
            name: name.into(),
            target,
            to_many: false,
            to_dependent_pk: false,
            joins: Vec::new(),
            fk_name: None,
        }
    }

    #[must_use]
    pub fn join(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.joins.push(Join::new(source, target));
        self
    }

    #[must_use]
    pub fn to_many(mut self) -> Self {
        self.to_many = true;
        self
    }

    #[must_use]
    pub fn to_dependent_pk(mut self) -> Self {
        self.to_dependent_pk = true;
        self
    }

    #[must_use]
    pub fn with_fk_name(mut self, fk_name: impl Into<String>) -> Self {
        self.fk_name = Some(fk_name.into());
        self
    }

    /// Whether this side of the relationship owns a foreign-key constraint.
    pub fn is_foreign_key(&self) -> bool {
        !self.to_many && !self.to_dependent_pk && !self.joins.is_empty()
    }

    /// Target table, to-many flag and the join set, independent of join order.
    /// Relationship and constraint names are ignored.
    pub fn structurally_equal(&self, other: &Self, matching: NameMatching) -> bool {
        self.target.matches(&other.target, matching)
            && self.to_many == other.to_many
            && self.join_key(matching) == other.join_key(matching)
    }

    pub(crate) fn join_key(&self, matching: NameMatching) -> Vec<(String, String)> {
        let mut key = self
            .joins
            .iter()
            .map(|join| (matching.key(&join.source), matching.key(&join.target)))
            .collect::<Vec<_>>();
        key.sort();
        key
    }

    pub fn source_columns(&self) -> Vec<&str> {
        self.joins.iter().map(|join| join.source.as_str()).collect()
    }

    pub fn target_columns(&self) -> Vec<&str> {
        self.joins.iter().map(|join| join.target.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: QualifiedName,
    pub columns: Vec<Column>,
    pub relationships: Vec<Relationship>,
    pub primary_key_name: Option<String>,
}

impl Table {
    pub fn new(name: QualifiedName) -> Self {
        Self {
            name,
            columns: Vec::new(),
            relationships: Vec::new(),
            primary_key_name: None,
        }
    }

    pub fn named(name: &str) -> Self {
        Self::new(QualifiedName::new(name))
    }

    #[must_use]
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    #[must_use]
    pub fn with_primary_key_name(mut self, name: impl Into<String>) -> Self {
        self.primary_key_name = Some(name.into());
        self
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn find_column(&self, name: &str, matching: NameMatching) -> Option<&Column> {
        self.column(name).or_else(|| {
            self.columns
                .iter()
                .find(|column| matching.eq(&column.name, name))
        })
    }

    pub fn find_column_mut(&mut self, name: &str, matching: NameMatching) -> Option<&mut Column> {
        let index = self
            .columns
            .iter()
            .position(|column| column.name == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|column| matching.eq(&column.name, name))
            })?;
        self.columns.get_mut(index)
    }

    pub fn primary_key(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|column| column.primary_key)
            .collect()
    }

    pub fn primary_key_names(&self) -> Vec<String> {
        self.primary_key()
            .into_iter()
            .map(|column| column.name.clone())
            .collect()
    }

    /// Rewrites the primary-key flags so that exactly `names` form the key.
    pub fn set_primary_key(
        &mut self,
        names: &[String],
        matching: NameMatching,
    ) -> Result<(), ModelError> {
        for name in names {
            if self.find_column(name, matching).is_none() {
                return Err(ModelError::ColumnNotFound {
                    table: self.name.name.clone(),
                    column: name.clone(),
                });
            }
        }

        for column in &mut self.columns {
            column.primary_key = names.iter().any(|name| matching.eq(name, &column.name));
            if column.primary_key {
                column.mandatory = true;
            }
        }
        Ok(())
    }

    pub fn add_column(&mut self, column: Column) -> Result<(), ModelError> {
        if self.column(&column.name).is_some() {
            return Err(ModelError::ColumnExists {
                table: self.name.name.clone(),
                column: column.name,
            });
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn remove_column(
        &mut self,
        name: &str,
        matching: NameMatching,
    ) -> Result<Column, ModelError> {
        let index = self
            .columns
            .iter()
            .position(|column| column.name == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|column| matching.eq(&column.name, name))
            })
            .ok_or_else(|| ModelError::ColumnNotFound {
                table: self.name.name.clone(),
                column: name.to_string(),
            })?;
        Ok(self.columns.remove(index))
    }

    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships
            .iter()
            .find(|relationship| relationship.name == name)
    }

    pub fn add_relationship(&mut self, relationship: Relationship) -> Result<(), ModelError> {
        if self.relationship(&relationship.name).is_some() {
            return Err(ModelError::RelationshipExists {
                table: self.name.name.clone(),
                relationship: relationship.name,
            });
        }
        self.relationships.push(relationship);
        Ok(())
    }

    /// Removes the relationship with the same name and structure.
    pub fn remove_relationship(
        &mut self,
        relationship: &Relationship,
        matching: NameMatching,
    ) -> Result<Relationship, ModelError> {
        let index = self
            .relationships
            .iter()
            .position(|candidate| {
                candidate.name == relationship.name
                    && candidate.structurally_equal(relationship, matching)
            })
            .or_else(|| {
                self.relationships
                    .iter()
                    .position(|candidate| candidate.structurally_equal(relationship, matching))
            })
            .ok_or_else(|| ModelError::RelationshipNotFound {
                table: self.name.name.clone(),
                relationship: relationship.name.clone(),
            })?;
        Ok(self.relationships.remove(index))
    }

    /// A column is a foreign key when a constraint-owning relationship joins from it.
    pub fn is_foreign_key_column(&self, name: &str, matching: NameMatching) -> bool {
        self.relationships
            .iter()
            .filter(|relationship| relationship.is_foreign_key())
            .flat_map(|relationship| relationship.joins.iter())
            .any(|join| matching.eq(&join.source, name))
    }
}

/// An arena of tables. Relationships refer to their targets by name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataMap {
    pub name: Option<String>,
    pub tables: Vec<Table>,
}

impl DataMap {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn table(&self, name: &QualifiedName) -> Option<&Table> {
        self.tables.iter().find(|table| &table.name == name)
    }

    /// Prefers a match on all qualifiers; falls back to treating missing
    /// qualifiers as wildcards.
    pub fn find_table(&self, name: &QualifiedName, matching: NameMatching) -> Option<&Table> {
        self.find_table_index(name, matching)
            .and_then(|index| self.tables.get(index))
    }

    pub fn find_table_mut(
        &mut self,
        name: &QualifiedName,
        matching: NameMatching,
    ) -> Option<&mut Table> {
        let index = self.find_table_index(name, matching)?;
        self.tables.get_mut(index)
    }

    fn find_table_index(&self, name: &QualifiedName, matching: NameMatching) -> Option<usize> {
        self.tables
            .iter()
            .position(|table| table.name.matches_exactly(name, matching))
            .or_else(|| {
                self.tables
                    .iter()
                    .position(|table| table.name.matches(name, matching))
            })
    }

    pub fn add_table(&mut self, table: Table) -> Result<(), ModelError> {
        if self.table(&table.name).is_some() {
            return Err(ModelError::TableExists {
                table: table.name.name,
            });
        }
        self.tables.push(table);
        Ok(())
    }

    pub fn remove_table(
        &mut self,
        name: &QualifiedName,
        matching: NameMatching,
    ) -> Result<Table, ModelError> {
        let index = self
            .find_table_index(name, matching)
            .ok_or_else(|| ModelError::TableNotFound {
                table: name.name.clone(),
            })?;
        Ok(self.tables.remove(index))
    }

    /// Resolves the inverse of `relationship`, owned by `source`: the
    /// relationship on the target table pointing back with the swapped joins.
    pub fn reverse_relationship(
        &self,
        source: &QualifiedName,
        relationship: &Relationship,
        matching: NameMatching,
    ) -> Option<&Relationship> {
        let target = self.find_table(&relationship.target, matching)?;
        let mut expected = relationship
            .joins
            .iter()
            .map(|join| (matching.key(&join.target), matching.key(&join.source)))
            .collect::<Vec<_>>();
        expected.sort();

        target.relationships.iter().find(|candidate| {
            candidate.target.matches(source, matching) && candidate.join_key(matching) == expected
        })
    }
}
