//! YAML description of a model, converted to a [`DataMap`] for merging.
//!
//! ```yaml
//! tables:
//!   - name: ARTIST
//!     columns:
//!       - { name: ARTIST_ID, type: INTEGER, primary_key: true }
//!       - { name: ARTIST_NAME, type: VARCHAR, length: 254, mandatory: true }
//!     relationships:
//!       - name: paintingArray
//!         target: PAINTING
//!         to_many: true
//!         joins: [{ source: ARTIST_ID, target: ARTIST_ID }]
//! ```

use dbsync_core::{Column, DataMap, DataType, QualifiedName, Relationship, Table, Value};
use serde::Deserialize;

use crate::TestkitError;

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelSpec {
    pub tables: Vec<TableSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableSpec {
    pub name: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(default)]
    pub primary_key_name: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub relationships: Vec<RelationshipSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub precision: Option<u32>,
    #[serde(default)]
    pub scale: Option<u32>,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub generated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationshipSpec {
    pub name: String,
    pub target: String,
    #[serde(default)]
    pub target_schema: Option<String>,
    #[serde(default)]
    pub to_many: bool,
    #[serde(default)]
    pub to_dependent_pk: bool,
    #[serde(default)]
    pub fk_name: Option<String>,
    pub joins: Vec<JoinSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoinSpec {
    pub source: String,
    pub target: String,
}

/// A backfill value as written in YAML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ValueSpec {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl ModelSpec {
    pub fn to_data_map(&self) -> Result<DataMap, TestkitError> {
        let mut data_map = DataMap::new();
        for table in &self.tables {
            data_map.add_table(table.to_table()?)?;
        }
        Ok(data_map)
    }
}

impl TableSpec {
    fn to_table(&self) -> Result<Table, TestkitError> {
        let mut name = QualifiedName::new(&self.name);
        name.schema.clone_from(&self.schema);
        name.catalog.clone_from(&self.catalog);

        let mut table = Table::new(name);
        table.primary_key_name.clone_from(&self.primary_key_name);
        for column in &self.columns {
            table.add_column(column.to_column(&self.name)?)?;
        }
        for relationship in &self.relationships {
            table.add_relationship(relationship.to_relationship())?;
        }
        Ok(table)
    }
}

impl ColumnSpec {
    fn to_column(&self, table: &str) -> Result<Column, TestkitError> {
        let data_type = DataType::from_sql_name(&self.data_type).ok_or_else(|| {
            TestkitError::UnknownDataType {
                table: table.to_string(),
                column: self.name.clone(),
                data_type: self.data_type.clone(),
            }
        })?;

        let mut column = Column::new(&self.name, data_type);
        column.length = self.length;
        column.precision = self.precision;
        column.scale = self.scale;
        column.mandatory = self.mandatory || self.primary_key;
        column.primary_key = self.primary_key;
        column.generated = self.generated;
        Ok(column)
    }
}

impl RelationshipSpec {
    fn to_relationship(&self) -> Relationship {
        let mut target = QualifiedName::new(&self.target);
        target.schema.clone_from(&self.target_schema);

        let mut relationship = Relationship::new(&self.name, target);
        relationship.to_many = self.to_many;
        relationship.to_dependent_pk = self.to_dependent_pk;
        relationship.fk_name.clone_from(&self.fk_name);
        for join in &self.joins {
            relationship = relationship.join(&join.source, &join.target);
        }
        relationship
    }
}

impl From<&ValueSpec> for Value {
    fn from(spec: &ValueSpec) -> Self {
        match spec {
            ValueSpec::Bool(value) => Value::Bool(*value),
            ValueSpec::Integer(value) => Value::Integer(*value),
            ValueSpec::Float(value) => Value::Float(*value),
            ValueSpec::String(value) => Value::String(value.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_key_columns_are_mandatory() {
        let spec: ModelSpec = serde_yaml::from_str(
            "tables:\n  - name: ARTIST\n    columns:\n      - { name: ARTIST_ID, type: integer, primary_key: true }\n",
        )
        .expect("spec parses");

        let data_map = spec.to_data_map().expect("spec converts");
        let column = data_map.tables()[0]
            .column("ARTIST_ID")
            .expect("column exists");
        assert!(column.primary_key && column.mandatory);
        assert_eq!(column.data_type, DataType::Integer);
    }

    #[test]
    fn unknown_types_are_reported_with_the_column() {
        let spec: ModelSpec = serde_yaml::from_str(
            "tables:\n  - name: ARTIST\n    columns:\n      - { name: SHAPE, type: GEOMETRY }\n",
        )
        .expect("spec parses");

        let error = spec.to_data_map().expect_err("GEOMETRY is not a known type");
        assert_eq!(
            error.to_string(),
            "unknown data type `GEOMETRY` for column `ARTIST.SHAPE`"
        );
    }
}
