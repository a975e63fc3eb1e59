use tracing::debug;

use super::DbMerger;
use crate::{
    Column, DataMap, Direction, MergerToken, NameMatching, Relationship, Result, Table, factory,
};

pub(super) struct Comparison<'m, 'a> {
    merger: &'m DbMerger<'a>,
    existing: &'m DataMap,
    target: &'m DataMap,
    tokens: Vec<MergerToken>,
}

impl<'m, 'a> Comparison<'m, 'a> {
    pub(super) fn new(
        merger: &'m DbMerger<'a>,
        existing: &'m DataMap,
        target: &'m DataMap,
    ) -> Self {
        Self {
            merger,
            existing,
            target,
            tokens: Vec::new(),
        }
    }

    pub(super) fn run(mut self) -> Result<Vec<MergerToken>> {
        let existing_tables = self.included_tables(self.existing);
        let target_tables = self.included_tables(self.target);

        let mut matched = vec![false; target_tables.len()];
        let mut pairs = Vec::new();
        let mut created = Vec::new();
        for existing in &existing_tables {
            match self.find_match(existing, &target_tables, &matched) {
                Some(index) => {
                    matched[index] = true;
                    pairs.push((existing, &target_tables[index]));
                }
                None => created.push(existing),
            }
        }

        for table in created {
            self.create_table(table)?;
        }
        for (index, table) in target_tables.iter().enumerate() {
            if !matched[index] {
                self.push(factory::drop_table(self.direction(), table));
            }
        }
        for (existing, target) in pairs {
            self.compare_columns(existing, target)?;
            if !self.merger.options.skip_primary_keys {
                self.compare_primary_key(existing, target)?;
            }
            if !self.merger.options.skip_relationships {
                self.compare_relationships(existing, target)?;
            }
        }

        debug!(tokens = self.tokens.len(), direction = %self.direction(), "merge complete");
        Ok(self.tokens)
    }

    fn direction(&self) -> Direction {
        self.merger.options.direction
    }

    fn matching(&self) -> NameMatching {
        self.merger.options.name_matching
    }

    fn push(&mut self, token: MergerToken) {
        self.tokens.push(token);
    }

    /// Filtered copies of the tables of `data_map`: excluded tables, columns
    /// and relationships to excluded tables are removed.
    fn included_tables(&self, data_map: &DataMap) -> Vec<Table> {
        let filters = &self.merger.filters;
        data_map
            .tables
            .iter()
            .filter(|table| filters.is_table_included(&table.name))
            .map(|table| Table {
                name: table.name.clone(),
                columns: table
                    .columns
                    .iter()
                    .filter(|column| filters.is_column_included(&table.name, &column.name))
                    .cloned()
                    .collect(),
                relationships: table
                    .relationships
                    .iter()
                    .filter(|relationship| filters.is_table_included(&relationship.target))
                    .cloned()
                    .collect(),
                primary_key_name: table.primary_key_name.clone(),
            })
            .collect()
    }

    fn find_match(&self, table: &Table, candidates: &[Table], matched: &[bool]) -> Option<usize> {
        let matching = self.matching();
        let available = |index: &usize| !matched[*index];
        (0..candidates.len())
            .filter(available)
            .find(|index| candidates[*index].name.matches_exactly(&table.name, matching))
            .or_else(|| {
                (0..candidates.len())
                    .filter(available)
                    .find(|index| candidates[*index].name.matches(&table.name, matching))
            })
    }

    fn create_table(&mut self, table: &Table) -> Result<()> {
        let direction = self.direction();
        let mut created = table.clone();
        created.relationships = table
            .relationships
            .iter()
            .map(|relationship| self.localize_relationship(relationship, table, self.target))
            .collect();
        self.push(factory::create_table(direction, &created));

        // New tables in the model carry their relationships; in the database
        // each foreign key is a separate statement.
        if direction == Direction::ToDb && !self.merger.options.skip_relationships {
            for relationship in &created.relationships {
                if self.merger.factory.should_generate_fk_constraint(relationship) {
                    self.push(factory::add_relationship(direction, &created, relationship)?);
                }
            }
        }
        Ok(())
    }

    fn compare_columns(&mut self, existing: &Table, target: &Table) -> Result<()> {
        let direction = self.direction();
        let matching = self.matching();
        let equivalence = self.merger.equivalence;

        for column in &existing.columns {
            let Some(current) = target.find_column(&column.name, matching) else {
                self.add_column(target, column)?;
                continue;
            };

            if !equivalence.is_equivalent_type(column, current) {
                self.push(
                    self.merger
                        .factory
                        .set_column_type(direction, target, current, column)?,
                );
            }
            if column.mandatory != current.mandatory {
                self.push(factory::set_nullability(
                    direction,
                    target,
                    &column.renamed(&current.name),
                    column.mandatory,
                )?);
            }
            if column.generated != current.generated {
                self.push(factory::set_generated_flag(
                    direction,
                    target,
                    current,
                    column.generated,
                )?);
            }
        }

        for current in &target.columns {
            if existing.find_column(&current.name, matching).is_none() {
                self.push(factory::drop_column(direction, target, current)?);
            }
        }
        Ok(())
    }

    fn add_column(&mut self, target: &Table, column: &Column) -> Result<()> {
        let direction = self.direction();
        self.push(factory::add_column(direction, target, column));
        if direction != Direction::ToDb || !column.mandatory {
            return Ok(());
        }

        let pending = target.clone().with_column(column.clone());
        if let Some(value) = self
            .merger
            .options
            .value_for_null
            .value_for(&target.name, column)
        {
            self.push(
                self.merger
                    .factory
                    .create_set_value_for_null_to_db(&pending, column, value),
            );
        }
        self.push(factory::set_nullability(direction, &pending, column, true)?);
        Ok(())
    }

    fn compare_primary_key(&mut self, existing: &Table, target: &Table) -> Result<()> {
        let matching = self.matching();
        let new = existing.primary_key_names();
        let old = target.primary_key_names();
        if key_set(&new, matching) == key_set(&old, matching) {
            return Ok(());
        }

        // The statement targets `target`; columns the merge is about to add
        // come from `existing`.
        let mut subject = Table::new(target.name.clone());
        subject.columns = target.columns.clone();
        for column in &existing.columns {
            if target.find_column(&column.name, matching).is_none() {
                subject.columns.push(column.clone());
            }
        }
        subject.primary_key_name = target
            .primary_key_name
            .clone()
            .or_else(|| existing.primary_key_name.clone());

        let new = new
            .iter()
            .map(|name| local_column_name(target, name, matching))
            .collect::<Vec<_>>();
        self.push(factory::set_primary_key(
            self.direction(),
            &subject,
            &old,
            &new,
        )?);
        Ok(())
    }

    fn compare_relationships(&mut self, existing: &Table, target: &Table) -> Result<()> {
        let direction = self.direction();
        let matching = self.matching();

        for relationship in &existing.relationships {
            let present = target
                .relationships
                .iter()
                .any(|candidate| candidate.structurally_equal(relationship, matching));
            if present {
                continue;
            }
            let localized = self.localize_relationship(relationship, target, self.target);
            // Only foreign keys exist in the database.
            if direction == Direction::ToDb
                && !self.merger.factory.should_generate_fk_constraint(&localized)
            {
                continue;
            }
            self.push(factory::add_relationship(direction, target, &localized)?);
        }

        for relationship in &target.relationships {
            let wanted = existing
                .relationships
                .iter()
                .any(|candidate| candidate.structurally_equal(relationship, matching));
            if wanted {
                continue;
            }
            if direction == Direction::ToDb && !relationship.is_foreign_key() {
                self.learn_relationship(existing, relationship)?;
                continue;
            }
            self.push(factory::drop_relationship(direction, target, relationship)?);
        }
        Ok(())
    }

    /// A database-only relationship without a foreign key, such as the to-many
    /// inverse of an introspected constraint, cannot be dropped. It is added
    /// to the model instead, spelled the way the model spells its tables and
    /// columns.
    fn learn_relationship(&mut self, existing: &Table, relationship: &Relationship) -> Result<()> {
        let matching = self.matching();
        if self.existing.find_table(&relationship.target, matching).is_none() {
            return Ok(());
        }
        let learned = self.localize_relationship(relationship, existing, self.existing);
        self.push(factory::add_relationship(Direction::ToModel, existing, &learned)?);
        Ok(())
    }

    /// Rewrites table and column references to the spelling used in `side`,
    /// where those objects already exist there.
    fn localize_relationship(
        &self,
        relationship: &Relationship,
        source: &Table,
        side: &DataMap,
    ) -> Relationship {
        let matching = self.matching();
        let mut localized = relationship.clone();
        let target_table = side.find_table(&relationship.target, matching);
        if let Some(table) = target_table {
            localized.target = table.name.clone();
        }

        for join in &mut localized.joins {
            join.source = local_column_name(source, &join.source, matching);
            if let Some(table) = target_table {
                join.target = local_column_name(table, &join.target, matching);
            }
        }
        localized
    }
}

fn local_column_name(table: &Table, name: &str, matching: NameMatching) -> String {
    table
        .find_column(name, matching)
        .map_or_else(|| name.to_string(), |column| column.name.clone())
}

fn key_set(names: &[String], matching: NameMatching) -> Vec<String> {
    let mut keys = names
        .iter()
        .map(|name| matching.key(name))
        .collect::<Vec<_>>();
    keys.sort();
    keys
}
