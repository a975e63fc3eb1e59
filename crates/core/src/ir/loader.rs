use std::collections::BTreeMap;

use crate::{DataMap, NameMatching, QualifiedName, Relationship};

const REVERSE_SUFFIX: &str = "_reverse";

/// One column pair of an introspected foreign-key constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRow {
    pub name: String,
    pub source_table: QualifiedName,
    pub source_column: String,
    pub target_table: QualifiedName,
    pub target_column: String,
    pub ordinal: u32,
}

/// Turns introspected foreign keys into relationship pairs.
///
/// The constraint becomes a to-one relationship on the source table. Its
/// inverse on the target table is to-many, unless the FK columns are exactly
/// the source primary key, in which case it is a to-one relationship to a
/// dependent primary key. Constraints touching tables absent from `data_map`
/// are skipped.
pub fn attach_foreign_keys(data_map: &mut DataMap, rows: Vec<ForeignKeyRow>) {
    let mut grouped = BTreeMap::<(QualifiedName, String), Vec<ForeignKeyRow>>::new();
    for row in rows {
        grouped
            .entry((row.source_table.clone(), row.name.clone()))
            .or_default()
            .push(row);
    }

    for ((source_name, fk_name), mut rows) in grouped {
        rows.sort_by_key(|row| row.ordinal);
        let target_name = rows[0].target_table.clone();

        let Some(source) = data_map.find_table(&source_name, NameMatching::CaseSensitive) else {
            continue;
        };
        if data_map
            .find_table(&target_name, NameMatching::CaseSensitive)
            .is_none()
        {
            continue;
        }

        let source_pk = sorted(source.primary_key_names());
        let fk_columns = sorted(rows.iter().map(|row| row.source_column.clone()).collect());
        let one_to_one = !source_pk.is_empty() && source_pk == fk_columns;
        let source_name = source.name.clone();

        let mut forward =
            Relationship::new(fk_name.clone(), target_name.clone()).with_fk_name(&fk_name);
        let mut reverse =
            Relationship::new(format!("{fk_name}{REVERSE_SUFFIX}"), source_name.clone());
        for row in &rows {
            forward = forward.join(&row.source_column, &row.target_column);
            reverse = reverse.join(&row.target_column, &row.source_column);
        }
        reverse = if one_to_one {
            reverse.to_dependent_pk()
        } else {
            reverse.to_many()
        };

        if let Some(source) = data_map.find_table_mut(&source_name, NameMatching::CaseSensitive) {
            source.relationships.push(forward);
        }
        if let Some(target) = data_map.find_table_mut(&target_name, NameMatching::CaseSensitive) {
            target.relationships.push(reverse);
        }
    }
}

fn sorted(mut values: Vec<String>) -> Vec<String> {
    values.sort();
    values
}
