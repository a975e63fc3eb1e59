use tracing::debug;

use crate::{Column, MergerContext, ModelError, QualifiedName, Result, Table, TokenOp};

pub(super) fn execute(op: &TokenOp, context: &mut MergerContext<'_>) -> Result<()> {
    let matching = context.name_matching();
    let delegate = context.delegate();
    debug!(token = op.name(), target = %op.target(), "applying to model");

    match op {
        TokenOp::CreateTable { table } => {
            context.data_map_mut().add_table(table.clone())?;
            delegate.table_added(table);
        }
        TokenOp::DropTable { table } => {
            let removed = context.data_map_mut().remove_table(&table.name, matching)?;
            delegate.table_removed(&removed);
        }
        TokenOp::AddColumn { table, column } => {
            let table = table_mut(context, table)?;
            table.add_column(column.clone())?;
            delegate.column_added(table, column);
        }
        TokenOp::DropColumn { table, column } => {
            let table = table_mut(context, table)?;
            let removed = table.remove_column(&column.name, matching)?;
            delegate.column_removed(table, &removed);
        }
        TokenOp::SetColumnType { table, from, to, .. } => {
            update_column(context, table, &from.name, |column| {
                column.data_type = to.data_type;
                column.length = to.length;
                column.precision = to.precision;
                column.scale = to.scale;
            })?;
        }
        TokenOp::SetNotNull { table, column } => {
            update_column(context, table, &column.name, |column| column.mandatory = true)?;
        }
        TokenOp::SetAllowNull { table, column } => {
            update_column(context, table, &column.name, |column| column.mandatory = false)?;
        }
        TokenOp::SetGeneratedFlag {
            table,
            column,
            generated,
        } => {
            update_column(context, table, &column.name, |column| {
                column.generated = *generated;
            })?;
        }
        // Backfilled values live only in the database.
        TokenOp::SetValueForNull { .. } => {}
        TokenOp::AddRelationship {
            table,
            relationship,
        } => {
            let table = table_mut(context, table)?;
            table.add_relationship(relationship.clone())?;
            delegate.relationship_added(table, relationship);
        }
        TokenOp::DropRelationship {
            table,
            relationship,
        } => {
            let table = table_mut(context, table)?;
            let removed = table.remove_relationship(relationship, matching)?;
            delegate.relationship_removed(table, &removed);
        }
        TokenOp::SetPrimaryKey {
            table,
            new,
            constraint_name,
            ..
        } => {
            let table = table_mut(context, table)?;
            table.set_primary_key(new, matching)?;
            if constraint_name.is_some() {
                table.primary_key_name.clone_from(constraint_name);
            }
            delegate.primary_key_changed(table);
        }
    }

    Ok(())
}

fn table_mut<'c>(
    context: &'c mut MergerContext<'_>,
    name: &QualifiedName,
) -> std::result::Result<&'c mut Table, ModelError> {
    let matching = context.name_matching();
    context
        .data_map_mut()
        .find_table_mut(name, matching)
        .ok_or_else(|| ModelError::TableNotFound {
            table: name.name.clone(),
        })
}

fn update_column(
    context: &mut MergerContext<'_>,
    table_name: &QualifiedName,
    column_name: &str,
    update: impl FnOnce(&mut Column),
) -> Result<()> {
    let matching = context.name_matching();
    let delegate = context.delegate();
    let table = table_mut(context, table_name)?;
    let table_label = table.name.name.clone();
    let column = table
        .find_column_mut(column_name, matching)
        .ok_or_else(|| ModelError::ColumnNotFound {
            table: table_label,
            column: column_name.to_string(),
        })?;
    update(column);
    let column = column.clone();
    delegate.column_changed(table, &column);
    Ok(())
}
