use std::collections::{BTreeMap, BTreeSet};

use crate::{Column, MergerToken, NameMatching, QualifiedName, Table, TokenOp};

#[derive(Debug, Clone)]
struct IndexedToken {
    original_index: usize,
    token: MergerToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum PriorityGroup {
    DropRelationship = 1,
    DropTable = 2,
    CreateTable = 3,
    TableScoped = 4,
    AddRelationship = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TableSubPriority {
    DropColumn = 0,
    AddColumn = 1,
    SetColumnType = 2,
    SetValueForNull = 3,
    Nullability = 4,
    GeneratedFlag = 5,
    PrimaryKey = 6,
    LeaveKey = 7,
}

/// Tables are ordered by name with qualifiers absent on one side ignored, so
/// only names are keyed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct TableKey(String);

impl From<&QualifiedName> for TableKey {
    fn from(value: &QualifiedName) -> Self {
        Self(NameMatching::CaseInsensitive.key(&value.name))
    }
}

/// Orders tokens so that every token's dependencies are applied before it:
/// foreign keys are dropped before tables and columns disappear, and added
/// after the tables and columns they reference exist. The sort is stable.
#[must_use]
pub fn sort_tokens(tokens: Vec<MergerToken>) -> Vec<MergerToken> {
    let mut grouped = BTreeMap::<PriorityGroup, Vec<IndexedToken>>::new();
    for (original_index, token) in tokens.into_iter().enumerate() {
        grouped
            .entry(priority_group(token.op()))
            .or_default()
            .push(IndexedToken {
                original_index,
                token,
            });
    }

    let mut sorted = Vec::new();
    for (priority, entries) in grouped {
        let prioritized = match priority {
            PriorityGroup::DropTable => sort_drop_tables(entries),
            PriorityGroup::CreateTable => sort_create_tables(entries),
            PriorityGroup::TableScoped => sort_table_scoped(entries),
            PriorityGroup::DropRelationship | PriorityGroup::AddRelationship => entries,
        };
        sorted.extend(prioritized.into_iter().map(|entry| entry.token));
    }

    sorted
}

fn priority_group(op: &TokenOp) -> PriorityGroup {
    match op {
        TokenOp::DropRelationship { .. } => PriorityGroup::DropRelationship,
        TokenOp::DropTable { .. } => PriorityGroup::DropTable,
        TokenOp::CreateTable { .. } => PriorityGroup::CreateTable,
        TokenOp::AddRelationship { .. } => PriorityGroup::AddRelationship,
        TokenOp::AddColumn { .. }
        | TokenOp::DropColumn { .. }
        | TokenOp::SetColumnType { .. }
        | TokenOp::SetNotNull { .. }
        | TokenOp::SetAllowNull { .. }
        | TokenOp::SetValueForNull { .. }
        | TokenOp::SetPrimaryKey { .. }
        | TokenOp::SetGeneratedFlag { .. } => PriorityGroup::TableScoped,
    }
}

/// Columns dropped from a primary key, per table. Their `SetAllowNull` and
/// `DropColumn` tokens must follow the key change.
type KeyLeavers = BTreeMap<TableKey, BTreeSet<String>>;

fn key_leavers(entries: &[IndexedToken]) -> KeyLeavers {
    let matching = NameMatching::CaseInsensitive;
    let mut leavers = KeyLeavers::new();
    for entry in entries {
        let TokenOp::SetPrimaryKey { table, old, new, .. } = entry.token.op() else {
            continue;
        };
        let kept = new
            .iter()
            .map(|column| matching.key(column))
            .collect::<BTreeSet<_>>();
        leavers.entry(TableKey::from(table)).or_default().extend(
            old.iter()
                .map(|column| matching.key(column))
                .filter(|column| !kept.contains(column)),
        );
    }
    leavers
}

fn table_sub_priority(op: &TokenOp, leavers: &KeyLeavers) -> TableSubPriority {
    let leaves_key = |column: &Column| {
        leavers
            .get(&TableKey::from(op.table_name()))
            .is_some_and(|columns| {
                columns.contains(&NameMatching::CaseInsensitive.key(&column.name))
            })
    };

    match op {
        TokenOp::DropColumn { column, .. } | TokenOp::SetAllowNull { column, .. }
            if leaves_key(column) =>
        {
            TableSubPriority::LeaveKey
        }
        TokenOp::DropColumn { .. } => TableSubPriority::DropColumn,
        TokenOp::AddColumn { .. } => TableSubPriority::AddColumn,
        TokenOp::SetColumnType { .. } => TableSubPriority::SetColumnType,
        TokenOp::SetValueForNull { .. } => TableSubPriority::SetValueForNull,
        TokenOp::SetNotNull { .. } | TokenOp::SetAllowNull { .. } => TableSubPriority::Nullability,
        TokenOp::SetGeneratedFlag { .. } => TableSubPriority::GeneratedFlag,
        _ => TableSubPriority::PrimaryKey,
    }
}

fn sort_table_scoped(mut entries: Vec<IndexedToken>) -> Vec<IndexedToken> {
    let mut table_order = BTreeMap::<TableKey, usize>::new();
    for entry in &entries {
        let key = TableKey::from(entry.token.op().table_name());
        let next = table_order.len();
        table_order.entry(key).or_insert(next);
    }
    let leavers = key_leavers(&entries);

    entries.sort_by_key(|entry| {
        let table_rank = table_order
            .get(&TableKey::from(entry.token.op().table_name()))
            .copied()
            .unwrap_or(usize::MAX);
        (
            table_rank,
            table_sub_priority(entry.token.op(), &leavers),
            entry.original_index,
        )
    });
    entries
}

/// Referenced tables are created first.
fn sort_create_tables(entries: Vec<IndexedToken>) -> Vec<IndexedToken> {
    let dependencies = table_dependencies(&entries, |op| match op {
        TokenOp::CreateTable { table } => Some(table),
        _ => None,
    });
    topological_sort(entries, dependencies)
}

/// Referencing tables are dropped first.
fn sort_drop_tables(entries: Vec<IndexedToken>) -> Vec<IndexedToken> {
    let references = table_dependencies(&entries, |op| match op {
        TokenOp::DropTable { table } => Some(table),
        _ => None,
    });

    let mut dependencies = vec![BTreeSet::<usize>::new(); entries.len()];
    for (referencing, referenced) in references.iter().enumerate() {
        for target in referenced {
            dependencies[*target].insert(referencing);
        }
    }
    topological_sort(entries, dependencies)
}

/// For each entry, the entries whose tables it references through a
/// foreign-key relationship.
fn table_dependencies(
    entries: &[IndexedToken],
    table_of: impl Fn(&TokenOp) -> Option<&Table>,
) -> Vec<BTreeSet<usize>> {
    let mut index_by_table = BTreeMap::<TableKey, usize>::new();
    for (idx, entry) in entries.iter().enumerate() {
        if let Some(table) = table_of(entry.token.op()) {
            index_by_table.insert(TableKey::from(&table.name), idx);
        }
    }

    let mut dependencies = vec![BTreeSet::<usize>::new(); entries.len()];
    for (idx, entry) in entries.iter().enumerate() {
        let Some(table) = table_of(entry.token.op()) else {
            continue;
        };
        let self_key = TableKey::from(&table.name);
        for relationship in table.relationships.iter().filter(|rel| rel.is_foreign_key()) {
            let dependency_key = TableKey::from(&relationship.target);
            if dependency_key == self_key {
                continue;
            }
            if let Some(dependency_index) = index_by_table.get(&dependency_key) {
                dependencies[idx].insert(*dependency_index);
            }
        }
    }
    dependencies
}

/// Kahn's algorithm, breaking ties by original position. Entries caught in a
/// cycle keep their original relative order at the end.
fn topological_sort(
    entries: Vec<IndexedToken>,
    dependencies: Vec<BTreeSet<usize>>,
) -> Vec<IndexedToken> {
    let mut reverse_edges = vec![BTreeSet::<usize>::new(); entries.len()];
    for (idx, deps) in dependencies.iter().enumerate() {
        for dependency in deps {
            reverse_edges[*dependency].insert(idx);
        }
    }

    let mut remaining_dependencies = dependencies.iter().map(BTreeSet::len).collect::<Vec<_>>();
    let mut ready = BTreeSet::<(usize, usize)>::new();
    for (idx, count) in remaining_dependencies.iter().enumerate() {
        if *count == 0 {
            ready.insert((entries[idx].original_index, idx));
        }
    }

    let mut ordered_indexes = Vec::new();
    let mut visited = vec![false; entries.len()];
    while let Some((_, idx)) = ready.pop_first() {
        if visited[idx] {
            continue;
        }
        visited[idx] = true;
        ordered_indexes.push(idx);

        for dependent in &reverse_edges[idx] {
            if remaining_dependencies[*dependent] == 0 {
                continue;
            }
            remaining_dependencies[*dependent] -= 1;
            if remaining_dependencies[*dependent] == 0 {
                ready.insert((entries[*dependent].original_index, *dependent));
            }
        }
    }

    if ordered_indexes.len() != entries.len() {
        let mut unresolved = (0..entries.len())
            .filter(|idx| !visited[*idx])
            .collect::<Vec<_>>();
        unresolved.sort_by_key(|idx| entries[*idx].original_index);
        ordered_indexes.extend(unresolved);
    }

    let mut slots = entries.into_iter().map(Some).collect::<Vec<_>>();
    ordered_indexes
        .into_iter()
        .filter_map(|idx| slots[idx].take())
        .collect()
}
