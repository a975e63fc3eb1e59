use dbsync_core::{
    Column, DataMap, DataType, DbMerger, MergerToken, QualifiedName, Relationship, Table,
    TokenFactory, sort_tokens,
};

#[path = "support/fake_adapter.rs"]
mod fake_adapter;
#[path = "support/fake_dialect.rs"]
mod fake_dialect;
#[path = "support/fixtures.rs"]
mod fixtures;

use fake_dialect::FakeDialect;
use fixtures::{artist, artist_to_paintings, painting, painting_to_artist};

fn merge(model: &DataMap, db: &DataMap) -> Vec<MergerToken> {
    let dialect = FakeDialect::new();
    DbMerger::new(TokenFactory::new(&dialect))
        .expect("default filters validate")
        .merge(model, db)
        .expect("merge should succeed")
}

fn summary(tokens: &[MergerToken]) -> Vec<String> {
    tokens
        .iter()
        .map(|token| format!("{} {}", token.token_name(), token.token_value()))
        .collect()
}

/// PAINTING is listed before the ARTIST table it references.
fn referencing_first() -> DataMap {
    DataMap::new()
        .with_table(painting().with_relationship(painting_to_artist()))
        .with_table(artist().with_relationship(artist_to_paintings()))
}

#[test]
fn created_tables_follow_the_tables_they_reference() {
    let tokens = merge(&referencing_first(), &DataMap::new());

    assert_eq!(
        summary(&tokens),
        vec![
            "Create Table ARTIST",
            "Create Table PAINTING",
            "Add Relationship PAINTING->ARTIST",
        ]
    );
}

#[test]
fn dropped_tables_precede_the_tables_they_reference() {
    let db = DataMap::new()
        .with_table(artist().with_relationship(artist_to_paintings()))
        .with_table(painting().with_relationship(painting_to_artist()));

    let tokens = merge(&DataMap::new(), &db);

    assert_eq!(
        summary(&tokens),
        vec!["Drop Table PAINTING", "Drop Table ARTIST"]
    );
}

#[test]
fn self_referencing_table_is_created_once() {
    let employee = Table::named("EMPLOYEE")
        .with_column(Column::new("ID", DataType::Integer).primary_key())
        .with_column(Column::new("MANAGER_ID", DataType::Integer))
        .with_relationship(
            Relationship::new("manager", QualifiedName::new("EMPLOYEE")).join("MANAGER_ID", "ID"),
        );

    let tokens = merge(&DataMap::new().with_table(employee), &DataMap::new());

    assert_eq!(
        summary(&tokens),
        vec!["Create Table EMPLOYEE", "Add Relationship EMPLOYEE->EMPLOYEE"]
    );
}

#[test]
fn circular_references_keep_their_relative_order() {
    let left = Table::named("LEFT_SIDE")
        .with_column(Column::new("ID", DataType::Integer).primary_key())
        .with_column(Column::new("RIGHT_ID", DataType::Integer))
        .with_relationship(
            Relationship::new("right", QualifiedName::new("RIGHT_SIDE")).join("RIGHT_ID", "ID"),
        );
    let right = Table::named("RIGHT_SIDE")
        .with_column(Column::new("ID", DataType::Integer).primary_key())
        .with_column(Column::new("LEFT_ID", DataType::Integer))
        .with_relationship(
            Relationship::new("left", QualifiedName::new("LEFT_SIDE")).join("LEFT_ID", "ID"),
        );

    let tokens = merge(
        &DataMap::new().with_table(left).with_table(right),
        &DataMap::new(),
    );

    assert_eq!(
        summary(&tokens),
        vec![
            "Create Table LEFT_SIDE",
            "Create Table RIGHT_SIDE",
            "Add Relationship LEFT_SIDE->RIGHT_SIDE",
            "Add Relationship RIGHT_SIDE->LEFT_SIDE",
        ]
    );
}

#[test]
fn table_scoped_tokens_group_by_table_then_kind() {
    let dialect = FakeDialect::new();
    let factory = TokenFactory::new(&dialect);
    let painting = painting().with_relationship(painting_to_artist());
    let artist = artist();
    let title = painting.column("PAINTING_TITLE").expect("fixture column").clone();
    let artist_id = painting.column("ARTIST_ID").expect("fixture column").clone();
    let birth = artist.column("DATE_OF_BIRTH").expect("fixture column").clone();

    let tokens = vec![
        factory
            .create_set_allow_null_to_db(&painting, &title)
            .expect("column exists"),
        factory.create_add_column_to_db(&artist, &Column::new("RANK", DataType::Integer)),
        factory
            .create_drop_column_to_db(&painting, &artist_id)
            .expect("column exists"),
        factory
            .create_drop_relationship_to_db(&painting, &painting_to_artist())
            .expect("relationship has joins"),
        factory
            .create_drop_column_to_db(&artist, &birth)
            .expect("column exists"),
        factory.create_add_column_to_db(&painting, &Column::new("YEAR", DataType::Integer)),
    ];

    assert_eq!(
        summary(&sort_tokens(tokens)),
        vec![
            "Drop Relationship PAINTING->ARTIST",
            "Drop Column PAINTING.ARTIST_ID",
            "Add Column PAINTING.YEAR",
            "Set Allow Null PAINTING.PAINTING_TITLE",
            "Drop Column ARTIST.DATE_OF_BIRTH",
            "Add Column ARTIST.RANK",
        ]
    );
}

fn keyed(first_key: bool) -> Table {
    let (id1, id2) = if first_key {
        (
            Column::new("ID1", DataType::Integer).primary_key(),
            Column::new("ID2", DataType::Integer),
        )
    } else {
        (
            Column::new("ID1", DataType::Integer),
            Column::new("ID2", DataType::Integer).primary_key(),
        )
    };
    Table::named("T").with_column(id1).with_column(id2)
}

#[test]
fn columns_leaving_the_primary_key_are_relaxed_after_the_key_moves() {
    let model = DataMap::new().with_table(keyed(false));
    let db = DataMap::new().with_table(keyed(true));

    assert_eq!(
        summary(&merge(&model, &db)),
        vec![
            "Set Not Null T.ID2",
            "Set Primary Key T (ID1 -> ID2)",
            "Set Allow Null T.ID1",
        ]
    );
}

#[test]
fn columns_leaving_the_primary_key_are_dropped_after_the_key_moves() {
    let model = DataMap::new().with_table(
        Table::named("T")
            .with_column(Column::new("ID2", DataType::Integer).primary_key())
            .with_column(Column::new("NOTE", DataType::Varchar).with_length(20)),
    );
    let db = DataMap::new().with_table(
        keyed(true).with_column(Column::new("LEGACY", DataType::Integer)),
    );

    assert_eq!(
        summary(&merge(&model, &db)),
        vec![
            "Drop Column T.LEGACY",
            "Add Column T.NOTE",
            "Set Not Null T.ID2",
            "Set Primary Key T (ID1 -> ID2)",
            "Drop Column T.ID1",
        ]
    );
}
