use dbsync_core::{
    Column, DataMap, DataType, DefaultEquivalencePolicy, EquivalencePolicy,
    EquivalencePolicyContractError, FixedValueForNullProvider, ForeignKeyRow, ModelError,
    NameMatching, QualifiedName, Table, ValueForNullProvider, Value, attach_foreign_keys,
    verify_equivalence_policy_contract,
};

#[path = "support/fixtures.rs"]
mod fixtures;

use fixtures::{artist, artist_to_paintings, gallery, painting, painting_to_artist};

fn fk_row(
    name: &str,
    source: &str,
    source_column: &str,
    target: &str,
    target_column: &str,
) -> ForeignKeyRow {
    ForeignKeyRow {
        name: name.to_string(),
        source_table: QualifiedName::new(source),
        source_column: source_column.to_string(),
        target_table: QualifiedName::new(target),
        target_column: target_column.to_string(),
        ordinal: 1,
    }
}

#[test]
fn foreign_keys_become_relationship_pairs() {
    let mut map = DataMap::new().with_table(artist()).with_table(painting());

    attach_foreign_keys(
        &mut map,
        vec![fk_row("fk_painting_artist", "PAINTING", "ARTIST_ID", "ARTIST", "ARTIST_ID")],
    );

    let painting = map.table(&QualifiedName::new("PAINTING")).expect("painting");
    let forward = painting
        .relationship("fk_painting_artist")
        .expect("forward relationship");
    assert!(forward.is_foreign_key());
    assert_eq!(forward.fk_name.as_deref(), Some("fk_painting_artist"));
    assert!(forward.structurally_equal(&painting_to_artist(), NameMatching::CaseInsensitive));

    let artist = map.table(&QualifiedName::new("ARTIST")).expect("artist");
    let reverse = artist
        .relationship("fk_painting_artist_reverse")
        .expect("reverse relationship");
    assert!(reverse.to_many);
    assert!(reverse.structurally_equal(&artist_to_paintings(), NameMatching::CaseInsensitive));
}

#[test]
fn foreign_key_on_the_primary_key_points_to_a_dependent_key() {
    let details = Table::named("ARTIST_DETAILS")
        .with_column(Column::new("ARTIST_ID", DataType::Integer).primary_key());
    let mut map = DataMap::new().with_table(artist()).with_table(details);

    attach_foreign_keys(
        &mut map,
        vec![fk_row("fk_details", "ARTIST_DETAILS", "ARTIST_ID", "ARTIST", "ARTIST_ID")],
    );

    let artist = map.table(&QualifiedName::new("ARTIST")).expect("artist");
    let reverse = artist
        .relationship("fk_details_reverse")
        .expect("reverse relationship");
    assert!(reverse.to_dependent_pk);
    assert!(!reverse.to_many);
    assert!(!reverse.is_foreign_key());
}

#[test]
fn composite_foreign_keys_keep_column_order() {
    let mut row_two = fk_row("fk_pair", "CHILD", "B", "PARENT", "Y");
    row_two.ordinal = 2;
    let mut map = DataMap::new()
        .with_table(
            Table::named("PARENT")
                .with_column(Column::new("X", DataType::Integer).primary_key())
                .with_column(Column::new("Y", DataType::Integer).primary_key()),
        )
        .with_table(
            Table::named("CHILD")
                .with_column(Column::new("A", DataType::Integer))
                .with_column(Column::new("B", DataType::Integer)),
        );

    attach_foreign_keys(&mut map, vec![row_two, fk_row("fk_pair", "CHILD", "A", "PARENT", "X")]);

    let child = map.table(&QualifiedName::new("CHILD")).expect("child");
    let forward = child.relationship("fk_pair").expect("forward relationship");
    assert_eq!(forward.source_columns(), vec!["A", "B"]);
    assert_eq!(forward.target_columns(), vec!["X", "Y"]);
}

#[test]
fn foreign_keys_to_unknown_tables_are_skipped() {
    let mut map = DataMap::new().with_table(painting());

    attach_foreign_keys(
        &mut map,
        vec![fk_row("fk_painting_artist", "PAINTING", "ARTIST_ID", "ARTIST", "ARTIST_ID")],
    );

    assert!(map.tables()[0].relationships.is_empty());
}

#[test]
fn reverse_relationship_is_resolved_through_the_target_table() {
    let map = gallery();
    let painting = map.table(&QualifiedName::new("PAINTING")).expect("painting");

    let reverse = map
        .reverse_relationship(
            &painting.name,
            &painting.relationships[0],
            NameMatching::CaseInsensitive,
        )
        .expect("artist points back");

    assert_eq!(reverse.name, "paintingArray");
}

#[test]
fn table_lookup_prefers_exact_qualifiers() {
    let map = DataMap::new()
        .with_table(Table::new(QualifiedName::new("ORDERS").with_schema("archive")))
        .with_table(Table::new(QualifiedName::new("ORDERS").with_schema("sales")));

    let sales = map
        .find_table(
            &QualifiedName::new("orders").with_schema("SALES"),
            NameMatching::CaseInsensitive,
        )
        .expect("sales orders");
    let any = map
        .find_table(&QualifiedName::new("ORDERS"), NameMatching::CaseInsensitive)
        .expect("unqualified lookup matches a table");

    assert_eq!(sales.name.schema.as_deref(), Some("sales"));
    assert_eq!(any.name.schema.as_deref(), Some("archive"));
    assert!(
        map.find_table(&QualifiedName::new("orders"), NameMatching::CaseSensitive)
            .is_none()
    );
}

#[test]
fn model_mutations_reject_duplicates_and_missing_objects() {
    let mut table = artist();

    assert_eq!(
        table.add_column(Column::new("ARTIST_ID", DataType::Integer)),
        Err(ModelError::ColumnExists {
            table: "ARTIST".to_string(),
            column: "ARTIST_ID".to_string(),
        })
    );
    assert!(matches!(
        table.remove_column("MISSING", NameMatching::CaseInsensitive),
        Err(ModelError::ColumnNotFound { .. })
    ));
    assert!(matches!(
        table.remove_relationship(&painting_to_artist(), NameMatching::CaseInsensitive),
        Err(ModelError::RelationshipNotFound { .. })
    ));
    assert!(matches!(
        table.set_primary_key(&["MISSING".to_string()], NameMatching::CaseInsensitive),
        Err(ModelError::ColumnNotFound { .. })
    ));
}

#[test]
fn column_comparison_ignores_comments_and_key_flags() {
    let model = Column::new("NAME", DataType::Varchar).with_length(20).with_comment("display name");
    let db = Column::new("name", DataType::Varchar).with_length(20);

    assert!(model.structurally_equal(&db, NameMatching::CaseInsensitive));
    assert!(!model.structurally_equal(&db, NameMatching::CaseSensitive));
    assert!(!model.same_type(&Column::new("NAME", DataType::Varchar).with_length(21)));
    let sized = Column::new("N", DataType::Integer).with_length(10);
    assert!(sized.same_type(&Column::new("N", DataType::Integer)));
}

#[test]
fn data_types_map_to_jdbc_codes() {
    assert_eq!(DataType::Varchar.code(), 12);
    assert_eq!(DataType::from_code(-5), Some(DataType::BigInt));
    assert_eq!(DataType::from_sql_name(" timestamp "), Some(DataType::Timestamp));
    assert_eq!(DataType::from_code(424_242), None);
}

#[test]
fn value_literals_escape_quotes() {
    assert_eq!(Value::String("O'Keeffe".to_string()).to_sql_literal(), "'O''Keeffe'");
    assert_eq!(Value::Integer(-3).to_sql_literal(), "-3");
    assert_eq!(Value::Null.to_sql_literal(), "NULL");
}

#[test]
fn fixed_value_provider_matches_case_insensitively() {
    let provider = FixedValueForNullProvider::new().with_value("Artist", "Rank", Value::Integer(1));
    let rank = Column::new("RANK", DataType::Integer);

    assert_eq!(provider.value_for(&QualifiedName::new("ARTIST"), &rank), Some(Value::Integer(1)));
    assert!(!provider.has_value_for(&QualifiedName::new("PAINTING"), &rank));
}

struct LengthBlindPolicy;

impl EquivalencePolicy for LengthBlindPolicy {
    fn is_equivalent_type(&self, existing: &Column, target: &Column) -> bool {
        existing.data_type == target.data_type
    }
}

struct OneWayPolicy;

impl EquivalencePolicy for OneWayPolicy {
    fn is_equivalent_type(&self, existing: &Column, target: &Column) -> bool {
        existing.same_type(target) || existing.data_type == DataType::Integer
    }
}

#[test]
fn equivalence_contract_accepts_symmetric_policies() {
    let narrow = Column::new("C", DataType::Varchar).with_length(10);
    let wide = Column::new("C", DataType::Varchar).with_length(90);

    assert_eq!(
        verify_equivalence_policy_contract(&DefaultEquivalencePolicy, &[(&narrow, &wide)]),
        Ok(())
    );
    assert_eq!(
        verify_equivalence_policy_contract(&LengthBlindPolicy, &[(&narrow, &wide)]),
        Ok(())
    );
}

#[test]
fn equivalence_contract_rejects_one_way_policies() {
    let integer = Column::new("C", DataType::Integer);
    let big = Column::new("C", DataType::BigInt);

    assert_eq!(
        verify_equivalence_policy_contract(&OneWayPolicy, &[(&big, &big), (&integer, &big)]),
        Err(EquivalencePolicyContractError::NotSymmetric { case_index: 1 })
    );
}
