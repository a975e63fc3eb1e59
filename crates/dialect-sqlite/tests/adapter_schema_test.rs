use std::collections::BTreeMap;

use dbsync_core::{
    ConnectionConfig, DataType, DatabaseAdapter, Dialect, Error, ExecutionError, FiltersConfig,
    IncludeTableFilter, PatternFilter, QualifiedName, TableFilter,
};
use dbsync_dialect_sqlite::SqliteDialect;

const GALLERY_SQL: &str = r#"
CREATE TABLE ARTIST (
    ARTIST_ID INTEGER PRIMARY KEY AUTOINCREMENT,
    ARTIST_NAME VARCHAR(254) NOT NULL,
    DATE_OF_BIRTH DATE
);
CREATE TABLE PAINTING (
    PAINTING_ID INTEGER NOT NULL,
    ARTIST_ID INTEGER REFERENCES ARTIST,
    PAINTING_TITLE VARCHAR(255) NOT NULL,
    ESTIMATED_PRICE DECIMAL(10, 2),
    PRIMARY KEY (PAINTING_ID)
);
CREATE TABLE PAINTING_INFO (
    PAINTING_ID INTEGER NOT NULL PRIMARY KEY REFERENCES PAINTING (PAINTING_ID),
    TEXT_REVIEW TEXT
);
"#;

fn connect() -> Box<dyn DatabaseAdapter> {
    let adapter = SqliteDialect
        .connect(&ConnectionConfig::for_database(":memory:"))
        .expect("in-memory sqlite connects");
    adapter.execute(GALLERY_SQL).expect("gallery schema is created");
    adapter
}

#[test]
fn load_schema_reads_columns_and_keys() {
    let adapter = connect();

    let schema = adapter
        .load_schema(&FiltersConfig::include_all())
        .expect("schema loads");
    let names = schema
        .tables()
        .iter()
        .map(|table| table.name.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["ARTIST", "PAINTING", "PAINTING_INFO"]);

    let artist = schema
        .table(&QualifiedName::new("ARTIST"))
        .expect("artist is loaded");
    let id = artist.column("ARTIST_ID").expect("id column");
    assert!(id.primary_key && id.mandatory && id.generated);
    assert_eq!(id.data_type, DataType::Integer);
    let name = artist.column("ARTIST_NAME").expect("name column");
    assert_eq!((name.data_type, name.length, name.mandatory), (DataType::Varchar, Some(254), true));
    assert!(!artist.column("DATE_OF_BIRTH").expect("date column").mandatory);

    let painting = schema
        .table(&QualifiedName::new("PAINTING"))
        .expect("painting is loaded");
    let price = painting.column("ESTIMATED_PRICE").expect("price column");
    assert_eq!((price.precision, price.scale), (Some(10), Some(2)));
    assert!(!painting.column("PAINTING_ID").expect("id column").generated);
}

#[test]
fn foreign_keys_become_relationship_pairs() {
    let adapter = connect();
    let schema = adapter
        .load_schema(&FiltersConfig::include_all())
        .expect("schema loads");

    let painting = schema
        .table(&QualifiedName::new("PAINTING"))
        .expect("painting is loaded");
    let to_artist = painting
        .relationships
        .iter()
        .find(|relationship| relationship.target.name == "ARTIST")
        .expect("painting references artist");
    assert!(to_artist.is_foreign_key());
    assert_eq!(to_artist.source_columns(), vec!["ARTIST_ID"]);
    // Implicit target column resolved from the artist primary key.
    assert_eq!(to_artist.target_columns(), vec!["ARTIST_ID"]);

    let artist = schema
        .table(&QualifiedName::new("ARTIST"))
        .expect("artist is loaded");
    assert!(artist.relationships.iter().any(|relationship| {
        relationship.target.name == "PAINTING" && relationship.to_many
    }));

    let dependent = painting
        .relationships
        .iter()
        .find(|relationship| relationship.target.name == "PAINTING_INFO")
        .expect("painting has the reverse of the info key");
    assert!(dependent.to_dependent_pk && !dependent.to_many);
}

#[test]
fn filters_hide_tables_and_columns() {
    let adapter = connect();
    let tables = TableFilter::include_all()
        .including(
            IncludeTableFilter::new("PAINTING")
                .with_columns(PatternFilter::exclude("ESTIMATED_.*")),
        )
        .including(IncludeTableFilter::new("ARTIST"))
        .excluding("ARTIST");

    let schema = adapter
        .load_schema(&FiltersConfig::for_tables(tables))
        .expect("schema loads");

    assert_eq!(schema.tables().len(), 1);
    let painting = &schema.tables()[0];
    assert_eq!(painting.name.name, "PAINTING");
    assert!(painting.column("ESTIMATED_PRICE").is_none());
    assert!(painting.column("PAINTING_TITLE").is_some());
    // Relationships to tables outside the filter are not attached.
    assert!(painting.relationships.is_empty());
}

#[test]
fn schema_filters_are_rejected() {
    let adapter = connect();
    let mut filters = FiltersConfig::include_all();
    filters.catalogs[0].schemas[0].name = Some("main".into());

    let error = adapter
        .load_schema(&filters)
        .expect_err("sqlite has no schemas to filter on");
    assert!(matches!(error, Error::Config(_)), "unexpected error: {error:?}");
}

#[test]
fn failed_statements_report_the_sql() {
    let adapter = connect();

    let error = adapter
        .execute("ALTER TABLE MISSING ADD COLUMN X INTEGER")
        .expect_err("table does not exist");
    let Error::Execute(ExecutionError::StatementFailed { sql, .. }) = &error else {
        panic!("expected statement failure, got {error:?}");
    };
    assert_eq!(sql, "ALTER TABLE MISSING ADD COLUMN X INTEGER");
    assert!(error.to_string().contains("no such table"));
}

#[test]
fn server_version_override_below_minimum_is_rejected() {
    let mut config = ConnectionConfig::for_database(":memory:");
    config.extra = BTreeMap::from([("sqlite.server_version".to_string(), "3.31.1".to_string())]);

    let error = SqliteDialect
        .connect(&config)
        .err()
        .expect("old sqlite versions are rejected");
    assert!(error.to_string().contains("requires 3.35+"));

    let adapter = connect();
    let version = adapter.server_version().expect("version is known");
    assert!(version.major >= 3);
}
