use dbsync_core::{ConnectionConfig, DatabaseAdapter, Dialect, FiltersConfig};
use dbsync_dialect_sqlite::SqliteDialect;
use dbsync_testkit::{TestResult, load_test_cases_from_str, run_online_test};

const CASES: &str = r#"
add_related_table:
  current:
    tables:
      - name: ARTIST
        columns:
          - { name: ARTIST_ID, type: INTEGER, primary_key: true }
  desired:
    tables:
      - name: ARTIST
        columns:
          - { name: ARTIST_ID, type: INTEGER, primary_key: true }
        relationships:
          - name: paintingArray
            target: PAINTING
            to_many: true
            joins: [{ source: ARTIST_ID, target: ARTIST_ID }]
      - name: PAINTING
        columns:
          - { name: PAINTING_ID, type: INTEGER, primary_key: true }
          - { name: ARTIST_ID, type: INTEGER }
        relationships:
          - name: toArtist
            target: ARTIST
            joins: [{ source: ARTIST_ID, target: ARTIST_ID }]
  up: |
    CREATE TABLE "PAINTING" (
        "PAINTING_ID" INTEGER NOT NULL,
        "ARTIST_ID" INTEGER,
        PRIMARY KEY ("PAINTING_ID"),
        FOREIGN KEY ("ARTIST_ID") REFERENCES "ARTIST" ("ARTIST_ID")
    );
  down: |
    DROP TABLE "PAINTING";

add_nullable_column:
  current:
    tables:
      - name: ARTIST
        columns:
          - { name: ARTIST_ID, type: INTEGER, primary_key: true, generated: true }
  desired:
    tables:
      - name: ARTIST
        columns:
          - { name: ARTIST_ID, type: INTEGER, primary_key: true, generated: true }
          - { name: DATE_OF_BIRTH, type: DATE }
  up: |
    ALTER TABLE "ARTIST" ADD COLUMN "DATE_OF_BIRTH" DATE;
  down: |
    ALTER TABLE "ARTIST" DROP COLUMN "DATE_OF_BIRTH";

tighten_nullability:
  current:
    tables:
      - name: ARTIST
        columns:
          - { name: ARTIST_ID, type: INTEGER, primary_key: true }
          - { name: ARTIST_NAME, type: VARCHAR, length: 254 }
  desired:
    tables:
      - name: ARTIST
        columns:
          - { name: ARTIST_ID, type: INTEGER, primary_key: true }
          - { name: ARTIST_NAME, type: VARCHAR, length: 254, mandatory: true }
  error: "`Set Not Null` is not supported by dialect `sqlite`: sqlite cannot alter existing columns or constraints without rebuilding the table"

offline_only:
  offline: true
  desired:
    tables:
      - name: ARTIST
"#;

fn connect() -> Box<dyn DatabaseAdapter> {
    SqliteDialect
        .connect(&ConnectionConfig::for_database(":memory:"))
        .expect("in-memory sqlite connects")
}

#[test]
fn online_runner_migrates_forward_and_back() {
    let cases = load_test_cases_from_str(CASES).expect("cases parse");

    for name in ["add_related_table", "add_nullable_column", "tighten_nullability"] {
        let adapter = connect();
        let result = run_online_test(&SqliteDialect, adapter.as_ref(), &cases[name]);
        assert_eq!(result, TestResult::Passed, "testcase '{name}'");
    }
}

#[test]
fn online_runner_drops_case_tables_afterwards() {
    let cases = load_test_cases_from_str(CASES).expect("cases parse");
    let adapter = connect();
    adapter
        .execute("CREATE TABLE UNRELATED (ID INTEGER PRIMARY KEY)")
        .expect("unrelated table is created");

    let result = run_online_test(&SqliteDialect, adapter.as_ref(), &cases["add_related_table"]);
    assert_eq!(result, TestResult::Passed);

    let schema = adapter
        .load_schema(&FiltersConfig::include_all())
        .expect("schema loads");
    let names = schema
        .tables()
        .iter()
        .map(|table| table.name.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["UNRELATED"]);
}

#[test]
fn online_runner_skips_offline_cases_and_version_gates() {
    let cases = load_test_cases_from_str(CASES).expect("cases parse");
    let adapter = connect();

    assert!(matches!(
        run_online_test(&SqliteDialect, adapter.as_ref(), &cases["offline_only"]),
        TestResult::Skipped(_)
    ));

    let mut future = cases["add_nullable_column"].clone();
    future.min_version = Some("99".to_string());
    let TestResult::Skipped(reason) = run_online_test(&SqliteDialect, adapter.as_ref(), &future)
    else {
        panic!("min_version above the server version must skip");
    };
    assert!(reason.ends_with("is smaller than min_version '99'"), "unexpected reason: {reason}");

    let mut malformed = cases["add_nullable_column"].clone();
    malformed.max_version = Some("x.1".to_string());
    assert_eq!(
        run_online_test(&SqliteDialect, adapter.as_ref(), &malformed),
        TestResult::Failed(
            "invalid version requirement 'x.1': no numeric prefix in segment 'x'".to_string()
        )
    );
}
