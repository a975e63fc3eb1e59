use dbsync_core::{DataType, QualifiedName, Value};
use dbsync_testkit::{ValueSpec, load_test_cases_from_str};

#[test]
fn defaults_offline_to_false_when_omitted() {
    let yaml = r#"
default_offline:
  current:
    tables:
      - name: ARTIST
  desired:
    tables:
      - name: ARTIST
"#;

    let cases = load_test_cases_from_str(yaml).expect("yaml must parse");
    let case = cases
        .get("default_offline")
        .expect("named testcase must be present");

    assert!(!case.offline, "offline omitted must default to false");
    assert!(!case.case_sensitive);
    assert!(case.values_for_null.is_empty());
}

#[test]
fn preserves_error_and_version_and_flavor_fields() {
    let yaml = r#"
metadata:
  desired:
    tables:
      - name: ARTIST
  error: unsupported op
  min_version: "13.2"
  max_version: "15.0"
  flavor: "!sqlite"
"#;

    let cases = load_test_cases_from_str(yaml).expect("yaml must parse");
    let case = cases
        .get("metadata")
        .expect("named testcase must be present");

    assert_eq!(case.error.as_deref(), Some("unsupported op"));
    assert_eq!(case.min_version.as_deref(), Some("13.2"));
    assert_eq!(case.max_version.as_deref(), Some("15.0"));
    assert_eq!(case.flavor.as_deref(), Some("!sqlite"));
    assert!(case.current.tables.is_empty());
}

#[test]
fn model_specs_convert_to_data_maps() {
    let yaml = r#"
gallery:
  desired:
    tables:
      - name: ARTIST
        schema: app
        columns:
          - { name: ARTIST_ID, type: INTEGER, primary_key: true, generated: true }
          - { name: ARTIST_NAME, type: VARCHAR, length: 254, mandatory: true }
          - { name: FEE, type: DECIMAL, precision: 10, scale: 2 }
      - name: PAINTING
        schema: app
        columns:
          - { name: PAINTING_ID, type: INTEGER, primary_key: true }
          - { name: ARTIST_ID, type: INTEGER }
        relationships:
          - name: toArtist
            target: ARTIST
            target_schema: app
            fk_name: fk_painting_artist
            joins:
              - { source: ARTIST_ID, target: ARTIST_ID }
  values_for_null:
    ARTIST.ARTIST_NAME: unknown
    ARTIST.FEE: 10
"#;

    let cases = load_test_cases_from_str(yaml).expect("yaml must parse");
    let case = cases.get("gallery").expect("named testcase must be present");
    let model = case.desired.to_data_map().expect("model spec converts");

    let artist = model
        .table(&QualifiedName::new("ARTIST").with_schema("app"))
        .expect("artist table exists");
    let id = artist.column("ARTIST_ID").expect("id column exists");
    assert!(id.primary_key && id.generated && id.mandatory);
    let fee = artist.column("FEE").expect("fee column exists");
    assert_eq!((fee.data_type, fee.precision, fee.scale), (DataType::Decimal, Some(10), Some(2)));

    let painting = model
        .table(&QualifiedName::new("PAINTING").with_schema("app"))
        .expect("painting table exists");
    let relationship = painting
        .relationship("toArtist")
        .expect("relationship exists");
    assert!(relationship.is_foreign_key());
    assert_eq!(relationship.fk_name.as_deref(), Some("fk_painting_artist"));

    assert_eq!(
        case.values_for_null.get("ARTIST.ARTIST_NAME"),
        Some(&ValueSpec::String("unknown".to_string()))
    );
    let fee_value = case
        .values_for_null
        .get("ARTIST.FEE")
        .map(Value::from)
        .expect("fee value exists");
    assert_eq!(fee_value, Value::Integer(10));
}

#[test]
fn unknown_fields_are_rejected() {
    let yaml = r#"
typo:
  desired:
    tables:
      - name: ARTIST
        colums: []
"#;

    let error = load_test_cases_from_str(yaml).expect_err("misspelled field must fail");
    assert!(error.to_string().contains("colums"), "unexpected error: {error}");
}

#[test]
fn duplicate_columns_fail_conversion() {
    let yaml = r#"
duplicate:
  desired:
    tables:
      - name: ARTIST
        columns:
          - { name: ARTIST_ID, type: INTEGER }
          - { name: ARTIST_ID, type: BIGINT }
"#;

    let cases = load_test_cases_from_str(yaml).expect("yaml must parse");
    let error = cases["duplicate"]
        .desired
        .to_data_map()
        .expect_err("duplicate column");
    assert_eq!(
        error.to_string(),
        "column `ARTIST.ARTIST_ID` already exists in the model"
    );
}
