use dbsync_core::{
    Column, DataType, Dialect, QualifiedName, Relationship, Statement, Table, TokenFactory,
    TokenOp,
};
use dbsync_dialect_mysql::MysqlDialect;

fn sql(op: &TokenOp) -> Vec<String> {
    MysqlDialect
        .generate_ddl(op)
        .expect("statement generation succeeds")
        .iter()
        .filter_map(Statement::as_sql)
        .map(str::to_string)
        .collect()
}

#[test]
fn create_table_spells_nullability_and_engine() {
    let table = Table::named("ARTIST")
        .with_column(
            Column::new("ARTIST_ID", DataType::BigInt)
                .primary_key()
                .generated(),
        )
        .with_column(Column::new("BIO", DataType::LongVarchar));

    assert_eq!(
        sql(&TokenOp::CreateTable { table }),
        vec![
            "CREATE TABLE `ARTIST` (\n    `ARTIST_ID` BIGINT NOT NULL AUTO_INCREMENT,\n    `BIO` MEDIUMTEXT NULL,\n    PRIMARY KEY (`ARTIST_ID`)\n) ENGINE=InnoDB"
        ]
    );
}

#[test]
fn type_change_keeps_the_current_nullability() {
    let op = TokenOp::SetColumnType {
        table: QualifiedName::new("ARTIST"),
        from: Column::new("ARTIST_NAME", DataType::Varchar)
            .with_length(100)
            .mandatory(),
        to: Column::new("ARTIST_NAME", DataType::Varchar).with_length(254),
        from_type: "VARCHAR(100)".to_string(),
        to_type: "VARCHAR(254)".to_string(),
    };

    assert_eq!(
        sql(&op),
        vec!["ALTER TABLE `ARTIST` CHANGE COLUMN `ARTIST_NAME` `ARTIST_NAME` VARCHAR(254) NOT NULL"]
    );
}

#[test]
fn nullability_changes_restate_the_column() {
    let column = Column::new("RANK", DataType::SmallInt);

    assert_eq!(
        sql(&TokenOp::SetNotNull {
            table: QualifiedName::new("ARTIST"),
            column: column.clone(),
        }),
        vec!["ALTER TABLE `ARTIST` CHANGE COLUMN `RANK` `RANK` SMALLINT NOT NULL"]
    );
    assert_eq!(
        sql(&TokenOp::SetAllowNull {
            table: QualifiedName::new("ARTIST"),
            column,
        }),
        vec!["ALTER TABLE `ARTIST` CHANGE COLUMN `RANK` `RANK` SMALLINT NULL"]
    );
}

#[test]
fn primary_key_is_dropped_and_re_added() {
    let op = TokenOp::SetPrimaryKey {
        table: QualifiedName::new("ARTIST").with_catalog("gallery"),
        old: vec!["ARTIST_ID".to_string()],
        new: vec!["ARTIST_CODE".to_string()],
        constraint_name: Some("ignored".to_string()),
    };

    assert_eq!(
        sql(&op),
        vec![
            "ALTER TABLE `gallery`.`ARTIST` DROP PRIMARY KEY",
            "ALTER TABLE `gallery`.`ARTIST` ADD PRIMARY KEY (`ARTIST_CODE`)",
        ]
    );
}

#[test]
fn foreign_keys_drop_with_drop_foreign_key() {
    let relationship = Relationship::new("toArtist", QualifiedName::new("ARTIST"))
        .join("ARTIST_ID", "ARTIST_ID");

    assert_eq!(
        sql(&TokenOp::DropRelationship {
            table: QualifiedName::new("PAINTING"),
            relationship,
        }),
        vec!["ALTER TABLE `PAINTING` DROP FOREIGN KEY `fk_PAINTING_ARTIST_ARTIST_ID`"]
    );
}

#[test]
fn to_many_relationships_produce_no_statements() {
    let artist = Table::named("ARTIST").with_column(Column::new("ARTIST_ID", DataType::Integer));
    let relationship = Relationship::new("paintings", QualifiedName::new("PAINTING"))
        .join("ARTIST_ID", "ARTIST_ID")
        .to_many();
    let token = TokenFactory::new(&MysqlDialect)
        .create_add_relationship_to_db(&artist, &relationship)
        .expect("token is created");

    assert!(
        token
            .statements(&MysqlDialect)
            .expect("statements render")
            .is_empty()
    );
}
