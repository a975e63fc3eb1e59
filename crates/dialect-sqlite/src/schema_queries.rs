pub(crate) const SHOW_SERVER_VERSION_QUERY: &str = "SELECT sqlite_version()";

pub(crate) const TABLES_QUERY: &str = r#"
SELECT name, sql
FROM sqlite_master
WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
ORDER BY name ASC;
"#;

pub(crate) const COLUMNS_QUERY: &str = r#"
SELECT name, type, "notnull", pk
FROM pragma_table_info(?1)
ORDER BY cid ASC;
"#;

// `to` is NULL when the constraint references the target primary key implicitly.
pub(crate) const FOREIGN_KEYS_QUERY: &str = r#"
SELECT id, seq, "table", "from", "to"
FROM pragma_foreign_key_list(?1)
ORDER BY id ASC, seq ASC;
"#;
