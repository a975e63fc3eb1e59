// `information_schema` column names are upper case on MySQL 8 and lower case
// on some compatible servers, so values are read by position.

pub(crate) const SHOW_SERVER_VERSION_QUERY: &str = "SELECT VERSION()";
pub(crate) const CURRENT_DATABASE_QUERY: &str = "SELECT DATABASE()";

pub(crate) const TABLES_QUERY: &str = r#"
SELECT TABLE_NAME
FROM information_schema.TABLES
WHERE TABLE_SCHEMA = ?
  AND TABLE_TYPE = 'BASE TABLE'
ORDER BY TABLE_NAME ASC
"#;

pub(crate) const COLUMNS_QUERY: &str = r#"
SELECT COLUMN_NAME, COLUMN_TYPE, IS_NULLABLE, COLUMN_KEY, EXTRA
FROM information_schema.COLUMNS
WHERE TABLE_SCHEMA = ?
  AND TABLE_NAME = ?
ORDER BY ORDINAL_POSITION ASC
"#;

pub(crate) const FOREIGN_KEYS_QUERY: &str = r#"
SELECT
  CONSTRAINT_NAME,
  TABLE_NAME,
  COLUMN_NAME,
  REFERENCED_TABLE_SCHEMA,
  REFERENCED_TABLE_NAME,
  REFERENCED_COLUMN_NAME,
  ORDINAL_POSITION
FROM information_schema.KEY_COLUMN_USAGE
WHERE TABLE_SCHEMA = ?
  AND REFERENCED_TABLE_NAME IS NOT NULL
ORDER BY TABLE_NAME ASC, CONSTRAINT_NAME ASC, ORDINAL_POSITION ASC
"#;
