// Every projection is cast to nvarchar so rows decode as text. `{sys}` is
// the catalog's `sys` schema and `{schemas}` a list of N'...' literals.

pub(crate) const SHOW_SERVER_VERSION_QUERY: &str =
    "SELECT CAST(SERVERPROPERTY('ProductVersion') AS nvarchar(128));";
pub(crate) const CURRENT_SCHEMA_QUERY: &str = "SELECT COALESCE(SCHEMA_NAME(), 'dbo');";

pub(crate) const TABLES_QUERY_TEMPLATE: &str = r#"
SELECT
    s.name AS table_schema,
    t.name AS table_name
FROM {sys}.tables AS t
JOIN {sys}.schemas AS s ON t.schema_id = s.schema_id
WHERE t.is_ms_shipped = 0
  AND s.name IN ({schemas})
ORDER BY s.name ASC, t.name ASC;
"#;

pub(crate) const COLUMNS_QUERY_TEMPLATE: &str = r#"
SELECT
    s.name AS table_schema,
    t.name AS table_name,
    c.name AS column_name,
    ty.name AS data_type,
    CAST(c.max_length AS nvarchar(32)) AS max_length,
    CAST(c.precision AS nvarchar(32)) AS precision,
    CAST(c.scale AS nvarchar(32)) AS scale,
    CASE WHEN c.is_nullable = 1 THEN '1' ELSE '0' END AS is_nullable,
    CASE WHEN c.is_identity = 1 THEN '1' ELSE '0' END AS is_identity
FROM {sys}.columns AS c
JOIN {sys}.tables AS t ON c.object_id = t.object_id
JOIN {sys}.schemas AS s ON t.schema_id = s.schema_id
JOIN {sys}.types AS ty ON c.user_type_id = ty.user_type_id
WHERE t.is_ms_shipped = 0
  AND s.name IN ({schemas})
ORDER BY s.name ASC, t.name ASC, c.column_id ASC;
"#;

pub(crate) const PRIMARY_KEYS_QUERY_TEMPLATE: &str = r#"
SELECT
    s.name AS table_schema,
    t.name AS table_name,
    i.name AS pk_name,
    c.name AS column_name
FROM {sys}.indexes AS i
JOIN {sys}.tables AS t ON i.object_id = t.object_id
JOIN {sys}.schemas AS s ON t.schema_id = s.schema_id
JOIN {sys}.index_columns AS ic ON i.object_id = ic.object_id AND i.index_id = ic.index_id
JOIN {sys}.columns AS c ON ic.object_id = c.object_id AND ic.column_id = c.column_id
WHERE i.is_primary_key = 1
  AND s.name IN ({schemas})
ORDER BY s.name ASC, t.name ASC, ic.key_ordinal ASC;
"#;

pub(crate) const FOREIGN_KEYS_QUERY_TEMPLATE: &str = r#"
SELECT
    fk.name AS constraint_name,
    ss.name AS source_schema,
    st.name AS source_table,
    sc.name AS source_column,
    ts.name AS target_schema,
    tt.name AS target_table,
    tc.name AS target_column,
    CAST(fkc.constraint_column_id AS nvarchar(32)) AS ordinal
FROM {sys}.foreign_keys AS fk
JOIN {sys}.foreign_key_columns AS fkc ON fkc.constraint_object_id = fk.object_id
JOIN {sys}.tables AS st ON st.object_id = fk.parent_object_id
JOIN {sys}.schemas AS ss ON ss.schema_id = st.schema_id
JOIN {sys}.columns AS sc
  ON sc.object_id = fkc.parent_object_id AND sc.column_id = fkc.parent_column_id
JOIN {sys}.tables AS tt ON tt.object_id = fk.referenced_object_id
JOIN {sys}.schemas AS ts ON ts.schema_id = tt.schema_id
JOIN {sys}.columns AS tc
  ON tc.object_id = fkc.referenced_object_id AND tc.column_id = fkc.referenced_column_id
WHERE ss.name IN ({schemas})
ORDER BY ss.name ASC, st.name ASC, fk.name ASC, fkc.constraint_column_id ASC;
"#;
