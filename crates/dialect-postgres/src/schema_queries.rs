pub(crate) const SHOW_SERVER_VERSION_QUERY: &str = "SHOW server_version";
pub(crate) const SHOW_SEARCH_PATH_QUERY: &str = "SHOW search_path";

pub(crate) const TABLES_QUERY: &str = r#"
SELECT
  n.nspname AS table_schema,
  c.relname AS table_name
FROM pg_catalog.pg_class c
INNER JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
WHERE n.nspname = ANY($1)
  AND c.relkind IN ('r', 'p')
  AND c.relispartition = false
  AND NOT EXISTS (
    SELECT 1
    FROM pg_catalog.pg_depend d
    WHERE c.oid = d.objid
      AND d.classid = (SELECT oid FROM pg_catalog.pg_class WHERE relname = 'pg_class')
      AND d.deptype = 'e'
  )
ORDER BY n.nspname ASC, c.relname ASC;
"#;

pub(crate) const TABLE_COLUMNS_QUERY: &str = r#"
SELECT
  a.attname AS column_name,
  pg_catalog.format_type(a.atttypid, a.atttypmod) AS data_type,
  a.attnotnull AS not_null,
  a.attidentity <> '' AS is_identity,
  COALESCE(pg_catalog.pg_get_expr(ad.adbin, ad.adrelid) LIKE 'nextval(%', false) AS is_serial
FROM pg_catalog.pg_attribute a
INNER JOIN pg_catalog.pg_class c ON c.oid = a.attrelid
INNER JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
LEFT JOIN pg_catalog.pg_attrdef ad ON ad.adrelid = a.attrelid AND ad.adnum = a.attnum
WHERE n.nspname = $1
  AND c.relname = $2
  AND a.attnum > 0
  AND NOT a.attisdropped
ORDER BY a.attnum ASC;
"#;

pub(crate) const PRIMARY_KEY_QUERY: &str = r#"
SELECT
  con.conname AS constraint_name,
  a.attname AS column_name
FROM pg_catalog.pg_constraint con
INNER JOIN pg_catalog.pg_class c ON c.oid = con.conrelid
INNER JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
CROSS JOIN LATERAL unnest(con.conkey) WITH ORDINALITY AS k(attnum, ordinal)
INNER JOIN pg_catalog.pg_attribute a ON a.attrelid = con.conrelid AND a.attnum = k.attnum
WHERE con.contype = 'p'
  AND n.nspname = $1
  AND c.relname = $2
ORDER BY k.ordinal ASC;
"#;

pub(crate) const FOREIGN_KEYS_QUERY: &str = r#"
SELECT
  con.conname AS constraint_name,
  sn.nspname AS source_schema,
  sc.relname AS source_table,
  sa.attname AS source_column,
  tn.nspname AS target_schema,
  tc.relname AS target_table,
  ta.attname AS target_column,
  k.ordinal AS ordinal
FROM pg_catalog.pg_constraint con
INNER JOIN pg_catalog.pg_class sc ON sc.oid = con.conrelid
INNER JOIN pg_catalog.pg_namespace sn ON sc.relnamespace = sn.oid
INNER JOIN pg_catalog.pg_class tc ON tc.oid = con.confrelid
INNER JOIN pg_catalog.pg_namespace tn ON tc.relnamespace = tn.oid
CROSS JOIN LATERAL unnest(con.conkey, con.confkey)
  WITH ORDINALITY AS k(source_attnum, target_attnum, ordinal)
INNER JOIN pg_catalog.pg_attribute sa
  ON sa.attrelid = con.conrelid AND sa.attnum = k.source_attnum
INNER JOIN pg_catalog.pg_attribute ta
  ON ta.attrelid = con.confrelid AND ta.attnum = k.target_attnum
WHERE con.contype = 'f'
  AND sn.nspname = ANY($1)
ORDER BY sn.nspname ASC, sc.relname ASC, con.conname ASC, k.ordinal ASC;
"#;
