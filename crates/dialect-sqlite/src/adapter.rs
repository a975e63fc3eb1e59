use std::{
    error::Error as StdError,
    io,
    sync::{Mutex, MutexGuard},
};

use dbsync_core::{
    Column, ConnectionConfig, DataMap, DatabaseAdapter, ExecutionError, FiltersConfig,
    ForeignKeyRow, QualifiedName, Result, Table, Transaction, Version, attach_foreign_keys,
};
use rusqlite::Connection;
use tracing::debug;

use crate::{SqliteDialect, normalize, schema_queries};

const BEGIN_SQL: &str = "BEGIN";
const CONNECT_SQL: &str = "CONNECT sqlite";
const MINIMUM_SQLITE_MAJOR_VERSION: u16 = 3;
// `ALTER TABLE ... DROP COLUMN` arrived in 3.35.
const MINIMUM_SQLITE_MINOR_VERSION: u16 = 35;
const SERVER_VERSION_OVERRIDE_KEY: &str = "sqlite.server_version";
const POISONED_CONNECTION_MESSAGE: &str = "sqlite connection state was poisoned";

pub(crate) struct SqliteAdapter {
    connection: Mutex<Connection>,
    server_version: Version,
}

pub(crate) fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseAdapter>> {
    if let Some(raw_version) = config.extra.get(SERVER_VERSION_OVERRIDE_KEY) {
        let version = parse_server_version(raw_version)
            .ok_or_else(|| invalid_server_version_error(raw_version))?;
        ensure_minimum_version(&version, raw_version)?;
    }

    let connection = Connection::open(config.database.as_str())
        .map_err(|source| execution_error(CONNECT_SQL, source))?;
    connection
        .execute_batch("PRAGMA foreign_keys = ON")
        .map_err(|source| execution_error(CONNECT_SQL, source))?;

    let server_version_raw =
        if let Some(raw_version) = config.extra.get(SERVER_VERSION_OVERRIDE_KEY) {
            raw_version.clone()
        } else {
            query_server_version(&connection)?
        };
    let server_version = parse_server_version(&server_version_raw)
        .ok_or_else(|| invalid_server_version_error(&server_version_raw))?;
    ensure_minimum_version(&server_version, &server_version_raw)?;

    Ok(Box::new(SqliteAdapter {
        connection: Mutex::new(connection),
        server_version,
    }))
}

impl SqliteAdapter {
    fn lock_connection(&self, sql: &str) -> Result<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| execution_error(sql, io::Error::other(POISONED_CONNECTION_MESSAGE)))
    }
}

impl DatabaseAdapter for SqliteAdapter {
    fn load_schema(&self, filters: &FiltersConfig) -> Result<DataMap> {
        let filters = filters.validate(&SqliteDialect)?;
        let connection = self.lock_connection(schema_queries::TABLES_QUERY)?;

        let mut data_map = DataMap::new();
        let mut foreign_keys = Vec::new();
        for (table_name, table_sql) in query_tables(&connection)? {
            let name = QualifiedName::new(&table_name);
            if !filters.is_table_included(&name) {
                continue;
            }

            let mut table = Table::new(name.clone());
            for column in query_columns(&connection, &table_name)? {
                if filters.is_column_included(&name, &column.name) {
                    table.columns.push(column);
                }
            }
            let autoincrement = table_sql
                .as_deref()
                .is_some_and(|sql| sql.to_ascii_uppercase().contains("AUTOINCREMENT"));
            let primary_key = table.primary_key_names();
            if autoincrement
                && let [key] = primary_key.as_slice()
                && let Some(column) = table.columns.iter_mut().find(|column| &column.name == key)
            {
                column.generated = true;
            }

            foreign_keys.extend(query_foreign_keys(&connection, &table_name)?);
            data_map.tables.push(table);
        }

        let rows = foreign_keys
            .into_iter()
            .filter_map(|raw| raw.resolve(&data_map))
            .collect();
        attach_foreign_keys(&mut data_map, rows);

        debug!(tables = data_map.tables.len(), "loaded sqlite schema");
        Ok(data_map)
    }

    fn execute(&self, sql: &str) -> Result<()> {
        let connection = self.lock_connection(sql)?;
        connection
            .execute_batch(sql)
            .map_err(|source| execution_error(sql, source))
    }

    fn begin(&mut self) -> Result<Transaction<'_>> {
        self.execute(BEGIN_SQL)?;
        Ok(Transaction::new(self))
    }

    fn server_version(&self) -> Result<Version> {
        Ok(self.server_version.clone())
    }
}

struct RawForeignKey {
    table: String,
    id: i64,
    seq: i64,
    target: String,
    from: String,
    to: Option<String>,
}

impl RawForeignKey {
    /// Fills in implicit target columns from the target primary key.
    fn resolve(self, data_map: &DataMap) -> Option<ForeignKeyRow> {
        let target_table = QualifiedName::new(&self.target);
        let target_column = match self.to {
            Some(column) => column,
            None => {
                let target = data_map.table(&target_table)?;
                let index = usize::try_from(self.seq).ok()?;
                target.primary_key_names().into_iter().nth(index)?
            }
        };

        Some(ForeignKeyRow {
            name: format!("fk_{}_{}", self.table, self.id),
            source_table: QualifiedName::new(&self.table),
            source_column: self.from,
            target_table,
            target_column,
            ordinal: u32::try_from(self.seq).ok()?,
        })
    }
}

fn query_tables(connection: &Connection) -> Result<Vec<(String, Option<String>)>> {
    let query = schema_queries::TABLES_QUERY;
    let mut statement = connection
        .prepare(query)
        .map_err(|source| execution_error(query, source))?;
    let rows = statement
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(|source| execution_error(query, source))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|source| execution_error(query, source))
}

fn query_columns(connection: &Connection, table: &str) -> Result<Vec<Column>> {
    let query = schema_queries::COLUMNS_QUERY;
    let mut statement = connection
        .prepare(query)
        .map_err(|source| execution_error(query, source))?;
    let rows = statement
        .query_map([table], |row| {
            let name: String = row.get(0)?;
            let declared: String = row.get(1)?;
            let not_null: i64 = row.get(2)?;
            let key_position: i64 = row.get(3)?;
            Ok((name, declared, not_null != 0, key_position > 0))
        })
        .map_err(|source| execution_error(query, source))?;

    let mut columns = Vec::new();
    for row in rows {
        let (name, declared, not_null, primary_key) =
            row.map_err(|source| execution_error(query, source))?;
        let parsed = normalize::parse_declared_type(&declared);
        columns.push(Column {
            data_type: parsed.data_type,
            length: parsed.length,
            precision: parsed.precision,
            scale: parsed.scale,
            mandatory: not_null || primary_key,
            primary_key,
            ..Column::new(name, parsed.data_type)
        });
    }
    Ok(columns)
}

fn query_foreign_keys(connection: &Connection, table: &str) -> Result<Vec<RawForeignKey>> {
    let query = schema_queries::FOREIGN_KEYS_QUERY;
    let mut statement = connection
        .prepare(query)
        .map_err(|source| execution_error(query, source))?;
    let rows = statement
        .query_map([table], |row| {
            Ok(RawForeignKey {
                table: table.to_string(),
                id: row.get(0)?,
                seq: row.get(1)?,
                target: row.get(2)?,
                from: row.get(3)?,
                to: row.get(4)?,
            })
        })
        .map_err(|source| execution_error(query, source))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|source| execution_error(query, source))
}

pub fn parse_server_version(raw: &str) -> Option<Version> {
    let mut parts = raw.split_whitespace().next()?.split('.');
    let major = parse_version_component(parts.next()?)?;
    let minor = parts.next().and_then(parse_version_component).unwrap_or(0);
    let patch = parts.next().and_then(parse_version_component).unwrap_or(0);

    Some(Version {
        major,
        minor,
        patch,
    })
}

fn query_server_version(connection: &Connection) -> Result<String> {
    connection
        .query_row(schema_queries::SHOW_SERVER_VERSION_QUERY, [], |row| {
            row.get(0)
        })
        .map_err(|source| execution_error(schema_queries::SHOW_SERVER_VERSION_QUERY, source))
}

fn parse_version_component(raw: &str) -> Option<u16> {
    let digits = raw
        .chars()
        .take_while(|ch| ch.is_ascii_digit())
        .collect::<String>();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u16>().ok()
}

fn ensure_minimum_version(version: &Version, raw_version: &str) -> Result<()> {
    if version.major > MINIMUM_SQLITE_MAJOR_VERSION
        || (version.major == MINIMUM_SQLITE_MAJOR_VERSION
            && version.minor >= MINIMUM_SQLITE_MINOR_VERSION)
    {
        return Ok(());
    }

    Err(execution_error(
        schema_queries::SHOW_SERVER_VERSION_QUERY,
        io::Error::other(format!(
            "sqlite server version `{raw_version}` is not supported; requires {MINIMUM_SQLITE_MAJOR_VERSION}.{MINIMUM_SQLITE_MINOR_VERSION}+"
        )),
    ))
}

fn invalid_server_version_error(raw_version: &str) -> dbsync_core::Error {
    execution_error(
        schema_queries::SHOW_SERVER_VERSION_QUERY,
        io::Error::other(format!(
            "failed to parse sqlite server version string: `{raw_version}`"
        )),
    )
}

fn execution_error<E>(sql: &str, source: E) -> dbsync_core::Error
where
    E: StdError + Send + Sync + 'static,
{
    ExecutionError::statement_failed(sql, source).into()
}
