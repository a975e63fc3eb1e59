use std::{
    error::Error as StdError,
    io,
    sync::{Mutex, MutexGuard},
};

use dbsync_core::{
    Column, ConnectionConfig, DataMap, DatabaseAdapter, EntityFilters, ExecutionError,
    FiltersConfig, ForeignKeyRow, QualifiedName, Result, Table, Transaction, Version,
    attach_foreign_keys,
};
use postgres::{Client, NoTls, Row, types::FromSqlOwned};
use tracing::debug;

use crate::{PostgresDialect, normalize, schema_queries};

const BEGIN_SQL: &str = "BEGIN";
const CONNECT_SQL: &str = "CONNECT postgres";
const DEFAULT_POSTGRES_HOST: &str = "127.0.0.1";
const DEFAULT_POSTGRES_SCHEMA: &str = "public";
const MINIMUM_POSTGRES_MAJOR_VERSION: u16 = 13;
const SERVER_VERSION_OVERRIDE_KEY: &str = "postgres.server_version";
const SEARCH_PATH_OVERRIDE_KEY: &str = "postgres.search_path";
const POISONED_CLIENT_MESSAGE: &str = "postgres connection state was poisoned";

pub(crate) struct PostgresAdapter {
    client: Mutex<Client>,
    search_path: Vec<String>,
    server_version: Version,
}

struct ColumnRow {
    name: String,
    data_type: String,
    not_null: bool,
    identity: bool,
    serial: bool,
}

pub(crate) fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseAdapter>> {
    if let Some(raw_version) = config.extra.get(SERVER_VERSION_OVERRIDE_KEY) {
        let version = parse_server_version(raw_version)
            .ok_or_else(|| invalid_server_version_error(raw_version))?;
        ensure_minimum_version(&version, raw_version)?;
    }

    let mut client = connect_client(config)?;
    let server_version_raw =
        if let Some(raw_version) = config.extra.get(SERVER_VERSION_OVERRIDE_KEY) {
            raw_version.clone()
        } else {
            query_scalar(&mut client, schema_queries::SHOW_SERVER_VERSION_QUERY)?
        };
    let server_version = parse_server_version(&server_version_raw)
        .ok_or_else(|| invalid_server_version_error(&server_version_raw))?;
    ensure_minimum_version(&server_version, &server_version_raw)?;

    let search_path_raw = if let Some(raw_search_path) = config.extra.get(SEARCH_PATH_OVERRIDE_KEY)
    {
        raw_search_path.clone()
    } else {
        query_scalar(&mut client, schema_queries::SHOW_SEARCH_PATH_QUERY)?
    };
    let mut search_path = parse_search_path(&search_path_raw);
    if search_path.is_empty() {
        search_path.push(DEFAULT_POSTGRES_SCHEMA.to_string());
    }

    Ok(Box::new(PostgresAdapter {
        client: Mutex::new(client),
        search_path,
        server_version,
    }))
}

impl PostgresAdapter {
    fn lock_client(&self, sql: &str) -> Result<MutexGuard<'_, Client>> {
        self.client
            .lock()
            .map_err(|_| execution_error(sql, io::Error::other(POISONED_CLIENT_MESSAGE)))
    }
}

impl DatabaseAdapter for PostgresAdapter {
    fn load_schema(&self, filters: &FiltersConfig) -> Result<DataMap> {
        let entity_filters = filters.validate(&PostgresDialect)?;
        let schemas = introspected_schemas(filters, &self.search_path);
        let mut client = self.lock_client(schema_queries::TABLES_QUERY)?;

        let table_rows = client
            .query(schema_queries::TABLES_QUERY, &[&schemas])
            .map_err(|source| execution_error(schema_queries::TABLES_QUERY, source))?;

        let mut data_map = DataMap::new();
        for row in &table_rows {
            let schema: String = row_value(row, "table_schema", schema_queries::TABLES_QUERY)?;
            let name: String = row_value(row, "table_name", schema_queries::TABLES_QUERY)?;
            let qualified = QualifiedName::new(&name).with_schema(&schema);
            if !entity_filters.is_table_included(&qualified) {
                continue;
            }
            data_map
                .tables
                .push(load_table(&mut client, &entity_filters, qualified)?);
        }

        let foreign_key_rows = client
            .query(schema_queries::FOREIGN_KEYS_QUERY, &[&schemas])
            .map_err(|source| execution_error(schema_queries::FOREIGN_KEYS_QUERY, source))?;
        let foreign_keys = foreign_key_rows
            .iter()
            .map(decode_foreign_key_row)
            .collect::<Result<Vec<_>>>()?;
        attach_foreign_keys(&mut data_map, foreign_keys);

        debug!(
            tables = data_map.tables.len(),
            schemas = ?schemas,
            "loaded postgres schema"
        );
        Ok(data_map)
    }

    fn execute(&self, sql: &str) -> Result<()> {
        let mut client = self.lock_client(sql)?;
        client
            .batch_execute(sql)
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

pub fn parse_search_path(raw: &str) -> Vec<String> {
    split_search_path(raw)
        .into_iter()
        .filter_map(|entry| normalize_search_path_entry(entry.as_str()))
        .collect()
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

fn connect_client(config: &ConnectionConfig) -> Result<Client> {
    let mut postgres_config = postgres::Config::new();

    if let Some(socket_path) = &config.socket {
        postgres_config.host_path(socket_path);
    } else if let Some(host) = &config.host {
        postgres_config.host(host);
    } else {
        postgres_config.host(DEFAULT_POSTGRES_HOST);
    }

    if let Some(port) = config.port {
        postgres_config.port(port);
    }
    if let Some(user) = &config.user {
        postgres_config.user(user);
    }
    if let Some(password) = &config.password {
        postgres_config.password(password);
    }
    postgres_config.dbname(&config.database);

    postgres_config
        .connect(NoTls)
        .map_err(|source| execution_error(CONNECT_SQL, source))
}

fn query_scalar(client: &mut Client, sql: &str) -> Result<String> {
    let row = client
        .query_one(sql, &[])
        .map_err(|source| execution_error(sql, source))?;
    row.try_get::<_, String>(0)
        .map_err(|source| execution_error(sql, source))
}

fn load_table(
    client: &mut Client,
    filters: &EntityFilters,
    name: QualifiedName,
) -> Result<Table> {
    let schema = name.schema.clone().unwrap_or_default();
    let column_rows = client
        .query(schema_queries::TABLE_COLUMNS_QUERY, &[&schema, &name.name])
        .map_err(|source| execution_error(schema_queries::TABLE_COLUMNS_QUERY, source))?;
    let key_rows = client
        .query(schema_queries::PRIMARY_KEY_QUERY, &[&schema, &name.name])
        .map_err(|source| execution_error(schema_queries::PRIMARY_KEY_QUERY, source))?;

    let mut key_columns = Vec::with_capacity(key_rows.len());
    let mut key_name = None;
    for row in &key_rows {
        key_name = Some(row_value::<String>(
            row,
            "constraint_name",
            schema_queries::PRIMARY_KEY_QUERY,
        )?);
        key_columns.push(row_value::<String>(
            row,
            "column_name",
            schema_queries::PRIMARY_KEY_QUERY,
        )?);
    }

    let mut table = Table::new(name);
    table.primary_key_name = key_name;
    for row in &column_rows {
        let column = decode_column_row(row)?;
        if !filters.is_column_included(&table.name, &column.name) {
            continue;
        }
        let primary_key = key_columns.contains(&column.name);
        table.columns.push(column.into_column(primary_key));
    }
    Ok(table)
}

fn decode_column_row(row: &Row) -> Result<ColumnRow> {
    Ok(ColumnRow {
        name: row_value(row, "column_name", schema_queries::TABLE_COLUMNS_QUERY)?,
        data_type: row_value(row, "data_type", schema_queries::TABLE_COLUMNS_QUERY)?,
        not_null: row_value(row, "not_null", schema_queries::TABLE_COLUMNS_QUERY)?,
        identity: row_value(row, "is_identity", schema_queries::TABLE_COLUMNS_QUERY)?,
        serial: row_value(row, "is_serial", schema_queries::TABLE_COLUMNS_QUERY)?,
    })
}

impl ColumnRow {
    fn into_column(self, primary_key: bool) -> Column {
        let parsed = normalize::parse_formatted_type(&self.data_type);
        let mut column = Column::new(self.name, parsed.data_type);
        column.length = parsed.length;
        column.precision = parsed.precision;
        column.scale = parsed.scale;
        column.mandatory = self.not_null || primary_key;
        column.primary_key = primary_key;
        column.generated = self.identity || self.serial;
        column
    }
}

fn decode_foreign_key_row(row: &Row) -> Result<ForeignKeyRow> {
    let query = schema_queries::FOREIGN_KEYS_QUERY;
    let source_schema: String = row_value(row, "source_schema", query)?;
    let source_table: String = row_value(row, "source_table", query)?;
    let target_schema: String = row_value(row, "target_schema", query)?;
    let target_table: String = row_value(row, "target_table", query)?;
    let ordinal: i64 = row_value(row, "ordinal", query)?;

    Ok(ForeignKeyRow {
        name: row_value(row, "constraint_name", query)?,
        source_table: QualifiedName::new(source_table).with_schema(source_schema),
        source_column: row_value(row, "source_column", query)?,
        target_table: QualifiedName::new(target_table).with_schema(target_schema),
        target_column: row_value(row, "target_column", query)?,
        ordinal: u32::try_from(ordinal).unwrap_or(u32::MAX),
    })
}

/// Schemas named by the filters, or the connection search path.
fn introspected_schemas(filters: &FiltersConfig, search_path: &[String]) -> Vec<String> {
    let named = filters.schema_names();
    if named.is_empty() {
        return search_path.to_vec();
    }
    named.into_iter().map(str::to_string).collect()
}

fn normalize_search_path_entry(entry: &str) -> Option<String> {
    let trimmed = entry.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = unquote_search_path_entry(trimmed);
    if is_implicit_schema(normalized.as_str()) {
        return None;
    }

    Some(normalized)
}

fn split_search_path(raw: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars().peekable();
    let mut in_quotes = false;

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                current.push(ch);
                if in_quotes && chars.peek() == Some(&'"') {
                    current.push('"');
                    let _ = chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                entries.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() || raw.ends_with(',') {
        entries.push(current.trim().to_string());
    }

    entries
}

fn unquote_search_path_entry(entry: &str) -> String {
    if entry.len() >= 2 && entry.starts_with('"') && entry.ends_with('"') {
        return entry[1..entry.len() - 1].replace("\"\"", "\"");
    }
    entry.to_string()
}

fn is_implicit_schema(schema: &str) -> bool {
    let normalized = schema.trim();
    normalized.eq_ignore_ascii_case("$user")
        || normalized.eq_ignore_ascii_case("pg_catalog")
        || normalized.eq_ignore_ascii_case("pg_temp")
        || normalized.to_ascii_lowercase().starts_with("pg_temp_")
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
    if version.major >= MINIMUM_POSTGRES_MAJOR_VERSION {
        return Ok(());
    }

    Err(execution_error(
        schema_queries::SHOW_SERVER_VERSION_QUERY,
        io::Error::other(format!(
            "postgres server version `{raw_version}` is not supported; requires {MINIMUM_POSTGRES_MAJOR_VERSION}+"
        )),
    ))
}

fn invalid_server_version_error(raw_version: &str) -> dbsync_core::Error {
    execution_error(
        schema_queries::SHOW_SERVER_VERSION_QUERY,
        io::Error::other(format!(
            "failed to parse postgres server version string: `{raw_version}`"
        )),
    )
}

fn row_value<T>(row: &Row, column: &str, sql: &str) -> Result<T>
where
    T: FromSqlOwned,
{
    row.try_get(column)
        .map_err(|source| execution_error(sql, source))
}

fn execution_error<E>(sql: &str, source: E) -> dbsync_core::Error
where
    E: StdError + Send + Sync + 'static,
{
    ExecutionError::statement_failed(sql, source).into()
}
