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
use mysql::{OptsBuilder, Pool, PooledConn, Row, prelude::FromValue, prelude::Queryable};
use tracing::debug;

use crate::{MysqlDialect, normalize, schema_queries};

const BEGIN_SQL: &str = "BEGIN";
const CONNECT_SQL: &str = "CONNECT mysql";
const DEFAULT_MYSQL_HOST: &str = "127.0.0.1";
const DEFAULT_MYSQL_PORT: u16 = 3306;
const MINIMUM_MYSQL_MAJOR_VERSION: u16 = 8;
const MINIMUM_MYSQL_MINOR_VERSION: u16 = 0;
const SERVER_VERSION_OVERRIDE_KEY: &str = "mysql.server_version";
const POISONED_CONNECTION_MESSAGE: &str = "mysql connection state was poisoned";

pub(crate) struct MysqlAdapter {
    connection: Mutex<PooledConn>,
    default_catalog: String,
    server_version: Version,
}

pub(crate) fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseAdapter>> {
    if let Some(raw_version) = config.extra.get(SERVER_VERSION_OVERRIDE_KEY) {
        let version = parse_server_version(raw_version)
            .ok_or_else(|| invalid_server_version_error(raw_version))?;
        ensure_minimum_version(&version, raw_version)?;
    }

    let mut connection = connect_connection(config)?;
    let server_version_raw =
        if let Some(raw_version) = config.extra.get(SERVER_VERSION_OVERRIDE_KEY) {
            raw_version.clone()
        } else {
            query_scalar(&mut connection, schema_queries::SHOW_SERVER_VERSION_QUERY)?
        };
    let server_version = parse_server_version(&server_version_raw)
        .ok_or_else(|| invalid_server_version_error(&server_version_raw))?;
    ensure_minimum_version(&server_version, &server_version_raw)?;

    let default_catalog = if config.database.is_empty() {
        query_scalar(&mut connection, schema_queries::CURRENT_DATABASE_QUERY)?
    } else {
        config.database.clone()
    };

    Ok(Box::new(MysqlAdapter {
        connection: Mutex::new(connection),
        default_catalog,
        server_version,
    }))
}

impl MysqlAdapter {
    fn lock_connection(&self, sql: &str) -> Result<MutexGuard<'_, PooledConn>> {
        self.connection
            .lock()
            .map_err(|_| execution_error(sql, io::Error::other(POISONED_CONNECTION_MESSAGE)))
    }

    /// Databases named by the filters, or the connection's database.
    fn introspected_catalogs(&self, filters: &FiltersConfig) -> Vec<String> {
        let named = filters.catalog_names();
        if named.is_empty() {
            return vec![self.default_catalog.clone()];
        }
        named.into_iter().map(str::to_string).collect()
    }
}

impl DatabaseAdapter for MysqlAdapter {
    fn load_schema(&self, filters: &FiltersConfig) -> Result<DataMap> {
        let entity_filters = filters.validate(&MysqlDialect)?;
        let catalogs = self.introspected_catalogs(filters);
        let mut connection = self.lock_connection(schema_queries::TABLES_QUERY)?;

        let mut data_map = DataMap::new();
        let mut foreign_keys = Vec::new();
        for catalog in &catalogs {
            for table_name in query_table_names(&mut connection, catalog)? {
                let name = QualifiedName::new(table_name).with_catalog(catalog);
                if !entity_filters.is_table_included(&name) {
                    continue;
                }
                let table = load_table(&mut connection, &entity_filters, name)?;
                data_map.tables.push(table);
            }
            foreign_keys.extend(query_foreign_keys(&mut connection, catalog)?);
        }
        attach_foreign_keys(&mut data_map, foreign_keys);

        debug!(
            tables = data_map.tables.len(),
            catalogs = ?catalogs,
            "loaded mysql schema"
        );
        Ok(data_map)
    }

    fn execute(&self, sql: &str) -> Result<()> {
        let mut connection = self.lock_connection(sql)?;
        connection
            .query_drop(sql)
            .map_err(|source| execution_error(sql, source))
    }

    /// MySQL commits DDL implicitly, so a rollback only undoes data changes
    /// such as null backfills.
    fn begin(&mut self) -> Result<Transaction<'_>> {
        self.execute(BEGIN_SQL)?;
        Ok(Transaction::new(self))
    }

    fn server_version(&self) -> Result<Version> {
        Ok(self.server_version.clone())
    }
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

fn connect_connection(config: &ConnectionConfig) -> Result<PooledConn> {
    let mut builder = OptsBuilder::new()
        .ip_or_hostname(config.host.clone().or(Some(DEFAULT_MYSQL_HOST.to_string())))
        .tcp_port(config.port.unwrap_or(DEFAULT_MYSQL_PORT))
        .user(config.user.clone())
        .pass(config.password.clone())
        .db_name((!config.database.is_empty()).then(|| config.database.clone()));
    if let Some(socket) = &config.socket {
        builder = builder.socket(Some(socket.clone()));
    }

    let pool = Pool::new(builder).map_err(|source| execution_error(CONNECT_SQL, source))?;
    pool.get_conn()
        .map_err(|source| execution_error(CONNECT_SQL, source))
}

fn query_scalar(connection: &mut PooledConn, sql: &str) -> Result<String> {
    connection
        .query_first::<String, _>(sql)
        .map_err(|source| execution_error(sql, source))?
        .ok_or_else(|| execution_error(sql, io::Error::other("query returned no rows")))
}

fn query_table_names(connection: &mut PooledConn, catalog: &str) -> Result<Vec<String>> {
    let query = schema_queries::TABLES_QUERY;
    let rows = connection
        .exec::<Row, _, _>(query, (catalog,))
        .map_err(|source| execution_error(query, source))?;
    rows.iter()
        .map(|row| row_value(row, 0, query, "TABLE_NAME"))
        .collect()
}

fn load_table(
    connection: &mut PooledConn,
    filters: &EntityFilters,
    name: QualifiedName,
) -> Result<Table> {
    let query = schema_queries::COLUMNS_QUERY;
    let catalog = name.catalog.clone().unwrap_or_default();
    let rows = connection
        .exec::<Row, _, _>(query, (catalog.as_str(), name.name.as_str()))
        .map_err(|source| execution_error(query, source))?;

    let mut table = Table::new(name);
    for row in &rows {
        let column_name: String = row_value(row, 0, query, "COLUMN_NAME")?;
        if !filters.is_column_included(&table.name, &column_name) {
            continue;
        }
        let column_type: String = row_value(row, 1, query, "COLUMN_TYPE")?;
        let nullable: String = row_value(row, 2, query, "IS_NULLABLE")?;
        let key: String = row_value(row, 3, query, "COLUMN_KEY")?;
        let extra: String = row_value(row, 4, query, "EXTRA")?;

        let parsed = normalize::parse_column_type(&column_type);
        let mut column = Column::new(column_name, parsed.data_type);
        column.length = parsed.length;
        column.precision = parsed.precision;
        column.scale = parsed.scale;
        column.primary_key = key.eq_ignore_ascii_case("PRI");
        column.mandatory = column.primary_key || nullable.eq_ignore_ascii_case("NO");
        column.generated = extra.to_ascii_lowercase().contains("auto_increment");
        table.columns.push(column);
    }
    Ok(table)
}

fn query_foreign_keys(connection: &mut PooledConn, catalog: &str) -> Result<Vec<ForeignKeyRow>> {
    let query = schema_queries::FOREIGN_KEYS_QUERY;
    let rows = connection
        .exec::<Row, _, _>(query, (catalog,))
        .map_err(|source| execution_error(query, source))?;

    rows.iter()
        .map(|row| {
            let source_table: String = row_value(row, 1, query, "TABLE_NAME")?;
            let target_catalog: String = row_value(row, 3, query, "REFERENCED_TABLE_SCHEMA")?;
            let target_table: String = row_value(row, 4, query, "REFERENCED_TABLE_NAME")?;
            Ok(ForeignKeyRow {
                name: row_value(row, 0, query, "CONSTRAINT_NAME")?,
                source_table: QualifiedName::new(source_table).with_catalog(catalog),
                source_column: row_value(row, 2, query, "COLUMN_NAME")?,
                target_table: QualifiedName::new(target_table).with_catalog(target_catalog),
                target_column: row_value(row, 5, query, "REFERENCED_COLUMN_NAME")?,
                ordinal: row_value(row, 6, query, "ORDINAL_POSITION")?,
            })
        })
        .collect()
}

fn row_value<T>(row: &Row, index: usize, query: &str, label: &str) -> Result<T>
where
    T: FromValue,
{
    row.get::<T, usize>(index).ok_or_else(|| {
        execution_error(
            query,
            io::Error::other(format!("missing column `{label}` in query result")),
        )
    })
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
    if version.major >= MINIMUM_MYSQL_MAJOR_VERSION {
        return Ok(());
    }

    Err(execution_error(
        schema_queries::SHOW_SERVER_VERSION_QUERY,
        io::Error::other(format!(
            "mysql server version `{raw_version}` is not supported; requires {MINIMUM_MYSQL_MAJOR_VERSION}.{MINIMUM_MYSQL_MINOR_VERSION}+"
        )),
    ))
}

fn invalid_server_version_error(raw_version: &str) -> dbsync_core::Error {
    execution_error(
        schema_queries::SHOW_SERVER_VERSION_QUERY,
        io::Error::other(format!(
            "failed to parse mysql server version string: `{raw_version}`"
        )),
    )
}

fn execution_error<E>(sql: &str, source: E) -> dbsync_core::Error
where
    E: StdError + Send + Sync + 'static,
{
    ExecutionError::statement_failed(sql, source).into()
}
