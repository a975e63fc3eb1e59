use std::{
    collections::HashMap,
    error::Error as StdError,
    io,
    sync::{Mutex, MutexGuard},
};

use dbsync_core::{
    Column, ConnectionConfig, DataMap, DatabaseAdapter, EntityFilters, ExecutionError,
    FiltersConfig, ForeignKeyRow, QualifiedName, Result, Table, Transaction, Version,
    attach_foreign_keys,
};
use futures_util::TryStreamExt;
use tiberius::{AuthMethod, Client, Config, QueryItem};
use tokio::{
    net::TcpStream,
    runtime::{Builder, Runtime},
};
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

use crate::{MssqlDialect, normalize, schema_queries};

type TdsClient = Client<Compat<TcpStream>>;
type Rows = Vec<Vec<String>>;

const BEGIN_SQL: &str = "BEGIN TRANSACTION";
const CONNECT_SQL: &str = "CONNECT mssql";
const DEFAULT_MSSQL_HOST: &str = "127.0.0.1";
const DEFAULT_MSSQL_PORT: u16 = 1433;
const DEFAULT_MSSQL_SCHEMA: &str = "dbo";
const MINIMUM_MSSQL_PRODUCT_MAJOR_VERSION: u16 = 15;
const MINIMUM_MSSQL_YEAR_VERSION: u16 = 2019;
const YEAR_VERSION_THRESHOLD: u16 = 1000;
const SERVER_VERSION_OVERRIDE_KEY: &str = "mssql.server_version";
const SCHEMA_SEARCH_PATH_OVERRIDE_KEY: &str = "mssql.schema_search_path";
const POISONED_CONNECTION_MESSAGE: &str = "mssql connection state was poisoned";

pub(crate) struct MssqlAdapter {
    state: Mutex<LiveState>,
    schema_search_path: Vec<String>,
    server_version: Version,
}

struct LiveState {
    runtime: Runtime,
    client: TdsClient,
}

pub(crate) fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseAdapter>> {
    if let Some(raw_version) = config.extra.get(SERVER_VERSION_OVERRIDE_KEY) {
        let parsed_version = parse_server_version(raw_version)
            .ok_or_else(|| invalid_server_version_error(raw_version.as_str()))?;
        ensure_minimum_version(&parsed_version, raw_version.as_str())?;
    }

    let mut live_state = connect_live_state(config)?;

    let raw_version = if let Some(raw_version) = config.extra.get(SERVER_VERSION_OVERRIDE_KEY) {
        raw_version.clone()
    } else {
        query_scalar_string(&mut live_state, schema_queries::SHOW_SERVER_VERSION_QUERY)?
    };
    let server_version = parse_server_version(raw_version.as_str())
        .ok_or_else(|| invalid_server_version_error(raw_version.as_str()))?;
    ensure_minimum_version(&server_version, raw_version.as_str())?;

    let raw_search_path =
        if let Some(override_value) = config.extra.get(SCHEMA_SEARCH_PATH_OVERRIDE_KEY) {
            override_value.clone()
        } else {
            query_scalar_string(&mut live_state, schema_queries::CURRENT_SCHEMA_QUERY)?
        };
    let mut schema_search_path = parse_schema_search_path(&raw_search_path);
    if schema_search_path.is_empty() {
        schema_search_path.push(DEFAULT_MSSQL_SCHEMA.to_string());
    }

    Ok(Box::new(MssqlAdapter {
        state: Mutex::new(live_state),
        schema_search_path,
        server_version,
    }))
}

impl MssqlAdapter {
    fn lock_state(&self, sql: &str) -> Result<MutexGuard<'_, LiveState>> {
        self.state
            .lock()
            .map_err(|_| execution_error(sql, io::Error::other(POISONED_CONNECTION_MESSAGE)))
    }
}

impl DatabaseAdapter for MssqlAdapter {
    fn load_schema(&self, filters: &FiltersConfig) -> Result<DataMap> {
        let entity_filters = filters.validate(&MssqlDialect)?;
        let named_schemas = filters.schema_names();
        let schemas = if named_schemas.is_empty() {
            self.schema_search_path.clone()
        } else {
            named_schemas.into_iter().map(str::to_string).collect()
        };
        let catalogs = filters.catalog_names();
        let catalogs = if catalogs.is_empty() {
            vec![None]
        } else {
            catalogs.into_iter().map(Some).collect()
        };

        let mut state = self.lock_state(schema_queries::TABLES_QUERY_TEMPLATE)?;
        let mut data_map = DataMap::new();
        let mut foreign_keys = Vec::new();
        for catalog in catalogs {
            let scope = IntrospectionScope::new(catalog, &schemas);
            let loaded = scope.load_tables(&mut state, &entity_filters)?;
            data_map.tables.extend(loaded);
            foreign_keys.extend(scope.load_foreign_keys(&mut state)?);
        }
        attach_foreign_keys(&mut data_map, foreign_keys);

        debug!(
            tables = data_map.tables.len(),
            schemas = ?schemas,
            "loaded mssql schema"
        );
        Ok(data_map)
    }

    fn execute(&self, sql: &str) -> Result<()> {
        let mut state = self.lock_state(sql)?;
        execute_live_sql(&mut state, sql)
    }

    fn begin(&mut self) -> Result<Transaction<'_>> {
        self.execute(BEGIN_SQL)?;
        Ok(Transaction::new(self))
    }

    fn server_version(&self) -> Result<Version> {
        Ok(self.server_version.clone())
    }
}

/// One catalog and the schemas introspected in it.
struct IntrospectionScope<'a> {
    catalog: Option<&'a str>,
    sys: String,
    schema_list: String,
}

impl<'a> IntrospectionScope<'a> {
    fn new(catalog: Option<&'a str>, schemas: &[String]) -> Self {
        let sys = match catalog {
            Some(catalog) => format!("{}.sys", quote_ident(catalog)),
            None => "sys".to_string(),
        };
        let schema_list = schemas
            .iter()
            .map(|schema| string_literal(schema))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            catalog,
            sys,
            schema_list,
        }
    }

    fn query(&self, template: &str) -> String {
        template
            .replace("{sys}", &self.sys)
            .replace("{schemas}", &self.schema_list)
    }

    fn table_name(&self, schema: &str, table: &str) -> QualifiedName {
        let name = QualifiedName::new(table).with_schema(schema);
        match self.catalog {
            Some(catalog) => name.with_catalog(catalog),
            None => name,
        }
    }

    fn load_tables(&self, state: &mut LiveState, filters: &EntityFilters) -> Result<Vec<Table>> {
        let mut tables = Vec::new();
        let mut positions = HashMap::new();
        for row in query_rows(state, &self.query(schema_queries::TABLES_QUERY_TEMPLATE))? {
            let name = self.table_name(field(&row, 0), field(&row, 1));
            if !filters.is_table_included(&name) {
                continue;
            }
            positions.insert(
                (field(&row, 0).to_string(), field(&row, 1).to_string()),
                tables.len(),
            );
            tables.push(Table::new(name));
        }

        for row in query_rows(state, &self.query(schema_queries::COLUMNS_QUERY_TEMPLATE))? {
            let Some(&position) = positions.get(&row_key(&row)) else {
                continue;
            };
            let table = &mut tables[position];
            if !filters.is_column_included(&table.name, field(&row, 2)) {
                continue;
            }
            table.columns.push(decode_column(&row));
        }

        let query = self.query(schema_queries::PRIMARY_KEYS_QUERY_TEMPLATE);
        for row in query_rows(state, &query)? {
            let Some(&position) = positions.get(&row_key(&row)) else {
                continue;
            };
            let table = &mut tables[position];
            table.primary_key_name = Some(field(&row, 2).to_string());
            if let Some(column) = table
                .columns
                .iter_mut()
                .find(|column| column.name == field(&row, 3))
            {
                column.primary_key = true;
                column.mandatory = true;
            }
        }
        Ok(tables)
    }

    fn load_foreign_keys(&self, state: &mut LiveState) -> Result<Vec<ForeignKeyRow>> {
        let query = self.query(schema_queries::FOREIGN_KEYS_QUERY_TEMPLATE);
        Ok(query_rows(state, &query)?
            .iter()
            .map(|row| ForeignKeyRow {
                name: field(row, 0).to_string(),
                source_table: self.table_name(field(row, 1), field(row, 2)),
                source_column: field(row, 3).to_string(),
                target_table: self.table_name(field(row, 4), field(row, 5)),
                target_column: field(row, 6).to_string(),
                ordinal: field(row, 7).trim().parse().unwrap_or_default(),
            })
            .collect())
    }
}

fn decode_column(row: &[String]) -> Column {
    let parsed = normalize::parse_sys_type(
        field(row, 3),
        parse_i32_field(row, 4),
        parse_i32_field(row, 5),
        parse_i32_field(row, 6),
    );
    let mut column = Column::new(field(row, 2), parsed.data_type);
    column.length = parsed.length;
    column.precision = parsed.precision;
    column.scale = parsed.scale;
    column.mandatory = field(row, 7).trim() == "0";
    column.generated = field(row, 8).trim() == "1";
    column
}

fn row_key(row: &[String]) -> (String, String) {
    (field(row, 0).to_string(), field(row, 1).to_string())
}

fn field(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or_default()
}

fn connect_live_state(config: &ConnectionConfig) -> Result<LiveState> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| execution_error(CONNECT_SQL, source))?;
    let tds_config = build_tiberius_config(config)?;

    let client = runtime.block_on(async {
        let tcp = TcpStream::connect(tds_config.get_addr())
            .await
            .map_err(|source| execution_error(CONNECT_SQL, source))?;
        tcp.set_nodelay(true)
            .map_err(|source| execution_error(CONNECT_SQL, source))?;

        Client::connect(tds_config, tcp.compat_write())
            .await
            .map_err(|source| execution_error(CONNECT_SQL, source))
    })?;

    Ok(LiveState { runtime, client })
}

fn build_tiberius_config(config: &ConnectionConfig) -> Result<Config> {
    let host = config
        .host
        .as_deref()
        .unwrap_or(DEFAULT_MSSQL_HOST)
        .to_string();
    let port = config.port.unwrap_or(DEFAULT_MSSQL_PORT);
    let user = config
        .user
        .clone()
        .ok_or_else(|| execution_error(CONNECT_SQL, io::Error::other("mssql user is required")))?;
    let password = config.password.clone().unwrap_or_default();

    let mut tds_config = Config::new();
    tds_config.host(host.as_str());
    tds_config.port(port);
    tds_config.database(config.database.clone());
    tds_config.authentication(AuthMethod::sql_server(user, password));
    tds_config.trust_cert();
    Ok(tds_config)
}

fn execute_live_sql(state: &mut LiveState, sql: &str) -> Result<()> {
    let LiveState { runtime, client } = state;
    runtime.block_on(async {
        let mut stream = client
            .simple_query(sql)
            .await
            .map_err(|source| execution_error(sql, source))?;
        while stream
            .try_next()
            .await
            .map_err(|source| execution_error(sql, source))?
            .is_some()
        {}
        Ok(())
    })
}

fn query_scalar_string(state: &mut LiveState, sql: &str) -> Result<String> {
    let rows = query_rows(state, sql)?;
    rows.into_iter()
        .next()
        .and_then(|columns| columns.into_iter().next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| execution_error(sql, io::Error::other("query returned no rows")))
}

fn query_rows(state: &mut LiveState, sql: &str) -> Result<Rows> {
    let LiveState { runtime, client } = state;
    runtime.block_on(async {
        let mut stream = client
            .simple_query(sql)
            .await
            .map_err(|source| execution_error(sql, source))?;

        let mut rows = Vec::new();
        while let Some(item) = stream
            .try_next()
            .await
            .map_err(|source| execution_error(sql, source))?
        {
            if let QueryItem::Row(row) = item {
                let mut values = Vec::with_capacity(row.columns().len());
                for index in 0..row.columns().len() {
                    values.push(
                        row.get::<&str, usize>(index)
                            .unwrap_or_default()
                            .to_string(),
                    );
                }
                rows.push(values);
            }
        }
        Ok(rows)
    })
}

pub fn parse_server_version(raw: &str) -> Option<Version> {
    let mut parts = raw.split_whitespace().next()?.split('.');
    let major = parse_u16_component(parts.next()?)?;
    let minor = parts.next().and_then(parse_u16_component).unwrap_or(0);
    let patch = parts.next().and_then(parse_u16_component).unwrap_or(0);

    Some(Version {
        major,
        minor,
        patch,
    })
}

pub fn parse_schema_search_path(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_u16_component(raw: &str) -> Option<u16> {
    let digits = raw
        .chars()
        .take_while(|ch| ch.is_ascii_digit())
        .collect::<String>();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u16>().ok()
}

fn parse_i32_field(row: &[String], index: usize) -> i32 {
    field(row, index).trim().parse::<i32>().unwrap_or_default()
}

fn ensure_minimum_version(version: &Version, raw_version: &str) -> Result<()> {
    let supported = if version.major >= YEAR_VERSION_THRESHOLD {
        version.major >= MINIMUM_MSSQL_YEAR_VERSION
    } else {
        version.major >= MINIMUM_MSSQL_PRODUCT_MAJOR_VERSION
    };
    if supported {
        return Ok(());
    }

    Err(execution_error(
        schema_queries::SHOW_SERVER_VERSION_QUERY,
        io::Error::other(format!(
            "mssql server version `{raw_version}` is not supported; requires SQL Server 2019+"
        )),
    ))
}

fn invalid_server_version_error(raw_version: &str) -> dbsync_core::Error {
    execution_error(
        schema_queries::SHOW_SERVER_VERSION_QUERY,
        io::Error::other(format!(
            "failed to parse mssql server version string: `{raw_version}`"
        )),
    )
}

fn quote_ident(identifier: &str) -> String {
    format!("[{}]", identifier.replace(']', "]]"))
}

fn string_literal(value: &str) -> String {
    format!("N'{}'", value.replace('\'', "''"))
}

fn execution_error<E>(sql: &str, source: E) -> dbsync_core::Error
where
    E: StdError + Send + Sync + 'static,
{
    ExecutionError::statement_failed(sql, source).into()
}
