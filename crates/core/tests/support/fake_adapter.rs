use std::{cell::RefCell, error::Error as StdError, fmt};

use dbsync_core::{
    COMMIT_SQL, DataMap, DatabaseAdapter, ExecutionError, FiltersConfig, ROLLBACK_SQL, Result,
    Transaction, Version,
};

pub const BEGIN_SQL: &str = "BEGIN";

#[derive(Debug, Default)]
struct FailureRule {
    sql: String,
    message: String,
}

#[derive(Debug)]
pub struct FakeAdapter {
    state: RefCell<FakeAdapterState>,
}

#[derive(Debug)]
struct FakeAdapterState {
    schema: DataMap,
    server_version: Version,
    executed_sql: Vec<String>,
    load_count: usize,
    begin_count: usize,
    commit_count: usize,
    rollback_count: usize,
    fail_on_sql: Option<FailureRule>,
}

impl Default for FakeAdapterState {
    fn default() -> Self {
        Self {
            schema: DataMap::new(),
            server_version: Version {
                major: 0,
                minor: 0,
                patch: 0,
            },
            executed_sql: Vec::new(),
            load_count: 0,
            begin_count: 0,
            commit_count: 0,
            rollback_count: 0,
            fail_on_sql: None,
        }
    }
}

impl Default for FakeAdapter {
    fn default() -> Self {
        Self {
            state: RefCell::new(FakeAdapterState::default()),
        }
    }
}

#[allow(dead_code)]
impl FakeAdapter {
    pub fn with_schema(schema: DataMap) -> Self {
        let adapter = Self::default();
        adapter.set_schema(schema);
        adapter
    }

    pub fn set_schema(&self, schema: DataMap) {
        self.state.borrow_mut().schema = schema;
    }

    pub fn set_server_version(&self, version: Version) {
        self.state.borrow_mut().server_version = version;
    }

    pub fn set_fail_on_sql(&self, sql: impl Into<String>, message: impl Into<String>) {
        self.state.borrow_mut().fail_on_sql = Some(FailureRule {
            sql: sql.into(),
            message: message.into(),
        });
    }

    pub fn clear_fail_on_sql(&self) {
        self.state.borrow_mut().fail_on_sql = None;
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.state.borrow().executed_sql.clone()
    }

    /// Executed statements other than transaction control.
    pub fn executed_ddl(&self) -> Vec<String> {
        self.executed_sql()
            .into_iter()
            .filter(|sql| ![BEGIN_SQL, COMMIT_SQL, ROLLBACK_SQL].contains(&sql.as_str()))
            .collect()
    }

    pub fn load_count(&self) -> usize {
        self.state.borrow().load_count
    }

    pub fn begin_count(&self) -> usize {
        self.state.borrow().begin_count
    }

    pub fn commit_count(&self) -> usize {
        self.state.borrow().commit_count
    }

    pub fn rollback_count(&self) -> usize {
        self.state.borrow().rollback_count
    }
}

impl DatabaseAdapter for FakeAdapter {
    fn load_schema(&self, _filters: &FiltersConfig) -> Result<DataMap> {
        let mut state = self.state.borrow_mut();
        state.load_count += 1;
        Ok(state.schema.clone())
    }

    fn execute(&self, sql: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();

        if let Some(rule) = &state.fail_on_sql
            && rule.sql == sql
        {
            return Err(
                ExecutionError::statement_failed(sql, FakeSourceError(rule.message.clone()))
                    .into(),
            );
        }

        state.executed_sql.push(sql.to_string());
        match sql {
            BEGIN_SQL => state.begin_count += 1,
            COMMIT_SQL => state.commit_count += 1,
            ROLLBACK_SQL => state.rollback_count += 1,
            _ => {}
        }

        Ok(())
    }

    fn begin(&mut self) -> Result<Transaction<'_>> {
        self.execute(BEGIN_SQL)?;
        Ok(Transaction::new(self))
    }

    fn server_version(&self) -> Result<Version> {
        Ok(self.state.borrow().server_version.clone())
    }
}

#[derive(Debug)]
struct FakeSourceError(String);

impl fmt::Display for FakeSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for FakeSourceError {}
