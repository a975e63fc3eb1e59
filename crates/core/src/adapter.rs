use tracing::warn;

use crate::{DataMap, FiltersConfig, Result, Version};

pub const COMMIT_SQL: &str = "COMMIT";
pub const ROLLBACK_SQL: &str = "ROLLBACK";

/// A live database connection as seen by the merge engine.
pub trait DatabaseAdapter {
    /// Introspects the tables, columns, primary keys and foreign keys visible
    /// through `filters`.
    fn load_schema(&self, filters: &FiltersConfig) -> Result<DataMap>;

    fn execute(&self, sql: &str) -> Result<()>;

    fn begin(&mut self) -> Result<Transaction<'_>>;

    fn commit(&self) -> Result<()> {
        self.execute(COMMIT_SQL)
    }

    fn rollback(&self) -> Result<()> {
        self.execute(ROLLBACK_SQL)
    }

    fn server_version(&self) -> Result<Version>;
}

/// An open unit of work. Dropping it without [`Transaction::commit`] rolls back.
pub struct Transaction<'a> {
    adapter: &'a mut dyn DatabaseAdapter,
    finished: bool,
}

impl<'a> Transaction<'a> {
    pub fn new(adapter: &'a mut dyn DatabaseAdapter) -> Self {
        Self {
            adapter,
            finished: false,
        }
    }

    pub fn execute(&mut self, sql: &str) -> Result<()> {
        self.adapter.execute(sql)
    }

    pub fn adapter(&self) -> &dyn DatabaseAdapter {
        &*self.adapter
    }

    pub fn commit(mut self) -> Result<()> {
        self.finished = true;
        self.adapter.commit()
    }

    pub fn rollback(mut self) -> Result<()> {
        self.finished = true;
        self.adapter.rollback()
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(error) = self.adapter.rollback() {
            warn!(%error, "rollback of abandoned transaction failed");
        }
    }
}
