use std::error::Error as StdError;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Factory(#[from] FactoryError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Execute(#[from] ExecutionError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Rejected before any diffing starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("dialect `{dialect}` does not support catalogs, but filters request catalog `{catalog}`")]
    CatalogsNotSupported { dialect: String, catalog: String },
    #[error("dialect `{dialect}` does not support schemas, but filters request schema `{schema}`")]
    SchemasNotSupported { dialect: String, schema: String },
    #[error("invalid filter pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A token was requested for a structurally invalid combination of inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FactoryError {
    #[error("cannot create `{token}` token for table `{table}` without columns")]
    EmptyTable { token: &'static str, table: String },
    #[error("cannot create `{token}` token: table `{table}` has no column `{column}`")]
    UnknownColumn {
        token: &'static str,
        table: String,
        column: String,
    },
    #[error("cannot create `{token}` token: relationship `{relationship}` on `{table}` has no joins")]
    EmptyJoins {
        token: &'static str,
        table: String,
        relationship: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("`{token}` is not supported by dialect `{dialect}`: {reason}")]
    Unsupported {
        token: &'static str,
        dialect: String,
        reason: String,
    },
}

impl GenerateError {
    pub fn unsupported(token: &'static str, dialect: &str, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            token,
            dialect: dialect.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("{}", render_statement_failure(*statement_index, sql, token.as_deref(), target.as_deref(), &**source))]
    StatementFailed {
        statement_index: usize,
        sql: String,
        token: Option<String>,
        target: Option<String>,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    #[error("token `{token}` targets the database but no adapter is attached to the merger context")]
    NoConnection { token: String },
}

impl ExecutionError {
    pub fn statement_failed(
        sql: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::StatementFailed {
            statement_index: 0,
            sql: sql.into(),
            token: None,
            target: None,
            source: Box::new(source),
        }
    }

    /// Attaches the failing token and its table or column reference.
    #[must_use]
    pub fn with_token(self, token_name: &str, token_target: &str, index: usize) -> Self {
        match self {
            Self::StatementFailed {
                sql,
                token: None,
                target: None,
                source,
                ..
            } => Self::StatementFailed {
                statement_index: index,
                sql,
                token: Some(token_name.to_string()),
                target: Some(token_target.to_string()),
                source,
            },
            other => other,
        }
    }
}

fn render_statement_failure(
    statement_index: usize,
    sql: &str,
    token: Option<&str>,
    target: Option<&str>,
    source: &(dyn StdError + Send + Sync),
) -> String {
    match (token, target) {
        (Some(token), Some(target)) => format!(
            "{token} `{target}` failed at statement {statement_index}: {source}; sql: {sql}"
        ),
        _ => format!("statement failed: {source}; sql: {sql}"),
    }
}

/// The in-memory model is inconsistent with a ToModel token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("table `{table}` already exists in the model")]
    TableExists { table: String },
    #[error("table `{table}` does not exist in the model")]
    TableNotFound { table: String },
    #[error("column `{table}.{column}` already exists in the model")]
    ColumnExists { table: String, column: String },
    #[error("column `{table}.{column}` does not exist in the model")]
    ColumnNotFound { table: String, column: String },
    #[error("relationship `{relationship}` already exists on table `{table}`")]
    RelationshipExists { table: String, relationship: String },
    #[error("relationship `{relationship}` does not exist on table `{table}`")]
    RelationshipNotFound { table: String, relationship: String },
}
