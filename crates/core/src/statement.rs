#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Sql { sql: String },
    BatchBoundary,
}

impl Statement {
    pub fn sql(sql: impl Into<String>) -> Self {
        Self::Sql { sql: sql.into() }
    }

    pub fn as_sql(&self) -> Option<&str> {
        match self {
            Self::Sql { sql } => Some(sql),
            Self::BatchBoundary => None,
        }
    }
}
