use std::{io, path::PathBuf};

use dbsync_core::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TestkitError {
    #[error("failed to read testcase file `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid testcase yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unknown data type `{data_type}` for column `{table}.{column}`")]
    UnknownDataType {
        table: String,
        column: String,
        data_type: String,
    },
    #[error("value for null key `{key}` must be `TABLE.COLUMN`")]
    InvalidValueKey { key: String },
    #[error(transparent)]
    Model(#[from] ModelError),
}
