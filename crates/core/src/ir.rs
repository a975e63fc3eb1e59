mod ident;
mod loader;
mod schema;
mod types;

pub use ident::{NameMatching, QualifiedName};
pub use loader::{ForeignKeyRow, attach_foreign_keys};
pub use schema::{Column, DataMap, Join, Relationship, Table};
pub use types::{DataType, Value};
