mod error;
mod model_spec;
mod yaml_runner;

pub use error::TestkitError;
pub use model_spec::{ColumnSpec, JoinSpec, ModelSpec, RelationshipSpec, TableSpec, ValueSpec};
pub use yaml_runner::{
    TestCase, TestResult, load_test_cases_from_path, load_test_cases_from_str, matches_flavor,
    run_offline_test, run_online_test,
};

