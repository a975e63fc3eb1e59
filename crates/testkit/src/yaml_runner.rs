use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
    fmt, fs,
    path::Path,
    sync::Arc,
};

use dbsync_core::{
    DataMap, DatabaseAdapter, DbMerger, Dialect, Direction, ExecutionPolicy, Executor,
    FixedValueForNullProvider, MergerContext, MergerOptions, MergerToken, NameMatching, Renderer,
    Statement, TokenFactory, Version, to_model_tokens,
};
use serde::Deserialize;

use crate::{ModelSpec, TestkitError, ValueSpec};

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestCase {
    /// The database before the merge.
    pub current: ModelSpec,
    /// The model the database should end up matching.
    pub desired: ModelSpec,
    pub up: Option<String>,
    pub down: Option<String>,
    pub error: Option<String>,
    pub min_version: Option<String>,
    pub max_version: Option<String>,
    pub flavor: Option<String>,
    pub case_sensitive: bool,
    pub skip_relationships: bool,
    pub skip_primary_keys: bool,
    /// Backfill values keyed `TABLE.COLUMN`.
    pub values_for_null: BTreeMap<String, ValueSpec>,
    /// Skipped by the online runner.
    pub offline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    Passed,
    Skipped(String),
    Failed(String),
}

enum RunnerFailure {
    Engine(dbsync_core::Error),
    Testcase(TestkitError),
    Assertion(String),
}

impl fmt::Display for RunnerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Engine(error) => write!(f, "{error}"),
            Self::Testcase(error) => write!(f, "{error}"),
            Self::Assertion(message) => f.write_str(message),
        }
    }
}

impl From<dbsync_core::Error> for RunnerFailure {
    fn from(error: dbsync_core::Error) -> Self {
        Self::Engine(error)
    }
}

impl From<dbsync_core::ConfigError> for RunnerFailure {
    fn from(error: dbsync_core::ConfigError) -> Self {
        Self::Engine(error.into())
    }
}

impl From<TestkitError> for RunnerFailure {
    fn from(error: TestkitError) -> Self {
        Self::Testcase(error)
    }
}

type RunnerResult<T> = std::result::Result<T, RunnerFailure>;

pub fn load_test_cases_from_str(yaml: &str) -> Result<BTreeMap<String, TestCase>, TestkitError> {
    Ok(serde_yaml::from_str(yaml)?)
}

pub fn load_test_cases_from_path(path: &Path) -> Result<BTreeMap<String, TestCase>, TestkitError> {
    let yaml = fs::read_to_string(path).map_err(|source| TestkitError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_test_cases_from_str(&yaml)
}

/// `!name` excludes a flavor; an empty requirement matches every flavor.
pub fn matches_flavor(requirement: Option<&str>, current_flavor: &str) -> bool {
    let Some(requirement) = requirement.map(str::trim).filter(|value| !value.is_empty()) else {
        return true;
    };

    if let Some(excluded_flavor) = requirement.strip_prefix('!') {
        return excluded_flavor != current_flavor;
    }

    requirement == current_flavor
}

/// Merges the case models without a database: checks the `up` and `down`
/// SQL, then imports the database side into the desired model and checks
/// that nothing remains to merge.
pub fn run_offline_test(dialect: &dyn Dialect, test: &TestCase) -> TestResult {
    if let Some(reason) = flavor_skip_reason(test, dialect.name()) {
        return TestResult::Skipped(reason);
    }
    into_test_result(evaluate_expected_error(
        test,
        run_offline_test_flow(dialect, test),
    ))
}

/// Applies `current`, migrates to `desired` and back on a live database,
/// checking idempotency after every step. Tables of the case are dropped
/// afterwards.
pub fn run_online_test(
    dialect: &dyn Dialect,
    adapter: &dyn DatabaseAdapter,
    test: &TestCase,
) -> TestResult {
    if test.offline {
        return TestResult::Skipped("offline-only testcase".to_string());
    }
    if let Some(reason) = flavor_skip_reason(test, dialect.name()) {
        return TestResult::Skipped(reason);
    }
    match evaluate_online_version_gate(adapter, test) {
        Ok(Some(reason)) => return TestResult::Skipped(reason),
        Ok(None) => {}
        Err(error) => return TestResult::Failed(error.to_string()),
    }

    let outcome = run_online_test_flow(dialect, adapter, test);
    let cleanup = drop_case_tables(dialect, adapter, test);
    into_test_result(evaluate_expected_error(test, outcome).and(cleanup))
}

fn into_test_result(result: RunnerResult<()>) -> TestResult {
    match result {
        Ok(()) => TestResult::Passed,
        Err(error) => TestResult::Failed(error.to_string()),
    }
}

fn flavor_skip_reason(test: &TestCase, current_flavor: &str) -> Option<String> {
    if matches_flavor(test.flavor.as_deref(), current_flavor) {
        return None;
    }
    Some(format!(
        "flavor '{}' does not match current flavor '{current_flavor}'",
        test.flavor.as_deref().unwrap_or_default()
    ))
}

fn run_offline_test_flow(dialect: &dyn Dialect, test: &TestCase) -> RunnerResult<()> {
    validate_direction_expectations(test)?;

    let current = test.current.to_data_map()?;
    let desired = test.desired.to_data_map()?;
    let merger = build_merger(dialect, test)?;

    let forward = merger.merge(&desired, &current)?;
    assert_expected_sql("up", test.up.as_deref(), dialect, &forward)?;

    let reverse = merger.merge(&current, &desired)?;
    assert_expected_sql("down", test.down.as_deref(), dialect, &reverse)?;

    let mut imported = desired.clone();
    let import = to_model_tokens(&forward, merger.factory());
    let mut context = MergerContext::new(dialect, &mut imported)
        .with_name_matching(merger.options().name_matching);
    Executor::new(ExecutionPolicy::HaltOnFirstError).execute(&import, &mut context)?;

    let remaining = merger.merge(&imported, &current)?;
    if !remaining.is_empty() {
        return Err(RunnerFailure::Assertion(format!(
            "importing the current schema left differences:\n{}",
            render_token_list(&remaining)
        )));
    }

    Ok(())
}

fn run_online_test_flow(
    dialect: &dyn Dialect,
    adapter: &dyn DatabaseAdapter,
    test: &TestCase,
) -> RunnerResult<()> {
    validate_direction_expectations(test)?;

    let current = test.current.to_data_map()?;
    let desired = test.desired.to_data_map()?;
    let merger = build_merger(dialect, test)?;
    let load_schema = || load_case_schema(&merger, adapter, test);

    // 1) Apply current schema.
    let seed = merger.merge(&current, &load_schema()?)?;
    apply_tokens(dialect, adapter, &seed)?;

    // 2) Verify idempotency of current schema.
    assert_online_idempotency(&merger, adapter, test, &current, "current schema")?;

    // 3) Merge current -> desired and validate expected up SQL.
    let forward = merger.merge(&desired, &load_schema()?)?;
    assert_expected_sql("up", test.up.as_deref(), dialect, &forward)?;

    // 4) Apply forward tokens.
    apply_tokens(dialect, adapter, &forward)?;

    // 5) Verify idempotency of desired schema.
    assert_online_idempotency(&merger, adapter, test, &desired, "desired schema")?;

    // 6) Merge desired -> current and validate expected down SQL.
    let reverse = merger.merge(&current, &load_schema()?)?;
    assert_expected_sql("down", test.down.as_deref(), dialect, &reverse)?;

    // 7) Apply reverse tokens.
    apply_tokens(dialect, adapter, &reverse)?;

    // 8) Verify idempotency after reverse.
    assert_online_idempotency(&merger, adapter, test, &current, "current schema after reverse")?;

    Ok(())
}

fn build_merger<'a>(dialect: &'a dyn Dialect, test: &TestCase) -> RunnerResult<DbMerger<'a>> {
    let mut provider = FixedValueForNullProvider::new();
    for (key, value) in &test.values_for_null {
        let (table, column) = key
            .split_once('.')
            .ok_or_else(|| TestkitError::InvalidValueKey { key: key.clone() })?;
        provider = provider.with_value(table, column, value.into());
    }

    let options = MergerOptions {
        direction: Direction::ToDb,
        name_matching: if test.case_sensitive {
            NameMatching::CaseSensitive
        } else {
            NameMatching::CaseInsensitive
        },
        skip_relationships: test.skip_relationships,
        skip_primary_keys: test.skip_primary_keys,
        value_for_null: Arc::new(provider),
        ..MergerOptions::default()
    };
    Ok(DbMerger::builder(TokenFactory::new(dialect))
        .options(options)
        .build()?)
}

/// The database schema restricted to tables named by either side of the case,
/// so that unrelated tables are neither compared nor dropped.
fn load_case_schema(
    merger: &DbMerger<'_>,
    adapter: &dyn DatabaseAdapter,
    test: &TestCase,
) -> RunnerResult<DataMap> {
    let names = test
        .current
        .tables
        .iter()
        .chain(&test.desired.tables)
        .map(|table| NameMatching::CaseInsensitive.key(&table.name))
        .collect::<BTreeSet<_>>();

    let mut database = adapter.load_schema(&merger.options().filters)?;
    let included = |name: &str| names.contains(&NameMatching::CaseInsensitive.key(name));
    database.tables.retain(|table| included(&table.name.name));
    for table in &mut database.tables {
        table
            .relationships
            .retain(|relationship| included(&relationship.target.name));
    }
    Ok(database)
}

fn apply_tokens(
    dialect: &dyn Dialect,
    adapter: &dyn DatabaseAdapter,
    tokens: &[MergerToken],
) -> RunnerResult<()> {
    // Relationships learned from the database only concern the model.
    let tokens = to_db_tokens(tokens);
    if tokens.is_empty() {
        return Ok(());
    }

    // ToDb tokens leave the model untouched.
    let mut scratch = DataMap::new();
    let mut context = MergerContext::new(dialect, &mut scratch).with_adapter(adapter);
    Executor::new(ExecutionPolicy::HaltOnFirstError).execute(&tokens, &mut context)?;
    Ok(())
}

fn assert_online_idempotency(
    merger: &DbMerger<'_>,
    adapter: &dyn DatabaseAdapter,
    test: &TestCase,
    expected: &DataMap,
    phase: &str,
) -> RunnerResult<()> {
    let database = load_case_schema(merger, adapter, test)?;
    let tokens = to_db_tokens(&merger.merge(expected, &database)?);
    if tokens.is_empty() {
        return Ok(());
    }

    Err(RunnerFailure::Assertion(format!(
        "{phase} is not idempotent; expected no changes but got:\n{}",
        render_token_list(&tokens)
    )))
}

fn to_db_tokens(tokens: &[MergerToken]) -> Vec<MergerToken> {
    tokens
        .iter()
        .filter(|token| token.direction() == Direction::ToDb)
        .cloned()
        .collect()
}

/// Drops every table named by either side of the case.
fn drop_case_tables(
    dialect: &dyn Dialect,
    adapter: &dyn DatabaseAdapter,
    test: &TestCase,
) -> RunnerResult<()> {
    let merger = build_merger(dialect, test)?;
    let tokens = merger.merge(&DataMap::new(), &load_case_schema(&merger, adapter, test)?)?;
    apply_tokens(dialect, adapter, &tokens)
}

fn evaluate_online_version_gate(
    adapter: &dyn DatabaseAdapter,
    test: &TestCase,
) -> RunnerResult<Option<String>> {
    let version = adapter.server_version()?;
    version_skip_reason(test, &version)
}

fn version_skip_reason(test: &TestCase, version: &Version) -> RunnerResult<Option<String>> {
    let rendered_version = format_version(version);

    if let Some(min_version) = normalized_version_requirement(test.min_version.as_deref())
        && compare_version_against_requirement(version, min_version)? == Ordering::Less
    {
        return Ok(Some(format!(
            "Version '{rendered_version}' is smaller than min_version '{min_version}'"
        )));
    }

    if let Some(max_version) = normalized_version_requirement(test.max_version.as_deref())
        && compare_version_against_requirement(version, max_version)? == Ordering::Greater
    {
        return Ok(Some(format!(
            "Version '{rendered_version}' is larger than max_version '{max_version}'"
        )));
    }

    Ok(None)
}

fn normalized_version_requirement(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

fn compare_version_against_requirement(
    version: &Version,
    requirement: &str,
) -> RunnerResult<Ordering> {
    let expected = parse_version_requirement(requirement)?;
    let actual = [version.major, version.minor, version.patch];

    for index in 0..actual.len().min(expected.len()) {
        match actual[index].cmp(&expected[index]) {
            Ordering::Equal => continue,
            ordering => return Ok(ordering),
        }
    }

    Ok(Ordering::Equal)
}

fn parse_version_requirement(requirement: &str) -> RunnerResult<Vec<u16>> {
    requirement
        .split('.')
        .map(|segment| parse_version_segment(requirement, segment))
        .collect()
}

fn parse_version_segment(requirement: &str, segment: &str) -> RunnerResult<u16> {
    let digits: String = segment
        .chars()
        .take_while(|ch| ch.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return Err(RunnerFailure::Assertion(format!(
            "invalid version requirement '{requirement}': no numeric prefix in segment '{segment}'"
        )));
    }

    digits.parse::<u16>().map_err(|_| {
        RunnerFailure::Assertion(format!(
            "invalid version requirement '{requirement}': segment '{segment}' is out of range"
        ))
    })
}

fn format_version(version: &Version) -> String {
    format!("{}.{}.{}", version.major, version.minor, version.patch)
}

fn evaluate_expected_error(
    test: &TestCase,
    execution_result: RunnerResult<()>,
) -> RunnerResult<()> {
    let Some(expected_error) = test.error.as_deref() else {
        return execution_result;
    };

    match execution_result {
        Ok(()) => Err(RunnerFailure::Assertion(format!(
            "expected error: {expected_error}, but got no error"
        ))),
        Err(RunnerFailure::Assertion(message)) => Err(RunnerFailure::Assertion(message)),
        Err(actual_error) => {
            let actual_error = actual_error.to_string();
            if actual_error == expected_error.trim() {
                Ok(())
            } else {
                Err(RunnerFailure::Assertion(format!(
                    "expected error: {expected_error}, but got: {actual_error}"
                )))
            }
        }
    }
}

fn validate_direction_expectations(test: &TestCase) -> RunnerResult<()> {
    match (&test.up, &test.down) {
        (Some(_), Some(_)) | (None, None) => Ok(()),
        _ => Err(RunnerFailure::Assertion(
            "`up` and `down` must either both be set or both be omitted".to_string(),
        )),
    }
}

fn assert_expected_sql(
    direction: &str,
    expected: Option<&str>,
    dialect: &dyn Dialect,
    tokens: &[MergerToken],
) -> RunnerResult<()> {
    let actual = render_statements(dialect, tokens)?;
    let Some(expected) = expected else {
        return Ok(());
    };

    if normalize_sql(expected) == normalize_sql(&actual) {
        return Ok(());
    }

    Err(RunnerFailure::Assertion(format!(
        "{direction} SQL mismatch; expected:\n{expected}\nactual:\n{}",
        actual.trim()
    )))
}

fn render_statements(dialect: &dyn Dialect, tokens: &[MergerToken]) -> RunnerResult<String> {
    let mut statements = Vec::<Statement>::new();
    for token in tokens {
        statements.extend(token.statements(dialect)?);
    }
    Ok(Renderer::new(dialect).render(&statements))
}

fn render_token_list(tokens: &[MergerToken]) -> String {
    tokens
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn normalize_sql(sql: &str) -> &str {
    sql.trim()
}
