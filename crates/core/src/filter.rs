use regex::Regex;

use crate::{ConfigError, Dialect, QualifiedName};

/// Include/exclude rules for names. An empty include list admits every name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatternFilter {
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
}

impl PatternFilter {
    pub fn include(pattern: impl Into<String>) -> Self {
        Self {
            includes: vec![pattern.into()],
            excludes: Vec::new(),
        }
    }

    pub fn exclude(pattern: impl Into<String>) -> Self {
        Self {
            includes: Vec::new(),
            excludes: vec![pattern.into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeTableFilter {
    pub pattern: String,
    pub columns: PatternFilter,
}

impl IncludeTableFilter {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            columns: PatternFilter::default(),
        }
    }

    #[must_use]
    pub fn with_columns(mut self, columns: PatternFilter) -> Self {
        self.columns = columns;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableFilter {
    pub includes: Vec<IncludeTableFilter>,
    pub excludes: Vec<String>,
}

impl TableFilter {
    pub fn include_all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn including(mut self, include: IncludeTableFilter) -> Self {
        self.includes.push(include);
        self
    }

    #[must_use]
    pub fn excluding(mut self, pattern: impl Into<String>) -> Self {
        self.excludes.push(pattern.into());
        self
    }
}

/// A `None` name matches any schema.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaFilter {
    pub name: Option<String>,
    pub tables: TableFilter,
}

/// A `None` name matches any catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFilter {
    pub name: Option<String>,
    pub schemas: Vec<SchemaFilter>,
}

impl Default for CatalogFilter {
    fn default() -> Self {
        Self {
            name: None,
            schemas: vec![SchemaFilter::default()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiltersConfig {
    pub catalogs: Vec<CatalogFilter>,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self::include_all()
    }
}

impl FiltersConfig {
    pub fn include_all() -> Self {
        Self {
            catalogs: vec![CatalogFilter::default()],
        }
    }

    pub fn for_tables(tables: TableFilter) -> Self {
        Self {
            catalogs: vec![CatalogFilter {
                name: None,
                schemas: vec![SchemaFilter { name: None, tables }],
            }],
        }
    }

    /// Names of explicitly requested schemas, for introspection queries.
    pub fn schema_names(&self) -> Vec<&str> {
        self.catalogs
            .iter()
            .flat_map(|catalog| catalog.schemas.iter())
            .filter_map(|schema| schema.name.as_deref())
            .collect()
    }

    pub fn catalog_names(&self) -> Vec<&str> {
        self.catalogs
            .iter()
            .filter_map(|catalog| catalog.name.as_deref())
            .collect()
    }

    /// Rejects qualifiers the dialect cannot introspect and malformed patterns.
    pub fn validate(&self, dialect: &dyn Dialect) -> Result<EntityFilters, ConfigError> {
        if !dialect.supports_catalogs()
            && let Some(catalog) = self.catalog_names().first()
        {
            return Err(ConfigError::CatalogsNotSupported {
                dialect: dialect.name().to_string(),
                catalog: (*catalog).to_string(),
            });
        }
        if !dialect.supports_schemas()
            && let Some(schema) = self.schema_names().first()
        {
            return Err(ConfigError::SchemasNotSupported {
                dialect: dialect.name().to_string(),
                schema: (*schema).to_string(),
            });
        }
        EntityFilters::compile(self)
    }
}

/// Compiled form of [`FiltersConfig`]; pure predicates over qualified names.
#[derive(Debug, Clone)]
pub struct EntityFilters {
    catalogs: Vec<CompiledCatalog>,
}

#[derive(Debug, Clone)]
struct CompiledCatalog {
    name: Option<String>,
    schemas: Vec<CompiledSchema>,
}

#[derive(Debug, Clone)]
struct CompiledSchema {
    name: Option<String>,
    tables: CompiledTableFilter,
}

#[derive(Debug, Clone)]
struct CompiledTableFilter {
    includes: Vec<(Regex, CompiledPatternFilter)>,
    excludes: Vec<Regex>,
}

#[derive(Debug, Clone)]
struct CompiledPatternFilter {
    includes: Vec<Regex>,
    excludes: Vec<Regex>,
}

impl EntityFilters {
    pub fn compile(config: &FiltersConfig) -> Result<Self, ConfigError> {
        let catalogs = config
            .catalogs
            .iter()
            .map(|catalog| {
                let schemas = catalog
                    .schemas
                    .iter()
                    .map(|schema| {
                        Ok(CompiledSchema {
                            name: schema.name.clone(),
                            tables: CompiledTableFilter::compile(&schema.tables)?,
                        })
                    })
                    .collect::<Result<Vec<_>, ConfigError>>()?;
                Ok(CompiledCatalog {
                    name: catalog.name.clone(),
                    schemas,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self { catalogs })
    }

    pub fn include_all() -> Self {
        Self {
            catalogs: vec![CompiledCatalog {
                name: None,
                schemas: vec![CompiledSchema {
                    name: None,
                    tables: CompiledTableFilter {
                        includes: Vec::new(),
                        excludes: Vec::new(),
                    },
                }],
            }],
        }
    }

    pub fn is_table_included(&self, table: &QualifiedName) -> bool {
        self.table_filter(table)
            .is_some_and(|filter| filter.include_for(&table.name).is_some())
    }

    pub fn is_column_included(&self, table: &QualifiedName, column: &str) -> bool {
        self.table_filter(table)
            .and_then(|filter| filter.include_for(&table.name))
            .flatten()
            .is_none_or(|columns| columns.is_included(column))
    }

    fn table_filter(&self, table: &QualifiedName) -> Option<&CompiledTableFilter> {
        let catalog = self
            .catalogs
            .iter()
            .find(|catalog| qualifier_matches(catalog.name.as_deref(), table.catalog.as_deref()))?;
        catalog
            .schemas
            .iter()
            .find(|schema| qualifier_matches(schema.name.as_deref(), table.schema.as_deref()))
            .map(|schema| &schema.tables)
    }
}

impl Default for EntityFilters {
    fn default() -> Self {
        Self::include_all()
    }
}

impl CompiledTableFilter {
    fn compile(filter: &TableFilter) -> Result<Self, ConfigError> {
        let includes = filter
            .includes
            .iter()
            .map(|include| {
                Ok((
                    compile_pattern(&include.pattern)?,
                    CompiledPatternFilter::compile(&include.columns)?,
                ))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self {
            includes,
            excludes: compile_patterns(&filter.excludes)?,
        })
    }

    /// Column filter of the first include matching `table`, or `None` when
    /// the table is not admitted.
    fn include_for(&self, table: &str) -> Option<Option<&CompiledPatternFilter>> {
        if self.excludes.iter().any(|pattern| pattern.is_match(table)) {
            return None;
        }
        if self.includes.is_empty() {
            return Some(None);
        }
        self.includes
            .iter()
            .find(|(pattern, _)| pattern.is_match(table))
            .map(|(_, columns)| Some(columns))
    }
}

impl CompiledPatternFilter {
    fn compile(filter: &PatternFilter) -> Result<Self, ConfigError> {
        Ok(Self {
            includes: compile_patterns(&filter.includes)?,
            excludes: compile_patterns(&filter.excludes)?,
        })
    }

    fn is_included(&self, name: &str) -> bool {
        if self.excludes.iter().any(|pattern| pattern.is_match(name)) {
            return false;
        }
        self.includes.is_empty() || self.includes.iter().any(|pattern| pattern.is_match(name))
    }
}

/// A qualifier missing on either side matches, as in `QualifiedName::matches`.
fn qualifier_matches(filter: Option<&str>, actual: Option<&str>) -> bool {
    match filter {
        None => true,
        Some(expected) => actual.is_none_or(|actual| actual.eq_ignore_ascii_case(expected)),
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns.iter().map(|pattern| compile_pattern(pattern)).collect()
}

/// Patterns must match the whole name.
fn compile_pattern(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|source| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
