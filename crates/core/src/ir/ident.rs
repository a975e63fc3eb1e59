use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub name: String,
}

impl QualifiedName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            catalog: None,
            schema: None,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Qualifiers absent on either side act as wildcards.
    pub fn matches(&self, other: &Self, matching: NameMatching) -> bool {
        matching.eq(&self.name, &other.name)
            && qualifier_matches(self.schema.as_deref(), other.schema.as_deref(), matching)
            && qualifier_matches(self.catalog.as_deref(), other.catalog.as_deref(), matching)
    }

    pub fn matches_exactly(&self, other: &Self, matching: NameMatching) -> bool {
        matching.eq(&self.name, &other.name)
            && matching.eq_optional(self.schema.as_deref(), other.schema.as_deref())
            && matching.eq_optional(self.catalog.as_deref(), other.catalog.as_deref())
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn qualifier_matches(left: Option<&str>, right: Option<&str>, matching: NameMatching) -> bool {
    match (left, right) {
        (Some(left), Some(right)) => matching.eq(left, right),
        _ => true,
    }
}

/// How table, column and qualifier names are compared while merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameMatching {
    #[default]
    CaseInsensitive,
    CaseSensitive,
}

impl NameMatching {
    pub fn key(self, name: &str) -> String {
        match self {
            Self::CaseInsensitive => name.to_uppercase(),
            Self::CaseSensitive => name.to_string(),
        }
    }

    pub fn eq(self, left: &str, right: &str) -> bool {
        match self {
            Self::CaseInsensitive => left.to_uppercase() == right.to_uppercase(),
            Self::CaseSensitive => left == right,
        }
    }

    fn eq_optional(self, left: Option<&str>, right: Option<&str>) -> bool {
        match (left, right) {
            (Some(left), Some(right)) => self.eq(left, right),
            (None, None) => true,
            _ => false,
        }
    }
}
