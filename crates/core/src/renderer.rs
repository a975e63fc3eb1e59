use crate::{Dialect, MergerToken, Result, Statement};

const SKIPPED_HEADER: &str = "-- Tokens without database statements:";

/// Renders statements as a SQL script, e.g. for dry runs.
pub struct Renderer<'a> {
    dialect: &'a dyn Dialect,
}

impl<'a> Renderer<'a> {
    #[must_use]
    pub const fn new(dialect: &'a dyn Dialect) -> Self {
        Self { dialect }
    }

    #[must_use]
    pub fn render(&self, statements: &[Statement]) -> String {
        let mut rendered = String::new();
        for statement in statements {
            self.push_statement(&mut rendered, statement);
        }
        rendered
    }

    /// One commented block per token. Tokens that produce no statements are
    /// listed in a header instead.
    pub fn render_tokens(&self, tokens: &[MergerToken]) -> Result<String> {
        let mut skipped = Vec::new();
        let mut body = String::new();

        for token in tokens {
            let statements = token.statements(self.dialect)?;
            if statements.is_empty() {
                skipped.push(token.to_string());
                continue;
            }

            body.push_str("-- ");
            body.push_str(&token.to_string());
            body.push('\n');
            for statement in &statements {
                self.push_statement(&mut body, statement);
            }
            self.push_batch_separator(&mut body);
        }

        let mut rendered = String::new();
        if !skipped.is_empty() {
            rendered.push_str(SKIPPED_HEADER);
            rendered.push('\n');
            for token in skipped {
                rendered.push_str("--   ");
                rendered.push_str(&token);
                rendered.push('\n');
            }
            rendered.push('\n');
        }
        rendered.push_str(&body);
        Ok(rendered)
    }

    fn push_statement(&self, rendered: &mut String, statement: &Statement) {
        match statement {
            Statement::Sql { sql } => {
                rendered.push_str(sql);
                if !sql.trim_end().ends_with(';') {
                    rendered.push(';');
                }
                rendered.push('\n');
            }
            Statement::BatchBoundary => self.push_batch_separator(rendered),
        }
    }

    fn push_batch_separator(&self, rendered: &mut String) {
        let separator = self.dialect.batch_separator();
        if separator.is_empty() {
            return;
        }

        rendered.push_str(separator);
        if !separator.ends_with('\n') {
            rendered.push('\n');
        }
    }
}
