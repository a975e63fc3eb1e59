use tracing::debug;

use crate::{
    Dialect, Error, ExecutionError, MergerContext, MergerToken, Result, Statement, TokenOp,
    factory::foreign_key_required,
};

pub(super) fn statements(op: &TokenOp, dialect: &dyn Dialect) -> Result<Vec<Statement>> {
    match op {
        TokenOp::AddRelationship { relationship, .. }
        | TokenOp::DropRelationship { relationship, .. }
            if !foreign_key_required(dialect, relationship) =>
        {
            Ok(Vec::new())
        }
        TokenOp::SetValueForNull { value: None, .. } => Ok(Vec::new()),
        _ => dialect.generate_ddl(op),
    }
}

pub(super) fn execute(token: &MergerToken, context: &mut MergerContext<'_>) -> Result<()> {
    let statements = statements(token.op(), context.dialect())?;
    if statements.is_empty() {
        debug!(token = %token, "no statements to run");
        return Ok(());
    }

    let adapter = context
        .adapter()
        .ok_or_else(|| ExecutionError::NoConnection {
            token: token.to_string(),
        })?;

    for (index, statement) in statements.iter().enumerate() {
        let Some(sql) = statement.as_sql() else {
            continue;
        };
        debug!(token = token.token_name(), target = %token.op().target(), sql, "executing");
        adapter
            .execute(sql)
            .map_err(|error| attach_token(error, token, index))?;
    }

    Ok(())
}

fn attach_token(error: Error, token: &MergerToken, index: usize) -> Error {
    match error {
        Error::Execute(error) => {
            Error::Execute(error.with_token(token.token_name(), &token.op().target(), index))
        }
        other => other,
    }
}
