use tracing::{info, warn};

use crate::{Error, MergerContext, MergerToken, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionPolicy {
    #[default]
    HaltOnFirstError,
    /// Record failures and keep applying the remaining tokens.
    Continue,
}

#[derive(Debug)]
pub struct TokenFailure {
    pub token: MergerToken,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct ExecutionReport {
    pub applied: Vec<MergerToken>,
    pub failures: Vec<TokenFailure>,
}

impl ExecutionReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Applies tokens in order. Transactions belong to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct Executor {
    policy: ExecutionPolicy,
}

impl Executor {
    #[must_use]
    pub const fn new(policy: ExecutionPolicy) -> Self {
        Self { policy }
    }

    pub const fn policy(&self) -> ExecutionPolicy {
        self.policy
    }

    /// Under [`ExecutionPolicy::HaltOnFirstError`] the first failure is
    /// returned as the error; tokens before it stay applied.
    pub fn execute(
        &self,
        tokens: &[MergerToken],
        context: &mut MergerContext<'_>,
    ) -> Result<ExecutionReport> {
        log_tokens(tokens);

        let mut report = ExecutionReport::default();
        for token in tokens {
            match token.execute(context) {
                Ok(()) => report.applied.push(token.clone()),
                Err(error) if self.policy == ExecutionPolicy::Continue => {
                    warn!(token = %token, %error, "token failed, continuing");
                    report.failures.push(TokenFailure {
                        token: token.clone(),
                        error,
                    });
                }
                Err(error) => {
                    warn!(
                        token = %token,
                        applied = report.applied.len(),
                        "token failed, halting"
                    );
                    return Err(error);
                }
            }
        }

        info!(
            applied = report.applied.len(),
            failed = report.failures.len(),
            "merge tokens executed"
        );
        Ok(report)
    }
}

/// Renders one token per line, name padded to 20 columns.
pub fn format_token_line(token: &MergerToken) -> String {
    format!("    {:<20} {}", token.token_name(), token.token_value())
}

pub fn log_tokens(tokens: &[MergerToken]) {
    if tokens.is_empty() {
        info!("no changes detected");
        return;
    }

    info!("detected changes:");
    for token in tokens {
        info!("{}", format_token_line(token));
    }
}
