use tracing::info;

use crate::{
    ConnectionConfig, DataMap, DatabaseAdapter, DbMerger, Dialect, Direction, ExecutionPolicy,
    ExecutionReport, Executor, MergerContext, MergerOptions, MergerToken, Renderer, Result,
    TokenFactory, to_model_tokens,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Change the database to match the model.
    Apply,
    /// Render the statements `Apply` would run.
    DryRun,
    /// Change the model to match the database.
    Import,
}

#[derive(Clone)]
pub struct SyncOptions {
    pub mode: Mode,
    pub policy: ExecutionPolicy,
    /// `direction` is implied by `mode` and ignored.
    pub merger: MergerOptions,
}

impl SyncOptions {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            policy: ExecutionPolicy::default(),
            merger: MergerOptions::default(),
        }
    }
}

#[derive(Debug)]
pub enum OrchestratorOutput {
    Applied(ExecutionReport),
    DryRunSql(String),
    Imported(ExecutionReport),
}

/// Introspects a database, merges it with a model and applies the result.
pub struct Orchestrator<'a> {
    dialect: &'a dyn Dialect,
}

impl<'a> Orchestrator<'a> {
    #[must_use]
    pub const fn new(dialect: &'a dyn Dialect) -> Self {
        Self { dialect }
    }

    pub fn run(
        &self,
        connection_config: &ConnectionConfig,
        model: &mut DataMap,
        options: &SyncOptions,
    ) -> Result<OrchestratorOutput> {
        let mut adapter = self.dialect.connect(connection_config)?;
        self.run_with_adapter(adapter.as_mut(), model, options)
    }

    /// With [`ExecutionPolicy::HaltOnFirstError`], `Apply` runs every token in
    /// one transaction that is rolled back on failure. With
    /// [`ExecutionPolicy::Continue`] each token commits on its own.
    pub fn run_with_adapter(
        &self,
        adapter: &mut dyn DatabaseAdapter,
        model: &mut DataMap,
        options: &SyncOptions,
    ) -> Result<OrchestratorOutput> {
        let factory = TokenFactory::new(self.dialect);
        let merger = DbMerger::builder(factory)
            .options(MergerOptions {
                direction: Direction::ToDb,
                ..options.merger.clone()
            })
            .build()?;

        let database = adapter.load_schema(&options.merger.filters)?;
        let tokens = merger.merge(model, &database)?;
        info!(
            dialect = self.dialect.name(),
            mode = ?options.mode,
            tokens = tokens.len(),
            "schema merge planned"
        );

        match options.mode {
            Mode::DryRun => Ok(OrchestratorOutput::DryRunSql(
                Renderer::new(self.dialect).render_tokens(&tokens)?,
            )),
            Mode::Apply => {
                let report = self.apply(adapter, model, &tokens, options)?;
                Ok(OrchestratorOutput::Applied(report))
            }
            Mode::Import => {
                let import = to_model_tokens(&tokens, &factory);
                let mut context = MergerContext::new(self.dialect, model)
                    .with_name_matching(options.merger.name_matching);
                let report = Executor::new(options.policy).execute(&import, &mut context)?;
                Ok(OrchestratorOutput::Imported(report))
            }
        }
    }

    fn apply(
        &self,
        adapter: &mut dyn DatabaseAdapter,
        model: &mut DataMap,
        tokens: &[MergerToken],
        options: &SyncOptions,
    ) -> Result<ExecutionReport> {
        let executor = Executor::new(options.policy);
        if options.policy == ExecutionPolicy::Continue {
            let mut context = MergerContext::new(self.dialect, model).with_adapter(&*adapter);
            return executor.execute(tokens, &mut context);
        }

        let transaction = adapter.begin()?;
        let report = {
            let mut context =
                MergerContext::new(self.dialect, model).with_adapter(transaction.adapter());
            executor.execute(tokens, &mut context)?
        };
        transaction.commit()?;
        Ok(report)
    }
}
