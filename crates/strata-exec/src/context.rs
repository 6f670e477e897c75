//! Execution context.

use strata_common::config::EngineConfig;
use strata_common::error::{StrataError, StrataResult};
use strata_storage::catalog::{Database, TableHandle};
use strata_storage::persist;

use crate::bindings::Bindings;
use crate::descriptor::ColumnRef;

/// Per-session state: configuration, the current database and the
/// variable bindings.
#[derive(Debug)]
pub struct ExecutionContext {
    pub(crate) config: EngineConfig,
    pub(crate) database: Option<Database>,
    pub(crate) bindings: Bindings,
}

impl ExecutionContext {
    /// Creates a context with no database loaded.
    pub fn new(config: EngineConfig) -> StrataResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            database: None,
            bindings: Bindings::new(),
        })
    }

    /// Creates a context and loads the database persisted under
    /// `config.data_dir`, if any.
    pub fn open(config: EngineConfig) -> StrataResult<Self> {
        let mut ctx = Self::new(config)?;
        ctx.database = persist::restore(&ctx.config.data_dir, &ctx.config)?;
        Ok(ctx)
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns true if a database is loaded.
    #[must_use]
    pub fn has_database(&self) -> bool {
        self.database.is_some()
    }

    /// Returns the current database.
    pub fn database(&self) -> StrataResult<&Database> {
        self.database.as_ref().ok_or(StrataError::NoDatabase)
    }

    /// Returns the current database mutably.
    pub fn database_mut(&mut self) -> StrataResult<&mut Database> {
        self.database.as_mut().ok_or(StrataError::NoDatabase)
    }

    /// Returns the bindings.
    #[must_use]
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Returns the bindings mutably.
    pub fn bindings_mut(&mut self) -> &mut Bindings {
        &mut self.bindings
    }

    /// Resolves the table a column reference names.
    pub(crate) fn resolve_table(&self, column: &ColumnRef) -> StrataResult<TableHandle> {
        let db = self.database()?;
        if let Some(name) = &column.database {
            if name != db.name() {
                return Err(StrataError::invalid_argument(format!(
                    "column {column} names database '{name}' but '{}' is loaded",
                    db.name()
                )));
            }
        }
        db.table(&column.table)
    }
}
