//! Database catalog.
//!
//! A `Database` owns its tables by name. Each table sits behind its own
//! `RwLock`, so readers of one table never wait on a writer of another.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use strata_common::config::EngineConfig;
use strata_common::error::{StrataError, StrataResult};
use tracing::debug;

use crate::table::Table;

/// Shared handle to a table.
pub type TableHandle = Arc<RwLock<Table>>;

/// A named collection of tables.
#[derive(Debug)]
pub struct Database {
    name: String,
    tables: HashMap<String, TableHandle>,
    /// Table names in creation order.
    order: Vec<String>,
    config: EngineConfig,
}

impl Database {
    /// Creates an empty database.
    #[must_use]
    pub fn new(name: impl Into<String>, config: EngineConfig) -> Self {
        Self {
            name: name.into(),
            tables: HashMap::new(),
            order: Vec::new(),
            config,
        }
    }

    /// Returns the database name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the configuration new tables are created with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Creates a table with `column_count` declared columns.
    pub fn create_table(
        &mut self,
        name: impl Into<String>,
        column_count: usize,
    ) -> StrataResult<TableHandle> {
        let name = name.into();
        if self.tables.contains_key(&name) {
            return Err(StrataError::TableExists { table: name });
        }

        let table = Table::new(name.clone(), column_count, self.config.clone())?;
        let handle = Arc::new(RwLock::new(table));
        self.insert_table(name, Arc::clone(&handle));
        debug!(database = %self.name, columns = column_count, "created table");
        Ok(handle)
    }

    /// Adds an already built table.
    pub(crate) fn attach_table(&mut self, table: Table) -> StrataResult<()> {
        let name = table.name().to_string();
        if self.tables.contains_key(&name) {
            return Err(StrataError::TableExists { table: name });
        }
        self.insert_table(name, Arc::new(RwLock::new(table)));
        Ok(())
    }

    fn insert_table(&mut self, name: String, handle: TableHandle) {
        self.order.push(name.clone());
        self.tables.insert(name, handle);
    }

    /// Looks up a table by name.
    pub fn table(&self, name: &str) -> StrataResult<TableHandle> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| StrataError::TableNotFound {
                table: name.to_string(),
            })
    }

    /// Returns true if the table exists.
    #[must_use]
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Table names in creation order.
    #[must_use]
    pub fn table_names(&self) -> &[String] {
        &self.order
    }

    /// Tables in creation order.
    pub fn tables(&self) -> impl Iterator<Item = &TableHandle> {
        self.order.iter().filter_map(|name| self.tables.get(name))
    }

    /// Number of tables.
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.order.len()
    }
}
