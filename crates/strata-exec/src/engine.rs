//! Operator dispatch.

use strata_common::error::{StrataError, StrataResult};
use strata_common::types::{AggregateOp, ArithOp, IndexKind, ValueRange};
use strata_storage::catalog::Database;
use strata_storage::persist;
use tracing::{debug, info};

use crate::context::ExecutionContext;
use crate::descriptor::{ColumnRef, Operand, OperatorDescriptor};
use crate::operators;
use crate::result::{ResultVector, StatementResult};

impl ExecutionContext {
    /// Executes one operator to completion.
    ///
    /// Catalog errors leave the database unchanged. Outputs are bound only
    /// when the operator succeeds.
    pub fn execute(&mut self, op: OperatorDescriptor) -> StrataResult<StatementResult> {
        debug!(operator = op.name(), "dispatch");

        match op {
            OperatorDescriptor::CreateDatabase { name } => self.create_database(name),
            OperatorDescriptor::CreateTable { name, column_count } => {
                self.database_mut()?.create_table(name.as_str(), column_count)?;
                Ok(StatementResult::ddl(format!("create table {name}")))
            }
            OperatorDescriptor::CreateColumn { column, sorted } => {
                self.resolve_table(&column)?
                    .write()
                    .add_column(column.column.as_str(), sorted)?;
                Ok(StatementResult::ddl(format!("create column {column}")))
            }
            OperatorDescriptor::CreateIndex { column, kind } => self.create_index(&column, kind),
            OperatorDescriptor::Insert { table, values } => {
                let handle = self.database()?.table(&table)?;
                let position = handle.write().insert_row(&values)?;
                Ok(StatementResult::Insert { position })
            }
            OperatorDescriptor::BulkLoad { table, rows } => {
                let handle = self.database()?.table(&table)?;
                let loaded = handle.write().bulk_load(&rows)?;
                Ok(StatementResult::BulkLoad {
                    rows_affected: loaded as u64,
                })
            }
            OperatorDescriptor::Select {
                output,
                column,
                range,
            } => self.select(output, &column, range),
            OperatorDescriptor::SelectPositions {
                output,
                positions,
                values,
                range,
            } => {
                let result = operators::select_positions(
                    self.bindings.positions(&positions)?,
                    self.bindings.values(&values)?,
                    range,
                )?;
                Ok(self.bind(output, ResultVector::Positions(result)))
            }
            OperatorDescriptor::Fetch {
                output,
                column,
                positions,
            } => self.fetch(output, &column, &positions),
            OperatorDescriptor::Aggregate { output, source, op } => {
                self.aggregate(output, &source, op)
            }
            OperatorDescriptor::Arithmetic {
                output,
                left,
                right,
                op,
            } => self.arithmetic(output, &left, &right, op),
            OperatorDescriptor::Join {
                left_output,
                right_output,
                left_values,
                left_positions,
                right_values,
                right_positions,
            } => {
                let joined = operators::block_nested_loop_join(
                    self.bindings.values(&left_values)?,
                    self.bindings.positions(&left_positions)?,
                    self.bindings.values(&right_values)?,
                    self.bindings.positions(&right_positions)?,
                    self.config.join_block_len(),
                )?;
                self.bindings
                    .bind(left_output.as_str(), ResultVector::Positions(joined.left));
                self.bindings
                    .bind(right_output.as_str(), ResultVector::Positions(joined.right));
                Ok(StatementResult::Bound {
                    names: vec![left_output, right_output],
                })
            }
            OperatorDescriptor::Sync => self.sync(),
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    fn create_database(&mut self, name: String) -> StrataResult<StatementResult> {
        if let Some(db) = &self.database {
            return Err(StrataError::DatabaseExists {
                name: db.name().to_string(),
            });
        }
        self.database = Some(Database::new(name.as_str(), self.config.clone()));
        info!(database = %name, "created database");
        Ok(StatementResult::ddl(format!("create database {name}")))
    }

    fn create_index(&mut self, column: &ColumnRef, kind: IndexKind) -> StrataResult<StatementResult> {
        self.resolve_table(column)?
            .write()
            .create_index(&column.column, kind)?;
        Ok(StatementResult::ddl(format!("create {kind} index on {column}")))
    }

    fn sync(&mut self) -> StrataResult<StatementResult> {
        let db = self.database()?;
        let tables = db.table_count();
        persist::sync(db, &self.config.data_dir)?;
        self.database = None;
        self.bindings.clear();
        Ok(StatementResult::Sync { tables })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    fn select(
        &mut self,
        output: String,
        column: &ColumnRef,
        range: ValueRange,
    ) -> StrataResult<StatementResult> {
        let handle = self.resolve_table(column)?;
        let table = handle.read();
        let positions = operators::select_column(table.column(&column.column)?, range);
        drop(table);
        Ok(self.bind(output, ResultVector::Positions(positions)))
    }

    fn fetch(
        &mut self,
        output: String,
        column: &ColumnRef,
        positions: &str,
    ) -> StrataResult<StatementResult> {
        let handle = self.resolve_table(column)?;
        let table = handle.read();
        let values = operators::fetch(
            table.column(&column.column)?,
            self.bindings.positions(positions)?,
        )?;
        drop(table);
        Ok(self.bind(output, ResultVector::Values(values)))
    }

    fn aggregate(
        &mut self,
        output: String,
        source: &Operand,
        op: AggregateOp,
    ) -> StrataResult<StatementResult> {
        let result = match source {
            Operand::Column(column) => {
                let handle = self.resolve_table(column)?;
                let table = handle.read();
                let stored = table.column(&column.column)?;
                operators::aggregate_column(stored, op)
            }
            Operand::Variable(name) => match self.bindings.get(name)? {
                ResultVector::Values(v) => operators::aggregate_values(v, op),
                ResultVector::Longs(v) => operators::aggregate_longs(v, op),
                other => {
                    return Err(StrataError::TypeMismatch {
                        expected: "values",
                        actual: other.type_name(),
                    })
                }
            },
        };
        Ok(self.bind(output, result))
    }

    fn arithmetic(
        &mut self,
        output: String,
        left: &str,
        right: &str,
        op: ArithOp,
    ) -> StrataResult<StatementResult> {
        let result = operators::arithmetic(
            self.bindings.values(left)?,
            self.bindings.values(right)?,
            op,
        )?;
        Ok(self.bind(output, ResultVector::Longs(result)))
    }

    fn bind(&mut self, output: String, value: ResultVector) -> StatementResult {
        self.bindings.bind(output.as_str(), value);
        StatementResult::bound(output)
    }
}
