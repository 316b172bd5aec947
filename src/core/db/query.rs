/// Query Execution Module
///
/// Runs a SQL body on a SQLite connection with a command's named parameters
/// and collects the result rows.

use crate::core::{DbAutoFillError, DbParameterCollection, DbRow, DbValue, Result};
use rusqlite::Connection;
use tracing::{debug, trace};

/// Prefixes SQLite accepts for named parameters.
const PARAMETER_PREFIXES: [char; 3] = [':', '@', '$'];

/// Procedure execution service that operates on a database connection
pub struct ProcedureExecutor<'a> {
    connection: &'a Connection,
}

impl<'a> ProcedureExecutor<'a> {
    /// Creates a new ProcedureExecutor for the given connection
    pub fn new(connection: &'a Connection) -> Self {
        ProcedureExecutor { connection }
    }

    /// Executes `sql` with `parameters` bound by name.
    ///
    /// A parameter named `Id` matches `:Id`, `@Id` or `$Id` in the SQL.
    /// Parameters the SQL does not reference are ignored, and storage-kind
    /// hints are applied before binding.
    ///
    /// # Errors
    ///
    /// Returns `DbAutoFillError::Execution` if the statement cannot be
    /// prepared or run, and `DbAutoFillError::TypeConversion` if a value does
    /// not fit its kind hint.
    pub fn execute(&self, sql: &str, parameters: &DbParameterCollection) -> Result<Vec<DbRow>> {
        let mut stmt = self
            .connection
            .prepare(sql)
            .map_err(|e| DbAutoFillError::Execution(format!("Failed to prepare statement: {}", e)))?;

        for parameter in parameters {
            let index = match self.parameter_index(&stmt, &parameter.name)? {
                Some(index) => index,
                None => {
                    trace!(parameter = %parameter.name, "parameter not referenced by statement");
                    continue;
                }
            };

            let value = match parameter.db_type {
                Some(kind) => parameter.value.clone().with_kind(kind)?,
                None => parameter.value.clone(),
            };

            stmt.raw_bind_parameter(index, &value)
                .map_err(|e| DbAutoFillError::Execution(format!("Failed to bind '{}': {}", parameter.name, e)))?;
        }

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let column_count = columns.len();

        let mut results = Vec::new();
        let mut rows = stmt.raw_query();
        while let Some(row) = rows
            .next()
            .map_err(|e| DbAutoFillError::Execution(format!("Query execution failed: {}", e)))?
        {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                let value_ref = row
                    .get_ref(i)
                    .map_err(|e| DbAutoFillError::Execution(format!("Result processing failed: {}", e)))?;
                values.push(DbValue::from(value_ref));
            }
            results.push(DbRow::new(columns.clone(), values));
        }

        debug!(rows = results.len(), "statement executed");
        Ok(results)
    }

    fn parameter_index(&self, stmt: &rusqlite::Statement<'_>, name: &str) -> Result<Option<usize>> {
        for prefix in PARAMETER_PREFIXES {
            let index = stmt
                .parameter_index(&format!("{}{}", prefix, name))
                .map_err(|e| DbAutoFillError::Execution(format!("Invalid parameter name '{}': {}", name, e)))?;
            if index.is_some() {
                return Ok(index);
            }
        }
        Ok(None)
    }
}
