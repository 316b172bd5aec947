/// Connection Management Module
///
/// Provider and connection contracts for the stored-procedure layer, and the
/// SQLite provider. SQLite has no stored procedures, so the provider keeps a
/// catalog of named SQL bodies and runs the matching body for a
/// stored-procedure command.

use crate::core::db::dialect::{split_identifier, Dialect};
use crate::core::db::query::ProcedureExecutor;
use crate::core::{CommandType, DbAutoFillError, DbCommand, DbRow, Result};
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// An open connection able to run commands.
///
/// Dropping the connection releases it.
pub trait DbConnection {
    /// Executes `command` and returns every row it produced.
    fn execute(&mut self, command: &DbCommand) -> Result<Vec<DbRow>>;
}

/// Connection factory for one database vendor.
pub trait DbProvider {
    type Connection: DbConnection;

    /// Quoting convention used for procedure names.
    fn dialect(&self) -> Dialect;

    /// Opens a new connection.
    ///
    /// # Errors
    ///
    /// Returns `DbAutoFillError::Connection` if the connection cannot be opened.
    fn open(&self, connection_string: &str) -> Result<Self::Connection>;
}

/// A named SQL body standing in for a stored procedure.
#[derive(Debug, Clone, PartialEq)]
pub struct Procedure {
    pub name: String,
    pub sql: String,
}

/// Procedures known to a SQLite provider, looked up case-insensitively like
/// SQLite identifiers.
#[derive(Debug, Clone, Default)]
pub struct ProcedureCatalog {
    procedures: HashMap<String, Procedure>,
}

impl ProcedureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_procedure(mut self, name: &str, sql: &str) -> Self {
        self.insert(name, sql);
        self
    }

    /// Adds or replaces a procedure.
    pub fn insert(&mut self, name: &str, sql: &str) {
        self.procedures.insert(
            name.to_lowercase(),
            Procedure {
                name: name.to_string(),
                sql: sql.to_string(),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&Procedure> {
        self.procedures.get(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }

    /// Procedure names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.procedures.values().map(|p| p.name.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// SQLite provider backed by a procedure catalog.
#[derive(Debug, Clone)]
pub struct SqliteProvider {
    catalog: Arc<ProcedureCatalog>,
    setup: Option<String>,
}

impl SqliteProvider {
    pub fn new(catalog: ProcedureCatalog) -> Self {
        SqliteProvider {
            catalog: Arc::new(catalog),
            setup: None,
        }
    }

    /// SQL batch run on every newly opened connection, e.g. to seed an
    /// in-memory database.
    pub fn with_setup(mut self, sql: impl Into<String>) -> Self {
        self.setup = Some(sql.into());
        self
    }

    pub fn catalog(&self) -> &ProcedureCatalog {
        &self.catalog
    }
}

impl DbProvider for SqliteProvider {
    type Connection = SqliteConnection;

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn open(&self, connection_string: &str) -> Result<SqliteConnection> {
        let conn = Connection::open(connection_string).map_err(|e| {
            DbAutoFillError::Connection(format!("Failed to open '{}': {}", connection_string, e))
        })?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| DbAutoFillError::Connection(format!("Failed to initialize connection: {}", e)))?;

        if let Some(setup) = &self.setup {
            conn.execute_batch(setup)
                .map_err(|e| DbAutoFillError::Connection(format!("Setup script failed: {}", e)))?;
        }

        debug!(path = connection_string, "opened SQLite connection");
        Ok(SqliteConnection {
            conn,
            catalog: Arc::clone(&self.catalog),
        })
    }
}

/// An open SQLite connection.
#[derive(Debug)]
pub struct SqliteConnection {
    conn: Connection,
    catalog: Arc<ProcedureCatalog>,
}

impl SqliteConnection {
    /// Resolves the SQL body for a quoted, possibly schema-qualified
    /// procedure name. Only the last name part is used for lookup.
    fn procedure_sql(&self, quoted_name: &str) -> Result<&str> {
        let parts = split_identifier(quoted_name);
        let name = parts.last().map(String::as_str).unwrap_or_default();

        self.catalog
            .get(name)
            .map(|p| p.sql.as_str())
            .ok_or_else(|| DbAutoFillError::Execution(format!("Unknown procedure '{}'", quoted_name)))
    }
}

impl DbConnection for SqliteConnection {
    fn execute(&mut self, command: &DbCommand) -> Result<Vec<DbRow>> {
        let sql = match command.command_type {
            CommandType::StoredProcedure => self.procedure_sql(&command.text)?,
            CommandType::Text => command.text.as_str(),
        };

        ProcedureExecutor::new(&self.conn).execute(sql, &command.parameters)
    }
}
