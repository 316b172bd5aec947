/// Command Helper Module
///
/// Stored-procedure invocation on top of a provider: builds the quoted
/// procedure name, binds inputs through the binding engine, fills one fresh
/// result object per row, and reports every failure inside a `DbResponse`.

use crate::binding::{add_anonymous_parameter, fill_object, fill_parameters, AnonymousParameter, DbModel};
use crate::core::db::connection::{DbConnection, DbProvider};
use crate::core::db::dialect::{format_procedure_name, CaseTransform};
use crate::core::db::response::DbResponse;
use crate::core::{DbAutoFillError, DbCommand, DbRow, Result};
use tracing::{debug, error, warn};

/// Calls stored procedures through a provider.
///
/// None of the `execute*` methods return an error: connection, execution and
/// binding failures all come back as an error-carrying `DbResponse`.
#[derive(Debug)]
pub struct CommandHelper<P: DbProvider> {
    provider: P,
    connection_string: String,
    base_command: String,
    case_transform: CaseTransform,
}

impl<P: DbProvider> CommandHelper<P> {
    /// Creates a helper and checks that a connection can be opened.
    ///
    /// # Errors
    ///
    /// - `DbAutoFillError::InvalidArgument` if the connection string is blank
    ///   or the connection cannot be opened
    /// - `DbAutoFillError::Config` if the dialect yields an empty name template
    pub fn new(provider: P, connection_string: &str, schema: Option<&str>) -> Result<Self> {
        if connection_string.trim().is_empty() {
            return Err(DbAutoFillError::InvalidArgument(
                "Connection string must not be empty.".to_string(),
            ));
        }

        let base_command = provider.dialect().base_command(schema);
        if base_command.trim().is_empty() {
            return Err(DbAutoFillError::Config(format!(
                "Base command string was invalid for dialect {:?}.",
                provider.dialect()
            )));
        }

        provider.open(connection_string).map_err(|e| {
            DbAutoFillError::InvalidArgument(format!(
                "Connection string appears to be invalid: couldn't open connection. {}",
                e
            ))
        })?;

        Ok(CommandHelper {
            provider,
            connection_string: connection_string.to_string(),
            base_command,
            case_transform: CaseTransform::None,
        })
    }

    pub fn with_case_transform(mut self, case_transform: CaseTransform) -> Self {
        self.case_transform = case_transform;
        self
    }

    pub fn case_transform(&self) -> CaseTransform {
        self.case_transform
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Quoted, case-folded name the procedure is invoked under.
    pub fn procedure_name(&self, name: &str) -> String {
        format_procedure_name(&self.base_command, name, self.case_transform)
    }

    /// Runs `name` with the outbound members of `input` as parameters.
    pub fn execute<I, R>(&self, name: &str, input: &I) -> DbResponse<R>
    where
        I: DbModel,
        R: DbModel + Default,
    {
        self.run(name, |command| fill_parameters(command, input), fill_fresh)
    }

    /// Runs `name` with one parameter per named value.
    ///
    /// An empty `inputs` slice is rejected; use `execute_without_parameters`
    /// for procedures that take none.
    pub fn execute_with_values<R>(&self, name: &str, inputs: &[&dyn AnonymousParameter]) -> DbResponse<R>
    where
        R: DbModel + Default,
    {
        if inputs.is_empty() {
            return DbResponse::failure(
                format!("Argument inputs must not be empty. Caller: {}", name),
                DbAutoFillError::InvalidArgument("inputs".to_string()),
            );
        }
        self.run(name, |command| bind_values(command, inputs), fill_fresh)
    }

    /// Runs `name` with no parameters.
    pub fn execute_without_parameters<R>(&self, name: &str) -> DbResponse<R>
    where
        R: DbModel + Default,
    {
        self.run(name, |_| Ok(()), fill_fresh)
    }

    /// Runs `name` with named values and returns the raw rows.
    pub fn query_rows(&self, name: &str, inputs: &[&dyn AnonymousParameter]) -> DbResponse<DbRow> {
        self.run(name, |command| bind_values(command, inputs), Ok)
    }

    fn run<R, B, C>(&self, caller: &str, bind: B, mut collect: C) -> DbResponse<R>
    where
        B: FnOnce(&mut DbCommand) -> Result<()>,
        C: FnMut(DbRow) -> Result<R>,
    {
        let procedure = self.procedure_name(caller);

        let mut connection = match self.provider.open(&self.connection_string) {
            Ok(connection) => connection,
            Err(e) => {
                warn!(caller, error = %e, "couldn't open connection");
                return DbResponse::failure(
                    format!("Couldn't open connection to database. Caller: {}", caller),
                    e,
                );
            }
        };

        let mut command = DbCommand::stored_procedure(procedure.clone());
        let outcome = bind(&mut command)
            .and_then(|_| connection.execute(&command))
            .and_then(|rows| rows.into_iter().map(&mut collect).collect::<Result<Vec<R>>>());

        match outcome {
            Ok(results) => {
                debug!(procedure = %procedure, rows = results.len(), "procedure call succeeded");
                DbResponse::success(results)
            }
            Err(e) => {
                error!(procedure = %procedure, error = %e, "procedure call failed");
                DbResponse::failure(
                    format!(
                        "An error occurred while retrieving data for caller {}. Database command: '{}'. Error: {}",
                        caller, procedure, e
                    ),
                    e,
                )
            }
        }
    }
}

fn bind_values(command: &mut DbCommand, inputs: &[&dyn AnonymousParameter]) -> Result<()> {
    inputs
        .iter()
        .try_for_each(|param| add_anonymous_parameter(command, *param))
}

fn fill_fresh<R: DbModel + Default>(row: DbRow) -> Result<R> {
    let mut obj = R::default();
    fill_object(&row, &mut obj)?;
    Ok(obj)
}
