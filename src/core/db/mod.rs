/// Database Module
///
/// The stored-procedure layer that drives the binding engine.
///
/// ## Architecture
///
/// - **Dialects** (`dialect.rs`): identifier quoting templates and case folding
/// - **Connection Management** (`connection.rs`): provider and connection contracts, SQLite provider
/// - **Query Execution** (`query.rs`): runs a SQL body with named parameters
/// - **Invocation** (`helper.rs`): builds, binds and runs procedure calls
/// - **Responses** (`response.rs`): the non-throwing result envelope
///
/// ## Error Handling
///
/// Everything below `helper.rs` returns `DbAutoFillError`. `CommandHelper` is
/// the boundary that turns those errors into a `DbResponse`.
pub mod connection;
pub mod dialect;
pub mod helper;
pub mod query;
pub mod response;

pub use connection::*;
pub use dialect::{CaseTransform, Dialect};
pub use helper::CommandHelper;
pub use query::ProcedureExecutor;
pub use response::DbResponse;
