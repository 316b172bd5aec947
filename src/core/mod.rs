/// Core Module for DbAutoFill
///
/// Shared infrastructure used by both the binding engine and the
/// stored-procedure layer: the error type, the raw value model and the
/// command/row shapes values are bound into and read from.

pub mod command;
pub mod db;
pub mod error;
pub mod value;

// Re-export commonly used types for convenience
pub use command::{CommandType, DbCommand, DbParameter, DbParameterCollection, DbRow};
pub use error::{DbAutoFillError, Result};
pub use value::{DbType, DbValue, FromDbValue, ToDbValue};
