//! Declarative object-to-relational binding.
//!
//! Types register their members once through a [`ModelDescriptor`]. The
//! binding engine then turns an instance into stored-procedure parameters
//! and fills instances back from result rows, and [`CommandHelper`] wraps
//! both around a procedure call that reports failures in a [`DbResponse`].

// Core infrastructure modules
pub mod core;

// Feature-specific modules
pub mod binding;
pub mod config;

#[cfg(test)]
mod test_utils;

pub use binding::{
    AnonymousParameter, DbAnonymousValue, DbAutoFill, DbCustomType, DbModel, FillBehavior,
    ModelDescriptor,
};
pub use crate::core::db::{CaseTransform, CommandHelper, DbResponse, Dialect, SqliteProvider};
pub use crate::core::{DbAutoFillError, DbType, DbValue, Result};
