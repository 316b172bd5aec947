/// Command and Row Module
///
/// Vendor-neutral shapes the binding engine reads from and writes into: a
/// command with its named parameter list, and a result row with its columns.
use crate::core::value::{DbType, DbValue};
use std::collections::HashSet;

/// How the command text is interpreted by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandType {
    #[default]
    Text,
    StoredProcedure,
}

/// A named parameter on a command.
#[derive(Debug, Clone, PartialEq)]
pub struct DbParameter {
    pub name: String,
    pub value: DbValue,
    /// Optional storage-kind hint for the provider
    pub db_type: Option<DbType>,
}

impl DbParameter {
    pub fn new(name: impl Into<String>) -> Self {
        DbParameter {
            name: name.into(),
            value: DbValue::Null,
            db_type: None,
        }
    }
}

/// Ordered parameter list, looked up by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DbParameterCollection {
    items: Vec<DbParameter>,
}

impl DbParameterCollection {
    pub fn push(&mut self, parameter: DbParameter) {
        self.items.push(parameter);
    }

    pub fn get(&self, name: &str) -> Option<&DbParameter> {
        self.items.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DbParameter> {
        self.items.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(|p| p.name.as_str()).collect()
    }
}

impl std::ops::Index<usize> for DbParameterCollection {
    type Output = DbParameter;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl<'a> IntoIterator for &'a DbParameterCollection {
    type Item = &'a DbParameter;
    type IntoIter = std::slice::Iter<'a, DbParameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// A command to be executed by a provider connection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DbCommand {
    pub text: String,
    pub command_type: CommandType,
    pub parameters: DbParameterCollection,
}

impl DbCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stored-procedure command for an already quoted procedure name.
    pub fn stored_procedure(name: impl Into<String>) -> Self {
        DbCommand {
            text: name.into(),
            command_type: CommandType::StoredProcedure,
            parameters: DbParameterCollection::default(),
        }
    }
}

/// One row of a result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DbRow {
    columns: Vec<String>,
    values: Vec<DbValue>,
}

impl DbRow {
    /// Creates a row from parallel column and value lists.
    ///
    /// Extra entries on either side are dropped.
    pub fn new(mut columns: Vec<String>, mut values: Vec<DbValue>) -> Self {
        let len = columns.len().min(values.len());
        columns.truncate(len);
        values.truncate(len);
        DbRow { columns, values }
    }

    /// Builds a row from `(column, value)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, DbValue)>,
        S: Into<String>,
    {
        let (columns, values) = pairs.into_iter().map(|(c, v)| (c.into(), v)).unzip();
        DbRow { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[DbValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Exact, case-sensitive column lookup.
    pub fn ordinal(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn get(&self, column: &str) -> Option<&DbValue> {
        self.ordinal(column).map(|i| &self.values[i])
    }

    pub fn get_index(&self, index: usize) -> Option<&DbValue> {
        self.values.get(index)
    }

    pub fn column_set(&self) -> HashSet<String> {
        self.columns.iter().cloned().collect()
    }
}

impl serde::Serialize for DbRow {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.columns.iter().zip(&self.values) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}
