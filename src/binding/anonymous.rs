/// Anonymous Value Module
///
/// A named value that is not part of any record: bound outbound as a single
/// parameter called by its alias, and filled inbound from the first column
/// of a row.
use crate::binding::model::{DbModel, ModelDescriptor};
use crate::core::{DbAutoFillError, DbValue, FromDbValue, Result, ToDbValue};
use std::fmt;

type ConvertFn<V> = Box<dyn Fn(&DbValue) -> Result<V> + Send + Sync>;

/// Alias plus value, with the conversion used when the value is read back.
pub struct DbAnonymousValue<V> {
    alias: String,
    value: V,
    convert: ConvertFn<V>,
}

impl<V: FromDbValue + 'static> DbAnonymousValue<V> {
    /// Creates a value that converts with `V`'s own `FromDbValue`.
    ///
    /// # Errors
    ///
    /// Returns `DbAutoFillError::InvalidArgument` if `alias` is blank.
    pub fn new(alias: impl Into<String>, value: V) -> Result<Self> {
        Self::with_converter(alias, value, V::from_db_value)
    }
}

impl<V> DbAnonymousValue<V> {
    /// Creates a value with a caller-supplied conversion from raw values.
    pub fn with_converter<F>(alias: impl Into<String>, value: V, convert: F) -> Result<Self>
    where
        F: Fn(&DbValue) -> Result<V> + Send + Sync + 'static,
    {
        let alias = alias.into();
        if alias.trim().is_empty() {
            return Err(DbAutoFillError::InvalidArgument(
                "A non-empty alias must be provided.".to_string(),
            ));
        }

        Ok(DbAnonymousValue {
            alias,
            value,
            convert: Box::new(convert),
        })
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }

    pub fn set_value(&mut self, value: V) {
        self.value = value;
    }
}

impl<V: Default> DbAnonymousValue<V> {
    /// Stores `raw` through the conversion function; NULL resets to the default.
    pub fn set_from_db(&mut self, raw: &DbValue) -> Result<()> {
        self.value = if raw.is_null() {
            V::default()
        } else {
            (self.convert)(raw)?
        };
        Ok(())
    }
}

/// Result rows build fresh holders through `Default`; the alias is not
/// consulted when filling from the first column.
impl<V: FromDbValue + 'static> Default for DbAnonymousValue<V> {
    fn default() -> Self {
        DbAnonymousValue {
            alias: String::new(),
            value: V::default(),
            convert: Box::new(V::from_db_value),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for DbAnonymousValue<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbAnonymousValue")
            .field("alias", &self.alias)
            .field("value", &self.value)
            .finish()
    }
}

impl<V> DbModel for DbAnonymousValue<V>
where
    V: ToDbValue + Default + 'static,
{
    fn descriptor() -> ModelDescriptor<Self> {
        ModelDescriptor::scalar(
            "DbAnonymousValue",
            |holder: &Self| (holder.alias.clone(), holder.value.to_db_value()),
            |holder: &mut Self, raw: &DbValue| holder.set_from_db(raw),
        )
    }
}

/// Object-safe view of a named value, for passing mixed value types to a
/// single procedure call.
pub trait AnonymousParameter {
    fn alias(&self) -> &str;
    fn parameter_value(&self) -> DbValue;
}

impl<V: ToDbValue> AnonymousParameter for DbAnonymousValue<V> {
    fn alias(&self) -> &str {
        &self.alias
    }

    fn parameter_value(&self) -> DbValue {
        self.value.to_db_value()
    }
}
