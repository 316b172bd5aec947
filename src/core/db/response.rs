/// Response Module
///
/// Result envelope returned by every stored-procedure call.

use crate::core::DbAutoFillError;

/// Rows filled by a procedure call, or the error that stopped it.
///
/// By convention only one side is meaningful for a given call.
#[derive(Debug)]
pub struct DbResponse<T> {
    result_set: Vec<T>,
    error_message: Option<String>,
    error: Option<DbAutoFillError>,
}

impl<T> Default for DbResponse<T> {
    fn default() -> Self {
        DbResponse {
            result_set: Vec::new(),
            error_message: None,
            error: None,
        }
    }
}

impl<T> DbResponse<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(result_set: Vec<T>) -> Self {
        DbResponse {
            result_set,
            ..Self::default()
        }
    }

    /// Builds an error response. A blank message is replaced by the error's
    /// own text.
    pub fn failure(message: impl Into<String>, error: DbAutoFillError) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            error.to_string()
        } else {
            message
        };

        DbResponse {
            result_set: Vec::new(),
            error_message: Some(message),
            error: Some(error),
        }
    }

    pub fn push(&mut self, item: T) {
        self.result_set.push(item);
    }

    pub fn has_result(&self) -> bool {
        !self.result_set.is_empty()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some() || self.error_message.as_deref().is_some_and(|m| !m.trim().is_empty())
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn error(&self) -> Option<&DbAutoFillError> {
        self.error.as_ref()
    }

    pub fn result_set(&self) -> &[T] {
        &self.result_set
    }

    pub fn into_result_set(self) -> Vec<T> {
        self.result_set
    }

    /// Converts back into a `Result`, surfacing the cause on failure.
    pub fn into_result(self) -> crate::core::Result<Vec<T>> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result_set),
        }
    }
}
