//! The uniform response envelope.
//!
//! Every JSON response from the Images API is wrapped in the same structure:
//! `{result, success, errors, messages}`. Parsing a response body into
//! [`ApiEnvelope`] is the schema-validation step; extracting the payload
//! with [`ApiEnvelope::into_result`] enforces the success contract.

use crate::error::{Error, Result};
use serde::Deserialize;

/// A single error or informational message carried by an envelope.
///
/// Service error codes are 1000 or greater by convention.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiMessage {
    /// Service-assigned code
    pub code: u32,
    /// Human-readable text
    pub message: String,
}

/// The `{result, success, errors, messages}` wrapper present on every
/// JSON response.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    /// Operation-specific payload, absent on failure
    #[serde(default)]
    pub result: Option<T>,
    /// Whether the operation succeeded
    pub success: bool,
    /// Errors reported by the service
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    /// Informational messages reported by the service
    #[serde(default)]
    pub messages: Vec<ApiMessage>,
}

impl<T> ApiEnvelope<T> {
    /// Extract the payload, requiring both `success` and a present result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] carrying the first reported error (or code 0
    /// when the service reported none) if the envelope is unsuccessful or
    /// has no result.
    pub fn into_result(self) -> Result<T> {
        if !self.success {
            return Err(self.first_error());
        }
        match self.result {
            Some(result) => Ok(result),
            None => Err(Error::Api {
                code: 0,
                message: "successful response carried no result".to_string(),
            }),
        }
    }

    /// Require only `success`, discarding any payload.
    ///
    /// Used for operations such as delete where the result body is empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] if the envelope is unsuccessful.
    pub fn into_unit(self) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            Err(self.first_error())
        }
    }

    fn first_error(&self) -> Error {
        self.errors.first().map_or(
            Error::Api {
                code: 0,
                message: "operation failed without error detail".to_string(),
            },
            |e| Error::Api {
                code: e.code,
                message: e.message.clone(),
            },
        )
    }
}
