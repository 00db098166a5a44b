//! Core error types for formcraft.
//!
//! [`FormcraftError`] is the single error enum that crosses crate boundaries.
//! Its variants follow the form engine's failure taxonomy (`NotFound`,
//! `ValidationFailed`, `TransportFailed`, `MalformedDocument`) plus the
//! ambient failures of the service around it (bad input, auth, config, IO).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A validation failure carrying per-field messages.
///
/// Field messages are keyed by the field's schema key. A validation error may
/// also carry a single form-level message, used when the failure is not tied
/// to one field.
///
/// # Examples
///
/// ```
/// use formcraft_core::error::ValidationError;
///
/// let mut err = ValidationError::new("Please correct the errors below.", "invalid");
/// err.add("dob", "Date of Birth is required.");
/// assert_eq!(err.messages_for("dob"), ["Date of Birth is required."]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// The form-level message.
    pub message: String,
    /// A short code identifying the failure (e.g. "required", "invalid").
    pub code: String,
    /// Per-field messages, keyed by field key.
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            field_errors: BTreeMap::new(),
        }
    }

    /// Creates a `ValidationError` from per-field messages.
    pub fn with_field_errors(field_errors: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            message: String::new(),
            code: "invalid".to_string(),
            field_errors,
        }
    }

    /// Appends a message for the given field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.field_errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Returns the messages recorded for a field (empty if none).
    pub fn messages_for(&self, field: &str) -> &[String] {
        self.field_errors.get(field).map_or(&[], Vec::as_slice)
    }

    /// Returns `true` if no field has any message and there is no form-level message.
    pub fn is_empty(&self) -> bool {
        self.message.is_empty() && self.field_errors.values().all(Vec::is_empty)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.message.is_empty() {
            write!(f, "{}", self.message)?;
        } else if !self.field_errors.is_empty() {
            let mut first = true;
            for (field, errors) in &self.field_errors {
                for error in errors {
                    if !first {
                        write!(f, "; ")?;
                    }
                    write!(f, "{field}: {error}")?;
                    first = false;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for formcraft.
///
/// Each variant maps to an HTTP status code via [`FormcraftError::status_code`].
#[derive(Error, Debug)]
pub enum FormcraftError {
    // ── Form engine ──────────────────────────────────────────────────

    /// The document is absent, unpublished or not owned by the caller.
    #[error("Not found: {0}")]
    NotFound(String),

    /// One or more fields failed validation.
    #[error("Validation failed: {0}")]
    ValidationFailed(ValidationError),

    /// The storage collaborator or transport was unreachable or errored.
    #[error("Transport failed: {0}")]
    TransportFailed(String),

    /// The document has no usable fields after filtering.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    // ── Requests ─────────────────────────────────────────────────────

    /// The request payload is missing data or is invalid.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No valid principal accompanied the request.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FormcraftError {
    /// Returns the HTTP status code associated with this error.
    ///
    /// - `BadRequest`, `ValidationFailed` -> 400
    /// - `Unauthorized` -> 401
    /// - `NotFound` -> 404
    /// - `MalformedDocument` -> 422
    /// - `TransportFailed` -> 502
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::ValidationFailed(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::NotFound(_) => 404,
            Self::MalformedDocument(_) => 422,
            Self::TransportFailed(_) => 502,
            Self::ConfigurationError(_) | Self::SerializationError(_) | Self::IoError(_) => 500,
        }
    }

    /// Returns `true` for failures that end a public page in a terminal state
    /// (no partial form is rendered).
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::TransportFailed(_))
    }
}

impl From<serde_json::Error> for FormcraftError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// A convenience type alias for `Result<T, FormcraftError>`.
pub type FormcraftResult<T> = Result<T, FormcraftError>;
