//! The form session controller.
//!
//! A [`FormSession`] holds the current values of one filled-in form, runs
//! validation on submit and hands accepted records to a [`SubmissionSink`].
//!
//! ## States
//!
//! ```text
//! Idle ──interaction──▶ Editing ──submit (valid)──▶ Submitting ──▶ SubmitSucceeded
//!                         ▲  │                                 └──▶ SubmitFailed
//!                         │  └─submit (invalid): stays Editing with field errors
//!                         └──────────── next interaction or resubmission
//! ```
//!
//! Validation failures stay local to the session: they annotate fields and
//! never reach the sink. Sink failures keep the entered values.

use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Write as _};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use formcraft_core::{FormcraftError, FormcraftResult, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::bound_field::BoundField;
use crate::descriptor::{FieldDescriptor, FormEntry};
use crate::form_data::FormData;
use crate::schema::{synthesize, ValidationSchema};
use crate::validation::clean_values;
use crate::widgets::{escape, AuxContext};

/// The message used when a document has no usable fields.
pub const NO_FIELDS: &str = "No fields found in this form.";

// ============================================================
// Submission sink
// ============================================================

/// One stored submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// The submission id.
    pub id: String,
    /// The form the submission belongs to.
    pub form_id: String,
    /// The cleaned values, keyed by field key.
    pub data: Map<String, Value>,
    /// When the submission was stored.
    pub submitted_at: DateTime<Utc>,
}

/// The sink's acknowledgement of a stored submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionAck {
    /// The id of the stored submission.
    pub id: String,
    /// When it was stored.
    pub submitted_at: DateTime<Utc>,
}

/// The append-only destination for completed submissions.
///
/// Appends to the same form must be atomic with respect to each other: two
/// concurrent appends both end up in the log.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Appends a submission to a form's log.
    async fn append(&self, form_id: &str, data: Map<String, Value>)
        -> FormcraftResult<SubmissionAck>;
}

// ============================================================
// Session
// ============================================================

/// The lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    /// Nothing has been touched yet.
    Idle,
    /// The user is filling in the form.
    Editing,
    /// A validated record is being handed to the sink.
    Submitting,
    /// The sink accepted the last submission.
    SubmitSucceeded,
    /// The sink rejected the last submission or could not be reached.
    SubmitFailed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Editing => "editing",
            Self::Submitting => "submitting",
            Self::SubmitSucceeded => "submit-succeeded",
            Self::SubmitFailed => "submit-failed",
        };
        f.write_str(name)
    }
}

/// The result of [`FormSession::submit`].
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The record passed validation and the sink stored it.
    Accepted(SubmissionAck),
    /// Validation failed; the sink was not called.
    Rejected(ValidationError),
    /// The sink failed; values are preserved.
    Failed(FormcraftError),
}

impl SubmitOutcome {
    /// Returns `true` if the submission was stored.
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// The state of one filled-in form.
#[derive(Debug, Clone)]
pub struct FormSession {
    form_id: String,
    name: String,
    fields: Vec<FieldDescriptor>,
    rows: Vec<Vec<usize>>,
    schema: ValidationSchema,
    values: Map<String, Value>,
    errors: BTreeMap<String, Vec<String>>,
    state: SessionState,
    last_error: Option<String>,
    last_ack: Option<SubmissionAck>,
}

impl FormSession {
    /// Starts a session over a flat field list.
    ///
    /// Fails with [`FormcraftError::MalformedDocument`] when no descriptor has a key.
    pub fn new(
        form_id: impl Into<String>,
        name: impl Into<String>,
        fields: Vec<FieldDescriptor>,
    ) -> FormcraftResult<Self> {
        let entries: Vec<FormEntry> = fields.into_iter().map(FormEntry::Field).collect();
        Self::from_entries(form_id, name, &entries)
    }

    /// Starts a session over entries, keeping row-groups side by side.
    pub fn from_entries(
        form_id: impl Into<String>,
        name: impl Into<String>,
        entries: &[FormEntry],
    ) -> FormcraftResult<Self> {
        let form_id = form_id.into();
        let mut fields = Vec::new();
        let mut rows = Vec::new();
        for entry in entries {
            let row: Vec<usize> = entry
                .descriptors()
                .iter()
                .filter(|d| d.is_usable())
                .map(|d| {
                    fields.push(d.clone());
                    fields.len() - 1
                })
                .collect();
            if !row.is_empty() {
                rows.push(row);
            }
        }

        if fields.is_empty() {
            tracing::warn!(form_id = %form_id, "refusing to start a session without fields");
            return Err(FormcraftError::MalformedDocument("no fields".to_string()));
        }

        let schema = synthesize(&fields);
        let values = schema.default_values();
        tracing::debug!(form_id = %form_id, fields = fields.len(), "form session started");

        Ok(Self {
            form_id,
            name: name.into(),
            fields,
            rows,
            schema,
            values,
            errors: BTreeMap::new(),
            state: SessionState::Idle,
            last_error: None,
            last_ack: None,
        })
    }

    /// Returns the form id.
    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    /// Returns the form name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the usable descriptors in render order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Returns the synthesized schema.
    pub const fn schema(&self) -> &ValidationSchema {
        &self.schema
    }

    /// Returns the current state.
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the current values.
    pub const fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Returns the current value of a field.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the per-field errors of the last submit attempt.
    pub const fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    /// Returns the sink error of the last failed submission.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Returns the acknowledgement of the last accepted submission.
    pub const fn last_ack(&self) -> Option<&SubmissionAck> {
        self.last_ack.as_ref()
    }

    /// Sets one field's value (the control's change channel).
    ///
    /// Clears that field's errors and moves the session to `Editing`.
    pub fn set_value(&mut self, key: &str, value: Value) -> FormcraftResult<()> {
        if self.schema.rule(key).is_none() {
            return Err(FormcraftError::BadRequest(format!("Unknown field: '{key}'")));
        }
        self.values.insert(key.to_string(), value);
        self.errors.remove(key);
        self.touch();
        Ok(())
    }

    /// Applies a whole posted payload through each field's widget.
    pub fn bind(&mut self, data: &FormData) {
        let updates: Vec<(String, Value)> = self
            .bound_fields()
            .into_iter()
            .filter_map(|bf| {
                bf.widget
                    .value_from_data(data, &bf.name)
                    .map(|value| (bf.name, value))
            })
            .collect();
        for (key, value) in updates {
            self.values.insert(key.clone(), value);
            self.errors.remove(&key);
        }
        self.touch();
    }

    fn touch(&mut self) {
        if self.state != SessionState::Editing {
            tracing::debug!(form_id = %self.form_id, from = %self.state, "session editing");
            self.state = SessionState::Editing;
        }
    }

    /// Validates the current values and, if they pass, appends them to `sink`.
    pub async fn submit(&mut self, sink: &dyn SubmissionSink) -> SubmitOutcome {
        self.state = SessionState::Editing;
        self.last_error = None;

        let cleaned = match clean_values(&self.schema, &self.values) {
            Ok(cleaned) => cleaned,
            Err(errors) => {
                tracing::info!(
                    form_id = %self.form_id,
                    fields = errors.field_errors.len(),
                    "submission rejected by validation"
                );
                self.errors.clone_from(&errors.field_errors);
                return SubmitOutcome::Rejected(errors);
            }
        };

        self.errors.clear();
        self.state = SessionState::Submitting;
        tracing::debug!(form_id = %self.form_id, "submitting");

        match sink.append(&self.form_id, cleaned).await {
            Ok(ack) => {
                tracing::info!(form_id = %self.form_id, submission_id = %ack.id, "submission stored");
                self.state = SessionState::SubmitSucceeded;
                self.last_ack = Some(ack.clone());
                SubmitOutcome::Accepted(ack)
            }
            Err(e) => {
                tracing::error!(form_id = %self.form_id, error = %e, "submission failed");
                self.state = SessionState::SubmitFailed;
                self.last_error = Some(e.to_string());
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// Returns every field bound to its value and errors.
    pub fn bound_fields(&self) -> Vec<BoundField> {
        self.fields
            .iter()
            .filter_map(|d| {
                let key = d.key()?;
                BoundField::new(
                    d,
                    self.values.get(key).cloned(),
                    self.errors.get(key).cloned().unwrap_or_default(),
                )
            })
            .collect()
    }

    /// Renders the whole form, including the status banner.
    pub fn render(&self, aux: &AuxContext) -> String {
        let mut bound: HashMap<usize, BoundField> =
            self.bound_fields().into_iter().enumerate().collect();

        let mut html = format!(
            r#"<form method="post" class="formcraft-form" data-state="{}"><h1>{}</h1>"#,
            self.state,
            escape(&self.name)
        );
        html.push_str(&self.banner());

        for row in &self.rows {
            let cells: String = row
                .iter()
                .filter_map(|i| bound.remove(i))
                .map(|bf| bf.as_row(aux))
                .collect();
            if row.len() > 1 {
                let _ = write!(html, r#"<div class="form-row">{cells}</div>"#);
            } else {
                html.push_str(&cells);
            }
        }

        let disabled = if self.state == SessionState::Submitting {
            " disabled"
        } else {
            ""
        };
        let _ = write!(html, r#"<button type="submit"{disabled}>Submit</button></form>"#);
        html
    }

    fn banner(&self) -> String {
        match self.state {
            SessionState::SubmitSucceeded => {
                r#"<div class="banner success" role="status">Thank you! Your response has been recorded.</div>"#
                    .to_string()
            }
            SessionState::SubmitFailed => format!(
                r#"<div class="banner error" role="alert">Your response could not be saved. {}</div>"#,
                escape(self.last_error.as_deref().unwrap_or(""))
            ),
            _ if !self.errors.is_empty() => {
                r#"<div class="banner error" role="alert">Please correct the errors below.</div>"#
                    .to_string()
            }
            _ => String::new(),
        }
    }
}
