//! The persistence collaborator.
//!
//! [`FormRepository`] is the narrow interface the engine uses to store form
//! documents. Authoring operations are scoped to an owner; the public read
//! path ([`FormRepository::get_published`]) exposes only the name and field
//! list of published documents.
//!
//! Absent, unpublished and not-owned documents all produce the same
//! [`FormcraftError::NotFound`], so callers cannot tell them apart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use formcraft_core::{FormcraftError, FormcraftResult};
use serde::{Deserialize, Serialize};

use crate::descriptor::{FieldsPayload, FormDocument, FormEntry};

/// The message of the not-found error on the public read path.
pub const NOT_PUBLISHED: &str = "Form not found or is not published.";

/// Returns the not-found error for the public read path.
pub fn not_published() -> FormcraftError {
    FormcraftError::NotFound(NOT_PUBLISHED.to_string())
}

/// Returns the not-found error for authoring operations.
pub fn form_not_found() -> FormcraftError {
    FormcraftError::NotFound("Form not found".to_string())
}

/// A document to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewForm {
    /// The form name.
    pub name: String,
    /// The owning principal.
    pub owner_id: String,
    /// The field list.
    pub fields: Vec<FormEntry>,
    /// Whether the form starts out published.
    pub published: bool,
}

/// A partial update. `None` leaves a property unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FormPatch {
    /// A new name.
    #[serde(default)]
    pub name: Option<String>,
    /// A new field list.
    #[serde(default)]
    pub json: Option<FieldsPayload>,
    /// A new published flag.
    #[serde(default)]
    pub published: Option<bool>,
}

impl FormPatch {
    /// Returns `true` if the patch changes nothing.
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.json.is_none() && self.published.is_none()
    }

    /// Applies the patch to a document, bumping `updated_at` to `now`.
    pub fn apply(self, document: &mut FormDocument, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            document.name = name;
        }
        if let Some(fields) = self.json {
            document.fields = fields;
        }
        if let Some(published) = self.published {
            document.published = published;
        }
        document.updated_at = now;
    }
}

/// A row of the owner's form index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSummary {
    /// The document id.
    pub id: String,
    /// The form name.
    pub name: String,
    /// Whether the form is published.
    pub published: bool,
    /// How many top-level fields the form has.
    pub field_count: usize,
    /// How many submissions the form has received.
    pub submission_count: usize,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
    /// When the document was last changed.
    pub updated_at: DateTime<Utc>,
}

/// The public view of a published form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedForm {
    /// The form name.
    pub name: String,
    /// The field list.
    pub json: FieldsPayload,
}

/// Storage for form documents.
#[async_trait]
pub trait FormRepository: Send + Sync {
    /// Stores a new document and returns it with its generated id.
    async fn create(&self, form: NewForm) -> FormcraftResult<FormDocument>;

    /// Returns a document owned by `owner`.
    async fn get(&self, id: &str, owner: &str) -> FormcraftResult<FormDocument>;

    /// Applies a partial update to a document owned by `owner`.
    async fn update(&self, id: &str, owner: &str, patch: FormPatch) -> FormcraftResult<FormDocument>;

    /// Deletes a document owned by `owner`, together with its submissions.
    async fn delete(&self, id: &str, owner: &str) -> FormcraftResult<()>;

    /// Lists the documents owned by `owner`, oldest first.
    async fn list_by_owner(&self, owner: &str) -> FormcraftResult<Vec<FormSummary>>;

    /// Returns the public view of a published document.
    async fn get_published(&self, id: &str) -> FormcraftResult<PublishedForm>;
}
