//! In-memory implementation of the form repository and the submission log.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use formcraft_core::{FormcraftError, FormcraftResult};
use formcraft_forms::descriptor::{FieldsPayload, FormDocument};
use formcraft_forms::repository::{
    form_not_found, not_published, FormPatch, FormRepository, FormSummary, NewForm, PublishedForm,
};
use formcraft_forms::session::{Submission, SubmissionAck, SubmissionSink};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Default)]
struct Tables {
    /// Documents in creation order.
    forms: Vec<FormDocument>,
    /// Submission logs keyed by form id.
    submissions: HashMap<String, Vec<Submission>>,
}

impl Tables {
    fn owned(&self, id: &str, owner: &str) -> Option<&FormDocument> {
        self.forms.iter().find(|f| f.id == id && f.owner_id == owner)
    }

    fn owned_mut(&mut self, id: &str, owner: &str) -> Option<&mut FormDocument> {
        self.forms
            .iter_mut()
            .find(|f| f.id == id && f.owner_id == owner)
    }
}

/// A form and its collected submissions, as shown to the form's owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionLog {
    /// The form name.
    pub name: String,
    /// Submissions, oldest first.
    pub submissions: Vec<Submission>,
}

/// In-memory [`FormRepository`] and [`SubmissionSink`].
///
/// All mutations take the write lock, so concurrent appends to the same
/// form are serialised and none is lost. Cloning shares the same tables.
///
/// # Example
///
/// ```
/// use formcraft_store::InMemoryFormStore;
///
/// let store = InMemoryFormStore::new();
/// assert_eq!(store.form_count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryFormStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryFormStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> FormcraftResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| FormcraftError::TransportFailed("form store lock poisoned".to_string()))
    }

    fn write(&self) -> FormcraftResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| FormcraftError::TransportFailed("form store lock poisoned".to_string()))
    }

    /// Returns the number of stored documents.
    pub fn form_count(&self) -> usize {
        self.read().map_or(0, |t| t.forms.len())
    }

    /// Returns the submissions of a form owned by `owner`.
    pub fn submissions(&self, form_id: &str, owner: &str) -> FormcraftResult<SubmissionLog> {
        let tables = self.read()?;
        let form = tables.owned(form_id, owner).ok_or_else(form_not_found)?;
        Ok(SubmissionLog {
            name: form.name.clone(),
            submissions: tables.submissions.get(form_id).cloned().unwrap_or_default(),
        })
    }

    /// Returns how many submissions a form has, regardless of owner.
    pub fn submission_count(&self, form_id: &str) -> usize {
        self.read()
            .map_or(0, |t| t.submissions.get(form_id).map_or(0, Vec::len))
    }
}

#[async_trait]
impl FormRepository for InMemoryFormStore {
    async fn create(&self, form: NewForm) -> FormcraftResult<FormDocument> {
        let now = Utc::now();
        let document = FormDocument {
            id: uuid::Uuid::new_v4().to_string(),
            name: form.name,
            owner_id: form.owner_id,
            published: form.published,
            fields: FieldsPayload::new(form.fields),
            created_at: now,
            updated_at: now,
        };
        self.write()?.forms.push(document.clone());
        tracing::info!(form_id = %document.id, owner = %document.owner_id, "form created");
        Ok(document)
    }

    async fn get(&self, id: &str, owner: &str) -> FormcraftResult<FormDocument> {
        self.read()?
            .owned(id, owner)
            .cloned()
            .ok_or_else(form_not_found)
    }

    async fn update(&self, id: &str, owner: &str, patch: FormPatch) -> FormcraftResult<FormDocument> {
        let mut tables = self.write()?;
        let document = tables.owned_mut(id, owner).ok_or_else(form_not_found)?;
        patch.apply(document, Utc::now());
        tracing::info!(form_id = id, published = document.published, "form updated");
        Ok(document.clone())
    }

    async fn delete(&self, id: &str, owner: &str) -> FormcraftResult<()> {
        let mut tables = self.write()?;
        let index = tables
            .forms
            .iter()
            .position(|f| f.id == id && f.owner_id == owner)
            .ok_or_else(form_not_found)?;
        tables.forms.remove(index);
        let dropped = tables.submissions.remove(id).map_or(0, |s| s.len());
        tracing::info!(form_id = id, submissions = dropped, "form deleted");
        Ok(())
    }

    async fn list_by_owner(&self, owner: &str) -> FormcraftResult<Vec<FormSummary>> {
        let tables = self.read()?;
        Ok(tables
            .forms
            .iter()
            .filter(|f| f.owner_id == owner)
            .map(|f| FormSummary {
                id: f.id.clone(),
                name: f.name.clone(),
                published: f.published,
                field_count: f.fields.entries.len(),
                submission_count: tables.submissions.get(&f.id).map_or(0, Vec::len),
                created_at: f.created_at,
                updated_at: f.updated_at,
            })
            .collect())
    }

    async fn get_published(&self, id: &str) -> FormcraftResult<PublishedForm> {
        let tables = self.read()?;
        tables
            .forms
            .iter()
            .find(|f| f.id == id && f.published)
            .map(|f| PublishedForm {
                name: f.name.clone(),
                json: f.fields.clone(),
            })
            .ok_or_else(not_published)
    }
}

#[async_trait]
impl SubmissionSink for InMemoryFormStore {
    async fn append(&self, form_id: &str, data: Map<String, Value>) -> FormcraftResult<SubmissionAck> {
        let mut tables = self.write()?;
        if !tables.forms.iter().any(|f| f.id == form_id && f.published) {
            return Err(not_published());
        }
        let submission = Submission {
            id: uuid::Uuid::new_v4().to_string(),
            form_id: form_id.to_string(),
            data,
            submitted_at: Utc::now(),
        };
        let ack = SubmissionAck {
            id: submission.id.clone(),
            submitted_at: submission.submitted_at,
        };
        tables
            .submissions
            .entry(form_id.to_string())
            .or_default()
            .push(submission);
        tracing::debug!(form_id, submission_id = %ack.id, "submission appended");
        Ok(ack)
    }
}
