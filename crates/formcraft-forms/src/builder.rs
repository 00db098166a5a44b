//! The builder editor.
//!
//! [`BuilderEditor`] is the authoring-time model of a form: an ordered list
//! of [`FormEntry`] values where a row-group nests fields one level deep.
//! A field is addressed by a [`FieldPath`], the sequence of indices through
//! group boundaries (`[i]` for a top-level field, `[i, j]` for the `j`-th
//! field of the row at `i`).
//!
//! Reordering inside a row is debounced: the visual order changes at once,
//! and the canonical list follows after a quiet period. Another reorder of
//! the same row inside that window restarts the wait instead of queueing a
//! second commit. Structural edits (top-level moves, grouping, removal,
//! saving) first apply any pending row commits.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use formcraft_core::{FormcraftError, FormcraftResult, Settings};
use rand::Rng;
use serde::Deserialize;
use tokio::time::Instant;

use crate::descriptor::{flatten, FieldDescriptor, FieldKind, FormEntry};
use crate::repository::{FormRepository, NewForm};
use crate::schema::{SchemaCache, ValidationSchema};

/// The default quiet period before a row reorder is committed.
pub const DEFAULT_REORDER_DEBOUNCE: Duration = Duration::from_millis(1000);

/// The placeholder given to new fields whose variant has none.
pub const FALLBACK_PLACEHOLDER: &str = "Placeholder";

// ============================================================
// Palette configuration
// ============================================================

/// Defaults for a field created from a palette variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldConfig {
    /// The default label.
    pub label: &'static str,
    /// The default help text.
    pub description: &'static str,
    /// The default placeholder.
    pub placeholder: &'static str,
    /// The kind the variant creates.
    pub kind: FieldKind,
}

const fn config(
    label: &'static str,
    description: &'static str,
    placeholder: &'static str,
    kind: FieldKind,
) -> FieldConfig {
    FieldConfig {
        label,
        description,
        placeholder,
        kind,
    }
}

/// Per-variant defaults for new fields, keyed by palette variant name.
pub const DEFAULT_FIELD_CONFIG: &[(&str, FieldConfig)] = &[
    ("Checkbox", config("Use different settings for my mobile devices", "You can manage your mobile notifications in the mobile settings page.", "", FieldKind::Checkbox)),
    ("Date Picker", config("Date of birth", "Your date of birth is used to calculate your age.", "Pick a date", FieldKind::Date)),
    ("File Input", config("Select File", "Select a file to upload.", "", FieldKind::File)),
    ("Input", config("Username", "This is your public display name.", "shadcn", FieldKind::Input)),
    ("Input OTP", config("One-Time Password", "Please enter the one-time password sent to your phone.", "", FieldKind::Otp)),
    ("Location Input", config("Select Country", "If your country has states, it will appear after selecting country", "", FieldKind::Location)),
    ("Multi Select", config("Select your framework", "Select multiple options.", "Select languages", FieldKind::MultiSelect)),
    ("Password", config("Password", "Enter your password.", "Password", FieldKind::Password)),
    ("Phone", config("Phone number", "Enter your phone number.", "", FieldKind::Phone)),
    ("Radio Group", config("Gender", "", "", FieldKind::RadioGroup)),
    ("Rating", config("Rating", "Please provide your rating.", "", FieldKind::Rating)),
    ("Select", config("Email", "You can manage email addresses in your email settings.", "Select a verified email to display", FieldKind::Select)),
    ("Signature Input", config("Sign here", "Please provide your signature above", "", FieldKind::Signature)),
    ("Slider", config("Set Price Range", "Adjust the price by sliding.", "", FieldKind::Slider)),
    ("Switch", config("Marketing emails", "Receive emails about new products, features, and more.", "", FieldKind::Switch)),
    ("Tags Input", config("Enter your tech stack.", "Add tags.", "Enter your tags", FieldKind::Tags)),
    ("Textarea", config("Bio", "You can @mention other users and organizations.", "Tell us a little bit about yourself", FieldKind::Textarea)),
];

/// Returns the defaults for a palette variant.
pub fn default_field_config(variant: &str) -> Option<&'static FieldConfig> {
    DEFAULT_FIELD_CONFIG
        .iter()
        .find(|(name, _)| *name == variant)
        .map(|(_, config)| config)
}

// ============================================================
// Paths and updates
// ============================================================

/// The location of a descriptor in a possibly grouped field list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<usize>);

impl FieldPath {
    /// Creates a path from indices.
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// Returns the indices.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Returns `true` if the path points into a row-group.
    pub fn is_nested(&self) -> bool {
        self.0.len() > 1
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("/"))
    }
}

/// A shallow update of a descriptor. `None` leaves a property unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldUpdate {
    /// A new name.
    pub name: Option<String>,
    /// A new explicit kind tag.
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    /// A new label.
    pub label: Option<String>,
    /// A new placeholder.
    pub placeholder: Option<String>,
    /// New help text.
    pub description: Option<String>,
    /// New options.
    pub options: Option<Vec<String>>,
    /// A new required flag.
    pub required: Option<bool>,
    /// A new disabled flag.
    pub disabled: Option<bool>,
}

impl FieldUpdate {
    /// Merges this update into a descriptor.
    pub fn apply_to(&self, descriptor: &mut FieldDescriptor) {
        if let Some(name) = &self.name {
            descriptor.name = Some(name.clone());
        }
        if let Some(field_type) = &self.field_type {
            descriptor.field_type.clone_from(field_type);
        }
        if let Some(label) = &self.label {
            descriptor.label.clone_from(label);
        }
        if let Some(placeholder) = &self.placeholder {
            descriptor.placeholder = Some(placeholder.clone());
        }
        if let Some(description) = &self.description {
            descriptor.description = Some(description.clone());
        }
        if let Some(options) = &self.options {
            descriptor.options.clone_from(options);
        }
        if let Some(required) = self.required {
            descriptor.required = required;
        }
        if let Some(disabled) = self.disabled {
            descriptor.disabled = disabled;
        }
    }
}

fn matches_name(descriptor: &FieldDescriptor, name: &str) -> bool {
    descriptor.name.as_deref() == Some(name) || descriptor.key() == Some(name)
}

/// Finds the path of the descriptor called `name`, searching inside rows.
pub fn find_path(entries: &[FormEntry], name: &str) -> Option<FieldPath> {
    entries.iter().enumerate().find_map(|(i, entry)| match entry {
        FormEntry::Field(d) => matches_name(d, name).then(|| FieldPath(vec![i])),
        FormEntry::Row(row) => row
            .iter()
            .position(|d| matches_name(d, name))
            .map(|j| FieldPath(vec![i, j])),
    })
}

/// Returns the descriptor at `path`.
pub fn descriptor_at<'a>(entries: &'a [FormEntry], path: &FieldPath) -> Option<&'a FieldDescriptor> {
    match (entries.get(*path.0.first()?)?, &path.0[1..]) {
        (FormEntry::Field(d), []) => Some(d),
        (FormEntry::Row(row), [j]) => row.get(*j),
        _ => None,
    }
}

/// Returns a copy of `entries` with the descriptor at `path` shallow-merged
/// with `update`, or `None` if the path does not address a descriptor.
pub fn replace_at(
    entries: &[FormEntry],
    path: &FieldPath,
    update: &FieldUpdate,
) -> Option<Vec<FormEntry>> {
    descriptor_at(entries, path)?;
    let mut out = entries.to_vec();
    let target = match (&mut out[path.0[0]], &path.0[1..]) {
        (FormEntry::Field(d), []) => d,
        (FormEntry::Row(row), [j]) => &mut row[*j],
        _ => return None,
    };
    update.apply_to(target);
    Some(out)
}

// ============================================================
// Editor
// ============================================================

/// Where the author goes after a successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The author's form index.
    Index,
}

impl Navigation {
    /// Returns the path of the destination page.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Index => "/admin",
        }
    }
}

/// The result of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// The id of the stored document.
    pub id: String,
    /// Where to go next.
    pub next: Navigation,
}

/// The authoring-time form model.
#[derive(Debug)]
pub struct BuilderEditor {
    entries: Vec<FormEntry>,
    row_views: HashMap<usize, Vec<String>>,
    pending: HashMap<usize, Instant>,
    debounce: Duration,
    schema_cache: SchemaCache,
}

impl Default for BuilderEditor {
    fn default() -> Self {
        Self::new(DEFAULT_REORDER_DEBOUNCE)
    }
}

impl BuilderEditor {
    /// Creates an empty editor with the given row-reorder quiet period.
    pub fn new(debounce: Duration) -> Self {
        Self {
            entries: Vec::new(),
            row_views: HashMap::new(),
            pending: HashMap::new(),
            debounce,
            schema_cache: SchemaCache::new(),
        }
    }

    /// Creates an empty editor configured from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(Duration::from_millis(settings.reorder_debounce_ms))
    }

    /// Replaces the field list (e.g. to edit an existing document).
    #[must_use]
    pub fn with_entries(mut self, entries: Vec<FormEntry>) -> Self {
        self.entries = entries;
        self.row_views.clear();
        self.pending.clear();
        self
    }

    /// Returns the canonical field list.
    pub fn entries(&self) -> &[FormEntry] {
        &self.entries
    }

    /// Returns all descriptors with rows flattened.
    pub fn fields(&self) -> Vec<FieldDescriptor> {
        flatten(&self.entries)
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the validation schema of the current field list, rebuilt only
    /// when the list has changed.
    pub fn preview_schema(&mut self) -> &ValidationSchema {
        let fields = flatten(&self.entries);
        self.schema_cache.get_or_synthesize(&fields)
    }

    // ── Append ──────────────────────────────────────────────────────

    /// Appends a field created from a palette variant and returns its name.
    ///
    /// The name is `name_` followed by ten random digits. Unknown variants get
    /// an empty configuration: the label falls back to the name and the kind
    /// is inferred from it.
    pub fn append(&mut self, variant: &str, row_index: usize) -> String {
        let name = self.unique_name();
        let cfg = default_field_config(variant);

        let label = cfg
            .map(|c| c.label)
            .filter(|l| !l.is_empty())
            .map_or_else(|| name.clone(), String::from);
        let placeholder = cfg
            .map(|c| c.placeholder)
            .filter(|p| !p.is_empty())
            .unwrap_or(FALLBACK_PLACEHOLDER);
        let description = cfg.map(|c| c.description).filter(|d| !d.is_empty());

        let descriptor = FieldDescriptor {
            name: Some(name.clone()),
            id: None,
            field_type: cfg.map(|c| c.kind.as_str().to_string()).unwrap_or_default(),
            label,
            placeholder: Some(placeholder.to_string()),
            description: description.map(String::from),
            options: Vec::new(),
            required: true,
            variant: Some(variant.to_string()),
            row_index: Some(row_index),
            disabled: false,
        };

        tracing::debug!(%name, variant, row_index, "appending field");
        self.entries.push(FormEntry::Field(descriptor));
        name
    }

    fn unique_name(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let candidate = format!("name_{:010}", rng.gen_range(0..10_000_000_000_u64));
            if find_path(&self.entries, &candidate).is_none() {
                return candidate;
            }
        }
    }

    // ── Reorder ─────────────────────────────────────────────────────

    /// Moves the top-level entry at `from` to position `to`.
    pub fn reorder(&mut self, from: usize, to: usize) -> FormcraftResult<()> {
        self.flush();
        let len = self.entries.len();
        if from >= len || to >= len {
            return Err(FormcraftError::BadRequest(format!(
                "Reorder out of range: {from} -> {to} (len {len})"
            )));
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        Ok(())
    }

    /// Reorders the fields of the row at `index`.
    ///
    /// `new_order` lists the row's field keys in their new order. The visual
    /// order changes immediately; the canonical list is updated once the
    /// quiet period has passed since the last reorder of this row.
    pub fn reorder_row(
        &mut self,
        index: usize,
        new_order: &[String],
        now: Instant,
    ) -> FormcraftResult<()> {
        let Some(FormEntry::Row(row)) = self.entries.get(index) else {
            return Err(FormcraftError::BadRequest(format!("Entry {index} is not a row")));
        };

        let mut current: Vec<&str> = row.iter().filter_map(FieldDescriptor::key).collect();
        let mut proposed: Vec<&str> = new_order.iter().map(String::as_str).collect();
        current.sort_unstable();
        proposed.sort_unstable();
        if current.len() != row.len() || current != proposed {
            return Err(FormcraftError::BadRequest(format!(
                "New order is not a permutation of row {index}"
            )));
        }

        let due = now + self.debounce;
        if self.pending.insert(index, due).is_some() {
            tracing::trace!(row = index, "row reorder restarted its quiet period");
        }
        self.row_views.insert(index, new_order.to_vec());
        Ok(())
    }

    /// Returns the row at `index` in the order currently shown to the author.
    pub fn visual_row(&self, index: usize) -> Option<Vec<&FieldDescriptor>> {
        let FormEntry::Row(row) = self.entries.get(index)? else {
            return None;
        };
        match self.row_views.get(&index) {
            Some(order) => Some(
                order
                    .iter()
                    .filter_map(|key| row.iter().find(|d| d.key() == Some(key.as_str())))
                    .collect(),
            ),
            None => Some(row.iter().collect()),
        }
    }

    /// Returns the earliest pending commit deadline.
    pub fn next_commit_at(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Returns `true` if a row reorder is waiting to be committed.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Applies every row reorder whose quiet period has ended by `now`.
    /// Returns how many were applied.
    pub fn commit_due(&mut self, now: Instant) -> usize {
        let mut due: Vec<usize> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(index, _)| *index)
            .collect();
        due.sort_unstable();
        for index in &due {
            self.pending.remove(index);
            self.commit_row(*index);
        }
        due.len()
    }

    /// Waits until every pending row reorder has been committed.
    pub async fn settle(&mut self) {
        while let Some(deadline) = self.next_commit_at() {
            tokio::time::sleep_until(deadline).await;
            self.commit_due(Instant::now());
        }
    }

    /// Applies every pending row reorder immediately.
    pub fn flush(&mut self) {
        let mut indices: Vec<usize> = self.pending.drain().map(|(index, _)| index).collect();
        indices.sort_unstable();
        for index in indices {
            self.commit_row(index);
        }
    }

    fn commit_row(&mut self, index: usize) {
        let Some(order) = self.row_views.remove(&index) else {
            return;
        };
        let Some(FormEntry::Row(row)) = self.entries.get_mut(index) else {
            tracing::warn!(row = index, "dropping row reorder: entry is no longer a row");
            return;
        };
        let mut reordered = Vec::with_capacity(row.len());
        for key in &order {
            if let Some(pos) = row.iter().position(|d| d.key() == Some(key.as_str())) {
                reordered.push(row.remove(pos));
            }
        }
        // Anything the order did not mention keeps its relative position at the end.
        reordered.append(row);
        *row = reordered;
        tracing::debug!(row = index, "row reorder committed");
    }

    // ── Rows ────────────────────────────────────────────────────────

    /// Groups the top-level fields at `indices` into one row, in the given
    /// order, placed where the first of them was. Returns the row's index.
    pub fn group_into_row(&mut self, indices: &[usize]) -> FormcraftResult<usize> {
        self.flush();
        if indices.len() < 2 {
            return Err(FormcraftError::BadRequest(
                "A row needs at least two fields".to_string(),
            ));
        }
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != indices.len() {
            return Err(FormcraftError::BadRequest("Duplicate index in row".to_string()));
        }
        for &i in &sorted {
            if !matches!(self.entries.get(i), Some(FormEntry::Field(_))) {
                return Err(FormcraftError::BadRequest(format!(
                    "Entry {i} is not a single field"
                )));
            }
        }

        let row: Vec<FieldDescriptor> = indices
            .iter()
            .filter_map(|&i| match &self.entries[i] {
                FormEntry::Field(d) => Some(d.clone()),
                FormEntry::Row(_) => None,
            })
            .collect();
        for &i in sorted.iter().rev() {
            self.entries.remove(i);
        }
        let at = sorted[0];
        self.entries.insert(at, FormEntry::Row(row));
        Ok(at)
    }

    /// Dissolves the row at `index` into consecutive top-level fields.
    pub fn ungroup_row(&mut self, index: usize) -> FormcraftResult<()> {
        self.flush();
        match self.entries.get(index) {
            Some(FormEntry::Row(_)) => {}
            _ => {
                return Err(FormcraftError::BadRequest(format!("Entry {index} is not a row")));
            }
        }
        if let FormEntry::Row(row) = self.entries.remove(index) {
            for (offset, d) in row.into_iter().enumerate() {
                self.entries.insert(index + offset, FormEntry::Field(d));
            }
        }
        Ok(())
    }

    // ── Edit ────────────────────────────────────────────────────────

    /// Returns the path of the field called `name`.
    pub fn find_path(&self, name: &str) -> Option<FieldPath> {
        find_path(&self.entries, name)
    }

    /// Returns the field called `name`.
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        descriptor_at(&self.entries, &self.find_path(name)?)
    }

    /// Shallow-merges `update` into the descriptor at `path`.
    ///
    /// A pending row reorder follows a renamed field, so the row keeps the
    /// order the author dragged it into.
    pub fn replace_at(&mut self, path: &FieldPath, update: &FieldUpdate) -> FormcraftResult<()> {
        let updated = replace_at(&self.entries, path, update)
            .ok_or_else(|| FormcraftError::NotFound(format!("No field at path {path}")))?;
        let old_key = descriptor_at(&self.entries, path).and_then(|d| d.key().map(str::to_string));
        let new_key = descriptor_at(&updated, path).and_then(|d| d.key().map(str::to_string));
        self.entries = updated;

        if let ([row, _], Some(old), Some(new)) = (path.indices(), old_key, new_key) {
            if old != new {
                if let Some(order) = self.row_views.get_mut(row) {
                    for key in order.iter_mut().filter(|k| **k == old) {
                        key.clone_from(&new);
                    }
                    tracing::trace!(row, from = %old, to = %new, "pending row order follows rename");
                }
            }
        }
        Ok(())
    }

    /// Shallow-merges `update` into the field called `name`, wherever it is.
    pub fn update(&mut self, name: &str, update: &FieldUpdate) -> FormcraftResult<FieldPath> {
        let path = self
            .find_path(name)
            .ok_or_else(|| FormcraftError::NotFound(format!("No field named '{name}'")))?;
        self.replace_at(&path, update)?;
        Ok(path)
    }

    /// Removes the field called `name`. A row left empty is removed too.
    pub fn remove(&mut self, name: &str) -> FormcraftResult<FieldDescriptor> {
        self.flush();
        let path = self
            .find_path(name)
            .ok_or_else(|| FormcraftError::NotFound(format!("No field named '{name}'")))?;
        let removed = descriptor_at(&self.entries, &path)
            .cloned()
            .ok_or_else(|| FormcraftError::NotFound(format!("No field at path {path}")))?;
        match *path.indices() {
            [i] => {
                self.entries.remove(i);
            }
            [i, j] => {
                if let FormEntry::Row(row) = &mut self.entries[i] {
                    row.remove(j);
                    if row.is_empty() {
                        self.entries.remove(i);
                    }
                }
            }
            _ => {}
        }
        Ok(removed)
    }

    // ── Save ────────────────────────────────────────────────────────

    /// Stores the form under `name` for `owner`.
    ///
    /// The name is trimmed and must not be empty. Pending row reorders are
    /// applied first so the saved order matches what the author sees.
    pub async fn save(
        &mut self,
        name: &str,
        repo: &dyn FormRepository,
        owner: &str,
    ) -> FormcraftResult<SaveOutcome> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FormcraftError::BadRequest("Form name is required.".to_string()));
        }
        self.flush();

        let document = repo
            .create(NewForm {
                name: name.to_string(),
                owner_id: owner.to_string(),
                fields: self.entries.clone(),
                published: false,
            })
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "saving form failed");
                e
            })?;

        tracing::info!(form_id = %document.id, owner, "form saved");
        Ok(SaveOutcome {
            id: document.id,
            next: Navigation::Index,
        })
    }
}
