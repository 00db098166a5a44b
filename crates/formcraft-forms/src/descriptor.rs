//! The field descriptor model.
//!
//! A [`FieldDescriptor`] is the authoring-time declaration of one form field.
//! Descriptors live in a [`FormDocument`] as an ordered list of
//! [`FormEntry`] values, where an entry is either a single field or a
//! row-group of fields rendered side by side (nested one level deep).
//!
//! The persisted wire shape is `{ id, name, json: { fields: [...] } }`.
//! Older documents stored `json` directly as the array of entries; both
//! shapes are accepted by [`FieldsPayload`], which always serializes to the
//! current shape.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use formcraft_core::FormcraftError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The closed set of field kinds a descriptor resolves to.
///
/// [`FieldKind::Input`] is the fallback kind: every descriptor resolves to
/// something renderable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    /// A single boolean checkbox.
    Checkbox,
    /// A boolean toggle switch.
    Switch,
    /// A date picker.
    Date,
    /// A file upload dropzone.
    File,
    /// A masked password input.
    Password,
    /// A telephone number input.
    Phone,
    /// A multi-line text area.
    Textarea,
    /// A signature pad.
    Signature,
    /// A numeric range slider.
    Slider,
    /// A country/state location selector.
    Location,
    /// A multiple-choice selector.
    MultiSelect,
    /// A one-time password input.
    Otp,
    /// A single-choice dropdown.
    Select,
    /// A set of radio buttons.
    RadioGroup,
    /// A star rating.
    Rating,
    /// A free-form tag list.
    Tags,
    /// A plain text input.
    Input,
}

impl FieldKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 17] = [
        Self::Checkbox,
        Self::Switch,
        Self::Date,
        Self::File,
        Self::Password,
        Self::Phone,
        Self::Textarea,
        Self::Signature,
        Self::Slider,
        Self::Location,
        Self::MultiSelect,
        Self::Otp,
        Self::Select,
        Self::RadioGroup,
        Self::Rating,
        Self::Tags,
        Self::Input,
    ];

    /// Returns the wire tag for this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checkbox => "checkbox",
            Self::Switch => "switch",
            Self::Date => "date",
            Self::File => "file",
            Self::Password => "password",
            Self::Phone => "phone",
            Self::Textarea => "textarea",
            Self::Signature => "signature",
            Self::Slider => "slider",
            Self::Location => "location",
            Self::MultiSelect => "multi-select",
            Self::Otp => "otp",
            Self::Select => "select",
            Self::RadioGroup => "radio-group",
            Self::Rating => "rating",
            Self::Tags => "tags",
            Self::Input => "input",
        }
    }

    /// Parses a tag, falling back to [`FieldKind::Input`] for anything unknown.
    pub fn parse_lenient(tag: &str) -> Self {
        tag.parse().unwrap_or(Self::Input)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = FormcraftError;

    /// Parses a tag after trimming and ASCII lower-casing. Unknown tags are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| FormcraftError::BadRequest(format!("Unknown field kind: '{s}'")))
    }
}

/// The declaration of one form field.
///
/// Unknown keys in the wire form (builder-only UI state such as `checked`
/// or `value`) are ignored on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// The field name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// An explicit id; takes precedence over `name` as the field key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The explicit kind tag. Empty means "infer from the label".
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub field_type: String,
    /// The human-readable label.
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    /// An optional hint shown inside the control.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Help text shown under the control.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Choices for choice-bearing kinds.
    #[serde(
        default,
        deserialize_with = "lenient_options",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub options: Vec<String>,
    /// Whether the field must be filled in.
    #[serde(default, deserialize_with = "null_as_default")]
    pub required: bool,
    /// The builder palette variant this field was created from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    /// The row position requested when the field was added.
    #[serde(default, alias = "row_index", skip_serializing_if = "Option::is_none")]
    pub row_index: Option<usize>,
    /// Whether the control is rendered disabled.
    #[serde(default, deserialize_with = "null_as_default")]
    pub disabled: bool,
}

impl FieldDescriptor {
    /// Creates a descriptor with the given name and label and no explicit kind.
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            label: label.into(),
            ..Self::default()
        }
    }

    /// Sets the explicit kind tag.
    #[must_use]
    pub fn with_type(mut self, tag: impl Into<String>) -> Self {
        self.field_type = tag.into();
        self
    }

    /// Marks the field as required.
    #[must_use]
    pub const fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the placeholder.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Sets the options.
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the field key: `id` when non-empty, otherwise `name`.
    ///
    /// A descriptor without a key is skipped by rendering and by schema synthesis.
    pub fn key(&self) -> Option<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or_else(|| self.name.as_deref().filter(|name| !name.is_empty()))
    }

    /// Returns `true` if this descriptor has a usable key.
    pub fn is_usable(&self) -> bool {
        self.key().is_some()
    }
}

/// One top-level entry of a form's field list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormEntry {
    /// Fields rendered side by side.
    Row(Vec<FieldDescriptor>),
    /// A single field.
    Field(FieldDescriptor),
}

impl FormEntry {
    /// Returns the descriptors of this entry in order.
    pub fn descriptors(&self) -> &[FieldDescriptor] {
        match self {
            Self::Row(fields) => fields,
            Self::Field(field) => std::slice::from_ref(field),
        }
    }
}

/// Flattens entries into their descriptors, rows expanded in order.
pub fn flatten(entries: &[FormEntry]) -> Vec<FieldDescriptor> {
    entries
        .iter()
        .flat_map(|entry| entry.descriptors().iter().cloned())
        .collect()
}

/// A persisted form definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDocument {
    /// The document id.
    pub id: String,
    /// The human-provided form name.
    pub name: String,
    /// The principal that owns this document.
    pub owner_id: String,
    /// Whether the form is readable without authentication.
    pub published: bool,
    /// The ordered field list.
    #[serde(rename = "json")]
    pub fields: FieldsPayload,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
    /// When the document was last changed.
    pub updated_at: DateTime<Utc>,
}

impl FormDocument {
    /// Returns all descriptors with row-groups flattened in order.
    pub fn fields(&self) -> Vec<FieldDescriptor> {
        flatten(&self.fields.entries)
    }

    /// Returns the wire shape of this document.
    pub fn to_wire(&self) -> FormWire {
        FormWire {
            id: self.id.clone(),
            name: self.name.clone(),
            json: self.fields.clone(),
        }
    }
}

/// The transmitted shape of a form: `{ id, name, json: { fields } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormWire {
    /// The document id.
    #[serde(default)]
    pub id: String,
    /// The form name.
    #[serde(default)]
    pub name: String,
    /// The field list, current or legacy shape.
    #[serde(default)]
    pub json: FieldsPayload,
}

/// A field list that reads both `{ "fields": [...] }` and a bare `[...]`.
///
/// Entries that are neither a descriptor object nor an array of descriptor
/// objects are dropped with a warning instead of failing the whole document.
///
/// # Examples
///
/// ```
/// use formcraft_forms::descriptor::FieldsPayload;
///
/// let legacy: FieldsPayload = serde_json::from_str(r#"[{"name": "a"}]"#).unwrap();
/// let current: FieldsPayload = serde_json::from_str(r#"{"fields": [{"name": "a"}]}"#).unwrap();
/// assert_eq!(legacy, current);
/// assert_eq!(serde_json::to_value(&legacy).unwrap()["fields"][0]["name"], "a");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawPayload")]
pub struct FieldsPayload {
    /// The top-level entries.
    pub entries: Vec<FormEntry>,
}

impl FieldsPayload {
    /// Wraps a list of entries.
    pub const fn new(entries: Vec<FormEntry>) -> Self {
        Self { entries }
    }
}

impl Serialize for FieldsPayload {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wrapped<'a> {
            fields: &'a [FormEntry],
        }

        Wrapped {
            fields: &self.entries,
        }
        .serialize(serializer)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPayload {
    Legacy(Vec<Value>),
    Wrapped {
        #[serde(default)]
        fields: Vec<Value>,
    },
    Other(Value),
}

impl From<RawPayload> for FieldsPayload {
    fn from(raw: RawPayload) -> Self {
        let values = match raw {
            RawPayload::Legacy(values) | RawPayload::Wrapped { fields: values } => values,
            RawPayload::Other(value) => {
                if !value.is_null() {
                    tracing::warn!("ignoring field list that is neither an array nor an object");
                }
                Vec::new()
            }
        };
        Self {
            entries: values.into_iter().filter_map(entry_from_value).collect(),
        }
    }
}

fn entry_from_value(value: Value) -> Option<FormEntry> {
    match value {
        Value::Array(items) => {
            let row: Vec<FieldDescriptor> =
                items.into_iter().filter_map(descriptor_from_value).collect();
            Some(FormEntry::Row(row))
        }
        other => descriptor_from_value(other).map(FormEntry::Field),
    }
}

fn descriptor_from_value(value: Value) -> Option<FieldDescriptor> {
    if !value.is_object() {
        tracing::warn!(%value, "skipping non-object field descriptor");
        return None;
    }
    match serde_json::from_value(value) {
        Ok(descriptor) => Some(descriptor),
        Err(e) => {
            tracing::warn!(error = %e, "skipping malformed field descriptor");
            None
        }
    }
}

// ============================================================
// Lenient deserializers
// ============================================================

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts strings, scalars and `{ value, label }` objects as options.
fn lenient_options<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Object(map) => map
                .get("value")
                .or_else(|| map.get("label"))
                .and_then(Value::as_str)
                .map(String::from),
            Value::Null | Value::Array(_) => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_kind_tags_roundtrip_through_from_str() {
        for kind in FieldKind::ALL {
            assert_eq!(kind.as_str().parse::<FieldKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_kind_from_str_normalizes() {
        assert_eq!(" Multi-Select ".parse::<FieldKind>().unwrap(), FieldKind::MultiSelect);
        assert!("combobox".parse::<FieldKind>().is_err());
    }

    #[test]
    fn test_kind_parse_lenient() {
        assert_eq!(FieldKind::parse_lenient("radio-group"), FieldKind::RadioGroup);
        assert_eq!(FieldKind::parse_lenient("hologram"), FieldKind::Input);
    }

    #[test]
    fn test_kind_serde_uses_tags() {
        assert_eq!(serde_json::to_value(FieldKind::RadioGroup).unwrap(), "radio-group");
        let kind: FieldKind = serde_json::from_value(json!("multi-select")).unwrap();
        assert_eq!(kind, FieldKind::MultiSelect);
    }

    #[test]
    fn test_key_prefers_id() {
        let mut d = FieldDescriptor::new("email", "Email");
        assert_eq!(d.key(), Some("email"));
        d.id = Some("contact_email".into());
        assert_eq!(d.key(), Some("contact_email"));
        d.id = Some(String::new());
        assert_eq!(d.key(), Some("email"));
    }

    #[test]
    fn test_key_missing() {
        let d = FieldDescriptor {
            label: "Orphan".into(),
            ..FieldDescriptor::default()
        };
        assert!(!d.is_usable());
        let d = FieldDescriptor::new("", "Empty");
        assert!(!d.is_usable());
    }

    #[test]
    fn test_descriptor_deserialize_defaults() {
        let d: FieldDescriptor = serde_json::from_value(json!({
            "name": "bio",
            "label": "Bio",
            "checked": true,
            "onChange": null
        }))
        .unwrap();
        assert_eq!(d.field_type, "");
        assert!(!d.required);
        assert!(d.options.is_empty());
        assert!(!d.disabled);
    }

    #[test]
    fn test_descriptor_deserialize_nulls() {
        let d: FieldDescriptor = serde_json::from_value(json!({
            "name": "x",
            "type": null,
            "label": null,
            "required": null,
            "options": null
        }))
        .unwrap();
        assert_eq!(d.field_type, "");
        assert_eq!(d.label, "");
        assert!(!d.required);
    }

    #[test]
    fn test_descriptor_row_index_camel_and_snake() {
        let a: FieldDescriptor = serde_json::from_value(json!({"name": "a", "rowIndex": 2})).unwrap();
        let b: FieldDescriptor = serde_json::from_value(json!({"name": "a", "row_index": 2})).unwrap();
        assert_eq!(a.row_index, Some(2));
        assert_eq!(a, b);
    }

    #[test]
    fn test_lenient_options() {
        let d: FieldDescriptor = serde_json::from_value(json!({
            "name": "pick",
            "options": ["a", 2, true, {"value": "v", "label": "V"}, {"label": "only-label"}, null]
        }))
        .unwrap();
        assert_eq!(d.options, vec!["a", "2", "true", "v", "only-label"]);
    }

    #[test]
    fn test_payload_legacy_and_current_match() {
        let legacy: FieldsPayload =
            serde_json::from_value(json!([{"name": "a"}, [{"name": "b"}, {"name": "c"}]])).unwrap();
        let current: FieldsPayload = serde_json::from_value(
            json!({"fields": [{"name": "a"}, [{"name": "b"}, {"name": "c"}]]}),
        )
        .unwrap();
        assert_eq!(legacy, current);
        assert!(matches!(current.entries[1], FormEntry::Row(ref r) if r.len() == 2));
    }

    #[test]
    fn test_payload_skips_garbage_entries() {
        let payload: FieldsPayload =
            serde_json::from_value(json!([{"name": "a"}, "oops", 7, [{"name": "b"}, 3]])).unwrap();
        assert_eq!(payload.entries.len(), 2);
        assert_eq!(flatten(&payload.entries).len(), 2);
    }

    #[test]
    fn test_payload_null_and_missing() {
        let wire: FormWire = serde_json::from_value(json!({"id": "f1", "name": "N", "json": null})).unwrap();
        assert!(wire.json.entries.is_empty());
        let wire: FormWire = serde_json::from_value(json!({"id": "f1", "name": "N"})).unwrap();
        assert!(wire.json.entries.is_empty());
    }

    #[test]
    fn test_payload_serializes_current_shape() {
        let payload = FieldsPayload::new(vec![FormEntry::Field(FieldDescriptor::new("a", "A"))]);
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["fields"][0]["name"], "a");
        assert_eq!(value["fields"][0]["type"], "");
    }

    #[test]
    fn test_flatten_preserves_order() {
        let entries = vec![
            FormEntry::Field(FieldDescriptor::new("a", "A")),
            FormEntry::Row(vec![
                FieldDescriptor::new("b", "B"),
                FieldDescriptor::new("c", "C"),
            ]),
            FormEntry::Field(FieldDescriptor::new("d", "D")),
        ];
        let names: Vec<_> = flatten(&entries)
            .into_iter()
            .filter_map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }
}
