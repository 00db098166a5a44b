//! Validation schema synthesis.
//!
//! [`synthesize`] maps a field list to a [`ValidationSchema`] in a single
//! pass over the resolved kinds. The schema is derived data: it carries a
//! content key (SHA-256 of the canonical JSON of the usable descriptors) so
//! that [`SchemaCache`] can skip rebuilding it while the field list is
//! unchanged and must rebuild it as soon as the list differs.

use std::fmt::Write as _;

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::descriptor::{FieldDescriptor, FieldKind};
use crate::resolver::resolve;

/// The value type a rule checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// `true`/`false`.
    Boolean,
    /// Text, or a list of strings for multi-valued kinds.
    String,
    /// Anything coercible to a date.
    Date,
    /// A number.
    Number,
}

/// The validation rule for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    /// The resolved field kind the rule was derived from.
    pub field_kind: FieldKind,
    /// The value type checked.
    pub kind: RuleKind,
    /// Whether a value must be present.
    pub required: bool,
    /// For booleans: the value must be exactly `true`.
    pub must_be_true: bool,
    /// For strings: the minimum length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// The value used when none is supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// The label used in error messages.
    pub label: String,
    /// The message reported when a required rule is not met.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Rule {
    /// Builds the rule for a descriptor resolved to `field_kind`.
    pub fn for_field(descriptor: &FieldDescriptor, field_kind: FieldKind) -> Self {
        let label = descriptor.label.clone();
        let required_message = format!("{label} is required.");

        let mut rule = Self {
            field_kind,
            kind: RuleKind::String,
            required: false,
            must_be_true: false,
            min_length: None,
            default: None,
            label,
            message: None,
        };

        match field_kind {
            FieldKind::Checkbox | FieldKind::Switch => {
                rule.kind = RuleKind::Boolean;
                rule.default = Some(Value::Bool(false));
                if descriptor.required {
                    rule.must_be_true = true;
                    rule.message = Some(required_message);
                }
            }
            FieldKind::Date => {
                rule.kind = RuleKind::Date;
                if descriptor.required {
                    rule.required = true;
                    rule.message = Some(required_message);
                }
            }
            // Sliders are never hard-required.
            FieldKind::Slider => rule.kind = RuleKind::Number,
            _ => {
                if descriptor.required {
                    rule.required = true;
                    rule.min_length = Some(1);
                    rule.message = Some(required_message);
                } else {
                    rule.default = Some(Value::String(String::new()));
                }
            }
        }
        rule
    }

    /// The initial value a fresh session shows for this field, if any.
    pub fn initial_value(&self) -> Option<Value> {
        match self.field_kind {
            FieldKind::Checkbox | FieldKind::Switch => Some(Value::Bool(false)),
            FieldKind::MultiSelect => Some(Value::Array(Vec::new())),
            FieldKind::Slider => None,
            _ => Some(Value::String(String::new())),
        }
    }
}

/// An ordered mapping from field key to [`Rule`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationSchema {
    rules: Vec<(String, Rule)>,
    content_key: String,
}

impl ValidationSchema {
    /// Returns the rules in field order.
    pub fn rules(&self) -> &[(String, Rule)] {
        &self.rules
    }

    /// Returns the rule for a field key.
    pub fn rule(&self, key: &str) -> Option<&Rule> {
        self.rules.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    /// Returns the structural content key of the field list this schema came from.
    pub fn content_key(&self) -> &str {
        &self.content_key
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the schema has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the values a fresh session starts with.
    ///
    /// Multi-selects start as `[]`, checkboxes and switches as `false`, sliders
    /// are absent and everything else starts as `""`.
    pub fn default_values(&self) -> Map<String, Value> {
        self.rules
            .iter()
            .filter_map(|(key, rule)| rule.initial_value().map(|v| (key.clone(), v)))
            .collect()
    }
}

/// Builds the validation schema for a field list.
///
/// Descriptors without a key are skipped. When two descriptors share a key
/// the later one's rule wins and keeps the first one's position.
/// Deterministic and side-effect free.
pub fn synthesize(fields: &[FieldDescriptor]) -> ValidationSchema {
    let mut rules: Vec<(String, Rule)> = Vec::with_capacity(fields.len());
    for descriptor in fields {
        let Some(key) = descriptor.key() else {
            continue;
        };
        let rule = Rule::for_field(descriptor, resolve(descriptor));
        match rules.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = rule,
            None => rules.push((key.to_string(), rule)),
        }
    }

    ValidationSchema {
        rules,
        content_key: content_key(fields),
    }
}

/// Computes the structural key of a field list.
///
/// Only usable descriptors contribute, so adding or removing a keyless
/// descriptor does not change the key.
pub fn content_key(fields: &[FieldDescriptor]) -> String {
    let mut hasher = Sha256::new();
    for descriptor in fields.iter().filter(|d| d.is_usable()) {
        // Serializing a plain struct of strings, bools and options cannot fail.
        if let Ok(bytes) = serde_json::to_vec(descriptor) {
            hasher.update(&bytes);
        }
        hasher.update(b"\n");
    }
    hasher
        .finalize()
        .iter()
        .fold(String::with_capacity(64), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}

/// Memoizes the last synthesized schema by content key.
#[derive(Debug, Default)]
pub struct SchemaCache {
    current: Option<ValidationSchema>,
    builds: usize,
}

impl SchemaCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the schema for `fields`, rebuilding it only if their content key
    /// differs from the cached one.
    pub fn get_or_synthesize(&mut self, fields: &[FieldDescriptor]) -> &ValidationSchema {
        let key = content_key(fields);
        let stale = self
            .current
            .as_ref()
            .map_or(true, |schema| schema.content_key != key);
        if stale {
            tracing::debug!(content_key = %key, "synthesizing validation schema");
            self.builds += 1;
            self.current = Some(synthesize(fields));
        }
        self.current.get_or_insert_with(|| synthesize(fields))
    }

    /// Returns how many times a schema has been built.
    pub const fn builds(&self) -> usize {
        self.builds
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn field(name: &str, label: &str, required: bool) -> FieldDescriptor {
        FieldDescriptor::new(name, label).required(required)
    }

    #[test]
    fn test_checkbox_rules() {
        let schema = synthesize(&[
            field("a", "Accept", true).with_type("checkbox"),
            field("b", "News", false).with_type("switch"),
        ]);
        let a = schema.rule("a").unwrap();
        assert_eq!(a.kind, RuleKind::Boolean);
        assert!(a.must_be_true);
        assert_eq!(a.default, Some(json!(false)));
        assert_eq!(a.message.as_deref(), Some("Accept is required."));

        let b = schema.rule("b").unwrap();
        assert!(!b.must_be_true);
        assert!(b.message.is_none());
    }

    #[test]
    fn test_date_rule() {
        let schema = synthesize(&[field("dob", "Date of Birth", true)]);
        let rule = schema.rule("dob").unwrap();
        assert_eq!(rule.field_kind, FieldKind::Date);
        assert_eq!(rule.kind, RuleKind::Date);
        assert!(rule.required);
    }

    #[test]
    fn test_slider_never_required() {
        let schema = synthesize(&[field("promo", "Price Slider", true)]);
        let rule = schema.rule("promo").unwrap();
        assert_eq!(rule.kind, RuleKind::Number);
        assert!(!rule.required);
        assert!(rule.default.is_none());
    }

    #[test]
    fn test_string_rules() {
        let schema = synthesize(&[field("u", "Username", true), field("n", "Nickname", false)]);
        let u = schema.rule("u").unwrap();
        assert_eq!(u.min_length, Some(1));
        assert_eq!(u.message.as_deref(), Some("Username is required."));
        let n = schema.rule("n").unwrap();
        assert!(!n.required);
        assert_eq!(n.default, Some(json!("")));
    }

    #[test]
    fn test_keyless_skipped() {
        let keyless = FieldDescriptor {
            label: "Ghost".into(),
            ..FieldDescriptor::default()
        };
        let schema = synthesize(&[keyless, field("a", "A", false)]);
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.rules()[0].0, "a");
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let schema = synthesize(&[
            field("dup", "Date of Birth", true),
            field("other", "Other", false),
            field("dup", "Bio", false),
        ]);
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.rules()[0].0, "dup");
        let rule = schema.rule("dup").unwrap();
        assert_eq!(rule.field_kind, FieldKind::Textarea);
        assert_eq!(rule.label, "Bio");
        assert!(!rule.required);
    }

    #[test]
    fn test_id_is_key() {
        let mut d = field("name", "Name", false);
        d.id = Some("the_id".into());
        let schema = synthesize(&[d]);
        assert!(schema.rule("the_id").is_some());
        assert!(schema.rule("name").is_none());
    }

    #[test]
    fn test_deterministic() {
        let fields = vec![
            field("a", "Email", true),
            field("b", "Gender", false).with_options(["x", "y"]),
        ];
        assert_eq!(synthesize(&fields), synthesize(&fields.clone()));
    }

    #[test]
    fn test_default_values() {
        let schema = synthesize(&[
            field("c", "C", false).with_type("checkbox"),
            field("m", "M", false).with_type("multi-select"),
            field("s", "S", false).with_type("slider"),
            field("d", "D", true).with_type("date"),
            field("t", "T", true),
        ]);
        let values = schema.default_values();
        assert_eq!(values.get("c"), Some(&json!(false)));
        assert_eq!(values.get("m"), Some(&json!([])));
        assert!(!values.contains_key("s"));
        assert_eq!(values.get("d"), Some(&json!("")));
        assert_eq!(values.get("t"), Some(&json!("")));
    }

    #[test]
    fn test_content_key_changes_with_content() {
        let a = vec![field("a", "A", false)];
        let b = vec![field("a", "A", true)];
        assert_ne!(content_key(&a), content_key(&b));
        assert_eq!(content_key(&a), content_key(&a.clone()));
        assert_eq!(content_key(&a).len(), 64);
    }

    #[test]
    fn test_content_key_ignores_keyless() {
        let a = vec![field("a", "A", false)];
        let mut b = a.clone();
        b.push(FieldDescriptor::default());
        assert_eq!(content_key(&a), content_key(&b));
    }

    #[test]
    fn test_cache_reuses_and_rebuilds() {
        let mut cache = SchemaCache::new();
        let fields = vec![field("a", "A", false)];
        cache.get_or_synthesize(&fields);
        cache.get_or_synthesize(&fields);
        assert_eq!(cache.builds(), 1);

        let changed = vec![field("a", "A", true)];
        let schema = cache.get_or_synthesize(&changed);
        assert!(schema.rule("a").unwrap().required);
        assert_eq!(cache.builds(), 2);
    }
}
