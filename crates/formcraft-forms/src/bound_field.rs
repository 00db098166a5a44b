//! Bound fields: a descriptor paired with its value, errors and widget.
//!
//! A [`BoundField`] is what the session renders for each field: the label,
//! the control with the current value, the description and the error list.

use std::collections::HashMap;

use serde_json::Value;

use crate::descriptor::{FieldDescriptor, FieldKind};
use crate::resolver::resolve;
use crate::widgets::{self, escape, AuxContext, Widget};

/// A field bound to its current value and validation state.
#[derive(Debug)]
pub struct BoundField {
    /// The HTML name attribute (the field key).
    pub name: String,
    /// The resolved kind.
    pub kind: FieldKind,
    /// The descriptor this field was built from.
    pub descriptor: FieldDescriptor,
    /// The current value.
    pub value: Option<Value>,
    /// Validation error messages for this field.
    pub errors: Vec<String>,
    /// The widget used for rendering.
    pub widget: Box<dyn Widget>,
}

impl BoundField {
    /// Binds a descriptor. Returns `None` for a descriptor without a key.
    pub fn new(descriptor: &FieldDescriptor, value: Option<Value>, errors: Vec<String>) -> Option<Self> {
        let name = descriptor.key()?.to_string();
        let kind = resolve(descriptor);
        Some(Self {
            name,
            kind,
            descriptor: descriptor.clone(),
            value,
            errors,
            widget: widgets::widget_for_kind(kind, descriptor),
        })
    }

    /// Renders the control.
    pub fn render(&self, extra_attrs: &HashMap<String, String>, aux: &AuxContext) -> String {
        let mut attrs = extra_attrs.clone();
        attrs.entry("id".to_string()).or_insert_with(|| self.auto_id());
        if let Some(placeholder) = &self.descriptor.placeholder {
            attrs
                .entry("placeholder".to_string())
                .or_insert_with(|| placeholder.clone());
        }
        if self.descriptor.required && self.kind != FieldKind::Slider {
            attrs.insert("aria-required".to_string(), "true".to_string());
        }
        if self.descriptor.disabled {
            attrs.insert("disabled".to_string(), "disabled".to_string());
        }
        if self.has_errors() {
            attrs.insert("aria-invalid".to_string(), "true".to_string());
        }
        self.widget.render(&self.name, self.value.as_ref(), &attrs, aux)
    }

    /// Renders a `<label>` for this field.
    pub fn label_tag(&self) -> String {
        let label_id = self.widget.id_for_label(&self.auto_id());
        format!(
            r#"<label for="{}">{}</label>"#,
            escape(&label_id),
            escape(&self.descriptor.label)
        )
    }

    /// Returns the auto-generated HTML `id` for this field.
    pub fn auto_id(&self) -> String {
        format!("id_{}", self.name)
    }

    /// Returns `true` if this field has any errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Renders the error list as an HTML `<ul>`.
    pub fn errors_as_ul(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        let items: String = self
            .errors
            .iter()
            .map(|e| format!("<li>{}</li>", escape(e)))
            .collect();
        format!(r#"<ul class="errorlist">{items}</ul>"#)
    }

    /// Renders the label, control, description and errors wrapped in a `<div>`.
    pub fn as_row(&self, aux: &AuxContext) -> String {
        let description = self
            .descriptor
            .description
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(|d| format!(r#"<p class="description">{}</p>"#, escape(d)))
            .unwrap_or_default();
        format!(
            r#"<div class="field field-{}">{}{}{description}{}</div>"#,
            self.kind,
            self.label_tag(),
            self.render(&HashMap::new(), aux),
            self.errors_as_ul()
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn bind(d: &FieldDescriptor, value: Option<Value>, errors: Vec<String>) -> BoundField {
        BoundField::new(d, value, errors).unwrap()
    }

    #[test]
    fn test_keyless_is_not_bound() {
        assert!(BoundField::new(&FieldDescriptor::default(), None, vec![]).is_none());
    }

    #[test]
    fn test_bound_field_render() {
        let d = FieldDescriptor::new("username", "Username");
        let bf = bind(&d, Some(json!("alice")), vec![]);
        let html = bf.render(&HashMap::new(), &AuxContext::default());
        assert!(html.contains(r#"name="username""#));
        assert!(html.contains(r#"value="alice""#));
        assert!(html.contains(r#"id="id_username""#));
    }

    #[test]
    fn test_bound_field_uses_resolved_kind() {
        let d = FieldDescriptor::new("bio", "Short bio");
        let bf = bind(&d, Some(json!("Hello")), vec![]);
        assert_eq!(bf.kind, FieldKind::Textarea);
        assert!(bf.render(&HashMap::new(), &AuxContext::default()).contains("<textarea"));
    }

    #[test]
    fn test_label_tag_escapes() {
        let d = FieldDescriptor::new("q", "Is 1 < 2?");
        let label = bind(&d, None, vec![]).label_tag();
        assert_eq!(label, r#"<label for="id_q">Is 1 &lt; 2?</label>"#);
    }

    #[test]
    fn test_label_targets_first_radio() {
        let d = FieldDescriptor::new("g", "Gender").with_options(["m", "f"]);
        let label = bind(&d, None, vec![]).label_tag();
        assert!(label.contains(r#"for="id_g_0""#));
    }

    #[test]
    fn test_errors_as_ul() {
        let d = FieldDescriptor::new("email", "Email");
        let bf = bind(&d, None, vec!["Email is required.".into(), "<bad>".into()]);
        let html = bf.errors_as_ul();
        assert!(html.contains(r#"class="errorlist""#));
        assert!(html.contains("<li>Email is required.</li>"));
        assert!(html.contains("<li>&lt;bad&gt;</li>"));
        assert!(bf.render(&HashMap::new(), &AuxContext::default()).contains(r#"aria-invalid="true""#));
    }

    #[test]
    fn test_errors_as_ul_empty() {
        let bf = bind(&FieldDescriptor::new("e", "E"), None, vec![]);
        assert_eq!(bf.errors_as_ul(), "");
        assert!(!bf.has_errors());
    }

    #[test]
    fn test_disabled_and_required() {
        let mut d = FieldDescriptor::new("locked", "Locked").required(true);
        d.disabled = true;
        let html = bind(&d, None, vec![]).render(&HashMap::new(), &AuxContext::default());
        assert!(html.contains(r#"disabled="disabled""#));
        assert!(html.contains(r#"aria-required="true""#));
    }

    #[test]
    fn test_as_row() {
        let mut d = FieldDescriptor::new("u", "User");
        d.description = Some("Your public name.".into());
        let html = bind(&d, None, vec![]).as_row(&AuxContext::default());
        assert!(html.starts_with(r#"<div class="field field-input">"#));
        assert!(html.contains(r#"<p class="description">Your public name.</p>"#));
    }
}
