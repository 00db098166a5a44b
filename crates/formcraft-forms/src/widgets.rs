//! Widgets: one HTML control per field kind.
//!
//! A [`Widget`] renders the control for a field with its current value and
//! reads the edited value back out of submitted [`FormData`]. The two
//! directions together bind a control to the session's value store: values
//! flow in through [`Widget::render`] and edits flow out through
//! [`Widget::value_from_data`].
//!
//! [`widget_for_kind`] selects the widget for a [`FieldKind`] with an
//! exhaustive match, so adding a kind fails to compile until it has a widget.
//!
//! Some controls need per-render state that is not part of the field's
//! value: the uploaded file list, the dropzone limits, the signature canvas
//! handle and the selected country/state. That state travels in an
//! [`AuxContext`] passed to every render call.
//!
//! All text and attribute output is HTML-escaped.

use std::collections::HashMap;
use std::fmt::{self, Write as _};

use formcraft_core::settings::DropzoneSettings;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::descriptor::{FieldDescriptor, FieldKind};
use crate::form_data::FormData;

// ============================================================
// Auxiliary context
// ============================================================

/// Metadata of a file selected for upload. File bytes never reach the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// The file name as reported by the client.
    pub name: String,
    /// The size in bytes.
    pub size: u64,
}

/// A handle identifying the canvas element a signature pad draws on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasHandle(pub String);

/// The country/state currently selected in a location control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSelection {
    /// The selected country name.
    pub country: Option<String>,
    /// The selected state or region name.
    pub state: Option<String>,
}

/// Side-channel state for one form render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuxContext {
    /// Files currently selected in the upload dropzone.
    pub files: Vec<UploadedFile>,
    /// Dropzone limits.
    pub dropzone: DropzoneSettings,
    /// The signature canvas, when the host has one.
    pub canvas: Option<CanvasHandle>,
    /// The location selection.
    pub location: LocationSelection,
}

impl AuxContext {
    /// Creates a context with the given dropzone limits and nothing selected.
    pub fn new(dropzone: DropzoneSettings) -> Self {
        Self {
            dropzone,
            ..Self::default()
        }
    }

    /// Sets the selected files.
    #[must_use]
    pub fn with_files(mut self, files: Vec<UploadedFile>) -> Self {
        self.files = files;
        self
    }

    /// Sets the signature canvas handle.
    #[must_use]
    pub fn with_canvas(mut self, handle: impl Into<String>) -> Self {
        self.canvas = Some(CanvasHandle(handle.into()));
        self
    }

    /// Sets the location selection.
    #[must_use]
    pub fn with_location(mut self, country: Option<String>, state: Option<String>) -> Self {
        self.location = LocationSelection { country, state };
        self
    }
}

// ============================================================
// Widget trait
// ============================================================

/// A renderable, bidirectionally bound form control.
pub trait Widget: Send + Sync + fmt::Debug {
    /// Returns the field kind this widget renders.
    fn kind(&self) -> FieldKind;

    /// Renders the control as HTML.
    ///
    /// # Arguments
    /// - `name` - The HTML `name` attribute (the field key)
    /// - `value` - The current value, if any
    /// - `attrs` - Additional HTML attributes
    /// - `aux` - Side-channel state for this render
    fn render(
        &self,
        name: &str,
        value: Option<&Value>,
        attrs: &HashMap<String, String>,
        aux: &AuxContext,
    ) -> String;

    /// Extracts the edited value from submitted data.
    ///
    /// Returns `None` if nothing was submitted for this field.
    fn value_from_data(&self, data: &FormData, name: &str) -> Option<Value>;

    /// Returns the `id` a `<label>` for this control should point at.
    fn id_for_label(&self, id: &str) -> String {
        id.to_string()
    }
}

/// Escapes text for use in HTML content and attribute values.
///
/// # Examples
///
/// ```
/// use formcraft_forms::widgets::escape;
///
/// assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;");
/// ```
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

/// Formats attributes as ` key="value"`, sorted by key for stable output.
fn render_attrs(attrs: &HashMap<String, String>) -> String {
    let mut keys: Vec<&String> = attrs.keys().collect();
    keys.sort();
    keys.into_iter().fold(String::new(), |mut out, k| {
        let _ = write!(out, r#" {}="{}""#, escape(k), escape(&attrs[k]));
        out
    })
}

/// Renders a value as the text an input shows.
fn value_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(items)) => value_list(items).join(","),
        Some(Value::Null | Value::Object(_)) | None => String::new(),
    }
}

fn value_list(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

/// Returns the selected values of a multi-valued field.
fn selected_values(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => value_list(items),
        Some(Value::String(s)) => split_list(s),
        _ => Vec::new(),
    }
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}

fn text_value(data: &FormData, name: &str) -> Option<Value> {
    data.get(name).map(|v| Value::String(v.to_string()))
}

fn input_tag(input_type: &str, name: &str, value: &str, attrs: &HashMap<String, String>) -> String {
    format!(
        r#"<input type="{input_type}" name="{}" value="{}"{} />"#,
        escape(name),
        escape(value),
        render_attrs(attrs)
    )
}

fn choice_id(attrs: &HashMap<String, String>, name: &str, suffix: impl fmt::Display) -> String {
    let base = attrs.get("id").map_or(name, String::as_str);
    format!("{base}_{suffix}")
}

// ============================================================
// Text-like widgets
// ============================================================

/// `<input type="text">`, the fallback control.
#[derive(Debug, Clone)]
pub struct TextInput;

impl Widget for TextInput {
    fn kind(&self) -> FieldKind {
        FieldKind::Input
    }

    fn render(
        &self,
        name: &str,
        value: Option<&Value>,
        attrs: &HashMap<String, String>,
        _aux: &AuxContext,
    ) -> String {
        input_tag("text", name, &value_text(value), attrs)
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<Value> {
        text_value(data, name)
    }
}

/// `<input type="password">`. The current value is never written back out.
#[derive(Debug, Clone)]
pub struct PasswordInput;

impl Widget for PasswordInput {
    fn kind(&self) -> FieldKind {
        FieldKind::Password
    }

    fn render(
        &self,
        name: &str,
        _value: Option<&Value>,
        attrs: &HashMap<String, String>,
        _aux: &AuxContext,
    ) -> String {
        input_tag("password", name, "", attrs)
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<Value> {
        text_value(data, name)
    }
}

/// `<input type="tel">`.
#[derive(Debug, Clone)]
pub struct PhoneInput;

impl Widget for PhoneInput {
    fn kind(&self) -> FieldKind {
        FieldKind::Phone
    }

    fn render(
        &self,
        name: &str,
        value: Option<&Value>,
        attrs: &HashMap<String, String>,
        _aux: &AuxContext,
    ) -> String {
        let mut attrs = attrs.clone();
        attrs.insert("autocomplete".to_string(), "tel".to_string());
        input_tag("tel", name, &value_text(value), &attrs)
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<Value> {
        text_value(data, name)
    }
}

/// `<textarea>`.
#[derive(Debug, Clone)]
pub struct Textarea;

impl Widget for Textarea {
    fn kind(&self) -> FieldKind {
        FieldKind::Textarea
    }

    fn render(
        &self,
        name: &str,
        value: Option<&Value>,
        attrs: &HashMap<String, String>,
        _aux: &AuxContext,
    ) -> String {
        format!(
            r#"<textarea name="{}"{}>{}</textarea>"#,
            escape(name),
            render_attrs(attrs),
            escape(&value_text(value))
        )
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<Value> {
        text_value(data, name)
    }
}

/// `<input type="date">`.
#[derive(Debug, Clone)]
pub struct DateInput;

impl Widget for DateInput {
    fn kind(&self) -> FieldKind {
        FieldKind::Date
    }

    fn render(
        &self,
        name: &str,
        value: Option<&Value>,
        attrs: &HashMap<String, String>,
        _aux: &AuxContext,
    ) -> String {
        // The date input only understands the date part.
        let text = value_text(value);
        let date = text.get(..10).unwrap_or(&text);
        input_tag("date", name, date, attrs)
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<Value> {
        text_value(data, name)
    }
}

/// A six-digit one-time password input.
#[derive(Debug, Clone)]
pub struct OtpInput;

impl OtpInput {
    /// The number of digits an OTP has.
    pub const LENGTH: usize = 6;
}

impl Widget for OtpInput {
    fn kind(&self) -> FieldKind {
        FieldKind::Otp
    }

    fn render(
        &self,
        name: &str,
        value: Option<&Value>,
        attrs: &HashMap<String, String>,
        _aux: &AuxContext,
    ) -> String {
        let mut attrs = attrs.clone();
        attrs.insert("inputmode".to_string(), "numeric".to_string());
        attrs.insert("autocomplete".to_string(), "one-time-code".to_string());
        attrs.insert("maxlength".to_string(), Self::LENGTH.to_string());
        attrs.insert("pattern".to_string(), "[0-9]*".to_string());
        input_tag("text", name, &value_text(value), &attrs)
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<Value> {
        data.get(name)
            .map(|v| Value::String(v.chars().filter(|c| !c.is_whitespace()).collect()))
    }
}

// ============================================================
// Boolean widgets
// ============================================================

fn checked_from_data(data: &FormData, name: &str) -> Value {
    let checked = data
        .get(name)
        .is_some_and(|v| !matches!(v.to_ascii_lowercase().as_str(), "false" | "off" | "0" | "no"));
    Value::Bool(checked)
}

fn is_checked(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.as_str(), "true" | "on" | "1" | "yes"),
        _ => false,
    }
}

/// `<input type="checkbox">`.
#[derive(Debug, Clone)]
pub struct CheckboxInput;

impl Widget for CheckboxInput {
    fn kind(&self) -> FieldKind {
        FieldKind::Checkbox
    }

    fn render(
        &self,
        name: &str,
        value: Option<&Value>,
        attrs: &HashMap<String, String>,
        _aux: &AuxContext,
    ) -> String {
        let checked = if is_checked(value) { " checked" } else { "" };
        format!(
            r#"<input type="checkbox" name="{}" value="on"{}{checked} />"#,
            escape(name),
            render_attrs(attrs)
        )
    }

    /// An unchecked box is absent from posted data, so absence reads as `false`.
    fn value_from_data(&self, data: &FormData, name: &str) -> Option<Value> {
        Some(checked_from_data(data, name))
    }
}

/// A checkbox styled as a toggle switch.
#[derive(Debug, Clone)]
pub struct SwitchInput;

impl Widget for SwitchInput {
    fn kind(&self) -> FieldKind {
        FieldKind::Switch
    }

    fn render(
        &self,
        name: &str,
        value: Option<&Value>,
        attrs: &HashMap<String, String>,
        _aux: &AuxContext,
    ) -> String {
        let checked = if is_checked(value) { " checked" } else { "" };
        format!(
            r#"<input type="checkbox" role="switch" name="{}" value="on"{}{checked} />"#,
            escape(name),
            render_attrs(attrs)
        )
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<Value> {
        Some(checked_from_data(data, name))
    }
}

// ============================================================
// Choice widgets
// ============================================================

/// A `<select>` dropdown fed from the descriptor's options.
#[derive(Debug, Clone, Default)]
pub struct Select {
    /// The available options.
    pub options: Vec<String>,
    /// Text of the empty leading option.
    pub placeholder: Option<String>,
}

impl Select {
    /// Creates a new `Select` with the given options.
    pub fn new(options: Vec<String>, placeholder: Option<String>) -> Self {
        Self {
            options,
            placeholder,
        }
    }
}

impl Widget for Select {
    fn kind(&self) -> FieldKind {
        FieldKind::Select
    }

    fn render(
        &self,
        name: &str,
        value: Option<&Value>,
        attrs: &HashMap<String, String>,
        _aux: &AuxContext,
    ) -> String {
        let current = value_text(value);
        let mut html = format!(r#"<select name="{}"{}>"#, escape(name), render_attrs(attrs));
        let none_selected = if current.is_empty() { " selected" } else { "" };
        let placeholder = self.placeholder.as_deref().unwrap_or("");
        let _ = write!(
            html,
            r#"<option value="" disabled{none_selected}>{}</option>"#,
            escape(placeholder)
        );
        for option in &self.options {
            let selected = if *option == current { " selected" } else { "" };
            let option = escape(option);
            let _ = write!(html, r#"<option value="{option}"{selected}>{option}</option>"#);
        }
        html.push_str("</select>");
        html
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<Value> {
        text_value(data, name)
    }
}

/// A `<select multiple>` whose value is a list.
#[derive(Debug, Clone, Default)]
pub struct MultiSelect {
    /// The available options.
    pub options: Vec<String>,
}

impl MultiSelect {
    /// Creates a new `MultiSelect` with the given options.
    pub fn new(options: Vec<String>) -> Self {
        Self { options }
    }
}

impl Widget for MultiSelect {
    fn kind(&self) -> FieldKind {
        FieldKind::MultiSelect
    }

    fn render(
        &self,
        name: &str,
        value: Option<&Value>,
        attrs: &HashMap<String, String>,
        _aux: &AuxContext,
    ) -> String {
        let selected_values = selected_values(value);
        let mut html = format!(
            r#"<select name="{}" multiple{}>"#,
            escape(name),
            render_attrs(attrs)
        );
        for option in &self.options {
            let selected = if selected_values.contains(option) { " selected" } else { "" };
            let option = escape(option);
            let _ = write!(html, r#"<option value="{option}"{selected}>{option}</option>"#);
        }
        html.push_str("</select>");
        html
    }

    /// Nothing selected posts nothing, so absence reads as an empty list.
    fn value_from_data(&self, data: &FormData, name: &str) -> Option<Value> {
        let values = data.get_list(name).unwrap_or_default();
        Some(Value::Array(
            values
                .iter()
                .filter(|v| !v.is_empty())
                .map(|v| Value::String(v.clone()))
                .collect(),
        ))
    }
}

/// A group of `<input type="radio">` elements.
#[derive(Debug, Clone, Default)]
pub struct RadioGroup {
    /// The available options.
    pub options: Vec<String>,
}

impl RadioGroup {
    /// Creates a new `RadioGroup` with the given options.
    pub fn new(options: Vec<String>) -> Self {
        Self { options }
    }
}

impl Widget for RadioGroup {
    fn kind(&self) -> FieldKind {
        FieldKind::RadioGroup
    }

    fn render(
        &self,
        name: &str,
        value: Option<&Value>,
        attrs: &HashMap<String, String>,
        _aux: &AuxContext,
    ) -> String {
        let current = value_text(value);
        let escaped_name = escape(name);
        let mut html = String::from(r#"<div role="radiogroup">"#);
        for (i, option) in self.options.iter().enumerate() {
            let checked = if *option == current { " checked" } else { "" };
            let option_id = escape(&choice_id(attrs, name, i));
            let option = escape(option);
            let _ = write!(
                html,
                r#"<div><input type="radio" name="{escaped_name}" value="{option}" id="{option_id}"{checked} /> <label for="{option_id}">{option}</label></div>"#
            );
        }
        html.push_str("</div>");
        html
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<Value> {
        text_value(data, name)
    }

    fn id_for_label(&self, id: &str) -> String {
        format!("{id}_0")
    }
}

/// A five-star rating built from radio inputs.
#[derive(Debug, Clone)]
pub struct RatingInput;

impl RatingInput {
    /// The highest rating.
    pub const MAX: u8 = 5;
}

impl Widget for RatingInput {
    fn kind(&self) -> FieldKind {
        FieldKind::Rating
    }

    fn render(
        &self,
        name: &str,
        value: Option<&Value>,
        attrs: &HashMap<String, String>,
        _aux: &AuxContext,
    ) -> String {
        let current = value_text(value);
        let escaped_name = escape(name);
        let mut html = String::from(r#"<div class="rating">"#);
        for star in 1..=Self::MAX {
            let checked = if current == star.to_string() { " checked" } else { "" };
            let star_id = escape(&choice_id(attrs, name, star));
            let _ = write!(
                html,
                r#"<input type="radio" name="{escaped_name}" value="{star}" id="{star_id}" aria-label="{star} star"{checked} />"#
            );
        }
        html.push_str("</div>");
        html
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<Value> {
        text_value(data, name)
    }

    fn id_for_label(&self, id: &str) -> String {
        format!("{id}_1")
    }
}

/// A free-form tag list entered as comma-separated text.
#[derive(Debug, Clone)]
pub struct TagsInput;

impl Widget for TagsInput {
    fn kind(&self) -> FieldKind {
        FieldKind::Tags
    }

    fn render(
        &self,
        name: &str,
        value: Option<&Value>,
        attrs: &HashMap<String, String>,
        _aux: &AuxContext,
    ) -> String {
        let mut attrs = attrs.clone();
        attrs.insert("data-role".to_string(), "tags".to_string());
        attrs
            .entry("placeholder".to_string())
            .or_insert_with(|| "Enter your tags".to_string());
        input_tag("text", name, &selected_values(value).join(","), &attrs)
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<Value> {
        let values = data.get_list(name)?;
        Some(Value::Array(
            values
                .iter()
                .flat_map(|v| split_list(v.as_str()))
                .map(Value::String)
                .collect(),
        ))
    }
}

// ============================================================
// Widgets with side channels
// ============================================================

/// A `<input type="range">` from 0 to 100 in steps of 5.
#[derive(Debug, Clone)]
pub struct RangeSlider;

impl RangeSlider {
    /// The position shown when the field has no value.
    pub const INITIAL: u8 = 5;
}

impl Widget for RangeSlider {
    fn kind(&self) -> FieldKind {
        FieldKind::Slider
    }

    fn render(
        &self,
        name: &str,
        value: Option<&Value>,
        attrs: &HashMap<String, String>,
        _aux: &AuxContext,
    ) -> String {
        let mut text = value_text(value);
        if text.is_empty() {
            text = Self::INITIAL.to_string();
        }
        let mut attrs = attrs.clone();
        attrs.insert("min".to_string(), "0".to_string());
        attrs.insert("max".to_string(), "100".to_string());
        attrs.insert("step".to_string(), "5".to_string());
        input_tag("range", name, &text, &attrs)
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<Value> {
        text_value(data, name)
    }
}

/// An upload dropzone limited by [`AuxContext::dropzone`], listing
/// [`AuxContext::files`].
#[derive(Debug, Clone)]
pub struct FileDropzone;

impl Widget for FileDropzone {
    fn kind(&self) -> FieldKind {
        FieldKind::File
    }

    fn render(
        &self,
        name: &str,
        _value: Option<&Value>,
        attrs: &HashMap<String, String>,
        aux: &AuxContext,
    ) -> String {
        let dz = &aux.dropzone;
        let multiple = if dz.multiple { " multiple" } else { "" };
        let mut html = format!(
            r#"<div class="dropzone" data-max-files="{}" data-max-size="{}"><input type="file" name="{}"{}{multiple} />"#,
            dz.max_files,
            dz.max_size,
            escape(name),
            render_attrs(attrs)
        );
        if !aux.files.is_empty() {
            html.push_str(r#"<ul class="file-list">"#);
            for file in aux.files.iter().take(dz.max_files) {
                let _ = write!(html, "<li>{}</li>", escape(&file.name));
            }
            html.push_str("</ul>");
        }
        html.push_str("</div>");
        html
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<Value> {
        let names: Vec<&str> = data
            .get_list(name)?
            .iter()
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .collect();
        Some(Value::String(names.join(", ")))
    }
}

/// A signature pad drawing on the canvas named by [`AuxContext::canvas`].
///
/// The signature itself (a data URL) is carried in a hidden input.
#[derive(Debug, Clone)]
pub struct SignaturePad;

impl Widget for SignaturePad {
    fn kind(&self) -> FieldKind {
        FieldKind::Signature
    }

    fn render(
        &self,
        name: &str,
        value: Option<&Value>,
        attrs: &HashMap<String, String>,
        aux: &AuxContext,
    ) -> String {
        let canvas_id = aux
            .canvas
            .as_ref()
            .map_or_else(|| format!("{name}_canvas"), |handle| handle.0.clone());
        format!(
            r#"<div class="signature-pad"><canvas id="{}" data-field="{}"></canvas>{}</div>"#,
            escape(&canvas_id),
            escape(name),
            input_tag("hidden", name, &value_text(value), attrs)
        )
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<Value> {
        text_value(data, name)
    }
}

/// A country/state selector.
///
/// Posts `<name>_country` and `<name>_state`; the field value is the
/// non-empty parts joined as `"Country, State"`. The inputs are prefilled
/// from [`AuxContext::location`].
#[derive(Debug, Clone)]
pub struct LocationSelector;

impl Widget for LocationSelector {
    fn kind(&self) -> FieldKind {
        FieldKind::Location
    }

    fn render(
        &self,
        name: &str,
        value: Option<&Value>,
        attrs: &HashMap<String, String>,
        aux: &AuxContext,
    ) -> String {
        let text = value_text(value);
        let mut parts = text.splitn(2, ',').map(str::trim);
        let from_value_country = parts.next().unwrap_or("").to_string();
        let from_value_state = parts.next().unwrap_or("").to_string();

        let country = aux.location.country.clone().unwrap_or(from_value_country);
        let state = aux.location.state.clone().unwrap_or(from_value_state);

        let mut country_attrs = attrs.clone();
        country_attrs.insert("placeholder".to_string(), "Country".to_string());
        let mut state_attrs = HashMap::new();
        state_attrs.insert("placeholder".to_string(), "State".to_string());

        format!(
            r#"<div class="location-selector">{}{}</div>"#,
            input_tag("text", &format!("{name}_country"), &country, &country_attrs),
            input_tag("text", &format!("{name}_state"), &state, &state_attrs)
        )
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<Value> {
        let country = data.get(&format!("{name}_country")).map(str::trim);
        let state = data.get(&format!("{name}_state")).map(str::trim);
        if country.is_none() && state.is_none() {
            return text_value(data, name);
        }
        let joined: Vec<&str> = [country, state]
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect();
        Some(Value::String(joined.join(", ")))
    }
}

// ============================================================
// Dispatch
// ============================================================

/// Returns the widget for a kind, configured from the descriptor.
///
/// Choice kinds take their options from `descriptor.options`; an empty
/// option list renders a control with no choices.
pub fn widget_for_kind(kind: FieldKind, descriptor: &FieldDescriptor) -> Box<dyn Widget> {
    match kind {
        FieldKind::Checkbox => Box::new(CheckboxInput),
        FieldKind::Switch => Box::new(SwitchInput),
        FieldKind::Date => Box::new(DateInput),
        FieldKind::File => Box::new(FileDropzone),
        FieldKind::Password => Box::new(PasswordInput),
        FieldKind::Phone => Box::new(PhoneInput),
        FieldKind::Textarea => Box::new(Textarea),
        FieldKind::Signature => Box::new(SignaturePad),
        FieldKind::Slider => Box::new(RangeSlider),
        FieldKind::Location => Box::new(LocationSelector),
        FieldKind::MultiSelect => Box::new(MultiSelect::new(descriptor.options.clone())),
        FieldKind::Otp => Box::new(OtpInput),
        FieldKind::Select => Box::new(Select::new(
            descriptor.options.clone(),
            descriptor.placeholder.clone(),
        )),
        FieldKind::RadioGroup => Box::new(RadioGroup::new(descriptor.options.clone())),
        FieldKind::Rating => Box::new(RatingInput),
        FieldKind::Tags => Box::new(TagsInput),
        FieldKind::Input => Box::new(TextInput),
    }
}

/// Renders the bare control for one field.
///
/// Keyless descriptors render nothing. The placeholder and disabled flag are
/// taken from the descriptor.
pub fn render(
    kind: FieldKind,
    value: Option<&Value>,
    descriptor: &FieldDescriptor,
    aux: &AuxContext,
) -> String {
    let Some(name) = descriptor.key() else {
        return String::new();
    };
    let mut attrs = HashMap::new();
    if let Some(placeholder) = &descriptor.placeholder {
        attrs.insert("placeholder".to_string(), placeholder.clone());
    }
    if descriptor.disabled {
        attrs.insert("disabled".to_string(), "disabled".to_string());
    }
    widget_for_kind(kind, descriptor).render(name, value, &attrs, aux)
}
