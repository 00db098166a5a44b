//! Value validation against a synthesized schema.
//!
//! [`clean_values`] checks a whole value mapping in one pass. Errors
//! accumulate across fields rather than short-circuiting, so every problem
//! is reported at once. On success it returns the cleaned mapping: values
//! coerced to their rule's type, defaults filled in, unknown keys dropped.
//!
//! Choice kinds are not checked against their descriptor's options.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use formcraft_core::ValidationError;
use serde_json::{Map, Value};

use crate::schema::{Rule, RuleKind, ValidationSchema};

/// Validates `values` against `schema`.
///
/// # Examples
///
/// ```
/// use formcraft_forms::descriptor::FieldDescriptor;
/// use formcraft_forms::schema::synthesize;
/// use formcraft_forms::validation::clean_values;
/// use serde_json::{json, Map};
///
/// let schema = synthesize(&[FieldDescriptor::new("dob", "Date of Birth").required(true)]);
/// let err = clean_values(&schema, &Map::new()).unwrap_err();
/// assert_eq!(err.messages_for("dob"), ["Date of Birth is required."]);
///
/// let mut values = Map::new();
/// values.insert("dob".into(), json!("1990-04-01"));
/// assert!(clean_values(&schema, &values).is_ok());
/// ```
pub fn clean_values(
    schema: &ValidationSchema,
    values: &Map<String, Value>,
) -> Result<Map<String, Value>, ValidationError> {
    let mut cleaned = Map::new();
    let mut errors = ValidationError::with_field_errors(std::collections::BTreeMap::new());

    for (key, rule) in schema.rules() {
        match clean_value(rule, values.get(key)) {
            Ok(Some(value)) => {
                cleaned.insert(key.clone(), value);
            }
            Ok(None) => {}
            Err(message) => errors.add(key.clone(), message),
        }
    }

    if errors.is_empty() {
        Ok(cleaned)
    } else {
        errors.message = "Please correct the errors below.".to_string();
        Err(errors)
    }
}

/// Cleans one raw value against its rule.
///
/// `Ok(None)` means the field is absent and has no default.
pub fn clean_value(rule: &Rule, raw: Option<&Value>) -> Result<Option<Value>, String> {
    let raw = raw.filter(|v| !is_blank(v));

    let value = match raw {
        None => rule.default.clone(),
        Some(v) => Some(coerce(rule, v)?),
    };

    if rule.must_be_true && value != Some(Value::Bool(true)) {
        return Err(required_message(rule));
    }

    if rule.required {
        let present = match &value {
            None => false,
            Some(v) => rule.min_length.map_or(true, |min| text_len(v) >= min),
        };
        if !present {
            return Err(required_message(rule));
        }
    }

    Ok(value)
}

fn coerce(rule: &Rule, value: &Value) -> Result<Value, String> {
    let label = &rule.label;
    match rule.kind {
        RuleKind::Boolean => {
            coerce_bool(value).ok_or_else(|| format!("{label} must be true or false."))
        }
        RuleKind::Number => coerce_number(value).ok_or_else(|| format!("{label} must be a number.")),
        RuleKind::Date => coerce_date(value).ok_or_else(|| format!("{label} must be a valid date.")),
        RuleKind::String => coerce_string(value).ok_or_else(|| format!("{label} must be text.")),
    }
}

fn required_message(rule: &Rule) -> String {
    rule.message
        .clone()
        .unwrap_or_else(|| format!("{} is required.", rule.label))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn text_len(value: &Value) -> usize {
    match value {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(",")
            .chars()
            .count(),
        _ => 0,
    }
}

// ============================================================
// Coercions
// ============================================================

fn coerce_bool(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(b) => Some(Value::Bool(*b)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "1" | "yes" => Some(Value::Bool(true)),
            "false" | "off" | "0" | "no" => Some(Value::Bool(false)),
            _ => None,
        },
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(Value::Bool(true)),
            Some(0) => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Some(Value::from(i));
            }
            s.parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
        }
        _ => None,
    }
}

fn coerce_string(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(value.clone()),
        Value::Number(n) => Some(Value::String(n.to_string())),
        Value::Bool(b) => Some(Value::String(b.to_string())),
        Value::Array(items) if items.iter().all(Value::is_string) => Some(value.clone()),
        _ => None,
    }
}

/// Coerces a value to a normalized date string.
///
/// Plain dates stay `YYYY-MM-DD`; anything with a time component becomes an
/// RFC 3339 UTC timestamp with millisecond precision.
fn coerce_date(value: &Value) -> Option<Value> {
    let normalized = match value {
        Value::String(s) => parse_date_str(s.trim())?,
        Value::Number(n) => {
            let millis = n.as_i64()?;
            DateTime::<Utc>::from_timestamp_millis(millis)?
                .to_rfc3339_opts(SecondsFormat::Millis, true)
        }
        _ => return None,
    };
    Some(Value::String(normalized))
}

fn parse_date_str(s: &str) -> Option<String> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.format("%Y-%m-%d").to_string());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(
            dt.with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        );
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| {
            naive
                .and_utc()
                .to_rfc3339_opts(SecondsFormat::Millis, true)
        })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::descriptor::FieldDescriptor;
    use crate::schema::synthesize;

    fn values(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn one(d: FieldDescriptor, raw: Option<Value>) -> Result<Option<Value>, String> {
        let schema = synthesize(std::slice::from_ref(&d));
        let key = d.key().unwrap().to_string();
        clean_value(schema.rule(&key).unwrap(), raw.as_ref())
    }

    #[test]
    fn test_required_checkbox() {
        let d = FieldDescriptor::new("tos", "Terms").with_type("checkbox").required(true);
        assert_eq!(
            one(d.clone(), Some(json!(false))).unwrap_err(),
            "Terms is required."
        );
        assert!(one(d.clone(), None).is_err());
        assert_eq!(one(d, Some(json!(true))).unwrap(), Some(json!(true)));
    }

    #[test]
    fn test_optional_checkbox_defaults_false() {
        let d = FieldDescriptor::new("n", "News").with_type("switch");
        assert_eq!(one(d, None).unwrap(), Some(json!(false)));
    }

    #[test]
    fn test_boolean_strings() {
        let d = FieldDescriptor::new("n", "News").with_type("checkbox");
        for (raw, expected) in [("on", true), ("off", false), ("YES", true), ("0", false)] {
            assert_eq!(one(d.clone(), Some(json!(raw))).unwrap(), Some(json!(expected)));
        }
        assert!(one(d, Some(json!("maybe"))).is_err());
    }

    #[test]
    fn test_required_slider_accepts_nothing() {
        let d = FieldDescriptor::new("promo", "Price Slider").required(true);
        assert_eq!(one(d, None).unwrap(), None);
    }

    #[test]
    fn test_slider_numbers() {
        let d = FieldDescriptor::new("s", "Slider");
        assert_eq!(one(d.clone(), Some(json!("40"))).unwrap(), Some(json!(40)));
        assert_eq!(one(d.clone(), Some(json!(2.5))).unwrap(), Some(json!(2.5)));
        assert_eq!(
            one(d, Some(json!("lots"))).unwrap_err(),
            "Slider must be a number."
        );
    }

    #[test]
    fn test_required_date() {
        let d = FieldDescriptor::new("dob", "Date of Birth").required(true);
        assert_eq!(one(d.clone(), None).unwrap_err(), "Date of Birth is required.");
        assert_eq!(one(d.clone(), Some(json!(""))).unwrap_err(), "Date of Birth is required.");
        assert_eq!(
            one(d.clone(), Some(json!("not a date"))).unwrap_err(),
            "Date of Birth must be a valid date."
        );
        assert_eq!(
            one(d, Some(json!("1990-04-01"))).unwrap(),
            Some(json!("1990-04-01"))
        );
    }

    #[test]
    fn test_date_formats() {
        let d = FieldDescriptor::new("when", "When").with_type("date");
        assert_eq!(
            one(d.clone(), Some(json!("2024-01-02T03:04:05Z"))).unwrap(),
            Some(json!("2024-01-02T03:04:05.000Z"))
        );
        assert_eq!(
            one(d.clone(), Some(json!("2024-01-02T05:04:05+02:00"))).unwrap(),
            Some(json!("2024-01-02T03:04:05.000Z"))
        );
        assert_eq!(
            one(d.clone(), Some(json!("2024-01-02T03:04"))).unwrap(),
            Some(json!("2024-01-02T03:04:00.000Z"))
        );
        assert_eq!(
            one(d.clone(), Some(json!(0))).unwrap(),
            Some(json!("1970-01-01T00:00:00.000Z"))
        );
        assert_eq!(one(d, None).unwrap(), None);
    }

    #[test]
    fn test_required_string() {
        let d = FieldDescriptor::new("u", "Username").required(true);
        assert_eq!(one(d.clone(), Some(json!(""))).unwrap_err(), "Username is required.");
        assert_eq!(one(d.clone(), Some(json!(42))).unwrap(), Some(json!("42")));
        assert_eq!(
            one(d, Some(json!({"nested": true}))).unwrap_err(),
            "Username must be text."
        );
    }

    #[test]
    fn test_multi_select_arrays() {
        let d = FieldDescriptor::new("fw", "Framework").required(true);
        assert_eq!(
            one(d.clone(), Some(json!(["React", "Vue"]))).unwrap(),
            Some(json!(["React", "Vue"]))
        );
        assert!(one(d, Some(json!([]))).is_err());
    }

    #[test]
    fn test_options_not_enforced() {
        let d = FieldDescriptor::new("g", "Gender").with_options(["male", "female"]);
        assert_eq!(one(d, Some(json!("other"))).unwrap(), Some(json!("other")));
    }

    #[test]
    fn test_errors_accumulate() {
        let schema = synthesize(&[
            FieldDescriptor::new("a", "Alpha").required(true),
            FieldDescriptor::new("b", "Beta").required(true),
            FieldDescriptor::new("c", "Gamma"),
        ]);
        let err = clean_values(&schema, &Map::new()).unwrap_err();
        assert_eq!(err.field_errors.len(), 2);
        assert_eq!(err.messages_for("a"), ["Alpha is required."]);
        assert_eq!(err.messages_for("b"), ["Beta is required."]);
        assert!(err.messages_for("c").is_empty());
    }

    #[test]
    fn test_cleaned_fills_defaults_and_drops_unknown() {
        let schema = synthesize(&[
            FieldDescriptor::new("name", "Name"),
            FieldDescriptor::new("ok", "Ok").with_type("checkbox"),
        ]);
        let cleaned =
            clean_values(&schema, &values(&[("extra", json!("x")), ("name", json!("Al"))]))
                .unwrap();
        assert_eq!(cleaned.get("name"), Some(&json!("Al")));
        assert_eq!(cleaned.get("ok"), Some(&json!(false)));
        assert!(!cleaned.contains_key("extra"));
    }
}
