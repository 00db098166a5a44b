//! The `check` command.
//!
//! Resolves and synthesizes a form document offline and prints what the
//! engine would do with it: each field's kind (and whether it was inferred
//! from the label), its validation rule, and any problems found.

use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use formcraft_core::{FormcraftError, FormcraftResult, Settings};
use formcraft_forms::descriptor::{FieldKind, FormWire};
use formcraft_forms::resolver::resolve;
use formcraft_forms::schema::{synthesize, Rule};
use serde::Serialize;

use crate::command::ManagementCommand;

/// One field of a [`CheckReport`].
#[derive(Debug, Clone, Serialize)]
pub struct FieldReport {
    /// The field key.
    pub key: String,
    /// The resolved kind.
    pub kind: FieldKind,
    /// Whether the kind came from the label rather than an explicit type.
    pub inferred: bool,
    /// The synthesized rule.
    pub rule: Rule,
}

/// What the engine makes of a form document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    /// The form name.
    pub name: String,
    /// Usable fields, in render order.
    pub fields: Vec<FieldReport>,
    /// The schema's content key.
    pub content_key: String,
    /// Problems that do not stop the form from rendering.
    pub warnings: Vec<String>,
}

/// Checks a document given as JSON in the wire shape (`{name, json}`).
///
/// Fails with `MalformedDocument` when no field is usable.
pub fn check_document(source: &str) -> FormcraftResult<CheckReport> {
    let wire: FormWire = serde_json::from_str(source)?;
    let fields = wire.json.entries.iter().flat_map(|e| e.descriptors().iter()).cloned().collect::<Vec<_>>();
    let schema = synthesize(&fields);
    if schema.is_empty() {
        return Err(FormcraftError::MalformedDocument("no fields".to_string()));
    }

    let mut warnings = Vec::new();
    let mut seen = HashSet::new();
    for (i, d) in fields.iter().enumerate() {
        match d.key() {
            None => warnings.push(format!("field #{i} has no name or id and is skipped")),
            Some(key) if !seen.insert(key) => warnings.push(format!("duplicate field key '{key}'")),
            Some(key) => {
                let explicit = &d.field_type;
                if !explicit.is_empty() && explicit.parse::<FieldKind>().is_err() {
                    warnings.push(format!("field '{key}' has unknown type '{explicit}', rendered as input"));
                }
            }
        }
    }

    // One report per schema rule; a duplicated key reports its last descriptor.
    let reports = schema
        .rules()
        .iter()
        .filter_map(|(key, rule)| {
            let d = fields.iter().rev().find(|d| d.key() == Some(key.as_str()))?;
            Some(FieldReport {
                key: key.clone(),
                kind: resolve(d),
                inferred: d.field_type.is_empty(),
                rule: rule.clone(),
            })
        })
        .collect();

    Ok(CheckReport {
        name: wire.name,
        fields: reports,
        content_key: schema.content_key().to_string(),
        warnings,
    })
}

/// Validates a form document file.
pub struct CheckCommand;

#[async_trait]
impl ManagementCommand for CheckCommand {
    fn name(&self) -> &'static str {
        "check"
    }

    fn help(&self) -> &'static str {
        "Resolves and validates a form document without serving it"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("file")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("A form document in JSON"),
        )
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> FormcraftResult<()> {
        if settings.secret_key.is_empty() {
            tracing::warn!("secret_key is empty; the server will refuse to start");
        }
        let path = matches
            .get_one::<PathBuf>("file")
            .ok_or_else(|| FormcraftError::BadRequest("No file given".to_string()))?;
        let source = tokio::fs::read_to_string(path).await?;
        let report = check_document(&source)?;
        for warning in &report.warnings {
            tracing::warn!(file = %path.display(), "{warning}");
        }
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_document() {
        let report = check_document(
            r#"{"name": "Signup", "json": {"fields": [
                {"name": "dob", "label": "Date of Birth", "required": true},
                [{"name": "a", "label": "A", "type": "hologram"}, {"label": "no key"}],
                {"name": "dob", "label": "Submission date"}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(report.name, "Signup");
        assert_eq!(report.fields[0].kind, FieldKind::Date);
        assert!(report.fields[0].inferred);
        assert_eq!(report.fields[1].kind, FieldKind::Input);
        assert!(!report.fields[1].inferred);
        assert_eq!(report.warnings.len(), 3);
        assert_eq!(report.fields.len(), 2);
    }

    #[test]
    fn test_check_duplicate_key_reports_last_field() {
        let report = check_document(
            r#"{"name": "D", "json": {"fields": [
                {"name": "x", "label": "Date of Birth", "required": true},
                {"name": "x", "label": "Bio"}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(report.fields.len(), 1);
        assert_eq!(report.fields[0].kind, FieldKind::Textarea);
        assert_eq!(report.fields[0].rule.field_kind, FieldKind::Textarea);
        assert_eq!(report.fields[0].rule.label, "Bio");
    }

    #[test]
    fn test_check_legacy_shape() {
        let report = check_document(r#"{"name": "L", "json": [{"name": "bio", "label": "Bio"}]}"#).unwrap();
        assert_eq!(report.fields[0].kind, FieldKind::Textarea);
    }

    #[test]
    fn test_check_empty_document() {
        let err = check_document(r#"{"name": "E", "json": {"fields": []}}"#).unwrap_err();
        assert!(matches!(err, FormcraftError::MalformedDocument(_)));
    }
}
