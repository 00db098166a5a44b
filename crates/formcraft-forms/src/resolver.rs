//! Field kind resolution.
//!
//! An explicit `type` on a descriptor always wins. Without one, the kind is
//! inferred from the label by an ordered table of trigger phrases: the label
//! is lower-cased and the first rule with a phrase contained in it decides.
//! Order matters because labels can contain several triggers (a label with
//! both "email" and "password" resolves to [`FieldKind::Password`], which
//! appears earlier).

use crate::descriptor::{FieldDescriptor, FieldKind};

/// One row of the inference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferenceRule {
    /// Lower-case phrases, any of which selects this rule.
    pub triggers: &'static [&'static str],
    /// The kind this rule resolves to.
    pub kind: FieldKind,
}

impl InferenceRule {
    /// Returns `true` if the lower-cased label contains any trigger.
    pub fn matches(&self, lowered_label: &str) -> bool {
        self.triggers.iter().any(|t| lowered_label.contains(t))
    }
}

/// The label inference table, evaluated top to bottom, first match wins.
pub const INFERENCE_RULES: &[InferenceRule] = &[
    InferenceRule {
        triggers: &["date of birth", "submission date"],
        kind: FieldKind::Date,
    },
    InferenceRule {
        triggers: &["file"],
        kind: FieldKind::File,
    },
    InferenceRule {
        triggers: &["password"],
        kind: FieldKind::Password,
    },
    InferenceRule {
        triggers: &["phone"],
        kind: FieldKind::Phone,
    },
    InferenceRule {
        triggers: &["bio"],
        kind: FieldKind::Textarea,
    },
    InferenceRule {
        triggers: &["sign"],
        kind: FieldKind::Signature,
    },
    InferenceRule {
        triggers: &["slider", "price"],
        kind: FieldKind::Slider,
    },
    InferenceRule {
        triggers: &["country"],
        kind: FieldKind::Location,
    },
    InferenceRule {
        triggers: &["framework"],
        kind: FieldKind::MultiSelect,
    },
    InferenceRule {
        triggers: &["otp"],
        kind: FieldKind::Otp,
    },
    InferenceRule {
        triggers: &["email"],
        kind: FieldKind::Select,
    },
    InferenceRule {
        triggers: &["gender"],
        kind: FieldKind::RadioGroup,
    },
    InferenceRule {
        triggers: &["rating"],
        kind: FieldKind::Rating,
    },
    InferenceRule {
        triggers: &["tags"],
        kind: FieldKind::Tags,
    },
    InferenceRule {
        triggers: &["marketing emails"],
        kind: FieldKind::Switch,
    },
    InferenceRule {
        triggers: &["use different settings"],
        kind: FieldKind::Checkbox,
    },
];

/// Returns the inference table.
pub const fn inference_rules() -> &'static [InferenceRule] {
    INFERENCE_RULES
}

/// Resolves a descriptor to its field kind.
///
/// Never fails. Any non-empty explicit `type`, even a blank one, is parsed
/// leniently (an unknown tag becomes [`FieldKind::Input`]). Only an empty
/// `type` runs the label through [`INFERENCE_RULES`].
///
/// # Examples
///
/// ```
/// use formcraft_forms::descriptor::{FieldDescriptor, FieldKind};
/// use formcraft_forms::resolver::resolve;
///
/// let dob = FieldDescriptor::new("dob", "Date of Birth");
/// assert_eq!(resolve(&dob), FieldKind::Date);
///
/// let explicit = FieldDescriptor::new("dob", "Date of Birth").with_type("textarea");
/// assert_eq!(resolve(&explicit), FieldKind::Textarea);
/// ```
pub fn resolve(descriptor: &FieldDescriptor) -> FieldKind {
    if descriptor.field_type.is_empty() {
        infer_from_label(&descriptor.label)
    } else {
        FieldKind::parse_lenient(&descriptor.field_type)
    }
}

/// Infers a kind from label text alone.
pub fn infer_from_label(label: &str) -> FieldKind {
    let lowered = label.to_lowercase();
    INFERENCE_RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map_or(FieldKind::Input, |rule| rule.kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn by_label(label: &str) -> FieldKind {
        resolve(&FieldDescriptor::new("f", label))
    }

    #[test]
    fn test_each_trigger() {
        let cases = [
            ("Date of Birth", FieldKind::Date),
            ("Submission Date", FieldKind::Date),
            ("Upload File", FieldKind::File),
            ("Password", FieldKind::Password),
            ("Phone number", FieldKind::Phone),
            ("Short Bio", FieldKind::Textarea),
            ("Sign here", FieldKind::Signature),
            ("Volume Slider", FieldKind::Slider),
            ("Price", FieldKind::Slider),
            ("Country", FieldKind::Location),
            ("Favourite framework", FieldKind::MultiSelect),
            ("Enter OTP", FieldKind::Otp),
            ("Email", FieldKind::Select),
            ("Gender", FieldKind::RadioGroup),
            ("Rating", FieldKind::Rating),
            ("Tags", FieldKind::Tags),
            ("Use different settings for mobile", FieldKind::Checkbox),
        ];
        for (label, expected) in cases {
            assert_eq!(by_label(label), expected, "label {label:?}");
        }
    }

    #[test]
    fn test_priority_email_and_password() {
        assert_eq!(by_label("Email password"), FieldKind::Password);
        assert_eq!(by_label("Password for email"), FieldKind::Password);
    }

    #[test]
    fn test_marketing_emails_shadowed_by_email() {
        // "email" sits above "marketing emails" in the table.
        assert_eq!(by_label("Marketing emails"), FieldKind::Select);
    }

    #[test]
    fn test_sign_matches_inside_words() {
        assert_eq!(by_label("Designation"), FieldKind::Signature);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(by_label("DATE OF BIRTH"), FieldKind::Date);
    }

    #[test]
    fn test_no_match_is_input() {
        assert_eq!(by_label("Username"), FieldKind::Input);
        assert_eq!(by_label(""), FieldKind::Input);
    }

    #[test]
    fn test_explicit_type_wins() {
        for kind in FieldKind::ALL {
            let d = FieldDescriptor::new("f", "Date of Birth").with_type(kind.as_str());
            assert_eq!(resolve(&d), kind);
        }
    }

    #[test]
    fn test_explicit_type_normalized() {
        let d = FieldDescriptor::new("f", "x").with_type("  Radio-Group ");
        assert_eq!(resolve(&d), FieldKind::RadioGroup);
    }

    #[test]
    fn test_unknown_explicit_type_is_input() {
        let d = FieldDescriptor::new("f", "Date of Birth").with_type("combobox");
        assert_eq!(resolve(&d), FieldKind::Input);
    }

    #[test]
    fn test_whitespace_type_is_explicit() {
        let d = FieldDescriptor::new("f", "Phone").with_type("   ");
        assert_eq!(resolve(&d), FieldKind::Input);
    }

    #[test]
    fn test_padded_known_type_is_normalized() {
        let d = FieldDescriptor::new("f", "Phone").with_type(" Textarea ");
        assert_eq!(resolve(&d), FieldKind::Textarea);
    }

    #[test]
    fn test_table_order_is_stable() {
        let kinds: Vec<FieldKind> = inference_rules().iter().map(|r| r.kind).collect();
        assert_eq!(kinds.first(), Some(&FieldKind::Date));
        assert_eq!(kinds.last(), Some(&FieldKind::Checkbox));
        assert_eq!(kinds.len(), 16);
    }
}
