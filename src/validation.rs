use crate::model::{FieldSchema, FieldType, FieldValue, FormErrors, FormValues};
use regex::Regex;
use std::sync::OnceLock;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"))
}

fn is_missing(value: Option<&FieldValue>) -> bool {
    value.map(FieldValue::is_empty).unwrap_or(true)
}

/// Check one field's value against its declared constraints.
///
/// Returns `None` when the value is valid, otherwise the message to show.
/// Rules apply in order and the first failure wins: required, then (for
/// string values only) min length, max length, email shape, 10-digit phone.
pub fn validate_field(field: &FieldSchema, value: Option<&FieldValue>) -> Option<String> {
    if is_missing(value) {
        if field.required {
            return Some(match &field.validation {
                Some(v) => v.message.clone(),
                None => format!("{} is required", field.label),
            });
        }
        return None;
    }
    let text = value.and_then(FieldValue::as_text)?;
    // Length counts characters, not bytes
    let len = text.chars().count();
    if let Some(min) = field.min_length {
        if len < min {
            return Some(format!(
                "{} must be at least {} characters",
                field.label, min
            ));
        }
    }
    if let Some(max) = field.max_length {
        if len > max {
            return Some(format!(
                "{} must be no more than {} characters",
                field.label, max
            ));
        }
    }
    match field.kind {
        FieldType::Email if !email_re().is_match(text) => {
            Some("Please enter a valid email address".to_string())
        }
        FieldType::Tel if text.chars().filter(|c| c.is_ascii_digit()).count() != 10 => {
            Some("Please enter a valid 10-digit phone number".to_string())
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionValidation {
    pub is_valid: bool,
    pub errors: FormErrors,
}

/// Run [`validate_field`] over every field of one section.
pub fn validate_section(fields: &[FieldSchema], values: &FormValues) -> SectionValidation {
    let mut errors = FormErrors::new();
    for field in fields {
        if let Some(msg) = validate_field(field, values.get(&field.field_id)) {
            errors.insert(field.field_id.clone(), msg);
        }
    }
    SectionValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldValidation;

    fn field(kind: FieldType, label: &str, required: bool) -> FieldSchema {
        FieldSchema {
            field_id: label.to_lowercase(),
            kind,
            label: label.into(),
            required,
            ..Default::default()
        }
    }

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.into())
    }

    #[test]
    fn required_field_flags_absent_empty_and_empty_list() {
        let f = field(FieldType::Text, "Name", true);
        for v in [None, Some(text("")), Some(FieldValue::List(vec![]))] {
            assert_eq!(
                validate_field(&f, v.as_ref()).as_deref(),
                Some("Name is required")
            );
        }
        assert_eq!(validate_field(&f, Some(&text("Ann"))), None);
        assert_eq!(
            validate_field(&f, Some(&FieldValue::List(vec!["x".into()]))),
            None
        );
    }

    #[test]
    fn custom_required_message_overrides_default() {
        let mut f = field(FieldType::Dropdown, "Branch", true);
        f.validation = Some(FieldValidation {
            message: "Pick a branch".into(),
        });
        assert_eq!(validate_field(&f, None).as_deref(), Some("Pick a branch"));
    }

    #[test]
    fn optional_empty_skips_every_other_rule() {
        let mut f = field(FieldType::Email, "Email", false);
        f.min_length = Some(5);
        assert_eq!(validate_field(&f, None), None);
        assert_eq!(validate_field(&f, Some(&text(""))), None);
    }

    #[test]
    fn length_bounds_produce_length_messages() {
        let mut f = field(FieldType::Text, "Bio", false);
        f.min_length = Some(3);
        f.max_length = Some(5);
        assert_eq!(
            validate_field(&f, Some(&text("ab"))).as_deref(),
            Some("Bio must be at least 3 characters")
        );
        assert_eq!(
            validate_field(&f, Some(&text("abcdef"))).as_deref(),
            Some("Bio must be no more than 5 characters")
        );
        assert_eq!(validate_field(&f, Some(&text("abc"))), None);
        assert_eq!(validate_field(&f, Some(&text("abcde"))), None);
        // multi-byte characters count once
        assert_eq!(validate_field(&f, Some(&text("äöü"))), None);
    }

    #[test]
    fn min_length_is_checked_before_email_shape() {
        let mut f = field(FieldType::Email, "Email", true);
        f.min_length = Some(10);
        assert_eq!(
            validate_field(&f, Some(&text("a@b"))).as_deref(),
            Some("Email must be at least 10 characters")
        );
    }

    #[test]
    fn email_shape() {
        let f = field(FieldType::Email, "Email", true);
        assert_eq!(validate_field(&f, Some(&text("a@b.co"))), None);
        for bad in ["a@b", "ab.co", "a b@c.d", "a@@b.co"] {
            assert_eq!(
                validate_field(&f, Some(&text(bad))).as_deref(),
                Some("Please enter a valid email address"),
                "{bad}"
            );
        }
        assert_eq!(
            validate_field(&f, Some(&text(""))).as_deref(),
            Some("Email is required")
        );
    }

    #[test]
    fn phone_counts_digits_after_stripping() {
        let f = field(FieldType::Tel, "Phone", true);
        assert_eq!(validate_field(&f, Some(&text("123-456-7890"))), None);
        assert_eq!(validate_field(&f, Some(&text("(123) 456 7890"))), None);
        for bad in ["12345", "123-456-78901"] {
            assert_eq!(
                validate_field(&f, Some(&text(bad))).as_deref(),
                Some("Please enter a valid 10-digit phone number")
            );
        }
    }

    #[test]
    fn lists_and_bools_skip_string_rules() {
        let mut f = field(FieldType::Checkbox, "Tags", true);
        f.min_length = Some(5);
        assert_eq!(
            validate_field(&f, Some(&FieldValue::List(vec!["a".into()]))),
            None
        );
        assert_eq!(validate_field(&f, Some(&FieldValue::Bool(true))), None);
    }

    #[test]
    fn required_single_checkbox_left_false_still_passes() {
        let f = field(FieldType::Checkbox, "Consent", true);
        assert_eq!(validate_field(&f, Some(&FieldValue::Bool(false))), None);
        // never touched: the value is absent and the required rule fires
        assert_eq!(
            validate_field(&f, None).as_deref(),
            Some("Consent is required")
        );
    }

    #[test]
    fn section_collects_only_failing_fields() {
        let a = field(FieldType::Text, "A", true);
        let b = field(FieldType::Text, "B", false);
        let mut values = FormValues::new();
        values.insert("b".into(), text("filled"));
        let report = validate_section(&[a, b], &values);
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors.get("a").map(String::as_str), Some("A is required"));
    }

    #[test]
    fn section_without_failures_is_valid() {
        let a = field(FieldType::Text, "A", true);
        let mut values = FormValues::new();
        values.insert("a".into(), text("x"));
        let report = validate_section(&[a], &values);
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
    }
}
