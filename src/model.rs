use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Accumulated field values for the whole session, keyed by `fieldId`.
pub type FormValues = BTreeMap<String, FieldValue>;

/// Outstanding validation messages for the visible section, keyed by `fieldId`.
pub type FormErrors = BTreeMap<String, String>;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    pub form_title: String,
    pub sections: Vec<FormSectionSchema>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FormSectionSchema {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    pub field_id: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    pub label: String,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
    // dropdown / radio / multi-select checkbox
    #[serde(default)]
    pub options: Option<Vec<FieldOption>>,
    // Custom "required" message
    #[serde(default)]
    pub validation: Option<FieldValidation>,
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self {
            field_id: String::new(),
            kind: FieldType::Text,
            label: String::new(),
            placeholder: None,
            required: false,
            min_length: None,
            max_length: None,
            options: None,
            validation: None,
        }
    }
}

impl FieldSchema {
    /// Checkbox without options: a single boolean toggle.
    pub fn is_single_checkbox(&self) -> bool {
        self.kind == FieldType::Checkbox && self.options.is_none()
    }

    pub fn option_list(&self) -> &[FieldOption] {
        self.options.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct FieldValidation {
    pub message: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Email,
    Tel,
    Date,
    TextArea,
    Dropdown,
    Radio,
    Checkbox,
    // Anything the renderer does not know; keeps the raw tag for the placeholder.
    Unsupported(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Tel => "tel",
            FieldType::Date => "date",
            FieldType::TextArea => "textarea",
            FieldType::Dropdown => "dropdown",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Unsupported(raw) => raw.as_str(),
        }
    }
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "text" => FieldType::Text,
            "email" => FieldType::Email,
            "tel" => FieldType::Tel,
            "date" => FieldType::Date,
            "textarea" => FieldType::TextArea,
            "dropdown" => FieldType::Dropdown,
            "radio" => FieldType::Radio,
            "checkbox" => FieldType::Checkbox,
            _ => FieldType::Unsupported(s),
        }
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.as_str().to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Bool(bool),
}

impl FieldValue {
    /// Absent-equivalent for the required check: "" or an empty list.
    /// `Bool(false)` is deliberately not empty.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(v) => v.is_empty(),
            FieldValue::Bool(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Identity established by the login step; keys the schema fetch.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub roll_number: String,
    pub name: String,
}

/// Body of `GET /get-form`.
#[derive(Debug, Deserialize, Clone)]
pub struct FormResponse {
    #[serde(default)]
    #[allow(dead_code)]
    pub message: Option<String>,
    pub form: FormSchema,
}

pub(crate) fn validate_schema(schema: &FormSchema) -> Result<(), String> {
    use std::collections::HashSet;
    if schema.sections.is_empty() {
        return Err(format!("form '{}' has no sections", schema.form_title));
    }
    let mut ids = HashSet::new();
    for (si, section) in schema.sections.iter().enumerate() {
        for (fi, field) in section.fields.iter().enumerate() {
            if !ids.insert(field.field_id.as_str()) {
                return Err(format!(
                    "duplicate fieldId: '{}' at sections[{}].fields[{}]",
                    field.field_id, si, fi
                ));
            }
        }
    }
    Ok(())
}
