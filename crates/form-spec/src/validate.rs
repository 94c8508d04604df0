use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::answers::{AnswerMap, coerce_to_string, is_blank, is_truthy};
use crate::spec::{Field, FieldType, FormDocument};
use crate::visibility::resolve_visibility;

static EMAIL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());
static URL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://[^\s/$.?#][^\s]*$").ok());

fn matches(pattern: &LazyLock<Option<Regex>>, value: &Value) -> bool {
    let text = coerce_to_string(value);
    pattern
        .as_ref()
        .is_some_and(|regex| regex.is_match(text.trim()))
}

const RATING_RANGE: std::ops::RangeInclusive<f64> = 1.0..=5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field_id: Option<String>,
    pub path: Option<String>,
    pub message: String,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub missing_required: Vec<String>,
    pub unknown_fields: Vec<String>,
}

/// Checks a submission against the form. Hidden fields are never required or checked.
pub fn validate(form: &FormDocument, answers: &AnswerMap) -> ValidationResult {
    let fields = form.all_fields();
    let visibility = resolve_visibility(&fields, answers);

    let mut errors = Vec::new();
    let mut missing_required = Vec::new();

    for field in fields.iter().filter(|field| !field.is_layout()) {
        if !visibility.get(&field.id).copied().unwrap_or(true) {
            continue;
        }

        let value = answers.get(&field.id);
        if !is_present(field, value) {
            if field.required() {
                missing_required.push(field.id.clone());
            }
            continue;
        }
        if let Some(value) = value
            && let Some(error) = validate_value(field, value)
        {
            errors.push(error);
        }
    }

    let all_ids: BTreeSet<&str> = fields.iter().map(|field| field.id.as_str()).collect();
    let unknown_fields: Vec<String> = answers
        .keys()
        .filter(|key| !all_ids.contains(key.as_str()))
        .cloned()
        .collect();

    ValidationResult {
        valid: errors.is_empty() && missing_required.is_empty() && unknown_fields.is_empty(),
        errors,
        missing_required,
        unknown_fields,
    }
}

/// A checkbox only counts when ticked and a multiselect when something is picked.
fn is_present(field: &Field, value: Option<&Value>) -> bool {
    match field.field_type() {
        FieldType::Checkbox => is_truthy(value),
        FieldType::Multiselect => match value {
            Some(Value::Array(items)) => !items.is_empty(),
            other => !is_blank(other),
        },
        _ => !is_blank(value),
    }
}

fn validate_value(field: &Field, value: &Value) -> Option<ValidationError> {
    match field.field_type() {
        FieldType::Email => (!matches(&EMAIL, value))
            .then(|| base_error(field, "invalid email address", "email_format")),
        FieldType::Url => {
            (!matches(&URL, value)).then(|| base_error(field, "invalid url", "url_format"))
        }
        FieldType::Number => {
            (as_number(value).is_none()).then(|| base_error(field, "not a number", "type_mismatch"))
        }
        FieldType::Rating => match as_number(value) {
            Some(rating) if RATING_RANGE.contains(&rating) && rating.fract() == 0.0 => None,
            _ => Some(base_error(field, "rating must be between 1 and 5", "range")),
        },
        FieldType::Select | FieldType::Radio => {
            let choice = coerce_to_string(value);
            (!field.options().contains(&choice))
                .then(|| base_error(field, "invalid option", "enum_mismatch"))
        }
        FieldType::Multiselect => {
            let picks: Vec<String> = match value {
                Value::Array(items) => items.iter().map(coerce_to_string).collect(),
                other => vec![coerce_to_string(other)],
            };
            picks
                .iter()
                .any(|pick| !field.options().contains(pick))
                .then(|| base_error(field, "invalid option", "enum_mismatch"))
        }
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn base_error(field: &Field, message: &str, code: &str) -> ValidationError {
    ValidationError {
        field_id: Some(field.id.clone()),
        path: Some(format!("/{}", field.id)),
        message: message.into(),
        code: Some(code.into()),
    }
}
