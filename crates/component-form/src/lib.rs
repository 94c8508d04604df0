use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

use form_spec::{
    AnswerMap, FormDocument, LayoutError, PaginationConfig, RenderPayload, build_layout_rows,
    build_render_payload, import_template as form_import_template,
    paginate_form as form_paginate, render_json_ui as form_render_json_ui,
    render_text as form_render_text, resolve_visibility, validate,
};

const DEFAULT_FORM: &str = include_str!("../../form-spec/tests/fixtures/contact_form.json");

#[derive(Debug, Error)]
pub enum ComponentError {
    #[error("failed to parse config/{0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("failed to parse form: {0}")]
    FormParse(#[source] serde_json::Error),
    #[error("form '{0}' is not available")]
    FormUnavailable(String),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
    #[error("layout failed: {0}")]
    Layout(#[from] LayoutError),
}

/// Host-supplied configuration. Without `form_json` the bundled contact form is served.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ComponentConfig {
    #[serde(default)]
    pub form_json: Option<String>,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

fn parse_config(config_json: &str) -> Result<ComponentConfig, ComponentError> {
    if config_json.trim().is_empty() {
        Ok(ComponentConfig::default())
    } else {
        serde_json::from_str(config_json).map_err(ComponentError::ConfigParse)
    }
}

fn ensure_form(form_id: &str, config: &ComponentConfig) -> Result<FormDocument, ComponentError> {
    let form_json = config.form_json.as_deref().unwrap_or(DEFAULT_FORM);
    let form: FormDocument = serde_json::from_str(form_json).map_err(ComponentError::FormParse)?;
    if form.id != form_id {
        Err(ComponentError::FormUnavailable(form_id.to_string()))
    } else {
        Ok(form)
    }
}

fn load(form_id: &str, config_json: &str) -> Result<(FormDocument, ComponentConfig), ComponentError> {
    let config = parse_config(config_json)?;
    let form = ensure_form(form_id, &config)?;
    Ok((form, config))
}

/// Unparsable answers are treated as an empty submission.
fn parse_answers(answers_json: &str) -> AnswerMap {
    serde_json::from_str::<Value>(answers_json)
        .map(|value| AnswerMap::from_value(&value))
        .unwrap_or_default()
}

fn encode<T: Serialize>(value: &T) -> Result<Value, ComponentError> {
    serde_json::to_value(value).map_err(ComponentError::JsonEncode)
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

fn respond_string(result: Result<String, ComponentError>) -> String {
    match result {
        Ok(value) => value,
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

pub fn describe(form_id: &str, config_json: &str) -> String {
    respond(load(form_id, config_json).and_then(|(form, _)| encode(&form)))
}

pub fn visibility(form_id: &str, config_json: &str, answers_json: &str) -> String {
    respond(load(form_id, config_json).and_then(|(form, _)| {
        let answers = parse_answers(answers_json);
        encode(&resolve_visibility(&form.all_fields(), &answers))
    }))
}

/// Rows as rendered with live answers, or every row when `apply_conditions` is off.
pub fn layout_rows(
    form_id: &str,
    config_json: &str,
    answers_json: &str,
    apply_conditions: bool,
) -> String {
    respond(load(form_id, config_json).and_then(|(form, _)| {
        let answers = parse_answers(answers_json);
        let rows = build_layout_rows(&form.fields, Some(&form.rows), &answers, apply_conditions);
        encode(&rows)
    }))
}

pub fn paginate_form(form_id: &str, config_json: &str, answers_json: &str) -> String {
    respond(load(form_id, config_json).and_then(|(form, config)| {
        let answers = parse_answers(answers_json);
        let pages = form_paginate(&form, &answers, &config.pagination)?;
        debug!(form = %form.id, pages = pages.len(), "component paginated form");
        Ok(json!({
            "profile": config.pagination.profile.as_str(),
            "pageCount": pages.len(),
            "pages": encode(&pages)?,
        }))
    }))
}

pub fn validate_answers(form_id: &str, config_json: &str, answers_json: &str) -> String {
    let validation = load(form_id, config_json).and_then(|(form, _)| {
        let answers = serde_json::from_str(answers_json).map_err(ComponentError::ConfigParse)?;
        encode(&validate(&form, &answers))
    });
    respond(validation)
}

/// Persisted row structure for a form whose fields carry no layout yet.
pub fn import_template(form_id: &str, config_json: &str) -> String {
    respond(load(form_id, config_json).and_then(|(form, _)| {
        encode(&form_import_template(&form.all_fields()))
    }))
}

fn render_payload(
    form_id: &str,
    config_json: &str,
    answers_json: &str,
) -> Result<RenderPayload, ComponentError> {
    let (form, config) = load(form_id, config_json)?;
    let answers = parse_answers(answers_json);
    let pages = form_paginate(&form, &answers, &config.pagination)?;
    Ok(build_render_payload(&form, &pages, &answers))
}

pub fn render_text(form_id: &str, config_json: &str, answers_json: &str) -> String {
    respond_string(
        render_payload(form_id, config_json, answers_json)
            .map(|payload| form_render_text(&payload)),
    )
}

pub fn render_json_ui(form_id: &str, config_json: &str, answers_json: &str) -> String {
    respond(
        render_payload(form_id, config_json, answers_json)
            .map(|payload| form_render_json_ui(&payload)),
    )
}
