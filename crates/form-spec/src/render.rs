use serde_json::{Map, Value, json};

use crate::answers::{AnswerMap, display_value, is_blank};
use crate::paginate::{Page, PageFooter};
use crate::spec::{Field, FieldType, FormDocument};
use crate::validate::validate;

const BLANK_ANSWER: &str = "________";

/// Status labels returned by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// A visible required field is still unanswered.
    NeedInput,
    /// Every visible required field is answered.
    Complete,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::NeedInput => "need_input",
            RenderStatus::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderProgress {
    pub answered: usize,
    pub total: usize,
}

/// A field as it appears on a rendered page.
#[derive(Debug, Clone)]
pub struct RenderField {
    pub id: String,
    pub kind: FieldType,
    pub label: Option<String>,
    pub content: Option<String>,
    pub required: bool,
    pub options: Vec<String>,
    pub current_value: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct RenderRow {
    pub id: String,
    pub columns: usize,
    pub fields: Vec<RenderField>,
}

#[derive(Debug, Clone)]
pub struct RenderPage {
    pub page_number: usize,
    pub rows: Vec<RenderRow>,
    pub footer: PageFooter,
}

/// Collected payload used by both text and JSON renderers.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub form_id: String,
    pub form_title: String,
    pub header: Vec<String>,
    pub status: RenderStatus,
    pub missing_required: Vec<String>,
    pub progress: RenderProgress,
    pub pages: Vec<RenderPage>,
}

/// Build the renderer payload from the form, its paginated rows and the answers.
pub fn build_render_payload(
    form: &FormDocument,
    pages: &[Page],
    answers: &AnswerMap,
) -> RenderPayload {
    let pages: Vec<RenderPage> = pages
        .iter()
        .map(|page| RenderPage {
            page_number: page.page_number,
            footer: page.footer.clone(),
            rows: page
                .rows
                .iter()
                .map(|row| RenderRow {
                    id: row.id.clone(),
                    columns: row.columns.count(),
                    fields: row
                        .fields
                        .iter()
                        .map(|field| render_field(field, answers))
                        .collect(),
                })
                .collect(),
        })
        .collect();

    let placed = pages
        .iter()
        .flat_map(|page| page.rows.iter())
        .flat_map(|row| row.fields.iter())
        .filter(|field| !field.kind.is_layout());
    let (total, answered) = placed.fold((0, 0), |(total, answered), field| {
        let filled = !is_blank(field.current_value.as_ref());
        (total + 1, answered + usize::from(filled))
    });

    let missing_required = validate(form, answers).missing_required;
    let status = if missing_required.is_empty() {
        RenderStatus::Complete
    } else {
        RenderStatus::NeedInput
    };

    let settings = &form.pdf;
    let header = [settings.title.as_ref(), settings.subtitle.as_ref()]
        .into_iter()
        .flatten()
        .cloned()
        .collect();

    RenderPayload {
        form_id: form.id.clone(),
        form_title: form.title.clone(),
        header,
        status,
        missing_required,
        progress: RenderProgress { answered, total },
        pages,
    }
}

fn render_field(field: &Field, answers: &AnswerMap) -> RenderField {
    RenderField {
        id: field.id.clone(),
        kind: field.field_type(),
        label: field.label().map(str::to_string),
        content: field.content().map(str::to_string),
        required: field.required(),
        options: field.options().to_vec(),
        current_value: answers.get(&field.id).cloned(),
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    let pages = payload
        .pages
        .iter()
        .map(|page| {
            let rows = page
                .rows
                .iter()
                .map(|row| {
                    let fields = row.fields.iter().map(field_json).collect::<Vec<_>>();
                    json!({ "id": row.id, "columns": row.columns, "fields": fields })
                })
                .collect::<Vec<_>>();
            json!({
                "page_number": page.page_number,
                "rows": rows,
                "footer": {
                    "page_label": page.footer.page_label,
                    "text": page.footer.text,
                },
            })
        })
        .collect::<Vec<_>>();

    json!({
        "form_id": payload.form_id,
        "form_title": payload.form_title,
        "header": payload.header,
        "status": payload.status.as_str(),
        "missing_required": payload.missing_required,
        "progress": {
            "answered": payload.progress.answered,
            "total": payload.progress.total,
        },
        "page_count": payload.pages.len(),
        "pages": pages,
    })
}

fn field_json(field: &RenderField) -> Value {
    let mut map = Map::new();
    map.insert("id".into(), Value::String(field.id.clone()));
    map.insert("type".into(), Value::String(field.kind.as_str().to_string()));
    if let Some(label) = &field.label {
        map.insert("label".into(), Value::String(label.clone()));
        map.insert("required".into(), Value::Bool(field.required));
    }
    if let Some(content) = &field.content {
        map.insert("content".into(), Value::String(content.clone()));
    }
    if !field.options.is_empty() {
        map.insert(
            "options".into(),
            Value::Array(field.options.iter().cloned().map(Value::String).collect()),
        );
    }
    if let Some(current_value) = &field.current_value {
        map.insert("current_value".into(), current_value.clone());
    }
    Value::Object(map)
}

/// Render the payload as a plain-text page preview.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Form: {} ({})", payload.form_title, payload.form_id));
    lines.push(format!(
        "Status: {} ({}/{})",
        payload.status.as_str(),
        payload.progress.answered,
        payload.progress.total
    ));
    lines.extend(payload.header.iter().cloned());

    for page in &payload.pages {
        lines.push(String::new());
        lines.push(format!("=== Page {} ===", page.page_number));
        for row in &page.rows {
            row_lines(row, &mut lines);
        }
        let footer: Vec<&str> = [page.footer.text.as_deref(), page.footer.page_label.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !footer.is_empty() {
            lines.push(format!("--- {} ---", footer.join(" · ")));
        }
    }

    lines.join("\n")
}

/// Layout fields get a line of their own; runs of answer fields between them
/// are laid out `columns` to a line. Declaration order is kept.
fn row_lines(row: &RenderRow, lines: &mut Vec<String>) {
    let mut cells: Vec<String> = Vec::new();
    let flush = |cells: &mut Vec<String>, lines: &mut Vec<String>| {
        for chunk in cells.chunks(row.columns.max(1)) {
            lines.push(chunk.join(" | "));
        }
        cells.clear();
    };
    for field in &row.fields {
        if field.kind.is_layout() {
            flush(&mut cells, lines);
            lines.push(field_text(field));
        } else {
            cells.push(field_text(field));
        }
    }
    flush(&mut cells, lines);
}

fn field_text(field: &RenderField) -> String {
    let content = field.content.as_deref().unwrap_or_default();
    match field.kind {
        FieldType::Heading1 => format!("# {content}"),
        FieldType::Heading2 => format!("## {content}"),
        FieldType::Paragraph => content.to_string(),
        FieldType::Divider => "----".to_string(),
        _ => {
            let marker = if field.required { "*" } else { "" };
            let value = field
                .current_value
                .as_ref()
                .filter(|value| !is_blank(Some(value)))
                .map(display_value)
                .unwrap_or_else(|| blank_answer(field));
            format!("{}{marker}: {value}", field.label.as_deref().unwrap_or(&field.id))
        }
    }
}

fn blank_answer(field: &RenderField) -> String {
    if field.options.is_empty() {
        BLANK_ANSWER.to_string()
    } else {
        field
            .options
            .iter()
            .map(|option| format!("[ ] {option}"))
            .collect::<Vec<_>>()
            .join("  ")
    }
}
