use serde_json::json;

use form_spec::{
    AnswerMap, FormDocument, PaginationConfig, RenderProfile, RenderStatus, build_render_payload,
    paginate_form, render_json_ui, render_text,
};

fn fixture(name: &str) -> &'static str {
    match name {
        "contact_form" => include_str!("../tests/fixtures/contact_form.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn contact_form() -> FormDocument {
    serde_json::from_str(fixture("contact_form")).expect("deserialize")
}

#[test]
fn render_text_shows_pages_and_footers() {
    let form = contact_form();
    let answers = AnswerMap::from_value(&json!({ "first_name": "Ann", "subscribe": true }));
    let pages = paginate_form(&form, &answers, &PaginationConfig::default()).expect("paginate");
    let payload = build_render_payload(&form, &pages, &answers);

    assert_eq!(payload.status, RenderStatus::NeedInput);
    let text = render_text(&payload);
    assert!(text.contains("=== Page 1 ==="));
    assert!(text.contains("# Your details"));
    assert!(text.contains("First name*: Ann | Last name*: ________"));
    assert!(text.contains("Subscribe to the newsletter: Yes"));
    assert!(text.contains(&format!("Page 1 of {}", pages.len())));
}

#[test]
fn blank_render_lists_options() {
    let form = contact_form();
    let answers = AnswerMap::new();
    let pages = paginate_form(
        &form,
        &answers,
        &PaginationConfig::for_profile(RenderProfile::BlankPdf),
    )
    .expect("paginate");
    let text = render_text(&build_render_payload(&form, &pages, &answers));
    assert!(text.contains("How often?: [ ] Weekly  [ ] Monthly"));
}

#[test]
fn render_json_ui_exposes_structure() {
    let form = contact_form();
    let answers = AnswerMap::from_value(&json!({
        "first_name": "Ann",
        "last_name": "Lee",
        "email": "ann@example.com",
        "signature": "data:image/png;base64,AAAA",
    }));
    let pages = paginate_form(&form, &answers, &PaginationConfig::default()).expect("paginate");
    let ui = render_json_ui(&build_render_payload(&form, &pages, &answers));

    assert_eq!(ui["form_id"], "contact-intake");
    assert_eq!(ui["status"], "complete");
    assert_eq!(ui["header"], json!(["Contact intake", "Acme Legal"]));
    assert_eq!(ui["page_count"], pages.len());
    assert_eq!(ui["progress"]["answered"], 4);
    let first_row = &ui["pages"][0]["rows"][0];
    assert_eq!(first_row["fields"][0]["type"], "heading1");
    assert_eq!(ui["pages"][0]["footer"]["page_label"], format!("Page 1 of {}", pages.len()));
}

#[test]
fn render_text_keeps_row_field_order() {
    let form: FormDocument = serde_json::from_value(json!({
        "id": "ordered",
        "title": "Ordered",
        "rows": [{
            "id": "r1",
            "columns": 2,
            "fields": [
                { "id": "a", "type": "text", "label": "A" },
                { "id": "mid", "type": "heading2", "content": "Middle" },
                { "id": "b", "type": "text", "label": "B" },
                { "id": "c", "type": "text", "label": "C" }
            ]
        }]
    }))
    .expect("form");
    let answers = AnswerMap::from_value(&json!({ "a": "1", "b": "2", "c": "3" }));
    let pages = paginate_form(&form, &answers, &PaginationConfig::default()).expect("paginate");
    let text = render_text(&build_render_payload(&form, &pages, &answers));

    let body: Vec<&str> = text
        .lines()
        .skip_while(|line| !line.starts_with("=== Page 1"))
        .skip(1)
        .take(3)
        .collect();
    assert_eq!(body, vec!["A: 1", "## Middle", "B: 2 | C: 3"]);
}
