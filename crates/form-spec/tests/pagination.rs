use proptest::prelude::*;
use serde_json::json;

use form_spec::{
    AnswerMap, Columns, Field, FieldKind, FooterSpec, FormDocument, LayoutError, Page,
    PageGeometry, PaginationConfig, PaginationStrategy, Paginator, ReactiveThresholds,
    RenderProfile, Row, column_max_height, paginate, paginate_form,
    spec::{InputField, LayoutContent},
};

fn fixture(name: &str) -> &'static str {
    match name {
        "contact_form" => include_str!("../tests/fixtures/contact_form.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn text(id: &str) -> Field {
    Field::new(id, FieldKind::Text(InputField::default()))
}

fn heading(id: &str) -> Field {
    Field::new(id, FieldKind::Heading2(LayoutContent::default()))
}

/// Rows whose estimated height is encoded in the id, e.g. `40` or `40-b`.
fn sized_rows(heights: &[u32]) -> Vec<Row> {
    heights
        .iter()
        .enumerate()
        .map(|(index, height)| {
            Row::new(
                format!("{height}-{index}"),
                Columns::One,
                vec![text(&format!("f{index}"))],
            )
        })
        .collect()
}

fn height_from_id(row: &Row) -> f64 {
    row.id
        .split('-')
        .next()
        .and_then(|height| height.parse().ok())
        .unwrap_or(0.0)
}

fn page_rows(pages: &[Page]) -> Vec<Vec<String>> {
    pages
        .iter()
        .map(|page| page.rows.iter().map(|row| row.id.clone()).collect())
        .collect()
}

#[test]
fn first_page_uses_its_own_height() {
    let geometry = PageGeometry::new(100.0, 150.0, height_from_id);
    let pages = paginate(&sized_rows(&[40, 40, 40, 40]), &geometry).expect("paginate");

    assert_eq!(
        page_rows(&pages),
        vec![vec!["40-0", "40-1"], vec!["40-2", "40-3"]]
    );
    assert_eq!(pages[0].used_height, 80.0);
    assert_eq!(pages[1].page_number, 2);
}

#[test]
fn row_height_is_column_max() {
    let row = Row::new("pair", Columns::Two, vec![text("left"), text("right")]);
    let height = column_max_height(&row, |field| if field.id == "left" { 40.0 } else { 10.0 });
    assert_eq!(height, 40.0);

    let estimator = |row: &Row| column_max_height(row, |field| if field.id == "left" { 40.0 } else { 10.0 });
    let geometry = PageGeometry::new(100.0, 100.0, estimator);
    let pages = paginate(&[row], &geometry).expect("paginate");
    assert_eq!(pages[0].used_height, 40.0);
}

#[test]
fn empty_rows_take_no_space() {
    let mut rows = sized_rows(&[60, 30]);
    rows.insert(1, Row::new("90-empty", Columns::Two, vec![]));
    let geometry = PageGeometry::new(100.0, 100.0, height_from_id);
    let pages = paginate(&rows, &geometry).expect("paginate");

    assert_eq!(page_rows(&pages), vec![vec!["60-0", "30-1"]]);
    assert_eq!(pages[0].used_height, 90.0);
}

#[test]
fn footers_carry_the_final_total() {
    let geometry = PageGeometry::new(50.0, 50.0, height_from_id);
    let pages = Paginator::new(&geometry, PaginationStrategy::Predictive)
        .expect("paginator")
        .with_footer(&FooterSpec {
            page_numbers: true,
            text: Some("{{page}}/{{total}}".into()),
        })
        .expect("footer")
        .paginate(&sized_rows(&[40, 40, 40]))
        .expect("paginate");

    let labels: Vec<_> = pages
        .iter()
        .map(|page| page.footer.page_label.clone().unwrap_or_default())
        .collect();
    assert_eq!(labels, vec!["Page 1 of 3", "Page 2 of 3", "Page 3 of 3"]);
    assert_eq!(pages[2].footer.text.as_deref(), Some("3/3"));
}

#[test]
fn oversized_rows_sit_alone() {
    let geometry = PageGeometry::new(100.0, 100.0, height_from_id);
    let pages = paginate(&sized_rows(&[20, 250, 20]), &geometry).expect("paginate");
    assert_eq!(
        page_rows(&pages),
        vec![vec!["20-0"], vec!["250-1"], vec!["20-2"]]
    );
}

#[test]
fn no_rows_still_produce_a_page() {
    let geometry = PageGeometry::new(100.0, 100.0, height_from_id);
    let pages = paginate(&[], &geometry).expect("paginate");
    assert_eq!(pages.len(), 1);
    assert!(pages[0].rows.is_empty());
    assert_eq!(pages[0].footer.page_label.as_deref(), Some("Page 1 of 1"));
}

#[test]
fn reactive_strategy_tolerates_overflow() {
    let geometry = PageGeometry::new(100.0, 100.0, height_from_id);
    let paginator = Paginator::new(
        &geometry,
        PaginationStrategy::Reactive(ReactiveThresholds::default()),
    )
    .expect("paginator");

    // cursor at 60 is past the overflow margin but 40 units remain, so 45 overflows onto page 1
    let pages = paginator.paginate(&sized_rows(&[60, 45, 10])).expect("paginate");
    assert_eq!(page_rows(&pages), vec![vec!["60-0", "45-1"], vec!["10-2"]]);
    assert_eq!(pages[0].used_height, 105.0);

    let predictive = paginate(&sized_rows(&[60, 45, 10]), &geometry).expect("paginate");
    assert_eq!(page_rows(&predictive), vec![vec!["60-0"], vec!["45-1", "10-2"]]);
}

#[test]
fn reactive_strategy_splits_layout_pieces() {
    let estimator = |row: &Row| {
        column_max_height(row, |field| if field.is_layout() { 30.0 } else { 10.0 })
    };
    let geometry = PageGeometry::new(100.0, 100.0, estimator);
    let paginator = Paginator::new(
        &geometry,
        PaginationStrategy::Reactive(ReactiveThresholds::default()),
    )
    .expect("paginator");

    let rows = vec![
        Row::new("top", Columns::One, vec![text("a"), text("b"), text("c")]),
        Row::new(
            "section",
            Columns::One,
            vec![heading("h1"), heading("h2"), text("d")],
        ),
    ];
    let pages = paginator.paginate(&rows).expect("paginate");

    // cursor at 60 is past the layout margin once h1 lands, so h2 starts page 2
    assert_eq!(page_rows(&pages), vec![vec!["top", "section"], vec!["section"]]);
    let second = &pages[1].rows[0];
    assert_eq!(
        second.fields.iter().map(|field| field.id.as_str()).collect::<Vec<_>>(),
        vec!["h2", "d"]
    );
}

#[test]
fn invalid_geometry_is_rejected() {
    for (first, other) in [(0.0, 100.0), (100.0, -1.0), (f64::INFINITY, 100.0)] {
        let geometry = PageGeometry::new(first, other, height_from_id);
        assert!(matches!(
            paginate(&sized_rows(&[10]), &geometry),
            Err(LayoutError::InvalidGeometry(_))
        ));
    }

    let geometry = PageGeometry::new(100.0, 100.0, height_from_id);
    let thresholds = ReactiveThresholds {
        min_remaining: f64::NAN,
        ..ReactiveThresholds::default()
    };
    assert!(Paginator::new(&geometry, PaginationStrategy::Reactive(thresholds)).is_err());
}

#[test]
fn contact_form_profiles() {
    let form: FormDocument = serde_json::from_str(fixture("contact_form")).expect("deserialize");
    let answers = AnswerMap::from_value(&json!({
        "first_name": "Ann",
        "last_name": "Lee",
        "email": "ann@example.com",
        "subscribe": true,
        "frequency": "Weekly",
    }));

    let pdf = paginate_form(&form, &answers, &PaginationConfig::default()).expect("pdf");
    let placed: Vec<_> = pdf
        .iter()
        .flat_map(|page| page.rows.iter().flat_map(|row| row.fields.iter()))
        .map(|field| field.id.as_str())
        .collect();
    assert!(placed.contains(&"frequency"));
    assert!(!placed.contains(&"referral_other"));
    let total = pdf.len();
    for page in &pdf {
        let expected = format!("Acme Legal · page {} of {}", page.page_number, total);
        assert_eq!(page.footer.text.as_deref(), Some(expected.as_str()));
    }

    let blank = paginate_form(
        &form,
        &AnswerMap::new(),
        &PaginationConfig::for_profile(RenderProfile::BlankPdf),
    )
    .expect("blank");
    let blank_fields: usize = blank
        .iter()
        .flat_map(|page| page.rows.iter())
        .map(|row| row.fields.len())
        .sum();
    assert_eq!(blank_fields, form.all_fields().len());

    let preview = paginate_form(
        &form,
        &answers,
        &PaginationConfig::for_profile(RenderProfile::Preview),
    )
    .expect("preview");
    assert!(!preview.is_empty());
}

proptest! {
    #[test]
    fn pagination_is_deterministic(heights in proptest::collection::vec(1u32..200, 0..40)) {
        let rows = sized_rows(&heights);
        let geometry = PageGeometry::new(180.0, 250.0, height_from_id);
        let first = paginate(&rows, &geometry).expect("paginate");
        let second = paginate(&rows, &geometry).expect("paginate");
        prop_assert_eq!(page_rows(&first), page_rows(&second));

        let placed: usize = first.iter().map(|page| page.rows.len()).sum();
        prop_assert_eq!(placed, rows.len());
        for page in &first {
            let capacity = if page.page_number == 1 { 180.0 } else { 250.0 };
            prop_assert!(page.used_height <= capacity || page.rows.len() == 1);
        }
    }
}
