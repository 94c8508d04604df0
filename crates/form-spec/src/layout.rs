use tracing::{debug, trace};

use crate::answers::AnswerMap;
use crate::spec::{Columns, Field, Row};
use crate::visibility::is_field_visible;

const TEMPLATE_LOOKAHEAD: usize = 3;

/// Groups fields into ordered rows.
///
/// A non-empty `row_structure` is used verbatim (structured mode); otherwise
/// rows are inferred from the flat field list. With `apply_conditions` only
/// visible fields are kept and rows left empty are dropped; without it every
/// field and row passes through, as the builder needs when editing.
pub fn build_layout_rows(
    fields: &[Field],
    row_structure: Option<&[Row]>,
    answers: &AnswerMap,
    apply_conditions: bool,
) -> Vec<Row> {
    match row_structure {
        Some(rows) if !rows.is_empty() => {
            debug!(rows = rows.len(), apply_conditions, "structured layout");
            structured_rows(fields, rows, answers, apply_conditions)
        }
        _ => {
            debug!(fields = fields.len(), apply_conditions, "inferred layout");
            inferred_rows(fields, answers, apply_conditions)
        }
    }
}

fn structured_rows(
    fields: &[Field],
    rows: &[Row],
    answers: &AnswerMap,
    apply_conditions: bool,
) -> Vec<Row> {
    if !apply_conditions {
        return rows.to_vec();
    }

    let flattened: Vec<Field>;
    let lookup = if fields.is_empty() {
        flattened = rows
            .iter()
            .flat_map(|row| row.fields.iter().cloned())
            .collect();
        flattened.as_slice()
    } else {
        fields
    };

    rows.iter()
        .filter_map(|row| {
            let visible: Vec<Field> = row
                .fields
                .iter()
                .filter(|field| is_field_visible(field, answers, lookup))
                .cloned()
                .collect();
            if visible.is_empty() {
                trace!(row = %row.id, "row has no visible fields");
                return None;
            }
            Some(Row::new(row.id.clone(), row.columns, visible))
        })
        .collect()
}

fn inferred_rows(fields: &[Field], answers: &AnswerMap, apply_conditions: bool) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut pending: Option<Row> = None;

    for field in fields {
        if apply_conditions && !is_field_visible(field, answers, fields) {
            continue;
        }

        match (&field.row_id, field.columns) {
            (Some(row_id), Some(columns)) => match pending.as_mut() {
                Some(row) if row.id == *row_id => row.fields.push(field.clone()),
                _ => {
                    let started = Row::new(row_id.clone(), columns, vec![field.clone()]);
                    rows.extend(pending.replace(started));
                }
            },
            _ => {
                rows.extend(pending.take());
                rows.push(Row::new(
                    format!("row-{}", field.id),
                    Columns::One,
                    vec![field.clone()],
                ));
            }
        }
    }

    rows.extend(pending);
    rows
}

fn is_small(field: &Field) -> bool {
    !field.is_layout() && !field.is_large()
}

/// Column count the template importer picks for the field at `index`.
///
/// Layout and large fields get one column; otherwise the run of small fields
/// starting at `index` (looking at most three ahead) decides between 1, 2, 3.
pub fn determine_optimal_columns(fields: &[Field], index: usize) -> Columns {
    let Some(field) = fields.get(index) else {
        return Columns::One;
    };
    if !is_small(field) {
        return Columns::One;
    }

    let run = fields[index..]
        .iter()
        .take(TEMPLATE_LOOKAHEAD)
        .take_while(|candidate| is_small(candidate))
        .count();
    match run {
        3.. => Columns::Three,
        2 => Columns::Two,
        _ => Columns::One,
    }
}

/// One-shot conversion of a template's flat fields into a persisted row structure.
///
/// Each field is stamped with the `rowId`/`columns` hints of the row it lands in.
pub fn import_template(fields: &[Field]) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut index = 0;

    while index < fields.len() {
        let columns = determine_optimal_columns(fields, index);
        let end = (index + columns.count()).min(fields.len());
        let row_id = format!("row-{}", rows.len() + 1);
        let row_fields = fields[index..end]
            .iter()
            .cloned()
            .map(|field| field.with_row_hint(row_id.clone(), columns))
            .collect();
        rows.push(Row::new(row_id, columns, row_fields));
        index = end;
    }

    debug!(fields = fields.len(), rows = rows.len(), "imported template");
    rows
}
