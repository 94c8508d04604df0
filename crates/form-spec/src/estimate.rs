//! Type-aware row height estimates for PDF export and screen preview.

use crate::answers::{AnswerMap, display_value, is_blank};
use crate::paginate::{RowHeightEstimator, column_max_height};
use crate::spec::{Field, FieldType, PdfSettings, Row};

/// Text measurement supplied by the active renderer.
pub trait TextMeasurer {
    /// Wraps `text` into lines no wider than `max_width`.
    fn wrap_text(&self, text: &str, max_width: f64) -> Vec<String>;

    /// Height of one line at `font_size` points.
    fn line_height(&self, font_size: f64) -> f64;
}

/// Fixed-advance measurer: every character is `char_width` wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasurer {
    pub char_width: f64,
    pub line_height_factor: f64,
    /// Conversion from points to the output unit.
    pub points_to_unit: f64,
}

impl MonospaceMeasurer {
    pub fn millimeters() -> Self {
        Self {
            char_width: 1.9,
            line_height_factor: 1.15,
            points_to_unit: 0.3528,
        }
    }

    pub fn pixels() -> Self {
        Self {
            char_width: 7.5,
            line_height_factor: 1.5,
            points_to_unit: 96.0 / 72.0,
        }
    }

    fn max_chars(&self, max_width: f64) -> usize {
        if self.char_width > 0.0 && max_width.is_finite() {
            ((max_width / self.char_width).floor() as usize).max(1)
        } else {
            usize::MAX
        }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn wrap_text(&self, text: &str, max_width: f64) -> Vec<String> {
        let limit = self.max_chars(max_width);
        text.split('\n')
            .flat_map(|paragraph| wrap_paragraph(paragraph, limit))
            .collect()
    }

    fn line_height(&self, font_size: f64) -> f64 {
        font_size * self.line_height_factor * self.points_to_unit
    }
}

fn wrap_paragraph(paragraph: &str, limit: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in paragraph.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > limit {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = chars.split_off(limit);
            lines.push(chars.into_iter().collect());
            chars = rest;
        }
        if chars.is_empty() {
            continue;
        }

        let needed = if current_len == 0 {
            chars.len()
        } else {
            current_len + 1 + chars.len()
        };
        if needed > limit {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current_len += chars.len();
        current.extend(chars);
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Unit-agnostic sizing constants for the estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightMetrics {
    pub heading1: f64,
    pub heading2: f64,
    pub divider: f64,
    pub paragraph_font_size: f64,
    pub paragraph_spacing: f64,
    pub label_height: f64,
    pub field_padding: f64,
    pub answer_font_size: f64,
    pub blank_input: f64,
    pub textarea_min: f64,
    pub option_line: f64,
    pub signature: f64,
    pub column_gap: f64,
    pub row_gap: f64,
    pub logo: f64,
    pub title: f64,
    pub subtitle: f64,
    pub date: f64,
    pub header_gap: f64,
}

impl HeightMetrics {
    pub fn pdf_millimeters() -> Self {
        Self {
            heading1: 14.0,
            heading2: 10.0,
            divider: 6.0,
            paragraph_font_size: 10.0,
            paragraph_spacing: 4.0,
            label_height: 6.0,
            field_padding: 4.0,
            answer_font_size: 10.0,
            blank_input: 8.0,
            textarea_min: 20.0,
            option_line: 6.0,
            signature: 50.0,
            column_gap: 5.0,
            row_gap: 2.0,
            logo: 20.0,
            title: 10.0,
            subtitle: 7.0,
            date: 6.0,
            header_gap: 6.0,
        }
    }

    pub fn screen_pixels() -> Self {
        Self {
            heading1: 48.0,
            heading2: 36.0,
            divider: 24.0,
            paragraph_font_size: 14.0,
            paragraph_spacing: 12.0,
            label_height: 24.0,
            field_padding: 16.0,
            answer_font_size: 14.0,
            blank_input: 40.0,
            textarea_min: 96.0,
            option_line: 28.0,
            signature: 160.0,
            column_gap: 24.0,
            row_gap: 16.0,
            logo: 64.0,
            title: 40.0,
            subtitle: 28.0,
            date: 20.0,
            header_gap: 24.0,
        }
    }

    /// Space the first-page header block (logo, title, subtitle, date) takes.
    pub fn header_height(&self, settings: &PdfSettings) -> f64 {
        let parts = [
            (settings.logo_url.is_some(), self.logo),
            (settings.title.is_some(), self.title),
            (settings.subtitle.is_some(), self.subtitle),
            (settings.show_date, self.date),
        ];
        let height: f64 = parts
            .iter()
            .filter(|(present, _)| *present)
            .map(|(_, height)| height)
            .sum();
        if height > 0.0 {
            height + self.header_gap
        } else {
            0.0
        }
    }
}

/// Estimates row heights from field types, wrapped text and, when filled, answers.
///
/// Without answers the estimate describes a blank form: choice fields list
/// their options and inputs reserve an empty line.
#[derive(Debug, Clone)]
pub struct TypeAwareEstimator<'a, M> {
    metrics: HeightMetrics,
    measurer: M,
    content_width: f64,
    answers: Option<&'a AnswerMap>,
}

impl<'a, M: TextMeasurer> TypeAwareEstimator<'a, M> {
    pub fn new(metrics: HeightMetrics, measurer: M, content_width: f64) -> Self {
        Self {
            metrics,
            measurer,
            content_width,
            answers: None,
        }
    }

    pub fn with_answers(mut self, answers: &'a AnswerMap) -> Self {
        self.answers = Some(answers);
        self
    }

    fn column_width(&self, row: &Row) -> f64 {
        let columns = row.columns.count() as f64;
        ((self.content_width - self.metrics.column_gap * (columns - 1.0)) / columns).max(0.0)
    }

    fn wrapped_lines(&self, text: &str, width: f64) -> usize {
        self.measurer.wrap_text(text, width).len().max(1)
    }

    pub fn field_height(&self, field: &Field, width: f64) -> f64 {
        let metrics = &self.metrics;
        match field.field_type() {
            FieldType::Heading1 => metrics.heading1,
            FieldType::Heading2 => metrics.heading2,
            FieldType::Divider => metrics.divider,
            FieldType::Paragraph => {
                let lines = self.wrapped_lines(field.content().unwrap_or_default(), width);
                lines as f64 * self.measurer.line_height(metrics.paragraph_font_size)
                    + metrics.paragraph_spacing
            }
            // same space whether signed or not, so filled and blank exports line up
            FieldType::Signature => metrics.label_height + metrics.signature + metrics.field_padding,
            _ => metrics.label_height + self.value_height(field, width) + metrics.field_padding,
        }
    }

    fn value_height(&self, field: &Field, width: f64) -> f64 {
        let metrics = &self.metrics;
        let line = self.measurer.line_height(metrics.answer_font_size);

        let Some(answers) = self.answers else {
            return match field.field_type() {
                FieldType::Radio | FieldType::Multiselect => {
                    field.options().len().max(1) as f64 * metrics.option_line
                }
                FieldType::Checkbox => metrics.option_line,
                FieldType::Textarea => metrics.textarea_min,
                _ => metrics.blank_input,
            };
        };

        let answer = answers.get(&field.id).filter(|value| !is_blank(Some(value)));
        let lines = match (field.field_type(), answer) {
            (FieldType::File, _) | (_, None) => 1,
            (_, Some(value)) => self.wrapped_lines(&display_value(value), width),
        };
        let height = lines as f64 * line;
        if field.field_type() == FieldType::Textarea {
            height.max(metrics.textarea_min)
        } else {
            height
        }
    }
}

impl<M: TextMeasurer> RowHeightEstimator for TypeAwareEstimator<'_, M> {
    fn row_height(&self, row: &Row) -> f64 {
        let column_width = self.column_width(row);
        let content = column_max_height(row, |field| {
            let width = if field.is_layout() {
                self.content_width
            } else {
                column_width
            };
            self.field_height(field, width)
        });
        content + self.metrics.row_gap
    }
}
