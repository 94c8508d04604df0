use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::condition::Condition;
use crate::spec::row::Columns;
use crate::spec::serde_helpers::{deserialize_id, deserialize_optional_id, null_as_default};

/// Shared payload for free-input field types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InputField {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// Payload for field types that pick from a fixed list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChoiceField {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub required: bool,
    pub options: Vec<String>,
}

/// Payload for headings and paragraphs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LayoutContent {
    #[serde(default)]
    pub content: String,
}

/// Field variants keyed by the persisted `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text(InputField),
    Email(InputField),
    Number(InputField),
    Tel(InputField),
    Url(InputField),
    Date(InputField),
    Time(InputField),
    Textarea(InputField),
    Select(ChoiceField),
    Multiselect(ChoiceField),
    Radio(ChoiceField),
    Checkbox(InputField),
    File(InputField),
    Rating(InputField),
    Signature(InputField),
    Heading1(LayoutContent),
    Heading2(LayoutContent),
    Paragraph(LayoutContent),
    Divider,
}

/// Copyable mirror of the [`FieldKind`] tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    Email,
    Number,
    Tel,
    Url,
    Date,
    Time,
    Textarea,
    Select,
    Multiselect,
    Radio,
    Checkbox,
    File,
    Rating,
    Signature,
    Heading1,
    Heading2,
    Paragraph,
    Divider,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Number => "number",
            FieldType::Tel => "tel",
            FieldType::Url => "url",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Multiselect => "multiselect",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::File => "file",
            FieldType::Rating => "rating",
            FieldType::Signature => "signature",
            FieldType::Heading1 => "heading1",
            FieldType::Heading2 => "heading2",
            FieldType::Paragraph => "paragraph",
            FieldType::Divider => "divider",
        }
    }

    /// Headings, paragraphs and dividers: rendered content, never answered.
    pub fn is_layout(&self) -> bool {
        matches!(
            self,
            FieldType::Heading1 | FieldType::Heading2 | FieldType::Paragraph | FieldType::Divider
        )
    }

    /// Types that always take a full row when importing templates.
    pub fn is_large(&self) -> bool {
        matches!(
            self,
            FieldType::Textarea | FieldType::File | FieldType::Signature
        )
    }

    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            FieldType::Select | FieldType::Multiselect | FieldType::Radio
        )
    }
}

/// A single form element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Field {
    #[serde(deserialize_with = "deserialize_id")]
    #[schemars(with = "String")]
    pub id: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub conditions: Vec<Condition>,
    #[serde(
        rename = "rowId",
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>")]
    pub row_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<u8>")]
    pub columns: Option<Columns>,
}

impl Field {
    pub fn new(id: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            kind,
            conditions: Vec::new(),
            row_id: None,
            columns: None,
        }
    }

    pub fn with_conditions(mut self, conditions: Vec<Condition>) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_row_hint(mut self, row_id: impl Into<String>, columns: Columns) -> Self {
        self.row_id = Some(row_id.into());
        self.columns = Some(columns);
        self
    }

    pub fn field_type(&self) -> FieldType {
        match &self.kind {
            FieldKind::Text(_) => FieldType::Text,
            FieldKind::Email(_) => FieldType::Email,
            FieldKind::Number(_) => FieldType::Number,
            FieldKind::Tel(_) => FieldType::Tel,
            FieldKind::Url(_) => FieldType::Url,
            FieldKind::Date(_) => FieldType::Date,
            FieldKind::Time(_) => FieldType::Time,
            FieldKind::Textarea(_) => FieldType::Textarea,
            FieldKind::Select(_) => FieldType::Select,
            FieldKind::Multiselect(_) => FieldType::Multiselect,
            FieldKind::Radio(_) => FieldType::Radio,
            FieldKind::Checkbox(_) => FieldType::Checkbox,
            FieldKind::File(_) => FieldType::File,
            FieldKind::Rating(_) => FieldType::Rating,
            FieldKind::Signature(_) => FieldType::Signature,
            FieldKind::Heading1(_) => FieldType::Heading1,
            FieldKind::Heading2(_) => FieldType::Heading2,
            FieldKind::Paragraph(_) => FieldType::Paragraph,
            FieldKind::Divider => FieldType::Divider,
        }
    }

    fn input(&self) -> Option<&InputField> {
        match &self.kind {
            FieldKind::Text(input)
            | FieldKind::Email(input)
            | FieldKind::Number(input)
            | FieldKind::Tel(input)
            | FieldKind::Url(input)
            | FieldKind::Date(input)
            | FieldKind::Time(input)
            | FieldKind::Textarea(input)
            | FieldKind::Checkbox(input)
            | FieldKind::File(input)
            | FieldKind::Rating(input)
            | FieldKind::Signature(input) => Some(input),
            _ => None,
        }
    }

    fn choice(&self) -> Option<&ChoiceField> {
        match &self.kind {
            FieldKind::Select(choice) | FieldKind::Multiselect(choice) | FieldKind::Radio(choice) => {
                Some(choice)
            }
            _ => None,
        }
    }

    /// Display name; `None` for layout pseudo-fields.
    pub fn label(&self) -> Option<&str> {
        self.input()
            .map(|input| input.label.as_str())
            .or_else(|| self.choice().map(|choice| choice.label.as_str()))
    }

    pub fn required(&self) -> bool {
        self.input()
            .map(|input| input.required)
            .or_else(|| self.choice().map(|choice| choice.required))
            .unwrap_or(false)
    }

    pub fn options(&self) -> &[String] {
        self.choice()
            .map(|choice| choice.options.as_slice())
            .unwrap_or(&[])
    }

    /// Body text of headings and paragraphs.
    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Heading1(layout)
            | FieldKind::Heading2(layout)
            | FieldKind::Paragraph(layout) => Some(layout.content.as_str()),
            _ => None,
        }
    }

    pub fn is_layout(&self) -> bool {
        self.field_type().is_layout()
    }

    pub fn is_large(&self) -> bool {
        self.field_type().is_large()
    }
}
