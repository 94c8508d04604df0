use std::borrow::Cow;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::field::Field;
use crate::spec::row::Row;
use crate::spec::serde_helpers::{deserialize_id, null_as_default};

fn default_true() -> bool {
    true
}

/// Header block and footer options for exported pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PdfSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub show_date: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_text: Option<String>,
    #[serde(default = "default_true")]
    pub show_page_numbers: bool,
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            logo_url: None,
            title: None,
            subtitle: None,
            show_date: false,
            footer_text: None,
            show_page_numbers: true,
        }
    }
}

/// Persisted form definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormDocument {
    #[serde(deserialize_with = "deserialize_id")]
    #[schemars(with = "String")]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<Field>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub rows: Vec<Row>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pdf: PdfSettings,
}

impl FormDocument {
    /// Flat field list; derived from the rows when only rows were persisted.
    pub fn all_fields(&self) -> Cow<'_, [Field]> {
        if self.fields.is_empty() {
            Cow::Owned(
                self.rows
                    .iter()
                    .flat_map(|row| row.fields.iter().cloned())
                    .collect(),
            )
        } else {
            Cow::Borrowed(&self.fields)
        }
    }

    pub fn find_field(&self, id: &str) -> Option<&Field> {
        self.fields
            .iter()
            .chain(self.rows.iter().flat_map(|row| row.fields.iter()))
            .find(|field| field.id == id)
    }
}
