use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::spec::field::Field;
use crate::spec::serde_helpers::{deserialize_id, null_as_default};

/// Column count of a layout row.
///
/// Persisted values other than 2 or 3 degrade to a single column. Whole
/// numbers written as floats or strings (`2.0`, `"3"`) are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "u8")]
pub enum Columns {
    #[default]
    One,
    Two,
    Three,
}

impl Columns {
    pub fn count(&self) -> usize {
        match self {
            Columns::One => 1,
            Columns::Two => 2,
            Columns::Three => 3,
        }
    }
}

impl From<u64> for Columns {
    fn from(value: u64) -> Self {
        match value {
            2 => Columns::Two,
            3 => Columns::Three,
            _ => Columns::One,
        }
    }
}

impl From<Value> for Columns {
    fn from(value: Value) -> Self {
        let count = match &value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        match count {
            Some(count) if count == 2.0 => Columns::Two,
            Some(count) if count == 3.0 => Columns::Three,
            _ => Columns::One,
        }
    }
}

impl From<Columns> for u8 {
    fn from(columns: Columns) -> Self {
        columns.count() as u8
    }
}

/// Ordered group of fields rendered side by side.
///
/// A row may hold fewer fields than columns; layout pseudo-fields span all
/// columns regardless of `columns`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Row {
    #[serde(deserialize_with = "deserialize_id")]
    #[schemars(with = "String")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    #[schemars(with = "u8")]
    pub columns: Columns,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<Field>,
}

impl Row {
    pub fn new(id: impl Into<String>, columns: Columns, fields: Vec<Field>) -> Self {
        Self {
            id: id.into(),
            columns,
            fields,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
