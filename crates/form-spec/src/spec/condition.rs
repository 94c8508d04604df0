use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::spec::serde_helpers::{deserialize_optional_id, null_as_default};

/// Effect applied when a condition's rules match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConditionAction {
    Show,
    Hide,
}

/// How a condition combines its rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConditionLogic {
    #[default]
    All,
    Any,
}

/// Comparison applied by a [`Rule`].
///
/// Unrecognised operators are preserved as [`RuleOperator::Other`] and never match.
/// A missing or non-string operator becomes an empty `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", into = "String")]
pub enum RuleOperator {
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
    Other(String),
}

impl RuleOperator {
    pub fn as_str(&self) -> &str {
        match self {
            RuleOperator::Equals => "equals",
            RuleOperator::NotEquals => "not_equals",
            RuleOperator::Contains => "contains",
            RuleOperator::GreaterThan => "greater_than",
            RuleOperator::LessThan => "less_than",
            RuleOperator::Other(raw) => raw,
        }
    }
}

impl From<String> for RuleOperator {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "equals" => RuleOperator::Equals,
            "not_equals" => RuleOperator::NotEquals,
            "contains" => RuleOperator::Contains,
            "greater_than" => RuleOperator::GreaterThan,
            "less_than" => RuleOperator::LessThan,
            _ => RuleOperator::Other(raw),
        }
    }
}

impl From<Value> for RuleOperator {
    fn from(raw: Value) -> Self {
        match raw {
            Value::String(text) => RuleOperator::from(text),
            _ => RuleOperator::default(),
        }
    }
}

impl Default for RuleOperator {
    fn default() -> Self {
        RuleOperator::Other(String::new())
    }
}

impl From<RuleOperator> for String {
    fn from(operator: RuleOperator) -> Self {
        operator.as_str().to_string()
    }
}

/// Compares another field's current answer with a literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Rule {
    #[serde(
        rename = "fieldId",
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>")]
    pub field_id: Option<String>,
    #[serde(default)]
    #[schemars(with = "String")]
    pub operator: RuleOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Rule {
    pub fn new(field_id: impl Into<String>, operator: RuleOperator, value: impl Into<Value>) -> Self {
        Self {
            field_id: Some(field_id.into()),
            operator,
            value: Some(value.into()),
        }
    }
}

/// Visibility rule-set attached to a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Condition {
    pub action: ConditionAction,
    #[serde(default, deserialize_with = "null_as_default")]
    pub logic: ConditionLogic,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<Rule>,
}

impl Condition {
    pub fn show(logic: ConditionLogic, rules: Vec<Rule>) -> Self {
        Self {
            action: ConditionAction::Show,
            logic,
            rules,
        }
    }

    pub fn hide(logic: ConditionLogic, rules: Vec<Rule>) -> Self {
        Self {
            action: ConditionAction::Hide,
            logic,
            rules,
        }
    }
}
