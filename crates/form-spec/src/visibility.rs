use std::collections::BTreeMap;

use crate::answers::{AnswerMap, coerce_to_string, is_blank, is_truthy};
use crate::spec::{ConditionAction, ConditionLogic, Field, FieldType, Rule, RuleOperator};

pub type VisibilityMap = BTreeMap<String, bool>;

const CHECKED: &str = "checked";
const UNCHECKED: &str = "unchecked";

/// Decides whether `field` displays for the current answers.
///
/// Conditions are evaluated in declaration order and ANDed together: a `show`
/// condition that does not hold, or a `hide` condition that does, vetoes the
/// field immediately. A field without conditions is always visible.
pub fn is_field_visible(field: &Field, answers: &AnswerMap, all_fields: &[Field]) -> bool {
    for condition in &field.conditions {
        let mut results = condition
            .rules
            .iter()
            .map(|rule| evaluate_rule(rule, answers, all_fields));
        let matched = match condition.logic {
            ConditionLogic::All => results.all(|result| result),
            ConditionLogic::Any => results.any(|result| result),
        };

        match (condition.action, matched) {
            (ConditionAction::Show, false) | (ConditionAction::Hide, true) => return false,
            _ => {}
        }
    }
    true
}

/// Evaluates one rule; anything unresolvable evaluates to `false`.
///
/// An unanswered dependency never satisfies a rule, `not_equals` included.
pub fn evaluate_rule(rule: &Rule, answers: &AnswerMap, all_fields: &[Field]) -> bool {
    let Some(field_id) = rule.field_id.as_deref() else {
        return false;
    };
    let Some(expected) = rule.value.as_ref().filter(|value| !is_blank(Some(value))) else {
        return false;
    };
    let answer = answers.get(field_id);
    let expected = coerce_to_string(expected);

    let is_checkbox = all_fields
        .iter()
        .find(|field| field.id == field_id)
        .is_some_and(|field| field.field_type() == FieldType::Checkbox);
    if is_checkbox && let Some(result) = checkbox_rule(&rule.operator, &expected, is_truthy(answer)) {
        return result;
    }

    if is_blank(answer) {
        return false;
    }
    let actual = answer.map(coerce_to_string).unwrap_or_default().to_lowercase();
    compare(&rule.operator, &actual, &expected.to_lowercase())
}

fn checkbox_rule(operator: &RuleOperator, expected: &str, checked: bool) -> Option<bool> {
    if matches!(operator, RuleOperator::Other(_)) {
        return Some(false);
    }
    let literal = *operator == RuleOperator::Equals;
    match expected {
        CHECKED => Some(checked == literal),
        UNCHECKED => Some(checked != literal),
        _ => None,
    }
}

fn compare(operator: &RuleOperator, actual: &str, expected: &str) -> bool {
    match operator {
        RuleOperator::Equals => actual == expected,
        RuleOperator::NotEquals => actual != expected,
        RuleOperator::Contains => actual.contains(expected),
        RuleOperator::GreaterThan => parse_float_prefix(actual) > parse_float_prefix(expected),
        RuleOperator::LessThan => parse_float_prefix(actual) < parse_float_prefix(expected),
        RuleOperator::Other(_) => false,
    }
}

/// Parses the longest leading decimal literal, `NaN` when there is none.
///
/// `"12kg"` parses as `12`, `"abc"` as `NaN`; comparisons against `NaN` are false.
pub(crate) fn parse_float_prefix(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|byte| byte.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let integer_digits = digits_from(end);
    end += integer_digits;

    let mut mantissa_digits = integer_digits;
    if bytes.get(end) == Some(&b'.') {
        let fraction_digits = digits_from(end + 1);
        if integer_digits + fraction_digits > 0 {
            end += 1 + fraction_digits;
            mantissa_digits += fraction_digits;
        }
    }
    if mantissa_digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut cursor = end + 1;
        if matches!(bytes.get(cursor), Some(b'+' | b'-')) {
            cursor += 1;
        }
        let exponent_digits = digits_from(cursor);
        if exponent_digits > 0 {
            end = cursor + exponent_digits;
        }
    }

    trimmed[..end].parse::<f64>().unwrap_or(f64::NAN)
}

/// Visibility of every field, keyed by id.
pub fn resolve_visibility(fields: &[Field], answers: &AnswerMap) -> VisibilityMap {
    fields
        .iter()
        .map(|field| (field.id.clone(), is_field_visible(field, answers, fields)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{Condition, FieldKind, InputField};
    use serde_json::json;

    fn text(id: &str) -> Field {
        Field::new(id, FieldKind::Text(InputField::default()))
    }

    fn answers(value: serde_json::Value) -> AnswerMap {
        AnswerMap::from_value(&value)
    }

    #[test]
    fn parse_float_prefix_behaves_like_parse_float() {
        assert_eq!(parse_float_prefix("12kg"), 12.0);
        assert_eq!(parse_float_prefix("  -3.5e2x"), -350.0);
        assert_eq!(parse_float_prefix(".5"), 0.5);
        assert_eq!(parse_float_prefix("7."), 7.0);
        assert_eq!(parse_float_prefix("1e"), 1.0);
        assert!(parse_float_prefix("abc").is_nan());
        assert!(parse_float_prefix("-").is_nan());
        assert!(parse_float_prefix(".").is_nan());
        assert!(parse_float_prefix("infinity").is_nan());
    }

    #[test]
    fn numeric_operators() {
        let fields = vec![text("age")];
        let gt = Rule::new("age", RuleOperator::GreaterThan, "18");
        let lt = Rule::new("age", RuleOperator::LessThan, 18);
        assert!(evaluate_rule(&gt, &answers(json!({ "age": "21" })), &fields));
        assert!(!evaluate_rule(&gt, &answers(json!({ "age": 18 })), &fields));
        assert!(evaluate_rule(&lt, &answers(json!({ "age": 9.5 })), &fields));
        assert!(!evaluate_rule(&gt, &answers(json!({ "age": "n/a" })), &fields));
        assert!(!evaluate_rule(&lt, &answers(json!({ "age": "n/a" })), &fields));
    }

    #[test]
    fn contains_is_case_insensitive_and_joins_arrays() {
        let fields = vec![text("tags")];
        let rule = Rule::new("tags", RuleOperator::Contains, "Blue");
        assert!(evaluate_rule(&rule, &answers(json!({ "tags": ["red", "BLUE"] })), &fields));
        assert!(!evaluate_rule(&rule, &answers(json!({ "tags": "green" })), &fields));
    }

    #[test]
    fn unknown_operator_never_matches() {
        let fields = vec![text("a")];
        let rule = Rule::new("a", RuleOperator::Other("matches".into()), "x");
        assert!(!evaluate_rule(&rule, &answers(json!({ "a": "x" })), &fields));
    }

    #[test]
    fn missing_field_id_or_value_never_matches() {
        let fields = vec![text("a")];
        let data = answers(json!({ "a": "x" }));
        let mut rule = Rule::new("a", RuleOperator::Equals, "x");
        assert!(evaluate_rule(&rule, &data, &fields));
        rule.value = Some(json!(""));
        assert!(!evaluate_rule(&rule, &data, &fields));
        rule.value = None;
        assert!(!evaluate_rule(&rule, &data, &fields));
        let no_target = Rule {
            field_id: None,
            operator: RuleOperator::Equals,
            value: Some(json!("x")),
        };
        assert!(!evaluate_rule(&no_target, &data, &fields));
    }

    #[test]
    fn empty_any_condition_vetoes_show() {
        let field = text("b").with_conditions(vec![Condition::show(ConditionLogic::Any, vec![])]);
        assert!(!is_field_visible(&field, &AnswerMap::new(), &[]));
        let field = text("b").with_conditions(vec![Condition::show(ConditionLogic::All, vec![])]);
        assert!(is_field_visible(&field, &AnswerMap::new(), &[]));
    }

    #[test]
    fn resolve_visibility_covers_every_field() {
        let fields = vec![
            text("a"),
            text("b").with_conditions(vec![Condition::hide(
                ConditionLogic::All,
                vec![Rule::new("a", RuleOperator::Equals, "skip")],
            )]),
        ];
        let map = resolve_visibility(&fields, &answers(json!({ "a": "SKIP" })));
        assert_eq!(map.get("a"), Some(&true));
        assert_eq!(map.get("b"), Some(&false));
    }
}
