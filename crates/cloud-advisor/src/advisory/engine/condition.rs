use std::cmp::Ordering;

use serde_json::Value;

use super::super::descriptor::{FieldValue, WorkloadDescriptor};
use super::super::rules::{Condition, Operator};

/// Raised when a condition names an operator the evaluator does not implement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported operator `{0}`")]
pub struct UnsupportedOperator(pub String);

/// Evaluate one condition against the descriptor.
///
/// Unknown fields resolve to null; null never satisfies `contains`, `gte` or `lte`.
pub fn evaluate_condition(
    descriptor: &WorkloadDescriptor,
    condition: &Condition,
) -> Result<bool, UnsupportedOperator> {
    let actual = descriptor.resolve(&condition.field);
    let expected = &condition.value;

    let outcome = match &condition.operator {
        Operator::Eq => actual.equals(expected),
        Operator::Ne => !actual.equals(expected),
        Operator::In => is_member(actual, expected),
        Operator::Contains => actual.contains(expected),
        Operator::Gte => matches!(
            actual.compare(expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::Lte => matches!(
            actual.compare(expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Operator::Unsupported(raw) => return Err(UnsupportedOperator(raw.clone())),
    };

    Ok(outcome)
}

fn is_member(actual: FieldValue<'_>, expected: &Value) -> bool {
    match expected {
        Value::Array(items) => items.iter().any(|item| actual.equals(item)),
        _ => false,
    }
}

impl FieldValue<'_> {
    fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null | FieldValue::Json(Value::Null))
    }

    fn equals(&self, expected: &Value) -> bool {
        match *self {
            FieldValue::Null => expected.is_null(),
            FieldValue::Text(text) => expected.as_str() == Some(text),
            FieldValue::Integer(number) => expected
                .as_f64()
                .is_some_and(|other| other == f64::from(number)),
            FieldValue::List(items) => match expected {
                Value::Array(others) => {
                    items.len() == others.len()
                        && items
                            .iter()
                            .zip(others)
                            .all(|(item, other)| other.as_str() == Some(item.as_str()))
                }
                _ => false,
            },
            FieldValue::Map(map) => match expected {
                Value::Object(others) => {
                    map.len() == others.len()
                        && map.iter().all(|(key, value)| {
                            others.get(key).is_some_and(|other| json_equals(value, other))
                        })
                }
                _ => false,
            },
            FieldValue::Json(value) => json_equals(value, expected),
        }
    }

    fn contains(&self, needle: &Value) -> bool {
        if self.is_null() {
            return false;
        }

        match *self {
            FieldValue::List(items) => needle
                .as_str()
                .is_some_and(|needle| items.iter().any(|item| item == needle)),
            FieldValue::Text(text) => needle.as_str().is_some_and(|needle| text.contains(needle)),
            FieldValue::Map(map) => needle.as_str().is_some_and(|key| map.contains_key(key)),
            FieldValue::Json(Value::Array(items)) => {
                items.iter().any(|item| json_equals(item, needle))
            }
            FieldValue::Json(Value::String(text)) => needle
                .as_str()
                .is_some_and(|needle| text.contains(needle)),
            FieldValue::Json(Value::Object(map)) => {
                needle.as_str().is_some_and(|key| map.contains_key(key))
            }
            _ => false,
        }
    }

    fn compare(&self, expected: &Value) -> Option<Ordering> {
        if self.is_null() {
            return None;
        }

        match *self {
            FieldValue::Integer(number) => f64::from(number).partial_cmp(&expected.as_f64()?),
            FieldValue::Text(text) => Some(text.cmp(expected.as_str()?)),
            FieldValue::Json(value) => json_compare(value, expected),
            _ => None,
        }
    }
}

fn json_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| json_equals(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| json_equals(x, y)))
        }
        _ => left == right,
    }
}

fn json_compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
