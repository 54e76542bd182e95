//! Fail-fast checks over response bodies.
//!
//! Every function returns `Ok(())` or the first failure as an `ApiError`
//! naming the field, expected value and actual value. The structural
//! helpers back the per-resource validators; the rest are the relational,
//! uniqueness, ordering, timing and header checks used by flows.

use std::collections::HashSet;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::http::{json_kind, ApiResponse};
use crate::schema::is_valid_email;

fn render(value: Option<&Value>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "missing".to_string(),
    }
}

/// The body as an object, or a field error.
pub fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, ApiError> {
    value
        .as_object()
        .ok_or_else(|| ApiError::field(what, "an object", json_kind(value)))
}

pub fn require_fields(value: &Value, fields: &[&str]) -> Result<(), ApiError> {
    let object = as_object(value, "body")?;
    for field in fields {
        if !object.contains_key(*field) {
            return Err(ApiError::field(*field, "property to be present", "missing"));
        }
    }
    Ok(())
}

pub fn expect_number(value: &Value, field: &str) -> Result<(), ApiError> {
    match value.get(field) {
        Some(v) if v.is_number() => Ok(()),
        other => Err(ApiError::field(field, "a number", render(other))),
    }
}

pub fn expect_string(value: &Value, field: &str) -> Result<(), ApiError> {
    match value.get(field) {
        Some(v) if v.is_string() => Ok(()),
        other => Err(ApiError::field(field, "a string", render(other))),
    }
}

pub fn expect_bool(value: &Value, field: &str) -> Result<(), ApiError> {
    match value.get(field) {
        Some(v) if v.is_boolean() => Ok(()),
        other => Err(ApiError::field(field, "a boolean", render(other))),
    }
}

pub fn expect_email(value: &Value, field: &str) -> Result<(), ApiError> {
    match value.get(field).and_then(Value::as_str) {
        Some(email) if is_valid_email(email) => Ok(()),
        _ => Err(ApiError::field(field, "a valid email address", render(value.get(field)))),
    }
}

/// Body is a non-empty array and every element passes `validate`.
pub fn validate_list<F>(body: &Value, validate: F) -> Result<(), ApiError>
where
    F: Fn(&Value) -> Result<(), ApiError>,
{
    let items = body
        .as_array()
        .ok_or_else(|| ApiError::field("body", "an array", json_kind(body)))?;
    if items.is_empty() {
        return Err(ApiError::field("body", "a non-empty array", "[]"));
    }
    items.iter().try_for_each(validate)
}

/// `field` holds exactly `expected`.
pub fn expect_field_eq(value: &Value, field: &str, expected: &Value) -> Result<(), ApiError> {
    match value.get(field) {
        Some(actual) if actual == expected => Ok(()),
        other => Err(ApiError::field(field, format!("to equal {expected}"), render(other))),
    }
}

/// A foreign key points at the expected parent id.
pub fn expect_relation(value: &Value, field: &str, parent_id: u64) -> Result<(), ApiError> {
    match value.get(field) {
        Some(actual) if actual.as_u64() == Some(parent_id) => Ok(()),
        other => Err(ApiError::Relation {
            field: field.to_string(),
            expected: parent_id.to_string(),
            actual: render(other),
        }),
    }
}

/// Every element of a list body points at the same parent.
pub fn expect_all_related(body: &Value, field: &str, parent_id: u64) -> Result<(), ApiError> {
    let items = body
        .as_array()
        .ok_or_else(|| ApiError::field("body", "an array", json_kind(body)))?;
    items.iter().try_for_each(|item| expect_relation(item, field, parent_id))
}

fn ids(body: &Value) -> Result<Vec<u64>, ApiError> {
    let items = body
        .as_array()
        .ok_or_else(|| ApiError::field("body", "an array", json_kind(body)))?;
    items
        .iter()
        .map(|item| {
            item.get("id")
                .and_then(Value::as_u64)
                .ok_or_else(|| ApiError::field("id", "a non-negative integer", render(item.get("id"))))
        })
        .collect()
}

pub fn expect_unique_ids(body: &Value) -> Result<(), ApiError> {
    let mut seen = HashSet::new();
    for id in ids(body)? {
        if !seen.insert(id) {
            return Err(ApiError::Assertion(format!("duplicate id {id} in list")));
        }
    }
    Ok(())
}

pub fn expect_ascending_ids(body: &Value) -> Result<(), ApiError> {
    let ids = ids(body)?;
    for pair in ids.windows(2) {
        if pair[1] <= pair[0] {
            return Err(ApiError::Assertion(format!(
                "ids not strictly ascending: {} followed by {}",
                pair[0], pair[1]
            )));
        }
    }
    Ok(())
}

pub fn expect_response_time(response: &ApiResponse, max: Duration) -> Result<(), ApiError> {
    if response.duration < max {
        return Ok(());
    }
    Err(ApiError::Assertion(format!(
        "{} {} took {}ms, expected under {}ms",
        response.method,
        response.endpoint,
        response.duration_ms(),
        max.as_millis()
    )))
}

/// `content-type` is present and names JSON.
pub fn expect_json_content_type(response: &ApiResponse) -> Result<(), ApiError> {
    match response.header("content-type") {
        Some(ct) if ct.contains("application/json") => Ok(()),
        other => Err(ApiError::field(
            "content-type",
            "to include application/json",
            other.unwrap_or("missing"),
        )),
    }
}

/// Copy of an object without the named top-level fields.
pub fn without_fields(value: &Value, fields: &[&str]) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !fields.contains(&key.as_str()))
                .map(|(key, v)| (key.clone(), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Deep equality after dropping `ignore` from both sides.
pub fn expect_equal_ignoring(left: &Value, right: &Value, ignore: &[&str]) -> Result<(), ApiError> {
    let left = without_fields(left, ignore);
    let right = without_fields(right, ignore);
    if left == right {
        return Ok(());
    }
    Err(ApiError::Assertion(format!("objects differ: {left} != {right}")))
}
