//! Declarative JSON schemas and their validator.
//!
//! # Design
//! A `Schema` is plain data: an ordered list of `Constraint` variants built
//! with small helpers. `Schema::compile` checks the constraints for
//! consistency once and produces a `CompiledSchema`, which can then validate
//! any number of values. Validation never stops at the first problem: it
//! walks the whole value depth-first and returns every violation in a stable
//! order (type, required fields, properties in declared order, minItems,
//! items by index). A type mismatch ends descent into that value.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::json_kind;

/// Pattern every user and comment email must match.
/// Word characters are ASCII only.
pub const EMAIL_PATTERN: &str = r"^[A-Za-z0-9_.-]+@([A-Za-z0-9_-]+\.)+[A-Za-z0-9_-]{2,4}$";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("EMAIL_PATTERN is a valid regex"));

pub fn is_valid_email(candidate: &str) -> bool {
    EMAIL_RE.is_match(candidate)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

impl JsonType {
    fn accepts(self, value: &Value) -> bool {
        match self {
            JsonType::Object => value.is_object(),
            JsonType::Array => value.is_array(),
            JsonType::String => value.is_string(),
            JsonType::Number => value.is_number(),
            JsonType::Integer => value.is_i64() || value.is_u64(),
            JsonType::Boolean => value.is_boolean(),
            JsonType::Null => value.is_null(),
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JsonType::Object => "object",
            JsonType::Array => "array",
            JsonType::String => "string",
            JsonType::Number => "number",
            JsonType::Integer => "integer",
            JsonType::Boolean => "boolean",
            JsonType::Null => "null",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Email,
}

/// One declarative constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Type(JsonType),
    Required(Vec<String>),
    Format(Format),
    MinLength(usize),
    Properties(Vec<(String, Schema)>),
    Items(Box<Schema>),
    MinItems(usize),
}

impl Constraint {
    fn keyword(&self) -> &'static str {
        match self {
            Constraint::Type(_) => "type",
            Constraint::Required(_) => "required",
            Constraint::Format(_) => "format",
            Constraint::MinLength(_) => "minLength",
            Constraint::Properties(_) => "properties",
            Constraint::Items(_) => "items",
            Constraint::MinItems(_) => "minItems",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    constraints: Vec<Constraint>,
}

impl Schema {
    pub fn new(constraints: Vec<Constraint>) -> Self {
        Self { constraints }
    }

    pub fn of_type(ty: JsonType) -> Self {
        Self::new(vec![Constraint::Type(ty)])
    }

    pub fn object() -> Self {
        Self::of_type(JsonType::Object)
    }

    pub fn string() -> Self {
        Self::of_type(JsonType::String)
    }

    pub fn number() -> Self {
        Self::of_type(JsonType::Number)
    }

    pub fn boolean() -> Self {
        Self::of_type(JsonType::Boolean)
    }

    pub fn array_of(items: Schema) -> Self {
        Self::new(vec![Constraint::Type(JsonType::Array), Constraint::Items(Box::new(items))])
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn with(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn required(self, names: &[&str]) -> Self {
        self.with(Constraint::Required(names.iter().map(|n| n.to_string()).collect()))
    }

    /// Declare a property; consecutive calls extend the same `Properties`.
    pub fn property(mut self, name: &str, schema: Schema) -> Self {
        if let Some(Constraint::Properties(props)) = self.constraints.last_mut() {
            props.push((name.to_string(), schema));
            return self;
        }
        self.with(Constraint::Properties(vec![(name.to_string(), schema)]))
    }

    pub fn format(self, format: Format) -> Self {
        self.with(Constraint::Format(format))
    }

    pub fn min_length(self, len: usize) -> Self {
        self.with(Constraint::MinLength(len))
    }

    pub fn min_items(self, count: usize) -> Self {
        self.with(Constraint::MinItems(count))
    }

    pub fn compile(&self) -> Result<CompiledSchema, SchemaError> {
        Ok(CompiledSchema {
            root: compile_node(self, "")?,
        })
    }
}

/// A schema whose constraints contradict each other.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("{path}: conflicting types {first} and {second}")]
    ConflictingType {
        path: String,
        first: JsonType,
        second: JsonType,
    },

    #[error("{path}: `{keyword}` cannot apply to type {ty}")]
    KeywordTypeMismatch {
        path: String,
        keyword: &'static str,
        ty: JsonType,
    },

    #[error("{path}: `{keyword}` declared more than once")]
    DuplicateKeyword { path: String, keyword: &'static str },

    #[error("{path}: property `{name}` declared more than once")]
    DuplicateProperty { path: String, name: String },
}

/// One failed constraint, addressed by JSON pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub path: String,
    pub keyword: String,
    pub message: String,
}

#[derive(Debug, Default)]
struct Node {
    ty: Option<JsonType>,
    required: Vec<String>,
    format: Option<Format>,
    min_length: Option<usize>,
    properties: Vec<(String, Node)>,
    items: Option<Box<Node>>,
    min_items: Option<usize>,
}

fn compile_node(schema: &Schema, path: &str) -> Result<Node, SchemaError> {
    let mut node = Node::default();
    for constraint in &schema.constraints {
        let duplicate = || SchemaError::DuplicateKeyword {
            path: display_path(path),
            keyword: constraint.keyword(),
        };
        match constraint {
            Constraint::Type(ty) => match node.ty {
                Some(first) if first != *ty => {
                    return Err(SchemaError::ConflictingType {
                        path: display_path(path),
                        first,
                        second: *ty,
                    })
                }
                _ => node.ty = Some(*ty),
            },
            Constraint::Required(names) => node.required.extend(names.iter().cloned()),
            Constraint::Format(format) => {
                if node.format.replace(*format).is_some() {
                    return Err(duplicate());
                }
            }
            Constraint::MinLength(len) => {
                if node.min_length.replace(*len).is_some() {
                    return Err(duplicate());
                }
            }
            Constraint::Properties(props) => {
                for (name, child) in props {
                    if node.properties.iter().any(|(existing, _)| existing == name) {
                        return Err(SchemaError::DuplicateProperty {
                            path: display_path(path),
                            name: name.clone(),
                        });
                    }
                    let child_path = format!("{path}/{}", escape_pointer(name));
                    node.properties.push((name.clone(), compile_node(child, &child_path)?));
                }
            }
            Constraint::Items(items) => {
                if node.items.is_some() {
                    return Err(duplicate());
                }
                node.items = Some(Box::new(compile_node(items, &format!("{path}/items"))?));
            }
            Constraint::MinItems(count) => {
                if node.min_items.replace(*count).is_some() {
                    return Err(duplicate());
                }
            }
        }
    }

    if let Some(ty) = node.ty {
        let misplaced = |keyword: &'static str| SchemaError::KeywordTypeMismatch {
            path: display_path(path),
            keyword,
            ty,
        };
        if ty != JsonType::String {
            if node.format.is_some() {
                return Err(misplaced("format"));
            }
            if node.min_length.is_some() {
                return Err(misplaced("minLength"));
            }
        }
        if ty != JsonType::Object {
            if !node.required.is_empty() {
                return Err(misplaced("required"));
            }
            if !node.properties.is_empty() {
                return Err(misplaced("properties"));
            }
        }
        if ty != JsonType::Array {
            if node.items.is_some() {
                return Err(misplaced("items"));
            }
            if node.min_items.is_some() {
                return Err(misplaced("minItems"));
            }
        }
    }
    Ok(node)
}

/// A consistency-checked schema, ready to validate values.
#[derive(Debug)]
pub struct CompiledSchema {
    root: Node,
}

impl CompiledSchema {
    /// Every violation of `value`, in walk order. Empty means valid.
    pub fn validate(&self, value: &Value) -> Vec<Violation> {
        let mut violations = Vec::new();
        walk(&self.root, value, "", &mut violations);
        violations
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.validate(value).is_empty()
    }

    /// Fail with every violation when `value` does not conform.
    pub fn check(&self, value: &Value, context: &str) -> Result<(), ApiError> {
        let violations = self.validate(value);
        if violations.is_empty() {
            return Ok(());
        }
        Err(ApiError::schema(context, &violations))
    }
}

fn walk(node: &Node, value: &Value, path: &str, out: &mut Vec<Violation>) {
    if let Some(ty) = node.ty {
        if !ty.accepts(value) {
            out.push(violation(path, "type", format!("expected {ty}, got {}", json_kind(value))));
            return;
        }
    }

    match value {
        Value::String(text) => {
            if let Some(min) = node.min_length {
                let len = text.chars().count();
                if len < min {
                    out.push(violation(
                        path,
                        "minLength",
                        format!("expected at least {min} characters, got {len}"),
                    ));
                }
            }
            if let Some(Format::Email) = node.format {
                if !is_valid_email(text) {
                    out.push(violation(path, "format", format!("{text:?} is not a valid email")));
                }
            }
        }
        Value::Object(map) => {
            for name in &node.required {
                if !map.contains_key(name) {
                    out.push(violation(path, "required", format!("missing required property `{name}`")));
                }
            }
            for (name, child) in &node.properties {
                if let Some(field) = map.get(name) {
                    walk(child, field, &format!("{path}/{}", escape_pointer(name)), out);
                }
            }
        }
        Value::Array(items) => {
            if let Some(min) = node.min_items {
                if items.len() < min {
                    out.push(violation(
                        path,
                        "minItems",
                        format!("expected at least {min} items, got {}", items.len()),
                    ));
                }
            }
            if let Some(item_node) = &node.items {
                for (index, item) in items.iter().enumerate() {
                    walk(item_node, item, &format!("{path}/{index}"), out);
                }
            }
        }
        _ => {}
    }
}

fn violation(path: &str, keyword: &str, message: String) -> Violation {
    Violation {
        path: display_path(path),
        keyword: keyword.to_string(),
        message,
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
