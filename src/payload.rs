use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

use crate::catalog::{FieldSpec, FieldType, ResourceKind, ResourceSchema};

/// Fields that must always be sent as arrays, whatever the caller handed us.
pub const KNOWN_ARRAY_FIELDS: [&str; 3] = ["collections", "assignees", "tags"];

/// Fields assembled into their own sub-object rather than coerced directly.
pub const NESTED_FIELDS: [&str; 2] = ["integration_params", "remote_fields"];

/// A raw form value, before coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Flag(bool),
    Nested(BTreeMap<String, String>),
    /// Explicitly cleared.
    Null,
}

impl FieldValue {
    /// Converts a value read from a YAML/JSON body file.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Flag(b),
            Value::String(s) => FieldValue::Text(s),
            Value::Number(n) => FieldValue::Text(n.to_string()),
            Value::Array(items) => FieldValue::List(items.into_iter().map(json_to_text).collect()),
            Value::Object(map) => {
                FieldValue::Nested(map.into_iter().map(|(k, v)| (k, json_to_text(v))).collect())
            }
        }
    }
}

fn json_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub type FieldValues = BTreeMap<String, FieldValue>;

/// How a write body is framed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// `{"model": {...}}`
    Model,
    Bare,
}

impl Envelope {
    pub fn for_kind(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::TicketLike => Envelope::Model,
            ResourceKind::Other => Envelope::Bare,
        }
    }

    pub fn apply(self, fields: Map<String, Value>) -> Value {
        match self {
            Envelope::Model => json!({ "model": fields }),
            Envelope::Bare => Value::Object(fields),
        }
    }
}

/// Builds the request body for a write against `resource`, framed by the
/// resource's envelope policy. Resources without a POST schema yield `{}`.
pub fn build_payload(resource: &ResourceSchema, values: &FieldValues) -> Value {
    let fields = resource.post_fields.as_deref().unwrap_or(&[]);
    Envelope::for_kind(resource.kind).apply(build_fields(fields, values))
}

/// Coerces and filters `values` against the declared `fields`.
///
/// Empty strings, nulls and empty arrays are dropped; array fields are split
/// on commas; the nested `integration_params`/`remote_fields` objects are
/// only emitted when one of their sub-fields is filled in.
pub fn build_fields(fields: &[FieldSpec], values: &FieldValues) -> Map<String, Value> {
    for name in values.keys() {
        if !fields.iter().any(|f| &f.name == name) {
            debug!(field = %name, "ignoring undeclared field");
        }
    }

    let mut out = Map::new();
    for field in fields {
        if NESTED_FIELDS.contains(&field.name.as_str()) {
            continue;
        }
        let Some(value) = values.get(&field.name) else {
            continue;
        };
        let coerced = coerce(&field.field_type, value);
        if is_blank(&coerced) {
            debug!(field = %field.name, "dropping empty field");
            continue;
        }
        out.insert(field.name.clone(), coerced);
    }

    for name in KNOWN_ARRAY_FIELDS {
        if let Some(value) = out.get_mut(name) {
            if !value.is_array() {
                *value = Value::Array(vec![value.take()]);
            }
        }
    }

    for name in NESTED_FIELDS {
        let Some(sub_fields) = fields
            .iter()
            .find(|f| f.name == name)
            .and_then(FieldSpec::sub_fields)
        else {
            continue;
        };
        if let Some(nested) = build_nested(sub_fields, values.get(name)) {
            out.insert(name.to_string(), nested);
        }
    }

    out
}

/// Splits delimited text into trimmed, non-empty tokens.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn coerce(field_type: &FieldType, value: &FieldValue) -> Value {
    match (field_type, value) {
        (_, FieldValue::Null) => Value::Null,
        (ft, FieldValue::Text(text)) if ft.is_array() => strings(split_list(text)),
        (ft, FieldValue::List(items)) if ft.is_array() => {
            strings(items.iter().flat_map(|item| split_list(item)).collect())
        }
        (_, FieldValue::Text(text)) => Value::String(text.clone()),
        (_, FieldValue::List(items)) => strings(items.clone()),
        (_, FieldValue::Flag(flag)) => Value::Bool(*flag),
        (_, FieldValue::Nested(map)) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        ),
    }
}

fn build_nested(sub_fields: &[FieldSpec], value: Option<&FieldValue>) -> Option<Value> {
    let Some(FieldValue::Nested(entered)) = value else {
        return None;
    };
    let mut nested = Map::new();
    for sub in sub_fields {
        let text = entered.get(&sub.name).cloned().unwrap_or_default();
        nested.insert(sub.name.clone(), Value::String(text));
    }
    let any_filled = nested.values().any(|v| v.as_str().is_some_and(|s| !s.is_empty()));
    any_filled.then_some(Value::Object(nested))
}

fn strings(items: Vec<String>) -> Value {
    Value::Array(items.into_iter().map(Value::String).collect())
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
