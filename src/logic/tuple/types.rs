//! Attribute types and values
//!
//! Type names follow SPL spelling: `int32`, `float64`, `list<int32>`, ...

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::logic::error::TupleError;

/// Attribute type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MetaType {
    Int32,
    Int64,
    Float64,
    Boolean,
    Rstring,
    List(Box<MetaType>),
}

impl MetaType {
    pub fn list_of(element: MetaType) -> Self {
        MetaType::List(Box::new(element))
    }

    pub fn is_list_of(&self, element: &MetaType) -> bool {
        matches!(self, MetaType::List(inner) if inner.as_ref() == element)
    }
}

impl fmt::Display for MetaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaType::Int32 => f.write_str("int32"),
            MetaType::Int64 => f.write_str("int64"),
            MetaType::Float64 => f.write_str("float64"),
            MetaType::Boolean => f.write_str("boolean"),
            MetaType::Rstring => f.write_str("rstring"),
            MetaType::List(inner) => write!(f, "list<{}>", inner),
        }
    }
}

impl FromStr for MetaType {
    type Err = TupleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(inner) = s.strip_prefix("list<").and_then(|rest| rest.strip_suffix('>')) {
            return Ok(MetaType::list_of(inner.parse()?));
        }

        match s {
            "int32" => Ok(MetaType::Int32),
            "int64" => Ok(MetaType::Int64),
            "float64" => Ok(MetaType::Float64),
            "boolean" => Ok(MetaType::Boolean),
            "rstring" => Ok(MetaType::Rstring),
            other => Err(TupleError::UnknownType(other.to_string())),
        }
    }
}

impl TryFrom<String> for MetaType {
    type Error = TupleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MetaType> for String {
    fn from(value: MetaType) -> Self {
        value.to_string()
    }
}

/// Attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Boolean(bool),
    Rstring(String),
    List(Vec<Value>),
}

impl Value {
    pub fn conforms_to(&self, meta_type: &MetaType) -> bool {
        match (self, meta_type) {
            (Value::Int32(_), MetaType::Int32)
            | (Value::Int64(_), MetaType::Int64)
            | (Value::Float64(_), MetaType::Float64)
            | (Value::Boolean(_), MetaType::Boolean)
            | (Value::Rstring(_), MetaType::Rstring) => true,
            (Value::List(items), MetaType::List(inner)) => {
                items.iter().all(|item| item.conforms_to(inner))
            }
            _ => false,
        }
    }

    /// Short description used in mismatch errors
    pub fn describe(&self) -> String {
        match self {
            Value::Int32(v) => format!("int32 {}", v),
            Value::Int64(v) => format!("int64 {}", v),
            Value::Float64(v) => format!("float64 {}", v),
            Value::Boolean(v) => format!("boolean {}", v),
            Value::Rstring(_) => "rstring".to_string(),
            Value::List(items) => format!("list of {} items", items.len()),
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Decode a JSON value as `meta_type`
    pub fn from_json(
        attribute: &str,
        meta_type: &MetaType,
        json: &serde_json::Value,
    ) -> Result<Value, TupleError> {
        let mismatch = || TupleError::TypeMismatch {
            attribute: attribute.to_string(),
            expected: meta_type.clone(),
            found: json_kind(json),
        };

        match meta_type {
            MetaType::Int32 => json
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(Value::Int32)
                .ok_or_else(mismatch),
            MetaType::Int64 => json.as_i64().map(Value::Int64).ok_or_else(mismatch),
            MetaType::Float64 => json.as_f64().map(Value::Float64).ok_or_else(mismatch),
            MetaType::Boolean => json.as_bool().map(Value::Boolean).ok_or_else(mismatch),
            MetaType::Rstring => json
                .as_str()
                .map(|s| Value::Rstring(s.to_string()))
                .ok_or_else(mismatch),
            MetaType::List(inner) => {
                let items = json.as_array().ok_or_else(mismatch)?;
                items
                    .iter()
                    .map(|item| Value::from_json(attribute, inner, item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List)
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Int32(v) => serde_json::Value::from(*v),
            Value::Int64(v) => serde_json::Value::from(*v),
            // NaN and infinities have no JSON form and become null; operators drop them first
            Value::Float64(v) => serde_json::Value::from(*v),
            Value::Boolean(v) => serde_json::Value::from(*v),
            Value::Rstring(v) => serde_json::Value::from(v.as_str()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
        }
    }
}

impl From<Vec<i32>> for Value {
    fn from(items: Vec<i32>) -> Self {
        Value::List(items.into_iter().map(Value::Int32).collect())
    }
}

impl From<Vec<f64>> for Value {
    fn from(items: Vec<f64>) -> Self {
        Value::List(items.into_iter().map(Value::Float64).collect())
    }
}

fn json_kind(json: &serde_json::Value) -> String {
    match json {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Bool(_) => "boolean".to_string(),
        serde_json::Value::Number(n) => format!("number {}", n),
        serde_json::Value::String(_) => "string".to_string(),
        serde_json::Value::Array(items) => format!("array of {} items", items.len()),
        serde_json::Value::Object(_) => "object".to_string(),
    }
}
