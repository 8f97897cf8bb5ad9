//! Stream Schema - ordered, named, typed attributes
//!
//! Text form: `tuple<int32 user, int32 item, float64 analysisResult>`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::types::MetaType;
use crate::logic::error::TupleError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub meta_type: MetaType,
}

impl Attribute {
    pub fn new(name: impl Into<String>, meta_type: MetaType) -> Self {
        Self {
            name: name.into(),
            meta_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StreamSchema {
    attributes: Vec<Attribute>,
}

impl StreamSchema {
    pub fn new(attributes: Vec<Attribute>) -> Result<Self, TupleError> {
        for (i, attr) in attributes.iter().enumerate() {
            if attributes[..i].iter().any(|other| other.name == attr.name) {
                return Err(TupleError::DuplicateAttribute(attr.name.clone()));
            }
        }
        Ok(Self { attributes })
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl fmt::Display for StreamSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("tuple<")?;
        for (i, attr) in self.attributes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", attr.meta_type, attr.name)?;
        }
        f.write_str(">")
    }
}

impl FromStr for StreamSchema {
    type Err = TupleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || TupleError::MalformedSchema(s.to_string());
        let body = s
            .trim()
            .strip_prefix("tuple<")
            .and_then(|rest| rest.strip_suffix('>'))
            .ok_or_else(malformed)?;

        if body.trim().is_empty() {
            return Self::new(Vec::new());
        }

        let attributes = body
            .split(',')
            .map(|decl| {
                let decl = decl.trim();
                let (ty, name) = decl.rsplit_once(char::is_whitespace).ok_or_else(malformed)?;
                Ok(Attribute::new(name.trim(), ty.trim().parse()?))
            })
            .collect::<Result<Vec<_>, TupleError>>()?;

        Self::new(attributes)
    }
}

impl TryFrom<String> for StreamSchema {
    type Error = TupleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StreamSchema> for String {
    fn from(value: StreamSchema) -> Self {
        value.to_string()
    }
}
