//! Record - one tuple bound to its schema

use std::sync::Arc;

use super::schema::StreamSchema;
use super::types::{MetaType, Value};
use crate::logic::error::TupleError;

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Arc<StreamSchema>,
    values: Vec<Value>,
}

impl Record {
    pub fn new(schema: Arc<StreamSchema>, values: Vec<Value>) -> Result<Self, TupleError> {
        if values.len() != schema.len() {
            return Err(TupleError::Arity {
                expected: schema.len(),
                actual: values.len(),
            });
        }

        for (attr, value) in schema.attributes().iter().zip(&values) {
            if !value.conforms_to(&attr.meta_type) {
                return Err(TupleError::TypeMismatch {
                    attribute: attr.name.clone(),
                    expected: attr.meta_type.clone(),
                    found: value.describe(),
                });
            }
        }

        Ok(Self { schema, values })
    }

    pub fn schema(&self) -> &Arc<StreamSchema> {
        &self.schema
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema.index_of(name).map(|i| &self.values[i])
    }

    fn require(&self, name: &str) -> Result<&Value, TupleError> {
        self.get(name)
            .ok_or_else(|| TupleError::MissingAttribute(name.to_string()))
    }

    pub fn get_int32(&self, name: &str) -> Result<i32, TupleError> {
        let value = self.require(name)?;
        value.as_i32().ok_or_else(|| TupleError::TypeMismatch {
            attribute: name.to_string(),
            expected: MetaType::Int32,
            found: value.describe(),
        })
    }

    /// `list<float64>` attribute, values in tuple order
    pub fn get_float64_list(&self, name: &str) -> Result<Vec<f64>, TupleError> {
        let value = self.require(name)?;
        let mismatch = || TupleError::TypeMismatch {
            attribute: name.to_string(),
            expected: MetaType::list_of(MetaType::Float64),
            found: value.describe(),
        };

        match value {
            Value::List(items) => items
                .iter()
                .map(|item| item.as_f64().ok_or_else(mismatch))
                .collect(),
            _ => Err(mismatch()),
        }
    }

    /// Decode a JSON object against `schema`. Unknown keys are ignored.
    pub fn from_json(schema: Arc<StreamSchema>, json: &serde_json::Value) -> Result<Self, TupleError> {
        let object = json
            .as_object()
            .ok_or_else(|| TupleError::NotAnObject(json.to_string()))?;

        let values = schema
            .attributes()
            .iter()
            .map(|attr| {
                let field = object
                    .get(&attr.name)
                    .ok_or_else(|| TupleError::MissingAttribute(attr.name.clone()))?;
                Value::from_json(&attr.name, &attr.meta_type, field)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { schema, values })
    }

    pub fn from_json_str(schema: Arc<StreamSchema>, line: &str) -> Result<Self, TupleError> {
        let json: serde_json::Value = serde_json::from_str(line)?;
        Self::from_json(schema, &json)
    }

    /// JSON object with keys in schema order
    pub fn to_json(&self) -> serde_json::Value {
        let object = self
            .schema
            .attributes()
            .iter()
            .zip(&self.values)
            .map(|(attr, value)| (attr.name.clone(), value.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(object)
    }
}

/// Output tuple under construction
#[derive(Debug)]
pub struct OutputTuple {
    schema: Arc<StreamSchema>,
    values: Vec<Option<Value>>,
}

impl OutputTuple {
    pub fn new(schema: Arc<StreamSchema>) -> Self {
        let values = vec![None; schema.len()];
        Self { schema, values }
    }

    /// Copy every input attribute that the output schema declares with the same type
    pub fn assign(&mut self, input: &Record) {
        for (attr, value) in input.schema().attributes().iter().zip(input.values()) {
            if let Some(index) = self.schema.index_of(&attr.name) {
                if self.schema.attributes()[index].meta_type == attr.meta_type {
                    self.values[index] = Some(value.clone());
                }
            }
        }
    }

    pub fn set(&mut self, name: &str, value: Value) -> Result<(), TupleError> {
        let index = self
            .schema
            .index_of(name)
            .ok_or_else(|| TupleError::MissingAttribute(name.to_string()))?;

        let expected = &self.schema.attributes()[index].meta_type;
        if !value.conforms_to(expected) {
            return Err(TupleError::TypeMismatch {
                attribute: name.to_string(),
                expected: expected.clone(),
                found: value.describe(),
            });
        }

        self.values[index] = Some(value);
        Ok(())
    }

    /// Complete the tuple; every attribute must have been assigned or set
    pub fn finish(self) -> Result<Record, TupleError> {
        let values = self
            .schema
            .attributes()
            .iter()
            .zip(self.values)
            .map(|(attr, value)| value.ok_or_else(|| TupleError::Unassigned(attr.name.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Record {
            schema: self.schema,
            values,
        })
    }
}
