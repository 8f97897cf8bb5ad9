//! Operator Context & setup checks
//!
//! Schemas are validated once, when the operator is built. The checker walks
//! Unchecked -> Valid, and any rejected check moves it to Invalid for good.

use std::sync::Arc;

use crate::constants::ANALYSIS_RESULT_ATTRIBUTE;
use crate::logic::error::SchemaMismatchError;
use crate::logic::tuple::{MetaType, StreamSchema};

/// Ports an operator instance is wired to
#[derive(Debug, Clone)]
pub struct OperatorContext {
    pub name: String,
    pub input_schema: Arc<StreamSchema>,
    pub output_schema: Arc<StreamSchema>,
}

impl OperatorContext {
    pub fn new(name: impl Into<String>, input_schema: StreamSchema, output_schema: StreamSchema) -> Self {
        Self {
            name: name.into(),
            input_schema: Arc::new(input_schema),
            output_schema: Arc::new(output_schema),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Unchecked,
    Valid,
    Invalid,
}

pub struct ContextChecker<'a> {
    context: &'a OperatorContext,
    state: CheckState,
    errors: Vec<SchemaMismatchError>,
}

impl<'a> ContextChecker<'a> {
    pub fn new(context: &'a OperatorContext) -> Self {
        Self {
            context,
            state: CheckState::Unchecked,
            errors: Vec::new(),
        }
    }

    pub fn state(&self) -> CheckState {
        self.state
    }

    fn accept(&mut self) {
        if self.state == CheckState::Unchecked {
            self.state = CheckState::Valid;
        }
    }

    fn reject(&mut self, error: SchemaMismatchError) {
        log::error!("{}: {}", self.context.name, error);
        self.state = CheckState::Invalid;
        self.errors.push(error);
    }

    /// `analysisResult` must exist on the output schema with type `expected`
    pub fn check_result_attribute(&mut self, analysis: &str, expected: &MetaType) -> &mut Self {
        let context = self.context;
        match context.output_schema.attribute(ANALYSIS_RESULT_ATTRIBUTE) {
            None => self.reject(SchemaMismatchError::MissingResultAttribute(
                ANALYSIS_RESULT_ATTRIBUTE.to_string(),
            )),
            Some(attr) if &attr.meta_type != expected => {
                let error = SchemaMismatchError::WrongResultType {
                    attribute: ANALYSIS_RESULT_ATTRIBUTE.to_string(),
                    analysis: analysis.to_string(),
                    expected: expected.clone(),
                    actual: attr.meta_type.clone(),
                };
                self.reject(error)
            }
            Some(_) => self.accept(),
        }
        self
    }

    /// Attribute named by `parameter` must be on the input schema with type `expected`
    pub fn check_input_attribute(
        &mut self,
        parameter: &'static str,
        attribute: &str,
        expected: &MetaType,
    ) -> &mut Self {
        let context = self.context;
        match context.input_schema.attribute(attribute) {
            None => self.reject(SchemaMismatchError::MissingInputAttribute {
                parameter,
                attribute: attribute.to_string(),
            }),
            Some(attr) if &attr.meta_type != expected => {
                let error = SchemaMismatchError::WrongInputType {
                    parameter,
                    attribute: attribute.to_string(),
                    expected: expected.clone(),
                    actual: attr.meta_type.clone(),
                };
                self.reject(error)
            }
            Some(_) => self.accept(),
        }
        self
    }

    /// Output must carry every input attribute unchanged and in order, plus `analysisResult`
    pub fn check_pass_through(&mut self) -> &mut Self {
        let context = self.context;
        let (input, output) = (&context.input_schema, &context.output_schema);

        // input attributes keep their relative order on the output
        let mut previous: Option<(&str, usize)> = None;
        for attr in input.attributes() {
            if attr.name == ANALYSIS_RESULT_ATTRIBUTE {
                continue;
            }
            if let Some(index) = output.index_of(&attr.name) {
                if let Some((after, last)) = previous {
                    if index < last {
                        self.reject(SchemaMismatchError::ReorderedInputAttribute {
                            attribute: attr.name.clone(),
                            after: after.to_string(),
                        });
                    }
                }
                previous = Some((attr.name.as_str(), index));
            }
            match output.attribute(&attr.name) {
                None => self.reject(SchemaMismatchError::DroppedInputAttribute(attr.name.clone())),
                Some(out) if out.meta_type != attr.meta_type => {
                    self.reject(SchemaMismatchError::RetypedInputAttribute {
                        attribute: attr.name.clone(),
                        input: attr.meta_type.clone(),
                        output: out.meta_type.clone(),
                    })
                }
                Some(_) => {}
            }
        }

        for attr in output.attributes() {
            if attr.name != ANALYSIS_RESULT_ATTRIBUTE && input.attribute(&attr.name).is_none() {
                self.reject(SchemaMismatchError::UnsourcedOutputAttribute(attr.name.clone()));
            }
        }

        self.accept();
        self
    }

    /// First rejection, if any
    pub fn finish(self) -> Result<(), SchemaMismatchError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
