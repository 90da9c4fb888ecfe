use jsonschema::JSONSchema;
use serde_json::Value;

use crate::domain::{
    INVALID_JSON_ERROR, LlmError, SchemaHint, SchemaValidation, ValidatedOutput, is_error_wrapper,
};

/// Post-call check for structured output. Failures are returned as data, never
/// as errors.
pub struct OutputValidator {
    compiled_schema: Option<JSONSchema>,
}

impl OutputValidator {
    pub fn new(hint: &SchemaHint) -> Result<Self, LlmError> {
        let compiled_schema = match hint.validation {
            SchemaValidation::JsonOnly => None,
            SchemaValidation::Conformance => {
                Some(JSONSchema::compile(&hint.schema).map_err(|err| {
                    LlmError::validation(format!("schema hint is not a valid JSON Schema: {err}"))
                })?)
            }
        };
        Ok(Self { compiled_schema })
    }

    pub fn validate(&self, text: String) -> ValidatedOutput {
        let value: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(_) => {
                return ValidatedOutput::RawWithError {
                    raw: text,
                    error: INVALID_JSON_ERROR.to_string(),
                };
            }
        };

        // Already-wrapped output passes through so wrapping happens once.
        if is_error_wrapper(&value) {
            return ValidatedOutput::Structured { text, value };
        }

        if let Some(schema) = &self.compiled_schema
            && let Err(errors) = schema.validate(&value)
        {
            let details = errors
                .map(|err| err.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return ValidatedOutput::RawWithError {
                raw: text,
                error: format!("Output does not match requested schema: {details}"),
            };
        }

        ValidatedOutput::Structured { text, value }
    }
}
