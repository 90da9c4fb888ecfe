use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::LlmError;

/// Optional leading tag selecting the Bedrock invocation path.
pub const TRANSPORT_PREFIX: &str = "bedrock:";

/// Score attached to every output; Bedrock exposes no usable confidence signal.
pub const MAX_SCORE: f64 = 1.0;

pub const DEFAULT_TEMPERATURE: f64 = 0.2;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1024;
pub const DEFAULT_TOP_P: f64 = 0.9;

// Cross-region inference profiles put a geography scope in front of the vendor.
const INFERENCE_PROFILE_SCOPES: &[&str] = &["us.", "eu.", "apac.", "us-gov.", "global."];

const VENDOR_PREFIXES: &[(&str, Vendor)] = &[
    ("anthropic.", Vendor::Anthropic),
    ("mistral.", Vendor::Mistral),
    ("cohere.", Vendor::Cohere),
    ("meta.llama", Vendor::MetaLlama),
    ("amazon.titan", Vendor::AmazonTitan),
];

/// A model identifier with the transport prefix removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelId {
    original: String,
    reference: String,
}

impl ModelId {
    pub fn parse(raw: &str) -> Result<Self, LlmError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LlmError::validation("model identifier must not be empty"));
        }

        let reference = trimmed
            .strip_prefix(TRANSPORT_PREFIX)
            .map_or(trimmed, str::trim_start);
        if reference.is_empty() {
            return Err(LlmError::validation(format!(
                "model identifier must name a model after the '{TRANSPORT_PREFIX}' prefix"
            )));
        }

        Ok(Self {
            original: trimmed.to_string(),
            reference: reference.to_string(),
        })
    }

    /// The identifier sent to Bedrock as `modelId`.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn has_transport_prefix(&self) -> bool {
        self.original.len() != self.reference.len()
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vendor {
    Anthropic,
    Mistral,
    Cohere,
    MetaLlama,
    AmazonTitan,
    Unknown,
}

impl Vendor {
    /// First matching prefix wins; anything unrecognised is `Unknown`.
    pub fn classify(model_reference: &str) -> Self {
        let unscoped = INFERENCE_PROFILE_SCOPES
            .iter()
            .find_map(|scope| model_reference.strip_prefix(scope))
            .unwrap_or(model_reference);

        VENDOR_PREFIXES
            .iter()
            .find(|(prefix, _)| unscoped.starts_with(prefix))
            .map(|(_, vendor)| *vendor)
            .unwrap_or(Self::Unknown)
    }

    pub fn family(self) -> VendorFamily {
        match self {
            Self::Anthropic => VendorFamily::MessageChat,
            Self::Mistral => VendorFamily::PromptCompletion,
            Self::Cohere | Self::MetaLlama | Self::AmazonTitan | Self::Unknown => {
                VendorFamily::GenericText
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::Mistral => "mistral",
            Self::Cohere => "cohere",
            Self::MetaLlama => "meta_llama",
            Self::AmazonTitan => "amazon_titan",
            Self::Unknown => "unknown",
        }
    }
}

/// Wire protocol spoken to a Bedrock model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorFamily {
    MessageChat,
    PromptCompletion,
    GenericText,
}

impl VendorFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MessageChat => "message_chat",
            Self::PromptCompletion => "prompt_completion",
            Self::GenericText => "generic_text",
        }
    }
}

impl fmt::Display for VendorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub top_p: f64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            top_p: DEFAULT_TOP_P,
        }
    }
}

impl GenerationParams {
    pub fn validate(&self) -> Result<(), LlmError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(LlmError::validation(format!(
                "temperature must be in 0.0..=2.0 (got {})",
                self.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(LlmError::validation(format!(
                "top_p must be in 0.0..=1.0 (got {})",
                self.top_p
            )));
        }
        if self.max_output_tokens == 0 {
            return Err(LlmError::validation(
                "max_output_tokens must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// How strictly structured output is checked after the call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaValidation {
    /// Output only has to parse as JSON.
    #[default]
    JsonOnly,
    /// Output must also satisfy the hint compiled as a JSON Schema.
    Conformance,
}

/// Advisory description of the desired output shape. Never sent to Bedrock as a
/// binding contract; it steers the prompt and checks the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaHint {
    pub schema: Value,
    #[serde(default)]
    pub validation: SchemaValidation,
}

impl SchemaHint {
    pub fn new(schema: Value) -> Self {
        Self {
            schema,
            validation: SchemaValidation::JsonOnly,
        }
    }

    pub fn with_validation(mut self, validation: SchemaValidation) -> Self {
        self.validation = validation;
        self
    }

    /// `null` and `{}` describe nothing and count as no hint at all.
    pub fn is_empty(&self) -> bool {
        match &self.schema {
            Value::Null => true,
            Value::Object(object) => object.is_empty(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredOutput {
    pub score: f64,
    pub output: String,
}

impl ScoredOutput {
    pub fn certain(output: impl Into<String>) -> Self {
        Self {
            score: MAX_SCORE,
            output: output.into(),
        }
    }
}

pub const RAW_FIELD: &str = "_raw";
pub const ERROR_FIELD: &str = "_error";
pub const INVALID_JSON_ERROR: &str = "Invalid JSON for requested schema";

/// Outcome of checking model text against a requested structure.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatedOutput {
    Structured { text: String, value: Value },
    RawWithError { raw: String, error: String },
}

impl ValidatedOutput {
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured { .. })
    }

    /// Structured text is returned untouched; failures become a `{_raw, _error}` object.
    pub fn into_text(self) -> String {
        match self {
            Self::Structured { text, .. } => text,
            Self::RawWithError { raw, error } => {
                let mut wrapper = serde_json::Map::new();
                wrapper.insert(RAW_FIELD.to_string(), Value::String(raw));
                wrapper.insert(ERROR_FIELD.to_string(), Value::String(error));
                Value::Object(wrapper).to_string()
            }
        }
    }
}

/// True for objects produced by [`ValidatedOutput::into_text`] on failure.
pub fn is_error_wrapper(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    object.len() == 2
        && object.get(RAW_FIELD).is_some_and(Value::is_string)
        && object.get(ERROR_FIELD).is_some_and(Value::is_string)
}
