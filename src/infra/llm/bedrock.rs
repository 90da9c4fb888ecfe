use std::borrow::Cow;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::{
    GenerationParams, LlmError, ModelId, SchemaHint, ScoredOutput, ValidatedOutput, Vendor,
    VendorFamily,
};

use super::bedrock_config::{BedrockConfig, DEFAULT_REGION, TransportConfig};
use super::http_invoker::{HttpBedrockInvoker, default_endpoint_url};
use super::invoker::JSON_CONTENT_TYPE;
use super::response_parsing::extract_text;
use super::schema_validator::OutputValidator;
use super::sdk_invoker::SdkBedrockInvoker;
use super::vendor_dispatch::{WireCodec, codec_for};
use super::{LanguageModel, ModelInvoker, PromptBuilder, ProviderRegistry};

pub const PROVIDER_ID: &str = "bedrock";
pub const MODEL_PATTERNS: &[&str] = &[
    r"^bedrock:",
    r"^((us|eu|apac|us-gov|global)\.)?(anthropic|mistral|cohere|meta\.llama|amazon\.titan)",
];
pub const REGISTRATION_PRIORITY: i32 = 10;

/// Language model backed by Bedrock `InvokeModel`, for any hosted vendor.
///
/// The vendor family is fixed at construction from the model identifier and
/// selects the request envelope and response unwrapping for every call.
pub struct BedrockLanguageModel {
    model_id: ModelId,
    vendor: Vendor,
    params: GenerationParams,
    schema_hint: Option<SchemaHint>,
    output_validator: Option<OutputValidator>,
    invoker: Arc<dyn ModelInvoker>,
}

impl BedrockLanguageModel {
    pub fn new(config: BedrockConfig) -> Result<Self, LlmError> {
        config.validate()?;
        let invoker = connect_invoker(&config)?;
        Self::with_invoker(config, invoker)
    }

    pub fn from_env(model_id: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(BedrockConfig::from_env(model_id)?)
    }

    pub fn with_invoker(
        config: BedrockConfig,
        invoker: Arc<dyn ModelInvoker>,
    ) -> Result<Self, LlmError> {
        let model_id = config.validate()?;
        let vendor = Vendor::classify(model_id.reference());
        let schema_hint = config.active_schema_hint().cloned();
        let output_validator = schema_hint.as_ref().map(OutputValidator::new).transpose()?;

        if vendor == Vendor::Unknown {
            warn!(
                model = model_id.reference(),
                "unrecognised Bedrock vendor, using generic text request and response handling"
            );
        }
        info!(
            model = model_id.reference(),
            vendor = vendor.as_str(),
            family = %vendor.family(),
            transport = invoker.transport_name(),
            structured_output = schema_hint.is_some(),
            "Bedrock language model ready"
        );

        Ok(Self {
            model_id,
            vendor,
            params: config.params,
            schema_hint,
            output_validator,
            invoker,
        })
    }

    pub fn model_reference(&self) -> &str {
        self.model_id.reference()
    }

    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    pub fn vendor_family(&self) -> VendorFamily {
        self.vendor.family()
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    fn codec(&self) -> &'static WireCodec {
        codec_for(self.vendor_family())
    }

    pub(crate) fn prepare_prompt<'a>(&self, prompt: &'a str) -> Cow<'a, str> {
        PromptBuilder::build(prompt, self.schema_hint.as_ref())
    }

    pub(crate) fn build_request_body(&self, prompt: &str) -> Result<Vec<u8>, LlmError> {
        (self.codec().build_request)(&self.prepare_prompt(prompt), &self.params)
    }

    /// A body that is not JSON is an error; a JSON envelope with no known text
    /// field yields empty text.
    pub(crate) fn extract_response_text(&self, response_body: &[u8]) -> Result<String, LlmError> {
        let payload: Value = serde_json::from_slice(response_body).map_err(|err| {
            LlmError::invalid_response(format!(
                "response body for '{}' is not JSON: {err}",
                self.model_reference()
            ))
        })?;

        match extract_text(&payload, self.codec().response_shapes) {
            Some((shape, text)) => {
                debug!(model = self.model_reference(), ?shape, "extracted Bedrock response text");
                Ok(text)
            }
            None => {
                warn!(
                    model = self.model_reference(),
                    "Bedrock response envelope not recognised, returning empty text"
                );
                Ok(String::new())
            }
        }
    }

    fn finalize_output(&self, text: String) -> String {
        let Some(validator) = &self.output_validator else {
            return text;
        };

        let validated = validator.validate(text);
        if let ValidatedOutput::RawWithError { error, .. } = &validated {
            warn!(
                model = self.model_reference(),
                error = error.as_str(),
                "model output failed structured validation, wrapping raw text"
            );
        }
        validated.into_text()
    }
}

impl LanguageModel for BedrockLanguageModel {
    fn model_id(&self) -> &str {
        self.model_id.original()
    }

    fn infer_prompt(&self, prompt: &str) -> Result<Vec<ScoredOutput>, LlmError> {
        let body = self.build_request_body(prompt)?;
        let response_body = self.invoker.invoke(
            self.model_reference(),
            JSON_CONTENT_TYPE,
            JSON_CONTENT_TYPE,
            body,
        )?;
        let text = self.extract_response_text(&response_body)?;

        Ok(vec![ScoredOutput::certain(self.finalize_output(text))])
    }
}

/// Registers Bedrock for its identifier patterns. Each resolved model is built
/// from `template` with the requested identifier swapped in.
pub fn register_bedrock(
    registry: &mut ProviderRegistry,
    template: BedrockConfig,
) -> Result<(), LlmError> {
    registry.register(
        PROVIDER_ID,
        MODEL_PATTERNS,
        REGISTRATION_PRIORITY,
        move |model_id| {
            let model = BedrockLanguageModel::new(template.clone().with_model_id(model_id))?;
            Ok(Arc::new(model) as Arc<dyn LanguageModel>)
        },
    )
}

/// Same as [`register_bedrock`], but every model shares `invoker`.
pub fn register_bedrock_with_invoker(
    registry: &mut ProviderRegistry,
    template: BedrockConfig,
    invoker: Arc<dyn ModelInvoker>,
) -> Result<(), LlmError> {
    registry.register(
        PROVIDER_ID,
        MODEL_PATTERNS,
        REGISTRATION_PRIORITY,
        move |model_id| {
            let model = BedrockLanguageModel::with_invoker(
                template.clone().with_model_id(model_id),
                Arc::clone(&invoker),
            )?;
            Ok(Arc::new(model) as Arc<dyn LanguageModel>)
        },
    )
}

fn connect_invoker(config: &BedrockConfig) -> Result<Arc<dyn ModelInvoker>, LlmError> {
    match &config.transport {
        TransportConfig::AwsSdk => Ok(Arc::new(SdkBedrockInvoker::connect(
            config.region.as_deref(),
            config.profile.as_deref(),
            config.endpoint_url.as_deref(),
        )?)),
        TransportConfig::BearerToken { token, timeout } => {
            let endpoint_url = match &config.endpoint_url {
                Some(endpoint_url) => endpoint_url.clone(),
                None => default_endpoint_url(config.region.as_deref().unwrap_or(DEFAULT_REGION)),
            };
            Ok(Arc::new(HttpBedrockInvoker::with_config(
                token.as_str(),
                endpoint_url,
                *timeout,
            )?))
        }
    }
}
