use std::time::Duration;

use crate::domain::{GenerationParams, LlmError, ModelId, SchemaHint};

use super::env::{read_env_var, read_non_empty_with, read_timeout_with};

pub const DEFAULT_REGION: &str = "us-west-2";

const ENV_REGION: &str = "AWS_REGION";
const ENV_REGION_FALLBACK: &str = "AWS_DEFAULT_REGION";
const ENV_PROFILE: &str = "AWS_PROFILE";
const ENV_BEARER_TOKEN: &str = "AWS_BEARER_TOKEN_BEDROCK";
const ENV_ENDPOINT_URL: &str = "BEDROCK_ENDPOINT_URL";
const ENV_TIMEOUT_SECS: &str = "BEDROCK_TIMEOUT_SECS";

/// How `InvokeModel` reaches Bedrock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TransportConfig {
    /// AWS SDK with the default credential chain (optionally a named profile).
    #[default]
    AwsSdk,
    /// Plain HTTPS with a Bedrock API key.
    BearerToken {
        token: String,
        timeout: Option<Duration>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BedrockConfig {
    pub model_id: String,
    pub region: Option<String>,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
    pub params: GenerationParams,
    pub schema_hint: Option<SchemaHint>,
    pub structured_output: bool,
    pub transport: TransportConfig,
}

impl BedrockConfig {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            region: None,
            profile: None,
            endpoint_url: None,
            params: GenerationParams::default(),
            schema_hint: None,
            structured_output: false,
            transport: TransportConfig::AwsSdk,
        }
    }

    /// Region falls back to `us-west-2`; a bearer token switches to the HTTP transport.
    pub fn from_env(model_id: impl Into<String>) -> Result<Self, LlmError> {
        Self::from_lookup(model_id, read_env_var)
    }

    pub(crate) fn from_lookup<F>(model_id: impl Into<String>, lookup: F) -> Result<Self, LlmError>
    where
        F: Fn(&str) -> Result<Option<String>, LlmError>,
    {
        let region = match read_non_empty_with(&lookup, ENV_REGION)? {
            Some(region) => region,
            None => read_non_empty_with(&lookup, ENV_REGION_FALLBACK)?
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
        };
        let profile = read_non_empty_with(&lookup, ENV_PROFILE)?;
        let endpoint_url = read_non_empty_with(&lookup, ENV_ENDPOINT_URL)?;
        let transport = match read_non_empty_with(&lookup, ENV_BEARER_TOKEN)? {
            Some(token) => TransportConfig::BearerToken {
                token,
                timeout: read_timeout_with(&lookup, ENV_TIMEOUT_SECS)?,
            },
            None => TransportConfig::AwsSdk,
        };

        Ok(Self {
            region: Some(region),
            profile,
            endpoint_url,
            transport,
            ..Self::new(model_id)
        })
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_schema_hint(mut self, schema_hint: SchemaHint) -> Self {
        self.schema_hint = Some(schema_hint);
        self
    }

    pub fn with_structured_output(mut self, structured_output: bool) -> Self {
        self.structured_output = structured_output;
        self
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    pub fn validate(&self) -> Result<ModelId, LlmError> {
        let model_id = ModelId::parse(&self.model_id)?;
        self.params.validate()?;

        if let Some(region) = &self.region
            && region.trim().is_empty()
        {
            return Err(LlmError::validation("AWS region must not be empty"));
        }
        if let Some(profile) = &self.profile
            && profile.trim().is_empty()
        {
            return Err(LlmError::validation("AWS profile must not be empty"));
        }
        if let TransportConfig::BearerToken { token, .. } = &self.transport
            && token.trim().is_empty()
        {
            return Err(LlmError::validation(
                "Bedrock bearer token must not be empty",
            ));
        }

        Ok(model_id)
    }

    /// Schema hint that actually steers prompts and validation. Empty hints are ignored.
    pub fn active_schema_hint(&self) -> Option<&SchemaHint> {
        self.schema_hint
            .as_ref()
            .filter(|hint| self.structured_output && !hint.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use serde_json::json;

    use super::{BedrockConfig, TransportConfig};
    use crate::domain::{GenerationParams, LlmError, SchemaHint};

    fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Result<Option<String>, LlmError> {
        let vars = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |name: &str| Ok(vars.get(name).cloned())
    }

    const MODEL: &str = "bedrock:anthropic.claude-3-haiku-20240307-v1:0";

    #[test]
    fn from_lookup_defaults_to_sdk_transport_in_us_west_2() {
        let config = BedrockConfig::from_lookup(MODEL, env_of(&[])).expect("empty env should load");

        assert_eq!(config.model_id, MODEL);
        assert_eq!(config.region.as_deref(), Some("us-west-2"));
        assert_eq!(config.profile, None);
        assert_eq!(config.endpoint_url, None);
        assert_eq!(config.transport, TransportConfig::AwsSdk);
    }

    #[test]
    fn from_lookup_prefers_aws_region_over_default_region() {
        let fallback = BedrockConfig::from_lookup(
            MODEL,
            env_of(&[("AWS_REGION", "  "), ("AWS_DEFAULT_REGION", "eu-central-1")]),
        )
        .expect("fallback region should load");
        assert_eq!(fallback.region.as_deref(), Some("eu-central-1"));

        let primary = BedrockConfig::from_lookup(
            MODEL,
            env_of(&[("AWS_REGION", "us-east-1"), ("AWS_DEFAULT_REGION", "eu-central-1")]),
        )
        .expect("primary region should load");
        assert_eq!(primary.region.as_deref(), Some("us-east-1"));
    }

    #[test]
    fn from_lookup_selects_bearer_token_transport() {
        let config = BedrockConfig::from_lookup(
            MODEL,
            env_of(&[
                ("AWS_BEARER_TOKEN_BEDROCK", "bedrock-api-key"),
                ("BEDROCK_TIMEOUT_SECS", "30"),
                ("BEDROCK_ENDPOINT_URL", "http://127.0.0.1:4566"),
                ("AWS_PROFILE", "research"),
            ]),
        )
        .expect("bearer token env should load");

        assert_eq!(
            config.transport,
            TransportConfig::BearerToken {
                token: "bedrock-api-key".to_string(),
                timeout: Some(Duration::from_secs(30)),
            }
        );
        assert_eq!(config.endpoint_url.as_deref(), Some("http://127.0.0.1:4566"));
        assert_eq!(config.profile.as_deref(), Some("research"));
    }

    #[test]
    fn from_lookup_rejects_invalid_timeout_and_unreadable_vars() {
        let bad_timeout = BedrockConfig::from_lookup(
            MODEL,
            env_of(&[
                ("AWS_BEARER_TOKEN_BEDROCK", "bedrock-api-key"),
                ("BEDROCK_TIMEOUT_SECS", "soon"),
            ]),
        )
        .expect_err("non-integer timeout should fail");
        assert!(matches!(
            bad_timeout,
            LlmError::Validation { message }
            if message == "BEDROCK_TIMEOUT_SECS must be a positive integer in seconds"
        ));

        let unreadable = BedrockConfig::from_lookup(MODEL, |name: &str| {
            if name == "AWS_PROFILE" {
                Err(LlmError::validation("AWS_PROFILE could not be read"))
            } else {
                Ok(None)
            }
        })
        .expect_err("lookup failure should propagate");
        assert!(matches!(unreadable, LlmError::Validation { .. }));
    }

    #[test]
    fn new_uses_conservative_defaults() {
        let config = BedrockConfig::new("anthropic.claude-3-haiku-20240307-v1:0");

        assert_eq!(config.params, GenerationParams::default());
        assert_eq!(config.params.temperature, 0.2);
        assert_eq!(config.params.max_output_tokens, 1024);
        assert_eq!(config.params.top_p, 0.9);
        assert!(!config.structured_output);
        assert_eq!(config.transport, TransportConfig::AwsSdk);
    }

    #[test]
    fn validate_returns_stripped_model_reference() {
        let model = BedrockConfig::new("bedrock:cohere.command-r-plus-v1:0")
            .validate()
            .expect("config should validate");

        assert_eq!(model.reference(), "cohere.command-r-plus-v1:0");
    }

    #[test]
    fn validate_rejects_blank_fields() {
        let empty_model = BedrockConfig::new("").validate().expect_err("empty model");
        assert!(matches!(empty_model, LlmError::Validation { .. }));

        let blank_profile = BedrockConfig::new("mistral.mistral-large-2407-v1:0")
            .with_profile(" ")
            .validate()
            .expect_err("blank profile");
        assert!(matches!(
            blank_profile,
            LlmError::Validation { message } if message == "AWS profile must not be empty"
        ));

        let blank_token = BedrockConfig::new("mistral.mistral-large-2407-v1:0")
            .with_transport(TransportConfig::BearerToken {
                token: String::new(),
                timeout: None,
            })
            .validate()
            .expect_err("blank token");
        assert!(matches!(blank_token, LlmError::Validation { .. }));
    }

    #[test]
    fn active_schema_hint_requires_structured_output() {
        let hint = SchemaHint::new(json!({"type": "object"}));
        let advisory = BedrockConfig::new("amazon.titan-text-lite-v1").with_schema_hint(hint.clone());
        assert!(advisory.active_schema_hint().is_none());

        let structured = advisory.with_structured_output(true);
        assert_eq!(structured.active_schema_hint(), Some(&hint));

        let no_hint = BedrockConfig::new("amazon.titan-text-lite-v1").with_structured_output(true);
        assert!(no_hint.active_schema_hint().is_none());
    }

    #[test]
    fn active_schema_hint_ignores_empty_hints() {
        for schema in [json!({}), serde_json::Value::Null] {
            let config = BedrockConfig::new("amazon.titan-text-lite-v1")
                .with_schema_hint(SchemaHint::new(schema.clone()))
                .with_structured_output(true);
            assert!(config.active_schema_hint().is_none(), "{schema}");
        }
    }
}
