use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use crate::domain::LlmError;

use super::ModelInvoker;
use super::response_parsing::truncate_message;

const TRANSPORT_NAME: &str = "bedrock_http";
const ERROR_TYPE_HEADER: &str = "x-amzn-errortype";

pub(crate) fn default_endpoint_url(region: &str) -> String {
    format!("https://bedrock-runtime.{region}.amazonaws.com")
}

/// `InvokeModel` over HTTPS with a Bedrock API key (bearer token).
pub struct HttpBedrockInvoker {
    bearer_token: String,
    endpoint_url: Url,
    client: Client,
}

impl HttpBedrockInvoker {
    pub fn for_region(
        region: &str,
        bearer_token: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, LlmError> {
        let region = region.trim();
        if region.is_empty() {
            return Err(LlmError::validation("AWS region must not be empty"));
        }
        Self::with_config(bearer_token, default_endpoint_url(region), timeout)
    }

    pub fn with_config(
        bearer_token: impl Into<String>,
        endpoint_url: impl AsRef<str>,
        timeout: Option<Duration>,
    ) -> Result<Self, LlmError> {
        let bearer_token = bearer_token.into();
        if bearer_token.trim().is_empty() {
            return Err(LlmError::validation(
                "Bedrock bearer token must not be empty",
            ));
        }

        let endpoint_url = endpoint_url.as_ref().trim();
        if endpoint_url.is_empty() {
            return Err(LlmError::validation(
                "Bedrock endpoint URL must not be empty",
            ));
        }
        let endpoint_url = Url::parse(endpoint_url).map_err(|err| {
            LlmError::validation(format!(
                "Bedrock endpoint URL '{endpoint_url}' is invalid: {err}"
            ))
        })?;
        if endpoint_url.cannot_be_a_base() {
            return Err(LlmError::validation(format!(
                "Bedrock endpoint URL '{endpoint_url}' cannot carry a path"
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|err| {
            LlmError::internal(format!("failed to create Bedrock HTTP client: {err}"))
        })?;

        Ok(Self {
            bearer_token,
            endpoint_url,
            client,
        })
    }

    fn invoke_url(&self, model_reference: &str) -> Result<Url, LlmError> {
        let mut url = self.endpoint_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                LlmError::internal(format!(
                    "Bedrock endpoint URL '{}' cannot carry a path",
                    self.endpoint_url
                ))
            })?
            .pop_if_empty()
            .extend(["model", model_reference, "invoke"]);
        Ok(url)
    }
}

impl ModelInvoker for HttpBedrockInvoker {
    fn transport_name(&self) -> &str {
        TRANSPORT_NAME
    }

    fn invoke(
        &self,
        model_reference: &str,
        content_type: &str,
        accept: &str,
        body: Vec<u8>,
    ) -> Result<Vec<u8>, LlmError> {
        let url = self.invoke_url(model_reference)?;
        debug!(%url, request_bytes = body.len(), "invoking Bedrock model over HTTP");

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.bearer_token))
            .header(CONTENT_TYPE, content_type)
            .header(ACCEPT, accept)
            .body(body)
            .send()
            .map_err(map_transport_error)?;

        let status = response.status();
        let error_type = error_type_from_headers(response.headers());
        let response_body = response.bytes().map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_http_error(
                status,
                error_type.as_deref(),
                &String::from_utf8_lossy(&response_body),
            ));
        }

        Ok(response_body.to_vec())
    }
}

/// `ThrottlingException:http://internal.amazon.com/...` → `ThrottlingException`.
fn error_type_from_headers(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(ERROR_TYPE_HEADER)?.to_str().ok()?;
    let error_type = raw.split(':').next()?.trim();
    (!error_type.is_empty()).then(|| error_type.to_string())
}

#[derive(Debug, Deserialize)]
struct BedrockErrorBody {
    #[serde(default, alias = "Message")]
    message: Option<String>,
}

fn map_http_error(status: StatusCode, error_type: Option<&str>, body: &str) -> LlmError {
    if matches!(
        error_type,
        Some(
            "AccessDeniedException"
                | "UnrecognizedClientException"
                | "ExpiredTokenException"
                | "InvalidSignatureException"
        )
    ) || status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
    {
        return LlmError::Auth;
    }
    if matches!(
        error_type,
        Some("ThrottlingException" | "ServiceQuotaExceededException")
    ) || status == StatusCode::TOO_MANY_REQUESTS
    {
        return LlmError::RateLimited;
    }
    if matches!(error_type, Some("ModelTimeoutException"))
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::GATEWAY_TIMEOUT
    {
        return LlmError::Timeout;
    }

    let message = serde_json::from_str::<BedrockErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .map(|message| truncate_message(&message))
        .unwrap_or_else(|| truncate_message(body));
    let label = error_type.unwrap_or("error");
    LlmError::transport(format!(
        "Bedrock returned HTTP {status} ({label}): {message}"
    ))
}

fn map_transport_error(error: reqwest::Error) -> LlmError {
    if error.is_timeout() {
        return LlmError::Timeout;
    }
    LlmError::transport(format!("Bedrock HTTP transport error: {error}"))
}
