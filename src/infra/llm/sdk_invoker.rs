use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::config::Region;
use aws_sdk_bedrockruntime::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_bedrockruntime::operation::invoke_model::InvokeModelError;
use aws_sdk_bedrockruntime::primitives::Blob;
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::debug;

use crate::domain::LlmError;

use super::ModelInvoker;

const TRANSPORT_NAME: &str = "bedrock_sdk";

/// `InvokeModel` through the AWS SDK and its default credential chain.
///
/// The SDK is async; a private current-thread runtime drives each call so the
/// adapter stays synchronous. Calls made from inside another Tokio runtime are
/// rejected with an internal error.
pub struct SdkBedrockInvoker {
    runtime: Runtime,
    client: Client,
}

impl SdkBedrockInvoker {
    pub fn connect(
        region: Option<&str>,
        profile: Option<&str>,
        endpoint_url: Option<&str>,
    ) -> Result<Self, LlmError> {
        ensure_outside_runtime()?;
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| LlmError::internal(format!("failed to start AWS SDK runtime: {err}")))?;

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint_url) = endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let sdk_config = runtime.block_on(loader.load());

        if sdk_config.region().is_none() {
            return Err(LlmError::validation(
                "AWS region could not be resolved (pass a region or set AWS_REGION)",
            ));
        }

        Ok(Self {
            runtime,
            client: Client::new(&sdk_config),
        })
    }
}

impl ModelInvoker for SdkBedrockInvoker {
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
        ensure_outside_runtime()?;
        debug!(
            model = model_reference,
            request_bytes = body.len(),
            "invoking Bedrock model through AWS SDK"
        );

        let output = self
            .runtime
            .block_on(
                self.client
                    .invoke_model()
                    .model_id(model_reference)
                    .content_type(content_type)
                    .accept(accept)
                    .body(Blob::new(body))
                    .send(),
            )
            .map_err(map_sdk_error)?;

        Ok(output.body.into_inner())
    }
}

// `block_on` panics when nested inside a running Tokio runtime.
fn ensure_outside_runtime() -> Result<(), LlmError> {
    if Handle::try_current().is_ok() {
        return Err(LlmError::internal(
            "the AWS SDK transport is blocking and cannot run inside an async runtime",
        ));
    }
    Ok(())
}

fn map_sdk_error<R>(error: SdkError<InvokeModelError, R>) -> LlmError
where
    R: std::fmt::Debug + 'static,
{
    if matches!(error, SdkError::TimeoutError(_)) {
        return LlmError::Timeout;
    }

    if let Some(service_error) = error.as_service_error() {
        if service_error.is_access_denied_exception()
            || matches!(
                service_error.code(),
                Some(
                    "UnrecognizedClientException"
                        | "ExpiredTokenException"
                        | "InvalidSignatureException"
                )
            )
        {
            return LlmError::Auth;
        }
        if service_error.is_throttling_exception()
            || service_error.is_service_quota_exceeded_exception()
        {
            return LlmError::RateLimited;
        }
        if service_error.is_model_timeout_exception() {
            return LlmError::Timeout;
        }
    }

    LlmError::transport(format!(
        "Bedrock InvokeModel failed: {}",
        DisplayErrorContext(&error)
    ))
}
