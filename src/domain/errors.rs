use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorCategory {
    UserActionRequired,
    TemporaryFailure,
    InternalFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    #[error("validation failed: {message}")]
    Validation { message: String },
    #[error("Bedrock authentication failed")]
    Auth,
    #[error("Bedrock throttled the request")]
    RateLimited,
    #[error("Bedrock request timed out")]
    Timeout,
    #[error("Bedrock returned an invalid response: {message}")]
    InvalidResponse { message: String },
    #[error("Bedrock transport failed: {message}")]
    Transport { message: String },
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl LlmError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn category(&self) -> LlmErrorCategory {
        match self {
            Self::Validation { .. } | Self::Auth => LlmErrorCategory::UserActionRequired,
            Self::RateLimited | Self::Timeout | Self::Transport { .. } => {
                LlmErrorCategory::TemporaryFailure
            }
            Self::InvalidResponse { .. } | Self::Internal { .. } => {
                LlmErrorCategory::InternalFailure
            }
        }
    }

    /// Whether a caller could reasonably retry. The adapter itself never does.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::Timeout | Self::Transport { .. }
        )
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message } => {
                format!("Please review the model configuration: {message}")
            }
            Self::Auth => {
                "Authentication with Bedrock failed. Check your AWS credentials, profile or bearer token."
                    .to_string()
            }
            Self::RateLimited => {
                "Bedrock is throttling requests. Please retry in a moment.".to_string()
            }
            Self::Timeout => "Bedrock did not respond in time. Please retry.".to_string(),
            Self::InvalidResponse { message } => {
                format!("Bedrock returned a response that could not be read: {message}")
            }
            Self::Transport { message } => {
                format!("Could not reach Bedrock: {message}")
            }
            Self::Internal { message } => {
                format!("An internal error occurred during inference: {message}")
            }
        }
    }
}
