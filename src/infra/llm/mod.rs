mod bedrock;
mod bedrock_config;
mod env;
mod http_invoker;
mod invoker;
mod prompt_builder;
mod provider;
mod provider_registry;
mod response_parsing;
pub mod schema_validator;
mod sdk_invoker;
mod vendor_dispatch;

pub use bedrock::{
    BedrockLanguageModel, MODEL_PATTERNS, PROVIDER_ID, REGISTRATION_PRIORITY, register_bedrock,
    register_bedrock_with_invoker,
};
pub use bedrock_config::{BedrockConfig, DEFAULT_REGION, TransportConfig};
pub use http_invoker::HttpBedrockInvoker;
pub use invoker::{JSON_CONTENT_TYPE, ModelInvoker};
pub use prompt_builder::PromptBuilder;
pub use provider::{Inference, LanguageModel};
pub use provider_registry::{ModelFactory, ProviderRegistration, ProviderRegistry};
pub use sdk_invoker::SdkBedrockInvoker;
