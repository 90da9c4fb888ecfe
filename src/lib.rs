//! Drives AWS Bedrock hosted models through one vendor-agnostic
//! [`LanguageModel`](infra::llm::LanguageModel) interface.
//!
//! A model identifier such as `bedrock:anthropic.claude-3-5-sonnet-20240620-v1:0`
//! or `mistral.mistral-large-2407-v1:0` selects the wire format; every prompt
//! comes back as a single [`ScoredOutput`](domain::ScoredOutput).

pub mod domain;
pub mod infra;
