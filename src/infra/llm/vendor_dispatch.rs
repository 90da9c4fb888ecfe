use serde::Serialize;

use crate::domain::{GenerationParams, LlmError, VendorFamily};

use super::response_parsing::ResponseShape;

const ANTHROPIC_BEDROCK_VERSION: &str = "bedrock-2023-05-31";

type RequestBuilder = fn(&str, &GenerationParams) -> Result<Vec<u8>, LlmError>;

/// Request builder and response envelope preference for one vendor family.
pub(crate) struct WireCodec {
    pub(crate) build_request: RequestBuilder,
    pub(crate) response_shapes: &'static [ResponseShape],
}

static MESSAGE_CHAT: WireCodec = WireCodec {
    build_request: build_messages_request,
    response_shapes: &[
        ResponseShape::ContentSegments,
        ResponseShape::Outputs,
        ResponseShape::Generations,
        ResponseShape::Results,
        ResponseShape::OutputText,
        ResponseShape::Generation,
    ],
};

static PROMPT_COMPLETION: WireCodec = WireCodec {
    build_request: build_prompt_request,
    response_shapes: &[
        ResponseShape::Outputs,
        ResponseShape::ContentSegments,
        ResponseShape::Generations,
        ResponseShape::Results,
        ResponseShape::OutputText,
        ResponseShape::Generation,
    ],
};

static GENERIC_TEXT: WireCodec = WireCodec {
    build_request: build_prompt_request,
    response_shapes: &[
        ResponseShape::Generations,
        ResponseShape::Results,
        ResponseShape::Outputs,
        ResponseShape::OutputText,
        ResponseShape::Generation,
        ResponseShape::ContentSegments,
    ],
};

pub(crate) fn codec_for(family: VendorFamily) -> &'static WireCodec {
    match family {
        VendorFamily::MessageChat => &MESSAGE_CHAT,
        VendorFamily::PromptCompletion => &PROMPT_COMPLETION,
        VendorFamily::GenericText => &GENERIC_TEXT,
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    anthropic_version: &'static str,
    messages: Vec<UserMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: Vec<TextSegment<'a>>,
}

#[derive(Debug, Serialize)]
struct TextSegment<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct PromptRequest<'a> {
    prompt: &'a str,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
}

fn build_messages_request(prompt: &str, params: &GenerationParams) -> Result<Vec<u8>, LlmError> {
    encode(&MessagesRequest {
        anthropic_version: ANTHROPIC_BEDROCK_VERSION,
        messages: vec![UserMessage {
            role: "user",
            content: vec![TextSegment {
                kind: "text",
                text: prompt,
            }],
        }],
        max_tokens: params.max_output_tokens,
        temperature: params.temperature,
        top_p: params.top_p,
    })
}

fn build_prompt_request(prompt: &str, params: &GenerationParams) -> Result<Vec<u8>, LlmError> {
    encode(&PromptRequest {
        prompt,
        max_tokens: params.max_output_tokens,
        temperature: params.temperature,
        top_p: params.top_p,
    })
}

fn encode<T: Serialize>(request: &T) -> Result<Vec<u8>, LlmError> {
    serde_json::to_vec(request)
        .map_err(|err| LlmError::internal(format!("failed to serialize Bedrock request: {err}")))
}
