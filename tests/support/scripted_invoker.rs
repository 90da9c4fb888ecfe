use std::collections::VecDeque;
use std::sync::Mutex;

use bedrock_adapter::domain::LlmError;
use bedrock_adapter::infra::llm::ModelInvoker;
use serde_json::Value;

/// Replays queued responses in order and records every request it receives.
pub(crate) struct ScriptedInvoker {
    responses: Mutex<VecDeque<Result<Value, LlmError>>>,
    requests: Mutex<Vec<(String, Value)>>,
}

impl ScriptedInvoker {
    pub(crate) fn new(responses: impl IntoIterator<Item = Result<Value, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl ModelInvoker for ScriptedInvoker {
    fn transport_name(&self) -> &str {
        "scripted"
    }

    fn invoke(
        &self,
        model_reference: &str,
        _content_type: &str,
        _accept: &str,
        body: Vec<u8>,
    ) -> Result<Vec<u8>, LlmError> {
        let request = serde_json::from_slice(&body).expect("request body must be JSON");
        self.requests
            .lock()
            .expect("requests lock")
            .push((model_reference.to_string(), request));

        let response = self
            .responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .expect("scripted invoker ran out of responses")?;
        Ok(response.to_string().into_bytes())
    }
}
