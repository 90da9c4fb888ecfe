use crate::domain::LlmError;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Synchronous `InvokeModel` capability. Implementations must not retry.
pub trait ModelInvoker: Send + Sync {
    fn transport_name(&self) -> &str;

    fn invoke(
        &self,
        model_reference: &str,
        content_type: &str,
        accept: &str,
        body: Vec<u8>,
    ) -> Result<Vec<u8>, LlmError>;
}
