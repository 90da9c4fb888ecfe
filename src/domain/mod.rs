mod errors;
mod model_contract;

pub use errors::{LlmError, LlmErrorCategory};
pub use model_contract::{
    DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TOP_P, ERROR_FIELD,
    GenerationParams, INVALID_JSON_ERROR, MAX_SCORE, ModelId, RAW_FIELD, SchemaHint,
    SchemaValidation, ScoredOutput, TRANSPORT_PREFIX, ValidatedOutput, Vendor, VendorFamily,
    is_error_wrapper,
};
