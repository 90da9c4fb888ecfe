use std::borrow::Cow;

use crate::domain::SchemaHint;

const JSON_ONLY_INSTRUCTION: &str =
    "Return ONLY valid JSON that matches this schema. Do not include explanations.";

pub struct PromptBuilder;

impl PromptBuilder {
    /// Steers the model towards JSON when a schema hint is active. Without a
    /// hint the prompt is passed through untouched.
    pub fn build<'a>(prompt: &'a str, schema_hint: Option<&SchemaHint>) -> Cow<'a, str> {
        let Some(hint) = schema_hint else {
            return Cow::Borrowed(prompt);
        };

        Cow::Owned(format!(
            "{JSON_ONLY_INSTRUCTION}
Schema (JSON Schema-ish hint): {schema}

Task:
{prompt}",
            schema = hint.schema,
        ))
    }
}
