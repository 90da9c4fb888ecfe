use std::sync::Arc;

use crate::domain::{LlmError, ScoredOutput};

/// Host-facing contract every model backend implements.
pub trait LanguageModel: Send + Sync {
    fn model_id(&self) -> &str;

    /// Runs exactly one remote call for `prompt`.
    fn infer_prompt(&self, prompt: &str) -> Result<Vec<ScoredOutput>, LlmError>;

    /// Whether the backend builds its own schema type. Backends that only
    /// accept externally supplied schema hints answer `false`.
    fn provides_schema_type(&self) -> bool {
        false
    }

    /// Lazily infers one result list per prompt, in input order.
    fn infer<I>(&self, prompts: I) -> Inference<'_, Self, I::IntoIter>
    where
        Self: Sized,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Inference::new(self, prompts.into_iter())
    }
}

impl<M: LanguageModel + ?Sized> LanguageModel for Box<M> {
    fn model_id(&self) -> &str {
        (**self).model_id()
    }

    fn infer_prompt(&self, prompt: &str) -> Result<Vec<ScoredOutput>, LlmError> {
        (**self).infer_prompt(prompt)
    }

    fn provides_schema_type(&self) -> bool {
        (**self).provides_schema_type()
    }
}

impl<M: LanguageModel + ?Sized> LanguageModel for Arc<M> {
    fn model_id(&self) -> &str {
        (**self).model_id()
    }

    fn infer_prompt(&self, prompt: &str) -> Result<Vec<ScoredOutput>, LlmError> {
        (**self).infer_prompt(prompt)
    }

    fn provides_schema_type(&self) -> bool {
        (**self).provides_schema_type()
    }
}

/// Iterator returned by [`LanguageModel::infer`]. Nothing is sent until the
/// caller pulls the next item.
pub struct Inference<'a, M: ?Sized, I> {
    model: &'a M,
    prompts: I,
}

impl<'a, M: ?Sized, I> Inference<'a, M, I> {
    pub fn new(model: &'a M, prompts: I) -> Self {
        Self { model, prompts }
    }
}

impl<M, I> Iterator for Inference<'_, M, I>
where
    M: LanguageModel + ?Sized,
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = Result<Vec<ScoredOutput>, LlmError>;

    fn next(&mut self) -> Option<Self::Item> {
        let prompt = self.prompts.next()?;
        Some(self.model.infer_prompt(prompt.as_ref()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.prompts.size_hint()
    }
}
