use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::domain::LlmError;

use super::LanguageModel;

pub type ModelFactory =
    Arc<dyn Fn(&str) -> Result<Arc<dyn LanguageModel>, LlmError> + Send + Sync>;

/// One provider's claim over a set of model identifier patterns.
#[derive(Clone)]
pub struct ProviderRegistration {
    provider_id: String,
    patterns: Vec<Regex>,
    priority: i32,
    factory: ModelFactory,
}

impl ProviderRegistration {
    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn matches(&self, model_id: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(model_id))
    }

    pub fn create(&self, model_id: &str) -> Result<Arc<dyn LanguageModel>, LlmError> {
        (self.factory)(model_id)
    }
}

impl fmt::Debug for ProviderRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistration")
            .field("provider_id", &self.provider_id)
            .field(
                "patterns",
                &self.patterns.iter().map(Regex::as_str).collect::<Vec<_>>(),
            )
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Maps model identifiers to providers. The highest priority registration with
/// a matching pattern wins; among equal priorities the earliest registered wins.
#[derive(Default, Clone, Debug)]
pub struct ProviderRegistry {
    registrations: Vec<ProviderRegistration>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(
        &mut self,
        provider_id: &str,
        patterns: &[&str],
        priority: i32,
        factory: F,
    ) -> Result<(), LlmError>
    where
        F: Fn(&str) -> Result<Arc<dyn LanguageModel>, LlmError> + Send + Sync + 'static,
    {
        let provider_id = provider_id.trim();
        if provider_id.is_empty() {
            return Err(LlmError::validation("provider_id must not be empty"));
        }
        if self
            .registrations
            .iter()
            .any(|registration| registration.provider_id == provider_id)
        {
            return Err(LlmError::validation(format!(
                "provider '{provider_id}' is already registered"
            )));
        }
        if patterns.is_empty() {
            return Err(LlmError::validation(format!(
                "provider '{provider_id}' must declare at least one model pattern"
            )));
        }

        let patterns = patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|err| {
                    LlmError::validation(format!(
                        "provider '{provider_id}' pattern '{pattern}' is invalid: {err}"
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.registrations.push(ProviderRegistration {
            provider_id: provider_id.to_string(),
            patterns,
            priority,
            factory: Arc::new(factory),
        });
        Ok(())
    }

    pub fn resolve(&self, model_id: &str) -> Result<&ProviderRegistration, LlmError> {
        let model_id = model_id.trim();
        if model_id.is_empty() {
            return Err(LlmError::validation("model_id must not be empty"));
        }

        self.registrations
            .iter()
            .filter(|registration| registration.matches(model_id))
            .fold(None, |best: Option<&ProviderRegistration>, candidate| match best {
                Some(best) if best.priority >= candidate.priority => Some(best),
                _ => Some(candidate),
            })
            .ok_or_else(|| {
                LlmError::validation(format!("no provider is registered for model '{model_id}'"))
            })
    }

    pub fn create_model(&self, model_id: &str) -> Result<Arc<dyn LanguageModel>, LlmError> {
        self.resolve(model_id)?.create(model_id.trim())
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
