use std::time::Duration;

use crate::domain::LlmError;

pub(crate) fn read_env_var(name: &str) -> Result<Option<String>, LlmError> {
    match std::env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(error) => Err(LlmError::validation(format!(
            "{name} could not be read: {error}"
        ))),
    }
}

/// Reads `name` through `lookup`; blank values count as unset.
pub(crate) fn read_non_empty_with<F>(lookup: &F, name: &str) -> Result<Option<String>, LlmError>
where
    F: Fn(&str) -> Result<Option<String>, LlmError>,
{
    Ok(lookup(name)?
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

pub(crate) fn parse_timeout_seconds(name: &str, value: &str) -> Result<Duration, LlmError> {
    let parsed = value.trim().parse::<u64>().map_err(|_| {
        LlmError::validation(format!("{name} must be a positive integer in seconds"))
    })?;
    if parsed == 0 {
        return Err(LlmError::validation(format!(
            "{name} must be greater than 0 seconds"
        )));
    }
    Ok(Duration::from_secs(parsed))
}

pub(crate) fn read_timeout_with<F>(lookup: &F, name: &str) -> Result<Option<Duration>, LlmError>
where
    F: Fn(&str) -> Result<Option<String>, LlmError>,
{
    let Some(value) = read_non_empty_with(lookup, name)? else {
        return Ok(None);
    };
    Ok(Some(parse_timeout_seconds(name, &value)?))
}
