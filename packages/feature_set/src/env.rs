//! Boolean flags read through a [`switchy_env::EnvProvider`].

use switchy_env::EnvProvider;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlagError {
    #[error("Environment variable '{name}' is not a boolean flag: '{value}'")]
    Invalid { name: String, value: String },
}

/// `1`/`true`/`yes`/`on` and `0`/`false`/`no`/`off`, case-insensitive. Empty
/// counts as `false`.
#[must_use]
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// `Ok(None)` when `name` is unset.
///
/// # Errors
///
/// * If `name` is set to something [`parse_flag`] does not recognize
pub fn var_flag_opt<E: EnvProvider + ?Sized>(
    env: &E,
    name: &str,
) -> Result<Option<bool>, FlagError> {
    let Ok(value) = env.var(name) else {
        return Ok(None);
    };

    parse_flag(&value).map(Some).ok_or_else(|| FlagError::Invalid {
        name: name.to_string(),
        value,
    })
}

/// # Errors
///
/// * If `name` is set to something [`parse_flag`] does not recognize
pub fn var_flag_or<E: EnvProvider + ?Sized>(
    env: &E,
    name: &str,
    default: bool,
) -> Result<bool, FlagError> {
    Ok(var_flag_opt(env, name)?.unwrap_or(default))
}
