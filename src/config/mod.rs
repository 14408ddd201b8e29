//! Runtime configuration loaded from the environment (and `.env` via dotenvy).
//!
//! Endpoints, chain ids, contract addresses and keys are never compiled in.
//! Every loader takes a variable lookup so tests can feed a fixed map
//! instead of mutating the process environment.

pub mod contracts;
pub mod network;
pub mod oracle;
pub mod request;
pub mod voting;

use std::fmt::Display;
use std::str::FromStr;

pub use contracts::ContractsConfig;
pub use network::{ConfirmationPolicy, NetworkConfig};
pub use oracle::OracleSettings;
pub use request::RequestSettings;
pub use voting::VotingSettings;

use crate::error::{OracleError, Result};

/// Variable lookup: returns `None` for unset variables.
pub type Vars<'a> = &'a dyn Fn(&str) -> Option<String>;

pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

pub(crate) fn optional(vars: Vars<'_>, name: &str) -> Option<String> {
    vars(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub(crate) fn required(vars: Vars<'_>, name: &str) -> Result<String> {
    optional(vars, name).ok_or_else(|| OracleError::config(format!("missing {name}")))
}

pub(crate) fn parsed<T>(vars: Vars<'_>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    optional(vars, name)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| OracleError::config(format!("invalid {name} {raw:?}: {e}")))
        })
        .transpose()
}

#[cfg(test)]
pub(crate) fn fixed_vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: std::collections::HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| map.get(name).cloned()
}
