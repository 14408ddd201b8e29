use std::path::PathBuf;

use crate::config::{optional, Vars};
use crate::error::Result;

/// Input for `generate-request`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestSettings {
    /// JSON descriptor to hash instead of the built-in price request.
    pub request_file: Option<PathBuf>,
}

impl RequestSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(&super::process_env)
    }

    pub fn from_vars(vars: Vars<'_>) -> Result<Self> {
        Ok(Self {
            request_file: optional(vars, "REQUEST_FILE").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::fixed_vars;

    #[test]
    fn blank_request_file_means_builtin_request() {
        let settings = RequestSettings::from_vars(&fixed_vars(&[("REQUEST_FILE", "  ")])).unwrap();
        assert_eq!(settings.request_file, None);

        let settings =
            RequestSettings::from_vars(&fixed_vars(&[("REQUEST_FILE", " requests/eth.json ")]))
                .unwrap();
        assert_eq!(settings.request_file, Some(PathBuf::from("requests/eth.json")));
    }
}
