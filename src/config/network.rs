use std::fmt;
use std::time::Duration;

use crate::config::{optional, parsed, required, Vars};
use crate::error::{OracleError, Result};

const DEFAULT_POLL_SECONDS: u64 = 2;
const DEFAULT_MAX_ATTEMPTS: u32 = 90;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub poll_interval: Duration,
    pub max_attempts: u32,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECONDS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Endpoint and signer for one chain. The key is kept out of `Debug` output.
#[derive(Clone)]
pub struct NetworkConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    private_key: Option<String>,
    pub confirmation: ConfirmationPolicy,
}

impl NetworkConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(&super::process_env)
    }

    pub fn from_vars(vars: Vars<'_>) -> Result<Self> {
        let rpc_url = required(vars, "RPC_URL")?;
        if !validator::validate_url(rpc_url.as_str()) {
            return Err(OracleError::config(format!("invalid RPC_URL {rpc_url:?}")));
        }
        let chain_id = parsed(vars, "CHAIN_ID")?
            .ok_or_else(|| OracleError::config("missing CHAIN_ID"))?;

        let poll_seconds = parsed::<u64>(vars, "CONFIRMATION_POLL_SECS")?
            .unwrap_or(DEFAULT_POLL_SECONDS);
        let max_attempts = parsed::<u32>(vars, "CONFIRMATION_MAX_ATTEMPTS")?
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);
        if max_attempts == 0 {
            return Err(OracleError::config("CONFIRMATION_MAX_ATTEMPTS must be at least 1"));
        }

        Ok(Self {
            rpc_url,
            chain_id,
            private_key: optional(vars, "PRIVATE_KEY"),
            confirmation: ConfirmationPolicy {
                poll_interval: Duration::from_secs(poll_seconds),
                max_attempts,
            },
        })
    }

    pub fn private_key(&self) -> Option<&str> {
        self.private_key.as_deref()
    }
}

impl fmt::Debug for NetworkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkConfig")
            .field("rpc_url", &self.rpc_url)
            .field("chain_id", &self.chain_id)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("confirmation", &self.confirmation)
            .finish()
    }
}
