use alloy_primitives::Address;

use crate::config::{parsed, Vars};
use crate::error::{OracleError, Result};

#[derive(Clone, Debug, Default)]
pub struct ContractsConfig {
    pub witnet_oracle: Option<Address>,
    pub voting: Option<Address>,
}

impl ContractsConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(&super::process_env)
    }

    pub fn from_vars(vars: Vars<'_>) -> Result<Self> {
        Ok(Self {
            witnet_oracle: parsed(vars, "WITNET_ORACLE_ADDRESS")?,
            voting: parsed(vars, "VOTING_CONTRACT_ADDRESS")?,
        })
    }

    pub fn witnet_oracle(&self) -> Result<Address> {
        self.witnet_oracle
            .ok_or_else(|| OracleError::config("missing WITNET_ORACLE_ADDRESS"))
    }

    pub fn voting(&self) -> Result<Address> {
        self.voting
            .ok_or_else(|| OracleError::config("missing VOTING_CONTRACT_ADDRESS"))
    }
}
