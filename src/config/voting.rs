use alloy_primitives::U256;

use crate::config::{optional, parsed, Vars};
use crate::error::{OracleError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VotingSettings {
    pub candidate_ids: Vec<U256>,
    pub vote_for: U256,
    /// Fixed gas price in wei; queried from the node when unset.
    pub gas_price: Option<U256>,
}

impl VotingSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(&super::process_env)
    }

    pub fn from_vars(vars: Vars<'_>) -> Result<Self> {
        let candidate_ids = match optional(vars, "CANDIDATE_IDS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(|id| {
                    id.parse::<U256>()
                        .map_err(|e| OracleError::config(format!("invalid candidate id {id:?}: {e}")))
                })
                .collect::<Result<Vec<_>>>()?,
            None => vec![U256::from(1u64), U256::from(2u64)],
        };
        if candidate_ids.is_empty() {
            return Err(OracleError::config("CANDIDATE_IDS must list at least one id"));
        }

        Ok(Self {
            candidate_ids,
            vote_for: parsed(vars, "VOTE_CANDIDATE_ID")?.unwrap_or(U256::from(1u64)),
            gas_price: parsed(vars, "GAS_PRICE_WEI")?,
        })
    }
}
