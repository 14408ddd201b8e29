//! Error types shared by the request builder, fee estimator and chain client.

use alloy_primitives::B256;
use thiserror::Error;

pub type Result<T, E = OracleError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum OracleError {
    /// Invalid SLA, request descriptor or runtime configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The RPC endpoint was unreachable, rejected the call or timed out.
    #[error("connectivity error during {method}: {message}")]
    Connectivity { method: String, message: String },

    /// More than one contract overload matches the available arguments.
    #[error("ambiguous contract call: {0}")]
    AmbiguousCall(String),

    /// The target contract rejected the call. `tx_hash` and `block_number` are
    /// set when the transaction was mined; a rejection caught while the node
    /// simulated the call (gas estimation, `eth_call`) carries only the reason.
    #[error("{}", revert_message(.reason, .tx_hash, .block_number))]
    Revert {
        reason: String,
        tx_hash: Option<B256>,
        block_number: Option<u64>,
    },

    /// The endpoint answered with a payload that could not be decoded.
    #[error("malformed response from {method}: {message}")]
    Decode { method: String, message: String },
}

impl OracleError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn connectivity(method: &str, message: impl ToString) -> Self {
        Self::Connectivity {
            method: method.to_string(),
            message: message.to_string(),
        }
    }

    /// A mined transaction whose receipt reports failure.
    pub fn reverted_in_block(tx_hash: B256, block_number: u64) -> Self {
        Self::Revert {
            reason: "status 0".to_string(),
            tx_hash: Some(tx_hash),
            block_number: Some(block_number),
        }
    }

    /// A call the node refused to execute against current state.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Revert {
            reason: reason.into(),
            tx_hash: None,
            block_number: None,
        }
    }

    pub fn decode(method: &str, message: impl ToString) -> Self {
        Self::Decode {
            method: method.to_string(),
            message: message.to_string(),
        }
    }
}

fn revert_message(reason: &str, tx_hash: &Option<B256>, block_number: &Option<u64>) -> String {
    match (tx_hash, block_number) {
        (Some(tx_hash), Some(block)) => {
            format!("transaction {tx_hash} reverted in block {block}: {reason}")
        }
        (Some(tx_hash), None) => format!("transaction {tx_hash} reverted: {reason}"),
        _ => format!("call rejected by contract: {reason}"),
    }
}

impl From<validator::ValidationErrors> for OracleError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Configuration(format!("validation failed: {errors}"))
    }
}
