//! Chain RPC boundary
//!
//! The workflows talk to the chain through the traits below so they can run
//! against [`rpc::RpcClient`] in production and an in-memory double in tests.

pub mod abi;
pub mod rpc;
pub mod signer;

#[cfg(test)]
pub(crate) mod mock;

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::models::{BaseFeeSelector, RequestHash, Sla};

/// Value and EIP-1559 fee caps attached to a state-changing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TxOptions {
    pub value: U256,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
}

impl TxOptions {
    /// Both fee caps pinned to the same gas price.
    pub fn at_gas_price(gas_price: U256) -> Self {
        Self {
            value: U256::ZERO,
            max_fee_per_gas: gas_price,
            max_priority_fee_per_gas: gas_price,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub tx_hash: B256,
    pub block_number: u64,
    pub gas_used: u64,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: U256,
    pub name: String,
    pub vote_count: U256,
}

/// Calls every workflow needs regardless of the contract it targets.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address transactions are sent from, if a signer is configured.
    fn sender(&self) -> Option<Address>;

    async fn gas_price(&self) -> Result<U256>;

    async fn balance(&self, address: Address) -> Result<U256>;

    /// Blocks until the transaction is included and returns its receipt.
    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<Receipt>;
}

/// WitnetOracle fee schedule plus the request submission entry point.
#[async_trait]
pub trait OracleChain: ChainClient {
    async fn estimate_base_fee(&self, gas_price: U256, selector: &BaseFeeSelector) -> Result<U256>;

    async fn estimate_randomize_fee(&self, gas_price: U256) -> Result<U256>;

    async fn estimate_extra_fee(&self, gas_price: U256, wit_price: U256, sla: &Sla) -> Result<U256>;

    async fn submit_oracle_request(
        &self,
        request_hash: &RequestHash,
        sla: &Sla,
        options: TxOptions,
    ) -> Result<B256>;
}

#[async_trait]
pub trait VotingChain: ChainClient {
    async fn candidate(&self, id: U256) -> Result<Candidate>;

    async fn vote(&self, id: U256, options: TxOptions) -> Result<B256>;
}
