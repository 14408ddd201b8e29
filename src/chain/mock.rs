//! In-memory chain used by workflow tests.

use std::sync::Mutex;

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;

use crate::chain::{Candidate, ChainClient, OracleChain, Receipt, TxOptions, VotingChain};
use crate::error::{OracleError, Result};
use crate::models::{BaseFeeSelector, RequestHash, Sla};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GasPrice,
    Balance(Address),
    BaseFee(U256, BaseFeeSelector),
    RandomizeFee(U256),
    ExtraFee(U256, U256, Sla),
    Submit(RequestHash, Sla, TxOptions),
    Candidate(U256),
    Vote(U256, TxOptions),
    Receipt(B256),
}

pub struct MockChain {
    pub base_fee: U256,
    pub randomize_fee: U256,
    pub extra_fee: U256,
    pub gas_price: U256,
    pub reject_base_fee: bool,
    pub revert_submission: bool,
    pub candidates: Vec<Candidate>,
    pub(crate) calls: Mutex<Vec<Call>>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            base_fee: U256::from(10_000u64),
            randomize_fee: U256::from(3_000u64),
            extra_fee: U256::from(500u64),
            gas_price: U256::from(1_000_000_000u64),
            reject_base_fee: false,
            revert_submission: false,
            candidates: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockChain {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn submissions(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Submit(..) | Call::Vote(..)))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn sender() -> Address {
    Address::repeat_byte(0x11)
}

pub fn tx_hash() -> B256 {
    B256::repeat_byte(0x22)
}

#[async_trait]
impl ChainClient for MockChain {
    fn sender(&self) -> Option<Address> {
        Some(sender())
    }

    async fn gas_price(&self) -> Result<U256> {
        self.record(Call::GasPrice);
        Ok(self.gas_price)
    }

    async fn balance(&self, address: Address) -> Result<U256> {
        self.record(Call::Balance(address));
        Ok(U256::from(10u64).pow(U256::from(18u64)))
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<Receipt> {
        self.record(Call::Receipt(tx_hash));
        Ok(Receipt {
            tx_hash,
            block_number: 42,
            gas_used: 80_000,
            success: !self.revert_submission,
        })
    }
}

#[async_trait]
impl OracleChain for MockChain {
    async fn estimate_base_fee(&self, gas_price: U256, selector: &BaseFeeSelector) -> Result<U256> {
        self.record(Call::BaseFee(gas_price, *selector));
        if self.reject_base_fee {
            return Err(OracleError::connectivity("eth_call", "connection refused"));
        }
        Ok(self.base_fee)
    }

    async fn estimate_randomize_fee(&self, gas_price: U256) -> Result<U256> {
        self.record(Call::RandomizeFee(gas_price));
        Ok(self.randomize_fee)
    }

    async fn estimate_extra_fee(&self, gas_price: U256, wit_price: U256, sla: &Sla) -> Result<U256> {
        self.record(Call::ExtraFee(gas_price, wit_price, *sla));
        Ok(self.extra_fee)
    }

    async fn submit_oracle_request(
        &self,
        request_hash: &RequestHash,
        sla: &Sla,
        options: TxOptions,
    ) -> Result<B256> {
        self.record(Call::Submit(*request_hash, *sla, options));
        Ok(tx_hash())
    }
}

#[async_trait]
impl VotingChain for MockChain {
    async fn candidate(&self, id: U256) -> Result<Candidate> {
        self.record(Call::Candidate(id));
        self.candidates
            .iter()
            .find(|candidate| candidate.id == id)
            .cloned()
            .ok_or_else(|| OracleError::rejected("execution reverted"))
    }

    async fn vote(&self, id: U256, options: TxOptions) -> Result<B256> {
        self.record(Call::Vote(id, options));
        Ok(tx_hash())
    }
}
