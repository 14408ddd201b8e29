//! Ethereum JSON-RPC client over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::chain::abi::{IVotingWithOracle, IWitnetOracle, RadonSLA};
use crate::chain::signer::{Eip1559Transaction, LocalSigner};
use crate::chain::{Candidate, ChainClient, OracleChain, Receipt, TxOptions, VotingChain};
use crate::config::{ConfirmationPolicy, ContractsConfig, NetworkConfig};
use crate::error::{OracleError, Result};
use crate::models::{BaseFeeSelector, RequestHash, Sla};

const EXECUTION_REVERTED_CODE: i64 = 3;

pub struct RpcClient {
    http: Client,
    rpc_url: String,
    chain_id: u64,
    signer: Option<LocalSigner>,
    contracts: ContractsConfig,
    confirmation: ConfirmationPolicy,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(
        rpc_url: impl Into<String>,
        chain_id: u64,
        signer: Option<LocalSigner>,
        contracts: ContractsConfig,
        confirmation: ConfirmationPolicy,
    ) -> Self {
        Self {
            http: Client::new(),
            rpc_url: rpc_url.into(),
            chain_id,
            signer,
            contracts,
            confirmation,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn from_config(network: &NetworkConfig, contracts: ContractsConfig) -> Result<Self> {
        let signer = network.private_key().map(LocalSigner::from_hex).transpose()?;
        Ok(Self::new(
            network.rpc_url.clone(),
            network.chain_id,
            signer,
            contracts,
            network.confirmation,
        ))
    }

    pub fn from_env() -> Result<Self> {
        Self::from_config(&NetworkConfig::from_env()?, ContractsConfig::from_env()?)
    }

    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, "json-rpc request");

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": method,
                "params": params,
            }))
            .send()
            .await
            .map_err(|err| OracleError::connectivity(method, err))?
            .error_for_status()
            .map_err(|err| OracleError::connectivity(method, err))?
            .json::<Value>()
            .await
            .map_err(|err| OracleError::decode(method, err))?;

        if let Some(error) = response.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            if is_execution_revert(error, message) {
                warn!(method, reason = message, "contract rejected simulated call");
                return Err(OracleError::rejected(message));
            }
            return Err(OracleError::connectivity(
                method,
                format!("node rejected call: {message}"),
            ));
        }

        response
            .get("result")
            .cloned()
            .ok_or_else(|| OracleError::decode(method, "response has neither result nor error"))
    }

    async fn call_view<C: SolCall>(&self, to: Address, call: &C) -> Result<C::Return> {
        let result = self
            .rpc_call(
                "eth_call",
                json!([{ "to": to, "data": encode_hex(&call.abi_encode()) }, "latest"]),
            )
            .await?;
        let output = decode_hex("eth_call", &result)?;
        C::abi_decode_returns(&output, true).map_err(|err| OracleError::decode(C::SIGNATURE, err))
    }

    async fn send_call<C: SolCall>(&self, to: Address, call: &C, options: TxOptions) -> Result<B256> {
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| OracleError::config("PRIVATE_KEY is required to send transactions"))?;
        let from = signer.address();
        let input = Bytes::from(call.abi_encode());

        let nonce = self.transaction_count(from).await?;
        let gas_limit = self.estimate_gas(from, to, &input, options.value).await?;

        let tx = Eip1559Transaction {
            chain_id: self.chain_id,
            nonce,
            max_priority_fee_per_gas: options.max_priority_fee_per_gas,
            max_fee_per_gas: options.max_fee_per_gas,
            gas_limit,
            to,
            value: options.value,
            input,
        };
        let (raw, local_hash) = signer.sign(&tx)?;

        info!(
            function = C::SIGNATURE,
            %from,
            %to,
            nonce,
            gas_limit,
            value = %options.value,
            tx_hash = %local_hash,
            "sending transaction"
        );
        let result = self
            .rpc_call("eth_sendRawTransaction", json!([encode_hex(&raw)]))
            .await?;
        let tx_hash = parse_b256("eth_sendRawTransaction", &result)?;
        if tx_hash != local_hash {
            warn!(%tx_hash, %local_hash, "node reported a different transaction hash");
        }
        Ok(tx_hash)
    }

    async fn transaction_count(&self, address: Address) -> Result<u64> {
        let result = self
            .rpc_call("eth_getTransactionCount", json!([address, "pending"]))
            .await?;
        parse_u64("eth_getTransactionCount", &result)
    }

    async fn estimate_gas(&self, from: Address, to: Address, input: &Bytes, value: U256) -> Result<u64> {
        let result = self
            .rpc_call(
                "eth_estimateGas",
                json!([{
                    "from": from,
                    "to": to,
                    "data": encode_hex(input),
                    "value": encode_quantity(value),
                }]),
            )
            .await?;
        parse_u64("eth_estimateGas", &result)
    }
}

#[async_trait]
impl ChainClient for RpcClient {
    fn sender(&self) -> Option<Address> {
        self.signer.as_ref().map(LocalSigner::address)
    }

    async fn gas_price(&self) -> Result<U256> {
        let result = self.rpc_call("eth_gasPrice", json!([])).await?;
        parse_quantity("eth_gasPrice", &result)
    }

    async fn balance(&self, address: Address) -> Result<U256> {
        let result = self
            .rpc_call("eth_getBalance", json!([address, "latest"]))
            .await?;
        parse_quantity("eth_getBalance", &result)
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<Receipt> {
        let method = "eth_getTransactionReceipt";
        for attempt in 1..=self.confirmation.max_attempts {
            let result = self.rpc_call(method, json!([tx_hash])).await?;
            if !result.is_null() {
                return parse_receipt(&result);
            }
            debug!(%tx_hash, attempt, "transaction not yet included");
            if attempt < self.confirmation.max_attempts {
                sleep(self.confirmation.poll_interval).await;
            }
        }
        Err(OracleError::connectivity(
            method,
            format!(
                "transaction {tx_hash} not included after {} polls",
                self.confirmation.max_attempts
            ),
        ))
    }
}

#[async_trait]
impl OracleChain for RpcClient {
    async fn estimate_base_fee(&self, gas_price: U256, selector: &BaseFeeSelector) -> Result<U256> {
        let oracle = self.contracts.witnet_oracle()?;
        let fee = match *selector {
            BaseFeeSelector::ByResultSize(result_max_size) => {
                let call = IWitnetOracle::estimateBaseFee_0Call {
                    gasPrice: gas_price,
                    resultMaxSize: result_max_size,
                };
                self.call_view(oracle, &call).await?._0
            }
            BaseFeeSelector::ByRequestHash(request_hash) => {
                let call = IWitnetOracle::estimateBaseFee_1Call {
                    gasPrice: gas_price,
                    radHash: request_hash.as_b256(),
                };
                self.call_view(oracle, &call).await?._0
            }
        };
        Ok(fee)
    }

    async fn estimate_randomize_fee(&self, gas_price: U256) -> Result<U256> {
        let oracle = self.contracts.witnet_oracle()?;
        let call = IWitnetOracle::estimateRandomizeFeeCall { gasPrice: gas_price };
        Ok(self.call_view(oracle, &call).await?._0)
    }

    async fn estimate_extra_fee(&self, gas_price: U256, wit_price: U256, sla: &Sla) -> Result<U256> {
        let oracle = self.contracts.witnet_oracle()?;
        let call = IWitnetOracle::estimateExtraFeeCall {
            gasPrice: gas_price,
            evmWitPrice: wit_price,
            sla: RadonSLA::from(sla),
        };
        Ok(self.call_view(oracle, &call).await?._0)
    }

    async fn submit_oracle_request(
        &self,
        request_hash: &RequestHash,
        sla: &Sla,
        options: TxOptions,
    ) -> Result<B256> {
        let voting = self.contracts.voting()?;
        let call = IVotingWithOracle::submitOracleRequestCall {
            witnetRequestHash: request_hash.as_b256(),
            sla: RadonSLA::from(sla),
        };
        self.send_call(voting, &call, options).await
    }
}

#[async_trait]
impl VotingChain for RpcClient {
    async fn candidate(&self, id: U256) -> Result<Candidate> {
        let voting = self.contracts.voting()?;
        let call = IVotingWithOracle::candidatesCall { candidateId: id };
        let candidate = self.call_view(voting, &call).await?;
        Ok(Candidate {
            id: candidate.id,
            name: candidate.name,
            vote_count: candidate.voteCount,
        })
    }

    async fn vote(&self, id: U256, options: TxOptions) -> Result<B256> {
        let voting = self.contracts.voting()?;
        let call = IVotingWithOracle::voteCall { candidateId: id };
        self.send_call(voting, &call, options).await
    }
}

/// Geth and most clients report EVM reverts with code 3; older nodes only
/// say so in the message.
fn is_execution_revert(error: &Value, message: &str) -> bool {
    error.get("code").and_then(Value::as_i64) == Some(EXECUTION_REVERTED_CODE)
        || message.contains("execution reverted")
}

fn encode_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

fn encode_quantity(value: U256) -> String {
    format!("0x{value:x}")
}

fn expect_str<'a>(method: &str, value: &'a Value) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| OracleError::decode(method, format!("expected a hex string, got {value}")))
}

fn decode_hex(method: &str, value: &Value) -> Result<Vec<u8>> {
    let text = expect_str(method, value)?;
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits).map_err(|err| OracleError::decode(method, err))
}

fn parse_quantity(method: &str, value: &Value) -> Result<U256> {
    let text = expect_str(method, value)?;
    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| OracleError::decode(method, format!("quantity {text} lacks 0x prefix")))?;
    U256::from_str_radix(digits, 16).map_err(|err| OracleError::decode(method, err))
}

fn parse_u64(method: &str, value: &Value) -> Result<u64> {
    let quantity = parse_quantity(method, value)?;
    u64::try_from(quantity).map_err(|err| OracleError::decode(method, err))
}

fn parse_b256(method: &str, value: &Value) -> Result<B256> {
    let bytes = decode_hex(method, value)?;
    if bytes.len() != 32 {
        return Err(OracleError::decode(
            method,
            format!("expected 32 bytes, got {}", bytes.len()),
        ));
    }
    Ok(B256::from_slice(&bytes))
}

fn parse_receipt(value: &Value) -> Result<Receipt> {
    let method = "eth_getTransactionReceipt";
    let field = |name: &str| {
        value
            .get(name)
            .ok_or_else(|| OracleError::decode(method, format!("receipt is missing {name}")))
    };
    Ok(Receipt {
        tx_hash: parse_b256(method, field("transactionHash")?)?,
        block_number: parse_u64(method, field("blockNumber")?)?,
        gas_used: parse_u64(method, field("gasUsed")?)?,
        success: parse_u64(method, field("status")?)? == 1,
    })
}
