//! Fee quoting and oracle request submission.
//!
//! Submission runs as a linear sequence of stages:
//! `Idle -> Quoting -> Margining -> Submitting -> Confirming -> Done`.
//! The first failure moves the run to `Failed` and is returned unchanged;
//! nothing is retried.

use std::fmt;

use alloy_primitives::{B256, U256};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};

use crate::chain::{OracleChain, TxOptions};
use crate::error::{OracleError, Result};
use crate::models::{BaseFeeSelector, FeeMargin, FeeQuote, RequestHash, Sla};
use crate::services::ledger::{LedgerEntry, SubmissionLedger};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Quoting,
    Margining,
    Submitting,
    Confirming,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Quoting => "quoting",
            Self::Margining => "margining",
            Self::Submitting => "submitting",
            Self::Confirming => "confirming",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

pub struct FeeEstimator<'a, C: ?Sized> {
    chain: &'a C,
}

impl<'a, C: OracleChain + ?Sized> FeeEstimator<'a, C> {
    pub fn new(chain: &'a C) -> Self {
        Self { chain }
    }

    /// Quotes the base fee and, when requested, the randomize fee.
    pub async fn quote(
        &self,
        gas_price: U256,
        selector: &BaseFeeSelector,
        with_randomize: bool,
    ) -> Result<FeeQuote> {
        let base_fee = self.chain.estimate_base_fee(gas_price, selector).await?;
        info!(
            overload = selector.signature(),
            %gas_price,
            %base_fee,
            "estimated base fee"
        );

        let randomize_fee = if with_randomize {
            let fee = self.chain.estimate_randomize_fee(gas_price).await?;
            info!(%gas_price, randomize_fee = %fee, "estimated randomize fee");
            Some(fee)
        } else {
            None
        };

        Ok(FeeQuote {
            gas_price,
            base_fee,
            randomize_fee,
        })
    }

    pub async fn estimate_extra_fee(&self, gas_price: U256, wit_price: U256, sla: &Sla) -> Result<U256> {
        sla.check()?;
        let fee = self.chain.estimate_extra_fee(gas_price, wit_price, sla).await?;
        info!(
            %gas_price,
            %wit_price,
            committee_size = sla.committee_size,
            witnessing_fee = sla.witnessing_fee_nano_wit,
            extra_fee = %fee,
            "estimated extra fee"
        );
        Ok(fee)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReport {
    pub request_hash: RequestHash,
    pub sla: Sla,
    pub quote: FeeQuote,
    pub value: U256,
    pub tx_hash: B256,
    pub block_number: u64,
}

pub struct OracleSubmitter<'a, C: ?Sized> {
    chain: &'a C,
    margin: FeeMargin,
    include_randomize_fee: bool,
    ledger: Option<SubmissionLedger>,
}

impl<'a, C: OracleChain + ?Sized> OracleSubmitter<'a, C> {
    pub fn new(chain: &'a C, margin: FeeMargin) -> Self {
        Self {
            chain,
            margin,
            include_randomize_fee: false,
            ledger: None,
        }
    }

    pub fn include_randomize_fee(mut self, include: bool) -> Self {
        self.include_randomize_fee = include;
        self
    }

    pub fn with_ledger(mut self, ledger: SubmissionLedger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Fails if the ledger already holds a confirmed submission of this hash.
    /// Touches only the ledger file, never the chain.
    pub async fn ensure_not_submitted(&self, request_hash: &RequestHash) -> Result<()> {
        let Some(ledger) = &self.ledger else {
            return Ok(());
        };
        match ledger.lookup(request_hash).await? {
            Some(previous) => Err(OracleError::config(format!(
                "request {request_hash} was already submitted in tx {} (block {})",
                previous.tx_hash, previous.block_number
            ))),
            None => Ok(()),
        }
    }

    /// Quotes, margins, submits and waits for the request to be included.
    pub async fn run(
        &self,
        request_hash: RequestHash,
        sla: Sla,
        gas_price: U256,
    ) -> Result<SubmissionReport> {
        let mut stage = Stage::Idle;
        let outcome = self.drive(&mut stage, request_hash, sla, gas_price).await;
        match outcome {
            Ok(report) => {
                advance(&mut stage, Stage::Done);
                info!(
                    %request_hash,
                    tx_hash = %report.tx_hash,
                    block_number = report.block_number,
                    value = %report.value,
                    "oracle request submitted"
                );
                Ok(report)
            }
            Err(err) => {
                error!(
                    stage = %stage,
                    %request_hash,
                    committee_size = sla.committee_size,
                    witnessing_fee = sla.witnessing_fee_nano_wit,
                    %gas_price,
                    margin = %self.margin,
                    error = %err,
                    "oracle request workflow failed"
                );
                advance(&mut stage, Stage::Failed);
                Err(err)
            }
        }
    }

    async fn drive(
        &self,
        stage: &mut Stage,
        request_hash: RequestHash,
        sla: Sla,
        gas_price: U256,
    ) -> Result<SubmissionReport> {
        sla.check()?;
        self.ensure_not_submitted(&request_hash).await?;

        advance(stage, Stage::Quoting);
        let quote = FeeEstimator::new(self.chain)
            .quote(
                gas_price,
                &BaseFeeSelector::ByRequestHash(request_hash),
                self.include_randomize_fee,
            )
            .await?;

        advance(stage, Stage::Margining);
        let value = self.margin.apply(quote.base_fee)?;
        info!(base_fee = %quote.base_fee, margin = %self.margin, %value, "applied fee margin");

        advance(stage, Stage::Submitting);
        let options = TxOptions::at_gas_price(gas_price).with_value(value);
        let tx_hash = self
            .chain
            .submit_oracle_request(&request_hash, &sla, options)
            .await?;

        advance(stage, Stage::Confirming);
        let receipt = self.chain.wait_for_receipt(tx_hash).await?;
        if !receipt.success {
            return Err(OracleError::reverted_in_block(receipt.tx_hash, receipt.block_number));
        }

        if let Some(ledger) = &self.ledger {
            let entry = LedgerEntry {
                tx_hash: receipt.tx_hash,
                block_number: receipt.block_number,
                value,
                recorded_at: Utc::now(),
            };
            ledger.record(request_hash, entry).await?;
        }

        Ok(SubmissionReport {
            request_hash,
            sla,
            quote,
            value,
            tx_hash: receipt.tx_hash,
            block_number: receipt.block_number,
        })
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    info!(from = %stage, to = %next, "oracle request stage");
    *stage = next;
}
