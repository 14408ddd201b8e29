//! Workflows built on top of the chain boundary

pub mod fee_estimator;
pub mod ledger;
pub mod request_builder;
pub mod voting;

pub use fee_estimator::{FeeEstimator, OracleSubmitter, Stage, SubmissionReport};
pub use ledger::{LedgerEntry, SubmissionLedger};
pub use request_builder::{eth_usd_price_request, RequestBuilder, ETH_USD_SOURCE};
pub use voting::VotingService;
