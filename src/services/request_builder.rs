//! Builder for Witnet data requests.

use chrono::Utc;

use crate::error::{OracleError, Result};
use crate::models::{DataRequest, Reducer, Stage, COLLATERAL_FLOOR};

/// Price feed queried by the voting application's oracle request.
pub const ETH_USD_SOURCE: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=ethereum&vs_currencies=usd";

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    sources: Vec<String>,
    aggregator: Option<Stage>,
    tally: Option<Stage>,
    quorum: u32,
    collateral: u64,
    fees: u64,
    schedule_time: Option<u64>,
    timestamp: Option<u64>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            aggregator: None,
            tally: None,
            quorum: 1,
            collateral: COLLATERAL_FLOOR,
            fees: 0,
            schedule_time: None,
            timestamp: None,
        }
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_source(mut self, url: impl Into<String>) -> Self {
        self.sources.push(url.into());
        self
    }

    pub fn aggregator(mut self, stage: Stage) -> Self {
        self.aggregator = Some(stage);
        self
    }

    pub fn tally(mut self, stage: Stage) -> Self {
        self.tally = Some(stage);
        self
    }

    pub fn quorum(mut self, quorum: u32) -> Self {
        self.quorum = quorum;
        self
    }

    pub fn collateral(mut self, nano_wit: u64) -> Self {
        self.collateral = nano_wit;
        self
    }

    pub fn fees(mut self, nano_wit: u64) -> Self {
        self.fees = nano_wit;
        self
    }

    /// Schedule time in milliseconds since the epoch. Defaults to now.
    pub fn schedule(mut self, millis: u64) -> Self {
        self.schedule_time = Some(millis);
        self
    }

    /// Creation timestamp in seconds since the epoch. Defaults to now.
    pub fn timestamp(mut self, seconds: u64) -> Self {
        self.timestamp = Some(seconds);
        self
    }

    pub fn build(self) -> Result<DataRequest> {
        let aggregator = self
            .aggregator
            .ok_or_else(|| OracleError::config("data request needs an aggregator stage"))?;
        let tally = self
            .tally
            .ok_or_else(|| OracleError::config("data request needs a tally stage"))?;
        let now = Utc::now();
        let schedule_time = self
            .schedule_time
            .unwrap_or_else(|| now.timestamp_millis().max(0) as u64);
        let timestamp = self
            .timestamp
            .unwrap_or_else(|| now.timestamp().max(0) as u64);

        DataRequest::new_checked(
            self.sources,
            aggregator,
            tally,
            self.quorum,
            self.collateral,
            self.fees,
            schedule_time,
            timestamp,
        )
    }
}

/// ETH/USD price request: mean across sources, median across witnesses.
pub fn eth_usd_price_request() -> RequestBuilder {
    RequestBuilder::new()
        .add_source(ETH_USD_SOURCE)
        .aggregator(Stage::new(Reducer::AverageMean))
        .tally(Stage::new(Reducer::AverageMedian))
        .quorum(10)
        .collateral(1_000_000_000)
        .fees(1_000_000)
}
