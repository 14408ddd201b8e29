//! Witnet data request descriptor and its content hash.
//!
//! The canonical form of a [`DataRequest`] is its serde representation with
//! every object's keys sorted, printed without whitespace. Keys are sorted by
//! [`canonicalize`] itself, so the output does not depend on whether
//! serde_json's `preserve_order` feature is enabled anywhere in the build.
//! [`RequestHash`] is the Keccak-256 digest of those UTF-8 bytes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use alloy_primitives::{keccak256, B256};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::error::{OracleError, Result};

/// Minimum witness collateral accepted by the network: 1 WIT in nanoWit.
pub const COLLATERAL_FLOOR: u64 = 1_000_000_000;

/// Radon reducers, serialized as their numeric opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Reducer {
    Mode,
    AverageMean,
    AverageMeanWeighted,
    AverageMedian,
    AverageMedianWeighted,
    DeviationStandard,
    HashConcatenate,
}

impl From<Reducer> for u8 {
    fn from(reducer: Reducer) -> Self {
        match reducer {
            Reducer::Mode => 0x02,
            Reducer::AverageMean => 0x03,
            Reducer::AverageMeanWeighted => 0x04,
            Reducer::AverageMedian => 0x05,
            Reducer::AverageMedianWeighted => 0x06,
            Reducer::DeviationStandard => 0x07,
            Reducer::HashConcatenate => 0x0B,
        }
    }
}

impl TryFrom<u8> for Reducer {
    type Error = String;

    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        match code {
            0x02 => Ok(Self::Mode),
            0x03 => Ok(Self::AverageMean),
            0x04 => Ok(Self::AverageMeanWeighted),
            0x05 => Ok(Self::AverageMedian),
            0x06 => Ok(Self::AverageMedianWeighted),
            0x07 => Ok(Self::DeviationStandard),
            0x0B => Ok(Self::HashConcatenate),
            other => Err(format!("unknown reducer opcode {other:#04x}")),
        }
    }
}

/// Radon filter operators, serialized as their numeric opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum FilterOp {
    DeviationStandard,
    Mode,
}

impl From<FilterOp> for u8 {
    fn from(op: FilterOp) -> Self {
        match op {
            FilterOp::DeviationStandard => 0x05,
            FilterOp::Mode => 0x08,
        }
    }
}

impl TryFrom<u8> for FilterOp {
    type Error = String;

    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        match code {
            0x05 => Ok(Self::DeviationStandard),
            0x08 => Ok(Self::Mode),
            other => Err(format!("unknown filter opcode {other:#04x}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub op: FilterOp,
    #[serde(default)]
    pub args: Value,
}

/// Reducer plus filters, used for both the aggregation and tally stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub reducer: Reducer,
    #[serde(default)]
    pub filters: Vec<Filter>,
}

impl Stage {
    pub fn new(reducer: Reducer) -> Self {
        Self {
            reducer,
            filters: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }
}

/// Off-chain query descriptor. Only constructed through
/// [`RequestBuilder`](crate::services::request_builder::RequestBuilder) or
/// [`DataRequest::from_json`], both of which validate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DataRequest {
    #[validate(length(min = 1))]
    sources: Vec<String>,
    aggregator: Stage,
    tally: Stage,
    #[validate(range(min = 1))]
    quorum: u32,
    collateral: u64,
    fees: u64,
    schedule_time: u64,
    timestamp: u64,
}

impl DataRequest {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new_checked(
        sources: Vec<String>,
        aggregator: Stage,
        tally: Stage,
        quorum: u32,
        collateral: u64,
        fees: u64,
        schedule_time: u64,
        timestamp: u64,
    ) -> Result<Self> {
        let request = Self {
            sources,
            aggregator,
            tally,
            quorum,
            collateral,
            fees,
            schedule_time,
            timestamp,
        };
        request.check()?;
        Ok(request)
    }

    /// Parses a descriptor from JSON (any key order) and validates it.
    pub fn from_json(json: &str) -> Result<Self> {
        let request: Self = serde_json::from_str(json)
            .map_err(|e| OracleError::config(format!("invalid data request JSON: {e}")))?;
        request.check()?;
        Ok(request)
    }

    fn check(&self) -> Result<()> {
        if self.collateral < COLLATERAL_FLOOR {
            return Err(OracleError::config(format!(
                "collateral {} is below the network floor of {COLLATERAL_FLOOR} nanoWit",
                self.collateral
            )));
        }
        self.validate()?;
        for source in &self.sources {
            if !validator::validate_url(source.as_str()) {
                return Err(OracleError::config(format!("invalid source URL: {source}")));
            }
        }
        Ok(())
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn aggregator(&self) -> &Stage {
        &self.aggregator
    }

    pub fn tally(&self) -> &Stage {
        &self.tally
    }

    pub fn quorum(&self) -> u32 {
        self.quorum
    }

    pub fn collateral(&self) -> u64 {
        self.collateral
    }

    pub fn fees(&self) -> u64 {
        self.fees
    }

    pub fn schedule_time(&self) -> u64 {
        self.schedule_time
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn canonical_json(&self) -> Result<String> {
        let value = serde_json::to_value(self)
            .map_err(|e| OracleError::config(format!("cannot serialize data request: {e}")))?;
        serde_json::to_string(&canonicalize(value))
            .map_err(|e| OracleError::config(format!("cannot serialize data request: {e}")))
    }

    pub fn hash(&self) -> Result<RequestHash> {
        let canonical = self.canonical_json()?;
        Ok(RequestHash(keccak256(canonical.as_bytes()).0))
    }
}

/// Rebuilds every object with its keys in ascending byte order.
pub(crate) fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect();
            Value::Object(sorted.into_iter().collect::<Map<String, Value>>())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Keccak-256 digest of a canonical [`DataRequest`], written as `0x` + 64 hex chars.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestHash(pub [u8; 32]);

impl RequestHash {
    pub fn as_b256(&self) -> B256 {
        B256::from(self.0)
    }
}

impl fmt::Display for RequestHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for RequestHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestHash({self})")
    }
}

impl FromStr for RequestHash {
    type Err = OracleError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| OracleError::config(format!("request hash must start with 0x: {s}")))?;
        if digits.len() != 64 {
            return Err(OracleError::config(format!(
                "request hash must be 32 bytes, got {} hex chars",
                digits.len()
            )));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| OracleError::config(format!("invalid request hash {s}: {e}")))?;
        Ok(Self(bytes))
    }
}

impl Serialize for RequestHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RequestHash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
