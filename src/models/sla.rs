use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{OracleError, Result};
use crate::models::request::RequestHash;

/// Witnessing service level agreement attached to an oracle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Sla {
    #[validate(range(min = 1, max = 127))]
    pub committee_size: u8,
    #[validate(range(min = 1))]
    pub witnessing_fee_nano_wit: u64,
}

impl Sla {
    pub fn new(committee_size: u8, witnessing_fee_nano_wit: u64) -> Result<Self> {
        let sla = Self {
            committee_size,
            witnessing_fee_nano_wit,
        };
        sla.check()?;
        Ok(sla)
    }

    pub fn check(&self) -> Result<()> {
        self.validate().map_err(|e| {
            OracleError::config(format!(
                "invalid SLA (committee size {}, witnessing fee {}): {e}",
                self.committee_size, self.witnessing_fee_nano_wit
            ))
        })
    }
}

/// Picks which `estimateBaseFee` overload to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseFeeSelector {
    /// `estimateBaseFee(uint256,uint16)`
    ByResultSize(u16),
    /// `estimateBaseFee(uint256,bytes32)`
    ByRequestHash(RequestHash),
}

impl BaseFeeSelector {
    /// Resolves the overload from configuration. An explicit `choice` always wins;
    /// without one, exactly one disambiguator must be available.
    pub fn resolve(
        choice: Option<&str>,
        result_max_size: Option<u16>,
        request_hash: Option<RequestHash>,
    ) -> Result<Self> {
        match choice.map(str::trim) {
            Some("result-size") => result_max_size
                .map(Self::ByResultSize)
                .ok_or_else(|| OracleError::config("result-size selector requires RESULT_MAX_SIZE")),
            Some("request-hash") => request_hash
                .map(Self::ByRequestHash)
                .ok_or_else(|| {
                    OracleError::config("request-hash selector requires WITNET_REQUEST_HASH")
                }),
            Some(other) => Err(OracleError::config(format!(
                "unknown base fee selector {other:?}, expected result-size or request-hash"
            ))),
            None => match (result_max_size, request_hash) {
                (Some(size), None) => Ok(Self::ByResultSize(size)),
                (None, Some(hash)) => Ok(Self::ByRequestHash(hash)),
                (Some(_), Some(_)) => Err(OracleError::AmbiguousCall(
                    "estimateBaseFee matches both (uint256,uint16) and (uint256,bytes32); \
                     set BASE_FEE_SELECTOR"
                        .to_string(),
                )),
                (None, None) => Err(OracleError::config(
                    "estimateBaseFee needs RESULT_MAX_SIZE or WITNET_REQUEST_HASH",
                )),
            },
        }
    }

    pub fn signature(&self) -> &'static str {
        match self {
            Self::ByResultSize(_) => "estimateBaseFee(uint256,uint16)",
            Self::ByRequestHash(_) => "estimateBaseFee(uint256,bytes32)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeQuote {
    pub gas_price: U256,
    pub base_fee: U256,
    pub randomize_fee: Option<U256>,
}

/// Safety multiplier applied to a quoted base fee, kept as an exact ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeMargin {
    numerator: u64,
    denominator: u64,
}

impl FeeMargin {
    pub const DEFAULT: Self = Self {
        numerator: 125,
        denominator: 100,
    };

    pub fn new(numerator: u64, denominator: u64) -> Result<Self> {
        if denominator == 0 {
            return Err(OracleError::config("fee margin denominator must be non-zero"));
        }
        if numerator < denominator {
            return Err(OracleError::config(format!(
                "fee margin {numerator}/{denominator} is below 1"
            )));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// `floor(fee * numerator / denominator)`
    pub fn apply(&self, fee: U256) -> Result<U256> {
        let scaled = fee
            .checked_mul(U256::from(self.numerator))
            .ok_or_else(|| OracleError::config(format!("fee {fee} overflows with margin {self}")))?;
        Ok(scaled / U256::from(self.denominator))
    }
}

impl Default for FeeMargin {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for FeeMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl FromStr for FeeMargin {
    type Err = OracleError;

    /// Accepts decimal factors such as `1.25` or `2`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || OracleError::config(format!("invalid fee margin {s:?}"));
        let (whole, fraction) = s.trim().split_once('.').unwrap_or((s.trim(), ""));
        let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || fraction.len() > 9 || !digits_only(whole) || !digits_only(fraction) {
            return Err(invalid());
        }
        let denominator = 10u64.pow(fraction.len() as u32);
        let whole: u64 = whole.parse().map_err(|_| invalid())?;
        let fraction: u64 = if fraction.is_empty() {
            0
        } else {
            fraction.parse().map_err(|_| invalid())?
        };
        let numerator = whole
            .checked_mul(denominator)
            .and_then(|n| n.checked_add(fraction))
            .ok_or_else(invalid)?;
        Self::new(numerator, denominator)
    }
}
