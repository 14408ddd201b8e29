use std::path::PathBuf;

use alloy_primitives::U256;

use crate::config::{optional, parsed, Vars};
use crate::error::{OracleError, Result};
use crate::models::{BaseFeeSelector, FeeMargin, RequestHash, Sla};

const ONE_GWEI: u64 = 1_000_000_000;

/// Settings for the fee estimation and submission scripts.
#[derive(Clone, Debug)]
pub struct OracleSettings {
    pub sla: Sla,
    pub margin: FeeMargin,
    pub include_randomize_fee: bool,
    /// Fixed gas price in wei; queried from the node when unset.
    pub gas_price: Option<U256>,
    pub evm_wit_price: U256,
    pub request_hash: Option<RequestHash>,
    pub result_max_size: Option<u16>,
    pub base_fee_selector: Option<String>,
    pub ledger_file: Option<PathBuf>,
}

impl OracleSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(&super::process_env)
    }

    pub fn from_vars(vars: Vars<'_>) -> Result<Self> {
        let committee_size = parsed::<u8>(vars, "SLA_COMMITTEE_SIZE")?.unwrap_or(2);
        let witnessing_fee = parsed::<u64>(vars, "SLA_WITNESSING_FEE_NANOWIT")?.unwrap_or(2);

        Ok(Self {
            sla: Sla::new(committee_size, witnessing_fee)?,
            margin: parsed(vars, "FEE_MARGIN")?.unwrap_or_default(),
            include_randomize_fee: parsed(vars, "INCLUDE_RANDOMIZE_FEE")?.unwrap_or(false),
            gas_price: parsed(vars, "GAS_PRICE_WEI")?,
            evm_wit_price: parsed(vars, "EVM_WIT_PRICE_WEI")?
                .unwrap_or(U256::from(ONE_GWEI)),
            request_hash: parsed(vars, "WITNET_REQUEST_HASH")?,
            result_max_size: parsed(vars, "RESULT_MAX_SIZE")?,
            base_fee_selector: optional(vars, "BASE_FEE_SELECTOR"),
            ledger_file: optional(vars, "SUBMISSION_LEDGER_FILE").map(PathBuf::from),
        })
    }

    pub fn base_fee_selector(&self) -> Result<BaseFeeSelector> {
        BaseFeeSelector::resolve(
            self.base_fee_selector.as_deref(),
            self.result_max_size,
            self.request_hash,
        )
    }

    pub fn request_hash(&self) -> Result<RequestHash> {
        self.request_hash
            .ok_or_else(|| OracleError::config("missing WITNET_REQUEST_HASH"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::fixed_vars;

    const HASH: &str = "0xe81deeee02078e907c465ac88c2e133b0e34940144aa4cea09c37297d8f3ea57";

    #[test]
    fn defaults_match_the_minimal_sla() {
        let settings = OracleSettings::from_vars(&fixed_vars(&[])).unwrap();
        assert_eq!(settings.sla, Sla::new(2, 2).unwrap());
        assert_eq!(settings.margin, FeeMargin::DEFAULT);
        assert_eq!(settings.evm_wit_price, U256::from(ONE_GWEI));
        assert!(settings.gas_price.is_none());
        assert!(!settings.include_randomize_fee);
    }

    #[test]
    fn out_of_range_committee_is_a_configuration_error() {
        let vars = fixed_vars(&[("SLA_COMMITTEE_SIZE", "128")]);
        assert!(matches!(
            OracleSettings::from_vars(&vars),
            Err(OracleError::Configuration(_))
        ));
        let vars = fixed_vars(&[("SLA_COMMITTEE_SIZE", "0")]);
        assert!(matches!(
            OracleSettings::from_vars(&vars),
            Err(OracleError::Configuration(_))
        ));
    }

    #[test]
    fn both_disambiguators_without_selector_is_ambiguous() {
        let vars = fixed_vars(&[("WITNET_REQUEST_HASH", HASH), ("RESULT_MAX_SIZE", "100")]);
        let settings = OracleSettings::from_vars(&vars).unwrap();
        assert!(matches!(
            settings.base_fee_selector(),
            Err(OracleError::AmbiguousCall(_))
        ));

        let vars = fixed_vars(&[
            ("WITNET_REQUEST_HASH", HASH),
            ("RESULT_MAX_SIZE", "100"),
            ("BASE_FEE_SELECTOR", "request-hash"),
        ]);
        let settings = OracleSettings::from_vars(&vars).unwrap();
        assert_eq!(
            settings.base_fee_selector().unwrap(),
            BaseFeeSelector::ByRequestHash(HASH.parse().unwrap())
        );
    }

    #[test]
    fn reads_margin_and_gas_price() {
        let vars = fixed_vars(&[("FEE_MARGIN", "1.5"), ("GAS_PRICE_WEI", "1000000000")]);
        let settings = OracleSettings::from_vars(&vars).unwrap();
        assert_eq!(settings.margin, FeeMargin::new(15, 10).unwrap());
        assert_eq!(settings.gas_price, Some(U256::from(ONE_GWEI)));
    }
}
