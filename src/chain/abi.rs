//! Solidity bindings for the contracts the scripts call.
//!
//! `estimateBaseFee` is overloaded on chain; the generated call types are
//! `estimateBaseFee_0Call` (result size) and `estimateBaseFee_1Call` (RAD hash).

use alloy_sol_types::sol;

use crate::models::Sla;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct RadonSLA {
        uint8 committeeSize;
        uint64 witnessingFeeNanoWit;
    }

    interface IWitnetOracle {
        function estimateBaseFee(uint256 gasPrice, uint16 resultMaxSize) external view returns (uint256);
        function estimateBaseFee(uint256 gasPrice, bytes32 radHash) external view returns (uint256);
        function estimateRandomizeFee(uint256 gasPrice) external view returns (uint256);
        function estimateExtraFee(uint256 gasPrice, uint256 evmWitPrice, RadonSLA calldata sla) external view returns (uint256);
    }

    interface IVotingWithOracle {
        function submitOracleRequest(bytes32 witnetRequestHash, RadonSLA calldata sla) external payable;
        function candidates(uint256 candidateId) external view returns (uint256 id, string name, uint256 voteCount);
        function vote(uint256 candidateId) external;
    }
}

impl From<&Sla> for RadonSLA {
    fn from(sla: &Sla) -> Self {
        Self {
            committeeSize: sla.committee_size,
            witnessingFeeNanoWit: sla.witnessing_fee_nano_wit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{keccak256, U256};
    use alloy_sol_types::SolCall;

    fn selector_of(signature: &str) -> [u8; 4] {
        let digest = keccak256(signature.as_bytes());
        [digest[0], digest[1], digest[2], digest[3]]
    }

    #[test]
    fn overloads_have_distinct_selectors() {
        assert_eq!(
            IWitnetOracle::estimateBaseFee_0Call::SELECTOR,
            selector_of("estimateBaseFee(uint256,uint16)")
        );
        assert_eq!(
            IWitnetOracle::estimateBaseFee_1Call::SELECTOR,
            selector_of("estimateBaseFee(uint256,bytes32)")
        );
        assert_eq!(
            IWitnetOracle::estimateExtraFeeCall::SELECTOR,
            selector_of("estimateExtraFee(uint256,uint256,(uint8,uint64))")
        );
        assert_eq!(
            IVotingWithOracle::submitOracleRequestCall::SELECTOR,
            selector_of("submitOracleRequest(bytes32,(uint8,uint64))")
        );
    }

    #[test]
    fn sla_is_encoded_as_a_static_tuple() {
        let sla = Sla::new(2, 2).unwrap();
        let call = IWitnetOracle::estimateExtraFeeCall {
            gasPrice: U256::from(1_000_000_000u64),
            evmWitPrice: U256::from(1_000_000_000u64),
            sla: RadonSLA::from(&sla),
        };
        let encoded = call.abi_encode();
        // selector + four static words
        assert_eq!(encoded.len(), 4 + 4 * 32);
        assert_eq!(encoded[4 + 3 * 32 - 1], 2);
        assert_eq!(encoded[4 + 4 * 32 - 1], 2);
    }
}
