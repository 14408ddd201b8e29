//! Reads and votes on the VotingWithOracle contract.

use alloy_primitives::U256;
use tracing::{error, info};

use crate::chain::{Candidate, Receipt, TxOptions, VotingChain};
use crate::error::{OracleError, Result};

pub struct VotingService<'a, C: ?Sized> {
    chain: &'a C,
}

impl<'a, C: VotingChain + ?Sized> VotingService<'a, C> {
    pub fn new(chain: &'a C) -> Self {
        Self { chain }
    }

    /// Current standing of the given candidates, in the order asked for.
    pub async fn tally(&self, ids: &[U256]) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::with_capacity(ids.len());
        for id in ids {
            let candidate = self.chain.candidate(*id).await?;
            info!(
                id = %candidate.id,
                name = %candidate.name,
                votes = %candidate.vote_count,
                "candidate"
            );
            candidates.push(candidate);
        }
        Ok(candidates)
    }

    pub async fn cast_vote(&self, id: U256, gas_price: U256) -> Result<Receipt> {
        let result = async {
            let tx_hash = self
                .chain
                .vote(id, TxOptions::at_gas_price(gas_price))
                .await?;
            info!(candidate = %id, %tx_hash, "vote sent");

            let receipt = self.chain.wait_for_receipt(tx_hash).await?;
            if !receipt.success {
                return Err(OracleError::reverted_in_block(receipt.tx_hash, receipt.block_number));
            }
            Ok(receipt)
        }
        .await;

        match &result {
            Ok(receipt) => info!(
                candidate = %id,
                block_number = receipt.block_number,
                gas_used = receipt.gas_used,
                "vote confirmed"
            ),
            Err(err) => error!(candidate = %id, %gas_price, error = %err, "vote failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::mock::{self, Call, MockChain};

    fn candidate(id: u64, name: &str, votes: u64) -> Candidate {
        Candidate {
            id: U256::from(id),
            name: name.to_string(),
            vote_count: U256::from(votes),
        }
    }

    #[tokio::test]
    async fn tally_keeps_requested_order() {
        let chain = MockChain {
            candidates: vec![candidate(1, "Alice", 3), candidate(2, "Bob", 5)],
            ..MockChain::default()
        };
        let tally = VotingService::new(&chain)
            .tally(&[U256::from(2u64), U256::from(1u64)])
            .await
            .unwrap();
        assert_eq!(tally, vec![candidate(2, "Bob", 5), candidate(1, "Alice", 3)]);
    }

    #[tokio::test]
    async fn tally_fails_on_unknown_candidate() {
        let chain = MockChain {
            candidates: vec![candidate(1, "Alice", 3)],
            ..MockChain::default()
        };
        let err = VotingService::new(&chain)
            .tally(&[U256::from(1u64), U256::from(9u64)])
            .await
            .unwrap_err();
        assert!(matches!(err, OracleError::Revert { tx_hash: None, .. }));
    }

    #[tokio::test]
    async fn vote_waits_for_receipt() {
        let chain = MockChain::default();
        let gas_price = U256::from(2_000_000_000u64);
        let receipt = VotingService::new(&chain)
            .cast_vote(U256::from(1u64), gas_price)
            .await
            .unwrap();

        assert_eq!(receipt.block_number, 42);
        assert_eq!(
            chain.calls(),
            vec![
                Call::Vote(U256::from(1u64), TxOptions::at_gas_price(gas_price)),
                Call::Receipt(mock::tx_hash()),
            ]
        );
    }

    #[tokio::test]
    async fn reverted_vote_is_an_error() {
        let chain = MockChain {
            revert_submission: true,
            ..MockChain::default()
        };
        let err = VotingService::new(&chain)
            .cast_vote(U256::from(1u64), U256::from(1u64))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OracleError::Revert {
                block_number: Some(42),
                ..
            }
        ));
    }
}
