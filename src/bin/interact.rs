//! Prints the candidate tally, casts a vote and prints the tally again.

use tracing::info;

use witnet_voting_client::chain::rpc::RpcClient;
use witnet_voting_client::chain::ChainClient;
use witnet_voting_client::config::VotingSettings;
use witnet_voting_client::services::VotingService;
use witnet_voting_client::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let voting = VotingSettings::from_env()?;
    let client = RpcClient::from_env()?;
    let service = VotingService::new(&client);

    print_tally(&service.tally(&voting.candidate_ids).await?);

    let gas_price = match voting.gas_price {
        Some(price) => price,
        None => client.gas_price().await?,
    };
    let receipt = service.cast_vote(voting.vote_for, gas_price).await?;
    info!(tx_hash = %receipt.tx_hash, block_number = receipt.block_number, "vote included");

    print_tally(&service.tally(&voting.candidate_ids).await?);
    Ok(())
}

fn print_tally(candidates: &[witnet_voting_client::chain::Candidate]) {
    for candidate in candidates {
        println!(
            "{:>4}  {:<24} {} votes",
            candidate.id, candidate.name, candidate.vote_count
        );
    }
}
