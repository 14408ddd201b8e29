//! Quotes, margins and submits a Witnet request through VotingWithOracle.

use anyhow::Context;
use tracing::{info, warn};

use witnet_voting_client::chain::rpc::RpcClient;
use witnet_voting_client::chain::ChainClient;
use witnet_voting_client::config::OracleSettings;
use witnet_voting_client::services::{OracleSubmitter, SubmissionLedger};
use witnet_voting_client::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let settings = OracleSettings::from_env()?;
    let request_hash = settings.request_hash()?;
    settings.sla.check()?;
    let client = RpcClient::from_env()?;

    let mut submitter = OracleSubmitter::new(&client, settings.margin)
        .include_randomize_fee(settings.include_randomize_fee);
    if let Some(path) = &settings.ledger_file {
        submitter = submitter.with_ledger(SubmissionLedger::new(path));
    }
    submitter.ensure_not_submitted(&request_hash).await?;

    let sender = client
        .sender()
        .context("PRIVATE_KEY is required to submit a request")?;
    let balance = client.balance(sender).await?;
    info!(%sender, %balance, "submitting from account");
    if balance.is_zero() {
        warn!(%sender, "sender has no balance; the submission will fail");
    }

    let gas_price = match settings.gas_price {
        Some(price) => price,
        None => client.gas_price().await?,
    };

    let report = submitter.run(request_hash, settings.sla, gas_price).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
