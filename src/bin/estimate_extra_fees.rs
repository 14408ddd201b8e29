//! Quotes the extra fee a given SLA adds on top of the base fee.

use tracing::info;

use witnet_voting_client::chain::rpc::RpcClient;
use witnet_voting_client::chain::ChainClient;
use witnet_voting_client::config::OracleSettings;
use witnet_voting_client::services::FeeEstimator;
use witnet_voting_client::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let settings = OracleSettings::from_env()?;
    let client = RpcClient::from_env()?;

    let gas_price = match settings.gas_price {
        Some(price) => price,
        None => client.gas_price().await?,
    };
    info!(
        %gas_price,
        wit_price = %settings.evm_wit_price,
        committee_size = settings.sla.committee_size,
        "quoting extra fee"
    );

    let extra_fee = FeeEstimator::new(&client)
        .estimate_extra_fee(gas_price, settings.evm_wit_price, &settings.sla)
        .await?;

    println!("extra fee: {extra_fee} wei");
    Ok(())
}
