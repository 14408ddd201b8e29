//! Quotes the WitnetOracle base fee (and randomize fee) at the current gas price.

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
    let selector = settings.base_fee_selector()?;
    let client = RpcClient::from_env()?;

    let gas_price = match settings.gas_price {
        Some(price) => price,
        None => client.gas_price().await?,
    };
    info!(%gas_price, overload = selector.signature(), "quoting oracle fees");

    let quote = FeeEstimator::new(&client)
        .quote(gas_price, &selector, true)
        .await?;
    let suggested = settings.margin.apply(quote.base_fee)?;

    println!("{}", serde_json::to_string_pretty(&quote)?);
    println!("suggested value ({} margin): {suggested} wei", settings.margin);
    Ok(())
}
