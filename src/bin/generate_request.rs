//! Builds the ETH/USD price request and prints its canonical form and hash.
//!
//! Set `REQUEST_FILE` to hash a request described in a JSON file instead.

use anyhow::Context;
use tracing::info;

use witnet_voting_client::config::RequestSettings;
use witnet_voting_client::models::DataRequest;
use witnet_voting_client::services::eth_usd_price_request;
use witnet_voting_client::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let settings = RequestSettings::from_env()?;
    let request = match &settings.request_file {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("cannot read request file {}", path.display()))?;
            info!(path = %path.display(), "loaded data request");
            DataRequest::from_json(&json)?
        }
        None => eth_usd_price_request().build()?,
    };

    let canonical = request.canonical_json()?;
    let hash = request.hash()?;
    info!(
        sources = request.sources().len(),
        quorum = request.quorum(),
        %hash,
        "data request ready"
    );

    println!("{canonical}");
    println!("WITNET_REQUEST_HASH={hash}");
    Ok(())
}
