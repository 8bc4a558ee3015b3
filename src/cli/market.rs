use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;

use crate::{
    api::awattar,
    market::{MarketData, Origin},
    prelude::*,
};

#[derive(Parser)]
pub struct MarketArgs {
    /// Do not fetch the live prices, use the last saved ones.
    #[clap(long, env = "OFFLINE")]
    pub offline: bool,

    /// Where the last successfully fetched prices are saved.
    #[clap(long = "cache-path", env = "PRICE_CACHE_PATH", default_value = "last_prices.toml")]
    pub cache_path: PathBuf,
}

impl MarketArgs {
    pub async fn load(&self) -> Result<MarketData> {
        let now = Utc::now();
        let market_data = if self.offline {
            MarketData::from_snapshot_file(&self.cache_path, now)?
        } else {
            let api = awattar::Api::try_new()?;
            MarketData::fetch_or_fallback(&api, &self.cache_path, now).await?
        };
        if let Origin::Cached { fetch_error: Some(_), .. } = &market_data.origin {
            warn!("{}", market_data.origin);
        } else {
            info!("{}", market_data.origin);
        }
        Ok(market_data)
    }
}
