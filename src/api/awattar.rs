//! [aWATTar](https://www.awattar.de/services/api) Germany day-ahead market data client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_with::{TimestampMilliSeconds, serde_as};

use crate::{
    api::{client, provider::PriceProvider},
    core::price::{PricePoint, PriceSeries},
    prelude::*,
    quantity::rate::KilowattHourRate,
};

pub struct Api(Client);

impl Api {
    const URL: &'static str = "https://api.awattar.de/v1/marketdata";

    pub fn try_new() -> Result<Self> {
        Ok(Self(client::try_new()?))
    }

    /// Get all the prices the API currently publishes, usually today and, after the day-ahead
    /// auction, tomorrow.
    #[instrument(skip_all)]
    pub async fn get_market_data(&self) -> Result<Vec<PricePoint>> {
        info!("fetching…");
        let response = self
            .0
            .get(Self::URL)
            .send()
            .await
            .context("network error")?
            .error_for_status()
            .context("request failed")?
            .json::<Response>()
            .await
            .context("failed to deserialize the response")?;
        info!(n_points = response.data.len(), "fetched");
        response.try_into_points()
    }
}

#[async_trait]
impl PriceProvider for Api {
    fn name(&self) -> &'static str {
        "aWATTar API"
    }

    async fn get_upcoming_prices(&self, now: DateTime<Utc>) -> Result<PriceSeries> {
        PriceSeries::try_from_unsorted(self.get_market_data().await?)?
            .upcoming(now)
            .context("No future price data available.")
    }
}

#[derive(Deserialize)]
struct Response {
    data: Vec<MarketPrice>,
}

impl Response {
    fn try_into_points(self) -> Result<Vec<PricePoint>> {
        ensure!(!self.data.is_empty(), "API returned no data.");
        self.data.into_iter().map(MarketPrice::try_into_point).collect()
    }
}

#[serde_as]
#[derive(Deserialize)]
struct MarketPrice {
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    start_timestamp: DateTime<Utc>,

    /// Wholesale price in [`MarketPrice::unit`].
    #[serde(rename = "marketprice")]
    market_price: f64,

    unit: String,
}

impl MarketPrice {
    fn try_into_point(self) -> Result<PricePoint> {
        ensure!(self.unit.eq_ignore_ascii_case("Eur/MWh"), "unexpected price unit: `{}`", self.unit);
        Ok(PricePoint::new(
            self.start_timestamp,
            KilowattHourRate::from_megawatt_hour_rate(self.market_price),
        ))
    }
}
