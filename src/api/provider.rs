use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{core::price::PriceSeries, prelude::*};

#[async_trait]
pub trait PriceProvider: Sync {
    /// Human-readable name of the price source.
    fn name(&self) -> &'static str;

    /// Get the hourly prices starting at or after `now`, sorted by the start time.
    async fn get_upcoming_prices(&self, now: DateTime<Utc>) -> Result<PriceSeries>;
}
