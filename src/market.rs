use std::{
    fmt::{Display, Formatter},
    path::Path,
};

use chrono::{DateTime, Local, Utc};

use crate::{api::provider::PriceProvider, cache::Snapshot, core::price::PriceSeries, prelude::*};

/// Upcoming prices together with where they came from.
pub struct MarketData {
    pub prices: PriceSeries,
    pub origin: Origin,
}

pub enum Origin {
    Live { source: &'static str, fetched_at: DateTime<Utc> },

    /// The snapshot was used, either on request or because the live fetch failed.
    Cached { fetched_at: DateTime<Utc>, fetch_error: Option<String> },
}

impl MarketData {
    /// Fetch the live prices and update the snapshot, or fall back to the snapshot.
    #[instrument(skip_all, fields(provider = provider.name()))]
    pub async fn fetch_or_fallback(
        provider: &dyn PriceProvider,
        snapshot_path: &Path,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        match provider.get_upcoming_prices(now).await {
            Ok(prices) => {
                info!(len = prices.len(), "fetched the upcoming prices");
                let snapshot = Snapshot { fetched_at: now, prices };
                if let Err(error) = snapshot.write_to(snapshot_path) {
                    warn!("failed to save the snapshot: {error:#}");
                }
                Ok(Self {
                    prices: snapshot.prices,
                    origin: Origin::Live { source: provider.name(), fetched_at: now },
                })
            }
            Err(error) => {
                let error = format!("{error:#}");
                warn!(%error, "fetch failed, falling back to the snapshot…");
                let snapshot = Snapshot::read_from(snapshot_path).unwrap_or_else(|error| {
                    warn!("ignoring the unreadable snapshot: {error:#}");
                    None
                });
                let Some(snapshot) = snapshot else {
                    bail!("Fetch failed: {error}. No cached data is available.");
                };
                Self::from_snapshot(snapshot, now, Some(error))
            }
        }
    }

    /// Use the snapshot without trying the live prices.
    #[instrument(skip_all)]
    pub fn from_snapshot_file(snapshot_path: &Path, now: DateTime<Utc>) -> Result<Self> {
        let snapshot = Snapshot::read_from(snapshot_path)?
            .context("No market data loaded. Run without `--offline` to fetch the latest prices.")?;
        Self::from_snapshot(snapshot, now, None)
    }

    /// A stale snapshot may still hold past hours, those are dropped.
    fn from_snapshot(
        snapshot: Snapshot,
        now: DateTime<Utc>,
        fetch_error: Option<String>,
    ) -> Result<Self> {
        let prices = snapshot.prices.upcoming(now).with_context(|| {
            format!(
                "the cached data from {} holds no upcoming prices",
                snapshot.fetched_at.with_timezone(&Local).format(TIMESTAMP_FORMAT),
            )
        })?;
        info!(len = prices.len(), %snapshot.fetched_at, "using the cached prices");
        Ok(Self { prices, origin: Origin::Cached { fetched_at: snapshot.fetched_at, fetch_error } })
    }
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

impl Display for Origin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live { source, fetched_at } => write!(
                f,
                "Successfully fetched latest prices. Source: {source}. Last updated: {}",
                fetched_at.with_timezone(&Local).format(TIMESTAMP_FORMAT),
            ),
            Self::Cached { fetched_at, fetch_error: None } => write!(
                f,
                "Displaying cached data from {}.",
                fetched_at.with_timezone(&Local).format(TIMESTAMP_FORMAT),
            ),
            Self::Cached { fetched_at, fetch_error: Some(error) } => write!(
                f,
                "Fetch failed: {error}. Displaying last known data from {}.",
                fetched_at.with_timezone(&Local).format(TIMESTAMP_FORMAT),
            ),
        }
    }
}
