use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{prelude::*, quantity::rate::KilowattHourRate};

/// Hourly day-ahead price starting at the specified time.
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Constructor, Serialize, Deserialize)]
pub struct PricePoint {
    pub start_time: DateTime<Utc>,

    #[serde(rename = "price_eur_kwh")]
    pub price: KilowattHourRate,
}

/// Non-empty hourly price series with finite prices, strictly ascending by the start time.
///
/// Gaps are not checked: consecutive points are assumed to be one hour apart.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PricePoint>")]
pub struct PriceSeries(Vec<PricePoint>);

#[allow(clippy::len_without_is_empty)]
impl PriceSeries {
    pub fn try_from_points(points: Vec<PricePoint>) -> Result<Self> {
        ensure!(!points.is_empty(), "the price series is empty");
        ensure!(
            points.iter().tuple_windows().all(|(lhs, rhs)| lhs.start_time < rhs.start_time),
            "price points must be strictly ascending by start time",
        );
        if let Some(point) = points.iter().find(|point| !point.price.is_finite()) {
            bail!("the price at {} is not a finite number", point.start_time);
        }
        Ok(Self(points))
    }

    /// Sort the points and drop the duplicate start times, keeping the first one.
    pub fn try_from_unsorted(mut points: Vec<PricePoint>) -> Result<Self> {
        points.sort_by_key(|point| point.start_time);
        points.dedup_by_key(|point| point.start_time);
        Self::try_from_points(points)
    }

    /// Keep the points starting at or after `now`.
    ///
    /// Returns [`None`] if nothing is left.
    #[must_use]
    pub fn upcoming(&self, now: DateTime<Utc>) -> Option<Self> {
        let points =
            self.0.iter().copied().filter(|point| point.start_time >= now).collect_vec();
        if points.is_empty() { None } else { Some(Self(points)) }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[PricePoint] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &PricePoint> {
        self.0.iter()
    }

    pub fn mean_price(&self) -> KilowattHourRate {
        #[expect(clippy::cast_precision_loss)]
        let len = self.0.len() as f64;
        self.0.iter().map(|point| point.price).sum::<KilowattHourRate>() / len
    }
}

impl TryFrom<Vec<PricePoint>> for PriceSeries {
    type Error = Error;

    fn try_from(points: Vec<PricePoint>) -> Result<Self> {
        Self::try_from_points(points)
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a PricePoint;
    type IntoIter = std::slice::Iter<'a, PricePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
