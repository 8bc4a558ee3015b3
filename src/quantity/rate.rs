use std::{
    fmt::{Debug, Display, Formatter},
    ops::Mul,
};

use crate::quantity::{Quantity, cost::Cost, energy::KilowattHours};

/// Euro per kilowatt-hour.
pub type KilowattHourRate = Quantity<-1, -1, 1>;

impl KilowattHourRate {
    /// Convert a wholesale market price in euro per megawatt-hour.
    pub fn from_megawatt_hour_rate(euro_per_megawatt_hour: f64) -> Self {
        Self::new(euro_per_megawatt_hour / 1000.0)
    }
}

impl Display for KilowattHourRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} €/kWh", self.0)
    }
}

impl Debug for KilowattHourRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}€/kWh", self.0)
    }
}

impl Mul<KilowattHours> for KilowattHourRate {
    type Output = Cost;

    fn mul(self, rhs: KilowattHours) -> Self::Output {
        Quantity(self.0 * rhs.0)
    }
}
