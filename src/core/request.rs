use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::quantity::{
    energy::KilowattHours,
    percentage::Percentage,
    power::Kilowatts,
    time::Hours,
};

/// Vehicle charging parameters.
///
/// The ranges are validated by the caller; the optimizer only re-checks the target ordering
/// and the derived quantities.
#[derive(Copy, Clone, Debug, Builder, Serialize, Deserialize)]
pub struct ChargeRequest {
    /// Usable battery capacity.
    pub capacity: KilowattHours,

    /// Current state of charge.
    pub soc_current: Percentage,

    /// Requested state of charge at the end of the charging window.
    pub soc_target: Percentage,

    /// Maximum charging power drawn from the grid.
    pub max_power: Kilowatts,

    /// Share of the grid energy which ends up in the battery.
    #[builder(default = Percentage(90.0))]
    pub efficiency: Percentage,

    #[builder(default)]
    #[serde(default)]
    pub cost_model: CostModel,
}

impl ChargeRequest {
    /// Energy to be stored in the battery.
    pub fn energy_to_add(&self) -> KilowattHours {
        self.capacity * (self.soc_target - self.soc_current).to_ratio()
    }

    /// Energy to be drawn from the grid, including the charging losses.
    pub fn energy_from_grid(&self) -> KilowattHours {
        self.energy_to_add() / self.efficiency.to_ratio()
    }

    /// Charging time at the maximum power.
    pub fn duration(&self) -> Hours {
        self.energy_from_grid() / self.max_power
    }
}

/// How a window cost is derived from the hourly prices.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    clap::ValueEnum,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum CostModel {
    /// Mean price over all the covering hourly slots times the total grid energy.
    ///
    /// Over- or understates the cost when the charge ends in the middle of a slot.
    #[default]
    #[display("covering average")]
    CoveringAverage,

    /// Full power in the whole slots, and only the remaining energy in the last slot.
    #[display("pro rata")]
    ProRata,
}
