use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::quantity::{cost::Cost, energy::KilowattHours, time::Hours};

/// Recommended contiguous charging window.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ChargingWindow {
    pub start_time: DateTime<Utc>,

    /// Start time plus the exact charging duration, not aligned to the hourly slots.
    pub end_time: DateTime<Utc>,

    pub total_cost: Cost,
    pub duration: Hours,
    pub energy_from_grid: KilowattHours,
}

/// Total charging cost when starting at the specified time.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CostCurvePoint {
    pub start_time: DateTime<Utc>,
    pub total_cost: Cost,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Analysis {
    pub optimal: ChargingWindow,

    /// One point for every feasible start time.
    pub cost_curve: Vec<CostCurvePoint>,

    /// Cost of the most expensive window minus the optimal cost.
    pub savings: Cost,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Failure {
    #[error("Target SoC must be higher than current SoC.")]
    InvalidTarget,

    #[error("Calculated charging duration is zero.")]
    ZeroDuration,

    #[error(
        "Not enough future price data available to complete the required {:.1} hour charge.",
        .duration.get()
    )]
    InsufficientData { duration: Hours, n_available: usize },

    #[error("An unexpected error occurred during analysis: {detail}")]
    Internal { detail: String },
}

impl Failure {
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal { detail: detail.into() }
    }
}
