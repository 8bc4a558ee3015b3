use std::{
    fmt::{Debug, Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Percentage within `0..=100`, for example, a state of charge.
#[derive(Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize, derive_more::Sub)]
#[serde(transparent)]
pub struct Percentage(pub f64);

impl Percentage {
    /// Convert the percentage into `0.0..=1.0`.
    #[must_use]
    pub const fn to_ratio(self) -> f64 {
        self.0 / 100.0
    }
}

impl FromStr for Percentage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value = f64::from_str(s.trim().trim_end_matches('%')).context("not a number")?;
        ensure!((0.0..=100.0).contains(&value), "{value} is not within 0..=100");
        Ok(Self(value))
    }
}

impl Display for Percentage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Debug for Percentage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
