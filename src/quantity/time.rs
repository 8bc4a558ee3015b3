use std::fmt::{Debug, Display, Formatter};

use chrono::TimeDelta;

use crate::quantity::Quantity;

pub type Hours = Quantity<0, 1, 0>;

impl Hours {
    pub const ONE: Self = Self::new(1.0);

    /// Convert into a [`TimeDelta`] rounded to the millisecond.
    ///
    /// Returns [`None`] for non-finite or out-of-range values.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn to_time_delta(self) -> Option<TimeDelta> {
        let milliseconds = (self.get() * 3_600_000.0).round();
        if !milliseconds.is_finite() || milliseconds.abs() > i64::MAX as f64 {
            return None;
        }
        #[expect(clippy::cast_possible_truncation)]
        let milliseconds = milliseconds as i64;
        TimeDelta::try_milliseconds(milliseconds)
    }

    /// Number of whole hourly slots needed to cover the duration.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn n_slots(self) -> Option<usize> {
        let slots = self.get().ceil();
        if !slots.is_finite() || slots < 0.0 || slots > usize::MAX as f64 {
            return None;
        }
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let slots = slots as usize;
        Some(slots)
    }
}

impl Display for Hours {
    /// Format as whole hours and minutes, for example: `2h 30m`.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let total_minutes = (self.get() * 60.0).round();
        #[expect(clippy::cast_possible_truncation)]
        let total_minutes = total_minutes as i64;
        write!(f, "{}h {}m", total_minutes / 60, total_minutes % 60)
    }
}

impl Debug for Hours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}h", self.0)
    }
}
