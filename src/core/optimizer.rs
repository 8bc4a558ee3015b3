use crate::{
    core::{
        analysis::{Analysis, ChargingWindow, CostCurvePoint, Failure},
        price::PriceSeries,
        request::{ChargeRequest, CostModel},
        window::rolling_sums,
    },
    prelude::*,
    quantity::{
        Quantity,
        cost::Cost,
        energy::KilowattHours,
        power::Kilowatts,
        rate::KilowattHourRate,
        time::Hours,
    },
};

/// Find the cheapest contiguous charging window.
///
/// Every feasible start time is scored with a rolling sum over the hourly prices, so the whole
/// search is linear in the series length. Ties resolve to the earliest start, for both the
/// cheapest and the most expensive window.
///
/// Never panics: all the numeric faults are reported as [`Failure::Internal`].
#[instrument(skip_all, fields(n_prices = series.len(), cost_model = %request.cost_model))]
pub fn optimize(series: &PriceSeries, request: &ChargeRequest) -> Result<Analysis, Failure> {
    if request.soc_target <= request.soc_current {
        return Err(Failure::InvalidTarget);
    }
    let energy_to_add = ensure_finite("energy to add", request.energy_to_add())?;
    if energy_to_add <= KilowattHours::ZERO {
        return Err(Failure::InvalidTarget);
    }
    let energy_from_grid = ensure_finite("energy from the grid", request.energy_from_grid())?;
    let duration = ensure_finite("charging duration", request.duration())?;
    if duration <= Hours::ZERO {
        return Err(Failure::ZeroDuration);
    }

    let n_slots = duration
        .n_slots()
        .ok_or_else(|| Failure::internal(format!("{duration:?} does not fit into hourly slots")))?;
    if n_slots == 0 {
        return Err(Failure::ZeroDuration);
    }
    if series.len() < n_slots {
        return Err(Failure::InsufficientData { duration, n_available: series.len() });
    }
    let time_delta = duration
        .to_time_delta()
        .ok_or_else(|| Failure::internal(format!("{duration:?} is out of the time range")))?;
    debug!(?energy_from_grid, ?duration, n_slots, "scoring the windows…");

    let windows = Windows::builder()
        .model(request.cost_model)
        .n_slots(n_slots)
        .duration(duration)
        .energy_from_grid(energy_from_grid)
        .max_power(request.max_power)
        .build();
    let prices = series.iter().map(|point| point.price.get()).collect::<Vec<_>>();
    let scores = windows.scores(&prices);
    if let Some(index) = scores.iter().position(|score| !score.is_finite()) {
        return Err(Failure::internal(format!(
            "window score at {} is not a finite number, check the price data",
            series.as_slice()[index].start_time,
        )));
    }
    let (best_index, worst_index) = extremes(&scores)
        .ok_or_else(|| Failure::internal("no feasible window in a non-empty price series"))?;

    let cost_curve = series
        .iter()
        .zip(&scores)
        .map(|(point, score)| CostCurvePoint {
            start_time: point.start_time,
            total_cost: windows.cost(*score),
        })
        .collect::<Vec<_>>();
    let best = cost_curve[best_index];
    let worst = cost_curve[worst_index];
    if !best.total_cost.is_finite() || !worst.total_cost.is_finite() {
        return Err(Failure::internal("window cost is not a finite number, check the price data"));
    }

    let end_time = best
        .start_time
        .checked_add_signed(time_delta)
        .ok_or_else(|| Failure::internal("charging end time is out of the time range"))?;
    let optimal = ChargingWindow {
        start_time: best.start_time,
        end_time,
        total_cost: best.total_cost,
        duration,
        energy_from_grid,
    };
    let savings = worst.total_cost - best.total_cost;
    info!(
        start_time = %optimal.start_time,
        total_cost = %optimal.total_cost,
        savings = %savings,
        "found the cheapest window",
    );

    Ok(Analysis { optimal, cost_curve, savings })
}

fn ensure_finite<const POWER: isize, const TIME: isize, const COST: isize>(
    what: &str,
    quantity: Quantity<POWER, TIME, COST>,
) -> Result<Quantity<POWER, TIME, COST>, Failure> {
    if quantity.is_finite() {
        Ok(quantity)
    } else {
        Err(Failure::internal(format!("{what} is not a finite number")))
    }
}

/// Indices of the lowest and the highest score, the earliest one on ties.
///
/// `NaN` scores never win a comparison.
fn extremes(scores: &[f64]) -> Option<(usize, usize)> {
    let (first, rest) = scores.split_first()?;
    let (mut best, mut worst) = ((0, *first), (0, *first));
    for (index, score) in (1..).zip(rest.iter().copied()) {
        if score < best.1 {
            best = (index, score);
        }
        if score > worst.1 {
            worst = (index, score);
        }
    }
    Some((best.0, worst.0))
}

#[derive(bon::Builder)]
struct Windows {
    model: CostModel,
    n_slots: usize,
    duration: Hours,
    energy_from_grid: KilowattHours,
    max_power: Kilowatts,
}

impl Windows {
    /// Score every feasible start, the lower the cheaper.
    fn scores(&self, prices: &[f64]) -> Vec<f64> {
        match self.model {
            CostModel::CoveringAverage => rolling_sums(prices, self.n_slots),

            CostModel::ProRata => {
                // The last slot is only partially used:
                #[expect(clippy::cast_precision_loss)]
                let last_fraction = (self.duration - Hours::ONE * (self.n_slots - 1) as f64).get();
                rolling_sums(prices, self.n_slots - 1)
                    .into_iter()
                    .zip(&prices[self.n_slots - 1..])
                    .map(|(full_slots, last_slot)| last_fraction.mul_add(*last_slot, full_slots))
                    .collect()
            }
        }
    }

    /// Convert the score into the total charging cost.
    fn cost(&self, score: f64) -> Cost {
        match self.model {
            CostModel::CoveringAverage => {
                #[expect(clippy::cast_precision_loss)]
                let mean_price = KilowattHourRate::from(score / self.n_slots as f64);
                mean_price * self.energy_from_grid
            }
            CostModel::ProRata => KilowattHourRate::from(score) * (self.max_power * Hours::ONE),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::TimeDelta;

    use super::*;
    use crate::{core::price::tests::hourly_series, quantity::percentage::Percentage};

    /// Exactly 20 kWh from the grid at 10 kW, that is, two hours.
    fn two_hour_request() -> ChargeRequest {
        ChargeRequest::builder()
            .capacity(KilowattHours::from(40.0))
            .soc_current(Percentage(0.0))
            .soc_target(Percentage(50.0))
            .max_power(Kilowatts::from(10.0))
            .efficiency(Percentage(100.0))
            .build()
    }

    /// 25 kWh from the grid at 10 kW, that is, two and a half hours.
    fn fractional_request(cost_model: CostModel) -> ChargeRequest {
        ChargeRequest::builder()
            .capacity(KilowattHours::from(50.0))
            .soc_current(Percentage(0.0))
            .soc_target(Percentage(50.0))
            .max_power(Kilowatts::from(10.0))
            .efficiency(Percentage(100.0))
            .cost_model(cost_model)
            .build()
    }

    /// Deterministic pseudo-random prices within `0.0..1.0`.
    fn noisy_prices(n: usize) -> Vec<f64> {
        let mut state: u64 = 42;
        (0..n)
            .map(|_| {
                state = state
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                #[expect(clippy::cast_precision_loss)]
                let price = ((state >> 33) % 1000) as f64 / 1000.0;
                price
            })
            .collect()
    }

    #[test]
    fn test_cheapest_window() -> Result<(), Failure> {
        let series = hourly_series(&[0.30, 0.10, 0.10, 0.40]);
        let analysis = optimize(&series, &two_hour_request())?;

        let start_time = series.as_slice()[1].start_time;
        assert_eq!(analysis.optimal.start_time, start_time);
        assert_eq!(analysis.optimal.end_time, start_time + TimeDelta::hours(2));
        assert_abs_diff_eq!(analysis.optimal.duration.get(), 2.0);
        assert_abs_diff_eq!(analysis.optimal.energy_from_grid.get(), 20.0);
        assert_abs_diff_eq!(analysis.optimal.total_cost.get(), 0.10 * 20.0, epsilon = 1e-9);

        // The worst window starts at index 2: (0.10 + 0.40) / 2 = 0.25 €/kWh.
        assert_abs_diff_eq!(analysis.savings.get(), 0.15 * 20.0, epsilon = 1e-9);

        assert_eq!(analysis.cost_curve.len(), 3);
        assert_abs_diff_eq!(analysis.cost_curve[0].total_cost.get(), 0.20 * 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(analysis.cost_curve[2].total_cost.get(), 0.25 * 20.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_ties_resolve_to_earliest() -> Result<(), Failure> {
        let series = hourly_series(&[0.25, 0.5, 0.75, 0.5, 0.25]);
        let analysis = optimize(&series, &two_hour_request())?;
        assert_eq!(analysis.optimal.start_time, series.as_slice()[0].start_time);
        assert_abs_diff_eq!(analysis.optimal.total_cost.get(), 0.375 * 20.0);
        assert_abs_diff_eq!(analysis.savings.get(), (0.625 - 0.375) * 20.0);
        Ok(())
    }

    #[test]
    fn test_insufficient_data() {
        let request = ChargeRequest::builder()
            .capacity(KilowattHours::from(50.0))
            .soc_current(Percentage(0.0))
            .soc_target(Percentage(100.0))
            .max_power(Kilowatts::from(10.0))
            .efficiency(Percentage(100.0))
            .build();
        let failure = optimize(&hourly_series(&[0.1, 0.2, 0.3]), &request).unwrap_err();
        assert!(matches!(failure, Failure::InsufficientData { n_available: 3, .. }));
        assert!(failure.to_string().contains("required 5.0 hour charge"));
    }

    #[test]
    fn test_target_below_current() {
        let request = ChargeRequest { soc_current: Percentage(80.0), ..two_hour_request() };
        let result = optimize(&hourly_series(&[0.1, 0.2, 0.3]), &request);
        assert_eq!(result, Err(Failure::InvalidTarget));
    }

    #[test]
    fn test_target_equals_current() {
        let request = ChargeRequest { soc_current: Percentage(50.0), ..two_hour_request() };
        let result = optimize(&hourly_series(&[0.1, 0.2, 0.3]), &request);
        assert_eq!(result, Err(Failure::InvalidTarget));
    }

    #[test]
    fn test_zero_capacity() {
        let request = ChargeRequest { capacity: KilowattHours::ZERO, ..two_hour_request() };
        let result = optimize(&hourly_series(&[0.1]), &request);
        assert_eq!(result, Err(Failure::InvalidTarget));
    }

    #[test]
    fn test_zero_duration() {
        let request =
            ChargeRequest { max_power: Kilowatts::from(f64::INFINITY), ..two_hour_request() };
        let result = optimize(&hourly_series(&[0.1]), &request);
        assert_eq!(result, Err(Failure::ZeroDuration));
    }

    #[test]
    fn test_zero_efficiency() {
        let request = ChargeRequest { efficiency: Percentage(0.0), ..two_hour_request() };
        let result = optimize(&hourly_series(&[0.1, 0.2]), &request);
        assert!(matches!(result, Err(Failure::Internal { .. })));
    }

    #[test]
    fn test_whole_hour_from_percentages() -> Result<(), Failure> {
        // 70% of 10 kWh at 7 kW is exactly one hour:
        let request = ChargeRequest::builder()
            .capacity(KilowattHours::from(10.0))
            .soc_current(Percentage(0.0))
            .soc_target(Percentage(70.0))
            .max_power(Kilowatts::from(7.0))
            .efficiency(Percentage(100.0))
            .build();
        let series = hourly_series(&[0.1]);
        let analysis = optimize(&series, &request)?;
        assert_eq!(analysis.optimal.duration, Hours::ONE);
        let start_time = series.as_slice()[0].start_time;
        assert_eq!(analysis.optimal.end_time, start_time + TimeDelta::hours(1));
        assert_eq!(analysis.cost_curve.len(), 1);
        Ok(())
    }

    #[test]
    fn test_overflowing_window_sum() {
        let series = hourly_series(&[f64::MAX, f64::MAX, 0.1]);
        let result = optimize(&series, &two_hour_request());
        assert!(matches!(result, Err(Failure::Internal { .. })));
    }

    #[test]
    fn test_single_feasible_window() -> Result<(), Failure> {
        let analysis = optimize(&hourly_series(&[0.3, 0.1]), &two_hour_request())?;
        assert_eq!(analysis.cost_curve.len(), 1);
        assert_abs_diff_eq!(analysis.savings.get(), 0.0);
        Ok(())
    }

    #[test]
    fn test_fractional_duration_covering_average() -> Result<(), Failure> {
        let series = hourly_series(&[0.3, 0.1, 0.1, 0.4, 0.2]);
        let analysis = optimize(&series, &fractional_request(CostModel::CoveringAverage))?;
        let start_time = series.as_slice()[0].start_time;
        assert_eq!(analysis.optimal.start_time, start_time);
        assert_eq!(analysis.optimal.end_time, start_time + TimeDelta::minutes(150));
        assert_abs_diff_eq!(analysis.optimal.total_cost.get(), 0.5 / 3.0 * 25.0, epsilon = 1e-9);
        assert_eq!(analysis.cost_curve.len(), 3);
        Ok(())
    }

    #[test]
    fn test_fractional_duration_pro_rata() -> Result<(), Failure> {
        let series = hourly_series(&[0.3, 0.1, 0.1, 0.4, 0.2]);
        let analysis = optimize(&series, &fractional_request(CostModel::ProRata))?;

        // 10 kWh at 0.1, 10 kWh at 0.1, and 5 kWh at 0.4:
        assert_eq!(analysis.optimal.start_time, series.as_slice()[1].start_time);
        assert_abs_diff_eq!(analysis.optimal.total_cost.get(), 4.0, epsilon = 1e-9);

        // The worst one starts at index 2: 10 kWh at 0.1, 10 kWh at 0.4, and 5 kWh at 0.2.
        assert_abs_diff_eq!(analysis.savings.get(), 6.0 - 4.0, epsilon = 1e-9);
        assert_eq!(analysis.cost_curve.len(), 3);
        Ok(())
    }

    #[test]
    fn test_pro_rata_matches_covering_average_on_whole_hours() -> Result<(), Failure> {
        let series = hourly_series(&noisy_prices(48));
        let covering = optimize(&series, &two_hour_request())?;
        let pro_rata = optimize(
            &series,
            &ChargeRequest { cost_model: CostModel::ProRata, ..two_hour_request() },
        )?;
        assert_eq!(covering.optimal.start_time, pro_rata.optimal.start_time);
        assert_abs_diff_eq!(
            covering.optimal.total_cost.get(),
            pro_rata.optimal.total_cost.get(),
            epsilon = 1e-9,
        );
        Ok(())
    }

    #[test]
    fn test_properties_on_noisy_prices() -> Result<(), Failure> {
        let series = hourly_series(&noisy_prices(72));
        let request = ChargeRequest::builder()
            .capacity(KilowattHours::from(77.0))
            .soc_current(Percentage(13.0))
            .soc_target(Percentage(91.0))
            .max_power(Kilowatts::from(7.4))
            .build();
        let analysis = optimize(&series, &request)?;

        // Deterministic:
        assert_eq!(optimize(&series, &request)?, analysis);

        // Window length:
        let optimal = analysis.optimal;
        let n_slots = optimal.duration.n_slots().unwrap();
        assert_eq!(n_slots, 10);
        let time_delta = (optimal.end_time - optimal.start_time).as_seconds_f64() / 3600.0;
        assert_abs_diff_eq!(time_delta, optimal.duration.get(), epsilon = 1e-6);

        // Completeness:
        assert_eq!(analysis.cost_curve.len(), series.len() - n_slots + 1);
        let optimal_point = analysis
            .cost_curve
            .iter()
            .find(|point| point.start_time == optimal.start_time)
            .unwrap();
        assert_eq!(optimal_point.total_cost, optimal.total_cost);

        // Minimality:
        assert!(analysis.cost_curve.iter().all(|point| point.total_cost >= optimal.total_cost));

        // Savings:
        let max_cost = analysis.cost_curve.iter().map(|point| point.total_cost).max().unwrap();
        assert!(analysis.savings > Cost::ZERO);
        assert_eq!(analysis.savings, max_cost - optimal.total_cost);
        Ok(())
    }

    #[test]
    fn test_extremes() {
        assert_eq!(extremes(&[]), None);
        assert_eq!(extremes(&[1.0]), Some((0, 0)));
        assert_eq!(extremes(&[2.0, 1.0, 3.0, 1.0, 3.0]), Some((1, 2)));
        assert_eq!(extremes(&[f64::NAN, 1.0]), Some((0, 0)));
    }
}
