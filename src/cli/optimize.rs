use std::str::FromStr;

use clap::{Parser, ValueEnum};

use crate::{
    cli::market::MarketArgs,
    core::{
        analysis::Analysis,
        optimizer::optimize,
        price::PriceSeries,
        request::{ChargeRequest, CostModel},
    },
    prelude::*,
    quantity::{Quantity, energy::KilowattHours, percentage::Percentage, power::Kilowatts},
    tables::{build_cost_curve_table, build_prices_table, build_summary_table},
};

#[derive(Parser)]
pub struct OptimizeArgs {
    #[clap(flatten)]
    market: MarketArgs,

    #[clap(flatten)]
    vehicle: VehicleArgs,

    #[clap(long = "cost-model", env = "COST_MODEL", value_enum, default_value_t)]
    cost_model: CostModel,

    #[clap(long, env = "FORMAT", value_enum, default_value_t)]
    format: Format,
}

#[derive(Copy, Clone, Parser)]
struct VehicleArgs {
    /// Usable battery capacity in kilowatt-hours.
    #[clap(long = "capacity-kwh", env = "CAPACITY_KWH", value_parser = parse_kilowatt_hours)]
    capacity: KilowattHours,

    /// Current state of charge.
    #[clap(long = "soc-current-percent", env = "SOC_CURRENT_PERCENT")]
    soc_current: Percentage,

    /// Requested state of charge.
    #[clap(long = "soc-target-percent", env = "SOC_TARGET_PERCENT")]
    soc_target: Percentage,

    /// Maximum charging power in kilowatts.
    #[clap(long = "max-power-kw", env = "MAX_POWER_KW", value_parser = parse_kilowatts)]
    max_power: Kilowatts,

    /// Charging efficiency.
    #[clap(
        long = "efficiency-percent",
        env = "EFFICIENCY_PERCENT",
        default_value = "90",
        value_parser = parse_efficiency,
    )]
    efficiency: Percentage,
}

#[derive(Copy, Clone, Default, ValueEnum)]
enum Format {
    #[default]
    Table,
    Json,
}

impl OptimizeArgs {
    pub async fn run(self) -> Result {
        let market_data = self.market.load().await?;
        let request = ChargeRequest::builder()
            .capacity(self.vehicle.capacity)
            .soc_current(self.vehicle.soc_current)
            .soc_target(self.vehicle.soc_target)
            .max_power(self.vehicle.max_power)
            .efficiency(self.vehicle.efficiency)
            .cost_model(self.cost_model)
            .build();
        info!(
            energy_from_grid = ?request.energy_from_grid(),
            duration = ?request.duration(),
            cost_model = %request.cost_model,
            "optimizing…",
        );

        let result = optimize(&market_data.prices, &request);
        match self.format {
            Format::Json => {
                let output = match &result {
                    Ok(analysis) => serde_json::json!({ "request": request, "analysis": analysis }),
                    Err(failure) => serde_json::json!({ "request": request, "failure": failure }),
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            Format::Table => {
                if let Ok(analysis) = &result {
                    print_analysis(&market_data.prices, analysis, &request);
                }
            }
        }
        if let Err(failure) = &result {
            warn!("{failure}");
        }
        result?;
        Ok(())
    }
}

fn print_analysis(
    prices: &PriceSeries,
    analysis: &Analysis,
    request: &ChargeRequest,
) {
    println!("{}", build_summary_table(&analysis.optimal, request.soc_target));
    println!(
        "You save {} compared to charging in the most expensive period.",
        analysis.savings,
    );
    println!("{}", build_cost_curve_table(analysis));
    println!("{}", build_prices_table(prices, prices.len(), Some(&analysis.optimal)));
}

fn parse_positive<const POWER: isize, const TIME: isize, const COST: isize>(
    s: &str,
) -> Result<Quantity<POWER, TIME, COST>> {
    let value = Quantity::<POWER, TIME, COST>::from_str(s)?;
    ensure!(value.is_finite() && value.get() > 0.0, "must be positive");
    Ok(value)
}

fn parse_kilowatt_hours(s: &str) -> Result<KilowattHours> {
    parse_positive(s)
}

fn parse_kilowatts(s: &str) -> Result<Kilowatts> {
    parse_positive(s)
}

fn parse_efficiency(s: &str) -> Result<Percentage> {
    let efficiency = Percentage::from_str(s)?;
    ensure!(efficiency.0 > 0.0, "efficiency must be positive");
    Ok(efficiency)
}
