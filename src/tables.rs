use chrono::{DateTime, Local, TimeDelta, Utc};
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::{
        analysis::{Analysis, ChargingWindow},
        price::PriceSeries,
    },
    quantity::{cost::Cost, percentage::Percentage},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

fn local(time: DateTime<Utc>) -> DateTime<Local> {
    time.with_timezone(&Local)
}

/// Hourly prices, optionally marking the hours overlapped by the charging window.
pub fn build_prices_table(
    prices: &PriceSeries,
    n_hours: usize,
    window: Option<&ChargingWindow>,
) -> Table {
    let mean_price = prices.mean_price();

    let mut table = new_table();
    table.set_header(vec!["Date", "Start", "End", "Price", "Charging"]);
    for point in prices.iter().take(n_hours) {
        let end_time = point.start_time + TimeDelta::hours(1);
        let is_charging = window.is_some_and(|window| {
            (point.start_time < window.end_time) && (window.start_time < end_time)
        });
        table.add_row(vec![
            Cell::new(local(point.start_time).format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(local(point.start_time).format("%H:%M")),
            Cell::new(local(end_time).format("%H:%M")).add_attribute(Attribute::Dim),
            Cell::new(point.price).set_alignment(CellAlignment::Right).fg(
                if point.price >= mean_price { Color::Red } else { Color::Green },
            ),
            if is_charging { Cell::new("⚡").fg(Color::Green) } else { Cell::new("") },
        ]);
    }
    table
}

/// The recommended charging window.
pub fn build_summary_table(window: &ChargingWindow, soc_target: Percentage) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Start", "Finish", "Duration", "Energy from grid", "Estimated cost"]);
    table.add_row(vec![
        Cell::new(local(window.start_time).format("%b %d %H:%M")).fg(Color::Green),
        Cell::new(format!(
            "{} (reaches {soc_target})",
            local(window.end_time).format("%b %d %H:%M"),
        )),
        Cell::new(window.duration),
        Cell::new(window.energy_from_grid).set_alignment(CellAlignment::Right),
        Cell::new(window.total_cost).set_alignment(CellAlignment::Right),
    ]);
    table
}

/// Total cost for every possible start time, with the optimal one highlighted.
pub fn build_cost_curve_table(analysis: &Analysis) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Date", "Start", "Cost", "Extra"]);
    for point in &analysis.cost_curve {
        let extra = point.total_cost - analysis.optimal.total_cost;
        let is_optimal = point.start_time == analysis.optimal.start_time;
        let mut start_cell = Cell::new(local(point.start_time).format("%H:%M"));
        if is_optimal {
            start_cell = start_cell.fg(Color::Green).add_attribute(Attribute::Bold);
        }
        table.add_row(vec![
            Cell::new(local(point.start_time).format("%b %d")).add_attribute(Attribute::Dim),
            start_cell,
            Cell::new(point.total_cost).set_alignment(CellAlignment::Right).fg(if is_optimal {
                Color::Green
            } else {
                Color::Reset
            }),
            Cell::new(extra).set_alignment(CellAlignment::Right).fg(if extra >= Cost::ONE_CENT {
                Color::Red
            } else {
                Color::Green
            }),
        ]);
    }
    table
}
