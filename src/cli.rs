mod market;
mod optimize;
mod prices;

use clap::{Parser, Subcommand};

pub use self::{optimize::OptimizeArgs, prices::PricesArgs};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the upcoming hourly prices.
    #[clap(name = "prices")]
    Prices(Box<PricesArgs>),

    /// Find the cheapest window to charge the vehicle.
    #[clap(name = "optimize")]
    Optimize(Box<OptimizeArgs>),
}
