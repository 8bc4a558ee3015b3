use clap::Parser;

use crate::{cli::market::MarketArgs, prelude::*, tables::build_prices_table};

#[derive(Parser)]
pub struct PricesArgs {
    #[clap(flatten)]
    market: MarketArgs,

    /// Number of upcoming hours to show.
    #[clap(long = "n-hours", default_value = "24", env = "N_HOURS")]
    n_hours: usize,
}

impl PricesArgs {
    pub async fn run(self) -> Result {
        let market_data = self.market.load().await?;
        println!("{}", build_prices_table(&market_data.prices, self.n_hours, None));
        Ok(())
    }
}
