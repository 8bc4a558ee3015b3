#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

mod api;
mod cache;
mod cli;
mod core;
mod market;
mod prelude;
mod quantity;
mod tables;

use clap::{Parser, crate_version};

use crate::{
    cli::{Args, Command},
    prelude::*,
};

#[tokio::main]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().with_writer(std::io::stderr).init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Prices(args) => args.run().await,
        Command::Optimize(args) => args.run().await,
    }
}
