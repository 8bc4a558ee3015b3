use std::time::Duration;

use clap::{crate_name, crate_version};
use reqwest::Client;

use crate::prelude::*;

/// Build a default client.
pub fn try_new() -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(10))
        .user_agent(concat!(crate_name!(), "/", crate_version!()))
        .build()?)
}
