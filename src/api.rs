pub mod awattar;
mod client;
pub mod provider;
