pub mod analysis;
pub mod optimizer;
pub mod price;
pub mod request;
mod window;
