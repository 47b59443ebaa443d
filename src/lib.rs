pub mod args;
pub mod commands;
pub mod config;
pub mod dashboard;
mod error;
pub mod ledger;
pub mod model;
pub mod render;
pub mod seed;
pub mod session;
pub mod summary;
#[cfg(test)]
mod test;
mod utils;
pub mod validation;
pub mod view;

pub use config::Config;
pub use dashboard::Dashboard;
pub use error::Error;
pub use error::Result;
