pub mod commands;
pub mod config;
pub mod services;
pub mod utils;

pub use commands::Commands;
pub use config::CoreConfig;
