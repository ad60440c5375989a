pub mod app;
pub mod commands;
pub mod config;

pub use app::{Cli, Commands};
pub use config::CrewConfig;
