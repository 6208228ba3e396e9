pub mod config;
pub mod controller;
pub mod display;
pub mod endpoints;
pub mod error;
pub mod legend;
pub mod loader;
pub mod models;
pub mod reader;
pub mod registry;
pub mod scenario;
pub mod traits;
pub mod utils;

pub use config::Config;
pub use endpoints::server::MapServer;
