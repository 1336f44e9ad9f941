//! Storage and proximity search for recorded GPS tours.

use postgres::{Client, NoTls};

pub mod config;
pub mod criteria;
pub mod error;
pub mod geodesy;
pub mod gpx;
pub mod http;
pub mod mapper;
pub mod models;
pub mod representation;
pub mod repository;
pub mod schema;
pub mod service;

pub use crate::error::{Result, TourError};
pub use crate::service::TourService;

pub fn establish_connection(database_url: &str) -> std::result::Result<Client, postgres::Error> {
    Client::connect(database_url, NoTls)
}

/// Installs the log subscriber used by the binaries; `RUST_LOG` overrides
/// the `info` default.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
