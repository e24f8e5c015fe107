pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

pub use crate::domain::error::{AppError, Result};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::interfaces::cli::{dispatch, Cli};

pub async fn run() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    dispatch(Cli::parse()).await
}
