// Allow common clippy pedantic lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! tap-tursoapi CLI
//!
//! Messages go to stdout, logs to stderr.

use clap::Parser;
use tap_tursoapi::cli::{Cli, Runner};
use tracing::Level;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = Level::from(cli.log_level());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await {
        if e.is_config() {
            tracing::error!("invalid configuration, no request was made");
        }
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
