//! wasop CLI - companion for Tenable Web Application Scanning

use clap::Parser;
use log::LevelFilter;

use wasop::cli::{self, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(err) = cli::dispatch(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// Warnings only by default; `--debug` raises to debug; `RUST_LOG` wins.
fn init_logging(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}
