use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use clone_traffic_collector::cli::{Cli, Command};
use clone_traffic_collector::{collector, doctor, logger};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logger::init(&cli.log_level, &cli.log_format);

    if let Err(e) = run(&cli).await {
        error!("Application error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Some(Command::Doctor) => {
            if !doctor::run(cli).await? {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Collect) | None => {
            info!(version = VERSION, "Starting clone statistics collection");
            let report = collector::run(cli).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}
