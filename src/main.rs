use anyhow::{Context, Result};
use chanfund_lib::cli::Cli;
use chanfund_lib::{commands, logging, settings};
use chanfund_sdk::{BitcoinCoreGateway, FundingWallet};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging();

    let config = settings::resolve_config(&cli.connection)?;
    let gateway = BitcoinCoreGateway::new(&config)
        .with_context(|| format!("connecting to {}", config.endpoint()))?;
    let wallet = FundingWallet::new(gateway);

    let output = commands::run(&wallet, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
