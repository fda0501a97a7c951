//! Cost Estimator
//!
//! Prices cloud resources against the Azure Retail Prices API and rolls them
//! up into monthly and yearly totals. Runs as an HTTP tool server or as a
//! one-shot CLI estimate.

use clap::{Parser, Subcommand};
use domain_estimation::{
    CostCalculation, EstimationService, PricingResolver, ResourceDescriptor, RetailPricesClient,
};
use eyre::{Result, WrapErr};
use std::path::PathBuf;
use tracing::info;

mod config;
mod server;
mod telemetry;

use config::Config;
use telemetry::{init_tracing, install_color_eyre};

#[derive(Parser)]
#[command(name = "cost-estimator")]
#[command(about = "Estimate cloud costs from retail catalog prices")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP tool server (default)
    Serve,

    /// Price a JSON list of resources and print the cost report
    Estimate {
        /// Path to a JSON array of resource descriptors
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print the available tools and their input schemas
    Tools,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(config.environment);

    let catalog = RetailPricesClient::new(config.catalog.clone())
        .wrap_err("Failed to build catalog client")?;
    let resolver = PricingResolver::new(catalog).with_max_concurrency(config.max_concurrency);
    let service = EstimationService::new(resolver);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            observability::init_metrics().wrap_err("Failed to install metrics recorder")?;
            info!(catalog = %config.catalog.base_url, "Starting cost estimator");

            let router = server::build_router(service, &config)?;
            server::serve(router, &config).await?;
        }

        Commands::Estimate { input } => {
            let raw = tokio::fs::read_to_string(&input)
                .await
                .wrap_err_with(|| format!("Failed to read {}", input.display()))?;
            let resources: Option<Vec<ResourceDescriptor>> = serde_json::from_str(&raw)
                .wrap_err_with(|| format!("Invalid resource list in {}", input.display()))?;

            let report = service.estimate(resources).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&CostCalculation::from(report))?
            );
        }

        Commands::Tools => {
            println!("{}", serde_json::to_string_pretty(&service.tools())?);
        }
    }

    Ok(())
}
