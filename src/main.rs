use clap::{Parser, Subcommand};
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

mod apis;
mod config;
mod constants;
mod districts;
mod error;
mod logging;
mod normalize;
mod render;
mod reshape;
mod symbology;
mod types;

use crate::apis::arcgis::ArcGisClient;
use crate::apis::bom::BomRatingsCrawler;
use crate::apis::spc::SpcOutlookClient;
use crate::config::Config;
use crate::error::Result;

#[derive(Parser)]
#[command(name = "firewx_maps")]
#[command(about = "Fire weather outlook and fire danger rating map generator")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and map the SPC fire weather outlooks (US, days 1-4)
    Outlooks,
    /// Scrape and map the BOM fire danger ratings (Australia)
    Ratings {
        /// Print the day-keyed forecast dictionary as JSON to stdout
        #[arg(long)]
        print_json: bool,
    },
    /// Run both pipelines sequentially (SPC first)
    Run,
}

async fn run_spc_pipeline(config: &Config) -> Result<()> {
    let client = SpcOutlookClient::new();
    let days = client.fetch_outlooks(config).await?;
    let path = render::render_outlook_maps(&days, Path::new(&config.output_dir))?;
    println!("✅ SPC outlook maps written to {}", path.display());
    Ok(())
}

async fn run_bom_pipeline(config: &Config, print_json: bool) -> Result<()> {
    let crawler = BomRatingsCrawler::new()?;
    let mut rating_table = crawler.fetch_rating_table(config).await?;

    let arcgis = ArcGisClient::new();
    let joined = districts::merge_districts_and_ratings(&arcgis, config, &mut rating_table).await?;

    let day_collections = reshape::to_day_collections(&joined)?;

    if print_json {
        println!("{}", serde_json::to_string_pretty(&day_collections)?);
    }

    if reshape::has_extreme_or_catastrophic(&day_collections)? {
        warn!("Extreme or catastrophic fire danger ratings in the forecast");
        println!("⚠️  Extreme or catastrophic fire danger ratings in the forecast");
    }

    let path = render::render_fire_danger_maps(&day_collections, Path::new(&config.output_dir))?;
    println!("✅ BOM fire danger maps written to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;

    // Create the outputs folder if it does not exist
    fs::create_dir_all(&config.output_dir)?;

    match cli.command {
        Commands::Outlooks => {
            println!("🔄 Running SPC fire weather outlook pipeline...");
            if let Err(e) = run_spc_pipeline(&config).await {
                error!("SPC outlook pipeline failed: {}", e);
                return Err(e.into());
            }
        }
        Commands::Ratings { print_json } => {
            println!("🔄 Running BOM fire danger rating pipeline...");
            if let Err(e) = run_bom_pipeline(&config, print_json).await {
                error!("BOM rating pipeline failed: {}", e);
                return Err(e.into());
            }
        }
        Commands::Run => {
            println!("🚀 Running full pipeline (SPC + BOM)...");

            println!("\n📥 Step 1: SPC fire weather outlooks...");
            if let Err(e) = run_spc_pipeline(&config).await {
                error!("SPC outlook pipeline failed: {}", e);
                return Err(e.into());
            }

            println!("\n📥 Step 2: BOM fire danger ratings...");
            if let Err(e) = run_bom_pipeline(&config, false).await {
                error!("BOM rating pipeline failed: {}", e);
                return Err(e.into());
            }

            println!("✅ Full pipeline completed successfully!");
        }
    }

    info!("Done");
    Ok(())
}
