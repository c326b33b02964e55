use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use price_tracker::{
    commands,
    config::{self, database},
    core::{Coordinator, ExportMode, ProductRepository, ProductStore},
    entities::ProductRecord,
    errors::Result,
};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Track grocery prices across retailers
#[derive(Debug, Parser)]
#[command(name = "price-tracker", version, about)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch today's prices for every product already in the database
    Update,
    /// Start tracking a product by fetching it once
    Track { store: String, stockcode: String },
    /// Print every stored snapshot
    List,
    /// Print the price history of one product
    History { store: String, stockcode: String },
    /// Export every stored snapshot to CSV
    Export {
        path: PathBuf,
        /// Append to an existing file instead of replacing it
        #[arg(long)]
        append: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    let cli = Cli::parse();

    // 3. Load the application configuration
    let app_config = config::load_or_default(&cli.config)
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Open the database and make sure the table exists
    let database_url = database::get_database_url()
        .inspect_err(|e| error!("Invalid DATABASE_URL: {}", e))?;
    let db = database::create_connection(&database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;
    let repository = ProductRepository::new(db);

    let coordinator = Coordinator::from_config(&app_config)?;
    info!(
        "Stores: {}",
        coordinator.store_ids().collect::<Vec<_>>().join(", ")
    );

    match cli.command {
        Command::Update => {
            let summary = commands::update_products(&coordinator, &repository).await?;
            println!(
                "Fetched {} products, {} new snapshots saved",
                summary.fetched, summary.saved
            );
        }
        Command::Track { store, stockcode } => {
            let (record, saved) =
                commands::track_product(&coordinator, &repository, &store, &stockcode).await?;
            print_record(&record);
            if !saved {
                println!("(already recorded today)");
            }
        }
        Command::List => {
            for record in repository.list_all_records().await? {
                print_record(&record);
            }
        }
        Command::History { store, stockcode } => {
            for record in repository.price_history(&store, &stockcode).await? {
                print_record(&record);
            }
        }
        Command::Export { path, append } => {
            let mode = if append {
                ExportMode::Append
            } else {
                ExportMode::Overwrite
            };
            let count = commands::export_all(&repository, &path, mode).await?;
            println!("Exported {} records to {}", count, path.display());
        }
    }

    Ok(())
}

fn print_record(record: &ProductRecord) {
    let special = if record.is_half_price {
        " (half price)"
    } else if record.is_on_special {
        " (special)"
    } else {
        ""
    };
    println!(
        "{}  {:<10} {:<10} {:<40} ${:>7.2}{}",
        record.date, record.store, record.stockcode, record.product_name, record.price, special
    );
}
