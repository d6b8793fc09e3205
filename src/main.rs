use anyhow::{bail, Context, Result};
use car_scout::config::AppConfig;
use car_scout::models::group_thousands;
use car_scout::rank::Ranker;
use car_scout::report::DatasetSummary;
use car_scout::sources::{HtmlSnapshotSource, JsonBatchSource, ListingSource};
use car_scout::store::{DatasetStore, JsonFileStore};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "car-scout", about = "Track used-car listings across capture runs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract captured listings and merge them into the dataset
    Run {
        #[arg(long)]
        dataset: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        /// JSON array of {tracked_vehicle, raw_text} objects
        #[arg(long)]
        batch: Vec<PathBuf>,
        /// Saved results page, as <vehicle>=<path>
        #[arg(long)]
        snapshot: Vec<String>,
        #[arg(long)]
        backup_dir: Option<PathBuf>,
    },
    /// Print the ranked dataset
    Show {
        #[arg(long)]
        dataset: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        active_only: bool,
    },
}

fn snapshot_source(arg: &str) -> Result<HtmlSnapshotSource> {
    let Some((vehicle, path)) = arg.split_once('=') else {
        bail!("--snapshot expects <vehicle>=<path>, got {arg:?}");
    };
    Ok(HtmlSnapshotSource::new(vehicle.trim(), path.trim()))
}

fn print_listing(rank: usize, listing: &car_scout::Listing) {
    let price = listing
        .price
        .map(|p| format!("${}", group_thousands(u64::from(p))))
        .unwrap_or_else(|| "no price".to_string());
    let tier = listing.tier.map(|t| t.to_string()).unwrap_or_default();
    let status = if listing.is_active { "" } else { " (gone)" };

    println!("{}. {}{} [{}]", rank, listing.title, status, tier);
    println!(
        "   {} ({}), {}",
        price,
        listing.price_type(),
        listing.location.as_deref().unwrap_or("?")
    );
    if let Some(mileage) = &listing.mileage {
        println!("   {}, {}, {}", mileage, listing.transmission, listing.fuel_type);
    }
    if let Some(ends) = &listing.auction_end_relative {
        println!("   Ends: {}", ends);
    } else if let Some(listed) = &listing.listing_relative_time {
        println!("   Listed: {}", listed);
    }
    if let Some(hints) = &listing.search_hints {
        if let Some(url) = hints.listing_urls.first() {
            println!("   Search: {}", url);
        }
    }
    println!("   ID: {}", listing.id);
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match Cli::parse().command {
        Command::Run {
            dataset,
            config,
            batch,
            snapshot,
            backup_dir,
        } => {
            info!("🚗 Car Scout - capture run");
            info!("==========================");

            let config = AppConfig::load(config.as_deref())?;
            let mut store = JsonFileStore::new(dataset);
            if let Some(dir) = backup_dir {
                store = store.with_backups(dir);
            }

            let mut sources: Vec<Box<dyn ListingSource>> = Vec::new();
            for path in batch {
                sources.push(Box::new(JsonBatchSource::new(path)));
            }
            for arg in &snapshot {
                sources.push(Box::new(snapshot_source(arg)?));
            }
            if sources.is_empty() {
                bail!("Nothing to capture: pass --batch or --snapshot");
            }

            let outcome = car_scout::run_capture(&config, &sources, &store, Utc::now()).await?;
            info!(
                "✅ {} new, {} updated, {} gone",
                outcome.reconcile.inserted, outcome.reconcile.updated, outcome.reconcile.deactivated
            );
            outcome.summary.log();
        }
        Command::Show {
            dataset,
            config,
            limit,
            active_only,
        } => {
            let config = AppConfig::load(config.as_deref())?;
            let store = JsonFileStore::new(dataset);
            let loaded = store
                .load()
                .await
                .with_context(|| format!("Failed to read {}", store.path().display()))?;
            let records = Ranker::from_config(&config).rank(loaded);

            for (i, listing) in records
                .iter()
                .filter(|l| !active_only || l.is_active)
                .take(limit)
                .enumerate()
            {
                print_listing(i + 1, listing);
                println!();
            }
            println!("{}", DatasetSummary::from_records(&records));
        }
    }

    Ok(())
}
