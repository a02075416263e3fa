//! One-shot district search from the command line.
//!
//! Loads the feed, optionally places the user, runs a single search and
//! prints what was located.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cebamap::feed::{FeedLoader, RecordStore};
use cebamap::geocoder::{NominatimGeocoder, QueryComposer};
use cebamap::map::{MapView, MarkerBoard};
use cebamap::{Config, GeoPoint, SearchPipeline, SearchReport};

#[derive(Parser, Debug)]
#[command(name = "locate")]
#[command(about = "Find and geocode CEBAs in a district")]
struct Args {
    /// District to search (substring, case-insensitive)
    #[arg(short, long)]
    district: String,

    /// Feed URL or local CSV path (overrides config)
    #[arg(long)]
    feed: Option<String>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Your latitude, for distances
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Your longitude, for distances
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = Config::load_or_default(args.config.as_ref())?;
    if let Some(feed) = args.feed {
        config.feed.url = feed;
    }

    let loader = FeedLoader::new(&config.geocoder.user_agent, config.geocoder.timeout())
        .context("Failed to create feed client")?;
    let geocoder = NominatimGeocoder::new(
        &config.geocoder.endpoint,
        &config.geocoder.user_agent,
        config.geocoder.timeout(),
    )
    .context("Failed to create geocoder client")?;
    let composer = QueryComposer::new(&config.geocoder.name_prefix, &config.geocoder.country)
        .context("Invalid facility name prefix")?;

    let store = Arc::new(RecordStore::new());
    store.load_from(&loader, &config.feed.url).await;
    info!("Feed: {:?}", store.status());

    let board = Arc::new(MarkerBoard::new(config.map.center(), config.map.zoom));
    let pipeline = SearchPipeline::new(
        store,
        board.clone(),
        Arc::new(geocoder),
        composer,
        config.search.clone(),
    );

    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        pipeline.locate_user(GeoPoint::new(lat, lon), config.map.user_zoom);
    }

    let report = pipeline.run(&args.district).await;
    print_report(&report, board.as_ref());

    Ok(())
}

fn print_report(report: &SearchReport, map: &dyn MapView) {
    println!("{}", report.status.text);

    for facility in &report.located {
        let distance = facility
            .distance_km
            .map(|d| format!("\t{:.1} km", d))
            .unwrap_or_default();
        println!(
            "{}\t{}\t{:.6},{:.6}{}",
            facility.name, facility.district, facility.point.lat, facility.point.lon, distance
        );
    }

    for record in &report.missed {
        println!("{}\t{}\t(not located)", record.name, record.district);
    }

    if !report.located.is_empty() {
        println!("{} markers on the map", map.list_markers().len());
    }
}
