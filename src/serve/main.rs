//! Map server for district searches.
//!
//! Loads the facility feed in the background at startup and exposes the
//! search pipeline, the map state and the user location over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cebamap::feed::{FeedLoader, LoadStatus, RecordStore};
use cebamap::geocoder::{Geocoder, NominatimGeocoder, QueryComposer};
use cebamap::map::MarkerBoard;
use cebamap::models::{Camera, FacilityRecord, GeoPoint, Marker};
use cebamap::pipeline::{LocatedFacility, SearchState, Status};
use cebamap::{Config, SearchError, SearchPipeline};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "serve")]
#[command(about = "CEBA facility map server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Feed URL or local CSV path (overrides config)
    #[arg(long)]
    feed: Option<String>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Application state shared across handlers
struct AppState {
    config: Config,
    store: Arc<RecordStore>,
    board: Arc<MarkerBoard>,
    pipeline: SearchPipeline,
}

impl AppState {
    fn new(config: Config, store: Arc<RecordStore>, geocoder: Arc<dyn Geocoder>) -> Result<Self> {
        let composer = QueryComposer::new(&config.geocoder.name_prefix, &config.geocoder.country)
            .context("Invalid facility name prefix")?;
        let board = Arc::new(MarkerBoard::new(config.map.center(), config.map.zoom));
        let pipeline = SearchPipeline::new(
            store.clone(),
            board.clone(),
            geocoder,
            composer,
            config.search.clone(),
        );

        Ok(Self {
            config,
            store,
            board,
            pipeline,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = Config::load_or_default(args.config.as_ref())?;
    if let Some(feed) = args.feed {
        config.feed.url = feed;
    }

    info!("CEBA Map Server");
    info!("Geocoding through {}", config.geocoder.endpoint);

    let geocoder = NominatimGeocoder::new(
        &config.geocoder.endpoint,
        &config.geocoder.user_agent,
        config.geocoder.timeout(),
    )
    .context("Failed to create geocoder client")?;
    let loader = FeedLoader::new(&config.geocoder.user_agent, config.geocoder.timeout())
        .context("Failed to create feed client")?;

    let store = Arc::new(RecordStore::new());
    let state = Arc::new(AppState::new(config, store.clone(), Arc::new(geocoder))?);

    // Searches report "not ready" until this finishes
    let feed_url = state.config.feed.url.clone();
    tokio::spawn(async move {
        store.load_from(&loader, &feed_url).await;
    });

    let app = router(state);

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/search", get(search_handler))
        .route("/v1/map", get(map_handler))
        .route("/v1/location", post(location_handler))
        .route("/v1/facilities", get(facilities_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        feed: state.store.status(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    feed: LoadStatus,
}

/// Run a district search. Answers 409 while another search is running.
async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQueryParams>,
) -> (StatusCode, Json<SearchResponse>) {
    let input = params.district.unwrap_or_default();
    let report = state.pipeline.run(&input).await;

    let code = match report.outcome {
        Err(SearchError::Busy) => StatusCode::CONFLICT,
        _ => StatusCode::OK,
    };

    (
        code,
        Json(SearchResponse {
            input: report.input,
            started_at: report.started_at,
            status: report.status,
            located: report.located,
            missed: report.missed,
            camera_target: report.camera_target,
            lookups: report.lookups,
            took_ms: report.elapsed.as_millis(),
        }),
    )
}

/// Current markers, camera and search status
async fn map_handler(State(state): State<Arc<AppState>>) -> Json<MapResponse> {
    Json(map_response(&state))
}

/// Place the "you are here" marker
async fn location_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LocationBody>,
) -> Result<Json<MapResponse>, (StatusCode, String)> {
    if !(-90.0..=90.0).contains(&body.lat) || !(-180.0..=180.0).contains(&body.lon) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Coordinates out of range: ({}, {})", body.lat, body.lon),
        ));
    }

    state
        .pipeline
        .locate_user(GeoPoint::new(body.lat, body.lon), state.config.map.user_zoom);

    Ok(Json(map_response(&state)))
}

/// Feed load state
async fn facilities_handler(State(state): State<Arc<AppState>>) -> Json<LoadStatus> {
    Json(state.store.status())
}

fn map_response(state: &AppState) -> MapResponse {
    let snapshot = state.board.snapshot();
    MapResponse {
        camera: snapshot.camera,
        markers: snapshot.markers,
        status: state.pipeline.status(),
        search: state.pipeline.state(),
    }
}

#[derive(Deserialize)]
struct SearchQueryParams {
    /// District text, matched as a substring
    district: Option<String>,
}

#[derive(Deserialize)]
struct LocationBody {
    lat: f64,
    lon: f64,
}

#[derive(Serialize)]
struct SearchResponse {
    input: String,
    started_at: DateTime<Utc>,
    status: Status,
    located: Vec<LocatedFacility>,
    missed: Vec<FacilityRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    camera_target: Option<GeoPoint>,
    lookups: usize,
    took_ms: u128,
}

#[derive(Serialize)]
struct MapResponse {
    camera: Camera,
    markers: Vec<Marker>,
    status: Status,
    search: SearchState,
}
