//! Agency locator server.
//!
//! Ranks rental agencies by distance to a reference point and returns the map
//! bounds that frame them.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use rand::Rng;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use vitarenta::backend::BackendClient;
use vitarenta::config::{Config, LocatorConfig};
use vitarenta::locate::{
    fit_bounds, reference_point, GeolocationOptions, LocationFix, LocationOutcome,
};
use vitarenta::{Agency, GeoPoint, MapBounds, NearestAgencyRanker, RankedAgency};

#[derive(Parser, Debug)]
#[command(name = "locator")]
#[command(about = "Nearest rental agency locator")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides the config file)
    #[arg(short, long)]
    listen: Option<String>,

    /// Serve agencies from a JSON file instead of the backend
    #[arg(long)]
    agencies_file: Option<PathBuf>,
}

/// Where agencies come from
enum AgencySource {
    File(Vec<Agency>),
    Backend(BackendClient),
}

impl AgencySource {
    async fn agencies(&self) -> Result<Vec<Agency>, vitarenta::error::BackendError> {
        match self {
            AgencySource::File(agencies) => Ok(agencies.clone()),
            AgencySource::Backend(client) => client.list_agencies().await,
        }
    }
}

/// Application state shared across handlers
struct AppState {
    source: AgencySource,
    ranker: NearestAgencyRanker,
    locator: LocatorConfig,
    geolocation: GeolocationOptions,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("VitaRenta Agency Locator");

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            Config::load_from_file(path)?
        }
        None => {
            warn!("No config file given, using defaults");
            Config::default()
        }
    };
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }
    if let Some(file) = args.agencies_file {
        config.backend.agencies_file = Some(file);
    }

    let source = match &config.backend.agencies_file {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read agencies file: {}", path.display()))?;
            let agencies: Vec<Agency> =
                serde_json::from_str(&content).context("Failed to parse agencies file")?;
            info!("Loaded {} agencies from {}", agencies.len(), path.display());
            AgencySource::File(agencies)
        }
        None => {
            info!("Using backend at {}", config.backend.base_url);
            let mut client = BackendClient::new(&config.backend.base_url, config.backend.timeout())
                .context("Failed to create backend client")?;
            if let Some(token) = &config.backend.token {
                client = client.with_token(token.clone());
            }
            AgencySource::Backend(client)
        }
    };

    let state = Arc::new(AppState {
        source,
        ranker: config.locator.ranker(),
        locator: config.locator.clone(),
        geolocation: config.geolocation,
    });

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/geolocation", get(geolocation_handler))
        .route("/v1/agencies/nearest", get(nearest_handler))
        .route("/v1/cities/resolve", get(resolve_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", config.server.listen);

    let listener = tokio::net::TcpListener::bind(&config.server.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let agencies = state.source.agencies().await;

    Json(HealthResponse {
        status: if agencies.is_ok() { "ok" } else { "degraded" },
        agencies: agencies.map(|a| a.len()).unwrap_or(0),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    agencies: usize,
}

/// Options a client should pass to its platform geolocation request
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct GeolocationResponse {
    enable_high_accuracy: bool,
    /// Milliseconds
    timeout: u128,
    /// Milliseconds
    maximum_age: i64,
    default_reference: GeoPoint,
}

async fn geolocation_handler(State(state): State<Arc<AppState>>) -> Json<GeolocationResponse> {
    let options = &state.geolocation;
    Json(GeolocationResponse {
        enable_high_accuracy: options.enable_high_accuracy,
        timeout: options.timeout().as_millis(),
        maximum_age: options.maximum_age().num_milliseconds(),
        default_reference: options.default_reference,
    })
}

/// Why the client has no position to send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum GeolocationFailure {
    Denied,
    Unavailable,
    Timeout,
}

#[derive(Debug, Default, Deserialize)]
struct NearestQueryParams {
    /// Reference latitude
    lat: Option<f64>,
    /// Reference longitude
    lon: Option<f64>,
    /// Number of agencies to return
    limit: Option<usize>,
    /// Reported by the client when geolocation failed
    geolocation: Option<GeolocationFailure>,
}

impl NearestQueryParams {
    fn outcome(&self, now: DateTime<Utc>) -> LocationOutcome {
        match (self.lat, self.lon, self.geolocation) {
            (Some(lat), Some(lon), _) => {
                LocationOutcome::Located(LocationFix::new(GeoPoint::new(lat, lon), now))
            }
            (_, _, Some(GeolocationFailure::Denied)) => LocationOutcome::Denied,
            (_, _, Some(GeolocationFailure::Timeout)) => LocationOutcome::TimedOut,
            _ => LocationOutcome::Unavailable,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NearestResponse {
    reference: GeoPoint,
    used_default_reference: bool,
    agencies: Vec<RankedAgency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<MapBounds>,
    /// Map center for the fitted bounds
    #[serde(skip_serializing_if = "Option::is_none")]
    center: Option<GeoPoint>,
}

/// Nearest agencies to the given point, or to the default reference point
async fn nearest_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NearestQueryParams>,
) -> Result<Json<NearestResponse>, (StatusCode, String)> {
    let agencies = state.source.agencies().await.map_err(|e| {
        tracing::error!("Agency listing failed: {}", e);
        (StatusCode::BAD_GATEWAY, e.to_string())
    })?;

    Ok(Json(nearest(
        &state,
        &params,
        &agencies,
        Utc::now(),
        &mut rand::thread_rng(),
    )))
}

fn nearest<R: Rng + ?Sized>(
    state: &AppState,
    params: &NearestQueryParams,
    agencies: &[Agency],
    now: DateTime<Utc>,
    rng: &mut R,
) -> NearestResponse {
    let outcome = params.outcome(now);
    let fix = outcome.fix();
    if fix.is_none() {
        debug!("No client position ({:?}), using default reference point", outcome);
    }

    let reference = reference_point(fix.as_ref(), now, &state.geolocation);
    let limit = params
        .limit
        .unwrap_or(state.ranker.top_n())
        .min(state.locator.max_limit);

    let ranked = state.ranker.rank_top(reference, agencies, limit, rng);
    let bounds = fit_bounds(reference, &ranked, state.locator.bounds_padding);

    NearestResponse {
        reference,
        used_default_reference: fix.map_or(true, |f| f.point != reference),
        agencies: ranked,
        bounds,
        center: bounds.map(|b| b.center()),
    }
}

#[derive(Deserialize)]
struct ResolveQueryParams {
    city: String,
}

#[derive(Debug, Serialize)]
struct ResolveResponse {
    city: String,
    point: GeoPoint,
}

/// Approximate coordinates for a city name
async fn resolve_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResolveQueryParams>,
) -> Json<ResolveResponse> {
    let point = state
        .ranker
        .resolver()
        .resolve(&params.city, &mut rand::thread_rng());

    Json(ResolveResponse {
        city: params.city,
        point,
    })
}
