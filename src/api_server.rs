// Axum API Server Module
//
// Purpose: JSON API over the cultivar catalog, content resolver, chart adapter
// and contact relay, plus static serving of the `data/` asset tree.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::catalog::{Catalog, Cultivar};
use crate::chart::{build_radar, build_series, LabeledSeries, LabeledTraits, Metric};
use crate::config::AppConfig;
use crate::contact::{ContactSubmission, Mailer, ResendMailer};
use crate::content::{
    new_content_cache, ContentResolver, ContentSource, DirectorySource, HttpSource, Language,
    CATALOG_PATH,
};
use crate::filter::{filter_catalog, filter_options, FilterState};
use crate::profiles::{comparison_options, profile_for, resolve_comparison};
use anyhow::Context;

/// Message shown to submitters when delivery fails
pub const CONTACT_FAILURE_MESSAGE: &str = "Failed to send message. Please try again later.";

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub resolver: Arc<ContentResolver>,
    pub mailer: Arc<dyn Mailer>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let mailer = ResendMailer::new(config.resend_api_key.clone())
            .context("Failed to build email client")?;
        let mailer = Arc::new(mailer);
        Self::with_mailer(config, mailer).await
    }

    /// Build state with an explicit mail transport
    pub async fn with_mailer(config: AppConfig, mailer: Arc<dyn Mailer>) -> anyhow::Result<Self> {
        let source: Arc<dyn ContentSource> = match &config.content_base_url {
            Some(url) => Arc::new(HttpSource::new(url).context("Failed to build content HTTP client")?),
            None => Arc::new(DirectorySource::new(&config.asset_root)),
        };
        tracing::info!("Content source: {}", source.describe());

        tracing::info!("Loading cultivar catalog...");
        let bytes = source
            .fetch(CATALOG_PATH)
            .await
            .with_context(|| format!("Failed to fetch {}", CATALOG_PATH))?
            .with_context(|| format!("Catalog not found at {}", CATALOG_PATH))?;
        let catalog = Catalog::from_json_slice(&bytes).context("Failed to load catalog")?;
        tracing::info!("Loaded {} cultivars", catalog.len());

        tracing::info!("Initializing Moka content cache...");
        let cache = new_content_cache(config.content_cache_capacity);
        let resolver = ContentResolver::new(source, cache);

        if config.resend_api_key.is_none() {
            tracing::warn!("RESEND_API_KEY not set; contact submissions will fail");
        }

        Ok(Self {
            catalog: Arc::new(catalog),
            resolver: Arc::new(resolver),
            mailer,
            config: Arc::new(config),
        })
    }

    fn cultivar(&self, id: &str) -> Result<&Cultivar, AppError> {
        self.catalog
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Cultivar {} not found", id)))
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    let data_dir = state.config.asset_root.join("data");

    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Catalog + filtering
        .route("/api/cultivars", get(list_cultivars))
        .route("/api/cultivars/filter", post(filter_cultivars))
        .route("/api/cultivars/:id", get(get_cultivar))

        // Per-cultivar content and charts
        .route("/api/cultivars/:id/content", get(get_content))
        .route("/api/cultivars/:id/comparisons", get(get_comparisons))
        .route("/api/cultivars/:id/chart", get(get_chart))
        .route("/api/cultivars/:id/radar", get(get_radar))

        // Contact relay
        .route("/api/contact", post(submit_contact))

        // Static content resource layout
        .nest_service("/data", ServeDir::new(data_dir))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn list_cultivars(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "rows": state.catalog.len(),
        "data": state.catalog.as_slice(),
    }))
}

async fn get_cultivar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let cultivar = state.cultivar(&id)?;
    Ok(Json(serde_json::json!({
        "cultivar": cultivar,
        "keyAttributes": cultivar.key_attributes(),
        "profile": profile_for(&id),
    })))
}

async fn filter_cultivars(
    State(state): State<AppState>,
    payload: Result<Json<FilterState>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let filters = json_body(payload)?;
    filters
        .validate(&state.catalog)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let data = filter_catalog(&state.catalog, &filters);
    tracing::debug!("Filter matched {} of {} cultivars", data.len(), state.catalog.len());

    Ok(Json(serde_json::json!({
        "rows": data.len(),
        "data": data,
        "options": filter_options(&state.catalog, &filters),
    })))
}

async fn get_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ContentQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.cultivar(&id)?;
    let language = match params.lang.as_deref() {
        Some(code) => Language::parse(code).map_err(|e| AppError::BadRequest(e.to_string()))?,
        None => Language::default(),
    };

    let content = state.resolver.resolve(&id, &language).await;
    if content.is_none() {
        tracing::info!("No content for {} ({}); client shows fallback", id, language);
    }

    Ok(Json(serde_json::json!({
        "id": id,
        "language": language.as_str(),
        "content": content.as_deref(),
    })))
}

async fn get_comparisons(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.cultivar(&id)?;
    let profile = profile_for(&id);
    let data: Vec<serde_json::Value> = comparison_options(&state.catalog, &id)
        .into_iter()
        .map(|c| serde_json::json!({ "id": c.id, "name": c.name, "emoji": c.emoji }))
        .collect();

    Ok(Json(serde_json::json!({
        "fixed": profile.fixed_comparison.is_some(),
        "rows": data.len(),
        "data": data,
    })))
}

async fn get_chart(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ChartQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let primary = state.cultivar(&id)?;
    let metric = match params.metric.as_deref() {
        Some(m) => m.parse::<Metric>().map_err(AppError::BadRequest)?,
        None => Metric::Yield,
    };
    let comparison = resolve_comparison(&state.catalog, &id, params.compare.as_deref())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let Some(primary_series) = state.resolver.load_series(&id).await.map_err(content_failure)? else {
        tracing::info!("No series for {}; returning empty chart", id);
        return Ok(Json(serde_json::json!({
            "metric": metric,
            "cumulative": metric.is_cumulative(),
            "primary": primary.name,
            "comparison": null,
            "fallback": true,
            "rows": [],
        })));
    };

    // A comparison without data is charted as no comparison
    let comparison_series = match comparison {
        Some(other) => state
            .resolver
            .load_series(&other.id)
            .await
            .map_err(content_failure)?
            .map(|series| (other, series)),
        None => None,
    };

    let rows = build_series(
        LabeledSeries {
            name: &primary.name,
            series: &primary_series,
        },
        comparison_series.as_ref().map(|(other, series)| LabeledSeries {
            name: &other.name,
            series,
        }),
        metric,
    );

    Ok(Json(serde_json::json!({
        "metric": metric,
        "cumulative": metric.is_cumulative(),
        "primary": primary.name,
        "comparison": comparison_series.as_ref().map(|(other, _)| &other.name),
        "fallback": false,
        "rows": rows,
    })))
}

async fn get_radar(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<RadarQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let primary = state.cultivar(&id)?;
    let comparison = resolve_comparison(&state.catalog, &id, params.compare.as_deref())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let table = state
        .resolver
        .load_trait_table()
        .await
        .map_err(content_failure)?
        .unwrap_or_default();

    let Some(primary_traits) = table.scores(&id) else {
        return Ok(Json(serde_json::json!({
            "primary": primary.name,
            "comparison": null,
            "fallback": true,
            "rows": [],
        })));
    };
    let comparison_traits = comparison.and_then(|other| table.scores(&other.id).map(|t| (other, t)));

    let rows = build_radar(
        LabeledTraits {
            name: &primary.name,
            traits: &primary_traits,
        },
        comparison_traits.as_ref().map(|(other, traits)| LabeledTraits {
            name: &other.name,
            traits,
        }),
    );

    Ok(Json(serde_json::json!({
        "primary": primary.name,
        "comparison": comparison_traits.as_ref().map(|(other, _)| &other.name),
        "fallback": false,
        "traits": table.traits,
        "rows": rows,
    })))
}

async fn submit_contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactSubmission>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let submission = json_body(payload)?;
    let inquiry = submission
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let email = inquiry
        .compose(&state.config.contact_from, &state.config.contact_to)
        .map_err(|e| {
            tracing::error!("Contact email rendering failed: {}", e);
            AppError::Internal(CONTACT_FAILURE_MESSAGE.to_string())
        })?;

    match state.mailer.send(&email).await {
        Ok(message_id) => {
            tracing::info!("Contact inquiry relayed (message id {})", message_id);
            Ok(Json(serde_json::json!({ "success": true })))
        }
        Err(e) => {
            tracing::error!("Contact email delivery failed: {}", e);
            Err(AppError::Internal(CONTACT_FAILURE_MESSAGE.to_string()))
        }
    }
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(serde::Deserialize, Debug)]
struct ContentQuery {
    lang: Option<String>,
}

#[derive(serde::Deserialize, Debug)]
struct ChartQuery {
    metric: Option<String>,
    compare: Option<String>,
}

#[derive(serde::Deserialize, Debug)]
struct RadarQuery {
    compare: Option<String>,
}

// ============================================================================
// Error Handling
// ============================================================================

/// Malformed request bodies get the same `{error}` 400 as validation failures
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!("Rejected request body: {}", rejection.body_text());
            Err(AppError::BadRequest(rejection.body_text()))
        }
    }
}

fn content_failure(e: crate::content::ContentError) -> AppError {
    tracing::error!("Content load failed: {}", e);
    AppError::Internal("Failed to load chart data. Please try again later.".to_string())
}

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
