use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::catalog::{Book, BookMatch, CatalogError, Library};
use crate::config::{ConfigError, PointSource};
use crate::geo::GeoPoint;
use crate::ranker::RankedResult;

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

#[derive(Debug)]
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        let status = match &e {
            CatalogError::NotFound { .. } => StatusCode::NOT_FOUND,
            CatalogError::Nearby(_) => StatusCode::BAD_REQUEST,
            CatalogError::Network(_)
            | CatalogError::InvalidResponse(_)
            | CatalogError::Io(_)
            | CatalogError::Parse(_) => StatusCode::BAD_GATEWAY,
        };
        api_error(status, e.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(e: ConfigError) -> Self {
        api_error(StatusCode::BAD_REQUEST, e.to_string())
    }
}

/// `Query` whose rejection is reported as a JSON `ApiError`.
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.body_text()))?;
        Ok(Self(value))
    }
}

/// `Path` whose rejection is reported as a JSON `ApiError`.
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| api_error(e.status(), e.body_text()))?;
        Ok(Self(value))
    }
}

/// Run a catalog call off the async runtime; backends may block on I/O.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, CatalogError> + Send + 'static,
    T: Send + 'static,
{
    let joined = tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(joined?)
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[derive(Serialize)]
pub struct Results<T> {
    pub results: Vec<T>,
}

// ─── GET /api/nearby ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius: Option<f64>,
    #[serde(default)]
    pub all: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyResponse {
    pub center: GeoPoint,
    pub used_fallback: bool,
    pub radius_km: f64,
    pub results: Vec<RankedResult<Library>>,
}

pub async fn nearby(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<NearbyQuery>,
) -> Result<Json<NearbyResponse>, ApiError> {
    let start = Instant::now();

    let (center, source) = state.settings.query_point(params.lat, params.lon)?;
    let radius_km = state.settings.radius_or_default(params.radius);

    let catalog = state.catalog.clone();
    let results = blocking(move || catalog.nearby_libraries(center, radius_km, params.all)).await?;

    info!(
        "GET /api/nearby ({:.6}, {:.6}) r={}km -> {} libraries ({:.1}ms)",
        center.latitude,
        center.longitude,
        radius_km,
        results.len(),
        elapsed_ms(start),
    );

    Ok(Json(NearbyResponse {
        center,
        used_fallback: source == PointSource::Fallback,
        radius_km,
        results,
    }))
}

// ─── GET /api/libraries ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct LibraryListQuery {
    pub search: Option<String>,
    #[serde(default)]
    pub all: bool,
}

pub async fn library_list(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<LibraryListQuery>,
) -> Result<Json<Results<Library>>, ApiError> {
    let start = Instant::now();
    let search = params.search.unwrap_or_default();

    let catalog = state.catalog.clone();
    let query = search.clone();
    let results = blocking(move || catalog.search_libraries(&query, params.all)).await?;

    info!(
        "GET /api/libraries search='{}' -> {} libraries ({:.1}ms)",
        search,
        results.len(),
        elapsed_ms(start),
    );
    Ok(Json(Results { results }))
}

// ─── GET /api/libraries/{id} ─────────────────────────────────────

pub async fn library_detail(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<u32>,
) -> Result<Json<Library>, ApiError> {
    let catalog = state.catalog.clone();
    let library = blocking(move || catalog.library(id)).await?;
    info!("GET /api/libraries/{} -> {}", id, library.name);
    Ok(Json(library))
}

// ─── GET /api/libraries/{id}/books ───────────────────────────────

pub async fn library_books(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<u32>,
) -> Result<Json<Results<Book>>, ApiError> {
    let catalog = state.catalog.clone();
    let results = blocking(move || catalog.books_in_library(id)).await?;
    info!("GET /api/libraries/{}/books -> {} books", id, results.len());
    Ok(Json(Results { results }))
}

// ─── GET /api/books ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct BookSearchQuery {
    pub query: Option<String>,
}

pub async fn book_search(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<BookSearchQuery>,
) -> Result<Json<Results<BookMatch>>, ApiError> {
    let start = Instant::now();
    let query = params.query.unwrap_or_default();

    let catalog = state.catalog.clone();
    let q = query.clone();
    let results = blocking(move || catalog.search_books(&q)).await?;

    info!(
        "GET /api/books query='{}' -> {} books ({:.1}ms)",
        query,
        results.len(),
        elapsed_ms(start),
    );
    Ok(Json(Results { results }))
}

// ─── GET /api/books/{id}/nearest ─────────────────────────────────

#[derive(Deserialize)]
pub struct HoldingsQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius: Option<f64>,
}

pub async fn book_nearest(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<u32>,
    ApiQuery(params): ApiQuery<HoldingsQuery>,
) -> Result<Json<Results<RankedResult<Library>>>, ApiError> {
    let start = Instant::now();

    let (center, _) = state.settings.query_point(params.lat, params.lon)?;
    let radius_km = state.settings.radius_or_default(params.radius);

    let catalog = state.catalog.clone();
    let results = blocking(move || catalog.nearest_holdings(id, center, radius_km)).await?;

    info!(
        "GET /api/books/{}/nearest r={}km -> {} libraries ({:.1}ms)",
        id,
        radius_km,
        results.len(),
        elapsed_ms(start),
    );
    Ok(Json(Results { results }))
}
