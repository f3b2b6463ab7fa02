mod handlers;
mod state;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/nearby", get(handlers::nearby))
        .route("/api/libraries", get(handlers::library_list))
        .route("/api/libraries/{id}", get(handlers::library_detail))
        .route("/api/libraries/{id}/books", get(handlers::library_books))
        .route("/api/books", get(handlers::book_search))
        .route("/api/books/{id}/nearest", get(handlers::book_nearest))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, state: Arc<AppState>) -> std::io::Result<()> {
    let app = build_router(state);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Ezma server listening on http://{}", addr);
    info!("Press Ctrl+C to stop.");

    axum::serve(listener, app).await
}
