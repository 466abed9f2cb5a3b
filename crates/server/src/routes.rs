use std::{path::Path, sync::Arc};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, put},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;

use common::types::Health;
use service::records::RecordStore;

pub mod records;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Request body cap for the record API; `None` lifts axum's 2 MB default entirely.
fn body_limit(max_bytes: Option<usize>) -> DefaultBodyLimit {
    match max_bytes {
        Some(n) => DefaultBodyLimit::max(n),
        None => DefaultBodyLimit::disable(),
    }
}

/// Build the full application router: record API, health probe and static files.
pub fn build_router(state: AppState, cors: CorsLayer, static_dir: &Path, max_body_bytes: Option<usize>) -> Router {
    let index = ServeFile::new(static_dir.join("index.html"));
    let assets = ServeDir::new(static_dir);

    let api = Router::new()
        .route("/api/records", get(records::list_records).post(records::create_record))
        .route("/api/records/:id", put(records::update_record).delete(records::delete_record))
        .layer(body_limit(max_body_bytes))
        .with_state(state);

    Router::new()
        .route_service("/", index)
        .route("/health", get(health))
        .merge(api)
        .fallback_service(assets)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                        // 5xx responses are logged as errors
                        .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
                )
                .layer(cors),
        )
}
