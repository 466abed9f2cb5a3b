use std::{future::Future, net::SocketAddr, path::Path, sync::Arc};

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, AppState};
use service::{records::FileRecordStore, runtime};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn parse_bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    let raw = cfg.server.bind_addr();
    raw.parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address {raw}: {e}")))
}

/// Wire the file-backed record store into the router.
pub fn build_app(cfg: &AppConfig) -> Router {
    let store = Arc::new(FileRecordStore::new(&cfg.storage.data_file));
    let state = AppState { store };
    routes::build_router(state, build_cors(), Path::new(&cfg.storage.static_dir), cfg.server.body_limit_bytes)
}

/// Serve with an already loaded config until `shutdown` resolves.
pub async fn run_with_shutdown<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    runtime::ensure_env(&cfg.storage.static_dir, &cfg.storage.data_file).await?;

    let app = build_app(&cfg);
    let addr = parse_bind_addr(&cfg)?;
    info!(%addr, data_file = %cfg.storage.data_file, static_dir = %cfg.storage.static_dir, "starting record store server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("server stopped accepting connections");
    Ok(())
}
