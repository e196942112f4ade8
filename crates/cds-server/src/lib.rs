//! # cds-server: HTTP surface of the content store
//!
//! Maps the verb/path contract onto [`cds_store::PackageStore`]:
//!
//! - `GET /` lists packages
//! - `GET /{id}` streams the archive, `GET /{id}?metadata` is a placeholder
//! - `GET /{id}/{*path}` streams a member file
//! - `POST /upload?contentId={id}[&redirect={url}]` accepts a multipart upload
//! - `DELETE /{id}` removes a package
//! - `GET /static/{*path}` serves static assets when configured
//!
//! Everything is mounted under the configured base path. Handlers only
//! translate between HTTP and the store; all errors leave as [`AppError`].

pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use error::AppError;
pub use state::{AppState, ServerConfig};

const TRACING_TARGET: &str = "cds_server";

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let mut api = routes::packages::router();
    if let Some(static_dir) = state.config().static_dir.clone() {
        tracing::debug!(
            target: TRACING_TARGET,
            path = %static_dir.display(),
            "serving static assets"
        );
        api = api.nest_service("/static", ServeDir::new(static_dir));
    }

    let base_path = state.config().base_path().to_owned();
    let api = api
        .layer(DefaultBodyLimit::max(state.config().max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if base_path.is_empty() {
        api
    } else {
        Router::new().nest(&base_path, api)
    }
}
