use axum::response::Response;
use cds_store::ContentId;

use crate::error::AppError;

const TRACING_TARGET: &str = "cds_server::metadata";

/// Package metadata is not implemented yet; every request answers 501.
pub async fn package_metadata(id: &ContentId) -> Result<Response, AppError> {
    tracing::debug!(target: TRACING_TARGET, id = %id, "metadata requested");
    Err(AppError::NotImplemented)
}
