use std::convert::Infallible;
use std::path::PathBuf;

use axum::Json;
use axum::Router;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use cds_store::{ContentId, MemberPath};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::error::AppError;
use crate::routes::metadata;
use crate::state::AppState;

const TRACING_TARGET: &str = "cds_server::packages";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_packages))
        .route("/upload", post(upload_package))
        .route("/{id}", get(fetch_archive).delete(delete_package))
        .route("/{id}/{*path}", get(fetch_member))
}

#[derive(Debug, Deserialize)]
pub struct FetchParams {
    metadata: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadParams {
    content_id: Option<String>,
    redirect: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PackageList {
    pub packages: Vec<ContentId>,
}

async fn list_packages(State(state): State<AppState>) -> Result<Json<PackageList>, AppError> {
    let store = state.store().clone();
    let mut packages = tokio::task::spawn_blocking(move || store.list_packages())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    packages.sort();
    Ok(Json(PackageList { packages }))
}

#[tracing::instrument(skip_all, fields(id = %id))]
async fn fetch_archive(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<FetchParams>,
    request: Request,
) -> Result<Response, AppError> {
    let id = ContentId::parse(id)?;
    if params.metadata.is_some() {
        return metadata::package_metadata(&id).await;
    }
    let path = state.store().archive_file(&id).await?;
    Ok(serve_file(path, request).await)
}

#[tracing::instrument(skip_all, fields(id = %id, path = %path))]
async fn fetch_member(
    State(state): State<AppState>,
    Path((id, path)): Path<(String, String)>,
    request: Request,
) -> Result<Response, AppError> {
    let id = ContentId::parse(id)?;
    let member = MemberPath::parse(&path)?;
    let path = state.store().member_file(&id, &member).await?;
    Ok(serve_file(path, request).await)
}

#[tracing::instrument(skip_all)]
async fn upload_package(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let raw = params
        .content_id
        .ok_or_else(|| AppError::BadRequest("missing contentId parameter".into()))?;
    let id = ContentId::parse(raw)?;

    let location = params.redirect.unwrap_or_else(|| state.package_url(&id));
    let location = HeaderValue::from_str(&location)
        .map_err(|_| AppError::BadRequest(format!("invalid redirect location '{location}'")))?;

    let field = loop {
        match multipart.next_field().await? {
            Some(field) if field.file_name().is_some() => break field,
            Some(field) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    name = field.name().unwrap_or_default(),
                    "skipping field without filename"
                );
            }
            None => {
                return Err(AppError::BadRequest(
                    "no file provided in multipart request".into(),
                ));
            }
        }
    };

    let receipt = state.store().accept_upload(&id, field).await?;
    tracing::info!(
        target: TRACING_TARGET,
        id = %id,
        bytes = receipt.archive_bytes,
        entries = receipt.report.entry_count,
        "content package uploaded"
    );

    Ok((StatusCode::SEE_OTHER, [(LOCATION, location)]).into_response())
}

#[tracing::instrument(skip_all, fields(id = %id))]
async fn delete_package(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = ContentId::parse(id)?;
    state.store().delete_package(&id).await?;
    Ok(StatusCode::OK)
}

/// Stream a file with content-type guessing and range support.
async fn serve_file(path: PathBuf, request: Request) -> Response {
    ServeFile::new(path)
        .oneshot(request)
        .await
        .unwrap_or_else(|never: Infallible| match never {})
        .map(Body::new)
}
