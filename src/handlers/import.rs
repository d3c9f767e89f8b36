use axum::{
    extract::{
        multipart::{Field, MultipartRejection},
        Json, Multipart, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::ImportHandlerState;
use crate::errors::ServiceError;
use crate::import::{ImportOutcome, StagedUpload};

/// Multipart field carrying the CSV file
pub const UPLOAD_FIELD: &str = "csvFile";

const UPLOAD_SUCCESS_MESSAGE: &str = "CSV data successfully uploaded!";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImportResponse {
    #[schema(example = "CSV data successfully uploaded!")]
    pub message: String,
    /// Number of products persisted
    pub inserted: u64,
}

pub fn import_routes<S>() -> Router<S>
where
    S: ImportHandlerState,
{
    Router::new().route("/upload-csv", post(upload_csv::<S>))
}

/// Bulk import products from a CSV upload
#[utoipa::path(
    post,
    path = "/api/v1/upload-csv",
    request_body(content_type = "multipart/form-data", description = "CSV file in the `csvFile` field"),
    responses(
        (status = 200, description = "Every valid row inserted", body = ImportResponse,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "No file uploaded or no valid rows", body = crate::errors::ErrorResponse),
        (status = 500, description = "CSV processing or database insertion error", body = crate::errors::ErrorResponse)
    ),
    tag = "import"
)]
pub async fn upload_csv<S>(
    State(state): State<S>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: ImportHandlerState,
{
    let mut multipart = multipart.map_err(|rejection| {
        warn!(error = %rejection, "Request is not a multipart upload");
        ServiceError::MissingUpload
    })?;

    let upload = stage_upload(&mut multipart, state.upload_dir())
        .await?
        .ok_or(ServiceError::MissingUpload)?;
    info!(
        file = upload.original_name().unwrap_or("<unnamed>"),
        bytes = upload.size(),
        "CSV upload received"
    );

    match state.import_coordinator().import_staged(upload).await {
        ImportOutcome::Accepted { count } => Ok((
            StatusCode::OK,
            Json(ImportResponse {
                message: UPLOAD_SUCCESS_MESSAGE.to_string(),
                inserted: count,
            }),
        )),
        ImportOutcome::Rejected { reason } => Err(reason.into()),
    }
}

/// Streams the first `csvFile` field to disk; other fields are ignored
async fn stage_upload(
    multipart: &mut Multipart,
    dir: &Path,
) -> Result<Option<StagedUpload>, ServiceError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        return stage_field(field, dir).await.map(Some);
    }
    Ok(None)
}

async fn stage_field(mut field: Field<'_>, dir: &Path) -> Result<StagedUpload, ServiceError> {
    let original_name = field.file_name().map(str::to_string);
    let mut upload = StagedUpload::create_in(dir, original_name).map_err(staging_error)?;
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        upload.write_chunk(&chunk).map_err(staging_error)?;
    }
    upload.finish().map_err(staging_error)?;
    Ok(upload)
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ServiceError {
    ServiceError::BadRequest(format!("invalid multipart body: {}", err.body_text()))
}

fn staging_error(err: std::io::Error) -> ServiceError {
    ServiceError::InternalError(format!("failed to stage upload: {}", err))
}
