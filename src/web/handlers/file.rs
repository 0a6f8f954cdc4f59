//! File handlers.

use axum::{
    extract::{Multipart, Path, Query, State},
    response::Response,
    Json,
};
use bytes::Bytes;
use std::sync::Arc;

use crate::file::{FileList, FileQuery, FileService, FileType, UploadRequest};
use crate::revalidate::RevalidationLog;
use crate::web::dto::{
    ApiResponse, DeleteFileQuery, DeleteResponse, ListFilesQuery, RenameFileRequest,
    UpdateFileUsersRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::CurrentUser;

use super::{revalidated, AppState};

/// Parse a comma-separated list of file types.
fn parse_types(types: &str) -> Result<Vec<FileType>, ApiError> {
    types
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.parse::<FileType>().map_err(ApiError::bad_request))
        .collect()
}

/// GET /api/files - Files owned by or shared with the signed-in user.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    CurrentUser { user, .. }: CurrentUser,
    Query(params): Query<ListFilesQuery>,
) -> Result<Json<ApiResponse<FileList>>, ApiError> {
    let mut query = FileQuery::new()
        .with_types(parse_types(&params.types)?)
        .with_search(params.search)
        .with_sort(&params.sort);
    if let Some(limit) = params.limit {
        query = query.with_limit(limit);
    }

    let log = RevalidationLog::new();
    let files = FileService::new(&state.gateway, &log)
        .list(&user, &query)
        .await?;

    Ok(Json(ApiResponse::new(files)))
}

/// POST /api/files - Upload a file.
///
/// Request body: multipart/form-data with a "file" field and an optional
/// "path" field naming the page to revalidate.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    CurrentUser { user, .. }: CurrentUser,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut filename: Option<String> = None;
    let mut content: Option<Bytes> = None;
    let mut path = "/".to_string();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                filename = field.file_name().map(|s| s.to_string());
                content = Some(field.bytes().await.map_err(|e| {
                    tracing::error!("Failed to read file content: {}", e);
                    ApiError::bad_request("Failed to read file")
                })?);
            }
            "path" => {
                path = field.text().await.map_err(|e| {
                    tracing::error!("Failed to read path: {}", e);
                    ApiError::bad_request("Invalid path")
                })?;
            }
            _ => {}
        }
    }

    let filename = filename.ok_or_else(|| ApiError::bad_request("No file provided"))?;
    let content = content.ok_or_else(|| ApiError::bad_request("No file content"))?;

    let log = RevalidationLog::new();
    let file = FileService::new(&state.gateway, &log)
        .with_max_file_size(state.max_upload_size)
        .upload(UploadRequest::new(
            filename,
            content,
            user.id,
            user.account_id,
            path,
        ))
        .await?;

    Ok(revalidated(&log, file))
}

/// PATCH /api/files/:id/name - Rename a file.
pub async fn rename_file(
    State(state): State<Arc<AppState>>,
    CurrentUser { user, .. }: CurrentUser,
    Path(file_id): Path<String>,
    ValidatedJson(req): ValidatedJson<RenameFileRequest>,
) -> Result<Response, ApiError> {
    let log = RevalidationLog::new();
    let file = FileService::new(&state.gateway, &log)
        .rename(&user, &file_id, &req.name, &req.extension, &req.path)
        .await?;

    Ok(revalidated(&log, file))
}

/// PUT /api/files/:id/users - Replace the emails a file is shared with.
pub async fn update_file_users(
    State(state): State<Arc<AppState>>,
    CurrentUser { user, .. }: CurrentUser,
    Path(file_id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateFileUsersRequest>,
) -> Result<Response, ApiError> {
    let log = RevalidationLog::new();
    let file = FileService::new(&state.gateway, &log)
        .update_users(&user, &file_id, &req.emails, &req.path)
        .await?;

    Ok(revalidated(&log, file))
}

/// DELETE /api/files/:id - Delete a file and the blob it points at.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    CurrentUser { user, .. }: CurrentUser,
    Path(file_id): Path<String>,
    Query(params): Query<DeleteFileQuery>,
) -> Result<Response, ApiError> {
    let log = RevalidationLog::new();
    let status = FileService::new(&state.gateway, &log)
        .delete(&user, &file_id, &params.path)
        .await?;

    Ok(revalidated(&log, DeleteResponse { status }))
}
