use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::{
    auth::AdminOnly,
    error::{Error, Result},
    AppState,
};

/// Public URL prefix the upload directory is served under
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

#[derive(Serialize)]
pub struct ThumbnailResponse {
    pub url: String,
}

/// Name a thumbnail is stored under: `<client file name>_<unix millis>`
///
/// Only the last path component of the client-supplied name is kept.
pub fn stored_file_name(client_name: &str, millis: i64) -> Option<String> {
    let base = client_name
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")?;
    Some(format!("{}_{}", base, millis))
}

/// POST /api/thumbnails - Store an uploaded thumbnail image
///
/// Expects a multipart field named `file`. Responds with the public URL to
/// put in the video's `thumbnail` field.
pub async fn upload_thumbnail(
    State(state): State<AppState>,
    AdminOnly(user): AdminOnly,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ThumbnailResponse>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(format!("Invalid upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let client_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.is_empty() && !content_type.starts_with("image/") {
            return Err(Error::BadRequest(format!(
                "Thumbnail must be an image, got {}",
                content_type
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| Error::BadRequest(format!("Invalid upload: {}", e)))?;
        if data.is_empty() {
            return Err(Error::BadRequest("Thumbnail file is empty".to_string()));
        }

        let file_name = stored_file_name(&client_name, chrono::Utc::now().timestamp_millis())
            .ok_or_else(|| Error::BadRequest("Thumbnail file name is required".to_string()))?;

        let dir = state.config.thumbnail_dir();
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&file_name), &data).await?;

        tracing::info!(
            "Thumbnail {} ({} bytes) uploaded by {}",
            file_name,
            data.len(),
            user.email
        );

        let url = format!("{}/thumbnails/{}", UPLOADS_URL_PREFIX, file_name);
        return Ok((StatusCode::CREATED, Json(ThumbnailResponse { url })));
    }

    Err(Error::BadRequest("Missing 'file' field".to_string()))
}
