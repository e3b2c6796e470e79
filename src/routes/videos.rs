use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::AdminOnly,
    catalog::{video::sample_draft, Video, VideoDraft, VideoSummary},
    error::{Error, Result},
    AppState,
};

/// GET /api/videos - Manage-videos table, most recently active first
pub async fn list_videos(
    State(state): State<AppState>,
    AdminOnly(_user): AdminOnly,
) -> Result<Json<Vec<VideoSummary>>> {
    let videos = state.storage.list_videos().await?;
    Ok(Json(videos.iter().map(VideoSummary::from).collect()))
}

/// GET /api/videos/:id - Full document for the edit form
pub async fn get_video(
    State(state): State<AppState>,
    AdminOnly(_user): AdminOnly,
    Path(id): Path<String>,
) -> Result<Json<Video>> {
    let video = state
        .storage
        .get_video(&id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Video not found: {}", id)))?;
    Ok(Json(video))
}

/// POST /api/videos - Upload a new video and announce it
pub async fn create_video(
    State(state): State<AppState>,
    AdminOnly(user): AdminOnly,
    Json(draft): Json<VideoDraft>,
) -> Result<(StatusCode, Json<Video>)> {
    let fields = draft.normalize()?;
    let video = state.storage.create_video(fields).await?;

    tracing::info!("Video '{}' uploaded by {}", video.fields.title, user.email);
    state.notifier.spawn_new_video(&video);

    Ok((StatusCode::CREATED, Json(video)))
}

/// PUT /api/videos/:id - Replace a video's metadata
pub async fn update_video(
    State(state): State<AppState>,
    AdminOnly(user): AdminOnly,
    Path(id): Path<String>,
    Json(draft): Json<VideoDraft>,
) -> Result<Json<Video>> {
    let fields = draft.normalize()?;
    let video = state.storage.update_video(&id, fields).await?;

    tracing::info!("Video '{}' updated by {}", video.fields.title, user.email);
    Ok(Json(video))
}

/// DELETE /api/videos/:id
pub async fn delete_video(
    State(state): State<AppState>,
    AdminOnly(user): AdminOnly,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.storage.delete_video(&id).await?;
    tracing::info!("Video {} deleted by {}", id, user.email);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/videos/sample - Prefilled upload form
pub async fn sample_video(AdminOnly(_user): AdminOnly) -> Json<VideoDraft> {
    Json(sample_draft())
}
