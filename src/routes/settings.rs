use axum::{extract::State, Json};

use crate::{auth::AdminOnly, catalog::SiteSettings, error::Result, AppState};

/// GET /api/settings
pub async fn get_settings(
    State(state): State<AppState>,
    AdminOnly(_user): AdminOnly,
) -> Result<Json<SiteSettings>> {
    Ok(Json(state.storage.get_settings().await?))
}

/// PATCH /api/settings - Change one or more settings
pub async fn update_settings(
    State(state): State<AppState>,
    AdminOnly(user): AdminOnly,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<SiteSettings>> {
    let current = state.storage.get_settings().await?;
    let updated = current.merge(patch)?;
    state.storage.save_settings(&updated).await?;

    tracing::info!("Site settings updated by {}", user.email);
    Ok(Json(updated))
}
