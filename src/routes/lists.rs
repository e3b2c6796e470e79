use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    auth::AdminOnly,
    catalog::{NamedItem, NamedList},
    error::Result,
    AppState,
};

/// Body for adding or renaming a category/advertiser
#[derive(Deserialize)]
pub struct NameRequest {
    pub name: String,
}

async fn list(state: &AppState, list: NamedList) -> Result<Json<Vec<NamedItem>>> {
    Ok(Json(state.storage.list_named(list).await?))
}

async fn add(state: &AppState, list: NamedList, name: &str) -> Result<(StatusCode, Json<NamedItem>)> {
    let item = state.storage.add_named(list, name).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn rename(state: &AppState, list: NamedList, id: &str, name: &str) -> Result<Json<NamedItem>> {
    Ok(Json(state.storage.rename_named(list, id, name).await?))
}

async fn remove(state: &AppState, list: NamedList, id: &str) -> Result<StatusCode> {
    state.storage.delete_named(list, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/categories
pub async fn list_categories(
    State(state): State<AppState>,
    AdminOnly(_user): AdminOnly,
) -> Result<Json<Vec<NamedItem>>> {
    list(&state, NamedList::Categories).await
}

/// POST /api/categories
pub async fn add_category(
    State(state): State<AppState>,
    AdminOnly(_user): AdminOnly,
    Json(request): Json<NameRequest>,
) -> Result<(StatusCode, Json<NamedItem>)> {
    add(&state, NamedList::Categories, &request.name).await
}

/// PATCH /api/categories/:id
pub async fn rename_category(
    State(state): State<AppState>,
    AdminOnly(_user): AdminOnly,
    Path(id): Path<String>,
    Json(request): Json<NameRequest>,
) -> Result<Json<NamedItem>> {
    rename(&state, NamedList::Categories, &id, &request.name).await
}

/// DELETE /api/categories/:id
pub async fn delete_category(
    State(state): State<AppState>,
    AdminOnly(_user): AdminOnly,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    remove(&state, NamedList::Categories, &id).await
}

/// GET /api/advertisers
pub async fn list_advertisers(
    State(state): State<AppState>,
    AdminOnly(_user): AdminOnly,
) -> Result<Json<Vec<NamedItem>>> {
    list(&state, NamedList::Advertisers).await
}

/// POST /api/advertisers
pub async fn add_advertiser(
    State(state): State<AppState>,
    AdminOnly(_user): AdminOnly,
    Json(request): Json<NameRequest>,
) -> Result<(StatusCode, Json<NamedItem>)> {
    add(&state, NamedList::Advertisers, &request.name).await
}

/// PATCH /api/advertisers/:id
pub async fn rename_advertiser(
    State(state): State<AppState>,
    AdminOnly(_user): AdminOnly,
    Path(id): Path<String>,
    Json(request): Json<NameRequest>,
) -> Result<Json<NamedItem>> {
    rename(&state, NamedList::Advertisers, &id, &request.name).await
}

/// DELETE /api/advertisers/:id
pub async fn delete_advertiser(
    State(state): State<AppState>,
    AdminOnly(_user): AdminOnly,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    remove(&state, NamedList::Advertisers, &id).await
}
