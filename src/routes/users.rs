use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    auth::AdminOnly,
    error::{Error, Result},
    storage::{User, UserRole},
    AppState,
};

/// User management listing with the header counters
#[derive(Serialize)]
pub struct UserListResponse {
    pub total: usize,
    pub admins: usize,
    #[serde(rename = "regularUsers")]
    pub regular_users: usize,
    pub users: Vec<User>,
}

impl UserListResponse {
    pub fn new(users: Vec<User>) -> Self {
        let admins = users.iter().filter(|u| u.is_admin()).count();
        Self {
            total: users.len(),
            admins,
            regular_users: users.len() - admins,
            users,
        }
    }
}

/// GET /api/users - All accounts, most recently active first
pub async fn list_users(
    State(state): State<AppState>,
    AdminOnly(_user): AdminOnly,
) -> Result<Json<UserListResponse>> {
    let users = state.storage.list_users().await?;
    Ok(Json(UserListResponse::new(users)))
}

#[derive(Deserialize)]
pub struct RoleRequest {
    pub role: UserRole,
}

/// PATCH /api/users/:id/role - Promote or demote an account
pub async fn update_role(
    State(state): State<AppState>,
    AdminOnly(current): AdminOnly,
    Path(id): Path<String>,
    Json(request): Json<RoleRequest>,
) -> Result<Json<User>> {
    // Prevent admins from demoting themselves
    if id == current.id && request.role != UserRole::Admin {
        return Err(Error::BadRequest("Cannot demote yourself from admin".to_string()));
    }

    let user = state.storage.set_user_role(&id, request.role).await?;
    tracing::info!(
        "{} changed role of {} to {}",
        current.email,
        user.display_name(),
        user.role.as_str()
    );
    Ok(Json(user))
}

/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    AdminOnly(current): AdminOnly,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    if id == current.id {
        return Err(Error::BadRequest("Cannot delete yourself".to_string()));
    }

    state.storage.delete_user(&id).await?;
    tracing::info!("User {} deleted by {}", id, current.email);
    Ok(StatusCode::NO_CONTENT)
}
