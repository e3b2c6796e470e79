use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    auth::{CurrentUser, SESSION_EMAIL_KEY, SESSION_TOKEN_KEY},
    error::{Error, Result},
    storage::User,
    AppState,
};

/// Login and registration body
#[derive(Deserialize)]
pub struct Credentials {
    email: String,
    password: String,
}

/// POST /api/login - Verify credentials and open a session
pub async fn post_login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<Credentials>,
) -> Result<Json<User>> {
    let email = form.email.trim();
    let Some(token) = state.storage.verify_user(email, &form.password).await? else {
        tracing::warn!("Failed login attempt for email: {}", email);
        return Err(Error::AuthFailed);
    };

    let user = state
        .storage
        .verify_token(&token)
        .await?
        .ok_or_else(|| Error::Internal("Token vanished after login".to_string()))?;

    session
        .insert(SESSION_TOKEN_KEY, token)
        .await
        .map_err(|e| Error::Internal(format!("Failed to save session: {}", e)))?;
    session
        .insert(SESSION_EMAIL_KEY, user.email.clone())
        .await
        .map_err(|e| Error::Internal(format!("Failed to save session: {}", e)))?;

    tracing::info!("User {} logged in successfully", user.email);
    Ok(Json(user))
}

/// POST /api/register - Create a console account
pub async fn post_register(
    State(state): State<AppState>,
    Json(form): Json<Credentials>,
) -> Result<(StatusCode, Json<User>)> {
    if !state.config.allow_registration {
        return Err(Error::Forbidden("Registration is disabled".to_string()));
    }

    let user = state
        .storage
        .register_user(&form.email, &form.password, state.config.min_password_length)
        .await?;

    tracing::info!("Account registered: {}", user.email);
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/logout - Revoke the token and clear the session
pub async fn post_logout(State(state): State<AppState>, session: Session) -> Result<StatusCode> {
    if let Ok(Some(token)) = session.get::<String>(SESSION_TOKEN_KEY).await {
        state.storage.logout(&token).await?;
    }

    session
        .delete()
        .await
        .map_err(|e| Error::Internal(format!("Failed to clear session: {}", e)))?;

    tracing::info!("User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/me - The logged-in account
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}
