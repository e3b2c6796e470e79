use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::{error::Error, storage::User, AppState};

/// Session key for storing the account e-mail
pub const SESSION_EMAIL_KEY: &str = "email";

/// Session key for storing user token
pub const SESSION_TOKEN_KEY: &str = "token";

/// Authentication middleware that checks if user is logged in
///
/// The resolved [`User`] is placed in the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    if is_public_path(request.uri().path()) {
        return next.run(request).await;
    }

    if let Ok(Some(token)) = session.get::<String>(SESSION_TOKEN_KEY).await {
        match state.storage.verify_token(&token).await {
            Ok(Some(user)) => {
                request.extensions_mut().insert(user);
                return next.run(request).await;
            }
            Ok(None) => {
                // Token invalid, clear session
                let _ = session.delete().await;
            }
            Err(e) => {
                tracing::error!("Error verifying token: {}", e);
            }
        }
    }

    Error::AuthFailed.into_response()
}

/// Check if a path should skip authentication
fn is_public_path(path: &str) -> bool {
    path == "/api/login" || path == "/api/register" || path.starts_with("/uploads/")
}

/// Logged-in account, injected by [`require_auth`]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(CurrentUser)
            .ok_or(Error::AuthFailed)
    }
}

/// Extractor that requires the logged-in account to be an admin
pub struct AdminOnly(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AdminOnly
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if user.is_admin() {
            Ok(AdminOnly(user))
        } else {
            tracing::warn!("Non-admin {} denied access to {}", user.email, parts.uri.path());
            Err(Error::Forbidden("Admin access required".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::UserRole;
    use axum::http::Request as HttpRequest;

    fn parts_with(user: Option<User>) -> Parts {
        let (mut parts, _) = HttpRequest::builder()
            .uri("/api/videos")
            .body(())
            .unwrap()
            .into_parts();
        if let Some(user) = user {
            parts.extensions.insert(user);
        }
        parts
    }

    fn user(role: UserRole) -> User {
        User {
            id: "u1".to_string(),
            email: "staff@uact.app".to_string(),
            name: None,
            role,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_public_paths() {
        assert!(is_public_path("/api/login"));
        assert!(is_public_path("/api/register"));
        assert!(is_public_path("/uploads/thumbnails/a.png_1"));
        assert!(!is_public_path("/api/videos"));
        assert!(!is_public_path("/api/login/extra"));
    }

    #[tokio::test]
    async fn test_admin_only_accepts_admin() {
        let mut parts = parts_with(Some(user(UserRole::Admin)));
        let result = AdminOnly::from_request_parts(&mut parts, &()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_admin_only_rejects_regular_user() {
        let mut parts = parts_with(Some(user(UserRole::User)));
        let result = AdminOnly::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(Error::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_missing_user_is_unauthenticated() {
        let mut parts = parts_with(None);
        let result = CurrentUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(Error::AuthFailed)));
    }
}
