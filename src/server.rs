use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::{
    auth::require_auth,
    config::Config,
    error::{Error, Result},
    notify::Notifier,
    routes::{
        add_advertiser, add_category, apply_edit, create_video, delete_advertiser,
        delete_category, delete_user, delete_video, get_me, get_settings, get_video,
        list_advertisers, list_categories, list_users, list_videos, new_segment, post_login,
        post_logout, post_register, rename_advertiser, rename_category, sample_video,
        thumbnails::UPLOADS_URL_PREFIX, update_role, update_settings, update_video,
        upload_thumbnail,
    },
    Storage,
};

/// Largest accepted thumbnail upload
const MAX_THUMBNAIL_BYTES: usize = 10 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub notifier: Notifier,
    pub config: Arc<Config>,
}

/// Open storage and assemble the full application router
pub async fn build_app(config: Config) -> Result<Router> {
    config.validate()?;

    tracing::info!("Connecting to database: {}", config.db_path.display());
    let storage = Storage::new(&config.db_path).await?;
    tracing::info!("Database initialized at {}", config.db_path.display());

    let notifier = Notifier::new(&config)?;

    // Session store shares the application database
    let session_store = SqliteStore::new(storage.pool().clone());
    session_store
        .migrate()
        .await
        .map_err(|e| Error::Internal(format!("Session migration failed: {}", e)))?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.secure_cookies)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(
            config.session_expiry_days,
        )));

    let upload_dir = config.upload_path.clone();
    tokio::fs::create_dir_all(&upload_dir).await?;

    let app_state = AppState {
        storage,
        notifier,
        config: Arc::new(config),
    };

    let app = Router::new()
        // Public routes (no auth required)
        .route("/api/login", post(post_login))
        .route("/api/register", post(post_register))
        .nest_service(UPLOADS_URL_PREFIX, ServeDir::new(upload_dir))
        // Session routes
        .route("/api/logout", post(post_logout))
        .route("/api/me", get(get_me))
        // Videos
        .route("/api/videos", get(list_videos).post(create_video))
        .route("/api/videos/sample", get(sample_video))
        .route(
            "/api/videos/:id",
            get(get_video).put(update_video).delete(delete_video),
        )
        // Upload form helpers
        .route("/api/segments/new", get(new_segment))
        .route("/api/segments/apply", post(apply_edit))
        .route(
            "/api/thumbnails",
            post(upload_thumbnail).layer(DefaultBodyLimit::max(MAX_THUMBNAIL_BYTES)),
        )
        // Categories and advertisers
        .route("/api/categories", get(list_categories).post(add_category))
        .route(
            "/api/categories/:id",
            patch(rename_category).delete(delete_category),
        )
        .route("/api/advertisers", get(list_advertisers).post(add_advertiser))
        .route(
            "/api/advertisers/:id",
            patch(rename_advertiser).delete(delete_advertiser),
        )
        // Users
        .route("/api/users", get(list_users))
        .route("/api/users/:id", axum::routing::delete(delete_user))
        .route("/api/users/:id/role", patch(update_role))
        // Settings
        .route("/api/settings", get(get_settings).patch(update_settings))
        // Add state and middleware
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    Ok(app)
}

/// Build and run the Axum server
pub async fn run(config: Config) -> Result<()> {
    tracing::info!("Starting UAct admin server");
    tracing::info!("Host: {}:{}", config.host, config.port);
    tracing::info!("Upload path: {}", config.upload_path.display());

    let addr = format!("{}:{}", config.host, config.port);
    let app = build_app(config).await?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_config(dir: &TempDir) -> Config {
        Config {
            db_path: dir.path().join("uact.db"),
            upload_path: dir.path().join("uploads"),
            ..Config::default()
        }
    }

    fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, cookie: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Register and log in, returning the session cookie
    async fn login(app: &Router, email: &str) -> String {
        let credentials = json!({ "email": email, "password": "secret1" });

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/register", None, credentials.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/login", None, credentials))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("login should set a session cookie")
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_api_requires_session() {
        let dir = TempDir::new().unwrap();
        let app = build_app(test_config(&dir)).await.unwrap();

        let response = app
            .oneshot(Request::builder().uri("/api/videos").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let dir = TempDir::new().unwrap();
        let app = build_app(test_config(&dir)).await.unwrap();

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/login",
                None,
                json!({ "email": "admin@localhost", "password": "guess" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_registration_can_be_disabled() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            allow_registration: false,
            ..test_config(&dir)
        };
        let app = build_app(config).await.unwrap();

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/register",
                None,
                json!({ "email": "new@uact.app", "password": "secret1" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_video_upload_flow() {
        let dir = TempDir::new().unwrap();
        let app = build_app(test_config(&dir)).await.unwrap();
        let cookie = login(&app, "staff@uact.app").await;

        let draft = json!({
            "title": "Coffee Order",
            "tags": "cafe, beginner",
            "duration": "02:05",
            "segments": [{ "type": "actor", "actorLine": "What can I get you?" }]
        });
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/videos", Some(&cookie), draft))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["duration"], 125);
        assert_eq!(created["tags"], json!(["cafe", "beginner"]));
        let id = created["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(get_request("/api/videos", &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let list = body_json(response).await;
        assert_eq!(list[0]["id"], id.as_str());
        assert_eq!(list[0]["duration"], "02:05");
        assert_eq!(list[0]["segments"], 1);

        let response = app
            .clone()
            .oneshot(Request::builder()
                .method("DELETE")
                .uri(format!("/api/videos/{}", id))
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(get_request(&format!("/api/videos/{}", id), &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_segment_apply_endpoint() {
        let dir = TempDir::new().unwrap();
        let app = build_app(test_config(&dir)).await.unwrap();
        let cookie = login(&app, "staff@uact.app").await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/segments/apply",
                Some(&cookie),
                json!({
                    "segment": { "type": "user", "userLine": "Hi." },
                    "edit": { "kind": "pasteSubtitles", "value": "A\nB" }
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let segment = body_json(response).await;
        assert_eq!(
            segment["subtitles"],
            json!({ "ar": "A", "zh": "B", "hi": "", "ja": "", "ko": "", "es": "", "vi": "" })
        );
    }

    #[tokio::test]
    async fn test_cannot_delete_self() {
        let dir = TempDir::new().unwrap();
        let app = build_app(test_config(&dir)).await.unwrap();
        let cookie = login(&app, "staff@uact.app").await;

        let response = app
            .clone()
            .oneshot(get_request("/api/me", &cookie))
            .await
            .unwrap();
        let me = body_json(response).await;
        let id = me["id"].as_str().unwrap();

        let response = app
            .oneshot(Request::builder()
                .method("DELETE")
                .uri(format!("/api/users/{}", id))
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cannot_demote_self() {
        let dir = TempDir::new().unwrap();
        let app = build_app(test_config(&dir)).await.unwrap();
        let cookie = login(&app, "staff@uact.app").await;

        let response = app
            .clone()
            .oneshot(get_request("/api/me", &cookie))
            .await
            .unwrap();
        let me = body_json(response).await;
        let id = me["id"].as_str().unwrap();

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/api/users/{}/role", id),
                Some(&cookie),
                json!({ "role": "user" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app.oneshot(get_request("/api/users", &cookie)).await.unwrap();
        let list = body_json(response).await;
        assert_eq!(list["admins"], 2);
    }

    #[tokio::test]
    async fn test_thumbnail_upload_is_served() {
        let dir = TempDir::new().unwrap();
        let app = build_app(test_config(&dir)).await.unwrap();
        let cookie = login(&app, "staff@uact.app").await;

        let boundary = "thumbnail-boundary";
        let body = format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"cover.png\"\r\n\
             Content-Type: image/png\r\n\r\n\
             not-really-a-png\r\n\
             --{b}--\r\n",
            b = boundary
        );
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/thumbnails")
                    .header(header::COOKIE, &cookie)
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={}", boundary),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let uploaded = body_json(response).await;
        let url = uploaded["url"].as_str().unwrap().to_string();
        assert!(url.starts_with("/uploads/thumbnails/cover.png_"));

        let stored = dir
            .path()
            .join("uploads")
            .join(url.trim_start_matches("/uploads/"));
        assert_eq!(std::fs::read(&stored).unwrap(), b"not-really-a-png");

        let response = app.oneshot(get_request(&url, &cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"not-really-a-png");
    }
}
