use std::path::Path;

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow},
    Row,
};
use uuid::Uuid;

use crate::catalog::{
    clean_name, order_by_recent_activity, NamedItem, NamedList, SiteSettings, Timestamped, Video,
    VideoFields,
};
use crate::error::{Error, Result};

/// bcrypt work factor; test builds use the minimum
const BCRYPT_COST: u32 = if cfg!(test) { 4 } else { DEFAULT_COST };

/// E-mail of the account created on first start
pub const INITIAL_ADMIN_EMAIL: &str = "admin@localhost";

/// Console account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }

    fn parse(value: &str) -> Result<Self> {
        match value {
            "admin" => Ok(UserRole::Admin),
            "user" => Ok(UserRole::User),
            other => Err(Error::Internal(format!("Unknown user role: {}", other))),
        }
    }
}

/// A console account (password hash and token stay in the database)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: UserRole,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Name if set, otherwise e-mail
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

impl Timestamped for User {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

/// Database storage layer - accounts, sessions and console documents
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    /// Open (creating if needed) the database and run migrations
    pub async fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePool::connect_with(options).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| Error::Internal(format!("Migration failed: {}", e)))?;

        let storage = Self { pool };

        // Initialize admin user if no users exist
        storage.init_admin_if_needed().await?;

        Ok(storage)
    }

    /// Create initial admin user with random password if no users exist
    async fn init_admin_if_needed(&self) -> Result<()> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        if count == 0 {
            let random_password = generate_random_password();
            self.insert_user(INITIAL_ADMIN_EMAIL, None, &random_password, UserRole::Admin)
                .await?;

            tracing::warn!("═══════════════════════════════════════════════════════════");
            tracing::warn!("Initial admin user created!");
            tracing::warn!("Email: {}", INITIAL_ADMIN_EMAIL);
            tracing::warn!("Password: {}", random_password);
            tracing::warn!("Please change this password immediately after first login!");
            tracing::warn!("═══════════════════════════════════════════════════════════");
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    async fn insert_user(
        &self,
        email: &str,
        name: Option<&str>,
        password: &str,
        role: UserRole,
    ) -> Result<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: name.map(str::to_string),
            role,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        let password_hash = hash_password(password)?;

        sqlx::query(
            "INSERT INTO users (id, email, name, password, token, role, created_at, updated_at) \
             VALUES (?, ?, ?, ?, NULL, ?, ?, NULL)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&password_hash)
        .bind(role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        tracing::info!("Created user: {} (role: {})", user.email, role.as_str());
        Ok(user)
    }

    /// Register a console account
    ///
    /// Registered accounts are admins; access is gated by `allow_registration`.
    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
        min_password_length: usize,
    ) -> Result<User> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || password.is_empty() {
            return Err(Error::BadRequest("Email and password are required".to_string()));
        }
        if password.chars().count() < min_password_length {
            return Err(Error::BadRequest(format!(
                "Password must be at least {} characters long",
                min_password_length
            )));
        }
        if self.email_exists(&email).await? {
            return Err(Error::Conflict(format!(
                "{} is already registered. Please log in instead.",
                email
            )));
        }

        self.insert_user(&email, None, password, UserRole::Admin).await
    }

    /// Check if an e-mail is already registered
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Verify e-mail and password, return session token on success
    pub async fn verify_user(&self, email: &str, password: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT password, token FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            tracing::debug!("User not found: {}", email);
            return Ok(None);
        };

        let password_hash: String = row.try_get("password")?;
        if !verify_password(password, &password_hash)? {
            tracing::debug!("Password verification failed for user: {}", email);
            return Ok(None);
        }

        tracing::debug!("User {} verified successfully", email);

        // Return existing token or generate new one
        let token: Option<String> = row.try_get("token")?;
        if let Some(existing_token) = token {
            return Ok(Some(existing_token));
        }

        let new_token = Uuid::new_v4().to_string();
        sqlx::query("UPDATE users SET token = ? WHERE email = ?")
            .bind(&new_token)
            .bind(email)
            .execute(&self.pool)
            .await?;

        Ok(Some(new_token))
    }

    /// Resolve a session token to its account
    pub async fn verify_token(&self, token: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, name, role, created_at, updated_at FROM users WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Clear a session token
    pub async fn logout(&self, token: &str) -> Result<()> {
        sqlx::query("UPDATE users SET token = NULL WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, name, role, created_at, updated_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// All accounts, most recently active first
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT id, email, name, role, created_at, updated_at FROM users")
            .fetch_all(&self.pool)
            .await?;

        let users = rows.iter().map(user_from_row).collect::<Result<Vec<_>>>()?;
        Ok(order_by_recent_activity(users))
    }

    /// Promote or demote an account, stamping the update time
    pub async fn set_user_role(&self, id: &str, role: UserRole) -> Result<User> {
        let result = sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("User not found: {}", id)));
        }

        tracing::info!("User {} role set to {}", id, role.as_str());
        self.get_user(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User not found: {}", id)))
    }

    pub async fn delete_user(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("User not found: {}", id)));
        }

        tracing::info!("Deleted user: {}", id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Videos
    // ------------------------------------------------------------------

    /// All videos, most recently active first
    pub async fn list_videos(&self) -> Result<Vec<Video>> {
        let rows = sqlx::query("SELECT id, document, created_at, updated_at FROM videos")
            .fetch_all(&self.pool)
            .await?;

        let videos = rows.iter().map(video_from_row).collect::<Result<Vec<_>>>()?;
        Ok(order_by_recent_activity(videos))
    }

    pub async fn get_video(&self, id: &str) -> Result<Option<Video>> {
        let row = sqlx::query("SELECT id, document, created_at, updated_at FROM videos WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(video_from_row).transpose()
    }

    /// Store a new video; both timestamps are set to now
    pub async fn create_video(&self, fields: VideoFields) -> Result<Video> {
        let now = Utc::now();
        let video = Video {
            id: Uuid::new_v4().to_string(),
            fields,
            created_at: Some(now),
            updated_at: Some(now),
        };

        sqlx::query(
            "INSERT INTO videos (id, title, document, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&video.id)
        .bind(&video.fields.title)
        .bind(serde_json::to_string(&video.fields)?)
        .bind(video.created_at)
        .bind(video.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::info!("Created video: {} ({})", video.fields.title, video.id);
        Ok(video)
    }

    /// Overwrite a video's metadata
    ///
    /// The creation time and the app-maintained counters are kept.
    pub async fn update_video(&self, id: &str, mut fields: VideoFields) -> Result<Video> {
        let existing = self
            .get_video(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Video not found: {}", id)))?;

        fields.play_count = existing.fields.play_count;
        fields.likes_count = existing.fields.likes_count;

        let video = Video {
            id: existing.id,
            fields,
            created_at: existing.created_at,
            updated_at: Some(Utc::now()),
        };

        sqlx::query("UPDATE videos SET title = ?, document = ?, updated_at = ? WHERE id = ?")
            .bind(&video.fields.title)
            .bind(serde_json::to_string(&video.fields)?)
            .bind(video.updated_at)
            .bind(&video.id)
            .execute(&self.pool)
            .await?;

        tracing::info!("Updated video: {} ({})", video.fields.title, video.id);
        Ok(video)
    }

    pub async fn delete_video(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM videos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Video not found: {}", id)));
        }

        tracing::info!("Deleted video: {}", id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Categories and advertisers
    // ------------------------------------------------------------------

    /// Entries of a name list in insertion order
    pub async fn list_named(&self, list: NamedList) -> Result<Vec<NamedItem>> {
        let rows = sqlx::query(&format!("SELECT id, name FROM {} ORDER BY rowid", list.table()))
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(NamedItem {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                })
            })
            .collect()
    }

    pub async fn add_named(&self, list: NamedList, name: &str) -> Result<NamedItem> {
        let name = clean_name(name)
            .ok_or_else(|| Error::BadRequest(format!("{} name is required", list.noun())))?;
        let item = NamedItem {
            id: Uuid::new_v4().to_string(),
            name,
        };

        sqlx::query(&format!("INSERT INTO {} (id, name) VALUES (?, ?)", list.table()))
            .bind(&item.id)
            .bind(&item.name)
            .execute(&self.pool)
            .await?;

        tracing::info!("{} added: {}", list.noun(), item.name);
        Ok(item)
    }

    pub async fn rename_named(&self, list: NamedList, id: &str, name: &str) -> Result<NamedItem> {
        let name = clean_name(name)
            .ok_or_else(|| Error::BadRequest(format!("{} name is required", list.noun())))?;

        let result = sqlx::query(&format!("UPDATE {} SET name = ? WHERE id = ?", list.table()))
            .bind(&name)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("{} not found: {}", list.noun(), id)));
        }

        tracing::info!("{} {} renamed to {}", list.noun(), id, name);
        Ok(NamedItem {
            id: id.to_string(),
            name,
        })
    }

    pub async fn delete_named(&self, list: NamedList, id: &str) -> Result<()> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", list.table()))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("{} not found: {}", list.noun(), id)));
        }

        tracing::info!("{} deleted: {}", list.noun(), id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Stored settings over defaults
    pub async fn get_settings(&self) -> Result<SiteSettings> {
        let document: Option<String> =
            sqlx::query_scalar("SELECT document FROM settings WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        match document {
            Some(document) => Ok(serde_json::from_str(&document)?),
            None => Ok(SiteSettings::default()),
        }
    }

    pub async fn save_settings(&self, settings: &SiteSettings) -> Result<()> {
        sqlx::query(
            "INSERT INTO settings (id, document) VALUES (1, ?) \
             ON CONFLICT(id) DO UPDATE SET document = excluded.document",
        )
        .bind(serde_json::to_string(settings)?)
        .execute(&self.pool)
        .await?;

        tracing::info!("Site settings saved");
        Ok(())
    }

    /// Get database pool for advanced operations
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn user_from_row(row: &SqliteRow) -> Result<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        role: UserRole::parse(&role)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn video_from_row(row: &SqliteRow) -> Result<Video> {
    let document: String = row.try_get("document")?;
    Ok(Video {
        id: row.try_get("id")?,
        fields: serde_json::from_str(&document)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Hash a password using bcrypt
fn hash_password(password: &str) -> Result<String> {
    hash(password, BCRYPT_COST)
        .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a hash
fn verify_password(password: &str, hash: &str) -> Result<bool> {
    verify(password, hash)
        .map_err(|e| Error::Internal(format!("Password verification failed: {}", e)))
}

/// Generate a random password for the initial admin
fn generate_random_password() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                             abcdefghijklmnopqrstuvwxyz\
                             0123456789";
    const PASSWORD_LEN: usize = 12;
    let mut rng = rand::thread_rng();

    (0..PASSWORD_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
