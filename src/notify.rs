//! Push notification sent when a new video is published.
//!
//! [`Notifier`] POSTs a JSON [`PushMessage`] to the configured push gateway.
//! Each video creation triggers exactly one attempt. A failed delivery is
//! logged and never surfaces to the request that created the video.

use std::time::Duration;

use serde::Serialize;

use crate::catalog::Video;
use crate::config::Config;
use crate::error::{Error, Result};

/// Notification title for new videos
pub const NEW_VIDEO_TITLE: &str = "🎬 New Roleplay Video";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
}

/// Topic-addressed push message, as accepted by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushMessage {
    pub notification: PushNotification,
    pub topic: String,
}

impl PushMessage {
    /// Announcement for a freshly created video
    pub fn new_video(video_title: &str, topic: &str) -> Self {
        Self {
            notification: PushNotification {
                title: NEW_VIDEO_TITLE.to_string(),
                body: format!("{} is now available. Try it out!", video_title),
            },
            topic: topic.to_string(),
        }
    }
}

/// Delivers push messages to the gateway
#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    endpoint: Option<String>,
    api_key: Option<String>,
    topic: String,
}

impl Notifier {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.notification_timeout_seconds))
            .build()?;

        if config.notification_endpoint.is_none() {
            tracing::info!("No notification endpoint configured, push messages will only be logged");
        }

        Ok(Self {
            client,
            endpoint: config.notification_endpoint.clone(),
            api_key: config.notification_api_key.clone(),
            topic: config.notification_topic.clone(),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Send the new-video announcement
    pub async fn notify_new_video(&self, video: &Video) -> Result<()> {
        let message = PushMessage::new_video(&video.fields.title, &self.topic);
        self.send(&message).await
    }

    /// Announce a new video on a background task
    ///
    /// Errors are logged; the caller does not wait for delivery.
    pub fn spawn_new_video(&self, video: &Video) {
        let notifier = self.clone();
        let video = video.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify_new_video(&video).await {
                tracing::error!(video_id = %video.id, error = %e, "Error sending notification");
            }
        });
    }

    async fn send(&self, message: &PushMessage) -> Result<()> {
        let Some(endpoint) = &self.endpoint else {
            tracing::info!(
                topic = %message.topic,
                body = %message.notification.body,
                "Push gateway not configured, skipping delivery"
            );
            return Ok(());
        };

        let mut request = self.client.post(endpoint).json(message);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Error::Internal(format!(
                "Push gateway returned HTTP {}",
                response.status().as_u16()
            )));
        }

        tracing::info!(topic = %message.topic, "Notification sent: {}", message.notification.body);
        Ok(())
    }
}
