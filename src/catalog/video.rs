use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ordering::Timestamped;
use super::segment::{Role, Segment};
use crate::error::{Error, Result};

/// Tag applied to new uploads when the operator leaves the field untouched
pub const DEFAULT_TAG: &str = "uAct-roleplay";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Creative,
}

/// Tags as typed into the form (comma separated) or as a stored list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Text(String),
}

impl Default for TagsInput {
    fn default() -> Self {
        TagsInput::Text(DEFAULT_TAG.to_string())
    }
}

/// Duration as seconds or as `mm:ss` text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationInput {
    Seconds(u32),
    Text(String),
}

impl Default for DurationInput {
    fn default() -> Self {
        DurationInput::Text(String::new())
    }
}

/// Upload form submission, before normalization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoDraft {
    pub title: String,
    pub description: String,
    pub youtube_url: String,
    pub tags: TagsInput,
    pub category: String,
    pub difficulty: Difficulty,
    pub duration: DurationInput,
    pub thumbnail: Option<String>,
    pub show_ad: bool,
    pub advertiser: String,
    pub is_premium: bool,
    pub is_ad_free: bool,
    pub is_public_good: bool,
    pub is_horizontal: bool,
    pub script_mode: bool,
    pub show_html_end: bool,
    pub segments: Vec<Segment>,
}

impl Default for VideoDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            youtube_url: String::new(),
            tags: TagsInput::default(),
            category: String::new(),
            difficulty: Difficulty::default(),
            duration: DurationInput::default(),
            thumbnail: None,
            show_ad: true,
            advertiser: String::new(),
            is_premium: false,
            is_ad_free: false,
            is_public_good: false,
            is_horizontal: false,
            script_mode: false,
            show_html_end: false,
            segments: Vec::new(),
        }
    }
}

/// Stored video metadata (everything except identity and timestamps)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoFields {
    pub title: String,
    pub description: String,
    pub youtube_url: String,
    pub tags: Vec<String>,
    pub category: String,
    pub difficulty: Difficulty,
    /// Whole seconds
    pub duration: u32,
    pub thumbnail: Option<String>,
    pub show_ad: bool,
    pub advertiser: String,
    pub is_premium: bool,
    pub is_ad_free: bool,
    pub is_public_good: bool,
    pub is_horizontal: bool,
    pub script_mode: bool,
    pub show_html_end: bool,
    pub segments: Vec<Segment>,
    pub play_count: u64,
    pub likes_count: u64,
}

impl VideoDraft {
    /// Convert form input into storable fields
    ///
    /// Counters start at zero; the caller carries them over on edits.
    pub fn normalize(self) -> Result<VideoFields> {
        Ok(VideoFields {
            title: self.title,
            description: self.description,
            youtube_url: self.youtube_url,
            tags: parse_tags(&self.tags),
            category: self.category,
            difficulty: self.difficulty,
            duration: parse_duration(&self.duration)?,
            thumbnail: self.thumbnail.filter(|t| !t.trim().is_empty()),
            show_ad: self.show_ad,
            advertiser: self.advertiser,
            is_premium: self.is_premium,
            is_ad_free: self.is_ad_free,
            is_public_good: self.is_public_good,
            is_horizontal: self.is_horizontal,
            script_mode: self.script_mode,
            show_html_end: self.show_html_end,
            segments: self.segments,
            play_count: 0,
            likes_count: 0,
        })
    }
}

/// A persisted video document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    #[serde(flatten)]
    pub fields: VideoFields,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Timestamped for Video {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

/// One row of the "manage videos" table
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub id: String,
    pub title: String,
    pub category: String,
    pub duration: String,
    pub segments: usize,
    pub difficulty: Difficulty,
    pub is_premium: bool,
    pub is_ad_free: bool,
    pub play_count: u64,
    pub likes_count: u64,
    pub date: Option<DateTime<Utc>>,
}

impl From<&Video> for VideoSummary {
    fn from(video: &Video) -> Self {
        let fields = &video.fields;
        Self {
            id: video.id.clone(),
            title: fields.title.clone(),
            category: fields.category.clone(),
            duration: format_duration(fields.duration),
            segments: fields.segments.len(),
            difficulty: fields.difficulty,
            is_premium: fields.is_premium,
            is_ad_free: fields.is_ad_free,
            play_count: fields.play_count,
            likes_count: fields.likes_count,
            date: video.effective_instant(),
        }
    }
}

/// Split comma separated tags, trimming and dropping blanks
pub fn parse_tags(input: &TagsInput) -> Vec<String> {
    let tags: Vec<&str> = match input {
        TagsInput::List(list) => list.iter().map(String::as_str).collect(),
        TagsInput::Text(text) => text.split(',').collect(),
    };

    tags.into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Convert a duration field to whole seconds
///
/// `"m:s"` becomes `m * 60 + s`; parts after the second are ignored.
/// Text without a colon counts as zero.
pub fn parse_duration(input: &DurationInput) -> Result<u32> {
    let text = match input {
        DurationInput::Seconds(secs) => return Ok(*secs),
        DurationInput::Text(text) => text.trim(),
    };

    let mut parts = text.split(':');
    let (Some(min), Some(sec)) = (parts.next(), parts.next()) else {
        return Ok(0);
    };

    let parse = |part: &str| {
        part.trim()
            .parse::<u32>()
            .map_err(|_| Error::BadRequest(format!("Invalid duration: {}", text)))
    };

    let minutes = parse(min)?;
    let seconds = parse(sec)?;
    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or_else(|| Error::BadRequest(format!("Duration out of range: {}", text)))
}

/// Format seconds as zero padded `mm:ss`, or `-` when unset
pub fn format_duration(seconds: u32) -> String {
    if seconds == 0 {
        return "-".to_string();
    }
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Prefilled draft behind the "load sample data" button
pub fn sample_draft() -> VideoDraft {
    let segments = vec![
        Segment {
            role: Role::Actor,
            actor_line: "There she is. Selena, hi~".to_string(),
            user_line: "Hi.".to_string(),
            start: "00:00:00".to_string(),
            end: "00:04:29".to_string(),
            ..Default::default()
        },
        Segment {
            role: Role::User,
            actor_line: "I have intro music for the 73 questions.".to_string(),
            user_line: "Great, cue it up. Titles?".to_string(),
            start: "00:04:30".to_string(),
            end: "00:06:30".to_string(),
            ..Default::default()
        },
    ]
    .into_iter()
    .map(Segment::sync_subtitles)
    .collect();

    VideoDraft {
        title: "Selena Gomez Interview".to_string(),
        description: "A fun 73-questions interview with Selena Gomez.".to_string(),
        youtube_url: "https://youtu.be/3IjwsUgMbGM".to_string(),
        tags: TagsInput::Text("Selena, Interview, Fun".to_string()),
        category: "Interview".to_string(),
        difficulty: Difficulty::Medium,
        duration: DurationInput::Text("01:25".to_string()),
        thumbnail: Some(
            "https://upload.wikimedia.org/wikipedia/commons/7/74/Selena_Gomez_2019.jpg"
                .to_string(),
        ),
        advertiser: "YouTube".to_string(),
        is_horizontal: true,
        script_mode: true,
        segments,
        ..Default::default()
    }
}
