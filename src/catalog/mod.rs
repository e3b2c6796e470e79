pub mod ordering;
pub mod segment;
pub mod settings;
pub mod video;

pub use ordering::{compare_recent_first, order_by_recent_activity, Timestamped};
pub use segment::{Language, Role, Segment, SegmentEdit, Subtitles, SUBTITLE_LANGUAGES};
pub use settings::{SiteSettings, VoiceLevel};
pub use video::{Difficulty, Video, VideoDraft, VideoFields, VideoSummary};

/// An entry in one of the simple name-only lists (categories, advertisers)
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct NamedItem {
    pub id: String,
    pub name: String,
}

/// Name-only collections managed from the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedList {
    Categories,
    Advertisers,
}

impl NamedList {
    /// Backing table name
    pub fn table(self) -> &'static str {
        match self {
            NamedList::Categories => "categories",
            NamedList::Advertisers => "advertisers",
        }
    }

    /// Singular noun for messages
    pub fn noun(self) -> &'static str {
        match self {
            NamedList::Categories => "Category",
            NamedList::Advertisers => "Advertiser",
        }
    }
}

/// Trim a submitted name, rejecting blanks
pub fn clean_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
