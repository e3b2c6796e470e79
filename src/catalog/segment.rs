use std::collections::HashMap;

use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};

/// Languages the platform supports
///
/// English is carried by the segment's primary line; the rest are subtitles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
    Zh,
    Hi,
    Ja,
    Ko,
    Es,
    Vi,
}

/// Subtitle languages in their fixed order (also the bulk paste order)
pub const SUBTITLE_LANGUAGES: [Language; 7] = [
    Language::Ar,
    Language::Zh,
    Language::Hi,
    Language::Ja,
    Language::Ko,
    Language::Es,
    Language::Vi,
];

impl Language {
    /// ISO 639-1 code used as the subtitle key
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
            Language::Zh => "zh",
            Language::Hi => "hi",
            Language::Ja => "ja",
            Language::Ko => "ko",
            Language::Es => "es",
            Language::Vi => "vi",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ar => "Arabic",
            Language::Zh => "Chinese",
            Language::Hi => "Hindi",
            Language::Ja => "Japanese",
            Language::Ko => "Korean",
            Language::Es => "Spanish",
            Language::Vi => "Vietnamese",
        }
    }

    /// Position in [`SUBTITLE_LANGUAGES`], `None` for English
    pub fn subtitle_index(self) -> Option<usize> {
        SUBTITLE_LANGUAGES.iter().position(|l| *l == self)
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Language::En),
            "ar" => Some(Language::Ar),
            "zh" => Some(Language::Zh),
            "hi" => Some(Language::Hi),
            "ja" => Some(Language::Ja),
            "ko" => Some(Language::Ko),
            "es" => Some(Language::Es),
            "vi" => Some(Language::Vi),
            _ => None,
        }
    }
}

/// Per-language subtitle text for one segment
///
/// Always holds exactly one entry per subtitle language, in the fixed order.
/// Serialized as a JSON object keyed by language code.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "Option<HashMap<String, Option<String>>>")]
pub struct Subtitles([String; SUBTITLE_LANGUAGES.len()]);

impl Subtitles {
    /// Every language set to the same text
    pub fn filled(text: &str) -> Self {
        Subtitles(std::array::from_fn(|_| text.to_string()))
    }

    /// Fill languages positionally from a pasted block, one line per language
    ///
    /// Missing trailing lines leave languages empty; surplus lines are dropped.
    pub fn from_block(block: &str) -> Self {
        let mut lines = block.lines();
        Subtitles(std::array::from_fn(|_| {
            lines.next().map(str::to_string).unwrap_or_default()
        }))
    }

    /// Text shown in the paste box: values joined by newlines in fixed order
    pub fn to_block(&self) -> String {
        self.0.join("\n")
    }

    /// Subtitle text for a language (`None` for English)
    pub fn get(&self, language: Language) -> Option<&str> {
        language.subtitle_index().map(|i| self.0[i].as_str())
    }

    /// Iterate `(language, text)` pairs in the fixed order
    pub fn iter(&self) -> impl Iterator<Item = (Language, &str)> {
        SUBTITLE_LANGUAGES
            .iter()
            .copied()
            .zip(self.0.iter().map(String::as_str))
    }
}

impl From<Option<HashMap<String, Option<String>>>> for Subtitles {
    fn from(map: Option<HashMap<String, Option<String>>>) -> Self {
        // A null document reads as all-empty; unknown keys (e.g. a legacy
        // "en" entry) are ignored
        let mut map = map.unwrap_or_default();
        Subtitles(std::array::from_fn(|i| {
            map.remove(SUBTITLE_LANGUAGES[i].code())
                .flatten()
                .unwrap_or_default()
        }))
    }
}

impl Serialize for Subtitles {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(SUBTITLE_LANGUAGES.len()))?;
        for (language, text) in self.iter() {
            map.serialize_entry(language.code(), text)?;
        }
        map.end()
    }
}

/// Who speaks a segment's line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Actor,
    User,
}

/// One timed line of dialogue in a video script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Segment {
    #[serde(rename = "type")]
    pub role: Role,
    pub actor_line: String,
    pub user_line: String,
    pub start: String,
    pub end: String,
    pub replay_audio_link: String,
    pub subtitles: Subtitles,
}

/// A single edit made to a segment in the upload form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum SegmentEdit {
    SetRole(Role),
    SetActorLine(String),
    SetUserLine(String),
    SetStart(String),
    SetEnd(String),
    SetReplayAudioLink(String),
    PasteSubtitles(String),
}

impl Segment {
    /// Line spoken by the segment's current role
    pub fn active_line(&self) -> &str {
        match self.role {
            Role::Actor => &self.actor_line,
            Role::User => &self.user_line,
        }
    }

    /// Mirror the active line into every subtitle slot
    ///
    /// Runs after any role or line edit. Per-language text entered earlier is
    /// overwritten.
    pub fn sync_subtitles(mut self) -> Self {
        self.subtitles = Subtitles::filled(self.active_line());
        self
    }

    /// Replace all subtitles from a newline separated block
    pub fn bulk_import(mut self, block: &str) -> Self {
        self.subtitles = Subtitles::from_block(block);
        self
    }

    /// Apply one form edit and return the updated segment
    pub fn apply(mut self, edit: SegmentEdit) -> Self {
        match edit {
            SegmentEdit::SetRole(role) => {
                self.role = role;
                self.sync_subtitles()
            }
            SegmentEdit::SetActorLine(line) => {
                self.actor_line = line;
                self.sync_subtitles()
            }
            SegmentEdit::SetUserLine(line) => {
                self.user_line = line;
                self.sync_subtitles()
            }
            SegmentEdit::SetStart(start) => {
                self.start = start;
                self
            }
            SegmentEdit::SetEnd(end) => {
                self.end = end;
                self
            }
            SegmentEdit::SetReplayAudioLink(link) => {
                self.replay_audio_link = link;
                self
            }
            SegmentEdit::PasteSubtitles(block) => self.bulk_import(&block),
        }
    }
}
