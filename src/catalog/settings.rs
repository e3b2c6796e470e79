use serde::{Deserialize, Serialize};

use super::segment::Language;
use crate::error::{Error, Result};

/// Default practice difficulty offered to app users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VoiceLevel {
    Easy,
    #[default]
    Medium,
    Hard,
    Creative,
}

/// Site-wide switches edited on the settings page
///
/// Fields missing from the stored document fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct SiteSettings {
    pub allow_uploads: bool,
    pub default_subtitle_lang: Language,
    pub maintenance_mode: bool,
    /// Show ads to unsubscribed users
    pub ads_enabled: bool,
    pub home_banner_message: String,
    pub default_voice_level: VoiceLevel,
    pub recording_enabled: bool,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            allow_uploads: true,
            default_subtitle_lang: Language::En,
            maintenance_mode: false,
            ads_enabled: true,
            home_banner_message: "Subscribe now for $1/month!".to_string(),
            default_voice_level: VoiceLevel::Medium,
            recording_enabled: true,
        }
    }
}

impl SiteSettings {
    /// Overlay the keys present in `patch` onto these settings
    pub fn merge(&self, patch: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(patch) = patch else {
            return Err(Error::BadRequest(
                "Settings update must be a JSON object".to_string(),
            ));
        };

        let mut current = match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => map,
            _ => return Err(Error::Internal("Settings did not serialize to an object".to_string())),
        };
        current.extend(patch);

        serde_json::from_value(serde_json::Value::Object(current))
            .map_err(|e| Error::BadRequest(format!("Invalid settings: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_document_falls_back_to_defaults() {
        let settings: SiteSettings =
            serde_json::from_str(r#"{"maintenanceMode":true}"#).unwrap();

        assert!(settings.maintenance_mode);
        assert!(settings.allow_uploads);
        assert_eq!(settings.home_banner_message, "Subscribe now for $1/month!");
    }

    #[test]
    fn test_merge_overlays_only_given_keys() {
        let settings = SiteSettings::default();
        let merged = settings
            .merge(json!({ "adsEnabled": false, "defaultSubtitleLang": "ja" }))
            .unwrap();

        assert!(!merged.ads_enabled);
        assert_eq!(merged.default_subtitle_lang, Language::Ja);
        assert_eq!(merged.default_voice_level, VoiceLevel::Medium);
        assert!(merged.recording_enabled);
    }

    #[test]
    fn test_merge_rejects_unknown_key() {
        let result = SiteSettings::default().merge(json!({ "darkMode": true }));
        assert!(matches!(result, Err(Error::BadRequest(_))));
    }

    #[test]
    fn test_merge_rejects_wrong_type() {
        let result = SiteSettings::default().merge(json!({ "allowUploads": "yes" }));
        assert!(matches!(result, Err(Error::BadRequest(_))));
    }

    #[test]
    fn test_merge_rejects_non_object() {
        let result = SiteSettings::default().merge(json!([1, 2]));
        assert!(matches!(result, Err(Error::BadRequest(_))));
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(SiteSettings::default()).unwrap();
        assert_eq!(json["defaultSubtitleLang"], "en");
        assert_eq!(json["defaultVoiceLevel"], "medium");
    }
}
